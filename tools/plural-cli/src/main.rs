//! Plural forms command-line tool
//!
//! Looks up noun plural forms in per-language SQLite databases.
//!
//! # Usage
//!
//! ```bash
//! # Every category value in the English noun table
//! plural-cli --data-dir ./databases --language English --contract en.json enumerate
//!
//! # The forms of a single noun
//! plural-cli --data-dir ./databases --language English --contract en.json resolve cat
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use plural_core::{DataContract, Diagnostic};

/// Plural forms lookup over per-language noun databases
#[derive(Parser, Debug)]
#[command(name = "plural-cli")]
#[command(author, version, about = "Look up noun plural forms in language databases")]
#[command(long_about = "
Looks up noun plural forms in {language}LanguageData.sqlite databases using
the 'numbers' section of a language's JSON data contract.

Example usage:
  plural-cli -d ./databases -l English -c en.json enumerate
  plural-cli -d ./databases -l German -c de.json resolve Hund
")]
struct Args {
    /// Directory holding the language databases
    #[arg(short, long)]
    data_dir: PathBuf,

    /// Language identifier (database file prefix)
    #[arg(short, long)]
    language: String,

    /// Path to the language's JSON data contract
    #[arg(short, long)]
    contract: PathBuf,

    /// Print recovered diagnostics alongside the result
    #[arg(long, default_value = "false")]
    diagnostics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every category value of every noun
    Enumerate,
    /// Show one noun's value in every category column
    Resolve {
        /// Singular form to look up
        noun: String,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if !args.data_dir.is_dir() {
        anyhow::bail!("Data directory does not exist: {:?}", args.data_dir);
    }

    let contract = DataContract::load(&args.contract)
        .with_context(|| format!("Failed to read contract {:?}", args.contract))?;
    let resolver = plural_core::open(&args.data_dir);

    log::info!(
        "Using {:?} for language '{}'",
        resolver.store().config().database_path(&args.language)?,
        args.language
    );

    let (output, diagnostics) = match &args.command {
        Command::Enumerate => {
            let resolution = resolver
                .enumerate_category_values(&args.language, contract.numbers())
                .context("Enumeration failed")?;
            (serde_json::to_value(&resolution.value)?, resolution.diagnostics)
        }
        Command::Resolve { noun } => {
            let resolution = resolver
                .resolve_noun_forms(&args.language, contract.numbers(), noun)
                .with_context(|| format!("Lookup of '{}' failed", noun))?;
            (serde_json::to_value(&resolution.value)?, resolution.diagnostics)
        }
    };

    if args.diagnostics {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "result": output,
                "diagnostics": diagnostics,
            }))?
        );
    } else {
        println!("{}", serde_json::to_string_pretty(&output)?);
    }

    if diagnostics
        .iter()
        .any(|d| matches!(d, Diagnostic::ContractMissingOrEmpty))
    {
        log::warn!("Contract {:?} has no usable 'numbers' section", args.contract);
    }

    Ok(())
}
