//! C FFI exports for cross-platform integration
//!
//! This module provides a C-compatible API that can be called from:
//! - Android via JNI
//! - iOS via Swift/Objective-C FFI
//!
//! Contracts are passed in as the language's JSON data contract and results
//! come back as JSON strings. All functions return error codes.

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::sync::{Mutex, PoisonError};

use crate::contract::DataContract;
use crate::db::SqliteNounStore;
use crate::resolver::PluralFormResolver;
use crate::Error;

/// Resolver configured by `plural_init`
static RESOLVER: Mutex<Option<PluralFormResolver<SqliteNounStore>>> = Mutex::new(None);

/// Error codes returned by FFI functions
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiError {
    /// Operation succeeded
    Success = 0,
    /// Null pointer passed as argument
    NullPointer = 1,
    /// Invalid UTF-8 string
    InvalidUtf8 = 2,
    /// Resolver not initialized
    NotInitialized = 3,
    /// Numeric category contract missing or empty
    ContractMissingOrEmpty = 4,
    /// Language database could not be opened
    StorageUnavailable = 5,
    /// Lookup query could not be built or run
    QueryFailed = 6,
    /// JSON parsing or serialization failed
    JsonFailed = 7,
    /// Language identifier rejected
    InvalidLanguage = 8,
}

impl From<&Error> for FfiError {
    fn from(err: &Error) -> Self {
        match err {
            Error::ContractMissingOrEmpty => FfiError::ContractMissingOrEmpty,
            Error::StorageUnavailable { .. } => FfiError::StorageUnavailable,
            Error::QueryConstructionFailed(_) => FfiError::QueryFailed,
            Error::InvalidLanguage(_) => FfiError::InvalidLanguage,
            Error::Json(_) => FfiError::JsonFailed,
            Error::Io(_) => FfiError::StorageUnavailable,
        }
    }
}

/// Borrow a C string argument as `&str`
unsafe fn borrow_str<'a>(ptr: *const c_char) -> Result<&'a str, FfiError> {
    if ptr.is_null() {
        return Err(FfiError::NullPointer);
    }
    CStr::from_ptr(ptr).to_str().map_err(|_| FfiError::InvalidUtf8)
}

/// Parse an optional data contract; null means "no contract"
unsafe fn parse_contract(contract_json: *const c_char) -> Result<Option<DataContract>, FfiError> {
    if contract_json.is_null() {
        return Ok(None);
    }
    let json = borrow_str(contract_json)?;
    DataContract::from_json(json)
        .map(Some)
        .map_err(|_| FfiError::JsonFailed)
}

/// Hand ownership of `json` to the caller as a C string
unsafe fn write_json(json: String, out_json: *mut *mut c_char) -> c_int {
    match CString::new(json) {
        Ok(s) => {
            *out_json = s.into_raw();
            FfiError::Success as c_int
        }
        Err(_) => FfiError::JsonFailed as c_int,
    }
}

/// Run `f` on a copy of the resolver; the slot is unlocked while it runs
fn with_resolver<T>(
    f: impl FnOnce(&PluralFormResolver<SqliteNounStore>) -> Result<T, FfiError>,
) -> Result<T, FfiError> {
    let resolver = RESOLVER
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
        .ok_or(FfiError::NotInitialized)?;
    f(&resolver)
}

fn enumerate_json(language: &str, contract: Option<&DataContract>) -> Result<String, FfiError> {
    with_resolver(|resolver| {
        let numbers = contract.and_then(DataContract::numbers);
        let values = resolver
            .enumerate_category_values(language, numbers)
            .map_err(|e| {
                log::error!("Failed to enumerate plural forms for '{}': {}", language, e);
                FfiError::from(&e)
            })?;
        serde_json::to_string(&values.value).map_err(|_| FfiError::JsonFailed)
    })
}

fn resolve_json(
    language: &str,
    contract: Option<&DataContract>,
    noun: &str,
) -> Result<String, FfiError> {
    with_resolver(|resolver| {
        let numbers = contract.and_then(DataContract::numbers);
        let forms = resolver
            .resolve_noun_forms(language, numbers, noun)
            .map_err(|e| {
                log::error!("Failed to resolve '{}' in '{}': {}", noun, language, e);
                FfiError::from(&e)
            })?;
        serde_json::to_string(&forms.value).map_err(|_| FfiError::JsonFailed)
    })
}

/// Point the resolver at a directory of language databases
///
/// # Safety
///
/// `data_dir` must be a valid null-terminated C string.
///
/// # Returns
///
/// 0 on success, non-zero error code on failure.
#[no_mangle]
pub unsafe extern "C" fn plural_init(data_dir: *const c_char) -> c_int {
    let path = match borrow_str(data_dir) {
        Ok(p) => p,
        Err(e) => return e as c_int,
    };

    let mut guard = RESOLVER.lock().unwrap_or_else(PoisonError::into_inner);
    *guard = Some(crate::open(path));
    log::info!("Plural resolver using data directory {:?}", path);
    FfiError::Success as c_int
}

/// List every category value of every noun for a language
///
/// # Safety
///
/// - `language` must be a valid null-terminated C string
/// - `contract_json` must be null or a valid null-terminated C string
/// - `out_json` must be a valid pointer to store the result
/// - The caller is responsible for freeing the returned string with `plural_free_string`
///
/// # Returns
///
/// 0 on success, non-zero error code on failure.
/// On success, `*out_json` will be set to a JSON array of strings.
#[no_mangle]
pub unsafe extern "C" fn plural_enumerate(
    language: *const c_char,
    contract_json: *const c_char,
    out_json: *mut *mut c_char,
) -> c_int {
    if out_json.is_null() {
        return FfiError::NullPointer as c_int;
    }
    let result = borrow_str(language).and_then(|language| {
        let contract = parse_contract(contract_json)?;
        enumerate_json(language, contract.as_ref())
    });
    match result {
        Ok(json) => write_json(json, out_json),
        Err(e) => e as c_int,
    }
}

/// Look up a noun's form in every category column
///
/// # Safety
///
/// - `language` and `noun` must be valid null-terminated C strings
/// - `contract_json` must be null or a valid null-terminated C string
/// - `out_json` must be a valid pointer to store the result
/// - The caller is responsible for freeing the returned string with `plural_free_string`
///
/// # Returns
///
/// 0 on success, non-zero error code on failure.
/// On success, `*out_json` will be set to a JSON object mapping category
/// column to form (or null). A missing contract or unknown noun gives `{}`.
#[no_mangle]
pub unsafe extern "C" fn plural_resolve(
    language: *const c_char,
    contract_json: *const c_char,
    noun: *const c_char,
    out_json: *mut *mut c_char,
) -> c_int {
    if out_json.is_null() {
        return FfiError::NullPointer as c_int;
    }
    let result = borrow_str(language).and_then(|language| {
        let noun = borrow_str(noun)?;
        let contract = parse_contract(contract_json)?;
        resolve_json(language, contract.as_ref(), noun)
    });
    match result {
        Ok(json) => write_json(json, out_json),
        Err(e) => e as c_int,
    }
}

/// Free a string returned by plural_enumerate or plural_resolve
///
/// # Safety
///
/// `ptr` must be a pointer returned by a plural_* function, or null.
#[no_mangle]
pub unsafe extern "C" fn plural_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

/// Forget the configured data directory
///
/// # Returns
///
/// 0 on success.
#[no_mangle]
pub extern "C" fn plural_close() -> c_int {
    let mut guard = RESOLVER.lock().unwrap_or_else(PoisonError::into_inner);
    *guard = None;
    FfiError::Success as c_int
}

/// Get the library version
///
/// # Safety
///
/// Returns a pointer to a static string. Do not free this pointer.
#[no_mangle]
pub extern "C" fn plural_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

// ============================================================================
// JNI bindings for Android
// ============================================================================

#[cfg(target_os = "android")]
mod android {
    use std::ptr;

    use jni::objects::{JClass, JString};
    use jni::sys::{jint, jstring};
    use jni::JNIEnv;

    use super::*;

    fn get_string(env: &mut JNIEnv, value: &JString) -> Result<String, FfiError> {
        env.get_string(value)
            .map(Into::into)
            .map_err(|_| FfiError::InvalidUtf8)
    }

    fn get_contract(env: &mut JNIEnv, value: &JString) -> Result<Option<DataContract>, FfiError> {
        if value.is_null() {
            return Ok(None);
        }
        let json = get_string(env, value)?;
        DataContract::from_json(&json)
            .map(Some)
            .map_err(|_| FfiError::JsonFailed)
    }

    fn to_jstring(env: &mut JNIEnv, result: Result<String, FfiError>) -> jstring {
        let json = match result {
            Ok(j) => j,
            Err(_) => return ptr::null_mut(),
        };
        match env.new_string(&json) {
            Ok(s) => s.into_raw(),
            Err(_) => ptr::null_mut(),
        }
    }

    /// JNI: Point the resolver at the app's database directory
    ///
    /// Kotlin signature: external fun init(dataDir: String): Int
    #[no_mangle]
    pub extern "system" fn Java_org_example_plural_PluralCore_init(
        mut env: JNIEnv,
        _class: JClass,
        data_dir: JString,
    ) -> jint {
        let path = match get_string(&mut env, &data_dir) {
            Ok(p) => p,
            Err(e) => return e as jint,
        };

        let mut guard = RESOLVER.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(crate::open(&path));
        FfiError::Success as jint
    }

    /// JNI: List every category value for a language
    ///
    /// Kotlin signature: external fun enumerate(language: String, contractJson: String?): String?
    #[no_mangle]
    pub extern "system" fn Java_org_example_plural_PluralCore_enumerate(
        mut env: JNIEnv,
        _class: JClass,
        language: JString,
        contract_json: JString,
    ) -> jstring {
        let result = get_string(&mut env, &language).and_then(|language| {
            let contract = get_contract(&mut env, &contract_json)?;
            enumerate_json(&language, contract.as_ref())
        });
        to_jstring(&mut env, result)
    }

    /// JNI: Look up a noun's plural forms
    ///
    /// Kotlin signature: external fun resolve(language: String, contractJson: String?, noun: String): String?
    #[no_mangle]
    pub extern "system" fn Java_org_example_plural_PluralCore_resolve(
        mut env: JNIEnv,
        _class: JClass,
        language: JString,
        contract_json: JString,
        noun: JString,
    ) -> jstring {
        let result = get_string(&mut env, &language).and_then(|language| {
            let noun = get_string(&mut env, &noun)?;
            let contract = get_contract(&mut env, &contract_json)?;
            resolve_json(&language, contract.as_ref(), &noun)
        });
        to_jstring(&mut env, result)
    }

    /// JNI: Forget the configured data directory
    ///
    /// Kotlin signature: external fun close()
    #[no_mangle]
    pub extern "system" fn Java_org_example_plural_PluralCore_close(_env: JNIEnv, _class: JClass) {
        plural_close();
    }

    /// Called when the native library is loaded by System.loadLibrary()
    ///
    /// This sets up:
    /// - Android logging (so log::* macros appear in logcat)
    /// - Panic hook (to log panics before they crash the app)
    #[no_mangle]
    pub extern "system" fn JNI_OnLoad(_vm: jni::JavaVM, _reserved: *mut std::ffi::c_void) -> jint {
        android_logger::init_once(
            android_logger::Config::default()
                .with_max_level(log::LevelFilter::Debug)
                .with_tag("PluralCore"),
        );

        std::panic::set_hook(Box::new(|info| {
            let msg = if let Some(s) = info.payload().downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = info.payload().downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };

            let location = info
                .location()
                .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
                .unwrap_or_else(|| "unknown".to_string());

            log::error!("PANIC at {}: {}", location, msg);
        }));

        log::info!("PluralCore native library loaded");

        jni::sys::JNI_VERSION_1_6
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;

    use crate::db::tests::create_language_db;

    /// The resolver slot is global; tests touching it run one at a time
    static SERIAL: Mutex<()> = Mutex::new(());

    unsafe fn take_string(ptr: *mut c_char) -> String {
        let s = CStr::from_ptr(ptr).to_str().unwrap().to_string();
        plural_free_string(ptr);
        s
    }

    #[test]
    fn test_plural_version() {
        let version = plural_version();
        let version_str = unsafe { CStr::from_ptr(version) }.to_str().unwrap();
        assert!(!version_str.is_empty());
    }

    #[test]
    fn test_null_pointer_checks() {
        let _serial = SERIAL.lock().unwrap_or_else(PoisonError::into_inner);
        unsafe {
            assert_eq!(plural_init(ptr::null()), FfiError::NullPointer as c_int);
            assert_eq!(
                plural_enumerate(ptr::null(), ptr::null(), ptr::null_mut()),
                FfiError::NullPointer as c_int
            );
            let mut out: *mut c_char = ptr::null_mut();
            assert_eq!(
                plural_resolve(ptr::null(), ptr::null(), ptr::null(), &mut out),
                FfiError::NullPointer as c_int
            );
        }
    }

    #[test]
    fn test_not_initialized() {
        let _serial = SERIAL.lock().unwrap_or_else(PoisonError::into_inner);
        let language = CString::new("English").unwrap();
        let mut out: *mut c_char = ptr::null_mut();

        unsafe {
            plural_close();
            let result = plural_enumerate(language.as_ptr(), ptr::null(), &mut out);
            assert_eq!(result, FfiError::NotInitialized as c_int);
        }
    }

    #[test]
    fn test_round_trip_through_c_api() {
        let _serial = SERIAL.lock().unwrap_or_else(PoisonError::into_inner);
        let dir = tempfile::tempdir().unwrap();
        create_language_db(
            dir.path(),
            "English",
            r#"
            CREATE TABLE nouns (singular TEXT, plural TEXT);
            INSERT INTO nouns VALUES ('goose', 'geese');
            "#,
        );

        let data_dir = CString::new(dir.path().to_str().unwrap()).unwrap();
        let language = CString::new("English").unwrap();
        let contract = CString::new(r#"{"numbers": {"singular": "plural"}}"#).unwrap();
        let noun = CString::new("goose").unwrap();
        let mut out: *mut c_char = ptr::null_mut();

        unsafe {
            assert_eq!(plural_init(data_dir.as_ptr()), 0);

            let code = plural_enumerate(language.as_ptr(), contract.as_ptr(), &mut out);
            assert_eq!(code, 0);
            assert_eq!(take_string(out), r#"["geese"]"#);

            let code = plural_resolve(language.as_ptr(), contract.as_ptr(), noun.as_ptr(), &mut out);
            assert_eq!(code, 0);
            assert_eq!(take_string(out), r#"{"plural":"geese"}"#);

            // Absent contract: enumeration fails, lookup degrades to {}
            let code = plural_enumerate(language.as_ptr(), ptr::null(), &mut out);
            assert_eq!(code, FfiError::ContractMissingOrEmpty as c_int);

            let code = plural_resolve(language.as_ptr(), ptr::null(), noun.as_ptr(), &mut out);
            assert_eq!(code, 0);
            assert_eq!(take_string(out), "{}");

            let missing = CString::new("French").unwrap();
            let code = plural_resolve(missing.as_ptr(), contract.as_ptr(), noun.as_ptr(), &mut out);
            assert_eq!(code, FfiError::StorageUnavailable as c_int);

            plural_close();
        }
    }

    #[test]
    fn test_resolver_slot_unlocked_during_lookup() {
        let _serial = SERIAL.lock().unwrap_or_else(PoisonError::into_inner);
        let dir = tempfile::tempdir().unwrap();
        let data_dir = CString::new(dir.path().to_str().unwrap()).unwrap();

        unsafe {
            assert_eq!(plural_init(data_dir.as_ptr()), 0);
        }
        let unlocked = with_resolver(|resolver| {
            assert_eq!(resolver.store().config().data_dir, dir.path());
            Ok(RESOLVER.try_lock().is_ok())
        });
        assert_eq!(unlocked, Ok(true));
        plural_close();
    }

    #[test]
    fn test_malformed_contract_json() {
        let _serial = SERIAL.lock().unwrap_or_else(PoisonError::into_inner);
        let dir = tempfile::tempdir().unwrap();
        let data_dir = CString::new(dir.path().to_str().unwrap()).unwrap();
        let language = CString::new("English").unwrap();
        let contract = CString::new("{not json").unwrap();
        let mut out: *mut c_char = ptr::null_mut();

        unsafe {
            plural_init(data_dir.as_ptr());
            let code = plural_enumerate(language.as_ptr(), contract.as_ptr(), &mut out);
            assert_eq!(code, FfiError::JsonFailed as c_int);
            plural_close();
        }
    }
}
