//! # Herb Catalog Core
//!
//! Offline data core for a traditional Chinese medicine herb catalog app.
//! A bundled JSON asset seeds an LMDB store; the asset carries a version number
//! and the store is re-seeded only when that number goes up. Everything the
//! app's screens read (pages, category tabs, search, detail, home suggestions)
//! is served from the store.
//!
//! ## Features
//!
//! - **Versioned seeding**: full table replace, in one transaction, only when the
//!   asset version is strictly greater than the stored one
//! - **Query layer**: pagination, category filter, case-insensitive search,
//!   category listing and counts
//! - **Stable suggestions**: shuffled function and clinical-application chips,
//!   fixed for the life of the process
//! - **FFI surface**: C-compatible functions returning JSON [`AppResponse`] strings
//!
//! ## Quick Start
//!
//! ```no_run
//! use herb_catalog_core::asset_source::EmbeddedAsset;
//! use herb_catalog_core::config::RepositoryConfig;
//! use herb_catalog_core::herb_repository::HerbRepository;
//!
//! let config = RepositoryConfig::new("tcm_database", "herbs.json");
//! let asset = EmbeddedAsset::new("herbs.json", r#"{"version":1,"herbs":[{"name":"人参","category":"补气类"}]}"#);
//! let repository = HerbRepository::with_asset(config, asset)?;
//!
//! repository.initialize().join().ok();
//! let first_page = repository.get_page(0, 20)?;
//! # Ok::<(), herb_catalog_core::app_response::AppResponse>(())
//! ```
//!
//! ## FFI Functions
//!
//! - [`create_repository`] - Open the store and start the background sync
//! - [`sync_repository`] - Run the sync routine and report its outcome
//! - [`get_herbs_page`], [`get_herb_by_id`], [`get_herbs_by_category`]
//! - [`search_herbs`], [`search_herbs_in_category`]
//! - [`list_categories`], [`count_herbs`]
//! - [`recommended_functions`], [`recommended_clinical_applications`], [`load_home_summary`]
//! - [`close_repository`] - Release the handle
//! - [`free_response`] - Release a string returned by any of the above

pub mod app_response;
pub mod asset_source;
pub mod catalog_browser;
pub mod config;
pub mod herb_db_state;
pub mod herb_model;
pub mod herb_repository;
pub mod recommendations;
pub mod resource;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use log::{info, warn};
use serde::Serialize;

use crate::app_response::AppResponse;
use crate::config::RepositoryConfig;
use crate::herb_repository::HerbRepository;

/// Opens the herb repository described by a JSON [`RepositoryConfig`] and
/// starts the sync routine on a background thread.
///
/// # Returns
///
/// A pointer to the [`HerbRepository`] on success, or a null pointer on failure.
/// The pointer must eventually be passed to [`close_repository`].
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use herb_catalog_core::create_repository;
///
/// let config = CString::new(r#"{"db_path":"tcm_database","asset_path":"herbs.json"}"#).unwrap();
/// let repository = create_repository(config.as_ptr());
///
/// if !repository.is_null() {
///     // Repository opened, sync running in the background
/// }
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn create_repository(config_json: *const c_char) -> *mut HerbRepository {
    if config_json.is_null() {
        warn!("Null config pointer passed to create_repository");
        return std::ptr::null_mut();
    }

    let config_str = match unsafe { CStr::from_ptr(config_json).to_str() } {
        Ok(s) => s,
        Err(e) => {
            warn!("Invalid UTF-8 in config parameter: {e}");
            return std::ptr::null_mut();
        }
    };

    let config = match RepositoryConfig::from_json(config_str) {
        Ok(config) => config,
        Err(e) => {
            warn!("❌ Rejected repository config: {e}");
            return std::ptr::null_mut();
        }
    };

    info!("Opening herb repository at: {}", config.db_path.display());

    match HerbRepository::open(config) {
        Ok(repository) => {
            // Detached: the host polls the query functions meanwhile.
            let _ = repository.initialize();
            info!("✅ Herb repository initialized successfully");
            Box::into_raw(Box::new(repository))
        }
        Err(e) => {
            warn!("❌ Failed to open herb repository: {e}");
            std::ptr::null_mut()
        }
    }
}

/// Runs the sync routine synchronously and returns the
/// [`SyncOutcome`](herb_repository::SyncOutcome) as JSON.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn sync_repository(state: *mut HerbRepository) -> *const c_char {
    let repository = match repository_ref(state, "sync_repository") {
        Ok(repository) => repository,
        Err(error_ptr) => return error_ptr,
    };

    json_response(repository.sync())
}

/// Returns up to `limit` herbs in store order, skipping `offset`.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_herbs_page(state: *mut HerbRepository, offset: usize, limit: usize) -> *const c_char {
    let repository = match repository_ref(state, "get_herbs_page") {
        Ok(repository) => repository,
        Err(error_ptr) => return error_ptr,
    };

    json_response(repository.get_page(offset, limit))
}

/// Retrieves one herb. A missing id yields a `NotFound` response.
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use herb_catalog_core::{create_repository, get_herb_by_id};
///
/// let config = CString::new(r#"{"db_path":"tcm_database","asset_path":"herbs.json"}"#).unwrap();
/// let repository = create_repository(config.as_ptr());
///
/// let result = get_herb_by_id(repository, 1);
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_herb_by_id(state: *mut HerbRepository, id: u32) -> *const c_char {
    let repository = match repository_ref(state, "get_herb_by_id") {
        Ok(repository) => repository,
        Err(error_ptr) => return error_ptr,
    };

    match repository.get_by_id(id) {
        Ok(Some(herb)) => json_response(Ok(herb)),
        Ok(None) => response_to_c_string(&AppResponse::NotFound(format!("No herb found with id: {id}"))),
        Err(e) => response_to_c_string(&e),
    }
}

/// Category filter; the `全部` category returns the unfiltered page.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_herbs_by_category(
    state: *mut HerbRepository,
    category: *const c_char,
    offset: usize,
    limit: usize,
) -> *const c_char {
    let repository = match repository_ref(state, "get_herbs_by_category") {
        Ok(repository) => repository,
        Err(error_ptr) => return error_ptr,
    };

    let category = match c_ptr_to_string(category, "category") {
        Ok(category) => category,
        Err(error_ptr) => return error_ptr,
    };

    json_response(repository.get_by_category(&category, offset, limit))
}

/// Case-insensitive substring search over name, pin yin, function tags and
/// clinical applications.
///
/// # Parameters
///
/// * `state` - Handle from [`create_repository`]
/// * `query` - Search text; surrounding whitespace is ignored and a blank
///   query returns the unfiltered page
/// * `offset`, `limit` - Window over the matching herbs, in store order
///
/// # Returns
///
/// An `Ok` response holding a JSON array of herbs, or a `BadRequest` response
/// for a null or non UTF-8 argument.
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use herb_catalog_core::{create_repository, search_herbs};
///
/// let config = CString::new(r#"{"db_path":"tcm_database","asset_path":"herbs.json"}"#).unwrap();
/// let repository = create_repository(config.as_ptr());
///
/// let query = CString::new("renshen").unwrap();
/// let result = search_herbs(repository, query.as_ptr(), 0, 20);
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn search_herbs(
    state: *mut HerbRepository,
    query: *const c_char,
    offset: usize,
    limit: usize,
) -> *const c_char {
    let repository = match repository_ref(state, "search_herbs") {
        Ok(repository) => repository,
        Err(error_ptr) => return error_ptr,
    };

    let query = match c_ptr_to_string(query, "query") {
        Ok(query) => query,
        Err(error_ptr) => return error_ptr,
    };

    json_response(repository.search(&query, offset, limit))
}

/// Search restricted to one category. Both conditions must hold; the `全部`
/// category drops the category condition.
///
/// # Parameters
///
/// * `state` - Handle from [`create_repository`]
/// * `category` - Exact category name
/// * `query` - Search text, normalized as in [`search_herbs`]
/// * `offset`, `limit` - Window over the matching herbs
///
/// # Returns
///
/// An `Ok` response holding a JSON array of herbs.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn search_herbs_in_category(
    state: *mut HerbRepository,
    category: *const c_char,
    query: *const c_char,
    offset: usize,
    limit: usize,
) -> *const c_char {
    let repository = match repository_ref(state, "search_herbs_in_category") {
        Ok(repository) => repository,
        Err(error_ptr) => return error_ptr,
    };

    let category = match c_ptr_to_string(category, "category") {
        Ok(category) => category,
        Err(error_ptr) => return error_ptr,
    };

    let query = match c_ptr_to_string(query, "query") {
        Ok(query) => query,
        Err(error_ptr) => return error_ptr,
    };

    json_response(repository.search_within_category(&category, &query, offset, limit))
}

/// Distinct categories in the order they first appear in the store.
///
/// # Returns
///
/// An `Ok` response holding a JSON array of strings. An empty store yields `[]`.
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use herb_catalog_core::{create_repository, list_categories};
///
/// let config = CString::new(r#"{"db_path":"tcm_database","asset_path":"herbs.json"}"#).unwrap();
/// let repository = create_repository(config.as_ptr());
///
/// let categories = list_categories(repository);
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn list_categories(state: *mut HerbRepository) -> *const c_char {
    let repository = match repository_ref(state, "list_categories") {
        Ok(repository) => repository,
        Err(error_ptr) => return error_ptr,
    };

    json_response(repository.list_categories())
}

/// Number of herbs currently stored.
///
/// # Returns
///
/// An `Ok` response holding a JSON number.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn count_herbs(state: *mut HerbRepository) -> *const c_char {
    let repository = match repository_ref(state, "count_herbs") {
        Ok(repository) => repository,
        Err(error_ptr) => return error_ptr,
    };

    json_response(repository.count())
}

/// Function tags for the home screen suggestion chips.
///
/// # Parameters
///
/// * `state` - Handle from [`create_repository`]
/// * `count` - Maximum number of tags to return
///
/// # Returns
///
/// An `Ok` response holding a JSON array of strings. The order is fixed for
/// the life of the process; before the first sync finishes the fallback list
/// is served.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn recommended_functions(state: *mut HerbRepository, count: usize) -> *const c_char {
    let repository = match repository_ref(state, "recommended_functions") {
        Ok(repository) => repository,
        Err(error_ptr) => return error_ptr,
    };

    json_response(Ok(repository.recommended_functions(count)))
}

/// Clinical application tags for the home screen suggestion chips.
///
/// # Parameters
///
/// * `state` - Handle from [`create_repository`]
/// * `count` - Maximum number of tags to return
///
/// # Returns
///
/// An `Ok` response holding a JSON array of strings, with the same stability
/// as [`recommended_functions`].
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn recommended_clinical_applications(state: *mut HerbRepository, count: usize) -> *const c_char {
    let repository = match repository_ref(state, "recommended_clinical_applications") {
        Ok(repository) => repository,
        Err(error_ptr) => return error_ptr,
    };

    json_response(Ok(repository.recommended_clinical_applications(count)))
}

/// Featured herbs, categories and both suggestion lists in one call.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn load_home_summary(state: *mut HerbRepository) -> *const c_char {
    let repository = match repository_ref(state, "load_home_summary") {
        Ok(repository) => repository,
        Err(error_ptr) => return error_ptr,
    };

    json_response(catalog_browser::home_summary(repository))
}

/// Releases a handle obtained from [`create_repository`].
///
/// # Notes
///
/// A background sync still running keeps its own clone of the repository, so
/// the LMDB environment closes once both are gone.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn close_repository(state: *mut HerbRepository) -> *const c_char {
    if state.is_null() {
        let error = AppResponse::BadRequest("Null state pointer passed to close_repository".to_string());
        return response_to_c_string(&error);
    }

    drop(unsafe { Box::from_raw(state) });
    response_to_c_string(&AppResponse::success("Repository closed successfully"))
}

/// Frees a string returned by any function of this library.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn free_response(ptr: *mut c_char) {
    if ptr.is_null() {
        return;
    }
    drop(unsafe { CString::from_raw(ptr) });
}

/// Borrows the repository behind an FFI handle, or produces the `BadRequest`
/// response to hand back when the handle is null.
fn repository_ref<'a>(state: *mut HerbRepository, caller: &str) -> Result<&'a HerbRepository, *const c_char> {
    match unsafe { state.as_ref() } {
        Some(repository) => Ok(repository),
        None => {
            let error = AppResponse::BadRequest(format!("Null state pointer passed to {caller}"));
            Err(response_to_c_string(&error))
        }
    }
}

/// Serializes a successful value into `AppResponse::Ok`, or the error as is.
fn json_response<T: Serialize>(result: Result<T, AppResponse>) -> *const c_char {
    let response = match result {
        Ok(value) => match serde_json::to_string(&value) {
            Ok(json) => AppResponse::Ok(json),
            Err(e) => AppResponse::SerializationError(format!("Failed to serialize result: {e}")),
        },
        Err(e) => e,
    };
    response_to_c_string(&response)
}

fn response_to_c_string(response: &AppResponse) -> *const c_char {
    let json = match serde_json::to_string(response) {
        Ok(j) => j,
        Err(e) => {
            warn!("Error serializing response: {e}");
            return std::ptr::null();
        }
    };

    match CString::new(json) {
        Ok(c_str) => c_str.into_raw(),
        Err(e) => {
            warn!("Error creating CString: {e}");
            std::ptr::null()
        }
    }
}

/// Converts a C string pointer to an owned `String`, or to the error response
/// to return when the pointer is null or not UTF-8.
fn c_ptr_to_string(ptr: *const c_char, field_name: &str) -> Result<String, *const c_char> {
    if ptr.is_null() {
        let error = AppResponse::BadRequest(format!("Null {field_name} pointer"));
        return Err(response_to_c_string(&error));
    }

    match unsafe { CStr::from_ptr(ptr).to_str() } {
        Ok(s) => Ok(s.to_string()),
        Err(e) => {
            let error = AppResponse::BadRequest(format!("Invalid UTF-8 in {field_name}: {e}"));
            Err(response_to_c_string(&error))
        }
    }
}
