use std::ffi::{CStr, CString};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use lazy_static::lazy_static;
use libc::c_char;
use pixfinder_core::clients::{
    AccountClient, HttpAccountSource, HttpImageSearchSource, ImageSearch, ImageSearchClient,
};
use pixfinder_core::config::ClientConfig;
use pixfinder_core::controller::PaginationController;
use pixfinder_core::history::HistoryStore;
use pixfinder_core::models::Credentials;
use pixfinder_core::sqlite::SqliteStore;
use serde::Serialize;

struct PixfinderState {
    controller: Arc<PaginationController>,
    accounts: Arc<AccountClient<HttpAccountSource>>,
    tokio_rt: tokio::runtime::Runtime,
}

lazy_static! {
    static ref STATE: Mutex<Option<PixfinderState>> = Mutex::new(None);
}

fn lock_state() -> MutexGuard<'static, Option<PixfinderState>> {
    STATE.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Initialize the core with the SQLite database path and an optional JSON
/// client configuration (see `ClientConfig`). `PIXFINDER_*` environment
/// variables override the JSON values.
///
/// # Safety
///
/// `db_path` must be a valid, non-null pointer to a NUL-terminated UTF-8 C
/// string. `config_json` must be null or such a pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pixfinder_init(db_path: *const c_char, config_json: *const c_char) -> bool {
    pixfinder_core::logging::init_tracing();

    if lock_state().is_some() {
        return true;
    }

    let Some(path_str) = (unsafe { read_c_str(db_path) }) else {
        tracing::error!("pixfinder_init called without a valid database path");
        return false;
    };
    let raw_config = if config_json.is_null() {
        ""
    } else {
        match unsafe { read_c_str(config_json) } {
            Some(raw) => raw,
            None => {
                tracing::error!("client config is not valid UTF-8");
                return false;
            }
        }
    };

    let config = match ClientConfig::from_json(raw_config) {
        Ok(config) => config.with_env_overrides(),
        Err(error) => {
            tracing::error!(message = %error.message, "failed to read client config");
            return false;
        }
    };

    let tokio_rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(error) => {
            tracing::error!(%error, "failed to create tokio runtime");
            return false;
        }
    };

    let store = Arc::new(SqliteStore::new(path_str));
    if let Err(error) = store.migrate_to_latest() {
        tracing::error!(message = %error.message, "failed to migrate database");
        return false;
    }

    let source = match HttpImageSearchSource::from_config(&config) {
        Ok(source) => source,
        Err(error) => {
            tracing::error!(message = %error.message, "failed to configure image search");
            return false;
        }
    };
    let search: Arc<dyn ImageSearch> = Arc::new(ImageSearchClient::new(source));
    let history = Arc::new(HistoryStore::new(store));
    let controller = Arc::new(PaginationController::new(search, history));
    let accounts = Arc::new(AccountClient::new(HttpAccountSource::from_config(&config)));

    tokio_rt.block_on(controller.initialize());

    let mut guard = lock_state();
    if guard.is_none() {
        *guard = Some(PixfinderState {
            controller,
            accounts,
            tokio_rt,
        });
    }
    true
}

/// Current home-screen state as JSON, or null before init.
#[unsafe(no_mangle)]
pub extern "C" fn pixfinder_state() -> *mut c_char {
    let guard = lock_state();
    match guard.as_ref() {
        Some(state) => to_json_c_string(&state.controller.state()),
        None => std::ptr::null_mut(),
    }
}

/// Recent search terms as a JSON array, or null before init.
#[unsafe(no_mangle)]
pub extern "C" fn pixfinder_history() -> *mut c_char {
    let guard = lock_state();
    match guard.as_ref() {
        Some(state) => to_json_c_string(&state.controller.state().history),
        None => std::ptr::null_mut(),
    }
}

/// # Safety
///
/// `text` must be a valid, non-null pointer to a NUL-terminated UTF-8 C string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pixfinder_query_changed(text: *const c_char) -> bool {
    let Some(text) = (unsafe { read_c_str(text) }) else {
        return false;
    };
    let guard = lock_state();
    match guard.as_ref() {
        Some(state) => {
            state.controller.on_query_changed(text);
            true
        }
        None => false,
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn pixfinder_submit() -> bool {
    spawn_with_controller(|controller| async move {
        controller.on_submit().await;
    })
}

/// # Safety
///
/// `query` must be a valid, non-null pointer to a NUL-terminated UTF-8 C string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pixfinder_search(query: *const c_char, reset: bool) -> bool {
    let Some(query) = (unsafe { read_c_str(query) }).map(str::to_owned) else {
        return false;
    };
    spawn_with_controller(move |controller| async move {
        controller.search(&query, reset).await;
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn pixfinder_load_more() -> bool {
    spawn_with_controller(|controller| async move {
        controller.on_scroll_near_end().await;
    })
}

/// # Safety
///
/// `query` must be a valid, non-null pointer to a NUL-terminated UTF-8 C string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pixfinder_select_history(query: *const c_char) -> bool {
    let Some(query) = (unsafe { read_c_str(query) }).map(str::to_owned) else {
        return false;
    };
    spawn_with_controller(move |controller| async move {
        controller.select_history(&query).await;
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn pixfinder_clear() -> bool {
    let guard = lock_state();
    match guard.as_ref() {
        Some(state) => {
            state.controller.clear();
            true
        }
        None => false,
    }
}

/// Blocks until the login endpoint answers.
///
/// # Safety
///
/// `email` and `password` must be valid, non-null pointers to NUL-terminated
/// UTF-8 C strings.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pixfinder_login(email: *const c_char, password: *const c_char) -> bool {
    let Some(credentials) = (unsafe { read_credentials(email, password) }) else {
        return false;
    };
    let Some(accounts) = accounts() else {
        return false;
    };
    match accounts.validate(&credentials) {
        Ok(valid) => valid,
        Err(error) => {
            tracing::warn!(message = %error.message, "login rejected before sending");
            false
        }
    }
}

/// Blocks until the sign-up endpoint answers.
///
/// # Safety
///
/// `email` and `password` must be valid, non-null pointers to NUL-terminated
/// UTF-8 C strings.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pixfinder_sign_up(email: *const c_char, password: *const c_char) -> bool {
    let Some(credentials) = (unsafe { read_credentials(email, password) }) else {
        return false;
    };
    let Some(accounts) = accounts() else {
        return false;
    };
    match accounts.sign_up(&credentials) {
        Ok(created) => created,
        Err(error) => {
            tracing::warn!(message = %error.message, "sign-up rejected before sending");
            false
        }
    }
}

/// Free a string previously returned by a `pixfinder_*` function.
///
/// # Safety
///
/// `s` must be a pointer previously returned by a `pixfinder_*` function, or null.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pixfinder_free_string(s: *mut c_char) {
    if s.is_null() {
        return;
    }
    unsafe {
        let _ = CString::from_raw(s);
    }
}

fn spawn_with_controller<F, Fut>(operation: F) -> bool
where
    F: FnOnce(Arc<PaginationController>) -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
{
    let guard = lock_state();
    let Some(state) = guard.as_ref() else {
        return false;
    };
    state
        .tokio_rt
        .spawn(operation(state.controller.clone()));
    true
}

// The lock is released before any network call.
fn accounts() -> Option<Arc<AccountClient<HttpAccountSource>>> {
    lock_state().as_ref().map(|state| state.accounts.clone())
}

unsafe fn read_credentials(email: *const c_char, password: *const c_char) -> Option<Credentials> {
    let email = unsafe { read_c_str(email) }?;
    let password = unsafe { read_c_str(password) }?;
    Some(Credentials::new(email, password))
}

unsafe fn read_c_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

fn to_json_c_string<T: Serialize>(value: &T) -> *mut c_char {
    let json = match serde_json::to_string(value) {
        Ok(json) => json,
        Err(error) => {
            tracing::error!(%error, "failed to encode state as JSON");
            return std::ptr::null_mut();
        }
    };

    match CString::new(json) {
        Ok(c) => c.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}
