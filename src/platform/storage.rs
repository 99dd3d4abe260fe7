//! Key/value JSON storage
//!
//! LocalStorage on wasm32. Native builds keep values in a per-thread map so
//! settings and scores survive for the life of the process.

use serde::Serialize;
use serde::de::DeserializeOwned;

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten()
}

#[cfg(target_arch = "wasm32")]
fn read(key: &str) -> Option<String> {
    local_storage()?.get_item(key).ok()?
}

#[cfg(target_arch = "wasm32")]
fn write(key: &str, value: &str) -> bool {
    local_storage().is_some_and(|s| s.set_item(key, value).is_ok())
}

#[cfg(target_arch = "wasm32")]
pub fn remove(key: &str) {
    if let Some(storage) = local_storage() {
        let _ = storage.remove_item(key);
    }
}

#[cfg(not(target_arch = "wasm32"))]
thread_local! {
    static MEMORY: std::cell::RefCell<std::collections::HashMap<String, String>> =
        std::cell::RefCell::new(std::collections::HashMap::new());
}

#[cfg(not(target_arch = "wasm32"))]
fn read(key: &str) -> Option<String> {
    MEMORY.with(|m| m.borrow().get(key).cloned())
}

#[cfg(not(target_arch = "wasm32"))]
fn write(key: &str, value: &str) -> bool {
    MEMORY.with(|m| m.borrow_mut().insert(key.to_string(), value.to_string()));
    true
}

#[cfg(not(target_arch = "wasm32"))]
pub fn remove(key: &str) {
    MEMORY.with(|m| m.borrow_mut().remove(key));
}

/// Load and decode a value. Missing keys and bad JSON both give None.
pub fn load_json<T: DeserializeOwned>(key: &str) -> Option<T> {
    let json = read(key)?;
    match serde_json::from_str(&json) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Discarding unreadable '{}': {}", key, e);
            None
        }
    }
}

/// Encode and store a value. Returns false if nothing was written.
pub fn save_json<T: Serialize + ?Sized>(key: &str, value: &T) -> bool {
    match serde_json::to_string(value) {
        Ok(json) => {
            let ok = write(key, &json);
            if !ok {
                log::error!("Failed to write '{}'", key);
            }
            ok
        }
        Err(e) => {
            log::error!("Failed to encode '{}': {}", key, e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        assert!(save_json("test_numbers", &vec![1, 2, 3]));
        assert_eq!(load_json::<Vec<i32>>("test_numbers"), Some(vec![1, 2, 3]));
        remove("test_numbers");
        assert_eq!(load_json::<Vec<i32>>("test_numbers"), None);
    }

    #[test]
    fn test_bad_json_is_discarded() {
        write("test_garbage", "{not json");
        assert_eq!(load_json::<Vec<i32>>("test_garbage"), None);
    }
}
