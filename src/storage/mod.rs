pub(crate) const TOKEN_KEY: &str = "accessToken";
pub(crate) const REDIRECT_KEY: &str = "postLoginRedirect";

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

pub(crate) fn load_item(key: &str) -> Option<String> {
    local_storage()?.get_item(key).ok().flatten()
}

pub(crate) fn save_item(key: &str, value: &str) {
    if let Some(storage) = local_storage() {
        let _ = storage.set_item(key, value);
    }
}

pub(crate) fn remove_item(key: &str) {
    if let Some(storage) = local_storage() {
        let _ = storage.remove_item(key);
    }
}

/// Read and delete in one step.
pub(crate) fn take_item(key: &str) -> Option<String> {
    let value = load_item(key);
    if value.is_some() {
        remove_item(key);
    }
    value
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_take_item_removes_value() {
        save_item(REDIRECT_KEY, "/books/1");
        assert_eq!(take_item(REDIRECT_KEY).as_deref(), Some("/books/1"));
        assert!(load_item(REDIRECT_KEY).is_none());
        assert!(take_item(REDIRECT_KEY).is_none());
    }
}
