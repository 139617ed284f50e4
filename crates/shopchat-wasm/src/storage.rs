use shopchat_chat::HandoffStore;
use wasm_bindgen::JsValue;
use web_sys::Storage;

/// `sessionStorage` of the current tab
pub struct SessionStorageStore {
    storage: Storage,
}

impl SessionStorageStore {
    pub fn open() -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
        let storage = window
            .session_storage()?
            .ok_or_else(|| JsValue::from_str("sessionStorage is not available"))?;
        Ok(Self { storage })
    }
}

impl HandoffStore for SessionStorageStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.storage.get_item(key) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("sessionStorage read of {} failed: {:?}", key, e);
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) {
        if let Err(e) = self.storage.set_item(key, value) {
            log::warn!("sessionStorage write of {} failed: {:?}", key, e);
        }
    }

    fn remove(&self, key: &str) {
        if let Err(e) = self.storage.remove_item(key) {
            log::warn!("sessionStorage removal of {} failed: {:?}", key, e);
        }
    }
}
