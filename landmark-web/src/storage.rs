//! `localStorage`-backed preferences.
use landmark_core::PreferenceStore;

use crate::dom;

/// Reads and writes go straight to `window.localStorage`. Storage failures
/// (private mode, quota) are logged and otherwise ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocalStoragePreferences;

impl PreferenceStore for LocalStoragePreferences {
    fn get(&self, key: &str) -> Option<String> {
        dom::local_storage()
            .ok()
            .and_then(|storage| storage.get_item(key).ok().flatten())
    }

    fn set(&self, key: &str, value: &str) {
        let result = dom::local_storage()
            .and_then(|storage| storage.set_item(key, value).map_err(dom::DomError::from));
        if let Err(err) = result {
            log::warn!("could not persist preference '{key}': {err}");
        }
    }
}
