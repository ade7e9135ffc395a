//! Durable client preferences. The only one is the tutorial flag.
use std::cell::RefCell;
use std::collections::HashMap;

pub const TUTORIAL_COMPLETED_KEY: &str = "land-tutorial-completed";

/// Key/value preference storage. Platform-specific implementations should
/// provide this (the web shell uses `localStorage`).
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);

    fn tutorial_completed(&self) -> bool {
        self.get(TUTORIAL_COMPLETED_KEY)
            .is_some_and(|v| v == "true")
    }

    fn mark_tutorial_completed(&self) {
        self.set(TUTORIAL_COMPLETED_KEY, "true");
    }
}

/// In-process store for tests and native tools.
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: RefCell<HashMap<String, String>>,
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tutorial_flag_round_trips() {
        let prefs = MemoryPreferences::default();
        assert!(!prefs.tutorial_completed());
        prefs.mark_tutorial_completed();
        assert!(prefs.tutorial_completed());
        assert_eq!(prefs.get(TUTORIAL_COMPLETED_KEY).as_deref(), Some("true"));
    }
}
