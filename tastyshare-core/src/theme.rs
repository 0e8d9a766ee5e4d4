use std::sync::Arc;

use crate::storage::{log_storage_error, LocalStore, DARK_MODE_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn is_dark(&self) -> bool {
        matches!(self, Theme::Dark)
    }

    pub fn toggled(&self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Persisted dark-mode preference.
#[derive(Clone)]
pub struct ThemePreference {
    store: Arc<dyn LocalStore>,
}

impl ThemePreference {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store }
    }

    /// The stored choice, if the user ever made one.
    pub fn saved(&self) -> Option<Theme> {
        match self.store.get(DARK_MODE_KEY)?.as_str() {
            "true" => Some(Theme::Dark),
            "false" => Some(Theme::Light),
            other => {
                tracing::warn!(value = other, "ignoring unknown dark-mode value");
                None
            }
        }
    }

    /// Stored choice, else the system preference.
    pub fn resolve(&self, system_prefers_dark: bool) -> Theme {
        self.saved().unwrap_or(if system_prefers_dark {
            Theme::Dark
        } else {
            Theme::Light
        })
    }

    pub fn set(&self, theme: Theme) {
        let value = if theme.is_dark() { "true" } else { "false" };
        log_storage_error("set", DARK_MODE_KEY, self.store.set(DARK_MODE_KEY, value));
    }

    /// Flip the effective theme and persist it.
    pub fn toggle(&self, system_prefers_dark: bool) -> Theme {
        let next = self.resolve(system_prefers_dark).toggled();
        self.set(next);
        next
    }
}
