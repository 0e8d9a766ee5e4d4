//! Page navigation as an effect seam.
//!
//! Controllers never move between pages themselves; they hand a [`Redirect`]
//! to the shell's [`Navigator`], which decides how to honor the delay.

use std::sync::Mutex;
use std::time::Duration;

/// Login page redirect after a successful login.
pub const LOGIN_REDIRECT_DELAY: Duration = Duration::from_millis(1000);
/// Redirect delay after register, publish, update and delete, so the
/// success toast stays visible.
pub const SUCCESS_REDIRECT_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub path: String,
    pub delay: Duration,
}

impl Redirect {
    pub fn now(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            delay: Duration::ZERO,
        }
    }

    pub fn after(path: impl Into<String>, delay: Duration) -> Self {
        Self {
            path: path.into(),
            delay,
        }
    }

    /// Login page that returns to `return_to` afterwards.
    pub fn to_login(return_to: &str) -> Self {
        let encoded: String = url::form_urlencoded::byte_serialize(return_to.as_bytes()).collect();
        Self::now(format!("/login?redirect={}", encoded))
    }

    /// Detail page of a recipe.
    pub fn is_recipe_detail(&self) -> bool {
        self.path
            .strip_prefix("/recipe/")
            .map(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()))
            .unwrap_or(false)
    }
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, redirect: Redirect);
}

/// Navigator that only remembers where it was asked to go.
#[derive(Default)]
pub struct RecordingNavigator {
    history: Mutex<Vec<Redirect>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<Redirect> {
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn last(&self) -> Option<Redirect> {
        self.history().pop()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, redirect: Redirect) {
        tracing::debug!(
            path = %redirect.path,
            delay_ms = redirect.delay.as_millis() as u64,
            "navigate"
        );
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(redirect);
    }
}

/// Value of the `redirect` query parameter in `query` (with or without the
/// leading `?`), if present and non-empty.
pub fn redirect_param(query: &str) -> Option<String> {
    url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
        .find(|(k, _)| k == "redirect")
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
}
