//! Single-slot toast notifications.

use std::sync::Mutex;

/// Default toast title.
pub const DEFAULT_TITLE: &str = "TastyShare";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Info,
    Warning,
    Error,
}

impl ToastKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToastKind::Success => "success",
            ToastKind::Info => "info",
            ToastKind::Warning => "warning",
            ToastKind::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub title: String,
    pub message: String,
}

/// Holds at most one toast; showing a new one replaces the old one.
#[derive(Default)]
pub struct Notifier {
    slot: Mutex<Option<Toast>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&self, kind: ToastKind, message: impl Into<String>) {
        let toast = Toast {
            kind,
            title: DEFAULT_TITLE.to_string(),
            message: message.into(),
        };
        tracing::debug!(kind = kind.as_str(), message = %toast.message, "toast");
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = Some(toast);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.show(ToastKind::Success, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.show(ToastKind::Info, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.show(ToastKind::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.show(ToastKind::Error, message);
    }

    /// Currently displayed toast.
    pub fn current(&self) -> Option<Toast> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Remove and return the displayed toast.
    pub fn take(&self) -> Option<Toast> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner()).take()
    }
}
