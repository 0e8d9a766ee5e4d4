//! Loading-modal lifecycle.
//!
//! A page has one modal slot. [`ModalSlot::open`] returns a guard; the modal
//! is dismissed when the guard is dropped or explicitly dismissed, on every
//! exit path.

use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug)]
pub struct ModalSlot {
    name: &'static str,
    open: AtomicBool,
}

impl ModalSlot {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            open: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    /// Show the modal until the returned guard goes away.
    pub fn open(&self) -> ModalGuard<'_> {
        tracing::debug!(modal = self.name, "modal shown");
        self.open.store(true, Ordering::Release);
        ModalGuard { slot: self }
    }

    fn close(&self) {
        if self.open.swap(false, Ordering::AcqRel) {
            tracing::debug!(modal = self.name, "modal dismissed");
        }
    }
}

#[must_use = "the modal closes as soon as the guard is dropped"]
pub struct ModalGuard<'a> {
    slot: &'a ModalSlot,
}

impl ModalGuard<'_> {
    /// Dismiss now. Equivalent to dropping the guard.
    pub fn dismiss(self) {}
}

impl Drop for ModalGuard<'_> {
    fn drop(&mut self) {
        self.slot.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_dismisses_on_drop() {
        let slot = ModalSlot::new("loading-modal");
        {
            let _guard = slot.open();
            assert!(slot.is_open());
        }
        assert!(!slot.is_open());
    }

    #[test]
    fn test_dismiss_is_explicit_drop() {
        let slot = ModalSlot::new("recipe-loading-modal");
        let guard = slot.open();
        guard.dismiss();
        assert!(!slot.is_open());
    }

    #[test]
    fn test_dismisses_on_early_return() {
        fn submit(slot: &ModalSlot, fail: bool) -> Result<(), &'static str> {
            let _guard = slot.open();
            if fail {
                return Err("network");
            }
            Ok(())
        }

        let slot = ModalSlot::new("loading-modal");
        assert!(submit(&slot, true).is_err());
        assert!(!slot.is_open());
    }
}
