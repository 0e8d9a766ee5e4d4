//! Form controllers.
//!
//! Each form gathers its field values into a plain struct, validates them
//! without touching the network, and only then submits through the
//! [`HttpClient`](crate::http::HttpClient).

mod login;
mod profile;
mod recipe;
mod register;

pub use login::{LoginController, LoginForm, LOGIN_TIMEOUT};
pub use profile::{ChangePasswordController, PasswordForm, ProfileEditController, ProfileForm};
pub use recipe::{RecipeController, RecipeForm, RecipeMode};
pub use register::{RegisterController, RegisterForm};

use async_trait::async_trait;
use thiserror::Error;

use crate::error::ApiError;
use crate::image::AttachmentError;
use crate::validation::FieldError;

pub const FIX_ERRORS: &str = "Please fix the errors before submitting";
pub const TIMED_OUT: &str = "Request timed out. Please try again.";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubmitError {
    /// Local validation failed; nothing was sent.
    #[error("Please fix the errors before submitting")]
    Invalid(Vec<FieldError>),

    #[error(transparent)]
    Attachment(#[from] AttachmentError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl SubmitError {
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            SubmitError::Invalid(errors) => errors,
            _ => &[],
        }
    }
}

/// Shared shape of every form.
#[async_trait]
pub trait FormController: Send {
    type Output: Send;

    /// Every failing field, in form order. Pure: reads field values only.
    fn validate(&self) -> Vec<FieldError>;

    /// Validate, then send. On validation failure no request is made.
    async fn submit(&mut self) -> Result<Self::Output, SubmitError>;
}

/// Which dynamic list an [`EntryList`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Ingredient,
    Instruction,
}

impl EntryKind {
    pub fn field(&self) -> &'static str {
        match self {
            EntryKind::Ingredient => "ingredients",
            EntryKind::Instruction => "instructions",
        }
    }

    pub fn required_message(&self) -> &'static str {
        match self {
            EntryKind::Ingredient => "At least one ingredient is required",
            EntryKind::Instruction => "At least one instruction step is required",
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryListError {
    #[error("{}", .0.required_message())]
    LastEntry(EntryKind),

    #[error("No entry at position {0}")]
    OutOfRange(usize),
}

/// Ingredient or instruction inputs. Never holds fewer than one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryList {
    kind: EntryKind,
    entries: Vec<String>,
}

impl EntryList {
    /// A list with a single blank input.
    pub fn new(kind: EntryKind) -> Self {
        Self {
            kind,
            entries: vec![String::new()],
        }
    }

    pub fn from_entries(kind: EntryKind, entries: Vec<String>) -> Self {
        if entries.is_empty() {
            return Self::new(kind);
        }
        Self { kind, entries }
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn push(&mut self, value: impl Into<String>) {
        self.entries.push(value.into());
    }

    pub fn set(&mut self, index: usize, value: impl Into<String>) -> Result<(), EntryListError> {
        let slot = self
            .entries
            .get_mut(index)
            .ok_or(EntryListError::OutOfRange(index))?;
        *slot = value.into();
        Ok(())
    }

    /// Remove one input. Removing the only remaining input is refused.
    pub fn remove(&mut self, index: usize) -> Result<String, EntryListError> {
        if index >= self.entries.len() {
            return Err(EntryListError::OutOfRange(index));
        }
        if self.entries.len() == 1 {
            return Err(EntryListError::LastEntry(self.kind));
        }
        Ok(self.entries.remove(index))
    }

    /// Raw inputs, blanks included.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Trimmed, non-blank values in order.
    pub fn values(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| e.trim())
            .filter(|e| !e.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn validate(&self) -> Option<FieldError> {
        self.values()
            .is_empty()
            .then(|| FieldError::new(self.kind.field(), self.kind.required_message()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_entry_cannot_be_removed() {
        let mut list = EntryList::new(EntryKind::Ingredient);
        list.push("salt");
        assert_eq!(list.remove(0).unwrap(), "");
        let err = list.remove(0).unwrap_err();
        assert_eq!(err.to_string(), "At least one ingredient is required");
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_length_never_drops_below_one() {
        let mut list = EntryList::from_entries(
            EntryKind::Instruction,
            vec!["a".into(), "b".into(), "c".into()],
        );
        for _ in 0..10 {
            let _ = list.remove(0);
            assert!(list.len() >= 1);
        }
        assert_eq!(list.entries(), ["c"]);
        assert_eq!(
            list.remove(0),
            Err(EntryListError::LastEntry(EntryKind::Instruction))
        );
    }

    #[test]
    fn test_values_skip_blanks() {
        let list = EntryList::from_entries(
            EntryKind::Ingredient,
            vec![" 2 eggs ".into(), "   ".into(), "milk".into()],
        );
        assert_eq!(list.values(), vec!["2 eggs", "milk"]);
        assert!(list.validate().is_none());
    }

    #[test]
    fn test_blank_list_fails_validation() {
        let list = EntryList::from_entries(EntryKind::Instruction, vec![]);
        assert_eq!(list.len(), 1);
        let error = list.validate().unwrap();
        assert_eq!(error.field, "instructions");
        assert_eq!(error.message, "At least one instruction step is required");
    }

    #[test]
    fn test_set_out_of_range() {
        let mut list = EntryList::new(EntryKind::Ingredient);
        assert_eq!(list.set(3, "x"), Err(EntryListError::OutOfRange(3)));
    }
}
