//! Field validation rules shared by every form.
//!
//! Validators are pure: they look at strings and return messages, never
//! touching the session or the network.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid email regex"));

static USERNAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("Invalid username regex"));

pub const REQUIRED: &str = "This field is required";
pub const USERNAME_RULES: &str =
    "Username must be 3-80 characters and contain only letters, numbers, and underscores";
pub const PASSWORD_RULES: &str = "Password must be at least 8 characters with letters and numbers";
pub const INVALID_EMAIL: &str = "Please enter a valid email address";
pub const PASSWORDS_DIFFER: &str = "Passwords do not match";
pub const TITLE_TOO_SHORT: &str = "Title must be at least 3 characters long";
pub const SERVINGS_RANGE: &str = "Servings must be between 1 and 50";
pub const TIME_RANGE: &str = "Time must be between 0 and 600 minutes";
pub const INVALID_URL: &str = "Please enter a valid URL";

/// A message attached to one form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Accumulates field errors so a form reports all of them at once.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    /// Record `rule`'s message, if any, against `field`.
    pub fn check(&mut self, field: &'static str, rule: Option<&str>) {
        if let Some(message) = rule {
            self.error(field, message);
        }
    }

    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    pub fn finish(self) -> Vec<FieldError> {
        self.errors
    }
}

pub fn validate_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// At least 8 characters with at least one ASCII letter and one digit.
pub fn validate_password(password: &str) -> bool {
    password.chars().count() >= 8
        && password.chars().any(|c| c.is_ascii_alphabetic())
        && password.chars().any(|c| c.is_ascii_digit())
}

/// 3 to 80 characters, letters, digits and underscores only.
pub fn validate_username(username: &str) -> bool {
    let len = username.chars().count();
    (3..=80).contains(&len) && USERNAME_REGEX.is_match(username)
}

pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub fn required(value: &str) -> Option<&'static str> {
    is_blank(value).then_some(REQUIRED)
}

pub fn title(value: &str) -> Option<&'static str> {
    (value.trim().chars().count() < 3).then_some(TITLE_TOO_SHORT)
}

/// Servings must be an integer in 1..=50.
pub fn servings(value: &str) -> Option<&'static str> {
    match value.trim().parse::<i64>() {
        Ok(n) if (1..=50).contains(&n) => None,
        _ => Some(SERVINGS_RANGE),
    }
}

/// Optional minutes in 0..=600; blank passes.
pub fn minutes(value: &str) -> Option<&'static str> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    match value.parse::<i64>() {
        Ok(n) if (0..=600).contains(&n) => None,
        _ => Some(TIME_RANGE),
    }
}

/// Optional absolute URL; blank passes.
pub fn absolute_url(value: &str) -> Option<&'static str> {
    let value = value.trim();
    if value.is_empty() || url::Url::parse(value).is_ok() {
        None
    } else {
        Some(INVALID_URL)
    }
}

/// Parse an optional non-negative integer field. Blank or invalid yields `None`.
pub fn parse_minutes(value: &str) -> Option<u32> {
    value.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_rule() {
        assert!(validate_password("admin123"));
        assert!(!validate_password("admin12"));
        assert!(!validate_password("12345678"));
        assert!(!validate_password("abcdefgh"));
        assert!(validate_password("пароль99x"));
    }

    #[test]
    fn test_password_rule_is_exact() {
        let samples = [
            "", "a1", "abcdefg1", "ABCDEFG1", "________", "1234567a", "a_b_c_d_1", "aaaaaaaaaa",
            "9999999999", "ab cd 12", "Ünïcödé1",
        ];
        for p in samples {
            let expected = p.chars().count() >= 8
                && p.chars().any(|c| c.is_ascii_alphabetic())
                && p.chars().any(|c| c.is_ascii_digit());
            assert_eq!(validate_password(p), expected, "{:?}", p);
        }
    }

    #[test]
    fn test_username_rule() {
        assert!(validate_username("abc"));
        assert!(validate_username("chef_99"));
        assert!(validate_username(&"a".repeat(80)));
        assert!(!validate_username(&"a".repeat(81)));
        assert!(!validate_username("ab"));
        assert!(!validate_username("has space"));
        assert!(!validate_username("dash-name"));
        assert!(!validate_username("émile"));
    }

    #[test]
    fn test_email_rule() {
        assert!(validate_email("admin@tastyshare.com"));
        assert!(!validate_email("admin@tastyshare"));
        assert!(!validate_email("admin tastyshare.com"));
        assert!(!validate_email("a b@c.d"));
    }

    #[test]
    fn test_field_rules() {
        assert_eq!(required("  "), Some(REQUIRED));
        assert_eq!(required(" x "), None);
        assert_eq!(title("Pi"), Some(TITLE_TOO_SHORT));
        assert_eq!(title("Pie"), None);
        assert_eq!(servings("0"), Some(SERVINGS_RANGE));
        assert_eq!(servings("50"), None);
        assert_eq!(servings("51"), Some(SERVINGS_RANGE));
        assert_eq!(servings("four"), Some(SERVINGS_RANGE));
        assert_eq!(minutes(""), None);
        assert_eq!(minutes("600"), None);
        assert_eq!(minutes("601"), Some(TIME_RANGE));
        assert_eq!(minutes("-1"), Some(TIME_RANGE));
        assert_eq!(absolute_url(""), None);
        assert_eq!(absolute_url("https://youtu.be/x"), None);
        assert_eq!(absolute_url("youtu.be/x"), Some(INVALID_URL));
    }

    #[test]
    fn test_validator_collects_everything() {
        let mut v = Validator::new();
        v.check("title", title(""));
        v.check("servings", servings(""));
        v.check("video-url", absolute_url("https://ok.example"));
        assert!(v.has("title"));
        let errors = v.finish();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[1], FieldError::new("servings", SERVINGS_RANGE));
    }
}
