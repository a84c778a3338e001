//! Form input validation.
//!
//! Each form checks its rules in a fixed order and reports the first
//! failure, so the user sees one actionable message at a time.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::model::NewErrorRecord;

/// Category names offered as suggestions when adding a record.
pub const SUGGESTED_CATEGORIES: &[&str] = &[
    "development",
    "english",
    "design",
    "database",
    "api",
    "testing",
];

/// Suggested categories not already in `used`, in suggestion order.
#[must_use]
pub fn unused_suggestions(used: &[&str]) -> Vec<&'static str> {
    SUGGESTED_CATEGORIES
        .iter()
        .copied()
        .filter(|s| !used.contains(s))
        .collect()
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+$").expect("Invalid email pattern"))
}

/// Sign-up form input.
#[derive(Debug, Clone, Default)]
pub struct SignUpForm {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Chosen password.
    pub password: String,
    /// Password typed a second time.
    pub confirm_password: String,
}

impl SignUpForm {
    /// Check the form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the first field that fails.
    pub fn validate(&self, min_password_length: usize) -> Result<()> {
        if self.name.is_empty()
            || self.email.is_empty()
            || self.password.is_empty()
            || self.confirm_password.is_empty()
        {
            return Err(Error::validation("form", "Please fill in all fields"));
        }
        if !email_pattern().is_match(&self.email) {
            return Err(Error::validation(
                "email",
                "Please enter a valid email address",
            ));
        }
        if self.password != self.confirm_password {
            return Err(Error::validation("confirm_password", "Passwords do not match"));
        }
        if self.password.chars().count() < min_password_length {
            return Err(Error::validation(
                "password",
                format!("Password must be at least {min_password_length} characters"),
            ));
        }
        Ok(())
    }
}

/// Sign-in form input.
#[derive(Debug, Clone, Default)]
pub struct SignInForm {
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
}

impl SignInForm {
    /// Check the form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if either field is empty.
    pub fn validate(&self) -> Result<()> {
        if self.email.is_empty() || self.password.is_empty() {
            return Err(Error::validation("form", "Please fill in all fields"));
        }
        Ok(())
    }
}

/// Check the required fields of a new record.
///
/// # Errors
///
/// Returns [`Error::Validation`] if the title or description is blank.
pub fn validate_new_record(record: &NewErrorRecord) -> Result<()> {
    check_required("title", &record.title)?;
    check_required("description", &record.description)
}

/// Check that a required text field is not blank.
///
/// # Errors
///
/// Returns [`Error::Validation`] naming `field` if `value` is blank.
pub fn check_required(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(
            field,
            "Please fill in at least title and description",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_sign_up() -> SignUpForm {
        SignUpForm {
            name: "Alice".to_string(),
            email: "alice@x.com".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
        }
    }

    fn message(err: &Error) -> String {
        err.to_string()
    }

    #[test]
    fn test_sign_up_valid() {
        assert!(valid_sign_up().validate(6).is_ok());
    }

    #[test]
    fn test_sign_up_missing_field() {
        let form = SignUpForm {
            name: String::new(),
            ..valid_sign_up()
        };
        let err = form.validate(6).unwrap_err();
        assert!(message(&err).contains("Please fill in all fields"));
    }

    #[test]
    fn test_sign_up_password_mismatch() {
        let form = SignUpForm {
            confirm_password: "secret2".to_string(),
            ..valid_sign_up()
        };
        let err = form.validate(6).unwrap_err();
        assert!(message(&err).contains("Passwords do not match"));
    }

    #[test]
    fn test_sign_up_mismatch_reported_before_length() {
        let form = SignUpForm {
            password: "abc".to_string(),
            confirm_password: "abd".to_string(),
            ..valid_sign_up()
        };
        let err = form.validate(6).unwrap_err();
        assert!(message(&err).contains("Passwords do not match"));
    }

    #[test]
    fn test_sign_up_short_password() {
        let form = SignUpForm {
            password: "12345".to_string(),
            confirm_password: "12345".to_string(),
            ..valid_sign_up()
        };
        let err = form.validate(6).unwrap_err();
        assert!(message(&err).contains("at least 6 characters"));
        assert!(SignUpForm {
            password: "123456".to_string(),
            confirm_password: "123456".to_string(),
            ..valid_sign_up()
        }
        .validate(6)
        .is_ok());
    }

    #[test]
    fn test_sign_up_bad_email() {
        for email in ["alice", "alice@", "@x.com", "a lice@x.com"] {
            let form = SignUpForm {
                email: email.to_string(),
                ..valid_sign_up()
            };
            assert!(form.validate(6).is_err(), "{email} accepted");
        }
    }

    #[test]
    fn test_sign_in_requires_both_fields() {
        let form = SignInForm {
            email: "alice@x.com".to_string(),
            password: String::new(),
        };
        assert!(form.validate().unwrap_err().is_validation());
        assert!(SignInForm {
            email: "alice@x.com".to_string(),
            password: "x".to_string(),
        }
        .validate()
        .is_ok());
    }

    #[test]
    fn test_new_record_requires_title_and_description() {
        assert!(validate_new_record(&NewErrorRecord::new("T", "D")).is_ok());
        assert!(validate_new_record(&NewErrorRecord::new("", "D")).is_err());
        assert!(validate_new_record(&NewErrorRecord::new("T", "   ")).is_err());
    }

    #[test]
    fn test_suggested_categories() {
        assert!(SUGGESTED_CATEGORIES.contains(&"database"));
        assert!(!SUGGESTED_CATEGORIES.contains(&"general"));
    }

    #[test]
    fn test_unused_suggestions() {
        assert_eq!(unused_suggestions(&[]), SUGGESTED_CATEGORIES);
        assert_eq!(
            unused_suggestions(&["api", "general", "development"]),
            vec!["english", "design", "database", "testing"]
        );
    }
}
