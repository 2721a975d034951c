//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`CourseId`], [`InstructorId`], [`StudentId`], [`EnrollmentId`] - Record identifiers
//! - [`CourseCode`] - Validated unique course code
//! - [`EmployeeNumber`] - Validated unique employee number
//! - [`Email`] - Validated contact email
//!
//! # Validation
//!
//! Natural-key types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs. Identifiers are
//! plain integers assigned by the store and carry no validation of their own.
//!
//! # Examples
//!
//! ```
//! use registrar::core::types::{CourseCode, Email, EmployeeNumber};
//!
//! // Valid constructions (codes and employee numbers normalize to uppercase)
//! let code = CourseCode::new("cs-101").unwrap();
//! assert_eq!(code.as_str(), "CS-101");
//!
//! let email = Email::new("Ada@Example.edu").unwrap();
//! assert_eq!(email.as_str(), "ada@example.edu");
//!
//! // Invalid constructions fail at creation time
//! assert!(CourseCode::new("").is_err());
//! assert!(EmployeeNumber::new("no spaces").is_err());
//! assert!(Email::new("not-an-email").is_err());
//! ```

use std::sync::OnceLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid course code: {0}")]
    InvalidCourseCode(String),

    #[error("invalid employee number: {0}")]
    InvalidEmployeeNumber(String),

    #[error("invalid email: {0}")]
    InvalidEmail(String),
}

macro_rules! record_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wrap a raw store-assigned identifier.
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Get the raw identifier value.
            pub const fn value(self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }
    };
}

record_id! {
    /// Identifier of a course record, assigned by the store at creation.
    CourseId
}

record_id! {
    /// Identifier of an instructor record, assigned by the store at creation.
    InstructorId
}

record_id! {
    /// Identifier of a student record, assigned by the store at creation.
    StudentId
}

record_id! {
    /// Identifier of an enrollment record, assigned by the store at creation.
    EnrollmentId
}

/// A validated course code.
///
/// Codes are the natural key of a course and are unique across the catalog.
/// They are normalized to uppercase:
///
/// - 2 to 16 characters
/// - Starts with a letter
/// - Letters, digits, and `-` only
///
/// # Example
///
/// ```
/// use registrar::core::types::CourseCode;
///
/// let code = CourseCode::new("mat-201").unwrap();
/// assert_eq!(code.as_str(), "MAT-201");
///
/// assert!(CourseCode::new("1A").is_err());
/// assert!(CourseCode::new("TOO-LONG-FOR-A-CODE").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CourseCode(String);

impl CourseCode {
    /// Create a new validated course code, normalized to uppercase.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidCourseCode` if the code does not match the
    /// expected shape.
    pub fn new(code: impl Into<String>) -> Result<Self, TypeError> {
        let code = code.into().to_ascii_uppercase();
        if !code_pattern().is_match(&code) {
            return Err(TypeError::InvalidCourseCode(format!(
                "'{}' must be 2-16 chars, start with a letter, and contain only letters, digits, and '-'",
                code
            )));
        }
        Ok(Self(code))
    }

    /// Get the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A validated employee number.
///
/// Employee numbers are the natural key of an instructor and are unique
/// across the faculty roster. They are normalized to uppercase:
///
/// - 1 to 20 characters
/// - Letters, digits, and `-` only
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmployeeNumber(String);

impl EmployeeNumber {
    /// Create a new validated employee number, normalized to uppercase.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidEmployeeNumber` if the value does not match
    /// the expected shape.
    pub fn new(number: impl Into<String>) -> Result<Self, TypeError> {
        let number = number.into().to_ascii_uppercase();
        if !employee_number_pattern().is_match(&number) {
            return Err(TypeError::InvalidEmployeeNumber(format!(
                "'{}' must be 1-20 chars of letters, digits, and '-'",
                number
            )));
        }
        Ok(Self(number))
    }

    /// Get the employee number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A validated contact email, normalized to lowercase.
///
/// The check is a shape check (`local@domain.tld`), not a deliverability
/// check.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Create a new validated email, normalized to lowercase.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidEmail` if the value is not shaped like an
    /// email address.
    pub fn new(email: impl Into<String>) -> Result<Self, TypeError> {
        let email = email.into().to_ascii_lowercase();
        if !email_pattern().is_match(&email) {
            return Err(TypeError::InvalidEmail(format!(
                "'{}' is not a valid email address",
                email
            )));
        }
        Ok(Self(email))
    }

    /// Get the email as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z][A-Z0-9-]{1,15}$").unwrap())
}

fn employee_number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z0-9][A-Z0-9-]{0,19}$").unwrap())
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}$").unwrap())
}

macro_rules! string_newtype_conversions {
    ($name:ident) => {
        impl TryFrom<String> for $name {
            type Error = TypeError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::new(s)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_newtype_conversions!(CourseCode);
string_newtype_conversions!(EmployeeNumber);
string_newtype_conversions!(Email);
