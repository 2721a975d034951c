//! model::instructor
//!
//! Faculty record with status and lifecycle fields.
//!
//! # Invariants
//!
//! - Instructors are the shared mutable record of the system: every field
//!   change goes through the service layer while the record's exclusive
//!   lease is held
//! - Deactivation sets the status and all deactivation lifecycle fields in
//!   one step; a record is never observable with only some of them set

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::{Email, EmployeeNumber, InstructorId};

/// Error for unrecognized status or reason values.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown {field} value: '{value}'")]
pub struct ParseFieldError {
    field: &'static str,
    value: String,
}

/// Instructor lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstructorStatus {
    Active,
    Inactive,
}

impl InstructorStatus {
    /// Whether this is the active status.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

impl std::fmt::Display for InstructorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
        }
    }
}

impl std::str::FromStr for InstructorStatus {
    type Err = ParseFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(ParseFieldError {
                field: "status",
                value: other.to_string(),
            }),
        }
    }
}

/// Why an instructor was deactivated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeactivationReason {
    Resignation,
    Retirement,
    Dismissal,
}

impl std::fmt::Display for DeactivationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Resignation => write!(f, "resignation"),
            Self::Retirement => write!(f, "retirement"),
            Self::Dismissal => write!(f, "dismissal"),
        }
    }
}

impl std::str::FromStr for DeactivationReason {
    type Err = ParseFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "resignation" => Ok(Self::Resignation),
            "retirement" => Ok(Self::Retirement),
            "dismissal" => Ok(Self::Dismissal),
            other => Err(ParseFieldError {
                field: "deactivation reason",
                value: other.to_string(),
            }),
        }
    }
}

/// An instructor record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instructor {
    /// Store-assigned identifier, immutable once assigned.
    pub id: InstructorId,
    pub first_name: String,
    pub last_name: String,
    /// Unique contact email.
    pub email: Email,
    pub birth_date: NaiveDate,
    /// Unique natural key.
    pub employee_number: EmployeeNumber,
    pub department: String,
    pub status: InstructorStatus,

    /// Who created the record.
    pub created_by: String,
    pub created_at: NaiveDate,
    pub modified_by: Option<String>,
    pub modified_at: Option<NaiveDate>,
    pub deactivated_by: Option<String>,
    pub deactivated_at: Option<NaiveDate>,
    pub deactivation_reason: Option<DeactivationReason>,
}

impl Instructor {
    /// Whether the instructor is currently active.
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Record a modification by `actor` on `date`.
    pub fn touch_modified(&mut self, actor: &str, date: NaiveDate) {
        self.modified_by = Some(actor.to_string());
        self.modified_at = Some(date);
    }

    /// Deactivate the record.
    ///
    /// Sets the status and all deactivation lifecycle fields together, so a
    /// reader can never observe a partially deactivated record.
    pub fn deactivate(&mut self, reason: DeactivationReason, actor: &str, date: NaiveDate) {
        self.status = InstructorStatus::Inactive;
        self.deactivated_by = Some(actor.to_string());
        self.deactivated_at = Some(date);
        self.deactivation_reason = Some(reason);
    }
}
