//! model::student
//!
//! Minimal student record.
//!
//! Students exist here so enrollment referential checks have something to
//! resolve against; the full student subsystem lives outside this crate.

use serde::{Deserialize, Serialize};

use crate::core::types::StudentId;

/// A student known to the registrar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Store-assigned identifier.
    pub id: StudentId,
    pub first_name: String,
    pub last_name: String,
}
