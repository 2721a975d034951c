//! store
//!
//! Persistence collaborator for the registrar.
//!
//! # Architecture
//!
//! The store is the **single doorway** to persisted records. Services never
//! hold references into it; every read hands out an owned snapshot and every
//! mutation is atomic with respect to other store calls.
//!
//! The store owns the authoritative prerequisite edge index (a
//! [`crate::core::graph::CourseGraph`]): cycle checks run against a snapshot
//! taken at call time, and the edge insert re-verifies acyclicity under the
//! store's own lock so no interleaving of concurrent adds can persist a
//! cycle.
//!
//! # Modules
//!
//! - [`memory`] - The in-memory [`RecordStore`]

pub mod memory;

use chrono::NaiveDate;
use thiserror::Error;

pub use memory::RecordStore;

use crate::core::types::{CourseCode, CourseId, Email, EmployeeNumber, InstructorId, StudentId};
use crate::model::InstructorStatus;

/// Errors from store operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The referenced identifier does not resolve to a record.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind ("course", "instructor", ...).
        entity: &'static str,
        /// The raw identifier that failed to resolve.
        id: u64,
    },

    /// A unique field collided with an existing record.
    #[error("duplicate {field}: '{value}'")]
    Duplicate {
        /// The unique field ("course code", "email", ...).
        field: &'static str,
        /// The colliding value.
        value: String,
    },

    /// The requested prerequisite edge would close a cycle.
    ///
    /// Raised by the store's own re-check at insert time; nothing is
    /// persisted when this is returned.
    #[error("course {course} cannot require course {prerequisite}: the edge would create a cycle")]
    PrerequisiteCycle {
        course: CourseId,
        prerequisite: CourseId,
    },
}

/// Fields for a course to be created; the store assigns the identifier.
#[derive(Debug, Clone)]
pub struct NewCourse {
    pub name: String,
    pub code: CourseCode,
    pub credits: u8,
    pub instructor_id: Option<InstructorId>,
}

/// Fields for an instructor to be created; the store assigns the identifier.
#[derive(Debug, Clone)]
pub struct NewInstructor {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub birth_date: NaiveDate,
    pub employee_number: EmployeeNumber,
    pub department: String,
    pub status: InstructorStatus,
    pub created_by: String,
    pub created_at: NaiveDate,
}

/// Fields for a student to be created; the store assigns the identifier.
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub first_name: String,
    pub last_name: String,
}

/// Fields for an enrollment to be created; the store assigns the identifier.
#[derive(Debug, Clone)]
pub struct NewEnrollment {
    pub student_id: StudentId,
    pub course_id: CourseId,
    pub enrolled_on: NaiveDate,
}
