//! model::enrollment
//!
//! Student-course enrollment record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::types::{CourseId, EnrollmentId, StudentId};

/// An enrollment of one student in one course.
///
/// At most one enrollment exists per (student, course) pair at any time;
/// the store enforces the pair constraint and the service pre-checks it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    /// Store-assigned identifier.
    pub id: EnrollmentId,
    pub student_id: StudentId,
    pub course_id: CourseId,
    /// Enrollment date; never in the future.
    pub enrolled_on: NaiveDate,
}
