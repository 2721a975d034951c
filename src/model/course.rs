//! model::course
//!
//! Catalog course record.

use serde::{Deserialize, Serialize};

use crate::core::types::{CourseCode, CourseId, InstructorId};

/// A course in the catalog.
///
/// The record carries only the course's own fields. Prerequisite edges are
/// owned by the store's graph index and exposed on read through
/// [`crate::service::courses::CourseSnapshot`]; a course value never points
/// at other course values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Store-assigned identifier, immutable once assigned.
    pub id: CourseId,
    /// Display name, non-blank, at most 100 characters.
    pub name: String,
    /// Unique natural key.
    pub code: CourseCode,
    /// Credit count, 1 to 20.
    pub credits: u8,
    /// Assigned instructor, if any.
    pub instructor_id: Option<InstructorId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_roundtrip() {
        let course = Course {
            id: CourseId::new(3),
            name: "Linear Algebra".to_string(),
            code: CourseCode::new("MAT-201").unwrap(),
            credits: 6,
            instructor_id: Some(InstructorId::new(9)),
        };

        let json = serde_json::to_string(&course).unwrap();
        let parsed: Course = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, course);
    }
}
