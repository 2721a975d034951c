//! model
//!
//! Entity records persisted by the store.
//!
//! # Modules
//!
//! - [`course`] - Catalog courses (prerequisite edges live in the graph index)
//! - [`instructor`] - Faculty records with status and lifecycle fields
//! - [`enrollment`] - Student-course enrollments
//! - [`student`] - Minimal student records for referential checks

pub mod course;
pub mod enrollment;
pub mod instructor;
pub mod student;

pub use course::Course;
pub use enrollment::Enrollment;
pub use instructor::{DeactivationReason, Instructor, InstructorStatus};
pub use student::Student;
