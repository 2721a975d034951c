//! service::enrollments
//!
//! Enrollment lifecycle.
//!
//! # Design
//!
//! Enrollments carry no shared mutable state, so no lease is involved: two
//! creates race only when they target the same (student, course) pair, and
//! the store's atomic unique-pair insert serializes exactly that case. The
//! service pre-checks the pair for a precise conflict message; the store
//! check is the authoritative one.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use crate::core::types::{CourseId, EnrollmentId, StudentId};
use crate::model::{Enrollment, Student};
use crate::store::{NewEnrollment, NewStudent, RecordStore};

use super::validate::require_not_future;
use super::ServiceError;

/// Enrollment service.
#[derive(Debug, Clone)]
pub struct EnrollmentService {
    store: Arc<RecordStore>,
}

impl EnrollmentService {
    /// Build the service over a shared store.
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self { store }
    }

    /// Enroll a student in a course.
    ///
    /// # Errors
    ///
    /// - `ServiceError::NotFound` if the student or course is unknown
    /// - `ServiceError::Validation` if the date is in the future
    /// - `ServiceError::Conflict` if the (student, course) pair is already
    ///   enrolled, regardless of date
    pub fn create(
        &self,
        student_id: StudentId,
        course_id: CourseId,
        enrolled_on: NaiveDate,
    ) -> Result<Enrollment, ServiceError> {
        if !self.store.student_exists(student_id) {
            return Err(ServiceError::not_found("student", student_id));
        }
        if !self.store.course_exists(course_id) {
            return Err(ServiceError::not_found("course", course_id));
        }
        require_not_future("enrollment date", enrolled_on)?;
        if self
            .store
            .enrollment_for_pair(student_id, course_id)
            .is_some()
        {
            return Err(ServiceError::Conflict(format!(
                "student {student_id} is already enrolled in course {course_id}"
            )));
        }

        let enrollment = self.store.insert_enrollment(NewEnrollment {
            student_id,
            course_id,
            enrolled_on,
        })?;
        info!(student = %student_id, course = %course_id, "enrollment created");
        Ok(enrollment)
    }

    /// Get an enrollment by identifier.
    pub fn get(&self, id: EnrollmentId) -> Result<Enrollment, ServiceError> {
        Ok(self.store.enrollment(id)?)
    }

    /// List all enrollments.
    pub fn list(&self) -> Vec<Enrollment> {
        self.store.list_enrollments()
    }

    /// List all enrollments of one student.
    pub fn list_for_student(&self, student_id: StudentId) -> Vec<Enrollment> {
        self.store.enrollments_for_student(student_id)
    }

    /// Delete an enrollment, freeing its (student, course) pair.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` for an unknown identifier.
    pub fn delete(&self, id: EnrollmentId) -> Result<(), ServiceError> {
        self.store.delete_enrollment(id)?;
        info!(id = %id, "enrollment deleted");
        Ok(())
    }

    /// Register a student record.
    ///
    /// Students are collaborator data here; this exists so referential
    /// checks have something to resolve against.
    pub fn register_student(&self, first_name: &str, last_name: &str) -> Student {
        self.store.insert_student(NewStudent {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        })
    }
}
