//! service
//!
//! Orchestration layer for registrar operations.
//!
//! # Architecture
//!
//! Every mutating operation follows a uniform lifecycle:
//!
//! ```text
//! Validate fields -> Resolve referenced ids -> Guard (cycle check or
//! exclusive lease) -> Persist -> Update caches
//! ```
//!
//! All four error kinds are raised before any persistence side effect for
//! the failing operation; no operation leaves a partially applied mutation.
//!
//! # Modules
//!
//! - [`courses`] - Catalog CRUD, instructor assignment, prerequisite edges
//! - [`instructors`] - Roster CRUD under per-record leases, cached reads
//! - [`enrollments`] - Enrollment lifecycle with pair uniqueness
//! - [`validate`] - Field-level validation helpers
//!
//! # Concurrency
//!
//! Services are cheap to clone and safe to share across threads; each clone
//! sees the same store, lease table, and caches. The only blocking point is
//! lease acquisition in the instructor mutation path.

pub mod courses;
pub mod enrollments;
pub mod instructors;
pub mod validate;

use std::sync::Arc;

use thiserror::Error;

pub use courses::{CourseService, CourseSnapshot, CreateCourse, UpdateCourse};
pub use enrollments::EnrollmentService;
pub use instructors::{CreateInstructor, InstructorService, UpdateInstructor};

use crate::config::RegistrarConfig;
use crate::core::lease::LeaseError;
use crate::store::{RecordStore, StoreError};

/// Errors surfaced by the service layer.
///
/// The four kinds map one-to-one onto the collaborator contract: client
/// error, not found, conflicting state, and lock timeout.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// Missing or malformed required input. No mutation performed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A referenced identifier or natural key does not resolve.
    #[error("{entity} not found: {key}")]
    NotFound {
        /// Entity kind ("course", "instructor", ...).
        entity: &'static str,
        /// The identifier or natural key that failed to resolve.
        key: String,
    },

    /// The request conflicts with existing state: a duplicate unique field,
    /// a duplicate enrollment pair, a prerequisite edge that would close a
    /// cycle, or deletion of a still-referenced record. No mutation
    /// performed.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The exclusive lease was not obtained within the configured bound.
    ///
    /// Distinct from [`ServiceError::NotFound`]; the record exists but is
    /// busy. The caller may retry; no persisted side effect occurred.
    #[error("instructor {id} is locked by another operation (waited {waited_ms}ms)")]
    LockTimeout {
        /// The contended record identifier.
        id: u64,
        /// How long the caller waited before giving up.
        waited_ms: u64,
    },
}

impl ServiceError {
    /// Whether the operation may simply be retried by the caller.
    ///
    /// Only lock timeouts are transient; the other kinds need a changed
    /// request or changed state first.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ServiceError::LockTimeout { .. })
    }

    pub(crate) fn not_found(entity: &'static str, key: impl ToString) -> Self {
        ServiceError::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub(crate) fn lock_timeout(id: u64, error: LeaseError) -> Self {
        match error {
            LeaseError::Timeout { waited_ms } => ServiceError::LockTimeout { id, waited_ms },
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound { entity, id } => ServiceError::NotFound {
                entity,
                key: id.to_string(),
            },
            StoreError::Duplicate { field, value } => {
                ServiceError::Conflict(format!("duplicate {field}: '{value}'"))
            }
            StoreError::PrerequisiteCycle {
                course,
                prerequisite,
            } => ServiceError::Conflict(format!(
                "course {course} cannot require course {prerequisite}: the edge would create a cycle"
            )),
        }
    }
}

impl From<crate::core::types::TypeError> for ServiceError {
    fn from(error: crate::core::types::TypeError) -> Self {
        ServiceError::Validation(error.to_string())
    }
}

/// The assembled registrar backend: one store, three services.
///
/// # Example
///
/// ```
/// use registrar::service::{CreateCourse, Registrar};
///
/// let registrar = Registrar::new();
/// let course = registrar
///     .courses()
///     .create(CreateCourse {
///         name: "Algorithms".to_string(),
///         code: "CS-301".to_string(),
///         credits: 6,
///         instructor_id: None,
///     })
///     .unwrap();
///
/// assert_eq!(registrar.courses().get(course.id).unwrap().code.as_str(), "CS-301");
/// ```
#[derive(Debug, Clone)]
pub struct Registrar {
    store: Arc<RecordStore>,
    courses: CourseService,
    instructors: InstructorService,
    enrollments: EnrollmentService,
}

impl Default for Registrar {
    fn default() -> Self {
        Self::new()
    }
}

impl Registrar {
    /// Build a registrar with default configuration.
    pub fn new() -> Self {
        Self::with_config(&RegistrarConfig::default())
    }

    /// Build a registrar with explicit configuration.
    pub fn with_config(config: &RegistrarConfig) -> Self {
        let store = Arc::new(RecordStore::new());
        Self {
            courses: CourseService::new(Arc::clone(&store)),
            instructors: InstructorService::new(Arc::clone(&store), &config.lease),
            enrollments: EnrollmentService::new(Arc::clone(&store)),
            store,
        }
    }

    /// The course catalog service.
    pub fn courses(&self) -> &CourseService {
        &self.courses
    }

    /// The instructor roster service.
    pub fn instructors(&self) -> &InstructorService {
        &self.instructors
    }

    /// The enrollment service.
    pub fn enrollments(&self) -> &EnrollmentService {
        &self.enrollments
    }

    /// Direct access to the persistence collaborator.
    pub fn store(&self) -> &RecordStore {
        &self.store
    }
}
