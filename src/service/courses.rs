//! service::courses
//!
//! Catalog operations: course CRUD, instructor assignment, and prerequisite
//! edges.
//!
//! # Architecture
//!
//! The prerequisite write path is the guarded one: both endpoints must
//! resolve, the cycle check runs against a graph snapshot taken at call
//! time, and a positive verdict rejects the edge with nothing persisted.
//! The store repeats the reachability check under its own lock at insert
//! time, so concurrent edge additions can never combine into a cycle; adds
//! on disjoint course pairs proceed in parallel.
//!
//! Collection reads go through the catalog cache; the point lookup by
//! course code is kept current write-through. Edge mutations invalidate the
//! graph-shaped collection snapshots wholesale.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::cache::SnapshotCache;
use crate::core::types::{CourseCode, CourseId, InstructorId};
use crate::model::Course;
use crate::store::{NewCourse, RecordStore};

use super::validate::{require_credits, require_text, MAX_COURSE_NAME_LEN};
use super::ServiceError;

/// Collection query shapes cached for the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogShape {
    /// The full catalog.
    Catalog,
}

/// The transfer representation of a course: record fields plus the
/// prerequisite identifiers materialized from the graph index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSnapshot {
    pub id: CourseId,
    pub name: String,
    pub code: CourseCode,
    pub credits: u8,
    pub instructor_id: Option<InstructorId>,
    /// Identifiers of the courses this course requires, sorted.
    pub prerequisite_ids: Vec<CourseId>,
}

/// Request to create a course.
#[derive(Debug, Clone)]
pub struct CreateCourse {
    pub name: String,
    pub code: String,
    pub credits: u8,
    pub instructor_id: Option<InstructorId>,
}

/// Full-field update of a course record.
#[derive(Debug, Clone)]
pub struct UpdateCourse {
    pub name: String,
    pub code: String,
    pub credits: u8,
}

/// Catalog service.
#[derive(Debug, Clone)]
pub struct CourseService {
    store: Arc<RecordStore>,
    cache: Arc<SnapshotCache<CatalogShape, CourseSnapshot>>,
}

impl CourseService {
    /// Build the service over a shared store.
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self {
            store,
            cache: Arc::new(SnapshotCache::new()),
        }
    }

    // ---- reads ------------------------------------------------------------

    /// List the catalog (read-through cached).
    pub fn list(&self) -> Vec<CourseSnapshot> {
        if let Some(hit) = self.cache.get_collection(&CatalogShape::Catalog) {
            debug!("catalog cache hit");
            return hit;
        }

        let snapshots: Vec<CourseSnapshot> = self
            .store
            .list_courses()
            .into_iter()
            .map(|course| self.snapshot(course))
            .collect();
        self.cache
            .put_collection(CatalogShape::Catalog, snapshots.clone());
        snapshots
    }

    /// Get a course by identifier.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` for an unknown identifier.
    pub fn get(&self, id: CourseId) -> Result<CourseSnapshot, ServiceError> {
        let course = self.store.course(id)?;
        Ok(self.snapshot(course))
    }

    /// Get a course by its unique code (read-through point cache).
    ///
    /// # Errors
    ///
    /// - `ServiceError::Validation` for a malformed code
    /// - `ServiceError::NotFound` if no course carries it
    pub fn get_by_code(&self, code: &str) -> Result<CourseSnapshot, ServiceError> {
        let code = CourseCode::new(code)?;

        if let Some(hit) = self.cache.get_point(code.as_str()) {
            debug!(code = %code, "point cache hit");
            return Ok(hit);
        }

        let course = self
            .store
            .find_course_by_code(&code)
            .ok_or_else(|| ServiceError::not_found("course", &code))?;
        let snapshot = self.snapshot(course);
        self.cache.put_point(code.as_str(), snapshot.clone());
        Ok(snapshot)
    }

    // ---- mutations --------------------------------------------------------

    /// Create a course with empty prerequisite sets.
    ///
    /// # Errors
    ///
    /// - `ServiceError::Validation` for a blank/overlong name, out-of-range
    ///   credits, or malformed code
    /// - `ServiceError::NotFound` if the assigned instructor does not exist
    /// - `ServiceError::Conflict` for a duplicate code
    pub fn create(&self, request: CreateCourse) -> Result<CourseSnapshot, ServiceError> {
        require_text("course name", &request.name, MAX_COURSE_NAME_LEN)?;
        require_credits(request.credits)?;
        let code = CourseCode::new(request.code)?;

        if let Some(instructor_id) = request.instructor_id {
            if !self.store.instructor_exists(instructor_id) {
                return Err(ServiceError::not_found("instructor", instructor_id));
            }
        }

        let created = self.store.insert_course(NewCourse {
            name: request.name,
            code,
            credits: request.credits,
            instructor_id: request.instructor_id,
        })?;

        let snapshot = self.snapshot(created);
        self.write_through(&snapshot, None);
        info!(id = %snapshot.id, code = %snapshot.code, "course created");
        Ok(snapshot)
    }

    /// Apply a full-field update to a course record.
    ///
    /// # Errors
    ///
    /// - `ServiceError::Validation` for malformed fields
    /// - `ServiceError::NotFound` for an unknown identifier
    /// - `ServiceError::Conflict` if the code collides with another course
    pub fn update(
        &self,
        id: CourseId,
        changes: UpdateCourse,
    ) -> Result<CourseSnapshot, ServiceError> {
        require_text("course name", &changes.name, MAX_COURSE_NAME_LEN)?;
        require_credits(changes.credits)?;
        let code = CourseCode::new(changes.code)?;

        let mut course = self.store.course(id)?;
        let previous_code = course.code.clone();

        course.name = changes.name;
        course.code = code;
        course.credits = changes.credits;
        self.store.replace_course(course.clone())?;

        let snapshot = self.snapshot(course);
        let stale_key = (previous_code != snapshot.code).then_some(previous_code);
        self.write_through(&snapshot, stale_key);
        info!(id = %id, "course updated");
        Ok(snapshot)
    }

    /// Assign an instructor to a course.
    ///
    /// # Errors
    ///
    /// - `ServiceError::NotFound` if either identifier is unknown
    /// - `ServiceError::Validation` if the instructor is inactive
    pub fn assign_instructor(
        &self,
        course_id: CourseId,
        instructor_id: InstructorId,
    ) -> Result<CourseSnapshot, ServiceError> {
        let mut course = self.store.course(course_id)?;
        let instructor = self.store.instructor(instructor_id)?;
        if !instructor.is_active() {
            return Err(ServiceError::Validation(format!(
                "instructor {instructor_id} is inactive and cannot be assigned"
            )));
        }

        course.instructor_id = Some(instructor_id);
        self.store.replace_course(course.clone())?;

        let snapshot = self.snapshot(course);
        self.write_through(&snapshot, None);
        info!(course = %course_id, instructor = %instructor_id, "instructor assigned");
        Ok(snapshot)
    }

    /// Probe whether "`course_id` requires `prerequisite_id`" would close a
    /// cycle, without mutating anything.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if either course is unknown; an
    /// unknown course is an input error, not a cycle verdict.
    pub fn would_create_cycle(
        &self,
        course_id: CourseId,
        prerequisite_id: CourseId,
    ) -> Result<bool, ServiceError> {
        let graph = self.store.graph_snapshot();
        graph
            .would_cycle(course_id, prerequisite_id)
            .map_err(|e| match e {
                crate::core::graph::GraphError::UnknownCourse(id) => {
                    ServiceError::not_found("course", id)
                }
            })
    }

    /// Add a prerequisite edge: `course_id` requires `prerequisite_id`.
    ///
    /// A duplicate edge is an idempotent no-op. On success the mutated
    /// course's point entry is written through and the graph-shaped
    /// collection snapshots are invalidated.
    ///
    /// # Errors
    ///
    /// - `ServiceError::NotFound` if either course is unknown
    /// - `ServiceError::Conflict` if the edge would close a cycle; nothing
    ///   is persisted in that case
    pub fn add_prerequisite(
        &self,
        course_id: CourseId,
        prerequisite_id: CourseId,
    ) -> Result<CourseSnapshot, ServiceError> {
        if self.would_create_cycle(course_id, prerequisite_id)? {
            return Err(ServiceError::Conflict(format!(
                "course {course_id} cannot require course {prerequisite_id}: the edge would create a cycle"
            )));
        }

        // The snapshot verdict above may be stale under concurrency; the
        // store re-checks under its own lock before inserting.
        let inserted = self.store.add_prerequisite(course_id, prerequisite_id)?;

        let course = self.store.course(course_id)?;
        let snapshot = self.snapshot(course);
        self.write_through(&snapshot, None);
        info!(
            course = %course_id,
            prerequisite = %prerequisite_id,
            inserted,
            "prerequisite recorded"
        );
        Ok(snapshot)
    }

    /// Delete a course.
    ///
    /// Deletion is rejected while any prerequisite edge (either direction)
    /// or enrollment still references the course.
    ///
    /// # Errors
    ///
    /// - `ServiceError::NotFound` for an unknown identifier
    /// - `ServiceError::Conflict` while the course is still referenced
    pub fn delete(&self, id: CourseId) -> Result<(), ServiceError> {
        let course = self.store.course(id)?;

        if self.store.course_has_edges(id) {
            return Err(ServiceError::Conflict(format!(
                "course {id} still participates in prerequisite edges"
            )));
        }
        if self.store.course_has_enrollments(id) {
            return Err(ServiceError::Conflict(format!(
                "course {id} still has enrollments"
            )));
        }

        self.store.delete_course(id)?;
        self.cache.remove_point(course.code.as_str());
        self.cache.invalidate_collections();
        info!(id = %id, "course deleted");
        Ok(())
    }

    // ---- internals --------------------------------------------------------

    /// Materialize the transfer representation: record fields plus the
    /// current prerequisite list from the graph index.
    fn snapshot(&self, course: Course) -> CourseSnapshot {
        let prerequisite_ids = self.store.prerequisites(course.id).unwrap_or_default();
        CourseSnapshot {
            id: course.id,
            name: course.name,
            code: course.code,
            credits: course.credits,
            instructor_id: course.instructor_id,
            prerequisite_ids,
        }
    }

    fn write_through(&self, snapshot: &CourseSnapshot, stale_key: Option<CourseCode>) {
        if let Some(stale) = stale_key {
            self.cache.remove_point(stale.as_str());
        }
        self.cache.put_point(snapshot.code.as_str(), snapshot.clone());
        self.cache.invalidate_collections();
    }
}
