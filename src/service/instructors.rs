//! service::instructors
//!
//! Instructor roster operations.
//!
//! # Architecture
//!
//! Instructors are the shared mutable record of the system. Every mutation
//! of an existing record runs under that record's exclusive lease, so two
//! concurrent mutators of the same identifier are strictly serialized: the
//! second observes the first's fully applied state, never an interleaved
//! partial write. Mutators of disjoint identifiers proceed in parallel.
//!
//! Reads never touch the lease table. Collection reads (full roster, active
//! subset) go through the snapshot cache read-through; the point lookup by
//! employee number is kept current write-through by the mutating calls.
//!
//! # Invariants
//!
//! - The lease is held from before the load to after the persist, and is
//!   released on every exit path (RAII guard)
//! - A lock timeout leaves zero persisted change
//! - After a successful mutation, the point lookup returns the new record
//!   and subsequent collection reads reflect it

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::config::LeaseSettings;
use crate::core::cache::SnapshotCache;
use crate::core::lease::LeaseTable;
use crate::core::types::{Email, EmployeeNumber, InstructorId};
use crate::model::{DeactivationReason, Instructor, InstructorStatus};
use crate::store::{NewInstructor, RecordStore};

use super::validate::{require_not_future, require_text, today, MAX_NAME_LEN};
use super::ServiceError;

/// Collection query shapes cached for the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RosterShape {
    /// Every instructor.
    All,
    /// Instructors with active status only.
    Active,
}

/// Request to create an instructor.
#[derive(Debug, Clone)]
pub struct CreateInstructor {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub birth_date: NaiveDate,
    pub employee_number: String,
    pub department: String,
}

/// Full-field update of an instructor record.
#[derive(Debug, Clone)]
pub struct UpdateInstructor {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub birth_date: NaiveDate,
    pub employee_number: String,
    pub department: String,
}

/// Instructor roster service.
#[derive(Debug, Clone)]
pub struct InstructorService {
    store: Arc<RecordStore>,
    leases: LeaseTable<InstructorId>,
    cache: Arc<SnapshotCache<RosterShape, Instructor>>,
    acquire_timeout: Duration,
}

impl InstructorService {
    /// Build the service over a shared store with the given lease timing.
    pub fn new(store: Arc<RecordStore>, settings: &LeaseSettings) -> Self {
        Self {
            store,
            leases: LeaseTable::with_timing(settings.max_hold(), settings.poll_interval()),
            cache: Arc::new(SnapshotCache::new()),
            acquire_timeout: settings.acquire_timeout(),
        }
    }

    // ---- reads ------------------------------------------------------------

    /// List every instructor (read-through cached).
    pub fn list(&self) -> Vec<Instructor> {
        self.read_collection(RosterShape::All)
    }

    /// List active instructors only (read-through cached).
    pub fn list_active(&self) -> Vec<Instructor> {
        self.read_collection(RosterShape::Active)
    }

    /// Get an instructor by identifier, straight from the store.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` for an unknown identifier.
    pub fn get(&self, id: InstructorId) -> Result<Instructor, ServiceError> {
        Ok(self.store.instructor(id)?)
    }

    /// Get an instructor by employee number (read-through point cache).
    ///
    /// # Errors
    ///
    /// - `ServiceError::Validation` for a malformed employee number
    /// - `ServiceError::NotFound` if no instructor carries it
    pub fn get_by_employee_number(&self, number: &str) -> Result<Instructor, ServiceError> {
        let number = EmployeeNumber::new(number)?;

        if let Some(hit) = self.cache.get_point(number.as_str()) {
            debug!(employee_number = %number, "point cache hit");
            return Ok(hit);
        }

        let instructor = self
            .store
            .find_instructor_by_employee_number(&number)
            .ok_or_else(|| ServiceError::not_found("instructor", &number))?;
        self.cache.put_point(number.as_str(), instructor.clone());
        Ok(instructor)
    }

    // ---- mutations --------------------------------------------------------

    /// Create an instructor record.
    ///
    /// No lease is taken: there is no existing record to race on, and the
    /// store's uniqueness checks are atomic.
    ///
    /// # Errors
    ///
    /// - `ServiceError::Validation` for blank/malformed fields or a future
    ///   birth date
    /// - `ServiceError::Conflict` for a duplicate email or employee number
    pub fn create(
        &self,
        request: CreateInstructor,
        actor: &str,
    ) -> Result<Instructor, ServiceError> {
        require_text("first name", &request.first_name, MAX_NAME_LEN)?;
        require_text("last name", &request.last_name, MAX_NAME_LEN)?;
        require_text("department", &request.department, MAX_NAME_LEN)?;
        require_not_future("birth date", request.birth_date)?;
        let email = Email::new(request.email)?;
        let employee_number = EmployeeNumber::new(request.employee_number)?;

        let created = self.store.insert_instructor(NewInstructor {
            first_name: request.first_name,
            last_name: request.last_name,
            email,
            birth_date: request.birth_date,
            employee_number,
            department: request.department,
            status: InstructorStatus::Active,
            created_by: actor.to_string(),
            created_at: today(),
        })?;

        self.write_through(&created, None);
        info!(id = %created.id, employee_number = %created.employee_number, "instructor created");
        Ok(created)
    }

    /// Apply a full-field update to an instructor record.
    ///
    /// Runs under the record's exclusive lease; see the module docs for the
    /// serialization guarantee.
    ///
    /// # Errors
    ///
    /// - `ServiceError::Validation` for blank/malformed fields
    /// - `ServiceError::LockTimeout` if the lease is contended past the bound
    /// - `ServiceError::NotFound` for an unknown identifier
    /// - `ServiceError::Conflict` if the email or employee number collides
    pub fn update(
        &self,
        id: InstructorId,
        changes: UpdateInstructor,
        actor: &str,
    ) -> Result<Instructor, ServiceError> {
        require_text("first name", &changes.first_name, MAX_NAME_LEN)?;
        require_text("last name", &changes.last_name, MAX_NAME_LEN)?;
        require_text("department", &changes.department, MAX_NAME_LEN)?;
        require_not_future("birth date", changes.birth_date)?;
        let email = Email::new(changes.email)?;
        let employee_number = EmployeeNumber::new(changes.employee_number)?;

        let _lease = self
            .leases
            .acquire(id, self.acquire_timeout)
            .map_err(|e| ServiceError::lock_timeout(id.value(), e))?;

        let mut instructor = self.store.instructor(id)?;
        let previous_number = instructor.employee_number.clone();

        instructor.first_name = changes.first_name;
        instructor.last_name = changes.last_name;
        instructor.email = email;
        instructor.birth_date = changes.birth_date;
        instructor.employee_number = employee_number;
        instructor.department = changes.department;
        instructor.touch_modified(actor, today());

        self.store.replace_instructor(instructor.clone())?;

        let stale_key =
            (previous_number != instructor.employee_number).then_some(previous_number);
        self.write_through(&instructor, stale_key);
        info!(id = %id, "instructor updated");
        Ok(instructor)
    }

    /// Deactivate an instructor.
    ///
    /// Sets the status and all deactivation lifecycle fields in one persisted
    /// write, under the record's exclusive lease.
    ///
    /// # Errors
    ///
    /// - `ServiceError::LockTimeout` if the lease is contended past the bound
    /// - `ServiceError::NotFound` for an unknown identifier
    pub fn deactivate(
        &self,
        id: InstructorId,
        reason: DeactivationReason,
        actor: &str,
    ) -> Result<Instructor, ServiceError> {
        let _lease = self
            .leases
            .acquire(id, self.acquire_timeout)
            .map_err(|e| ServiceError::lock_timeout(id.value(), e))?;

        let mut instructor = self.store.instructor(id)?;
        instructor.deactivate(reason, actor, today());
        self.store.replace_instructor(instructor.clone())?;

        self.write_through(&instructor, None);
        info!(id = %id, %reason, "instructor deactivated");
        Ok(instructor)
    }

    /// Run `operation` while holding the record's exclusive lease.
    ///
    /// This is the long-administrative-operation path: the record stays
    /// exclusively held for the whole closure, and other mutators wait
    /// rather than race. Plain reads never need this. The lease's maximum
    /// hold duration still applies; an operation that outlives it loses
    /// exclusivity to the next acquirer.
    ///
    /// # Errors
    ///
    /// - `ServiceError::LockTimeout` if the lease is contended past the bound
    /// - `ServiceError::NotFound` for an unknown identifier
    pub fn with_locked_record<R>(
        &self,
        id: InstructorId,
        operation: impl FnOnce(&Instructor) -> R,
    ) -> Result<R, ServiceError> {
        let _lease = self
            .leases
            .acquire(id, self.acquire_timeout)
            .map_err(|e| ServiceError::lock_timeout(id.value(), e))?;

        let instructor = self.store.instructor(id)?;
        Ok(operation(&instructor))
    }

    // ---- internals --------------------------------------------------------

    fn read_collection(&self, shape: RosterShape) -> Vec<Instructor> {
        if let Some(hit) = self.cache.get_collection(&shape) {
            debug!(?shape, "collection cache hit");
            return hit;
        }

        let all = self.store.list_instructors();
        let values: Vec<Instructor> = match shape {
            RosterShape::All => all,
            RosterShape::Active => all.into_iter().filter(Instructor::is_active).collect(),
        };
        self.cache.put_collection(shape, values.clone());
        values
    }

    /// Cache maintenance after a successful mutation: write the point entry
    /// through from the mutation result, drop a stale point key if the
    /// employee number changed, and evict the collection shapes wholesale.
    fn write_through(&self, instructor: &Instructor, stale_key: Option<EmployeeNumber>) {
        if let Some(stale) = stale_key {
            self.cache.remove_point(stale.as_str());
        }
        self.cache
            .put_point(instructor.employee_number.as_str(), instructor.clone());
        self.cache.invalidate_collections();
    }

    #[cfg(test)]
    pub(crate) fn lease_table(&self) -> &LeaseTable<InstructorId> {
        &self.leases
    }
}
