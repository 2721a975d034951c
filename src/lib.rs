//! Registrar - university records core
//!
//! Registrar is the backend core for a university records system: courses
//! with an always-acyclic prerequisite graph, instructors mutated under
//! per-record exclusive leases, enrollments with pair uniqueness, and read
//! caches kept coherent with every mutation.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`service`] - Orchestration layer (validate, resolve, guard, persist, cache)
//! - [`store`] - Single doorway to persisted records and the edge index
//! - [`model`] - Entity records
//! - [`core`] - Domain primitives: types, graph, leases, caches
//! - [`config`] - Runtime settings
//!
//! # Correctness Invariants
//!
//! Registrar maintains the following invariants:
//!
//! 1. The prerequisite graph is acyclic at all times; every edge insert is
//!    gated on a reachability check and re-verified at persist time
//! 2. Mutations of the same instructor record are strictly serialized by an
//!    exclusive, time-bounded lease
//! 3. Immediately after a successful mutation, point lookups by natural key
//!    return the new value and collection reads reflect it
//! 4. No operation leaves a partially applied mutation
//!
//! # Example
//!
//! ```
//! use registrar::service::{CreateCourse, Registrar, ServiceError};
//!
//! let registrar = Registrar::new();
//! let algebra = registrar.courses().create(CreateCourse {
//!     name: "Algebra".to_string(),
//!     code: "MAT-101".to_string(),
//!     credits: 6,
//!     instructor_id: None,
//! })?;
//! let calculus = registrar.courses().create(CreateCourse {
//!     name: "Calculus".to_string(),
//!     code: "MAT-201".to_string(),
//!     credits: 6,
//!     instructor_id: None,
//! })?;
//!
//! registrar.courses().add_prerequisite(calculus.id, algebra.id)?;
//!
//! // The reverse edge would close a cycle and is rejected.
//! assert!(matches!(
//!     registrar.courses().add_prerequisite(algebra.id, calculus.id),
//!     Err(ServiceError::Conflict(_))
//! ));
//! # Ok::<(), ServiceError>(())
//! ```

pub mod config;
pub mod core;
pub mod model;
pub mod service;
pub mod store;
