//! core
//!
//! Core domain primitives for the registrar.
//!
//! # Modules
//!
//! - [`types`] - Strong types: record identifiers, CourseCode, EmployeeNumber, Email
//! - [`graph`] - Prerequisite graph and the cycle check
//! - [`lease`] - Per-record exclusive leases with timeout and hold bounds
//! - [`cache`] - Shape-keyed snapshot cache with explicit invalidation
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - The prerequisite graph is a flat id-keyed index, never mutual references
//! - Concurrency primitives are independent of the persistence engine

pub mod cache;
pub mod graph;
pub mod lease;
pub mod types;
