//! Integration tests for the orchestration layer.
//!
//! These tests exercise the assembled registrar end to end: graph gating,
//! lease serialization across real threads, cache coherence after
//! mutations, and enrollment uniqueness.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::NaiveDate;

use registrar::config::{LeaseSettings, RegistrarConfig};
use registrar::core::types::{CourseId, InstructorId};
use registrar::model::{DeactivationReason, InstructorStatus};
use registrar::service::{
    CreateCourse, CreateInstructor, Registrar, ServiceError, UpdateInstructor,
};

// =============================================================================
// Test Helpers
// =============================================================================

fn registrar() -> Registrar {
    Registrar::new()
}

fn registrar_with_lease(settings: LeaseSettings) -> Registrar {
    Registrar::with_config(&RegistrarConfig { lease: settings })
}

fn course(registrar: &Registrar, code: &str) -> CourseId {
    registrar
        .courses()
        .create(CreateCourse {
            name: format!("Course {code}"),
            code: code.to_string(),
            credits: 6,
            instructor_id: None,
        })
        .expect("create course")
        .id
}

fn instructor(registrar: &Registrar, number: &str, email: &str) -> InstructorId {
    registrar
        .instructors()
        .create(
            CreateInstructor {
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                email: email.to_string(),
                birth_date: NaiveDate::from_ymd_opt(1980, 5, 20).unwrap(),
                employee_number: number.to_string(),
                department: "Mathematics".to_string(),
            },
            "admin",
        )
        .expect("create instructor")
        .id
}

fn update_with_marker(number: &str, marker: usize) -> UpdateInstructor {
    UpdateInstructor {
        first_name: format!("First-{marker}"),
        last_name: format!("Last-{marker}"),
        email: format!("marker{marker}@example.edu"),
        birth_date: NaiveDate::from_ymd_opt(1980, 5, 20).unwrap(),
        employee_number: number.to_string(),
        department: format!("Department-{marker}"),
    }
}

fn past_date() -> NaiveDate {
    chrono::Utc::now().date_naive() - chrono::Duration::days(7)
}

// =============================================================================
// Prerequisite graph
// =============================================================================

#[test]
fn prerequisite_chain_rejects_the_closing_edge() {
    let registrar = registrar();
    let a = course(&registrar, "CS-101");
    let b = course(&registrar, "CS-201");
    let c = course(&registrar, "CS-301");

    // a requires b, b requires c.
    registrar.courses().add_prerequisite(a, b).unwrap();
    registrar.courses().add_prerequisite(b, c).unwrap();

    // c requiring a closes c -> a -> b -> c.
    assert_eq!(registrar.courses().would_create_cycle(c, a), Ok(true));
    assert!(matches!(
        registrar.courses().add_prerequisite(c, a),
        Err(ServiceError::Conflict(_))
    ));

    // The redundant direct edge is allowed.
    assert_eq!(registrar.courses().would_create_cycle(a, c), Ok(false));
    registrar.courses().add_prerequisite(a, c).unwrap();

    assert!(registrar.store().graph_snapshot().find_cycle().is_none());
}

#[test]
fn rejected_edge_persists_nothing() {
    let registrar = registrar();
    let a = course(&registrar, "CS-101");
    let b = course(&registrar, "CS-201");
    registrar.courses().add_prerequisite(b, a).unwrap();

    let before = registrar.courses().list();
    assert!(registrar.courses().add_prerequisite(a, b).is_err());
    assert_eq!(registrar.courses().list(), before);
}

#[test]
fn concurrent_opposing_edges_never_persist_a_cycle() {
    // Two threads race to add a -> b and b -> a. At most one may win, and
    // the persisted graph must stay acyclic either way.
    for _ in 0..20 {
        let registrar = Arc::new(registrar());
        let a = course(&registrar, "CS-101");
        let b = course(&registrar, "CS-201");

        let forward = {
            let registrar = Arc::clone(&registrar);
            thread::spawn(move || registrar.courses().add_prerequisite(a, b).is_ok())
        };
        let backward = {
            let registrar = Arc::clone(&registrar);
            thread::spawn(move || registrar.courses().add_prerequisite(b, a).is_ok())
        };

        let forward_won = forward.join().unwrap();
        let backward_won = backward.join().unwrap();

        assert!(forward_won || backward_won);
        assert!(!(forward_won && backward_won));
        assert!(registrar.store().graph_snapshot().find_cycle().is_none());
    }
}

#[test]
fn disjoint_edge_additions_all_land() {
    let registrar = Arc::new(registrar());
    let targets: Vec<(CourseId, CourseId)> = (0..8)
        .map(|i| {
            let from = course(&registrar, &format!("A-{i}"));
            let to = course(&registrar, &format!("B-{i}"));
            (from, to)
        })
        .collect();

    let handles: Vec<_> = targets
        .iter()
        .map(|&(from, to)| {
            let registrar = Arc::clone(&registrar);
            thread::spawn(move || registrar.courses().add_prerequisite(from, to).unwrap())
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    for (from, to) in targets {
        assert_eq!(
            registrar.courses().get(from).unwrap().prerequisite_ids,
            vec![to]
        );
    }
}

// =============================================================================
// Lease serialization
// =============================================================================

#[test]
fn concurrent_updates_never_interleave_fields() {
    let registrar = Arc::new(registrar());
    let id = instructor(&registrar, "E123", "ada@example.edu");

    let handles: Vec<_> = (0..6)
        .map(|marker| {
            let registrar = Arc::clone(&registrar);
            thread::spawn(move || {
                registrar
                    .instructors()
                    .update(id, update_with_marker("E123", marker), "clerk")
                    .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // Every field of the final record carries the same marker: the last
    // writer's update landed whole, not mixed with another writer's.
    let after = registrar.instructors().get(id).unwrap();
    let marker = after
        .first_name
        .strip_prefix("First-")
        .expect("marker prefix")
        .to_string();
    assert_eq!(after.last_name, format!("Last-{marker}"));
    assert_eq!(after.department, format!("Department-{marker}"));
    assert_eq!(after.email.as_str(), format!("marker{marker}@example.edu"));
}

#[test]
fn later_writer_observes_earlier_writers_committed_state() {
    let registrar = Arc::new(registrar());
    let id = instructor(&registrar, "E123", "ada@example.edu");

    // Hold the record exclusively for a while, then let an update through.
    let holder = {
        let registrar = Arc::clone(&registrar);
        thread::spawn(move || {
            registrar
                .instructors()
                .with_locked_record(id, |record| {
                    thread::sleep(Duration::from_millis(120));
                    record.department.clone()
                })
                .unwrap()
        })
    };

    thread::sleep(Duration::from_millis(30));
    let updated = registrar
        .instructors()
        .update(id, update_with_marker("E123", 1), "clerk")
        .unwrap();

    // The locked reader saw the pre-update department because it held the
    // lease first; the update waited for it.
    assert_eq!(holder.join().unwrap(), "Mathematics");
    assert_eq!(updated.department, "Department-1");
}

#[test]
fn lock_timeout_fails_the_waiter_with_zero_persisted_change() {
    let registrar = Arc::new(registrar_with_lease(LeaseSettings {
        acquire_timeout_ms: 80,
        max_hold_ms: 5_000,
        poll_interval_ms: 5,
    }));
    let id = instructor(&registrar, "E123", "ada@example.edu");
    let before = registrar.instructors().get(id).unwrap();

    let holder = {
        let registrar = Arc::clone(&registrar);
        thread::spawn(move || {
            registrar
                .instructors()
                .with_locked_record(id, |_| thread::sleep(Duration::from_millis(300)))
                .unwrap();
        })
    };

    thread::sleep(Duration::from_millis(30));
    let result = registrar
        .instructors()
        .update(id, update_with_marker("E123", 9), "clerk");

    let err = result.unwrap_err();
    assert!(matches!(err, ServiceError::LockTimeout { .. }));
    assert!(err.is_retryable());

    holder.join().unwrap();

    // Re-read: the record is byte-for-byte what it was.
    assert_eq!(registrar.instructors().get(id).unwrap(), before);
}

#[test]
fn expired_lease_is_force_released_for_waiters() {
    let registrar = Arc::new(registrar_with_lease(LeaseSettings {
        acquire_timeout_ms: 2_000,
        max_hold_ms: 60,
        poll_interval_ms: 5,
    }));
    let id = instructor(&registrar, "E123", "ada@example.edu");

    // The holder outlives its hold bound.
    let holder = {
        let registrar = Arc::clone(&registrar);
        thread::spawn(move || {
            registrar
                .instructors()
                .with_locked_record(id, |_| thread::sleep(Duration::from_millis(400)))
                .unwrap();
        })
    };

    thread::sleep(Duration::from_millis(100));
    // The waiter gets the lease well before the holder's closure returns.
    let updated = registrar
        .instructors()
        .update(id, update_with_marker("E123", 2), "clerk")
        .unwrap();
    assert_eq!(updated.department, "Department-2");

    holder.join().unwrap();
}

#[test]
fn mutations_of_disjoint_instructors_run_in_parallel() {
    let registrar = Arc::new(registrar_with_lease(LeaseSettings {
        acquire_timeout_ms: 150,
        max_hold_ms: 5_000,
        poll_interval_ms: 5,
    }));
    let first = instructor(&registrar, "E1", "one@example.edu");
    let second = instructor(&registrar, "E2", "two@example.edu");

    // Hold the first record far past the second writer's timeout; if the
    // leases were not per-record, the second update would time out.
    let holder = {
        let registrar = Arc::clone(&registrar);
        thread::spawn(move || {
            registrar
                .instructors()
                .with_locked_record(first, |_| thread::sleep(Duration::from_millis(300)))
                .unwrap();
        })
    };

    thread::sleep(Duration::from_millis(20));
    registrar
        .instructors()
        .update(second, update_with_marker("E2", 3), "clerk")
        .unwrap();

    holder.join().unwrap();
}

// =============================================================================
// Cache coherence
// =============================================================================

#[test]
fn fresh_create_is_visible_through_point_and_collection_reads() {
    let registrar = registrar();

    // Warm the collection shapes while empty.
    assert!(registrar.instructors().list().is_empty());
    assert!(registrar.instructors().list_active().is_empty());

    let id = instructor(&registrar, "E123", "ada@example.edu");

    let by_number = registrar
        .instructors()
        .get_by_employee_number("E123")
        .unwrap();
    assert_eq!(by_number.id, id);

    let all = registrar.instructors().list();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, id);
}

#[test]
fn deactivation_is_coherent_across_shapes() {
    let registrar = registrar();
    let id = instructor(&registrar, "E123", "ada@example.edu");

    // Warm every shape.
    registrar.instructors().list();
    registrar.instructors().list_active();
    registrar.instructors().get_by_employee_number("E123").unwrap();

    registrar
        .instructors()
        .deactivate(id, DeactivationReason::Dismissal, "registrar")
        .unwrap();

    // Point lookup serves the deactivated record without a stale hit.
    let point = registrar
        .instructors()
        .get_by_employee_number("E123")
        .unwrap();
    assert_eq!(point.status, InstructorStatus::Inactive);
    assert_eq!(point.deactivation_reason, Some(DeactivationReason::Dismissal));

    // Collection shapes reflect the mutation.
    assert!(registrar.instructors().list_active().is_empty());
    assert_eq!(
        registrar.instructors().list()[0].status,
        InstructorStatus::Inactive
    );
}

#[test]
fn graph_mutation_invalidates_course_collections() {
    let registrar = registrar();
    let a = course(&registrar, "CS-101");
    let b = course(&registrar, "CS-201");

    // Warm the catalog cache.
    let before = registrar.courses().list();
    assert!(before.iter().all(|c| c.prerequisite_ids.is_empty()));

    registrar.courses().add_prerequisite(b, a).unwrap();

    let after = registrar.courses().list();
    let updated = after.iter().find(|c| c.id == b).unwrap();
    assert_eq!(updated.prerequisite_ids, vec![a]);
}

// =============================================================================
// Instructor assignment and enrollment
// =============================================================================

#[test]
fn assign_instructor_requires_an_active_record() {
    let registrar = registrar();
    let course_id = course(&registrar, "CS-101");
    let instructor_id = instructor(&registrar, "E123", "ada@example.edu");

    let assigned = registrar
        .courses()
        .assign_instructor(course_id, instructor_id)
        .unwrap();
    assert_eq!(assigned.instructor_id, Some(instructor_id));

    registrar
        .instructors()
        .deactivate(instructor_id, DeactivationReason::Resignation, "registrar")
        .unwrap();

    let other = course(&registrar, "CS-201");
    assert!(matches!(
        registrar.courses().assign_instructor(other, instructor_id),
        Err(ServiceError::Validation(_))
    ));
}

#[test]
fn enrollment_uniqueness_is_per_pair() {
    let registrar = registrar();
    let math = course(&registrar, "MAT-101");
    let art = course(&registrar, "ART-100");
    let student = registrar.enrollments().register_student("Lin", "Wei").id;

    registrar
        .enrollments()
        .create(student, math, past_date())
        .unwrap();

    // Same pair, different date: still a conflict.
    assert!(matches!(
        registrar
            .enrollments()
            .create(student, math, past_date() + chrono::Duration::days(1)),
        Err(ServiceError::Conflict(_))
    ));

    // A different course is fine.
    registrar
        .enrollments()
        .create(student, art, past_date())
        .unwrap();
    assert_eq!(registrar.enrollments().list_for_student(student).len(), 2);
}

#[test]
fn course_deletion_is_blocked_by_enrollments_then_allowed() {
    let registrar = registrar();
    let course_id = course(&registrar, "CS-101");
    let student = registrar.enrollments().register_student("Lin", "Wei").id;
    let enrollment = registrar
        .enrollments()
        .create(student, course_id, past_date())
        .unwrap();

    assert!(matches!(
        registrar.courses().delete(course_id),
        Err(ServiceError::Conflict(_))
    ));

    registrar.enrollments().delete(enrollment.id).unwrap();
    registrar.courses().delete(course_id).unwrap();
    assert!(matches!(
        registrar.courses().get(course_id),
        Err(ServiceError::NotFound { .. })
    ));
}
