//! Property-based tests for the prerequisite graph.
//!
//! These tests use proptest to verify the core structural invariant across
//! randomly generated edge workloads: a graph whose inserts are gated on
//! the cycle check stays acyclic, no matter the order or mix of requests.

use proptest::prelude::*;

use registrar::core::graph::CourseGraph;
use registrar::core::types::CourseId;
use registrar::service::{CreateCourse, Registrar, ServiceError};

const NODES: u64 = 8;

/// Strategy for an arbitrary edge request over a small node set.
fn edge() -> impl Strategy<Value = (u64, u64)> {
    (1..=NODES, 1..=NODES)
}

fn seeded_graph() -> CourseGraph {
    let mut graph = CourseGraph::new();
    for i in 1..=NODES {
        graph.add_node(CourseId::new(i));
    }
    graph
}

fn seeded_registrar() -> (Registrar, Vec<CourseId>) {
    let registrar = Registrar::new();
    let ids = (1..=NODES)
        .map(|i| {
            registrar
                .courses()
                .create(CreateCourse {
                    name: format!("Course {i}"),
                    code: format!("C-{i}"),
                    credits: 3,
                    instructor_id: None,
                })
                .expect("create course")
                .id
        })
        .collect();
    (registrar, ids)
}

proptest! {
    /// Gated inserts keep the raw graph acyclic for any edge sequence.
    #[test]
    fn gated_edge_sequences_stay_acyclic(edges in prop::collection::vec(edge(), 0..60)) {
        let mut graph = seeded_graph();

        for (from, to) in edges {
            let from = CourseId::new(from);
            let to = CourseId::new(to);
            if !graph.would_cycle(from, to).unwrap() {
                graph.add_edge(from, to).unwrap();
            }
        }

        prop_assert!(graph.find_cycle().is_none());
    }

    /// The same invariant holds end to end through the service layer, where
    /// rejected requests surface as conflicts and persist nothing.
    #[test]
    fn service_edge_sequences_stay_acyclic(edges in prop::collection::vec(edge(), 0..40)) {
        let (registrar, ids) = seeded_registrar();

        for (from, to) in edges {
            let from = ids[(from - 1) as usize];
            let to = ids[(to - 1) as usize];
            match registrar.courses().add_prerequisite(from, to) {
                Ok(_) | Err(ServiceError::Conflict(_)) => {}
                Err(other) => prop_assert!(false, "unexpected error: {}", other),
            }
        }

        prop_assert!(registrar.store().graph_snapshot().find_cycle().is_none());
    }

    /// A self-edge is a cycle for every node.
    #[test]
    fn self_reference_is_always_a_cycle(node in 1..=NODES) {
        let graph = seeded_graph();
        let id = CourseId::new(node);
        prop_assert_eq!(graph.would_cycle(id, id).unwrap(), true);
    }

    /// The cycle verdict is symmetric on reachability: after persisting a
    /// path from `a` to `b`, the reverse candidate edge is always rejected.
    #[test]
    fn persisted_paths_reject_their_reverse(hops in prop::collection::vec(1..=NODES, 2..6)) {
        let mut graph = seeded_graph();

        // Build a simple path through distinct hops.
        let mut path: Vec<CourseId> = Vec::new();
        for hop in hops {
            let id = CourseId::new(hop);
            if !path.contains(&id) {
                path.push(id);
            }
        }
        prop_assume!(path.len() >= 2);

        for pair in path.windows(2) {
            if !graph.would_cycle(pair[0], pair[1]).unwrap() {
                graph.add_edge(pair[0], pair[1]).unwrap();
            }
        }

        let head = path[0];
        let tail = path[path.len() - 1];
        // head reaches tail through the persisted hops, so the reverse
        // candidate edge must be flagged.
        prop_assert_eq!(graph.would_cycle(tail, head).unwrap(), true);
    }
}
