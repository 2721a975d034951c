//! core::graph
//!
//! Prerequisite graph representation and the cycle check.
//!
//! # Architecture
//!
//! The prerequisite graph is a DAG where:
//! - Nodes are courses, keyed by [`CourseId`]
//! - Edges point from a course to the courses it requires
//! - The inverse (dependents) index is derived from the edges, never
//!   authoritative
//!
//! Nodes are stored in a flat table with an adjacency mapping (id -> set of
//! ids). Courses never hold references to neighbor course values.
//!
//! # Invariants
//!
//! - The graph must be acyclic at all times
//! - Every edge endpoint is a known node
//! - `required_by` is exactly the inverse of `requires`
//!
//! # Cycle check
//!
//! Adding the edge "`from` requires `to`" closes a cycle iff `from` is
//! reachable from `to` through the existing requires-edges. The traversal
//! looks up every visited node's own outgoing edges from the global index,
//! so cycles are detected at any depth, not just among the queried node's
//! immediate prerequisites.

use std::collections::{HashMap, HashSet, VecDeque};

use thiserror::Error;

use super::types::CourseId;

/// Errors from graph operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    /// The referenced course is not a node of the graph.
    #[error("unknown course: {0}")]
    UnknownCourse(CourseId),
}

/// The course prerequisite graph.
///
/// This is the flat in-memory index of prerequisite edges. It answers
/// reachability questions; it does not know anything else about courses.
///
/// # Example
///
/// ```
/// use registrar::core::graph::CourseGraph;
/// use registrar::core::types::CourseId;
///
/// let mut graph = CourseGraph::new();
/// let algebra = CourseId::new(1);
/// let calculus = CourseId::new(2);
/// graph.add_node(algebra);
/// graph.add_node(calculus);
///
/// // Calculus requires algebra - no cycle.
/// assert_eq!(graph.would_cycle(calculus, algebra), Ok(false));
/// graph.add_edge(calculus, algebra).unwrap();
///
/// // Algebra requiring calculus would close the loop.
/// assert_eq!(graph.would_cycle(algebra, calculus), Ok(true));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CourseGraph {
    /// Outgoing edges: course -> courses it requires.
    requires: HashMap<CourseId, HashSet<CourseId>>,
    /// Derived inverse index: course -> courses that require it.
    required_by: HashMap<CourseId, HashSet<CourseId>>,
}

impl CourseGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node with empty edge sets.
    ///
    /// Adding an existing node is a no-op and preserves its edges.
    pub fn add_node(&mut self, id: CourseId) {
        self.requires.entry(id).or_default();
        self.required_by.entry(id).or_default();
    }

    /// Check whether a node exists.
    pub fn contains(&self, id: CourseId) -> bool {
        self.requires.contains_key(&id)
    }

    /// Number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.requires.len()
    }

    /// Check if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.requires.is_empty()
    }

    /// Add the edge "`from` requires `to`".
    ///
    /// Both endpoints must already be nodes. Returns `true` if the edge was
    /// inserted, `false` if it was already present.
    ///
    /// This updates the derived dependents index in the same call; callers
    /// must run [`CourseGraph::would_cycle`] first, the graph itself does not
    /// re-verify acyclicity here.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::UnknownCourse` if either endpoint is not a node.
    pub fn add_edge(&mut self, from: CourseId, to: CourseId) -> Result<bool, GraphError> {
        self.check_known(from)?;
        self.check_known(to)?;

        let inserted = self
            .requires
            .get_mut(&from)
            .map(|targets| targets.insert(to))
            .unwrap_or(false);
        if inserted {
            self.required_by.entry(to).or_default().insert(from);
        }
        Ok(inserted)
    }

    /// Remove the edge "`from` requires `to`" if present.
    ///
    /// Returns `true` if an edge was removed.
    pub fn remove_edge(&mut self, from: CourseId, to: CourseId) -> bool {
        let removed = self
            .requires
            .get_mut(&from)
            .map(|targets| targets.remove(&to))
            .unwrap_or(false);
        if removed {
            if let Some(sources) = self.required_by.get_mut(&to) {
                sources.remove(&from);
            }
        }
        removed
    }

    /// Remove a node and every edge that touches it.
    pub fn remove_node(&mut self, id: CourseId) {
        if let Some(targets) = self.requires.remove(&id) {
            for to in targets {
                if let Some(sources) = self.required_by.get_mut(&to) {
                    sources.remove(&id);
                }
            }
        }
        if let Some(sources) = self.required_by.remove(&id) {
            for from in sources {
                if let Some(targets) = self.requires.get_mut(&from) {
                    targets.remove(&id);
                }
            }
        }
    }

    /// Check whether the edge "`from` requires `to`" is present.
    pub fn has_edge(&self, from: CourseId, to: CourseId) -> bool {
        self.requires
            .get(&from)
            .map(|targets| targets.contains(&to))
            .unwrap_or(false)
    }

    /// The direct prerequisites of a course, sorted for determinism.
    pub fn prerequisites(&self, id: CourseId) -> Vec<CourseId> {
        let mut out: Vec<CourseId> = self
            .requires
            .get(&id)
            .map(|targets| targets.iter().copied().collect())
            .unwrap_or_default();
        out.sort();
        out
    }

    /// The courses that directly require `id`, sorted for determinism.
    ///
    /// This reads the derived inverse index.
    pub fn dependents(&self, id: CourseId) -> Vec<CourseId> {
        let mut out: Vec<CourseId> = self
            .required_by
            .get(&id)
            .map(|sources| sources.iter().copied().collect())
            .unwrap_or_default();
        out.sort();
        out
    }

    /// Whether the node participates in any prerequisite edge, in either
    /// direction.
    pub fn has_any_edges(&self, id: CourseId) -> bool {
        let outgoing = self.requires.get(&id).map(|s| !s.is_empty()).unwrap_or(false);
        let incoming = self
            .required_by
            .get(&id)
            .map(|s| !s.is_empty())
            .unwrap_or(false);
        outgoing || incoming
    }

    /// Decide whether adding the edge "`from` requires `to`" would close a
    /// cycle, given only the currently persisted edges.
    ///
    /// A self-reference is always a cycle. Otherwise the candidate edge
    /// closes a cycle iff `from` is reachable from `to` through existing
    /// edges. Traversal is breadth-first with a visited set, so shared
    /// (diamond) dependencies terminate; the order is not observable, only
    /// reachability matters.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::UnknownCourse` if either endpoint is not a node.
    /// Unknown courses are an input error, never a cycle verdict.
    pub fn would_cycle(&self, from: CourseId, to: CourseId) -> Result<bool, GraphError> {
        self.check_known(from)?;
        self.check_known(to)?;

        if from == to {
            return Ok(true);
        }

        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(to);

        while let Some(current) = queue.pop_front() {
            if current == from {
                return Ok(true);
            }
            if !visited.insert(current) {
                continue;
            }
            // Each visited node's own edges come from the global index.
            if let Some(targets) = self.requires.get(&current) {
                queue.extend(targets.iter().copied());
            }
        }

        Ok(false)
    }

    /// Check if the graph contains a cycle.
    ///
    /// Returns `Some(id)` for a node on a cycle if one exists. The persisted
    /// graph is kept acyclic by gating every edge insert on
    /// [`CourseGraph::would_cycle`]; this is a verification aid.
    pub fn find_cycle(&self) -> Option<CourseId> {
        let mut visited = HashSet::new();
        let mut path = HashSet::new();

        for &id in self.requires.keys() {
            if self.has_cycle_from(id, &mut visited, &mut path) {
                return Some(id);
            }
        }
        None
    }

    fn has_cycle_from(
        &self,
        id: CourseId,
        visited: &mut HashSet<CourseId>,
        path: &mut HashSet<CourseId>,
    ) -> bool {
        if path.contains(&id) {
            return true;
        }
        if visited.contains(&id) {
            return false;
        }

        visited.insert(id);
        path.insert(id);

        if let Some(targets) = self.requires.get(&id) {
            for &next in targets {
                if self.has_cycle_from(next, visited, path) {
                    return true;
                }
            }
        }

        path.remove(&id);
        false
    }

    fn check_known(&self, id: CourseId) -> Result<(), GraphError> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(GraphError::UnknownCourse(id))
        }
    }
}
