//! Constraint graph construction and the standalone validations of §4.D.
//!
//! [`ConstraintGraph`] holds the two undirected adjacency maps every later
//! component reads: `cannot` (forbidden same-table pairs) and `adjacent`
//! (preferred circular-neighbor pairs, which also behave as an implicit
//! `must` at grouping time). The group-dependent checks (items 3-5) live in
//! [`crate::group`]; this module only owns the checks that can run before
//! groups exist.

use std::collections::{HashMap, HashSet};

use crate::error::{ErrorKind, ValidationDetails, ValidationError};
use crate::model::{AdjacentEdge, ConstraintEdge, ConstraintLabel, Guest, GuestId, Table};
use crate::union_find::DisjointSet;

/// The two undirected constraint maps the rest of the solver reads.
#[derive(Clone, Debug, Default)]
pub struct ConstraintGraph {
    /// `guest -> set of guests it may not share a table with`.
    pub cannot: HashMap<GuestId, HashSet<GuestId>>,
    /// `guest -> set of guests it should be a circular neighbor of`.
    pub adjacent: HashMap<GuestId, HashSet<GuestId>>,
}

impl ConstraintGraph {
    /// Builds the undirected maps from the canonical edge lists.
    #[must_use]
    pub fn build(constraints: &[ConstraintEdge], adjacents: &[AdjacentEdge]) -> Self {
        let mut cannot: HashMap<GuestId, HashSet<GuestId>> = HashMap::new();
        let mut adjacent: HashMap<GuestId, HashSet<GuestId>> = HashMap::new();

        for edge in constraints {
            if let ConstraintLabel::Cannot = edge.label {
                insert_undirected(&mut cannot, &edge.a, &edge.b);
            }
        }
        for edge in adjacents {
            insert_undirected(&mut adjacent, &edge.a, &edge.b);
        }

        Self { cannot, adjacent }
    }

    /// Returns whether `a` and `b` carry a `cannot` relation.
    #[must_use]
    pub fn is_cannot(&self, a: &GuestId, b: &GuestId) -> bool {
        self.cannot.get(a).is_some_and(|set| set.contains(b))
    }

    /// Returns the adjacency degree of `guest` (0 if it has no adjacency edges).
    #[must_use]
    pub fn adjacency_degree(&self, guest: &GuestId) -> usize {
        self.adjacent.get(guest).map_or(0, HashSet::len)
    }

    /// Returns the count of `others` that are adjacency-partners of `guest`.
    #[must_use]
    pub fn adjacency_overlap<'a>(
        &self,
        guest: &GuestId,
        others: impl IntoIterator<Item = &'a GuestId>,
    ) -> usize {
        let Some(partners) = self.adjacent.get(guest) else {
            return 0;
        };
        others.into_iter().filter(|o| partners.contains(*o)).count()
    }
}

fn insert_undirected(map: &mut HashMap<GuestId, HashSet<GuestId>>, a: &GuestId, b: &GuestId) {
    map.entry(a.clone()).or_default().insert(b.clone());
    map.entry(b.clone()).or_default().insert(a.clone());
}

/// Runs §4.D items 1-2: adjacency degree and closed-ring checks.
///
/// Items 3-5 depend on group construction and live in
/// [`crate::group::validate_groups`].
#[must_use]
pub fn validate(graph: &ConstraintGraph, guests: &[Guest], tables: &[Table]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    errors.extend(check_degree(graph));
    errors.extend(check_closed_rings(graph, guests, tables));
    errors
}

fn check_degree(graph: &ConstraintGraph) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (guest, partners) in &graph.adjacent {
        if partners.len() > 2 {
            errors.push(ValidationError::new(
                ErrorKind::AdjacencyDegreeViolation,
                format!("guest `{guest}` has {} adjacency partners (max 2)", partners.len()),
                ValidationDetails::Guest {
                    guest: guest.clone(),
                },
            ));
        }
    }
    errors
}

/// Connected components of the adjacency-only graph that form a "simple
/// cycle" per §4.D.2: size >= 3 and every member has adjacency degree
/// exactly 2. Shared with [`crate::group`], which needs the same predicate
/// to flag groups whose placement must land on an exact-capacity table.
#[must_use]
pub(crate) fn simple_cycle_components(graph: &ConstraintGraph) -> Vec<Vec<GuestId>> {
    if graph.adjacent.is_empty() {
        return Vec::new();
    }

    let mut dsu = DisjointSet::new(graph.adjacent.keys().cloned());
    for (guest, partners) in &graph.adjacent {
        for partner in partners {
            dsu.union(guest, partner);
        }
    }

    dsu.components()
        .into_iter()
        .filter(|component| {
            component.len() >= 3 && component.iter().all(|id| graph.adjacency_degree(id) == 2)
        })
        .collect()
}

fn check_closed_rings(
    graph: &ConstraintGraph,
    guests: &[Guest],
    tables: &[Table],
) -> Vec<ValidationError> {
    let counts: HashMap<&GuestId, u32> = guests.iter().map(|g| (&g.id, g.count)).collect();
    let max_capacity = tables.iter().map(|t| t.capacity).max().unwrap_or(0);

    let mut errors = Vec::new();
    for component in simple_cycle_components(graph) {
        let seat_count: u32 = component
            .iter()
            .map(|id| counts.get(id).copied().unwrap_or(1))
            .sum();

        if seat_count > max_capacity {
            errors.push(ValidationError::new(
                ErrorKind::AdjacencyClosedLoopTooBig,
                format!(
                    "closed adjacency ring of size {seat_count} exceeds the largest table capacity ({max_capacity})"
                ),
                ValidationDetails::AdjacencyRing {
                    members: component,
                    seat_count,
                },
            ));
        } else if !tables.iter().any(|t| t.capacity == seat_count) {
            errors.push(ValidationError::new(
                ErrorKind::AdjacencyClosedLoopNotExact,
                format!(
                    "closed adjacency ring of size {seat_count} does not match any table's exact capacity"
                ),
                ValidationDetails::AdjacencyRing {
                    members: component,
                    seat_count,
                },
            ));
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gid(s: &str) -> GuestId {
        GuestId::new(s)
    }

    fn guest(id: &str, count: u32) -> Guest {
        Guest {
            id: gid(id),
            name: id.to_owned(),
            count,
        }
    }

    fn table(id: &str, capacity: u32) -> Table {
        Table {
            id: id.into(),
            name: None,
            capacity,
        }
    }

    #[test]
    fn degree_violation_is_reported_for_three_partners() {
        let adjacents = vec![
            AdjacentEdge { a: gid("a"), b: gid("b") },
            AdjacentEdge { a: gid("a"), b: gid("c") },
            AdjacentEdge { a: gid("a"), b: gid("d") },
        ];
        let graph = ConstraintGraph::build(&[], &adjacents);
        let guests = vec![guest("a", 1), guest("b", 1), guest("c", 1), guest("d", 1)];
        let errors = validate(&graph, &guests, &[table("t1", 10)]);
        assert!(errors.iter().any(|e| e.kind == ErrorKind::AdjacencyDegreeViolation));
    }

    #[test]
    fn exact_ring_produces_no_errors_when_a_table_matches() {
        let adjacents = vec![
            AdjacentEdge { a: gid("a"), b: gid("b") },
            AdjacentEdge { a: gid("b"), b: gid("c") },
            AdjacentEdge { a: gid("c"), b: gid("d") },
            AdjacentEdge { a: gid("d"), b: gid("a") },
        ];
        let graph = ConstraintGraph::build(&[], &adjacents);
        let guests = vec![guest("a", 1), guest("b", 1), guest("c", 1), guest("d", 1)];
        let errors = validate(&graph, &guests, &[table("t1", 4), table("t2", 6)]);
        assert!(errors.is_empty());
    }

    #[test]
    fn ring_with_no_exact_table_is_reported() {
        let adjacents = vec![
            AdjacentEdge { a: gid("a"), b: gid("b") },
            AdjacentEdge { a: gid("b"), b: gid("c") },
            AdjacentEdge { a: gid("c"), b: gid("d") },
            AdjacentEdge { a: gid("d"), b: gid("a") },
        ];
        let graph = ConstraintGraph::build(&[], &adjacents);
        let guests = vec![guest("a", 1), guest("b", 1), guest("c", 1), guest("d", 1)];
        let errors = validate(&graph, &guests, &[table("t1", 6), table("t2", 6)]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::AdjacencyClosedLoopNotExact);
    }

    #[test]
    fn ring_too_big_for_any_table_is_reported() {
        let adjacents = vec![
            AdjacentEdge { a: gid("a"), b: gid("b") },
            AdjacentEdge { a: gid("b"), b: gid("c") },
            AdjacentEdge { a: gid("c"), b: gid("d") },
            AdjacentEdge { a: gid("d"), b: gid("a") },
        ];
        let graph = ConstraintGraph::build(&[], &adjacents);
        let guests = vec![guest("a", 1), guest("b", 1), guest("c", 1), guest("d", 1)];
        let errors = validate(&graph, &guests, &[table("t1", 3)]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::AdjacencyClosedLoopTooBig);
    }

    #[test]
    fn a_path_is_not_a_closed_ring() {
        let adjacents = vec![
            AdjacentEdge { a: gid("a"), b: gid("b") },
            AdjacentEdge { a: gid("b"), b: gid("c") },
        ];
        let graph = ConstraintGraph::build(&[], &adjacents);
        let guests = vec![guest("a", 1), guest("b", 1), guest("c", 1)];
        let errors = validate(&graph, &guests, &[table("t1", 2)]);
        assert!(errors.is_empty());
    }

    #[test]
    fn cannot_map_is_symmetric() {
        let constraints = vec![ConstraintEdge {
            a: gid("a"),
            b: gid("b"),
            label: ConstraintLabel::Cannot,
        }];
        let graph = ConstraintGraph::build(&constraints, &[]);
        assert!(graph.is_cannot(&gid("a"), &gid("b")));
        assert!(graph.is_cannot(&gid("b"), &gid("a")));
    }
}
