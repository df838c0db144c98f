//! Group formation (§4.E) and the group-dependent validations of §4.D
//! items 3-5.
//!
//! A [`Group`] is the atomic placement unit: every member of a group is
//! seated at the same table. Groups are formed by fusing `must` edges and
//! `adjacent` edges in one [`DisjointSet`] (adjacency implies same-table for
//! grouping purposes, per spec decision §9.1), then annotated with the
//! aggregate attributes the placement search reads.

use std::collections::{HashMap, HashSet};

use crate::error::{ErrorKind, ValidationDetails, ValidationError};
use crate::graph::{self, ConstraintGraph};
use crate::model::{ConstraintEdge, ConstraintLabel, Guest, GuestId, PreAssignments, Table, TableId};
use crate::union_find::DisjointSet;

/// A maximal set of guests fused by `must`/`adjacent` edges, placed atomically.
#[derive(Clone, Debug, PartialEq)]
pub struct Group {
    /// Member guest ids, in first-seen order.
    pub members: Vec<GuestId>,
    /// Aggregate head-count across members.
    pub size: u32,
    /// Union of members' `cannot` partners.
    pub cannot_neighbors: HashSet<GuestId>,
    /// Sum of members' adjacency degree.
    pub adjacency_degree: u32,
    /// Intersection of members' non-empty pre-assignment sets.
    pub allowed_tables: HashSet<TableId>,
    /// The single table in `allowed_tables`, if there is exactly one.
    pub preassigned_table: Option<TableId>,
    /// Whether any member declared a non-empty pre-assignment at all.
    ///
    /// Distinguishes "no member restricted, so the intersection is trivially
    /// empty" from "members restricted and their sets did not intersect".
    pub had_restriction: bool,
    /// `Some(seat_count)` when this group's members are exactly a closed
    /// adjacency ring (§4.D.2): placement must then restrict it to a table
    /// whose capacity equals `seat_count` exactly, not merely a table large
    /// enough to hold it.
    pub ring_seat_count: Option<u32>,
}

impl Group {
    fn root_id(&self) -> &GuestId {
        // The lexicographically smallest member id stands in for a stable
        // root identity for tie-breaking, independent of DSU internals.
        self.members.iter().min().unwrap_or(&self.members[0])
    }

    fn ordering_key(&self) -> i64 {
        let base = i64::from(self.size)
            + i64::try_from(self.cannot_neighbors.len()).unwrap_or(i64::MAX)
            + i64::from(self.adjacency_degree);
        if self.preassigned_table.is_some() {
            base - 1000
        } else {
            base
        }
    }
}

/// Builds groups from must/adjacent edges and every known guest.
///
/// Guests with no edges at all form singleton groups.
#[must_use]
pub fn build_groups(
    guests: &[Guest],
    constraints: &[ConstraintEdge],
    graph: &ConstraintGraph,
    assignments: &PreAssignments,
) -> Vec<Group> {
    let mut dsu = DisjointSet::new(guests.iter().map(|g| g.id.clone()));

    for edge in constraints {
        if let ConstraintLabel::Must = edge.label {
            dsu.union(&edge.a, &edge.b);
        }
    }
    for (guest, partners) in &graph.adjacent {
        for partner in partners {
            dsu.union(guest, partner);
        }
    }

    let counts: HashMap<&GuestId, u32> = guests.iter().map(|g| (&g.id, g.count)).collect();

    let ring_member_sets: Vec<HashSet<GuestId>> = graph::simple_cycle_components(graph)
        .into_iter()
        .map(|members| members.into_iter().collect())
        .collect();

    let mut groups: Vec<Group> = dsu
        .components()
        .into_iter()
        .map(|members| build_group(members, &counts, graph, assignments, &ring_member_sets))
        .collect();

    sort_hardest_first(&mut groups);
    groups
}

fn build_group(
    members: Vec<GuestId>,
    counts: &HashMap<&GuestId, u32>,
    graph: &ConstraintGraph,
    assignments: &PreAssignments,
    ring_member_sets: &[HashSet<GuestId>],
) -> Group {
    let size = members
        .iter()
        .map(|m| counts.get(m).copied().unwrap_or(1))
        .sum();

    let mut cannot_neighbors = HashSet::new();
    let mut adjacency_degree: u32 = 0;
    for member in &members {
        if let Some(partners) = graph.cannot.get(member) {
            cannot_neighbors.extend(partners.iter().cloned());
        }
        adjacency_degree += u32::try_from(graph.adjacency_degree(member)).unwrap_or(u32::MAX);
    }

    let (allowed_tables, had_restriction) = intersect_allowed_tables(&members, assignments);
    let preassigned_table = single_element(&allowed_tables);

    // Only an exact match to a detected ring's member set gets the
    // exact-capacity placement restriction; a group fused further by `must`
    // edges is no longer just that ring and is left to the ordinary checks.
    let member_set: HashSet<GuestId> = members.iter().cloned().collect();
    let ring_seat_count = ring_member_sets
        .iter()
        .any(|ring| ring == &member_set)
        .then_some(size);

    Group {
        members,
        size,
        cannot_neighbors,
        adjacency_degree,
        allowed_tables,
        preassigned_table,
        had_restriction,
        ring_seat_count,
    }
}

fn intersect_allowed_tables(
    members: &[GuestId],
    assignments: &PreAssignments,
) -> (HashSet<TableId>, bool) {
    let mut restricting = members
        .iter()
        .map(|m| assignments.tables_for(m))
        .filter(|tables| !tables.is_empty());

    let Some(first) = restricting.next() else {
        return (HashSet::new(), false);
    };
    let mut acc: HashSet<TableId> = first.iter().cloned().collect();
    for tables in restricting {
        let set: HashSet<TableId> = tables.iter().cloned().collect();
        acc = acc.intersection(&set).cloned().collect();
    }
    (acc, true)
}

fn single_element(set: &HashSet<TableId>) -> Option<TableId> {
    let mut iter = set.iter();
    let first = iter.next()?;
    if iter.next().is_some() {
        None
    } else {
        Some(first.clone())
    }
}

fn sort_hardest_first(groups: &mut [Group]) {
    groups.sort_by(|a, b| {
        b.ordering_key()
            .cmp(&a.ordering_key())
            .then_with(|| a.root_id().cmp(b.root_id()))
    });
}

/// Runs §4.D items 3-5, the checks that depend on group membership.
#[must_use]
pub fn validate_groups(
    groups: &[Group],
    graph: &ConstraintGraph,
    tables: &[Table],
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let max_capacity = tables.iter().map(|t| t.capacity).max().unwrap_or(0);

    for group in groups {
        errors.extend(check_intra_group_contradiction(group, graph));

        if group.size > max_capacity {
            errors.push(ValidationError::new(
                ErrorKind::GroupTooBigForAnyTable,
                format!(
                    "group of size {} exceeds the largest table capacity ({max_capacity})",
                    group.size
                ),
                ValidationDetails::Group {
                    members: group.members.clone(),
                },
            ));
        }

        if group.had_restriction && group.allowed_tables.is_empty() {
            errors.push(ValidationError::new(
                ErrorKind::AssignmentConflict,
                "group members' pre-assignments do not intersect".to_owned(),
                ValidationDetails::Group {
                    members: group.members.clone(),
                },
            ));
        }
    }

    errors
}

fn check_intra_group_contradiction(group: &Group, graph: &ConstraintGraph) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let member_set: HashSet<&GuestId> = group.members.iter().collect();
    let mut reported: HashSet<(GuestId, GuestId)> = HashSet::new();

    for member in &group.members {
        let Some(partners) = graph.cannot.get(member) else {
            continue;
        };
        for partner in partners {
            if !member_set.contains(partner) {
                continue;
            }
            let key = if member <= partner {
                (member.clone(), partner.clone())
            } else {
                (partner.clone(), member.clone())
            };
            if reported.insert(key.clone()) {
                errors.push(ValidationError::new(
                    ErrorKind::CantWithinMustGroup,
                    format!(
                        "guests `{}` and `{}` are in the same group but carry a cannot edge",
                        key.0, key.1
                    ),
                    ValidationDetails::GuestPair {
                        a: key.0,
                        b: key.1,
                    },
                ));
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    #![expect(clippy::expect_used, reason = "tests require contextual panics")]
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

    #[test]
    fn singleton_guests_form_their_own_group() {
        let guests = vec![guest("a", 1), guest("b", 1)];
        let graph = ConstraintGraph::default();
        let groups = build_groups(&guests, &[], &graph, &PreAssignments::default());
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|g| g.size == 1));
    }

    #[test]
    fn must_edge_fuses_two_guests_into_one_group() {
        let guests = vec![guest("a", 2), guest("b", 2)];
        let constraints = vec![ConstraintEdge {
            a: gid("a"),
            b: gid("b"),
            label: ConstraintLabel::Must,
        }];
        let graph = ConstraintGraph::default();
        let groups = build_groups(&guests, &constraints, &graph, &PreAssignments::default());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].size, 4);
    }

    #[test]
    fn adjacency_behaves_as_implicit_must() {
        let guests = vec![guest("a", 1), guest("b", 1), guest("c", 1)];
        let adjacents = vec![crate::model::AdjacentEdge { a: gid("a"), b: gid("b") }];
        let graph = ConstraintGraph::build(&[], &adjacents);
        let groups = build_groups(&guests, &[], &graph, &PreAssignments::default());
        assert_eq!(groups.len(), 2);
        let fused = groups.iter().find(|g| g.size == 2).expect("fused group exists");
        assert!(fused.members.contains(&gid("a")));
        assert!(fused.members.contains(&gid("b")));
    }

    #[test]
    fn preassigned_group_sorts_before_larger_unassigned_group() {
        let guests = vec![
            guest("small", 1),
            guest("big1", 1),
            guest("big2", 1),
            guest("big3", 1),
        ];
        let constraints = vec![
            ConstraintEdge {
                a: gid("big1"),
                b: gid("big2"),
                label: ConstraintLabel::Must,
            },
            ConstraintEdge {
                a: gid("big2"),
                b: gid("big3"),
                label: ConstraintLabel::Must,
            },
        ];
        let mut map = HashMap::new();
        map.insert(gid("small"), vec![TableId::new("1")]);
        let assignments = PreAssignments(map);
        let graph = ConstraintGraph::default();
        let groups = build_groups(&guests, &constraints, &graph, &assignments);
        assert_eq!(groups[0].members, vec![gid("small")]);
    }

    #[test]
    fn intra_group_cannot_edge_is_reported() {
        let guests = vec![guest("a", 1), guest("b", 1), guest("c", 1)];
        let constraints = vec![
            ConstraintEdge {
                a: gid("a"),
                b: gid("b"),
                label: ConstraintLabel::Must,
            },
            ConstraintEdge {
                a: gid("b"),
                b: gid("c"),
                label: ConstraintLabel::Must,
            },
            ConstraintEdge {
                a: gid("a"),
                b: gid("c"),
                label: ConstraintLabel::Cannot,
            },
        ];
        let graph = ConstraintGraph::build(&constraints, &[]);
        let groups = build_groups(&guests, &constraints, &graph, &PreAssignments::default());
        let errors = validate_groups(&groups, &graph, &[Table { id: "t1".into(), name: None, capacity: 10 }]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::CantWithinMustGroup);
    }

    #[test]
    fn closed_ring_group_carries_its_exact_seat_count() {
        let guests = vec![guest("a", 1), guest("b", 1), guest("c", 1), guest("d", 1)];
        let adjacents = vec![
            crate::model::AdjacentEdge { a: gid("a"), b: gid("b") },
            crate::model::AdjacentEdge { a: gid("b"), b: gid("c") },
            crate::model::AdjacentEdge { a: gid("c"), b: gid("d") },
            crate::model::AdjacentEdge { a: gid("d"), b: gid("a") },
        ];
        let graph = ConstraintGraph::build(&[], &adjacents);
        let groups = build_groups(&guests, &[], &graph, &PreAssignments::default());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].ring_seat_count, Some(4));
    }

    #[test]
    fn non_ring_group_has_no_ring_seat_count() {
        let guests = vec![guest("a", 1), guest("b", 1), guest("c", 1)];
        let adjacents = vec![crate::model::AdjacentEdge { a: gid("a"), b: gid("b") }];
        let graph = ConstraintGraph::build(&[], &adjacents);
        let groups = build_groups(&guests, &[], &graph, &PreAssignments::default());
        assert!(groups.iter().all(|g| g.ring_seat_count.is_none()));
    }

    #[test]
    fn oversize_group_is_reported() {
        let guests = vec![guest("a", 5), guest("b", 5)];
        let constraints = vec![ConstraintEdge {
            a: gid("a"),
            b: gid("b"),
            label: ConstraintLabel::Must,
        }];
        let graph = ConstraintGraph::default();
        let groups = build_groups(&guests, &constraints, &graph, &PreAssignments::default());
        let errors = validate_groups(&groups, &graph, &[Table { id: "t1".into(), name: None, capacity: 8 }]);
        assert!(errors.iter().any(|e| e.kind == ErrorKind::GroupTooBigForAnyTable));
    }
}
