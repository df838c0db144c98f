//! Capacity-aware backtracking placement search (§4.F).
//!
//! Grounded structurally on the hashintel constraint solver's block-by-block
//! backtracking with heuristic ordering and forward-checking-style pruning.
//! That solver maintains a persistent `TargetBitSet` of live candidate
//! blocks; this one recomputes admissibility per candidate on every call
//! instead, since groups here number in the tens to low hundreds rather than
//! the thousands of basic blocks that justify a persistent bitset domain.

use std::collections::HashMap;
use std::time::Instant;

use crate::graph::ConstraintGraph;
use crate::group::Group;
use crate::model::{GuestId, Table, TableId};
use crate::rng::XorShift32;

#[derive(Clone, Debug)]
struct TableSlot {
    id: TableId,
    capacity: u32,
    remaining_capacity: u32,
    occupants: Vec<GuestId>,
}

/// The live state of an in-progress or completed placement search.
#[derive(Clone, Debug)]
pub struct PlacementState {
    tables: Vec<TableSlot>,
    /// Final (or in-progress) `guest -> table` assignment.
    pub placed: HashMap<GuestId, TableId>,
}

impl PlacementState {
    fn new(tables: &[Table]) -> Self {
        Self {
            tables: tables
                .iter()
                .map(|t| TableSlot {
                    id: t.id.clone(),
                    capacity: t.capacity,
                    remaining_capacity: t.capacity,
                    occupants: Vec::new(),
                })
                .collect(),
            placed: HashMap::new(),
        }
    }

    fn table_index(&self, id: &TableId) -> Option<usize> {
        self.tables.iter().position(|t| &t.id == id)
    }

    fn occupy(&mut self, table_index: usize, group: &Group) {
        let slot = &mut self.tables[table_index];
        slot.remaining_capacity -= group.size;
        for member in &group.members {
            slot.occupants.push(member.clone());
            self.placed.insert(member.clone(), slot.id.clone());
        }
    }

    fn release(&mut self, table_index: usize, group: &Group) {
        let slot = &mut self.tables[table_index];
        slot.remaining_capacity += group.size;
        for member in &group.members {
            slot.occupants.retain(|o| o != member);
            self.placed.remove(member);
        }
    }

    fn occupants_of(&self, table_index: usize) -> &[GuestId] {
        &self.tables[table_index].occupants
    }

    /// Returns the final per-table occupant lists, one entry per input table
    /// (including empty tables), in input order.
    #[must_use]
    pub fn table_occupants(&self) -> Vec<(TableId, Vec<GuestId>)> {
        self.tables
            .iter()
            .map(|slot| (slot.id.clone(), slot.occupants.clone()))
            .collect()
    }
}

/// Places every group at some table, respecting capacity, cannot-edges, and
/// pre-assignment restrictions.
///
/// `groups` must already be sorted hardest-first (see [`crate::group::build_groups`]).
/// Returns `None` if the deadline passes, the attempt cap is exceeded, or no
/// feasible placement was found.
#[must_use]
pub fn place(
    groups: &[Group],
    tables: &[Table],
    graph: &ConstraintGraph,
    rng: &mut XorShift32,
    deadline: Instant,
    max_attempts: u32,
) -> Option<PlacementState> {
    let mut state = PlacementState::new(tables);
    let mut attempts: u32 = 0;

    if !place_preassigned(groups, &mut state, graph) {
        return None;
    }

    let remaining: Vec<&Group> = groups.iter().filter(|g| g.preassigned_table.is_none()).collect();

    if backtrack(&remaining, 0, &mut state, graph, rng, deadline, max_attempts, &mut attempts) {
        Some(state)
    } else {
        None
    }
}

fn place_preassigned(groups: &[Group], state: &mut PlacementState, graph: &ConstraintGraph) -> bool {
    for group in groups {
        let Some(table_id) = &group.preassigned_table else {
            continue;
        };
        let Some(index) = state.table_index(table_id) else {
            return false;
        };
        if !is_admissible(state, index, group, graph) {
            return false;
        }
        state.occupy(index, group);
    }
    true
}

#[expect(clippy::too_many_arguments, reason = "backtracking step threads the full search context by design")]
fn backtrack(
    groups: &[&Group],
    position: usize,
    state: &mut PlacementState,
    graph: &ConstraintGraph,
    rng: &mut XorShift32,
    deadline: Instant,
    max_attempts: u32,
    attempts: &mut u32,
) -> bool {
    if position == groups.len() {
        return true;
    }
    if Instant::now() >= deadline || *attempts >= max_attempts {
        return false;
    }
    *attempts += 1;

    let group = groups[position];
    let mut candidates = rank_candidates(state, group, graph);
    shuffle_within_score_buckets(&mut candidates, rng);

    for (index, _score) in candidates {
        state.occupy(index, group);
        if backtrack(groups, position + 1, state, graph, rng, deadline, max_attempts, attempts) {
            return true;
        }
        state.release(index, group);
    }

    false
}

fn is_admissible(state: &PlacementState, table_index: usize, group: &Group, graph: &ConstraintGraph) -> bool {
    let slot_capacity_ok = state.tables[table_index].remaining_capacity >= group.size;
    if !slot_capacity_ok {
        return false;
    }

    if !group.allowed_tables.is_empty() && !group.allowed_tables.contains(&state.tables[table_index].id) {
        return false;
    }

    if let Some(required) = group.ring_seat_count {
        if state.tables[table_index].capacity != required {
            return false;
        }
    }

    for occupant in state.occupants_of(table_index) {
        if group.cannot_neighbors.contains(occupant) {
            return false;
        }
        for member in &group.members {
            if graph.is_cannot(member, occupant) {
                return false;
            }
        }
    }

    true
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_possible_wrap,
    reason = "score combines an adjacency-overlap bonus with a signed capacity-fit term, as defined by the ranking formula"
)]
fn rank_candidates(state: &PlacementState, group: &Group, graph: &ConstraintGraph) -> Vec<(usize, i64)> {
    let mut scored: Vec<(usize, i64)> = Vec::new();
    for index in 0..state.tables.len() {
        if !is_admissible(state, index, group, graph) {
            continue;
        }
        let occupants = state.occupants_of(index);
        let overlap = group
            .members
            .iter()
            .map(|m| graph.adjacency_overlap(m, occupants.iter()))
            .sum::<usize>();
        let remaining = state.tables[index].remaining_capacity;
        let score = i64::try_from(overlap).unwrap_or(i64::MAX) * 10
            - i64::from(remaining.saturating_sub(group.size));
        scored.push((index, score));
    }
    scored.sort_by(|a, b| {
        b.1.cmp(&a.1)
            .then_with(|| state.tables[a.0].id.cmp(&state.tables[b.0].id))
    });
    scored
}

fn shuffle_within_score_buckets(candidates: &mut [(usize, i64)], rng: &mut XorShift32) {
    let mut start = 0;
    while start < candidates.len() {
        let score = candidates[start].1;
        let mut end = start + 1;
        while end < candidates.len() && candidates[end].1 == score {
            end += 1;
        }
        rng.shuffle(&mut candidates[start..end]);
        start = end;
    }
}
