//! Per-table circular ordering (§4.G).
//!
//! Turns an unordered set of table occupants into a ring order that
//! maximizes the fraction of local adjacency edges realized as consecutive
//! neighbors, then expands the chosen order into an explicit seat list.

use std::collections::{HashMap, HashSet};

use crate::graph::ConstraintGraph;
use crate::model::{GuestId, Seat};

/// Orders `occupants` into a ring and reports the adjacency-satisfaction
/// ratio of the chosen ordering.
///
/// Returns `(occupants.to_vec(), 1.0)` unchanged when there are fewer than 2
/// occupants or no local adjacency edges exist among them.
#[must_use]
pub fn order_table(occupants: &[GuestId], graph: &ConstraintGraph) -> (Vec<GuestId>, f64) {
    if occupants.len() < 2 {
        return (occupants.to_vec(), 1.0);
    }

    let local = local_adjacency(occupants, graph);
    let total_local_pairs = local.values().map(HashSet::len).sum::<usize>() / 2;
    if total_local_pairs == 0 {
        return (occupants.to_vec(), 1.0);
    }

    let order = build_ring(occupants, &local);
    best_rotation(&order, &local, total_local_pairs)
}

fn local_adjacency(occupants: &[GuestId], graph: &ConstraintGraph) -> HashMap<GuestId, HashSet<GuestId>> {
    let present: HashSet<&GuestId> = occupants.iter().collect();
    let mut local: HashMap<GuestId, HashSet<GuestId>> = HashMap::new();
    for guest in occupants {
        let Some(partners) = graph.adjacent.get(guest) else {
            continue;
        };
        for partner in partners {
            if present.contains(partner) {
                local.entry(guest.clone()).or_default().insert(partner.clone());
            }
        }
    }
    local
}

fn build_ring(occupants: &[GuestId], local: &HashMap<GuestId, HashSet<GuestId>>) -> Vec<GuestId> {
    let degree = |g: &GuestId| local.get(g).map_or(0, HashSet::len);

    let mut start = occupants[0].clone();
    for candidate in occupants.iter().skip(1) {
        let better = degree(candidate) > degree(&start)
            || (degree(candidate) == degree(&start) && candidate < &start);
        if better {
            start = candidate.clone();
        }
    }

    let mut visited: HashSet<GuestId> = HashSet::new();
    let mut order = vec![start.clone()];
    visited.insert(start.clone());
    let first = start.clone();
    let mut last = start;

    while order.len() < occupants.len() {
        let unvisited_neighbor = local
            .get(&last)
            .into_iter()
            .flatten()
            .find(|n| !visited.contains(*n))
            .cloned();

        let next = if let Some(neighbor) = unvisited_neighbor {
            neighbor
        } else {
            pick_best_candidate(occupants, &visited, &last, &first, local)
        };

        visited.insert(next.clone());
        order.push(next.clone());
        last = next;
    }

    order
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "candidate-selection score is a weighted sum over adjacency membership and degree, as defined by the heuristic"
)]
fn pick_best_candidate(
    occupants: &[GuestId],
    visited: &HashSet<GuestId>,
    last: &GuestId,
    first: &GuestId,
    local: &HashMap<GuestId, HashSet<GuestId>>,
) -> GuestId {
    let neighbors_of = |g: &GuestId| local.get(g).cloned().unwrap_or_default();
    let last_neighbors = neighbors_of(last);
    let first_neighbors = neighbors_of(first);

    let mut best: Option<(GuestId, f64)> = None;
    for candidate in occupants {
        if visited.contains(candidate) {
            continue;
        }
        let degree = local.get(candidate).map_or(0, HashSet::len);
        let score = f64::from(u8::from(last_neighbors.contains(candidate)))
            + f64::from(u8::from(first_neighbors.contains(candidate)))
            + 0.01 * (degree as f64);
        let is_better = match &best {
            None => true,
            Some((best_id, best_score)) => {
                score > *best_score || (score == *best_score && candidate < best_id)
            }
        };
        if is_better {
            best = Some((candidate.clone(), score));
        }
    }

    best.map(|(id, _)| id).unwrap_or_else(|| {
        occupants
            .iter()
            .find(|g| !visited.contains(*g))
            .cloned()
            .unwrap_or_else(|| last.clone())
    })
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "adjacency ratio is a plain fraction over counted satisfied/total pairs"
)]
fn best_rotation(
    order: &[GuestId],
    local: &HashMap<GuestId, HashSet<GuestId>>,
    total_local_pairs: usize,
) -> (Vec<GuestId>, f64) {
    let len = order.len();
    let mut best_order = order.to_vec();
    let mut best_ratio = -1.0;

    for shift in 0..len {
        let rotated: Vec<GuestId> = order[shift..].iter().chain(order[..shift].iter()).cloned().collect();
        let satisfied = count_satisfied(&rotated, local);
        let ratio = satisfied as f64 / total_local_pairs as f64;
        if ratio > best_ratio {
            best_ratio = ratio;
            best_order = rotated;
        }
    }

    (best_order, best_ratio)
}

fn count_satisfied(order: &[GuestId], local: &HashMap<GuestId, HashSet<GuestId>>) -> usize {
    let len = order.len();
    // A 2-occupant ring has a single edge that connects its two seats in both
    // directions; counting the wrap-around separately would double it.
    let pairs = if len == 2 { 1 } else { len };
    let mut satisfied = 0;
    for i in 0..pairs {
        let a = &order[i];
        let b = &order[(i + 1) % len];
        if local.get(a).is_some_and(|set| set.contains(b)) {
            satisfied += 1;
        }
    }
    satisfied
}

/// Expands an occupant order into a seat list, assigning each party `count`
/// consecutive seats with a zero-based `party_index`.
#[must_use]
pub fn expand_seats<S: std::hash::BuildHasher>(
    order: &[GuestId],
    counts: &HashMap<GuestId, u32, S>,
) -> Vec<Seat> {
    let mut seats = Vec::new();
    for guest in order {
        let count = counts.get(guest).copied().unwrap_or(1);
        for party_index in 0..count {
            seats.push(Seat {
                guest: guest.clone(),
                party_index,
            });
        }
    }
    seats
}
