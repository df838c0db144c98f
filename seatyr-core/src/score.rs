//! Plan scoring and deduplication (§4.H).

use crate::model::{GuestId, PlanMetrics, ScoreWeights, TableId, TableSeating};

/// Computes the three scalar quality metrics for a set of table seatings.
///
/// `capacities` must contain every table in `seatings` plus any empty table
/// that should still count toward total capacity.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "metric computation is plain averaging/fraction arithmetic over the defined formulas"
)]
pub fn score_plan(seatings: &[TableSeating], capacities: &[(TableId, u32)]) -> PlanMetrics {
    let non_empty: Vec<&TableSeating> = seatings.iter().filter(|s| !s.order.is_empty()).collect();

    let adjacency_satisfaction = if non_empty.is_empty() {
        1.0
    } else {
        non_empty.iter().map(|s| s.adjacency_ratio).sum::<f64>() / non_empty.len() as f64
    };

    let total_capacity: u32 = capacities.iter().map(|(_, cap)| *cap).sum();
    let seats_used: usize = seatings.iter().map(|s| s.seats.len()).sum();
    let capacity_utilization = if total_capacity == 0 {
        0.0
    } else {
        seats_used as f64 / f64::from(total_capacity)
    };

    let balance = if non_empty.is_empty() {
        1.0
    } else {
        let capacity_of = |id: &TableId| {
            capacities
                .iter()
                .find(|(cap_id, _)| cap_id == id)
                .map_or(1, |(_, cap)| *cap)
        };
        let mean_deviation = non_empty
            .iter()
            .map(|s| {
                let capacity = capacity_of(&s.table).max(1);
                let fill_fraction = s.seats.len() as f64 / f64::from(capacity);
                (0.8 - fill_fraction).abs()
            })
            .sum::<f64>()
            / non_empty.len() as f64;
        1.0 - mean_deviation
    };

    PlanMetrics {
        adjacency_satisfaction,
        capacity_utilization,
        balance,
    }
}

/// Combines [`PlanMetrics`] into a single aggregate score under `weights`.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "aggregate score is the weighted sum defined by the scoring contract"
)]
pub fn aggregate_score(metrics: &PlanMetrics, weights: ScoreWeights) -> f64 {
    weights.adjacency * metrics.adjacency_satisfaction
        + weights.utilization * metrics.capacity_utilization
        + weights.balance * metrics.balance
}

/// A stable 32-bit hash of the occupant partition, used to deduplicate plans
/// that assign the same guests to the same tables regardless of intra-table
/// ordering.
///
/// Folds, in ascending `TableId` order, each table's id and the
/// lexicographically sorted list of its occupants' `GuestId`s into a rolling
/// hash over Unicode scalar values. A NUL separator is inserted between
/// fields to avoid boundary collisions (e.g. table `"1"` with occupant `"23"`
/// versus table `"12"` with occupant `"3"`), which the concatenation-only
/// description in the reference algorithm leaves unspecified.
#[must_use]
pub fn partition_key(seatings: &[TableSeating]) -> u32 {
    let mut tables: Vec<(&TableId, Vec<&GuestId>)> = seatings
        .iter()
        .map(|s| {
            let mut occupants: Vec<&GuestId> = s.order.iter().collect();
            occupants.sort();
            (&s.table, occupants)
        })
        .collect();
    tables.sort_by_key(|(id, _)| (*id).clone());

    let mut hash: u32 = 0;
    for (table_id, occupants) in tables {
        hash = fold_str(hash, table_id.as_str());
        hash = fold_char(hash, '\0');
        for occupant in occupants {
            hash = fold_str(hash, occupant.as_str());
            hash = fold_char(hash, '\0');
        }
    }
    hash
}

fn fold_str(mut hash: u32, value: &str) -> u32 {
    for ch in value.chars() {
        hash = fold_char(hash, ch);
    }
    hash
}

fn fold_char(hash: u32, ch: char) -> u32 {
    let code = ch as u32;
    (hash << 5).wrapping_sub(hash).wrapping_add(code)
}
