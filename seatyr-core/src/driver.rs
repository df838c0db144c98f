//! Multi-seed search driver (§4.I) and the top-level validation entry point
//! `detect_conflicts` (§6.2).
//!
//! Parallelizing the seed loop below is explicitly not attempted here: §5
//! only requires that an implementation which *chooses* to parallelize
//! partition the seed space deterministically and merge per-worker
//! dedup tables with the same key and keep-best-score policy so externally
//! observable output matches the sequential version. This mirrors how
//! `chutoro-core::chutoro::run_gpu` documents an unimplemented backend
//! instead of silently pretending one exists.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::error::{has_fatal_error, ValidationError};
use crate::graph::{self, ConstraintGraph};
use crate::group::{self, Group};
use crate::model::{Plan, ScoreWeights, TableId, TableSeating};
use crate::normalize::{self, NormalizedInput, RawAdjacents, RawAssignments, RawConstraints, RawGuest, RawTable};
use crate::ordering;
use crate::placement;
use crate::rng::XorShift32;
use crate::score;

/// Tunable parameters for [`generate_plans`].
///
/// `Default` yields the free-tier preset ([`GenerateOptions::free`]).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Base RNG seed. A zero seed is remapped by [`XorShift32`].
    pub seed: u32,
    /// Wall-clock search budget in milliseconds.
    pub time_budget_ms: u64,
    /// Stop once this many distinct plans have been kept.
    pub target_plans: u32,
    /// Per-run backtracking attempt cap.
    pub max_attempts_per_run: u32,
    /// Multiplier used to compute `max_runs` from `target_plans`.
    pub runs_multiplier: u32,
    /// Weights applied when aggregating [`PlanMetrics`] into a score.
    pub weights: ScoreWeights,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self::free()
    }
}

impl GenerateOptions {
    /// The free-tier preset: `time_budget_ms = 1500`, `target_plans = 10`.
    #[must_use]
    pub fn free() -> Self {
        Self {
            seed: 0,
            time_budget_ms: 1_500,
            target_plans: 10,
            max_attempts_per_run: 7_500,
            runs_multiplier: 3,
            weights: ScoreWeights::default(),
        }
    }

    /// The premium-tier preset: `time_budget_ms = 3500`, `target_plans = 30`.
    #[must_use]
    pub fn premium() -> Self {
        Self {
            time_budget_ms: 3_500,
            target_plans: 30,
            ..Self::free()
        }
    }

    fn max_runs(&self) -> u32 {
        (self.target_plans * self.runs_multiplier).max(self.target_plans + 5)
    }
}

struct Validated {
    normalized: NormalizedInput,
    graph: ConstraintGraph,
    groups: Vec<Group>,
    errors: Vec<ValidationError>,
}

fn validate_all(
    guests: &[RawGuest],
    tables: &[RawTable],
    constraints: &RawConstraints,
    adjacents: &RawAdjacents,
    assignments: &RawAssignments,
) -> Validated {
    let (normalized, mut errors) = normalize::normalize(guests, tables, constraints, adjacents, assignments);

    let graph = ConstraintGraph::build(&normalized.constraints, &normalized.adjacents);
    errors.extend(graph::validate(&graph, &normalized.guests, &normalized.tables));

    let groups = group::build_groups(
        &normalized.guests,
        &normalized.constraints,
        &graph,
        &normalized.assignments,
    );
    errors.extend(group::validate_groups(&groups, &graph, &normalized.tables));

    Validated {
        normalized,
        graph,
        groups,
        errors,
    }
}

/// Runs §4.C-§4.E validation only and returns the accumulated errors,
/// without invoking the search. Used by interactive hosts to surface
/// conflicts immediately on input edits.
#[instrument(
    name = "core.detect_conflicts",
    skip(guests, tables, constraints, adjacents, assignments),
    fields(guest_count = guests.len(), table_count = tables.len())
)]
#[must_use]
#[expect(
    clippy::implicit_hasher,
    reason = "RawConstraints/RawAdjacents/RawAssignments are the contractual JSON-shaped input types named by the external interface, not a detail callers should parameterize over"
)]
pub fn detect_conflicts(
    guests: &[RawGuest],
    tables: &[RawTable],
    constraints: &RawConstraints,
    adjacents: &RawAdjacents,
    assignments: &RawAssignments,
) -> Vec<ValidationError> {
    validate_all(guests, tables, constraints, adjacents, assignments).errors
}

/// Runs the full solve: validation, then (if no fatal error was found) the
/// multi-seed backtracking search, returning a score-sorted, deduplicated
/// plan list alongside every validation error encountered.
#[instrument(
    name = "core.generate_plans",
    skip(guests, tables, constraints, adjacents, assignments, options),
    fields(guest_count = guests.len(), table_count = tables.len())
)]
#[must_use]
#[expect(
    clippy::implicit_hasher,
    reason = "RawConstraints/RawAdjacents/RawAssignments are the contractual JSON-shaped input types named by the external interface, not a detail callers should parameterize over"
)]
pub fn generate_plans(
    guests: &[RawGuest],
    tables: &[RawTable],
    constraints: &RawConstraints,
    adjacents: &RawAdjacents,
    assignments: &RawAssignments,
    options: &GenerateOptions,
) -> (Vec<Plan>, Vec<ValidationError>) {
    let validated = validate_all(guests, tables, constraints, adjacents, assignments);

    if has_fatal_error(&validated.errors) {
        warn!(error_count = validated.errors.len(), "fatal validation errors, search skipped");
        return (Vec::new(), validated.errors);
    }

    if validated.normalized.guests.is_empty() {
        info!("no guests supplied, returning a single empty plan");
        return (vec![empty_plan(&validated.normalized.tables)], validated.errors);
    }

    let plans = run_search(&validated, options);
    info!(plan_count = plans.len(), "search complete");
    (plans, validated.errors)
}

fn empty_plan(tables: &[crate::model::Table]) -> Plan {
    let seating: Vec<TableSeating> = tables
        .iter()
        .map(|t| TableSeating {
            table: t.id.clone(),
            order: Vec::new(),
            seats: Vec::new(),
            adjacency_ratio: 1.0,
        })
        .collect();
    let capacities: Vec<(TableId, u32)> = tables.iter().map(|t| (t.id.clone(), t.capacity)).collect();
    let metrics = score::score_plan(&seating, &capacities);
    let weights = ScoreWeights::default();
    Plan {
        assignment: HashMap::new(),
        seating,
        score: score::aggregate_score(&metrics, weights),
        metrics,
    }
}

fn run_search(validated: &Validated, options: &GenerateOptions) -> Vec<Plan> {
    let mut base_rng = XorShift32::new(options.seed);
    let global_deadline = Instant::now() + Duration::from_millis(options.time_budget_ms);
    let max_runs = options.max_runs();

    let counts: HashMap<crate::model::GuestId, u32> = validated
        .normalized
        .guests
        .iter()
        .map(|g| (g.id.clone(), g.count))
        .collect();
    let capacities: Vec<(TableId, u32)> = validated
        .normalized
        .tables
        .iter()
        .map(|t| (t.id.clone(), t.capacity))
        .collect();

    let mut keys: HashMap<u32, usize> = HashMap::new();
    let mut plans: Vec<Plan> = Vec::new();

    let per_run_budget_ms = (options.time_budget_ms / u64::from(max_runs.max(1))).max(60);

    for run in 0..max_runs {
        if Instant::now() >= global_deadline || plans.len() >= options.target_plans as usize {
            break;
        }

        let mut run_rng = base_rng.derive(run);

        let per_run_deadline = global_deadline.min(Instant::now() + Duration::from_millis(per_run_budget_ms));

        let Some(state) = placement::place(
            &validated.groups,
            &validated.normalized.tables,
            &validated.graph,
            &mut run_rng,
            per_run_deadline,
            options.max_attempts_per_run,
        ) else {
            continue;
        };

        let seating: Vec<TableSeating> = state
            .table_occupants()
            .into_iter()
            .map(|(table_id, occupants)| {
                let (order, ratio) = ordering::order_table(&occupants, &validated.graph);
                let seats = ordering::expand_seats(&order, &counts);
                TableSeating {
                    table: table_id,
                    order,
                    seats,
                    adjacency_ratio: ratio,
                }
            })
            .collect();

        let metrics = score::score_plan(&seating, &capacities);
        let aggregate = score::aggregate_score(&metrics, options.weights);
        let key = score::partition_key(&seating);

        let plan = Plan {
            assignment: state.placed,
            seating,
            metrics,
            score: aggregate,
        };

        match keys.get(&key) {
            Some(&index) => {
                if plan.score > plans[index].score {
                    plans[index] = plan;
                }
            }
            None => {
                keys.insert(key, plans.len());
                plans.push(plan);
            }
        }
    }

    plans.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    plans
}
