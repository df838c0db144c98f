//! Constraint-satisfaction seating solver.
//!
//! `seatyr_core` assigns guest parties to tables so that a set of
//! relational constraints (`must`, `cannot`, `adjacent`, pre-assignment)
//! is satisfied and the resulting layout scores well on adjacency
//! satisfaction, capacity utilization, and balance. The crate is synchronous,
//! performs no I/O, and holds no state between calls: every entry point
//! takes its inputs, RNG seed, and options explicitly and returns owned
//! values.
//!
//! Three entry points make up the public contract:
//!
//! - [`generate_plans`] runs the full solve and returns a score-sorted,
//!   deduplicated list of plans plus any validation errors.
//! - [`detect_conflicts`] runs validation only, for hosts that want to
//!   surface problems without paying for a search.
//! - [`summarize_plan`] formats a plan as a human-readable string.
//!
//! All other items in this crate exist to support those three functions and
//! are exposed for hosts that want finer-grained control (e.g. running the
//! placement search directly against a pre-built [`ConstraintGraph`]).

mod driver;
mod error;
mod graph;
mod group;
mod model;
mod normalize;
mod ordering;
mod placement;
mod rng;
mod score;
mod summary;
mod union_find;

pub use driver::{detect_conflicts, generate_plans, GenerateOptions};
pub use error::{has_fatal_error, ErrorKind, ValidationDetails, ValidationError};
pub use graph::ConstraintGraph;
pub use group::Group;
pub use model::{
    AdjacentEdge, ConstraintEdge, ConstraintLabel, Guest, GuestId, Plan, PlanMetrics, PreAssignments,
    Seat, ScoreWeights, Table, TableId, TableSeating,
};
pub use normalize::{
    normalize, NormalizedInput, RawAdjacents, RawAssignments, RawConstraints, RawGuest, RawTable,
};
pub use ordering::{expand_seats, order_table};
pub use placement::{place, PlacementState};
pub use rng::XorShift32;
pub use score::{aggregate_score, partition_key, score_plan};
pub use summary::{detect_conflicts_adjacency_only, summarize_plan};
pub use union_find::DisjointSet;
