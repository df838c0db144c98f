//! Plan summary formatting and the adjacency-only conflict query (§4.J).
//!
//! Grounded on `chutoro-cli::cli::commands::render_summary`'s shape (a
//! header line followed by per-section detail) but living in the core crate
//! rather than the CLI, since §6 names `summarize_plan` as one of the core's
//! three public entry points, not a CLI-only concern.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::error::ValidationError;
use crate::model::{Guest, GuestId, Plan, Table, TableId};
use crate::normalize::{RawAdjacents, RawAssignments, RawConstraints, RawGuest, RawTable};

/// Formats a human-readable description of `plan`: a header with score
/// percentages, then one section per table listing occupants in ring order.
///
/// Pure: performs no I/O and always returns the same string for the same
/// arguments.
#[must_use]
pub fn summarize_plan(plan: &Plan, guests: &[Guest], tables: &[Table]) -> String {
    let names: HashMap<&GuestId, &str> = guests.iter().map(|g| (&g.id, g.name.as_str())).collect();
    let counts: HashMap<&GuestId, u32> = guests.iter().map(|g| (&g.id, g.count)).collect();
    let table_names: HashMap<&TableId, &str> = tables
        .iter()
        .filter_map(|t| t.name.as_deref().map(|name| (&t.id, name)))
        .collect();

    let mut out = String::new();
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "header renders metrics as whole-number percentages for display"
    )]
    {
        let _ = writeln!(
            out,
            "Plan score {:.0}% (adjacency {:.0}%, utilization {:.0}%, balance {:.0}%)",
            (plan.score * 100.0).round(),
            (plan.metrics.adjacency_satisfaction * 100.0).round(),
            (plan.metrics.capacity_utilization * 100.0).round(),
            (plan.metrics.balance * 100.0).round(),
        );
    }

    for seating in &plan.seating {
        if seating.order.is_empty() {
            continue;
        }
        let label = table_names.get(&seating.table).copied().unwrap_or_else(|| seating.table.as_str());
        let _ = writeln!(out, "\nTable {label}:");
        for guest in &seating.order {
            let name = names.get(guest).copied().unwrap_or_else(|| guest.as_str());
            let count = counts.get(guest).copied().unwrap_or(1);
            let _ = writeln!(out, "  - {name} (party of {count})");
        }
    }

    out
}

/// Runs the same §4.C-§4.E validations as [`crate::driver::detect_conflicts`]
/// but keeps only errors in the adjacency family
/// ([`crate::error::ErrorKind::is_adjacency`]).
///
/// Used by interactive hosts that want to surface adjacency-specific
/// problems (degree violations, ring sizing) without the noise of unrelated
/// input errors.
#[must_use]
#[expect(
    clippy::implicit_hasher,
    reason = "RawConstraints/RawAdjacents/RawAssignments are the contractual JSON-shaped input types named by the external interface, not a detail callers should parameterize over"
)]
pub fn detect_conflicts_adjacency_only(
    guests: &[RawGuest],
    tables: &[RawTable],
    constraints: &RawConstraints,
    adjacents: &RawAdjacents,
    assignments: &RawAssignments,
) -> Vec<ValidationError> {
    crate::driver::detect_conflicts(guests, tables, constraints, adjacents, assignments)
        .into_iter()
        .filter(|e| e.kind.is_adjacency())
        .collect()
}
