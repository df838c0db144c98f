//! Canonical data model for the seating solver.
//!
//! The normalizer ([`crate::normalize`]) is the only component that sees raw,
//! loosely-typed external input; every other component operates on the
//! typed, canonical values defined here.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Opaque, stable identifier for a guest party.
///
/// Cheaply cloneable (an `Arc<str>` under the hood) since identifiers are
/// threaded through almost every solver data structure.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuestId(Arc<str>);

impl GuestId {
    /// Builds a guest identifier from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GuestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GuestId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for GuestId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Opaque, stable identifier for a table.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableId(Arc<str>);

impl TableId {
    /// Builds a table identifier from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TableId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TableId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// A single guest party: one or more physical people sharing a `GuestId` who
/// are always seated together.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Guest {
    /// Stable identifier, unique within an invocation.
    pub id: GuestId,
    /// Display name (synthesized by the normalizer when absent).
    pub name: String,
    /// Number of physical seats this party consumes. Always `>= 1`.
    pub count: u32,
}

/// A table with a fixed seating capacity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Stable identifier, unique within an invocation.
    pub id: TableId,
    /// Optional display name.
    pub name: Option<String>,
    /// Number of seats at the table. Always `>= 1`.
    pub capacity: u32,
}

/// The relation carried by a [`ConstraintEdge`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum ConstraintLabel {
    /// The two guests must share a table.
    Must,
    /// The two guests must not share a table.
    Cannot,
}

/// A symmetric `must`/`cannot` relation between two guests.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConstraintEdge {
    /// One endpoint of the relation.
    pub a: GuestId,
    /// The other endpoint of the relation.
    pub b: GuestId,
    /// Which relation this edge carries.
    pub label: ConstraintLabel,
}

/// A symmetric "should be circular neighbors" relation between two guests.
///
/// Implies same-table placement for grouping purposes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdjacentEdge {
    /// One endpoint of the relation.
    pub a: GuestId,
    /// The other endpoint of the relation.
    pub b: GuestId,
}

/// Per-guest allow-list of admissible tables. An absent or empty entry means
/// "admissible anywhere".
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PreAssignments(pub HashMap<GuestId, Vec<TableId>>);

impl PreAssignments {
    /// Returns the admissible tables for `guest`, or `&[]` for "unrestricted".
    #[must_use]
    pub fn tables_for(&self, guest: &GuestId) -> &[TableId] {
        self.0.get(guest).map_or(&[], Vec::as_slice)
    }
}

/// A single seat occupied by one member of a party at a table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Seat {
    /// The party occupying this seat.
    pub guest: GuestId,
    /// The zero-based index of this seat within the party's block of seats.
    pub party_index: u32,
}

/// The occupants of a single table in a [`Plan`], in circular order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableSeating {
    /// The table being described.
    pub table: TableId,
    /// Party ids in the chosen circular order.
    pub order: Vec<GuestId>,
    /// The expansion of `order` into individual seats.
    pub seats: Vec<Seat>,
    /// This table's adjacency-satisfaction ratio (see [`crate::ordering`]).
    pub adjacency_ratio: f64,
}

/// Scalar quality metrics for a [`Plan`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanMetrics {
    /// Average per-table adjacency-satisfaction ratio, in `[0, 1]`.
    pub adjacency_satisfaction: f64,
    /// Fraction of total capacity occupied, in `[0, 1]`.
    pub capacity_utilization: f64,
    /// Balance score peaking at 80% fill, in `[0, 1]`.
    pub balance: f64,
}

/// Weights applied to [`PlanMetrics`] to produce a [`Plan::score`].
///
/// The defaults are a contractual part of the design (spec.md §9 note 3):
/// changing them changes the public ordering of returned plans.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Weight applied to [`PlanMetrics::adjacency_satisfaction`].
    pub adjacency: f64,
    /// Weight applied to [`PlanMetrics::capacity_utilization`].
    pub utilization: f64,
    /// Weight applied to [`PlanMetrics::balance`].
    pub balance: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            adjacency: 0.6,
            utilization: 0.3,
            balance: 0.1,
        }
    }
}

/// A complete seating assignment plus per-table ordering and quality metrics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Assignment of every input guest to exactly one table.
    pub assignment: HashMap<GuestId, TableId>,
    /// Per-table circular ordering and seat expansion.
    pub seating: Vec<TableSeating>,
    /// Scalar quality metrics.
    pub metrics: PlanMetrics,
    /// Aggregate score: the weighted sum of `metrics` under some [`ScoreWeights`].
    pub score: f64,
}

impl Plan {
    /// Returns the table a given guest was assigned to, if present in this plan.
    #[must_use]
    pub fn table_for(&self, guest: &GuestId) -> Option<&TableId> {
        self.assignment.get(guest)
    }
}
