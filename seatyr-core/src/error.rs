//! Error types for the seating solver core.
//!
//! Defines the closed validation error taxonomy and a convenient result
//! alias. Errors are aggregated rather than thrown: every fallible component
//! of the solver appends to a `Vec<ValidationError>` instead of returning
//! early, so callers always see the full picture of what is wrong with their
//! input.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{GuestId, TableId};

/// Stable, machine-readable codes for [`ValidationError`] variants.
///
/// These mirror the closed taxonomy a host UI switches on to decide how to
/// present a problem to the user; they are stable across releases even if
/// `message` wording changes.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Malformed guest/table record (missing id, non-integer count, duplicate id).
    InvalidInputData,
    /// A reflexive edge was submitted and discarded. Non-fatal.
    SelfReferenceIgnored,
    /// An edge or assignment references a guest id not present in the input.
    UnknownGuest,
    /// A guest has more than two adjacency partners.
    AdjacencyDegreeViolation,
    /// A closed adjacency ring requires more seats than any table has.
    AdjacencyClosedLoopTooBig,
    /// A closed adjacency ring's seat-count does not equal any table's capacity.
    AdjacencyClosedLoopNotExact,
    /// Two guests joined transitively by must/adjacent edges also carry a `cannot` edge.
    CantWithinMustGroup,
    /// A group's aggregate head-count exceeds the maximum single-table capacity.
    GroupTooBigForAnyTable,
    /// Members of the same group have incompatible non-empty pre-assignments.
    AssignmentConflict,
}

impl ErrorKind {
    /// Returns the stable string representation of this error kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidInputData => "invalid_input_data",
            Self::SelfReferenceIgnored => "self_reference_ignored",
            Self::UnknownGuest => "unknown_guest",
            Self::AdjacencyDegreeViolation => "adjacency_degree_violation",
            Self::AdjacencyClosedLoopTooBig => "adjacency_closed_loop_too_big",
            Self::AdjacencyClosedLoopNotExact => "adjacency_closed_loop_not_exact",
            Self::CantWithinMustGroup => "cant_within_must_group",
            Self::GroupTooBigForAnyTable => "group_too_big_for_any_table",
            Self::AssignmentConflict => "assignment_conflict",
        }
    }

    /// Returns whether this error kind prevents the search from running.
    ///
    /// Every kind except [`Self::SelfReferenceIgnored`] is fatal.
    #[must_use]
    pub const fn is_fatal(self) -> bool {
        !matches!(self, Self::SelfReferenceIgnored)
    }

    /// Returns whether this error kind belongs to the adjacency family.
    #[must_use]
    pub const fn is_adjacency(self) -> bool {
        matches!(
            self,
            Self::AdjacencyDegreeViolation
                | Self::AdjacencyClosedLoopTooBig
                | Self::AdjacencyClosedLoopNotExact
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured context attached to a [`ValidationError`], letting hosts avoid
/// parsing `message` for machine-usable detail.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ValidationDetails {
    /// No further structured detail is available.
    None,
    /// One guest id is implicated.
    Guest {
        /// The implicated guest.
        guest: GuestId,
    },
    /// A pair of guest ids is implicated (an edge or conflicting pair).
    GuestPair {
        /// First guest in the pair.
        a: GuestId,
        /// Second guest in the pair.
        b: GuestId,
    },
    /// A group of guests is implicated.
    Group {
        /// Members of the implicated group.
        members: Vec<GuestId>,
    },
    /// A closed adjacency ring is implicated.
    AdjacencyRing {
        /// Members of the ring, in no particular order.
        members: Vec<GuestId>,
        /// The ring's aggregate seat requirement.
        seat_count: u32,
    },
    /// A table id is implicated.
    Table {
        /// The implicated table.
        table: TableId,
    },
}

/// A single validation problem found while normalizing or validating input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Error)]
#[error("{kind}: {message}")]
pub struct ValidationError {
    /// The closed taxonomy classification of this error.
    pub kind: ErrorKind,
    /// A human-readable description suitable for direct display.
    pub message: String,
    /// Structured detail a host can use without parsing `message`.
    pub details: ValidationDetails,
}

impl ValidationError {
    /// Builds a new validation error.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>, details: ValidationDetails) -> Self {
        Self {
            kind,
            message: message.into(),
            details,
        }
    }

    /// Returns whether this error is fatal to the search (see [`ErrorKind::is_fatal`]).
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        self.kind.is_fatal()
    }
}

/// Returns whether any error in `errors` is fatal.
#[must_use]
pub fn has_fatal_error(errors: &[ValidationError]) -> bool {
    errors.iter().any(ValidationError::is_fatal)
}
