//! Input normalization (§4.C).
//!
//! External inputs arrive as loose maps and arrays (language-neutral shapes
//! a host decodes from JSON). This module is the single boundary that
//! coerces them into the canonical, typed collections the rest of the solver
//! operates on; every other component sees only canonical values.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ErrorKind, ValidationDetails, ValidationError};
use crate::model::{
    AdjacentEdge, ConstraintEdge, ConstraintLabel, Guest, GuestId, PreAssignments, Table, TableId,
};

/// A guest party as received from the host, before normalization.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawGuest {
    /// Caller-supplied identifier.
    pub id: String,
    /// Caller-supplied display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Caller-supplied head-count. May be fractional or absent; clamped to
    /// `max(1, floor(n))` by the normalizer.
    #[serde(default)]
    pub count: Option<f64>,
}

/// A table as received from the host, before normalization.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    /// Caller-supplied identifier.
    pub id: String,
    /// Caller-supplied display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Caller-supplied capacity.
    #[serde(default)]
    pub capacity: Option<f64>,
    /// Fallback capacity field, used when `capacity` is absent.
    #[serde(default)]
    pub seats: Option<f64>,
}

/// Raw `guest -> guest -> "must" | "cannot"` constraint mapping.
pub type RawConstraints = HashMap<String, HashMap<String, String>>;

/// Raw `guest -> set of guest` adjacency mapping.
pub type RawAdjacents = HashMap<String, Vec<String>>;

/// Raw `guest -> comma/whitespace/period separated table tokens` mapping.
pub type RawAssignments = HashMap<String, String>;

/// The canonical, typed form of all solver inputs, plus whatever input
/// errors were found while producing it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NormalizedInput {
    /// Canonical guests, duplicates removed, in first-seen order.
    pub guests: Vec<Guest>,
    /// Canonical tables, duplicates removed, in first-seen order.
    pub tables: Vec<Table>,
    /// Canonical `must`/`cannot` edges, deduplicated and self-loop-free.
    pub constraints: Vec<ConstraintEdge>,
    /// Canonical adjacency edges, deduplicated and self-loop-free.
    pub adjacents: Vec<AdjacentEdge>,
    /// Canonical pre-assignments.
    pub assignments: PreAssignments,
}

/// Normalizes raw host input into [`NormalizedInput`], returning any input
/// errors found along the way.
///
/// Fatal errors (everything except [`ErrorKind::SelfReferenceIgnored`]) do
/// not stop normalization early: the function always returns its best-effort
/// canonical form so a host can display every problem at once.
#[must_use]
#[expect(
    clippy::implicit_hasher,
    reason = "RawConstraints/RawAdjacents/RawAssignments are the contractual JSON-shaped input types named by the external interface, not a detail callers should parameterize over"
)]
pub fn normalize(
    guests: &[RawGuest],
    tables: &[RawTable],
    constraints: &RawConstraints,
    adjacents: &RawAdjacents,
    assignments: &RawAssignments,
) -> (NormalizedInput, Vec<ValidationError>) {
    let mut errors = Vec::new();

    let guests = normalize_guests(guests, &mut errors);
    let tables = normalize_tables(tables, &mut errors);

    let known_guests: HashSet<GuestId> = guests.iter().map(|g| g.id.clone()).collect();
    let table_lookup = TableLookup::new(&tables);

    let constraints = normalize_constraints(constraints, &known_guests, &mut errors);
    let adjacents = normalize_adjacents(adjacents, &known_guests, &mut errors);
    let assignments = normalize_assignments(assignments, &known_guests, &table_lookup);

    (
        NormalizedInput {
            guests,
            tables,
            constraints,
            adjacents,
            assignments,
        },
        errors,
    )
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "count/capacity clamping deliberately floors caller-supplied floats"
)]
fn clamp_count(raw: Option<f64>) -> u32 {
    let n = raw.unwrap_or(1.0);
    if !n.is_finite() {
        return 1;
    }
    let floored = n.floor().max(1.0);
    if floored > f64::from(u32::MAX) {
        u32::MAX
    } else {
        floored as u32
    }
}

fn normalize_guests(raw: &[RawGuest], errors: &mut Vec<ValidationError>) -> Vec<Guest> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(raw.len());
    for entry in raw {
        let id = GuestId::new(entry.id.clone());
        if !seen.insert(id.clone()) {
            errors.push(ValidationError::new(
                ErrorKind::InvalidInputData,
                format!("duplicate guest id `{id}` ignored"),
                ValidationDetails::Guest { guest: id },
            ));
            continue;
        }

        let id_is_blank = entry.id.trim().is_empty();
        let name = match &entry.name {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => format!("Guest {}", entry.id),
        };
        let name = if id_is_blank && entry.name.is_none() {
            format!("Guest {}", entry.id)
        } else {
            name
        };

        out.push(Guest {
            id,
            name,
            count: clamp_count(entry.count),
        });
    }
    out
}

fn normalize_tables(raw: &[RawTable], errors: &mut Vec<ValidationError>) -> Vec<Table> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(raw.len());
    for entry in raw {
        let id = TableId::new(entry.id.clone());
        if !seen.insert(id.clone()) {
            errors.push(ValidationError::new(
                ErrorKind::InvalidInputData,
                format!("duplicate table id `{id}` ignored"),
                ValidationDetails::Table { table: id },
            ));
            continue;
        }

        let capacity = clamp_count(entry.capacity.or(entry.seats));
        out.push(Table {
            id,
            name: entry.name.clone().filter(|n| !n.trim().is_empty()),
            capacity,
        });
    }
    out
}

fn normalize_constraints(
    raw: &RawConstraints,
    known_guests: &HashSet<GuestId>,
    errors: &mut Vec<ValidationError>,
) -> Vec<ConstraintEdge> {
    let mut labels: HashMap<(GuestId, GuestId), ConstraintLabel> = HashMap::new();
    let mut conflicted: HashSet<(GuestId, GuestId)> = HashSet::new();

    for (left, partners) in raw {
        for (right, label_str) in partners {
            let Some(label) = parse_label(label_str) else {
                errors.push(ValidationError::new(
                    ErrorKind::InvalidInputData,
                    format!("unrecognized constraint label `{label_str}`"),
                    ValidationDetails::None,
                ));
                continue;
            };

            let a = GuestId::new(left.clone());
            let b = GuestId::new(right.clone());

            if a == b {
                errors.push(ValidationError::new(
                    ErrorKind::SelfReferenceIgnored,
                    format!("self-referential constraint on `{a}` ignored"),
                    ValidationDetails::Guest { guest: a },
                ));
                continue;
            }

            if !known_guests.contains(&a) || !known_guests.contains(&b) {
                errors.push(ValidationError::new(
                    ErrorKind::UnknownGuest,
                    format!("constraint references unknown guest in pair ({a}, {b})"),
                    ValidationDetails::GuestPair { a, b },
                ));
                continue;
            }

            let key = canonical_pair(a, b);
            if conflicted.contains(&key) {
                continue;
            }
            match labels.get(&key) {
                Some(existing) if *existing != label => {
                    errors.push(ValidationError::new(
                        ErrorKind::InvalidInputData,
                        format!(
                            "guests ({}, {}) carry conflicting must/cannot labels",
                            key.0, key.1
                        ),
                        ValidationDetails::GuestPair {
                            a: key.0.clone(),
                            b: key.1.clone(),
                        },
                    ));
                    conflicted.insert(key.clone());
                    labels.remove(&key);
                }
                _ => {
                    labels.insert(key, label);
                }
            }
        }
    }

    labels
        .into_iter()
        .map(|((a, b), label)| ConstraintEdge { a, b, label })
        .collect()
}

fn normalize_adjacents(
    raw: &RawAdjacents,
    known_guests: &HashSet<GuestId>,
    errors: &mut Vec<ValidationError>,
) -> Vec<AdjacentEdge> {
    let mut pairs: HashSet<(GuestId, GuestId)> = HashSet::new();

    for (left, partners) in raw {
        for right in partners {
            let a = GuestId::new(left.clone());
            let b = GuestId::new(right.clone());

            if a == b {
                errors.push(ValidationError::new(
                    ErrorKind::SelfReferenceIgnored,
                    format!("self-referential adjacency on `{a}` ignored"),
                    ValidationDetails::Guest { guest: a },
                ));
                continue;
            }

            if !known_guests.contains(&a) || !known_guests.contains(&b) {
                errors.push(ValidationError::new(
                    ErrorKind::UnknownGuest,
                    format!("adjacency references unknown guest in pair ({a}, {b})"),
                    ValidationDetails::GuestPair { a, b },
                ));
                continue;
            }

            pairs.insert(canonical_pair(a, b));
        }
    }

    pairs.into_iter().map(|(a, b)| AdjacentEdge { a, b }).collect()
}

struct TableLookup<'a> {
    by_id: HashMap<&'a str, TableId>,
    by_name: HashMap<String, TableId>,
}

impl<'a> TableLookup<'a> {
    fn new(tables: &'a [Table]) -> Self {
        let mut by_id = HashMap::new();
        let mut by_name = HashMap::new();
        for table in tables {
            by_id.insert(table.id.as_str(), table.id.clone());
            if let Some(name) = &table.name {
                by_name.insert(name.trim().to_ascii_lowercase(), table.id.clone());
            }
        }
        Self { by_id, by_name }
    }

    fn resolve(&self, token: &str) -> Option<TableId> {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return None;
        }
        self.by_id
            .get(trimmed)
            .cloned()
            .or_else(|| self.by_name.get(&trimmed.to_ascii_lowercase()).cloned())
    }
}

fn normalize_assignments(
    raw: &RawAssignments,
    known_guests: &HashSet<GuestId>,
    tables: &TableLookup<'_>,
) -> PreAssignments {
    let mut map = HashMap::new();

    for (guest, tokens) in raw {
        let guest_id = GuestId::new(guest.clone());
        if !known_guests.contains(&guest_id) {
            warn!(guest = %guest_id, "pre-assignment for unknown guest ignored");
            continue;
        }

        let mut resolved = Vec::new();
        let mut seen = HashSet::new();
        for token in split_assignment_tokens(tokens) {
            match tables.resolve(token) {
                Some(table_id) => {
                    if seen.insert(table_id.clone()) {
                        resolved.push(table_id);
                    }
                }
                None => {
                    warn!(
                        guest = %guest_id,
                        token,
                        "pre-assignment token does not match any known table"
                    );
                }
            }
        }

        if !resolved.is_empty() {
            map.insert(guest_id, resolved);
        }
    }

    PreAssignments(map)
}

fn split_assignment_tokens(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(|c: char| c == ',' || c == '.' || c.is_whitespace())
        .filter(|token| !token.is_empty())
}

fn parse_label(raw: &str) -> Option<ConstraintLabel> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "must" => Some(ConstraintLabel::Must),
        "cannot" => Some(ConstraintLabel::Cannot),
        _ => None,
    }
}

fn canonical_pair(a: GuestId, b: GuestId) -> (GuestId, GuestId) {
    if a <= b { (a, b) } else { (b, a) }
}
