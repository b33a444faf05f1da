//! Table allocation policy.
//!
//! Decides which free tables seat a party. Pure: no I/O and no errors, the
//! caller supplies a snapshot of free tables and persists whatever comes back.
//!
//! Priority:
//! 1. a party of one takes a whole bar table;
//! 2. otherwise the smallest simple table that seats everyone;
//! 3. otherwise simple tables are merged in ascending capacity order until
//!    the party fits.

use crate::entities::{cafe_table, TableKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A free table as seen by the allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateTable {
    pub id: Uuid,
    pub kind: TableKind,
    pub capacity: i32,
}

impl From<&cafe_table::Model> for CandidateTable {
    fn from(model: &cafe_table::Model) -> Self {
        Self {
            id: model.id,
            kind: model.table_kind(),
            capacity: model.capacity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationPath {
    Bar,
    SingleTable,
    Merged,
}

impl AllocationPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            AllocationPath::Bar => "bar",
            AllocationPath::SingleTable => "single_table",
            AllocationPath::Merged => "merged",
        }
    }
}

impl fmt::Display for AllocationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Seats taken from one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedSeat {
    pub table_id: Uuid,
    pub kind: TableKind,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub path: AllocationPath,
    pub seats: Vec<PlannedSeat>,
}

impl Plan {
    /// Seats claimed across every table in the plan.
    pub fn assigned_seats(&self) -> i64 {
        self.seats.iter().map(|s| i64::from(s.quantity)).sum()
    }

    pub fn table_ids(&self) -> Vec<Uuid> {
        self.seats.iter().map(|s| s.table_id).collect()
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Allocation {
    Planned(Plan),
    NoFit,
}

/// Chooses tables for `party_size` guests.
///
/// Recorded quantities: a bar seat is 1, a single simple table records
/// `party_size`, and merged tables are claimed at full capacity. The
/// assigned total is therefore never below `party_size`.
///
/// Tables with a capacity below 1 are never chosen. `simple` is expected in
/// ascending capacity order; it is re-sorted stably, so equal capacities keep
/// the order they were given in.
pub fn allocate(party_size: i32, bar: &[CandidateTable], simple: &[CandidateTable]) -> Allocation {
    if party_size < 1 {
        return Allocation::NoFit;
    }

    if party_size == 1 {
        if let Some(table) = bar.iter().find(|t| t.capacity >= 1) {
            return Allocation::Planned(Plan {
                path: AllocationPath::Bar,
                seats: vec![PlannedSeat {
                    table_id: table.id,
                    kind: TableKind::Bar,
                    quantity: 1,
                }],
            });
        }
    }

    let mut ascending: Vec<&CandidateTable> = simple.iter().filter(|t| t.capacity >= 1).collect();
    ascending.sort_by_key(|t| t.capacity);

    if let Some(table) = ascending.iter().find(|t| t.capacity >= party_size) {
        return Allocation::Planned(Plan {
            path: AllocationPath::SingleTable,
            seats: vec![PlannedSeat {
                table_id: table.id,
                kind: TableKind::Simple,
                quantity: party_size,
            }],
        });
    }

    let mut seats = Vec::new();
    let mut seated: i64 = 0;
    for table in ascending {
        seats.push(PlannedSeat {
            table_id: table.id,
            kind: TableKind::Simple,
            quantity: table.capacity,
        });
        seated += i64::from(table.capacity);
        if seated >= i64::from(party_size) {
            return Allocation::Planned(Plan {
                path: AllocationPath::Merged,
                seats,
            });
        }
    }

    Allocation::NoFit
}
