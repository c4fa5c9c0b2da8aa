//! Storage contract consumed by the engine.
//!
//! The engine never assumes a backend: every operation is generic over a
//! [`Storage`] implementation that selects, inserts, updates and deletes typed
//! [`Record`]s in named tables. [`MemoryStorage`] is the in-memory adapter.

mod memory;

pub use memory::MemoryStorage;

use crate::models::{Group, Id, Match, Round, Stage};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Named record collections.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Stage,
    Group,
    Round,
    Match,
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Table::Stage => "stage",
            Table::Group => "group",
            Table::Round => "round",
            Table::Match => "match",
        };
        f.write_str(name)
    }
}

/// Columns a [`Filter`] can constrain.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Field {
    Id,
    TournamentId,
    StageId,
    GroupId,
    RoundId,
    Number,
}

/// Conjunction of equality constraints. The empty filter selects everything.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Filter {
    constraints: Vec<(Field, u64)>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by(field: Field, value: u64) -> Self {
        Self::all().and(field, value)
    }

    pub fn and(mut self, field: Field, value: u64) -> Self {
        self.constraints.push((field, value));
        self
    }

    pub fn constraints(&self) -> &[(Field, u64)] {
        &self.constraints
    }

    pub fn matches<R: Record>(&self, record: &R) -> bool {
        self.constraints
            .iter()
            .all(|&(field, value)| record.field(field) == Some(value))
    }
}

/// A typed row of one [`Table`].
pub trait Record: Clone + Serialize + DeserializeOwned {
    const TABLE: Table;

    fn id(&self) -> Id;

    fn set_id(&mut self, id: Id);

    /// Value of a filterable column, `None` if the record has no such column.
    fn field(&self, field: Field) -> Option<u64>;
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to encode {table} record: {source}")]
    Encode {
        table: Table,
        #[source]
        source: serde_json::Error,
    },

    #[error("Corrupt {table} record {id}: {source}")]
    Decode {
        table: Table,
        id: Id,
        #[source]
        source: serde_json::Error,
    },

    #[error("{table} record {id} does not exist")]
    Missing { table: Table, id: Id },
}

/// Generic get/insert/update/delete against named record collections.
///
/// Hosts wrap each engine operation in their own transaction; the engine only
/// promises to validate before it writes.
pub trait Storage {
    /// Records matching `filter`, in insertion order.
    fn select<R: Record>(&self, filter: &Filter) -> Result<Vec<R>, StorageError>;

    fn select_by_id<R: Record>(&self, id: Id) -> Result<Option<R>, StorageError> {
        Ok(self
            .select::<R>(&Filter::by(Field::Id, id))?
            .into_iter()
            .next())
    }

    /// Insert a record and return the id storage assigned to it.
    fn insert<R: Record>(&mut self, record: R) -> Result<Id, StorageError>;

    /// Insert records keeping their ids verbatim.
    fn insert_all<R: Record>(&mut self, records: Vec<R>) -> Result<(), StorageError>;

    /// Replace the record with the given id.
    fn update<R: Record>(&mut self, id: Id, record: &R) -> Result<(), StorageError>;

    fn delete<R: Record>(&mut self, filter: &Filter) -> Result<(), StorageError>;
}

impl Record for Stage {
    const TABLE: Table = Table::Stage;

    fn id(&self) -> Id {
        self.id
    }

    fn set_id(&mut self, id: Id) {
        self.id = id;
    }

    fn field(&self, field: Field) -> Option<u64> {
        match field {
            Field::Id => Some(self.id),
            Field::TournamentId => Some(self.tournament_id),
            Field::Number => Some(u64::from(self.number)),
            _ => None,
        }
    }
}

impl Record for Group {
    const TABLE: Table = Table::Group;

    fn id(&self) -> Id {
        self.id
    }

    fn set_id(&mut self, id: Id) {
        self.id = id;
    }

    fn field(&self, field: Field) -> Option<u64> {
        match field {
            Field::Id => Some(self.id),
            Field::StageId => Some(self.stage_id),
            Field::Number => Some(u64::from(self.number)),
            _ => None,
        }
    }
}

impl Record for Round {
    const TABLE: Table = Table::Round;

    fn id(&self) -> Id {
        self.id
    }

    fn set_id(&mut self, id: Id) {
        self.id = id;
    }

    fn field(&self, field: Field) -> Option<u64> {
        match field {
            Field::Id => Some(self.id),
            Field::StageId => Some(self.stage_id),
            Field::GroupId => Some(self.group_id),
            Field::Number => Some(u64::from(self.number)),
            Field::TournamentId | Field::RoundId => None,
        }
    }
}

impl Record for Match {
    const TABLE: Table = Table::Match;

    fn id(&self) -> Id {
        self.id
    }

    fn set_id(&mut self, id: Id) {
        self.id = id;
    }

    fn field(&self, field: Field) -> Option<u64> {
        match field {
            Field::Id => Some(self.id),
            Field::StageId => Some(self.stage_id),
            Field::GroupId => Some(self.group_id),
            Field::RoundId => Some(self.round_id),
            Field::Number => Some(u64::from(self.number)),
            Field::TournamentId => None,
        }
    }
}
