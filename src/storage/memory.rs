//! In-memory adapter: one JSON document map per table.

use crate::models::Id;
use crate::storage::{Filter, Record, Storage, StorageError, Table};
use serde_json::Value;
use std::collections::BTreeMap;

/// Records are kept as `serde_json::Value` keyed by id, so the adapter never
/// depends on the concrete record types and keeps insertion order by id.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    tables: BTreeMap<Table, BTreeMap<Id, Value>>,
    next_ids: BTreeMap<Table, Id>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records in a table.
    pub fn len(&self, table: Table) -> usize {
        self.tables.get(&table).map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.tables.values().all(BTreeMap::is_empty)
    }

    fn encode<R: Record>(record: &R) -> Result<Value, StorageError> {
        serde_json::to_value(record).map_err(|source| StorageError::Encode {
            table: R::TABLE,
            source,
        })
    }

    fn decode<R: Record>(id: Id, value: &Value) -> Result<R, StorageError> {
        serde_json::from_value(value.clone()).map_err(|source| StorageError::Decode {
            table: R::TABLE,
            id,
            source,
        })
    }
}

impl Storage for MemoryStorage {
    fn select<R: Record>(&self, filter: &Filter) -> Result<Vec<R>, StorageError> {
        let Some(rows) = self.tables.get(&R::TABLE) else {
            return Ok(Vec::new());
        };
        let mut records = Vec::new();
        for (&id, value) in rows {
            let record: R = Self::decode(id, value)?;
            if filter.matches(&record) {
                records.push(record);
            }
        }
        Ok(records)
    }

    fn select_by_id<R: Record>(&self, id: Id) -> Result<Option<R>, StorageError> {
        self.tables
            .get(&R::TABLE)
            .and_then(|rows| rows.get(&id))
            .map(|value| Self::decode(id, value))
            .transpose()
    }

    fn insert<R: Record>(&mut self, mut record: R) -> Result<Id, StorageError> {
        let next = self.next_ids.entry(R::TABLE).or_insert(0);
        let id = *next;
        record.set_id(id);
        let value = Self::encode(&record)?;
        *next += 1;
        self.tables.entry(R::TABLE).or_default().insert(id, value);
        Ok(id)
    }

    fn insert_all<R: Record>(&mut self, records: Vec<R>) -> Result<(), StorageError> {
        let mut encoded = Vec::with_capacity(records.len());
        for record in &records {
            encoded.push((record.id(), Self::encode(record)?));
        }
        let rows = self.tables.entry(R::TABLE).or_default();
        let next = self.next_ids.entry(R::TABLE).or_insert(0);
        for (id, value) in encoded {
            *next = (*next).max(id + 1);
            rows.insert(id, value);
        }
        Ok(())
    }

    fn update<R: Record>(&mut self, id: Id, record: &R) -> Result<(), StorageError> {
        let mut record = record.clone();
        record.set_id(id);
        let value = Self::encode(&record)?;
        match self.tables.get_mut(&R::TABLE).and_then(|rows| rows.get_mut(&id)) {
            Some(row) => {
                *row = value;
                Ok(())
            }
            None => Err(StorageError::Missing {
                table: R::TABLE,
                id,
            }),
        }
    }

    fn delete<R: Record>(&mut self, filter: &Filter) -> Result<(), StorageError> {
        let doomed: Vec<Id> = self
            .select::<R>(filter)?
            .iter()
            .map(Record::id)
            .collect();
        if let Some(rows) = self.tables.get_mut(&R::TABLE) {
            for id in doomed {
                rows.remove(&id);
            }
        }
        Ok(())
    }
}
