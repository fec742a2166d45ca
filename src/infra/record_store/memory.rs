//! In-memory record store backend.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use crate::core::error::BookingError;
use crate::core::record::{Criteria, Entity, Record, RecordId, RecordStore, Relation};

#[derive(Debug, Default)]
struct State {
    records: HashMap<Entity, Vec<Record>>,
    relations: HashMap<(RecordId, Relation), Vec<Record>>,
}

/// Simple in-memory record store for development/testing.
///
/// Behaves like the remote system of record in miniature: ids are minted on
/// insert, searches compare stored string values exactly, and related lists
/// default to empty.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    state: Mutex<State>,
}

impl MemoryRecordStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a record into the store as-is, keeping its id.
    pub async fn seed(&self, entity: Entity, record: Record) {
        let mut state = self.state.lock().await;
        state.records.entry(entity).or_default().push(record);
    }

    /// Attach related records to the record with the given id.
    pub async fn seed_related(&self, id: RecordId, relation: Relation, related: Vec<Record>) {
        let mut state = self.state.lock().await;
        state.relations.insert((id, relation), related);
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn list_all(&self, entity: Entity) -> Result<Vec<Record>, BookingError> {
        let state = self.state.lock().await;
        Ok(state.records.get(&entity).cloned().unwrap_or_default())
    }

    async fn insert(
        &self,
        entity: Entity,
        fields: Map<String, Value>,
    ) -> Result<Record, BookingError> {
        let record = Record::new(RecordId::mint(), fields);
        let mut state = self.state.lock().await;
        state.records.entry(entity).or_default().push(record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        entity: Entity,
        id: &RecordId,
        fields: Map<String, Value>,
    ) -> Result<(), BookingError> {
        let mut state = self.state.lock().await;
        let records = state.records.entry(entity).or_default();
        match records.iter_mut().find(|record| record.id == *id) {
            Some(record) => {
                record.fields = fields;
                Ok(())
            }
            None => Err(BookingError::NotFound(id.to_string())),
        }
    }

    async fn delete(&self, entity: Entity, id: &RecordId) -> Result<(), BookingError> {
        let mut state = self.state.lock().await;
        let records = state.records.entry(entity).or_default();
        let before = records.len();
        records.retain(|record| record.id != *id);
        if records.len() == before {
            return Err(BookingError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn search(
        &self,
        entity: Entity,
        criteria: &Criteria,
    ) -> Result<Vec<Record>, BookingError> {
        let state = self.state.lock().await;
        Ok(state
            .records
            .get(&entity)
            .map(|records| {
                records
                    .iter()
                    .filter(|record| record.field_str(&criteria.field) == Some(&criteria.value))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn list_related(
        &self,
        _entity: Entity,
        id: &RecordId,
        relation: Relation,
    ) -> Result<Vec<Record>, BookingError> {
        let state = self.state.lock().await;
        Ok(state
            .relations
            .get(&(id.clone(), relation))
            .cloned()
            .unwrap_or_default())
    }
}
