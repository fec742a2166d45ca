//! Record-store abstraction shared by the in-memory and remote backends.
//!
//! The session core never talks to a concrete store; it depends on
//! [`RecordStore`] and receives raw [`Record`]s, which the domain layer maps
//! into typed entities. Backends are selected by configuration at startup,
//! never by runtime feature detection.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::core::error::BookingError;

/// Opaque identifier assigned by the record store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Wrap an identifier issued by a store.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a fresh v4 identifier, for backends that assign ids locally.
    pub fn mint() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Entities exposed by the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    /// Calendar slot bookings.
    Bookings,
    /// Capacity-rule configuration documents.
    ConfigRules,
    /// Sales opportunities linkable to a booking.
    Deals,
}

impl Entity {
    /// Entity name as the store spells it.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bookings => "Bookings",
            Self::ConfigRules => "ConfigRules",
            Self::Deals => "Deals",
        }
    }
}

/// Related-record collections reachable from an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// Brand sub-records of a Newsletter booking.
    Brands,
}

impl Relation {
    /// Relation name as the store spells it.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Brands => "Brands",
        }
    }
}

/// A raw store record: assigned id plus a JSON field object.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Store-assigned identifier.
    pub id: RecordId,
    /// Field object keyed by the store's field names.
    pub fields: Map<String, Value>,
}

impl Record {
    /// Build a record from an id and a field object.
    pub const fn new(id: RecordId, fields: Map<String, Value>) -> Self {
        Self { id, fields }
    }

    /// Read a field as a string slice, if present and a string.
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }
}

/// Field-equality search criteria.
///
/// Values are compared as their stored string representation; date-keyed
/// lookups rely on exact equality of the ISO date string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Criteria {
    /// Field the criterion matches on.
    pub field: String,
    /// Exact value the field must hold.
    pub value: String,
}

impl Criteria {
    /// Criterion matching records whose `field` equals `value`.
    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Async boundary to the system of record.
///
/// All six operations the session needs; nothing else. Implementations must
/// not perform admission logic of any kind.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch every record of an entity.
    async fn list_all(&self, entity: Entity) -> Result<Vec<Record>, BookingError>;

    /// Insert a record and return it with its store-assigned id.
    async fn insert(
        &self,
        entity: Entity,
        fields: Map<String, Value>,
    ) -> Result<Record, BookingError>;

    /// Replace the fields of the record with the given id.
    async fn update(
        &self,
        entity: Entity,
        id: &RecordId,
        fields: Map<String, Value>,
    ) -> Result<(), BookingError>;

    /// Delete the record with the given id.
    async fn delete(&self, entity: Entity, id: &RecordId) -> Result<(), BookingError>;

    /// Fetch the records matching a field-equality criterion.
    async fn search(&self, entity: Entity, criteria: &Criteria)
        -> Result<Vec<Record>, BookingError>;

    /// Fetch the records related to the given record through `relation`.
    async fn list_related(
        &self,
        entity: Entity,
        id: &RecordId,
        relation: Relation,
    ) -> Result<Vec<Record>, BookingError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_and_relation_names() {
        assert_eq!(Entity::Bookings.name(), "Bookings");
        assert_eq!(Entity::ConfigRules.name(), "ConfigRules");
        assert_eq!(Entity::Deals.name(), "Deals");
        assert_eq!(Relation::Brands.name(), "Brands");
    }

    #[test]
    fn test_minted_ids_are_unique() {
        assert_ne!(RecordId::mint(), RecordId::mint());
    }

    #[test]
    fn test_record_field_access() {
        let mut fields = Map::new();
        fields.insert("Date".into(), Value::String("2024-07-01".into()));
        fields.insert("Count".into(), Value::from(3));
        let record = Record::new(RecordId::from("r1"), fields);

        assert_eq!(record.field_str("Date"), Some("2024-07-01"));
        assert_eq!(record.field_str("Count"), None);
        assert_eq!(record.field_str("Missing"), None);
    }
}
