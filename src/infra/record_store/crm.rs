//! CRM-backed record store adapter.
//!
//! Speaks the embedded records API of the host CRM: entity-scoped CRUD,
//! criteria search, and related-list reads. The store itself is
//! transport-agnostic; a [`CrmTransport`] carries each request to the actual
//! deployment (SDK bridge, HTTP client, or a test double).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::error::BookingError;
use crate::core::record::{Criteria, Entity, Record, RecordId, RecordStore, Relation};

/// One request to the CRM records API.
///
/// Serializes to the bridge format of the embedded SDK, e.g.
/// `{"operation":"SearchRecords","Entity":"Bookings","Query":"(Date:2024-07-01)"}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "operation")]
pub enum CrmRequest {
    /// Fetch every record of an entity.
    GetAllRecords {
        /// Entity to list.
        #[serde(rename = "Entity")]
        entity: &'static str,
    },
    /// Insert one record. The field object never carries an id.
    InsertRecord {
        /// Entity to insert into.
        #[serde(rename = "Entity")]
        entity: &'static str,
        /// Field object of the new record.
        #[serde(rename = "APIData")]
        api_data: Map<String, Value>,
    },
    /// Update one record. The id travels inside the field object.
    UpdateRecord {
        /// Entity holding the record.
        #[serde(rename = "Entity")]
        entity: &'static str,
        /// Full field object including the `id` field.
        #[serde(rename = "APIData")]
        api_data: Map<String, Value>,
    },
    /// Delete one record by id.
    DeleteRecord {
        /// Entity holding the record.
        #[serde(rename = "Entity")]
        entity: &'static str,
        /// Id of the record to delete.
        #[serde(rename = "RecordID")]
        record_id: String,
    },
    /// Search records with a criteria query like `(Date:2024-07-01)`.
    SearchRecords {
        /// Entity to search.
        #[serde(rename = "Entity")]
        entity: &'static str,
        /// Criteria query string.
        #[serde(rename = "Query")]
        query: String,
    },
    /// Fetch the records of a related list.
    GetRelatedRecords {
        /// Entity holding the parent record.
        #[serde(rename = "Entity")]
        entity: &'static str,
        /// Id of the parent record.
        #[serde(rename = "RecordID")]
        record_id: String,
        /// Name of the related list.
        #[serde(rename = "RelatedList")]
        related_list: &'static str,
    },
}

/// One record in a CRM response.
#[derive(Debug, Clone, Deserialize)]
pub struct CrmRecord {
    /// Store-assigned id.
    pub id: String,
    /// Remaining fields of the record.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Response envelope the CRM returns for record calls.
///
/// Reads that match nothing and mutations without a body both come back with
/// `data` absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrmResponse {
    /// Returned records, when the call yields any.
    #[serde(default)]
    pub data: Option<Vec<CrmRecord>>,
}

impl CrmResponse {
    /// An empty envelope, for calls that return no records.
    #[must_use]
    pub const fn empty() -> Self {
        Self { data: None }
    }

    /// An envelope wrapping the given records.
    #[must_use]
    pub const fn with_records(records: Vec<CrmRecord>) -> Self {
        Self {
            data: Some(records),
        }
    }
}

/// Transport carrying requests to a CRM deployment.
#[async_trait]
pub trait CrmTransport: Send + Sync {
    /// Execute one request and return the raw response envelope.
    async fn execute(&self, request: CrmRequest) -> Result<CrmResponse, BookingError>;
}

/// Record store backed by a CRM's records API.
pub struct CrmRecordStore<T> {
    transport: T,
}

impl<T: CrmTransport> CrmRecordStore<T> {
    /// Create a store over a transport.
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }

    fn to_record(crm: CrmRecord) -> Record {
        Record::new(RecordId::new(crm.id), crm.fields)
    }

    async fn fetch_records(&self, request: CrmRequest) -> Result<Vec<Record>, BookingError> {
        let response = self.transport.execute(request).await?;
        Ok(response
            .data
            .unwrap_or_default()
            .into_iter()
            .map(Self::to_record)
            .collect())
    }
}

#[async_trait]
impl<T: CrmTransport> RecordStore for CrmRecordStore<T> {
    async fn list_all(&self, entity: Entity) -> Result<Vec<Record>, BookingError> {
        self.fetch_records(CrmRequest::GetAllRecords {
            entity: entity.name(),
        })
        .await
    }

    async fn insert(
        &self,
        entity: Entity,
        fields: Map<String, Value>,
    ) -> Result<Record, BookingError> {
        let response = self
            .transport
            .execute(CrmRequest::InsertRecord {
                entity: entity.name(),
                api_data: fields,
            })
            .await?;
        response
            .data
            .unwrap_or_default()
            .into_iter()
            .next()
            .map(Self::to_record)
            .ok_or_else(|| BookingError::Transport("insert response carried no record".into()))
    }

    async fn update(
        &self,
        entity: Entity,
        id: &RecordId,
        mut fields: Map<String, Value>,
    ) -> Result<(), BookingError> {
        fields.insert("id".into(), Value::String(id.to_string()));
        self.transport
            .execute(CrmRequest::UpdateRecord {
                entity: entity.name(),
                api_data: fields,
            })
            .await?;
        Ok(())
    }

    async fn delete(&self, entity: Entity, id: &RecordId) -> Result<(), BookingError> {
        self.transport
            .execute(CrmRequest::DeleteRecord {
                entity: entity.name(),
                record_id: id.to_string(),
            })
            .await?;
        Ok(())
    }

    async fn search(
        &self,
        entity: Entity,
        criteria: &Criteria,
    ) -> Result<Vec<Record>, BookingError> {
        self.fetch_records(CrmRequest::SearchRecords {
            entity: entity.name(),
            query: format!("({}:{})", criteria.field, criteria.value),
        })
        .await
    }

    async fn list_related(
        &self,
        entity: Entity,
        id: &RecordId,
        relation: Relation,
    ) -> Result<Vec<Record>, BookingError> {
        self.fetch_records(CrmRequest::GetRelatedRecords {
            entity: entity.name(),
            record_id: id.to_string(),
            related_list: relation.name(),
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;

    /// Transport double that records requests and replays scripted responses.
    struct ScriptedTransport {
        requests: Mutex<Vec<CrmRequest>>,
        responses: Mutex<VecDeque<CrmResponse>>,
    }

    impl ScriptedTransport {
        fn new(responses: Vec<CrmResponse>) -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                responses: Mutex::new(responses.into()),
            }
        }

        fn seen(&self) -> Vec<CrmRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CrmTransport for ScriptedTransport {
        async fn execute(&self, request: CrmRequest) -> Result<CrmResponse, BookingError> {
            self.requests.lock().unwrap().push(request);
            Ok(self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_default())
        }
    }

    fn crm_record(id: &str) -> CrmRecord {
        CrmRecord {
            id: id.to_owned(),
            fields: Map::new(),
        }
    }

    #[tokio::test]
    async fn test_search_renders_the_criteria_query() {
        let transport = ScriptedTransport::new(vec![CrmResponse::with_records(vec![crm_record(
            "1",
        )])]);
        let store = CrmRecordStore::new(transport);

        let hits = store
            .search(Entity::Bookings, &Criteria::equals("Date", "2024-07-01"))
            .await
            .unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(
            store.transport.seen(),
            vec![CrmRequest::SearchRecords {
                entity: "Bookings",
                query: "(Date:2024-07-01)".into(),
            }]
        );
    }

    #[tokio::test]
    async fn test_update_embeds_the_id_in_api_data() {
        let store = CrmRecordStore::new(ScriptedTransport::new(vec![CrmResponse::empty()]));
        let mut fields = Map::new();
        fields.insert("Status".into(), Value::String("Booked".into()));

        store
            .update(Entity::Bookings, &RecordId::from("42"), fields)
            .await
            .unwrap();

        match &store.transport.seen()[0] {
            CrmRequest::UpdateRecord { entity, api_data } => {
                assert_eq!(*entity, "Bookings");
                assert_eq!(api_data.get("id"), Some(&Value::String("42".into())));
                assert_eq!(api_data.get("Status"), Some(&Value::String("Booked".into())));
            }
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_insert_requires_a_returned_record() {
        let store = CrmRecordStore::new(ScriptedTransport::new(vec![CrmResponse::empty()]));

        let err = store.insert(Entity::Bookings, Map::new()).await.unwrap_err();
        assert!(matches!(err, BookingError::Transport(_)));

        match &store.transport.seen()[0] {
            CrmRequest::InsertRecord { api_data, .. } => {
                assert!(!api_data.contains_key("id"));
            }
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_related_lists_address_the_parent_record() {
        let store = CrmRecordStore::new(ScriptedTransport::new(vec![CrmResponse::with_records(
            vec![crm_record("brand-1"), crm_record("brand-2")],
        )]));

        let brands = store
            .list_related(Entity::Bookings, &RecordId::from("7"), Relation::Brands)
            .await
            .unwrap();

        assert_eq!(brands.len(), 2);
        assert_eq!(
            store.transport.seen(),
            vec![CrmRequest::GetRelatedRecords {
                entity: "Bookings",
                record_id: "7".into(),
                related_list: "Brands",
            }]
        );
    }

    #[test]
    fn test_requests_serialize_to_the_bridge_format() {
        let request = CrmRequest::SearchRecords {
            entity: "Bookings",
            query: "(Date:2024-07-01)".into(),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "operation": "SearchRecords",
                "Entity": "Bookings",
                "Query": "(Date:2024-07-01)",
            })
        );
    }

    #[test]
    fn test_responses_parse_with_flattened_fields() {
        let response: CrmResponse = serde_json::from_value(json!({
            "data": [{"id": "9", "Date": "2024-07-01", "Service_Type": "Push"}]
        }))
        .unwrap();

        let records = response.data.unwrap();
        assert_eq!(records[0].id, "9");
        assert_eq!(
            records[0].fields.get("Date"),
            Some(&Value::String("2024-07-01".into()))
        );
    }
}
