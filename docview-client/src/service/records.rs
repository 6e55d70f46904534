//! Record CRUD and bulk operations.

use super::DocumentViewService;
use crate::error::ApiClientResult;
use docview_core::{
    EndpointIds, Operation, RecordEntity, RecordId, RecordQuery, Transport, ValidationError,
};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Result of a bulk write. All-or-nothing: a partial failure comes back as
/// an error, never as a short count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkOutcome {
    #[serde(default, alias = "count")]
    pub affected: u64,
}

impl<T: Transport> DocumentViewService<T> {
    pub async fn list_records(&self, query: &RecordQuery) -> ApiClientResult<Vec<RecordEntity>> {
        let pairs = query.to_query_pairs()?;
        self.dispatch(Operation::ListRecords, &EndpointIds::none(), pairs, None)
            .await
    }

    pub async fn get_record(&self, record_id: &str) -> ApiClientResult<RecordEntity> {
        self.dispatch(
            Operation::GetRecord,
            &EndpointIds::record(record_id),
            Vec::new(),
            None,
        )
        .await
    }

    /// Create a record from a property-key → value object.
    pub async fn create_record(&self, data: Value) -> ApiClientResult<RecordEntity> {
        ensure_object("data", &data)?;
        self.dispatch(
            Operation::CreateRecord,
            &EndpointIds::none(),
            Vec::new(),
            Some(data),
        )
        .await
    }

    pub async fn update_record(
        &self,
        record_id: &str,
        partial: Value,
    ) -> ApiClientResult<RecordEntity> {
        ensure_object("partial", &partial)?;
        self.dispatch(
            Operation::UpdateRecord,
            &EndpointIds::record(record_id),
            Vec::new(),
            Some(partial),
        )
        .await
    }

    /// Delete a record. Whatever the server echoes back is discarded.
    pub async fn delete_record(&self, record_id: &str) -> ApiClientResult<()> {
        let _: IgnoredAny = self
            .dispatch(
                Operation::DeleteRecord,
                &EndpointIds::record(record_id),
                Vec::new(),
                None,
            )
            .await?;
        Ok(())
    }

    /// Apply one partial update to every id under a single envelope.
    pub async fn bulk_update(
        &self,
        ids: &[RecordId],
        partial: Value,
    ) -> ApiClientResult<BulkOutcome> {
        ensure_ids("bulkUpdate", ids)?;
        ensure_object("partial", &partial)?;
        let outcome: Option<BulkOutcome> = self
            .dispatch(
                Operation::BulkUpdateRecords,
                &EndpointIds::none(),
                Vec::new(),
                Some(json!({ "ids": ids, "updates": partial })),
            )
            .await?;
        Ok(outcome.unwrap_or_default())
    }

    pub async fn bulk_delete(&self, ids: &[RecordId]) -> ApiClientResult<BulkOutcome> {
        ensure_ids("bulkDelete", ids)?;
        let outcome: Option<BulkOutcome> = self
            .dispatch(
                Operation::BulkDeleteRecords,
                &EndpointIds::none(),
                Vec::new(),
                Some(json!({ "ids": ids })),
            )
            .await?;
        Ok(outcome.unwrap_or_default())
    }
}

fn ensure_ids(operation: &'static str, ids: &[RecordId]) -> Result<(), ValidationError> {
    if ids.is_empty() {
        return Err(ValidationError::EmptyBatch { operation });
    }
    if ids.iter().any(|id| id.trim().is_empty()) {
        return Err(ValidationError::InvalidValue {
            field: "ids".to_string(),
            reason: "record ids must not be empty".to_string(),
        });
    }
    Ok(())
}

fn ensure_object(field: &str, value: &Value) -> Result<(), ValidationError> {
    if value.is_object() {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: field.to_string(),
            reason: "must be a JSON object of property values".to_string(),
        })
    }
}
