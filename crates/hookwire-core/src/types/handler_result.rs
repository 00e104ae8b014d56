//! Handler outcomes and the aggregated dispatch result.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ProcessingStatus;

/// Outcome reported by a single handler.
///
/// The dispatch engine stores it verbatim and never interprets it: a result
/// with `is_success = false` is still a result, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerResult {
    /// Whether the delivery was relevant to the handler.
    pub is_target_event: bool,
    /// Whether the handler's side effect succeeded.
    pub is_success: bool,
    /// Handler-provided failure description.
    #[serde(default)]
    pub error: Option<String>,
}

impl HandlerResult {
    /// A relevant delivery that was handled successfully.
    pub fn handled() -> Self {
        Self {
            is_target_event: true,
            is_success: true,
            error: None,
        }
    }

    /// A delivery the handler had no interest in.
    pub fn skipped() -> Self {
        Self {
            is_target_event: false,
            is_success: true,
            error: None,
        }
    }

    /// A relevant delivery whose side effect did not succeed.
    pub fn unsuccessful(error: impl Into<String>) -> Self {
        Self {
            is_target_event: true,
            is_success: false,
            error: Some(error.into()),
        }
    }
}

/// Per-handler results and errors persisted next to the status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalData {
    /// Results keyed by handler name.
    #[serde(default)]
    pub handler_results: BTreeMap<String, HandlerResult>,
    /// Error text keyed by handler name.
    #[serde(default)]
    pub errors: BTreeMap<String, String>,
}

impl AdditionalData {
    /// Returns `true` when no handler contributed anything.
    pub fn is_empty(&self) -> bool {
        self.handler_results.is_empty() && self.errors.is_empty()
    }

    /// The terminal status these maps imply.
    pub fn status(&self) -> ProcessingStatus {
        ProcessingStatus::from_counts(self.handler_results.len(), self.errors.len())
    }

    /// Converts into the JSON stored in the delivery record.
    ///
    /// An empty value is stored as `{}`, not as two empty maps.
    pub fn to_stored_value(data: Option<&Self>) -> serde_json::Value {
        match data {
            Some(data) => serde_json::json!({
                "handler_results": data.handler_results,
                "errors": data.errors,
            }),
            None => serde_json::Value::Object(serde_json::Map::new()),
        }
    }

    /// Reads the JSON stored in a delivery record.
    ///
    /// `{}` and `null` both read back as `None`.
    pub fn from_stored_value(value: serde_json::Value) -> serde_json::Result<Option<Self>> {
        match &value {
            serde_json::Value::Null => Ok(None),
            serde_json::Value::Object(map) if map.is_empty() => Ok(None),
            _ => serde_json::from_value(value).map(Some),
        }
    }
}

/// Result of one dispatch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchResult {
    /// The dispatched delivery.
    pub delivery_id: Uuid,
    /// Terminal status written to the delivery.
    pub status: ProcessingStatus,
    /// Results keyed by handler name.
    pub handler_results: BTreeMap<String, HandlerResult>,
    /// Error text keyed by handler name.
    pub errors: BTreeMap<String, String>,
}

impl DispatchResult {
    /// Builds the result for a delivery from its persisted outcome.
    pub fn from_parts(
        delivery_id: Uuid,
        status: ProcessingStatus,
        data: Option<AdditionalData>,
    ) -> Self {
        let data = data.unwrap_or_default();
        Self {
            delivery_id,
            status,
            handler_results: data.handler_results,
            errors: data.errors,
        }
    }

    /// The `additional_data` this result persists, `None` for no handlers.
    pub fn additional_data(&self) -> Option<AdditionalData> {
        match self.status {
            ProcessingStatus::NoHandlers => None,
            _ => Some(AdditionalData {
                handler_results: self.handler_results.clone(),
                errors: self.errors.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_handler_result_shape() {
        let value = serde_json::to_value(HandlerResult::handled()).ok();
        assert_eq!(
            value,
            Some(json!({ "is_target_event": true, "is_success": true, "error": null }))
        );
    }

    #[test]
    fn test_empty_data_is_stored_as_empty_object() -> anyhow::Result<()> {
        let stored = AdditionalData::to_stored_value(None);
        assert_eq!(stored, json!({}));
        assert_eq!(AdditionalData::from_stored_value(stored)?, None);
        Ok(())
    }

    #[test]
    fn test_failed_data_keeps_both_keys() -> anyhow::Result<()> {
        let mut data = AdditionalData::default();
        data.errors.insert("ghost".into(), "missing".into());

        let stored = AdditionalData::to_stored_value(Some(&data));
        assert_eq!(stored, json!({ "handler_results": {}, "errors": { "ghost": "missing" } }));
        assert_eq!(data.status(), ProcessingStatus::Failed);

        let restored = AdditionalData::from_stored_value(stored)?;
        assert_eq!(restored, Some(data));
        Ok(())
    }

    #[test]
    fn test_no_handlers_result_has_no_data() {
        let result = DispatchResult::from_parts(Uuid::nil(), ProcessingStatus::NoHandlers, None);
        assert!(result.additional_data().is_none());
        assert!(result.handler_results.is_empty());
        assert!(result.errors.is_empty());
    }
}
