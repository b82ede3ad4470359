use serde_json::Value;

use super::client::{extract_list, ApiClient, Result};
use super::favorites::operation;
use super::types::{HistoryItem, OperationResponse};

impl ApiClient {
    /// The visit log. Anything but `{success: true, data: [...]}` is an empty list.
    pub async fn history(&self) -> Result<Vec<HistoryItem>> {
        let reply = self.get(&["history"]).await?;
        if reply.get("success").and_then(Value::as_bool) != Some(true) {
            tracing::debug!("History reply without success flag, treating as empty");
            return Ok(Vec::new());
        }
        Ok(extract_list(reply, &["data"]).unwrap_or_default())
    }

    pub async fn add_history(&self, visit: &HistoryItem) -> Result<OperationResponse> {
        let reply = self.post(&["history"], visit).await?;
        operation(reply, "Could not record visit.")
    }

    pub async fn delete_history_item(&self, id: i64) -> Result<OperationResponse> {
        let reply = self.delete(&["history", &id.to_string()]).await?;
        operation(reply, "Could not delete history entry.")
    }

    pub async fn clear_history(&self) -> Result<OperationResponse> {
        let reply = self.delete(&["history"]).await?;
        operation(reply, "Could not clear history.")
    }

    /// Record a visit, logging instead of failing.
    pub async fn track_visit(&self, visit: &HistoryItem) {
        match self.add_history(visit).await {
            Ok(_) => tracing::debug!(url = %visit.url, source = %visit.source, "Visit recorded"),
            Err(e) => tracing::warn!(error = %e, url = %visit.url, "Failed to record visit"),
        }
    }
}
