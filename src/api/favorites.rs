use serde_json::Value;

use super::client::{decode, extract_list, rejection, ApiClient, ApiError, Result, LIST_FIELDS};
use super::types::{FavoriteItem, NewFavorite, OperationResponse};

impl ApiClient {
    /// All favorites of the signed-in user, in server order.
    pub async fn favorites(&self) -> Result<Vec<FavoriteItem>> {
        let reply = self.get(&["favorites"]).await?;
        if let Some(err) = rejection(&reply, "Failed to retrieve favorites.") {
            return Err(err);
        }
        if reply.is_null() {
            return Err(ApiError::Rejected("Failed to retrieve favorites.".into()));
        }
        extract_list(reply, LIST_FIELDS)
    }

    /// Create a favorite. The reply may or may not carry the new id.
    pub async fn add_favorite(&self, favorite: &NewFavorite) -> Result<OperationResponse> {
        let reply = self.post(&["favorites"], favorite).await?;
        tracing::debug!(url = %favorite.url, source = %favorite.source, "Favorite added");
        operation(reply, "Could not add favorite.")
    }

    pub async fn remove_favorite(&self, id: i64) -> Result<OperationResponse> {
        let reply = self.delete(&["favorites", &id.to_string()]).await?;
        tracing::debug!(id, "Favorite removed");
        operation(reply, "Error removing favorite.")
    }
}

/// Decode a write reply, failing on an explicit `success: false`.
pub(crate) fn operation(reply: Value, fallback: &str) -> Result<OperationResponse> {
    if let Some(err) = rejection(&reply, fallback) {
        return Err(err);
    }
    if reply.is_null() {
        return Ok(OperationResponse::default());
    }
    decode(reply)
}
