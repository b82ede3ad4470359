use super::client::{decode, ApiClient, Result};
use super::types::TrendsResponse;

impl ApiClient {
    /// `GET /trends/global`. The envelope is returned as-is; the chart
    /// transform decides what an unsuccessful or empty reply means.
    pub async fn global_trends(&self) -> Result<TrendsResponse> {
        let reply = self.get(&["trends", "global"]).await?;
        if reply.is_null() {
            return Ok(TrendsResponse::default());
        }
        decode(reply)
    }
}
