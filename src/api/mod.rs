//! Client for the trends backend.
//!
//! All endpoints live under `{origin}/api`. Session identity is a cookie, so
//! one [`ApiClient`] (and its clones) must be used for the whole session.
//! Endpoint groups are split by file, each adding an `impl ApiClient` block.

mod auth;
mod client;
mod favorites;
mod history;
mod retry;
mod sources;
mod trends;
mod types;

pub use auth::{AuthState, OAuthProvider};
pub use client::{extract_list, ApiClient, ApiError, Result, DEFAULT_API_ORIGIN, LIST_FIELDS};
pub use retry::{with_backoff, BackoffPolicy};
pub use sources::DEFAULT_YOUTUBE_COUNTRY;
pub use types::{
    FavoriteItem, HistoryItem, NewFavorite, OperationResponse, SessionInfo, TrendRecord,
    TrendsResponse,
};
