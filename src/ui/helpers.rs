//! Helper functions for UI operations.
//!
//! Every backend call runs in a spawned task that reports back through an
//! `AppEvent`. The spawners here take clones of what they need so the event
//! loop never waits on the network.

use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tokio::sync::mpsc;

use crate::app::AppEvent;
use trendboard::api::{ApiClient, ApiError, HistoryItem, NewFavorite, OAuthProvider};
use trendboard::chart::{chart_from_response, random_blue};
use trendboard::settings::AuthRequest;
use trendboard::sources::Source;

/// Wraps a future to catch panics and convert them to errors.
///
/// Instead of the task silently disappearing, panics are converted to
/// `Err(String)` containing the panic message.
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                format!("Unknown panic: {:?}", (*panic).type_id())
            }
        })
}

/// Send an event, logging when the loop has already gone away.
pub(super) async fn send(tx: &mpsc::Sender<AppEvent>, event: AppEvent, name: &'static str) {
    if let Err(e) = tx.send(event).await {
        tracing::warn!(error = %e, event = name, "Channel send failed (receiver dropped)");
    }
}

/// Run `work` in the background, reporting a panic as `AppEvent::TaskPanicked`.
fn spawn_task<F>(task: &'static str, tx: mpsc::Sender<AppEvent>, work: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(panic_msg) = catch_task_panic(work).await {
            tracing::error!(task, error = %panic_msg, "Background task panicked");
            let _ = tx
                .send(AppEvent::TaskPanicked {
                    task,
                    error: panic_msg,
                })
                .await;
        }
    });
}

/// Message shown for a failed favorites call.
fn favorite_error(e: &ApiError, fallback: &str) -> String {
    match e {
        ApiError::Network(_) => fallback.to_string(),
        other => other.to_string(),
    }
}

// ============================================================================
// Session and dashboard
// ============================================================================

pub(super) fn spawn_session_check(client: &ApiClient, tx: &mpsc::Sender<AppEvent>) {
    let client = client.clone();
    let tx_task = tx.clone();
    spawn_task("session_check", tx.clone(), async move {
        let result = client.check_session().await.map_err(|e| {
            tracing::warn!(error = %e, "Session check failed");
            e.to_string()
        });
        send(&tx_task, AppEvent::SessionChecked(result), "SessionChecked").await;
    });
}

pub(super) fn spawn_trends_load(client: &ApiClient, tx: &mpsc::Sender<AppEvent>) {
    let client = client.clone();
    let tx_task = tx.clone();
    spawn_task("trends_load", tx.clone(), async move {
        let response = client.global_trends().await;
        let chart = chart_from_response(response, random_blue);
        send(&tx_task, AppEvent::TrendsLoaded(chart), "TrendsLoaded").await;
    });
}

// ============================================================================
// Source pages and favorites
// ============================================================================

/// Load favorites (when signed in), then the source's items, in that order.
///
/// Both results go through the same channel, so the page sees the favorites
/// before the items it decorates.
pub(super) fn spawn_source_load(
    client: &ApiClient,
    source: Source,
    country: String,
    signed_in: bool,
    tx: &mpsc::Sender<AppEvent>,
) {
    let client = client.clone();
    let tx_task = tx.clone();
    spawn_task("source_load", tx.clone(), async move {
        if signed_in {
            load_favorites(&client, &tx_task).await;
        }
        let event = match client.fetch_source(source, &country).await {
            Ok(items) => {
                tracing::debug!(source = %source, count = items.len(), "Source loaded");
                AppEvent::SourceLoaded { source, items }
            }
            Err(e) => {
                tracing::warn!(source = %source, error = %e, "Source load failed");
                AppEvent::SourceFailed {
                    source,
                    error: e.to_string(),
                }
            }
        };
        send(&tx_task, event, "SourceLoaded").await;
    });
}

/// Backend search shown on the YouTube page.
pub(super) fn spawn_video_search(client: &ApiClient, term: String, tx: &mpsc::Sender<AppEvent>) {
    let client = client.clone();
    let tx_task = tx.clone();
    spawn_task("video_search", tx.clone(), async move {
        let event = match client.search_as_videos(&term).await {
            Ok(items) => AppEvent::SourceLoaded {
                source: Source::Youtube,
                items,
            },
            Err(e) => {
                tracing::warn!(term = %term, error = %e, "Search failed");
                AppEvent::SourceFailed {
                    source: Source::Youtube,
                    error: e.to_string(),
                }
            }
        };
        send(&tx_task, event, "SourceLoaded").await;
    });
}

async fn load_favorites(client: &ApiClient, tx: &mpsc::Sender<AppEvent>) {
    let event = match client.favorites().await {
        Ok(favorites) => AppEvent::FavoritesLoaded(favorites),
        Err(e) => {
            tracing::warn!(error = %e, "Favorites load failed");
            AppEvent::FavoritesFailed(favorite_error(&e, "Could not load favorites."))
        }
    };
    send(tx, event, "FavoritesLoaded").await;
}

pub(super) fn spawn_favorites_load(client: &ApiClient, tx: &mpsc::Sender<AppEvent>) {
    let client = client.clone();
    let tx_task = tx.clone();
    spawn_task("favorites_load", tx.clone(), async move {
        load_favorites(&client, &tx_task).await;
    });
}

/// Create a favorite, then re-fetch the list so the new record's id is learned.
pub(super) fn spawn_favorite_add(
    client: &ApiClient,
    source: Source,
    key: String,
    original: (bool, Option<i64>),
    payload: NewFavorite,
    tx: &mpsc::Sender<AppEvent>,
) {
    let client = client.clone();
    let tx_task = tx.clone();
    spawn_task("favorite_toggle", tx.clone(), async move {
        match client.add_favorite(&payload).await {
            Ok(_) => {
                tracing::info!(source = %source, key = %key, "Favorite added");
                let title = payload.title.clone();
                send(&tx_task, AppEvent::FavoriteAdded { title }, "FavoriteAdded").await;
                load_favorites(&client, &tx_task).await;
            }
            Err(e) => {
                tracing::warn!(source = %source, key = %key, error = %e, "Favorite add failed");
                let event = AppEvent::FavoriteToggleFailed {
                    source,
                    key,
                    original,
                    error: favorite_error(&e, "Error adding favorite."),
                };
                send(&tx_task, event, "FavoriteToggleFailed").await;
            }
        }
    });
}

/// Delete favorite `id`. `rollback` carries the page entry to restore on
/// failure; removals from the favorites tab have none.
pub(super) fn spawn_favorite_remove(
    client: &ApiClient,
    id: i64,
    rollback: Option<(Source, String, (bool, Option<i64>))>,
    tx: &mpsc::Sender<AppEvent>,
) {
    let client = client.clone();
    let tx_task = tx.clone();
    spawn_task("favorite_remove", tx.clone(), async move {
        let event = match client.remove_favorite(id).await {
            Ok(_) => {
                tracing::info!(id, "Favorite removed");
                AppEvent::FavoriteRemoved { id }
            }
            Err(e) => {
                tracing::warn!(id, error = %e, "Favorite removal failed");
                let error = favorite_error(&e, "Error removing favorite.");
                match rollback {
                    Some((source, key, original)) => AppEvent::FavoriteToggleFailed {
                        source,
                        key,
                        original,
                        error,
                    },
                    None => AppEvent::FavoriteRemoveFailed(error),
                }
            }
        };
        send(&tx_task, event, "FavoriteRemoved").await;
    });
}

// ============================================================================
// History
// ============================================================================

/// Record a visit. Failures are only logged.
pub(super) fn spawn_visit(client: &ApiClient, visit: HistoryItem, tx: &mpsc::Sender<AppEvent>) {
    let client = client.clone();
    spawn_task("track_visit", tx.clone(), async move {
        client.track_visit(&visit).await;
    });
}

pub(super) fn spawn_history_load(client: &ApiClient, tx: &mpsc::Sender<AppEvent>) {
    let client = client.clone();
    let tx_task = tx.clone();
    spawn_task("history_load", tx.clone(), async move {
        let result = client.history().await.map_err(|e| {
            tracing::warn!(error = %e, "History load failed");
            e.to_string()
        });
        send(&tx_task, AppEvent::HistoryLoaded(result), "HistoryLoaded").await;
    });
}

pub(super) fn spawn_history_delete(client: &ApiClient, id: i64, tx: &mpsc::Sender<AppEvent>) {
    let client = client.clone();
    let tx_task = tx.clone();
    spawn_task("history_delete", tx.clone(), async move {
        let result = client
            .delete_history_item(id)
            .await
            .map(|_| ())
            .map_err(|e| {
                tracing::warn!(id, error = %e, "History delete failed");
                e.to_string()
            });
        send(&tx_task, AppEvent::HistoryItemDeleted { id, result }, "HistoryItemDeleted").await;
    });
}

pub(super) fn spawn_history_clear(client: &ApiClient, tx: &mpsc::Sender<AppEvent>) {
    let client = client.clone();
    let tx_task = tx.clone();
    spawn_task("history_clear", tx.clone(), async move {
        let result = client.clear_history().await.map(|_| ()).map_err(|e| {
            tracing::warn!(error = %e, "History clear failed");
            e.to_string()
        });
        send(&tx_task, AppEvent::HistoryCleared(result), "HistoryCleared").await;
    });
}

// ============================================================================
// Settings
// ============================================================================

/// Send a validated settings form.
pub(super) fn spawn_auth_request(
    client: &ApiClient,
    request: AuthRequest,
    tx: &mpsc::Sender<AppEvent>,
) {
    let client = client.clone();
    let tx_task = tx.clone();
    spawn_task("auth", tx.clone(), async move {
        let action = request.action();
        let (result, auth) = match request {
            AuthRequest::Login { email, password } => match client.login(&email, &password).await
            {
                Ok(state) => (Ok(format!("Signed in as {}", email)), Some(state)),
                Err(e) => (Err(e.to_string()), None),
            },
            AuthRequest::Register {
                name,
                email,
                password,
            } => {
                tracing::debug!(name = %name, "Registering account");
                let result = client.register(&email, &password).await;
                (result.map_err(|e| e.to_string()), None)
            }
            AuthRequest::ChangePassword {
                current,
                new,
                confirm,
            } => {
                let result = client.change_password(&current, &new, &confirm).await;
                (result.map_err(|e| e.to_string()), None)
            }
            AuthRequest::ResetPassword {
                email,
                new_password,
            } => {
                let result = client.reset_password(&email, &new_password).await;
                (result.map_err(|e| e.to_string()), None)
            }
        };
        if let Err(e) = &result {
            tracing::warn!(action, error = %e, "Account action failed");
        }
        send(&tx_task, AppEvent::AuthFinished { action, result, auth }, "AuthFinished").await;
    });
}

pub(super) fn spawn_logout(client: &ApiClient, tx: &mpsc::Sender<AppEvent>) {
    let client = client.clone();
    let tx_task = tx.clone();
    spawn_task("logout", tx.clone(), async move {
        let result = client.logout().await;
        let event = AppEvent::AuthFinished {
            action: "logout",
            result: result
                .as_ref()
                .map(|_| "Signed out".to_string())
                .map_err(|e| e.to_string()),
            auth: result.ok().map(|_| trendboard::api::AuthState::signed_out()),
        };
        send(&tx_task, event, "AuthFinished").await;
    });
}

/// Open the provider's sign-in page, then ask the backend whether the
/// session picked it up.
pub(super) fn open_oauth(
    client: &ApiClient,
    provider: OAuthProvider,
    tx: &mpsc::Sender<AppEvent>,
) -> Result<(), String> {
    let url = client.oauth_login_url(provider).map_err(|e| e.to_string())?;
    open::that(url.as_str()).map_err(|e| format!("Failed to open browser: {}", e))?;
    tracing::info!(provider = provider.name(), url = %url, "Opened OAuth sign-in");

    let client = client.clone();
    let tx_task = tx.clone();
    spawn_task("oauth_check", tx.clone(), async move {
        match client.check_oauth_user().await {
            Ok(reply) => tracing::debug!(reply = %reply, "OAuth user check"),
            Err(e) => tracing::debug!(error = %e, "OAuth user check failed"),
        }
        let result = client.check_session().await.map_err(|e| e.to_string());
        send(&tx_task, AppEvent::SessionChecked(result), "SessionChecked").await;
    });
    Ok(())
}
