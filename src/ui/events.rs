//! Application event handling.
//!
//! Applies results from background tasks to `App`: loaded lists, favorite
//! toggle confirmations and rollbacks, history changes and account actions.

use tokio::sync::mpsc;

use crate::app::{App, AppEvent, ChartState};
use trendboard::api::AuthState;
use trendboard::settings::FormKind;
use trendboard::sources::Source;

use super::helpers::{spawn_favorites_load, spawn_history_load};

/// Process one event from a background task.
pub(super) fn handle_app_event(app: &mut App, event: AppEvent, tx: &mpsc::Sender<AppEvent>) {
    match event {
        AppEvent::SessionChecked(result) => handle_session_checked(app, result, tx),
        AppEvent::SourceLoaded { source, items } => {
            if let Some(page) = app.page_mut(source) {
                page.set_items(items);
            }
        }
        AppEvent::SourceFailed { source, error } => {
            if let Some(page) = app.page_mut(source) {
                page.fail_load(error);
            }
        }
        AppEvent::FavoritesLoaded(favorites) => {
            tracing::debug!(count = favorites.len(), "Favorites loaded");
            app.apply_favorites(favorites);
        }
        AppEvent::FavoritesFailed(error) => {
            // Pages keep their decoration; only the favorites tab shows the failure.
            app.favorites.items.clear();
            app.favorites.loading = false;
            app.favorites.error = Some(error);
        }
        AppEvent::FavoriteAdded { title } => {
            app.set_status(format!("Added to favorites: {}", title));
        }
        AppEvent::FavoriteRemoved { id } => {
            app.favorite_removed(id);
            app.set_status("Removed from favorites");
        }
        AppEvent::FavoriteToggleFailed {
            source,
            key,
            original,
            error,
        } => handle_toggle_failed(app, source, &key, original, error),
        AppEvent::FavoriteRemoveFailed(error) => app.set_error(error),
        AppEvent::TrendsLoaded(result) => {
            app.chart = match result {
                Ok(chart) => ChartState::Ready(chart),
                Err(e) => ChartState::Failed(e),
            };
        }
        AppEvent::HistoryLoaded(result) => {
            app.history.loading = false;
            match result {
                Ok(items) => app.history.set_items(items),
                Err(e) => {
                    app.history.set_items(Vec::new());
                    app.set_error(e);
                }
            }
        }
        AppEvent::HistoryItemDeleted { id, result } => match result {
            Ok(()) => {
                app.history.remove(id);
                app.set_status("History entry deleted");
            }
            Err(e) => app.set_error(e),
        },
        AppEvent::HistoryCleared(result) => match result {
            Ok(()) => {
                app.history.set_items(Vec::new());
                app.set_status("History cleared");
            }
            Err(e) => app.set_error(e),
        },
        AppEvent::AuthFinished {
            action,
            result,
            auth,
        } => handle_auth_finished(app, action, result, auth, tx),
        AppEvent::TaskPanicked { task, error } => {
            tracing::error!(task, error, "Background task panicked");
            app.set_error(format!("Internal error in {} task", task));
        }
    }
}

fn handle_session_checked(
    app: &mut App,
    result: Result<AuthState, String>,
    tx: &mpsc::Sender<AppEvent>,
) {
    match result {
        Ok(state) if state.authenticated => {
            let newly = !app.auth.authenticated;
            if newly {
                let who = state.identity.clone().unwrap_or_default();
                tracing::info!(user = %who, "Session active");
                app.set_status(format!("Signed in as {}", who));
                spawn_favorites_load(&app.client, tx);
            }
            app.auth = state;
        }
        Ok(_) => {
            if app.auth.authenticated {
                app.set_status("Session ended");
            }
            app.sign_out_locally();
        }
        Err(e) => {
            app.set_error(format!("Backend unreachable: {}", e));
        }
    }
}

/// Roll back an optimistic favorite flip.
fn handle_toggle_failed(
    app: &mut App,
    source: Source,
    key: &str,
    original: (bool, Option<i64>),
    error: String,
) {
    tracing::warn!(source = %source, key, "Favorite toggle failed, rolling back");
    if let Some(page) = app.page_mut(source) {
        page.toggle_failed(key, original);
    }
    app.set_error(error);
}

fn handle_auth_finished(
    app: &mut App,
    action: &'static str,
    result: Result<String, String>,
    auth: Option<AuthState>,
    tx: &mpsc::Sender<AppEvent>,
) {
    app.form_busy = false;
    let message = match result {
        Ok(message) => message,
        Err(e) => {
            app.set_error(e);
            return;
        }
    };

    app.set_status(message);
    match action {
        "register" => app.form.switch(FormKind::Login),
        _ => app.form.clear(),
    }

    match auth {
        Some(state) if state.authenticated => {
            app.auth = state;
            spawn_favorites_load(&app.client, tx);
            spawn_history_load(&app.client, tx);
        }
        Some(_) => app.sign_out_locally(),
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use trendboard::api::{ApiClient, FavoriteItem};
    use trendboard::config::Config;
    use trendboard::preferences::PreferenceManager;
    use trendboard::sources::{RedditPost, SourceEntry};

    fn test_app() -> App {
        let client = ApiClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let prefs = PreferenceManager::load(
            &Config::default(),
            &std::env::temp_dir().join("trendboard_events_tests_missing_prefs.toml"),
        );
        App::new(client, "morocco", prefs)
    }

    fn channel() -> (mpsc::Sender<AppEvent>, mpsc::Receiver<AppEvent>) {
        mpsc::channel(32)
    }

    fn post(url: &str) -> SourceEntry {
        SourceEntry::Reddit(RedditPost {
            author: "a".into(),
            title: "t".into(),
            url: url.into(),
        })
    }

    #[tokio::test]
    async fn test_favorites_then_items_are_decorated() {
        let mut app = test_app();
        let (tx, _rx) = channel();
        let favorites = vec![FavoriteItem {
            id: 7,
            title: "t".into(),
            url: "x/1".into(),
            category: "reddit".into(),
            source: "reddit".into(),
            added_at: String::new(),
        }];
        handle_app_event(&mut app, AppEvent::FavoritesLoaded(favorites), &tx);
        handle_app_event(
            &mut app,
            AppEvent::SourceLoaded {
                source: Source::Reddit,
                items: vec![post("x/1"), post("x/2")],
            },
            &tx,
        );

        let states: Vec<_> = app
            .page(Source::Reddit)
            .unwrap()
            .items()
            .iter()
            .map(|d| d.favorite_state())
            .collect();
        assert_eq!(states, vec![(true, Some(7)), (false, None)]);
    }

    #[tokio::test]
    async fn test_toggle_failure_rolls_back_and_reports() {
        let mut app = test_app();
        let (tx, _rx) = channel();
        let page = app.page_mut(Source::Reddit).unwrap();
        page.set_items(vec![post("x/1")]);
        let pending = page.toggle_selected().unwrap();
        assert!(page.items()[0].is_favorite);

        handle_app_event(
            &mut app,
            AppEvent::FavoriteToggleFailed {
                source: Source::Reddit,
                key: pending.key,
                original: pending.original,
                error: "Not authenticated".into(),
            },
            &tx,
        );
        assert!(!app.page(Source::Reddit).unwrap().items()[0].is_favorite);
        let (msg, is_error, _) = app.status_message.as_ref().unwrap();
        assert_eq!(msg, "Not authenticated");
        assert!(*is_error);
    }

    #[tokio::test]
    async fn test_failed_source_load_shows_error_state() {
        let mut app = test_app();
        let (tx, _rx) = channel();
        handle_app_event(
            &mut app,
            AppEvent::SourceFailed {
                source: Source::News,
                error: "Server error (status: 500)".into(),
            },
            &tx,
        );
        assert_eq!(
            app.page(Source::News).unwrap().state,
            trendboard::sources::LoadState::Failed("Server error (status: 500)".into())
        );
    }

    #[tokio::test]
    async fn test_history_error_degrades_to_empty_list() {
        let mut app = test_app();
        let (tx, _rx) = channel();
        handle_app_event(&mut app, AppEvent::HistoryLoaded(Err("boom".into())), &tx);
        assert_eq!(app.history.visible_len(), 0);
        assert!(app.status_message.is_some());
    }

    #[tokio::test]
    async fn test_history_delete_failure_keeps_entry() {
        let mut app = test_app();
        let (tx, _rx) = channel();
        let mut item = trendboard::api::HistoryItem::visit("a", "u", Source::News, "");
        item.id = Some(3);
        app.history.set_items(vec![item]);

        handle_app_event(
            &mut app,
            AppEvent::HistoryItemDeleted {
                id: 3,
                result: Err("nope".into()),
            },
            &tx,
        );
        assert_eq!(app.history.visible_len(), 1);

        handle_app_event(&mut app, AppEvent::HistoryItemDeleted { id: 3, result: Ok(()) }, &tx);
        assert_eq!(app.history.visible_len(), 0);
    }

    #[tokio::test]
    async fn test_register_success_switches_to_login() {
        let mut app = test_app();
        let (tx, _rx) = channel();
        app.form.switch(FormKind::Register);
        app.form_busy = true;
        handle_app_event(
            &mut app,
            AppEvent::AuthFinished {
                action: "register",
                result: Ok("Account created.".into()),
                auth: None,
            },
            &tx,
        );
        assert!(!app.form_busy);
        assert_eq!(app.form.kind(), FormKind::Login);
    }

    #[tokio::test]
    async fn test_logout_clears_session() {
        let mut app = test_app();
        let (tx, _rx) = channel();
        app.auth = AuthState::signed_in("me");
        handle_app_event(
            &mut app,
            AppEvent::AuthFinished {
                action: "logout",
                result: Ok("Signed out".into()),
                auth: Some(AuthState::signed_out()),
            },
            &tx,
        );
        assert!(!app.auth.authenticated);
    }

    #[tokio::test]
    async fn test_panic_is_surfaced() {
        let mut app = test_app();
        let (tx, _rx) = channel();
        handle_app_event(
            &mut app,
            AppEvent::TaskPanicked {
                task: "source_load",
                error: "boom".into(),
            },
            &tx,
        );
        let (msg, _, _) = app.status_message.as_ref().unwrap();
        assert_eq!(msg, "Internal error in source_load task");
    }
}
