//! Keyboard input handling.
//!
//! Input is routed by priority: confirmation dialog, help overlay, the
//! current text-entry mode, then the current view's normal-mode keys.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

use crate::app::{App, AppEvent, ChartState, ConfirmAction, InputMode, View};
use trendboard::api::OAuthProvider;
use trendboard::settings::FormKind;
use trendboard::sources::{Entry, LoadState, Source, ToggleRequest};
use trendboard::util::{validate_url_for_open, MAX_SEARCH_QUERY_LENGTH};

use super::helpers::{
    open_oauth, spawn_auth_request, spawn_favorite_add, spawn_favorite_remove,
    spawn_favorites_load, spawn_history_clear, spawn_history_delete, spawn_history_load,
    spawn_logout, spawn_session_check, spawn_source_load, spawn_trends_load, spawn_video_search,
    spawn_visit,
};
use super::Action;

/// Main input dispatch function.
pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
        return Ok(Action::Quit);
    }

    if app.pending_confirm.is_some() {
        handle_confirm_input(app, code, event_tx);
        return Ok(Action::Continue);
    }

    if app.show_help {
        if matches!(code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.show_help = false;
        }
        return Ok(Action::Continue);
    }

    match app.input_mode.clone() {
        InputMode::Filter => handle_filter_input(app, code),
        InputMode::Search(term) => handle_search_input(app, code, term, event_tx),
        InputMode::Form => handle_form_input(app, code, event_tx),
        InputMode::Normal => return handle_normal_input(app, code, event_tx),
    }
    Ok(Action::Continue)
}

fn handle_normal_input(
    app: &mut App,
    code: KeyCode,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    // The detail overlay captures everything except its own keys.
    if let View::Source(source) = app.view {
        if app.page(source).is_some_and(|p| p.detail_open()) {
            handle_detail_input(app, source, code, event_tx);
            return Ok(Action::Continue);
        }
    }

    match code {
        KeyCode::Char('q') => return Ok(Action::Quit),
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Tab => {
            let next = app.view.next();
            switch_view(app, next, event_tx);
        }
        KeyCode::BackTab => {
            let prev = app.view.prev();
            switch_view(app, prev, event_tx);
        }
        KeyCode::Char(c @ '1'..='9') => {
            let index = c as usize - '1' as usize;
            if let Some(view) = View::TABS.get(index) {
                switch_view(app, *view, event_tx);
            }
        }
        KeyCode::Char('t') => {
            let name = app.cycle_theme();
            app.set_status(format!("Theme: {}", name));
        }
        _ => match app.view {
            View::Dashboard => handle_dashboard_input(app, code, event_tx),
            View::Source(source) => handle_source_input(app, source, code, event_tx),
            View::Favorites => handle_favorites_input(app, code, event_tx),
            View::History => handle_history_input(app, code, event_tx),
            View::Settings => handle_settings_input(app, code, event_tx),
        },
    }
    Ok(Action::Continue)
}

/// Change tab, fetching its data the first time it is shown.
pub(super) fn switch_view(app: &mut App, view: View, event_tx: &mpsc::Sender<AppEvent>) {
    if let Some(page) = app.current_page_mut() {
        page.close_detail();
    }
    app.view = view;
    match view {
        View::Source(source) => {
            if app.page(source).is_some_and(|p| p.state == LoadState::Idle) {
                load_source(app, source, event_tx);
            }
        }
        View::Favorites => load_favorites(app, event_tx),
        View::History => load_history(app, event_tx),
        View::Dashboard | View::Settings => {}
    }
}

fn load_source(app: &mut App, source: Source, event_tx: &mpsc::Sender<AppEvent>) {
    let signed_in = app.auth.authenticated;
    let country = app.country.clone();
    if let Some(page) = app.page_mut(source) {
        page.start_loading();
    }
    spawn_source_load(&app.client, source, country, signed_in, event_tx);
}

fn load_favorites(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    app.favorites.loading = true;
    app.favorites.error = None;
    spawn_favorites_load(&app.client, event_tx);
}

fn load_history(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    app.history.loading = true;
    spawn_history_load(&app.client, event_tx);
}

/// Validate and hand a URL to the system browser.
fn open_in_browser(app: &mut App, url: &str) {
    if url.is_empty() {
        app.set_error("Entry has no URL");
        return;
    }
    match validate_url_for_open(url) {
        Err(e) => app.set_error(e.to_string()),
        Ok(url) => {
            if let Err(e) = open::that(url.as_str()) {
                app.set_error(format!("Failed to open browser: {}", e));
            } else {
                app.set_status("Opening in browser...");
            }
        }
    }
}

// ============================================================================
// Views
// ============================================================================

fn handle_dashboard_input(app: &mut App, code: KeyCode, event_tx: &mpsc::Sender<AppEvent>) {
    if code == KeyCode::Char('r') {
        app.chart = ChartState::Loading;
        spawn_trends_load(&app.client, event_tx);
    }
}

fn handle_source_input(
    app: &mut App,
    source: Source,
    code: KeyCode,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    match code {
        KeyCode::Char('r') => load_source(app, source, event_tx),
        KeyCode::Char('/') => app.input_mode = InputMode::Filter,
        KeyCode::Char('s') if source == Source::Youtube => {
            app.input_mode = InputMode::Search(String::new());
        }
        KeyCode::Char('f') => toggle_favorite(app, source, event_tx),
        KeyCode::Char('o') => {
            let url = app
                .page(source)
                .and_then(|p| p.selected())
                .map(|d| d.item.url().to_string());
            if let Some(url) = url {
                open_in_browser(app, &url);
            }
        }
        KeyCode::Enter => open_detail(app, source, event_tx),
        KeyCode::Esc => {
            if let Some(page) = app.page_mut(source) {
                if !page.filter().is_empty() {
                    page.set_filter("");
                }
            }
        }
        _ => {
            if let Some(page) = app.page_mut(source) {
                match code {
                    KeyCode::Char('j') | KeyCode::Down => page.select_next(),
                    KeyCode::Char('k') | KeyCode::Up => page.select_prev(),
                    KeyCode::Char('g') | KeyCode::Home => page.select_first(),
                    KeyCode::Char('G') | KeyCode::End => page.select_last(),
                    _ => {}
                }
            }
        }
    }
}

fn handle_detail_input(
    app: &mut App,
    source: Source,
    code: KeyCode,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    match code {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') | KeyCode::Backspace => {
            if let Some(page) = app.page_mut(source) {
                page.close_detail();
            }
        }
        KeyCode::Char('f') => toggle_favorite(app, source, event_tx),
        KeyCode::Char('o') => {
            let url = app
                .page(source)
                .and_then(|p| p.selected())
                .map(|d| d.item.url().to_string());
            if let Some(url) = url {
                open_in_browser(app, &url);
            }
        }
        _ => {}
    }
}

/// Show the detail overlay and record the visit when signed in.
fn open_detail(app: &mut App, source: Source, event_tx: &mpsc::Sender<AppEvent>) {
    let Some(page) = app.page_mut(source) else {
        return;
    };
    let Some(entry) = page.open_detail() else {
        return;
    };
    let visit = entry.visit();
    if app.auth.authenticated {
        spawn_visit(&app.client, visit, event_tx);
    }
}

/// Flip the selected entry's favorite flag now and ask the backend after.
fn toggle_favorite(app: &mut App, source: Source, event_tx: &mpsc::Sender<AppEvent>) {
    let Some(pending) = app.page_mut(source).and_then(|p| p.toggle_selected()) else {
        return;
    };
    match pending.request {
        ToggleRequest::Add(payload) => {
            spawn_favorite_add(
                &app.client,
                source,
                pending.key,
                pending.original,
                payload,
                event_tx,
            );
        }
        ToggleRequest::Remove(id) => {
            spawn_favorite_remove(
                &app.client,
                id,
                Some((source, pending.key, pending.original)),
                event_tx,
            );
        }
        ToggleRequest::MissingId => {
            tracing::warn!(source = %source, key = %pending.key, "Favorite has no id, nothing to delete");
            app.set_status("Unmarked locally; reload to sync with the server");
        }
    }
}

fn handle_favorites_input(app: &mut App, code: KeyCode, event_tx: &mpsc::Sender<AppEvent>) {
    match code {
        KeyCode::Char('j') | KeyCode::Down => {
            if app.favorites.selected + 1 < app.favorites.items.len() {
                app.favorites.selected += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.favorites.selected = app.favorites.selected.saturating_sub(1);
        }
        KeyCode::Char('r') => load_favorites(app, event_tx),
        KeyCode::Char('d') | KeyCode::Delete => {
            if let Some(id) = app.favorites.selected().map(|f| f.id) {
                spawn_favorite_remove(&app.client, id, None, event_tx);
            }
        }
        KeyCode::Char('o') | KeyCode::Enter => {
            if let Some(url) = app.favorites.selected().map(|f| f.url.clone()) {
                open_in_browser(app, &url);
            }
        }
        _ => {}
    }
}

fn handle_history_input(app: &mut App, code: KeyCode, event_tx: &mpsc::Sender<AppEvent>) {
    match code {
        KeyCode::Char('j') | KeyCode::Down => {
            if app.history.selected + 1 < app.history.visible_len() {
                app.history.selected += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.history.selected = app.history.selected.saturating_sub(1);
        }
        KeyCode::Char('r') => load_history(app, event_tx),
        KeyCode::Char('/') => app.input_mode = InputMode::Filter,
        KeyCode::Esc => app.history.set_filter(""),
        KeyCode::Char('d') | KeyCode::Delete => match app.history.selected().map(|h| h.id) {
            Some(Some(id)) => spawn_history_delete(&app.client, id, event_tx),
            Some(None) => app.set_error("This entry has no id and cannot be deleted"),
            None => {}
        },
        KeyCode::Char('C') => {
            if app.history.items.is_empty() {
                app.set_status("History is already empty");
            } else {
                app.pending_confirm = Some(ConfirmAction::ClearHistory);
            }
        }
        KeyCode::Char('o') | KeyCode::Enter => {
            if let Some(url) = app.history.selected().map(|h| h.url.clone()) {
                open_in_browser(app, &url);
            }
        }
        _ => {}
    }
}

fn handle_settings_input(app: &mut App, code: KeyCode, event_tx: &mpsc::Sender<AppEvent>) {
    match code {
        KeyCode::Char('l') => app.form.switch(FormKind::Login),
        KeyCode::Char('n') => app.form.switch(FormKind::Register),
        KeyCode::Char('p') => app.form.switch(FormKind::ChangePassword),
        KeyCode::Char('w') => app.form.switch(FormKind::ResetPassword),
        KeyCode::Enter | KeyCode::Char('e') => app.input_mode = InputMode::Form,
        KeyCode::Char('L') => {
            if app.auth.authenticated {
                spawn_logout(&app.client, event_tx);
            } else {
                app.set_status("Not signed in");
            }
        }
        KeyCode::Char('s') => {
            app.set_status("Checking session...");
            spawn_session_check(&app.client, event_tx);
        }
        KeyCode::Char('g') => start_oauth(app, OAuthProvider::Google, event_tx),
        KeyCode::Char('G') => start_oauth(app, OAuthProvider::Github, event_tx),
        _ => {}
    }
}

fn start_oauth(app: &mut App, provider: OAuthProvider, event_tx: &mpsc::Sender<AppEvent>) {
    match open_oauth(&app.client, provider, event_tx) {
        Ok(()) => app.set_status(format!(
            "Continue the {} sign-in in your browser, then press s",
            provider.name()
        )),
        Err(e) => app.set_error(e),
    }
}

// ============================================================================
// Text entry modes
// ============================================================================

/// Edit the local filter of the current source page or the history list.
fn handle_filter_input(app: &mut App, code: KeyCode) {
    let current = match app.view {
        View::Source(source) => app.page(source).map(|p| p.filter().to_string()),
        View::History => Some(app.history.filter.clone()),
        _ => None,
    };
    let Some(mut term) = current else {
        app.input_mode = InputMode::Normal;
        return;
    };

    match code {
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
            return;
        }
        KeyCode::Esc => {
            term.clear();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => {
            term.pop();
        }
        KeyCode::Char(c) => {
            if term.chars().count() >= MAX_SEARCH_QUERY_LENGTH {
                app.set_error(format!(
                    "Filter too long (max {} chars)",
                    MAX_SEARCH_QUERY_LENGTH
                ));
                return;
            }
            term.push(c);
        }
        _ => return,
    }

    match app.view {
        View::Source(source) => {
            if let Some(page) = app.page_mut(source) {
                page.set_filter(term);
            }
        }
        View::History => app.history.set_filter(term),
        _ => {}
    }
}

/// Type a backend search term for the YouTube tab.
fn handle_search_input(
    app: &mut App,
    code: KeyCode,
    mut term: String,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    match code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
            let term = term.trim().to_string();
            if term.is_empty() {
                load_source(app, Source::Youtube, event_tx);
            } else {
                if let Some(page) = app.page_mut(Source::Youtube) {
                    page.start_loading();
                }
                app.set_status(format!("Searching for \"{}\"...", term));
                spawn_video_search(&app.client, term, event_tx);
            }
        }
        KeyCode::Backspace => {
            term.pop();
            app.input_mode = InputMode::Search(term);
        }
        KeyCode::Char(c) => {
            if term.chars().count() < MAX_SEARCH_QUERY_LENGTH {
                term.push(c);
            }
            app.input_mode = InputMode::Search(term);
        }
        _ => {}
    }
}

fn handle_form_input(app: &mut App, code: KeyCode, event_tx: &mpsc::Sender<AppEvent>) {
    match code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Tab | KeyCode::Down => app.form.next_field(),
        KeyCode::BackTab | KeyCode::Up => app.form.prev_field(),
        KeyCode::Backspace => app.form.pop_char(),
        KeyCode::Char(c) => app.form.push_char(c),
        KeyCode::Enter if !app.form.is_last_field() => app.form.next_field(),
        KeyCode::Enter => submit_form(app, event_tx),
        _ => {}
    }
}

fn submit_form(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    if app.form_busy {
        app.set_status("Request already in progress");
        return;
    }
    match app.form.submit() {
        Ok(request) => {
            tracing::debug!(action = request.action(), "Submitting settings form");
            app.form_busy = true;
            app.input_mode = InputMode::Normal;
            app.set_status("Working...");
            spawn_auth_request(&app.client, request, event_tx);
        }
        Err(e) => app.set_error(e.to_string()),
    }
}

// ============================================================================
// Confirmation dialog
// ============================================================================

fn handle_confirm_input(app: &mut App, code: KeyCode, event_tx: &mpsc::Sender<AppEvent>) {
    let Some(action) = app.pending_confirm.take() else {
        return;
    };
    match (code, action) {
        (KeyCode::Char('y') | KeyCode::Char('Y'), ConfirmAction::ClearHistory) => {
            app.set_status("Clearing history...");
            spawn_history_clear(&app.client, event_tx);
        }
        _ => app.set_status("Cancelled"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use trendboard::api::ApiClient;
    use trendboard::config::Config;
    use trendboard::preferences::PreferenceManager;
    use trendboard::sources::{RedditPost, SourceEntry};

    fn test_app() -> App {
        let client = ApiClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let prefs = PreferenceManager::load(
            &Config::default(),
            &std::env::temp_dir().join("trendboard_input_tests_missing_prefs.toml"),
        );
        App::new(client, "morocco", prefs)
    }

    fn press(app: &mut App, code: KeyCode, tx: &mpsc::Sender<AppEvent>) -> Action {
        handle_input(app, code, KeyModifiers::NONE, tx).unwrap()
    }

    fn loaded_reddit(app: &mut App) {
        let page = app.page_mut(Source::Reddit).unwrap();
        page.set_items(vec![
            SourceEntry::Reddit(RedditPost {
                author: "a".into(),
                title: "Rust".into(),
                url: "https://r/1".into(),
            }),
            SourceEntry::Reddit(RedditPost {
                author: "b".into(),
                title: "Go".into(),
                url: "https://r/2".into(),
            }),
        ]);
        app.view = View::Source(Source::Reddit);
    }

    #[tokio::test]
    async fn test_quit_keys() {
        let mut app = test_app();
        let (tx, _rx) = mpsc::channel(32);
        assert!(matches!(press(&mut app, KeyCode::Char('q'), &tx), Action::Quit));
        let ctrl_c = handle_input(&mut app, KeyCode::Char('c'), KeyModifiers::CONTROL, &tx).unwrap();
        assert!(matches!(ctrl_c, Action::Quit));
    }

    #[tokio::test]
    async fn test_number_keys_switch_tabs() {
        let mut app = test_app();
        let (tx, _rx) = mpsc::channel(32);
        press(&mut app, KeyCode::Char('9'), &tx);
        assert_eq!(app.view, View::Settings);
        press(&mut app, KeyCode::Tab, &tx);
        assert_eq!(app.view, View::Dashboard);
    }

    #[tokio::test]
    async fn test_entering_source_tab_starts_loading() {
        let mut app = test_app();
        let (tx, _rx) = mpsc::channel(32);
        press(&mut app, KeyCode::Char('2'), &tx);
        assert_eq!(app.view, View::Source(Source::Github));
        assert_eq!(app.page(Source::Github).unwrap().state, LoadState::Loading);
    }

    #[tokio::test]
    async fn test_filter_mode_edits_page_filter() {
        let mut app = test_app();
        let (tx, _rx) = mpsc::channel(32);
        loaded_reddit(&mut app);

        press(&mut app, KeyCode::Char('/'), &tx);
        assert_eq!(app.input_mode, InputMode::Filter);
        press(&mut app, KeyCode::Char('g'), &tx);
        press(&mut app, KeyCode::Char('o'), &tx);
        assert_eq!(app.page(Source::Reddit).unwrap().visible_len(), 1);

        press(&mut app, KeyCode::Esc, &tx);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.page(Source::Reddit).unwrap().visible_len(), 2);
    }

    #[tokio::test]
    async fn test_toggle_flips_immediately() {
        let mut app = test_app();
        let (tx, _rx) = mpsc::channel(32);
        loaded_reddit(&mut app);
        press(&mut app, KeyCode::Char('f'), &tx);
        assert!(app.page(Source::Reddit).unwrap().items()[0].is_favorite);
    }

    #[tokio::test]
    async fn test_detail_overlay_open_and_close() {
        let mut app = test_app();
        let (tx, _rx) = mpsc::channel(32);
        loaded_reddit(&mut app);
        press(&mut app, KeyCode::Enter, &tx);
        assert!(app.page(Source::Reddit).unwrap().detail_open());
        // q closes the overlay rather than quitting
        assert!(matches!(press(&mut app, KeyCode::Char('q'), &tx), Action::Continue));
        assert!(!app.page(Source::Reddit).unwrap().detail_open());
    }

    #[tokio::test]
    async fn test_form_validation_error_is_shown() {
        let mut app = test_app();
        let (tx, _rx) = mpsc::channel(32);
        app.view = View::Settings;
        press(&mut app, KeyCode::Char('p'), &tx);
        press(&mut app, KeyCode::Enter, &tx);
        assert_eq!(app.input_mode, InputMode::Form);
        for _ in 0..3 {
            press(&mut app, KeyCode::Enter, &tx);
        }
        let (msg, is_error, _) = app.status_message.as_ref().unwrap();
        assert_eq!(msg, "Please fill in all fields.");
        assert!(*is_error);
        assert!(!app.form_busy);
    }

    #[tokio::test]
    async fn test_clear_history_needs_confirmation() {
        let mut app = test_app();
        let (tx, _rx) = mpsc::channel(32);
        app.view = View::History;
        app.history
            .set_items(vec![trendboard::api::HistoryItem::visit("a", "u", Source::News, "")]);

        press(&mut app, KeyCode::Char('C'), &tx);
        assert!(app.pending_confirm.is_some());
        press(&mut app, KeyCode::Char('n'), &tx);
        assert!(app.pending_confirm.is_none());
        assert_eq!(app.history.visible_len(), 1);
    }

    #[tokio::test]
    async fn test_help_overlay_swallows_keys() {
        let mut app = test_app();
        let (tx, _rx) = mpsc::channel(32);
        press(&mut app, KeyCode::Char('?'), &tx);
        assert!(app.show_help);
        press(&mut app, KeyCode::Char('3'), &tx);
        assert_eq!(app.view, View::Dashboard);
        press(&mut app, KeyCode::Esc, &tx);
        assert!(!app.show_help);
    }

    #[tokio::test]
    async fn test_unfavorite_before_id_known_sends_no_delete() {
        use serde_json::json;
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/favorites"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/favorites"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(0)
            .mount(&server)
            .await;

        let mut app = test_app();
        app.client = ApiClient::new(&server.uri(), Duration::from_secs(5)).unwrap();
        loaded_reddit(&mut app);
        let (tx, mut rx) = mpsc::channel(32);

        // Second press lands before the add has reported an id.
        press(&mut app, KeyCode::Char('f'), &tx);
        assert_eq!(
            app.page(Source::Reddit).unwrap().items()[0].favorite_state(),
            (true, None)
        );
        press(&mut app, KeyCode::Char('f'), &tx);
        assert_eq!(
            app.page(Source::Reddit).unwrap().items()[0].favorite_state(),
            (false, None)
        );

        drop(tx);
        let mut events = 0;
        while rx.recv().await.is_some() {
            events += 1;
        }
        assert_eq!(events, 2, "FavoriteAdded and FavoritesLoaded only");

        let (msg, is_error, _) = app.status_message.as_ref().unwrap();
        assert!(msg.starts_with("Unmarked locally"));
        assert!(!is_error);
        server.verify().await;
    }
}
