use ratatui::style::Style;
use std::borrow::Cow;
use std::collections::HashMap;
use tokio::time::Instant;

use trendboard::api::{ApiClient, AuthState, FavoriteItem, HistoryItem};
use trendboard::chart::{ChartData, ChartError};
use trendboard::preferences::PreferenceManager;
use trendboard::settings::{FormKind, FormState};
use trendboard::sources::{filter_indices, LoadState, Source, SourceEntry, SourcePage};
use trendboard::theme::{StyleMap, ThemeVariant};

/// Seconds a status message stays on screen.
const STATUS_TTL_SECS: u64 = 3;

// ============================================================================
// View and Mode Enums
// ============================================================================

/// Top-level tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Dashboard,
    Source(Source),
    Favorites,
    History,
    Settings,
}

impl View {
    /// Tab order, also the order of the number keys.
    pub const TABS: [View; 9] = [
        View::Dashboard,
        View::Source(Source::Github),
        View::Source(Source::Reddit),
        View::Source(Source::News),
        View::Source(Source::Football),
        View::Source(Source::Youtube),
        View::Favorites,
        View::History,
        View::Settings,
    ];

    pub fn title(self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::Source(source) => source.title(),
            View::Favorites => "Favorites",
            View::History => "History",
            View::Settings => "Settings",
        }
    }

    fn position(self) -> usize {
        Self::TABS.iter().position(|v| *v == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::TABS[(self.position() + 1) % Self::TABS.len()]
    }

    pub fn prev(self) -> Self {
        Self::TABS[(self.position() + Self::TABS.len() - 1) % Self::TABS.len()]
    }
}

/// Where typed characters go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Editing the local title filter of the current list.
    Filter,
    /// Typing a backend search term on the YouTube tab.
    Search(String),
    /// Typing into the settings form.
    Form,
}

/// Pending confirmation action for destructive operations.
pub enum ConfirmAction {
    ClearHistory,
}

// ============================================================================
// Per-view State
// ============================================================================

/// Dashboard chart state.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ChartState {
    #[default]
    Loading,
    Ready(ChartData),
    Failed(ChartError),
}

#[derive(Debug, Default)]
pub struct FavoritesView {
    pub items: Vec<FavoriteItem>,
    pub selected: usize,
    pub loading: bool,
    pub error: Option<String>,
}

impl FavoritesView {
    pub fn selected(&self) -> Option<&FavoriteItem> {
        self.items.get(self.selected)
    }

    fn clamp(&mut self) {
        self.selected = self.selected.min(self.items.len().saturating_sub(1));
    }
}

#[derive(Debug, Default)]
pub struct HistoryView {
    pub items: Vec<HistoryItem>,
    pub filter: String,
    visible: Vec<usize>,
    pub selected: usize,
    pub loading: bool,
}

impl HistoryView {
    pub fn set_items(&mut self, items: Vec<HistoryItem>) {
        self.items = items;
        self.refilter();
    }

    pub fn set_filter(&mut self, term: impl Into<String>) {
        self.filter = term.into();
        self.refilter();
    }

    fn refilter(&mut self) {
        self.visible = filter_indices(&self.items, &self.filter);
        self.selected = self.selected.min(self.visible.len().saturating_sub(1));
    }

    pub fn visible(&self) -> impl Iterator<Item = &HistoryItem> + '_ {
        self.visible.iter().filter_map(|&i| self.items.get(i))
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn selected(&self) -> Option<&HistoryItem> {
        self.visible
            .get(self.selected)
            .and_then(|&i| self.items.get(i))
    }

    /// Drop the entry with `id` after the backend confirmed it.
    pub fn remove(&mut self, id: i64) {
        self.items.retain(|h| h.id != Some(id));
        self.refilter();
    }
}

// ============================================================================
// Events
// ============================================================================

/// Results reported by background tasks.
pub enum AppEvent {
    SessionChecked(Result<AuthState, String>),
    SourceLoaded {
        source: Source,
        items: Vec<SourceEntry>,
    },
    SourceFailed {
        source: Source,
        error: String,
    },
    /// Fresh favorites list; applies to every page and the favorites tab.
    FavoritesLoaded(Vec<FavoriteItem>),
    FavoritesFailed(String),
    FavoriteAdded {
        title: String,
    },
    FavoriteRemoved {
        id: i64,
    },
    /// An optimistic toggle on a source page was refused.
    FavoriteToggleFailed {
        source: Source,
        key: String,
        original: (bool, Option<i64>),
        error: String,
    },
    /// Removal from the favorites tab failed.
    FavoriteRemoveFailed(String),
    TrendsLoaded(Result<ChartData, ChartError>),
    HistoryLoaded(Result<Vec<HistoryItem>, String>),
    HistoryItemDeleted {
        id: i64,
        result: Result<(), String>,
    },
    HistoryCleared(Result<(), String>),
    /// A settings action finished; `auth` is the new session state when it changed.
    AuthFinished {
        action: &'static str,
        result: Result<String, String>,
        auth: Option<AuthState>,
    },
    /// A background task panicked.
    ///
    /// Fields:
    /// - `task`: Name of the task that panicked (e.g., "source_load", "auth")
    /// - `error`: The panic message extracted from the panic payload
    TaskPanicked {
        task: &'static str,
        error: String,
    },
}

// ============================================================================
// Application State
// ============================================================================

/// Central application state
pub struct App {
    pub client: ApiClient,
    /// Country for the YouTube trending list.
    pub country: String,
    pub prefs: PreferenceManager,

    // Theme
    /// Current theme variant (for cycling).
    pub theme_variant: ThemeVariant,
    /// Active style map for all UI rendering.
    pub theme: StyleMap,

    pub auth: AuthState,
    pub view: View,
    pub input_mode: InputMode,

    pub pages: HashMap<Source, SourcePage<SourceEntry>>,
    pub favorites: FavoritesView,
    pub history: HistoryView,
    pub chart: ChartState,
    pub form: FormState,
    /// A settings request is in flight.
    pub form_busy: bool,

    /// Message plus the time it was set; `true` marks errors.
    pub status_message: Option<(Cow<'static, str>, bool, Instant)>,
    pub needs_redraw: bool,
    /// Current frame of the loading spinner.
    pub spinner_frame: usize,
    pub show_help: bool,

    /// When set, the UI renders a confirmation overlay and input is routed
    /// to the confirmation handler instead of normal dispatch.
    pub pending_confirm: Option<ConfirmAction>,
}

impl App {
    pub fn new(client: ApiClient, country: impl Into<String>, prefs: PreferenceManager) -> Self {
        let theme_variant = prefs.theme();
        let pages = Source::ALL
            .into_iter()
            .map(|s| (s, SourcePage::new(s)))
            .collect();

        Self {
            client,
            country: country.into(),
            prefs,
            theme_variant,
            theme: StyleMap::for_variant(theme_variant),
            auth: AuthState::signed_out(),
            view: View::Dashboard,
            input_mode: InputMode::Normal,
            pages,
            favorites: FavoritesView::default(),
            history: HistoryView::default(),
            chart: ChartState::Loading,
            form: FormState::new(FormKind::Login),
            form_busy: false,
            status_message: None,
            needs_redraw: true,
            spinner_frame: 0,
            show_help: false,
            pending_confirm: None,
        }
    }

    /// Resolve a semantic role name to its `Style`.
    pub fn style(&self, role: &str) -> Style {
        self.theme.resolve(role)
    }

    /// Switch to a different theme variant at runtime.
    pub fn set_theme(&mut self, variant: ThemeVariant) {
        self.theme_variant = variant;
        self.theme = StyleMap::for_variant(variant);
        self.needs_redraw = true;
    }

    /// Cycle to the next theme variant and remember it.
    ///
    /// Returns the name of the new theme for status display.
    pub fn cycle_theme(&mut self) -> &'static str {
        let next = self.theme_variant.next();
        self.set_theme(next);
        if let Err(e) = self.prefs.set_theme(next) {
            tracing::warn!(error = %e, "Failed to save theme preference");
        }
        next.name()
    }

    pub fn page(&self, source: Source) -> Option<&SourcePage<SourceEntry>> {
        self.pages.get(&source)
    }

    pub fn page_mut(&mut self, source: Source) -> Option<&mut SourcePage<SourceEntry>> {
        self.pages.get_mut(&source)
    }

    /// Page of the current tab, if it is a source tab.
    pub fn current_page_mut(&mut self) -> Option<&mut SourcePage<SourceEntry>> {
        match self.view {
            View::Source(source) => self.pages.get_mut(&source),
            _ => None,
        }
    }

    /// Whether the current tab is waiting on the backend.
    pub fn is_loading(&self) -> bool {
        match self.view {
            View::Dashboard => self.chart == ChartState::Loading,
            View::Source(source) => self
                .page(source)
                .is_some_and(|p| p.state == LoadState::Loading),
            View::Favorites => self.favorites.loading,
            View::History => self.history.loading,
            View::Settings => self.form_busy,
        }
    }

    /// Fan a fresh favorites list out to every page and the favorites tab.
    pub fn apply_favorites(&mut self, favorites: Vec<FavoriteItem>) {
        for page in self.pages.values_mut() {
            page.set_favorites(favorites.clone());
        }
        self.favorites.items = favorites;
        self.favorites.loading = false;
        self.favorites.error = None;
        self.favorites.clamp();
    }

    /// The backend deleted favorite `id`.
    pub fn favorite_removed(&mut self, id: i64) {
        for page in self.pages.values_mut() {
            page.favorite_removed(id);
        }
        self.favorites.items.retain(|f| f.id != id);
        self.favorites.clamp();
    }

    /// Forget everything tied to the previous session.
    pub fn sign_out_locally(&mut self) {
        self.auth = AuthState::signed_out();
        self.apply_favorites(Vec::new());
        self.history.set_items(Vec::new());
    }

    /// Set status message (will auto-expire after 3 seconds)
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), false, Instant::now()));
    }

    /// Set an error status, rendered with the error style.
    pub fn set_error(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), true, Instant::now()));
    }

    /// Clear status message if expired (older than 3 seconds)
    /// Returns true if a message was actually cleared
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, _, time)) = &self.status_message {
            if time.elapsed().as_secs() >= STATUS_TTL_SECS {
                self.status_message = None;
                return true;
            }
        }
        false
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration as StdDuration;
    use tokio::time::{self, Duration};
    use trendboard::config::Config;
    use trendboard::sources::RedditPost;

    fn test_app() -> App {
        let client = ApiClient::new("http://127.0.0.1:9", StdDuration::from_secs(1)).unwrap();
        let prefs_path = std::env::temp_dir().join("trendboard_app_tests_missing_prefs.toml");
        let prefs = PreferenceManager::load(&Config::default(), &prefs_path);
        App::new(client, "morocco", prefs)
    }

    fn fav(id: i64, url: &str) -> FavoriteItem {
        FavoriteItem {
            id,
            title: "post".into(),
            url: url.into(),
            category: "reddit".into(),
            source: "reddit".into(),
            added_at: String::new(),
        }
    }

    fn reddit(url: &str) -> SourceEntry {
        SourceEntry::Reddit(RedditPost {
            author: "a".into(),
            title: "post".into(),
            url: url.into(),
        })
    }

    #[test]
    fn test_tabs_cycle() {
        assert_eq!(View::Dashboard.next(), View::Source(Source::Github));
        assert_eq!(View::Dashboard.prev(), View::Settings);
        assert_eq!(View::Settings.next(), View::Dashboard);
    }

    #[test]
    fn test_every_source_has_a_page() {
        let app = test_app();
        for source in Source::ALL {
            assert!(app.page(source).is_some());
        }
    }

    #[test]
    fn test_favorites_fan_out_and_removal() {
        let mut app = test_app();
        app.page_mut(Source::Reddit)
            .unwrap()
            .set_items(vec![reddit("r/1"), reddit("r/2")]);
        app.apply_favorites(vec![fav(4, "r/1")]);

        let page = app.page(Source::Reddit).unwrap();
        assert_eq!(page.items()[0].favorite_state(), (true, Some(4)));
        assert_eq!(app.favorites.items.len(), 1);

        app.favorite_removed(4);
        let page = app.page(Source::Reddit).unwrap();
        assert_eq!(page.items()[0].favorite_state(), (false, None));
        assert!(app.favorites.items.is_empty());
    }

    #[test]
    fn test_history_filter_and_remove() {
        let mut app = test_app();
        let mut a = HistoryItem::visit("Rust 2024", "u/1", Source::News, "tech");
        a.id = Some(1);
        let mut b = HistoryItem::visit("Football", "u/2", Source::Football, "");
        b.id = Some(2);
        app.history.set_items(vec![a, b]);

        app.history.set_filter("rust");
        assert_eq!(app.history.visible_len(), 1);
        app.history.remove(1);
        assert_eq!(app.history.visible_len(), 0);
        app.history.set_filter("");
        assert_eq!(app.history.visible_len(), 1);
    }

    #[test]
    fn test_sign_out_clears_session_data() {
        let mut app = test_app();
        app.auth = AuthState::signed_in("me@x.org");
        app.apply_favorites(vec![fav(1, "r/1")]);
        app.sign_out_locally();
        assert!(!app.auth.authenticated);
        assert!(app.favorites.items.is_empty());
    }

    // Status message expiry with time control
    #[tokio::test]
    async fn test_status_expires_after_3_seconds() {
        let mut app = test_app();
        time::pause();
        app.set_status("Test message");

        time::advance(Duration::from_secs(2)).await;
        app.clear_expired_status();
        assert!(app.status_message.is_some());

        time::advance(Duration::from_secs(2)).await;
        assert!(app.clear_expired_status());
        assert!(app.status_message.is_none());
    }

    #[tokio::test]
    async fn test_error_status_is_flagged() {
        let mut app = test_app();
        time::pause();
        app.set_error("Not authenticated");
        assert!(matches!(app.status_message, Some((_, true, _))));

        time::advance(Duration::from_millis(2999)).await;
        app.clear_expired_status();
        assert!(app.status_message.is_some());
    }
}
