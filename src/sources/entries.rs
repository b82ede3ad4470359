//! Per-source list entries as returned by the backend.
//!
//! The backend is loose about nulls and number encodings, so every string
//! field tolerates `null` and numeric fields tolerate numeric strings.

use serde::{Deserialize, Deserializer};

use super::{Entry, Searchable, Source};
use crate::api::{HistoryItem, NewFavorite};

// ============================================================================
// Lenient field decoders
// ============================================================================

/// Deserialize a string that may be `null` or missing.
pub(crate) fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize a value that may be a JSON number, a string, or `null` into a string.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        Some(serde_json::Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    })
}

/// Deserialize a count that may be a number, a numeric string, or `null`.
fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Some(serde_json::Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

/// JavaScript-style `a || b` for strings: empty falls back to the default.
fn or_default(value: String, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value
    }
}

// ============================================================================
// GitHub
// ============================================================================

/// A trending GitHub repository.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GithubRepo {
    #[serde(default, deserialize_with = "nullable_string")]
    pub category: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub created_at: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub description: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub full_name: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub url: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub owner: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub stars: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub watchers: u64,
}

impl Searchable for GithubRepo {
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.full_name, &self.description, &self.owner]
    }
}

impl Entry for GithubRepo {
    fn source(&self) -> Source {
        Source::Github
    }

    fn title(&self) -> String {
        self.full_name.clone()
    }

    fn url(&self) -> &str {
        &self.url
    }

    /// Repositories are bookmarked under their `owner/name`.
    fn natural_key(&self) -> &str {
        &self.full_name
    }

    fn favorite_payload(&self) -> NewFavorite {
        NewFavorite {
            title: self.full_name.clone(),
            url: self.url.clone(),
            category: Source::Github.tag().to_string(),
            source: Source::Github.tag().to_string(),
        }
    }

    fn visit(&self) -> HistoryItem {
        HistoryItem::visit(&self.full_name, &self.url, Source::Github, &self.category)
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Repository", self.full_name.clone()),
            ("Owner", self.owner.clone()),
            ("Description", self.description.clone()),
            ("Stars", self.stars.to_string()),
            ("Watchers", self.watchers.to_string()),
            ("Created", self.created_at.clone()),
            ("Category", self.category.clone()),
            ("URL", self.url.clone()),
        ]
    }
}

// ============================================================================
// Reddit
// ============================================================================

/// A hot post from r/all.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RedditPost {
    #[serde(default, deserialize_with = "nullable_string")]
    pub author: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub url: String,
}

impl Searchable for RedditPost {
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.title, &self.author]
    }
}

impl Entry for RedditPost {
    fn source(&self) -> Source {
        Source::Reddit
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn natural_key(&self) -> &str {
        &self.url
    }

    fn favorite_payload(&self) -> NewFavorite {
        NewFavorite {
            title: self.title.clone(),
            url: self.url.clone(),
            category: Source::Reddit.tag().to_string(),
            source: Source::Reddit.tag().to_string(),
        }
    }

    fn visit(&self) -> HistoryItem {
        let mut visit = HistoryItem::visit(&self.title, &self.url, Source::Reddit, "trending");
        visit.author = Some(self.author.clone()).filter(|a| !a.is_empty());
        visit
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Title", self.title.clone()),
            ("Author", self.author.clone()),
            ("URL", self.url.clone()),
        ]
    }
}

// ============================================================================
// News
// ============================================================================

#[derive(Deserialize)]
struct RawNewsArticle {
    #[serde(default, deserialize_with = "nullable_string")]
    author: String,
    #[serde(default, deserialize_with = "nullable_string")]
    category: String,
    #[serde(default, deserialize_with = "nullable_string")]
    source: String,
    #[serde(default, deserialize_with = "nullable_string")]
    title: String,
    #[serde(default, deserialize_with = "nullable_string")]
    url: String,
}

/// A news headline aggregated from Reddit, Hacker News or NewsAPI.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawNewsArticle")]
pub struct NewsArticle {
    pub author: String,
    pub category: String,
    /// Upstream outlet, e.g. "Hacker News".
    pub source: String,
    pub title: String,
    pub url: String,
}

impl From<RawNewsArticle> for NewsArticle {
    fn from(raw: RawNewsArticle) -> Self {
        Self {
            author: or_default(raw.author, "Unknown"),
            category: or_default(raw.category, "general_news"),
            source: or_default(raw.source, "Unknown"),
            title: raw.title,
            url: raw.url,
        }
    }
}

impl Searchable for NewsArticle {
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.title, &self.author, &self.source]
    }
}

impl Entry for NewsArticle {
    fn source(&self) -> Source {
        Source::News
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn natural_key(&self) -> &str {
        &self.url
    }

    fn favorite_payload(&self) -> NewFavorite {
        NewFavorite {
            title: self.title.clone(),
            url: self.url.clone(),
            category: self.category.clone(),
            source: Source::News.tag().to_string(),
        }
    }

    fn visit(&self) -> HistoryItem {
        let mut visit = HistoryItem::visit(&self.title, &self.url, Source::News, &self.category);
        visit.author = Some(self.author.clone());
        visit
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Title", self.title.clone()),
            ("Author", self.author.clone()),
            ("Outlet", self.source.clone()),
            ("Category", self.category.clone()),
            ("URL", self.url.clone()),
        ]
    }
}

// ============================================================================
// Football
// ============================================================================

/// Host used for the synthetic match URLs; the backend has no per-match page.
const MATCH_URL_PREFIX: &str = "https://sports.example.com/match/";

#[derive(Deserialize)]
struct RawFootballMatch {
    #[serde(default, deserialize_with = "nullable_string")]
    away_team: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default, deserialize_with = "nullable_string")]
    competition: String,
    #[serde(default, deserialize_with = "nullable_string")]
    date: String,
    #[serde(default, deserialize_with = "nullable_string")]
    home_team: String,
    #[serde(default, deserialize_with = "string_or_number")]
    score: String,
    #[serde(default, deserialize_with = "nullable_string")]
    status: String,
}

/// A football fixture or result.
///
/// The backend sends no link, so `url` is derived from the match title and
/// doubles as the natural key for favorites.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawFootballMatch")]
pub struct FootballMatch {
    pub away_team: String,
    pub category: String,
    pub competition: String,
    pub date: String,
    pub home_team: String,
    pub score: String,
    pub status: String,
    pub url: String,
}

impl From<RawFootballMatch> for FootballMatch {
    fn from(raw: RawFootballMatch) -> Self {
        let title = match_title(&raw.home_team, &raw.away_team, &raw.date);
        Self {
            url: match_url(&title),
            away_team: raw.away_team,
            category: raw.category.unwrap_or_else(|| "sports".to_string()),
            competition: raw.competition,
            date: raw.date,
            home_team: raw.home_team,
            score: raw.score,
            status: raw.status,
        }
    }
}

/// `"{home} vs {away} - {date}"`
pub fn match_title(home: &str, away: &str, date: &str) -> String {
    format!("{} vs {} - {}", home, away, date)
}

/// Derive the synthetic match URL: every UTF-16 code unit outside
/// `[A-Za-z0-9]` becomes `_`, so characters beyond the BMP yield two.
pub fn match_url(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else {
            slug.extend(std::iter::repeat_n('_', c.len_utf16()));
        }
    }
    format!("{}{}", MATCH_URL_PREFIX, slug)
}

impl FootballMatch {
    pub fn match_title(&self) -> String {
        match_title(&self.home_team, &self.away_team, &self.date)
    }
}

impl Searchable for FootballMatch {
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.home_team, &self.away_team, &self.competition]
    }
}

impl Entry for FootballMatch {
    fn source(&self) -> Source {
        Source::Football
    }

    fn title(&self) -> String {
        self.match_title()
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn natural_key(&self) -> &str {
        &self.url
    }

    fn favorite_payload(&self) -> NewFavorite {
        NewFavorite {
            title: self.match_title(),
            url: self.url.clone(),
            category: self.competition.clone(),
            source: Source::Football.tag().to_string(),
        }
    }

    fn visit(&self) -> HistoryItem {
        HistoryItem::visit(
            &self.match_title(),
            &self.url,
            Source::Football,
            &self.competition,
        )
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Match", self.match_title()),
            ("Competition", self.competition.clone()),
            ("Score", self.score.clone()),
            ("Status", self.status.clone()),
            ("Date", self.date.clone()),
        ]
    }
}

// ============================================================================
// YouTube
// ============================================================================

/// A trending YouTube video.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct YoutubeVideo {
    #[serde(default, deserialize_with = "nullable_string")]
    pub category: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub channel: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub url: String,
    /// View count as sent by the backend (number or numeric string).
    #[serde(default, deserialize_with = "string_or_number")]
    pub views: String,
}

impl Searchable for YoutubeVideo {
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.title, &self.channel]
    }
}

impl Entry for YoutubeVideo {
    fn source(&self) -> Source {
        Source::Youtube
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn natural_key(&self) -> &str {
        &self.url
    }

    fn favorite_payload(&self) -> NewFavorite {
        NewFavorite {
            title: self.title.clone(),
            url: self.url.clone(),
            category: or_default(self.category.clone(), Source::Youtube.tag()),
            source: Source::Youtube.tag().to_string(),
        }
    }

    fn visit(&self) -> HistoryItem {
        let category = if self.category.is_empty() {
            "trending"
        } else {
            &self.category
        };
        let mut visit = HistoryItem::visit(&self.title, &self.url, Source::Youtube, category);
        visit.author = Some(self.channel.clone()).filter(|c| !c.is_empty());
        visit
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Title", self.title.clone()),
            ("Channel", self.channel.clone()),
            ("Views", self.views.clone()),
            ("Category", self.category.clone()),
            ("URL", self.url.clone()),
        ]
    }
}

// ============================================================================
// Backend keyword search
// ============================================================================

/// A hit from the cross-source keyword search (`/search/{term}`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchHit {
    #[serde(default, deserialize_with = "nullable_string")]
    pub author: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub category: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub keyword: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub subreddit: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub url: String,
}

impl From<SearchHit> for YoutubeVideo {
    /// Search results are shown in the video list; the hit's author stands in for the channel.
    fn from(hit: SearchHit) -> Self {
        Self {
            category: hit.category,
            channel: hit.author,
            title: hit.title,
            url: hit.url,
            views: String::new(),
        }
    }
}
