//! Content sources and their list entries.
//!
//! Each backend source (GitHub, Reddit, news, football, YouTube) returns a
//! differently shaped list. The [`Entry`] trait gives them a common face:
//! a natural key for favorite matching, the designated search fields, the
//! payload to bookmark them and the visit record to log when opened.

mod entries;
pub mod filter;
pub mod page;
pub mod reconcile;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::api::{FavoriteItem, HistoryItem, NewFavorite};

pub(crate) use entries::nullable_string;
pub use entries::{
    match_title, match_url, FootballMatch, GithubRepo, NewsArticle, RedditPost, SearchHit,
    YoutubeVideo,
};
pub use filter::{filter, filter_indices, Searchable};
pub use page::{LoadState, PendingToggle, SourcePage};
pub use reconcile::{begin_toggle, decorate, redecorate, Decorated, FavoriteIndex, ToggleRequest};

/// Origin of a piece of content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Github,
    Reddit,
    News,
    Football,
    Youtube,
}

impl Source {
    /// Display order of the source tabs.
    pub const ALL: [Source; 5] = [
        Source::Github,
        Source::Reddit,
        Source::News,
        Source::Football,
        Source::Youtube,
    ];

    /// Lower-case tag stored in favorite and history records.
    pub fn tag(self) -> &'static str {
        match self {
            Source::Github => "github",
            Source::Reddit => "reddit",
            Source::News => "news",
            Source::Football => "football",
            Source::Youtube => "youtube",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Source::Github => "GitHub",
            Source::Reddit => "Reddit",
            Source::News => "News",
            Source::Football => "Football",
            Source::Youtube => "YouTube",
        }
    }

    /// Whether a favorite record belongs to this source.
    ///
    /// Older records carry the tag in `category` rather than `source`, so
    /// either field counts.
    pub fn owns(self, favorite: &FavoriteItem) -> bool {
        favorite.source == self.tag() || favorite.category == self.tag()
    }

    /// The favorite field compared against an entry's natural key.
    pub fn favorite_key(self, favorite: &FavoriteItem) -> &str {
        match self {
            Source::Github => &favorite.title,
            _ => &favorite.url,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Source::ALL
            .into_iter()
            .find(|src| src.tag().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown source: {}", s))
    }
}

/// A list entry from one of the sources.
pub trait Entry: Searchable + Clone {
    fn source(&self) -> Source;

    /// Title shown in lists and stored in favorites and history.
    fn title(&self) -> String;

    fn url(&self) -> &str;

    /// Value matched against [`Source::favorite_key`] of favorite records.
    fn natural_key(&self) -> &str;

    /// Body for `POST /favorites`.
    fn favorite_payload(&self) -> NewFavorite;

    /// Record logged to history when the entry is opened.
    fn visit(&self) -> HistoryItem;

    /// Labelled fields for the detail overlay.
    fn details(&self) -> Vec<(&'static str, String)>;
}

/// Any source's entry, so pages for all sources share one type.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceEntry {
    Github(GithubRepo),
    Reddit(RedditPost),
    News(NewsArticle),
    Football(FootballMatch),
    Youtube(YoutubeVideo),
}

macro_rules! delegate {
    ($self:ident, $e:ident => $body:expr) => {
        match $self {
            SourceEntry::Github($e) => $body,
            SourceEntry::Reddit($e) => $body,
            SourceEntry::News($e) => $body,
            SourceEntry::Football($e) => $body,
            SourceEntry::Youtube($e) => $body,
        }
    };
}

impl Searchable for SourceEntry {
    fn search_fields(&self) -> Vec<&str> {
        delegate!(self, e => e.search_fields())
    }
}

impl Entry for SourceEntry {
    fn source(&self) -> Source {
        delegate!(self, e => e.source())
    }

    fn title(&self) -> String {
        delegate!(self, e => e.title())
    }

    fn url(&self) -> &str {
        delegate!(self, e => e.url())
    }

    fn natural_key(&self) -> &str {
        delegate!(self, e => e.natural_key())
    }

    fn favorite_payload(&self) -> NewFavorite {
        delegate!(self, e => e.favorite_payload())
    }

    fn visit(&self) -> HistoryItem {
        delegate!(self, e => e.visit())
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        delegate!(self, e => e.details())
    }
}

impl SourceEntry {
    /// Secondary text for list rows (owner, author, score, channel).
    pub fn subtitle(&self) -> String {
        match self {
            SourceEntry::Github(r) => format!("★ {}  {}", crate::util::format_count(r.stars), r.owner),
            SourceEntry::Reddit(p) => format!("u/{}", p.author),
            SourceEntry::News(a) => format!("{} · {}", a.source, a.author),
            SourceEntry::Football(m) => format!("{}  {}  {}", m.score, m.status, m.competition),
            SourceEntry::Youtube(v) => {
                if v.views.is_empty() {
                    v.channel.clone()
                } else {
                    format!("{} · {} views", v.channel, v.views)
                }
            }
        }
    }
}
