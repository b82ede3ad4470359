use super::client::{extract_list, ApiClient, Result, LIST_FIELDS};
use crate::sources::{
    FootballMatch, GithubRepo, NewsArticle, RedditPost, SearchHit, Source, SourceEntry,
    YoutubeVideo,
};

/// Country used for the YouTube trending list when none is configured.
pub const DEFAULT_YOUTUBE_COUNTRY: &str = "morocco";

impl ApiClient {
    pub async fn github_trending(&self) -> Result<Vec<GithubRepo>> {
        extract_list(self.get(&["github"]).await?, LIST_FIELDS)
    }

    pub async fn reddit_hot(&self) -> Result<Vec<RedditPost>> {
        extract_list(self.get(&["reddit"]).await?, LIST_FIELDS)
    }

    pub async fn news(&self) -> Result<Vec<NewsArticle>> {
        extract_list(self.get(&["news"]).await?, LIST_FIELDS)
    }

    pub async fn football(&self) -> Result<Vec<FootballMatch>> {
        extract_list(self.get(&["sports"]).await?, LIST_FIELDS)
    }

    pub async fn youtube_trending(&self, country: &str) -> Result<Vec<YoutubeVideo>> {
        let country = if country.trim().is_empty() {
            DEFAULT_YOUTUBE_COUNTRY
        } else {
            country.trim()
        };
        extract_list(self.get(&["youtube", country]).await?, LIST_FIELDS)
    }

    /// Cross-source keyword search run by the backend.
    pub async fn search(&self, term: &str) -> Result<Vec<SearchHit>> {
        extract_list(self.get(&["search", term]).await?, LIST_FIELDS)
    }

    /// Fetch any source's list as [`SourceEntry`] values.
    pub async fn fetch_source(&self, source: Source, country: &str) -> Result<Vec<SourceEntry>> {
        let entries: Vec<SourceEntry> = match source {
            Source::Github => self.github_trending().await?.into_iter().map(SourceEntry::Github).collect(),
            Source::Reddit => self.reddit_hot().await?.into_iter().map(SourceEntry::Reddit).collect(),
            Source::News => self.news().await?.into_iter().map(SourceEntry::News).collect(),
            Source::Football => self.football().await?.into_iter().map(SourceEntry::Football).collect(),
            Source::Youtube => self
                .youtube_trending(country)
                .await?
                .into_iter()
                .map(SourceEntry::Youtube)
                .collect(),
        };
        tracing::debug!(source = %source, count = entries.len(), "Source list fetched");
        Ok(entries)
    }

    /// Backend search results shaped as YouTube page entries.
    pub async fn search_as_videos(&self, term: &str) -> Result<Vec<SourceEntry>> {
        Ok(self
            .search(term)
            .await?
            .into_iter()
            .map(|hit| SourceEntry::Youtube(YoutubeVideo::from(hit)))
            .collect())
    }
}
