use serde::{Deserialize, Serialize};

use crate::sources::{nullable_string, Searchable, Source};

/// A bookmark stored by the backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FavoriteItem {
    pub id: i64,
    #[serde(default, deserialize_with = "nullable_string")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub url: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub category: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub source: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub added_at: String,
}

impl Searchable for FavoriteItem {
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.title, &self.source, &self.category]
    }
}

/// Request body for creating a favorite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewFavorite {
    pub title: String,
    pub url: String,
    pub category: String,
    pub source: String,
}

/// A visit record. Sent as-is to `POST /history` and read back from `GET /history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "nullable_string")]
    pub title: String,
    pub source: Source,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "nullable_string")]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visited_at: Option<String>,
}

impl HistoryItem {
    /// A fresh visit; the backend stamps id and time.
    pub fn visit(title: &str, url: &str, source: Source, category: &str) -> Self {
        Self {
            id: None,
            title: title.to_string(),
            source,
            author: None,
            url: url.to_string(),
            category: Some(category.to_string()).filter(|c| !c.is_empty()),
            visited_at: None,
        }
    }
}

impl Searchable for HistoryItem {
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.title]
    }
}

/// Generic `{success, message, id}` reply to write operations.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OperationResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub id: Option<i64>,
}

impl OperationResponse {
    /// Only an explicit `success: false` counts as a refusal.
    pub fn rejected(&self) -> bool {
        self.success == Some(false)
    }
}

/// Reply of `GET /session_test`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionInfo {
    #[serde(default)]
    pub username: Option<String>,
}

/// One row of `GET /trends/global`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrendRecord {
    #[serde(default, deserialize_with = "nullable_string")]
    pub date: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub category: String,
    #[serde(default)]
    pub count: serde_json::Value,
}

impl TrendRecord {
    /// Numeric value of `count`: JSON numbers as-is, strings parsed, booleans as 1/0.
    /// Anything else is `None`.
    pub fn count_value(&self) -> Option<f64> {
        match &self.count {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
            serde_json::Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }
}

/// Envelope of `GET /trends/global`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrendsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_favorite_tolerates_nulls() {
        let fav: FavoriteItem = serde_json::from_value(json!({
            "id": 3, "title": null, "url": "u", "category": null, "source": "github"
        }))
        .unwrap();
        assert_eq!(fav.title, "");
        assert_eq!(fav.added_at, "");
    }

    #[test]
    fn test_history_visit_serializes_without_empty_fields() {
        let visit = HistoryItem::visit("t", "u", Source::Github, "");
        let value = serde_json::to_value(&visit).unwrap();
        assert_eq!(value, json!({"title": "t", "source": "github", "url": "u"}));
    }

    #[test]
    fn test_count_coercion() {
        let rec = |count| TrendRecord {
            date: String::new(),
            category: "x".into(),
            count,
        };
        assert_eq!(rec(json!(5)).count_value(), Some(5.0));
        assert_eq!(rec(json!(" 2.5 ")).count_value(), Some(2.5));
        assert_eq!(rec(json!("abc")).count_value(), None);
        assert_eq!(rec(json!(null)).count_value(), None);
        assert_eq!(rec(json!(true)).count_value(), Some(1.0));
    }

    #[test]
    fn test_operation_rejected_only_when_explicit() {
        assert!(!OperationResponse::default().rejected());
        let r: OperationResponse = serde_json::from_value(json!({"success": false})).unwrap();
        assert!(r.rejected());
    }
}
