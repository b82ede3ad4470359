/// Something the local text filter can search.
pub trait Searchable {
    /// Fields compared against the filter term.
    fn search_fields(&self) -> Vec<&str>;

    fn matches(&self, needle_lower: &str) -> bool {
        self.search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(needle_lower))
    }
}

/// Keep the items where the term appears, case-insensitively, in any search field.
///
/// A blank term returns the list unchanged. A non-blank term is used as
/// typed, surrounding spaces included. Order is preserved.
pub fn filter<T: Searchable + Clone>(items: &[T], term: &str) -> Vec<T> {
    if term.trim().is_empty() {
        return items.to_vec();
    }
    let needle = term.to_lowercase();
    items
        .iter()
        .filter(|item| item.matches(&needle))
        .cloned()
        .collect()
}

/// Indices of the matching items, for views that keep the full list and a selection into it.
pub fn filter_indices<T: Searchable>(items: &[T], term: &str) -> Vec<usize> {
    if term.trim().is_empty() {
        return (0..items.len()).collect();
    }
    let needle = term.to_lowercase();
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.matches(&needle))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{GithubRepo, RedditPost};
    use pretty_assertions::assert_eq;

    fn repo(full_name: &str, description: &str, owner: &str) -> GithubRepo {
        GithubRepo {
            category: "github".into(),
            created_at: String::new(),
            description: description.into(),
            full_name: full_name.into(),
            url: format!("https://github.com/{}", full_name),
            owner: owner.into(),
            stars: 0,
            watchers: 0,
        }
    }

    #[test]
    fn test_blank_term_returns_everything() {
        let items = vec![repo("a/b", "", "a"), repo("c/d", "", "c")];
        assert_eq!(filter(&items, ""), items);
        assert_eq!(filter(&items, "   "), items);
    }

    #[test]
    fn test_matches_any_designated_field_case_insensitively() {
        let items = vec![
            repo("tokio-rs/tokio", "async runtime", "tokio-rs"),
            repo("serde-rs/serde", "Serialization FRAMEWORK", "serde-rs"),
            repo("x/y", "nothing", "x"),
        ];
        let hits = filter(&items, "framework");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].full_name, "serde-rs/serde");
        assert_eq!(filter(&items, "TOKIO").len(), 1);
    }

    #[test]
    fn test_url_is_not_searched() {
        let items = vec![repo("a/b", "", "a")];
        assert!(filter(&items, "github.com").is_empty());
    }

    #[test]
    fn test_term_is_not_trimmed() {
        let posts = vec![
            RedditPost {
                author: "bob".into(),
                title: "rustacean".into(),
                url: "u1".into(),
            },
            RedditPost {
                author: "amy".into(),
                title: "learning rust today".into(),
                url: "u2".into(),
            },
        ];
        let hits = filter(&posts, " rust");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].url, "u2");
    }

    #[test]
    fn test_filter_indices_preserve_order() {
        let items = vec![repo("a/x", "", "a"), repo("b/y", "", "b"), repo("c/x", "", "c")];
        assert_eq!(filter_indices(&items, "x"), vec![0, 2]);
        assert_eq!(filter_indices(&items, ""), vec![0, 1, 2]);
    }
}
