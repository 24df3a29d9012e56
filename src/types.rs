//! Data types returned by the backend API.
//!
//! Every payload is deserialized into one of these types at the API boundary
//! (see [`crate::api`]), so rendering code never deals with missing fields.
//! Nothing here is persisted: values live for one generation run and are
//! discarded afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A Discord user credited on a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: u64,
    /// Known aliases, joined with `" / "` for display.
    #[serde(default)]
    pub display_names: Vec<String>,
    pub username: String,
    pub discriminator: String,
}

impl Author {
    /// Aliases joined for display.
    pub fn display_name(&self) -> String {
        self.display_names.join(" / ")
    }

    /// `username#discriminator`, as shown in the page header.
    pub fn tag(&self) -> String {
        format!("{}#{}", self.username, self.discriminator)
    }
}

/// Snippet reference as it appears in series listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrimmedSnippet {
    pub author_id: u64,
    pub message_id: u64,
    pub channel_id: u64,
}

/// A snippet with its markdown content and attachments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snippet {
    #[serde(flatten)]
    pub meta: TrimmedSnippet,
    pub content: String,
    #[serde(default)]
    pub attachment_urls: Vec<String>,
}

/// A series of snippets, generic over how much of each snippet is present.
///
/// `tag` is the stable identifier used by the edit and delete endpoints;
/// `title` is free-form display text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series<S = Snippet> {
    pub tag: String,
    pub title: String,
    pub authors: Vec<Author>,
    #[serde(default)]
    pub subscribers: Vec<Author>,
    /// Unix timestamp in seconds.
    #[serde(default)]
    pub updated: Option<f64>,
    pub url: String,
    #[serde(default)]
    pub warnings: Vec<String>,
    pub wordcount: u64,
    #[serde(default)]
    pub can_edit: bool,
    pub snippets: Vec<S>,
}

/// The list/index form of a series.
pub type TrimmedSeries = Series<TrimmedSnippet>;

impl Series<Snippet> {
    /// Message ids that appear more than once. Each id becomes a DOM anchor,
    /// so a renderable series must have none.
    pub fn duplicate_message_ids(&self) -> Vec<u64> {
        let mut seen = HashSet::new();
        let mut dupes = Vec::new();
        for snippet in &self.snippets {
            let id = snippet.meta.message_id;
            if !seen.insert(id) && !dupes.contains(&id) {
                dupes.push(id);
            }
        }
        dupes
    }
}

/// Tags that appear more than once in a listing.
pub fn duplicate_tags<S>(series: &[Series<S>]) -> Vec<&str> {
    let mut seen = HashSet::new();
    let mut dupes: Vec<&str> = Vec::new();
    for s in series {
        if !seen.insert(s.tag.as_str()) && !dupes.contains(&s.tag.as_str()) {
            dupes.push(&s.tag);
        }
    }
    dupes
}

/// Response of `/api/auth/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginData {
    pub session_id: String,
    #[serde(default)]
    pub dev_mode: bool,
    /// `None` for anonymous sessions.
    #[serde(default)]
    pub user_data: Option<Author>,
}

impl LoginData {
    pub fn is_logged_in(&self) -> bool {
        self.user_data.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    #[test]
    fn author_display_name_joins_aliases() {
        let a = author(1, &["Kit", "Kitty"], "kit", "0001");
        assert_eq!(a.display_name(), "Kit / Kitty");
        assert_eq!(a.tag(), "kit#0001");
    }

    #[test]
    fn parse_trimmed_series_listing() {
        let json = r#"[{
            "tag": "wolves",
            "title": "Of Wolves",
            "authors": [{"id": 12, "display_names": ["Ash"], "username": "ash", "discriminator": "1234"}],
            "subscribers": [],
            "updated": 1620000000.5,
            "url": "/series/wolves",
            "warnings": ["gore"],
            "wordcount": 1200,
            "can_edit": true,
            "snippets": [{"author_id": 12, "message_id": 800000000000000001, "channel_id": 5}]
        }]"#;
        let parsed: Vec<TrimmedSeries> = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].authors[0].username, "ash");
        assert_eq!(parsed[0].snippets[0].message_id, 800000000000000001);
        assert_eq!(parsed[0].updated, Some(1620000000.5));
        assert!(parsed[0].can_edit);
    }

    #[test]
    fn parse_full_snippet_flattens_ids() {
        let json = r#"{
            "author_id": 1, "message_id": 2, "channel_id": 3,
            "content": "hello", "attachment_urls": ["https://cdn.example/a.png"]
        }"#;
        let s: Snippet = serde_json::from_str(json).unwrap();
        assert_eq!(s.meta.message_id, 2);
        assert_eq!(s.attachment_urls.len(), 1);
    }

    #[test]
    fn optional_fields_default() {
        let json = r#"{"tag": "t", "title": "T", "authors": [], "url": "/t",
            "wordcount": 0, "snippets": []}"#;
        let s: TrimmedSeries = serde_json::from_str(json).unwrap();
        assert!(!s.can_edit);
        assert!(s.updated.is_none());
        assert!(s.warnings.is_empty());
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let json = r#"{"tag": "t", "authors": [], "url": "/t", "wordcount": 0, "snippets": []}"#;
        let result: Result<TrimmedSeries, _> = serde_json::from_str(json);
        assert!(result.unwrap_err().to_string().contains("title"));
    }

    #[test]
    fn login_data_null_user_is_anonymous() {
        let json = r#"{"logged_in": false, "session_id": "abc", "dev_mode": true, "user_data": null}"#;
        let data: LoginData = serde_json::from_str(json).unwrap();
        assert!(!data.is_logged_in());
        assert!(data.dev_mode);
    }

    #[test]
    fn login_data_accepts_manager_flag() {
        let json = r#"{"session_id": "abc", "dev_mode": false, "user_data":
            {"id": 7, "display_names": ["Ro"], "username": "ro", "discriminator": "0042", "is_manager": true}}"#;
        let data: LoginData = serde_json::from_str(json).unwrap();
        assert_eq!(data.user_data.unwrap().username, "ro");
    }

    #[test]
    fn duplicate_tags_reported_once() {
        let list = vec![
            trimmed_series("a", "A"),
            trimmed_series("b", "B"),
            trimmed_series("a", "A again"),
            trimmed_series("a", "A thrice"),
        ];
        assert_eq!(duplicate_tags(&list), vec!["a"]);
    }

    #[test]
    fn duplicate_message_ids_detected() {
        let mut s = full_series("t", "T");
        s.snippets = vec![snippet(1, "a"), snippet(2, "b"), snippet(1, "c")];
        assert_eq!(s.duplicate_message_ids(), vec![1]);
    }
}
