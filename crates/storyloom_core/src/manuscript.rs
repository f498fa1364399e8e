//! Manuscript chapters.
//!
//! A manuscript chapter is the coarse, rich-text chapter owned by the
//! manuscript manager. It is persisted independently of the scene store;
//! the two are linked only by id (`chapter.id.to_string()` is the scene
//! store key) and kept consistent by [`crate::merge::merge_chapters_from_list`].

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::utils::json::{non_empty_str, non_negative_int, string_or_empty};
use crate::utils::{count_words, now_timestamp};

/// Editorial status of a manuscript chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChapterStatus {
    /// Being written
    #[default]
    Draft,
    /// Under review
    Review,
    /// Done
    Final,
}

impl ChapterStatus {
    /// Parse a status, falling back to `Draft` for anything unknown.
    pub fn resolve(raw: &str) -> ChapterStatus {
        match raw.trim().to_lowercase().as_str() {
            "review" => ChapterStatus::Review,
            "final" => ChapterStatus::Final,
            _ => ChapterStatus::Draft,
        }
    }
}

impl fmt::Display for ChapterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChapterStatus::Draft => "draft",
            ChapterStatus::Review => "review",
            ChapterStatus::Final => "final",
        };
        f.write_str(s)
    }
}

/// A chapter of the manuscript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManuscriptChapter {
    /// Numeric id (backend-assigned, or allocated by the local backend)
    pub id: i64,
    /// Chapter title
    pub title: String,
    /// Chapter outline
    #[serde(default)]
    pub outline: String,
    /// Rich-text (HTML) content
    #[serde(default)]
    pub content: String,
    /// Words in the plain-text form of `content`
    #[serde(default)]
    pub word_count: u64,
    /// Editorial status
    #[serde(default)]
    pub status: ChapterStatus,
    /// RFC 3339 creation time
    #[serde(default)]
    pub created_at: String,
    /// Free-form metadata
    #[serde(default)]
    pub metadata: Value,
}

impl ManuscriptChapter {
    /// Create a chapter with the given id and title.
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            outline: String::new(),
            content: String::new(),
            word_count: 0,
            status: ChapterStatus::Draft,
            created_at: now_timestamp(),
            metadata: Value::Object(Map::new()),
        }
    }

    /// The scene store key for this chapter.
    pub fn store_key(&self) -> String {
        self.id.to_string()
    }

    /// Replace the content and recompute the word count.
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.word_count = count_words(&self.content);
    }
}

/// Coerce an untrusted chapter record into a [`ManuscriptChapter`].
///
/// Returns `None` when the record has no usable numeric id; such chapters
/// have not been persisted yet and cannot be linked to a scene bucket.
/// A missing word count is derived from the content.
pub fn normalize_manuscript_chapter(value: &Value) -> Option<ManuscriptChapter> {
    let obj = value.as_object()?;
    let id = match obj.get("id")? {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };

    let content = string_or_empty(obj, "content");
    let word_count = obj
        .get("wordCount")
        .and_then(non_negative_int)
        .filter(|count| *count > 0)
        .unwrap_or_else(|| count_words(&content));

    Some(ManuscriptChapter {
        id,
        title: non_empty_str(obj, "title")
            .map(str::to_string)
            .unwrap_or_else(|| format!("Chapter {}", id)),
        outline: string_or_empty(obj, "outline"),
        content,
        word_count,
        status: obj
            .get("status")
            .and_then(Value::as_str)
            .map(ChapterStatus::resolve)
            .unwrap_or_default(),
        created_at: non_empty_str(obj, "createdAt")
            .map(str::to_string)
            .unwrap_or_else(now_timestamp),
        metadata: obj
            .get("metadata")
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new())),
    })
}

/// Normalize a list of chapter records, dropping those without an id.
pub fn normalize_manuscript_chapters(values: &[Value]) -> Vec<ManuscriptChapter> {
    values
        .iter()
        .filter_map(|value| {
            let chapter = normalize_manuscript_chapter(value);
            if chapter.is_none() {
                log::debug!("[Manuscript] Skipping chapter without a numeric id");
            }
            chapter
        })
        .collect()
}

/// Remove a chapter by id, returning the remaining chapters in order.
pub fn delete_manuscript_chapter(chapters: &[ManuscriptChapter], id: i64) -> Vec<ManuscriptChapter> {
    chapters.iter().filter(|c| c.id != id).cloned().collect()
}

/// Total words across all chapters.
pub fn total_word_count(chapters: &[ManuscriptChapter]) -> u64 {
    chapters.iter().map(|c| c.word_count).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_manuscript_chapter() {
        let chapter = normalize_manuscript_chapter(&json!({
            "id": 7,
            "title": "Harbor",
            "content": "<p>The ships came in.</p>",
            "status": "REVIEW",
            "createdAt": "2024-03-01T10:00:00"
        }))
        .unwrap();
        assert_eq!(chapter.id, 7);
        assert_eq!(chapter.title, "Harbor");
        assert_eq!(chapter.word_count, 4);
        assert_eq!(chapter.status, ChapterStatus::Review);
        assert_eq!(chapter.created_at, "2024-03-01T10:00:00");
        assert_eq!(chapter.store_key(), "7");
    }

    #[test]
    fn test_chapter_without_id_is_skipped() {
        assert!(normalize_manuscript_chapter(&json!({"title": "Unsaved"})).is_none());
        assert!(normalize_manuscript_chapter(&json!({"id": "local-abc"})).is_none());
        assert!(normalize_manuscript_chapter(&json!("nope")).is_none());
        assert_eq!(
            normalize_manuscript_chapter(&json!({"id": "12"})).unwrap().title,
            "Chapter 12"
        );
    }

    #[test]
    fn test_delete_manuscript_chapter() {
        let chapters = vec![
            ManuscriptChapter::new(1, "One"),
            ManuscriptChapter::new(2, "Two"),
            ManuscriptChapter::new(3, "Three"),
        ];
        let remaining = delete_manuscript_chapter(&chapters, 2);
        let ids: Vec<i64> = remaining.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_set_content_updates_word_count() {
        let mut chapter = ManuscriptChapter::new(1, "One");
        chapter.set_content("<p>Call me Ishmael.</p>");
        assert_eq!(chapter.word_count, 3);
        assert_eq!(total_word_count(&[chapter.clone(), chapter]), 6);
    }
}
