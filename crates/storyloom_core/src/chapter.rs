//! Chapter entries of the scene store and their character metadata.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::reindex::{reindex_renamed_scenes, reindex_scenes};
use crate::scene::{Scene, create_default_scene};
use crate::utils::json::object_or_encoded;

/// A character on a chapter's roster.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CharacterEntry {
    /// Character name, never blank
    pub name: String,
    /// Short description, may be empty
    pub description: String,
}

/// Character rosters and story notes attached to a chapter.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterMetadata {
    /// Point-of-view and lead characters
    pub main_characters: Vec<CharacterEntry>,
    /// Everyone else who appears
    pub supporting_characters: Vec<CharacterEntry>,
    /// Hooks, kept as given
    pub hooks: Vec<Value>,
    /// Story beats, kept as given
    pub beats: Vec<Value>,
}

impl ChapterMetadata {
    /// True when no roster or notes are set.
    pub fn is_empty(&self) -> bool {
        self.main_characters.is_empty()
            && self.supporting_characters.is_empty()
            && self.hooks.is_empty()
            && self.beats.is_empty()
    }
}

/// One chapter bucket in the scene store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterEntry {
    /// Chapter title, used as the prefix of default scene titles
    pub chapter_title: String,
    /// Chapter outline
    pub outline: String,
    /// Ordered scenes
    pub scenes: Vec<Scene>,
    /// Character rosters and notes
    pub metadata: ChapterMetadata,
}

impl ChapterEntry {
    /// A chapter holding a single default scene.
    pub fn new(chapter_title: impl Into<String>, outline: impl Into<String>) -> Self {
        let chapter_title = chapter_title.into();
        let scenes = vec![create_default_scene(0, &chapter_title)];
        Self {
            chapter_title,
            outline: outline.into(),
            scenes,
            metadata: ChapterMetadata::default(),
        }
    }

    /// Re-derive ordering and default titles for this chapter's scenes.
    ///
    /// An empty chapter is given a fresh default scene.
    pub fn reindex(&mut self) {
        if self.scenes.is_empty() {
            self.scenes.push(create_default_scene(0, &self.chapter_title));
            return;
        }
        let scenes = std::mem::take(&mut self.scenes);
        self.scenes = reindex_scenes(&self.chapter_title, scenes);
    }

    /// Rename the chapter and reindex its scenes.
    ///
    /// Default titles generated under the old name follow the new one.
    pub fn retitle(&mut self, chapter_title: impl Into<String>) {
        let previous = std::mem::replace(&mut self.chapter_title, chapter_title.into());
        if self.scenes.is_empty() {
            self.scenes.push(create_default_scene(0, &self.chapter_title));
            return;
        }
        let scenes = std::mem::take(&mut self.scenes);
        self.scenes = reindex_renamed_scenes(&previous, &self.chapter_title, scenes);
    }

    /// Find a scene by id.
    pub fn scene(&self, scene_id: &str) -> Option<&Scene> {
        self.scenes.iter().find(|s| s.id == scene_id)
    }

    /// Position of a scene by id.
    pub fn position_of(&self, scene_id: &str) -> Option<usize> {
        self.scenes.iter().position(|s| s.id == scene_id)
    }
}

/// Coerce arbitrary metadata into a [`ChapterMetadata`].
///
/// Accepts an object or a JSON-encoded object string. Character lists take
/// bare names or `{name, description}` objects; entries whose name is blank
/// are dropped. `hooks` and `beats` pass through only if they are arrays.
/// Anything else yields the empty default.
pub fn normalize_chapter_metadata(value: &Value) -> ChapterMetadata {
    let Some(obj) = object_or_encoded(value, "chapter metadata") else {
        return ChapterMetadata::default();
    };

    ChapterMetadata {
        main_characters: normalize_characters(obj.get("mainCharacters")),
        supporting_characters: normalize_characters(obj.get("supportingCharacters")),
        hooks: array_or_empty(&obj, "hooks"),
        beats: array_or_empty(&obj, "beats"),
    }
}

fn normalize_characters(value: Option<&Value>) -> Vec<CharacterEntry> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let (name, description) = match item {
                Value::String(name) => (name.as_str(), ""),
                Value::Object(obj) => (
                    obj.get("name").and_then(Value::as_str).unwrap_or_default(),
                    obj.get("description").and_then(Value::as_str).unwrap_or_default(),
                ),
                _ => return None,
            };
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some(CharacterEntry {
                name: name.to_string(),
                description: description.to_string(),
            })
        })
        .collect()
}

fn array_or_empty(obj: &Map<String, Value>, key: &str) -> Vec<Value> {
    match obj.get(key) {
        Some(Value::Array(items)) => items.clone(),
        _ => Vec::new(),
    }
}
