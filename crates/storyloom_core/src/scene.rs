//! Scene records and the scene normalizer.
//!
//! Scenes reach the store from several places: the local cache, the
//! backend, seeds staged by other tools, and generated content. None of
//! those can be trusted to carry every field, so every scene goes through
//! [`normalize_scene`] which turns a [`SceneInput`] into a canonical
//! [`Scene`] without ever failing.
//!
//! # Example
//!
//! ```ignore
//! use storyloom_core::scene::{normalize_scene, SceneType};
//! use serde_json::json;
//!
//! let scene = normalize_scene(json!({ "title": "Ambush", "type": "battle" }), 0);
//! assert_eq!(scene.scene_type, SceneType::Action);
//! assert_eq!(scene.ordering, 0);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::reindex::default_scene_title;
use crate::utils::json::{id_string, non_empty_str, non_negative_int, object_or_encoded, string_or_empty};
use crate::utils::{generate_local_id, now_timestamp};

/// The dramatic function of a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneType {
    /// Characters talking
    #[default]
    Dialogue,
    /// Physical conflict or movement
    Action,
    /// Internal, feeling-driven beats
    Emotional,
    /// Setup and background
    Exposition,
    /// Peak of a conflict
    Climax,
    /// Bridges between other scenes
    Transition,
}

impl SceneType {
    /// Every scene type, in display order.
    pub const ALL: [SceneType; 6] = [
        SceneType::Dialogue,
        SceneType::Action,
        SceneType::Emotional,
        SceneType::Exposition,
        SceneType::Climax,
        SceneType::Transition,
    ];

    /// The canonical lower-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SceneType::Dialogue => "dialogue",
            SceneType::Action => "action",
            SceneType::Emotional => "emotional",
            SceneType::Exposition => "exposition",
            SceneType::Climax => "climax",
            SceneType::Transition => "transition",
        }
    }

    /// Resolve a loosely written scene type.
    ///
    /// Canonical names and common synonyms are recognized case-insensitively;
    /// anything else falls back to [`SceneType::Dialogue`].
    pub fn resolve(raw: &str) -> SceneType {
        match raw.trim().to_lowercase().as_str() {
            "dialogue" | "conversation" | "talk" | "dialog" | "argument" => SceneType::Dialogue,
            "action" | "battle" | "fight" | "combat" | "chase" => SceneType::Action,
            "emotional" | "emotion" | "feelings" | "introspection" | "reflection" => {
                SceneType::Emotional
            }
            "exposition" | "setup" | "background" | "worldbuilding" | "description" => {
                SceneType::Exposition
            }
            "climax" | "finale" | "showdown" | "resolution" | "peak" => SceneType::Climax,
            "transition" | "bridge" | "interlude" | "montage" => SceneType::Transition,
            _ => SceneType::Dialogue,
        }
    }
}

impl fmt::Display for SceneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A canonical scene owned by exactly one chapter entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    /// Unique within the owning chapter
    pub id: String,
    /// Display title; auto-generated titles follow renumbering
    pub title: String,
    /// Dramatic function
    #[serde(rename = "type")]
    pub scene_type: SceneType,
    /// Scene prose
    pub text: String,
    /// Author notes
    pub notes: String,
    /// Free-form metadata (mood, POV, generated analysis, ...)
    pub metadata: Map<String, Value>,
    /// Position within the chapter, dense from 0
    pub ordering: u32,
    /// RFC 3339 creation time
    pub created_at: String,
    /// RFC 3339 last modification time
    pub updated_at: String,
}

impl Scene {
    /// Create an empty scene at `index` with a default title.
    pub fn new(index: usize, chapter_title: &str) -> Self {
        let now = now_timestamp();
        Self {
            id: generate_local_id("scene"),
            title: default_scene_title(chapter_title, index + 1),
            scene_type: SceneType::default(),
            text: String::new(),
            notes: String::new(),
            metadata: Map::new(),
            ordering: index as u32,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Mark the scene as modified now.
    pub fn touch(&mut self) {
        self.updated_at = now_timestamp();
    }
}

/// A scene as it arrives from outside the store.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneInput {
    /// Untrusted JSON from the cache, the backend or generated content
    Raw(Value),
    /// Already canonical
    Canonical(Scene),
}

impl From<Value> for SceneInput {
    fn from(value: Value) -> Self {
        SceneInput::Raw(value)
    }
}

impl From<Scene> for SceneInput {
    fn from(scene: Scene) -> Self {
        SceneInput::Canonical(scene)
    }
}

impl From<&Scene> for SceneInput {
    fn from(scene: &Scene) -> Self {
        SceneInput::Canonical(scene.clone())
    }
}

/// Build a fresh default scene for position `index` in a chapter.
pub fn create_default_scene(index: usize, chapter_title: &str) -> Scene {
    Scene::new(index, chapter_title)
}

/// Coerce any scene input into a canonical [`Scene`].
///
/// Missing or malformed fields are replaced by defaults: a fresh id,
/// `Scene {index + 1}` as title, `dialogue` as type, `index` as ordering and
/// the current time for timestamps. Metadata given as a JSON string is
/// parsed; a parse failure yields an empty map. Normalizing a canonical
/// scene returns an equal scene.
pub fn normalize_scene(input: impl Into<SceneInput>, index: usize) -> Scene {
    match input.into() {
        SceneInput::Canonical(scene) => repair_canonical(scene, index),
        SceneInput::Raw(Value::Object(obj)) => from_raw_object(&obj, index),
        SceneInput::Raw(other) => {
            if !other.is_null() {
                log::warn!("[Normalize] Scene at index {} is not an object, replacing", index);
            }
            from_raw_object(&Map::new(), index)
        }
    }
}

fn repair_canonical(mut scene: Scene, index: usize) -> Scene {
    if scene.id.trim().is_empty() {
        scene.id = generate_local_id("scene");
    }
    if scene.title.trim().is_empty() {
        scene.title = fallback_title(index);
    }
    if scene.created_at.is_empty() || scene.updated_at.is_empty() {
        let now = now_timestamp();
        if scene.created_at.is_empty() {
            scene.created_at = now.clone();
        }
        if scene.updated_at.is_empty() {
            scene.updated_at = now;
        }
    }
    scene
}

fn from_raw_object(obj: &Map<String, Value>, index: usize) -> Scene {
    let id = obj
        .get("id")
        .and_then(id_string)
        .unwrap_or_else(|| generate_local_id("scene"));

    let title = non_empty_str(obj, "title")
        .map(|t| t.trim().to_string())
        .unwrap_or_else(|| fallback_title(index));

    let scene_type = obj
        .get("type")
        .or_else(|| obj.get("sceneType"))
        .and_then(Value::as_str)
        .map(SceneType::resolve)
        .unwrap_or_default();

    let metadata = obj
        .get("metadata")
        .and_then(|m| object_or_encoded(m, "scene metadata"))
        .unwrap_or_default();

    let ordering = obj
        .get("ordering")
        .and_then(non_negative_int)
        .and_then(|o| u32::try_from(o).ok())
        .unwrap_or(index as u32);

    let now = now_timestamp();
    let created_at = non_empty_str(obj, "createdAt")
        .map(str::to_string)
        .unwrap_or_else(|| now.clone());
    let updated_at = non_empty_str(obj, "updatedAt")
        .map(str::to_string)
        .unwrap_or(now);

    Scene {
        id,
        title,
        scene_type,
        text: string_or_empty(obj, "text"),
        notes: string_or_empty(obj, "notes"),
        metadata,
        ordering,
        created_at,
        updated_at,
    }
}

fn fallback_title(index: usize) -> String {
    format!("Scene {}", index + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scene_type_aliases() {
        assert_eq!(SceneType::resolve("battle"), SceneType::Action);
        assert_eq!(SceneType::resolve("Conversation"), SceneType::Dialogue);
        assert_eq!(SceneType::resolve(" CLIMAX "), SceneType::Climax);
        assert_eq!(SceneType::resolve("montage"), SceneType::Transition);
        assert_eq!(SceneType::resolve("interpretive dance"), SceneType::Dialogue);
        for t in SceneType::ALL {
            assert_eq!(SceneType::resolve(t.as_str()), t);
        }
    }

    #[test]
    fn test_normalize_empty_object_uses_defaults() {
        let scene = normalize_scene(json!({}), 2);
        assert!(scene.id.starts_with("scene-"));
        assert_eq!(scene.title, "Scene 3");
        assert_eq!(scene.scene_type, SceneType::Dialogue);
        assert_eq!(scene.ordering, 2);
        assert!(scene.metadata.is_empty());
        assert!(!scene.created_at.is_empty());
        assert!(!scene.updated_at.is_empty());
    }

    #[test]
    fn test_normalize_non_object_input() {
        let scene = normalize_scene(json!("garbage"), 0);
        assert_eq!(scene.title, "Scene 1");
        assert_eq!(scene.ordering, 0);
    }

    #[test]
    fn test_normalize_keeps_supplied_fields() {
        let scene = normalize_scene(
            json!({
                "id": 42,
                "title": "  The Ambush ",
                "sceneType": "fight",
                "text": "Steel rang.",
                "notes": "tighten",
                "metadata": {"pov": "Mara"},
                "ordering": 5,
                "createdAt": "2024-01-01T00:00:00Z",
                "updatedAt": "2024-01-02T00:00:00Z"
            }),
            0,
        );
        assert_eq!(scene.id, "42");
        assert_eq!(scene.title, "The Ambush");
        assert_eq!(scene.scene_type, SceneType::Action);
        assert_eq!(scene.text, "Steel rang.");
        assert_eq!(scene.notes, "tighten");
        assert_eq!(scene.metadata.get("pov"), Some(&json!("Mara")));
        assert_eq!(scene.ordering, 5);
        assert_eq!(scene.created_at, "2024-01-01T00:00:00Z");
        assert_eq!(scene.updated_at, "2024-01-02T00:00:00Z");
    }

    #[test]
    fn test_normalize_metadata_string() {
        let scene = normalize_scene(json!({"metadata": "{\"mood\": \"grim\"}"}), 0);
        assert_eq!(scene.metadata.get("mood"), Some(&json!("grim")));

        let broken = normalize_scene(json!({"metadata": "{not json"}), 0);
        assert!(broken.metadata.is_empty());
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let first = normalize_scene(json!({"title": "Opening", "type": "exposition"}), 1);
        let second = normalize_scene(first.clone(), 1);
        assert_eq!(first, second);

        let via_json = normalize_scene(serde_json::to_value(&first).unwrap(), 1);
        assert_eq!(first, via_json);
    }

    #[test]
    fn test_serialized_field_names() {
        let scene = normalize_scene(json!({"type": "action"}), 0);
        let value = serde_json::to_value(&scene).unwrap();
        assert_eq!(value["type"], json!("action"));
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
    }
}
