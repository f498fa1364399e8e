//! The scene store: chapters keyed by id, each with ordered scenes, plus the
//! current chapter/scene selection.
//!
//! # Invariants
//!
//! - `chapters["standalone"]` always exists.
//! - `current_chapter_id` names an existing chapter.
//! - `current_scene_id` names a scene of the current chapter; it is only
//!   `None` while that chapter has no scenes.
//!
//! Every constructor and mutation re-establishes these. [`normalize_store`]
//! is the entry point for persisted blobs and never fails: anything it
//! cannot repair is replaced by [`create_default_store`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::chapter::{ChapterEntry, ChapterMetadata, normalize_chapter_metadata};
use crate::error::{Result, StoryloomError};
use crate::reindex::reindex_scenes;
use crate::scene::{Scene, SceneInput, SceneType, create_default_scene, normalize_scene};
use crate::utils::json::{id_string, string_or_empty};

/// Id of the catch-all chapter for scenes not linked to a manuscript chapter.
pub const STANDALONE_CHAPTER_ID: &str = "standalone";

/// Title given to the standalone chapter when it is created.
pub const STANDALONE_CHAPTER_TITLE: &str = "Standalone Scenes";

/// Nested chapter → scenes collection with the current selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneStore {
    /// Chapter entries in insertion order
    pub chapters: IndexMap<String, ChapterEntry>,
    /// Selected chapter
    pub current_chapter_id: String,
    /// Selected scene within the selected chapter
    pub current_scene_id: Option<String>,
}

/// Field updates for a single scene. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct ScenePatch {
    /// New title; an empty title reverts to the default title
    pub title: Option<String>,
    /// New scene type
    pub scene_type: Option<SceneType>,
    /// New prose
    pub text: Option<String>,
    /// New notes
    pub notes: Option<String>,
    /// Replacement metadata
    pub metadata: Option<Map<String, Value>>,
}

impl Default for SceneStore {
    fn default() -> Self {
        create_default_store()
    }
}

/// A fresh store: one standalone chapter holding one scene, both selected.
pub fn create_default_store() -> SceneStore {
    let mut chapters = IndexMap::new();
    chapters.insert(
        STANDALONE_CHAPTER_ID.to_string(),
        ChapterEntry::new(STANDALONE_CHAPTER_TITLE, ""),
    );
    let mut store = SceneStore {
        chapters,
        current_chapter_id: STANDALONE_CHAPTER_ID.to_string(),
        current_scene_id: None,
    };
    store.resolve_pointers();
    store
}

/// Validate and repair a deserialized store blob.
///
/// Every chapter's scenes are reindexed; a chapter with no scenes (or a
/// non-array scene list) gets one default scene. A blob without chapters
/// is discarded in favour of [`create_default_store`]. The standalone
/// chapter is re-created if missing and the selection is resolved.
pub fn normalize_store(value: &Value) -> SceneStore {
    let Some(obj) = value.as_object() else {
        if !value.is_null() {
            log::warn!("[SceneStore] Persisted store is not an object, using default store");
        }
        return create_default_store();
    };

    let Some(raw_chapters) = obj.get("chapters").and_then(Value::as_object) else {
        log::warn!("[SceneStore] Persisted store has no chapters, using default store");
        return create_default_store();
    };

    let mut chapters = IndexMap::with_capacity(raw_chapters.len());
    for (chapter_id, raw_entry) in raw_chapters {
        let empty = Map::new();
        let entry = raw_entry.as_object().unwrap_or(&empty);
        chapters.insert(chapter_id.clone(), normalize_chapter_entry(entry));
    }

    if chapters.is_empty() {
        log::warn!("[SceneStore] Persisted store has zero chapters, using default store");
        return create_default_store();
    }

    let mut store = SceneStore {
        chapters,
        current_chapter_id: obj
            .get("currentChapterId")
            .and_then(id_string)
            .unwrap_or_default(),
        current_scene_id: obj.get("currentSceneId").and_then(id_string),
    };
    store.ensure_standalone();
    store.resolve_pointers();
    store
}

/// Parse and normalize a cached store. Unparseable JSON yields the default store.
pub fn load_store_from_json(json: &str) -> SceneStore {
    match serde_json::from_str::<Value>(json) {
        Ok(value) => normalize_store(&value),
        Err(e) => {
            log::warn!("[SceneStore] Cached store is not valid JSON ({}), using default store", e);
            create_default_store()
        }
    }
}

fn normalize_chapter_entry(entry: &Map<String, Value>) -> ChapterEntry {
    let chapter_title = string_or_empty(entry, "chapterTitle");
    let scenes = match entry.get("scenes") {
        Some(Value::Array(raw)) if !raw.is_empty() => {
            reindex_scenes(&chapter_title, raw.iter().cloned())
        }
        _ => vec![create_default_scene(0, &chapter_title)],
    };
    ChapterEntry {
        outline: string_or_empty(entry, "outline"),
        metadata: entry
            .get("metadata")
            .map(normalize_chapter_metadata)
            .unwrap_or_default(),
        chapter_title,
        scenes,
    }
}

impl SceneStore {
    /// Re-create the standalone chapter at the front if it is missing.
    pub fn ensure_standalone(&mut self) {
        if !self.chapters.contains_key(STANDALONE_CHAPTER_ID) {
            self.chapters.shift_insert(
                0,
                STANDALONE_CHAPTER_ID.to_string(),
                ChapterEntry::new(STANDALONE_CHAPTER_TITLE, ""),
            );
        }
    }

    /// Point the selection at valid entries.
    ///
    /// An unknown chapter falls back to the first chapter; an unknown or
    /// missing scene falls back to the first scene of the current chapter.
    pub fn resolve_pointers(&mut self) {
        if !self.chapters.contains_key(&self.current_chapter_id) {
            self.current_chapter_id = self
                .chapters
                .keys()
                .next()
                .cloned()
                .unwrap_or_else(|| STANDALONE_CHAPTER_ID.to_string());
        }

        let scenes = self
            .chapters
            .get(&self.current_chapter_id)
            .map(|c| c.scenes.as_slice())
            .unwrap_or_default();

        let valid = self
            .current_scene_id
            .as_deref()
            .is_some_and(|id| scenes.iter().any(|s| s.id == id));
        if !valid {
            self.current_scene_id = scenes.first().map(|s| s.id.clone());
        }
    }

    /// The selected chapter.
    pub fn current_chapter(&self) -> Option<&ChapterEntry> {
        self.chapters.get(&self.current_chapter_id)
    }

    /// The selected scene.
    pub fn current_scene(&self) -> Option<&Scene> {
        let scene_id = self.current_scene_id.as_deref()?;
        self.current_chapter()?.scene(scene_id)
    }

    /// Look up a chapter entry.
    pub fn chapter(&self, chapter_id: &str) -> Option<&ChapterEntry> {
        self.chapters.get(chapter_id)
    }

    fn chapter_mut(&mut self, chapter_id: &str) -> Result<&mut ChapterEntry> {
        self.chapters
            .get_mut(chapter_id)
            .ok_or_else(|| StoryloomError::ChapterNotFound(chapter_id.to_string()))
    }

    /// Total number of scenes across all chapters.
    pub fn scene_count(&self) -> usize {
        self.chapters.values().map(|c| c.scenes.len()).sum()
    }

    /// Select a chapter and its first scene.
    pub fn select_chapter(&mut self, chapter_id: &str) -> Result<()> {
        if !self.chapters.contains_key(chapter_id) {
            return Err(StoryloomError::ChapterNotFound(chapter_id.to_string()));
        }
        self.current_chapter_id = chapter_id.to_string();
        self.current_scene_id = None;
        self.resolve_pointers();
        Ok(())
    }

    /// Select a scene of the current chapter.
    pub fn select_scene(&mut self, scene_id: &str) -> Result<()> {
        let chapter_id = self.current_chapter_id.clone();
        let chapter = self.chapter_mut(&chapter_id)?;
        if chapter.scene(scene_id).is_none() {
            return Err(StoryloomError::SceneNotFound {
                chapter_id,
                scene_id: scene_id.to_string(),
            });
        }
        self.current_scene_id = Some(scene_id.to_string());
        Ok(())
    }

    /// Create a chapter entry, or refresh the title and outline of an existing one.
    ///
    /// Existing scenes are kept and reindexed against the new title.
    pub fn upsert_chapter(&mut self, chapter_id: &str, chapter_title: &str, outline: &str) {
        match self.chapters.get_mut(chapter_id) {
            Some(entry) => {
                entry.outline = outline.to_string();
                entry.retitle(chapter_title);
            }
            None => {
                self.chapters.insert(
                    chapter_id.to_string(),
                    ChapterEntry::new(chapter_title, outline),
                );
            }
        }
        self.resolve_pointers();
    }

    /// Replace a chapter's character metadata.
    pub fn set_chapter_metadata(&mut self, chapter_id: &str, metadata: ChapterMetadata) -> Result<()> {
        self.chapter_mut(chapter_id)?.metadata = metadata;
        Ok(())
    }

    /// Append a scene to a chapter and select it. Returns the new scene's id.
    ///
    /// With no input a blank default scene is added.
    pub fn add_scene(&mut self, chapter_id: &str, input: Option<SceneInput>) -> Result<String> {
        let chapter = self.chapter_mut(chapter_id)?;
        let index = chapter.scenes.len();
        let scene = match input {
            Some(input) => normalize_scene(input, index),
            None => create_default_scene(index, &chapter.chapter_title),
        };
        chapter.scenes.push(scene);
        chapter.reindex();
        let scene_id = chapter.scenes.get(index).map(|s| s.id.clone()).unwrap_or_default();

        self.current_chapter_id = chapter_id.to_string();
        self.current_scene_id = Some(scene_id.clone());
        Ok(scene_id)
    }

    /// Remove a scene from a chapter.
    ///
    /// Removing the last scene leaves a fresh default scene in its place.
    pub fn remove_scene(&mut self, chapter_id: &str, scene_id: &str) -> Result<()> {
        let chapter = self.chapter_mut(chapter_id)?;
        let position = chapter
            .position_of(scene_id)
            .ok_or_else(|| StoryloomError::SceneNotFound {
                chapter_id: chapter_id.to_string(),
                scene_id: scene_id.to_string(),
            })?;
        chapter.scenes.remove(position);
        chapter.reindex();
        self.resolve_pointers();
        Ok(())
    }

    /// Move the scene at position `from` to position `to` within a chapter.
    pub fn move_scene(&mut self, chapter_id: &str, from: usize, to: usize) -> Result<()> {
        let chapter = self.chapter_mut(chapter_id)?;
        let len = chapter.scenes.len();
        if from >= len || to >= len {
            return Err(StoryloomError::InvalidMove { from, to, len });
        }
        if from != to {
            let scene = chapter.scenes.remove(from);
            chapter.scenes.insert(to, scene);
            chapter.reindex();
        }
        Ok(())
    }

    /// Apply field updates to a scene and bump its modification time.
    pub fn update_scene(&mut self, chapter_id: &str, scene_id: &str, patch: ScenePatch) -> Result<()> {
        let chapter = self.chapter_mut(chapter_id)?;
        let position = chapter
            .position_of(scene_id)
            .ok_or_else(|| StoryloomError::SceneNotFound {
                chapter_id: chapter_id.to_string(),
                scene_id: scene_id.to_string(),
            })?;

        let scene = &mut chapter.scenes[position];
        if let Some(title) = patch.title {
            scene.title = title.trim().to_string();
        }
        if let Some(scene_type) = patch.scene_type {
            scene.scene_type = scene_type;
        }
        if let Some(text) = patch.text {
            scene.text = text;
        }
        if let Some(notes) = patch.notes {
            scene.notes = notes;
        }
        if let Some(metadata) = patch.metadata {
            scene.metadata = metadata;
        }
        scene.touch();
        chapter.reindex();
        Ok(())
    }

    /// Serialize for the local cache.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn assert_invariants(store: &SceneStore) {
        assert!(store.chapters.contains_key(STANDALONE_CHAPTER_ID));
        let chapter = store
            .chapters
            .get(&store.current_chapter_id)
            .expect("current chapter resolves");
        let scene_id = store.current_scene_id.as_deref().expect("scene selected");
        assert!(chapter.scenes.iter().any(|s| s.id == scene_id));
        for entry in store.chapters.values() {
            assert!(!entry.scenes.is_empty());
            for (i, scene) in entry.scenes.iter().enumerate() {
                assert_eq!(scene.ordering as usize, i);
            }
        }
    }

    #[test]
    fn test_default_store() {
        let store = create_default_store();
        assert_invariants(&store);
        assert_eq!(store.chapters.len(), 1);
        assert_eq!(store.current_chapter_id, STANDALONE_CHAPTER_ID);
        assert_eq!(
            store.current_scene().unwrap().title,
            "Standalone Scenes – Scene 1"
        );
    }

    #[test]
    fn test_normalize_store_is_total() {
        let inputs = [
            json!(null),
            json!({}),
            json!([]),
            json!([1, 2, 3]),
            json!("a string"),
            json!(12),
            json!({"chapters": null}),
            json!({"chapters": []}),
            json!({"chapters": {}}),
            json!({"chapters": {"3": null}}),
            json!({"chapters": {"3": {"scenes": "nope"}}, "currentChapterId": 99}),
            json!({"chapters": {"3": {"scenes": [null, 5, {"title": 7}]}}}),
        ];
        for input in inputs {
            let store = normalize_store(&input);
            assert_invariants(&store);
        }
    }

    #[test]
    fn test_normalize_store_repairs_chapters() {
        let store = normalize_store(&json!({
            "chapters": {
                "7": {
                    "chapterTitle": "Harbor",
                    "outline": "Arrival",
                    "scenes": [{"id": "a", "title": "Scene 4"}, {"id": "b", "title": "Dockside"}],
                    "metadata": {"mainCharacters": ["Mara"]}
                },
                "9": {"chapterTitle": "Empty", "scenes": []}
            },
            "currentChapterId": "7",
            "currentSceneId": "b"
        }));
        assert_invariants(&store);

        let harbor = store.chapter("7").unwrap();
        assert_eq!(harbor.scenes[0].title, "Harbor – Scene 1");
        assert_eq!(harbor.scenes[1].title, "Dockside");
        assert_eq!(harbor.metadata.main_characters[0].name, "Mara");
        assert_eq!(store.chapter("9").unwrap().scenes.len(), 1);

        // Standalone is re-created at the front
        assert_eq!(store.chapters.keys().next().unwrap(), STANDALONE_CHAPTER_ID);
        assert_eq!(store.current_chapter_id, "7");
        assert_eq!(store.current_scene_id.as_deref(), Some("b"));
    }

    #[test]
    fn test_normalize_store_falls_back_on_dangling_pointers() {
        let store = normalize_store(&json!({
            "chapters": {"standalone": {"scenes": [{"id": "x"}]}},
            "currentChapterId": "missing",
            "currentSceneId": "also-missing"
        }));
        assert_eq!(store.current_chapter_id, STANDALONE_CHAPTER_ID);
        assert_eq!(store.current_scene_id.as_deref(), Some("x"));
    }

    #[test]
    fn test_normalize_store_makes_scene_ids_unique() {
        let store = normalize_store(&json!({
            "chapters": {"7": {"chapterTitle": "Harbor", "scenes": [
                {"id": "a", "title": "Arrival"},
                {"id": "a", "title": "Departure"}
            ]}},
            "currentChapterId": "7",
            "currentSceneId": "a"
        }));
        let harbor = store.chapter("7").unwrap();
        assert_eq!(harbor.scenes[0].id, "a");
        assert_ne!(harbor.scenes[1].id, "a");
        assert_eq!(harbor.position_of(&harbor.scenes[1].id), Some(1));
        assert_eq!(store.current_scene().unwrap().title, "Arrival");
    }

    #[test]
    fn test_upsert_chapter_rename_renumbers_default_titles() {
        let mut store = create_default_store();
        store.upsert_chapter("7", "Old", "");
        let first = store.chapter("7").unwrap().scenes[0].id.clone();
        store.add_scene("7", None).unwrap();
        store.upsert_chapter("7", "New", "");
        store.move_scene("7", 1, 0).unwrap();

        let chapter = store.chapter("7").unwrap();
        assert_eq!(chapter.scenes[1].id, first);
        assert_eq!(chapter.scenes[0].title, "New – Scene 1");
        assert_eq!(chapter.scenes[1].title, "New – Scene 2");
    }

    #[test]
    fn test_load_store_from_invalid_json() {
        let store = load_store_from_json("not json");
        assert_invariants(&store);
        assert_eq!(store.chapters.len(), 1);
    }

    #[test]
    fn test_store_json_round_trip() {
        let mut store = create_default_store();
        store.upsert_chapter("7", "Harbor", "");
        let restored = load_store_from_json(&store.to_json().unwrap());
        assert_eq!(store, restored);
    }

    #[test]
    fn test_add_remove_scene() {
        let mut store = create_default_store();
        let id = store.add_scene(STANDALONE_CHAPTER_ID, None).unwrap();
        assert_eq!(store.current_scene_id.as_deref(), Some(id.as_str()));
        assert_eq!(store.chapter(STANDALONE_CHAPTER_ID).unwrap().scenes.len(), 2);

        store.remove_scene(STANDALONE_CHAPTER_ID, &id).unwrap();
        assert_invariants(&store);
        assert_eq!(store.chapter(STANDALONE_CHAPTER_ID).unwrap().scenes.len(), 1);

        let last = store.current_scene_id.clone().unwrap();
        store.remove_scene(STANDALONE_CHAPTER_ID, &last).unwrap();
        assert_invariants(&store);
        assert_ne!(store.current_scene_id.as_deref(), Some(last.as_str()));
    }

    #[test]
    fn test_move_scene_renumbers_default_titles() {
        let mut store = create_default_store();
        store.upsert_chapter("3", "Storm", "");
        let second = store
            .add_scene("3", Some(json!({"title": "Lightning"}).into()))
            .unwrap();
        store.add_scene("3", None).unwrap();

        store.move_scene("3", 2, 0).unwrap();
        let titles: Vec<&str> = store
            .chapter("3")
            .unwrap()
            .scenes
            .iter()
            .map(|s| s.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Storm – Scene 1", "Storm – Scene 2", "Lightning"]);
        assert_eq!(store.chapter("3").unwrap().scenes[2].id, second);

        assert!(matches!(
            store.move_scene("3", 0, 3),
            Err(StoryloomError::InvalidMove { len: 3, .. })
        ));
    }

    #[test]
    fn test_update_scene() {
        let mut store = create_default_store();
        let id = store.current_scene_id.clone().unwrap();
        store
            .update_scene(
                STANDALONE_CHAPTER_ID,
                &id,
                ScenePatch {
                    title: Some("The Lighthouse".into()),
                    scene_type: Some(SceneType::Climax),
                    ..Default::default()
                },
            )
            .unwrap();
        let scene = store.current_scene().unwrap();
        assert_eq!(scene.title, "The Lighthouse");
        assert_eq!(scene.scene_type, SceneType::Climax);

        store
            .update_scene(
                STANDALONE_CHAPTER_ID,
                &id,
                ScenePatch {
                    title: Some("   ".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(store.current_scene().unwrap().title, "Standalone Scenes – Scene 1");
    }

    #[test]
    fn test_missing_chapter_errors() {
        let mut store = create_default_store();
        assert!(matches!(
            store.add_scene("404", None),
            Err(StoryloomError::ChapterNotFound(_))
        ));
        assert!(store.select_chapter("404").is_err());
        assert!(matches!(
            store.remove_scene(STANDALONE_CHAPTER_ID, "nope"),
            Err(StoryloomError::SceneNotFound { .. })
        ));
    }
}
