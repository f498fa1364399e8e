//! One-shot seeds for the scene store.
//!
//! Other tools (the manuscript manager, the plot analyzer) hand scenes to
//! the scene builder by staging a seed in local storage. The scene builder
//! consumes the seed once on open and deletes it. Deleting the manuscript
//! chapter a seed targets discards the seed.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chapter::{ChapterEntry, normalize_chapter_metadata};
use crate::scene::{SceneInput, normalize_scene};
use crate::store::SceneStore;

/// How seeded scenes combine with a chapter's existing scenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedMode {
    /// Add after the existing scenes
    #[default]
    Append,
    /// Discard the existing scenes
    Replace,
}

/// Scenes staged for a chapter of the scene store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneSeed {
    /// Target chapter key (`"standalone"` or a manuscript chapter id)
    pub chapter_id: String,
    /// Title for the chapter entry; empty keeps the existing title
    #[serde(default)]
    pub chapter_title: String,
    /// Outline for the chapter entry; empty keeps the existing outline
    #[serde(default)]
    pub outline: String,
    /// Raw scene records
    #[serde(default)]
    pub scenes: Vec<Value>,
    /// Chapter metadata to apply, if any
    #[serde(default)]
    pub metadata: Option<Value>,
    /// Combination mode
    #[serde(default)]
    pub mode: SeedMode,
}

impl SceneSeed {
    /// A seed appending `scenes` to `chapter_id`.
    pub fn new(chapter_id: impl Into<String>, scenes: Vec<Value>) -> Self {
        Self {
            chapter_id: chapter_id.into(),
            chapter_title: String::new(),
            outline: String::new(),
            scenes,
            metadata: None,
            mode: SeedMode::Append,
        }
    }
}

/// Apply a seed to a copy of `store`.
///
/// The target chapter is created if needed. A chapter that only holds a
/// single untouched default scene is treated as empty so seeding does not
/// leave a blank scene in front. The seeded chapter and its first new
/// scene become the selection.
pub fn apply_seed(store: &SceneStore, seed: &SceneSeed) -> SceneStore {
    let mut seeded = store.clone();

    let entry = seeded
        .chapters
        .entry(seed.chapter_id.clone())
        .or_insert_with(|| ChapterEntry::new(seed.chapter_title.clone(), seed.outline.clone()));

    if !seed.outline.is_empty() {
        entry.outline = seed.outline.clone();
    }
    if let Some(metadata) = &seed.metadata {
        entry.metadata = normalize_chapter_metadata(metadata);
    }

    let replace = seed.mode == SeedMode::Replace || is_placeholder_only(entry);
    if replace && !seed.scenes.is_empty() {
        entry.scenes.clear();
    }

    let first_new = entry.scenes.len();
    for (offset, raw) in seed.scenes.iter().enumerate() {
        let scene = normalize_scene(SceneInput::Raw(raw.clone()), first_new + offset);
        entry.scenes.push(scene);
    }
    if seed.chapter_title.trim().is_empty() {
        entry.reindex();
    } else {
        entry.retitle(seed.chapter_title.clone());
    }
    let selected = entry.scenes.get(first_new).map(|s| s.id.clone());

    seeded.current_chapter_id = seed.chapter_id.clone();
    seeded.current_scene_id = selected;
    seeded.ensure_standalone();
    seeded.resolve_pointers();
    seeded
}

fn is_placeholder_only(entry: &ChapterEntry) -> bool {
    match entry.scenes.as_slice() {
        [only] => only.text.trim().is_empty() && only.notes.trim().is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{STANDALONE_CHAPTER_ID, create_default_store};
    use serde_json::json;

    #[test]
    fn test_seed_replaces_placeholder_scene() {
        let store = create_default_store();
        let mut seed = SceneSeed::new("5", vec![json!({"title": "Rooftops"}), json!({})]);
        seed.chapter_title = "Chase".into();

        let seeded = apply_seed(&store, &seed);
        let chase = seeded.chapter("5").unwrap();
        assert_eq!(chase.scenes.len(), 2);
        assert_eq!(chase.scenes[0].title, "Rooftops");
        assert_eq!(chase.scenes[1].title, "Chase – Scene 2");
        assert_eq!(seeded.current_chapter_id, "5");
        assert_eq!(seeded.current_scene_id.as_deref(), Some(chase.scenes[0].id.as_str()));
    }

    #[test]
    fn test_seed_appends_to_written_scenes() {
        let mut store = create_default_store();
        let first = store.current_scene_id.clone().unwrap();
        store
            .update_scene(
                STANDALONE_CHAPTER_ID,
                &first,
                crate::store::ScenePatch {
                    text: Some("Already written.".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        let seed = SceneSeed::new(STANDALONE_CHAPTER_ID, vec![json!({"text": "New"})]);
        let seeded = apply_seed(&store, &seed);
        let standalone = seeded.chapter(STANDALONE_CHAPTER_ID).unwrap();
        assert_eq!(standalone.scenes.len(), 2);
        assert_eq!(standalone.scenes[0].id, first);
        assert_eq!(seeded.current_scene().unwrap().text, "New");
    }

    #[test]
    fn test_seed_with_existing_scene_id_gets_fresh_id() {
        let mut store = create_default_store();
        let first = store.current_scene_id.clone().unwrap();
        store
            .update_scene(
                STANDALONE_CHAPTER_ID,
                &first,
                crate::store::ScenePatch {
                    text: Some("Already written.".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        let seed = SceneSeed::new(
            STANDALONE_CHAPTER_ID,
            vec![json!({"id": first.clone(), "text": "Copied"}), json!({"text": "Other"})],
        );

        let seeded = apply_seed(&store, &seed);
        let standalone = seeded.chapter(STANDALONE_CHAPTER_ID).unwrap();
        assert_eq!(standalone.scenes.len(), 3);
        assert_eq!(standalone.scenes[0].id, first);
        assert_ne!(standalone.scenes[1].id, first);
        assert_eq!(seeded.current_scene().unwrap().text, "Copied");
    }

    #[test]
    fn test_seed_replace_mode() {
        let mut store = create_default_store();
        store.add_scene(STANDALONE_CHAPTER_ID, None).unwrap();
        let mut seed = SceneSeed::new(STANDALONE_CHAPTER_ID, vec![json!({"title": "Only"})]);
        seed.mode = SeedMode::Replace;

        let seeded = apply_seed(&store, &seed);
        let standalone = seeded.chapter(STANDALONE_CHAPTER_ID).unwrap();
        assert_eq!(standalone.scenes.len(), 1);
        assert_eq!(standalone.scenes[0].title, "Only");
    }

    #[test]
    fn test_seed_without_scenes_selects_chapter() {
        let store = create_default_store();
        let mut seed = SceneSeed::new("9", vec![]);
        seed.chapter_title = "Epilogue".into();
        seed.metadata = Some(json!({"mainCharacters": ["Mara"]}));

        let seeded = apply_seed(&store, &seed);
        let epilogue = seeded.chapter("9").unwrap();
        assert_eq!(epilogue.scenes.len(), 1);
        assert_eq!(epilogue.metadata.main_characters[0].name, "Mara");
        assert_eq!(seeded.current_chapter_id, "9");
        assert!(seeded.current_scene().is_some());
    }
}
