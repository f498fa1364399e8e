//! Reconciling backend data into the scene store.
//!
//! Backend responses may arrive long after they were requested, so nothing
//! here replaces the store wholesale. Merges overwrite by chapter key and
//! leave everything else alone:
//!
//! - [`merge_scenes_from_backend`] replaces the scenes of chapters the
//!   backend returned and keeps local-only chapters.
//! - [`merge_chapters_from_list`] aligns chapter entries with the manuscript
//!   chapter list, pruning entries for deleted chapters.
//!
//! When local and backend both changed the same chapter, the backend wins
//! for that whole chapter.
//!
//! [`flatten_for_backend`] goes the other way and produces the flat,
//! chapter-tagged scene list the backend stores.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chapter::{ChapterEntry, normalize_chapter_metadata};
use crate::manuscript::ManuscriptChapter;
use crate::reindex::reindex_renamed_scenes;
use crate::scene::Scene;
use crate::store::{STANDALONE_CHAPTER_ID, STANDALONE_CHAPTER_TITLE, SceneStore};
use crate::utils::json::{id_string, non_negative_int, string_or_empty};

/// Scenes the backend returned for one chapter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackendSceneGroup {
    /// Chapter title as known to the backend (may be empty)
    pub chapter_title: String,
    /// Chapter outline as known to the backend (may be empty)
    pub outline: String,
    /// Raw scene records, ordered
    pub scenes: Vec<Value>,
}

/// A scene as stored by the backend: flat and tagged with its chapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendScene {
    /// Numeric manuscript chapter id
    pub chapter_id: i64,
    /// Title of the owning chapter
    pub chapter_title: String,
    /// Outline of the owning chapter
    pub chapter_outline: String,
    /// The scene itself
    #[serde(flatten)]
    pub scene: Scene,
}

/// Parse a scene-store chapter key as a backend chapter id.
///
/// Only integer keys refer to saved manuscript chapters; `"standalone"` and
/// locally generated ids do not.
pub fn remote_chapter_id(chapter_id: &str) -> Option<i64> {
    chapter_id.parse::<i64>().ok()
}

/// Group flat backend scene records by chapter.
///
/// Records without a `chapterId` are dropped. Within a group, scenes are
/// sorted by their `ordering` (records without one keep their relative
/// position at the end).
pub fn group_backend_scenes(records: &[Value]) -> IndexMap<String, BackendSceneGroup> {
    let mut groups: IndexMap<String, BackendSceneGroup> = IndexMap::new();

    for record in records {
        let Some(obj) = record.as_object() else {
            continue;
        };
        let Some(chapter_id) = obj.get("chapterId").and_then(id_string) else {
            log::debug!("[Merge] Dropping backend scene without chapterId");
            continue;
        };

        let group = groups.entry(chapter_id).or_default();
        if group.chapter_title.is_empty() {
            group.chapter_title = string_or_empty(obj, "chapterTitle");
        }
        if group.outline.is_empty() {
            group.outline = string_or_empty(obj, "chapterOutline");
        }
        group.scenes.push(record.clone());
    }

    for group in groups.values_mut() {
        group
            .scenes
            .sort_by_key(|s| s.get("ordering").and_then(non_negative_int).unwrap_or(u64::MAX));
    }

    groups
}

/// Merge backend scene groups into a copy of `store`.
///
/// Each group replaces the scenes of its chapter (reindexed) and refreshes
/// the title and outline when the backend supplied them. Chapters the
/// backend did not return are kept as they are. The selection falls back
/// to the first chapter and scene if it no longer resolves.
pub fn merge_scenes_from_backend(
    store: &SceneStore,
    groups: &IndexMap<String, BackendSceneGroup>,
) -> SceneStore {
    let mut merged = store.clone();

    for (chapter_id, group) in groups {
        if group.scenes.is_empty() {
            continue;
        }

        let entry = merged
            .chapters
            .entry(chapter_id.clone())
            .or_insert_with(|| ChapterEntry::new(group.chapter_title.clone(), group.outline.clone()));

        let previous_title = entry.chapter_title.clone();
        if !group.chapter_title.trim().is_empty() {
            entry.chapter_title = group.chapter_title.clone();
        }
        if !group.outline.is_empty() {
            entry.outline = group.outline.clone();
        }
        entry.scenes =
            reindex_renamed_scenes(&previous_title, &entry.chapter_title, group.scenes.iter().cloned());
    }

    merged.ensure_standalone();
    merged.resolve_pointers();
    merged
}

/// Align the scene store with the manuscript chapter list.
///
/// Every manuscript chapter gets an entry (title and outline refreshed,
/// scenes kept or seeded with one default scene). Entries that are neither
/// `"standalone"` nor in `chapters` are pruned, which is how deleting a
/// manuscript chapter removes its scenes. The standalone entry is always
/// present, first.
pub fn merge_chapters_from_list(store: &SceneStore, chapters: &[ManuscriptChapter]) -> SceneStore {
    let mut merged_chapters = IndexMap::with_capacity(chapters.len() + 1);

    let standalone = store
        .chapters
        .get(STANDALONE_CHAPTER_ID)
        .cloned()
        .unwrap_or_else(|| ChapterEntry::new(STANDALONE_CHAPTER_TITLE, ""));
    merged_chapters.insert(STANDALONE_CHAPTER_ID.to_string(), standalone);

    for chapter in chapters {
        let key = chapter.store_key();
        let entry = match store.chapters.get(&key) {
            Some(existing) => {
                let mut entry = existing.clone();
                entry.outline = chapter.outline.clone();
                if entry.metadata.is_empty() {
                    entry.metadata = normalize_chapter_metadata(&chapter.metadata);
                }
                entry.retitle(chapter.title.clone());
                entry
            }
            None => {
                let mut entry = ChapterEntry::new(chapter.title.clone(), chapter.outline.clone());
                entry.metadata = normalize_chapter_metadata(&chapter.metadata);
                entry
            }
        };
        merged_chapters.insert(key, entry);
    }

    for pruned in store
        .chapters
        .keys()
        .filter(|k| !merged_chapters.contains_key(k.as_str()))
    {
        log::debug!("[Merge] Pruning scene bucket for removed chapter {}", pruned);
    }

    let mut merged = SceneStore {
        chapters: merged_chapters,
        current_chapter_id: store.current_chapter_id.clone(),
        current_scene_id: store.current_scene_id.clone(),
    };
    merged.resolve_pointers();
    merged
}

/// Move scene buckets to the ids a manuscript save assigned.
///
/// Some backends recreate chapters on save and hand out new ids.
/// `sent` and `saved` are the lists passed to and returned by the save,
/// paired by position; when their lengths differ nothing is moved.
pub fn rekey_saved_chapters(
    store: &SceneStore,
    sent: &[ManuscriptChapter],
    saved: &[ManuscriptChapter],
) -> SceneStore {
    let mut rekeyed = store.clone();
    if sent.len() != saved.len() {
        log::warn!(
            "[Merge] Saved chapter list has {} entries, sent {}; keeping chapter keys",
            saved.len(),
            sent.len()
        );
        return rekeyed;
    }

    let renames: Vec<(String, String)> = sent
        .iter()
        .zip(saved)
        .filter(|(before, after)| before.id > 0 && before.id != after.id)
        .map(|(before, after)| (before.store_key(), after.store_key()))
        .collect();
    if renames.is_empty() {
        return rekeyed;
    }

    let renamed = |key: &str| {
        renames
            .iter()
            .find(|(old, _)| old == key)
            .map(|(_, new)| new.clone())
    };
    rekeyed.chapters = std::mem::take(&mut rekeyed.chapters)
        .into_iter()
        .map(|(key, entry)| (renamed(&key).unwrap_or(key), entry))
        .collect();
    if let Some(new) = renamed(&rekeyed.current_chapter_id) {
        rekeyed.current_chapter_id = new;
    }
    rekeyed
}

/// Flatten the store into chapter-tagged records for the backend.
///
/// Chapters whose key is not an integer (the standalone chapter, chapters
/// not yet saved) are local-only and excluded.
pub fn flatten_for_backend(store: &SceneStore) -> Vec<BackendScene> {
    store
        .chapters
        .iter()
        .filter_map(|(key, entry)| remote_chapter_id(key).map(|id| (id, entry)))
        .flat_map(|(chapter_id, entry)| {
            entry.scenes.iter().map(move |scene| BackendScene {
                chapter_id,
                chapter_title: entry.chapter_title.clone(),
                chapter_outline: entry.outline.clone(),
                scene: scene.clone(),
            })
        })
        .collect()
}

/// Split a flat payload into per-chapter batches, preserving chapter order.
pub fn partition_by_chapter(scenes: &[BackendScene]) -> IndexMap<i64, Vec<BackendScene>> {
    let mut batches: IndexMap<i64, Vec<BackendScene>> = IndexMap::new();
    for scene in scenes {
        batches.entry(scene.chapter_id).or_default().push(scene.clone());
    }
    batches
}
