//! Scene reindexing.
//!
//! After any structural change to a chapter's scene list (add, remove,
//! reorder, merge) the list is passed through [`reindex_scenes`], which
//! makes `ordering` match array position and renumbers auto-generated
//! titles. Titles typed by the author are left alone. A scene id repeated
//! within the chapter is replaced with a fresh local id.

use std::collections::HashSet;

use crate::scene::{Scene, SceneInput, normalize_scene};
use crate::utils::generate_local_id;

/// Separator between the chapter title and the scene number in default titles.
pub const TITLE_SEPARATOR: &str = " – ";

/// The default title for the scene at 1-based `position` in a chapter.
///
/// `"{chapter_title} – Scene {position}"`, or `"Scene {position}"` when the
/// chapter title is blank.
pub fn default_scene_title(chapter_title: &str, position: usize) -> String {
    let chapter_title = chapter_title.trim();
    if chapter_title.is_empty() {
        format!("Scene {}", position)
    } else {
        format!("{}{}Scene {}", chapter_title, TITLE_SEPARATOR, position)
    }
}

/// Whether `title` is the bare `Scene {n}` form.
fn is_bare_default(title: &str) -> bool {
    title
        .strip_prefix("Scene ")
        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}

/// Whether `title` was generated by us for a scene previously at
/// `old_ordering`, under either the previous or the current chapter title.
fn is_generated_title(title: &str, previous_title: &str, chapter_title: &str, old_ordering: u32) -> bool {
    let title = title.trim();
    let position = old_ordering as usize + 1;
    title.is_empty()
        || is_bare_default(title)
        || title == default_scene_title(chapter_title, position)
        || title == default_scene_title(previous_title, position)
}

/// Normalize and reindex a chapter's scenes.
///
/// Every output scene has `ordering` equal to its position. A title is
/// replaced by [`default_scene_title`] only when it is empty, matches the
/// bare `Scene {n}` pattern, or matches the chapter-prefixed default for
/// the scene's previous position. Ids are unique in the output.
pub fn reindex_scenes<I, S>(chapter_title: &str, scenes: I) -> Vec<Scene>
where
    I: IntoIterator<Item = S>,
    S: Into<SceneInput>,
{
    reindex_renamed_scenes(chapter_title, chapter_title, scenes)
}

/// [`reindex_scenes`] for a chapter renamed from `previous_title`.
///
/// Default titles generated under the previous chapter title are renumbered
/// under the new one instead of being kept as custom titles.
pub fn reindex_renamed_scenes<I, S>(previous_title: &str, chapter_title: &str, scenes: I) -> Vec<Scene>
where
    I: IntoIterator<Item = S>,
    S: Into<SceneInput>,
{
    let mut seen = HashSet::new();
    scenes
        .into_iter()
        .enumerate()
        .map(|(index, input)| {
            let mut scene = normalize_scene(input, index);
            if !seen.insert(scene.id.clone()) {
                let fresh = generate_local_id("scene");
                log::warn!(
                    "[Reindex] Duplicate scene id '{}' in chapter '{}', reassigned to '{}'",
                    scene.id,
                    chapter_title,
                    fresh
                );
                seen.insert(fresh.clone());
                scene.id = fresh;
            }
            if is_generated_title(&scene.title, previous_title, chapter_title, scene.ordering) {
                scene.title = default_scene_title(chapter_title, index + 1);
            }
            scene.ordering = index as u32;
            scene
        })
        .collect()
}
