//! Storage backend contract.
//!
//! [`StorageBackend`] is the request/response surface of the remote storage
//! service: projects, manuscript chapters, flat chapter-tagged scenes,
//! character profiles and world facts. It is object-safe (every method
//! returns a [`BoxFuture`]) so callers can hold a `dyn StorageBackend`.
//!
//! When no backend URL is configured, [`LocalBackend`] serves the same
//! contract from a [`KeyValueStore`], so callers never branch on whether a
//! server exists.

use std::future::Future;
use std::pin::Pin;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, StoryloomError};
use crate::manuscript::ManuscriptChapter;
use crate::merge::BackendScene;
use crate::storage::{KeyValueStore, keys, load_json, save_json};
use crate::utils::{now_timestamp, slugify};

/// A boxed future for object-safe async methods.
///
/// On native targets, futures are `Send` for compatibility with multi-threaded runtimes.
#[cfg(not(target_arch = "wasm32"))]
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A boxed future for object-safe async methods.
///
/// WASM version without `Send` requirement - JavaScript is single-threaded.
#[cfg(target_arch = "wasm32")]
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Workspace used when none is specified.
pub const DEFAULT_PROJECT_ID: &str = "default";

/// A project (workspace) on the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Project id, used to namespace every other call
    pub id: String,
    /// Display name
    pub name: String,
    /// RFC 3339 creation time
    #[serde(default)]
    pub created_at: String,
}

/// A saved character profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterProfile {
    /// Backend id; `None` before the first save
    #[serde(default)]
    pub id: Option<i64>,
    /// Character name
    pub name: String,
    /// Text the profile was derived from
    #[serde(default)]
    pub source_text: String,
    /// Structured analysis
    #[serde(default)]
    pub analysis: Option<Value>,
    /// Suggestions
    #[serde(default)]
    pub suggestions: Option<Value>,
    /// RFC 3339 creation time
    #[serde(default)]
    pub created_at: String,
    /// RFC 3339 last modification time
    #[serde(default)]
    pub updated_at: String,
}

/// A saved world-building fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldFact {
    /// Backend id; `None` before the first save
    #[serde(default)]
    pub id: Option<i64>,
    /// Fact title
    pub title: String,
    /// Short summary
    #[serde(default)]
    pub summary: String,
    /// Structured details
    #[serde(default)]
    pub details: Option<Value>,
    /// Tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// RFC 3339 creation time
    #[serde(default)]
    pub created_at: String,
    /// RFC 3339 last modification time
    #[serde(default)]
    pub updated_at: String,
}

/// Remote storage for a writing project.
///
/// Every call takes the project (workspace) id it applies to. Failures are
/// reported as [`StoryloomError::Backend`] with a human-readable message.
/// Saves are last-write-wins: `save_manuscript` replaces the chapter list,
/// `save_scenes` replaces all scenes of each chapter present in the payload.
pub trait StorageBackend: Send + Sync {
    /// Human-readable name for logs
    fn name(&self) -> &str;

    /// List projects.
    fn list_projects(&self) -> BoxFuture<'_, Result<Vec<Project>>>;

    /// Create a project named `name`.
    fn create_project<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<Project>>;

    /// Load the manuscript chapters.
    fn load_manuscript<'a>(&'a self, workspace_id: &'a str)
    -> BoxFuture<'a, Result<Vec<ManuscriptChapter>>>;

    /// Replace the manuscript chapters. Returns the chapters as saved, with ids.
    fn save_manuscript<'a>(
        &'a self,
        chapters: &'a [ManuscriptChapter],
        workspace_id: &'a str,
    ) -> BoxFuture<'a, Result<Vec<ManuscriptChapter>>>;

    /// Load all scenes as flat, chapter-tagged records (untrusted).
    fn load_scenes<'a>(&'a self, workspace_id: &'a str) -> BoxFuture<'a, Result<Vec<Value>>>;

    /// Replace the scenes of every chapter present in `scenes`.
    fn save_scenes<'a>(
        &'a self,
        scenes: &'a [BackendScene],
        workspace_id: &'a str,
    ) -> BoxFuture<'a, Result<()>>;

    /// Delete all scenes of a chapter.
    fn delete_scenes<'a>(&'a self, chapter_id: i64, workspace_id: &'a str)
    -> BoxFuture<'a, Result<()>>;

    /// List character profiles.
    fn list_characters<'a>(&'a self, workspace_id: &'a str)
    -> BoxFuture<'a, Result<Vec<CharacterProfile>>>;

    /// Create or update a character profile.
    fn save_character<'a>(
        &'a self,
        character: &'a CharacterProfile,
        workspace_id: &'a str,
    ) -> BoxFuture<'a, Result<CharacterProfile>>;

    /// Delete a character profile.
    fn delete_character<'a>(&'a self, id: i64, workspace_id: &'a str) -> BoxFuture<'a, Result<()>>;

    /// List world facts.
    fn list_world_facts<'a>(&'a self, workspace_id: &'a str)
    -> BoxFuture<'a, Result<Vec<WorldFact>>>;

    /// Create or update a world fact.
    fn save_world_fact<'a>(
        &'a self,
        fact: &'a WorldFact,
        workspace_id: &'a str,
    ) -> BoxFuture<'a, Result<WorldFact>>;

    /// Delete a world fact.
    fn delete_world_fact<'a>(&'a self, id: i64, workspace_id: &'a str) -> BoxFuture<'a, Result<()>>;
}

/// Backend served entirely from local storage.
///
/// Used permanently when no backend URL is configured. Ids are allocated
/// as `max(existing) + 1`; manuscript chapters with an id `<= 0` are
/// treated as unsaved and given one.
pub struct LocalBackend<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> LocalBackend<S> {
    /// Serve the backend contract from `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn load_list<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        Ok(load_json::<Vec<T>>(&self.store, key)?.unwrap_or_default())
    }

    fn projects(&self) -> Result<Vec<Project>> {
        let mut projects: Vec<Project> = self.load_list(keys::PROJECTS)?;
        if projects.is_empty() {
            projects.push(Project {
                id: DEFAULT_PROJECT_ID.to_string(),
                name: "Default Project".to_string(),
                created_at: now_timestamp(),
            });
            save_json(&self.store, keys::PROJECTS, &projects)?;
        }
        Ok(projects)
    }

    fn add_project(&self, name: &str) -> Result<Project> {
        let mut projects = self.projects()?;
        let id = match slugify(name) {
            slug if slug.is_empty() => format!("project-{}", Utc::now().timestamp()),
            slug => slug,
        };
        if projects.iter().any(|p| p.id == id) {
            return Err(StoryloomError::ProjectExists(id));
        }
        let project = Project {
            id,
            name: name.trim().to_string(),
            created_at: now_timestamp(),
        };
        projects.push(project.clone());
        save_json(&self.store, keys::PROJECTS, &projects)?;
        Ok(project)
    }

    fn replace_manuscript(&self, chapters: &[ManuscriptChapter], workspace_id: &str) -> Result<Vec<ManuscriptChapter>> {
        let mut next_id = chapters.iter().map(|c| c.id).max().unwrap_or(0).max(0) + 1;
        let saved: Vec<ManuscriptChapter> = chapters
            .iter()
            .map(|chapter| {
                let mut chapter = chapter.clone();
                if chapter.id <= 0 {
                    chapter.id = next_id;
                    next_id += 1;
                }
                if chapter.created_at.is_empty() {
                    chapter.created_at = now_timestamp();
                }
                chapter
            })
            .collect();
        save_json(&self.store, &keys::manuscript(workspace_id), &saved)?;
        Ok(saved)
    }

    fn replace_scenes(&self, scenes: &[BackendScene], workspace_id: &str) -> Result<()> {
        let key = keys::scenes(workspace_id);
        let mut stored: Vec<BackendScene> = self.load_list(&key)?;
        stored.retain(|existing| !scenes.iter().any(|s| s.chapter_id == existing.chapter_id));
        stored.extend(scenes.iter().cloned());
        save_json(&self.store, &key, &stored)
    }

    fn remove_scenes(&self, chapter_id: i64, workspace_id: &str) -> Result<()> {
        let key = keys::scenes(workspace_id);
        let mut stored: Vec<BackendScene> = self.load_list(&key)?;
        stored.retain(|s| s.chapter_id != chapter_id);
        save_json(&self.store, &key, &stored)
    }

    fn upsert_character(&self, character: &CharacterProfile, workspace_id: &str) -> Result<CharacterProfile> {
        let key = keys::characters(workspace_id);
        let mut stored: Vec<CharacterProfile> = self.load_list(&key)?;
        let now = now_timestamp();
        let mut saved = character.clone();
        saved.updated_at = now.clone();

        match saved.id.and_then(|id| stored.iter().position(|c| c.id == Some(id))) {
            Some(position) => {
                saved.created_at = stored[position].created_at.clone();
                stored[position] = saved.clone();
            }
            None => {
                saved.id = Some(stored.iter().filter_map(|c| c.id).max().unwrap_or(0) + 1);
                saved.created_at = now;
                stored.push(saved.clone());
            }
        }
        save_json(&self.store, &key, &stored)?;
        Ok(saved)
    }

    fn upsert_world_fact(&self, fact: &WorldFact, workspace_id: &str) -> Result<WorldFact> {
        let key = keys::world_facts(workspace_id);
        let mut stored: Vec<WorldFact> = self.load_list(&key)?;
        let now = now_timestamp();
        let mut saved = fact.clone();
        saved.updated_at = now.clone();

        match saved.id.and_then(|id| stored.iter().position(|f| f.id == Some(id))) {
            Some(position) => {
                saved.created_at = stored[position].created_at.clone();
                stored[position] = saved.clone();
            }
            None => {
                saved.id = Some(stored.iter().filter_map(|f| f.id).max().unwrap_or(0) + 1);
                saved.created_at = now;
                stored.push(saved.clone());
            }
        }
        save_json(&self.store, &key, &stored)?;
        Ok(saved)
    }

    fn remove_by_id<T, F>(&self, key: &str, id: i64, id_of: F) -> Result<()>
    where
        T: Serialize + serde::de::DeserializeOwned,
        F: Fn(&T) -> Option<i64>,
    {
        let mut stored: Vec<T> = self.load_list(key)?;
        stored.retain(|item| id_of(item) != Some(id));
        save_json(&self.store, key, &stored)
    }
}

impl<S: KeyValueStore> StorageBackend for LocalBackend<S> {
    fn name(&self) -> &str {
        "local"
    }

    fn list_projects(&self) -> BoxFuture<'_, Result<Vec<Project>>> {
        Box::pin(async move { self.projects() })
    }

    fn create_project<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<Project>> {
        Box::pin(async move { self.add_project(name) })
    }

    fn load_manuscript<'a>(
        &'a self,
        workspace_id: &'a str,
    ) -> BoxFuture<'a, Result<Vec<ManuscriptChapter>>> {
        Box::pin(async move { self.load_list(&keys::manuscript(workspace_id)) })
    }

    fn save_manuscript<'a>(
        &'a self,
        chapters: &'a [ManuscriptChapter],
        workspace_id: &'a str,
    ) -> BoxFuture<'a, Result<Vec<ManuscriptChapter>>> {
        Box::pin(async move { self.replace_manuscript(chapters, workspace_id) })
    }

    fn load_scenes<'a>(&'a self, workspace_id: &'a str) -> BoxFuture<'a, Result<Vec<Value>>> {
        Box::pin(async move { self.load_list(&keys::scenes(workspace_id)) })
    }

    fn save_scenes<'a>(
        &'a self,
        scenes: &'a [BackendScene],
        workspace_id: &'a str,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move { self.replace_scenes(scenes, workspace_id) })
    }

    fn delete_scenes<'a>(
        &'a self,
        chapter_id: i64,
        workspace_id: &'a str,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move { self.remove_scenes(chapter_id, workspace_id) })
    }

    fn list_characters<'a>(
        &'a self,
        workspace_id: &'a str,
    ) -> BoxFuture<'a, Result<Vec<CharacterProfile>>> {
        Box::pin(async move { self.load_list(&keys::characters(workspace_id)) })
    }

    fn save_character<'a>(
        &'a self,
        character: &'a CharacterProfile,
        workspace_id: &'a str,
    ) -> BoxFuture<'a, Result<CharacterProfile>> {
        Box::pin(async move { self.upsert_character(character, workspace_id) })
    }

    fn delete_character<'a>(&'a self, id: i64, workspace_id: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.remove_by_id::<CharacterProfile, _>(&keys::characters(workspace_id), id, |c| c.id)
        })
    }

    fn list_world_facts<'a>(
        &'a self,
        workspace_id: &'a str,
    ) -> BoxFuture<'a, Result<Vec<WorldFact>>> {
        Box::pin(async move { self.load_list(&keys::world_facts(workspace_id)) })
    }

    fn save_world_fact<'a>(
        &'a self,
        fact: &'a WorldFact,
        workspace_id: &'a str,
    ) -> BoxFuture<'a, Result<WorldFact>> {
        Box::pin(async move { self.upsert_world_fact(fact, workspace_id) })
    }

    fn delete_world_fact<'a>(&'a self, id: i64, workspace_id: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.remove_by_id::<WorldFact, _>(&keys::world_facts(workspace_id), id, |f| f.id)
        })
    }
}
