//! Scene store reconciler.
//!
//! [`SceneStoreReconciler`] owns the in-memory [`SceneStore`] of one project
//! and keeps it in step with the local cache and the remote backend:
//!
//! ```text
//! mutate() ──► store ──► cache write (always)
//!                  └───► debounced remote write (unless suppressed)
//!
//! open / switch_project ──► cached store (suppressed)
//! fetch_remote() ──► apply_snapshot(ticket) ──► merge (suppressed)
//! ```
//!
//! # Suppression
//!
//! Applying cached or remote data must not be echoed back to the backend.
//! Before such an apply the reconciler calls [`suppress_next`], moving the
//! [`SyncGuard`] from `Idle` to `Suppressed`; the next store change consumes
//! it and returns the guard to `Idle`. It is a one-shot, not a mode.
//!
//! # Fetch generations
//!
//! Remote fetches run without borrowing the reconciler, so edits can keep
//! landing while a request is in flight. Each fetch takes a
//! [`FetchTicket`]; starting a newer fetch, switching project or tearing
//! down invalidates older tickets and their results are dropped.
//!
//! [`suppress_next`]: SceneStoreReconciler::suppress_next

use std::time::{Duration, Instant};

use indexmap::IndexMap;

use crate::backend::StorageBackend;
use crate::error::Result;
use crate::manuscript::ManuscriptChapter;
use crate::merge::{
    BackendScene, BackendSceneGroup, flatten_for_backend, group_backend_scenes,
    merge_chapters_from_list, merge_scenes_from_backend, partition_by_chapter,
};
use crate::scheduler::Debouncer;
use crate::seed::{SceneSeed, apply_seed};
use crate::storage::{KeyValueStore, keys, load_json, save_json};
use crate::store::{SceneStore, load_store_from_json};

/// Whether the next store change should be propagated to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncGuard {
    /// Store changes are user edits and are written remotely
    #[default]
    Idle,
    /// The next store change applies loaded data and is not written remotely
    Suppressed,
}

/// Identifies one remote fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
}

/// Everything fetched from the backend in one load.
#[derive(Debug, Clone, Default)]
pub struct RemoteSnapshot {
    /// Manuscript chapters, or `None` if only scenes were fetched
    pub chapters: Option<Vec<ManuscriptChapter>>,
    /// Scene groups keyed by chapter id
    pub scene_groups: IndexMap<String, BackendSceneGroup>,
}

/// Fetch manuscript chapters and scenes for `project_id`.
///
/// Any request failure aborts the whole fetch so nothing partial is merged.
pub async fn fetch_remote(backend: &dyn StorageBackend, project_id: &str) -> Result<RemoteSnapshot> {
    let chapters = backend.load_manuscript(project_id).await?;
    let records = backend.load_scenes(project_id).await?;
    log::debug!(
        "[Reconciler] Fetched {} chapters and {} scenes from {} backend",
        chapters.len(),
        records.len(),
        backend.name()
    );
    Ok(RemoteSnapshot {
        chapters: Some(chapters),
        scene_groups: group_backend_scenes(&records),
    })
}

/// Write a flattened scene payload to the backend, one batch per chapter.
///
/// Stops at the first failing batch; batches already written stay written.
pub async fn push_scenes(
    backend: &dyn StorageBackend,
    project_id: &str,
    payload: &[BackendScene],
) -> Result<()> {
    for (chapter_id, batch) in partition_by_chapter(payload) {
        backend.save_scenes(&batch, project_id).await?;
        log::debug!(
            "[Reconciler] Saved {} scenes of chapter {} to {} backend",
            batch.len(),
            chapter_id,
            backend.name()
        );
    }
    log::info!(
        "[Reconciler] Saved {} scenes to {} backend",
        payload.len(),
        backend.name()
    );
    Ok(())
}

/// Stage a seed for the scene builder of `project_id`.
pub fn stage_seed(cache: &dyn KeyValueStore, project_id: &str, seed: &SceneSeed) -> Result<()> {
    save_json(cache, &keys::scene_seed(project_id), seed)
}

/// Keeps one project's scene store consistent across memory, cache and backend.
pub struct SceneStoreReconciler<S: KeyValueStore> {
    cache: S,
    project_id: String,
    store: SceneStore,
    remote_enabled: bool,
    guard: SyncGuard,
    debouncer: Debouncer<Vec<BackendScene>>,
    generation: u64,
    torn_down: bool,
}

impl<S: KeyValueStore> SceneStoreReconciler<S> {
    /// Open the reconciler for a project, loading its cached store.
    ///
    /// `remote_enabled` is false when the host has no write target at all;
    /// the store is then only ever written to the cache.
    pub fn open(cache: S, project_id: impl Into<String>, remote_enabled: bool, delay: Duration) -> Self {
        let mut reconciler = Self {
            cache,
            project_id: project_id.into(),
            store: SceneStore::default(),
            remote_enabled,
            guard: SyncGuard::Idle,
            debouncer: Debouncer::new(delay),
            generation: 0,
            torn_down: false,
        };
        reconciler.load_cached();
        reconciler
    }

    /// The current store.
    pub fn store(&self) -> &SceneStore {
        &self.store
    }

    /// The project this reconciler serves.
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// The cache port.
    pub fn cache(&self) -> &S {
        &self.cache
    }

    /// Current suppression state.
    pub fn guard(&self) -> SyncGuard {
        self.guard
    }

    /// Whether a remote write is waiting for its delay.
    pub fn has_pending_write(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// When the pending remote write becomes due.
    pub fn pending_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Suppress remote propagation of the next store change.
    pub fn suppress_next(&mut self) {
        self.guard = SyncGuard::Suppressed;
    }

    fn load_cached(&mut self) {
        let key = keys::scene_store(&self.project_id);
        let store = match self.cache.get(&key) {
            Ok(Some(json)) => load_store_from_json(&json),
            Ok(None) => SceneStore::default(),
            Err(e) => {
                log::warn!("[Reconciler] Could not read cached store '{}': {}", key, e);
                SceneStore::default()
            }
        };
        log::debug!(
            "[Reconciler] Loaded store for project {} ({} chapters)",
            self.project_id,
            store.chapters.len()
        );
        self.suppress_next();
        self.set_store(store, Instant::now());
    }

    fn set_store(&mut self, store: SceneStore, now: Instant) {
        self.store = store;
        self.on_store_changed(now);
    }

    /// Store change effect: persist to the cache, then schedule the remote
    /// write unless this change was suppressed.
    fn on_store_changed(&mut self, now: Instant) {
        let key = keys::scene_store(&self.project_id);
        if let Err(e) = save_json(&self.cache, &key, &self.store) {
            log::warn!("[Reconciler] Failed to cache store '{}': {}", key, e);
        }

        if self.guard == SyncGuard::Suppressed {
            self.guard = SyncGuard::Idle;
            // A write still pending must carry the merged store, not the
            // pre-merge edit it was scheduled for.
            if self.debouncer.replace_payload(flatten_for_backend(&self.store)) {
                log::debug!("[Reconciler] Refreshed pending write after applying loaded data");
            } else {
                log::debug!("[Reconciler] Store change applied loaded data, not scheduling a write");
            }
            return;
        }

        if self.remote_enabled && !self.torn_down {
            let payload = flatten_for_backend(&self.store);
            if self.debouncer.schedule(payload, now) {
                log::debug!("[Reconciler] Rescheduled pending remote write");
            }
        }
    }

    /// Apply a user edit to the store.
    ///
    /// `edit` runs against a copy; if it fails the store is left unchanged
    /// and nothing is persisted.
    pub fn mutate<T, F>(&mut self, edit: F) -> Result<T>
    where
        F: FnOnce(&mut SceneStore) -> Result<T>,
    {
        self.mutate_at(Instant::now(), edit)
    }

    /// [`mutate`](Self::mutate) with an explicit clock reading.
    pub fn mutate_at<T, F>(&mut self, now: Instant, edit: F) -> Result<T>
    where
        F: FnOnce(&mut SceneStore) -> Result<T>,
    {
        let mut next = self.store.clone();
        let value = edit(&mut next)?;
        self.set_store(next, now);
        Ok(value)
    }

    /// Start a remote fetch, invalidating any earlier one.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        FetchTicket {
            generation: self.generation,
        }
    }

    /// Whether results for `ticket` may still be applied.
    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        !self.torn_down && ticket.generation == self.generation
    }

    fn accept(&self, ticket: FetchTicket, what: &str) -> bool {
        let current = self.is_current(ticket);
        if !current {
            log::debug!(
                "[Reconciler] Dropping stale {} (fetch {} superseded by {})",
                what,
                ticket.generation,
                self.generation
            );
        }
        current
    }

    /// Merge backend scene groups fetched under `ticket`.
    ///
    /// Returns `false` if the ticket is stale and nothing was applied.
    pub fn apply_backend_scenes(
        &mut self,
        ticket: FetchTicket,
        groups: &IndexMap<String, BackendSceneGroup>,
    ) -> bool {
        if !self.accept(ticket, "scenes") {
            return false;
        }
        let merged = merge_scenes_from_backend(&self.store, groups);
        self.suppress_next();
        self.set_store(merged, Instant::now());
        true
    }

    /// Merge the manuscript chapter list fetched under `ticket`.
    ///
    /// Returns `false` if the ticket is stale and nothing was applied.
    pub fn apply_backend_chapters(&mut self, ticket: FetchTicket, chapters: &[ManuscriptChapter]) -> bool {
        if !self.accept(ticket, "chapters") {
            return false;
        }
        let merged = merge_chapters_from_list(&self.store, chapters);
        self.suppress_next();
        self.set_store(merged, Instant::now());
        true
    }

    /// Merge a full snapshot fetched under `ticket` as a single store change.
    ///
    /// When the snapshot carries a chapter list, scene groups for chapters
    /// not in that list are ignored so a deleted chapter is not revived.
    pub fn apply_snapshot(&mut self, ticket: FetchTicket, snapshot: &RemoteSnapshot) -> bool {
        if !self.accept(ticket, "snapshot") {
            return false;
        }

        let mut merged = self.store.clone();
        let mut groups = snapshot.scene_groups.clone();
        if let Some(chapters) = &snapshot.chapters {
            merged = merge_chapters_from_list(&merged, chapters);
            groups.retain(|chapter_id, _| merged.chapters.contains_key(chapter_id));
        }
        merged = merge_scenes_from_backend(&merged, &groups);

        self.suppress_next();
        self.set_store(merged, Instant::now());
        true
    }

    /// Take the pending remote write if its delay has elapsed.
    pub fn take_due_write(&mut self, now: Instant) -> Option<Vec<BackendScene>> {
        if self.torn_down {
            return None;
        }
        self.debouncer.take_due(now)
    }

    /// Take the pending remote write immediately.
    pub fn take_pending_write(&mut self) -> Option<Vec<BackendScene>> {
        if self.torn_down {
            return None;
        }
        self.debouncer.take_now()
    }

    /// Push the pending remote write now, without waiting for its delay.
    ///
    /// Returns the number of scenes written. If the backend fails the
    /// payload is scheduled again, unless a newer edit already replaced it.
    pub async fn flush(&mut self, backend: &dyn StorageBackend) -> Result<usize> {
        let Some(payload) = self.take_pending_write() else {
            return Ok(0);
        };
        match push_scenes(backend, &self.project_id, &payload).await {
            Ok(()) => Ok(payload.len()),
            Err(e) => {
                log::warn!("[Reconciler] Remote write failed, rescheduling: {}", e);
                if !self.debouncer.is_pending() {
                    self.debouncer.schedule(payload, Instant::now());
                }
                Err(e)
            }
        }
    }

    /// Switch to another project.
    ///
    /// The pending write is dropped, in-flight fetches are invalidated and
    /// the other project's cached store is loaded.
    pub fn switch_project(&mut self, project_id: impl Into<String>) {
        let project_id = project_id.into();
        if self.debouncer.cancel().is_some() {
            log::debug!(
                "[Reconciler] Dropped pending write for project {} on switch",
                self.project_id
            );
        }
        self.generation += 1;
        self.project_id = project_id;
        self.load_cached();
    }

    /// Stage a seed for this project, consumed by [`consume_seed`](Self::consume_seed).
    pub fn stage_seed(&self, seed: &SceneSeed) -> Result<()> {
        stage_seed(&self.cache, &self.project_id, seed)
    }

    /// Consume the staged seed for this project, if any.
    ///
    /// The seed is removed from the cache before it is applied, so it is
    /// applied at most once. Returns whether a seed was applied.
    pub fn consume_seed(&mut self) -> Result<bool> {
        let key = keys::scene_seed(&self.project_id);
        let Some(seed) = load_json::<SceneSeed>(&self.cache, &key)? else {
            self.cache.remove(&key)?;
            return Ok(false);
        };
        self.cache.remove(&key)?;
        log::info!(
            "[Reconciler] Applying seed with {} scenes to chapter {}",
            seed.scenes.len(),
            seed.chapter_id
        );
        let seeded = apply_seed(&self.store, &seed);
        self.set_store(seeded, Instant::now());
        Ok(true)
    }

    /// Discard the staged seed if it targets `chapter_id`.
    pub fn discard_seed_for_chapter(&mut self, chapter_id: &str) -> Result<bool> {
        let key = keys::scene_seed(&self.project_id);
        match load_json::<SceneSeed>(&self.cache, &key)? {
            Some(seed) if seed.chapter_id == chapter_id => {
                self.cache.remove(&key)?;
                log::debug!("[Reconciler] Discarded seed for deleted chapter {}", chapter_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Cascade the deletion of manuscript chapter `chapter_id`.
    ///
    /// `remaining` is the manuscript chapter list after the deletion. The
    /// chapter's scene bucket is pruned and a seed targeting it discarded.
    pub fn delete_manuscript_chapter(&mut self, chapter_id: i64, remaining: &[ManuscriptChapter]) -> Result<()> {
        self.discard_seed_for_chapter(&chapter_id.to_string())?;
        let pruned = merge_chapters_from_list(&self.store, remaining);
        self.set_store(pruned, Instant::now());
        Ok(())
    }

    /// Stop all remote activity: drop the pending write and invalidate fetches.
    pub fn teardown(&mut self) {
        self.debouncer.cancel();
        self.generation += 1;
        self.torn_down = true;
        log::debug!("[Reconciler] Torn down for project {}", self.project_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::DEFAULT_SAVE_DELAY;
    use crate::storage::MemoryKeyValueStore;
    use crate::store::{STANDALONE_CHAPTER_ID, create_default_store};
    use serde_json::json;

    const DELAY: Duration = Duration::from_millis(500);

    fn open(cache: MemoryKeyValueStore) -> SceneStoreReconciler<MemoryKeyValueStore> {
        SceneStoreReconciler::open(cache, "novel", true, DELAY)
    }

    fn store_with_chapter(id: &str, title: &str) -> SceneStore {
        let mut store = create_default_store();
        store.upsert_chapter(id, title, "");
        store
    }

    #[test]
    fn test_open_loads_cache_without_scheduling() {
        let cached = store_with_chapter("7", "Harbor");
        let cache = MemoryKeyValueStore::new()
            .with_entry(&keys::scene_store("novel"), &cached.to_json().unwrap());

        let reconciler = open(cache);
        assert_eq!(reconciler.store(), &cached);
        assert_eq!(reconciler.guard(), SyncGuard::Idle);
        assert!(!reconciler.has_pending_write());
    }

    #[test]
    fn test_open_with_corrupt_cache_uses_default() {
        let cache = MemoryKeyValueStore::new().with_entry(&keys::scene_store("novel"), "not json");
        let reconciler = open(cache.clone());
        assert_eq!(reconciler.store().chapters.len(), 1);
        assert!(reconciler.store().chapter(STANDALONE_CHAPTER_ID).is_some());

        // The repaired store replaced the corrupt cache entry
        let repaired = cache.get(&keys::scene_store("novel")).unwrap().unwrap();
        assert!(serde_json::from_str::<serde_json::Value>(&repaired).is_ok());
    }

    #[test]
    fn test_mutation_writes_cache_and_debounces() {
        let cache = MemoryKeyValueStore::new();
        let mut reconciler = open(cache.clone());
        reconciler.mutate(|s| Ok(s.upsert_chapter("7", "Harbor", ""))).unwrap();

        let start = Instant::now();
        reconciler
            .mutate_at(start, |s| s.add_scene("7", None))
            .unwrap();
        reconciler
            .mutate_at(start + Duration::from_millis(300), |s| s.add_scene("7", None))
            .unwrap();

        let cached = load_store_from_json(&cache.get(&keys::scene_store("novel")).unwrap().unwrap());
        assert_eq!(&cached, reconciler.store());

        assert!(reconciler.take_due_write(start + DELAY).is_none());
        let payload = reconciler
            .take_due_write(start + Duration::from_millis(300) + DELAY)
            .expect("write due after the last edit");
        assert_eq!(payload.len(), 3);
        assert!(payload.iter().all(|s| s.chapter_id == 7));
        assert!(!reconciler.has_pending_write());
    }

    #[test]
    fn test_failed_mutation_changes_nothing() {
        let cache = MemoryKeyValueStore::new();
        let mut reconciler = open(cache);
        let before = reconciler.store().clone();
        let result = reconciler.mutate(|s| {
            s.upsert_chapter("7", "Harbor", "");
            s.add_scene("missing", None)
        });
        assert!(result.is_err());
        assert_eq!(reconciler.store(), &before);
        assert!(!reconciler.has_pending_write());
    }

    #[test]
    fn test_local_only_never_schedules() {
        let mut reconciler =
            SceneStoreReconciler::open(MemoryKeyValueStore::new(), "novel", false, DEFAULT_SAVE_DELAY);
        reconciler
            .mutate(|s| s.add_scene(STANDALONE_CHAPTER_ID, None))
            .unwrap();
        assert!(!reconciler.has_pending_write());
    }

    #[test]
    fn test_suppression_is_one_shot() {
        let mut reconciler = open(MemoryKeyValueStore::new());
        let ticket = reconciler.begin_fetch();
        assert!(reconciler.apply_backend_chapters(ticket, &[ManuscriptChapter::new(7, "Harbor")]));
        assert_eq!(reconciler.guard(), SyncGuard::Idle);
        assert!(!reconciler.has_pending_write());

        reconciler.mutate(|s| s.add_scene("7", None)).unwrap();
        assert!(reconciler.has_pending_write());
    }

    #[test]
    fn test_stale_fetch_is_dropped() {
        let mut reconciler = open(MemoryKeyValueStore::new());
        let old = reconciler.begin_fetch();
        let new = reconciler.begin_fetch();

        assert!(!reconciler.apply_backend_chapters(old, &[ManuscriptChapter::new(1, "Old")]));
        assert!(reconciler.store().chapter("1").is_none());

        assert!(reconciler.apply_backend_chapters(new, &[ManuscriptChapter::new(2, "New")]));
        assert!(reconciler.store().chapter("2").is_some());
    }

    #[test]
    fn test_snapshot_keeps_edits_made_during_fetch() {
        let mut reconciler = open(MemoryKeyValueStore::new());
        let ticket = reconciler.begin_fetch();

        // An edit lands while the fetch is in flight
        let local = reconciler
            .mutate(|s| s.add_scene(STANDALONE_CHAPTER_ID, Some(json!({"title": "Draft"}).into())))
            .unwrap();

        let snapshot = RemoteSnapshot {
            chapters: Some(vec![ManuscriptChapter::new(7, "Harbor")]),
            scene_groups: group_backend_scenes(&[
                json!({"chapterId": 7, "id": "r1", "title": "Dockside"}),
                json!({"chapterId": 99, "id": "ghost"}),
            ]),
        };
        assert!(reconciler.apply_snapshot(ticket, &snapshot));

        let store = reconciler.store();
        assert!(store.chapter(STANDALONE_CHAPTER_ID).unwrap().scene(&local).is_some());
        assert_eq!(store.chapter("7").unwrap().scenes[0].title, "Dockside");
        assert!(store.chapter("99").is_none());
        // The edit's pending write survives the suppressed merge
        assert!(reconciler.has_pending_write());
    }

    #[test]
    fn test_pending_write_follows_merged_store() {
        let mut reconciler = open(MemoryKeyValueStore::new());
        let start = Instant::now();
        reconciler
            .mutate_at(start, |s| {
                s.upsert_chapter("7", "Harbor", "");
                Ok(())
            })
            .unwrap();
        let scene = reconciler.store().chapter("7").unwrap().scenes[0].id.clone();
        reconciler
            .mutate_at(start, |s| {
                s.update_scene(
                    "7",
                    &scene,
                    crate::store::ScenePatch {
                        title: Some("Local".into()),
                        ..Default::default()
                    },
                )
            })
            .unwrap();
        let deadline = reconciler.pending_deadline();

        let ticket = reconciler.begin_fetch();
        let snapshot = RemoteSnapshot {
            chapters: Some(vec![ManuscriptChapter::new(7, "Harbor")]),
            scene_groups: group_backend_scenes(&[
                json!({"chapterId": 7, "id": scene.clone(), "title": "Remote"}),
            ]),
        };
        assert!(reconciler.apply_snapshot(ticket, &snapshot));
        assert_eq!(reconciler.store().chapter("7").unwrap().scenes[0].title, "Remote");
        assert_eq!(reconciler.pending_deadline(), deadline);

        let payload = reconciler.take_pending_write().unwrap();
        assert_eq!(payload, flatten_for_backend(reconciler.store()));
        assert_eq!(payload[0].scene.title, "Remote");
    }

    #[test]
    fn test_suppressed_change_without_pending_write_schedules_nothing() {
        let mut reconciler = open(MemoryKeyValueStore::new());
        let ticket = reconciler.begin_fetch();
        let snapshot = RemoteSnapshot {
            chapters: Some(vec![ManuscriptChapter::new(7, "Harbor")]),
            scene_groups: IndexMap::new(),
        };
        assert!(reconciler.apply_snapshot(ticket, &snapshot));
        assert!(!reconciler.has_pending_write());
    }

    #[test]
    fn test_switch_project_cancels_and_reloads() {
        let other = store_with_chapter("3", "Prologue");
        let cache = MemoryKeyValueStore::new()
            .with_entry(&keys::scene_store("sequel"), &other.to_json().unwrap());
        let mut reconciler = open(cache);
        reconciler.mutate(|s| s.add_scene(STANDALONE_CHAPTER_ID, None)).unwrap();
        let ticket = reconciler.begin_fetch();

        reconciler.switch_project("sequel");
        assert_eq!(reconciler.project_id(), "sequel");
        assert_eq!(reconciler.store(), &other);
        assert!(!reconciler.has_pending_write());
        assert!(!reconciler.is_current(ticket));
    }

    #[test]
    fn test_teardown_stops_writes() {
        let mut reconciler = open(MemoryKeyValueStore::new());
        reconciler.mutate(|s| s.add_scene(STANDALONE_CHAPTER_ID, None)).unwrap();
        let ticket = reconciler.begin_fetch();

        reconciler.teardown();
        assert!(!reconciler.has_pending_write());
        assert!(!reconciler.apply_backend_chapters(ticket, &[]));

        reconciler.mutate(|s| s.add_scene(STANDALONE_CHAPTER_ID, None)).unwrap();
        assert!(reconciler.take_pending_write().is_none());
    }

    #[test]
    fn test_seed_consumed_once() {
        let cache = MemoryKeyValueStore::new();
        stage_seed(&cache, "novel", &SceneSeed::new("5", vec![json!({"title": "Rooftops"})])).unwrap();

        let mut reconciler = open(cache.clone());
        assert!(reconciler.consume_seed().unwrap());
        assert_eq!(reconciler.store().current_chapter_id, "5");
        assert!(cache.get(&keys::scene_seed("novel")).unwrap().is_none());
        assert!(!reconciler.consume_seed().unwrap());
    }

    #[test]
    fn test_delete_chapter_cascades() {
        let cache = MemoryKeyValueStore::new();
        let mut reconciler = open(cache.clone());
        let ticket = reconciler.begin_fetch();
        let chapters = vec![ManuscriptChapter::new(7, "Harbor"), ManuscriptChapter::new(8, "Storm")];
        reconciler.apply_backend_chapters(ticket, &chapters);
        reconciler.stage_seed(&SceneSeed::new("8", vec![json!({})])).unwrap();

        let remaining = crate::manuscript::delete_manuscript_chapter(&chapters, 8);
        reconciler.delete_manuscript_chapter(8, &remaining).unwrap();

        assert!(reconciler.store().chapter("8").is_none());
        assert!(reconciler.store().chapter("7").is_some());
        assert!(cache.get(&keys::scene_seed("novel")).unwrap().is_none());
    }
}
