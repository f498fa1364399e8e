//! Shared utilities for CLI commands

use std::future::Future;
use std::io::{self, Write};

use storyloom_core::backend::{LocalBackend, StorageBackend};
use storyloom_core::config::Config;
use storyloom_core::error::Result;
use storyloom_core::reconciler::{SceneStoreReconciler, fetch_remote};
use storyloom_core::storage::FileKeyValueStore;
use storyloom_core::store::SceneStore;

use crate::cli::http_backend::HttpBackend;

/// Pick the backend for `config`.
///
/// Without a backend URL everything is served from the local cache
/// directory for the rest of the session.
pub fn select_backend(config: &Config, cache: &FileKeyValueStore) -> Box<dyn StorageBackend> {
    match config.backend_url.as_deref() {
        Some(url) if config.has_backend() => Box::new(HttpBackend::new(url)),
        _ => {
            log::debug!("[Cli] No backend configured, using local storage");
            Box::new(LocalBackend::new(cache.clone()))
        }
    }
}

/// Open the reconciler for the configured project.
///
/// Remote writes are always enabled: without a backend URL the session's
/// backend is a [`LocalBackend`] over the same cache directory, and it must
/// see every edit or the next pull would restore its stale scenes.
pub fn open_reconciler(config: &Config, cache: FileKeyValueStore) -> SceneStoreReconciler<FileKeyValueStore> {
    SceneStoreReconciler::open(cache, config.project_id.clone(), true, config.save_delay())
}

/// Everything a store command needs: config, runtime, backend and the
/// reconciler for the active project.
pub struct Session {
    pub config: Config,
    runtime: tokio::runtime::Runtime,
    pub backend: Box<dyn StorageBackend>,
    pub reconciler: SceneStoreReconciler<FileKeyValueStore>,
}

impl Session {
    /// Open a session on the configured (or overridden) project.
    pub fn open(project_override: Option<String>) -> Result<Self> {
        let mut config = Config::load()?;
        if let Some(project) = project_override {
            config.project_id = project;
        }

        let cache = FileKeyValueStore::new(config.cache_dir()?);
        let backend = select_backend(&config, &cache);
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let reconciler = open_reconciler(&config, cache);

        let mut session = Self {
            config,
            runtime,
            backend,
            reconciler,
        };
        if session.reconciler.consume_seed()? {
            println!("✓ Applied staged scenes");
            session.save()?;
        }
        Ok(session)
    }

    /// The active project id.
    pub fn project_id(&self) -> &str {
        self.reconciler.project_id()
    }

    /// The current store.
    pub fn store(&self) -> &SceneStore {
        self.reconciler.store()
    }

    /// Run a backend future to completion.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Merge the backend's chapters and scenes into the store.
    pub fn pull(&mut self) -> Result<()> {
        let ticket = self.reconciler.begin_fetch();
        let snapshot = self
            .runtime
            .block_on(fetch_remote(self.backend.as_ref(), self.reconciler.project_id()))?;
        self.reconciler.apply_snapshot(ticket, &snapshot);
        Ok(())
    }

    /// Write pending scene edits to the backend now.
    ///
    /// A one-shot process cannot wait out the debounce delay, so commands
    /// flush before exiting. Returns the number of scenes written.
    pub fn save(&mut self) -> Result<usize> {
        self.runtime
            .block_on(self.reconciler.flush(self.backend.as_ref()))
    }
}

/// Ask a yes/no question on stdin. Defaults to no.
pub fn prompt_confirm(message: &str) -> bool {
    print!("{} [y/N] ", message);
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Shorten text for one-line listings.
pub fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let cut: String = flat.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", cut.trim_end())
}
