//! Sync command handlers.
//!
//! `pull` merges the backend's chapter list and scenes into the local store,
//! `push` writes every saved chapter's scenes back. Standalone scenes and
//! chapters not yet saved to the manuscript stay local.

use storyloom_core::merge::{flatten_for_backend, remote_chapter_id};
use storyloom_core::reconciler::push_scenes;

use crate::cli::args::SyncCommands;
use crate::cli::util::Session;

/// Handle sync subcommands.
pub fn handle_sync_command(session: &mut Session, command: SyncCommands) -> bool {
    match command {
        SyncCommands::Pull => handle_pull(session),
        SyncCommands::Push => handle_push(session),
        SyncCommands::Status => {
            handle_status(session);
            true
        }
    }
}

fn handle_pull(session: &mut Session) -> bool {
    println!("Pulling from {} backend...", session.backend.name());
    match session.pull() {
        Ok(()) => {
            let store = session.store();
            println!(
                "✓ {} chapters, {} scenes",
                store.chapters.len(),
                store.scene_count()
            );
            true
        }
        Err(e) => {
            eprintln!("✗ Pull failed, local scenes unchanged: {}", e);
            false
        }
    }
}

fn handle_push(session: &mut Session) -> bool {
    // Anything pending is covered by the full push below
    session.reconciler.take_pending_write();

    let payload = flatten_for_backend(session.store());
    if payload.is_empty() {
        println!("No saved chapters to push.");
        return true;
    }

    println!("Pushing to {} backend...", session.backend.name());
    let project = session.project_id().to_string();
    match session.block_on(push_scenes(session.backend.as_ref(), &project, &payload)) {
        Ok(()) => {
            println!("✓ Pushed {} scenes", payload.len());
            true
        }
        Err(e) => {
            eprintln!("✗ Push failed: {}", e);
            false
        }
    }
}

fn handle_status(session: &Session) {
    println!("Sync Status");
    println!("===========");
    match &session.config.backend_url {
        Some(url) if session.config.has_backend() => println!("Backend: {}", url),
        _ => println!("Backend: none (local storage only)"),
    }
    println!("Project: {}", session.project_id());
    if let Ok(dir) = session.config.cache_dir() {
        println!("Cache: {}", dir.display());
    }

    let store = session.store();
    let saved = store
        .chapters
        .keys()
        .filter(|k| remote_chapter_id(k).is_some())
        .count();
    println!(
        "Chapters: {} ({} saved to the manuscript)",
        store.chapters.len(),
        saved
    );
    println!("Scenes: {}", store.scene_count());
    println!("Synced scenes: {}", flatten_for_backend(store).len());
}
