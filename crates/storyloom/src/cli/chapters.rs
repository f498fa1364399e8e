//! Manuscript chapter command handlers

use storyloom_core::manuscript::{ManuscriptChapter, delete_manuscript_chapter};
use storyloom_core::merge::{merge_chapters_from_list, rekey_saved_chapters};
use storyloom_core::store::STANDALONE_CHAPTER_ID;

use crate::cli::args::ChapterCommands;
use crate::cli::util::{Session, prompt_confirm};

/// Handle all chapter subcommands
pub fn handle_chapter_command(session: &mut Session, command: ChapterCommands) -> bool {
    match command {
        ChapterCommands::List => handle_list(session),
        ChapterCommands::Add { title, outline } => handle_add(session, &title, outline),
        ChapterCommands::Remove { id, yes } => handle_remove(session, id, yes),
    }
}

fn handle_list(session: &mut Session) -> bool {
    if let Err(e) = session.pull() {
        eprintln!("✗ Could not reach backend, showing cached chapters: {}", e);
    }

    let store = session.store();
    for (id, chapter) in &store.chapters {
        let marker = if *id == store.current_chapter_id { "*" } else { " " };
        let label = if id == STANDALONE_CHAPTER_ID { "-" } else { id.as_str() };
        println!(
            "{} {:>6}  {}  ({} scenes)",
            marker,
            label,
            chapter.chapter_title,
            chapter.scenes.len()
        );
    }
    true
}

/// Save `chapters` as the manuscript and bring the scene store in line.
fn save_manuscript(session: &mut Session, chapters: Vec<ManuscriptChapter>) -> Option<Vec<ManuscriptChapter>> {
    let project = session.project_id().to_string();
    let saved = match session.block_on(session.backend.save_manuscript(&chapters, &project)) {
        Ok(saved) => saved,
        Err(e) => {
            eprintln!("✗ Could not save manuscript: {}", e);
            return None;
        }
    };

    let result = session.reconciler.mutate(|store| {
        *store = merge_chapters_from_list(&rekey_saved_chapters(store, &chapters, &saved), &saved);
        Ok(())
    });
    if let Err(e) = result {
        eprintln!("✗ Could not update scenes: {}", e);
        return None;
    }
    Some(saved)
}

fn load_manuscript(session: &Session) -> Option<Vec<ManuscriptChapter>> {
    match session.block_on(session.backend.load_manuscript(session.project_id())) {
        Ok(chapters) => Some(chapters),
        Err(e) => {
            eprintln!("✗ Could not load manuscript: {}", e);
            None
        }
    }
}

fn handle_add(session: &mut Session, title: &str, outline: Option<String>) -> bool {
    let Some(mut chapters) = load_manuscript(session) else {
        return false;
    };

    let mut chapter = ManuscriptChapter::new(0, title.trim());
    chapter.outline = outline.unwrap_or_default();
    chapters.push(chapter);

    let Some(saved) = save_manuscript(session, chapters) else {
        return false;
    };
    if let Some(added) = saved.last() {
        println!("✓ Added chapter {} '{}'", added.id, added.title);
    }
    report_saved_scenes(session)
}

fn handle_remove(session: &mut Session, id: i64, yes: bool) -> bool {
    let Some(chapters) = load_manuscript(session) else {
        return false;
    };
    let Some(chapter) = chapters.iter().find(|c| c.id == id) else {
        eprintln!("✗ No manuscript chapter with id {}", id);
        return false;
    };

    let scene_count = session
        .store()
        .chapter(&chapter.store_key())
        .map_or(0, |c| c.scenes.len());
    if !yes
        && !prompt_confirm(&format!(
            "Delete chapter '{}' and its {} scenes?",
            chapter.title, scene_count
        ))
    {
        println!("Cancelled.");
        return true;
    }

    let remaining = delete_manuscript_chapter(&chapters, id);
    let project = session.project_id().to_string();
    let saved = match session.block_on(session.backend.save_manuscript(&remaining, &project)) {
        Ok(saved) => saved,
        Err(e) => {
            eprintln!("✗ Could not save manuscript: {}", e);
            return false;
        }
    };
    if let Err(e) = session.block_on(session.backend.delete_scenes(id, &project)) {
        eprintln!("✗ Could not delete scenes of chapter {}: {}", id, e);
        return false;
    }

    let result = session.reconciler.delete_manuscript_chapter(id, &remaining).and_then(|()| {
        session.reconciler.mutate(|store| {
            *store = merge_chapters_from_list(&rekey_saved_chapters(store, &remaining, &saved), &saved);
            Ok(())
        })
    });
    if let Err(e) = result {
        eprintln!("✗ Could not update scenes: {}", e);
        return false;
    }

    println!("✓ Removed chapter {} and {} scenes", id, scene_count);
    report_saved_scenes(session)
}

/// Flush pending scene writes and report the outcome.
pub fn report_saved_scenes(session: &mut Session) -> bool {
    match session.save() {
        Ok(0) => true,
        Ok(count) => {
            println!("  Saved {} scenes to backend", count);
            true
        }
        Err(e) => {
            eprintln!("✗ Scenes saved locally only: {}", e);
            false
        }
    }
}
