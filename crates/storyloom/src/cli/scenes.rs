//! Scene command handlers

use serde_json::{Map, Value};

use storyloom_core::scene::SceneType;
use storyloom_core::store::ScenePatch;

use crate::cli::args::SceneCommands;
use crate::cli::chapters::report_saved_scenes;
use crate::cli::util::{Session, preview};

/// Handle all scene subcommands
pub fn handle_scene_command(session: &mut Session, command: SceneCommands) -> bool {
    match command {
        SceneCommands::List { chapter } => handle_list(session, chapter),

        SceneCommands::Add {
            chapter,
            title,
            scene_type,
            text,
        } => {
            let chapter = resolve_chapter(session, chapter);
            let input = scene_input(title, scene_type, text);
            match session.reconciler.mutate(|store| store.add_scene(&chapter, Some(input.into()))) {
                Ok(scene_id) => {
                    println!("✓ Added scene {} to chapter {}", scene_id, chapter);
                    report_saved_scenes(session)
                }
                Err(e) => {
                    eprintln!("✗ {}", e);
                    false
                }
            }
        }

        SceneCommands::Remove { scene, chapter } => {
            let chapter = resolve_chapter(session, chapter);
            match session.reconciler.mutate(|store| store.remove_scene(&chapter, &scene)) {
                Ok(()) => {
                    println!("✓ Removed scene {}", scene);
                    report_saved_scenes(session)
                }
                Err(e) => {
                    eprintln!("✗ {}", e);
                    false
                }
            }
        }

        SceneCommands::Move { from, to, chapter } => {
            let chapter = resolve_chapter(session, chapter);
            let (Some(from_index), Some(to_index)) = (from.checked_sub(1), to.checked_sub(1)) else {
                eprintln!("✗ Positions start at 1");
                return false;
            };
            match session
                .reconciler
                .mutate(|store| store.move_scene(&chapter, from_index, to_index))
            {
                Ok(()) => {
                    println!("✓ Moved scene {} to position {}", from, to);
                    report_saved_scenes(session)
                }
                Err(e) => {
                    eprintln!("✗ {}", e);
                    false
                }
            }
        }

        SceneCommands::Rename {
            scene,
            title,
            chapter,
        } => {
            let chapter = resolve_chapter(session, chapter);
            let patch = ScenePatch {
                title: Some(title),
                ..Default::default()
            };
            match session
                .reconciler
                .mutate(|store| store.update_scene(&chapter, &scene, patch))
            {
                Ok(()) => {
                    let title = session
                        .store()
                        .chapter(&chapter)
                        .and_then(|c| c.scene(&scene))
                        .map(|s| s.title.clone())
                        .unwrap_or_default();
                    println!("✓ Renamed scene {} to '{}'", scene, title);
                    report_saved_scenes(session)
                }
                Err(e) => {
                    eprintln!("✗ {}", e);
                    false
                }
            }
        }

        SceneCommands::Select { chapter, scene } => {
            let result = session.reconciler.mutate(|store| {
                store.select_chapter(&chapter)?;
                if let Some(scene) = &scene {
                    store.select_scene(scene)?;
                }
                Ok(())
            });
            match result {
                Ok(()) => {
                    let store = session.store();
                    println!(
                        "✓ Selected chapter {}, scene {}",
                        store.current_chapter_id,
                        store.current_scene_id.as_deref().unwrap_or("-")
                    );
                    true
                }
                Err(e) => {
                    eprintln!("✗ {}", e);
                    false
                }
            }
        }
    }
}

fn resolve_chapter(session: &Session, chapter: Option<String>) -> String {
    chapter.unwrap_or_else(|| session.store().current_chapter_id.clone())
}

/// Build an untrusted scene record from command-line fields.
fn scene_input(title: Option<String>, scene_type: Option<String>, text: Option<String>) -> Value {
    let mut record = Map::new();
    if let Some(title) = title {
        record.insert("title".into(), Value::String(title));
    }
    if let Some(scene_type) = scene_type {
        let resolved = SceneType::resolve(&scene_type);
        if resolved.as_str() != scene_type.trim().to_lowercase() {
            log::info!("[Cli] Scene type '{}' read as '{}'", scene_type, resolved);
        }
        record.insert("type".into(), Value::String(resolved.as_str().into()));
    }
    if let Some(text) = text {
        record.insert("text".into(), Value::String(text));
    }
    Value::Object(record)
}

fn handle_list(session: &Session, chapter: Option<String>) -> bool {
    let chapter_id = resolve_chapter(session, chapter);
    let store = session.store();
    let Some(chapter) = store.chapter(&chapter_id) else {
        eprintln!("✗ Chapter '{}' not found", chapter_id);
        return false;
    };

    println!("{} ({})", chapter.chapter_title, chapter_id);
    if !chapter.outline.is_empty() {
        println!("  {}", preview(&chapter.outline, 72));
    }
    for scene in &chapter.scenes {
        let marker = if store.current_scene_id.as_deref() == Some(scene.id.as_str()) {
            "*"
        } else {
            " "
        };
        println!(
            "{} {:>2}. {:<32} [{}] {}",
            marker,
            scene.ordering + 1,
            scene.title,
            scene.scene_type,
            scene.id
        );
        if !scene.text.is_empty() {
            println!("       {}", preview(&scene.text, 60));
        }
    }
    true
}
