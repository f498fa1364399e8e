//! Command dispatch for the storyloom CLI.

/// Clap argument definitions
mod args;

/// Manuscript chapter commands
mod chapters;

/// Config command handlers
mod config;

/// HTTP storage backend
mod http_backend;

/// Project commands
mod projects;

/// Scene commands
mod scenes;

/// Sync commands (pull, push, status)
mod sync;

/// Shared CLI utilities
mod util;

use clap::Parser;
use std::path::PathBuf;

use storyloom_core::config::Config;

pub use args::Cli;
use args::Commands;
use util::Session;

/// Main entry point for the CLI
pub fn run_cli() {
    let cli = Cli::parse();

    // Execute commands and track success
    let success = match cli.command {
        Commands::Init { backend, cache_dir } => handle_init(backend, cache_dir, cli.project),

        Commands::Config { command } => config::handle_config_command(command),

        Commands::Projects { command } => {
            with_session(cli.project, |session| projects::handle_project_command(session, command))
        }

        Commands::Chapters { command } => {
            with_session(cli.project, |session| chapters::handle_chapter_command(session, command))
        }

        Commands::Scenes { command } => {
            with_session(cli.project, |session| scenes::handle_scene_command(session, command))
        }

        Commands::Sync { command } => {
            with_session(cli.project, |session| sync::handle_sync_command(session, command))
        }
    };

    if !success {
        std::process::exit(1);
    }
}

/// Open a session and run `handler` with it.
fn with_session<F>(project: Option<String>, handler: F) -> bool
where
    F: FnOnce(&mut Session) -> bool,
{
    match Session::open(project) {
        Ok(mut session) => handler(&mut session),
        Err(e) => {
            eprintln!("✗ Could not open project: {}", e);
            false
        }
    }
}

/// Handle the init command
/// Returns true on success, false on error
fn handle_init(backend: Option<String>, cache_dir: Option<PathBuf>, project: Option<String>) -> bool {
    let mut config = Config::load().unwrap_or_default();
    if backend.is_some() {
        config.backend_url = backend;
    }
    if cache_dir.is_some() {
        config.cache_dir = cache_dir;
    }
    if let Some(project) = project {
        config.project_id = project;
    }

    if let Err(e) = config.save() {
        eprintln!("✗ Error initializing config: {}", e);
        return false;
    }

    println!("✓ Initialized storyloom configuration");
    match &config.backend_url {
        Some(url) => println!("  Backend: {}", url),
        None => println!("  Backend: none (local storage only)"),
    }
    println!("  Project: {}", config.project_id);
    if let Ok(dir) = config.cache_dir() {
        println!("  Cache directory: {}", dir.display());
    }
    if let Some(config_path) = Config::config_path() {
        println!("  Config file: {}", config_path.display());
    }
    true
}
