//! Command-line argument structures and enums

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "storyloom")]
#[command(version)]
#[command(about = "Organize manuscript chapters and scenes, synced with a Storyloom backend", long_about = None)]
pub struct Cli {
    /// Override the active project
    #[arg(short, long, global = true)]
    pub project: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize storyloom configuration
    Init {
        /// Backend base URL (e.g., "http://localhost:8000/api")
        #[arg(short, long)]
        backend: Option<String>,

        /// Cache directory (default: platform data directory)
        #[arg(long)]
        cache_dir: Option<PathBuf>,
    },

    /// Show or change configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },

    /// Manuscript chapter management
    #[command(alias = "ch")]
    Chapters {
        #[command(subcommand)]
        command: ChapterCommands,
    },

    /// Scene management within chapters
    #[command(alias = "sc")]
    Scenes {
        #[command(subcommand)]
        command: SceneCommands,
    },

    /// Synchronize scenes with the backend
    Sync {
        #[command(subcommand)]
        command: SyncCommands,
    },

    /// Project management
    Projects {
        #[command(subcommand)]
        command: ProjectCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the current configuration
    Show,

    /// Set the backend base URL (omit to use local storage only)
    SetBackend {
        /// Base URL, e.g. "http://localhost:8000/api"
        url: Option<String>,
    },

    /// Set the active project
    SetProject {
        /// Project id
        id: String,
    },

    /// Set the delay before scene edits are written to the backend
    SetDelay {
        /// Delay in milliseconds
        millis: u64,
    },
}

#[derive(Subcommand)]
pub enum ChapterCommands {
    /// List manuscript chapters with their scene counts
    #[command(alias = "ls")]
    List,

    /// Add a manuscript chapter
    Add {
        /// Chapter title
        title: String,

        /// Chapter outline
        #[arg(short, long)]
        outline: Option<String>,
    },

    /// Remove a manuscript chapter and its scenes
    #[command(alias = "rm")]
    Remove {
        /// Chapter id
        id: i64,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum SceneCommands {
    /// List the scenes of a chapter
    #[command(alias = "ls")]
    List {
        /// Chapter id (default: current chapter)
        #[arg(short, long)]
        chapter: Option<String>,
    },

    /// Add a scene to a chapter
    Add {
        /// Chapter id (default: current chapter)
        #[arg(short, long)]
        chapter: Option<String>,

        /// Scene title (default: "<chapter> – Scene N")
        #[arg(short, long)]
        title: Option<String>,

        /// Scene type: dialogue, action, emotional, exposition, climax, transition
        #[arg(long = "type")]
        scene_type: Option<String>,

        /// Scene text
        #[arg(long)]
        text: Option<String>,
    },

    /// Remove a scene
    #[command(alias = "rm")]
    Remove {
        /// Scene id
        scene: String,

        /// Chapter id (default: current chapter)
        #[arg(short, long)]
        chapter: Option<String>,
    },

    /// Move a scene to another position within its chapter
    #[command(alias = "mv")]
    Move {
        /// Current position (1-based)
        from: usize,

        /// New position (1-based)
        to: usize,

        /// Chapter id (default: current chapter)
        #[arg(short, long)]
        chapter: Option<String>,
    },

    /// Rename a scene
    Rename {
        /// Scene id
        scene: String,

        /// New title (empty restores the default title)
        title: String,

        /// Chapter id (default: current chapter)
        #[arg(short, long)]
        chapter: Option<String>,
    },

    /// Select the current chapter and scene
    Select {
        /// Chapter id
        chapter: String,

        /// Scene id (default: first scene)
        scene: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum SyncCommands {
    /// Merge chapters and scenes from the backend into the local store
    Pull,

    /// Write every saved chapter's scenes to the backend
    Push,

    /// Show backend and cache status
    Status,
}

#[derive(Subcommand)]
pub enum ProjectCommands {
    /// List projects
    #[command(alias = "ls")]
    List,

    /// Create a project
    Create {
        /// Project name
        name: String,

        /// Make the new project active
        #[arg(long)]
        switch: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_scene_move() {
        let cli = Cli::parse_from(["storyloom", "-p", "novel", "scenes", "mv", "3", "1", "-c", "7"]);
        assert_eq!(cli.project.as_deref(), Some("novel"));
        match cli.command {
            Commands::Scenes {
                command: SceneCommands::Move { from, to, chapter },
            } => {
                assert_eq!((from, to), (3, 1));
                assert_eq!(chapter.as_deref(), Some("7"));
            }
            _ => panic!("expected scenes move"),
        }
    }
}
