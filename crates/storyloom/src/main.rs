//! Storyloom command-line interface.
//!
//! Manages the chapters and scenes of a manuscript, kept in a local cache
//! and synchronized with a Storyloom backend when one is configured.

/// CLI module - command-line interface for storyloom
mod cli;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    cli::run_cli();
}
