//! Config command handlers

use storyloom_core::config::Config;

use crate::cli::args::ConfigCommands;

pub fn handle_config_command(command: Option<ConfigCommands>) -> bool {
    let mut config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("✗ Error loading config: {}", e);
            return false;
        }
    };

    match command {
        None | Some(ConfigCommands::Show) => {
            show_config(&config);
            return true;
        }
        Some(ConfigCommands::SetBackend { url }) => {
            config.backend_url = url.filter(|u| !u.trim().is_empty());
        }
        Some(ConfigCommands::SetProject { id }) => {
            config.project_id = id;
        }
        Some(ConfigCommands::SetDelay { millis }) => {
            config.save_delay_ms = millis;
        }
    }

    match config.save() {
        Ok(()) => {
            println!("✓ Configuration updated");
            show_config(&config);
            true
        }
        Err(e) => {
            eprintln!("✗ Could not save config: {}", e);
            false
        }
    }
}

/// Show storyloom configuration
fn show_config(config: &Config) {
    println!("Storyloom Configuration");
    println!("=======================");
    match &config.backend_url {
        Some(url) if config.has_backend() => println!("Backend: {}", url),
        _ => println!("Backend: none (local storage only)"),
    }
    println!("Project: {}", config.project_id);
    match config.cache_dir() {
        Ok(dir) => println!("Cache directory: {}", dir.display()),
        Err(e) => println!("Cache directory: unavailable ({})", e),
    }
    println!("Save delay: {} ms", config.save_delay_ms);
    if let Some(config_path) = Config::config_path() {
        println!("Config file: {}", config_path.display());
    }
}
