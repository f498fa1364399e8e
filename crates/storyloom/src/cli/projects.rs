//! Project command handlers

use crate::cli::args::ProjectCommands;
use crate::cli::util::Session;

pub fn handle_project_command(session: &mut Session, command: ProjectCommands) -> bool {
    match command {
        ProjectCommands::List => handle_list(session),
        ProjectCommands::Create { name, switch } => handle_create(session, &name, switch),
    }
}

fn handle_list(session: &Session) -> bool {
    match session.block_on(session.backend.list_projects()) {
        Ok(projects) => {
            for project in projects {
                let marker = if project.id == session.project_id() { "*" } else { " " };
                println!("{} {:<24} {}", marker, project.id, project.name);
            }
            true
        }
        Err(e) => {
            eprintln!("✗ Could not list projects: {}", e);
            false
        }
    }
}

fn handle_create(session: &Session, name: &str, switch: bool) -> bool {
    let project = match session.block_on(session.backend.create_project(name)) {
        Ok(project) => project,
        Err(e) => {
            eprintln!("✗ Could not create project: {}", e);
            return false;
        }
    };
    println!("✓ Created project '{}' ({})", project.name, project.id);

    if switch {
        let mut config = session.config.clone();
        config.project_id = project.id.clone();
        if let Err(e) = config.save() {
            eprintln!("✗ Could not save config: {}", e);
            return false;
        }
        println!("  Active project: {}", project.id);
    }
    true
}
