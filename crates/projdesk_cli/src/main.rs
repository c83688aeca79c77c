//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `projdesk_core` linkage without a rendering layer.
//! - Seed an in-memory desk and print its list so wiring regressions show up
//!   as a non-zero exit.

use projdesk_core::db::open_db_in_memory;
use projdesk_core::{DeskConfig, ProjectDesk, SqliteProjectRepository};
use std::error::Error;
use std::process::ExitCode;
use std::time::Instant;

const SEED_PROJECTS: [(&str, &str); 2] = [
    ("Warehouse Shelving", "Pallet racks for bay 3"),
    ("Garden Shed", "Timber frame, two doors"),
];

fn main() -> ExitCode {
    println!("projdesk_core ping={}", projdesk_core::ping());
    println!("projdesk_core version={}", projdesk_core::core_version());

    match seed_and_list() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("event=cli_smoke module=cli status=error error={err}");
            eprintln!("smoke check failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn seed_and_list() -> Result<(), Box<dyn Error>> {
    let conn = open_db_in_memory()?;
    let repo = SqliteProjectRepository::try_new(&conn)?;
    let mut desk = ProjectDesk::new(repo, DeskConfig::default());

    let reveal = desk.config().toast_reveal_delay();
    for (name, description) in SEED_PROJECTS {
        let form = desk.open_create_dialog();
        form.set_name(name);
        form.set_description(description);
        let now = Instant::now();
        desk.create_project(now)?;
        // The dialog closes and the row lands once the toast is on screen.
        desk.tick(now + reveal)?;
    }

    for row in desk.list().rows() {
        println!(
            "project id={} name={:?} status={} versions={} bodies={}",
            row.id,
            row.name,
            row.status.as_str(),
            row.version_count,
            row.body_count
        );
    }
    Ok(())
}
