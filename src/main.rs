//! MediTrack reminder daemon
//!
//! Loads the medicine list, opens the SQLite-backed state store, and runs
//! the alert scheduler until interrupted. Notifications go to the log; a
//! real deployment swaps in a delivery sink.

use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use meditrack::alerts::{AlertConfig, LogSink, SystemClock};
use meditrack::db;
use meditrack::models::{Medicine, Subject};
use meditrack::scheduler::{AlertScheduler, FileSource, StaticSource, SubjectSchedule};
use meditrack::store::SqliteStore;

/// Get the database path from environment or use default
fn get_database_path() -> PathBuf {
    std::env::var("MEDITRACK_DATABASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data/meditrack.db"))
}

/// Sample schedule used when no medicines file is configured.
fn sample_medicines() -> Vec<Medicine> {
    vec![
        Medicine::new("amoxicillin", "Amoxicillin", "500mg", "3x daily"),
        Medicine::new("vitamin-d", "Vitamin D", "1000 IU", "once daily"),
        Medicine::new("melatonin", "Melatonin", "3mg", "at bedtime"),
    ]
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("meditrack=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    eprintln!("MediTrack reminder daemon v{}", env!("CARGO_PKG_VERSION"));

    let db_path = get_database_path();
    eprintln!("Database path: {}", db_path.display());

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let database = db::Database::new(&db_path)?;
    database.with_conn(|conn| {
        db::migrations::run_migrations(conn)?;
        let version = db::migrations::get_schema_version(conn)?;
        eprintln!("Database schema version: {}", version);
        Ok(())
    })?;

    let store = Arc::new(SqliteStore::new(database));
    let clock = Arc::new(SystemClock);
    let sink = Arc::new(LogSink);

    let source: Arc<dyn meditrack::scheduler::PrescriptionSource> =
        match std::env::var("MEDITRACK_MEDICINES_PATH") {
            Ok(path) => {
                eprintln!("Medicines file: {}", path);
                Arc::new(FileSource::new(path))
            }
            Err(_) => {
                eprintln!("No MEDITRACK_MEDICINES_PATH set, using sample schedule");
                Arc::new(StaticSource::new(sample_medicines()))
            }
        };

    let mut scheduler = AlertScheduler::new(sink);
    scheduler.add_subject(SubjectSchedule::new(
        Subject::new_self("self", "You"),
        source,
        store,
        clock,
        AlertConfig::default(),
    ));

    eprintln!("Evaluating alerts every 60s, ctrl-c to stop...");
    tokio::select! {
        _ = scheduler.run() => {}
        _ = tokio::signal::ctrl_c() => {
            eprintln!("Shutting down");
        }
    }

    Ok(())
}
