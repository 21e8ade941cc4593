//! Rollcall operator entry point
//!
//! Usage:
//!   rollcall                    prepare the schema and verify the database
//!   rollcall summary <event>    print capacity and attendance counts
//!   rollcall roster <event>     list registered attendees

use anyhow::{bail, Context};
use tracing::info;
use uuid::Uuid;

use rollcall::{
    config::Settings,
    database::{connection, DatabaseService},
    models::EventId,
    utils::logging,
    RegistrationEngine,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("failed to load settings")?;
    settings.validate().context("invalid settings")?;

    // Initialize logging
    let _log_guard = logging::init_logging(&settings.logging).context("failed to initialize logging")?;

    info!("Starting {}...", rollcall::info());

    // Initialize database connection
    info!("Connecting to database...");
    let db_config = connection::DatabaseConfig::from(&settings.database);
    let db_pool = connection::create_pool(&db_config)
        .await
        .context("failed to connect to database")?;

    // Run database migrations
    connection::run_migrations(&db_pool)
        .await
        .context("failed to run migrations")?;

    let engine = RegistrationEngine::new(DatabaseService::new(db_pool.clone()), settings.registration)
        .context("invalid registration settings")?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [] => {
            connection::health_check(&db_pool).await.context("database health check failed")?;
            info!("Database is ready");
        }
        [command, event] if command == "summary" => {
            let event_id = parse_event_id(event)?;
            let summary = engine.attendance_summary(event_id).await?;
            println!(
                "capacity={} registered={} attended={} remaining={}",
                summary.capacity,
                summary.registered,
                summary.attended,
                summary.remaining()
            );
        }
        [command, event] if command == "roster" => {
            let event_id = parse_event_id(event)?;
            for entry in engine.roster(event_id).await? {
                println!(
                    "{}\t{}\t{:?}\t{}",
                    entry.full_name,
                    entry.email,
                    entry.attendance_status,
                    entry.registered_at.format("%Y-%m-%d %H:%M:%S UTC")
                );
            }
        }
        _ => bail!("usage: rollcall [summary <event-id> | roster <event-id>]"),
    }

    db_pool.close().await;
    info!("Rollcall has been shut down.");

    Ok(())
}

fn parse_event_id(raw: &str) -> anyhow::Result<EventId> {
    let id = Uuid::parse_str(raw).with_context(|| format!("invalid event id '{}'", raw))?;
    Ok(EventId::from(id))
}
