use std::io::{self, Write};

use anyhow::Context;
use catalogd::api::{build_router, AppState};
use catalogd::config::Config;
use catalogd::{catalog, db, telemetry};

const USAGE: &str = "usage: catalogd [serve | stats | reset-flags]

  serve        run the review HTTP API (default)
  stats        print review and import counts
  reset-flags  mark every article as not reviewed again";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    telemetry::init_tracing(config.log_format);

    let command = std::env::args().nth(1).unwrap_or_else(|| "serve".to_string());
    match command.as_str() {
        "serve" => serve(config).await,
        "stats" => print_stats(&config),
        "reset-flags" => reset_flags(&config),
        "help" | "-h" | "--help" => {
            println!("{}", USAGE);
            Ok(())
        }
        other => {
            eprintln!("{}", USAGE);
            anyhow::bail!("unknown command: {}", other)
        }
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let conn = db::open_db(&config.db_path)
        .with_context(|| format!("opening {}", config.db_path.display()))?;
    let app = build_router(AppState::new(conn), &config);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    tracing::info!(
        addr = %config.bind_addr,
        db = %config.db_path.display(),
        "catalogd listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    tracing::info!("catalogd stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "could not listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

fn print_stats(config: &Config) -> anyhow::Result<()> {
    let conn = db::open_db(&config.db_path)?;
    let stats = catalog::review_stats(&conn)?;
    let groups = catalog::filter_counts(&conn)?;

    let mut out = io::stdout().lock();
    writeln!(out, "articles:               {}", stats.total)?;
    writeln!(out, "  marked existing:      {}", stats.existing)?;
    writeln!(out, "  marked not existing:  {}", stats.not_existing)?;
    writeln!(out, "  unmarked:             {}", stats.unmarked)?;
    writeln!(out, "not found on import:    {}", stats.not_found)?;

    let processed = stats.total + stats.not_found;
    if processed > 0 {
        let found_rate = stats.total as f64 * 100.0 / processed as f64;
        writeln!(out, "import success rate:    {:.2}%", found_rate)?;
    }

    writeln!(out, "unmarked groups (multiple members):")?;
    writeln!(out, "  all:                        {}", groups.all)?;
    writeln!(out, "  renault-nissan-dacia:       {}", groups.renault_nissan_dacia)?;
    writeln!(out, "  renault-nissan-dacia-only:  {}", groups.renault_nissan_dacia_only)?;
    writeln!(out, "  no-oem:                     {}", groups.no_oem)?;
    writeln!(out, "unmarked single groups:       {}", groups.single)?;
    Ok(())
}

fn reset_flags(config: &Config) -> anyhow::Result<()> {
    let conn = db::open_db(&config.db_path)?;
    let before = catalog::review_stats(&conn)?;
    let updated = catalog::reset_all_flags(&conn)?;
    let after = catalog::review_stats(&conn)?;
    tracing::info!(
        updated,
        existing_before = before.existing,
        not_existing_before = before.not_existing,
        unmarked_after = after.unmarked,
        "review flags reset"
    );
    println!(
        "reset {} articles ({} existing, {} not existing before); {} unmarked now",
        updated, before.existing, before.not_existing, after.unmarked
    );
    Ok(())
}
