//! pawl - forward-only schema change runner for PostgreSQL.

use std::time::Instant;

use clap::Parser;
use tokio_postgres::NoTls;
use tracing_subscriber::EnvFilter;

use pawl_cli::cli::Cli;
use pawl_cli::error::CliResult;
use pawl_cli::output;

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = run().await {
        output::newline();
        output::error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let start = Instant::now();

    let mut config = tokio_postgres::Config::new();
    config
        .user(&cli.user)
        .host(&cli.host)
        .port(cli.port)
        .dbname(&cli.database);
    if !cli.password.is_empty() {
        config.password(&cli.password);
    }

    let (mut client, connection) = config.connect(NoTls).await?;
    let driver = tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!("connection error: {e}");
        }
    });

    let options = pawl_engine::Options::new(cli.search)
        .dry_run(cli.dry_run)
        .verbose(cli.verbose_sql);

    let stats = pawl_engine::run(&mut client, &options).await?;

    drop(client);
    let _ = driver.await;

    let took = output::round_duration(start.elapsed());
    let (message, verb) = if cli.dry_run {
        ("Schema dry run complete", "planned")
    } else {
        ("Schema up to date", "executed")
    };
    output::success(&format!(
        "{} ({} files, {} {}) in {:?}",
        message, stats.discovered, stats.applied, verb, took
    ));

    Ok(())
}
