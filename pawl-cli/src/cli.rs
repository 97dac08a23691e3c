//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::Parser;

/// pawl - apply SQL and CSV change files to a PostgreSQL database, exactly once
#[derive(Parser, Debug)]
#[command(name = "pawl")]
#[command(version)]
#[command(
    about = "Apply SQL and CSV change files to a PostgreSQL database, exactly once",
    long_about = None
)]
pub struct Cli {
    /// Database user
    #[arg(short, long)]
    pub user: String,

    /// Database password
    #[arg(short, long, env = "PGPASSWORD", default_value = "", hide_env_values = true)]
    pub password: String,

    /// Host name
    #[arg(short = 'H', long, default_value = "localhost")]
    pub host: String,

    /// TCP port
    #[arg(long, default_value_t = 5432)]
    pub port: u16,

    /// Database name
    #[arg(short, long = "db")]
    pub database: String,

    /// Search root for change files
    #[arg(short, long, default_value = "./sql")]
    pub search: PathBuf,

    /// Plan and validate without executing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Print each statement before it runs
    #[arg(long = "verbose-sql")]
    pub verbose_sql: bool,
}
