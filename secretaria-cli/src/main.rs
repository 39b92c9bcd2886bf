//! secretaria CLI - academic-records server entry point
//!
//! Subcommands:
//! - `serve`: run the HTTP server (runs migrations first)
//! - `migrate`: run the schema migrations and exit

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use secretaria_server::{create_pool, run_server, ServerConfig};

mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "secretaria",
    author,
    version,
    about = "Academic-records HTTP backend: students, cards, professors, departments, courses, enrollments"
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server
    Serve(ServeArgs),

    /// Run schema migrations and exit
    Migrate(MigrateArgs),
}

#[derive(Parser, Debug)]
struct ServeArgs {
    /// Address to bind to
    #[arg(long, short = 'b', default_value = "127.0.0.1:3030")]
    bind: SocketAddr,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    cors_permissive: bool,

    /// Database URL (overrides environment)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
}

#[derive(Parser, Debug)]
struct MigrateArgs {
    /// Database URL (overrides environment)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    tracing_setup::init_tracing(cli.debug)?;

    match cli.command {
        Commands::Serve(args) => serve(args).await,
        Commands::Migrate(args) => migrate(args).await,
    }
}

async fn serve(args: ServeArgs) -> Result<()> {
    let database_url = require_database_url(args.database_url)?;

    tracing::info!("Starting secretaria server on {}", args.bind);

    let pool = create_pool(&database_url)
        .await
        .context("Failed to create database pool")?;

    let config = ServerConfig {
        bind_addr: args.bind,
        cors_permissive: args.cors_permissive,
    };

    run_server(pool, config).await.context("Server error")?;

    Ok(())
}

async fn migrate(args: MigrateArgs) -> Result<()> {
    let database_url = require_database_url(args.database_url)?;

    let pool = create_pool(&database_url)
        .await
        .context("Failed to create database pool")?;

    secretaria_server::db::migrations::run(&pool)
        .await
        .context("Migration failed")?;

    Ok(())
}

fn require_database_url(arg: Option<String>) -> Result<String> {
    arg.or_else(|| std::env::var("DATABASE_URL").ok())
        .context("DATABASE_URL not set. Set via --database-url, DATABASE_URL env, or .env")
}
