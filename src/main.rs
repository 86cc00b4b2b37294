use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use newsreel::config::Config;
use newsreel::feed::build_client;
use newsreel::ingest::Scheduler;
use newsreel::read_model::ReadModel;
use newsreel::storage::{Database, Entry};

#[derive(Parser, Debug)]
#[command(name = "newsreel", about = "Poll RSS/Atom feeds into a deduplicated entry store")]
struct Args {
    /// Config file (TOML). Missing file means built-in defaults.
    #[arg(long, value_name = "FILE", default_value = "newsreel.toml")]
    config: PathBuf,

    /// Database file, overrides `database_path` from the config
    #[arg(long, value_name = "FILE")]
    database: Option<String>,

    /// Run a single ingestion cycle, print the snapshot and exit
    #[arg(long, conflicts_with = "list")]
    once: bool,

    /// Print the stored snapshot without ingesting
    #[arg(long)]
    list: bool,

    /// Print snapshots as JSON instead of text
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("newsreel=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = Config::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    if let Some(database) = args.database {
        config.database_path = database;
    }

    // Schema must exist before either side touches the store
    let db = Database::open(&config.database_path)
        .await
        .with_context(|| format!("Failed to open database at {}", config.database_path))?;
    let read_model = ReadModel::new(db.clone());

    if args.list {
        return print_snapshot(&read_model, args.json).await;
    }

    let client = build_client(&config.user_agent).context("Failed to build HTTP client")?;
    let scheduler = Scheduler::from_config(db, client, &config);

    if args.once {
        scheduler.run_cycle().await;
        return print_snapshot(&read_model, args.json).await;
    }

    let handle = scheduler.spawn();
    tracing::info!(database = %config.database_path, "Ingestion running, press Ctrl-C to stop");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    tracing::info!("Shutdown requested");
    handle.shutdown().await;

    Ok(())
}

async fn print_snapshot(read_model: &ReadModel, json: bool) -> Result<()> {
    let entries = read_model
        .snapshot()
        .await
        .context("Failed to read entries")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for entry in &entries {
            println!("{}", format_entry(entry));
        }
        println!("{} entries", entries.len());
    }
    Ok(())
}

fn format_entry(entry: &Entry) -> String {
    let mut line = format!(
        "[{}] {}\n    {}",
        entry.ingested_at.format("%Y-%m-%d %H:%M:%S"),
        entry.title,
        entry.link
    );
    if let Some(image) = &entry.image {
        line.push_str(&format!("\n    image: {image}"));
    }
    line
}
