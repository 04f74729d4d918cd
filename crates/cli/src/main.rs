//! slate - command line front end for the take sequencing engine
//!
//! Every invocation loads the data file, applies one operation, prints the
//! result as JSON on stdout and waits for the updated snapshot to be
//! written back. Logs go to stderr.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use slate_core::channel::Channel;
use slate_core::types::{ProjectId, TakeId};
use slate_store::persistence::{load_snapshot, SnapshotWriter};
use slate_store::ProjectStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use config::{CliConfig, LogFormat};

#[derive(Parser)]
#[command(name = "slate")]
#[command(about = "Keep take, position and file numbering consistent across a shoot")]
#[command(version)]
struct Cli {
    /// Data file to operate on (overrides SLATE_DATA_FILE)
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a project
    InitProject {
        name: String,

        /// Number of cameras rolling
        #[arg(short, long, default_value_t = 1)]
        cameras: u8,
    },

    /// Change a project's camera count
    SetCameras { project: ProjectId, cameras: u8 },

    /// List projects, or one project's takes in sequence order
    List { project: Option<ProjectId> },

    /// Log a take at the end of the project
    Append {
        project: ProjectId,

        #[command(flatten)]
        take: TakeArgs,
    },

    /// Insert a take before the one at POSITION and renumber what follows
    InsertBefore {
        project: ProjectId,
        position: i32,

        #[command(flatten)]
        take: TakeArgs,
    },

    /// Move a take before the one at POSITION
    MoveBefore {
        project: ProjectId,
        take: TakeId,
        position: i32,
    },

    /// Edit a take; changed file numbers shift the takes after it
    Edit {
        take: TakeId,

        #[arg(long)]
        scene: Option<String>,

        #[arg(long)]
        shot: Option<String>,

        #[arg(long)]
        take_number: Option<i32>,

        /// Waste, Insert, Ambience, SFX or empty for none
        #[arg(long)]
        classification: Option<String>,

        /// Field edit as KEY=VALUE; an empty value clears the field
        #[arg(long = "set", value_parser = parse_assignment)]
        fields: Vec<(String, String)>,
    },

    /// Delete a take and close the gaps it leaves
    Delete { take: TakeId },

    /// Shift one channel's file numbers forward from FROM
    Shift {
        project: ProjectId,

        /// `sound`, or `camera:<n>`
        channel: Channel,

        from: i64,

        #[arg(short, long, default_value_t = 1)]
        increment: i64,

        /// Take left untouched, and used as the anchor when it holds FROM
        #[arg(long)]
        exclude: Option<TakeId>,

        /// Only walk takes at or after this position when no anchor is found
        #[arg(long)]
        position_hint: Option<i32>,
    },

    /// Bump take numbers in one scene/shot group
    RenumberTakes {
        project: ProjectId,
        scene: String,
        shot: String,
        from: i32,

        #[arg(short, long, default_value_t = 1)]
        increment: i32,

        #[arg(long)]
        exclude: Option<TakeId>,

        /// Leave takes numbered above this alone
        #[arg(long)]
        max: Option<i32>,
    },

    /// Reassign dense positions in sequence order
    Normalize { project: ProjectId },

    /// Report breaks in every channel's file numbering
    Check { project: ProjectId },
}

/// Fields shared by `append` and `insert-before`.
#[derive(Args)]
struct TakeArgs {
    #[arg(long)]
    scene: String,

    #[arg(long)]
    shot: String,

    /// Defaults to the next free (append) or displaced (insert) number
    #[arg(long)]
    take_number: Option<i32>,

    #[arg(long)]
    classification: Option<String>,

    /// Field value as KEY=VALUE, e.g. soundFile=0005
    #[arg(long = "set", value_parser = parse_assignment)]
    fields: Vec<(String, String)>,
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing field name in `{raw}`"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = CliConfig::from_env();

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "slate=info,slate_core=info,slate_store=info".into());
    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }

    let cli = Cli::parse();
    let path = cli.data_file.unwrap_or(config.data_file);
    tracing::debug!(path = %path.display(), "Using data file");

    // --- Store ---
    let snapshot = load_snapshot(&path)
        .await
        .with_context(|| format!("Failed to load {}", path.display()))?;
    let (persist, writer) = SnapshotWriter::spawn(path.clone());
    let mut store = ProjectStore::from_snapshot(snapshot).with_persistence(persist);

    let output = commands::run(&mut store, cli.command);

    // Dropping the store closes the snapshot channel; wait for the last write.
    drop(store);
    writer.await.context("Snapshot writer task failed")?;

    let output = output?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
