//! Market Digest — Binary Entrypoint
//! Parses invocation options, resolves configuration, runs the adapters and
//! writes the assembled Markdown report.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use market_digest::config::{self, FileConfig};
use market_digest::engine::{self, RunPlan};
use market_digest::ingest::providers::economic::{ENV_API_KEY, GUEST_KEY};
use market_digest::ingest::providers::social::DEFAULT_MIRROR;
use market_digest::ingest::types::Window;

#[derive(Parser)]
#[command(name = "market-digest")]
#[command(about = "Generate a consolidated Markdown market report", long_about = None)]
#[command(version)]
struct Cli {
    /// Where the report is written.
    #[arg(long)]
    output: Option<PathBuf>,

    /// How many days ahead to include (0 = today only).
    #[arg(long)]
    days_ahead: Option<u32>,

    /// Social handles (without the @ prefix) to include in the report.
    #[arg(long, num_args = 0..)]
    handles: Vec<String>,

    /// Subforums to monitor for new posts.
    #[arg(long, num_args = 0..)]
    forums: Vec<String>,

    /// Forum users to monitor for submissions.
    #[arg(long, num_args = 0..)]
    forum_users: Vec<String>,

    #[arg(long)]
    forum_client_id: Option<String>,

    #[arg(long)]
    forum_client_secret: Option<String>,

    #[arg(long)]
    forum_user_agent: Option<String>,

    /// Optional TOML/JSON config file (watchlists, credentials, window).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG overrides.
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("market_digest={level}")));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

/// Merge CLI flags, environment and file config into one plan. Flags win;
/// list flags override file lists entirely when given.
fn build_plan(cli: Cli, file: FileConfig) -> RunPlan {
    let pick_list = |flag: Vec<String>, from_file: Vec<String>| {
        if flag.is_empty() {
            config::clean_list(from_file)
        } else {
            config::clean_list(flag)
        }
    };

    let days_ahead = cli.days_ahead.or(file.days_ahead).unwrap_or(0);
    let econ_api_key = config::resolve_setting(None, ENV_API_KEY, file.econ_api_key.clone())
        .unwrap_or_else(|| GUEST_KEY.to_string());
    let forum_credentials = config::resolve_forum_credentials(
        cli.forum_client_id,
        cli.forum_client_secret,
        cli.forum_user_agent,
        &file,
    );

    RunPlan {
        output: cli
            .output
            .or(file.output)
            .unwrap_or_else(|| PathBuf::from("market_report.md")),
        window: Window::days_ahead(Utc::now().date_naive(), days_ahead),
        handles: pick_list(cli.handles, file.handles),
        social_mirror: DEFAULT_MIRROR.to_string(),
        forums: pick_list(cli.forums, file.forums),
        forum_users: pick_list(cli.forum_users, file.forum_users),
        forum_credentials,
        econ_api_key,
        countries: config::clean_list(file.countries),
        importance: config::clean_list(file.importance),
        generated_at: Utc::now(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when the file is absent.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let file_cfg = match &cli.config {
        Some(path) => config::load_from(path)?,
        None => config::load_default()?,
    };
    let plan = build_plan(cli, file_cfg);

    tracing::info!(
        output = %plan.output.display(),
        window_start = %plan.window.start,
        window_end = %plan.window.end,
        "starting report run"
    );

    let document = engine::run(&plan).await;
    document
        .write_to(&plan.output)
        .context("writing report document")?;

    tracing::info!(output = %plan.output.display(), "report written");
    Ok(())
}
