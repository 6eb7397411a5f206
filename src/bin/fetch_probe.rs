//! Probe a single source adapter from the command line and print its section
//! as Markdown. Handy for checking a watchlist or an API key without writing
//! a report file.

use anyhow::{anyhow, Result};
use chrono::Utc;
use clap::{Parser, ValueEnum};

use market_digest::config;
use market_digest::ingest::providers::earnings::{EarningsAdapter, EarningsConfig};
use market_digest::ingest::providers::economic::{
    EconomicAdapter, EconomicConfig, ENV_API_KEY, GUEST_KEY,
};
use market_digest::ingest::providers::forum::{
    ForumAdapter, ForumConfig, DEFAULT_SUBFORUM_LIMIT, DEFAULT_USER_LIMIT,
};
use market_digest::ingest::providers::social::{
    SocialAdapter, SocialConfig, DEFAULT_MIRROR, DEFAULT_POSTS_PER_HANDLE,
};
use market_digest::ingest::types::{SourceAdapter, Window};
use market_digest::report::{ReportDocument, Section};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Source {
    Economic,
    Earnings,
    Social,
    Forum,
}

#[derive(Parser)]
#[command(name = "fetch-probe", about = "Fetch one source and print its Markdown section")]
struct Cli {
    #[arg(value_enum)]
    source: Source,

    /// How many days ahead to include (calendar sources).
    #[arg(long, default_value_t = 0)]
    days_ahead: u32,

    /// Social handles to probe (omit the @ prefix).
    #[arg(long, num_args = 0..)]
    handles: Vec<String>,

    /// Subforums to probe.
    #[arg(long, num_args = 0..)]
    forums: Vec<String>,

    /// Forum users to probe.
    #[arg(long, num_args = 0..)]
    forum_users: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let cli = Cli::parse();
    let window = Window::days_ahead(Utc::now().date_naive(), cli.days_ahead);

    let adapter: Box<dyn SourceAdapter> = match cli.source {
        Source::Economic => Box::new(EconomicAdapter::from_config(EconomicConfig {
            window,
            countries: vec![],
            importance: vec![],
            api_key: config::resolve_setting(None, ENV_API_KEY, None)
                .unwrap_or_else(|| GUEST_KEY.to_string()),
        })),
        Source::Earnings => Box::new(EarningsAdapter::from_config(EarningsConfig { window })),
        Source::Social => {
            if cli.handles.is_empty() {
                return Err(anyhow!("no handles provided; use --handles"));
            }
            Box::new(SocialAdapter::from_config(SocialConfig {
                mirror: DEFAULT_MIRROR.to_string(),
                handles: config::clean_list(cli.handles),
                limit: DEFAULT_POSTS_PER_HANDLE,
                since: None,
            }))
        }
        Source::Forum => {
            if cli.forums.is_empty() && cli.forum_users.is_empty() {
                return Err(anyhow!("provide --forums and/or --forum-users"));
            }
            let credentials =
                config::resolve_forum_credentials(None, None, None, &Default::default())
                    .ok_or_else(|| {
                        anyhow!("forum credentials are required; set FORUM_CLIENT_ID/FORUM_CLIENT_SECRET")
                    })?;
            Box::new(ForumAdapter::from_config(ForumConfig {
                credentials,
                subforums: config::clean_list(cli.forums),
                users: config::clean_list(cli.forum_users),
                subforum_limit: DEFAULT_SUBFORUM_LIMIT,
                user_limit: DEFAULT_USER_LIMIT,
            }))
        }
    };

    let records = adapter.fetch().await?;
    let doc = ReportDocument::new(Utc::now(), vec![Section::records(adapter.name(), records)]);
    print!("{}", doc.render());
    Ok(())
}
