use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use ojwatch_bot::config::Config;
use ojwatch_bot::providers::{AtcoderClient, CodeforcesClient, NiukeClient, OjClient};
use ojwatch_bot::summary;

/// Thin command-line harness around the query core. The chat host calls
/// the same operations through the library; this binary exists for manual
/// runs and integration checks.
#[derive(Parser)]
#[command(name = "ojwatch-bot", version, about)]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Nearest contest on every judge
    Nearest,
    /// The next contests on one judge
    Contests {
        judge: Judge,
        /// How many entries, starting from the nearest
        #[arg(long, default_value_t = 3)]
        count: usize,
    },
    /// A user's profile statistics on one judge
    Profile { judge: Judge, handle: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Judge {
    Niuke,
    Atcoder,
    Codeforces,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    cli.config.validate()?;
    let config = &cli.config;
    let timeout = config.timeout();

    let niuke = NiukeClient::new(&config.niuke_base_url, timeout)?;
    let atcoder = AtcoderClient::new(&config.atcoder_base_url, timeout)?;
    let credentials = config
        .codeforces_credentials()
        .context("Codeforces credentials missing after validation")?;
    let codeforces = CodeforcesClient::new(&config.codeforces_api_url, credentials, timeout)?;

    let output = match cli.command {
        Command::Nearest => {
            info!("querying the nearest contest on every judge");
            summary::nearest_contests(&[&niuke, &atcoder, &codeforces]).await
        }
        Command::Contests { judge, count } => {
            info!("querying {} contests on {:?}", count, judge);
            let client: &dyn OjClient = match judge {
                Judge::Niuke => &niuke,
                Judge::Atcoder => &atcoder,
                Judge::Codeforces => &codeforces,
            };
            summary::recent_contests(client, count).await
        }
        Command::Profile { judge, handle } => {
            info!("querying the {:?} profile of {}", judge, handle);
            let client: &dyn OjClient = match judge {
                Judge::Niuke => &niuke,
                Judge::Atcoder => &atcoder,
                Judge::Codeforces => &codeforces,
            };
            client.fetch_profile(&handle).await
        }
    };

    println!("{output}");
    Ok(())
}
