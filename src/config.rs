use std::time::Duration;

use clap::Parser;

use crate::providers::ApiCredentials;

/// Competitive-programming query bot
#[derive(Parser, Debug, Clone)]
#[command(name = "ojwatch-bot", version, about)]
pub struct Config {
    /// Niuke base URL
    #[arg(long, env = "NIUKE_BASE_URL", default_value = "https://ac.nowcoder.com")]
    pub niuke_base_url: String,

    /// AtCoder base URL
    #[arg(long, env = "ATCODER_BASE_URL", default_value = "https://atcoder.jp")]
    pub atcoder_base_url: String,

    /// Codeforces API base URL
    #[arg(
        long,
        env = "CODEFORCES_API_URL",
        default_value = "https://codeforces.com/api"
    )]
    pub codeforces_api_url: String,

    /// Codeforces API key (required; every API call is signed)
    #[arg(long, env = "CODEFORCES_API_KEY")]
    pub codeforces_api_key: Option<String>,

    /// Codeforces API secret
    #[arg(long, env = "CODEFORCES_API_SECRET")]
    pub codeforces_api_secret: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "10")]
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.codeforces_api_key.is_none() || self.codeforces_api_secret.is_none() {
            anyhow::bail!(
                "CODEFORCES_API_KEY and CODEFORCES_API_SECRET are required. \
                 Request a pair at https://codeforces.com/settings/api."
            );
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be positive");
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The credential pair for the Codeforces client; `None` until both
    /// halves are configured (validate() enforces that up front).
    pub fn codeforces_credentials(&self) -> Option<ApiCredentials> {
        Some(ApiCredentials {
            key: self.codeforces_api_key.clone()?,
            secret: self.codeforces_api_secret.clone()?,
        })
    }
}
