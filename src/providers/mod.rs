//! Clients for the supported judges.
//!
//! Each judge gets its own independent client struct; the only shared
//! machinery is the boundary contract below and a couple of page-fetch
//! helpers. Extraction rules are deliberately per-judge: the three sites
//! have nothing structural in common.

pub mod atcoder;
pub mod codeforces;
pub mod niuke;

pub use atcoder::AtcoderClient;
pub use codeforces::{ApiCredentials, CodeforcesClient};
pub use niuke::NiukeClient;

use std::time::Duration;

use anyhow::Context as _;
use async_trait::async_trait;
use chrono::Local;
use reqwest::Client;
use tracing::{debug, warn};

use crate::records::{ContestRecord, ProfileRecord};
use crate::report;
use crate::status::{FetchError, FetchResult};

/// One supported judge.
///
/// `contest`/`profile` do the typed work; the provided `fetch_*` wrappers
/// are the boundary the chat layer calls. They never fail: the returned
/// string is either the formatted report or the failure's display text,
/// ready to be sent to the user as-is.
#[async_trait]
pub trait OjClient: Send + Sync {
    /// Judge name, used for report headers and logging.
    fn name(&self) -> &'static str;

    /// Contest at `index`, counted from the nearest one.
    async fn contest(&self, index: usize) -> FetchResult<ContestRecord>;

    /// Profile statistics for `handle`.
    async fn profile(&self, handle: &str) -> FetchResult<ProfileRecord>;

    async fn fetch_contest(&self, index: usize) -> String {
        match self.contest(index).await {
            Ok(record) => report::contest_report(&record, Local::now().fixed_offset()),
            Err(err) => {
                warn!("{} contest lookup failed: {}", self.name(), err);
                err.to_string()
            }
        }
    }

    async fn fetch_profile(&self, handle: &str) -> String {
        match self.profile(handle).await {
            Ok(record) => report::profile_report(self.name(), &record),
            Err(err) => {
                warn!("{} profile lookup failed: {}", self.name(), err);
                err.to_string()
            }
        }
    }
}

/// Build a per-client HTTP client with the explicit request timeout.
pub(crate) fn build_http(timeout: Duration) -> anyhow::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}

/// Send a prepared GET and hand back the body, mapping a non-200 answer to
/// the status-carrying failure.
pub(crate) async fn fetch_page(request: reqwest::RequestBuilder) -> FetchResult<String> {
    let resp = request.send().await?;
    debug!("GET {}", resp.url());
    let status = resp.status().as_u16();
    if status != 200 {
        return Err(FetchError::HttpStatus(status));
    }
    Ok(resp.text().await?)
}

/// Collected text content of an element, whitespace-trimmed.
pub(crate) fn element_text(el: scraper::ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Parse an integer statistic out of scraped text; a cell that does not
/// hold a number counts as the expected node being gone.
pub(crate) fn parse_stat(text: &str, what: &'static str) -> FetchResult<i64> {
    text.trim()
        .parse::<i64>()
        .map_err(|_| FetchError::MissingElement(what))
}
