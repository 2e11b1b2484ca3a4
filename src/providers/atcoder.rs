//! AtCoder client.
//!
//! The homepage's upcoming-contest table only carries an absolute start
//! timestamp (JST with an explicit offset), so the countdown is computed
//! locally at render time. Profile pages need care around accounts that
//! exist but never entered a rated contest: their statistics table is
//! simply absent, which is a valid zeroed profile, not a failure.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use scraper::{Html, Selector};

use super::{build_http, element_text, fetch_page, parse_stat, OjClient};
use crate::records::{ContestRecord, Countdown, ProfileRecord};
use crate::status::{FetchError, FetchResult};

/// Rating cutoff for the elite remark.
const ELITE_RATING: i64 = 2000;

/// Rank label for accounts that never entered a rated contest.
const NEVER_RATED_RANK: &str = "NaN";

/// The page renders start times like `2024-08-10 21:00:00+0900`.
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%z";

static UPCOMING: OnceLock<Selector> = OnceLock::new();
static ROW: OnceLock<Selector> = OnceLock::new();
static ANCHOR: OnceLock<Selector> = OnceLock::new();
static TIME_TAG: OnceLock<Selector> = OnceLock::new();
static MAIN_CONTAINER: OnceLock<Selector> = OnceLock::new();
static DIV: OnceLock<Selector> = OnceLock::new();
static TABLE: OnceLock<Selector> = OnceLock::new();
static CELL: OnceLock<Selector> = OnceLock::new();
static SPAN: OnceLock<Selector> = OnceLock::new();

pub struct AtcoderClient {
    http: reqwest::Client,
    base_url: String,
}

impl AtcoderClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        Ok(AtcoderClient {
            http: build_http(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl OjClient for AtcoderClient {
    fn name(&self) -> &'static str {
        "Atcoder"
    }

    async fn contest(&self, index: usize) -> FetchResult<ContestRecord> {
        let url = format!("{}/home?lang=ja", self.base_url);
        let body = fetch_page(self.http.get(&url)).await?;
        parse_contest(&body, index)
    }

    async fn profile(&self, handle: &str) -> FetchResult<ProfileRecord> {
        // An unknown handle 404s here, which surfaces as HttpStatus; a
        // known-but-never-rated handle serves a page without the table.
        let url = format!("{}/users/{}", self.base_url, handle);
        let body = fetch_page(self.http.get(&url)).await?;
        parse_profile(&body, handle)
    }
}

fn parse_contest(body: &str, index: usize) -> FetchResult<ContestRecord> {
    let upcoming_sel =
        UPCOMING.get_or_init(|| Selector::parse("#contest-table-upcoming").unwrap());
    let row_sel = ROW.get_or_init(|| Selector::parse("tbody tr").unwrap());
    let anchor_sel = ANCHOR.get_or_init(|| Selector::parse("a").unwrap());
    let time_sel = TIME_TAG.get_or_init(|| Selector::parse("time").unwrap());

    let doc = Html::parse_document(body);
    let table = doc
        .select(upcoming_sel)
        .next()
        .ok_or(FetchError::MissingElement("upcoming contest table"))?;
    let row = table
        .select(row_sel)
        .nth(index)
        .ok_or(FetchError::MissingElement("contest row"))?;

    // First anchor wraps the start time, second one is the contest itself.
    let name = row
        .select(anchor_sel)
        .nth(1)
        .map(element_text)
        .filter(|name| !name.is_empty())
        .ok_or(FetchError::MissingElement("contest name"))?;
    let time_text = row
        .select(time_sel)
        .next()
        .map(element_text)
        .ok_or(FetchError::MissingElement("contest start time"))?;
    let start = DateTime::parse_from_str(&time_text, TIME_FORMAT)
        .map_err(|_| FetchError::MissingElement("contest start timestamp"))?;

    Ok(ContestRecord {
        name,
        start_time: Some(start),
        countdown: Countdown::FromStart,
    })
}

fn parse_profile(body: &str, handle: &str) -> FetchResult<ProfileRecord> {
    let main_sel = MAIN_CONTAINER.get_or_init(|| Selector::parse("#main-container").unwrap());
    let div_sel = DIV.get_or_init(|| Selector::parse("div").unwrap());
    let table_sel = TABLE.get_or_init(|| Selector::parse("table").unwrap());
    let cell_sel = CELL.get_or_init(|| Selector::parse("td").unwrap());
    let span_sel = SPAN.get_or_init(|| Selector::parse("span").unwrap());

    let doc = Html::parse_document(body);
    let main = doc
        .select(main_sel)
        .next()
        .ok_or(FetchError::MissingElement("main container"))?;
    let outer = main
        .select(div_sel)
        .next()
        .ok_or(FetchError::MissingElement("content root"))?;
    let block = outer
        .select(div_sel)
        .nth(2)
        .ok_or(FetchError::MissingElement("content block"))?;

    // Accounts that never entered a rated contest have no statistics table
    // at all. That is a valid profile, zeroed out.
    let table = match block.select(table_sel).next() {
        Some(table) => table,
        None => {
            return Ok(ProfileRecord {
                handle: handle.to_string(),
                rating: Some(0),
                peak_rating: Some(0),
                rank: Some(NEVER_RATED_RANK.to_string()),
                rated_contests: Some(0),
                ..Default::default()
            })
        }
    };

    let cells: Vec<_> = table.select(cell_sel).collect();
    let rank = cells
        .first()
        .map(|cell| element_text(*cell))
        .ok_or(FetchError::MissingElement("rank cell"))?;
    let rating_text = cells
        .get(1)
        .and_then(|cell| cell.select(span_sel).next())
        .map(element_text)
        .ok_or(FetchError::MissingElement("rating cell"))?;
    let rating = parse_stat(&rating_text, "rating cell")?;
    let peak_text = cells
        .get(2)
        .and_then(|cell| cell.select(span_sel).next())
        .map(element_text)
        .ok_or(FetchError::MissingElement("peak rating cell"))?;
    let peak = parse_stat(&peak_text, "peak rating cell")?;
    let contests_text = cells
        .get(3)
        .map(|cell| element_text(*cell))
        .ok_or(FetchError::MissingElement("contest count cell"))?;
    let contests = parse_stat(&contests_text, "contest count cell")?;

    Ok(ProfileRecord {
        handle: handle.to_string(),
        rating: Some(rating),
        peak_rating: Some(peak),
        rank: Some(rank),
        rated_contests: Some(contests),
        elite: rating >= ELITE_RATING,
        ..Default::default()
    })
}
