//! Niuke (牛客) client.
//!
//! Contests come off the homepage, which already renders a relative start
//! time, so the countdown is reproduced verbatim. Profiles take three
//! dependent requests: the rating search resolves a display name to the
//! opaque profile id, then the profile page and the practice sub-page each
//! contribute statistics.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};

use super::{build_http, element_text, fetch_page, parse_stat, OjClient};
use crate::records::{ContestRecord, Countdown, ProfileRecord};
use crate::status::{FetchError, FetchResult};

static ACM_LIST: OnceLock<Selector> = OnceLock::new();
static ACM_ITEM: OnceLock<Selector> = OnceLock::new();
static ITEM_TIME: OnceLock<Selector> = OnceLock::new();
static TABLE: OnceLock<Selector> = OnceLock::new();
static ROW: OnceLock<Selector> = OnceLock::new();
static CELL: OnceLock<Selector> = OnceLock::new();
static ANCHOR: OnceLock<Selector> = OnceLock::new();
static STATE_MAIN: OnceLock<Selector> = OnceLock::new();
static STATE_ITEM: OnceLock<Selector> = OnceLock::new();
static DIV: OnceLock<Selector> = OnceLock::new();

pub struct NiukeClient {
    http: reqwest::Client,
    base_url: String,
}

impl NiukeClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        Ok(NiukeClient {
            http: build_http(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl OjClient for NiukeClient {
    fn name(&self) -> &'static str {
        "Niuke"
    }

    async fn contest(&self, index: usize) -> FetchResult<ContestRecord> {
        let body = fetch_page(self.http.get(&self.base_url)).await?;
        parse_contest(&body, index)
    }

    async fn profile(&self, handle: &str) -> FetchResult<ProfileRecord> {
        // Step 1: resolve the display name through the rating search. The
        // search only lists accounts with a rated contest in the trailing
        // six months.
        let uid = {
            let url = format!("{}/acm/contest/rating-index", self.base_url);
            let body =
                fetch_page(self.http.get(&url).query(&[("searchUserName", handle)])).await?;
            parse_search_uid(&body)?
        };

        // Step 2: contest statistics from the profile page.
        let mut record = {
            let url = format!("{}/acm/contest/profile/{}", self.base_url, uid);
            let body = fetch_page(self.http.get(&url)).await?;
            parse_profile_stats(&body, handle)?
        };

        // Step 3: solved count from the practice sub-page.
        let url = format!("{}/acm/contest/profile/{}/practice-coding", self.base_url, uid);
        let body = fetch_page(self.http.get(&url)).await?;
        record.solved = Some(parse_practice_solved(&body)?);

        Ok(record)
    }
}

fn parse_contest(body: &str, index: usize) -> FetchResult<ContestRecord> {
    let list_sel = ACM_LIST.get_or_init(|| Selector::parse(".acm-list").unwrap());
    let item_sel = ACM_ITEM.get_or_init(|| Selector::parse(".acm-item").unwrap());
    let anchor_sel = ANCHOR.get_or_init(|| Selector::parse("a").unwrap());
    let time_sel = ITEM_TIME.get_or_init(|| Selector::parse(".acm-item-time").unwrap());

    let doc = Html::parse_document(body);
    let list = doc
        .select(list_sel)
        .next()
        .ok_or(FetchError::MissingElement("contest list"))?;
    let item = list
        .select(item_sel)
        .nth(index)
        .ok_or(FetchError::MissingElement("contest entry"))?;
    let name = item
        .select(anchor_sel)
        .next()
        .map(element_text)
        .filter(|name| !name.is_empty())
        .ok_or(FetchError::MissingElement("contest name"))?;
    let countdown = item
        .select(time_sel)
        .next()
        .map(element_text)
        .ok_or(FetchError::MissingElement("contest countdown"))?;

    Ok(ContestRecord {
        name,
        start_time: None,
        countdown: Countdown::Rendered(countdown),
    })
}

fn parse_search_uid(body: &str) -> FetchResult<String> {
    let table_sel = TABLE.get_or_init(|| Selector::parse("table").unwrap());
    let row_sel = ROW.get_or_init(|| Selector::parse("tr").unwrap());
    let cell_sel = CELL.get_or_init(|| Selector::parse("td").unwrap());
    let anchor_sel = ANCHOR.get_or_init(|| Selector::parse("a").unwrap());

    let doc = Html::parse_document(body);
    // No results table means the search came up empty, which the site does
    // for unknown names and for accounts outside the six-month window.
    let table = doc
        .select(table_sel)
        .next()
        .ok_or(FetchError::RateLookupUnavailable)?;
    let row = table
        .select(row_sel)
        .nth(1)
        .ok_or(FetchError::MissingElement("search result row"))?;
    let cell = row
        .select(cell_sel)
        .nth(1)
        .ok_or(FetchError::MissingElement("search result cell"))?;
    let href = cell
        .select(anchor_sel)
        .next()
        .and_then(|a| a.value().attr("href"))
        .ok_or(FetchError::MissingElement("profile link"))?;

    let uid = href.rsplit('/').next().unwrap_or_default().to_string();
    if uid.is_empty() {
        return Err(FetchError::MissingElement("profile id"));
    }
    Ok(uid)
}

fn parse_profile_stats(body: &str, handle: &str) -> FetchResult<ProfileRecord> {
    let main_sel = STATE_MAIN.get_or_init(|| Selector::parse(".my-state-main").unwrap());
    let item_sel = STATE_ITEM.get_or_init(|| Selector::parse(".my-state-item").unwrap());
    let div_sel = DIV.get_or_init(|| Selector::parse("div").unwrap());

    let doc = Html::parse_document(body);
    let block = doc
        .select(main_sel)
        .next()
        .ok_or(FetchError::MissingElement("statistics block"))?;
    let items: Vec<_> = block.select(item_sel).collect();

    // Four fixed-position counters: rating, standing, rated and unrated
    // contest counts. Each shows its figure in the first nested div.
    let figure = |index: usize, what: &'static str| -> FetchResult<String> {
        items
            .get(index)
            .and_then(|item| item.select(div_sel).next())
            .map(element_text)
            .ok_or(FetchError::MissingElement(what))
    };

    let rating = parse_stat(&figure(0, "rating figure")?, "rating figure")?;
    let rank = figure(1, "rank figure")?;
    let rated = parse_stat(&figure(2, "rated contest count")?, "rated contest count")?;
    let unrated = parse_stat(&figure(3, "unrated contest count")?, "unrated contest count")?;

    Ok(ProfileRecord {
        handle: handle.to_string(),
        rating: Some(rating),
        rank: Some(rank),
        rated_contests: Some(rated),
        unrated_contests: Some(unrated),
        ..Default::default()
    })
}

fn parse_practice_solved(body: &str) -> FetchResult<i64> {
    let main_sel = STATE_MAIN.get_or_init(|| Selector::parse(".my-state-main").unwrap());
    let item_sel = STATE_ITEM.get_or_init(|| Selector::parse(".my-state-item").unwrap());
    let div_sel = DIV.get_or_init(|| Selector::parse("div").unwrap());

    let doc = Html::parse_document(body);
    let block = doc
        .select(main_sel)
        .next()
        .ok_or(FetchError::MissingElement("practice statistics block"))?;
    let text = block
        .select(item_sel)
        .nth(1)
        .and_then(|item| item.select(div_sel).next())
        .map(element_text)
        .ok_or(FetchError::MissingElement("solved counter"))?;
    parse_stat(&text, "solved counter")
}
