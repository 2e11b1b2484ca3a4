//! Codeforces client, backed by the official JSON API.
//!
//! Every call is signed with the injected key/secret pair. The API reports
//! its own failures inside a JSON envelope (frequently under a 4xx HTTP
//! status), so the envelope is decoded first and its comment classified;
//! the bare status code is only the fallback for non-API responses.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use sha2::{Digest, Sha512};
use tracing::debug;

use super::{build_http, OjClient};
use crate::records::{ContestRecord, Countdown, ProfileRecord};
use crate::status::{classify_comment, FetchError, FetchResult};

/// Rating cutoff for the elite remark. Codeforces ratings run higher than
/// AtCoder's, hence the higher bar.
const ELITE_RATING: i64 = 2600;

/// Placeholder for rank fields the API omits on unrated accounts.
const UNRATED_RANK: &str = "Unrated";

/// The key/secret pair issued by Codeforces for API access.
#[derive(Debug, Clone)]
pub struct ApiCredentials {
    pub key: String,
    pub secret: String,
}

pub struct CodeforcesClient {
    http: reqwest::Client,
    base_url: String,
    credentials: ApiCredentials,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    status: String,
    comment: Option<String>,
    result: Option<T>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum Phase {
    Before,
    Coding,
    PendingSystemTest,
    SystemTest,
    Finished,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiContest {
    name: String,
    phase: Phase,
    start_time_seconds: Option<i64>,
    relative_time_seconds: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiUser {
    handle: String,
    rating: Option<i64>,
    max_rating: Option<i64>,
    rank: Option<String>,
    max_rank: Option<String>,
}

impl CodeforcesClient {
    pub fn new(
        base_url: &str,
        credentials: ApiCredentials,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        Ok(CodeforcesClient {
            http: build_http(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    /// Append `apiKey`/`time` and the `apiSig` the API expects: a six-digit
    /// nonce followed by SHA-512 of `nonce/method?sorted-query#secret`.
    fn signed_query(&self, method: &str, mut params: Vec<(String, String)>) -> Vec<(String, String)> {
        params.push(("apiKey".to_string(), self.credentials.key.clone()));
        params.push((
            "time".to_string(),
            chrono::Utc::now().timestamp().to_string(),
        ));
        params.sort();

        let query = params
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&");
        let nonce: u32 = rand::thread_rng().gen_range(100_000..1_000_000);
        let digest = Sha512::digest(format!(
            "{nonce}/{method}?{query}#{secret}",
            secret = self.credentials.secret
        ));
        params.push(("apiSig".to_string(), format!("{nonce}{digest:x}")));
        params
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<(String, String)>,
        handle: &str,
    ) -> FetchResult<T> {
        let url = format!("{}/{}", self.base_url, method);
        let query = self.signed_query(method, params);
        let resp = self.http.get(&url).query(&query).send().await?;
        debug!("GET {}", resp.url());
        let http_status = resp.status().as_u16();
        let body = resp.text().await?;

        let envelope: ApiResponse<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(_) if http_status != 200 => return Err(FetchError::HttpStatus(http_status)),
            Err(err) => return Err(FetchError::Decode(err)),
        };
        if envelope.status == "OK" {
            envelope
                .result
                .ok_or(FetchError::MissingElement("API result payload"))
        } else {
            Err(classify_comment(
                envelope.comment.as_deref().unwrap_or(""),
                handle,
            ))
        }
    }
}

#[async_trait]
impl OjClient for CodeforcesClient {
    fn name(&self) -> &'static str {
        "Codeforces"
    }

    async fn contest(&self, index: usize) -> FetchResult<ContestRecord> {
        let contests: Vec<ApiContest> = self.call("contest.list", Vec::new(), "").await?;
        let target = scan_boundary(&contests, index)?;
        Ok(contest_record(target))
    }

    async fn profile(&self, handle: &str) -> FetchResult<ProfileRecord> {
        let params = vec![("handles".to_string(), handle.to_string())];
        let users: Vec<ApiUser> = self.call("user.info", params, handle).await?;
        let user = users.into_iter().next().ok_or(FetchError::UnknownUser)?;
        Ok(profile_record(user))
    }
}

/// Locate the target entry relative to the finished-contest boundary.
///
/// The list leads with the non-FINISHED block (upcoming and running), then
/// the FINISHED block. `index = 0` is the non-finished entry right at the
/// boundary; each increment moves one position back through the list. A
/// list with no non-finished lead, or a walk past the front, fails closed.
fn scan_boundary(contests: &[ApiContest], index: usize) -> FetchResult<&ApiContest> {
    let boundary = match contests.iter().position(|c| c.phase == Phase::Finished) {
        Some(0) => return Err(FetchError::NoUpcomingContest),
        Some(first_finished) => first_finished - 1,
        None => contests.len().checked_sub(1).ok_or(FetchError::NoUpcomingContest)?,
    };
    boundary
        .checked_sub(index)
        .and_then(|i| contests.get(i))
        .ok_or(FetchError::NoUpcomingContest)
}

fn contest_record(contest: &ApiContest) -> ContestRecord {
    let start_time = contest
        .start_time_seconds
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|utc| utc.with_timezone(&Local).fixed_offset());
    let countdown = match (start_time, contest.relative_time_seconds) {
        (Some(_), Some(seconds)) => Countdown::Relative { seconds },
        _ => Countdown::FromStart,
    };
    ContestRecord {
        name: sanitize_contest_name(&contest.name),
        start_time,
        countdown,
    }
}

fn profile_record(user: ApiUser) -> ProfileRecord {
    let rating = user.rating.unwrap_or(0);
    ProfileRecord {
        handle: user.handle,
        rating: Some(rating),
        peak_rating: Some(user.max_rating.unwrap_or(0)),
        rank: Some(user.rank.unwrap_or_else(|| UNRATED_RANK.to_string())),
        peak_rank: Some(user.max_rank.unwrap_or_else(|| UNRATED_RANK.to_string())),
        elite: rating >= ELITE_RATING,
        ..Default::default()
    }
}

/// Insert a space after any `.` directly followed by a non-space, so names
/// like "Div.2" don't read as URLs to the downstream chat client.
fn sanitize_contest_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut chars = name.chars().peekable();
    while let Some(ch) = chars.next() {
        out.push(ch);
        if ch == '.' {
            if let Some(&next) = chars.peek() {
                if next != ' ' {
                    out.push(' ');
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contest(name: &str, phase: Phase) -> ApiContest {
        ApiContest {
            name: name.to_string(),
            phase,
            start_time_seconds: Some(1_723_294_800),
            relative_time_seconds: Some(-86_400),
        }
    }

    #[test]
    fn sanitize_inserts_space_after_tight_period() {
        assert_eq!(sanitize_contest_name("Div.2 Round"), "Div. 2 Round");
        assert_eq!(
            sanitize_contest_name("Codeforces Round 900 (Div.2)"),
            "Codeforces Round 900 (Div. 2)"
        );
    }

    #[test]
    fn sanitize_leaves_spaced_and_trailing_periods_alone() {
        assert_eq!(
            sanitize_contest_name("Already Spaced. Fine"),
            "Already Spaced. Fine"
        );
        assert_eq!(sanitize_contest_name("Ends with dot."), "Ends with dot.");
    }

    #[test]
    fn boundary_scan_walks_back_from_the_finished_block() {
        let list = vec![
            contest("far future", Phase::Before),
            contest("near future", Phase::Before),
            contest("running now", Phase::Coding),
            contest("last week", Phase::Finished),
            contest("last month", Phase::Finished),
        ];
        assert_eq!(scan_boundary(&list, 0).unwrap().name, "running now");
        assert_eq!(scan_boundary(&list, 1).unwrap().name, "near future");
        assert_eq!(scan_boundary(&list, 2).unwrap().name, "far future");
        assert!(matches!(
            scan_boundary(&list, 3),
            Err(FetchError::NoUpcomingContest)
        ));
    }

    #[test]
    fn boundary_scan_fails_closed_on_quiet_periods() {
        let all_finished = vec![
            contest("a", Phase::Finished),
            contest("b", Phase::Finished),
        ];
        assert!(matches!(
            scan_boundary(&all_finished, 0),
            Err(FetchError::NoUpcomingContest)
        ));
        assert!(matches!(
            scan_boundary(&[], 0),
            Err(FetchError::NoUpcomingContest)
        ));
    }

    #[test]
    fn boundary_scan_without_finished_block_uses_the_tail() {
        let list = vec![
            contest("later", Phase::Before),
            contest("sooner", Phase::Before),
        ];
        assert_eq!(scan_boundary(&list, 0).unwrap().name, "sooner");
    }

    #[test]
    fn phase_parses_api_tags() {
        let parsed: ApiContest = serde_json::from_str(
            r#"{"name":"Round","phase":"PENDING_SYSTEM_TEST"}"#,
        )
        .unwrap();
        assert_eq!(parsed.phase, Phase::PendingSystemTest);

        let parsed: ApiContest =
            serde_json::from_str(r#"{"name":"Round","phase":"SOMETHING_NEW"}"#).unwrap();
        assert_eq!(parsed.phase, Phase::Unknown);
    }

    #[test]
    fn contest_record_keeps_relative_offset() {
        let record = contest_record(&contest("Div.1 Round", Phase::Coding));
        assert_eq!(record.name, "Div. 1 Round");
        assert!(record.start_time.is_some());
        assert_eq!(record.countdown, Countdown::Relative { seconds: -86_400 });
    }

    #[test]
    fn contest_record_without_timestamps() {
        let bare = ApiContest {
            name: "TBA Round".to_string(),
            phase: Phase::Before,
            start_time_seconds: None,
            relative_time_seconds: None,
        };
        let record = contest_record(&bare);
        assert_eq!(record.start_time, None);
        assert_eq!(record.countdown, Countdown::FromStart);
    }

    #[test]
    fn unrated_user_defaults() {
        let user: ApiUser = serde_json::from_str(r#"{"handle":"newcomer"}"#).unwrap();
        let record = profile_record(user);
        assert_eq!(record.rating, Some(0));
        assert_eq!(record.peak_rating, Some(0));
        assert_eq!(record.rank, Some(UNRATED_RANK.into()));
        assert_eq!(record.peak_rank, Some(UNRATED_RANK.into()));
        assert!(!record.elite);
    }

    #[test]
    fn elite_cutoff_is_twenty_six_hundred() {
        let user: ApiUser = serde_json::from_str(
            r#"{"handle":"tourist","rating":3700,"maxRating":4000,
                "rank":"legendary grandmaster","maxRank":"legendary grandmaster"}"#,
        )
        .unwrap();
        assert!(profile_record(user).elite);

        let user: ApiUser =
            serde_json::from_str(r#"{"handle":"strong","rating":2599}"#).unwrap();
        assert!(!profile_record(user).elite);
    }

    #[test]
    fn failed_envelope_carries_the_comment() {
        let envelope: ApiResponse<Vec<ApiUser>> = serde_json::from_str(
            r#"{"status":"FAILED","comment":"apiKey: Incorrect API key"}"#,
        )
        .unwrap();
        assert_eq!(envelope.status, "FAILED");
        assert_eq!(envelope.comment.as_deref(), Some("apiKey: Incorrect API key"));
        assert!(envelope.result.is_none());
    }

    #[test]
    fn signed_query_shape() {
        let client = CodeforcesClient::new(
            "https://codeforces.com/api",
            ApiCredentials {
                key: "k".to_string(),
                secret: "s".to_string(),
            },
            Duration::from_secs(5),
        )
        .unwrap();
        let query = client.signed_query("user.info", vec![(
            "handles".to_string(),
            "tourist".to_string(),
        )]);

        let keys: Vec<&str> = query.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["apiKey", "handles", "time", "apiSig"]);

        let (_, sig) = query.last().unwrap();
        // Six-digit nonce followed by a 128-hex-char SHA-512.
        assert_eq!(sig.len(), 6 + 128);
        assert!(sig[..6].chars().all(|c| c.is_ascii_digit()));
    }
}
