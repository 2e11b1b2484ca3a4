//! Aggregation across judges.
//!
//! Failures never cross between siblings: a judge that errors contributes
//! its failure text under its own header and the others render normally.

use crate::providers::OjClient;

/// Header line for the cross-judge summary.
const NEAREST_HEADER: &str = "Nearest contests:";

/// The nearest contest on every judge, in the order the clients are given
/// (the bot wires Niuke, AtCoder, Codeforces), one labelled section each.
pub async fn nearest_contests(clients: &[&dyn OjClient]) -> String {
    let mut sections = Vec::with_capacity(clients.len());
    for client in clients {
        let report = client.fetch_contest(0).await;
        sections.push(format!("{}:\n{}", client.name(), report));
    }
    format!("{}\n{}", NEAREST_HEADER, sections.join("\n\n"))
}

/// The `count` nearest contests on one judge, fetched one at a time (each
/// request awaited before the next), blank-line separated.
pub async fn recent_contests(client: &dyn OjClient, count: usize) -> String {
    let mut reports = Vec::with_capacity(count);
    for index in 0..count {
        reports.push(client.fetch_contest(index).await);
    }
    reports.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::records::{ContestRecord, Countdown, ProfileRecord};
    use crate::status::{FetchError, FetchResult};

    struct Scripted {
        label: &'static str,
        contests: Vec<ContestRecord>,
        fail_with_http: Option<u16>,
    }

    impl Scripted {
        fn ok(label: &'static str, names: &[&str]) -> Self {
            let contests = names
                .iter()
                .map(|name| ContestRecord {
                    name: (*name).to_string(),
                    start_time: None,
                    countdown: Countdown::Rendered("tomorrow 20:00".to_string()),
                })
                .collect();
            Scripted {
                label,
                contests,
                fail_with_http: None,
            }
        }

        fn failing(label: &'static str, status: u16) -> Self {
            Scripted {
                label,
                contests: Vec::new(),
                fail_with_http: Some(status),
            }
        }
    }

    #[async_trait]
    impl OjClient for Scripted {
        fn name(&self) -> &'static str {
            self.label
        }

        async fn contest(&self, index: usize) -> FetchResult<ContestRecord> {
            if let Some(status) = self.fail_with_http {
                return Err(FetchError::HttpStatus(status));
            }
            self.contests
                .get(index)
                .cloned()
                .ok_or(FetchError::MissingElement("contest entry"))
        }

        async fn profile(&self, _handle: &str) -> FetchResult<ProfileRecord> {
            Err(FetchError::UnknownUser)
        }
    }

    #[tokio::test]
    async fn nearest_keeps_sections_independent() {
        let niuke = Scripted::ok("Niuke", &["牛客周赛 Round 55"]);
        let atcoder = Scripted::failing("Atcoder", 502);
        let codeforces = Scripted::ok("Codeforces", &["Div. 2 Round"]);

        let text = nearest_contests(&[&niuke, &atcoder, &codeforces]).await;

        assert!(text.starts_with("Nearest contests:\n"));
        assert!(text.contains("Niuke:\n牛客周赛 Round 55\ntomorrow 20:00"));
        // The failed judge's section is its failure text, nothing more.
        assert!(text.contains("Atcoder:\nHTTP:502 error"));
        assert!(text.contains("Codeforces:\nDiv. 2 Round"));
    }

    #[tokio::test]
    async fn recent_joins_with_blank_lines() {
        let client = Scripted::ok("Codeforces", &["Round A", "Round B"]);
        let text = recent_contests(&client, 2).await;
        assert_eq!(
            text,
            "Round A\ntomorrow 20:00\n\nRound B\ntomorrow 20:00"
        );
    }

    #[tokio::test]
    async fn recent_past_the_list_degrades_per_entry() {
        let client = Scripted::ok("Codeforces", &["Round A"]);
        let text = recent_contests(&client, 2).await;
        assert!(text.contains("Round A"));
        assert!(text.contains("unexpected page structure: contest entry missing"));
    }

    #[tokio::test]
    async fn profile_boundary_returns_display_text() {
        let client = Scripted::ok("Niuke", &[]);
        assert_eq!(client.fetch_profile("ghost").await, "no such user");
    }
}
