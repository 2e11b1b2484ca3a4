//! Failure classification for provider calls.
//!
//! Every way a fetch can go wrong maps onto one `FetchError` variant, and
//! the variant's `Display` text *is* the message the chat layer shows the
//! user. Nothing upstream of the provider boundary ever sees an error value.

use thiserror::Error;

/// Result of a single extraction step inside a provider call.
pub type FetchResult<T> = Result<T, FetchError>;

/// Which half of the Codeforces credential pair was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    Key,
    Secret,
}

impl CredentialKind {
    fn as_str(self) -> &'static str {
        match self {
            CredentialKind::Key => "key",
            CredentialKind::Secret => "secret",
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure (DNS, connect, timeout), stringified.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Upstream answered with a non-200 status.
    #[error("HTTP:{0} error")]
    HttpStatus(u16),

    /// An expected node was absent from the fetched page.
    #[error("unexpected page structure: {0} missing")]
    MissingElement(&'static str),

    /// An API body that should have been a known payload was not.
    #[error("malformed API response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Upstream explicitly reported that no such handle exists.
    #[error("no such user")]
    UnknownUser,

    /// The configured API credential pair was rejected.
    #[error("the configured API {} is incorrect", .0.as_str())]
    Credential(CredentialKind),

    /// Niuke's rating search only surfaces accounts with a rated contest in
    /// the trailing six months, so a miss is ambiguous.
    #[error(
        "no such user or not recently active: Niuke only lists accounts \
         that entered a rated contest within the last six months"
    )]
    RateLookupUnavailable,

    /// The Codeforces contest list held nothing ahead of the finished
    /// block, or the requested index walked past it.
    #[error("no upcoming contest found")]
    NoUpcomingContest,

    /// Any other upstream API error; the comment passes through verbatim.
    #[error("{0}")]
    Api(String),
}

/// Map a Codeforces API failure comment onto a status.
///
/// The API is the sole source of these strings, so classification is by
/// exact match; anything unrecognized is surfaced verbatim.
pub fn classify_comment(comment: &str, handle: &str) -> FetchError {
    if comment == "apiKey: Incorrect signature" {
        FetchError::Credential(CredentialKind::Secret)
    } else if comment == "apiKey: Incorrect API key" {
        FetchError::Credential(CredentialKind::Key)
    } else if comment == format!("handles: User with handle {handle} not found") {
        FetchError::UnknownUser
    } else {
        FetchError::Api(comment.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_text_contains_code() {
        assert_eq!(FetchError::HttpStatus(404).to_string(), "HTTP:404 error");
        assert_eq!(FetchError::HttpStatus(503).to_string(), "HTTP:503 error");
    }

    #[test]
    fn classify_bad_secret() {
        let err = classify_comment("apiKey: Incorrect signature", "tourist");
        assert!(matches!(err, FetchError::Credential(CredentialKind::Secret)));
        assert_eq!(err.to_string(), "the configured API secret is incorrect");
    }

    #[test]
    fn classify_bad_key() {
        let err = classify_comment("apiKey: Incorrect API key", "tourist");
        assert!(matches!(err, FetchError::Credential(CredentialKind::Key)));
        assert_eq!(err.to_string(), "the configured API key is incorrect");
    }

    #[test]
    fn classify_unknown_user_is_exact_per_handle() {
        let err = classify_comment("handles: User with handle ghost42 not found", "ghost42");
        assert!(matches!(err, FetchError::UnknownUser));

        // Same comment for a different handle is not ours to rewrite.
        let err = classify_comment("handles: User with handle ghost42 not found", "someone");
        assert!(matches!(err, FetchError::Api(_)));
    }

    #[test]
    fn classify_passes_unknown_comments_through() {
        let err = classify_comment("contestId: Contest with id 9999 not found", "x");
        assert_eq!(
            err.to_string(),
            "contestId: Contest with id 9999 not found"
        );
    }

    #[test]
    fn rate_lookup_text_names_the_six_month_window() {
        let text = FetchError::RateLookupUnavailable.to_string();
        assert!(text.contains("no such user or not recently active"));
        assert!(text.contains("six months"));
    }
}
