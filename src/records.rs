use chrono::{DateTime, FixedOffset};

/// Where the relative-time part of a contest report comes from.
///
/// The three judges expose start times in incompatible ways, so the record
/// keeps the raw source and the renderer picks the right arithmetic.
#[derive(Debug, Clone, PartialEq)]
pub enum Countdown {
    /// The page already rendered a relative time ("3天后开始" etc.);
    /// reproduced verbatim.
    Rendered(String),
    /// Signed offset to the start in seconds, as reported by the API.
    /// Negative means the contest already started.
    Relative { seconds: i64 },
    /// Only an absolute start time is available; delta is computed against
    /// the current time at render.
    FromStart,
}

/// One upcoming (or just-finished) contest as fetched from a judge.
#[derive(Debug, Clone, PartialEq)]
pub struct ContestRecord {
    pub name: String,
    /// Absent when the upstream source carries no usable timestamp; the
    /// report then shows a fixed "start time unknown" line.
    pub start_time: Option<DateTime<FixedOffset>>,
    pub countdown: Countdown,
}

/// A user's competitive record on one judge.
///
/// Fields a judge does not supply stay `None` and are left out of the
/// report; fields a judge *can* omit for unrated accounts are defaulted by
/// the provider before the record is built, so `None` never leaks into
/// rendered text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileRecord {
    pub handle: String,
    pub rating: Option<i64>,
    pub peak_rating: Option<i64>,
    /// Niuke: a numeric standing; AtCoder: a numeric rank or "NaN";
    /// Codeforces: a category label ("expert", "Unrated", ...)
    pub rank: Option<String>,
    /// Codeforces only: best category label ever held.
    pub peak_rank: Option<String>,
    pub rated_contests: Option<i64>,
    /// Niuke only.
    pub unrated_contests: Option<i64>,
    /// Niuke only: accepted-problem count.
    pub solved: Option<i64>,
    /// Set by the provider from its own rating cutoff; adds a remark line.
    pub elite: bool,
}
