//! Rendering of fetched records into the fixed-format chat reports.
//!
//! Everything here is pure: the providers hand over fully-populated records
//! and the functions below only format. Labels and placeholder text are
//! constants so the report wording lives in one place.

use chrono::{DateTime, Duration, FixedOffset, Timelike};

use crate::records::{ContestRecord, Countdown, ProfileRecord};

/// Remark appended for accounts above a judge's elite rating cutoff.
pub const ELITE_REMARK: &str = "An elite competitor!";

/// Shown in place of a countdown when the source carried no usable time.
pub const UNKNOWN_START: &str = "start time unknown";

const LABEL_HANDLE: &str = "Handle";
const LABEL_RATING: &str = "Rating";
const LABEL_PEAK_RATING: &str = "Peak rating";
const LABEL_RANK: &str = "Rank";
const LABEL_PEAK_RANK: &str = "Peak rank";
const LABEL_CONTESTS: &str = "Contests entered";
const LABEL_SOLVED: &str = "Problems solved";

/// Render the shared "today / N days later  HH:MM" phrase.
///
/// The day part comes from the number of complete days in `delta` (at most
/// one complete day reads as "today"), the clock digits from the target's
/// own wall time. Pure in `(delta, target)`, so re-formatting the same pair
/// always yields the same text.
pub fn countdown_phrase(delta: Duration, target: DateTime<FixedOffset>) -> String {
    let days = delta.num_days();
    let day_part = if days <= 1 {
        "today".to_string()
    } else {
        format!("{} days later", days - 1)
    };
    format!("{}     {:02}:{:02}", day_part, target.hour(), target.minute())
}

/// Format a contest record as the two-line name + countdown report.
pub fn contest_report(record: &ContestRecord, now: DateTime<FixedOffset>) -> String {
    let when = match (&record.countdown, record.start_time) {
        (Countdown::Rendered(text), _) => text.clone(),
        (Countdown::Relative { seconds }, Some(start)) => {
            countdown_phrase(Duration::seconds(seconds.abs()), start)
        }
        (Countdown::FromStart, Some(start)) => {
            countdown_phrase(start.signed_duration_since(now), start)
        }
        (_, None) => UNKNOWN_START.to_string(),
    };
    format!("{}\n{}", record.name, when)
}

/// Format a profile record under the judge's header line.
///
/// Only fields the provider filled in appear; providers default the fields
/// their judge can omit, so every documented line is present per judge.
pub fn profile_report(provider: &str, record: &ProfileRecord) -> String {
    let mut lines = vec![format!("{provider} profile:")];
    lines.push(format!("{LABEL_HANDLE}: {}", record.handle));
    if let Some(rating) = record.rating {
        lines.push(format!("{LABEL_RATING}: {rating}"));
    }
    if let Some(peak) = record.peak_rating {
        lines.push(format!("{LABEL_PEAK_RATING}: {peak}"));
    }
    if let Some(rank) = &record.rank {
        lines.push(format!("{LABEL_RANK}: {rank}"));
    }
    if let Some(peak_rank) = &record.peak_rank {
        lines.push(format!("{LABEL_PEAK_RANK}: {peak_rank}"));
    }
    match (record.rated_contests, record.unrated_contests) {
        (Some(rated), Some(unrated)) => {
            lines.push(format!("{LABEL_CONTESTS}: {rated} rated, {unrated} unrated"));
        }
        (Some(rated), None) => lines.push(format!("{LABEL_CONTESTS}: {rated} rated")),
        _ => {}
    }
    if let Some(solved) = record.solved {
        lines.push(format!("{LABEL_SOLVED}: {solved}"));
    }
    if record.elite {
        lines.push(ELITE_REMARK.to_string());
    }
    lines.join("\n")
}
