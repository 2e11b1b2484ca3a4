//! Chat-bot backend for competitive-programming queries.
//!
//! Fetches contest schedules and user profiles from Niuke, AtCoder and
//! Codeforces, normalizes them into fixed-format text reports, and folds
//! every failure into a display-ready status string. The host chat layer
//! calls [`providers::OjClient::fetch_contest`] /
//! [`providers::OjClient::fetch_profile`] (or the [`summary`] facade) and
//! forwards the returned string to the user unchanged.

pub mod config;
pub mod providers;
pub mod records;
pub mod report;
pub mod status;
pub mod summary;

pub use providers::{AtcoderClient, CodeforcesClient, NiukeClient, OjClient};
