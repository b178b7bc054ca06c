//! Aggregate engagement and cadence statistics over a batch of posts.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::posts::{Post, PostKind};

/// Date-time layouts with a UTC offset that RFC 3339 parsing rejects.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Tally of recognized post formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostMix {
    pub reel: usize,
    pub photo: usize,
    pub carousel: usize,
}

impl PostMix {
    fn record(&mut self, kind: PostKind) {
        match kind {
            PostKind::Reel => self.reel += 1,
            PostKind::Photo => self.photo += 1,
            PostKind::Carousel => self.carousel += 1,
        }
    }

    /// Number of posts that landed in any bucket.
    #[must_use]
    pub fn total(&self) -> usize {
        self.reel + self.photo + self.carousel
    }
}

/// Derived statistics for one request. Field names are serialized verbatim
/// into the prompt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub n: usize,
    pub mix: PostMix,
    pub avg_caption_len: f64,
    pub avg_hashtag_cnt: f64,
    pub avg_duration_sec: f64,
    /// Mean of `(likes + comments) / max(1, followers)`.
    pub avg_er: f64,
    /// Mean of `views / max(1, followers)`.
    pub avg_vtr: f64,
    /// Mean whole-day gap between consecutive valid post dates.
    pub avg_gap_days: f64,
}

/// Reduces `posts` into a [`MetricsSummary`].
///
/// Averages run over every post, including those with unknown types. A
/// follower count of zero is treated as one so the rates stay finite.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn summarize(posts: &[Post], followers: u64) -> MetricsSummary {
    let n = posts.len();
    if n == 0 {
        return MetricsSummary::default();
    }

    let mut mix = PostMix::default();
    for kind in posts.iter().filter_map(Post::kind) {
        mix.record(kind);
    }

    let followers = followers.max(1) as f64;

    MetricsSummary {
        n,
        mix,
        avg_caption_len: mean(posts, |p| p.caption().chars().count() as f64),
        avg_hashtag_cnt: mean(posts, |p| p.hashtags().len() as f64),
        avg_duration_sec: mean(posts, |p| p.duration_sec() as f64),
        avg_er: mean(posts, |p| p.interactions() as f64 / followers),
        avg_vtr: mean(posts, |p| p.views() as f64 / followers),
        avg_gap_days: average_gap_days(posts),
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(posts: &[Post], value: impl Fn(&Post) -> f64) -> f64 {
    posts.iter().map(value).sum::<f64>() / posts.len() as f64
}

#[allow(clippy::cast_precision_loss)]
fn average_gap_days(posts: &[Post]) -> f64 {
    let mut dates: Vec<NaiveDate> = posts
        .iter()
        .filter_map(Post::date)
        .filter_map(parse_post_date)
        .collect();

    if dates.len() < 2 {
        return 0.0;
    }

    dates.sort_unstable();
    let gaps: Vec<i64> = dates
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).num_days())
        .collect();

    gaps.iter().sum::<i64>() as f64 / gaps.len() as f64
}

/// Parses an ISO-8601 date or date-time into a calendar date.
///
/// Timestamps with an offset keep the date as written in that offset.
/// Returns `None` for anything unrecognized.
#[must_use]
pub fn parse_post_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
            return Some(dt.date_naive());
        }
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| parse_date_hour(raw))
}

/// `2024-03-05T09`: chrono needs minutes to build a time, so the hour is
/// checked by hand.
fn parse_date_hour(raw: &str) -> Option<NaiveDate> {
    let (date, hour) = raw.split_once(['T', ' '])?;
    let valid_hour = hour.len() == 2 && hour.parse::<u32>().is_ok_and(|h| h < 24);
    if !valid_hour {
        return None;
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

#[cfg(test)]
#[path = "metrics_test.rs"]
mod tests;
