//! Inbound request types.
//!
//! Both [`Post`] and [`AnalysisRequest`] are deserialized through a raw
//! mirror struct that tolerates missing, null, or mistyped fields. The
//! conversion fills every default once, so downstream code only ever sees
//! fully-populated values.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Post formats that count toward the format mix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostKind {
    Reel,
    Photo,
    Carousel,
}

impl PostKind {
    /// Parses a post type case-insensitively. Unknown types (`"story"`,
    /// `"live"`, ...) return `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_lowercase().as_str() {
            "reel" => Some(Self::Reel),
            "photo" => Some(Self::Photo),
            "carousel" => Some(Self::Carousel),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reel => "reel",
            Self::Photo => "photo",
            Self::Carousel => "carousel",
        }
    }
}

impl std::fmt::Display for PostKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single post as submitted by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawPost")]
pub struct Post {
    id: String,
    /// Lowercased post type. Unrecognized values are kept as-is.
    kind: String,
    date: Option<String>,
    caption: String,
    likes: u64,
    comments: u64,
    views: u64,
    saves: u64,
    reach: u64,
    duration_sec: u64,
    hashtags: Vec<String>,
}

impl Post {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The normalized (lowercase) type string.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.kind
    }

    /// The recognized format of this post, if any.
    #[must_use]
    pub fn kind(&self) -> Option<PostKind> {
        PostKind::parse(&self.kind)
    }

    #[must_use]
    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    #[must_use]
    pub fn caption(&self) -> &str {
        &self.caption
    }

    #[must_use]
    pub fn likes(&self) -> u64 {
        self.likes
    }

    #[must_use]
    pub fn comments(&self) -> u64 {
        self.comments
    }

    #[must_use]
    pub fn views(&self) -> u64 {
        self.views
    }

    #[must_use]
    pub fn saves(&self) -> u64 {
        self.saves
    }

    #[must_use]
    pub fn reach(&self) -> u64 {
        self.reach
    }

    #[must_use]
    pub fn duration_sec(&self) -> u64 {
        self.duration_sec
    }

    #[must_use]
    pub fn hashtags(&self) -> &[String] {
        &self.hashtags
    }

    /// Likes plus comments, saturating.
    #[must_use]
    pub fn interactions(&self) -> u64 {
        self.likes.saturating_add(self.comments)
    }
}

#[derive(Deserialize)]
struct RawPost {
    id: String,
    #[serde(default, rename = "type", deserialize_with = "lenient_text")]
    kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    caption: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    likes: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    comments: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    views: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    saves: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    reach: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    duration_sec: u64,
    #[serde(default, deserialize_with = "lenient_strings")]
    hashtags: Vec<String>,
}

impl From<RawPost> for Post {
    fn from(raw: RawPost) -> Self {
        Self {
            id: raw.id,
            kind: raw
                .kind
                .map_or_else(|| PostKind::Reel.as_str().to_owned(), |k| k.to_lowercase()),
            date: raw.date,
            caption: raw.caption.unwrap_or_default(),
            likes: raw.likes,
            comments: raw.comments,
            views: raw.views,
            saves: raw.saves,
            reach: raw.reach,
            duration_sec: raw.duration_sec,
            hashtags: raw.hashtags,
        }
    }
}

/// Body of `POST /analyze`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawAnalysisRequest")]
pub struct AnalysisRequest {
    account_url: String,
    follower_count: u64,
    goals: Vec<String>,
    posts: Vec<Post>,
}

impl AnalysisRequest {
    #[must_use]
    pub fn account_url(&self) -> &str {
        &self.account_url
    }

    #[must_use]
    pub fn follower_count(&self) -> u64 {
        self.follower_count
    }

    #[must_use]
    pub fn goals(&self) -> &[String] {
        &self.goals
    }

    #[must_use]
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }
}

#[derive(Deserialize)]
struct RawAnalysisRequest {
    account_url: String,
    #[serde(default, deserialize_with = "lenient_count")]
    follower_count: u64,
    #[serde(default, deserialize_with = "lenient_strings")]
    goals: Vec<String>,
    #[serde(default)]
    posts: Option<Vec<Post>>,
}

impl From<RawAnalysisRequest> for AnalysisRequest {
    fn from(raw: RawAnalysisRequest) -> Self {
        Self {
            account_url: raw.account_url,
            follower_count: raw.follower_count,
            goals: raw.goals,
            posts: raw.posts.unwrap_or_default(),
        }
    }
}

/// Coerces any JSON value into a non-negative counter.
///
/// Integers pass through, floats truncate, numeric strings are parsed, and
/// negatives clamp to zero. Everything else is zero.
fn coerce_count(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_i64().map(|_| 0))
            .or_else(|| n.as_f64().map(float_to_count))
            .unwrap_or(0),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(float_to_count))
                .unwrap_or(0)
        }
        _ => 0,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn float_to_count(f: f64) -> u64 {
    if f.is_finite() && f > 0.0 {
        // `as` saturates at u64::MAX.
        f.trunc() as u64
    } else {
        0
    }
}

fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_count(&value))
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}
