//! Brigade, project and tag entities
//!
//! Two layers live here:
//! - `Raw*` types mirror the backend JSON exactly and are only produced by
//!   the fetch boundary.
//! - `Brigade` / `Project` are the normalized entities the rest of the
//!   crate works with (see [`crate::normalize`]).

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Error;

/// Recency bucket reported by the backend for a project's last push
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityBucket {
    Week,
    Month,
    Year,
    OverAYear,
}

/// User-facing activity threshold ("active within the last ...")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ActivityThreshold {
    #[serde(rename = "week")]
    Week,
    #[serde(rename = "month")]
    Month,
    #[default]
    #[serde(rename = "year")]
    Year,
    #[serde(rename = "all time")]
    AllTime,
}

impl ActivityThreshold {
    /// All thresholds, narrowest first
    pub const ALL: [ActivityThreshold; 4] = [
        ActivityThreshold::Week,
        ActivityThreshold::Month,
        ActivityThreshold::Year,
        ActivityThreshold::AllTime,
    ];

    /// Buckets a project may be in to count as active for this threshold.
    ///
    /// Each threshold's set contains every narrower threshold's set.
    pub fn buckets(&self) -> &'static [ActivityBucket] {
        use ActivityBucket::*;
        match self {
            ActivityThreshold::Week => &[Week],
            ActivityThreshold::Month => &[Week, Month],
            ActivityThreshold::Year => &[Week, Month, Year],
            ActivityThreshold::AllTime => &[Week, Month, Year, OverAYear],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityThreshold::Week => "week",
            ActivityThreshold::Month => "month",
            ActivityThreshold::Year => "year",
            ActivityThreshold::AllTime => "all time",
        }
    }
}

impl fmt::Display for ActivityThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityThreshold {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "week" => Ok(ActivityThreshold::Week),
            "month" => Ok(ActivityThreshold::Month),
            "year" => Ok(ActivityThreshold::Year),
            "all time" | "all_time" | "all" => Ok(ActivityThreshold::AllTime),
            other => Err(Error::InvalidInput(format!(
                "Unknown activity threshold: {}",
                other
            ))),
        }
    }
}

/// Project record as served by `/api/data.json`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RawProject {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub code_url: Option<String>,
    #[serde(default)]
    pub topics: Option<Vec<String>>,
    pub last_pushed_within: ActivityBucket,
}

/// Brigade record as served by `/api/data.json`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RawBrigade {
    pub name: String,
    #[serde(default)]
    pub projects: Vec<RawProject>,
}

/// Back-reference from a project to its owning brigade (name only)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrigadeRef {
    pub name: String,
}

/// Normalized project
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Project {
    pub name: String,
    /// Derived from `name`, never user supplied
    pub slug: String,
    pub description: Option<String>,
    pub code_url: Option<String>,
    pub topics: Option<Vec<String>>,
    pub last_pushed_within: ActivityBucket,
    pub brigade: BrigadeRef,
}

impl Project {
    /// Topics as a slice; absent topics read as none
    pub fn topics(&self) -> &[String] {
        self.topics.as_deref().unwrap_or(&[])
    }

    pub fn has_topics(&self) -> bool {
        !self.topics().is_empty()
    }
}

/// Normalized brigade
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Brigade {
    pub name: String,
    pub projects: Vec<Project>,
    /// Number of projects carrying at least one topic
    pub tagged: usize,
}

/// Envelope of `/api/tags.json`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagsEnvelope {
    #[serde(default)]
    pub tags: Option<Vec<DiscourseTag>>,
}

/// Forum tag record; everything except `id` is opaque
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DiscourseTag {
    pub id: Value,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl DiscourseTag {
    /// Lookup key for the tag id. Numeric and string ids both map to
    /// their plain textual form (`1` and `"1"` share the key `"1"`).
    pub fn key(&self) -> String {
        match &self.id {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Active filter parameters held by the store
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default)]
    pub topics: BTreeSet<String>,
    #[serde(default)]
    pub time_threshold: ActivityThreshold,
    #[serde(default)]
    pub text_query: String,
    /// Brigade names; empty means every brigade
    #[serde(default)]
    pub locations: BTreeSet<String>,
}

/// Partial filter update; `None` leaves the current value in place
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FilterUpdate {
    #[serde(default)]
    pub topics: Option<BTreeSet<String>>,
    #[serde(default)]
    pub time_threshold: Option<ActivityThreshold>,
    #[serde(default)]
    pub text_query: Option<String>,
    #[serde(default)]
    pub locations: Option<BTreeSet<String>>,
}

impl FilterState {
    /// Merge the provided keys of `update` into this state
    pub fn apply(&mut self, update: FilterUpdate) {
        if let Some(topics) = update.topics {
            self.topics = topics;
        }
        if let Some(threshold) = update.time_threshold {
            self.time_threshold = threshold;
        }
        if let Some(query) = update.text_query {
            self.text_query = query;
        }
        if let Some(locations) = update.locations {
            self.locations = locations;
        }
    }
}
