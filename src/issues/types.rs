//! Type definitions for tracker issues.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

use crate::{HeraldError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueState {
    Open,
    Closed,
    Other(String),
}

impl From<&str> for IssueState {
    fn from(state: &str) -> Self {
        match state {
            "open" => IssueState::Open,
            "closed" => IssueState::Closed,
            other => IssueState::Other(other.to_string()),
        }
    }
}

impl fmt::Display for IssueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueState::Open => write!(f, "open"),
            IssueState::Closed => write!(f, "closed"),
            IssueState::Other(state) => write!(f, "{}", state),
        }
    }
}

/// Reaction counts as reported by the tracker.
#[derive(Debug, Clone, PartialEq)]
pub enum ReactionSummary {
    /// The tracker already summed the reactions for us.
    Precomputed(u64),
    /// Per-kind counts. Values that are not non-negative integers are ignored.
    Raw(BTreeMap<String, Value>),
}

impl Default for ReactionSummary {
    fn default() -> Self {
        ReactionSummary::Raw(BTreeMap::new())
    }
}

impl ReactionSummary {
    /// Builds a summary from whatever the tracker sent in its `reactions` field.
    pub fn from_json(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Object(map)) => Self::from_map(map),
            _ => ReactionSummary::default(),
        }
    }

    fn from_map(map: &Map<String, Value>) -> Self {
        if let Some(total) = map.get("total_count").and_then(Value::as_u64) {
            return ReactionSummary::Precomputed(total);
        }
        ReactionSummary::Raw(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    pub fn total(&self) -> u64 {
        match self {
            ReactionSummary::Precomputed(total) => *total,
            ReactionSummary::Raw(counts) => counts
                .values()
                .filter_map(Value::as_u64)
                .fold(0u64, u64::saturating_add),
        }
    }
}

/// A single issue from the tracker, normalized for scoring and reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscussionItem {
    pub number: u64,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub state: IssueState,
    pub comments: u64,
    pub reactions: ReactionSummary,
    pub labels: Vec<String>,
    pub html_url: String,
    pub body: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLabel {
    name: String,
}

/// Issue as returned by the GitHub REST API.
#[derive(Debug, Deserialize)]
pub struct RawIssue {
    number: u64,
    title: String,
    created_at: String,
    state: String,
    #[serde(default)]
    comments: u64,
    #[serde(default)]
    reactions: Option<Value>,
    #[serde(default)]
    labels: Vec<RawLabel>,
    html_url: String,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    pull_request: Option<Value>,
}

impl RawIssue {
    /// GitHub lists pull requests alongside issues.
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }
}

impl TryFrom<RawIssue> for DiscussionItem {
    type Error = HeraldError;

    fn try_from(raw: RawIssue) -> Result<Self> {
        let created_at = DateTime::parse_from_rfc3339(&raw.created_at)
            .map_err(|e| {
                HeraldError::Fetch(format!(
                    "issue #{} has invalid created_at {:?}: {}",
                    raw.number, raw.created_at, e
                ))
            })?
            .with_timezone(&Utc);

        let mut labels: Vec<String> = Vec::with_capacity(raw.labels.len());
        for label in raw.labels {
            if !labels.contains(&label.name) {
                labels.push(label.name);
            }
        }

        Ok(DiscussionItem {
            number: raw.number,
            title: raw.title,
            created_at,
            state: IssueState::from(raw.state.as_str()),
            comments: raw.comments,
            reactions: ReactionSummary::from_json(raw.reactions.as_ref()),
            labels,
            html_url: raw.html_url,
            body: raw.body.filter(|b| !b.trim().is_empty()),
        })
    }
}
