//! Shared types for the activity tracker service and its HTTP clients.
//!
//! Everything here is serialized camelCase, both on the wire and in the
//! collection files under the data directory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

pub type Timestamp = DateTime<Utc>;

/// RFC 3339 timestamps with millisecond precision and a `Z` suffix,
/// e.g. `2026-02-04T18:30:00.000Z`.
pub mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }

    pub mod option {
        use chrono::{DateTime, SecondsFormat, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            ts: &Option<DateTime<Utc>>,
            s: S,
        ) -> Result<S::Ok, S::Error> {
            match ts {
                Some(ts) => s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true)),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(d)? {
                Some(raw) => DateTime::parse_from_rfc3339(&raw)
                    .map(|ts| Some(ts.with_timezone(&Utc)))
                    .map_err(serde::de::Error::custom),
                None => Ok(None),
            }
        }
    }
}

// =====================================================
// Activities
// =====================================================

/// What kind of activity was logged. Unknown categories are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActivityKind {
    Learned,
    Achieved,
    WorkedOn,
    Thought,
    Other(String),
}

impl ActivityKind {
    pub fn as_str(&self) -> &str {
        match self {
            ActivityKind::Learned => "learned",
            ActivityKind::Achieved => "achieved",
            ActivityKind::WorkedOn => "worked_on",
            ActivityKind::Thought => "thought",
            ActivityKind::Other(raw) => raw,
        }
    }
}

impl From<String> for ActivityKind {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "learned" => ActivityKind::Learned,
            "achieved" => ActivityKind::Achieved,
            "worked_on" => ActivityKind::WorkedOn,
            "thought" => ActivityKind::Thought,
            _ => ActivityKind::Other(raw),
        }
    }
}

impl From<&str> for ActivityKind {
    fn from(raw: &str) -> Self {
        ActivityKind::from(raw.to_string())
    }
}

impl From<ActivityKind> for String {
    fn from(kind: ActivityKind) -> Self {
        match kind {
            ActivityKind::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    #[serde(with = "iso_millis")]
    pub timestamp: Timestamp,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityStats {
    /// Every activity ever appended, including ones since evicted.
    pub total_activities: u64,
    #[serde(default, with = "iso_millis::option")]
    pub last_update: Option<Timestamp>,
}

/// Root object of `activities.json`, newest activity first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityCollection {
    pub activities: Vec<Activity>,
    pub stats: ActivityStats,
    /// Root keys this service does not own (e.g. a legacy `identity` block).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// =====================================================
// Blog
// =====================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: String,
    #[serde(with = "iso_millis")]
    pub timestamp: Timestamp,
    pub title: String,
    pub content: String,
    /// Absent only on posts written before excerpts were stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// List form of a post: everything but `content`, excerpt always set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub id: String,
    #[serde(with = "iso_millis")]
    pub timestamp: Timestamp,
    pub title: String,
    pub excerpt: String,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogStats {
    pub total_posts: u64,
    #[serde(default, with = "iso_millis::option")]
    pub last_update: Option<Timestamp>,
}

/// Root object of `blog.json`, newest post first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogCollection {
    pub posts: Vec<BlogPost>,
    pub stats: BlogStats,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// =====================================================
// Todos
// =====================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    #[default]
    Idea,
    InProgress,
    Done,
}

impl TodoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TodoStatus::Idea => "idea",
            TodoStatus::InProgress => "in_progress",
            TodoStatus::Done => "done",
        }
    }
}

impl fmt::Display for TodoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TodoStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idea" => Ok(TodoStatus::Idea),
            "in_progress" => Ok(TodoStatus::InProgress),
            "done" => Ok(TodoStatus::Done),
            other => Err(format!(
                "Unknown status '{}'. Use 'idea', 'in_progress' or 'done'.",
                other
            )),
        }
    }
}

fn unknown_creator() -> String {
    "unknown".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    #[serde(with = "iso_millis")]
    pub created_at: Timestamp,
    #[serde(with = "iso_millis")]
    pub updated_at: Timestamp,
    pub title: String,
    #[serde(default)]
    pub status: TodoStatus,
    #[serde(default)]
    pub description: String,
    #[serde(default = "unknown_creator")]
    pub created_by: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoStats {
    pub total_todos: u64,
    #[serde(default, with = "iso_millis::option")]
    pub last_update: Option<Timestamp>,
}

/// Root object of `todos.json`, newest todo first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoCollection {
    pub todos: Vec<Todo>,
    pub stats: TodoStats,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// =====================================================
// Identity
// =====================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub emoji: String,
    pub tagline: String,
    pub born: String,
    pub human: String,
}

// =====================================================
// Request Types
// =====================================================

// Required fields are Options so a missing one is reported as a
// validation failure with a readable message instead of a decode error.

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CreateActivityRequest {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PublishPostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub tags: Option<Vec<String>>,
    pub image: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoRequest {
    pub title: Option<String>,
    pub status: Option<String>,
    pub description: Option<String>,
    pub created_by: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateTodoRequest {
    pub title: Option<String>,
    pub status: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct BlogListQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TodoListQuery {
    pub status: Option<String>,
}

// =====================================================
// Response Types
// =====================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ActivityCreated {
    pub success: bool,
    pub activity: Activity,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PostPublished {
    pub success: bool,
    pub post: BlogPost,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BlogListing {
    pub posts: Vec<PostSummary>,
    pub stats: BlogStats,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TodoListing {
    pub todos: Vec<Todo>,
    pub stats: TodoStats,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Deleted {
    pub success: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    pub status: String,
    pub uptime_secs: u64,
}
