use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::datetime::{self, null_as_default};
use super::{Project, Tag, Task, User};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInterval {
    #[serde(with = "datetime")]
    pub start: DateTime<Utc>,
    #[serde(default, with = "datetime::option")]
    pub end: Option<DateTime<Utc>>,
}

impl TimeInterval {
    pub fn new(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    pub fn is_running(&self) -> bool {
        self.end.is_none()
    }

    /// Elapsed time, measuring running intervals up to `now`.
    pub fn duration_until(&self, now: DateTime<Utc>) -> Duration {
        self.end.unwrap_or(now) - self.start
    }
}

/// A persisted time entry as returned by the non-hydrated endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub workspace_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub project_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub task_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tag_ids: Vec<String>,
    #[serde(default)]
    pub billable: bool,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default)]
    pub invoiced: bool,
    pub time_interval: TimeInterval,
}

impl TimeEntry {
    pub fn new(id: impl Into<String>, time_interval: TimeInterval) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            workspace_id: String::new(),
            user_id: String::new(),
            project_id: String::new(),
            task_id: String::new(),
            tag_ids: vec![],
            billable: false,
            is_locked: false,
            invoiced: false,
            time_interval,
        }
    }
}

/// A time entry with the referenced project, task, tags and user inlined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HydratedTimeEntry {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub workspace_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub billable: bool,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default)]
    pub invoiced: bool,
    pub time_interval: TimeInterval,
    #[serde(default)]
    pub project: Option<Project>,
    #[serde(default)]
    pub task: Option<Task>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub user: Option<User>,
}

impl HydratedTimeEntry {
    /// Zero-length stand-in for a day without entries.
    pub fn placeholder(at: DateTime<Utc>) -> Self {
        Self {
            id: String::new(),
            description: String::new(),
            workspace_id: String::new(),
            user_id: String::new(),
            billable: false,
            is_locked: false,
            invoiced: false,
            time_interval: TimeInterval::new(at, Some(at)),
            project: None,
            task: None,
            tags: vec![],
            user: None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.id.is_empty()
    }

    pub fn project_name(&self) -> &str {
        self.project.as_ref().map(|p| p.name.as_str()).unwrap_or("")
    }

    pub fn client_name(&self) -> &str {
        self.project
            .as_ref()
            .map(|p| p.client_name.as_str())
            .unwrap_or("")
    }

    pub fn task_name(&self) -> &str {
        self.task.as_ref().map(|t| t.name.as_str()).unwrap_or("")
    }
}

impl From<TimeEntry> for HydratedTimeEntry {
    fn from(entry: TimeEntry) -> Self {
        Self {
            id: entry.id,
            description: entry.description,
            workspace_id: entry.workspace_id,
            user_id: entry.user_id,
            billable: entry.billable,
            is_locked: entry.is_locked,
            invoiced: entry.invoiced,
            time_interval: entry.time_interval,
            project: None,
            task: None,
            tags: vec![],
            user: None,
        }
    }
}

/// Body for creating (`POST`) or replacing (`PUT`) a time entry.
///
/// `billable` is left out of the JSON when `None` so the server applies the
/// project's default.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntryPayload {
    #[serde(with = "datetime")]
    pub start: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", with = "datetime::option")]
    pub end: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billable: Option<bool>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    pub tag_ids: Vec<String>,
}

/// Body for `PATCH /workspaces/{ws}/user/{user}/time-entries`.
#[derive(Debug, Clone, Serialize)]
pub struct StopTimeEntry {
    #[serde(with = "datetime")]
    pub end: DateTime<Utc>,
}

/// Body for `PATCH /workspaces/{ws}/time-entries/invoiced`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeInvoiced {
    pub time_entry_ids: Vec<String>,
    pub invoiced: bool,
}
