use chrono::{DateTime, Utc};

use super::{ClockifyFilter, Paging};
use crate::domain::datetime;

/// Filter for `GET /workspaces/{ws}/user/{user}/time-entries`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeEntryFilter {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub project_id: Option<String>,
    pub tag_ids: Vec<String>,
    /// `Some(true)` only running entries, `Some(false)` only finished ones.
    pub in_progress: Option<bool>,
    pub paging: Paging,
}

impl TimeEntryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn between(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    pub fn since(mut self, start: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self
    }

    pub fn in_progress(mut self, in_progress: Option<bool>) -> Self {
        self.in_progress = in_progress;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn with_paging(mut self, paging: Paging) -> Self {
        self.paging = paging;
        self
    }
}

impl ClockifyFilter for TimeEntryFilter {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![];
        if let Some(start) = &self.start {
            pairs.push(("start", datetime::format(start)));
        }
        if let Some(end) = &self.end {
            pairs.push(("end", datetime::format(end)));
        }
        if let Some(description) = &self.description {
            pairs.push(("description", description.clone()));
        }
        if let Some(project_id) = &self.project_id {
            pairs.push(("project", project_id.clone()));
        }
        for tag in &self.tag_ids {
            pairs.push(("tags", tag.clone()));
        }
        if let Some(in_progress) = self.in_progress {
            pairs.push(("in-progress", in_progress.to_string()));
        }
        pairs
    }
}
