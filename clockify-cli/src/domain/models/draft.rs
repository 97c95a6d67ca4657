use chrono::{DateTime, Utc};
use clockify::{TimeEntry, TimeEntryPayload};
use itertools::Itertools;

/// Billable flag as the user expressed it.
///
/// `Unset` leaves the field out of the request so the server applies the
/// project's default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Billable {
    #[default]
    Unset,
    Yes,
    No,
}

impl Billable {
    pub fn as_option(self) -> Option<bool> {
        match self {
            Billable::Unset => None,
            Billable::Yes => Some(true),
            Billable::No => Some(false),
        }
    }

    pub fn is_set(self) -> bool {
        self != Billable::Unset
    }
}

impl From<bool> for Billable {
    fn from(value: bool) -> Self {
        if value {
            Billable::Yes
        } else {
            Billable::No
        }
    }
}

impl From<Option<bool>> for Billable {
    fn from(value: Option<bool>) -> Self {
        value.map(Billable::from).unwrap_or_default()
    }
}

/// The time entry being built or edited by a single command.
///
/// Project and task are only reachable through methods so that a project
/// change always drops the task.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub workspace_id: String,
    pub user_id: String,
    /// Empty until the server has assigned one.
    pub id: String,
    project_id: String,
    task_id: String,
    pub description: String,
    tag_ids: Vec<String>,
    pub billable: Billable,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub locked: bool,
    pub invoiced: bool,
}

impl Draft {
    pub fn new(
        workspace_id: impl Into<String>,
        user_id: impl Into<String>,
        start: DateTime<Utc>,
    ) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            user_id: user_id.into(),
            id: String::new(),
            project_id: String::new(),
            task_id: String::new(),
            description: String::new(),
            tag_ids: vec![],
            billable: Billable::Unset,
            start,
            end: None,
            locked: false,
            invoiced: false,
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn tag_ids(&self) -> &[String] {
        &self.tag_ids
    }

    pub fn has_project(&self) -> bool {
        !self.project_id.is_empty()
    }

    /// Sets the project, clearing the task when the project changes.
    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        let project_id = project_id.into();
        if project_id != self.project_id {
            self.task_id.clear();
        }
        self.project_id = project_id;
        self
    }

    /// Replaces a project name with the id it resolved to.
    ///
    /// The task is kept: it still refers to the same project.
    pub fn with_resolved_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = project_id.into();
        self
    }

    pub fn with_task(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = task_id.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Replaces the tag set, keeping the first occurrence of duplicates.
    pub fn with_tags<I, S>(mut self, tag_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tag_ids = tag_ids.into_iter().map(Into::into).unique().collect();
        self
    }

    pub fn with_billable(mut self, billable: Billable) -> Self {
        self.billable = billable;
        self
    }

    pub fn with_start(mut self, start: DateTime<Utc>) -> Self {
        self.start = start;
        self
    }

    pub fn with_end(mut self, end: Option<DateTime<Utc>>) -> Self {
        self.end = end;
        self
    }

    pub fn is_running(&self) -> bool {
        self.end.is_none()
    }

    pub fn to_payload(&self) -> TimeEntryPayload {
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
        TimeEntryPayload {
            start: self.start,
            end: self.end,
            billable: self.billable.as_option(),
            description: self.description.clone(),
            project_id: non_empty(&self.project_id),
            task_id: if self.has_project() {
                non_empty(&self.task_id)
            } else {
                None
            },
            tag_ids: self.tag_ids.clone(),
        }
    }
}

impl From<&TimeEntry> for Draft {
    fn from(entry: &TimeEntry) -> Self {
        Self {
            workspace_id: entry.workspace_id.clone(),
            user_id: entry.user_id.clone(),
            id: entry.id.clone(),
            project_id: entry.project_id.clone(),
            task_id: entry.task_id.clone(),
            description: entry.description.clone(),
            tag_ids: entry.tag_ids.iter().cloned().unique().collect(),
            billable: Billable::from(entry.billable),
            start: entry.time_interval.start,
            end: entry.time_interval.end,
            locked: entry.is_locked,
            invoiced: entry.invoiced,
        }
    }
}
