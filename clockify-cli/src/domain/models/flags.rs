use chrono::{DateTime, Local};

use super::{Billable, Draft};
use crate::domain::{time_parser, CliError};

/// Entry fields given on the command line. `None` means "not given".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFlags {
    pub project: Option<String>,
    pub task: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub billable: Billable,
    pub when: Option<String>,
    pub when_to_close: Option<String>,
    /// Restricts project name lookup to one client.
    pub client: Option<String>,
    pub allow_incomplete: bool,
}

impl EntryFlags {
    /// Copies every given flag onto the draft, parsing times against now.
    pub fn apply(&self, draft: Draft) -> Result<Draft, CliError> {
        self.apply_at(draft, Local::now())
    }

    pub fn apply_at(&self, mut draft: Draft, reference: DateTime<Local>) -> Result<Draft, CliError> {
        if let Some(project) = &self.project {
            draft = draft.with_project(project.trim());
        }
        if let Some(task) = &self.task {
            draft = draft.with_task(task.trim());
        }
        if let Some(description) = &self.description {
            draft = draft.with_description(description.trim());
        }
        if let Some(tags) = &self.tags {
            draft = draft.with_tags(tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()));
        }
        if self.billable.is_set() {
            draft = draft.with_billable(self.billable);
        }
        if let Some(when) = &self.when {
            draft = draft.with_start(time_parser::parse_time_at(when, reference)?);
        }
        if let Some(when_to_close) = &self.when_to_close {
            draft = draft.with_end(Some(time_parser::parse_time_at(when_to_close, reference)?));
        }
        Ok(draft)
    }

    /// The same flags with `when` and `when-to-close` dropped.
    pub fn without_times(&self) -> Self {
        Self {
            when: None,
            when_to_close: None,
            ..self.clone()
        }
    }
}
