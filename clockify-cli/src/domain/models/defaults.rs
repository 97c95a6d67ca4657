use serde::Deserialize;

use super::{Billable, Draft};

/// Last used values the `in` command starts from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct EntryDefaults {
    pub workspace: Option<String>,
    pub project: Option<String>,
    pub task: Option<String>,
    pub tags: Vec<String>,
    pub billable: Option<bool>,
}

impl EntryDefaults {
    pub fn seed(&self, draft: Draft) -> Draft {
        let mut draft = draft;
        if let Some(project) = &self.project {
            draft = draft.with_project(project.as_str());
            if let Some(task) = &self.task {
                draft = draft.with_task(task.as_str());
            }
        }
        if !self.tags.is_empty() {
            draft = draft.with_tags(self.tags.iter().map(String::as_str));
        }
        draft.with_billable(Billable::from(self.billable))
    }
}
