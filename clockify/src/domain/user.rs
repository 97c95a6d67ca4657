use serde::{Deserialize, Serialize};

/// The owner of the API token, as returned by `GET /user`.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub active_workspace: String,
    #[serde(default)]
    pub default_workspace: String,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub workspace_settings: WorkspaceSettings,
}

/// Policies the workspace enforces on every time entry.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkspaceSettings {
    pub force_projects: bool,
    pub force_tasks: bool,
    pub force_description: bool,
    pub force_tags: bool,
    pub default_billable_projects: bool,
}
