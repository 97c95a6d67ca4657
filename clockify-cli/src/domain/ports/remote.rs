use async_trait::async_trait;
use chrono::{DateTime, Utc};
use clockify::{
    Client, HydratedTimeEntry, Paging, Project, Tag, Task, TimeEntry, TimeEntryFilter,
    TimeEntryPayload, User, Workspace,
};
use itertools::Itertools;

use crate::domain::CliError;

/// Page size used when collecting recent descriptions.
const RECENT_DESCRIPTIONS_PAGE: u32 = 200;

/// Outbound port for the time tracking service.
///
/// Every command talks to Clockify through this trait so the command logic
/// can run against an in-memory double.
#[async_trait]
pub trait ClockifyPort: Send + Sync {
    /// Profile of the token owner.
    async fn get_me(&self) -> Result<User, CliError>;

    async fn get_workspaces(&self) -> Result<Vec<Workspace>, CliError>;

    /// Workspace including the settings the validator enforces.
    async fn get_workspace(&self, workspace_id: &str) -> Result<Workspace, CliError>;

    async fn get_clients(
        &self,
        workspace_id: &str,
        archived: Option<bool>,
    ) -> Result<Vec<Client>, CliError>;

    async fn add_client(&self, workspace_id: &str, name: &str) -> Result<Client, CliError>;

    async fn get_projects(
        &self,
        workspace_id: &str,
        archived: Option<bool>,
    ) -> Result<Vec<Project>, CliError>;

    async fn get_project(&self, workspace_id: &str, project_id: &str)
        -> Result<Project, CliError>;

    async fn get_tasks(
        &self,
        workspace_id: &str,
        project_id: &str,
        active_only: bool,
    ) -> Result<Vec<Task>, CliError>;

    async fn get_tags(&self, workspace_id: &str, archived: Option<bool>)
        -> Result<Vec<Tag>, CliError>;

    // ========================================================================
    // Time entries
    // ========================================================================

    /// Entries of a user, newest first.
    async fn list_time_entries(
        &self,
        workspace_id: &str,
        user_id: &str,
        filter: &TimeEntryFilter,
    ) -> Result<Vec<TimeEntry>, CliError>;

    async fn list_hydrated_time_entries(
        &self,
        workspace_id: &str,
        user_id: &str,
        filter: &TimeEntryFilter,
    ) -> Result<Vec<HydratedTimeEntry>, CliError>;

    async fn get_time_entry(&self, workspace_id: &str, id: &str) -> Result<TimeEntry, CliError>;

    async fn get_hydrated_time_entry(
        &self,
        workspace_id: &str,
        id: &str,
    ) -> Result<HydratedTimeEntry, CliError>;

    async fn create_time_entry(
        &self,
        workspace_id: &str,
        payload: &TimeEntryPayload,
    ) -> Result<TimeEntry, CliError>;

    async fn update_time_entry(
        &self,
        workspace_id: &str,
        id: &str,
        payload: &TimeEntryPayload,
    ) -> Result<TimeEntry, CliError>;

    async fn delete_time_entry(&self, workspace_id: &str, id: &str) -> Result<(), CliError>;

    /// Ends the user's running entry at `end`.
    async fn stop_running(
        &self,
        workspace_id: &str,
        user_id: &str,
        end: DateTime<Utc>,
    ) -> Result<TimeEntry, CliError>;

    async fn change_invoiced(
        &self,
        workspace_id: &str,
        ids: &[String],
        invoiced: bool,
    ) -> Result<(), CliError>;

    /// Distinct non-empty descriptions used since `since`, most recent first.
    async fn recent_descriptions(
        &self,
        workspace_id: &str,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<String>, CliError> {
        let filter = TimeEntryFilter::new()
            .since(since)
            .with_paging(Paging::single(1, RECENT_DESCRIPTIONS_PAGE));
        let entries = self.list_time_entries(workspace_id, user_id, &filter).await?;
        Ok(entries
            .into_iter()
            .map(|e| e.description.trim().to_string())
            .filter(|d| !d.is_empty())
            .unique()
            .collect())
    }
}
