use async_trait::async_trait;
use chrono::{DateTime, Utc};
use clockify::{
    Client, ClientFilter, ClockifyClient, ClockifyError, ClockifyURL, Credentials,
    HydratedTimeEntry, Project,
    ProjectFilter, Tag, TagFilter, Task, TaskFilter, TimeEntry, TimeEntryFilter,
    TimeEntryPayload, User, Workspace,
};

use crate::domain::{ports::ClockifyPort, CliError};

/// Adapter that wraps the Clockify REST client to implement [`ClockifyPort`].
pub struct ClockifyAdapter {
    client: ClockifyClient,
}

impl ClockifyAdapter {
    pub fn new(client: ClockifyClient) -> Self {
        Self { client }
    }

    /// Connects with `token` to the API at `CLOCKIFY_API_URL` or the public one.
    pub fn connect(token: String) -> Result<Self, CliError> {
        let credentials = Credentials::new(token).map_err(|e| CliError::Config(e.to_string()))?;
        ClockifyClient::new(&credentials, ClockifyURL::from_env())
            .map(Self::new)
            .map_err(map_clockify_error)
    }
}

#[async_trait]
impl ClockifyPort for ClockifyAdapter {
    async fn get_me(&self) -> Result<User, CliError> {
        self.client.get_user().await.map_err(map_clockify_error)
    }

    async fn get_workspaces(&self) -> Result<Vec<Workspace>, CliError> {
        self.client.get_workspaces().await.map_err(map_clockify_error)
    }

    async fn get_workspace(&self, workspace_id: &str) -> Result<Workspace, CliError> {
        self.client
            .get_workspace(workspace_id)
            .await
            .map_err(map_clockify_error)
    }

    async fn get_clients(
        &self,
        workspace_id: &str,
        archived: Option<bool>,
    ) -> Result<Vec<Client>, CliError> {
        let filter = ClientFilter::new().archived(archived);
        self.client
            .get_clients(workspace_id, &filter)
            .await
            .map_err(map_clockify_error)
    }

    async fn add_client(&self, workspace_id: &str, name: &str) -> Result<Client, CliError> {
        self.client
            .add_client(workspace_id, name)
            .await
            .map_err(map_clockify_error)
    }

    async fn get_projects(
        &self,
        workspace_id: &str,
        archived: Option<bool>,
    ) -> Result<Vec<Project>, CliError> {
        let filter = ProjectFilter::new().archived(archived);
        self.client
            .get_projects(workspace_id, &filter)
            .await
            .map_err(map_clockify_error)
    }

    async fn get_project(&self, workspace_id: &str, project_id: &str) -> Result<Project, CliError> {
        self.client
            .get_project(workspace_id, project_id)
            .await
            .map_err(map_clockify_error)
    }

    async fn get_tasks(
        &self,
        workspace_id: &str,
        project_id: &str,
        active_only: bool,
    ) -> Result<Vec<Task>, CliError> {
        let filter = if active_only {
            TaskFilter::new().active_only()
        } else {
            TaskFilter::new()
        };
        self.client
            .get_tasks(workspace_id, project_id, &filter)
            .await
            .map_err(map_clockify_error)
    }

    async fn get_tags(&self, workspace_id: &str, archived: Option<bool>) -> Result<Vec<Tag>, CliError> {
        let filter = TagFilter::new().archived(archived);
        self.client
            .get_tags(workspace_id, &filter)
            .await
            .map_err(map_clockify_error)
    }

    async fn list_time_entries(
        &self,
        workspace_id: &str,
        user_id: &str,
        filter: &TimeEntryFilter,
    ) -> Result<Vec<TimeEntry>, CliError> {
        self.client
            .get_user_time_entries(workspace_id, user_id, filter)
            .await
            .map_err(map_clockify_error)
    }

    async fn list_hydrated_time_entries(
        &self,
        workspace_id: &str,
        user_id: &str,
        filter: &TimeEntryFilter,
    ) -> Result<Vec<HydratedTimeEntry>, CliError> {
        self.client
            .get_hydrated_user_time_entries(workspace_id, user_id, filter)
            .await
            .map_err(map_clockify_error)
    }

    async fn get_time_entry(&self, workspace_id: &str, id: &str) -> Result<TimeEntry, CliError> {
        self.client
            .get_time_entry(workspace_id, id)
            .await
            .map_err(map_clockify_error)
    }

    async fn get_hydrated_time_entry(
        &self,
        workspace_id: &str,
        id: &str,
    ) -> Result<HydratedTimeEntry, CliError> {
        self.client
            .get_hydrated_time_entry(workspace_id, id)
            .await
            .map_err(map_clockify_error)
    }

    async fn create_time_entry(
        &self,
        workspace_id: &str,
        payload: &TimeEntryPayload,
    ) -> Result<TimeEntry, CliError> {
        self.client
            .create_time_entry(workspace_id, payload)
            .await
            .map_err(map_clockify_error)
    }

    async fn update_time_entry(
        &self,
        workspace_id: &str,
        id: &str,
        payload: &TimeEntryPayload,
    ) -> Result<TimeEntry, CliError> {
        self.client
            .update_time_entry(workspace_id, id, payload)
            .await
            .map_err(map_clockify_error)
    }

    async fn delete_time_entry(&self, workspace_id: &str, id: &str) -> Result<(), CliError> {
        self.client
            .delete_time_entry(workspace_id, id)
            .await
            .map_err(map_clockify_error)
    }

    async fn stop_running(
        &self,
        workspace_id: &str,
        user_id: &str,
        end: DateTime<Utc>,
    ) -> Result<TimeEntry, CliError> {
        self.client
            .stop_running_time_entry(workspace_id, user_id, end)
            .await
            .map_err(map_clockify_error)
    }

    async fn change_invoiced(
        &self,
        workspace_id: &str,
        ids: &[String],
        invoiced: bool,
    ) -> Result<(), CliError> {
        self.client
            .change_invoiced(workspace_id, ids, invoiced)
            .await
            .map_err(map_clockify_error)
    }
}

fn map_clockify_error(e: ClockifyError) -> CliError {
    match e {
        ClockifyError::Unauthorized => CliError::Transport(e.to_string()),
        ClockifyError::NotFound(_) => CliError::NotFound(e.to_string()),
        ClockifyError::Api { .. }
        | ClockifyError::Parsing(_)
        | ClockifyError::TooManyPages { .. } => CliError::Remote(e.to_string()),
        ClockifyError::Request(msg) => CliError::Transport(msg),
        ClockifyError::Credentials(e) => CliError::Config(e.to_string()),
    }
}
