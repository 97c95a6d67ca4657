use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;

use crate::domain::{
    ChangeInvoiced, Client, ClientFilter, ClockifyFilter, HydratedTimeEntry, NewClient, Paging,
    Project, ProjectFilter, StopTimeEntry, Tag, TagFilter, Task, TaskFilter, TimeEntry,
    TimeEntryFilter, TimeEntryPayload, User, Workspace, MAX_PAGES,
};
use crate::{ClockifyURL, Credentials, CredentialsError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum ClockifyError {
    #[error("Unauthorized: the API token was rejected")]
    Unauthorized,
    #[error("{0} returned not found")]
    NotFound(String),
    #[error("{call} failed ({status}): {message}")]
    Api {
        call: String,
        status: u16,
        message: String,
    },
    #[error("RequestError: {0}")]
    Request(String),
    #[error("ParsingError: {0}")]
    Parsing(String),
    #[error("{call} returned more than {limit} pages")]
    TooManyPages { call: String, limit: u32 },
    #[error(transparent)]
    Credentials(#[from] CredentialsError),
}

/// Error body Clockify sends with 4xx/5xx responses.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

/// Prefers the `message` of a JSON error body, falling back to the raw text.
fn api_error_message(body: String) -> String {
    serde_json::from_str::<ApiErrorBody>(&body)
        .ok()
        .map(|b| b.message)
        .filter(|m| !m.is_empty())
        .unwrap_or(body)
}

#[derive(Debug, Clone)]
pub struct ClockifyClient {
    http: reqwest::Client,
    base_url: ClockifyURL,
}

impl ClockifyClient {
    pub fn new(credentials: &Credentials, base_url: ClockifyURL) -> Result<Self, ClockifyError> {
        let http = reqwest::Client::builder()
            .default_headers(credentials.headers()?)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ClockifyError::Request(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &ClockifyURL {
        &self.base_url
    }

    async fn send(&self, request: RequestBuilder, call: &str) -> Result<Response, ClockifyError> {
        let response = request
            .send()
            .await
            .map_err(|e| ClockifyError::Request(format!("Failed to call {}: {}", call, e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ClockifyError::Unauthorized),
            StatusCode::NOT_FOUND => Err(ClockifyError::NotFound(call.to_string())),
            _ => {
                let body = response.text().await.map_err(|e| {
                    ClockifyError::Request(format!(
                        "Failed to read {} error body ({}): {}",
                        call, status, e
                    ))
                })?;
                Err(ClockifyError::Api {
                    call: call.to_string(),
                    status: status.as_u16(),
                    message: api_error_message(body),
                })
            }
        }
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        call: &str,
    ) -> Result<T, ClockifyError> {
        let response = self.send(request, call).await?;
        response.json::<T>().await.map_err(|e| {
            ClockifyError::Parsing(format!("Failed to parse {} response as JSON: {}", call, e))
        })
    }

    fn request(&self, method: Method, url: &ClockifyURL) -> RequestBuilder {
        self.http.request(method, url.as_ref())
    }

    /// Walks the pages of a listing endpoint.
    ///
    /// With [`Paging::All`] pages are requested until one comes back shorter
    /// than the page size, up to [`MAX_PAGES`].
    async fn list<T, F>(
        &self,
        url: &ClockifyURL,
        filter: &F,
        extra: &[(&'static str, String)],
        paging: Paging,
        call: &str,
    ) -> Result<Vec<T>, ClockifyError>
    where
        T: DeserializeOwned,
        F: ClockifyFilter,
    {
        let page_size = paging.page_size();
        let mut page = paging.first_page();
        let mut results = vec![];

        loop {
            let mut query = filter.query_pairs();
            query.extend_from_slice(extra);
            query.push(("page", page.to_string()));
            query.push(("page-size", page_size.to_string()));

            let batch: Vec<T> = self
                .fetch(self.request(Method::GET, url).query(&query), call)
                .await?;
            let fetched = batch.len();
            results.extend(batch);

            match paging.next_page(page, fetched) {
                None => break,
                Some(next) if next > MAX_PAGES => {
                    return Err(ClockifyError::TooManyPages {
                        call: call.to_string(),
                        limit: MAX_PAGES,
                    })
                }
                Some(next) => page = next,
            }
        }

        tracing::debug!(call, count = results.len(), "listed");
        Ok(results)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_user(&self) -> Result<User, ClockifyError> {
        let url = self.base_url.append_path("/user");
        self.fetch(self.request(Method::GET, &url), "GET /user").await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_workspaces(&self) -> Result<Vec<Workspace>, ClockifyError> {
        let url = self.base_url.append_path("/workspaces");
        self.fetch(self.request(Method::GET, &url), "GET /workspaces")
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_workspace(&self, workspace_id: &str) -> Result<Workspace, ClockifyError> {
        let url = self.base_url.workspace(workspace_id);
        self.fetch(self.request(Method::GET, &url), "GET /workspaces/:id")
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_clients(
        &self,
        workspace_id: &str,
        filter: &ClientFilter,
    ) -> Result<Vec<Client>, ClockifyError> {
        let url = self.base_url.workspace(workspace_id).append_path("/clients");
        self.list(&url, filter, &[], Paging::All, "GET /workspaces/:id/clients")
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn add_client(&self, workspace_id: &str, name: &str) -> Result<Client, ClockifyError> {
        let url = self.base_url.workspace(workspace_id).append_path("/clients");
        let body = NewClient {
            name: name.to_string(),
        };
        self.fetch(
            self.request(Method::POST, &url).json(&body),
            "POST /workspaces/:id/clients",
        )
        .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_projects(
        &self,
        workspace_id: &str,
        filter: &ProjectFilter,
    ) -> Result<Vec<Project>, ClockifyError> {
        let url = self.base_url.workspace(workspace_id).append_path("/projects");
        // hydrated projects carry clientName
        let extra = [("hydrated", "true".to_string())];
        self.list(&url, filter, &extra, Paging::All, "GET /workspaces/:id/projects")
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_project(
        &self,
        workspace_id: &str,
        project_id: &str,
    ) -> Result<Project, ClockifyError> {
        let url = self
            .base_url
            .workspace(workspace_id)
            .append_path(&format!("/projects/{}", project_id));
        self.fetch(
            self.request(Method::GET, &url),
            "GET /workspaces/:id/projects/:id",
        )
        .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_tasks(
        &self,
        workspace_id: &str,
        project_id: &str,
        filter: &TaskFilter,
    ) -> Result<Vec<Task>, ClockifyError> {
        let url = self
            .base_url
            .workspace(workspace_id)
            .append_path(&format!("/projects/{}/tasks", project_id));
        self.list(
            &url,
            filter,
            &[],
            Paging::All,
            "GET /workspaces/:id/projects/:id/tasks",
        )
        .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_tags(
        &self,
        workspace_id: &str,
        filter: &TagFilter,
    ) -> Result<Vec<Tag>, ClockifyError> {
        let url = self.base_url.workspace(workspace_id).append_path("/tags");
        self.list(&url, filter, &[], Paging::All, "GET /workspaces/:id/tags")
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_user_time_entries(
        &self,
        workspace_id: &str,
        user_id: &str,
        filter: &TimeEntryFilter,
    ) -> Result<Vec<TimeEntry>, ClockifyError> {
        let url = self.base_url.user_time_entries(workspace_id, user_id);
        self.list(
            &url,
            filter,
            &[],
            filter.paging,
            "GET /workspaces/:id/user/:id/time-entries",
        )
        .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_hydrated_user_time_entries(
        &self,
        workspace_id: &str,
        user_id: &str,
        filter: &TimeEntryFilter,
    ) -> Result<Vec<HydratedTimeEntry>, ClockifyError> {
        let url = self.base_url.user_time_entries(workspace_id, user_id);
        let extra = [("hydrated", "true".to_string())];
        self.list(
            &url,
            filter,
            &extra,
            filter.paging,
            "GET /workspaces/:id/user/:id/time-entries",
        )
        .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_time_entry(
        &self,
        workspace_id: &str,
        id: &str,
    ) -> Result<TimeEntry, ClockifyError> {
        let url = self.base_url.time_entry(workspace_id, id);
        self.fetch(
            self.request(Method::GET, &url),
            "GET /workspaces/:id/time-entries/:id",
        )
        .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_hydrated_time_entry(
        &self,
        workspace_id: &str,
        id: &str,
    ) -> Result<HydratedTimeEntry, ClockifyError> {
        let url = self.base_url.time_entry(workspace_id, id);
        self.fetch(
            self.request(Method::GET, &url)
                .query(&[("hydrated", "true")]),
            "GET /workspaces/:id/time-entries/:id",
        )
        .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_time_entry(
        &self,
        workspace_id: &str,
        payload: &TimeEntryPayload,
    ) -> Result<TimeEntry, ClockifyError> {
        let url = self
            .base_url
            .workspace(workspace_id)
            .append_path("/time-entries");
        self.fetch(
            self.request(Method::POST, &url).json(payload),
            "POST /workspaces/:id/time-entries",
        )
        .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_time_entry(
        &self,
        workspace_id: &str,
        id: &str,
        payload: &TimeEntryPayload,
    ) -> Result<TimeEntry, ClockifyError> {
        let url = self.base_url.time_entry(workspace_id, id);
        self.fetch(
            self.request(Method::PUT, &url).json(payload),
            "PUT /workspaces/:id/time-entries/:id",
        )
        .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_time_entry(&self, workspace_id: &str, id: &str) -> Result<(), ClockifyError> {
        let url = self.base_url.time_entry(workspace_id, id);
        self.send(
            self.request(Method::DELETE, &url),
            "DELETE /workspaces/:id/time-entries/:id",
        )
        .await?;
        Ok(())
    }

    /// Ends the user's running entry at `end`.
    #[tracing::instrument(skip(self))]
    pub async fn stop_running_time_entry(
        &self,
        workspace_id: &str,
        user_id: &str,
        end: DateTime<Utc>,
    ) -> Result<TimeEntry, ClockifyError> {
        let url = self.base_url.user_time_entries(workspace_id, user_id);
        self.fetch(
            self.request(Method::PATCH, &url)
                .json(&StopTimeEntry { end }),
            "PATCH /workspaces/:id/user/:id/time-entries",
        )
        .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn change_invoiced(
        &self,
        workspace_id: &str,
        time_entry_ids: &[String],
        invoiced: bool,
    ) -> Result<(), ClockifyError> {
        let url = self
            .base_url
            .workspace(workspace_id)
            .append_path("/time-entries/invoiced");
        let body = ChangeInvoiced {
            time_entry_ids: time_entry_ids.to_vec(),
            invoiced,
        };
        self.send(
            self.request(Method::PATCH, &url).json(&body),
            "PATCH /workspaces/:id/time-entries/invoiced",
        )
        .await?;
        Ok(())
    }
}
