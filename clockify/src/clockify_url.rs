use std::env;

pub const DEFAULT_BASE_URL: &str = "https://api.clockify.me/api/v1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockifyURL(String);

impl AsRef<str> for ClockifyURL {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Default for ClockifyURL {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl std::fmt::Display for ClockifyURL {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl ClockifyURL {
    pub fn new(base: impl Into<String>) -> Self {
        Self(base.into())
    }

    /// Uses `CLOCKIFY_API_URL` when set, otherwise the public API endpoint.
    pub fn from_env() -> Self {
        env::var("CLOCKIFY_API_URL")
            .map(Self)
            .unwrap_or_default()
    }

    /// Append the given path to the URL.
    pub fn append_path(&self, path: &str) -> Self {
        let trimmed_url = self.0.trim_end_matches('/');
        let trimmed_path = path.trim_start_matches('/');
        Self(format!("{}/{}", trimmed_url, trimmed_path))
    }

    pub fn workspace(&self, workspace_id: &str) -> Self {
        self.append_path(&format!("/workspaces/{}", workspace_id))
    }

    pub fn user_time_entries(&self, workspace_id: &str, user_id: &str) -> Self {
        self.workspace(workspace_id)
            .append_path(&format!("/user/{}/time-entries", user_id))
    }

    pub fn time_entry(&self, workspace_id: &str, id: &str) -> Self {
        self.workspace(workspace_id)
            .append_path(&format!("/time-entries/{}", id))
    }
}
