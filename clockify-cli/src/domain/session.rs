use clockify::WorkspaceSettings;
use tokio::sync::OnceCell;

use super::{
    models::Preferences,
    ports::{ClockifyPort, Prompter},
    CliError,
};

/// Everything a command needs: the remote, the terminal, the user's
/// preferences and the resolved workspace and user.
pub struct Session<'a> {
    pub port: &'a dyn ClockifyPort,
    pub prompter: &'a dyn Prompter,
    pub preferences: Preferences,
    pub workspace_id: String,
    pub user_id: String,
    settings: OnceCell<WorkspaceSettings>,
}

impl<'a> Session<'a> {
    pub fn new(
        port: &'a dyn ClockifyPort,
        prompter: &'a dyn Prompter,
        preferences: Preferences,
        workspace_id: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            port,
            prompter,
            preferences,
            workspace_id: workspace_id.into(),
            user_id: user_id.into(),
            settings: OnceCell::new(),
        }
    }

    /// Same session with `--allow-incomplete` applied.
    pub fn allowing_incomplete(mut self, allow_incomplete: bool) -> Self {
        self.preferences.allow_incomplete |= allow_incomplete;
        self
    }

    pub fn is_interactive(&self) -> bool {
        self.preferences.interactive
    }

    /// Workspace rules, fetched on first use.
    pub async fn workspace_settings(&self) -> Result<WorkspaceSettings, CliError> {
        self.settings
            .get_or_try_init(|| async {
                let workspace = self.port.get_workspace(&self.workspace_id).await?;
                Ok::<_, CliError>(workspace.workspace_settings)
            })
            .await
            .copied()
    }
}
