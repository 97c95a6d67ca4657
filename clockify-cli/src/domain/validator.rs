use clockify::WorkspaceSettings;

use super::{
    alias::running_entry,
    error::WorkspaceRule,
    models::Draft,
    ports::ClockifyPort,
    CliError,
};

/// Checks the workspace force rules, stopping at the first violation.
pub fn check_rules(settings: &WorkspaceSettings, draft: &Draft) -> Result<(), CliError> {
    let violated = if settings.force_projects && !draft.has_project() {
        Some(WorkspaceRule::ForceProjects)
    } else if settings.force_tasks && draft.task_id().is_empty() {
        Some(WorkspaceRule::ForceTasks)
    } else if settings.force_description && draft.description.trim().is_empty() {
        Some(WorkspaceRule::ForceDescription)
    } else if settings.force_tags && draft.tag_ids().is_empty() {
        Some(WorkspaceRule::ForceTags)
    } else {
        None
    };

    match violated {
        Some(rule) => Err(CliError::WorkspaceRule(rule)),
        None => Ok(()),
    }
}

/// Force rules plus "the project is not archived".
pub async fn validate_draft(
    port: &dyn ClockifyPort,
    settings: &WorkspaceSettings,
    draft: &Draft,
) -> Result<(), CliError> {
    check_rules(settings, draft)?;

    if draft.has_project() {
        let project = port
            .get_project(&draft.workspace_id, draft.project_id())
            .await?;
        if project.archived {
            return Err(CliError::ArchivedProject(project.name));
        }
    }
    Ok(())
}

/// Checks that the user's running entry, if any, may be closed.
pub async fn validate_closing(
    port: &dyn ClockifyPort,
    settings: &WorkspaceSettings,
    workspace_id: &str,
    user_id: &str,
) -> Result<(), CliError> {
    let Some(running) = running_entry(port, workspace_id, user_id).await? else {
        return Ok(());
    };

    let mut draft = Draft::from(&running);
    if draft.workspace_id.is_empty() {
        draft.workspace_id = workspace_id.to_string();
    }
    validate_draft(port, settings, &draft)
        .await
        .map_err(|e| CliError::RunningCantBeEnded(Box::new(e)))
}
