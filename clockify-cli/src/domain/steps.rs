//! The steps write commands are assembled from.
//!
//! Interactive steps are identities when the session is not interactive, so
//! the same pipeline serves both modes.

use chrono::{DateTime, Duration, Local, Utc};
use clockify::WorkspaceSettings;
use itertools::Itertools;

use super::{
    alias::running_entry,
    models::{Draft, EntryFlags},
    pipeline::{step, Step},
    ports::accept_any_selection,
    resolver, time_parser, validator, CliError, Session,
};

const NO_PROJECT: &str = "No Project";
const NO_TASK: &str = "No Task";
const PROMPT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Copies the command line flags onto the draft.
pub fn fill_from_flags<'a>(flags: &'a EntryFlags) -> impl Step + 'a {
    step(move |draft: Draft| async move { flags.apply(draft) })
}

/// Replaces project, task and tag names with their ids.
pub fn name_to_id<'a>(session: &'a Session<'a>, client: Option<&'a str>) -> impl Step + 'a {
    step(move |draft: Draft| resolve_names(session, client, draft))
}

/// Asks for project, task, description and tags.
pub fn interactive_props<'a>(session: &'a Session<'a>) -> impl Step + 'a {
    step(move |draft: Draft| prompt_props(session, draft))
}

/// Asks for start and end.
pub fn interactive_dates<'a>(session: &'a Session<'a>) -> impl Step + 'a {
    step(move |draft: Draft| async move {
        if !session.is_interactive() {
            return Ok(draft);
        }
        prompt_dates(session, draft)
    })
}

/// Fails when the running entry would break a workspace rule once closed.
pub fn validate_closing<'a>(session: &'a Session<'a>) -> impl Step + 'a {
    step(move |draft: Draft| check_closing(session, draft))
}

/// Checks the draft itself against the workspace rules.
pub fn validate_entry<'a>(session: &'a Session<'a>) -> impl Step + 'a {
    step(move |draft: Draft| check_entry(session, draft))
}

/// Ends the running entry, if any, where the draft starts.
pub fn stop_running<'a>(session: &'a Session<'a>) -> impl Step + 'a {
    step(move |draft: Draft| stop_running_at_start(session, draft))
}

pub fn create<'a>(session: &'a Session<'a>) -> impl Step + 'a {
    step(move |draft: Draft| persist(session, draft, Persist::Create))
}

pub fn update<'a>(session: &'a Session<'a>) -> impl Step + 'a {
    step(move |draft: Draft| persist(session, draft, Persist::Update))
}

async fn check_closing(session: &Session<'_>, draft: Draft) -> Result<Draft, CliError> {
    if session.preferences.allow_incomplete {
        return Ok(draft);
    }
    let settings = session.workspace_settings().await?;
    validator::validate_closing(
        session.port,
        &settings,
        &session.workspace_id,
        &session.user_id,
    )
    .await?;
    Ok(draft)
}

async fn check_entry(session: &Session<'_>, draft: Draft) -> Result<Draft, CliError> {
    if session.preferences.allow_incomplete {
        return Ok(draft);
    }
    let settings = session.workspace_settings().await?;
    validator::validate_draft(session.port, &settings, &draft).await?;
    Ok(draft)
}

async fn stop_running_at_start(session: &Session<'_>, draft: Draft) -> Result<Draft, CliError> {
    let running = running_entry(session.port, &session.workspace_id, &session.user_id).await?;
    if let Some(running) = running {
        tracing::debug!(id = %running.id, end = %draft.start, "stopping running entry");
        session
            .port
            .stop_running(&session.workspace_id, &session.user_id, draft.start)
            .await?;
    }
    Ok(draft)
}

#[derive(Debug, Clone, Copy)]
enum Persist {
    Create,
    Update,
}

async fn persist(session: &Session<'_>, draft: Draft, how: Persist) -> Result<Draft, CliError> {
    ensure_interval(&draft)?;
    let payload = draft.to_payload();
    let saved = match how {
        Persist::Create => {
            session
                .port
                .create_time_entry(&session.workspace_id, &payload)
                .await?
        }
        Persist::Update => {
            session
                .port
                .update_time_entry(&session.workspace_id, &draft.id, &payload)
                .await?
        }
    };
    tracing::debug!(id = %saved.id, ?how, "saved time entry");
    Ok(Draft::from(&saved))
}

fn ensure_interval(draft: &Draft) -> Result<(), CliError> {
    match draft.end {
        Some(end) if end < draft.start => Err(CliError::invalid_argument(
            "the end of a time entry can't be before its start",
        )),
        _ => Ok(()),
    }
}

/// Keeps going without the field when a prompt will ask for it anyway.
fn recover(session: &Session<'_>, error: CliError, fallback: Draft) -> Result<Draft, CliError> {
    if session.is_interactive() {
        tracing::warn!(%error, "lookup failed, the prompt will ask instead");
        Ok(fallback)
    } else {
        Err(error)
    }
}

async fn resolve_names(
    session: &Session<'_>,
    client: Option<&str>,
    draft: Draft,
) -> Result<Draft, CliError> {
    if !session.preferences.allow_name_for_id {
        return Ok(draft);
    }
    let port = session.port;
    let workspace_id = session.workspace_id.as_str();
    let mut draft = draft;

    if draft.has_project() {
        draft = match resolver::resolve_project(
            port,
            workspace_id,
            draft.project_id(),
            client,
            session.preferences.search_project_with_client,
        )
        .await
        {
            Ok(id) => draft.with_resolved_project(id),
            Err(error) => {
                let fallback = draft.clone().with_project("");
                recover(session, error, fallback)?
            }
        };
    }

    if draft.has_project() && !draft.task_id().is_empty() {
        draft = match resolver::resolve_task(port, workspace_id, draft.project_id(), draft.task_id())
            .await
        {
            Ok(id) => draft.with_task(id),
            Err(error) => {
                let fallback = draft.clone().with_task("");
                recover(session, error, fallback)?
            }
        };
    }

    if !draft.tag_ids().is_empty() {
        draft = match resolver::resolve_tags(port, workspace_id, draft.tag_ids()).await {
            Ok(ids) => draft.with_tags(ids),
            Err(error) => {
                let fallback = draft.clone().with_tags(Vec::<String>::new());
                recover(session, error, fallback)?
            }
        };
    }

    Ok(draft)
}

/// The option at `index`, as answered by the prompter.
fn picked<T>(options: &[T], index: usize) -> Result<&T, CliError> {
    options.get(index).ok_or_else(|| {
        CliError::Prompt(format!(
            "choice {} is out of range, there are {} options",
            index,
            options.len()
        ))
    })
}

async fn prompt_props(session: &Session<'_>, draft: Draft) -> Result<Draft, CliError> {
    if !session.is_interactive() {
        return Ok(draft);
    }
    let settings = session.workspace_settings().await?;
    let draft = prompt_project(session, &settings, draft).await?;
    let draft = prompt_task(session, &settings, draft).await?;
    let draft = prompt_description(session, &settings, draft).await?;
    prompt_tags(session, &settings, draft).await
}

async fn prompt_project(
    session: &Session<'_>,
    settings: &WorkspaceSettings,
    draft: Draft,
) -> Result<Draft, CliError> {
    let projects: Vec<_> = session
        .port
        .get_projects(&session.workspace_id, Some(false))
        .await?
        .into_iter()
        .sorted_by_key(|p| p.name.to_lowercase())
        .collect();

    let mut ids = vec![];
    let mut items = vec![];
    if !settings.force_projects {
        ids.push(String::new());
        items.push(NO_PROJECT.to_string());
    }
    for project in &projects {
        ids.push(project.id.clone());
        items.push(if project.client_name.is_empty() {
            project.name.clone()
        } else {
            format!("{} - {}", project.name, project.client_name)
        });
    }
    if items.is_empty() {
        return Ok(draft);
    }

    let current = ids.iter().position(|id| id == draft.project_id());
    let chosen = session.prompter.select("Choose your project", &items, current)?;
    Ok(draft.with_project(picked(&ids, chosen)?.clone()))
}

async fn prompt_task(
    session: &Session<'_>,
    settings: &WorkspaceSettings,
    draft: Draft,
) -> Result<Draft, CliError> {
    if !draft.has_project() {
        return Ok(draft);
    }
    let tasks: Vec<_> = session
        .port
        .get_tasks(&session.workspace_id, draft.project_id(), true)
        .await?
        .into_iter()
        .sorted_by_key(|t| t.name.to_lowercase())
        .collect();
    if tasks.is_empty() {
        return Ok(draft);
    }

    let mut ids = vec![];
    let mut items = vec![];
    if !settings.force_tasks {
        ids.push(String::new());
        items.push(NO_TASK.to_string());
    }
    for task in &tasks {
        ids.push(task.id.clone());
        items.push(task.name.clone());
    }

    let current = ids.iter().position(|id| id == draft.task_id());
    let chosen = session.prompter.select("Choose your task", &items, current)?;
    Ok(draft.with_task(picked(&ids, chosen)?.clone()))
}

async fn prompt_description(
    session: &Session<'_>,
    settings: &WorkspaceSettings,
    draft: Draft,
) -> Result<Draft, CliError> {
    let preferences = &session.preferences;
    let suggestions = if preferences.description_autocomplete {
        let since = Utc::now() - Duration::days(i64::from(preferences.description_autocomplete_days));
        session
            .port
            .recent_descriptions(&session.workspace_id, &session.user_id, since)
            .await?
    } else {
        vec![]
    };

    let required = settings.force_description;
    let validate = move |value: &str| {
        if required && value.trim().is_empty() {
            Err("the workspace requires a description".to_string())
        } else {
            Ok(())
        }
    };
    let description =
        session
            .prompter
            .text("Description", &draft.description, &suggestions, &validate)?;
    Ok(draft.with_description(description.trim()))
}

async fn prompt_tags(
    session: &Session<'_>,
    settings: &WorkspaceSettings,
    draft: Draft,
) -> Result<Draft, CliError> {
    let tags: Vec<_> = session
        .port
        .get_tags(&session.workspace_id, Some(false))
        .await?
        .into_iter()
        .sorted_by_key(|t| t.name.to_lowercase())
        .collect();
    if tags.is_empty() {
        return Ok(draft);
    }

    let items: Vec<String> = tags.iter().map(|t| t.name.clone()).collect();
    let selected: Vec<bool> = tags
        .iter()
        .map(|t| draft.tag_ids().iter().any(|id| t.id.starts_with(id.as_str())))
        .collect();

    let require_tags = move |chosen: &[usize]| {
        if chosen.is_empty() {
            Err("the workspace requires at least one tag".to_string())
        } else {
            Ok(())
        }
    };
    let chosen = if settings.force_tags {
        session
            .prompter
            .multi_select("Choose your tags", &items, &selected, &require_tags)?
    } else {
        session
            .prompter
            .multi_select("Choose your tags", &items, &selected, &accept_any_selection)?
    };

    let ids = chosen
        .into_iter()
        .map(|i| picked(&tags, i).map(|tag| tag.id.clone()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(draft.with_tags(ids))
}

fn format_for_prompt(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format(PROMPT_TIME_FORMAT).to_string()
}

fn prompt_dates(session: &Session<'_>, draft: Draft) -> Result<Draft, CliError> {
    let validate_start = |value: &str| {
        time_parser::parse_time(value)
            .map(|_| ())
            .map_err(|e| e.to_string())
    };
    let start = session.prompter.text(
        "Start",
        &format_for_prompt(draft.start),
        &[],
        &validate_start,
    )?;
    let start = time_parser::parse_time(&start)?;

    let validate_end = |value: &str| {
        if value.trim().is_empty() {
            return Ok(());
        }
        time_parser::parse_time(value)
            .map(|_| ())
            .map_err(|e| e.to_string())
    };
    let initial_end = draft.end.map(format_for_prompt).unwrap_or_default();
    let end = session.prompter.text(
        "End (leave it blank for an open entry)",
        &initial_end,
        &[],
        &validate_end,
    )?;
    let end = match end.trim() {
        "" => None,
        value => Some(time_parser::parse_time(value)?),
    };

    Ok(draft.with_start(start).with_end(end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{at, entry, Answer, MockClockify, ScriptedPrompter, USER, WORKSPACE};
    use crate::domain::{
        models::Preferences,
        pipeline::Pipeline,
        ports::{Prompter, SelectionValidator, TextValidator},
    };
    use clockify::{Project, Tag, Task};

    fn interactive() -> Preferences {
        Preferences {
            interactive: true,
            allow_name_for_id: true,
            ..Default::default()
        }
    }

    fn port() -> MockClockify {
        MockClockify::new()
            .with_projects(vec![
                Project::new("p1", "Website").with_client("c1", "Acme"),
                Project::new("p2", "Backoffice"),
            ])
            .with_tasks(vec![
                Task::new("t1", "Design", "p1"),
                Task::new("t2", "Build", "p1"),
            ])
            .with_tags(vec![Tag::new("g1", "urgent"), Tag::new("g2", "billing")])
    }

    fn seed() -> Draft {
        Draft::new(WORKSPACE, USER, at(8, 0))
    }

    #[tokio::test]
    async fn names_resolve_when_enabled() {
        let port = port();
        let prompter = ScriptedPrompter::default();
        let preferences = Preferences {
            allow_name_for_id: true,
            ..Default::default()
        };
        let session = Session::new(&port, &prompter, preferences, WORKSPACE, USER);

        let draft = seed()
            .with_project("web")
            .with_task("desi")
            .with_tags(["urg", "g1"]);
        let draft = name_to_id(&session, None).apply(draft).await.unwrap();
        assert_eq!(draft.project_id(), "p1");
        assert_eq!(draft.task_id(), "t1");
        assert_eq!(draft.tag_ids(), ["g1"]);
    }

    #[tokio::test]
    async fn names_are_left_alone_when_disabled() {
        let port = port();
        let prompter = ScriptedPrompter::default();
        let session = Session::new(&port, &prompter, Preferences::default(), WORKSPACE, USER);

        let draft = seed().with_project("web");
        let draft = name_to_id(&session, None).apply(draft).await.unwrap();
        assert_eq!(draft.project_id(), "web");
    }

    #[tokio::test]
    async fn lookup_errors_are_quiet_when_interactive() {
        let port = port();
        let prompter = ScriptedPrompter::default();
        let session = Session::new(&port, &prompter, interactive(), WORKSPACE, USER);

        let draft = name_to_id(&session, None)
            .apply(seed().with_project("nope"))
            .await
            .unwrap();
        assert_eq!(draft.project_id(), "");

        let strict = Session::new(
            &port,
            &prompter,
            Preferences {
                allow_name_for_id: true,
                ..Default::default()
            },
            WORKSPACE,
            USER,
        );
        let halted = name_to_id(&strict, None)
            .apply(seed().with_project("nope"))
            .await
            .unwrap_err();
        assert!(halted.error.is_not_found());
        assert_eq!(halted.draft.project_id(), "nope");
    }

    #[tokio::test]
    async fn unknown_task_and_tags_fall_back_when_interactive() {
        let port = port();
        let prompter = ScriptedPrompter::default();
        let session = Session::new(&port, &prompter, interactive(), WORKSPACE, USER);

        let draft = name_to_id(&session, None)
            .apply(
                seed()
                    .with_project("Website")
                    .with_task("nope")
                    .with_tags(["urgent", "nope"]),
            )
            .await
            .unwrap();
        assert_eq!(draft.project_id(), "p1");
        assert_eq!(draft.task_id(), "");
        assert!(draft.tag_ids().is_empty());
    }

    #[tokio::test]
    async fn unknown_task_and_tags_fail_when_strict() {
        let port = port();
        let prompter = ScriptedPrompter::default();
        let strict = Session::new(
            &port,
            &prompter,
            Preferences {
                allow_name_for_id: true,
                ..Default::default()
            },
            WORKSPACE,
            USER,
        );

        let halted = name_to_id(&strict, None)
            .apply(seed().with_project("Website").with_task("nope"))
            .await
            .unwrap_err();
        assert!(halted.error.is_not_found());
        assert_eq!(halted.draft.task_id(), "nope");

        let halted = name_to_id(&strict, None)
            .apply(seed().with_tags(["nope"]))
            .await
            .unwrap_err();
        assert!(halted.error.is_not_found());
        assert_eq!(halted.draft.tag_ids(), ["nope"]);
    }

    /// Answers one past the last option.
    struct OffByOne;

    impl Prompter for OffByOne {
        fn select(&self, _: &str, items: &[String], _: Option<usize>) -> Result<usize, CliError> {
            Ok(items.len())
        }

        fn multi_select(
            &self,
            _: &str,
            items: &[String],
            _: &[bool],
            _: SelectionValidator<'_>,
        ) -> Result<Vec<usize>, CliError> {
            Ok(vec![items.len()])
        }

        fn text(
            &self,
            _: &str,
            initial: &str,
            _: &[String],
            _: TextValidator<'_>,
        ) -> Result<String, CliError> {
            Ok(initial.to_string())
        }
    }

    #[tokio::test]
    async fn out_of_range_answers_are_prompt_errors() {
        let port = port();
        let session = Session::new(&port, &OffByOne, interactive(), WORKSPACE, USER);
        let settings = WorkspaceSettings::default();

        let err = prompt_project(&session, &settings, seed()).await.unwrap_err();
        assert!(matches!(err, CliError::Prompt(_)));

        let err = prompt_task(&session, &settings, seed().with_project("p1"))
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Prompt(_)));

        let err = prompt_tags(&session, &settings, seed()).await.unwrap_err();
        assert!(matches!(err, CliError::Prompt(_)));
    }

    #[tokio::test]
    async fn prompts_in_order() {
        let port = port();
        let prompter = ScriptedPrompter::new(vec![
            Answer::Select(2),
            Answer::Select(1),
            Answer::text("Landing page"),
            Answer::MultiSelect(vec![0]),
            Answer::text("09:00"),
            Answer::text(""),
        ]);
        let session = Session::new(&port, &prompter, interactive(), WORKSPACE, USER);

        let pipeline = Pipeline::new()
            .then(interactive_props(&session))
            .then(interactive_dates(&session));
        let draft = pipeline.run(seed()).await.unwrap();

        let asked = prompter.asked();
        assert_eq!(asked[0].1, ["No Project", "Backoffice", "Website - Acme"]);
        assert_eq!(asked[1].1, ["No Task", "Build", "Design"]);
        assert_eq!(asked[3].1, ["billing", "urgent"]);
        assert_eq!(draft.project_id(), "p1");
        assert_eq!(draft.task_id(), "t2");
        assert_eq!(draft.description, "Landing page");
        assert_eq!(draft.tag_ids(), ["g2"]);
        assert!(draft.end.is_none());
        assert_eq!(prompter.remaining(), 0);
    }

    #[tokio::test]
    async fn forced_fields_have_no_sentinel_and_reject_blanks() {
        let port = port().with_settings(WorkspaceSettings {
            force_projects: true,
            force_description: true,
            ..Default::default()
        });
        let prompter = ScriptedPrompter::new(vec![Answer::Select(0), Answer::text("  ")]);
        let session = Session::new(&port, &prompter, interactive(), WORKSPACE, USER);

        let halted = interactive_props(&session).apply(seed()).await.unwrap_err();
        assert_eq!(prompter.asked()[0].1, ["Backoffice", "Website - Acme"]);
        assert!(matches!(halted.error, CliError::Prompt(_)));
    }

    #[tokio::test]
    async fn task_prompt_is_skipped_without_tasks() {
        let port = port();
        let prompter = ScriptedPrompter::new(vec![
            Answer::Select(1),
            Answer::text("Reports"),
            Answer::MultiSelect(vec![]),
        ]);
        let session = Session::new(&port, &prompter, interactive(), WORKSPACE, USER);

        let draft = interactive_props(&session).apply(seed()).await.unwrap();
        assert_eq!(draft.project_id(), "p2");
        assert_eq!(draft.task_id(), "");
        assert_eq!(prompter.asked().len(), 3);
    }

    #[tokio::test]
    async fn stop_running_closes_at_draft_start() {
        let port = MockClockify::new().with_entries(vec![entry("run", (6, 0), None)]);
        let prompter = ScriptedPrompter::default();
        let session = Session::new(&port, &prompter, Preferences::default(), WORKSPACE, USER);

        stop_running(&session).apply(seed()).await.unwrap();
        assert_eq!(port.stopped(), [at(8, 0)]);
        assert_eq!(port.entry("run").unwrap().time_interval.end, Some(at(8, 0)));
    }

    #[tokio::test]
    async fn create_rejects_end_before_start() {
        let port = MockClockify::new();
        let prompter = ScriptedPrompter::default();
        let session = Session::new(&port, &prompter, Preferences::default(), WORKSPACE, USER);

        let draft = seed().with_end(Some(at(7, 0)));
        let halted = create(&session).apply(draft).await.unwrap_err();
        assert!(matches!(halted.error, CliError::InvalidArgument(_)));
        assert!(port.created().is_empty());
    }
}
