use chrono::{DateTime, Local, Utc};
use strum::Display;
use thiserror::Error;

/// Kinds of workspace records that can be looked up by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Entity {
    Project,
    Task,
    Tag,
    Workspace,
}

/// A workspace policy that requires a field before an entry is saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum WorkspaceRule {
    #[strum(serialize = "a project")]
    ForceProjects,
    #[strum(serialize = "a task")]
    ForceTasks,
    #[strum(serialize = "a description")]
    ForceDescription,
    #[strum(serialize = "at least one tag")]
    ForceTags,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SplitError {
    #[error("time splits must be in increasing order, but {0} is not after the previous one")]
    NotIncreasing(String),
    #[error("time splits must be after {0}")]
    BeforeStart(String),
    #[error("time splits must be before {0}")]
    AfterEnd(String),
}

impl SplitError {
    pub fn not_increasing(at: DateTime<Utc>) -> Self {
        Self::NotIncreasing(local_minutes(at))
    }

    pub fn before_start(start: DateTime<Utc>) -> Self {
        Self::BeforeStart(local_minutes(start))
    }

    pub fn after_end(end: DateTime<Utc>) -> Self {
        Self::AfterEnd(local_minutes(end))
    }
}

fn local_minutes(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// Errors surfaced by every command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("the following flags can't be used together: {}", join_names(.0))]
    FlagConflict(Vec<String>),
    #[error("supplied time \"{input}\" is not valid: {reason}")]
    InvalidTime { input: String, reason: String },
    #[error("{0}")]
    NotFound(String),
    #[error("no {entity} with id or name containing \"{term}\" was found{}", for_client(.client))]
    EntityNotFound {
        entity: Entity,
        term: String,
        client: Option<String>,
    },
    #[error("{entity} \"{term}\" is ambiguous, it matches: {}", .candidates.join(", "))]
    Ambiguous {
        entity: Entity,
        term: String,
        candidates: Vec<String>,
    },
    #[error("there is no time entry running")]
    NoRunning,
    #[error("workspace requires {0}")]
    WorkspaceRule(WorkspaceRule),
    #[error("project \"{0}\" is archived")]
    ArchivedProject(String),
    #[error(transparent)]
    Split(#[from] SplitError),
    #[error("running entry can't be ended: {0}")]
    RunningCantBeEnded(Box<CliError>),
    #[error("{0}")]
    Remote(String),
    #[error("{0}")]
    Transport(String),
    #[error("{0}")]
    InvalidArgument(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("prompt failed: {0}")]
    Prompt(String),
}

impl CliError {
    /// Builds a [`CliError::FlagConflict`] with the names sorted.
    pub fn flag_conflict<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
        names.sort();
        Self::FlagConflict(names)
    }

    pub fn invalid_time(input: &str, reason: impl Into<String>) -> Self {
        Self::InvalidTime {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::EntityNotFound { .. })
    }
}

/// `a`, `a and b`, `a, b and c`.
fn join_names(names: &[String]) -> String {
    match names {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

fn for_client(client: &Option<String>) -> String {
    match client {
        Some(client) => format!(" for client \"{}\"", client),
        None => String::new(),
    }
}
