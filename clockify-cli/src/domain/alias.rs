//! Symbolic time entry references: `current`, `last`, `latest` and `^n`.

use std::str::FromStr;

use clockify::{Paging, TimeEntry, TimeEntryFilter};
use futures::future::try_join_all;

use super::{ports::ClockifyPort, CliError};

/// A time entry as named on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryRef {
    /// The running entry (`current`, `^0`).
    Current,
    /// The most recent finished entry (`last`, `^1`).
    Last,
    /// The most recent entry, running or not.
    Latest,
    /// The n-th most recent finished entry (`^n`, n >= 2).
    Nth(u32),
    Id(String),
}

/// How a reference is looked up on the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Running,
    /// One-entry page `page`, optionally restricted by running state.
    Page { page: u32, in_progress: Option<bool> },
    Id(String),
}

impl FromStr for EntryRef {
    type Err = CliError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let token = token.trim();
        match token.to_lowercase().as_str() {
            "" => return Err(CliError::invalid_argument("time entry id can't be empty")),
            "current" => return Ok(EntryRef::Current),
            "last" => return Ok(EntryRef::Last),
            "latest" => return Ok(EntryRef::Latest),
            _ => {}
        }

        match token.strip_prefix('^') {
            Some(n) => match n.parse::<u32>() {
                Ok(0) => Ok(EntryRef::Current),
                Ok(1) => Ok(EntryRef::Last),
                Ok(n) => Ok(EntryRef::Nth(n)),
                Err(_) => Err(CliError::invalid_argument(format!(
                    "\"{}\" is not a valid time entry reference, use ^ followed by a number",
                    token
                ))),
            },
            None => Ok(EntryRef::Id(token.to_string())),
        }
    }
}

impl EntryRef {
    pub fn lookup(&self) -> Lookup {
        match self {
            EntryRef::Current => Lookup::Running,
            EntryRef::Last => Lookup::Page {
                page: 1,
                in_progress: Some(false),
            },
            EntryRef::Latest => Lookup::Page {
                page: 1,
                in_progress: None,
            },
            EntryRef::Nth(n) => Lookup::Page {
                page: *n,
                in_progress: Some(false),
            },
            EntryRef::Id(id) => Lookup::Id(id.clone()),
        }
    }
}

impl std::fmt::Display for EntryRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryRef::Current => f.write_str("current"),
            EntryRef::Last => f.write_str("last"),
            EntryRef::Latest => f.write_str("latest"),
            EntryRef::Nth(n) => write!(f, "^{}", n),
            EntryRef::Id(id) => f.write_str(id),
        }
    }
}

/// The user's running entry, if any.
pub async fn running_entry(
    port: &dyn ClockifyPort,
    workspace_id: &str,
    user_id: &str,
) -> Result<Option<TimeEntry>, CliError> {
    let filter = TimeEntryFilter::new()
        .in_progress(Some(true))
        .with_paging(Paging::single(1, 1));
    let entries = port.list_time_entries(workspace_id, user_id, &filter).await?;
    Ok(entries.into_iter().next())
}

pub async fn resolve_entry(
    port: &dyn ClockifyPort,
    workspace_id: &str,
    user_id: &str,
    entry: &EntryRef,
) -> Result<TimeEntry, CliError> {
    match entry.lookup() {
        Lookup::Running => running_entry(port, workspace_id, user_id)
            .await?
            .ok_or(CliError::NoRunning),
        Lookup::Page { page, in_progress } => {
            let filter = TimeEntryFilter::new()
                .in_progress(in_progress)
                .with_paging(Paging::single(page, 1));
            port.list_time_entries(workspace_id, user_id, &filter)
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| CliError::NotFound(format!("no time entry found for \"{}\"", entry)))
        }
        Lookup::Id(id) => port.get_time_entry(workspace_id, &id).await,
    }
}

/// Parses and resolves a command line token.
pub async fn resolve_token(
    port: &dyn ClockifyPort,
    workspace_id: &str,
    user_id: &str,
    token: &str,
) -> Result<TimeEntry, CliError> {
    let entry: EntryRef = token.parse()?;
    resolve_entry(port, workspace_id, user_id, &entry).await
}

/// Resolves every token, in order.
pub async fn resolve_tokens(
    port: &dyn ClockifyPort,
    workspace_id: &str,
    user_id: &str,
    tokens: &[String],
) -> Result<Vec<TimeEntry>, CliError> {
    let refs = tokens
        .iter()
        .map(|t| t.parse::<EntryRef>())
        .collect::<Result<Vec<_>, _>>()?;
    try_join_all(
        refs.iter()
            .map(|entry| resolve_entry(port, workspace_id, user_id, entry)),
    )
    .await
}
