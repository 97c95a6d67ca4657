//! One recipe per write command, each a [`Pipeline`] over the shared steps.

use chrono::{DateTime, Local, Utc};
use clockify::HydratedTimeEntry;
use futures::future::try_join_all;
use itertools::Itertools;

use crate::domain::{
    alias::{resolve_token, resolve_tokens, running_entry},
    models::{Draft, EntryDefaults, EntryFlags},
    pipeline::Pipeline,
    steps::{
        create, fill_from_flags, interactive_dates, interactive_props, name_to_id, stop_running,
        update, validate_closing, validate_entry,
    },
    time_parser, CliError, Session, SplitError,
};

async fn run(pipeline: Pipeline<'_>, seed: Draft) -> Result<Draft, CliError> {
    pipeline.run(seed).await.map_err(|halted| {
        tracing::debug!(draft = ?halted.draft, error = %halted.error, "pipeline halted");
        halted.error
    })
}

async fn hydrate(session: &Session<'_>, id: &str) -> Result<HydratedTimeEntry, CliError> {
    session
        .port
        .get_hydrated_time_entry(&session.workspace_id, id)
        .await
}

/// `in`: starts a new entry, closing the running one.
pub async fn start(
    session: &Session<'_>,
    flags: &EntryFlags,
    defaults: &EntryDefaults,
) -> Result<HydratedTimeEntry, CliError> {
    let seed = defaults.seed(Draft::new(
        &session.workspace_id,
        &session.user_id,
        Utc::now(),
    ));
    let pipeline = Pipeline::new()
        .then(fill_from_flags(flags))
        .then(validate_closing(session))
        .then(name_to_id(session, flags.client.as_deref()))
        .then(interactive_props(session))
        .then(interactive_dates(session))
        .then(validate_entry(session))
        .then(stop_running(session))
        .then(create(session));

    let created = run(pipeline, seed).await?;
    hydrate(session, &created.id).await
}

/// `manual`: creates a finished entry. The running entry is left alone.
pub async fn manual(
    session: &Session<'_>,
    flags: &EntryFlags,
) -> Result<HydratedTimeEntry, CliError> {
    let now = Utc::now();
    let seed = Draft::new(&session.workspace_id, &session.user_id, now).with_end(Some(now));
    let pipeline = Pipeline::new()
        .then(fill_from_flags(flags))
        .then(name_to_id(session, flags.client.as_deref()))
        .then(interactive_props(session))
        .then(interactive_dates(session))
        .then(validate_entry(session))
        .then(create(session));

    let created = run(pipeline, seed).await?;
    hydrate(session, &created.id).await
}

/// `clone`: starts a copy of an existing entry.
pub async fn clone_entry(
    session: &Session<'_>,
    token: &str,
    flags: &EntryFlags,
    no_closing: bool,
) -> Result<HydratedTimeEntry, CliError> {
    let source = resolve_token(
        session.port,
        &session.workspace_id,
        &session.user_id,
        token,
    )
    .await?;

    let mut seed = Draft::from(&source).with_start(Utc::now()).with_end(None);
    seed.id.clear();
    seed.locked = false;
    seed.invoiced = false;

    let pipeline = Pipeline::new()
        .then(fill_from_flags(flags))
        .then_if(!no_closing, validate_closing(session))
        .then(name_to_id(session, flags.client.as_deref()))
        .then(interactive_props(session))
        .then(interactive_dates(session))
        .then(validate_entry(session))
        .then_if(!no_closing, stop_running(session))
        .then(create(session));

    let created = run(pipeline, seed).await?;
    hydrate(session, &created.id).await
}

pub async fn edit(
    session: &Session<'_>,
    token: &str,
    flags: &EntryFlags,
) -> Result<HydratedTimeEntry, CliError> {
    let source = resolve_token(
        session.port,
        &session.workspace_id,
        &session.user_id,
        token,
    )
    .await?;

    let pipeline = Pipeline::new()
        .then(fill_from_flags(flags))
        .then(name_to_id(session, flags.client.as_deref()))
        .then(interactive_props(session))
        .then(interactive_dates(session))
        .then(validate_entry(session))
        .then(update(session));

    let updated = run(pipeline, Draft::from(&source)).await?;
    hydrate(session, &updated.id).await
}

/// `edit-multiple`: the same change applied to several entries.
///
/// Interactively the first entry seeds the prompts and every prompted field
/// is copied to all of them. Otherwise only the given flags are applied. Start
/// and end are never touched.
pub async fn edit_multiple(
    session: &Session<'_>,
    tokens: &[String],
    flags: &EntryFlags,
) -> Result<Vec<HydratedTimeEntry>, CliError> {
    let targets = resolve_tokens(
        session.port,
        &session.workspace_id,
        &session.user_id,
        tokens,
    )
    .await?;
    let Some(first) = targets.first() else {
        return Err(CliError::invalid_argument(
            "at least one time entry is required",
        ));
    };

    let flags = flags.without_times();
    let client = flags.client.as_deref();

    let prompted = if session.is_interactive() {
        let pipeline = Pipeline::new()
            .then(fill_from_flags(&flags))
            .then(name_to_id(session, client))
            .then(interactive_props(session));
        Some(run(pipeline, Draft::from(first)).await?)
    } else {
        None
    };

    let mut edited = Vec::with_capacity(targets.len());
    for target in &targets {
        let (pipeline, draft) = match &prompted {
            Some(prompted) => (
                Pipeline::new()
                    .then(validate_entry(session))
                    .then(update(session)),
                copy_prompted(prompted, Draft::from(target), &flags),
            ),
            None => (
                Pipeline::new()
                    .then(fill_from_flags(&flags))
                    .then(name_to_id(session, client))
                    .then(validate_entry(session))
                    .then(update(session)),
                Draft::from(target),
            ),
        };
        let updated = run(pipeline, draft).await?;
        edited.push(hydrate(session, &updated.id).await?);
    }
    Ok(edited)
}

fn copy_prompted(prompted: &Draft, target: Draft, flags: &EntryFlags) -> Draft {
    let draft = target
        .with_project(prompted.project_id())
        .with_task(prompted.task_id())
        .with_description(prompted.description.clone())
        .with_tags(prompted.tag_ids().to_vec());
    if flags.billable.is_set() {
        draft.with_billable(flags.billable)
    } else {
        draft
    }
}

/// Rejects split points that are out of order or outside `[start, end)`.
pub fn check_splits(
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
    splits: &[DateTime<Utc>],
) -> Result<(), SplitError> {
    let mut previous = start;
    for (i, split) in splits.iter().enumerate() {
        if *split <= start {
            return Err(SplitError::before_start(start));
        }
        if i > 0 && *split <= previous {
            return Err(SplitError::not_increasing(*split));
        }
        if let Some(end) = end {
            if *split >= end {
                return Err(SplitError::after_end(end));
            }
        }
        previous = *split;
    }
    Ok(())
}

/// The `N + 1` intervals `[start, end)` is cut into.
pub fn split_intervals(
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
    splits: &[DateTime<Utc>],
) -> Vec<(DateTime<Utc>, Option<DateTime<Utc>>)> {
    let starts = std::iter::once(start).chain(splits.iter().copied());
    let ends = splits.iter().copied().map(Some).chain(std::iter::once(end));
    starts.zip(ends).collect()
}

/// `split`: cuts an entry at the given times.
///
/// The source entry is shortened first; the new pieces are created and then
/// fetched concurrently.
pub async fn split(
    session: &Session<'_>,
    token: &str,
    points: &[String],
) -> Result<Vec<HydratedTimeEntry>, CliError> {
    if points.is_empty() {
        return Err(CliError::invalid_argument(
            "at least one time to split at is required",
        ));
    }
    let port = session.port;
    let workspace_id = session.workspace_id.as_str();

    let source = resolve_token(port, workspace_id, &session.user_id, token).await?;
    let interval = &source.time_interval;
    let reference = interval.start.with_timezone(&Local);
    let splits = points
        .iter()
        .map(|p| time_parser::parse_time_at(p, reference))
        .collect::<Result<Vec<_>, _>>()?;
    check_splits(interval.start, interval.end, &splits)?;

    let draft = Draft::from(&source);
    let mut pieces = split_intervals(interval.start, interval.end, &splits).into_iter();
    let Some((first_start, first_end)) = pieces.next() else {
        return Err(CliError::invalid_argument("nothing to split"));
    };

    let shortened = draft
        .clone()
        .with_start(first_start)
        .with_end(first_end)
        .to_payload();
    let updated = port
        .update_time_entry(workspace_id, &source.id, &shortened)
        .await?;
    tracing::debug!(id = %updated.id, pieces = splits.len(), "split source entry");

    let payloads: Vec<_> = pieces
        .map(|(start, end)| draft.clone().with_start(start).with_end(end).to_payload())
        .collect();
    let created = try_join_all(
        payloads
            .iter()
            .map(|payload| port.create_time_entry(workspace_id, payload)),
    )
    .await?;

    let ids: Vec<String> = std::iter::once(updated.id)
        .chain(created.into_iter().map(|e| e.id))
        .collect();
    try_join_all(ids.iter().map(|id| hydrate(session, id))).await
}

/// `out`: stops the running entry. `None` when the server no longer had one.
pub async fn stop(
    session: &Session<'_>,
    when: Option<&str>,
) -> Result<Option<HydratedTimeEntry>, CliError> {
    let end = match when {
        Some(when) => time_parser::parse_time(when)?,
        None => Utc::now(),
    };
    running_entry(session.port, &session.workspace_id, &session.user_id)
        .await?
        .ok_or(CliError::NoRunning)?;

    match session
        .port
        .stop_running(&session.workspace_id, &session.user_id, end)
        .await
    {
        Ok(stopped) => Ok(Some(hydrate(session, &stopped.id).await?)),
        Err(error) if error.is_not_found() => {
            tracing::warn!(%error, "running entry was already stopped");
            Ok(None)
        }
        Err(error) => Err(error),
    }
}

/// Deletes entries one by one, stopping at the first failure.
pub async fn delete(session: &Session<'_>, tokens: &[String]) -> Result<Vec<String>, CliError> {
    let mut deleted = Vec::with_capacity(tokens.len());
    for token in tokens {
        let entry = resolve_token(
            session.port,
            &session.workspace_id,
            &session.user_id,
            token,
        )
        .await?;
        session
            .port
            .delete_time_entry(&session.workspace_id, &entry.id)
            .await?;
        tracing::debug!(id = %entry.id, "deleted time entry");
        deleted.push(entry.id);
    }
    Ok(deleted)
}

/// `mark-invoiced` and `mark-not-invoiced`, in one bulk call.
pub async fn mark_invoiced(
    session: &Session<'_>,
    tokens: &[String],
    invoiced: bool,
) -> Result<Vec<HydratedTimeEntry>, CliError> {
    let tokens: Vec<String> = tokens.iter().map(|t| t.trim().to_string()).unique().collect();
    let entries = resolve_tokens(
        session.port,
        &session.workspace_id,
        &session.user_id,
        &tokens,
    )
    .await?;
    let ids: Vec<String> = entries.into_iter().map(|e| e.id).unique().collect();
    if ids.is_empty() {
        return Err(CliError::invalid_argument(
            "at least one time entry is required",
        ));
    }

    let mut hydrated = try_join_all(ids.iter().map(|id| hydrate(session, id))).await?;
    session
        .port
        .change_invoiced(&session.workspace_id, &ids, invoiced)
        .await?;

    for entry in &mut hydrated {
        entry.invoiced = invoiced;
    }
    Ok(hydrated)
}

pub async fn show(session: &Session<'_>, token: &str) -> Result<HydratedTimeEntry, CliError> {
    let entry = resolve_token(
        session.port,
        &session.workspace_id,
        &session.user_id,
        token,
    )
    .await?;
    hydrate(session, &entry.id).await
}
