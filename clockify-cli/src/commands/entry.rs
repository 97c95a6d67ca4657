use super::Context;
use crate::{
    cli::{EntryArgs, EntryCommand, OutputArgs},
    domain::{services, CliError},
};

pub async fn start(context: &Context, command: &EntryCommand) -> Result<(), CliError> {
    let mode = command.output.flags().mode()?;
    let flags = command.entry.to_flags()?;
    let session = context.session(flags.allow_incomplete).await?;

    let created = services::start(&session, &flags, context.defaults()).await?;
    context.print_entries(&[created], &mode, &command.output)
}

pub async fn manual(context: &Context, command: &EntryCommand) -> Result<(), CliError> {
    let mode = command.output.flags().mode()?;
    let flags = command.entry.to_flags()?;
    let session = context.session(flags.allow_incomplete).await?;

    let created = services::manual(&session, &flags).await?;
    context.print_entries(&[created], &mode, &command.output)
}

pub async fn stop(
    context: &Context,
    when: Option<&str>,
    output: &OutputArgs,
) -> Result<(), CliError> {
    let mode = output.flags().mode()?;
    let session = context.session(false).await?;

    match services::stop(&session, when).await? {
        Some(stopped) => context.print_entries(&[stopped], &mode, output),
        None => Ok(()),
    }
}

pub async fn clone_entry(
    context: &Context,
    id: &str,
    no_closing: bool,
    entry: &EntryArgs,
    output: &OutputArgs,
) -> Result<(), CliError> {
    let mode = output.flags().mode()?;
    let flags = entry.to_flags()?;
    let session = context.session(flags.allow_incomplete).await?;

    let created = services::clone_entry(&session, id, &flags, no_closing).await?;
    context.print_entries(&[created], &mode, output)
}

pub async fn edit(
    context: &Context,
    id: &str,
    entry: &EntryArgs,
    output: &OutputArgs,
) -> Result<(), CliError> {
    let mode = output.flags().mode()?;
    let flags = entry.to_flags()?;
    let session = context.session(flags.allow_incomplete).await?;

    let updated = services::edit(&session, id, &flags).await?;
    context.print_entries(&[updated], &mode, output)
}

pub async fn edit_multiple(
    context: &Context,
    ids: &[String],
    entry: &EntryArgs,
    output: &OutputArgs,
) -> Result<(), CliError> {
    let mode = output.flags().mode()?;
    let flags = entry.to_flags()?;
    let session = context.session(flags.allow_incomplete).await?;

    let updated = services::edit_multiple(&session, ids, &flags).await?;
    context.print_entries(&updated, &mode, output)
}

pub async fn split(
    context: &Context,
    id: &str,
    times: &[String],
    output: &OutputArgs,
) -> Result<(), CliError> {
    let mode = output.flags().mode()?;
    let session = context.session(false).await?;

    let pieces = services::split(&session, id, times).await?;
    context.print_entries(&pieces, &mode, output)
}

pub async fn delete(context: &Context, ids: &[String]) -> Result<(), CliError> {
    let session = context.session(false).await?;
    let deleted = services::delete(&session, ids).await?;
    tracing::debug!(count = deleted.len(), "time entries deleted");
    Ok(())
}

pub async fn show(context: &Context, id: &str, output: &OutputArgs) -> Result<(), CliError> {
    let mode = output.flags().mode()?;
    let session = context.session(false).await?;

    let entry = services::show(&session, id).await?;
    context.print_entries(&[entry], &mode, output)
}

pub async fn mark_invoiced(
    context: &Context,
    ids: &[String],
    invoiced: bool,
    output: &OutputArgs,
) -> Result<(), CliError> {
    let mode = output.flags().mode()?;
    let session = context.session(false).await?;

    let changed = services::mark_invoiced(&session, ids, invoiced).await?;
    context.print_entries(&changed, &mode, output)
}
