use clockify::Client;

use super::{print, Context};
use crate::{
    cli::ClientCommand,
    domain::{resolver::normalize, CliError},
    output::{ensure_exclusive, render_clients},
};

pub async fn client(context: &Context, command: &ClientCommand) -> Result<(), CliError> {
    match command {
        ClientCommand::Add { name, output } => {
            let mode = output.flags().mode()?;
            let name = name.trim();
            if name.is_empty() {
                return Err(CliError::invalid_argument("client name can't be empty"));
            }
            let session = context.session(false).await?;

            let created = session.port.add_client(&session.workspace_id, name).await?;
            tracing::debug!(id = %created.id, "client created");
            print(render_clients(&[created], &mode)?);
            Ok(())
        }
        ClientCommand::List {
            name,
            archived,
            not_archived,
            output,
        } => {
            let mode = output.flags().mode()?;
            ensure_exclusive(&[("archived", *archived), ("not-archived", *not_archived)])?;
            let archived = match (archived, not_archived) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            let session = context.session(false).await?;

            let clients = session
                .port
                .get_clients(&session.workspace_id, archived)
                .await?;
            print(render_clients(&named(clients, name.as_deref()), &mode)?);
            Ok(())
        }
    }
}

/// Keeps the clients whose name contains `term`, ignoring case and accents.
fn named(clients: Vec<Client>, term: Option<&str>) -> Vec<Client> {
    let Some(term) = term.map(str::trim).filter(|t| !t.is_empty()).map(normalize) else {
        return clients;
    };
    clients
        .into_iter()
        .filter(|client| normalize(&client.name).contains(&term))
        .collect()
}
