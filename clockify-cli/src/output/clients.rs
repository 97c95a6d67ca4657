use clockify::Client;
use tabled::{settings::Style, Table, Tabled};

use super::{csv_line, template::Template, OutputMode};
use crate::domain::CliError;

#[derive(Tabled)]
struct ClientRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Archived")]
    archived: String,
}

impl From<&Client> for ClientRow {
    fn from(client: &Client) -> Self {
        Self {
            id: client.id.clone(),
            name: client.name.clone(),
            archived: if client.archived { "yes" } else { "no" }.to_string(),
        }
    }
}

pub fn render_clients(clients: &[Client], mode: &OutputMode) -> Result<String, CliError> {
    match mode {
        OutputMode::Table | OutputMode::Markdown => {
            let mut table = Table::new(clients.iter().map(ClientRow::from));
            if *mode == OutputMode::Markdown {
                table.with(Style::markdown());
            } else {
                table.with(Style::modern());
            }
            Ok(format!("{}\n", table))
        }
        OutputMode::Json => serde_json::to_string_pretty(clients)
            .map(|json| format!("{}\n", json))
            .map_err(|e| CliError::invalid_argument(e.to_string())),
        OutputMode::Csv => {
            let mut out = csv_line(&["id", "name", "workspaceId", "archived"]);
            out.push('\n');
            for client in clients {
                out.push_str(&csv_line(&[
                    client.id.as_str(),
                    client.name.as_str(),
                    client.workspace_id.as_str(),
                    if client.archived { "true" } else { "false" },
                ]));
                out.push('\n');
            }
            Ok(out)
        }
        OutputMode::Quiet => Ok(clients.iter().map(|c| format!("{}\n", c.id)).collect()),
        OutputMode::Template(source) => {
            let template = Template::parse(source)?;
            clients
                .iter()
                .map(|c| template.render(c).map(|line| format!("{}\n", line)))
                .collect()
        }
        OutputMode::DurationFloat | OutputMode::DurationFormatted => Err(
            CliError::invalid_argument("duration output is only available for time entries"),
        ),
    }
}
