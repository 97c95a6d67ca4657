mod client;
mod entry;
mod report;

use chrono::Utc;
use clockify::{CredentialsError, HydratedTimeEntry, User};

use crate::{
    adapters::{clockify::ClockifyAdapter, terminal::TerminalPrompter},
    cli::{Cli, Commands, GlobalArgs, OutputArgs},
    config::{self, Settings},
    domain::{
        models::{EntryDefaults, Preferences},
        ports::{ClockifyPort, Prompter},
        resolver::resolve_workspace,
        CliError, Session,
    },
    output::{render_entries, OutputMode},
};

/// What every command starts from: settings merged with the global flags and
/// a connection to Clockify when a token is known.
pub struct Context {
    global: GlobalArgs,
    settings: Settings,
    defaults: EntryDefaults,
    preferences: Preferences,
    port: Option<Box<dyn ClockifyPort>>,
    prompter: Box<dyn Prompter>,
}

impl Context {
    pub fn new(global: GlobalArgs, settings: Settings) -> Result<Self, CliError> {
        let mut preferences = settings.preferences()?;
        if let Some(interactive) = global.interactive()? {
            preferences.interactive = interactive;
        }
        preferences.allow_name_for_id |= global.allow_name_for_id;

        let defaults = config::read_defaults(config::defaults_path().as_deref())?;
        let port = global
            .token
            .clone()
            .or_else(|| settings.token.clone())
            .filter(|token| !token.trim().is_empty())
            .map(ClockifyAdapter::connect)
            .transpose()?
            .map(|adapter| Box::new(adapter) as Box<dyn ClockifyPort>);

        Ok(Self {
            global,
            settings,
            defaults,
            preferences,
            port,
            prompter: Box::new(TerminalPrompter),
        })
    }

    pub fn defaults(&self) -> &EntryDefaults {
        &self.defaults
    }

    fn port(&self) -> Result<&dyn ClockifyPort, CliError> {
        self.port
            .as_deref()
            .ok_or_else(|| CliError::Config(CredentialsError::MissingToken.to_string()))
    }

    /// Resolves workspace and user, asking Clockify only for what no flag,
    /// variable or file provided.
    pub async fn session(&self, allow_incomplete: bool) -> Result<Session<'_>, CliError> {
        let port = self.port()?;
        let mut me: Option<User> = None;

        let workspace = first_given([
            self.global.workspace.as_deref(),
            self.settings.workspace.as_deref(),
            self.defaults.workspace.as_deref(),
        ]);
        let workspace_id = match workspace {
            Some(term) if self.preferences.allow_name_for_id => {
                resolve_workspace(port, term).await?
            }
            Some(id) => id.to_string(),
            None => {
                let user = port.get_me().await?;
                let id = active_workspace(&user)?;
                me = Some(user);
                id
            }
        };

        let user_id = match first_given([
            self.global.user_id.as_deref(),
            self.settings.user_id.as_deref(),
        ]) {
            Some(id) => id.to_string(),
            None => match me {
                Some(user) => user.id,
                None => port.get_me().await?.id,
            },
        };
        tracing::debug!(%workspace_id, %user_id, "session ready");

        Ok(Session::new(
            port,
            self.prompter.as_ref(),
            self.preferences.clone(),
            workspace_id,
            user_id,
        )
        .allowing_incomplete(allow_incomplete))
    }

    pub fn print_entries(
        &self,
        entries: &[HydratedTimeEntry],
        mode: &OutputMode,
        output: &OutputArgs,
    ) -> Result<(), CliError> {
        let options = output.list_options(
            self.preferences.show_task,
            self.preferences.show_total_duration,
        );
        print(render_entries(entries, mode, &options, Utc::now())?);
        Ok(())
    }
}

fn first_given<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> Option<&'a str> {
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|value| !value.is_empty())
}

fn active_workspace(user: &User) -> Result<String, CliError> {
    [&user.active_workspace, &user.default_workspace]
        .into_iter()
        .find(|id| !id.is_empty())
        .cloned()
        .ok_or_else(|| CliError::NotFound("no workspace is set for this user".to_string()))
}

pub(crate) fn print(rendered: String) {
    print!("{}", rendered);
}

pub async fn run(cli: Cli, settings: Settings) -> Result<(), CliError> {
    let context = Context::new(cli.global, settings)?;

    match cli.command {
        Commands::In(command) => entry::start(&context, &command).await,
        Commands::Out { when, output } => entry::stop(&context, when.as_deref(), &output).await,
        Commands::Manual(command) => entry::manual(&context, &command).await,
        Commands::Clone {
            id,
            no_closing,
            entry,
            output,
        } => entry::clone_entry(&context, &id, no_closing, &entry, &output).await,
        Commands::Edit { id, entry, output } => {
            entry::edit(&context, &id, &entry, &output).await
        }
        Commands::EditMultiple { ids, entry, output } => {
            entry::edit_multiple(&context, &ids, &entry, &output).await
        }
        Commands::Split { id, times, output } => {
            entry::split(&context, &id, &times, &output).await
        }
        Commands::Delete { ids } => entry::delete(&context, &ids).await,
        Commands::Show { id, output } => entry::show(&context, &id, &output).await,
        Commands::MarkInvoiced { ids, output } => {
            entry::mark_invoiced(&context, &ids, true, &output).await
        }
        Commands::MarkNotInvoiced { ids, output } => {
            entry::mark_invoiced(&context, &ids, false, &output).await
        }
        Commands::Report(command) => report::report(&context, &command).await,
        Commands::Client(command) => client::client(&context, &command).await,
    }
}

/// A context over `port` with workspace and user already configured.
#[cfg(test)]
pub(crate) fn test_context(port: crate::adapters::mock::MockClockify) -> Context {
    use crate::adapters::mock::{ScriptedPrompter, USER, WORKSPACE};

    Context {
        global: GlobalArgs::default(),
        settings: Settings {
            workspace: Some(WORKSPACE.to_string()),
            user_id: Some(USER.to_string()),
            ..Default::default()
        },
        defaults: EntryDefaults::default(),
        preferences: Preferences::default(),
        port: Some(Box::new(port)),
        prompter: Box::new(ScriptedPrompter::default()),
    }
}
