use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::{
    domain::{
        models::{Billable, EntryFlags},
        CliError,
    },
    output::{ensure_exclusive, EntryListOptions, OutputFlags},
};

#[derive(Debug, Parser)]
#[command(name = "clockify-cli")]
#[command(about = "Track, edit and report Clockify time entries from the terminal")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Args, Default)]
pub struct GlobalArgs {
    /// Configuration file (defaults to ~/.clockify-cli.yaml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Clockify API token
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Workspace id, or name when names are allowed
    #[arg(short, long, global = true)]
    pub workspace: Option<String>,

    #[arg(short, long, global = true)]
    pub user_id: Option<String>,

    /// Ask for missing values
    #[arg(short, long, global = true)]
    pub interactive: bool,

    #[arg(long, global = true)]
    pub no_interactive: bool,

    /// Accept project, task and tag names where ids are expected
    #[arg(long, global = true)]
    pub allow_name_for_id: bool,

    /// Log remote calls to stderr
    #[arg(long, global = true)]
    pub debug: bool,
}

impl GlobalArgs {
    /// `Some` when the interactive mode was chosen on the command line.
    pub fn interactive(&self) -> Result<Option<bool>, CliError> {
        ensure_exclusive(&[
            ("interactive", self.interactive),
            ("no-interactive", self.no_interactive),
        ])?;
        Ok(if self.interactive {
            Some(true)
        } else if self.no_interactive {
            Some(false)
        } else {
            None
        })
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start a time entry, closing the running one
    In(EntryCommand),
    /// Stop the running time entry
    Out {
        /// When to stop it, defaults to now
        #[arg(short = 's', long)]
        when: Option<String>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Create a finished time entry
    Manual(EntryCommand),
    /// Start a copy of a time entry
    Clone {
        /// Entry to copy: an id, current, last, latest or ^n
        #[arg(default_value = "last")]
        id: String,
        /// Leave the running entry alone
        #[arg(long)]
        no_closing: bool,
        #[command(flatten)]
        entry: EntryArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Change a time entry
    Edit {
        /// An id, current, last, latest or ^n
        id: String,
        #[command(flatten)]
        entry: EntryArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Apply the same change to several time entries
    EditMultiple {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
        #[command(flatten)]
        entry: EntryArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Cut a time entry at the given times
    Split {
        id: String,
        #[arg(required = true, num_args = 1..)]
        times: Vec<String>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Delete time entries
    #[command(visible_aliases = ["del", "rm", "remove"])]
    Delete {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },
    /// Show a time entry
    Show {
        #[arg(default_value = "current")]
        id: String,
        #[command(flatten)]
        output: OutputArgs,
    },
    MarkInvoiced {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
        #[command(flatten)]
        output: OutputArgs,
    },
    MarkNotInvoiced {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// List time entries in a date range
    Report(ReportCommand),
    /// Manage clients
    #[command(subcommand)]
    Client(ClientCommand),
}

#[derive(Debug, Args)]
pub struct EntryCommand {
    #[command(flatten)]
    pub entry: EntryArgs,
    #[command(flatten)]
    pub output: OutputArgs,
}

/// Time entry fields shared by the write commands.
#[derive(Debug, Args, Default)]
pub struct EntryArgs {
    #[arg(short, long)]
    pub project: Option<String>,

    #[arg(long)]
    pub task: Option<String>,

    #[arg(short, long)]
    pub description: Option<String>,

    #[arg(short = 'T', long = "tag", action = ArgAction::Append)]
    pub tags: Vec<String>,

    #[arg(short, long)]
    pub billable: bool,

    #[arg(short, long)]
    pub not_billable: bool,

    /// Start time
    #[arg(short = 's', long)]
    pub when: Option<String>,

    /// End time
    #[arg(short = 'e', long)]
    pub when_to_close: Option<String>,

    /// Only look for the project under this client
    #[arg(short, long)]
    pub client: Option<String>,

    /// Skip the workspace rules
    #[arg(short = 'A', long)]
    pub allow_incomplete: bool,
}

impl EntryArgs {
    pub fn to_flags(&self) -> Result<EntryFlags, CliError> {
        ensure_exclusive(&[
            ("billable", self.billable),
            ("not-billable", self.not_billable),
        ])?;
        let billable = if self.billable {
            Billable::Yes
        } else if self.not_billable {
            Billable::No
        } else {
            Billable::Unset
        };

        Ok(EntryFlags {
            project: self.project.clone(),
            task: self.task.clone(),
            description: self.description.clone(),
            tags: (!self.tags.is_empty()).then(|| self.tags.clone()),
            billable,
            when: self.when.clone(),
            when_to_close: self.when_to_close.clone(),
            client: self.client.clone(),
            allow_incomplete: self.allow_incomplete,
        })
    }
}

#[derive(Debug, Args, Default)]
pub struct OutputArgs {
    /// Go-style template, e.g. '{{.ID}} {{fdt .TimeInterval.Start}}'
    #[arg(short, long)]
    pub format: Option<String>,

    #[arg(short, long)]
    pub json: bool,

    #[arg(short = 'v', long)]
    pub csv: bool,

    /// Only print ids
    #[arg(short, long)]
    pub quiet: bool,

    #[arg(short, long)]
    pub md: bool,

    /// Total hours as a decimal number
    #[arg(short = 'F', long)]
    pub duration_float: bool,

    /// Total duration as H:MM:SS
    #[arg(short = 'D', long)]
    pub duration_formatted: bool,

    /// Add a total row to tables
    #[arg(short = 'S', long)]
    pub with_totals: bool,
}

impl OutputArgs {
    pub fn flags(&self) -> OutputFlags {
        OutputFlags {
            format: self.format.clone(),
            json: self.json,
            csv: self.csv,
            quiet: self.quiet,
            md: self.md,
            duration_float: self.duration_float,
            duration_formatted: self.duration_formatted,
        }
    }

    pub fn list_options(&self, show_task: bool, show_total_duration: bool) -> EntryListOptions {
        EntryListOptions {
            with_totals: self.with_totals,
            show_task,
            show_total_duration,
        }
    }
}

#[derive(Debug, Args)]
#[command(args_conflicts_with_subcommands = true)]
pub struct ReportCommand {
    #[command(subcommand)]
    pub range: Option<ReportRange>,

    /// First day (YYYY-MM-DD or any time expression)
    pub start: Option<String>,

    /// Last day, defaults to the first
    pub end: Option<String>,

    #[command(flatten)]
    pub args: ReportArgs,
}

#[derive(Debug, Subcommand)]
pub enum ReportRange {
    Today(ReportArgs),
    Yesterday(ReportArgs),
    /// Sunday to Saturday of this week
    ThisWeek(ReportArgs),
    LastWeek(ReportArgs),
    ThisMonth(ReportArgs),
    LastMonth(ReportArgs),
    /// The day of the last finished entry
    LastDay(ReportArgs),
    /// The last workday before today
    LastWeekDay(ReportArgs),
}

impl ReportRange {
    pub fn args(&self) -> &ReportArgs {
        match self {
            Self::Today(args)
            | Self::Yesterday(args)
            | Self::ThisWeek(args)
            | Self::LastWeek(args)
            | Self::ThisMonth(args)
            | Self::LastMonth(args)
            | Self::LastDay(args)
            | Self::LastWeekDay(args) => args,
        }
    }
}

#[derive(Debug, Args, Default)]
pub struct ReportArgs {
    /// Only entries whose description contains this
    #[arg(short, long)]
    pub description: Option<String>,

    #[arg(short, long)]
    pub project: Option<String>,

    /// Add empty entries for days without any
    #[arg(short = 'e', long)]
    pub fill_missing_dates: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Subcommand)]
pub enum ClientCommand {
    /// Create a client
    Add {
        name: String,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// List clients
    #[command(visible_alias = "ls")]
    List {
        /// Only clients whose name contains this
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        archived: bool,
        #[arg(long)]
        not_archived: bool,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn billable_and_not_billable_conflict() {
        let cli = Cli::try_parse_from(["clockify-cli", "in", "--billable", "--not-billable"])
            .unwrap();
        let Commands::In(command) = cli.command else {
            panic!("expected in");
        };
        let err = command.entry.to_flags().unwrap_err();
        assert!(matches!(err, CliError::FlagConflict(_)));
        assert!(err.to_string().contains("billable and not-billable"));
    }

    #[test]
    fn parses_entry_flags() {
        let cli = Cli::try_parse_from([
            "clockify-cli",
            "edit",
            "current",
            "-p",
            "newproj",
            "--task=newtask",
            "-T",
            "a",
            "-T",
            "b",
        ])
        .unwrap();
        let Commands::Edit { id, entry, .. } = cli.command else {
            panic!("expected edit");
        };
        let flags = entry.to_flags().unwrap();
        assert_eq!(id, "current");
        assert_eq!(flags.project.as_deref(), Some("newproj"));
        assert_eq!(flags.task.as_deref(), Some("newtask"));
        assert_eq!(flags.tags, Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(flags.billable, Billable::Unset);
    }

    #[test]
    fn empty_project_flag_is_kept() {
        let cli = Cli::try_parse_from(["clockify-cli", "edit", "current", "--project="]).unwrap();
        let Commands::Edit { entry, .. } = cli.command else {
            panic!("expected edit");
        };
        assert_eq!(entry.to_flags().unwrap().project.as_deref(), Some(""));
    }

    #[test]
    fn delete_has_aliases() {
        for alias in ["del", "rm", "remove"] {
            let cli = Cli::try_parse_from(["clockify-cli", alias, "^2"]).unwrap();
            assert!(matches!(cli.command, Commands::Delete { .. }));
        }
    }

    #[test]
    fn report_accepts_range_or_subcommand() {
        let cli = Cli::try_parse_from([
            "clockify-cli",
            "report",
            "2006-01-01",
            "2006-01-04",
            "--fill-missing-dates",
            "--format",
            "{{.ID}}",
        ])
        .unwrap();
        let Commands::Report(report) = cli.command else {
            panic!("expected report");
        };
        assert!(report.range.is_none());
        assert_eq!(report.start.as_deref(), Some("2006-01-01"));
        assert!(report.args.fill_missing_dates);

        let cli = Cli::try_parse_from(["clockify-cli", "report", "last-week-day", "-q"]).unwrap();
        let Commands::Report(report) = cli.command else {
            panic!("expected report");
        };
        assert!(matches!(report.range, Some(ReportRange::LastWeekDay(_))));
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli = Cli::try_parse_from(["clockify-cli", "show", "-w", "ws-1", "--no-interactive"])
            .unwrap();
        assert_eq!(cli.global.workspace.as_deref(), Some("ws-1"));
        assert_eq!(cli.global.interactive().unwrap(), Some(false));
    }
}
