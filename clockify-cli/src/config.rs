use std::path::{Path, PathBuf};

use chrono::Weekday;
use config::{File, FileFormat};
use serde::Deserialize;

use crate::domain::{
    models::{EntryDefaults, Preferences, DEFAULT_AUTOCOMPLETE_DAYS},
    CliError,
};

const CONFIG_FILE_NAME: &str = ".clockify-cli.yaml";
const APP_DIR: &str = "clockify-cli";
const DEFAULTS_FILE_NAME: &str = "defaults.yaml";

/// Contents of `~/.clockify-cli.yaml`, with environment overrides applied.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Settings {
    pub token: Option<String>,
    pub workspace: Option<String>,
    pub user_id: Option<String>,
    pub interactive: bool,
    pub allow_name_for_id: bool,
    pub search_project_with_client: bool,
    pub allow_incomplete: bool,
    pub description_autocomplete: bool,
    pub description_autocomplete_days: u32,
    pub show_task: bool,
    pub show_total_duration: bool,
    pub debug: bool,
    pub workweek_days: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            token: None,
            workspace: None,
            user_id: None,
            interactive: false,
            allow_name_for_id: false,
            search_project_with_client: false,
            allow_incomplete: false,
            description_autocomplete: false,
            description_autocomplete_days: DEFAULT_AUTOCOMPLETE_DAYS,
            show_task: false,
            show_total_duration: false,
            debug: false,
            workweek_days: vec![],
        }
    }
}

fn config_error(e: impl std::fmt::Display) -> CliError {
    CliError::Config(e.to_string())
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_FILE_NAME))
}

pub fn defaults_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(DEFAULTS_FILE_NAME))
}

fn env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Reads the settings file, if any, then the `CLOCKIFY_*` variables.
pub fn read_settings(path: Option<&Path>) -> Result<Settings, CliError> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(
            File::from(path)
                .format(FileFormat::Yaml)
                .required(false),
        );
    }

    let settings = builder
        .set_override_option("token", env("CLOCKIFY_TOKEN"))
        .and_then(|b| b.set_override_option("workspace", env("CLOCKIFY_WORKSPACE")))
        .and_then(|b| b.set_override_option("user-id", env("CLOCKIFY_USER_ID")))
        .and_then(|b| b.set_override_option("interactive", env("CLOCKIFY_INTERACTIVE")))
        .and_then(|b| b.build())
        .map_err(config_error)?;

    settings.try_deserialize::<Settings>().map_err(config_error)
}

/// Reads the last used entry values; a missing file means no defaults.
pub fn read_defaults(path: Option<&Path>) -> Result<EntryDefaults, CliError> {
    let Some(path) = path else {
        return Ok(EntryDefaults::default());
    };
    config::Config::builder()
        .add_source(
            File::from(path)
                .format(FileFormat::Yaml)
                .required(false),
        )
        .build()
        .and_then(|c| c.try_deserialize::<EntryDefaults>())
        .map_err(config_error)
}

fn parse_weekday(day: &str) -> Result<Weekday, CliError> {
    day.trim()
        .parse::<Weekday>()
        .map_err(|_| CliError::Config(format!("\"{}\" is not a day of the week", day)))
}

impl Settings {
    pub fn preferences(&self) -> Result<Preferences, CliError> {
        let workweek_days = self
            .workweek_days
            .iter()
            .map(|d| parse_weekday(d))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Preferences {
            interactive: self.interactive,
            allow_name_for_id: self.allow_name_for_id,
            search_project_with_client: self.search_project_with_client,
            allow_incomplete: self.allow_incomplete,
            description_autocomplete: self.description_autocomplete,
            description_autocomplete_days: self.description_autocomplete_days,
            show_task: self.show_task,
            show_total_duration: self.show_total_duration,
            workweek_days,
        })
    }
}
