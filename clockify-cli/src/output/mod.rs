//! Rendering of command results.
//!
//! Every renderer returns the whole text so commands decide where it goes.

mod clients;
mod duration;
mod entries;
pub mod template;

pub use clients::render_clients;
pub use entries::{render_entries, EntryListOptions};

use crate::domain::CliError;

/// Output flags shared by every command that prints entries or clients.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputFlags {
    pub format: Option<String>,
    pub json: bool,
    pub csv: bool,
    pub quiet: bool,
    pub md: bool,
    pub duration_float: bool,
    pub duration_formatted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMode {
    Table,
    Json,
    Csv,
    Quiet,
    Markdown,
    Template(String),
    /// Total hours as a decimal number.
    DurationFloat,
    /// Total duration as `H:MM:SS`.
    DurationFormatted,
}

impl OutputFlags {
    /// The single requested mode, table when none.
    pub fn mode(&self) -> Result<OutputMode, CliError> {
        ensure_exclusive(&[
            ("format", self.format.is_some()),
            ("json", self.json),
            ("csv", self.csv),
            ("quiet", self.quiet),
            ("md", self.md),
            ("duration-float", self.duration_float),
            ("duration-formatted", self.duration_formatted),
        ])?;

        Ok(if let Some(format) = &self.format {
            OutputMode::Template(format.clone())
        } else if self.json {
            OutputMode::Json
        } else if self.csv {
            OutputMode::Csv
        } else if self.quiet {
            OutputMode::Quiet
        } else if self.md {
            OutputMode::Markdown
        } else if self.duration_float {
            OutputMode::DurationFloat
        } else if self.duration_formatted {
            OutputMode::DurationFormatted
        } else {
            OutputMode::Table
        })
    }
}

/// Fails when more than one of the named flags is set.
pub fn ensure_exclusive(flags: &[(&str, bool)]) -> Result<(), CliError> {
    let set: Vec<&str> = flags
        .iter()
        .filter(|(_, set)| *set)
        .map(|(name, _)| *name)
        .collect();
    if set.len() > 1 {
        return Err(CliError::flag_conflict(set));
    }
    Ok(())
}

/// Quotes a CSV field when it needs it.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn csv_line<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| csv_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_flag_means_table() {
        assert_eq!(OutputFlags::default().mode().unwrap(), OutputMode::Table);
    }

    #[test]
    fn single_flag_selects_mode() {
        let flags = OutputFlags {
            format: Some("{{.ID}}".to_string()),
            ..Default::default()
        };
        assert_eq!(
            flags.mode().unwrap(),
            OutputMode::Template("{{.ID}}".to_string())
        );
    }

    #[test]
    fn conflicting_flags_are_listed_sorted() {
        let flags = OutputFlags {
            quiet: true,
            json: true,
            csv: true,
            ..Default::default()
        };
        assert_eq!(
            flags.mode().unwrap_err().to_string(),
            "the following flags can't be used together: csv, json and quiet"
        );
    }

    #[test]
    fn billable_flags_conflict() {
        let err = ensure_exclusive(&[("billable", true), ("not-billable", true)]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "the following flags can't be used together: billable and not-billable"
        );
        assert!(ensure_exclusive(&[("billable", true), ("not-billable", false)]).is_ok());
    }

    #[test]
    fn csv_quotes_only_when_needed() {
        assert_eq!(
            csv_line(&["plain", "a,b", "say \"hi\""]),
            "plain,\"a,b\",\"say \"\"hi\"\"\""
        );
    }
}
