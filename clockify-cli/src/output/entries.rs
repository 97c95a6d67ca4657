use chrono::{DateTime, Duration, Local, Utc};
use clockify::HydratedTimeEntry;
use itertools::Itertools;
use tabled::{builder::Builder, settings::Style};

use super::{
    csv_line,
    duration::{format_duration, format_hours},
    template::Template,
    OutputMode,
};
use crate::domain::CliError;

const TABLE_TIME: &str = "%Y-%m-%d %H:%M";
const CSV_TIME: &str = "%Y-%m-%d %H:%M:%S";

/// Modifiers that only apply to entry lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryListOptions {
    pub with_totals: bool,
    pub show_task: bool,
    pub show_total_duration: bool,
}

fn local(at: DateTime<Utc>, format: &str) -> String {
    at.with_timezone(&Local).format(format).to_string()
}

fn total(entries: &[HydratedTimeEntry], now: DateTime<Utc>) -> Duration {
    entries
        .iter()
        .map(|e| e.time_interval.duration_until(now))
        .fold(Duration::zero(), |sum, d| sum + d)
}

fn project_label(entry: &HydratedTimeEntry) -> String {
    match (entry.project_name(), entry.client_name()) {
        ("", _) => String::new(),
        (project, "") => project.to_string(),
        (project, client) => format!("{} - {}", project, client),
    }
}

/// Renders `entries` in `mode`. Running entries are measured up to `now`.
pub fn render_entries(
    entries: &[HydratedTimeEntry],
    mode: &OutputMode,
    options: &EntryListOptions,
    now: DateTime<Utc>,
) -> Result<String, CliError> {
    match mode {
        OutputMode::Table => Ok(table(entries, options, now, false)),
        OutputMode::Markdown => Ok(table(entries, options, now, true)),
        OutputMode::Json => serde_json::to_string_pretty(entries)
            .map(|json| format!("{}\n", json))
            .map_err(|e| CliError::invalid_argument(e.to_string())),
        OutputMode::Csv => Ok(csv(entries, now)),
        OutputMode::Quiet => Ok(entries.iter().map(|e| format!("{}\n", e.id)).collect()),
        OutputMode::Template(source) => {
            let template = Template::parse(source)?;
            entries
                .iter()
                .map(|e| template.render(e).map(|line| format!("{}\n", line)))
                .collect()
        }
        OutputMode::DurationFloat => Ok(format!("{}\n", format_hours(total(entries, now)))),
        OutputMode::DurationFormatted => {
            Ok(format!("{}\n", format_duration(total(entries, now))))
        }
    }
}

fn table(
    entries: &[HydratedTimeEntry],
    options: &EntryListOptions,
    now: DateTime<Utc>,
    markdown: bool,
) -> String {
    let mut builder = Builder::default();

    let mut header = vec!["ID", "Start", "End", "Dur", "Project"];
    if options.show_task {
        header.push("Task");
    }
    header.extend(["Description", "Tags"]);
    builder.push_record(header);

    for entry in entries {
        let interval = &entry.time_interval;
        let mut row = vec![
            entry.id.clone(),
            local(interval.start, TABLE_TIME),
            interval
                .end
                .map(|end| local(end, TABLE_TIME))
                .unwrap_or_else(|| "now".to_string()),
            format_duration(interval.duration_until(now)),
            project_label(entry),
        ];
        if options.show_task {
            row.push(entry.task_name().to_string());
        }
        row.push(entry.description.clone());
        row.push(entry.tags.iter().map(|t| t.name.as_str()).join(", "));
        builder.push_record(row);
    }

    if options.with_totals || options.show_total_duration {
        let mut row = vec![
            String::new(),
            String::new(),
            "TOTAL".to_string(),
            format_duration(total(entries, now)),
            String::new(),
        ];
        if options.show_task {
            row.push(String::new());
        }
        row.extend([String::new(), String::new()]);
        builder.push_record(row);
    }

    let mut table = builder.build();
    if markdown {
        table.with(Style::markdown());
    } else {
        table.with(Style::modern());
    }
    format!("{}\n", table)
}

fn csv(entries: &[HydratedTimeEntry], now: DateTime<Utc>) -> String {
    let mut out = csv_line(&[
        "id",
        "description",
        "project.id",
        "project.name",
        "client.name",
        "task.id",
        "task.name",
        "start",
        "end",
        "duration",
        "billable",
        "invoiced",
        "tags",
    ]);
    out.push('\n');

    for entry in entries {
        let interval = &entry.time_interval;
        let line = csv_line(&[
            entry.id.clone(),
            entry.description.clone(),
            entry.project.as_ref().map(|p| p.id.clone()).unwrap_or_default(),
            entry.project_name().to_string(),
            entry.client_name().to_string(),
            entry.task.as_ref().map(|t| t.id.clone()).unwrap_or_default(),
            entry.task_name().to_string(),
            local(interval.start, CSV_TIME),
            interval.end.map(|end| local(end, CSV_TIME)).unwrap_or_default(),
            format_duration(interval.duration_until(now)),
            entry.billable.to_string(),
            entry.invoiced.to_string(),
            entry.tags.iter().map(|t| t.name.as_str()).join(";"),
        ]);
        out.push_str(&line);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::services::{fill_missing_dates, DateRange};
    use chrono::{NaiveDate, TimeZone};
    use clockify::{Project, TimeEntry, TimeInterval};

    fn entry(id: &str, start: DateTime<Utc>, minutes: i64) -> HydratedTimeEntry {
        let mut entry = HydratedTimeEntry::from(TimeEntry::new(
            id,
            TimeInterval::new(start, Some(start + Duration::minutes(minutes))),
        ));
        entry.description = format!("work on {}", id);
        entry.project = Some(Project::new("p1", "Ops").with_client("c1", "Acme"));
        entry
    }

    fn local_time(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Local
            .with_ymd_and_hms(y, m, d, h, 0, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn template_prints_one_line_per_entry_with_filled_days() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2006, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2006, 1, 4).unwrap(),
        )
        .unwrap();
        let entries = fill_missing_dates(
            vec![
                entry("a", local_time(2006, 1, 1, 9), 60),
                entry("b", local_time(2006, 1, 4, 9), 60),
            ],
            &range,
        );
        let mode = OutputMode::Template("{{.ID}};{{fdt .TimeInterval.Start}}".to_string());

        let out = render_entries(&entries, &mode, &EntryListOptions::default(), Utc::now())
            .unwrap();

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            [
                "a;2006-01-01 09:00:00",
                ";2006-01-02 00:00:00",
                ";2006-01-03 00:00:00",
                "b;2006-01-04 09:00:00",
            ]
        );
    }

    #[test]
    fn durations_sum_all_entries() {
        let now = local_time(2024, 6, 12, 12);
        let mut running = entry("run", local_time(2024, 6, 12, 11), 0);
        running.time_interval.end = None;
        let entries = vec![entry("a", local_time(2024, 6, 12, 8), 90), running];

        let float = render_entries(&entries, &OutputMode::DurationFloat, &Default::default(), now);
        assert_eq!(float.unwrap(), "2.500000\n");
        let formatted =
            render_entries(&entries, &OutputMode::DurationFormatted, &Default::default(), now);
        assert_eq!(formatted.unwrap(), "2:30:00\n");
    }

    #[test]
    fn quiet_prints_ids() {
        let entries = vec![
            entry("a", local_time(2024, 6, 12, 8), 30),
            entry("b", local_time(2024, 6, 12, 9), 30),
        ];
        let out = render_entries(&entries, &OutputMode::Quiet, &Default::default(), Utc::now());
        assert_eq!(out.unwrap(), "a\nb\n");
    }

    #[test]
    fn table_has_optional_task_and_total() {
        let entries = vec![entry("a", local_time(2024, 6, 12, 8), 45)];
        let options = EntryListOptions {
            with_totals: true,
            show_task: true,
            ..Default::default()
        };

        let out = render_entries(&entries, &OutputMode::Table, &options, Utc::now()).unwrap();

        assert!(out.contains("Task"));
        assert!(out.contains("Ops - Acme"));
        assert!(out.contains("TOTAL"));
        assert!(out.contains("0:45:00"));
    }

    #[test]
    fn csv_has_header_and_row() {
        let entries = vec![entry("a", local_time(2024, 6, 12, 8), 45)];
        let out = render_entries(&entries, &OutputMode::Csv, &Default::default(), Utc::now())
            .unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("id,description,project.id"));
        assert!(lines[1].starts_with("a,work on a,p1,Ops,Acme,,,2024-06-12 08:00:00"));
    }
}
