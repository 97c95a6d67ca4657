use chrono::{
    DateTime, Datelike, Duration, Local, Months, NaiveDate, NaiveTime, TimeZone, Utc,
};
use clockify::{HydratedTimeEntry, Paging, TimeEntryFilter};

use crate::domain::{
    models::Preferences,
    resolver::resolve_project,
    CliError, Session,
};

/// Whole local days, both ends included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, CliError> {
        if end < start {
            return Err(CliError::invalid_argument(format!(
                "the report end {} is before its start {}",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    pub fn day(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    /// `[start midnight, end midnight + 24h)` in UTC.
    pub fn bounds(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (
            local_midnight(self.start),
            local_midnight(self.end) + Duration::hours(24),
        )
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |day| *day <= end)
    }

    pub fn today(today: NaiveDate) -> Self {
        Self::day(today)
    }

    pub fn yesterday(today: NaiveDate) -> Self {
        Self::day(previous_day(today))
    }

    /// Sunday to Saturday around `today`.
    pub fn this_week(today: NaiveDate) -> Self {
        let sunday = today - Duration::days(i64::from(today.weekday().num_days_from_sunday()));
        Self {
            start: sunday,
            end: sunday + Duration::days(6),
        }
    }

    pub fn last_week(today: NaiveDate) -> Self {
        Self::this_week(today - Duration::days(7))
    }

    pub fn this_month(today: NaiveDate) -> Self {
        let first = today.with_day(1).unwrap_or(today);
        let last = first
            .checked_add_months(Months::new(1))
            .map(previous_day)
            .unwrap_or(today);
        Self {
            start: first,
            end: last,
        }
    }

    pub fn last_month(today: NaiveDate) -> Self {
        let first = today.with_day(1).unwrap_or(today);
        Self::this_month(previous_day(first))
    }

    /// The closest workday before today.
    pub fn last_week_day(today: NaiveDate, preferences: &Preferences) -> Self {
        let mut day = previous_day(today);
        for _ in 0..7 {
            if preferences.is_workday(day.weekday()) {
                break;
            }
            day = previous_day(day);
        }
        Self::day(day)
    }
}

fn previous_day(day: NaiveDate) -> NaiveDate {
    day.pred_opt().unwrap_or(day)
}

fn local_midnight(day: NaiveDate) -> DateTime<Utc> {
    let midnight = day.and_time(NaiveTime::MIN);
    match midnight.and_local_timezone(Local).earliest() {
        Some(local) => local.with_timezone(&Utc),
        None => Utc.from_utc_datetime(&midnight),
    }
}

fn local_date(at: DateTime<Utc>) -> NaiveDate {
    at.with_timezone(&Local).date_naive()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilter {
    /// Only entries whose description contains this.
    pub description: Option<String>,
    /// Project id, or a name when names are allowed.
    pub project: Option<String>,
    pub fill_missing_dates: bool,
}

/// The user's entries in `range`, oldest first.
pub async fn report(
    session: &Session<'_>,
    range: &DateRange,
    filter: &ReportFilter,
) -> Result<Vec<HydratedTimeEntry>, CliError> {
    let (start, end) = range.bounds();
    let mut query = TimeEntryFilter::new()
        .between(start, end)
        .with_paging(Paging::All);

    if let Some(description) = filter.description.as_deref().filter(|d| !d.is_empty()) {
        query = query.with_description(description);
    }
    if let Some(project) = filter.project.as_deref().filter(|p| !p.is_empty()) {
        let project = if session.preferences.allow_name_for_id {
            resolve_project(
                session.port,
                &session.workspace_id,
                project,
                None,
                session.preferences.search_project_with_client,
            )
            .await?
        } else {
            project.to_string()
        };
        query = query.with_project(project);
    }

    let mut entries = session
        .port
        .list_hydrated_time_entries(&session.workspace_id, &session.user_id, &query)
        .await?;
    entries.sort_by_key(|e| e.time_interval.start);
    tracing::debug!(count = entries.len(), %range.start, %range.end, "report fetched");

    if filter.fill_missing_dates {
        entries = fill_missing_dates(entries, range);
    }
    Ok(entries)
}

/// The day of the most recent finished entry.
pub async fn last_day(session: &Session<'_>) -> Result<DateRange, CliError> {
    let query = TimeEntryFilter::new()
        .in_progress(Some(false))
        .with_paging(Paging::single(1, 1));
    let latest = session
        .port
        .list_time_entries(&session.workspace_id, &session.user_id, &query)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| CliError::NotFound("no finished time entry found".to_string()))?;
    Ok(DateRange::day(local_date(latest.time_interval.start)))
}

/// Adds an empty entry at midnight for every day of `range` without one.
///
/// `entries` must be sorted by start; they are kept in that order.
pub fn fill_missing_dates(
    entries: Vec<HydratedTimeEntry>,
    range: &DateRange,
) -> Vec<HydratedTimeEntry> {
    let placeholder = |day| HydratedTimeEntry::placeholder(local_midnight(day));
    let mut days = range.days().peekable();
    let mut filled = Vec::with_capacity(entries.len());

    for entry in entries {
        let date = local_date(entry.time_interval.start);
        while let Some(day) = days.next_if(|day| *day < date) {
            filled.push(placeholder(day));
        }
        days.next_if(|day| *day == date);
        filled.push(entry);
    }
    filled.extend(days.map(placeholder));
    filled
}
