use chrono::{Local, NaiveDate};

use super::Context;
use crate::{
    cli::{ReportCommand, ReportRange},
    domain::{
        services::{self, DateRange, ReportFilter},
        time_parser, CliError, Session,
    },
};

pub async fn report(context: &Context, command: &ReportCommand) -> Result<(), CliError> {
    let args = command
        .range
        .as_ref()
        .map_or(&command.args, ReportRange::args);
    let mode = args.output.flags().mode()?;
    let session = context.session(false).await?;

    let range = match &command.range {
        Some(range) => named_range(&session, range).await?,
        None => explicit_range(command.start.as_deref(), command.end.as_deref())?,
    };
    let filter = ReportFilter {
        description: args.description.clone(),
        project: args.project.clone(),
        fill_missing_dates: args.fill_missing_dates,
    };

    let entries = services::report(&session, &range, &filter).await?;
    context.print_entries(&entries, &mode, &args.output)
}

async fn named_range(session: &Session<'_>, range: &ReportRange) -> Result<DateRange, CliError> {
    let today = Local::now().date_naive();
    Ok(match range {
        ReportRange::Today(_) => DateRange::today(today),
        ReportRange::Yesterday(_) => DateRange::yesterday(today),
        ReportRange::ThisWeek(_) => DateRange::this_week(today),
        ReportRange::LastWeek(_) => DateRange::last_week(today),
        ReportRange::ThisMonth(_) => DateRange::this_month(today),
        ReportRange::LastMonth(_) => DateRange::last_month(today),
        ReportRange::LastDay(_) => services::last_day(session).await?,
        ReportRange::LastWeekDay(_) => DateRange::last_week_day(today, &session.preferences),
    })
}

fn explicit_range(start: Option<&str>, end: Option<&str>) -> Result<DateRange, CliError> {
    let start = start.ok_or_else(|| {
        CliError::invalid_argument("report needs a start date or a range such as \"today\"")
    })?;
    let start = parse_day(start)?;
    match end {
        Some(end) => DateRange::new(start, parse_day(end)?),
        None => Ok(DateRange::day(start)),
    }
}

/// `YYYY-MM-DD`, or any time expression taken as its local day.
fn parse_day(input: &str) -> Result<NaiveDate, CliError> {
    let input = input.trim();
    match NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        Ok(day) => Ok(day),
        Err(_) => {
            time_parser::parse_time(input).map(|at| at.with_timezone(&Local).date_naive())
        }
    }
}
