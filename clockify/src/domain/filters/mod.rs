mod client_filter;
mod paging;
mod project_filter;
mod tag_filter;
mod task_filter;
mod time_entry_filter;

pub use client_filter::ClientFilter;
pub use paging::{Paging, DEFAULT_PAGE_SIZE, MAX_PAGES};
pub use project_filter::ProjectFilter;
pub use tag_filter::TagFilter;
pub use task_filter::TaskFilter;
pub use time_entry_filter::TimeEntryFilter;

/// Query-string representation of a listing filter.
///
/// Paging is not part of the pairs; the client adds it per request.
pub trait ClockifyFilter {
    fn query_pairs(&self) -> Vec<(&'static str, String)>;
}
