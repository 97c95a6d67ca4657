use chrono::Weekday;

pub const DEFAULT_AUTOCOMPLETE_DAYS: u32 = 15;

/// Behaviour toggles read from the config file and global flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    pub interactive: bool,
    pub allow_name_for_id: bool,
    pub search_project_with_client: bool,
    pub allow_incomplete: bool,
    pub description_autocomplete: bool,
    pub description_autocomplete_days: u32,
    pub show_task: bool,
    pub show_total_duration: bool,
    /// Days counted as workdays, in the order configured. Empty means all.
    pub workweek_days: Vec<Weekday>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            interactive: false,
            allow_name_for_id: false,
            search_project_with_client: false,
            allow_incomplete: false,
            description_autocomplete: false,
            description_autocomplete_days: DEFAULT_AUTOCOMPLETE_DAYS,
            show_task: false,
            show_total_duration: false,
            workweek_days: vec![],
        }
    }
}

impl Preferences {
    pub fn is_workday(&self, day: Weekday) -> bool {
        self.workweek_days.is_empty() || self.workweek_days.contains(&day)
    }
}
