mod defaults;
mod draft;
mod flags;
mod preferences;

pub use defaults::EntryDefaults;
pub use draft::{Billable, Draft};
pub use flags::EntryFlags;
pub use preferences::{Preferences, DEFAULT_AUTOCOMPLETE_DAYS};
