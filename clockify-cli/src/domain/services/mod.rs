mod mutations;
mod report;

pub use mutations::*;
pub use report::*;
