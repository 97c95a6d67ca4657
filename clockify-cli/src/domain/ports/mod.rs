mod prompter;
mod remote;

pub use prompter::*;
pub use remote::ClockifyPort;
