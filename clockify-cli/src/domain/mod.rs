pub mod alias;
mod error;
pub mod models;
pub mod pipeline;
pub mod ports;
pub mod resolver;
pub mod services;
mod session;
pub mod steps;
pub mod time_parser;
pub mod validator;

pub use error::{CliError, Entity, SplitError, WorkspaceRule};
pub use session::Session;
