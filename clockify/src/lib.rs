//! Client for the Clockify REST API (v1).
//!
//! Only the endpoints needed by the command line client are covered: users and
//! workspaces, clients, projects, tasks, tags and time entries.

mod auth;
mod client;
mod clockify_url;
pub mod domain;

pub use auth::*;
pub use client::*;
pub use clockify_url::ClockifyURL;
pub use domain::*;
