//! Interactive command-line client for the Hot Topics chat server.

mod command;
mod domain;
mod error;
mod formatter;
mod runner;
mod session;
mod ui;

pub use command::{Command, CommandError};
pub use error::ClientError;
pub use runner::run_client;
