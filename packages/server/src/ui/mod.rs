//! Hot Topics chat server: transport, HTTP API and background tasks.

pub mod background;
mod handler;
mod server;
mod signal;
pub mod state;

pub use server::{CHAT_PATH, Server};
pub use signal::shutdown_signal;
