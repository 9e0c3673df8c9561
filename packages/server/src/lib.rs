//! Hot Topics chat server.
//!
//! Keeps one chatroom per trending topic and relays chat between the
//! WebSocket clients that joined it.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
