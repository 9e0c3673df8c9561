//! Code shared by the Hot Topics server and client.
//!
//! - `protocol`: tagged JSON wire messages exchanged over the WebSocket
//! - `logger`: tracing subscriber setup for the binaries
//! - `time`: clock abstraction and timestamp formatting

pub mod logger;
pub mod protocol;
pub mod time;
