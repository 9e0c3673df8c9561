//! Error types for the Hot Topics client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server refused the requested username
    #[error("Username '{0}' was rejected (taken or not 8-20 letters, digits, '.' or '_')")]
    UsernameRejected(String),

    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),
}
