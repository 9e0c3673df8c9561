//! UI utilities for the client.

use std::io::Write;

pub fn prompt(username: &str) -> String {
    format!("{}> ", username)
}

/// Redisplay the prompt after printing a server message
pub fn redisplay_prompt(username: &str) {
    print!("{}", prompt(username));
    std::io::stdout().flush().ok();
}
