//! Hot Topics command-line chat client.
//!
//! Claims a username, lists the trending-topic chatrooms and lets the user
//! join one and chat. Reconnects automatically on disconnection (max 5 attempts
//! with 5 second interval) unless the server rejected the username.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hottopics-client -- --username alice.wonder
//! cargo run --bin hottopics-client -- -n bob_builder -u ws://127.0.0.1:8025/hottopics/chat
//! ```

use clap::Parser;
use hottopics_client::{ClientError, run_client};
use hottopics_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "hottopics-client")]
#[command(about = "Command-line client for the Hot Topics chat server", long_about = None)]
struct Args {
    /// Username to claim (8-20 letters, digits, '.' or '_'; unique ignoring case)
    #[arg(short = 'n', long)]
    username: String,

    /// WebSocket server URL
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:8025/hottopics/chat")]
    url: String,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    // Run the client
    if let Err(e) = run_client(args.url, args.username).await {
        tracing::error!("Client error: {}", e);
        let code = match e {
            ClientError::UsernameRejected(_) => 2,
            ClientError::ConnectionError(_) => 1,
        };
        std::process::exit(code);
    }
}
