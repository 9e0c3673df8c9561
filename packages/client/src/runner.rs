//! Client execution logic with reconnection support.

use super::{
    domain::ReconnectPolicy,
    error::ClientError,
    session::{run_client_session, spawn_line_reader},
    ui::prompt,
};

/// Run the chat client, reconnecting after lost connections
///
/// # Errors
///
/// Returns the last error once the username is rejected or the reconnect
/// attempts are exhausted.
pub async fn run_client(url: String, username: String) -> Result<(), ClientError> {
    let policy = ReconnectPolicy::default();
    let mut failures = 0;
    // 入力スレッドは 1 本だけ起動し、再接続後も使い回す
    let mut input_rx = spawn_line_reader(prompt(&username));

    loop {
        tracing::info!(
            "Attempting to connect to {} as '{}' (attempt {}/{})",
            url,
            username,
            failures + 1,
            policy.max_attempts
        );

        match run_client_session(&url, &username, &mut input_rx).await {
            Ok(()) => {
                tracing::info!("Client session ended normally");
                // If connection ended normally (user exit), don't reconnect
                return Ok(());
            }
            Err(e) => {
                if ReconnectPolicy::is_fatal(&e) {
                    return Err(e);
                }

                tracing::warn!("{}", e);
                failures += 1;

                if !policy.should_retry(&e, failures) {
                    tracing::error!(
                        "Failed to reconnect after {} attempts. Exiting.",
                        policy.max_attempts
                    );
                    return Err(e);
                }

                tracing::info!(
                    "Reconnecting in {} seconds... (attempt {}/{})",
                    policy.interval.as_secs(),
                    failures + 1,
                    policy.max_attempts
                );
                tokio::time::sleep(policy.interval).await;
            }
        }
    }
}
