//! Ctrl+C handling for in-flight requests.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Debug)]
pub struct InterruptedError;

impl std::fmt::Display for InterruptedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Interrupted")
    }
}

impl std::error::Error for InterruptedError {}

/// Exit status for a run stopped by Ctrl+C.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Cancels `token` on the first Ctrl+C and force-exits on the second.
///
/// Must be called from within a tokio runtime. Installing the listener
/// replaces the default SIGINT behaviour, so anything the user may be
/// waiting on has to watch `token`. The listener ends early if the token
/// is cancelled by any other party.
pub fn cancel_on_ctrl_c(token: &CancellationToken) {
    let token = token.clone();
    tokio::spawn(async move {
        tokio::select! {
            () = token.cancelled() => return,
            result = tokio::signal::ctrl_c() => {
                if result.is_err() {
                    return;
                }
                info!("ctrl+c received, cancelling request");
                token.cancel();
            }
        }

        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("second ctrl+c received, exiting");
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    });
}
