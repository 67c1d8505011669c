// Ctrl-C handling for the CLI
use tokio::sync::oneshot;

/// Exit status after the user interrupted a command (128 + SIGINT).
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Spawn the Ctrl-C listener; the receiver fires once per interrupt.
pub fn listen() -> oneshot::Receiver<()> {
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("Failed to listen for shutdown signal: {}", e);
        } else {
            eprintln!("\nInterrupted, shutting down...");
            let _ = shutdown_tx.send(());
        }
    });

    shutdown_rx
}

/// Resolve only when an interrupt was actually received.
///
/// If the listener went away without sending, this never resolves, so the
/// running command is left to finish.
pub async fn interrupted(shutdown_rx: oneshot::Receiver<()>) {
    if shutdown_rx.await.is_err() {
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_resolves() {
        let (tx, rx) = oneshot::channel();
        tx.send(()).unwrap();
        assert!(timeout(Duration::from_secs(1), interrupted(rx)).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_lost_listener_never_cancels() {
        let (tx, rx) = oneshot::channel::<()>();
        drop(tx);
        assert!(timeout(Duration::from_secs(60), interrupted(rx)).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_command_wins_when_listener_is_gone() {
        let (tx, rx) = oneshot::channel::<()>();
        drop(tx);

        let outcome = tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(200)) => "finished",
            _ = interrupted(rx) => "cancelled",
        };
        assert_eq!(outcome, "finished");
    }
}
