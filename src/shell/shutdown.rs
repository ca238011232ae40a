// Process shutdown: SIGINT / SIGTERM (Ctrl-C / Ctrl-Break on Windows).
//
// Handlers are registered synchronously by `listen_for_signals`, before the poller
// starts, so a signal arriving during startup or the first cycle is never fatal.

use std::io;
use tokio::sync::watch;
use tracing::info;

#[derive(Debug, Clone)]
pub struct Shutdown {
    requested: watch::Receiver<bool>,
}

impl Shutdown {
    /// A shutdown token plus the sender that requests it.
    pub fn channel() -> (watch::Sender<bool>, Self) {
        let (sender, requested) = watch::channel(false);
        (sender, Self { requested })
    }

    pub fn is_requested(&self) -> bool {
        *self.requested.borrow()
    }

    /// Resolves once shutdown is requested. Never resolves if the sender is dropped first.
    pub async fn requested(mut self) {
        let stopped = self.requested.wait_for(|requested| *requested).await.is_ok();
        if !stopped {
            std::future::pending::<()>().await;
        }
    }
}

/// Installs the signal handlers now and returns a token that fires on the first signal.
///
/// Must be called from within a tokio runtime.
#[cfg(unix)]
pub fn listen_for_signals() -> io::Result<Shutdown> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let (sender, shutdown) = Shutdown::channel();

    tokio::spawn(async move {
        tokio::select! {
            _ = interrupt.recv() => info!("received SIGINT"),
            _ = terminate.recv() => info!("received SIGTERM"),
        }
        sender.send_replace(true);
    });
    Ok(shutdown)
}

#[cfg(not(unix))]
pub fn listen_for_signals() -> io::Result<Shutdown> {
    use tokio::signal::windows::{ctrl_break, ctrl_c};

    let mut interrupt = ctrl_c()?;
    let mut brk = ctrl_break()?;
    let (sender, shutdown) = Shutdown::channel();

    tokio::spawn(async move {
        tokio::select! {
            _ = interrupt.recv() => info!("received Ctrl-C"),
            _ = brk.recv() => info!("received Ctrl-Break"),
        }
        sender.send_replace(true);
    });
    Ok(shutdown)
}
