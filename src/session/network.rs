// Connectivity tracking
// The environment exposes a subscribe/unsubscribe online signal; the session
// reflects it into NetworkStatus. Only Online and Offline are ever inferred
// from the signal; Connecting is reserved for explicit callers.

use log::info;
use tokio::sync::watch;

use crate::models::NetworkStatus;

impl super::ConversationSession {
    /// Subscribe to a connectivity signal for the lifetime of the session.
    /// The current value is applied immediately, then every change is
    /// reflected until the session is disposed. A second call replaces the
    /// previous subscription.
    pub fn watch_connectivity(&mut self, mut rx: watch::Receiver<bool>) {
        if let Some(task) = self.network_task.take() {
            task.abort();
        }

        let state = self.state.clone();
        self.network_task = Some(tokio::spawn(async move {
            loop {
                let online = *rx.borrow_and_update();
                {
                    let mut state = state.lock().await;
                    state.network_status = if online {
                        NetworkStatus::Online
                    } else {
                        NetworkStatus::Offline
                    };
                }
                info!(
                    "Connectivity changed: {}",
                    if online { "online" } else { "offline" }
                );
                if rx.changed().await.is_err() {
                    // Signal source dropped; keep the last known status.
                    break;
                }
            }
        }));
    }
}
