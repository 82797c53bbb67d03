//! Cross-view synchronization listeners.

use super::ViewEvents;
use grocery_actor::{ActorState, WeakStateClient};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Forward other views' changes to `key` into `client` as commands.
///
/// The listener holds only a weak client and exits once the store it feeds has shut down
/// (checked when the next event arrives) or the storage goes away.
pub fn forward_changes<T, F>(
    mut events: ViewEvents,
    key: &'static str,
    client: WeakStateClient<T>,
    to_command: F,
) -> JoinHandle<()>
where
    T: ActorState,
    F: Fn(Option<String>) -> T::Command + Send + 'static,
{
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            if event.key != key {
                continue;
            }
            let Some(client) = client.upgrade() else {
                break;
            };
            debug!(key, removed = event.new_value.is_none(), "External change");
            if let Err(e) = client.send(to_command(event.new_value)).await {
                warn!(key, error = %e, "Failed to apply external change");
            }
        }
        debug!(key, "Sync listener stopped");
    })
}
