use tokio::task::JoinHandle;
use tracing::{error, info};
use uuid::Uuid;

use crate::actor_framework::ResourceActor;
use crate::clients::UserClient;
use crate::domain::User;

/// The running directory: the user actor plus the client used to reach it.
///
/// Responsible for starting up actors, wiring them together, and handling shutdown.
pub struct DirectorySystem {
    pub user_client: UserClient,
    handles: Vec<JoinHandle<()>>,
}

impl DirectorySystem {
    /// Starts the user actor with a request queue of `channel_capacity`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(channel_capacity: usize) -> Self {
        info!(channel_capacity, "Starting directory system");

        let (user_actor, user_resource_client) =
            ResourceActor::<User>::new(channel_capacity, new_user_id);
        let user_client = UserClient::new(user_resource_client);
        let user_handle = tokio::spawn(user_actor.run());

        Self {
            user_client,
            handles: vec![user_handle],
        }
    }

    /// Drops this system's client and waits for the actors to drain.
    ///
    /// Actors stop once every client clone is gone, so callers must drop
    /// theirs (for example by letting the HTTP server finish) first.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");
        drop(self.user_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}

/// Random v4 UUID in lowercase hyphenated form.
pub fn new_user_id() -> String {
    Uuid::new_v4().to_string()
}
