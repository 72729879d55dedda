use tracing::{debug, instrument};

use crate::actor_framework::ResourceClient;
use crate::domain::{User, UserCreate, UserPatch};
use crate::impl_basic_client;
use crate::user_actor::UserError;

/// Client for interacting with the User actor.
#[derive(Clone)]
pub struct UserClient {
    inner: ResourceClient<User>,
}

impl_basic_client!(UserClient, User, UserError, user);

impl UserClient {
    #[instrument(skip(self, params))]
    pub async fn create_user(&self, params: UserCreate) -> Result<User, UserError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(UserError::from)
    }

    /// Full update. Only the supplied fields overwrite, exactly like
    /// [`UserClient::patch_user`].
    #[instrument(skip(self, patch))]
    pub async fn replace_user(&self, id: String, patch: UserPatch) -> Result<User, UserError> {
        debug!("Sending request");
        self.inner.update(id, patch).await.map_err(UserError::from)
    }

    #[instrument(skip(self, patch))]
    pub async fn patch_user(&self, id: String, patch: UserPatch) -> Result<User, UserError> {
        debug!("Sending request");
        self.inner.update(id, patch).await.map_err(UserError::from)
    }
}
