use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument, warn};

// =============================================================================
// 1. THE ABSTRACTION (Entity trait with hooks)
// =============================================================================

/// Trait that any domain entity must implement to be managed by [`ResourceActor`].
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;
    type CreateParams: Send + Sync + Debug;
    type Patch: Send + Sync + Debug;

    /// Get the ID of the entity
    fn id(&self) -> &Self::Id;

    /// Construct the full entity from a freshly generated ID and the creation params.
    fn from_create_params(id: Self::Id, params: Self::CreateParams) -> Result<Self, String>;

    // --- Lifecycle Hooks ---

    /// Apply a patch in place. Called on a scratch copy, so an error leaves
    /// the stored entity untouched.
    fn on_update(&mut self, patch: Self::Patch) -> Result<(), String>;

    /// Key that must be unique across all live entities, if the entity has one.
    fn unique_key(&self) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FrameworkError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Unique key already in use: {0}")]
    Conflict(String),
    #[error("Request rejected: {0}")]
    Rejected(String),
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped")]
    ActorDropped,
}

// =============================================================================
// 2. THE STORE (synchronous core owned by the actor)
// =============================================================================

/// Single owner of a collection of entities.
///
/// Keeps insertion order for listings and a secondary index from
/// [`Entity::unique_key`] to id. Every method runs to completion without
/// suspension, so a caller that owns the store exclusively (the actor) gets
/// atomic check-then-write for free. Entities are cloned out; callers never
/// hold references into the collection.
pub struct ResourceStore<T: Entity> {
    records: HashMap<T::Id, T>,
    insertion_order: Vec<T::Id>,
    unique_index: HashMap<String, T::Id>,
    next_id_fn: Box<dyn Fn() -> T::Id + Send + Sync>,
}

impl<T: Entity> ResourceStore<T> {
    pub fn new(next_id_fn: impl Fn() -> T::Id + Send + Sync + 'static) -> Self {
        Self {
            records: HashMap::new(),
            insertion_order: Vec::new(),
            unique_index: HashMap::new(),
            next_id_fn: Box::new(next_id_fn),
        }
    }

    pub fn create(&mut self, params: T::CreateParams) -> Result<T, FrameworkError> {
        let id = (self.next_id_fn)();
        if self.records.contains_key(&id) {
            return Err(FrameworkError::Rejected(format!("Identifier already in use: {}", id)));
        }

        let item = T::from_create_params(id.clone(), params).map_err(FrameworkError::Rejected)?;
        let key = item.unique_key();
        if let Some(key) = &key {
            if self.unique_index.contains_key(key) {
                return Err(FrameworkError::Conflict(key.clone()));
            }
        }

        if let Some(key) = key {
            self.unique_index.insert(key, id.clone());
        }
        self.insertion_order.push(id.clone());
        self.records.insert(id, item.clone());
        Ok(item)
    }

    pub fn get(&self, id: &T::Id) -> Option<T> {
        self.records.get(id).cloned()
    }

    /// Snapshot of every live entity in insertion order.
    pub fn list(&self) -> Vec<T> {
        self.insertion_order
            .iter()
            .filter_map(|id| self.records.get(id))
            .cloned()
            .collect()
    }

    pub fn update(&mut self, id: &T::Id, patch: T::Patch) -> Result<T, FrameworkError> {
        let current = self
            .records
            .get(id)
            .ok_or_else(|| FrameworkError::NotFound(id.to_string()))?;

        let mut candidate = current.clone();
        candidate.on_update(patch).map_err(FrameworkError::Rejected)?;

        let old_key = current.unique_key();
        let new_key = candidate.unique_key();
        if let Some(key) = &new_key {
            if let Some(owner) = self.unique_index.get(key) {
                if owner != id {
                    return Err(FrameworkError::Conflict(key.clone()));
                }
            }
        }

        if old_key != new_key {
            if let Some(old) = old_key {
                self.unique_index.remove(&old);
            }
            if let Some(new) = new_key {
                self.unique_index.insert(new, id.clone());
            }
        }
        self.records.insert(id.clone(), candidate.clone());
        Ok(candidate)
    }

    pub fn delete(&mut self, id: &T::Id) -> Result<(), FrameworkError> {
        let item = self
            .records
            .remove(id)
            .ok_or_else(|| FrameworkError::NotFound(id.to_string()))?;
        if let Some(key) = item.unique_key() {
            self.unique_index.remove(&key);
        }
        self.insertion_order.retain(|existing| existing != id);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// =============================================================================
// 3. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

#[derive(Debug)]
pub enum ResourceRequest<T: Entity> {
    Create {
        params: T::CreateParams,
        respond_to: Response<T>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    List {
        respond_to: Response<Vec<T>>,
    },
    Update {
        id: T::Id,
        patch: T::Patch,
        respond_to: Response<T>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<()>,
    },
    #[cfg(test)]
    Len {
        respond_to: Response<usize>,
    },
}

// =============================================================================
// 4. THE GENERIC ACTOR SERVER
// =============================================================================

/// Processes [`ResourceRequest`]s one at a time against its private store.
///
/// The actor stops once every [`ResourceClient`] has been dropped.
pub struct ResourceActor<T: Entity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: ResourceStore<T>,
}

impl<T: Entity> ResourceActor<T> {
    pub fn new(
        buffer_size: usize,
        next_id_fn: impl Fn() -> T::Id + Send + Sync + 'static,
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: ResourceStore::new(next_id_fn),
        };
        let client = ResourceClient::new(sender);
        (actor, client)
    }

    #[instrument(name = "resource_actor", skip(self))]
    pub async fn run(mut self) {
        info!("ResourceActor starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    self.handle_create(params, respond_to);
                }
                ResourceRequest::Get { id, respond_to } => {
                    self.handle_get(id, respond_to);
                }
                ResourceRequest::List { respond_to } => {
                    self.handle_list(respond_to);
                }
                ResourceRequest::Update { id, patch, respond_to } => {
                    self.handle_update(id, patch, respond_to);
                }
                ResourceRequest::Delete { id, respond_to } => {
                    self.handle_delete(id, respond_to);
                }
                #[cfg(test)]
                ResourceRequest::Len { respond_to } => {
                    let _ = respond_to.send(Ok(self.store.len()));
                }
            }
        }

        info!("ResourceActor stopped");
    }

    #[instrument(skip(self, params, respond_to))]
    fn handle_create(&mut self, params: T::CreateParams, respond_to: Response<T>) {
        debug!("Processing create request");

        let result = self.store.create(params);
        match &result {
            Ok(item) => info!(id = %item.id(), "Item created"),
            Err(e) => warn!(error = %e, "Create rejected"),
        }

        let _ = respond_to.send(result);
    }

    #[instrument(fields(item_id = %id), skip(self, id, respond_to))]
    fn handle_get(&self, id: T::Id, respond_to: Response<Option<T>>) {
        debug!("Processing get request");

        let item = self.store.get(&id);
        if item.is_none() {
            debug!("Item not found");
        }

        let _ = respond_to.send(Ok(item));
    }

    #[instrument(skip(self, respond_to))]
    fn handle_list(&self, respond_to: Response<Vec<T>>) {
        debug!("Processing list request");

        let items = self.store.list();
        debug!(item_count = items.len(), "Listed items");

        let _ = respond_to.send(Ok(items));
    }

    #[instrument(fields(item_id = %id), skip(self, id, patch, respond_to))]
    fn handle_update(&mut self, id: T::Id, patch: T::Patch, respond_to: Response<T>) {
        debug!("Processing update request");

        let result = self.store.update(&id, patch);
        match &result {
            Ok(_) => info!("Item updated"),
            Err(e) => warn!(error = %e, "Update rejected"),
        }

        let _ = respond_to.send(result);
    }

    #[instrument(fields(item_id = %id), skip(self, id, respond_to))]
    fn handle_delete(&mut self, id: T::Id, respond_to: Response<()>) {
        debug!("Processing delete request");

        let result = self.store.delete(&id);
        match &result {
            Ok(()) => info!("Item deleted"),
            Err(e) => warn!(error = %e, "Delete rejected"),
        }

        let _ = respond_to.send(result);
    }
}

// =============================================================================
// 5. THE GENERIC CLIENT
// =============================================================================

#[derive(Clone)]
pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

impl<T: Entity> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(Response<R>) -> ResourceRequest<T>,
    ) -> Result<R, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn create(&self, params: T::CreateParams) -> Result<T, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Create { params, respond_to })
            .await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Get { id, respond_to })
            .await
    }

    pub async fn list(&self) -> Result<Vec<T>, FrameworkError> {
        self.request(|respond_to| ResourceRequest::List { respond_to })
            .await
    }

    pub async fn update(&self, id: T::Id, patch: T::Patch) -> Result<T, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Update { id, patch, respond_to })
            .await
    }

    pub async fn delete(&self, id: T::Id) -> Result<(), FrameworkError> {
        self.request(|respond_to| ResourceRequest::Delete { id, respond_to })
            .await
    }

    #[cfg(test)]
    pub async fn len(&self) -> Result<usize, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Len { respond_to })
            .await
    }
}

// =============================================================================
// 6. EXAMPLE USAGE (Test)
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    // --- Domain Definition ---

    #[derive(Clone, Debug, PartialEq)]
    struct Handle {
        id: String,
        handle: String,
        visits: u32,
    }

    #[derive(Debug)]
    struct HandleCreate {
        handle: String,
    }

    #[derive(Debug)]
    struct HandlePatch {
        handle: Option<String>,
        visits: Option<u32>,
    }

    impl Entity for Handle {
        type Id = String;
        type CreateParams = HandleCreate;
        type Patch = HandlePatch;

        fn id(&self) -> &String {
            &self.id
        }

        fn from_create_params(id: String, params: HandleCreate) -> Result<Self, String> {
            if params.handle.is_empty() {
                return Err("handle must not be empty".to_string());
            }
            Ok(Self {
                id,
                handle: params.handle,
                visits: 0,
            })
        }

        fn on_update(&mut self, patch: HandlePatch) -> Result<(), String> {
            if let Some(visits) = patch.visits {
                self.visits = visits;
            }
            if let Some(handle) = patch.handle {
                if handle.is_empty() {
                    return Err("handle must not be empty".to_string());
                }
                self.handle = handle;
            }
            Ok(())
        }

        fn unique_key(&self) -> Option<String> {
            Some(self.handle.clone())
        }
    }

    fn counter_ids() -> impl Fn() -> String + Send + Sync + 'static {
        let counter = Arc::new(AtomicU64::new(1));
        move || format!("handle_{}", counter.fetch_add(1, Ordering::SeqCst))
    }

    fn create(handle: &str) -> HandleCreate {
        HandleCreate { handle: handle.to_string() }
    }

    fn patch_handle(handle: &str) -> HandlePatch {
        HandlePatch { handle: Some(handle.to_string()), visits: None }
    }

    // --- Store ---

    #[test]
    fn test_store_lists_in_insertion_order() {
        let mut store = ResourceStore::<Handle>::new(counter_ids());
        for name in ["c", "a", "b"] {
            store.create(create(name)).unwrap();
        }
        store.delete(&"handle_2".to_string()).unwrap();

        let handles: Vec<String> = store.list().into_iter().map(|h| h.handle).collect();
        assert_eq!(handles, vec!["c", "b"]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_store_rejects_duplicate_key_on_create() {
        let mut store = ResourceStore::<Handle>::new(counter_ids());
        store.create(create("taken")).unwrap();

        let err = store.create(create("taken")).unwrap_err();
        assert_eq!(err, FrameworkError::Conflict("taken".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_rejects_reused_identifier() {
        let mut store = ResourceStore::<Handle>::new(|| "fixed".to_string());
        store.create(create("one")).unwrap();

        let err = store.create(create("two")).unwrap_err();
        assert!(matches!(err, FrameworkError::Rejected(_)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_update_conflict_leaves_entity_untouched() {
        let mut store = ResourceStore::<Handle>::new(counter_ids());
        let first = store.create(create("first")).unwrap();
        store.create(create("second")).unwrap();

        let patch = HandlePatch { handle: Some("second".to_string()), visits: Some(9) };
        let err = store.update(&first.id, patch).unwrap_err();

        assert_eq!(err, FrameworkError::Conflict("second".to_string()));
        assert_eq!(store.get(&first.id), Some(first));
    }

    #[test]
    fn test_store_update_hook_error_leaves_entity_untouched() {
        let mut store = ResourceStore::<Handle>::new(counter_ids());
        let first = store.create(create("first")).unwrap();

        let patch = HandlePatch { handle: Some(String::new()), visits: Some(3) };
        let err = store.update(&first.id, patch).unwrap_err();

        assert!(matches!(err, FrameworkError::Rejected(_)));
        assert_eq!(store.get(&first.id), Some(first));
    }

    #[test]
    fn test_store_update_moves_unique_key() {
        let mut store = ResourceStore::<Handle>::new(counter_ids());
        let first = store.create(create("old")).unwrap();

        store.update(&first.id, patch_handle("new")).unwrap();

        // The released key is free again, the new one is taken.
        assert!(store.create(create("old")).is_ok());
        assert_eq!(
            store.create(create("new")).unwrap_err(),
            FrameworkError::Conflict("new".to_string())
        );
    }

    #[test]
    fn test_store_update_keeping_own_key_is_allowed() {
        let mut store = ResourceStore::<Handle>::new(counter_ids());
        let first = store.create(create("mine")).unwrap();

        let updated = store.update(&first.id, patch_handle("mine")).unwrap();
        assert_eq!(updated.handle, "mine");
    }

    #[test]
    fn test_store_delete_releases_key() {
        let mut store = ResourceStore::<Handle>::new(counter_ids());
        let first = store.create(create("gone")).unwrap();

        store.delete(&first.id).unwrap();
        assert_eq!(
            store.delete(&first.id),
            Err(FrameworkError::NotFound(first.id.clone()))
        );
        assert!(store.create(create("gone")).is_ok());
    }

    // --- Actor ---

    #[tokio::test]
    async fn test_resource_actor_crud() {
        let (actor, client) = ResourceActor::<Handle>::new(10, counter_ids());
        tokio::spawn(actor.run());

        let created = client.create(create("alice")).await.unwrap();
        assert_eq!(created.id, "handle_1");

        let patch = HandlePatch { handle: None, visits: Some(2) };
        let updated = client.update(created.id.clone(), patch).await.unwrap();
        assert_eq!(updated.visits, 2);

        let fetched = client.get(created.id.clone()).await.unwrap();
        assert_eq!(fetched, Some(updated));
        assert_eq!(client.len().await.unwrap(), 1);

        client.delete(created.id.clone()).await.unwrap();
        assert_eq!(client.get(created.id).await.unwrap(), None);
        assert!(client.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resource_actor_stops_when_clients_drop() {
        let (actor, client) = ResourceActor::<Handle>::new(10, counter_ids());
        let handle = tokio::spawn(actor.run());

        drop(client);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_client_reports_closed_actor() {
        let (actor, client) = ResourceActor::<Handle>::new(10, counter_ids());
        drop(actor);

        assert_eq!(client.list().await, Err(FrameworkError::ActorClosed));
    }
}
