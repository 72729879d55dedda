//! # Mock Framework
//!
//! Utilities for testing clients in isolation.
//!
//! Use [`create_mock_client`] to get a client and a receiver.
//! Then use helpers like [`expect_create`] or [`expect_update`] to assert behavior.

use tokio::sync::mpsc;

use crate::actor_framework::{Entity, ResourceClient, ResourceRequest, Response};

/// Creates a mock client and a receiver for asserting requests.
///
/// The client sends to a channel the test owns instead of a running
/// `ResourceActor`, so the test can inspect each request and script the
/// reply (success, failure, or a dropped responder).
pub fn create_mock_client<T: Entity>(
    buffer_size: usize,
) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Helper to verify that the next message is a Create request
pub async fn expect_create<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::CreateParams, Response<T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { params, respond_to }) => Some((params, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Get request
pub async fn expect_get<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, Response<Option<T>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Update request
pub async fn expect_update<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, T::Patch, Response<T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Update { id, patch, respond_to }) => Some((id, patch, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Delete request
pub async fn expect_delete<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, Response<()>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Delete { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor_framework::FrameworkError;
    use crate::clients::UserClient;
    use crate::domain::{User, UserCreate, UserPatch};
    use crate::user_actor::UserError;
    use chrono::Utc;

    fn stored_user(id: &str) -> User {
        let now = Utc::now();
        User {
            id: id.to_string(),
            name: "Test".to_string(),
            email: "test@example.com".to_string(),
            age: 20,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_mock_client_create() {
        let (inner, mut receiver) = create_mock_client::<User>(10);
        let client = UserClient::new(inner);

        let create_task = tokio::spawn(async move {
            client.create_user(UserCreate::new("Test", "test@example.com", 20)).await
        });

        let (params, responder) = expect_create(&mut receiver).await.expect("Expected Create request");
        assert_eq!(params.name, "Test");
        responder.send(Ok(stored_user("user_1"))).unwrap();

        let result = create_task.await.unwrap();
        assert_eq!(result.map(|u| u.id), Ok("user_1".to_string()));
    }

    #[tokio::test]
    async fn test_missing_user_maps_to_not_found() {
        let (inner, mut receiver) = create_mock_client::<User>(10);
        let client = UserClient::new(inner);

        let get_task = tokio::spawn(async move { client.get_user("user_9".to_string()).await });

        let (id, responder) = expect_get(&mut receiver).await.expect("Expected Get request");
        assert_eq!(id, "user_9");
        responder.send(Ok(None)).unwrap();

        assert_eq!(get_task.await.unwrap(), Err(UserError::NotFound("user_9".to_string())));
    }

    #[tokio::test]
    async fn test_replace_and_patch_send_the_same_update() {
        let (inner, mut receiver) = create_mock_client::<User>(10);
        let client = UserClient::new(inner);
        let patch = UserPatch { age: Some(21), ..Default::default() };

        let replace_client = client.clone();
        let replace_patch = patch.clone();
        let replace_task = tokio::spawn(async move {
            replace_client.replace_user("user_1".to_string(), replace_patch).await
        });
        let (_, sent, responder) = expect_update(&mut receiver).await.expect("Expected Update request");
        assert_eq!(sent, patch);
        responder.send(Err(FrameworkError::Conflict("test@example.com".to_string()))).unwrap();
        assert_eq!(
            replace_task.await.unwrap(),
            Err(UserError::DuplicateEmail("test@example.com".to_string()))
        );

        let patch_task = tokio::spawn(async move { client.patch_user("user_1".to_string(), patch).await });
        let (id, sent, responder) = expect_update(&mut receiver).await.expect("Expected Update request");
        assert_eq!(id, "user_1");
        assert_eq!(sent.age, Some(21));
        responder.send(Ok(stored_user("user_1"))).unwrap();
        assert!(patch_task.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_dropped_responder_is_communication_error() {
        let (inner, mut receiver) = create_mock_client::<User>(10);
        let client = UserClient::new(inner);

        let delete_task = tokio::spawn(async move { client.delete_user("user_1".to_string()).await });

        let (_, responder) = expect_delete(&mut receiver).await.expect("Expected Delete request");
        drop(responder);

        assert_eq!(
            delete_task.await.unwrap(),
            Err(UserError::ActorCommunicationError("Actor dropped".to_string()))
        );
    }
}
