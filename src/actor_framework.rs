use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument, warn};

use crate::store::{Identified, JsonFileStore, StoreError};

// =============================================================================
// 1. THE ABSTRACTION (Traits with Hooks, DTOs, and Actions)
// =============================================================================

/// Trait that any domain entity must implement to be managed by ResourceActor
pub trait Entity: Identified + Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Short name used in logs and not-found errors.
    const KIND: &'static str;

    type CreatePayload: Send + Debug;
    type Patch: Send + Debug;
    type Action: Send + Debug;
    type ActionResult: Send + Debug;
    type Error: std::error::Error + Clone + Send + Sync + 'static;

    /// Construct the full Entity from the ID and Payload
    fn from_create(id: String, payload: Self::CreatePayload) -> Result<Self, Self::Error>;

    // --- Lifecycle Hooks ---

    fn on_create(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
    fn on_update(&mut self, patch: Self::Patch) -> Result<(), Self::Error>;
    fn on_delete(&self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Cross-entity rules (uniqueness and the like). `others` is the rest of
    /// the collection, never including `self`.
    fn check_conflicts(&self, _others: &[Self]) -> Result<(), Self::Error> {
        Ok(())
    }

    // --- Action Handler ---

    /// Handle a custom domain-specific action
    fn handle_action(&mut self, action: Self::Action) -> Result<Self::ActionResult, Self::Error>;

    /// Actions answered without mutating the entity skip the write.
    fn is_read_only(_action: &Self::Action) -> bool {
        false
    }
}

#[derive(Debug, Error)]
pub enum ResourceError<E> {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error(transparent)]
    Rejected(E),
    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),
    #[error("actor closed")]
    ActorClosed,
    #[error("actor dropped the response")]
    ActorDropped,
}

pub type ResourceResult<T, E> = Result<T, ResourceError<E>>;

// =============================================================================
// 2. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T, E> = oneshot::Sender<ResourceResult<T, E>>;

pub enum ResourceRequest<T: Entity> {
    Create {
        payload: T::CreatePayload,
        respond_to: Response<T, T::Error>,
    },
    Get {
        id: String,
        respond_to: Response<Option<T>, T::Error>,
    },
    List {
        respond_to: Response<Vec<T>, T::Error>,
    },
    Update {
        id: String,
        patch: T::Patch,
        respond_to: Response<T, T::Error>,
    },
    Delete {
        id: String,
        respond_to: Response<T, T::Error>,
    },
    Action {
        id: String,
        action: T::Action,
        respond_to: Response<T::ActionResult, T::Error>,
    },
    Shutdown,
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

/// Owns one collection. Requests are handled strictly one after another, so
/// each create/update/delete/action is a critical section over the whole
/// collection: the read, the hook and the write never interleave with
/// another request.
pub struct ResourceActor<T: Entity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: JsonFileStore<T>,
    next_id_fn: Box<dyn Fn() -> String + Send + Sync>,
}

impl<T: Entity> ResourceActor<T> {
    pub fn new(
        buffer_size: usize,
        store: JsonFileStore<T>,
        next_id_fn: impl Fn() -> String + Send + Sync + 'static,
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store,
            next_id_fn: Box::new(next_id_fn),
        };
        let client = ResourceClient::new(sender);
        (actor, client)
    }

    #[instrument(name = "resource_actor", skip(self), fields(kind = T::KIND))]
    pub async fn run(mut self) {
        info!(path = %self.store.path().display(), "ResourceActor starting");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { payload, respond_to } => {
                    let _ = respond_to.send(self.handle_create(payload).await);
                }
                ResourceRequest::Get { id, respond_to } => {
                    let result = self.store.find_by_id(&id).await.map_err(ResourceError::from);
                    let _ = respond_to.send(result);
                }
                ResourceRequest::List { respond_to } => {
                    let result = self.store.find_all().await.map_err(ResourceError::from);
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Update { id, patch, respond_to } => {
                    let _ = respond_to.send(self.handle_update(id, patch).await);
                }
                ResourceRequest::Delete { id, respond_to } => {
                    let _ = respond_to.send(self.handle_delete(id).await);
                }
                ResourceRequest::Action { id, action, respond_to } => {
                    let _ = respond_to.send(self.handle_action(id, action).await);
                }
                ResourceRequest::Shutdown => {
                    info!("ResourceActor shutting down");
                    break;
                }
            }
        }
        info!("ResourceActor stopped");
    }

    #[instrument(skip(self, payload))]
    async fn handle_create(&mut self, payload: T::CreatePayload) -> ResourceResult<T, T::Error> {
        let id = (self.next_id_fn)();
        let mut item = T::from_create(id, payload).map_err(ResourceError::Rejected)?;
        item.on_create().map_err(ResourceError::Rejected)?;

        let existing = self.store.find_all().await?;
        item.check_conflicts(&existing).map_err(ResourceError::Rejected)?;

        let item = self.store.create(item).await?;
        debug!(id = %item.id(), "Created");
        Ok(item)
    }

    #[instrument(skip(self, patch))]
    async fn handle_update(&mut self, id: String, patch: T::Patch) -> ResourceResult<T, T::Error> {
        let mut item = self.find(&id).await?;
        if let Err(e) = item.on_update(patch) {
            warn!(error = %e, "Update rejected");
            return Err(ResourceError::Rejected(e));
        }

        let others: Vec<T> = self
            .store
            .find_all()
            .await?
            .into_iter()
            .filter(|other| other.id() != id)
            .collect();
        item.check_conflicts(&others).map_err(ResourceError::Rejected)?;

        self.store
            .update(&id, item)
            .await?
            .ok_or_else(|| Self::not_found(&id))
    }

    #[instrument(skip(self))]
    async fn handle_delete(&mut self, id: String) -> ResourceResult<T, T::Error> {
        let item = self.find(&id).await?;
        item.on_delete().map_err(ResourceError::Rejected)?;
        self.store
            .delete(&id)
            .await?
            .ok_or_else(|| Self::not_found(&id))
    }

    /// Runs the action against a copy and only writes the copy back when the
    /// action succeeds, so a rejected action leaves no trace.
    #[instrument(skip(self))]
    async fn handle_action(
        &mut self,
        id: String,
        action: T::Action,
    ) -> ResourceResult<T::ActionResult, T::Error> {
        let mut item = self.find(&id).await?;
        let read_only = T::is_read_only(&action);
        let result = match item.handle_action(action) {
            Ok(result) => result,
            Err(e) => {
                debug!(error = %e, "Action rejected");
                return Err(ResourceError::Rejected(e));
            }
        };
        if !read_only {
            self.store.update(&id, item).await?;
        }
        Ok(result)
    }

    async fn find(&mut self, id: &str) -> ResourceResult<T, T::Error> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| Self::not_found(id))
    }

    fn not_found(id: &str) -> ResourceError<T::Error> {
        ResourceError::NotFound {
            kind: T::KIND,
            id: id.to_string(),
        }
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

#[derive(Clone)]
pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

impl<T: Entity> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    async fn call<R>(
        &self,
        request: impl FnOnce(Response<R, T::Error>) -> ResourceRequest<T>,
    ) -> ResourceResult<R, T::Error> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(request(respond_to))
            .await
            .map_err(|_| ResourceError::ActorClosed)?;
        response.await.map_err(|_| ResourceError::ActorDropped)?
    }

    pub async fn create(&self, payload: T::CreatePayload) -> ResourceResult<T, T::Error> {
        self.call(|respond_to| ResourceRequest::Create { payload, respond_to }).await
    }

    pub async fn get(&self, id: String) -> ResourceResult<Option<T>, T::Error> {
        self.call(|respond_to| ResourceRequest::Get { id, respond_to }).await
    }

    pub async fn list(&self) -> ResourceResult<Vec<T>, T::Error> {
        self.call(|respond_to| ResourceRequest::List { respond_to }).await
    }

    pub async fn update(&self, id: String, patch: T::Patch) -> ResourceResult<T, T::Error> {
        self.call(|respond_to| ResourceRequest::Update { id, patch, respond_to }).await
    }

    pub async fn delete(&self, id: String) -> ResourceResult<T, T::Error> {
        self.call(|respond_to| ResourceRequest::Delete { id, respond_to }).await
    }

    pub async fn perform_action(
        &self,
        id: String,
        action: T::Action,
    ) -> ResourceResult<T::ActionResult, T::Error> {
        self.call(|respond_to| ResourceRequest::Action { id, action, respond_to }).await
    }

    /// Asks the actor to stop after the requests already queued.
    pub async fn shutdown(&self) -> ResourceResult<(), T::Error> {
        self.sender
            .send(ResourceRequest::Shutdown)
            .await
            .map_err(|_| ResourceError::ActorClosed)
    }
}

// =============================================================================
// 5. EXAMPLE USAGE (Test)
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    // --- Domain Definition ---

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Ticket {
        id: String,
        code: String,
        seats: u32,
    }

    #[derive(Debug)]
    struct TicketCreate {
        code: String,
        seats: u32,
    }

    #[derive(Debug)]
    struct TicketPatch {
        code: Option<String>,
    }

    #[derive(Debug)]
    enum TicketAction {
        Peek,
        Take(u32),
    }

    #[derive(Debug, Clone, PartialEq, Error)]
    enum TicketError {
        #[error("sold out")]
        SoldOut,
        #[error("duplicate code {0}")]
        Duplicate(String),
    }

    impl Identified for Ticket {
        fn id(&self) -> &str {
            &self.id
        }
    }

    impl Entity for Ticket {
        const KIND: &'static str = "ticket";

        type CreatePayload = TicketCreate;
        type Patch = TicketPatch;
        type Action = TicketAction;
        type ActionResult = u32;
        type Error = TicketError;

        fn from_create(id: String, payload: TicketCreate) -> Result<Self, TicketError> {
            Ok(Self {
                id,
                code: payload.code,
                seats: payload.seats,
            })
        }

        fn on_update(&mut self, patch: TicketPatch) -> Result<(), TicketError> {
            if let Some(code) = patch.code {
                self.code = code;
            }
            Ok(())
        }

        fn check_conflicts(&self, others: &[Self]) -> Result<(), TicketError> {
            if others.iter().any(|o| o.code == self.code) {
                return Err(TicketError::Duplicate(self.code.clone()));
            }
            Ok(())
        }

        fn handle_action(&mut self, action: TicketAction) -> Result<u32, TicketError> {
            match action {
                TicketAction::Peek => Ok(self.seats),
                TicketAction::Take(n) => {
                    self.seats = self.seats.checked_sub(n).ok_or(TicketError::SoldOut)?;
                    Ok(self.seats)
                }
            }
        }

        fn is_read_only(action: &TicketAction) -> bool {
            matches!(action, TicketAction::Peek)
        }
    }

    fn spawn_actor(path: std::path::PathBuf) -> ResourceClient<Ticket> {
        let counter = Arc::new(AtomicU64::new(1));
        let next_id = move || format!("ticket_{}", counter.fetch_add(1, Ordering::SeqCst));
        let (actor, client) = ResourceActor::new(16, JsonFileStore::new(path), next_id);
        tokio::spawn(actor.run());
        client
    }

    // --- Tests ---

    #[tokio::test]
    async fn test_resource_actor_with_actions() {
        let dir = tempfile::tempdir().unwrap();
        let client = spawn_actor(dir.path().join("tickets.json"));

        let ticket = client
            .create(TicketCreate { code: "A".into(), seats: 2 })
            .await
            .unwrap();
        assert_eq!(ticket.id, "ticket_1");

        let left = client
            .perform_action(ticket.id.clone(), TicketAction::Take(2))
            .await
            .unwrap();
        assert_eq!(left, 0);
        let again = client.perform_action(ticket.id.clone(), TicketAction::Take(1)).await;
        assert!(matches!(again, Err(ResourceError::Rejected(TicketError::SoldOut))));

        let stored = client.get(ticket.id.clone()).await.unwrap().unwrap();
        assert_eq!(stored.seats, 0);
    }

    #[tokio::test]
    async fn conflicts_are_checked_against_the_rest_of_the_collection() {
        let dir = tempfile::tempdir().unwrap();
        let client = spawn_actor(dir.path().join("tickets.json"));

        let a = client.create(TicketCreate { code: "A".into(), seats: 1 }).await.unwrap();
        let b = client.create(TicketCreate { code: "B".into(), seats: 1 }).await.unwrap();

        let dup = client.create(TicketCreate { code: "A".into(), seats: 1 }).await;
        assert!(matches!(dup, Err(ResourceError::Rejected(TicketError::Duplicate(_)))));

        // Re-saving an entity with its own code is not a conflict.
        client.update(a.id.clone(), TicketPatch { code: Some("A".into()) }).await.unwrap();
        let clash = client.update(b.id.clone(), TicketPatch { code: Some("A".into()) }).await;
        assert!(matches!(clash, Err(ResourceError::Rejected(TicketError::Duplicate(_)))));
        assert_eq!(client.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let client = spawn_actor(dir.path().join("tickets.json"));

        assert!(client.get("ghost".into()).await.unwrap().is_none());
        assert!(matches!(
            client.delete("ghost".into()).await,
            Err(ResourceError::NotFound { kind: "ticket", .. })
        ));
        assert!(matches!(
            client.perform_action("ghost".into(), TicketAction::Peek).await,
            Err(ResourceError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn concurrent_actions_are_serialised() {
        let dir = tempfile::tempdir().unwrap();
        let client = spawn_actor(dir.path().join("tickets.json"));
        let ticket = client.create(TicketCreate { code: "A".into(), seats: 3 }).await.unwrap();

        let mut tasks = Vec::new();
        for _ in 0..10 {
            let client = client.clone();
            let id = ticket.id.clone();
            tasks.push(tokio::spawn(async move {
                client.perform_action(id, TicketAction::Take(1)).await
            }));
        }
        let mut taken = 0;
        for task in tasks {
            if task.await.unwrap().is_ok() {
                taken += 1;
            }
        }
        assert_eq!(taken, 3);
        assert_eq!(client.perform_action(ticket.id, TicketAction::Peek).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn shutdown_closes_the_mailbox() {
        let dir = tempfile::tempdir().unwrap();
        let counter = Arc::new(AtomicU64::new(1));
        let next_id = move || format!("ticket_{}", counter.fetch_add(1, Ordering::SeqCst));
        let (actor, client) =
            ResourceActor::<Ticket>::new(4, JsonFileStore::new(dir.path().join("t.json")), next_id);
        let handle = tokio::spawn(actor.run());

        client.shutdown().await.unwrap();
        handle.await.unwrap();
        assert!(matches!(client.list().await, Err(ResourceError::ActorClosed)));
    }
}
