use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use dashmap::DashMap;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::models::UserId;

/// Messages queued for one socket. The socket task owns the receiving end
/// and does the actual network write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Text(String),
    Close,
}

pub type ConnectionId = u64;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Sending half of one open channel.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    id: ConnectionId,
    tx: mpsc::Sender<Outbound>,
}

impl ClientHandle {
    /// New handle plus the queue its socket task drains.
    pub fn new(buffer: usize) -> (Self, mpsc::Receiver<Outbound>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let id = NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed);
        (Self { id, tx }, rx)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

/// Live channels keyed by user id, at most one per user.
///
/// Cheap to clone; every clone shares the same map. Lookups copy the handle
/// out and drop the shard lock before anything is queued, so a slow peer
/// never blocks register/unregister for other users.
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    inner: Arc<DashMap<UserId, ClientHandle>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `handle` for `user_id`, replacing any previous channel.
    ///
    /// The replaced channel is asked to close so its socket does not linger
    /// with nothing routed to it.
    pub fn register(&self, user_id: UserId, handle: ClientHandle) {
        let id = handle.id;
        let previous = self.inner.insert(user_id, handle);

        tracing::info!("user {} connected (connection {})", user_id, id);

        if let Some(old) = previous {
            if old.id != id {
                tracing::info!(
                    "user {} reconnected, closing superseded connection {}",
                    user_id,
                    old.id
                );
                let _ = old.tx.try_send(Outbound::Close);
            }
        }
    }

    /// Removes whatever channel `user_id` has. Dropping the entry ends that
    /// socket's outbound queue, which closes the socket.
    pub fn unregister(&self, user_id: UserId) -> bool {
        let removed = self.inner.remove(&user_id).is_some();
        if removed {
            tracing::info!("user {} disconnected", user_id);
        }
        removed
    }

    /// Removes the entry only if it still belongs to `connection_id`.
    pub fn unregister_connection(&self, user_id: UserId, connection_id: ConnectionId) -> bool {
        let removed = self
            .inner
            .remove_if(&user_id, |_, h| h.id == connection_id)
            .is_some();
        if removed {
            tracing::info!("user {} disconnected (connection {})", user_id, connection_id);
        }
        removed
    }

    /// Queues `message` for `user_id`. Returns whether it was queued; an
    /// offline user is not an error.
    pub fn send_to(&self, user_id: UserId, message: impl Into<String>) -> bool {
        let Some(handle) = self.inner.get(&user_id).map(|h| h.clone()) else {
            tracing::debug!("user {} not connected, message dropped", user_id);
            return false;
        };

        match handle.tx.try_send(Outbound::Text(message.into())) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::warn!("outbound queue full for user {}, message dropped", user_id);
                false
            }
            Err(TrySendError::Closed(_)) => {
                // socket task is gone but never cleaned up
                self.unregister_connection(user_id, handle.id);
                false
            }
        }
    }

    pub fn is_connected(&self, user_id: UserId) -> bool {
        self.inner.contains_key(&user_id)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
