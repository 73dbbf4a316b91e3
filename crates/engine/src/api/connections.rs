//! Connection management for WebSocket clients.
//!
//! Tracks which clients are attached to which session and fans state
//! snapshots out to them. The hub holds the only sender of every client
//! queue, so evicting a client closes its queue and ends its send loop.

use std::collections::HashMap;

use tokio::sync::{mpsc, RwLock};

use initrack_domain::{ConnectionId, SessionCode, UserId};
use initrack_shared::{ServerMessage, SessionSnapshot};

/// A connected client's outbound side.
#[derive(Debug, Clone)]
struct ClientEntry {
    user_id: UserId,
    sender: mpsc::Sender<ServerMessage>,
}

/// Manages all active WebSocket connections, grouped by session.
pub struct BroadcastHub {
    /// Map of session code -> (connection_id -> client)
    sessions: RwLock<HashMap<SessionCode, HashMap<ConnectionId, ClientEntry>>>,
    /// Bound of each client's outbound queue
    queue_capacity: usize,
}

impl BroadcastHub {
    /// Create a hub whose client queues hold `queue_capacity` messages.
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            queue_capacity: queue_capacity.max(1),
        }
    }

    /// Register a new client and hand back the receiving end of its queue.
    pub async fn add_client(
        &self,
        code: SessionCode,
        connection_id: ConnectionId,
        user_id: UserId,
    ) -> mpsc::Receiver<ServerMessage> {
        let (sender, receiver) = mpsc::channel(self.queue_capacity);
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(code.clone())
            .or_default()
            .insert(connection_id, ClientEntry { user_id, sender });
        tracing::debug!(
            session_code = %code,
            connection_id = %connection_id,
            "Connection registered"
        );
        receiver
    }

    /// Unregister a client. Unknown ids are ignored.
    pub async fn remove_client(&self, code: &SessionCode, connection_id: ConnectionId) {
        let mut sessions = self.sessions.write().await;
        if take_client(&mut sessions, code, connection_id).is_some() {
            tracing::debug!(
                session_code = %code,
                connection_id = %connection_id,
                "Connection unregistered"
            );
        }
    }

    /// Offer a snapshot to every client of one session.
    ///
    /// Never waits on a client: a full or closed queue gets that client
    /// evicted. Returns how many clients accepted the message.
    pub async fn broadcast_state(&self, code: &SessionCode, snapshot: SessionSnapshot) -> usize {
        let message = ServerMessage::State(snapshot);
        let mut delivered = 0;
        let mut failed = Vec::new();
        {
            let sessions = self.sessions.read().await;
            let Some(clients) = sessions.get(code) else {
                return 0;
            };
            for (connection_id, client) in clients {
                match client.sender.try_send(message.clone()) {
                    Ok(()) => delivered += 1,
                    Err(e) => {
                        tracing::warn!(
                            session_code = %code,
                            connection_id = %connection_id,
                            user_id = %client.user_id,
                            error = %e,
                            "Failed to broadcast state, evicting client"
                        );
                        failed.push(*connection_id);
                    }
                }
            }
        }

        if !failed.is_empty() {
            self.evict(code, &failed).await;
        }
        delivered
    }

    /// Send a message to one client. Returns false if the client is gone or
    /// was evicted for a full queue.
    pub async fn send_to(
        &self,
        code: &SessionCode,
        connection_id: ConnectionId,
        message: ServerMessage,
    ) -> bool {
        let result = {
            let sessions = self.sessions.read().await;
            let Some(client) = sessions.get(code).and_then(|c| c.get(&connection_id)) else {
                return false;
            };
            client.sender.try_send(message)
        };

        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    session_code = %code,
                    connection_id = %connection_id,
                    error = %e,
                    "Failed to send to client, evicting"
                );
                self.evict(code, &[connection_id]).await;
                false
            }
        }
    }

    /// Number of clients attached to a session.
    pub async fn client_count(&self, code: &SessionCode) -> usize {
        let sessions = self.sessions.read().await;
        sessions.get(code).map_or(0, HashMap::len)
    }

    /// Whether a client is still registered.
    pub async fn is_connected(&self, code: &SessionCode, connection_id: ConnectionId) -> bool {
        let sessions = self.sessions.read().await;
        sessions
            .get(code)
            .is_some_and(|clients| clients.contains_key(&connection_id))
    }

    /// Connections a user holds in one session.
    #[cfg(test)]
    pub(crate) async fn connections_of(
        &self,
        code: &SessionCode,
        user_id: &UserId,
    ) -> Vec<ConnectionId> {
        let sessions = self.sessions.read().await;
        sessions.get(code).map_or_else(Vec::new, |clients| {
            clients
                .iter()
                .filter(|(_, client)| &client.user_id == user_id)
                .map(|(connection_id, _)| *connection_id)
                .collect()
        })
    }

    async fn evict(&self, code: &SessionCode, connection_ids: &[ConnectionId]) {
        let mut sessions = self.sessions.write().await;
        for connection_id in connection_ids {
            if take_client(&mut sessions, code, *connection_id).is_some() {
                tracing::info!(
                    session_code = %code,
                    connection_id = %connection_id,
                    "Client evicted"
                );
            }
        }
    }
}

fn take_client(
    sessions: &mut HashMap<SessionCode, HashMap<ConnectionId, ClientEntry>>,
    code: &SessionCode,
    connection_id: ConnectionId,
) -> Option<ClientEntry> {
    let clients = sessions.get_mut(code)?;
    let removed = clients.remove(&connection_id);
    if clients.is_empty() {
        sessions.remove(code);
    }
    removed
}
