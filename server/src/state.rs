use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use sketchsync_shared::ServerMessage;
use tokio::sync::{mpsc, RwLock};
use tracing::debug;

use crate::rooms::{ConnectionId, Presence, RoomId};
use crate::stroke_log::StrokeLog;

#[derive(Clone, Default)]
pub struct AppState {
    pub board: Arc<RwLock<Board>>,
}

impl AppState {
    pub fn new(log: StrokeLog) -> Self {
        Self {
            board: Arc::new(RwLock::new(Board::new(log))),
        }
    }
}

/// The stroke log together with the connections that observe it.
///
/// Callers mutate the log and enqueue the resulting fan-out under one write
/// guard, so every peer receives broadcasts in log order.
#[derive(Default)]
pub struct Board {
    pub log: StrokeLog,
    pub peers: Peers,
}

impl Board {
    pub fn new(log: StrokeLog) -> Self {
        Self {
            log,
            peers: Peers::default(),
        }
    }
}

/// Outbound queues of every live connection.
#[derive(Default)]
pub struct Peers {
    senders: HashMap<ConnectionId, mpsc::UnboundedSender<ServerMessage>>,
}

impl Peers {
    pub fn insert(&mut self, id: ConnectionId, tx: mpsc::UnboundedSender<ServerMessage>) {
        self.senders.insert(id, tx);
    }

    pub fn remove(&mut self, id: &ConnectionId) -> bool {
        self.senders.remove(id).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.senders.len()
    }

    /// Enqueues `message` for each target and returns how many accepted it.
    /// Peers whose queue is closed are dropped from the registry.
    pub fn deliver(&mut self, targets: &HashSet<ConnectionId>, message: &ServerMessage) -> usize {
        let mut stale = Vec::new();
        let mut delivered = 0;
        for id in targets {
            let Some(tx) = self.senders.get(id) else {
                continue;
            };
            if tx.send(message.clone()).is_err() {
                stale.push(*id);
            } else {
                delivered += 1;
            }
        }
        for id in stale {
            debug!(conn = %id, "pruning closed peer");
            self.senders.remove(&id);
        }
        delivered
    }
}

// Only the global room exists, so every room resolves to every connection.
impl Presence for Peers {
    fn resolve_broadcast_targets(&self, _room: &RoomId) -> HashSet<ConnectionId> {
        self.senders.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn deliver_prunes_closed_queues() {
        let mut peers = Peers::default();
        let (open_tx, mut open_rx) = mpsc::unbounded_channel();
        let (closed_tx, closed_rx) = mpsc::unbounded_channel();
        let open = Uuid::new_v4();
        let closed = Uuid::new_v4();
        peers.insert(open, open_tx);
        peers.insert(closed, closed_tx);
        drop(closed_rx);

        let targets = peers.resolve_broadcast_targets(&RoomId::global());
        let delivered = peers.deliver(&targets, &ServerMessage::Sync(Vec::new()));

        assert_eq!(delivered, 1);
        assert_eq!(peers.len(), 1);
        assert_eq!(open_rx.try_recv().unwrap(), ServerMessage::Sync(Vec::new()));
    }

    #[test]
    fn global_room_resolves_to_every_connection() {
        let mut peers = Peers::default();
        let ids: HashSet<_> = (0..3).map(|_| Uuid::new_v4()).collect();
        for id in &ids {
            let (tx, _rx) = mpsc::unbounded_channel();
            peers.insert(*id, tx);
        }
        assert_eq!(peers.resolve_broadcast_targets(&RoomId::global()), ids);
    }
}
