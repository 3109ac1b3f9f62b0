use std::collections::HashSet;

use sketchsync_shared::{ClientMessage, ServerMessage};
use tracing::debug;

use crate::rooms::{ConnectionId, Presence, RoomId};
use crate::state::{AppState, Board};
use crate::stroke_log::{AppendOutcome, StrokeLog};

/// Who receives the reply to a client message, relative to its sender.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BroadcastScope {
    Others,
    Everyone,
    SenderOnly,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Dispatch {
    pub message: ServerMessage,
    pub scope: BroadcastScope,
}

impl Dispatch {
    fn sync(log: &StrokeLog, scope: BroadcastScope) -> Self {
        Self {
            message: ServerMessage::Sync(log.snapshot()),
            scope,
        }
    }
}

/// Applies one client message to the log and describes the resulting broadcast.
///
/// Returns `None` when nothing should be sent, which only happens for rejected
/// strokes. Undo and clear always answer with a full snapshot, even when the
/// log was already empty.
pub fn apply_client_message(log: &mut StrokeLog, message: ClientMessage) -> Option<Dispatch> {
    match message {
        ClientMessage::Draw(stroke) => {
            let id = stroke.id.clone();
            match log.append(stroke) {
                AppendOutcome::Accepted(stroke) => Some(Dispatch {
                    message: ServerMessage::Draw(stroke),
                    scope: BroadcastScope::Others,
                }),
                AppendOutcome::Rejected(reason) => {
                    debug!(stroke = %id, %reason, "dropping stroke");
                    None
                }
            }
        }
        ClientMessage::Undo => {
            if let Some(removed) = log.remove_last() {
                debug!(stroke = %removed.id, remaining = log.size(), "undo");
            }
            Some(Dispatch::sync(log, BroadcastScope::Everyone))
        }
        ClientMessage::Clear => {
            log.clear();
            Some(Dispatch::sync(log, BroadcastScope::Everyone))
        }
        ClientMessage::RequestSync => Some(Dispatch::sync(log, BroadcastScope::SenderOnly)),
    }
}

pub fn resolve_targets(
    scope: BroadcastScope,
    sender: ConnectionId,
    mut candidates: HashSet<ConnectionId>,
) -> HashSet<ConnectionId> {
    match scope {
        BroadcastScope::Everyone => candidates,
        BroadcastScope::Others => {
            candidates.remove(&sender);
            candidates
        }
        BroadcastScope::SenderOnly => {
            if candidates.contains(&sender) {
                HashSet::from([sender])
            } else {
                HashSet::new()
            }
        }
    }
}

pub fn dispatch_on_board(
    board: &mut Board,
    room: &RoomId,
    sender: ConnectionId,
    message: ClientMessage,
) -> usize {
    let kind = message.kind();
    let Some(dispatch) = apply_client_message(&mut board.log, message) else {
        return 0;
    };
    let candidates = board.peers.resolve_broadcast_targets(room);
    let targets = resolve_targets(dispatch.scope, sender, candidates);
    let delivered = board.peers.deliver(&targets, &dispatch.message);
    debug!(
        conn = %sender,
        kind,
        reply = dispatch.message.kind(),
        delivered,
        strokes = board.log.size(),
        "handled message"
    );
    delivered
}

/// Handles one inbound message to completion: mutation and fan-out happen
/// under a single write guard.
pub async fn handle_client_message(state: &AppState, sender: ConnectionId, message: ClientMessage) {
    let mut board = state.board.write().await;
    dispatch_on_board(&mut board, &RoomId::global(), sender, message);
}
