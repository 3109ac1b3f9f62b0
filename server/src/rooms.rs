//! Room scoping for broadcasts.
//!
//! There is exactly one room today: every connection shares the board. The
//! scope is still threaded through target resolution so that per-room
//! registries can be introduced without touching the wire protocol.

use std::collections::HashSet;

use uuid::Uuid;

pub type ConnectionId = Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RoomId(String);

impl RoomId {
    pub const GLOBAL: &'static str = "global";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn global() -> Self {
        Self::new(Self::GLOBAL)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RoomId {
    fn default() -> Self {
        Self::global()
    }
}

pub trait Presence {
    fn resolve_broadcast_targets(&self, room: &RoomId) -> HashSet<ConnectionId>;
}
