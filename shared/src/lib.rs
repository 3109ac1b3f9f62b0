use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

mod codec;

pub use codec::{
    decode_binary, decode_text, encode, Frame, FrameFormat, ProtocolError, MAX_FRAME_BYTES,
};

#[derive(Serialize, Deserialize, Encode, Decode, Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// One continuous pen gesture, from press to release.
///
/// `created_at` is milliseconds since the Unix epoch. The producer sets it; the
/// server fills it in only when it is missing.
#[derive(Serialize, Deserialize, Encode, Decode, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Stroke {
    pub id: String,
    #[serde(default)]
    pub author_id: String,
    pub color: String,
    pub width: f32,
    #[serde(default)]
    pub points: Vec<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<u64>,
}

impl Stroke {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[derive(Serialize, Deserialize, Encode, Decode, Clone, Debug, PartialEq)]
#[serde(tag = "type", content = "data")]
pub enum ClientMessage {
    #[serde(rename = "stroke:draw")]
    Draw(Stroke),
    #[serde(rename = "action:undo")]
    Undo,
    #[serde(rename = "action:clear")]
    Clear,
    #[serde(rename = "canvas:request")]
    RequestSync,
}

impl ClientMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            ClientMessage::Draw(_) => "stroke:draw",
            ClientMessage::Undo => "action:undo",
            ClientMessage::Clear => "action:clear",
            ClientMessage::RequestSync => "canvas:request",
        }
    }
}

#[derive(Serialize, Deserialize, Encode, Decode, Clone, Debug, PartialEq)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage {
    #[serde(rename = "stroke:draw")]
    Draw(Stroke),
    #[serde(rename = "canvas:sync")]
    Sync(Vec<Stroke>),
}

impl ServerMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            ServerMessage::Draw(_) => "stroke:draw",
            ServerMessage::Sync(_) => "canvas:sync",
        }
    }
}
