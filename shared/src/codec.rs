use bincode::{Decode, Encode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid JSON frame: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid binary frame: {0}")]
    Decode(#[from] bincode::error::DecodeError),
    #[error("failed to encode binary frame: {0}")]
    Encode(#[from] bincode::error::EncodeError),
}

/// Which frame kind a peer speaks. Text frames carry JSON, binary frames bincode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FrameFormat {
    #[default]
    Json,
    Binary,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
}

impl Frame {
    pub fn format(&self) -> FrameFormat {
        match self {
            Frame::Text(_) => FrameFormat::Json,
            Frame::Binary(_) => FrameFormat::Binary,
        }
    }
}

/// Largest payload a binary frame may claim while decoding. Length prefixes
/// above this fail with `LimitExceeded` before anything is allocated.
pub const MAX_FRAME_BYTES: usize = 16 * 1024 * 1024;

fn binary_config() -> impl bincode::config::Config {
    bincode::config::standard().with_limit::<MAX_FRAME_BYTES>()
}

pub fn encode<T: Serialize + Encode>(
    message: &T,
    format: FrameFormat,
) -> Result<Frame, ProtocolError> {
    match format {
        FrameFormat::Json => Ok(Frame::Text(serde_json::to_string(message)?)),
        FrameFormat::Binary => {
            let bytes = bincode::encode_to_vec(message, binary_config())?;
            Ok(Frame::Binary(bytes))
        }
    }
}

pub fn decode_text<T: DeserializeOwned>(text: &str) -> Result<T, ProtocolError> {
    Ok(serde_json::from_str(text)?)
}

pub fn decode_binary<T: Decode<()>>(bytes: &[u8]) -> Result<T, ProtocolError> {
    let (message, _) = bincode::decode_from_slice(bytes, binary_config())?;
    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClientMessage, Point, ServerMessage, Stroke};

    fn stroke() -> Stroke {
        Stroke {
            id: "s1".into(),
            author_id: "anonymous".into(),
            color: "#000".into(),
            width: 2.0,
            points: vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0)],
            created_at: None,
        }
    }

    #[test]
    fn binary_frames_carry_the_same_message() {
        let message = ServerMessage::Sync(vec![stroke()]);
        let frame = encode(&message, FrameFormat::Binary).unwrap();
        assert_eq!(frame.format(), FrameFormat::Binary);
        let Frame::Binary(bytes) = frame else {
            panic!("expected a binary frame");
        };
        let decoded: ServerMessage = decode_binary(&bytes).unwrap();
        assert_eq!(decoded, message);
    }

    #[test]
    fn json_frames_decode_from_text() {
        let frame = encode(&ClientMessage::Draw(stroke()), FrameFormat::Json).unwrap();
        let Frame::Text(text) = frame else {
            panic!("expected a text frame");
        };
        assert!(text.starts_with(r#"{"type":"stroke:draw","data":{"#));
        let decoded: ClientMessage = decode_text(&text).unwrap();
        assert_eq!(decoded, ClientMessage::Draw(stroke()));
    }

    #[test]
    fn garbage_is_reported_not_panicked() {
        assert!(matches!(
            decode_text::<ClientMessage>("{not json"),
            Err(ProtocolError::Json(_))
        ));
        assert!(matches!(
            decode_binary::<ClientMessage>(&[9]),
            Err(ProtocolError::Decode(_))
        ));
    }

    #[test]
    fn oversized_length_prefix_is_rejected_without_allocating() {
        // `stroke:draw` whose id claims 2^40 bytes.
        let mut bytes = vec![0, 253];
        bytes.extend_from_slice(&(1u64 << 40).to_le_bytes());
        assert!(matches!(
            decode_binary::<ClientMessage>(&bytes),
            Err(ProtocolError::Decode(_))
        ));
    }
}
