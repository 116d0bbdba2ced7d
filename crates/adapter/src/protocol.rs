//! Protocol module - JSON message types for the matrix bridge
//!
//! Line-delimited JSON: one object per line, discriminated by `type`.
//! Every message carries an optional `seq` that replies echo back.

use serde::{Deserialize, Serialize};

use crate::core::MatrixMessage;
use crate::types::{Color, Geometry};

// ============== Driver -> Viewer Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum InitMatrixType {
    #[default]
    #[serde(rename = "init_matrix")]
    InitMatrix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SetPixelsType {
    #[default]
    #[serde(rename = "set_pixels")]
    SetPixels,
}

/// Define the grid. Must be sent before any frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitMatrixMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: InitMatrixType,
    #[serde(default)]
    pub seq: u64,
    pub width: i32,
    pub height: i32,
    pub pitch: f64,
    pub diameter: f64,
}

impl InitMatrixMessage {
    pub fn geometry(&self) -> Geometry {
        Geometry::new(self.width, self.height, self.pitch, self.diameter)
    }
}

/// One full frame, row-major, each entry `[r, g, b]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetPixelsMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: SetPixelsType,
    #[serde(default)]
    pub seq: u64,
    pub data: Vec<[i32; 3]>,
}

impl SetPixelsMessage {
    pub fn frame(&self) -> Vec<Color> {
        self.data.iter().copied().map(Color::from_triple).collect()
    }
}

// ============== Viewer -> Driver Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckType {
    #[serde(rename = "ack")]
    Ack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckStatus {
    #[serde(rename = "ok")]
    Ok,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    #[serde(rename = "error")]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "invalid_message")]
    InvalidMessage,
    #[serde(rename = "frame_length_mismatch")]
    FrameLengthMismatch,
}

/// Sent once an `init_matrix` has been applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckMessage {
    #[serde(rename = "type")]
    pub msg_type: AckType,
    pub seq: u64,
    pub ts: u64,
    pub status: AckStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: ErrorType,
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
}

/// Any viewer -> driver line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reply {
    Ack(AckMessage),
    Error(ErrorMessage),
}

impl Reply {
    pub fn seq(&self) -> u64 {
        match self {
            Reply::Ack(a) => a.seq,
            Reply::Error(e) => e.seq,
        }
    }
}

// ============== Message Parsing ==============

/// Parsed incoming message
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedMessage {
    InitMatrix(InitMatrixMessage),
    SetPixels(SetPixelsMessage),
    Unknown(UnknownMessage),
}

impl ParsedMessage {
    pub fn seq(&self) -> u64 {
        match self {
            ParsedMessage::InitMatrix(m) => m.seq,
            ParsedMessage::SetPixels(m) => m.seq,
            ParsedMessage::Unknown(m) => m.seq,
        }
    }

    /// The transport-independent message, if this is one the session handles.
    pub fn into_matrix_message(self) -> Option<MatrixMessage> {
        match self {
            ParsedMessage::InitMatrix(m) => Some(MatrixMessage::InitMatrix(m.geometry())),
            ParsedMessage::SetPixels(m) => Some(MatrixMessage::SetPixels(m.frame())),
            ParsedMessage::Unknown(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMessage {
    pub seq: u64,
    pub msg_type: String,
}

/// Parse a JSON message from a string
pub fn parse_message(json: &str) -> Result<ParsedMessage, serde_json::Error> {
    #[derive(Debug, Deserialize)]
    #[serde(tag = "type")]
    enum InboundMessage {
        #[serde(rename = "init_matrix")]
        InitMatrix(InitMatrixMessage),
        #[serde(rename = "set_pixels")]
        SetPixels(SetPixelsMessage),
    }

    match serde_json::from_str::<InboundMessage>(json) {
        Ok(InboundMessage::InitMatrix(m)) => Ok(ParsedMessage::InitMatrix(m)),
        Ok(InboundMessage::SetPixels(m)) => Ok(ParsedMessage::SetPixels(m)),
        Err(e) => {
            // An unknown type is reported as such; a known type with a bad body
            // is a parse error.
            #[derive(Debug, Deserialize)]
            struct Envelope {
                #[serde(rename = "type")]
                msg_type: Option<String>,
                seq: Option<u64>,
            }
            let envelope = serde_json::from_str::<Envelope>(json)?;
            let msg_type = envelope.msg_type.unwrap_or_default();
            if msg_type != "init_matrix" && msg_type != "set_pixels" {
                return Ok(ParsedMessage::Unknown(UnknownMessage {
                    seq: envelope.seq.unwrap_or(0),
                    msg_type,
                }));
            }
            Err(e)
        }
    }
}

/// Parse a viewer reply line.
pub fn parse_reply(json: &str) -> Result<Reply, serde_json::Error> {
    serde_json::from_str(json)
}

/// Pull `seq` out of a line that failed to parse, if it is recognizable.
pub fn extract_seq_best_effort(s: &str) -> Option<u64> {
    let start = s.find("\"seq\"")?;
    let after_key = &s[start + 5..];
    let colon = after_key.find(':')?;
    let rest = after_key[colon + 1..].trim_start();
    let end = rest
        .as_bytes()
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if end == 0 {
        return None;
    }
    rest[..end].parse::<u64>().ok()
}

// ============== Utility Functions ==============

pub fn create_init_matrix(seq: u64, geometry: Geometry) -> InitMatrixMessage {
    InitMatrixMessage {
        msg_type: InitMatrixType::InitMatrix,
        seq,
        width: geometry.width,
        height: geometry.height,
        pitch: geometry.pitch,
        diameter: geometry.diameter,
    }
}

pub fn create_set_pixels(seq: u64, frame: &[Color]) -> SetPixelsMessage {
    SetPixelsMessage {
        msg_type: SetPixelsType::SetPixels,
        seq,
        data: frame.iter().map(|c| c.to_triple()).collect(),
    }
}

pub fn create_ack(seq: u64) -> AckMessage {
    AckMessage {
        msg_type: AckType::Ack,
        seq,
        ts: current_timestamp_ms(),
        status: AckStatus::Ok,
    }
}

pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ErrorMessage {
    ErrorMessage {
        msg_type: ErrorType::Error,
        seq,
        ts: current_timestamp_ms(),
        code,
        message: message.to_string(),
    }
}

/// Get current timestamp in milliseconds
fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
