//! Engine.IO v4 / Socket.IO v5 text packet codec.
//!
//! Only the default namespace and text frames are handled; binary
//! attachments are rejected.

use super::OutboundEvent;
use crate::errors::{ChatterError, ChatterResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Payload of the Engine.IO `open` packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    pub ping_interval: u64,
    pub ping_timeout: u64,
    #[serde(default)]
    pub max_payload: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnginePacket {
    Open(Handshake),
    Close,
    Ping,
    Pong,
    Message(SocketPacket),
    Upgrade,
    Noop,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect(Option<Value>),
    Disconnect,
    Event {
        name: String,
        args: Vec<Value>,
        ack_id: Option<u64>,
    },
    Ack {
        id: u64,
        args: Vec<Value>,
    },
    ConnectError(Value),
}

impl EnginePacket {
    pub fn decode(frame: &str) -> ChatterResult<Self> {
        let (kind, rest) = split_kind(frame)?;
        match kind {
            b'0' => Ok(EnginePacket::Open(serde_json::from_str(rest).map_err(|e| {
                ChatterError::protocol_error(format!("bad open payload: {}", e))
            })?)),
            b'1' => Ok(EnginePacket::Close),
            b'2' => Ok(EnginePacket::Ping),
            b'3' => Ok(EnginePacket::Pong),
            b'4' => Ok(EnginePacket::Message(SocketPacket::decode(rest)?)),
            b'5' => Ok(EnginePacket::Upgrade),
            b'6' => Ok(EnginePacket::Noop),
            other => Err(ChatterError::protocol_error(format!(
                "unknown engine packet type '{}'",
                other as char
            ))),
        }
    }

    pub fn encode(&self) -> String {
        match self {
            EnginePacket::Open(handshake) => format!(
                "0{}",
                serde_json::to_string(handshake).unwrap_or_else(|_| "{}".to_string())
            ),
            EnginePacket::Close => "1".to_string(),
            EnginePacket::Ping => "2".to_string(),
            EnginePacket::Pong => "3".to_string(),
            EnginePacket::Message(packet) => format!("4{}", packet.encode()),
            EnginePacket::Upgrade => "5".to_string(),
            EnginePacket::Noop => "6".to_string(),
        }
    }
}

impl SocketPacket {
    pub fn decode(body: &str) -> ChatterResult<Self> {
        let (kind, rest) = split_kind(body)?;

        // Namespaced packets look like "2/chat,[...]".
        let rest = match rest.strip_prefix('/') {
            Some(namespaced) => namespaced.find(',').map_or("", |i| &namespaced[i + 1..]),
            None => rest,
        };

        let digits = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let ack_id = if digits > 0 {
            Some(rest[..digits].parse::<u64>().map_err(|e| {
                ChatterError::protocol_error(format!("bad ack id: {}", e))
            })?)
        } else {
            None
        };
        let payload = &rest[digits..];

        match kind {
            b'0' => Ok(SocketPacket::Connect(if payload.is_empty() {
                None
            } else {
                Some(parse_json(payload)?)
            })),
            b'1' => Ok(SocketPacket::Disconnect),
            b'2' => {
                let mut args = parse_array(payload)?;
                if args.is_empty() {
                    return Err(ChatterError::protocol_error("event packet without a name"));
                }
                let name = match args.remove(0) {
                    Value::String(name) => name,
                    other => {
                        return Err(ChatterError::protocol_error(format!(
                            "event name must be a string, got {}",
                            other
                        )))
                    }
                };
                Ok(SocketPacket::Event { name, args, ack_id })
            }
            b'3' => Ok(SocketPacket::Ack {
                id: ack_id.ok_or_else(|| ChatterError::protocol_error("ack without id"))?,
                args: parse_array(payload)?,
            }),
            b'4' => Ok(SocketPacket::ConnectError(if payload.is_empty() {
                Value::Null
            } else {
                parse_json(payload)?
            })),
            b'5' | b'6' => Err(ChatterError::protocol_error(
                "binary packets are not supported",
            )),
            other => Err(ChatterError::protocol_error(format!(
                "unknown socket packet type '{}'",
                other as char
            ))),
        }
    }

    pub fn encode(&self) -> String {
        match self {
            SocketPacket::Connect(None) => "0".to_string(),
            SocketPacket::Connect(Some(auth)) => format!("0{}", auth),
            SocketPacket::Disconnect => "1".to_string(),
            SocketPacket::Event { name, args, ack_id } => {
                let mut items = Vec::with_capacity(args.len() + 1);
                items.push(Value::String(name.clone()));
                items.extend(args.iter().cloned());
                let id = ack_id.map(|id| id.to_string()).unwrap_or_default();
                format!("2{}{}", id, Value::Array(items))
            }
            SocketPacket::Ack { id, args } => {
                format!("3{}{}", id, Value::Array(args.clone()))
            }
            SocketPacket::ConnectError(detail) => format!("4{}", detail),
        }
    }
}

impl From<&OutboundEvent> for EnginePacket {
    fn from(event: &OutboundEvent) -> Self {
        EnginePacket::Message(SocketPacket::Event {
            name: event.name().to_string(),
            args: event.args(),
            ack_id: None,
        })
    }
}

fn split_kind(text: &str) -> ChatterResult<(u8, &str)> {
    match text.as_bytes().first() {
        Some(b) if b.is_ascii_digit() => Ok((*b, &text[1..])),
        Some(_) => Err(ChatterError::protocol_error(format!(
            "packet does not start with a type digit: {:?}",
            text
        ))),
        None => Err(ChatterError::protocol_error("empty packet")),
    }
}

fn parse_json(payload: &str) -> ChatterResult<Value> {
    serde_json::from_str(payload)
        .map_err(|e| ChatterError::protocol_error(format!("bad packet payload: {}", e)))
}

fn parse_array(payload: &str) -> ChatterResult<Vec<Value>> {
    match parse_json(payload)? {
        Value::Array(items) => Ok(items),
        other => Err(ChatterError::protocol_error(format!(
            "expected a JSON array, got {}",
            other
        ))),
    }
}
