//! Socket.IO client over a single WebSocket connection.
//!
//! The connection runs on its own task. Inbound events fan out through a
//! [`ListenerRegistry`]; outbound events are queued on an unbounded channel and
//! written once the namespace handshake has completed, so emits made before
//! the socket is ready are not lost. A dropped connection is reported as a
//! `Disconnect` event and never retried. Only plain `ws` connections are
//! made; TLS endpoints are rejected up front.

use super::packet::{EnginePacket, Handshake, SocketPacket};
use super::{value_text, InboundEvent, ListenerRegistry, OutboundEvent, Subscription, Transport};
use crate::constants::CONNECT_TIMEOUT;
use crate::errors::{ChatterError, ChatterResult};
use futures::{Sink, SinkExt, StreamExt};
use log::{debug, error, info, warn};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, timeout, Instant};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use url::Url;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug)]
pub struct SocketClient {
    registry: ListenerRegistry,
    outbound: mpsc::UnboundedSender<OutboundEvent>,
    task: JoinHandle<()>,
}

impl SocketClient {
    /// Starts connecting to `endpoint` in the background.
    ///
    /// Must be called from within a tokio runtime. Connection failures are
    /// delivered to subscribers as `ConnectError` events.
    pub fn connect(endpoint: &str) -> ChatterResult<Self> {
        Self::connect_with_timeout(endpoint, CONNECT_TIMEOUT)
    }

    /// Like [`SocketClient::connect`], giving up with a `ConnectError("timeout")`
    /// if the handshake has not finished within `connect_timeout`.
    pub fn connect_with_timeout(endpoint: &str, connect_timeout: Duration) -> ChatterResult<Self> {
        let url = socket_url(endpoint)?;
        let registry = ListenerRegistry::default();
        let (outbound, outbound_rx) = mpsc::unbounded_channel();

        info!("Connecting to {}", url);
        let task = tokio::spawn(run_connection(
            url,
            connect_timeout,
            registry.clone(),
            outbound_rx,
        ));

        Ok(Self {
            registry,
            outbound,
            task,
        })
    }
}

impl Transport for SocketClient {
    fn subscribe(&self) -> Subscription {
        self.registry.subscribe()
    }

    fn emit(&self, event: OutboundEvent) -> ChatterResult<()> {
        self.outbound
            .send(event)
            .map_err(|_| ChatterError::transport_error("connection task has stopped"))
    }
}

impl Drop for SocketClient {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Builds the Engine.IO WebSocket URL for a server endpoint.
///
/// `https` and `wss` endpoints are refused: the WebSocket stack is built
/// without TLS.
pub fn socket_url(endpoint: &str) -> ChatterResult<Url> {
    let mut url = Url::parse(endpoint)
        .map_err(|e| ChatterError::config_error(format!("Invalid endpoint: {}", e)))?;

    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => {
            return Err(ChatterError::config_error(format!(
                "TLS endpoints are not supported: {}",
                url.scheme()
            )))
        }
        other => {
            return Err(ChatterError::config_error(format!(
                "Unsupported endpoint scheme: {}",
                other
            )))
        }
    };
    url.set_scheme(scheme)
        .map_err(|()| ChatterError::config_error("Cannot switch endpoint to a WebSocket scheme"))?;

    if url.path() == "/" || url.path().is_empty() {
        url.set_path("/socket.io/");
    }
    url.query_pairs_mut()
        .append_pair("EIO", "4")
        .append_pair("transport", "websocket");

    Ok(url)
}

async fn run_connection(
    url: Url,
    connect_timeout: Duration,
    registry: ListenerRegistry,
    mut outbound: mpsc::UnboundedReceiver<OutboundEvent>,
) {
    let (ws, handshake) = match timeout(connect_timeout, open(&url)).await {
        Ok(Ok(opened)) => opened,
        Ok(Err(e)) => {
            error!("Socket connection failed: {}", e);
            registry.dispatch(InboundEvent::ConnectError(e.to_string()));
            return;
        }
        Err(_) => {
            error!("Socket connection timed out after {:?}", connect_timeout);
            registry.dispatch(InboundEvent::ConnectError("timeout".to_string()));
            return;
        }
    };

    info!("Socket connected (sid {})", handshake.sid);

    let reason = match pump(ws, &handshake, &registry, &mut outbound).await {
        Ok(reason) => reason,
        Err(e) => {
            warn!("Socket transport error: {}", e);
            "transport error".to_string()
        }
    };

    info!("Socket closed: {}", reason);
    registry.dispatch(InboundEvent::Disconnect(reason));
}

async fn send_packet<S>(sink: &mut S, packet: &EnginePacket) -> ChatterResult<()>
where
    S: Sink<WsMessage> + Unpin,
    S::Error: std::fmt::Display,
{
    sink.send(WsMessage::Text(packet.encode().into()))
        .await
        .map_err(|e| ChatterError::transport_error(format!("Failed to write frame: {}", e)))
}

async fn next_packet(ws: &mut WsStream) -> ChatterResult<EnginePacket> {
    loop {
        let frame = ws
            .next()
            .await
            .ok_or_else(|| ChatterError::transport_error("connection closed during handshake"))?
            .map_err(|e| ChatterError::transport_error(e.to_string()))?;

        match frame {
            WsMessage::Text(text) => return EnginePacket::decode(text.as_str()),
            WsMessage::Close(_) => {
                return Err(ChatterError::transport_error(
                    "connection closed during handshake",
                ))
            }
            _ => continue,
        }
    }
}

/// Performs the Engine.IO open and the Socket.IO namespace connect.
async fn open(url: &Url) -> ChatterResult<(WsStream, Handshake)> {
    let (mut ws, _response) = connect_async(url.as_str())
        .await
        .map_err(|e| ChatterError::transport_error(format!("WebSocket connect failed: {}", e)))?;

    let handshake = match next_packet(&mut ws).await? {
        EnginePacket::Open(handshake) => handshake,
        other => {
            return Err(ChatterError::protocol_error(format!(
                "expected open packet, got {:?}",
                other
            )))
        }
    };

    send_packet(&mut ws, &EnginePacket::Message(SocketPacket::Connect(None))).await?;

    loop {
        match next_packet(&mut ws).await? {
            EnginePacket::Message(SocketPacket::Connect(_)) => break,
            EnginePacket::Message(SocketPacket::ConnectError(detail)) => {
                return Err(ChatterError::transport_error(value_text(&detail)))
            }
            EnginePacket::Ping => send_packet(&mut ws, &EnginePacket::Pong).await?,
            EnginePacket::Close => {
                return Err(ChatterError::transport_error("server closed during handshake"))
            }
            other => debug!("Ignoring {:?} during handshake", other),
        }
    }

    Ok((ws, handshake))
}

/// Moves frames in both directions until the connection ends, returning the
/// disconnect reason.
async fn pump(
    ws: WsStream,
    handshake: &Handshake,
    registry: &ListenerRegistry,
    outbound: &mut mpsc::UnboundedReceiver<OutboundEvent>,
) -> ChatterResult<String> {
    let (mut sink, mut stream) = ws.split();
    let ping_window =
        Duration::from_millis(handshake.ping_interval.saturating_add(handshake.ping_timeout));
    let mut ping_deadline = Instant::now() + ping_window;

    loop {
        tokio::select! {
            frame = stream.next() => {
                let frame = match frame {
                    Some(frame) => frame.map_err(|e| ChatterError::transport_error(e.to_string()))?,
                    None => return Ok("transport close".to_string()),
                };

                let text = match frame {
                    WsMessage::Text(text) => text,
                    WsMessage::Close(_) => return Ok("transport close".to_string()),
                    _ => continue,
                };

                let packet = match EnginePacket::decode(text.as_str()) {
                    Ok(packet) => packet,
                    Err(e) => {
                        warn!("Dropping malformed frame: {}", e);
                        continue;
                    }
                };

                match packet {
                    EnginePacket::Ping => {
                        ping_deadline = Instant::now() + ping_window;
                        send_packet(&mut sink, &EnginePacket::Pong).await?;
                    }
                    EnginePacket::Close => return Ok("transport close".to_string()),
                    EnginePacket::Message(SocketPacket::Event { name, args, .. }) => {
                        match InboundEvent::from_event(&name, &args) {
                            Some(event) => {
                                registry.dispatch(event);
                            }
                            None => debug!("Ignoring event {}", name),
                        }
                    }
                    EnginePacket::Message(SocketPacket::Disconnect) => {
                        return Ok("io server disconnect".to_string())
                    }
                    EnginePacket::Message(SocketPacket::ConnectError(detail)) => {
                        registry.dispatch(InboundEvent::ConnectError(value_text(&detail)));
                    }
                    other => debug!("Ignoring {:?}", other),
                }
            }
            event = outbound.recv() => {
                match event {
                    Some(event) => {
                        debug!("Emitting {}", event.name());
                        send_packet(&mut sink, &EnginePacket::from(&event)).await?;
                    }
                    None => {
                        let goodbye = EnginePacket::Message(SocketPacket::Disconnect);
                        send_packet(&mut sink, &goodbye).await?;
                        return Ok("io client disconnect".to_string());
                    }
                }
            }
            _ = sleep_until(ping_deadline) => {
                return Ok("ping timeout".to_string());
            }
        }
    }
}
