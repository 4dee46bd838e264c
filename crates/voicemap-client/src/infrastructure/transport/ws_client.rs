//! WebSocket client with reconnect.
//!
//! [`run_transport`] owns the connection for the life of the process:
//!
//! 1. Connect to the configured URL.
//! 2. Post [`ConnectivitySignal::Online`] on the first successful connect
//!    after an outage.
//! 3. Forward every text frame, decoded, into the event queue and write every
//!    queued [`Outbound`] request to the socket.
//! 4. When the connection fails or closes, post
//!    [`ConnectivitySignal::Offline`], wait `reconnect_delay`, and go to 1.
//!
//! Signals are edge-triggered: a server that stays down produces a single
//! `Offline`, however many connection attempts fail.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_tungstenite::{
    connect_async,
    tungstenite::{Error as WsError, Message as WsMessage},
    MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, info, warn};
use voicemap_core::{decode_inbound, encode_outbound, Inbound, Outbound};

use super::TransportError;
use crate::application::control_surface::RecognitionPeer;
use crate::application::event_loop::{ClientEvent, ConnectivitySignal};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Creates the request queue shared by a [`WsPeer`] and [`run_transport`].
pub fn outbound_channel(capacity: usize) -> (WsPeer, Outbox) {
    let (tx, rx) = mpsc::channel(capacity);
    let online = Arc::new(AtomicBool::new(false));
    let peer = WsPeer {
        tx,
        online: Arc::clone(&online),
    };
    (peer, Outbox { rx, online })
}

/// Sending half of the request queue.
#[derive(Debug, Clone)]
pub struct WsPeer {
    tx: mpsc::Sender<Outbound>,
    online: Arc<AtomicBool>,
}

impl WsPeer {
    /// `true` while a session with the recognition service is open.
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Acquire)
    }

    /// Queues `message` for the open session.  Fails immediately when there
    /// is no session rather than holding the request for a later one.
    pub fn send(&self, message: Outbound) -> Result<(), TransportError> {
        if !self.is_online() {
            return Err(TransportError::Offline);
        }
        self.tx.try_send(message).map_err(|e| match e {
            TrySendError::Full(_) => TransportError::QueueFull,
            TrySendError::Closed(_) => TransportError::Stopped,
        })
    }
}

#[async_trait]
impl RecognitionPeer for WsPeer {
    async fn request_listening(&self) -> Result<(), String> {
        self.send(Outbound::StartRecognition).map_err(|e| e.to_string())
    }
}

/// Receiving half of the request queue, consumed by [`run_transport`].
#[derive(Debug)]
pub struct Outbox {
    rx: mpsc::Receiver<Outbound>,
    online: Arc<AtomicBool>,
}

enum SessionEnd {
    /// The service closed the socket.
    Closed,
    /// The event loop or every peer has gone away.
    ClientGone,
}

/// Runs the connect / forward / reconnect cycle until the event loop stops.
pub async fn run_transport(
    url: String,
    reconnect_delay: Duration,
    events: mpsc::Sender<ClientEvent>,
    mut outbox: Outbox,
) {
    let mut link = None;

    loop {
        let outcome = match connect_async(url.as_str()).await {
            Ok((stream, _response)) => {
                info!("connected to recognition service at {url}");
                outbox.online.store(true, Ordering::Release);
                if !post_edge(&events, &mut link, ConnectivitySignal::Online).await {
                    return;
                }
                let outcome = run_session(stream, &events, &mut outbox.rx).await;
                outbox.online.store(false, Ordering::Release);
                outcome
            }
            Err(source) => Err(TransportError::Connect {
                url: url.clone(),
                source: Box::new(source),
            }),
        };

        match outcome {
            Ok(SessionEnd::ClientGone) => {
                debug!("client stopped; closing transport");
                return;
            }
            Ok(SessionEnd::Closed) => info!("recognition service closed the connection"),
            Err(e) if link == Some(ConnectivitySignal::Offline) => debug!("{e}"),
            Err(e) => warn!("{e}"),
        }

        if !post_edge(&events, &mut link, ConnectivitySignal::Offline).await {
            return;
        }
        // Requests raced against the closing session belong to it.
        while outbox.rx.try_recv().is_ok() {}
        tokio::time::sleep(reconnect_delay).await;
    }
}

/// Posts `signal` if it differs from the last one posted.  Returns `false`
/// once the event loop has gone away.
async fn post_edge(
    events: &mpsc::Sender<ClientEvent>,
    link: &mut Option<ConnectivitySignal>,
    signal: ConnectivitySignal,
) -> bool {
    if *link == Some(signal) {
        return true;
    }
    *link = Some(signal);
    events.send(ClientEvent::Connectivity(signal)).await.is_ok()
}

async fn run_session(
    stream: WsStream,
    events: &mpsc::Sender<ClientEvent>,
    outbound: &mut mpsc::Receiver<Outbound>,
) -> Result<SessionEnd, TransportError> {
    let (mut sink, mut source) = stream.split();

    loop {
        tokio::select! {
            frame = source.next() => {
                let message = match frame {
                    Some(Ok(message)) => message,
                    Some(Err(WsError::ConnectionClosed | WsError::AlreadyClosed)) | None => {
                        return Ok(SessionEnd::Closed);
                    }
                    Some(Err(e)) => return Err(e.into()),
                };
                match message {
                    WsMessage::Text(text) => {
                        let inbound = decode_inbound(&text);
                        if let Inbound::Command(command) = &inbound {
                            debug!("service → client: {}", command.kind());
                        }
                        if events.send(ClientEvent::Transport(inbound)).await.is_err() {
                            return Ok(SessionEnd::ClientGone);
                        }
                    }
                    WsMessage::Binary(data) => {
                        warn!("unexpected binary frame ({} bytes, ignored)", data.len());
                    }
                    WsMessage::Ping(_) | WsMessage::Pong(_) => debug!("keepalive frame"),
                    WsMessage::Close(_) => return Ok(SessionEnd::Closed),
                    WsMessage::Frame(_) => debug!("raw frame (ignored)"),
                }
            }
            request = outbound.recv() => {
                let Some(request) = request else {
                    return Ok(SessionEnd::ClientGone);
                };
                let text = encode_outbound(&request)?;
                debug!("client → service: {text}");
                sink.send(WsMessage::Text(text)).await?;
            }
        }
    }
}
