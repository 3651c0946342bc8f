//! Single-peer JSON relay: listens on a TCP or Unix socket, speaks
//! newline-delimited JSON messages with exactly one connected peer at a
//! time, and reports everything to the application over a channel.

use std::net::SocketAddr;
#[cfg(unix)]
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
#[cfg(unix)]
use tokio::net::UnixListener;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeerMessageKind {
    ProtocolError,
    InputCommandReceived,
    InputCommandReplacement,
    GeneralOutput,
    ErrorOutput,
    UserExited,
}

/// One message exchanged with the peer, carried on the wire as a single
/// JSON object per line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerMessage {
    pub kind: PeerMessageKind,
    pub message: String,
}

impl PeerMessage {
    pub fn new(kind: PeerMessageKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// What the relay reports to the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
    PeerConnected(String),
    PeerClosed(String),
    Message(PeerMessage),
    Error(String),
}

/// Sends messages to whichever peer is connected. Messages sent while no
/// peer is connected are queued and delivered on the next connection.
#[derive(Clone)]
pub struct RelaySender {
    tx: mpsc::UnboundedSender<PeerMessage>,
}

impl RelaySender {
    pub fn send(&self, msg: PeerMessage) {
        let _ = self.tx.send(msg);
    }
}

/// Application-side handle: the event stream plus the outbound sender.
pub struct RelayHandle {
    pub sender: RelaySender,
    pub events: mpsc::UnboundedReceiver<RelayEvent>,
}

enum Endpoint {
    Tcp(TcpListener),
    #[cfg(unix)]
    Unix(UnixListener),
}

trait PeerStream: AsyncRead + AsyncWrite + Send + Unpin {}
impl<T: AsyncRead + AsyncWrite + Send + Unpin> PeerStream for T {}

type BoxedStream = Box<dyn PeerStream>;

/// The listening side of the relay. Construct with [`PeerRelay::bind_tcp`]
/// or [`PeerRelay::bind_unix`], then drive it with [`PeerRelay::run`] on a
/// tokio task.
pub struct PeerRelay {
    endpoint: Endpoint,
    events_tx: mpsc::UnboundedSender<RelayEvent>,
    outgoing_rx: mpsc::UnboundedReceiver<PeerMessage>,
}

impl PeerRelay {
    pub async fn bind_tcp(addr: &str) -> anyhow::Result<(Self, RelayHandle)> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind tcp listener on {addr}"))?;
        Ok(Self::from_endpoint(Endpoint::Tcp(listener)))
    }

    /// Binds a Unix stream socket, removing a stale socket file first.
    #[cfg(unix)]
    pub async fn bind_unix(path: &Path) -> anyhow::Result<(Self, RelayHandle)> {
        if path.exists() {
            std::fs::remove_file(path)
                .with_context(|| format!("failed to remove stale socket {}", path.display()))?;
        }
        let listener = UnixListener::bind(path)
            .with_context(|| format!("failed to bind unix socket {}", path.display()))?;
        Ok(Self::from_endpoint(Endpoint::Unix(listener)))
    }

    fn from_endpoint(endpoint: Endpoint) -> (Self, RelayHandle) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();
        (
            Self {
                endpoint,
                events_tx,
                outgoing_rx,
            },
            RelayHandle {
                sender: RelaySender { tx: outgoing_tx },
                events: events_rx,
            },
        )
    }

    /// The bound TCP address, useful when binding port 0.
    pub fn tcp_local_addr(&self) -> Option<SocketAddr> {
        match &self.endpoint {
            Endpoint::Tcp(listener) => listener.local_addr().ok(),
            #[cfg(unix)]
            Endpoint::Unix(_) => None,
        }
    }

    /// Accepts peers one at a time until the application drops its handle.
    pub async fn run(self) {
        let PeerRelay {
            endpoint,
            events_tx,
            mut outgoing_rx,
        } = self;
        loop {
            let (stream, peer) = match accept(&endpoint).await {
                Ok(accepted) => accepted,
                Err(e) => {
                    let _ = events_tx.send(RelayEvent::Error(format!("accept failed: {e}")));
                    return;
                }
            };
            if events_tx
                .send(RelayEvent::PeerConnected(peer.clone()))
                .is_err()
            {
                return;
            }
            serve_peer(&endpoint, &events_tx, &mut outgoing_rx, stream).await;
            if events_tx.send(RelayEvent::PeerClosed(peer)).is_err() {
                return;
            }
        }
    }
}

async fn accept(endpoint: &Endpoint) -> anyhow::Result<(BoxedStream, String)> {
    match endpoint {
        Endpoint::Tcp(listener) => {
            let (stream, addr) = listener.accept().await?;
            Ok((Box::new(stream), addr.to_string()))
        }
        #[cfg(unix)]
        Endpoint::Unix(listener) => {
            let (stream, _) = listener.accept().await?;
            Ok((Box::new(stream), "unix peer".to_string()))
        }
    }
}

/// Serves the connected peer until it disconnects or a socket error
/// occurs. Connection attempts arriving in the meantime are refused with a
/// `protocol_error` message.
async fn serve_peer(
    endpoint: &Endpoint,
    events_tx: &mpsc::UnboundedSender<RelayEvent>,
    outgoing_rx: &mut mpsc::UnboundedReceiver<PeerMessage>,
    stream: BoxedStream,
) {
    let (read_half, mut write_half) = tokio::io::split(stream);
    let mut lines = BufReader::new(read_half).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => match serde_json::from_str::<PeerMessage>(&line) {
                    Ok(msg) => {
                        if events_tx.send(RelayEvent::Message(msg)).is_err() {
                            return;
                        }
                    }
                    Err(e) => {
                        let _ = events_tx.send(RelayEvent::Error(format!(
                            "unparseable peer message: {e}"
                        )));
                        let reply = PeerMessage::new(
                            PeerMessageKind::ProtocolError,
                            format!("unparseable message: {e}"),
                        );
                        if write_line(&mut write_half, &reply).await.is_err() {
                            return;
                        }
                    }
                },
                Ok(None) => return,
                Err(e) => {
                    let _ = events_tx.send(RelayEvent::Error(format!("peer read failed: {e}")));
                    return;
                }
            },
            Some(out) = outgoing_rx.recv() => {
                if let Err(e) = write_line(&mut write_half, &out).await {
                    let _ = events_tx.send(RelayEvent::Error(format!("peer write failed: {e}")));
                    return;
                }
            },
            accepted = accept(endpoint) => match accepted {
                Ok((mut extra, peer)) => {
                    let refusal = PeerMessage::new(
                        PeerMessageKind::ProtocolError,
                        "another peer is already connected",
                    );
                    let _ = write_line(&mut extra, &refusal).await;
                    let _ = events_tx.send(RelayEvent::Error(format!(
                        "refused extra peer connection from {peer}"
                    )));
                }
                Err(e) => {
                    let _ = events_tx.send(RelayEvent::Error(format!("accept failed: {e}")));
                }
            },
        }
    }
}

async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, msg: &PeerMessage) -> anyhow::Result<()> {
    let mut line = serde_json::to_string(msg)?;
    line.push('\n');
    writer.write_all(line.as_bytes()).await?;
    Ok(())
}
