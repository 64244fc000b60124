//! WebSocket transport to the Archipelago server.

use std::net::TcpStream;
use std::time::{Duration, Instant};

use bluesphere_core::session::{decode_frame, encode_frame};
use bluesphere_core::{ClientMessage, Error, Result, ServerMessage, SessionChannel};
use tracing::{debug, trace};
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};

/// Read timeout used while draining packets between polls
const DRAIN_TIMEOUT: Duration = Duration::from_millis(5);

pub struct ArchipelagoChannel {
    socket: WebSocket<MaybeTlsStream<TcpStream>>,
}

impl ArchipelagoChannel {
    pub fn connect(url: &str) -> Result<Self> {
        let url = normalize_url(url);
        let (socket, _) = tungstenite::connect(url.as_str()).map_err(map_ws)?;
        debug!("Connected to {}", url);

        let mut channel = Self { socket };
        channel.set_read_timeout(DRAIN_TIMEOUT)?;
        Ok(channel)
    }

    fn set_read_timeout(&mut self, timeout: Duration) -> Result<()> {
        if let MaybeTlsStream::Plain(stream) = self.socket.get_mut() {
            stream.set_read_timeout(Some(timeout))?;
        }
        Ok(())
    }

    /// Read one frame, or `None` if nothing arrived before the read timeout
    fn read_frame(&mut self) -> Result<Option<Vec<ServerMessage>>> {
        loop {
            match self.socket.read() {
                Ok(Message::Text(text)) => {
                    trace!("<- {}", text.as_str());
                    return decode_frame(text.as_str()).map(Some);
                }
                Ok(Message::Close(_)) => {
                    return Err(Error::NotConnected("server closed the connection".to_string()));
                }
                // Pings are answered by tungstenite itself
                Ok(_) => continue,
                Err(tungstenite::Error::Io(e))
                    if matches!(
                        e.kind(),
                        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                    ) =>
                {
                    return Ok(None);
                }
                Err(e) => return Err(map_ws(e)),
            }
        }
    }

    /// Block until a packet matching `accept` arrives, collecting everything read on the way
    pub fn wait_for<F>(&mut self, timeout: Duration, accept: F) -> Result<Vec<ServerMessage>>
    where
        F: Fn(&ServerMessage) -> bool,
    {
        let deadline = Instant::now() + timeout;
        let mut received = Vec::new();

        while Instant::now() < deadline {
            if let Some(messages) = self.read_frame()? {
                let done = messages.iter().any(&accept);
                received.extend(messages);
                if done {
                    return Ok(received);
                }
            }
        }

        Err(Error::Protocol(format!(
            "no reply from server within {}s",
            timeout.as_secs()
        )))
    }
}

impl SessionChannel for ArchipelagoChannel {
    fn send(&mut self, messages: &[ClientMessage]) -> Result<()> {
        let frame = encode_frame(messages)?;
        trace!("-> {}", frame);
        self.socket.send(Message::text(frame)).map_err(map_ws)
    }

    fn receive(&mut self) -> Result<Vec<ServerMessage>> {
        let mut received = Vec::new();
        while let Some(messages) = self.read_frame()? {
            received.extend(messages);
        }
        Ok(received)
    }
}

/// Accept bare `host:port` addresses the way the official clients do
fn normalize_url(url: &str) -> String {
    if url.starts_with("ws://") || url.starts_with("wss://") {
        url.to_string()
    } else {
        format!("ws://{}", url)
    }
}

fn map_ws(e: tungstenite::Error) -> Error {
    match e {
        tungstenite::Error::Io(e) => Error::Io(e),
        tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
            Error::NotConnected("server connection closed".to_string())
        }
        other => Error::Protocol(other.to_string()),
    }
}
