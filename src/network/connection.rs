//! Connection Handler
//!
//! Handles individual client connections.

use std::io::{ErrorKind, Read, Write};
use std::net::TcpStream;
use std::time::Duration;

use crate::error::Result;
use crate::protocol::{ProtocolHandler, Response};

/// Handles a single client connection
///
/// Each `read` is one request frame; the reply goes out in a single write.
pub struct Connection {
    /// TCP stream (unbuffered, reads must not merge frames)
    stream: TcpStream,

    /// Protocol state for this client
    handler: Box<dyn ProtocolHandler>,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    pub fn new(stream: TcpStream, handler: Box<dyn ProtocolHandler>) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        Ok(Self {
            stream,
            handler,
            peer_addr,
        })
    }

    /// Configure connection timeouts (0 disables)
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        if read_ms > 0 {
            self.stream
                .set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            self.stream
                .set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }

        Ok(())
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Returns when the client disconnects or a transport error occurs.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!(
            "{} connection established from {}",
            self.handler.name(),
            self.peer_addr
        );

        let mut buffer = vec![0u8; self.handler.recv_buffer_size()];

        loop {
            let len = match self.stream.read(&mut buffer) {
                Ok(0) => {
                    tracing::debug!("Client {} disconnected", self.peer_addr);
                    return Ok(());
                }
                Ok(len) => len,
                Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(ref e) if e.kind() == ErrorKind::ConnectionReset => {
                    tracing::debug!("Connection reset by client {}", self.peer_addr);
                    return Ok(());
                }
                Err(ref e) if e.kind() == ErrorKind::ConnectionAborted => {
                    tracing::debug!("Connection aborted by client {}", self.peer_addr);
                    return Ok(());
                }
                Err(ref e)
                    if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut =>
                {
                    // Idle past the read timeout
                    tracing::debug!("Read timeout for client {}", self.peer_addr);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    return Err(e.into());
                }
            };

            let frame = &buffer[..len];
            tracing::trace!("Received frame from {}: {:02X?}", self.peer_addr, frame);

            let response = self.handler.handle_frame(frame);

            if let Err(e) = self.send_response(&response) {
                match e.kind() {
                    ErrorKind::ConnectionAborted
                    | ErrorKind::ConnectionReset
                    | ErrorKind::BrokenPipe => {
                        tracing::debug!(
                            "Client {} disconnected before response could be sent: {}",
                            self.peer_addr,
                            e
                        );
                        return Ok(());
                    }
                    _ => {
                        tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                        return Err(e.into());
                    }
                }
            }
        }
    }

    /// Send a response to the client; empty responses send nothing
    fn send_response(&mut self, response: &Response) -> std::io::Result<()> {
        if response.is_empty() {
            return Ok(());
        }
        self.stream.write_all(response.as_bytes())?;
        self.stream.flush()
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}
