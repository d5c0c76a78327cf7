//! TCP Server
//!
//! Accepts connections and hands each one a fresh protocol handler.

use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::config::Config;
use crate::error::{MountError, Result};
use crate::mount::MountCoordinator;
use crate::protocol;
use super::Connection;

/// Sleep between accept polls
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// TCP server for AstroPi
pub struct Server {
    config: Config,
    mount: Arc<MountCoordinator>,
    listener: Option<TcpListener>,
    shutdown: Arc<AtomicBool>,
    active: Arc<AtomicUsize>,
}

impl Server {
    /// Create a new server with the given config and mount
    pub fn new(config: Config, mount: Arc<MountCoordinator>) -> Self {
        Self {
            config,
            mount,
            listener: None,
            shutdown: Arc::new(AtomicBool::new(false)),
            active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Bind the listen address
    ///
    /// Called by `run` if needed; binding first gives access to the real
    /// address when listening on port 0.
    pub fn bind(&mut self) -> Result<SocketAddr> {
        let listener = TcpListener::bind(&self.config.listen_addr).map_err(|e| {
            MountError::Network(format!("bind {}: {}", self.config.listen_addr, e))
        })?;
        listener.set_nonblocking(true)?;

        let addr = listener.local_addr()?;
        tracing::info!(
            "Listening on {} ({:?}, {})",
            addr,
            self.config.protocol,
            if self.config.synchronous {
                "synchronous"
            } else {
                "thread per client"
            }
        );

        self.listener = Some(listener);
        Ok(addr)
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().and_then(|l| l.local_addr().ok())
    }

    /// Start the server (blocking until shutdown)
    pub fn run(&mut self) -> Result<()> {
        if self.listener.is_none() {
            self.bind()?;
        }
        let listener = match self.listener.take() {
            Some(listener) => listener,
            None => return Err(MountError::Network("listener not bound".to_string())),
        };

        while !self.shutdown.load(Ordering::Acquire) {
            match listener.accept() {
                Ok((stream, addr)) => self.dispatch(stream, addr),
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL)
                }
                Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
            }
        }

        tracing::info!("Server shutting down");
        Ok(())
    }

    fn dispatch(&self, stream: TcpStream, addr: SocketAddr) {
        tracing::info!("Client connected: {}", addr);

        let connection = match self.open_connection(stream) {
            Ok(connection) => connection,
            Err(e) => {
                tracing::warn!("Rejecting {}: {}", addr, e);
                return;
            }
        };

        let active = Arc::clone(&self.active);
        active.fetch_add(1, Ordering::AcqRel);

        if self.config.synchronous {
            serve(connection, &active);
            return;
        }

        let spawned = thread::Builder::new()
            .name(format!("client-{}", addr))
            .spawn({
                let active = Arc::clone(&active);
                move || serve(connection, &active)
            });

        if let Err(e) = spawned {
            active.fetch_sub(1, Ordering::AcqRel);
            tracing::error!("Failed to spawn handler for {}: {}", addr, e);
        }
    }

    fn open_connection(&self, stream: TcpStream) -> Result<Connection> {
        // Accepted sockets may inherit the listener's non-blocking mode
        stream.set_nonblocking(false)?;

        let handler = protocol::handler_for(
            self.config.protocol,
            Arc::clone(&self.mount),
            u16::from(self.config.goto_speed),
        );
        let mut connection = Connection::new(stream, handler)?;
        connection.set_timeouts(self.config.read_timeout_ms, self.config.write_timeout_ms)?;
        Ok(connection)
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
    }

    /// Flag that stops `run` when set, usable from another thread
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Clients currently being served
    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }
}

fn serve(mut connection: Connection, active: &AtomicUsize) {
    if let Err(e) = connection.handle() {
        tracing::warn!("Connection {} closed with error: {}", connection.peer_addr(), e);
    }
    tracing::info!("Client disconnected: {}", connection.peer_addr());
    active.fetch_sub(1, Ordering::AcqRel);
}
