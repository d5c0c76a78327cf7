//! Network Module
//!
//! TCP server, per-client connection handling and a blocking client.
//!
//! ## Architecture
//! - Single acceptor thread polling a non-blocking listener
//! - One named thread per client (or inline when synchronous)
//! - Each connection owns its protocol handler; all share one mount

mod client;
mod connection;
mod server;

pub use client::Client;
pub use connection::Connection;
pub use server::Server;
