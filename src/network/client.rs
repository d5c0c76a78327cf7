//! NexStar client
//!
//! Blocking client used by `astropi-cli` and the end-to-end tests. Every
//! request waits for a reply of known length.

use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::coords::{Location, Precision, LOCATION_BYTES};
use crate::error::{MountError, Result};
use crate::mount::{Model, TrackingMode};
use crate::protocol::{decode_angle_pair, encode_command, Command, TERMINATOR};

/// Synchronous NexStar client
pub struct Client {
    stream: TcpStream,
    server: String,
}

impl Client {
    /// Connect, with `timeout` bounding the connect and every read/write
    ///
    /// `None` waits forever, which a long goto may need.
    pub fn connect(server: &str, timeout: Option<Duration>) -> Result<Self> {
        let addr = server
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| MountError::Network(format!("Cannot resolve {}", server)))?;

        let stream = match timeout {
            Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
            None => TcpStream::connect(addr),
        }
        .map_err(|e| MountError::Network(format!("connect {}: {}", server, e)))?;

        stream.set_nodelay(true)?;
        stream.set_read_timeout(timeout)?;
        stream.set_write_timeout(timeout)?;

        tracing::debug!("Connected to {}", server);
        Ok(Self {
            stream,
            server: server.to_string(),
        })
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    /// Send one command and read `payload_len` bytes plus `#`
    ///
    /// Returns the payload without the terminator.
    pub fn request(&mut self, command: &Command, payload_len: usize) -> Result<Vec<u8>> {
        self.stream.write_all(&encode_command(command))?;
        self.stream.flush()?;

        let mut reply = vec![0u8; payload_len + 1];
        self.stream.read_exact(&mut reply)?;

        if reply.pop() != Some(TERMINATOR) {
            return Err(MountError::Decode(format!(
                "Reply to {:?} is not terminated",
                command.command_type()
            )));
        }
        Ok(reply)
    }

    // =========================================================================
    // Typed Requests
    // =========================================================================

    /// Round-trip one byte through `K`
    pub fn echo(&mut self, byte: u8) -> Result<u8> {
        let reply = self.request(&Command::Echo { payload: vec![byte] }, 1)?;
        Ok(reply[0])
    }

    /// Firmware version (major, minor)
    pub fn version(&mut self) -> Result<(u8, u8)> {
        let reply = self.request(&Command::GetVersion, 2)?;
        Ok((reply[0], reply[1]))
    }

    /// Model id, with the known model when there is one
    pub fn model(&mut self) -> Result<(u8, Option<Model>)> {
        let reply = self.request(&Command::GetModel, 1)?;
        Ok((reply[0], Model::from_u8(reply[0])))
    }

    pub fn location(&mut self) -> Result<Location> {
        let reply = self.request(&Command::GetLocation, LOCATION_BYTES)?;
        Location::from_bytes(&reply)
    }

    pub fn tracking_mode(&mut self) -> Result<TrackingMode> {
        let reply = self.request(&Command::GetTrackingMode, 1)?;
        TrackingMode::from_u8(reply[0])
            .ok_or_else(|| MountError::Decode(format!("Unknown tracking mode {}", reply[0])))
    }

    /// Current RA/Dec in degrees
    pub fn ra_dec(&mut self, precision: Precision) -> Result<(f64, f64)> {
        let reply = self.request(&Command::GetRaDec(precision), angle_pair_len(precision))?;
        decode_angle_pair(&reply, precision)
    }

    /// Returns once the mount has stopped
    pub fn goto_ra_dec(&mut self, ra: f64, dec: f64, precision: Precision) -> Result<()> {
        self.request(&Command::GotoRaDec { ra, dec, precision }, 0)?;
        Ok(())
    }

    pub fn sync_ra_dec(&mut self, ra: f64, dec: f64, precision: Precision) -> Result<()> {
        self.request(&Command::SyncRaDec { ra, dec, precision }, 0)?;
        Ok(())
    }

    pub fn is_goto_in_progress(&mut self) -> Result<bool> {
        let reply = self.request(&Command::IsGotoInProgress, 1)?;
        Ok(reply[0] != 0)
    }

    pub fn cancel_goto(&mut self) -> Result<()> {
        self.request(&Command::CancelGoto, 0)?;
        Ok(())
    }
}

/// `HHHH,VVVV` or `HHHHHHHH,VVVVVVVV`
fn angle_pair_len(precision: Precision) -> usize {
    precision.digits() * 2 + 1
}
