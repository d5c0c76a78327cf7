//! AstroPi Server Binary
//!
//! Drives the mount and serves planetarium clients over TCP.

use std::sync::Arc;

use astropi::config::{MotorBackend, ProtocolVariant};
use astropi::motor::MotorProfile;
use astropi::mount::MountProfile;
use astropi::network::Server;
use astropi::{Config, MountCoordinator, SkyCoordinate};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

/// Home position: RA 0h, Dec +90° (pointing at the pole)
const HOME: (f64, f64) = (0.0, 90.0);

/// AstroPi Server
#[derive(Parser, Debug)]
#[command(name = "astropi-server")]
#[command(about = "Telescope mount controller speaking NexStar/LX200 over TCP")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "0.0.0.0:4030")]
    listen: String,

    /// Client protocol (nexstar, lx200)
    #[arg(short, long, default_value = "nexstar")]
    protocol: ProtocolVariant,

    /// Motor backend (real, sim)
    #[arg(long, default_value = "real")]
    motor: MotorBackend,

    /// Serve one client at a time
    #[arg(long)]
    sync: bool,

    /// Mount profile (AstroPi, Celestron_Montatura_CGX, Celestron_SE_5)
    #[arg(long, default_value = "AstroPi")]
    mount: MountProfile,

    /// Stepper model fitted to both axes (NEMA17, 28BYJ-48)
    #[arg(long, default_value = "NEMA17")]
    motor_model: String,

    /// Microstep divisor (1, 2, 4, 8, 16)
    #[arg(long, default_value = "16")]
    microstep: u8,

    /// Speed level used for gotos
    #[arg(long, default_value = "10")]
    goto_speed: u8,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,astropi=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("AstroPi Server v{}", astropi::VERSION);
    tracing::info!("Listen address: {}", args.listen);
    tracing::info!("Mount: {}, motors: {:?}", args.mount.name, args.motor);

    let Some(motor_profile) = MotorProfile::by_key(&args.motor_model) else {
        tracing::error!("Unknown motor model: {}", args.motor_model);
        std::process::exit(1);
    };

    // Build config from args
    let config = Config::builder()
        .listen_addr(&args.listen)
        .protocol(args.protocol)
        .motor_backend(args.motor)
        .synchronous(args.sync)
        .mount_profile(args.mount)
        .motor_profile(motor_profile)
        .microstep(args.microstep)
        .goto_speed(args.goto_speed)
        .build();

    // Hardware that cannot be opened is fatal
    let mount = match MountCoordinator::from_config(&config) {
        Ok(m) => Arc::new(m),
        Err(e) => {
            tracing::error!("Failed to initialize motors: {}", e);
            std::process::exit(1);
        }
    };

    mount.set_sync(SkyCoordinate::new(HOME.0, HOME.1));
    tracing::info!("Mount initialized at home position {}", mount.current());

    let mut server = Server::new(config, Arc::clone(&mount));
    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        mount.release();
        std::process::exit(1);
    }

    mount.release();
    tracing::info!("Server stopped");
}
