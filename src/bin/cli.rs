//! AstroPi CLI Client
//!
//! Command-line interface speaking NexStar to an AstroPi server.

use std::process;
use std::time::Duration;

use astropi::coords::Precision;
use astropi::network::Client;
use astropi::Result;
use clap::{Parser, Subcommand};

/// AstroPi CLI
#[derive(Parser, Debug)]
#[command(name = "astropi-cli")]
#[command(about = "NexStar client for an AstroPi mount")]
#[command(version)]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:4030")]
    server: String,

    /// Reply timeout in seconds (0 waits forever)
    #[arg(short, long, default_value = "5")]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check the server answers an echo
    Ping,

    /// Firmware version
    Version,

    /// Mount model id
    Model,

    /// Current RA/Dec
    Position {
        /// Use 32-bit angle fields
        #[arg(long)]
        precise: bool,
    },

    /// Slew to RA/Dec (degrees); waits for the mount to stop
    #[command(allow_negative_numbers = true)]
    Goto {
        ra: f64,
        dec: f64,

        #[arg(long)]
        precise: bool,
    },

    /// Declare the current RA/Dec (degrees) without moving
    #[command(allow_negative_numbers = true)]
    Sync {
        ra: f64,
        dec: f64,

        #[arg(long)]
        precise: bool,
    },

    /// Goto state, position and tracking mode
    Status,

    /// Stop a running goto
    Cancel,

    /// Observer location
    Location,
}

fn precision(precise: bool) -> Precision {
    if precise {
        Precision::Precise
    } else {
        Precision::Standard
    }
}

fn run(args: Args) -> Result<()> {
    // A goto replies only after the mount stops
    let timeout = match (&args.command, args.timeout) {
        (Commands::Goto { .. }, _) | (_, 0) => None,
        (_, secs) => Some(Duration::from_secs(secs)),
    };
    let mut client = Client::connect(&args.server, timeout)?;

    match args.command {
        Commands::Ping => {
            let reply = client.echo(b'x')?;
            if reply == b'x' {
                println!("PONG from {}", client.server());
            } else {
                println!("Unexpected echo 0x{:02X} from {}", reply, client.server());
            }
        }
        Commands::Version => {
            let (major, minor) = client.version()?;
            println!("{}.{}", major, minor);
        }
        Commands::Model => match client.model()? {
            (id, Some(model)) => println!("{} ({:?})", id, model),
            (id, None) => println!("{} (unknown)", id),
        },
        Commands::Position { precise } => {
            let (ra, dec) = client.ra_dec(precision(precise))?;
            println!("RA {:.6}°  Dec {:.6}°", ra, dec);
        }
        Commands::Goto { ra, dec, precise } => {
            client.goto_ra_dec(ra, dec, precision(precise))?;
            let (ra, dec) = client.ra_dec(precision(precise))?;
            println!("Arrived at RA {:.6}°  Dec {:.6}°", ra, dec);
        }
        Commands::Sync { ra, dec, precise } => {
            client.sync_ra_dec(ra, dec, precision(precise))?;
            println!("OK");
        }
        Commands::Status => {
            let moving = client.is_goto_in_progress()?;
            let (ra, dec) = client.ra_dec(Precision::Precise)?;
            let mode = client.tracking_mode()?;
            println!("Goto in progress: {}", if moving { "yes" } else { "no" });
            println!("Position: RA {:.6}°  Dec {:.6}°", ra, dec);
            println!("Tracking mode: {}", mode);
        }
        Commands::Cancel => {
            client.cancel_goto()?;
            println!("OK");
        }
        Commands::Location => {
            let location = client.location()?;
            println!(
                "{} ({:.5}°, {:.5}°)",
                location,
                location.latitude_degrees(),
                location.longitude_degrees()
            );
        }
    }

    Ok(())
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
