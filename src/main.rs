//! # Wayecho - Wayland Keyboard Echo Client
//!
//! Opens a 200x200 window on the running compositor and prints every typed
//! character to the console. Exits with success when the compositor asks the
//! window to close, and with failure when the connection cannot be made,
//! a required global is missing, or the pixel buffer cannot be allocated.

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};

use wayecho::{WayechoClient, WayechoConfig};

#[derive(Parser)]
#[command(name = "wayecho")]
#[command(about = "A minimal Wayland client that echoes typed keys to the console")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "~/.config/wayecho/wayecho.toml")]
    config: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.debug {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    info!("🚀 Starting wayecho - Wayland keyboard echo client");
    info!("📄 Version: {}", wayecho::VERSION);

    // Load configuration; a missing file falls back to the built-in defaults
    let config = match WayechoConfig::load_or_default(&cli.config) {
        Ok(config) => {
            info!("✅ Configuration ready (path: {})", cli.config);
            config
        }
        Err(e) => {
            error!("❌ Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    let mut client = WayechoClient::connect(config)
        .context("Is a Wayland compositor running?")?;
    client.create_window()
        .context("Failed to create the echo window")?;
    client.run()
        .context("Event dispatch loop failed")?;

    Ok(())
}
