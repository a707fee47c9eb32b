//! # Wayecho - Wayland Keyboard Echo Client
//!
//! A minimal Wayland client: it connects to a compositor, opens a single
//! fixed-size window backed by one shared-memory buffer, binds a keyboard,
//! and echoes typed characters to the console.
//!
//! ## Architecture
//!
//! Wayecho is a single-threaded blocking-dispatch client:
//! - `client`: the session record, event handlers and dispatch loop
//! - `config`: configuration parsing and management
//! - `error`: fatal error taxonomy
//! - `keyboard`: xkbcommon keymap compilation and key translation
//! - `shm`: shared-memory pixel buffer allocation
//! - `window`: the Unconfigured → Configured → Closing lifecycle
//!
//! ## Usage
//!
//! ```rust,no_run
//! use wayecho::{WayechoClient, WayechoConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = WayechoConfig::default();
//!     let mut client = WayechoClient::connect(config)?;
//!     client.create_window()?;
//!     client.run()?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod keyboard;
pub mod shm;
pub mod window;

// Re-export main types for easy access
pub use client::WayechoClient;
pub use config::WayechoConfig;
pub use error::WayechoError;
pub use keyboard::KeyTranslator;
pub use window::WindowPhase;

/// Version information for wayecho
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
