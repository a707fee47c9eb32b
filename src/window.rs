//! Window lifecycle state machine
//!
//! A wayecho window moves through exactly three phases:
//! `Unconfigured` after the xdg objects are created, `Configured` once the
//! compositor's first configure event has been acknowledged (at which point
//! the pixel buffer is attached and committed), and `Closing` when the
//! compositor asks us to go away. Shell pings are answered in every phase.

use log::debug;

/// The phase a window is in, driven purely by compositor events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowPhase {
    /// xdg objects exist but no configure event has been acknowledged yet
    #[default]
    Unconfigured,
    /// First configure acked; the buffer is attached and the window is mapped
    Configured,
    /// The compositor requested a close; the dispatch loop should exit
    Closing,
}

impl WindowPhase {
    /// Record an acknowledged configure event.
    ///
    /// Returns `true` exactly once, on the transition out of `Unconfigured`,
    /// which is the signal to attach the prepared buffer. Later configures
    /// are acked by the caller but change nothing here (the window is
    /// fixed-size). A configure after `Closing` is ignored.
    pub fn configure_acked(&mut self) -> bool {
        match *self {
            WindowPhase::Unconfigured => {
                debug!("Window configured; attaching buffer");
                *self = WindowPhase::Configured;
                true
            }
            WindowPhase::Configured | WindowPhase::Closing => false,
        }
    }

    /// Record a close request from the compositor.
    pub fn close_requested(&mut self) {
        debug!("Window close requested");
        *self = WindowPhase::Closing;
    }

    /// Whether the dispatch loop should keep running.
    pub fn is_running(&self) -> bool {
        !matches!(self, WindowPhase::Closing)
    }
}
