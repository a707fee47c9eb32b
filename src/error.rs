//! Error taxonomy for the wayecho client
//!
//! Every fatal path funnels into one of these variants so `main` can map
//! them to a nonzero exit status. Malformed keymaps are deliberately NOT
//! represented here: they are recovered locally in the keyboard module by
//! discarding the event and leaving the keyboard untranslatable.

use thiserror::Error;

/// Fatal errors surfaced by the client.
#[derive(Debug, Error)]
pub enum WayechoError {
    /// Could not reach the Wayland display server at all.
    #[error("failed to connect to the Wayland display: {0}")]
    Connect(#[from] wayland_client::ConnectError),

    /// A required global was not advertised during the initial handshake.
    #[error("required Wayland global '{0}' is missing")]
    MissingGlobal(&'static str),

    /// Shared-memory buffer allocation failed (memfd, ftruncate or mmap).
    #[error("failed to allocate the shared pixel buffer: {0}")]
    BufferAlloc(#[source] std::io::Error),

    /// The event dispatch loop hit a protocol or I/O error.
    #[error("Wayland dispatch failed: {0}")]
    Dispatch(#[from] wayland_client::DispatchError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_global_names_the_interface() {
        let err = WayechoError::MissingGlobal("wl_shm");
        assert!(err.to_string().contains("wl_shm"));
    }

    #[test]
    fn buffer_alloc_preserves_the_os_error() {
        let io = std::io::Error::from_raw_os_error(libc::ENOMEM);
        let err = WayechoError::BufferAlloc(io);
        assert!(err.to_string().contains("shared pixel buffer"));
        match err {
            WayechoError::BufferAlloc(inner) => {
                assert_eq!(inner.raw_os_error(), Some(libc::ENOMEM));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
