//! Shared-memory pixel buffer allocation
//!
//! The window's only buffer lives in an anonymous memfd: sized to
//! `width * height * 4`, filled with one opaque color, wrapped in a
//! `wl_shm_pool` and cut into a single `wl_buffer`. The pool, the mapping
//! and the fd are all transient: the compositor keeps its own reference to
//! the backing memory, so everything client-side is released before this
//! module returns. `OwnedFd` and `MmapMut` ownership guarantee the release
//! on failure paths too.

use std::ffi::CString;
use std::fs::File;
use std::os::fd::{AsFd, FromRawFd, OwnedFd};

use log::debug;
use memmap2::MmapOptions;
use wayland_client::protocol::{wl_buffer, wl_shm, wl_shm_pool};
use wayland_client::{Dispatch, QueueHandle};

use crate::error::WayechoError;

/// Bytes per Argb8888 pixel.
pub const BYTES_PER_PIXEL: u32 = 4;

/// Create an anonymous, unlinked shared-memory fd.
fn create_anon_fd() -> std::io::Result<OwnedFd> {
    let name = CString::new("wayecho-shm").unwrap();
    let fd = unsafe { libc::memfd_create(name.as_ptr(), libc::MFD_CLOEXEC) };
    if fd < 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(unsafe { OwnedFd::from_raw_fd(fd) })
}

/// Fill a pixel slice with one 0xAARRGGBB color in host byte order.
pub fn fill_pixels(pixels: &mut [u8], color: u32) {
    let bytes = color.to_ne_bytes();
    for pixel in pixels.chunks_exact_mut(BYTES_PER_PIXEL as usize) {
        pixel.copy_from_slice(&bytes);
    }
}

/// Allocate, fill and wrap the window's single Argb8888 buffer.
///
/// The returned `wl_buffer` is the only thing that outlives this call; the
/// shm pool is destroyed and the mapping and fd are dropped before returning.
pub fn create_argb_buffer<D>(
    shm: &wl_shm::WlShm,
    qh: &QueueHandle<D>,
    width: u32,
    height: u32,
    color: u32,
) -> Result<wl_buffer::WlBuffer, WayechoError>
where
    D: Dispatch<wl_shm_pool::WlShmPool, ()> + Dispatch<wl_buffer::WlBuffer, ()> + 'static,
{
    let stride = width * BYTES_PER_PIXEL;
    let size = (stride as u64) * (height as u64);

    let fd = create_anon_fd().map_err(WayechoError::BufferAlloc)?;
    let file = File::from(fd);
    file.set_len(size).map_err(WayechoError::BufferAlloc)?;

    {
        let mut map = unsafe { MmapOptions::new().len(size as usize).map_mut(&file) }
            .map_err(WayechoError::BufferAlloc)?;
        fill_pixels(&mut map, color);
        // Mapping is dropped here; the server maps the pool itself
    }

    let pool = shm.create_pool(file.as_fd(), size as i32, qh, ());
    let buffer = pool.create_buffer(
        0,
        width as i32,
        height as i32,
        stride as i32,
        wl_shm::Format::Argb8888,
        qh,
        (),
    );
    pool.destroy();

    debug!(
        "Allocated {}x{} Argb8888 buffer ({} bytes, stride {})",
        width, height, size, stride
    );

    // `file` drops here, closing the fd; the server holds its own reference
    Ok(buffer)
}
