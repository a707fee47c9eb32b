//! Core Wayland client implementation
//!
//! This module owns the session record and the blocking dispatch loop. The
//! Wayland callback-table mechanism maps onto `Dispatch` impls on
//! [`EchoSession`]: one impl per interface with an event stream, all invoked
//! synchronously on the single client thread. Interfaces without interesting
//! events are delegated to no-ops at the bottom of the file.

use std::fs::File;

use log::{debug, info, warn};
use memmap2::MmapOptions;
use wayland_client::protocol::{
    wl_buffer, wl_compositor, wl_keyboard, wl_registry, wl_seat, wl_shm, wl_shm_pool, wl_surface,
};
use wayland_client::{delegate_noop, Connection, Dispatch, EventQueue, QueueHandle, WEnum};
use wayland_protocols::xdg::shell::client::{xdg_surface, xdg_toplevel, xdg_wm_base};

use crate::config::WayechoConfig;
use crate::error::WayechoError;
use crate::keyboard::KeyTranslator;
use crate::shm;
use crate::window::WindowPhase;

/// The four globals the client cannot run without.
pub const REQUIRED_GLOBALS: [&str; 4] = ["wl_compositor", "wl_seat", "xdg_wm_base", "wl_shm"];

/// Whether a registry-advertised interface is one we bind.
pub fn is_recognized_global(interface: &str) -> bool {
    REQUIRED_GLOBALS.contains(&interface)
}

/// The mutable session record: every protocol handle the client holds.
///
/// Each handle is `None` until bound, and bound exactly once. Handles are
/// only mutated by server events arriving on the dispatch thread, and are
/// released in reverse-dependency order by [`EchoSession::teardown`].
pub struct EchoSession {
    config: WayechoConfig,

    // Core globals, bound during the registry handshake
    compositor: Option<wl_compositor::WlCompositor>,
    seat: Option<wl_seat::WlSeat>,
    shm: Option<wl_shm::WlShm>,
    wm_base: Option<xdg_wm_base::XdgWmBase>,

    // Input device, bound once the seat advertises a keyboard
    keyboard: Option<wl_keyboard::WlKeyboard>,

    // Window objects, created after the handshake succeeds
    surface: Option<wl_surface::WlSurface>,
    xdg_surface: Option<xdg_surface::XdgSurface>,
    toplevel: Option<xdg_toplevel::XdgToplevel>,
    buffer: Option<wl_buffer::WlBuffer>,

    // xkb context/keymap/state triple
    translator: KeyTranslator,

    phase: WindowPhase,
}

impl EchoSession {
    pub fn new(config: WayechoConfig) -> Self {
        let translator = KeyTranslator::new(config.keyboard.scancode_offset);
        Self {
            config,
            compositor: None,
            seat: None,
            shm: None,
            wm_base: None,
            keyboard: None,
            surface: None,
            xdg_surface: None,
            toplevel: None,
            buffer: None,
            translator,
            phase: WindowPhase::default(),
        }
    }

    /// Verify the handshake bound everything the client needs.
    pub fn require_globals(&self) -> Result<(), WayechoError> {
        if self.compositor.is_none() {
            return Err(WayechoError::MissingGlobal("wl_compositor"));
        }
        if self.seat.is_none() {
            return Err(WayechoError::MissingGlobal("wl_seat"));
        }
        if self.wm_base.is_none() {
            return Err(WayechoError::MissingGlobal("xdg_wm_base"));
        }
        if self.shm.is_none() {
            return Err(WayechoError::MissingGlobal("wl_shm"));
        }
        Ok(())
    }

    /// Release every bound handle, shell objects before core objects.
    ///
    /// Interfaces with a protocol destructor get an explicit destroy request;
    /// the rest are version-1 objects released client-side on drop. Taking
    /// each `Option` makes teardown idempotent, so running it from both the
    /// shutdown path and `Drop` cannot double-free.
    pub fn teardown(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            buffer.destroy();
        }
        if let Some(toplevel) = self.toplevel.take() {
            toplevel.destroy();
        }
        if let Some(xdg_surface) = self.xdg_surface.take() {
            xdg_surface.destroy();
        }
        if let Some(surface) = self.surface.take() {
            surface.destroy();
        }
        if let Some(wm_base) = self.wm_base.take() {
            wm_base.destroy();
        }
        self.keyboard = None;
        self.seat = None;
        self.shm = None;
        self.compositor = None;
    }

    fn compile_keymap(&mut self, fd: std::os::fd::OwnedFd, size: u32) {
        if size > self.config.keyboard.max_keymap_bytes {
            warn!(
                "Discarding oversized keymap ({} bytes, cap {})",
                size, self.config.keyboard.max_keymap_bytes
            );
            return;
        }

        let file = File::from(fd);
        let map = match unsafe { MmapOptions::new().len(size as usize).map_copy_read_only(&file) }
        {
            Ok(map) => map,
            Err(e) => {
                warn!("Failed to map keymap fd: {}", e);
                return;
            }
        };

        // The transport blob is null-terminated xkb text
        let end = map.iter().position(|&b| b == 0).unwrap_or(map.len());
        match std::str::from_utf8(&map[..end]) {
            Ok(text) => {
                self.translator.load_keymap(text);
            }
            Err(_) => warn!("Keymap text is not valid UTF-8; discarding"),
        }
        // Mapping and fd drop here; the compiled keymap is all we keep
    }
}

impl Dispatch<wl_registry::WlRegistry, ()> for EchoSession {
    fn event(
        state: &mut Self,
        registry: &wl_registry::WlRegistry,
        event: wl_registry::Event,
        _: &(),
        _: &Connection,
        qh: &QueueHandle<Self>,
    ) {
        match event {
            wl_registry::Event::Global {
                name,
                interface,
                version: _,
            } => match interface.as_str() {
                "wl_compositor" => {
                    state.compositor =
                        Some(registry.bind::<wl_compositor::WlCompositor, _, _>(name, 1, qh, ()));
                    info!("✅ Bound wl_compositor");
                }
                "wl_seat" => {
                    state.seat = Some(registry.bind::<wl_seat::WlSeat, _, _>(name, 1, qh, ()));
                    info!("✅ Bound wl_seat");
                }
                "xdg_wm_base" => {
                    state.wm_base =
                        Some(registry.bind::<xdg_wm_base::XdgWmBase, _, _>(name, 1, qh, ()));
                    info!("✅ Bound xdg_wm_base");
                }
                "wl_shm" => {
                    state.shm = Some(registry.bind::<wl_shm::WlShm, _, _>(name, 1, qh, ()));
                    info!("✅ Bound wl_shm");
                }
                other => {
                    debug!("Ignoring unrecognized global: {}", other);
                }
            },
            wl_registry::Event::GlobalRemove { name } => {
                debug!("Global removed: {}", name);
            }
            _ => {}
        }
    }
}

impl Dispatch<wl_seat::WlSeat, ()> for EchoSession {
    fn event(
        state: &mut Self,
        seat: &wl_seat::WlSeat,
        event: wl_seat::Event,
        _: &(),
        _: &Connection,
        qh: &QueueHandle<Self>,
    ) {
        match event {
            wl_seat::Event::Capabilities {
                capabilities: WEnum::Value(capabilities),
            } => {
                let has_keyboard = capabilities.contains(wl_seat::Capability::Keyboard);
                if has_keyboard && state.keyboard.is_none() {
                    info!("⌨️ Seat offers a keyboard; binding it");
                    state.keyboard = Some(seat.get_keyboard(qh, ()));
                } else if !has_keyboard && state.keyboard.is_some() {
                    warn!("Seat withdrew its keyboard capability");
                    state.keyboard = None;
                }
            }
            wl_seat::Event::Name { name } => {
                debug!("Seat name: {}", name);
            }
            _ => {}
        }
    }
}

impl Dispatch<wl_keyboard::WlKeyboard, ()> for EchoSession {
    fn event(
        state: &mut Self,
        _: &wl_keyboard::WlKeyboard,
        event: wl_keyboard::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        match event {
            wl_keyboard::Event::Keymap { format, fd, size } => match format {
                WEnum::Value(wl_keyboard::KeymapFormat::XkbV1) => {
                    state.compile_keymap(fd, size);
                }
                other => {
                    // fd drops (and closes) here
                    warn!("Discarding keymap with unsupported format {:?}", other);
                }
            },
            wl_keyboard::Event::Enter { .. } => {
                info!("--- Keyboard focus gained ---");
            }
            wl_keyboard::Event::Leave { .. } => {
                info!("--- Keyboard focus lost ---");
            }
            wl_keyboard::Event::Key {
                key,
                state: WEnum::Value(wl_keyboard::KeyState::Pressed),
                ..
            } => match state.translator.translate_press(key) {
                Some(fragment) => println!("Key Pressed: '{}'", fragment),
                None => println!("Key Pressed (no character mapping for scancode: {})", key),
            },
            wl_keyboard::Event::Key { .. } => {
                // Releases (and unrecognized key states) never produce output
            }
            wl_keyboard::Event::Modifiers {
                mods_depressed,
                mods_latched,
                mods_locked,
                group,
                ..
            } => {
                state
                    .translator
                    .update_modifiers(mods_depressed, mods_latched, mods_locked, group);
            }
            _ => {}
        }
    }
}

impl Dispatch<xdg_wm_base::XdgWmBase, ()> for EchoSession {
    fn event(
        _: &mut Self,
        wm_base: &xdg_wm_base::XdgWmBase,
        event: xdg_wm_base::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        // Every ping gets exactly one pong with the same serial, in any
        // window phase, or the compositor drops us after a timeout
        if let xdg_wm_base::Event::Ping { serial } = event {
            debug!("Shell ping (serial {}); answering", serial);
            wm_base.pong(serial);
        }
    }
}

impl Dispatch<xdg_surface::XdgSurface, ()> for EchoSession {
    fn event(
        state: &mut Self,
        xdg_surface: &xdg_surface::XdgSurface,
        event: xdg_surface::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        if let xdg_surface::Event::Configure { serial } = event {
            xdg_surface.ack_configure(serial);
            if state.phase.configure_acked() {
                // First configure: attach the prepared buffer and map the window
                if let (Some(surface), Some(buffer)) =
                    (state.surface.as_ref(), state.buffer.as_ref())
                {
                    surface.attach(Some(buffer), 0, 0);
                    surface.commit();
                    info!("🪟 Surface configured and committed; window is mapped");
                }
            }
        }
    }
}

impl Dispatch<xdg_toplevel::XdgToplevel, ()> for EchoSession {
    fn event(
        state: &mut Self,
        _: &xdg_toplevel::XdgToplevel,
        event: xdg_toplevel::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        match event {
            xdg_toplevel::Event::Configure { width, height, .. } => {
                // Fixed-size window: the size is advertised as the minimum,
                // so there is nothing to renegotiate
                debug!("Toplevel configure: {}x{}", width, height);
            }
            xdg_toplevel::Event::Close => {
                info!("👋 Compositor requested close; exiting");
                state.phase.close_requested();
            }
            _ => {}
        }
    }
}

// Interfaces whose events carry nothing this client acts on
delegate_noop!(EchoSession: ignore wl_compositor::WlCompositor);
delegate_noop!(EchoSession: ignore wl_surface::WlSurface);
delegate_noop!(EchoSession: ignore wl_shm::WlShm);
delegate_noop!(EchoSession: ignore wl_shm_pool::WlShmPool);
delegate_noop!(EchoSession: ignore wl_buffer::WlBuffer);

/// The client driver: connection, event queue, and session record.
pub struct WayechoClient {
    conn: Connection,
    event_queue: EventQueue<EchoSession>,
    session: EchoSession,
}

impl WayechoClient {
    /// Connect to the display server and perform the registry handshake.
    ///
    /// Fails with [`WayechoError::Connect`] when no compositor is reachable
    /// and with [`WayechoError::MissingGlobal`] when a required interface is
    /// absent after the synchronizing round-trip.
    pub fn connect(config: WayechoConfig) -> Result<Self, WayechoError> {
        let conn = Connection::connect_to_env()?;
        info!("🔌 Connected to Wayland display");

        let display = conn.display();
        let mut event_queue = conn.new_event_queue();
        let qh = event_queue.handle();

        // Binding happens in the registry Dispatch impl as globals arrive
        let _registry = display.get_registry(&qh, ());

        let mut session = EchoSession::new(config);
        event_queue.roundtrip(&mut session)?;
        session.require_globals()?;
        info!("✅ All essential Wayland interfaces bound");

        Ok(Self {
            conn,
            event_queue,
            session,
        })
    }

    /// Create the surface, xdg objects and pixel buffer, then wait for the
    /// first configure to map the window.
    pub fn create_window(&mut self) -> Result<(), WayechoError> {
        let qh = self.event_queue.handle();
        let window = self.session.config.window.clone();

        {
            let session = &mut self.session;
            let compositor = session
                .compositor
                .as_ref()
                .ok_or(WayechoError::MissingGlobal("wl_compositor"))?;
            let wm_base = session
                .wm_base
                .as_ref()
                .ok_or(WayechoError::MissingGlobal("xdg_wm_base"))?;
            let shm = session
                .shm
                .as_ref()
                .ok_or(WayechoError::MissingGlobal("wl_shm"))?;

            let surface = compositor.create_surface(&qh, ());
            let xdg_surface = wm_base.get_xdg_surface(&surface, &qh, ());
            let toplevel = xdg_surface.get_toplevel(&qh, ());

            toplevel.set_title(window.title.clone());
            toplevel.set_min_size(window.width as i32, window.height as i32);

            // Buffer is prepared now but only attached once the first
            // configure is acknowledged
            let buffer =
                shm::create_argb_buffer(shm, &qh, window.width, window.height, window.fill_color)?;

            // Initial commit with no buffer starts the configure sequence
            surface.commit();

            session.surface = Some(surface);
            session.xdg_surface = Some(xdg_surface);
            session.toplevel = Some(toplevel);
            session.buffer = Some(buffer);
        }

        // Round-trip so the first configure arrives and the window maps
        self.event_queue.roundtrip(&mut self.session)?;

        Ok(())
    }

    /// Run the blocking dispatch loop until the compositor asks us to close
    /// or the connection errors, then release every handle.
    pub fn run(&mut self) -> Result<(), WayechoError> {
        let window = &self.session.config.window;
        info!("--- Client ready ---");
        info!(
            "A {}x{} window is active. Click the window, then type keys.",
            window.width, window.height
        );

        while self.session.phase.is_running() {
            self.event_queue.blocking_dispatch(&mut self.session)?;
        }

        self.session.teardown();
        let _ = self.conn.flush();
        info!("✅ All handles released; goodbye");
        Ok(())
    }
}

impl Drop for WayechoClient {
    fn drop(&mut self) {
        // Fatal paths route through the same cleanup as normal shutdown
        self.session.teardown();
        let _ = self.conn.flush();
    }
}
