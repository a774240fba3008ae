use std::path::PathBuf;
use std::time::Duration;

use eyre::Result;
use glam::{IVec2, UVec2, Vec2};
use thiserror::Error;

use input::{Event, EventCursor, EventQueue, InputState};

use crate::backend::{Backend, CursorShape};
use crate::config::{EventRetention, PlatformConfig};
use crate::time::{FrameClock, FrameStats, FrameTime};
use crate::window::{WindowDesc, WindowGeometry, WindowHandle, WindowRecord, WindowTable};

pub mod backend;
pub mod circbuffer;
pub mod config;
pub mod prelude;
pub mod time;
pub mod tracing_hook;
pub mod window;
#[cfg(feature = "winit")]
pub mod winit_backend;

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("Platform has been shut down")]
    ShutDown,
    #[error("Cannot read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("Invalid config value for {key}: {value}")]
    ConfigValue { key: &'static str, value: String },
}

/// Where the coordinator currently is in its lifecycle.
///
/// A frame walks `Snapshot → Pump → Drain → GeometryRefresh` inside a single
/// [`Platform::update`] call and comes back to `Ready`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FramePhase {
    Uninitialized,
    Ready,
    Snapshot,
    Pump,
    Drain,
    GeometryRefresh,
    Shutdown,
}

/// Platform context: owns the backend, the event queue, the input state and the window
/// table, and sequences them once per frame.
pub struct Platform<B: Backend> {
    backend: B,
    config: PlatformConfig,
    events: EventQueue,
    input: InputState,
    windows: WindowTable<B::Window>,
    clock: FrameClock,
    phase: FramePhase,
    /// Queue length at the last snapshot; the drain step replays from here.
    frame_start: usize,
    warned_queue_growth: bool,
}

impl<B: Backend> Platform<B> {
    pub fn new(backend: B, config: PlatformConfig) -> Self {
        let mut platform = Self {
            backend,
            events: EventQueue::new(),
            input: InputState::default(),
            windows: WindowTable::new(),
            clock: FrameClock::new(&config.timing),
            config,
            phase: FramePhase::Uninitialized,
            frame_start: 0,
            warned_queue_growth: false,
        };
        platform.enter(FramePhase::Ready);
        platform
    }

    /// Run one frame: snapshot, pump the backend, apply this frame's events, refresh the
    /// cached window geometry.
    pub fn update(&mut self) -> Result<FrameTime, PlatformError> {
        if self.phase == FramePhase::Shutdown {
            return Err(PlatformError::ShutDown);
        }
        let time = self.clock.tick();
        let _span = tracing::trace_span!("platform_update", frame = time.frame).entered();
        self.snapshot();
        self.pump();
        self.drain();
        self.refresh_geometry();
        self.enter(FramePhase::Ready);
        Ok(time)
    }

    /// Destroy every window. Further calls to [`Self::update`] fail.
    pub fn shutdown(&mut self) {
        if self.phase == FramePhase::Shutdown {
            return;
        }
        let handles: Vec<_> = self.windows.iter().map(|(handle, _)| handle).collect();
        for handle in handles {
            self.destroy_window(handle);
        }
        self.enter(FramePhase::Shutdown);
    }

    fn enter(&mut self, phase: FramePhase) {
        tracing::trace!(from = ?self.phase, to = ?phase, "Frame phase");
        self.phase = phase;
    }

    fn snapshot(&mut self) {
        self.enter(FramePhase::Snapshot);
        if self.config.events.retention == EventRetention::ClearEachFrame {
            self.events.clear();
        }
        self.input.begin_frame();
        self.frame_start = self.events.len();
    }

    fn pump(&mut self) {
        self.enter(FramePhase::Pump);
        let _span = tracing::trace_span!("pump").entered();
        self.backend.pump_events(&mut self.events);
    }

    fn drain(&mut self) {
        self.enter(FramePhase::Drain);
        let mut cursor = EventCursor::at(self.frame_start);
        let mut applied = 0usize;
        while let Some(event) = self.events.next(&mut cursor) {
            if self.input.apply_event(event) {
                applied += 1;
            }
        }
        tracing::trace!(
            queued = self.events.len().saturating_sub(self.frame_start),
            applied,
            "Drained frame events"
        );

        if let Some(threshold) = self.config.events.warn_threshold {
            if self.events.len() > threshold && !self.warned_queue_growth {
                tracing::warn!(
                    len = self.events.len(),
                    threshold,
                    "Event queue keeps growing; consume events or enable clear-each-frame retention"
                );
                self.warned_queue_growth = true;
            }
        }
    }

    fn refresh_geometry(&mut self) {
        self.enter(FramePhase::GeometryRefresh);
        for (handle, record) in self.windows.iter_mut() {
            match self.backend.query_geometry(record.native) {
                Some(geometry) => record.geometry = geometry,
                None => tracing::debug!(?handle, "Backend lost track of window"),
            }
        }
    }

    pub fn phase(&self) -> FramePhase {
        self.phase
    }

    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn time(&self) -> FrameTime {
        self.clock.current()
    }

    pub fn stats(&self) -> &FrameStats {
        self.clock.stats()
    }

    // Events

    pub fn poll_event(&mut self, cursor: &mut EventCursor, consume: bool) -> Option<Event> {
        self.events.poll(cursor, consume)
    }

    /// Events pushed during the current frame's pump, in push order.
    pub fn frame_events(&self) -> impl '_ + Iterator<Item = &Event> {
        self.events.replay(EventCursor::at(self.frame_start))
    }

    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventQueue {
        &mut self.events
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    // Windows

    /// Create a native window through the backend. On failure a warning is logged and
    /// [`WindowHandle::invalid`] is returned; reads through it yield defaults.
    pub fn create_window(&mut self, desc: WindowDesc) -> WindowHandle {
        let native = match self.backend.create_window(&desc) {
            Ok(native) => native,
            Err(err) => {
                tracing::warn!(title = %desc.title, %err, "Window creation failed");
                return WindowHandle::invalid();
            }
        };
        let geometry = self
            .backend
            .query_geometry(native)
            .unwrap_or_else(|| WindowGeometry {
                size: desc.logical_size(),
                framebuffer_size: desc.logical_size(),
                ..Default::default()
            });
        let handle = self.windows.insert(WindowRecord {
            native,
            desc,
            geometry,
        });
        tracing::debug!(slot = handle.slot(), ?native, "Window created");
        handle
    }

    pub fn destroy_window(&mut self, handle: WindowHandle) -> bool {
        match self.windows.remove(handle) {
            Some(record) => {
                self.backend.destroy_window(record.native);
                true
            }
            None => false,
        }
    }

    pub fn main_window(&self) -> Option<WindowHandle> {
        self.windows.primary()
    }

    /// Designate another live window as primary. Returns `false` for stale handles.
    pub fn set_main_window(&mut self, handle: WindowHandle) -> bool {
        self.windows.set_primary(handle)
    }

    pub fn windows(&self) -> &WindowTable<B::Window> {
        &self.windows
    }

    pub fn window_size(&self, handle: WindowHandle) -> Vec2 {
        self.windows.window_size(handle)
    }

    pub fn window_position(&self, handle: WindowHandle) -> Vec2 {
        self.windows.window_position(handle)
    }

    pub fn framebuffer_size(&self, handle: WindowHandle) -> Vec2 {
        self.windows.framebuffer_size(handle)
    }

    /// Size of the monitor the window is on, or zero when unknown.
    pub fn monitor_size(&self, handle: WindowHandle) -> Vec2 {
        self.native(handle)
            .and_then(|native| self.backend.monitor_size(native))
            .unwrap_or(Vec2::ZERO)
    }

    /// Request a new logical size. Cached geometry follows on the next refresh.
    pub fn set_window_size(&mut self, handle: WindowHandle, size: UVec2) {
        if let Some(native) = self.native(handle) {
            if let Err(err) = self.backend.set_window_size(native, size) {
                tracing::warn!(%err, %size, "Cannot resize window");
            }
        }
    }

    pub fn set_window_position(&mut self, handle: WindowHandle, position: IVec2) {
        if let Some(native) = self.native(handle) {
            if let Err(err) = self.backend.set_window_position(native, position) {
                tracing::warn!(%err, %position, "Cannot move window");
            }
        }
    }

    fn native(&self, handle: WindowHandle) -> Option<B::Window> {
        let native = self.windows.get(handle).map(|rec| rec.native);
        if native.is_none() {
            tracing::debug!(?handle, "Unknown window handle");
        }
        native
    }

    // Cursor, clipboard, presentation

    /// Lock or unlock the mouse on the primary window.
    pub fn lock_mouse(&mut self, lock: bool) {
        match self.main_window() {
            Some(handle) => self.lock_mouse_on(handle, lock),
            None => tracing::debug!("No primary window to lock the mouse on"),
        }
    }

    /// The input state only switches mode once the backend has applied the lock.
    pub fn lock_mouse_on(&mut self, handle: WindowHandle, lock: bool) {
        let Some(native) = self.native(handle) else {
            return;
        };
        match self.backend.lock_cursor(native, lock) {
            Ok(()) => self.input.mouse.locked = lock,
            Err(err) => tracing::warn!(%err, lock, "Cannot change cursor lock"),
        }
    }

    pub fn mouse_locked(&self) -> bool {
        self.input.mouse_locked()
    }

    pub fn set_cursor(&mut self, handle: WindowHandle, cursor: CursorShape) {
        if let Some(native) = self.native(handle) {
            if let Err(err) = self.backend.set_cursor(native, cursor) {
                tracing::warn!(%err, ?cursor, "Cannot set cursor");
            }
        }
    }

    pub fn set_mouse_position(&mut self, handle: WindowHandle, position: Vec2) {
        if let Some(native) = self.native(handle) {
            if let Err(err) = self.backend.set_cursor_position(native, position) {
                tracing::warn!(%err, %position, "Cannot move cursor");
            }
        }
    }

    pub fn swap_buffers(&mut self, handle: WindowHandle) {
        if let Some(native) = self.native(handle) {
            self.backend.swap_buffers(native);
        }
    }

    pub fn set_vsync(&mut self, handle: WindowHandle, enabled: bool) {
        if let Some(native) = self.native(handle) {
            self.backend.set_vsync(native, enabled);
        }
    }

    pub fn clipboard(&self) -> Option<String> {
        self.backend.clipboard()
    }

    /// Block the calling thread. Frame timing picks the pause up as frame delta.
    pub fn sleep(&self, duration: Duration) {
        let _span = tracing::trace_span!("sleep", ?duration).entered();
        std::thread::sleep(duration);
    }

    pub fn set_clipboard(&mut self, text: &str) {
        if let Err(err) = self.backend.set_clipboard(text) {
            tracing::warn!(%err, "Cannot write clipboard");
        }
    }
}

impl<B: Backend> Drop for Platform<B> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

pub struct FrameContext<'a, B: Backend> {
    pub platform: &'a mut Platform<B>,
    pub time: FrameTime,
    quit: &'a mut bool,
}

impl<'a, B: Backend> FrameContext<'a, B> {
    pub fn input(&self) -> &InputState {
        self.platform.input()
    }

    pub fn quit(&mut self) {
        *self.quit = true;
    }
}

#[allow(unused_variables)]
pub trait Application: Sized {
    fn window_desc(desc: WindowDesc) -> WindowDesc {
        desc
    }
    fn new<B: Backend>(platform: &mut Platform<B>) -> Result<Self>;
    fn frame<B: Backend>(&mut self, ctx: FrameContext<B>) -> Result<()>;
    fn shutdown<B: Backend>(&mut self, platform: &mut Platform<B>) {}
}

/// Drive `App` until it quits or the primary window asks to close.
pub fn run<App: Application, B: Backend>(backend: B, config: PlatformConfig) -> Result<()> {
    let desc = App::window_desc(config.window.desc());
    let mut platform = Platform::new(backend, config);
    let main_window = platform.create_window(desc);
    if main_window.is_invalid() {
        eyre::bail!("Cannot create main window");
    }
    let mut app = App::new(&mut platform)?;

    let mut quit = false;
    while !quit {
        let time = platform.update()?;
        if platform.frame_events().any(Event::is_close_request) {
            tracing::info!("Close requested");
            quit = true;
        }
        app.frame(FrameContext {
            platform: &mut platform,
            time,
            quit: &mut quit,
        })?;
        platform.swap_buffers(main_window);
    }

    app.shutdown(&mut platform);
    platform.shutdown();
    Ok(())
}
