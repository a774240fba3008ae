use std::fmt;

use glam::{IVec2, UVec2, Vec2};
use thiserror::Error;

use input::EventQueue;

use crate::window::{WindowDesc, WindowGeometry};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Cannot create window: {0}")]
    WindowCreation(String),
    #[error("Unknown native window")]
    UnknownWindow,
    #[error("Cursor operation failed: {0}")]
    Cursor(String),
    #[error("Clipboard unavailable: {0}")]
    Clipboard(String),
    #[error("Not supported by this backend: {0}")]
    Unsupported(&'static str),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CursorShape {
    Arrow,
    IBeam,
    SizeNwSe,
    SizeNeSw,
    SizeNs,
    SizeWe,
    SizeAll,
    Hand,
    No,
}

/// Windowing/OS collaborator driven by the [`Platform`](crate::Platform).
///
/// The backend owns every native window; the platform only keeps the copyable
/// `Window` id it hands out. All input reaches the platform through
/// [`Backend::pump_events`], which must convert native notifications into events and push
/// them onto the queue in the order they were received.
pub trait Backend {
    type Window: Copy + fmt::Debug;

    fn create_window(&mut self, desc: &WindowDesc) -> Result<Self::Window, BackendError>;
    fn destroy_window(&mut self, window: Self::Window);

    /// Process pending OS events. May block if the backend waits on the OS queue.
    fn pump_events(&mut self, events: &mut EventQueue);

    /// Live geometry, or `None` if the window is gone.
    fn query_geometry(&self, window: Self::Window) -> Option<WindowGeometry>;

    fn set_window_size(&mut self, window: Self::Window, size: UVec2) -> Result<(), BackendError> {
        let _ = (window, size);
        Err(BackendError::Unsupported("window resizing"))
    }
    fn set_window_position(
        &mut self,
        window: Self::Window,
        position: IVec2,
    ) -> Result<(), BackendError> {
        let _ = (window, position);
        Err(BackendError::Unsupported("window positioning"))
    }
    /// Size of the monitor currently holding the window.
    fn monitor_size(&self, window: Self::Window) -> Option<Vec2> {
        let _ = window;
        None
    }

    fn set_cursor(&mut self, window: Self::Window, cursor: CursorShape)
        -> Result<(), BackendError>;
    /// Hide and capture the cursor. While locked, mouse moves must be pushed as relative
    /// motion instead of absolute positions.
    fn lock_cursor(&mut self, window: Self::Window, lock: bool) -> Result<(), BackendError>;
    fn set_cursor_position(
        &mut self,
        window: Self::Window,
        position: Vec2,
    ) -> Result<(), BackendError>;

    fn swap_buffers(&mut self, window: Self::Window);
    fn set_vsync(&mut self, window: Self::Window, enabled: bool) {
        tracing::debug!(?window, %enabled, "Backend has no vsync control");
    }

    fn clipboard(&self) -> Option<String>;
    fn set_clipboard(&mut self, text: &str) -> Result<(), BackendError>;
}
