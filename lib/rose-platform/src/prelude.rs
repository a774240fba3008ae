pub use crate::{
    backend::{Backend, BackendError, CursorShape},
    circbuffer::CircBuffer,
    config::{EventRetention, PlatformConfig},
    time::{FrameStats, FrameTime},
    window::{WindowDesc, WindowFlags, WindowGeometry, WindowHandle},
    Application, FrameContext, FramePhase, Platform, PlatformError,
};

#[cfg(feature = "winit")]
pub use crate::winit_backend::WinitBackend;

pub use crate::run;
