pub use event::*;
pub use keys::{KeyCode, KeyModifiers, MouseButton};
pub use queue::{EventCursor, EventQueue};
pub use state::{
    ButtonMap, InputState, KeyboardState, MouseState, TouchPoint, TouchState, MAX_TOUCH,
};

pub mod event;
pub mod keys;
pub mod queue;
pub mod state;
