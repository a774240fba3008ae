use std::path::PathBuf;

use glam::{IVec2, UVec2, Vec2};

use crate::keys::{KeyCode, KeyModifiers, MouseButton};

/// An input notification as stored in the [`EventQueue`](crate::EventQueue).
///
/// `seq` is assigned by the queue at push time and never reused, even after the event
/// has been consumed.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub seq: u64,
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Touch(TouchEvent),
    Text(char),
    Window(WindowAction),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum KeyAction {
    Pressed,
    Down,
    Released,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub action: KeyAction,
    pub modifiers: KeyModifiers,
    /// Backend-native code the key was translated from.
    pub native: u32,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MouseEvent {
    Pressed(MouseButton),
    Released(MouseButton),
    Down(MouseButton),
    /// Absolute cursor position while the mouse is unlocked, relative motion while locked.
    Move(Vec2),
    Wheel(Vec2),
    Enter,
    Leave,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TouchAction {
    Down,
    Up,
    Move,
    Cancel,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TouchEvent {
    pub id: u32,
    pub action: TouchAction,
    pub position: Vec2,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WindowAction {
    Resized(UVec2),
    Moved(IVec2),
    Focused,
    Unfocused,
    CloseRequested,
    FileDropped(PathBuf),
}

impl EventKind {
    pub fn key(code: KeyCode, action: KeyAction) -> Self {
        Self::Key(KeyEvent {
            code,
            action,
            modifiers: KeyModifiers::empty(),
            native: 0,
        })
    }

    pub fn mouse_move(position: Vec2) -> Self {
        Self::Mouse(MouseEvent::Move(position))
    }

    pub fn touch(id: u32, action: TouchAction, position: Vec2) -> Self {
        Self::Touch(TouchEvent {
            id,
            action,
            position,
        })
    }
}

impl Event {
    pub fn is_close_request(&self) -> bool {
        matches!(self.kind, EventKind::Window(WindowAction::CloseRequested))
    }
}
