use bitflags::bitflags;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

/// Backend-independent key identifier.
///
/// The enumeration is closed: `Invalid` is the last member and doubles as the
/// count of storable keys. Backends translate their native codes into this
/// enum and must map anything they don't know to `Invalid`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, FromPrimitive)]
#[repr(u16)]
pub enum KeyCode {
    Space,
    Apostrophe,
    Comma,
    Minus,
    Period,
    Slash,
    Key0,
    Key1,
    Key2,
    Key3,
    Key4,
    Key5,
    Key6,
    Key7,
    Key8,
    Key9,
    Semicolon,
    Equal,
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    LeftBracket,
    Backslash,
    RightBracket,
    GraveAccent,
    World1,
    World2,
    Escape,
    Enter,
    Tab,
    Backspace,
    Insert,
    Delete,
    Right,
    Left,
    Down,
    Up,
    PageUp,
    PageDown,
    Home,
    End,
    CapsLock,
    ScrollLock,
    NumLock,
    PrintScreen,
    Pause,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    F13,
    F14,
    F15,
    F16,
    F17,
    F18,
    F19,
    F20,
    F21,
    F22,
    F23,
    F24,
    F25,
    Kp0,
    Kp1,
    Kp2,
    Kp3,
    Kp4,
    Kp5,
    Kp6,
    Kp7,
    Kp8,
    Kp9,
    KpDecimal,
    KpDivide,
    KpMultiply,
    KpSubtract,
    KpAdd,
    KpEnter,
    KpEqual,
    LeftShift,
    LeftControl,
    LeftAlt,
    LeftSuper,
    RightShift,
    RightControl,
    RightAlt,
    RightSuper,
    Menu,
    Invalid,
}

impl KeyCode {
    /// Number of storable key codes. `Invalid` is excluded.
    pub const COUNT: usize = KeyCode::Invalid as usize;

    /// Total mapping from a raw index: anything out of range is `Invalid`.
    pub fn from_raw(raw: u32) -> Self {
        Self::from_u32(raw).unwrap_or(Self::Invalid)
    }

    /// Slot in the key maps, or `None` for `Invalid`.
    pub fn index(self) -> Option<usize> {
        let idx = self as usize;
        (idx < Self::COUNT).then_some(idx)
    }

    pub fn is_valid(self) -> bool {
        self.index().is_some()
    }

    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            Self::LeftShift
                | Self::LeftControl
                | Self::LeftAlt
                | Self::LeftSuper
                | Self::RightShift
                | Self::RightControl
                | Self::RightAlt
                | Self::RightSuper
        )
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, FromPrimitive)]
#[repr(u8)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Invalid,
}

impl MouseButton {
    pub const COUNT: usize = MouseButton::Invalid as usize;

    pub fn from_raw(raw: u32) -> Self {
        Self::from_u32(raw).unwrap_or(Self::Invalid)
    }

    pub fn index(self) -> Option<usize> {
        let idx = self as usize;
        (idx < Self::COUNT).then_some(idx)
    }
}

bitflags! {
    /// Modifier and lock keys active when a key event was produced.
    #[derive(Default)]
    pub struct KeyModifiers: u8 {
        const SHIFT = 1 << 0;
        const CONTROL = 1 << 1;
        const ALT = 1 << 2;
        const SUPER = 1 << 3;
        const CAPS_LOCK = 1 << 4;
        const NUM_LOCK = 1 << 5;
    }
}
