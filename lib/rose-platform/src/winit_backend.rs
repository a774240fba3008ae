use std::collections::{HashMap, HashSet};

use glam::{ivec2, uvec2, vec2, IVec2, UVec2, Vec2};
use winit::{
    dpi::{LogicalSize, PhysicalPosition},
    event::{
        DeviceEvent, ElementState, Event, ModifiersState, MouseButton as WinitButton,
        MouseScrollDelta, TouchPhase, VirtualKeyCode, WindowEvent,
    },
    event_loop::{EventLoop, EventLoopBuilder},
    platform::run_return::EventLoopExtRunReturn,
    window::{CursorGrabMode, CursorIcon, Fullscreen, Window, WindowBuilder, WindowId},
};

use input::{
    EventKind, EventQueue, KeyAction, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent,
    TouchAction, WindowAction,
};

use crate::backend::{Backend, BackendError, CursorShape};
use crate::window::{WindowDesc, WindowFlags, WindowGeometry};

/// [`Backend`] over a winit event loop, pumped without blocking once per frame.
///
/// winit exposes no clipboard, so clipboard contents only live inside this process.
pub struct WinitBackend {
    event_loop: EventLoop<()>,
    windows: HashMap<WindowId, Window>,
    translator: Translator,
    clipboard: Option<String>,
}

impl Default for WinitBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl WinitBackend {
    pub fn new() -> Self {
        Self {
            event_loop: EventLoopBuilder::new().build(),
            windows: HashMap::new(),
            translator: Translator::default(),
            clipboard: None,
        }
    }

    pub fn window(&self, id: WindowId) -> Option<&Window> {
        self.windows.get(&id)
    }

    fn get(&self, id: WindowId) -> Result<&Window, BackendError> {
        self.windows.get(&id).ok_or(BackendError::UnknownWindow)
    }
}

impl Backend for WinitBackend {
    type Window = WindowId;

    fn create_window(&mut self, desc: &WindowDesc) -> Result<WindowId, BackendError> {
        let mut builder = WindowBuilder::new()
            .with_title(desc.title.clone())
            .with_inner_size(LogicalSize::new(desc.width, desc.height))
            .with_resizable(!desc.flags.contains(WindowFlags::NO_RESIZE))
            .with_visible(!desc.flags.contains(WindowFlags::INVISIBLE));
        if desc.flags.contains(WindowFlags::FULLSCREEN) {
            let monitor = self.event_loop.available_monitors().nth(desc.monitor_index);
            builder = builder.with_fullscreen(Some(Fullscreen::Borderless(monitor)));
        }
        if desc.num_samples > 0 {
            tracing::debug!(samples = desc.num_samples, "Multisampling is left to the GL context");
        }
        let window = builder
            .build(&self.event_loop)
            .map_err(|err| BackendError::WindowCreation(err.to_string()))?;
        let id = window.id();
        self.windows.insert(id, window);
        Ok(id)
    }

    fn destroy_window(&mut self, id: WindowId) {
        self.windows.remove(&id);
    }

    fn pump_events(&mut self, events: &mut EventQueue) {
        let Self {
            event_loop,
            translator,
            ..
        } = self;
        event_loop.run_return(|event, _, control_flow| {
            control_flow.set_poll();
            let kind = match event {
                Event::WindowEvent { event, .. } => translator.window_event(&event),
                Event::DeviceEvent { event, .. } => translator.device_event(&event),
                Event::MainEventsCleared => {
                    control_flow.set_exit();
                    None
                }
                _ => None,
            };
            if let Some(kind) = kind {
                events.push(kind);
            }
        });
    }

    fn query_geometry(&self, id: WindowId) -> Option<WindowGeometry> {
        let window = self.windows.get(&id)?;
        let physical = window.inner_size();
        let logical: LogicalSize<f32> = physical.to_logical(window.scale_factor());
        let position = window
            .outer_position()
            .map(|pos| vec2(pos.x as _, pos.y as _))
            .unwrap_or(Vec2::ZERO);
        Some(WindowGeometry {
            size: vec2(logical.width, logical.height),
            position,
            framebuffer_size: vec2(physical.width as _, physical.height as _),
        })
    }

    fn set_window_size(&mut self, id: WindowId, size: UVec2) -> Result<(), BackendError> {
        self.get(id)?.set_inner_size(LogicalSize::new(size.x, size.y));
        Ok(())
    }

    fn set_window_position(&mut self, id: WindowId, position: IVec2) -> Result<(), BackendError> {
        self.get(id)?.set_outer_position(PhysicalPosition::new(position.x, position.y));
        Ok(())
    }

    fn monitor_size(&self, id: WindowId) -> Option<Vec2> {
        let monitor = self.windows.get(&id)?.current_monitor()?;
        let size = monitor.size();
        Some(vec2(size.width as _, size.height as _))
    }

    fn set_cursor(&mut self, id: WindowId, cursor: CursorShape) -> Result<(), BackendError> {
        self.get(id)?.set_cursor_icon(map_cursor(cursor));
        Ok(())
    }

    fn lock_cursor(&mut self, id: WindowId, lock: bool) -> Result<(), BackendError> {
        let window = self.windows.get(&id).ok_or(BackendError::UnknownWindow)?;
        let grab = if lock {
            window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined))
        } else {
            window.set_cursor_grab(CursorGrabMode::None)
        };
        grab.map_err(|err| BackendError::Cursor(err.to_string()))?;
        window.set_cursor_visible(!lock);
        self.translator.locked = lock;
        Ok(())
    }

    fn set_cursor_position(&mut self, id: WindowId, position: Vec2) -> Result<(), BackendError> {
        self.get(id)?
            .set_cursor_position(PhysicalPosition::new(position.x as f64, position.y as f64))
            .map_err(|err| BackendError::Cursor(err.to_string()))
    }

    fn swap_buffers(&mut self, id: WindowId) {
        // No GL surface is attached here; presenting only schedules the next redraw.
        if let Some(window) = self.windows.get(&id) {
            window.request_redraw();
        }
    }

    fn clipboard(&self) -> Option<String> {
        self.clipboard.clone()
    }

    fn set_clipboard(&mut self, text: &str) -> Result<(), BackendError> {
        self.clipboard = Some(text.to_string());
        Ok(())
    }
}

/// Converts winit notifications into queue events.
#[derive(Debug, Default)]
struct Translator {
    modifiers: KeyModifiers,
    held: HashSet<u32>,
    locked: bool,
}

impl Translator {
    fn window_event(&mut self, event: &WindowEvent) -> Option<EventKind> {
        let kind = match event {
            WindowEvent::KeyboardInput { input, .. } => {
                let code = map_key(input.virtual_keycode);
                if code == KeyCode::Invalid {
                    tracing::debug!(scancode = input.scancode, "Unmapped key");
                }
                let action = match input.state {
                    ElementState::Pressed => {
                        if self.held.insert(input.scancode) {
                            KeyAction::Pressed
                        } else {
                            KeyAction::Down
                        }
                    }
                    ElementState::Released => {
                        self.held.remove(&input.scancode);
                        KeyAction::Released
                    }
                };
                EventKind::Key(KeyEvent {
                    code,
                    action,
                    modifiers: self.modifiers,
                    native: input.scancode,
                })
            }
            WindowEvent::ModifiersChanged(state) => {
                self.modifiers = map_modifiers(*state);
                return None;
            }
            WindowEvent::ReceivedCharacter(c) => EventKind::Text(*c),
            WindowEvent::MouseInput { state, button, .. } => {
                let button = map_button(*button);
                EventKind::Mouse(match state {
                    ElementState::Pressed => MouseEvent::Pressed(button),
                    ElementState::Released => MouseEvent::Released(button),
                })
            }
            WindowEvent::CursorMoved { position, .. } => return self.cursor_moved(*position),
            WindowEvent::MouseWheel { delta, .. } => {
                EventKind::Mouse(MouseEvent::Wheel(map_wheel(*delta)))
            }
            WindowEvent::CursorEntered { .. } => EventKind::Mouse(MouseEvent::Enter),
            WindowEvent::CursorLeft { .. } => EventKind::Mouse(MouseEvent::Leave),
            WindowEvent::Touch(touch) => EventKind::touch(
                u32::try_from(touch.id).unwrap_or(u32::MAX),
                map_touch_phase(touch.phase),
                vec2(touch.location.x as _, touch.location.y as _),
            ),
            WindowEvent::Resized(size) => {
                EventKind::Window(WindowAction::Resized(uvec2(size.width, size.height)))
            }
            WindowEvent::Moved(pos) => EventKind::Window(WindowAction::Moved(ivec2(pos.x, pos.y))),
            WindowEvent::Focused(true) => EventKind::Window(WindowAction::Focused),
            WindowEvent::Focused(false) => {
                self.held.clear();
                EventKind::Window(WindowAction::Unfocused)
            }
            WindowEvent::CloseRequested => EventKind::Window(WindowAction::CloseRequested),
            WindowEvent::DroppedFile(path) => {
                EventKind::Window(WindowAction::FileDropped(path.clone()))
            }
            _ => return None,
        };
        Some(kind)
    }

    fn device_event(&mut self, event: &DeviceEvent) -> Option<EventKind> {
        match event {
            DeviceEvent::MouseMotion { delta: (dx, dy) } if self.locked => {
                Some(EventKind::mouse_move(vec2(*dx as _, *dy as _)))
            }
            _ => None,
        }
    }

    /// Absolute positions are only reported while unlocked; locked motion comes from raw
    /// device deltas instead.
    fn cursor_moved(&mut self, position: PhysicalPosition<f64>) -> Option<EventKind> {
        (!self.locked).then(|| EventKind::mouse_move(vec2(position.x as _, position.y as _)))
    }
}

fn map_modifiers(state: ModifiersState) -> KeyModifiers {
    let mut modifiers = KeyModifiers::empty();
    modifiers.set(KeyModifiers::SHIFT, state.shift());
    modifiers.set(KeyModifiers::CONTROL, state.ctrl());
    modifiers.set(KeyModifiers::ALT, state.alt());
    modifiers.set(KeyModifiers::SUPER, state.logo());
    modifiers
}

fn map_button(button: WinitButton) -> MouseButton {
    match button {
        WinitButton::Left => MouseButton::Left,
        WinitButton::Right => MouseButton::Right,
        WinitButton::Middle => MouseButton::Middle,
        WinitButton::Other(_) => MouseButton::Invalid,
    }
}

fn map_wheel(delta: MouseScrollDelta) -> Vec2 {
    match delta {
        MouseScrollDelta::LineDelta(x, y) => vec2(x, y),
        MouseScrollDelta::PixelDelta(pos) => vec2(pos.x as _, pos.y as _),
    }
}

fn map_touch_phase(phase: TouchPhase) -> TouchAction {
    match phase {
        TouchPhase::Started => TouchAction::Down,
        TouchPhase::Moved => TouchAction::Move,
        TouchPhase::Ended => TouchAction::Up,
        TouchPhase::Cancelled => TouchAction::Cancel,
    }
}

fn map_cursor(cursor: CursorShape) -> CursorIcon {
    match cursor {
        CursorShape::Arrow => CursorIcon::Default,
        CursorShape::IBeam => CursorIcon::Text,
        CursorShape::SizeNwSe => CursorIcon::NwseResize,
        CursorShape::SizeNeSw => CursorIcon::NeswResize,
        CursorShape::SizeNs => CursorIcon::NsResize,
        CursorShape::SizeWe => CursorIcon::EwResize,
        CursorShape::SizeAll => CursorIcon::Move,
        CursorShape::Hand => CursorIcon::Hand,
        CursorShape::No => CursorIcon::NotAllowed,
    }
}

fn map_key(key: Option<VirtualKeyCode>) -> KeyCode {
    use VirtualKeyCode as Vk;
    let Some(key) = key else {
        return KeyCode::Invalid;
    };
    match key {
        Vk::Key0 => KeyCode::Key0,
        Vk::Key1 => KeyCode::Key1,
        Vk::Key2 => KeyCode::Key2,
        Vk::Key3 => KeyCode::Key3,
        Vk::Key4 => KeyCode::Key4,
        Vk::Key5 => KeyCode::Key5,
        Vk::Key6 => KeyCode::Key6,
        Vk::Key7 => KeyCode::Key7,
        Vk::Key8 => KeyCode::Key8,
        Vk::Key9 => KeyCode::Key9,
        Vk::A => KeyCode::A,
        Vk::B => KeyCode::B,
        Vk::C => KeyCode::C,
        Vk::D => KeyCode::D,
        Vk::E => KeyCode::E,
        Vk::F => KeyCode::F,
        Vk::G => KeyCode::G,
        Vk::H => KeyCode::H,
        Vk::I => KeyCode::I,
        Vk::J => KeyCode::J,
        Vk::K => KeyCode::K,
        Vk::L => KeyCode::L,
        Vk::M => KeyCode::M,
        Vk::N => KeyCode::N,
        Vk::O => KeyCode::O,
        Vk::P => KeyCode::P,
        Vk::Q => KeyCode::Q,
        Vk::R => KeyCode::R,
        Vk::S => KeyCode::S,
        Vk::T => KeyCode::T,
        Vk::U => KeyCode::U,
        Vk::V => KeyCode::V,
        Vk::W => KeyCode::W,
        Vk::X => KeyCode::X,
        Vk::Y => KeyCode::Y,
        Vk::Z => KeyCode::Z,
        Vk::Escape => KeyCode::Escape,
        Vk::F1 => KeyCode::F1,
        Vk::F2 => KeyCode::F2,
        Vk::F3 => KeyCode::F3,
        Vk::F4 => KeyCode::F4,
        Vk::F5 => KeyCode::F5,
        Vk::F6 => KeyCode::F6,
        Vk::F7 => KeyCode::F7,
        Vk::F8 => KeyCode::F8,
        Vk::F9 => KeyCode::F9,
        Vk::F10 => KeyCode::F10,
        Vk::F11 => KeyCode::F11,
        Vk::F12 => KeyCode::F12,
        Vk::F13 => KeyCode::F13,
        Vk::F14 => KeyCode::F14,
        Vk::F15 => KeyCode::F15,
        Vk::F16 => KeyCode::F16,
        Vk::F17 => KeyCode::F17,
        Vk::F18 => KeyCode::F18,
        Vk::F19 => KeyCode::F19,
        Vk::F20 => KeyCode::F20,
        Vk::F21 => KeyCode::F21,
        Vk::F22 => KeyCode::F22,
        Vk::F23 => KeyCode::F23,
        Vk::F24 => KeyCode::F24,
        Vk::Snapshot => KeyCode::PrintScreen,
        Vk::Scroll => KeyCode::ScrollLock,
        Vk::Pause => KeyCode::Pause,
        Vk::Insert => KeyCode::Insert,
        Vk::Home => KeyCode::Home,
        Vk::Delete => KeyCode::Delete,
        Vk::End => KeyCode::End,
        Vk::PageDown => KeyCode::PageDown,
        Vk::PageUp => KeyCode::PageUp,
        Vk::Left => KeyCode::Left,
        Vk::Up => KeyCode::Up,
        Vk::Right => KeyCode::Right,
        Vk::Down => KeyCode::Down,
        Vk::Back => KeyCode::Backspace,
        Vk::Return => KeyCode::Enter,
        Vk::Space => KeyCode::Space,
        Vk::Tab => KeyCode::Tab,
        Vk::Capital => KeyCode::CapsLock,
        Vk::Numlock => KeyCode::NumLock,
        Vk::Numpad0 => KeyCode::Kp0,
        Vk::Numpad1 => KeyCode::Kp1,
        Vk::Numpad2 => KeyCode::Kp2,
        Vk::Numpad3 => KeyCode::Kp3,
        Vk::Numpad4 => KeyCode::Kp4,
        Vk::Numpad5 => KeyCode::Kp5,
        Vk::Numpad6 => KeyCode::Kp6,
        Vk::Numpad7 => KeyCode::Kp7,
        Vk::Numpad8 => KeyCode::Kp8,
        Vk::Numpad9 => KeyCode::Kp9,
        Vk::NumpadAdd => KeyCode::KpAdd,
        Vk::NumpadDivide => KeyCode::KpDivide,
        Vk::NumpadDecimal => KeyCode::KpDecimal,
        Vk::NumpadEnter => KeyCode::KpEnter,
        Vk::NumpadEquals => KeyCode::KpEqual,
        Vk::NumpadMultiply => KeyCode::KpMultiply,
        Vk::NumpadSubtract => KeyCode::KpSubtract,
        Vk::Apostrophe => KeyCode::Apostrophe,
        Vk::Backslash => KeyCode::Backslash,
        Vk::Comma => KeyCode::Comma,
        Vk::Equals => KeyCode::Equal,
        Vk::Grave => KeyCode::GraveAccent,
        Vk::LBracket => KeyCode::LeftBracket,
        Vk::RBracket => KeyCode::RightBracket,
        Vk::Minus => KeyCode::Minus,
        Vk::Period => KeyCode::Period,
        Vk::Semicolon => KeyCode::Semicolon,
        Vk::Slash => KeyCode::Slash,
        Vk::LAlt => KeyCode::LeftAlt,
        Vk::LControl => KeyCode::LeftControl,
        Vk::LShift => KeyCode::LeftShift,
        Vk::LWin => KeyCode::LeftSuper,
        Vk::RAlt => KeyCode::RightAlt,
        Vk::RControl => KeyCode::RightControl,
        Vk::RShift => KeyCode::RightShift,
        Vk::RWin => KeyCode::RightSuper,
        Vk::Apps => KeyCode::Menu,
        _ => KeyCode::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_mapping_is_total() {
        assert_eq!(map_key(Some(VirtualKeyCode::Escape)), KeyCode::Escape);
        assert_eq!(map_key(Some(VirtualKeyCode::Numpad7)), KeyCode::Kp7);
        assert_eq!(map_key(Some(VirtualKeyCode::Mute)), KeyCode::Invalid);
        assert_eq!(map_key(None), KeyCode::Invalid);
    }

    #[test]
    fn buttons_and_modifiers() {
        assert_eq!(map_button(WinitButton::Middle), MouseButton::Middle);
        assert_eq!(map_button(WinitButton::Other(7)), MouseButton::Invalid);
        let modifiers = map_modifiers(ModifiersState::SHIFT | ModifiersState::CTRL);
        assert_eq!(modifiers, KeyModifiers::SHIFT | KeyModifiers::CONTROL);
    }

    #[test]
    fn cursor_moves_depend_on_lock() {
        let mut translator = Translator::default();
        let moved = translator.cursor_moved(PhysicalPosition::new(12., 34.));
        assert_eq!(moved, Some(EventKind::mouse_move(vec2(12., 34.))));
        let motion = DeviceEvent::MouseMotion { delta: (1., 2.) };
        assert_eq!(translator.device_event(&motion), None);

        translator.locked = true;
        assert_eq!(translator.cursor_moved(PhysicalPosition::new(12., 34.)), None);
        assert_eq!(
            translator.device_event(&motion),
            Some(EventKind::mouse_move(vec2(1., 2.)))
        );
    }

    #[test]
    fn window_notifications_share_the_pipeline() {
        let mut translator = Translator::default();
        assert_eq!(
            translator.window_event(&WindowEvent::ReceivedCharacter('é')),
            Some(EventKind::Text('é'))
        );
        assert_eq!(
            translator.window_event(&WindowEvent::CloseRequested),
            Some(EventKind::Window(WindowAction::CloseRequested))
        );
        assert_eq!(
            translator.window_event(&WindowEvent::Focused(false)),
            Some(EventKind::Window(WindowAction::Unfocused))
        );
        assert_eq!(
            translator.window_event(&WindowEvent::ModifiersChanged(ModifiersState::ALT)),
            None
        );
        assert_eq!(translator.modifiers, KeyModifiers::ALT);
    }

    #[test]
    fn wheel_and_touch_phases() {
        assert_eq!(map_wheel(MouseScrollDelta::LineDelta(0., -1.)), vec2(0., -1.));
        assert_eq!(map_touch_phase(TouchPhase::Cancelled), TouchAction::Cancel);
        assert_eq!(map_cursor(CursorShape::IBeam), CursorIcon::Text);
    }
}
