use glam::Vec2;

use crate::event::{Event, EventKind, KeyAction, MouseEvent, TouchAction, TouchEvent};
use crate::keys::{KeyCode, MouseButton};

/// Number of simultaneously tracked touch points. Touch ids at or above this are ignored.
pub const MAX_TOUCH: usize = 5;

/// Current and previous-frame down flags for a closed set of `N` buttons.
#[derive(Debug, Clone)]
pub struct ButtonMap<const N: usize> {
    current: [bool; N],
    previous: [bool; N],
}

impl<const N: usize> Default for ButtonMap<N> {
    fn default() -> Self {
        Self {
            current: [false; N],
            previous: [false; N],
        }
    }
}

impl<const N: usize> ButtonMap<N> {
    pub fn begin_frame(&mut self) {
        self.previous = self.current;
    }

    pub fn is_down(&self, idx: usize) -> bool {
        self.current.get(idx).copied().unwrap_or(false)
    }

    pub fn was_down(&self, idx: usize) -> bool {
        self.previous.get(idx).copied().unwrap_or(false)
    }

    pub fn just_pressed(&self, idx: usize) -> bool {
        self.is_down(idx) && !self.was_down(idx)
    }

    pub fn just_released(&self, idx: usize) -> bool {
        self.was_down(idx) && !self.is_down(idx)
    }

    fn set(&mut self, idx: usize, down: bool) {
        if let Some(slot) = self.current.get_mut(idx) {
            *slot = down;
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct KeyboardState {
    keys: ButtonMap<{ KeyCode::COUNT }>,
}

impl KeyboardState {
    pub fn begin_frame(&mut self) {
        self.keys.begin_frame();
    }

    pub fn down(&self, code: KeyCode) -> bool {
        code.index().map_or(false, |i| self.keys.is_down(i))
    }

    pub fn was_down(&self, code: KeyCode) -> bool {
        code.index().map_or(false, |i| self.keys.was_down(i))
    }

    pub fn pressed(&self, code: KeyCode) -> bool {
        code.index().map_or(false, |i| self.keys.just_pressed(i))
    }

    pub fn released(&self, code: KeyCode) -> bool {
        code.index().map_or(false, |i| self.keys.just_released(i))
    }

    /// Iterate the keys currently held down.
    pub fn held(&self) -> impl '_ + Iterator<Item = KeyCode> {
        (0..KeyCode::COUNT)
            .filter(|&i| self.keys.is_down(i))
            .map(|i| KeyCode::from_raw(i as u32))
    }

    pub fn press(&mut self, code: KeyCode) {
        self.write(code, true);
    }

    pub fn release(&mut self, code: KeyCode) {
        self.write(code, false);
    }

    fn write(&mut self, code: KeyCode, down: bool) {
        match code.index() {
            Some(idx) => self.keys.set(idx, down),
            None => tracing::debug!(?code, "Ignoring write to out-of-range key"),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct MouseState {
    buttons: ButtonMap<{ MouseButton::COUNT }>,
    pub position: Vec2,
    pub delta: Vec2,
    pub wheel: Vec2,
    pub locked: bool,
    pub moved_this_frame: bool,
}

impl MouseState {
    pub fn begin_frame(&mut self) {
        self.buttons.begin_frame();
        self.wheel = Vec2::ZERO;
        self.delta = Vec2::ZERO;
        self.moved_this_frame = false;
    }

    pub fn down(&self, button: MouseButton) -> bool {
        button.index().map_or(false, |i| self.buttons.is_down(i))
    }

    pub fn was_down(&self, button: MouseButton) -> bool {
        button.index().map_or(false, |i| self.buttons.was_down(i))
    }

    pub fn pressed(&self, button: MouseButton) -> bool {
        button.index().map_or(false, |i| self.buttons.just_pressed(i))
    }

    pub fn released(&self, button: MouseButton) -> bool {
        button
            .index()
            .map_or(false, |i| self.buttons.just_released(i))
    }

    pub fn moved(&self) -> bool {
        self.delta.x != 0. || self.delta.y != 0.
    }

    pub fn press(&mut self, button: MouseButton) {
        self.write(button, true);
    }

    pub fn release(&mut self, button: MouseButton) {
        self.write(button, false);
    }

    /// Apply a move payload. Locked: `value` is relative motion and accumulates.
    /// Unlocked: `value` is the new absolute position.
    pub fn apply_move(&mut self, value: Vec2) {
        if self.locked {
            self.delta += value;
        } else {
            self.delta = value - self.position;
            self.position = value;
        }
        self.moved_this_frame = true;
    }

    fn write(&mut self, button: MouseButton, down: bool) {
        match button.index() {
            Some(idx) => self.buttons.set(idx, down),
            None => tracing::debug!(?button, "Ignoring write to out-of-range mouse button"),
        }
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct TouchPoint {
    pub position: Vec2,
    pub delta: Vec2,
    /// Touching during this frame.
    pub pressed: bool,
    /// `pressed` as it was at the end of the previous frame.
    pub down: bool,
}

#[derive(Debug, Default, Clone)]
pub struct TouchState {
    points: [TouchPoint; MAX_TOUCH],
    size: usize,
}

impl TouchState {
    pub fn begin_frame(&mut self) {
        for point in &mut self.points {
            point.delta = Vec2::ZERO;
            point.down = point.pressed;
        }
    }

    pub fn point(&self, id: usize) -> Option<&TouchPoint> {
        self.points.get(id)
    }

    /// Number of points currently touching.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn down(&self, id: usize) -> bool {
        self.point(id).map_or(false, |p| p.pressed)
    }

    pub fn was_down(&self, id: usize) -> bool {
        self.point(id).map_or(false, |p| p.down)
    }

    // Known quirk: `pressed` and `released` share one formula, so both fire on the frame
    // contact ends.
    pub fn pressed(&self, id: usize) -> bool {
        self.was_down(id) && !self.down(id)
    }

    pub fn released(&self, id: usize) -> bool {
        self.was_down(id) && !self.down(id)
    }

    pub fn position(&self, id: usize) -> Vec2 {
        self.point(id).map_or(Vec2::ZERO, |p| p.position)
    }

    pub fn delta(&self, id: usize) -> Vec2 {
        self.point(id).map_or(Vec2::ZERO, |p| p.delta)
    }

    pub fn apply(&mut self, event: &TouchEvent) {
        let Some(point) = self.points.get_mut(event.id as usize) else {
            tracing::debug!(id = event.id, "Ignoring out-of-range touch id");
            return;
        };
        match event.action {
            TouchAction::Down => {
                point.pressed = true;
                point.position = event.position;
                self.size += 1;
            }
            TouchAction::Move => {
                point.pressed = true;
                point.delta = event.position - point.position;
                point.position = event.position;
            }
            TouchAction::Up | TouchAction::Cancel => {
                point.pressed = false;
                self.size = self.size.saturating_sub(1);
            }
        }
    }
}

/// Double-buffered keyboard, mouse and touch state for one frame.
#[derive(Debug, Default, Clone)]
pub struct InputState {
    pub keyboard: KeyboardState,
    pub mouse: MouseState,
    pub touch: TouchState,
}

impl InputState {
    /// Snapshot step: latch current into previous and reset per-frame deltas.
    pub fn begin_frame(&mut self) {
        self.keyboard.begin_frame();
        self.mouse.begin_frame();
        self.touch.begin_frame();
    }

    /// Apply one queued event. Returns whether the event is an input event this state
    /// tracks; text and window events are left to the application.
    pub fn apply_event(&mut self, event: &Event) -> bool {
        match &event.kind {
            EventKind::Key(key) => match key.action {
                KeyAction::Pressed | KeyAction::Down => self.keyboard.press(key.code),
                KeyAction::Released => self.keyboard.release(key.code),
            },
            EventKind::Mouse(mouse) => match *mouse {
                MouseEvent::Pressed(button) | MouseEvent::Down(button) => self.mouse.press(button),
                MouseEvent::Released(button) => self.mouse.release(button),
                MouseEvent::Move(value) => self.mouse.apply_move(value),
                MouseEvent::Wheel(wheel) => self.mouse.wheel = wheel,
                MouseEvent::Enter | MouseEvent::Leave => {}
            },
            EventKind::Touch(touch) => self.touch.apply(touch),
            EventKind::Text(_) | EventKind::Window(_) => return false,
        }
        true
    }

    pub fn key_down(&self, code: KeyCode) -> bool {
        self.keyboard.down(code)
    }

    pub fn key_pressed(&self, code: KeyCode) -> bool {
        self.keyboard.pressed(code)
    }

    pub fn key_released(&self, code: KeyCode) -> bool {
        self.keyboard.released(code)
    }

    pub fn mouse_down(&self, button: MouseButton) -> bool {
        self.mouse.down(button)
    }

    pub fn mouse_pressed(&self, button: MouseButton) -> bool {
        self.mouse.pressed(button)
    }

    pub fn mouse_released(&self, button: MouseButton) -> bool {
        self.mouse.released(button)
    }

    pub fn mouse_position(&self) -> Vec2 {
        self.mouse.position
    }

    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse.delta
    }

    pub fn mouse_wheel(&self) -> Vec2 {
        self.mouse.wheel
    }

    pub fn mouse_moved(&self) -> bool {
        self.mouse.moved()
    }

    pub fn mouse_locked(&self) -> bool {
        self.mouse.locked
    }

    pub fn touch_down(&self, id: usize) -> bool {
        self.touch.down(id)
    }

    pub fn touch_pressed(&self, id: usize) -> bool {
        self.touch.pressed(id)
    }

    pub fn touch_released(&self, id: usize) -> bool {
        self.touch.released(id)
    }

    pub fn touch_position(&self, id: usize) -> Vec2 {
        self.touch.position(id)
    }

    pub fn touch_delta(&self, id: usize) -> Vec2 {
        self.touch.delta(id)
    }

    pub fn touch_count(&self) -> usize {
        self.touch.size()
    }
}
