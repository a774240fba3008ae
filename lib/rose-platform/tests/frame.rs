use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use glam::{ivec2, uvec2, vec2, IVec2, UVec2, Vec2};

use input::{
    EventCursor, EventKind, EventQueue, KeyAction, KeyCode, MouseButton, MouseEvent, TouchAction,
    WindowAction,
};
use rose_platform::config::EventRetention;
use rose_platform::prelude::*;

/// Backend replaying one scripted batch of events per pump.
#[derive(Debug, Default)]
struct ScriptedBackend {
    frames: VecDeque<Vec<EventKind>>,
    geometry: HashMap<u32, WindowGeometry>,
    next_id: u32,
    fail_create: bool,
    destroyed: Vec<u32>,
    locks: Vec<(u32, bool)>,
    presented: Vec<u32>,
    clipboard: Option<String>,
}

impl ScriptedBackend {
    fn with_frames(frames: impl IntoIterator<Item = Vec<EventKind>>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            ..Default::default()
        }
    }
}

impl Backend for ScriptedBackend {
    type Window = u32;

    fn create_window(&mut self, desc: &WindowDesc) -> Result<u32, BackendError> {
        if self.fail_create {
            return Err(BackendError::WindowCreation("scripted failure".to_string()));
        }
        let id = self.next_id;
        self.next_id += 1;
        self.geometry.insert(
            id,
            WindowGeometry {
                size: desc.logical_size(),
                position: Vec2::ZERO,
                framebuffer_size: desc.logical_size() * 2.,
            },
        );
        Ok(id)
    }

    fn destroy_window(&mut self, window: u32) {
        self.geometry.remove(&window);
        self.destroyed.push(window);
    }

    fn pump_events(&mut self, events: &mut EventQueue) {
        for kind in self.frames.pop_front().unwrap_or_default() {
            events.push(kind);
        }
    }

    fn query_geometry(&self, window: u32) -> Option<WindowGeometry> {
        self.geometry.get(&window).copied()
    }

    fn set_window_size(&mut self, window: u32, size: UVec2) -> Result<(), BackendError> {
        let geometry = self
            .geometry
            .get_mut(&window)
            .ok_or(BackendError::UnknownWindow)?;
        geometry.size = size.as_vec2();
        geometry.framebuffer_size = size.as_vec2() * 2.;
        Ok(())
    }

    fn set_window_position(&mut self, window: u32, position: IVec2) -> Result<(), BackendError> {
        let geometry = self
            .geometry
            .get_mut(&window)
            .ok_or(BackendError::UnknownWindow)?;
        geometry.position = position.as_vec2();
        Ok(())
    }

    fn monitor_size(&self, window: u32) -> Option<Vec2> {
        self.geometry
            .contains_key(&window)
            .then_some(vec2(1920., 1080.))
    }

    fn set_cursor(&mut self, _window: u32, _cursor: CursorShape) -> Result<(), BackendError> {
        Ok(())
    }

    fn lock_cursor(&mut self, window: u32, lock: bool) -> Result<(), BackendError> {
        self.locks.push((window, lock));
        Ok(())
    }

    fn set_cursor_position(&mut self, _window: u32, _position: Vec2) -> Result<(), BackendError> {
        Ok(())
    }

    fn swap_buffers(&mut self, window: u32) {
        self.presented.push(window);
    }

    fn clipboard(&self) -> Option<String> {
        self.clipboard.clone()
    }

    fn set_clipboard(&mut self, text: &str) -> Result<(), BackendError> {
        self.clipboard = Some(text.to_string());
        Ok(())
    }
}

fn platform(frames: impl IntoIterator<Item = Vec<EventKind>>) -> Platform<ScriptedBackend> {
    Platform::new(
        ScriptedBackend::with_frames(frames),
        PlatformConfig::default(),
    )
}

fn mouse(event: MouseEvent) -> EventKind {
    EventKind::Mouse(event)
}

#[test]
fn key_press_spans_two_frames() {
    let mut platform = platform([vec![EventKind::key(KeyCode::A, KeyAction::Pressed)], vec![]]);

    platform.update().unwrap();
    assert!(platform.input().key_pressed(KeyCode::A));
    assert!(platform.input().key_down(KeyCode::A));

    platform.update().unwrap();
    assert!(!platform.input().key_pressed(KeyCode::A));
    assert!(platform.input().key_down(KeyCode::A));
}

#[test]
fn locked_mouse_accumulates_deltas() {
    let mut platform = platform([
        vec![EventKind::mouse_move(vec2(40., 30.))],
        vec![
            EventKind::mouse_move(vec2(5., -3.)),
            EventKind::mouse_move(vec2(2., 1.)),
        ],
    ]);
    platform.create_window(WindowDesc::default());
    platform.update().unwrap();
    platform.lock_mouse(true);
    assert!(platform.mouse_locked());

    platform.update().unwrap();
    assert_eq!(platform.input().mouse_delta(), vec2(7., -2.));
    assert_eq!(platform.input().mouse_position(), vec2(40., 30.));
}

#[test]
fn unlocked_mouse_tracks_position() {
    let mut platform = platform([
        vec![EventKind::mouse_move(vec2(100., 50.))],
        vec![
            EventKind::mouse_move(vec2(100., 50.)),
            EventKind::mouse_move(vec2(110., 60.)),
        ],
    ]);
    platform.update().unwrap();
    platform.update().unwrap();
    assert_eq!(platform.input().mouse_position(), vec2(110., 60.));
    assert_eq!(platform.input().mouse_delta(), vec2(10., 10.));
    assert!(platform.input().mouse_moved());
}

#[test]
fn touch_down_then_move_in_one_frame() {
    let mut platform = platform([vec![
        EventKind::touch(3, TouchAction::Down, vec2(50., 50.)),
        EventKind::touch(3, TouchAction::Move, vec2(70., 50.)),
    ]]);
    platform.update().unwrap();
    assert_eq!(platform.input().touch_position(3), vec2(70., 50.));
    assert_eq!(platform.input().touch_delta(3), vec2(20., 0.));
    assert!(platform.input().touch_down(3));
    assert!(!platform.input().touch_pressed(3));
    assert_eq!(platform.input().touch_count(), 1);
}

#[test]
fn consume_and_replay_share_storage() {
    let mut platform = platform([vec![
        EventKind::key(KeyCode::A, KeyAction::Pressed),
        EventKind::key(KeyCode::B, KeyAction::Pressed),
        EventKind::key(KeyCode::C, KeyAction::Pressed),
    ]]);
    platform.update().unwrap();

    let mut consumer = EventCursor::new();
    let popped = platform.poll_event(&mut consumer, true).unwrap();
    assert_eq!(popped.kind, EventKind::key(KeyCode::C, KeyAction::Pressed));

    let mut replay = EventCursor::new();
    let mut seen = Vec::new();
    while let Some(event) = platform.poll_event(&mut replay, false) {
        seen.push(event.kind);
    }
    assert_eq!(
        seen,
        vec![
            EventKind::key(KeyCode::A, KeyAction::Pressed),
            EventKind::key(KeyCode::B, KeyAction::Pressed),
        ]
    );
}

#[test]
fn retained_events_are_not_applied_twice() {
    let mut platform = platform([
        vec![mouse(MouseEvent::Wheel(vec2(0., 1.)))],
        vec![mouse(MouseEvent::Pressed(MouseButton::Left))],
        vec![],
    ]);
    platform.update().unwrap();
    assert_eq!(platform.input().mouse_wheel(), vec2(0., 1.));

    platform.update().unwrap();
    assert_eq!(platform.input().mouse_wheel(), Vec2::ZERO);
    assert!(platform.input().mouse_pressed(MouseButton::Left));
    assert_eq!(platform.events().len(), 2);
    assert_eq!(platform.frame_events().count(), 1);

    platform.update().unwrap();
    assert!(!platform.input().mouse_pressed(MouseButton::Left));
    assert!(platform.input().mouse_down(MouseButton::Left));
    assert_eq!(platform.frame_events().count(), 0);
}

#[test]
fn clear_each_frame_drops_unconsumed_events() {
    let mut config = PlatformConfig::default();
    config.events.retention = EventRetention::ClearEachFrame;
    let backend = ScriptedBackend::with_frames([
        vec![EventKind::Text('a'), EventKind::Text('b')],
        vec![EventKind::Text('c')],
    ]);
    let mut platform = Platform::new(backend, config);

    platform.update().unwrap();
    assert_eq!(platform.events().len(), 2);
    platform.update().unwrap();
    assert_eq!(platform.events().len(), 1);
    let texts: Vec<_> = platform.frame_events().map(|e| e.kind.clone()).collect();
    assert_eq!(texts, vec![EventKind::Text('c')]);
}

#[test]
fn sequence_numbers_increase_across_frames() {
    let mut platform = platform([vec![EventKind::Text('a')], vec![EventKind::Text('b')]]);
    platform.update().unwrap();
    platform.update().unwrap();
    let seqs: Vec<_> = platform.events().iter().map(|e| e.seq).collect();
    assert_eq!(seqs, vec![0, 1]);
}

#[test]
fn geometry_is_refreshed_every_frame() {
    let mut platform = platform([vec![], vec![]]);
    let window = platform.create_window(WindowDesc::new("main", 800, 600));
    assert_eq!(platform.window_size(window), vec2(800., 600.));
    assert_eq!(platform.framebuffer_size(window), vec2(1600., 1200.));

    // No resize event: the geometry still follows the backend.
    platform.backend_mut().geometry.insert(
        0,
        WindowGeometry {
            size: vec2(1024., 768.),
            position: vec2(10., 20.),
            framebuffer_size: vec2(1024., 768.),
        },
    );
    assert_eq!(platform.window_size(window), vec2(800., 600.));
    platform.update().unwrap();
    assert_eq!(platform.window_size(window), vec2(1024., 768.));
    assert_eq!(platform.window_position(window), vec2(10., 20.));
}

#[test]
fn failed_creation_returns_invalid_handle() {
    let mut platform = platform([]);
    platform.backend_mut().fail_create = true;
    let failed = platform.create_window(WindowDesc::default());
    assert!(failed.is_invalid());
    assert_eq!(platform.window_size(failed), Vec2::ZERO);
    assert!(platform.main_window().is_none());

    platform.backend_mut().fail_create = false;
    let window = platform.create_window(WindowDesc::default());
    assert!(!window.is_invalid());
    assert_eq!(window.slot(), 0);
    assert_eq!(platform.main_window(), Some(window));
}

#[test]
fn destroyed_handles_go_stale() {
    let mut platform = platform([]);
    let first = platform.create_window(WindowDesc::new("first", 320, 240));
    let second = platform.create_window(WindowDesc::new("second", 640, 480));
    assert_eq!(platform.main_window(), Some(first));

    assert!(platform.destroy_window(first));
    assert!(!platform.destroy_window(first));
    assert_eq!(platform.window_size(first), Vec2::ZERO);
    assert_eq!(platform.window_size(second), vec2(640., 480.));
    assert_eq!(platform.backend().destroyed, vec![0]);
    assert!(platform.main_window().is_none());

    let third = platform.create_window(WindowDesc::new("third", 100, 100));
    assert_ne!(third, first);
    assert_eq!(platform.window_size(first), Vec2::ZERO);
}

#[test]
fn lock_mouse_targets_primary_window() {
    let mut platform = platform([]);
    platform.create_window(WindowDesc::default());
    platform.create_window(WindowDesc::default());
    platform.lock_mouse(true);
    platform.lock_mouse(false);
    assert_eq!(platform.backend().locks, vec![(0, true), (0, false)]);
    assert!(!platform.mouse_locked());
}

#[test]
fn locking_through_invalid_handle_is_a_no_op() {
    let mut platform = platform([vec![
        EventKind::mouse_move(vec2(640., 360.)),
        EventKind::mouse_move(vec2(641., 360.)),
    ]]);
    let window = platform.create_window(WindowDesc::default());
    platform.lock_mouse_on(WindowHandle::invalid(), true);
    assert!(!platform.mouse_locked());
    assert!(platform.backend().locks.is_empty());

    platform.destroy_window(window);
    platform.lock_mouse_on(window, true);
    platform.lock_mouse(true);
    assert!(!platform.mouse_locked());

    platform.update().unwrap();
    assert_eq!(platform.input().mouse_position(), vec2(641., 360.));
    assert_eq!(platform.input().mouse_delta(), vec2(1., 0.));
}

#[test]
fn window_setters_show_up_after_refresh() {
    let mut platform = platform([vec![]]);
    let window = platform.create_window(WindowDesc::new("main", 800, 600));
    assert_eq!(platform.monitor_size(window), vec2(1920., 1080.));

    platform.set_window_size(window, uvec2(1024, 768));
    platform.set_window_position(window, ivec2(-5, 40));
    assert_eq!(platform.window_size(window), vec2(800., 600.));
    platform.update().unwrap();
    assert_eq!(platform.window_size(window), vec2(1024., 768.));
    assert_eq!(platform.framebuffer_size(window), vec2(2048., 1536.));
    assert_eq!(platform.window_position(window), vec2(-5., 40.));

    platform.destroy_window(window);
    assert_eq!(platform.monitor_size(window), Vec2::ZERO);
    platform.set_window_size(window, uvec2(1, 1));
}

#[test]
fn main_window_can_be_reassigned() {
    let mut platform = platform([]);
    let first = platform.create_window(WindowDesc::default());
    let second = platform.create_window(WindowDesc::default());
    assert!(platform.set_main_window(second));
    platform.lock_mouse(true);
    assert_eq!(platform.backend().locks, vec![(1, true)]);

    platform.destroy_window(first);
    assert!(!platform.set_main_window(first));
    assert_eq!(platform.main_window(), Some(second));
}

#[test]
fn stale_handle_operations_are_ignored() {
    let mut platform = platform([]);
    let window = platform.create_window(WindowDesc::default());
    platform.destroy_window(window);
    platform.swap_buffers(window);
    platform.swap_buffers(WindowHandle::invalid());
    assert!(platform.backend().presented.is_empty());
}

#[test]
fn clipboard_goes_through_backend() {
    let mut platform = platform([]);
    assert_eq!(platform.clipboard(), None);
    platform.set_clipboard("hello");
    assert_eq!(platform.clipboard().as_deref(), Some("hello"));
}

#[test]
fn update_walks_back_to_ready() {
    let mut platform = platform([vec![EventKind::Window(WindowAction::Resized(uvec2(
        10, 10,
    )))]]);
    assert_eq!(platform.phase(), FramePhase::Ready);
    platform.update().unwrap();
    assert_eq!(platform.phase(), FramePhase::Ready);
}

#[test]
fn update_after_shutdown_fails() {
    let mut platform = platform([]);
    let window = platform.create_window(WindowDesc::default());
    platform.shutdown();
    assert_eq!(platform.phase(), FramePhase::Shutdown);
    assert!(platform.windows().is_empty());
    assert_eq!(platform.window_size(window), Vec2::ZERO);
    assert!(matches!(platform.update(), Err(PlatformError::ShutDown)));
}

#[test]
fn fixed_delta_drives_frame_time() {
    let config = PlatformConfig::from_toml("[timing]\nfixed_delta = 0.25\n").unwrap();
    let mut platform = Platform::new(ScriptedBackend::default(), config);
    let first = platform.update().unwrap();
    let second = platform.update().unwrap();
    assert_eq!(first.frame, 1);
    assert_eq!(second.frame, 2);
    assert_eq!(second.delta, Duration::from_millis(250));
    assert_eq!(second.elapsed, Duration::from_millis(500));
    assert_eq!(platform.time(), second);
}

struct CloseOnSecondFrame {
    frames: u32,
}

impl Application for CloseOnSecondFrame {
    fn new<B: Backend>(_platform: &mut Platform<B>) -> eyre::Result<Self> {
        Ok(Self { frames: 0 })
    }

    fn frame<B: Backend>(&mut self, _ctx: FrameContext<B>) -> eyre::Result<()> {
        self.frames += 1;
        assert!(self.frames <= 2);
        Ok(())
    }
}

#[test]
fn run_stops_on_close_request() {
    let backend = ScriptedBackend::with_frames([
        vec![],
        vec![EventKind::Window(WindowAction::CloseRequested)],
    ]);
    rose_platform::run::<CloseOnSecondFrame, _>(backend, PlatformConfig::default()).unwrap();
}

#[test]
fn run_fails_without_main_window() {
    let backend = ScriptedBackend {
        fail_create: true,
        ..Default::default()
    };
    assert!(rose_platform::run::<CloseOnSecondFrame, _>(backend, PlatformConfig::default()).is_err());
}

#[test]
fn sleep_shows_up_in_frame_delta() {
    let mut platform = platform([]);
    platform.update().unwrap();
    platform.sleep(Duration::from_millis(2));
    let time = platform.update().unwrap();
    assert!(time.delta >= Duration::from_millis(2));
    assert!(platform.stats().latest_delta() >= 0.002);
}
