use std::path::Path;

use eyre::Result;
use glam::{uvec2, Vec2};

use input::{EventKind, KeyCode, MouseButton, WindowAction, MAX_TOUCH};
use rose_platform::prelude::*;
use rose_platform::tracing_hook;

const DEFAULT_CONFIG: &str = "input-viewer.toml";

struct InputViewer {
    cursor: CursorShape,
    last_report: f32,
}

impl Application for InputViewer {
    fn window_desc(desc: WindowDesc) -> WindowDesc {
        WindowDesc {
            title: "Input viewer".into(),
            ..desc
        }
    }

    fn new<B: Backend>(platform: &mut Platform<B>) -> Result<Self> {
        if let Some(window) = platform.main_window() {
            tracing::info!(
                size = %platform.window_size(window),
                framebuffer = %platform.framebuffer_size(window),
                "Main window ready"
            );
        }
        Ok(Self {
            cursor: CursorShape::Arrow,
            last_report: 0.,
        })
    }

    fn frame<B: Backend>(&mut self, mut ctx: FrameContext<B>) -> Result<()> {
        for event in ctx.platform.frame_events() {
            match &event.kind {
                EventKind::Key(key) if key.code.is_modifier() => {
                    tracing::debug!(seq = event.seq, code = ?key.code, action = ?key.action, "Modifier")
                }
                EventKind::Key(key) => tracing::info!(
                    seq = event.seq,
                    code = ?key.code,
                    action = ?key.action,
                    modifiers = ?key.modifiers,
                    "Key"
                ),
                EventKind::Text(c) => tracing::debug!(seq = event.seq, %c, "Text"),
                EventKind::Window(WindowAction::FileDropped(path)) => {
                    tracing::info!(path = %path.display(), "File dropped")
                }
                EventKind::Window(action) => tracing::debug!(seq = event.seq, ?action, "Window"),
                EventKind::Mouse(_) | EventKind::Touch(_) => {}
            }
        }

        let input = ctx.input();
        if input.key_pressed(KeyCode::Escape) {
            ctx.quit();
            return Ok(());
        }
        for button in [MouseButton::Left, MouseButton::Right, MouseButton::Middle] {
            if input.mouse_pressed(button) {
                tracing::info!(?button, position = %input.mouse_position(), "Mouse pressed");
            }
        }
        if input.mouse_wheel() != Vec2::ZERO {
            tracing::info!(wheel = %input.mouse_wheel(), "Mouse wheel");
        }
        if input.mouse_locked() && input.mouse_moved() {
            tracing::debug!(delta = %input.mouse_delta(), "Locked mouse motion");
        }
        for id in 0..MAX_TOUCH {
            if input.touch_down(id) && !input.touch.was_down(id) {
                tracing::info!(id, position = %input.touch_position(id), "Touch started");
            }
            if input.touch_released(id) {
                tracing::info!(id, "Touch ended");
            }
        }

        let toggle_lock = input.key_pressed(KeyCode::L);
        let cycle_cursor = input.key_pressed(KeyCode::C);
        let copy = input.key_pressed(KeyCode::Y);
        let reset_size = input.key_pressed(KeyCode::R);
        if toggle_lock {
            let locked = !ctx.platform.mouse_locked();
            ctx.platform.lock_mouse(locked);
            tracing::info!(locked, "Mouse lock");
        }
        if cycle_cursor {
            self.cursor = next_cursor(self.cursor);
            if let Some(window) = ctx.platform.main_window() {
                ctx.platform.set_cursor(window, self.cursor);
            }
        }
        if reset_size {
            if let Some(window) = ctx.platform.main_window() {
                tracing::info!(monitor = %ctx.platform.monitor_size(window), "Resetting window size");
                ctx.platform.set_window_size(window, uvec2(1280, 720));
            }
        }
        if copy {
            let position = ctx.platform.input().mouse_position();
            ctx.platform.set_clipboard(&format!("{} {}", position.x, position.y));
            tracing::info!(clipboard = ?ctx.platform.clipboard(), "Copied mouse position");
        }

        self.last_report += ctx.time.delta_secs();
        if self.last_report > 5. {
            self.last_report = 0.;
            let stats = ctx.platform.stats();
            tracing::info!(
                fps = stats.fps_average(),
                last_delta = stats.latest_delta(),
                p99_us = stats.percentile_micros(99),
                queued = ctx.platform.events().len(),
                "Frame stats"
            );
        }
        Ok(())
    }

    fn shutdown<B: Backend>(&mut self, platform: &mut Platform<B>) {
        tracing::info!(frames = platform.time().frame, "Shutting down");
    }
}

fn next_cursor(cursor: CursorShape) -> CursorShape {
    match cursor {
        CursorShape::Arrow => CursorShape::IBeam,
        CursorShape::IBeam => CursorShape::Hand,
        CursorShape::Hand => CursorShape::SizeAll,
        CursorShape::SizeAll => CursorShape::No,
        _ => CursorShape::Arrow,
    }
}

fn main() -> Result<()> {
    let path = std::env::args().nth(1);
    let config = match path.as_deref() {
        Some(path) => PlatformConfig::load(path)?,
        None if Path::new(DEFAULT_CONFIG).exists() => PlatformConfig::load(DEFAULT_CONFIG)?,
        None => PlatformConfig::default(),
    };
    tracing_hook::enable(&config.log)?;
    rose_platform::run::<InputViewer, _>(WinitBackend::new(), config)
}
