use std::borrow::Cow;

use bitflags::bitflags;
use generational_arena::{Arena, Index};
use glam::{vec2, Vec2};

bitflags! {
    #[derive(Default)]
    pub struct WindowFlags: u8 {
        const NO_RESIZE = 1 << 0;
        const FULLSCREEN = 1 << 1;
        const INVISIBLE = 1 << 2;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowDesc {
    pub title: Cow<'static, str>,
    pub width: u32,
    pub height: u32,
    pub flags: WindowFlags,
    pub num_samples: u32,
    pub monitor_index: usize,
}

impl Default for WindowDesc {
    fn default() -> Self {
        Self {
            title: Cow::Borrowed("rose"),
            width: 1600,
            height: 900,
            flags: WindowFlags::empty(),
            num_samples: 0,
            monitor_index: 0,
        }
    }
}

impl WindowDesc {
    pub fn new(title: impl Into<Cow<'static, str>>, width: u32, height: u32) -> Self {
        Self {
            title: title.into(),
            width,
            height,
            ..Default::default()
        }
    }

    pub fn with_flags(mut self, flags: WindowFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn logical_size(&self) -> Vec2 {
        vec2(self.width as _, self.height as _)
    }
}

/// Geometry as last reported by the backend.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct WindowGeometry {
    pub size: Vec2,
    pub position: Vec2,
    pub framebuffer_size: Vec2,
}

/// Stable reference to a slot of the [`WindowTable`]. Stale handles (destroyed windows)
/// never alias a newer window in the same slot.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct WindowHandle(Index);

impl WindowHandle {
    /// Returned when the backend could not create a window. Never resolves to a record.
    pub fn invalid() -> Self {
        Self(Index::from_raw_parts(usize::MAX, u64::MAX))
    }

    pub fn slot(&self) -> usize {
        self.0.into_raw_parts().0
    }

    pub fn is_invalid(&self) -> bool {
        *self == Self::invalid()
    }
}

#[derive(Debug, Clone)]
pub struct WindowRecord<W> {
    /// Native handle, owned by the backend.
    pub native: W,
    pub desc: WindowDesc,
    pub geometry: WindowGeometry,
}

#[derive(Debug, Clone)]
pub struct WindowTable<W> {
    slots: Arena<WindowRecord<W>>,
    primary: Option<WindowHandle>,
}

impl<W> Default for WindowTable<W> {
    fn default() -> Self {
        Self {
            slots: Arena::new(),
            primary: None,
        }
    }
}

impl<W> WindowTable<W> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record. The first window inserted into an empty table becomes primary.
    pub fn insert(&mut self, record: WindowRecord<W>) -> WindowHandle {
        let handle = WindowHandle(self.slots.insert(record));
        if self.primary.is_none() {
            tracing::debug!(slot = handle.slot(), "Designating primary window");
            self.primary = Some(handle);
        }
        handle
    }

    /// Invalidate the slot and hand back its record.
    pub fn remove(&mut self, handle: WindowHandle) -> Option<WindowRecord<W>> {
        let record = self.slots.remove(handle.0)?;
        if self.primary == Some(handle) {
            self.primary = None;
        }
        Some(record)
    }

    pub fn primary(&self) -> Option<WindowHandle> {
        self.primary
    }

    /// Move the primary designation to another live window.
    pub fn set_primary(&mut self, handle: WindowHandle) -> bool {
        if self.slots.contains(handle.0) {
            self.primary = Some(handle);
            true
        } else {
            false
        }
    }

    pub fn get(&self, handle: WindowHandle) -> Option<&WindowRecord<W>> {
        self.slots.get(handle.0)
    }

    pub fn contains(&self, handle: WindowHandle) -> bool {
        self.slots.contains(handle.0)
    }

    pub fn iter(&self) -> impl '_ + Iterator<Item = (WindowHandle, &WindowRecord<W>)> {
        self.slots.iter().map(|(idx, rec)| (WindowHandle(idx), rec))
    }

    pub fn iter_mut(&mut self) -> impl '_ + Iterator<Item = (WindowHandle, &mut WindowRecord<W>)> {
        self.slots.iter_mut().map(|(idx, rec)| (WindowHandle(idx), rec))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn geometry(&self, handle: WindowHandle) -> WindowGeometry {
        self.get(handle).map(|rec| rec.geometry).unwrap_or_default()
    }

    pub fn window_size(&self, handle: WindowHandle) -> Vec2 {
        self.geometry(handle).size
    }

    pub fn window_position(&self, handle: WindowHandle) -> Vec2 {
        self.geometry(handle).position
    }

    pub fn framebuffer_size(&self, handle: WindowHandle) -> Vec2 {
        self.geometry(handle).framebuffer_size
    }
}
