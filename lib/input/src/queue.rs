//! Per-frame event storage with two read modes.
//!
//! Ordered replay walks the queue front to back through a caller-held [`EventCursor`] and
//! leaves it untouched. Consumption pops from the back, so it yields events newest first.
//! Both modes share the same storage: a pop is visible to every replay cursor.

use crate::event::{Event, EventKind};

/// Read position for ordered replay. Each consumer keeps its own.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct EventCursor {
    idx: usize,
}

impl EventCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(idx: usize) -> Self {
        Self { idx }
    }

    pub fn position(&self) -> usize {
        self.idx
    }
}

#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: Vec<Event>,
    next_seq: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event and return the sequence index it was given.
    pub fn push(&mut self, kind: EventKind) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.push(Event { seq, kind });
        seq
    }

    /// Read one event.
    ///
    /// With `consume == false` this returns the event under `cursor` and advances it
    /// (front to back). With `consume == true` the cursor is ignored and the newest event
    /// is removed and returned (back to front).
    pub fn poll(&mut self, cursor: &mut EventCursor, consume: bool) -> Option<Event> {
        if consume {
            self.pop()
        } else {
            self.next(cursor).cloned()
        }
    }

    /// Non-consuming read at `cursor`, advancing it.
    pub fn next(&self, cursor: &mut EventCursor) -> Option<&Event> {
        let event = self.events.get(cursor.idx)?;
        cursor.idx += 1;
        Some(event)
    }

    /// Remove the most recently pushed event.
    pub fn pop(&mut self) -> Option<Event> {
        self.events.pop()
    }

    /// Events from `from` to the current end, in push order.
    pub fn replay(&self, from: EventCursor) -> impl '_ + Iterator<Item = &Event> {
        self.events.iter().skip(from.idx)
    }

    pub fn iter(&self) -> impl '_ + Iterator<Item = &Event> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drop every stored event. Sequence numbering continues.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Keep only the `len` oldest events.
    pub fn truncate(&mut self, len: usize) {
        self.events.truncate(len);
    }
}
