//! The shared viewport: where every thread list starts and how many rows
//! the lists can show.
//!
//! A single [`ScrollController`] owns the [`ViewportState`]. The timeline
//! feeds pointer input into it, list views report their row capacity, and
//! every change is pushed synchronously to subscribers, which re-render
//! from the snapshot they are handed.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Snapshot of the shared viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportState {
    /// Index of the first event the lists start scanning from, in `0..=len`.
    pub scroll_position: usize,
    /// Rows a list view can display. Only drives the timeline overlay; it
    /// never limits `scroll_position`.
    pub window_size: usize,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            scroll_position: 0,
            window_size: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging,
}

/// Which part of the viewport a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportChange {
    ScrollPosition,
    WindowSize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&ViewportState, ViewportChange)>;

/// Map a pointer fraction of the timeline height onto an event index.
///
/// Rounds to the nearest index and clamps to `0..=len`; a non-finite
/// fraction maps to 0.
pub fn position_for_fraction(fraction: f64, len: usize) -> usize {
    if !fraction.is_finite() {
        return 0;
    }
    (fraction * len as f64).round().clamp(0.0, len as f64) as usize
}

/// `y / height`, or 0 when the height cannot be divided by.
pub fn pointer_fraction(y: f64, height: f64) -> f64 {
    if height > 0.0 && height.is_finite() {
        y / height
    } else {
        0.0
    }
}

pub struct ScrollController {
    len: usize,
    state: ViewportState,
    drag: DragState,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl ScrollController {
    /// Controller for a log of `len` events, scrolled to the top.
    pub fn new(len: usize) -> Self {
        Self {
            len,
            state: ViewportState::default(),
            drag: DragState::Idle,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn state(&self) -> ViewportState {
        self.state
    }

    pub fn scroll_position(&self) -> usize {
        self.state.scroll_position
    }

    pub fn window_size(&self) -> usize {
        self.state.window_size
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn is_dragging(&self) -> bool {
        self.drag == DragState::Dragging
    }

    /// Move the viewport, clamping to `0..=len`.
    pub fn set_scroll_position(&mut self, position: i64) {
        let clamped = position.clamp(0, self.len as i64) as usize;
        if clamped == self.state.scroll_position {
            return;
        }
        self.state.scroll_position = clamped;
        tracing::trace!(position = clamped, "scroll position changed");
        self.publish(ViewportChange::ScrollPosition);
    }

    /// Move the viewport by a signed number of events.
    pub fn scroll_by(&mut self, delta: i64) {
        let current = self.state.scroll_position as i64;
        self.set_scroll_position(current.saturating_add(delta));
    }

    /// Record how many rows a list view can show. Values below 1 are
    /// raised to 1.
    pub fn set_window_size(&mut self, rows: usize) {
        let rows = rows.max(1);
        if rows == self.state.window_size {
            return;
        }
        self.state.window_size = rows;
        tracing::debug!(rows, "window size changed");
        self.publish(ViewportChange::WindowSize);
    }

    /// Pointer pressed on the timeline at `y` of a timeline `height` high.
    /// Starts a drag and jumps there immediately.
    pub fn press(&mut self, y: f64, height: f64) {
        if self.drag == DragState::Idle {
            tracing::debug!("timeline drag started");
        }
        self.drag = DragState::Dragging;
        self.jump_to(y, height);
    }

    /// Pointer moved. Ignored unless a drag is in progress.
    pub fn drag(&mut self, y: f64, height: f64) {
        if self.drag == DragState::Dragging {
            self.jump_to(y, height);
        }
    }

    /// Pointer released. Ends the drag without moving the viewport.
    pub fn release(&mut self) {
        if self.drag == DragState::Dragging {
            tracing::debug!(position = self.state.scroll_position, "timeline drag ended");
        }
        self.drag = DragState::Idle;
    }

    fn jump_to(&mut self, y: f64, height: f64) {
        let position = position_for_fraction(pointer_fraction(y, height), self.len);
        self.set_scroll_position(position as i64);
    }

    /// Register a listener called after every viewport change, before the
    /// mutating call returns.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&ViewportState, ViewportChange) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    fn publish(&mut self, change: ViewportChange) {
        let state = self.state;
        for (_, listener) in &mut self.listeners {
            listener(&state, change);
        }
    }
}

impl fmt::Debug for ScrollController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollController")
            .field("len", &self.len)
            .field("state", &self.state)
            .field("drag", &self.drag)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
