use std::collections::HashMap;
use std::ops::Index;

use serde::Serialize;

use super::event::{ThreadId, TraceEvent};

/// The loaded, depth-annotated trace, shared read-only by every view.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TraceLog {
    events: Vec<TraceEvent>,
}

impl TraceLog {
    /// Build a log from events in recorded order.
    ///
    /// Assigns `sequence_index` and computes `depth` with one forward pass
    /// per thread. A return first shallows the thread (never below zero),
    /// then every event takes the thread's current depth, then a call
    /// deepens the thread. A call and its matching return share a depth.
    pub fn new(mut events: Vec<TraceEvent>) -> Self {
        let mut depths: HashMap<ThreadId, u32> = HashMap::new();
        for (index, event) in events.iter_mut().enumerate() {
            event.sequence_index = index;
            let depth = depths.entry(event.thread.clone()).or_insert(0);
            if event.kind.is_return() {
                *depth = depth.saturating_sub(1);
            }
            event.depth = *depth;
            if event.kind.is_call() {
                *depth += 1;
            }
        }
        Self { events }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TraceEvent> {
        self.events.get(index)
    }

    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    /// Events from `start` to the end; empty when `start` is past the end.
    pub fn events_from(&self, start: usize) -> &[TraceEvent] {
        self.events.get(start..).unwrap_or(&[])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TraceEvent> {
        self.events.iter()
    }
}

impl Index<usize> for TraceLog {
    type Output = TraceEvent;

    fn index(&self, index: usize) -> &TraceEvent {
        &self.events[index]
    }
}

impl<'a> IntoIterator for &'a TraceLog {
    type Item = &'a TraceEvent;
    type IntoIter = std::slice::Iter<'a, TraceEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
