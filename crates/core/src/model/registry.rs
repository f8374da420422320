use std::collections::HashMap;
use std::collections::hash_map::Entry;

use thiserror::Error;
use trace_browser_protocol::Hsl;

use super::event::ThreadId;
use super::palette;
use super::trace_log::TraceLog;

/// A lookup for a thread that never occurs in the loaded log.
///
/// The registry is built from the same log every view reads, so this
/// signals a programming error rather than bad input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("thread {0} does not occur in the trace log")]
pub struct UnknownThreadError(pub ThreadId);

/// Distinct threads of a log in first-seen order, each with a stable
/// column index and display color.
#[derive(Debug, Clone, Default)]
pub struct ThreadRegistry {
    threads: Vec<ThreadId>,
    index: HashMap<ThreadId, usize>,
    colors: Vec<Hsl>,
}

impl ThreadRegistry {
    pub fn build(log: &TraceLog) -> Self {
        let mut threads = Vec::new();
        let mut index = HashMap::new();
        for event in log {
            if let Entry::Vacant(slot) = index.entry(event.thread.clone()) {
                slot.insert(threads.len());
                threads.push(event.thread.clone());
            }
        }
        let colors = palette::palette(threads.len());
        Self {
            threads,
            index,
            colors,
        }
    }

    /// Number of distinct threads.
    pub fn len(&self) -> usize {
        self.threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }

    /// Thread ids ordered by first occurrence.
    pub fn threads(&self) -> &[ThreadId] {
        &self.threads
    }

    pub fn thread_at(&self, index: usize) -> Option<&ThreadId> {
        self.threads.get(index)
    }

    pub fn index_of(&self, thread: &ThreadId) -> Result<usize, UnknownThreadError> {
        self.index
            .get(thread)
            .copied()
            .ok_or_else(|| UnknownThreadError(thread.clone()))
    }

    pub fn color_of(&self, thread: &ThreadId) -> Result<Hsl, UnknownThreadError> {
        let index = self.index_of(thread)?;
        Ok(self.color_at(index))
    }

    /// Color for a column index. Indices past the generated palette fall
    /// back to the generator itself.
    pub fn color_at(&self, index: usize) -> Hsl {
        self.colors
            .get(index)
            .copied()
            .unwrap_or_else(|| palette::thread_color(index))
    }

    /// The generated palette; never shorter than two entries.
    pub fn colors(&self) -> &[Hsl] {
        &self.colors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EventKind, TraceEvent};
    use crate::model::palette::{HUE_STEP, THREAD_LIGHTNESS, THREAD_SATURATION};
    use serde_json::json;

    fn log_of(threads: &[&str]) -> TraceLog {
        TraceLog::new(
            threads
                .iter()
                .map(|t| TraceEvent {
                    kind: EventKind::Line,
                    thread: ThreadId::from_json(&json!(t)),
                    filename: "x.py".into(),
                    line_number: 3,
                    function_name: None,
                    depth: 0,
                    sequence_index: 0,
                })
                .collect(),
        )
    }

    fn tid(s: &str) -> ThreadId {
        ThreadId::from_json(&json!(s))
    }

    #[test]
    fn indices_follow_first_occurrence() {
        let registry = ThreadRegistry::build(&log_of(&["A", "B", "A", "C"]));
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.index_of(&tid("A")), Ok(0));
        assert_eq!(registry.index_of(&tid("B")), Ok(1));
        assert_eq!(registry.index_of(&tid("C")), Ok(2));
        assert_eq!(registry.thread_at(2), Some(&tid("C")));
    }

    #[test]
    fn colors_are_distinct_and_golden_spaced() {
        let registry = ThreadRegistry::build(&log_of(&["A", "B", "A", "C"]));
        let colors = registry.colors();
        assert_eq!(colors.len(), 3);
        assert_eq!(colors[0].h, 0.0);
        for pair in colors.windows(2) {
            assert_eq!(pair[0].s, THREAD_SATURATION);
            assert_eq!(pair[0].l, THREAD_LIGHTNESS);
            let step = (pair[1].h - pair[0].h).rem_euclid(1.0);
            assert!((step - HUE_STEP).abs() < 1e-9);
        }
        let hex: std::collections::HashSet<_> =
            colors.iter().map(|c| c.to_color().to_hex()).collect();
        assert_eq!(hex.len(), 3);
    }

    #[test]
    fn color_lookup_matches_index() {
        let registry = ThreadRegistry::build(&log_of(&["A", "B"]));
        assert_eq!(registry.color_of(&tid("B")), Ok(registry.colors()[1]));
    }

    #[test]
    fn unknown_thread_is_an_error() {
        let registry = ThreadRegistry::build(&log_of(&["A"]));
        assert_eq!(
            registry.index_of(&tid("Z")),
            Err(UnknownThreadError(tid("Z")))
        );
        assert!(registry.color_of(&tid("Z")).is_err());
    }

    #[test]
    fn empty_log_still_has_two_colors() {
        let registry = ThreadRegistry::build(&TraceLog::default());
        assert!(registry.is_empty());
        assert_eq!(registry.colors().len(), 2);
    }
}
