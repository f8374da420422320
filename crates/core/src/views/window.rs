use trace_browser_protocol::{Point, Rect, RenderCommand, Viewport};

use super::layout::{self, WindowLayout, split_window};
use super::thread_list::{ListMetrics, render_thread_list};
use super::timeline::render_timeline;
use crate::model::{ThreadRegistry, TraceLog};
use crate::scroll::ViewportState;

/// Units-dependent sizing for a whole window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStyle {
    pub metrics: ListMetrics,
    /// Timeline width per thread.
    pub timeline_column_width: f64,
}

impl Default for WindowStyle {
    fn default() -> Self {
        Self {
            metrics: ListMetrics::default(),
            timeline_column_width: layout::TIMELINE_COLUMN_WIDTH,
        }
    }
}

impl WindowStyle {
    pub fn terminal() -> Self {
        Self {
            metrics: ListMetrics::terminal(),
            timeline_column_width: 2.0,
        }
    }

    pub fn layout(&self, area: Rect, thread_count: usize) -> WindowLayout {
        split_window(area, thread_count, self.timeline_column_width)
    }
}

fn translated(rect: Rect, commands: Vec<RenderCommand>) -> Vec<RenderCommand> {
    if commands.is_empty() {
        return commands;
    }
    let mut out = Vec::with_capacity(commands.len() + 2);
    out.push(RenderCommand::PushTransform {
        translate: Point::new(rect.x, rect.y),
        scale: Point::new(1.0, 1.0),
    });
    out.extend(commands);
    out.push(RenderCommand::PopTransform);
    out
}

/// Render every thread list side by side with the timeline on the right,
/// all positioned inside `viewport`.
pub fn render_window(
    log: &TraceLog,
    registry: &ThreadRegistry,
    state: &ViewportState,
    viewport: &Viewport,
    style: &WindowStyle,
) -> Vec<RenderCommand> {
    let layout = style.layout(viewport.rect(), registry.len());
    let mut commands = Vec::new();

    for (index, (thread, rect)) in registry.threads().iter().zip(&layout.lists).enumerate() {
        let list = render_thread_list(
            log,
            thread,
            registry.color_at(index).to_color(),
            state.scroll_position,
            &Viewport::new(rect.w, rect.h),
            &style.metrics,
        );
        commands.extend(translated(*rect, list));
    }

    let timeline = render_timeline(
        log,
        registry,
        state,
        &Viewport::new(layout.timeline.w, layout.timeline.h),
    );
    commands.extend(translated(layout.timeline, timeline));
    commands
}

/// One-line summary of the session and the viewport.
pub fn status_line(log: &TraceLog, registry: &ThreadRegistry, state: &ViewportState) -> String {
    format!(
        "{} events | {} threads | position {}/{} | {} rows",
        log.len(),
        registry.len(),
        state.scroll_position,
        log.len(),
        state.window_size,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EventKind, ThreadId, TraceEvent};
    use serde_json::json;

    fn two_thread_log() -> TraceLog {
        let ev = |thread: &str, kind: &str| TraceEvent {
            kind: EventKind::parse(kind),
            thread: ThreadId::from_json(&json!(thread)),
            filename: "w.py".into(),
            line_number: 1,
            function_name: Some("f".into()),
            depth: 0,
            sequence_index: 0,
        };
        TraceLog::new(vec![
            ev("T1", "call"),
            ev("T2", "call"),
            ev("T1", "return"),
            ev("T2", "return"),
        ])
    }

    #[test]
    fn lists_are_translated_into_their_columns() {
        let log = two_thread_log();
        let registry = ThreadRegistry::build(&log);
        let cmds = render_window(
            &log,
            &registry,
            &ViewportState::default(),
            &Viewport::new(440.0, 100.0),
            &WindowStyle::default(),
        );
        let translations: Vec<Point> = cmds
            .iter()
            .filter_map(|c| match c {
                RenderCommand::PushTransform { translate, .. } => Some(*translate),
                _ => None,
            })
            .collect();
        assert_eq!(
            translations,
            vec![
                Point::new(0.0, 0.0),
                Point::new(200.0, 0.0),
                Point::new(400.0, 0.0),
            ]
        );
        let pushes = translations.len();
        let pops = cmds
            .iter()
            .filter(|c| matches!(c, RenderCommand::PopTransform))
            .count();
        assert_eq!(pushes, pops);
    }

    #[test]
    fn status_line_reports_position() {
        let log = two_thread_log();
        let registry = ThreadRegistry::build(&log);
        let state = ViewportState {
            scroll_position: 3,
            window_size: 5,
        };
        assert_eq!(
            status_line(&log, &registry, &state),
            "4 events | 2 threads | position 3/4 | 5 rows"
        );
    }
}
