use serde::{Deserialize, Serialize};
use trace_browser_protocol::{
    Color, Fill, Point, Rect, RenderCommand, SharedStr, TextAlign, ThemeToken, Viewport,
};

use crate::model::{ThreadId, TraceEvent, TraceLog, format_event};

/// Row geometry of a thread list, in the backend's units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ListMetrics {
    /// Height of one line of text.
    pub line_height: f64,
    /// Space above and below each line, and left of the text.
    pub padding: f64,
    /// Horizontal offset per call depth level.
    pub indent: f64,
    pub font_size: f64,
}

impl Default for ListMetrics {
    fn default() -> Self {
        Self {
            line_height: 14.0,
            padding: 2.0,
            indent: 10.0,
            font_size: 12.0,
        }
    }
}

impl ListMetrics {
    /// One text row per terminal cell, one cell of indent per depth level.
    pub fn terminal() -> Self {
        Self {
            line_height: 1.0,
            padding: 0.0,
            indent: 1.0,
            font_size: 1.0,
        }
    }

    pub fn row_height(&self) -> f64 {
        self.line_height + 2.0 * self.padding
    }
}

/// Rows a list of `height` can show, counting a partially visible last row.
pub fn rows_that_fit(height: f64, metrics: &ListMetrics) -> usize {
    let row_height = metrics.row_height();
    if !(height > 0.0 && row_height > 0.0) {
        return 0;
    }
    (height / row_height).ceil() as usize
}

struct VisibleRow<'a> {
    /// Position among the rows of this list.
    row: usize,
    top: f64,
    event: &'a TraceEvent,
}

/// Rows of `thread` visible when the list starts scanning at `start`.
///
/// The scan walks every event from `start` but only events of `thread`
/// take up a row, so a thread that is sparse in the log covers more of
/// the log per screen than a busy one.
fn visible_rows<'a>(
    log: &'a TraceLog,
    thread: &'a ThreadId,
    start: usize,
    height: f64,
    row_height: f64,
) -> impl Iterator<Item = VisibleRow<'a>> + 'a {
    log.events_from(start)
        .iter()
        .filter(move |event| event.thread == *thread)
        .enumerate()
        .map(move |(row, event)| VisibleRow {
            row,
            top: row as f64 * row_height,
            event,
        })
        .take_while(move |r| row_height > 0.0 && r.top < height)
}

/// Render the events of one thread starting at `scroll_position`.
///
/// Rows are indented by call depth and every other row is striped. Rows
/// stop as soon as the next row would start at or below the bottom edge.
pub fn render_thread_list(
    log: &TraceLog,
    thread: &ThreadId,
    color: Color,
    scroll_position: usize,
    viewport: &Viewport,
    metrics: &ListMetrics,
) -> Vec<RenderCommand> {
    if viewport.is_empty() {
        return Vec::new();
    }

    let row_height = metrics.row_height();
    let mut commands = Vec::with_capacity(rows_that_fit(viewport.height, metrics) * 2 + 6);
    commands.push(RenderCommand::BeginGroup {
        id: SharedStr::from(format!("thread-list:{}", thread.key())),
        label: Some(SharedStr::from(format!("Thread {thread}"))),
    });
    commands.push(RenderCommand::SetClip {
        rect: viewport.rect(),
    });
    commands.push(RenderCommand::DrawRect {
        rect: viewport.rect(),
        fill: Fill::Solid(color),
    });

    for row in visible_rows(log, thread, scroll_position, viewport.height, row_height) {
        if row.row % 2 == 1 {
            commands.push(RenderCommand::DrawRect {
                rect: Rect::new(0.0, row.top, viewport.width, row_height),
                fill: ThemeToken::RowStripe.into(),
            });
        }
        let x = metrics.padding + f64::from(row.event.depth) * metrics.indent;
        commands.push(RenderCommand::DrawText {
            position: Point::new(x, row.top + row_height / 2.0),
            text: format_event(row.event).into(),
            color: ThemeToken::TextOnThread.into(),
            font_size: metrics.font_size,
            align: TextAlign::Left,
        });
    }

    commands.push(RenderCommand::ClearClip);
    commands.push(RenderCommand::EndGroup);
    commands
}

/// Index of the event shown at `y` in a list of `height`, if any.
pub fn row_at(
    log: &TraceLog,
    thread: &ThreadId,
    scroll_position: usize,
    y: f64,
    height: f64,
    metrics: &ListMetrics,
) -> Option<usize> {
    let row_height = metrics.row_height();
    if !(y >= 0.0 && y < height) {
        return None;
    }
    visible_rows(log, thread, scroll_position, height, row_height)
        .find(|r| y < r.top + row_height)
        .map(|r| r.event.sequence_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EventKind;
    use serde_json::json;

    fn ev(thread: &str, kind: &str, name: &str) -> TraceEvent {
        TraceEvent {
            kind: EventKind::parse(kind),
            thread: ThreadId::from_json(&json!(thread)),
            filename: "job.py".into(),
            line_number: 7,
            function_name: Some(name.into()),
            depth: 0,
            sequence_index: 0,
        }
    }

    fn tid(s: &str) -> ThreadId {
        ThreadId::from_json(&json!(s))
    }

    fn texts(commands: &[RenderCommand]) -> Vec<(Point, String)> {
        commands
            .iter()
            .filter_map(|c| match c {
                RenderCommand::DrawText { position, text, .. } => {
                    Some((*position, text.to_string()))
                }
                _ => None,
            })
            .collect()
    }

    fn stripes(commands: &[RenderCommand]) -> Vec<Rect> {
        commands
            .iter()
            .filter_map(|c| match c {
                RenderCommand::DrawRect {
                    rect,
                    fill: Fill::Theme(ThemeToken::RowStripe),
                    ..
                } => Some(*rect),
                _ => None,
            })
            .collect()
    }

    const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    #[test]
    fn rows_only_for_target_thread_indented_by_depth() {
        let log = TraceLog::new(vec![
            ev("T1", "call", "outer"),
            ev("T2", "call", "other"),
            ev("T1", "call", "inner"),
            ev("T1", "return", "inner"),
        ]);
        let metrics = ListMetrics::default();
        let cmds = render_thread_list(
            &log,
            &tid("T1"),
            WHITE,
            0,
            &Viewport::new(300.0, 200.0),
            &metrics,
        );
        let rows = texts(&cmds);
        assert_eq!(
            rows.iter().map(|(_, t)| t.as_str()).collect::<Vec<_>>(),
            vec!["outer() job.py:7", "inner() job.py:7", "[return] job.py:7"]
        );
        // Row height 18: centers at 9, 27, 45. Depth 1 indents by 10.
        assert_eq!(rows[0].0, Point::new(2.0, 9.0));
        assert_eq!(rows[1].0, Point::new(12.0, 27.0));
        assert_eq!(rows[2].0, Point::new(12.0, 45.0));
    }

    #[test]
    fn odd_rows_are_striped() {
        let log = TraceLog::new((0..5).map(|_| ev("T", "line", "f")).collect());
        let metrics = ListMetrics::default();
        let cmds = render_thread_list(
            &log,
            &tid("T"),
            WHITE,
            0,
            &Viewport::new(100.0, 500.0),
            &metrics,
        );
        assert_eq!(
            stripes(&cmds),
            vec![
                Rect::new(0.0, 18.0, 100.0, 18.0),
                Rect::new(0.0, 54.0, 100.0, 18.0),
            ]
        );
    }

    #[test]
    fn starts_at_scroll_position() {
        let log = TraceLog::new(vec![
            ev("T", "call", "a"),
            ev("T", "call", "b"),
            ev("T", "call", "c"),
        ]);
        let cmds = render_thread_list(
            &log,
            &tid("T"),
            WHITE,
            2,
            &Viewport::new(100.0, 100.0),
            &ListMetrics::default(),
        );
        let rows = texts(&cmds);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].1, "c() job.py:7");

        let past_end = render_thread_list(
            &log,
            &tid("T"),
            WHITE,
            3,
            &Viewport::new(100.0, 100.0),
            &ListMetrics::default(),
        );
        assert!(texts(&past_end).is_empty());
    }

    #[test]
    fn never_emits_rows_below_bottom() {
        let log = TraceLog::new((0..200).map(|_| ev("T", "line", "f")).collect());
        let metrics = ListMetrics::default();
        for height in [1.0, 17.0, 18.0, 19.0, 100.0, 333.3] {
            let cmds = render_thread_list(
                &log,
                &tid("T"),
                WHITE,
                0,
                &Viewport::new(50.0, height),
                &metrics,
            );
            let rows = texts(&cmds);
            let bound = (height / metrics.row_height()).ceil() as usize + 1;
            assert!(rows.len() <= bound, "height {height}: {} rows", rows.len());
            assert_eq!(rows.len(), rows_that_fit(height, &metrics));
            for (pos, _) in rows {
                let top = pos.y - metrics.row_height() / 2.0;
                assert!(top < height);
            }
        }
    }

    #[test]
    fn zero_height_renders_nothing() {
        let log = TraceLog::new(vec![ev("T", "line", "f")]);
        let cmds = render_thread_list(
            &log,
            &tid("T"),
            WHITE,
            0,
            &Viewport::new(50.0, 0.0),
            &ListMetrics::default(),
        );
        assert!(cmds.is_empty());
    }

    #[test]
    fn rows_that_fit_rounds_up() {
        let m = ListMetrics::default();
        assert_eq!(rows_that_fit(0.0, &m), 0);
        assert_eq!(rows_that_fit(18.0, &m), 1);
        assert_eq!(rows_that_fit(19.0, &m), 2);
        assert_eq!(rows_that_fit(24.0, &ListMetrics::terminal()), 24);
    }

    #[test]
    fn row_at_finds_event_under_pointer() {
        let log = TraceLog::new(vec![
            ev("A", "call", "a0"),
            ev("B", "call", "b0"),
            ev("A", "call", "a1"),
        ]);
        let m = ListMetrics::default();
        assert_eq!(row_at(&log, &tid("A"), 0, 5.0, 100.0, &m), Some(0));
        assert_eq!(row_at(&log, &tid("A"), 0, 20.0, 100.0, &m), Some(2));
        assert_eq!(row_at(&log, &tid("A"), 0, 40.0, 100.0, &m), None);
        assert_eq!(row_at(&log, &tid("B"), 0, 5.0, 100.0, &m), Some(1));
        assert_eq!(row_at(&log, &tid("A"), 0, -1.0, 100.0, &m), None);
    }
}
