use std::cell::Cell;
use std::rc::Rc;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use trace_browser_core::model::{ThreadRegistry, TraceLog};
use trace_browser_core::parsers::Ingested;
use trace_browser_core::scroll::ScrollController;
use trace_browser_core::views::{WindowLayout, WindowStyle, render_window, rows_that_fit, status_line};
use trace_browser_protocol::{self as protocol, RenderCommand, Viewport};

/// Rows moved per mouse wheel notch.
const WHEEL_STEP: i64 = 3;

/// State of the terminal browser between frames.
pub struct App {
    log: TraceLog,
    registry: ThreadRegistry,
    controller: ScrollController,
    style: WindowStyle,
    rejected: usize,
    /// Set by the controller subscription and by resizes; cleared on draw.
    dirty: Rc<Cell<bool>>,
    content: Rect,
    layout: WindowLayout,
    should_quit: bool,
}

impl App {
    pub fn new(ingested: Ingested) -> Self {
        let Ingested { log, rejected } = ingested;
        let registry = ThreadRegistry::build(&log);
        let mut controller = ScrollController::new(log.len());

        let dirty = Rc::new(Cell::new(true));
        let flag = Rc::clone(&dirty);
        controller.subscribe(move |_, _| flag.set(true));

        let style = WindowStyle::terminal();
        let layout = style.layout(protocol::Rect::new(0.0, 0.0, 0.0, 0.0), registry.len());

        Self {
            log,
            registry,
            controller,
            style,
            rejected: rejected.len(),
            dirty,
            content: Rect::default(),
            layout,
            should_quit: false,
        }
    }

    /// Everything above the one-row status line.
    pub fn content_area(frame: Rect) -> Rect {
        Rect::new(frame.x, frame.y, frame.width, frame.height.saturating_sub(1))
    }

    /// Track the terminal size; the list capacity becomes the window size.
    pub fn resize(&mut self, frame: Rect) {
        let content = Self::content_area(frame);
        if content == self.content {
            return;
        }
        self.content = content;
        self.layout = self.style.layout(
            protocol::Rect::new(0.0, 0.0, f64::from(content.width), f64::from(content.height)),
            self.registry.len(),
        );
        self.controller
            .set_window_size(rows_that_fit(f64::from(content.height), &self.style.metrics));
        self.dirty.set(true);
    }

    /// Whether a redraw is due, clearing the flag.
    pub fn take_dirty(&self) -> bool {
        self.dirty.replace(false)
    }

    pub fn mark_dirty(&self) {
        self.dirty.set(true);
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    #[cfg(test)]
    pub fn controller(&self) -> &ScrollController {
        &self.controller
    }

    pub fn commands(&self, content: Rect) -> Vec<RenderCommand> {
        render_window(
            &self.log,
            &self.registry,
            &self.controller.state(),
            &Viewport::new(f64::from(content.width), f64::from(content.height)),
            &self.style,
        )
    }

    pub fn status(&self) -> String {
        let mut line = status_line(&self.log, &self.registry, &self.controller.state());
        if self.rejected > 0 {
            line.push_str(&format!(" | {} lines skipped", self.rejected));
        }
        line
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        let page = self.controller.window_size() as i64;
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => self.controller.scroll_by(-1),
            KeyCode::Down | KeyCode::Char('j') => self.controller.scroll_by(1),
            KeyCode::PageUp => self.controller.scroll_by(-page),
            KeyCode::PageDown | KeyCode::Char(' ') => self.controller.scroll_by(page),
            KeyCode::Home | KeyCode::Char('g') => self.controller.set_scroll_position(0),
            KeyCode::End | KeyCode::Char('G') => {
                self.controller.set_scroll_position(self.log.len() as i64)
            }
            _ => {}
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if self.in_timeline(mouse.column, mouse.row) {
                    let (y, height) = self.timeline_pointer(mouse.row);
                    self.controller.press(y, height);
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                let (y, height) = self.timeline_pointer(mouse.row);
                self.controller.drag(y, height);
            }
            MouseEventKind::Up(MouseButton::Left) => self.controller.release(),
            MouseEventKind::ScrollDown => self.controller.scroll_by(WHEEL_STEP),
            MouseEventKind::ScrollUp => self.controller.scroll_by(-WHEEL_STEP),
            _ => {}
        }
    }

    fn in_timeline(&self, column: u16, row: u16) -> bool {
        let x = f64::from(column) - f64::from(self.content.x);
        let y = f64::from(row) - f64::from(self.content.y);
        self.layout.timeline.contains(protocol::Point::new(x, y))
    }

    /// Pointer offset and extent within the timeline for a terminal row,
    /// measured at the center of the cell.
    fn timeline_pointer(&self, row: u16) -> (f64, f64) {
        let y = f64::from(row) - f64::from(self.content.y) - self.layout.timeline.y;
        (y + 0.5, self.layout.timeline.h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use trace_browser_core::parsers::jsonl::parse_lines;

    fn app(lines: usize) -> App {
        let records: Vec<String> = (0..lines)
            .map(|i| {
                let (thread, event) = if i % 2 == 0 { ("A", "call") } else { ("B", "line") };
                format!(
                    r#"{{"event": "{event}", "thread": "{thread}", "filename": "f.py", "lineno": {i}, "co_name": "f"}}"#
                )
            })
            .collect();
        App::new(parse_lines(
            records.iter().enumerate().map(|(i, line)| (i + 1, line.as_str())),
        ))
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn resize_sets_window_size_from_list_height() {
        let mut app = app(100);
        app.resize(Rect::new(0, 0, 80, 25));
        assert_eq!(app.controller().window_size(), 24);
        assert!(app.take_dirty());
        assert!(!app.take_dirty());
    }

    #[test]
    fn dragging_the_timeline_scrolls() {
        let mut app = app(100);
        app.resize(Rect::new(0, 0, 80, 12));
        // Two threads, two cells each: the timeline is the last four columns.
        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 78, 5));
        assert!(app.controller().is_dragging());
        assert_eq!(app.controller().scroll_position(), 50);

        // Cell centers: row 10 of 11 is at 10.5 / 11 of the log.
        app.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 78, 10));
        assert_eq!(app.controller().scroll_position(), 95);
        app.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 78, 0));
        assert_eq!(app.controller().scroll_position(), 5);

        // Drags keep tracking once the pointer leaves the timeline.
        app.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 10, 11));
        assert_eq!(app.controller().scroll_position(), 100);

        app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 10, 10));
        assert!(!app.controller().is_dragging());
    }

    #[test]
    fn presses_outside_the_timeline_are_ignored() {
        let mut app = app(100);
        app.resize(Rect::new(0, 0, 80, 11));
        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 3, 5));
        assert!(!app.controller().is_dragging());
        assert_eq!(app.controller().scroll_position(), 0);
    }

    #[test]
    fn keys_scroll_and_quit() {
        let mut app = app(100);
        app.resize(Rect::new(0, 0, 80, 11));
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.controller().scroll_position(), 1);
        app.handle_key(key(KeyCode::PageDown));
        assert_eq!(app.controller().scroll_position(), 11);
        app.handle_key(key(KeyCode::End));
        assert_eq!(app.controller().scroll_position(), 100);
        app.handle_key(key(KeyCode::Home));
        assert_eq!(app.controller().scroll_position(), 0);
        app.handle_key(key(KeyCode::Up));
        assert_eq!(app.controller().scroll_position(), 0);
        assert!(!app.should_quit());
        app.handle_key(key(KeyCode::Char('q')));
        assert!(app.should_quit());
    }

    #[test]
    fn status_mentions_skipped_lines() {
        let app = App::new(parse_lines([
            (1, "not json"),
            (2, r#"{"event": "call", "thread": 1, "filename": "a.py", "lineno": 1}"#),
        ]));
        assert!(app.status().starts_with("1 events | 1 threads"));
        assert!(app.status().ends_with("| 1 lines skipped"));
    }
}
