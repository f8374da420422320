use trace_browser_protocol::Rect;

/// Pixels of timeline width per thread on pixel backends.
pub const TIMELINE_COLUMN_WIDTH: f64 = 20.0;

/// Where each part of the main window goes.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowLayout {
    /// One list per thread, in registry order, left to right.
    pub lists: Vec<Rect>,
    /// The timeline strip on the right edge.
    pub timeline: Rect,
}

/// Split `area` into per-thread list columns and a timeline strip.
///
/// The timeline is `thread_count * column_width` wide (capped at the
/// whole area) and the lists share the remaining width equally.
pub fn split_window(area: Rect, thread_count: usize, column_width: f64) -> WindowLayout {
    let timeline_width = (thread_count as f64 * column_width).clamp(0.0, area.w.max(0.0));
    let lists_width = (area.w - timeline_width).max(0.0);
    let timeline = Rect::new(area.x + lists_width, area.y, timeline_width, area.h);

    let lists = if thread_count == 0 {
        Vec::new()
    } else {
        let w = lists_width / thread_count as f64;
        (0..thread_count)
            .map(|i| Rect::new(area.x + i as f64 * w, area.y, w, area.h))
            .collect()
    };

    WindowLayout { lists, timeline }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_share_space_left_of_timeline() {
        let layout = split_window(Rect::new(0.0, 10.0, 660.0, 400.0), 3, TIMELINE_COLUMN_WIDTH);
        assert_eq!(layout.timeline, Rect::new(600.0, 10.0, 60.0, 400.0));
        assert_eq!(
            layout.lists,
            vec![
                Rect::new(0.0, 10.0, 200.0, 400.0),
                Rect::new(200.0, 10.0, 200.0, 400.0),
                Rect::new(400.0, 10.0, 200.0, 400.0),
            ]
        );
    }

    #[test]
    fn narrow_window_gives_everything_to_timeline() {
        let layout = split_window(Rect::new(0.0, 0.0, 30.0, 10.0), 4, TIMELINE_COLUMN_WIDTH);
        assert_eq!(layout.timeline.w, 30.0);
        assert!(layout.lists.iter().all(|r| r.w == 0.0));
    }

    #[test]
    fn no_threads() {
        let layout = split_window(Rect::new(0.0, 0.0, 100.0, 10.0), 0, TIMELINE_COLUMN_WIDTH);
        assert!(layout.lists.is_empty());
        assert_eq!(layout.timeline.w, 0.0);
    }
}
