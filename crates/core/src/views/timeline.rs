use trace_browser_protocol::{Fill, Point, Rect, RenderCommand, ThemeToken, Viewport};

use crate::model::{ThreadRegistry, TraceLog};
use crate::scroll::ViewportState;

const TICK_WIDTH: f64 = 1.0;

/// Render the whole log compressed into the viewport height.
///
/// Each thread gets an equal-width column and each event an equal-height
/// row; an event is a thin vertical tick in its thread's color at the
/// center of its column. The current viewport is drawn on top as a marker
/// line at the scroll position and a translucent band `window_size` rows
/// tall.
pub fn render_timeline(
    log: &TraceLog,
    registry: &ThreadRegistry,
    state: &ViewportState,
    viewport: &Viewport,
) -> Vec<RenderCommand> {
    if log.is_empty() || registry.is_empty() || viewport.is_empty() {
        return Vec::new();
    }

    let len = log.len() as f64;
    let column_width = viewport.width / registry.len() as f64;
    let row_height = viewport.height / len;

    let mut commands = Vec::with_capacity(log.len() + 6);
    commands.push(RenderCommand::BeginGroup {
        id: "timeline".into(),
        label: Some("Timeline".into()),
    });

    commands.push(RenderCommand::DrawRect {
        rect: viewport.rect(),
        fill: ThemeToken::TimelineBackground.into(),
    });

    let colors: Vec<Fill> = (0..registry.len())
        .map(|i| Fill::Solid(registry.color_at(i).to_color()))
        .collect();

    for (i, event) in log.iter().enumerate() {
        let Ok(column) = registry.index_of(&event.thread) else {
            continue;
        };
        let x = column_width * column as f64 + column_width * 0.5;
        commands.push(RenderCommand::DrawLine {
            from: Point::new(x, i as f64 * row_height),
            to: Point::new(x, (i + 1) as f64 * row_height),
            color: colors[column],
            width: TICK_WIDTH,
        });
    }

    let marker_y = state.scroll_position as f64 / len * viewport.height;
    commands.push(RenderCommand::DrawLine {
        from: Point::new(0.0, marker_y),
        to: Point::new(viewport.width, marker_y),
        color: ThemeToken::ViewportMarker.into(),
        width: 1.0,
    });

    let band_height = state.window_size as f64 / len * viewport.height;
    commands.push(RenderCommand::DrawRect {
        rect: Rect::new(0.0, marker_y.max(0.0), viewport.width, band_height),
        fill: ThemeToken::ViewportOverlay.into(),
    });

    commands.push(RenderCommand::EndGroup);
    commands
}
