use ratatui::{
    Frame,
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
};
use trace_browser_protocol::{self as protocol, Fill, RenderCommand, ThemeToken};

use crate::app::App;

/// Terminal palette. Translucent tokens are blended over whatever is
/// already in the cell.
fn theme_to_color(token: ThemeToken) -> protocol::Color {
    let rgb = |r: u8, g: u8, b: u8| rgba(r, g, b, 1.0);
    match token {
        ThemeToken::Background => rgb(0x11, 0x11, 0x1b),
        ThemeToken::TextOnThread => rgb(0x11, 0x11, 0x1b),
        ThemeToken::TimelineBackground => rgb(0x44, 0x44, 0x44),
        ThemeToken::ViewportMarker => rgb(0x33, 0xaa, 0xff),
        ThemeToken::ViewportOverlay => rgba(200, 200, 200, 0.35),
        ThemeToken::RowStripe => rgba(0, 0, 0, 0.12),
        ThemeToken::HoverHighlight => rgba(0x33, 0xaa, 0xff, 0.25),
        ThemeToken::StatusBackground => rgb(0x31, 0x32, 0x44),
        ThemeToken::StatusText => rgb(0xcd, 0xd6, 0xf4),
        ThemeToken::ErrorText => rgb(0xf3, 0x8b, 0xa8),
    }
}

fn rgba(r: u8, g: u8, b: u8, a: f32) -> protocol::Color {
    protocol::Color::rgba(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        a,
    )
}

fn resolve(fill: Fill) -> protocol::Color {
    match fill {
        Fill::Solid(color) => color,
        Fill::Theme(token) => theme_to_color(token),
    }
}

fn to_terminal(color: protocol::Color) -> Color {
    let [r, g, b, _] = color.to_rgba8();
    Color::Rgb(r, g, b)
}

/// Composite `color` over the cell's current color. Non-RGB cells are
/// treated as the default background.
fn blend(under: Color, color: protocol::Color) -> Color {
    if color.a >= 1.0 {
        return to_terminal(color);
    }
    let base = match under {
        Color::Rgb(r, g, b) => [r, g, b],
        _ => {
            let [r, g, b, _] = theme_to_color(ThemeToken::Background).to_rgba8();
            [r, g, b]
        }
    };
    let [r, g, b, _] = color.to_rgba8();
    let a = color.a.clamp(0.0, 1.0);
    let mix = |top: u8, bottom: u8| {
        (f32::from(top) * a + f32::from(bottom) * (1.0 - a)).round() as u8
    };
    Color::Rgb(mix(r, base[0]), mix(g, base[1]), mix(b, base[2]))
}

/// Cell-space rectangle, half-open, in buffer coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
struct CellRect {
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
}

impl CellRect {
    fn from_area(area: Rect) -> Self {
        Self {
            x0: i32::from(area.x),
            y0: i32::from(area.y),
            x1: i32::from(area.x) + i32::from(area.width),
            y1: i32::from(area.y) + i32::from(area.height),
        }
    }

    fn intersect(self, other: Self) -> Self {
        Self {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        }
    }

    fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }
}

#[derive(Debug, Clone, Copy)]
struct Transform {
    tx: f64,
    ty: f64,
    sx: f64,
    sy: f64,
}

impl Transform {
    fn identity(area: Rect) -> Self {
        Self {
            tx: f64::from(area.x),
            ty: f64::from(area.y),
            sx: 1.0,
            sy: 1.0,
        }
    }

    fn x(&self, x: f64) -> f64 {
        x * self.sx + self.tx
    }

    fn y(&self, y: f64) -> f64 {
        y * self.sy + self.ty
    }
}

/// Replay render commands into `buf`, with command coordinates measured
/// in cells from the top-left of `area`.
pub fn paint_commands(buf: &mut Buffer, area: Rect, commands: &[RenderCommand]) {
    let bounds = CellRect::from_area(area).intersect(CellRect::from_area(buf.area));
    let mut transforms = vec![Transform::identity(area)];
    let mut clips = vec![bounds];

    for cmd in commands {
        let tf = transforms
            .last()
            .copied()
            .unwrap_or(Transform::identity(area));
        let clip = clips.last().copied().unwrap_or(bounds);

        match cmd {
            RenderCommand::DrawRect { rect, fill } => {
                let x0 = tf.x(rect.x).round() as i32;
                let x1 = tf.x(rect.x + rect.w).round() as i32;
                let y0 = tf.y(rect.y).round() as i32;
                // Thin bands still cover one row.
                let y1 = (tf.y(rect.y + rect.h).round() as i32).max(y0 + 1);
                let color = resolve(*fill);
                for y in y0..y1 {
                    for x in x0..x1 {
                        if !clip.contains(x, y) {
                            continue;
                        }
                        if let Some(cell) = buf.cell_mut((x as u16, y as u16)) {
                            let bg = blend(cell.bg, color);
                            cell.set_bg(bg);
                        }
                    }
                }
            }

            RenderCommand::DrawLine {
                from, to, color, ..
            } => {
                let fg = to_terminal(resolve(*color));
                let (fx, fy, tx, ty) = (tf.x(from.x), tf.y(from.y), tf.x(to.x), tf.y(to.y));
                if (fx - tx).abs() < f64::EPSILON {
                    // Vertical: every row the segment touches, at least one.
                    let x = fx.floor() as i32;
                    let y0 = fy.min(ty).floor() as i32;
                    let y1 = (fy.max(ty).ceil() as i32).max(y0 + 1);
                    for y in y0..y1 {
                        set_symbol(buf, clip, x, y, "┃", fg);
                    }
                } else {
                    // Horizontal: a line on the bottom edge is drawn on the
                    // last row instead of vanishing.
                    let y = (fy.floor() as i32).min(clip.y1 - 1);
                    let x0 = fx.min(tx).floor() as i32;
                    let x1 = fx.max(tx).ceil() as i32;
                    for x in x0..x1 {
                        set_symbol(buf, clip, x, y, "━", fg);
                    }
                }
            }

            RenderCommand::DrawText {
                position,
                text,
                color,
                ..
            } => {
                let fg = to_terminal(resolve(*color));
                let y = tf.y(position.y).floor() as i32;
                let x0 = tf.x(position.x).floor() as i32;
                for (i, ch) in text.chars().enumerate() {
                    let x = x0 + i as i32;
                    if x >= clip.x1 {
                        break;
                    }
                    if !clip.contains(x, y) {
                        continue;
                    }
                    if let Some(cell) = buf.cell_mut((x as u16, y as u16)) {
                        cell.set_char(ch).set_fg(fg);
                    }
                }
            }

            RenderCommand::SetClip { rect } => {
                let next = CellRect {
                    x0: tf.x(rect.x).round() as i32,
                    y0: tf.y(rect.y).round() as i32,
                    x1: tf.x(rect.x + rect.w).round() as i32,
                    y1: tf.y(rect.y + rect.h).round() as i32,
                };
                clips.push(clip.intersect(next));
            }

            RenderCommand::ClearClip => {
                if clips.len() > 1 {
                    clips.pop();
                }
            }

            RenderCommand::PushTransform { translate, scale } => {
                transforms.push(Transform {
                    tx: tf.tx + translate.x * tf.sx,
                    ty: tf.ty + translate.y * tf.sy,
                    sx: tf.sx * scale.x,
                    sy: tf.sy * scale.y,
                });
            }

            RenderCommand::PopTransform => {
                if transforms.len() > 1 {
                    transforms.pop();
                }
            }

            RenderCommand::BeginGroup { .. } | RenderCommand::EndGroup => {}
        }
    }
}

fn set_symbol(buf: &mut Buffer, clip: CellRect, x: i32, y: i32, symbol: &str, fg: Color) {
    if !clip.contains(x, y) {
        return;
    }
    if let Some(cell) = buf.cell_mut((x as u16, y as u16)) {
        cell.set_symbol(symbol).set_fg(fg);
    }
}

/// Draw one frame: the window content above a one-row status line.
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let content = App::content_area(area);
    let status_area = Rect::new(area.x, content.bottom(), area.width, area.height - content.height);

    let bg = to_terminal(theme_to_color(ThemeToken::Background));
    frame.buffer_mut().set_style(content, Style::default().bg(bg));
    paint_commands(frame.buffer_mut(), content, &app.commands(content));

    let status = Paragraph::new(app.status()).style(
        Style::default()
            .fg(to_terminal(theme_to_color(ThemeToken::StatusText)))
            .bg(to_terminal(theme_to_color(ThemeToken::StatusBackground))),
    );
    frame.render_widget(status, status_area);
}
