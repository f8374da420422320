//! SVG renderer: converts `RenderCommand` lists into standalone SVG documents.

use std::fmt::Write as _;

use trace_browser_protocol::{Color, Fill, RenderCommand, TextAlign, ThemeToken};

/// Render a list of commands as an SVG document string.
///
/// `width` and `height` define the SVG viewBox dimensions.
pub fn render_svg(commands: &[RenderCommand], width: f64, height: f64) -> String {
    let mut svg = String::with_capacity(commands.len() * 120 + 256);
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}" width="{width}" height="{height}" style="font-family:ui-monospace,monospace">"#,
    );
    let _ = write!(
        svg,
        r#"<rect width="{width}" height="{height}" fill="{}"/>"#,
        paint(ThemeToken::Background.into())
    );

    // Every SetClip and PushTransform opens a <g>; the matching command
    // closes it.
    let mut clips = 0usize;
    let mut open_groups: Vec<&'static str> = Vec::new();

    for cmd in commands {
        match cmd {
            RenderCommand::DrawRect { rect, fill } => {
                let _ = write!(
                    svg,
                    r#"<rect x="{}" y="{}" width="{}" height="{}" {}/>"#,
                    rect.x,
                    rect.y,
                    rect.w.max(0.0),
                    rect.h.max(0.0),
                    paint_attr("fill", *fill),
                );
            }
            RenderCommand::DrawLine {
                from,
                to,
                color,
                width: line_width,
            } => {
                let _ = write!(
                    svg,
                    r#"<line x1="{}" y1="{}" x2="{}" y2="{}" {} stroke-width="{line_width}"/>"#,
                    from.x,
                    from.y,
                    to.x,
                    to.y,
                    paint_attr("stroke", *color),
                );
            }
            RenderCommand::DrawText {
                position,
                text,
                color,
                font_size,
                align,
            } => {
                let anchor = match align {
                    TextAlign::Left => "start",
                    TextAlign::Center => "middle",
                    TextAlign::Right => "end",
                };
                let _ = write!(
                    svg,
                    r#"<text x="{}" y="{}" font-size="{font_size}" text-anchor="{anchor}" dominant-baseline="central" {}>{}</text>"#,
                    position.x,
                    position.y,
                    paint_attr("fill", *color),
                    escape_xml(text),
                );
            }
            RenderCommand::SetClip { rect } => {
                let id = format!("clip{clips}");
                clips += 1;
                let _ = write!(
                    svg,
                    r#"<clipPath id="{id}"><rect x="{}" y="{}" width="{}" height="{}"/></clipPath><g clip-path="url(#{id})">"#,
                    rect.x,
                    rect.y,
                    rect.w.max(0.0),
                    rect.h.max(0.0),
                );
                open_groups.push("clip");
            }
            RenderCommand::PushTransform { translate, scale } => {
                let _ = write!(
                    svg,
                    r#"<g transform="translate({} {}) scale({} {})">"#,
                    translate.x, translate.y, scale.x, scale.y,
                );
                open_groups.push("transform");
            }
            RenderCommand::ClearClip => close_group(&mut svg, &mut open_groups, "clip"),
            RenderCommand::PopTransform => close_group(&mut svg, &mut open_groups, "transform"),
            RenderCommand::BeginGroup { .. } | RenderCommand::EndGroup => {}
        }
    }

    for _ in open_groups.drain(..) {
        svg.push_str("</g>");
    }
    svg.push_str("</svg>");
    svg
}

fn close_group(svg: &mut String, open: &mut Vec<&'static str>, kind: &str) {
    if open.last() == Some(&kind) {
        open.pop();
        svg.push_str("</g>");
    }
}

/// `fill="#rrggbb"` plus an opacity attribute when translucent.
fn paint_attr(attr: &str, fill: Fill) -> String {
    let (hex, alpha) = match fill {
        Fill::Solid(color) => (color.to_hex(), color.a),
        Fill::Theme(token) => {
            let color = resolve(token);
            (color.to_hex(), color.a)
        }
    };
    if alpha < 1.0 {
        format!(r#"{attr}="{hex}" {attr}-opacity="{alpha:.3}""#)
    } else {
        format!(r#"{attr}="{hex}""#)
    }
}

fn paint(fill: Fill) -> String {
    match fill {
        Fill::Solid(color) => color.to_hex(),
        Fill::Theme(token) => resolve(token).to_hex(),
    }
}

/// Static palette for snapshots, matching the desktop shell's light theme.
fn resolve(token: ThemeToken) -> Color {
    let rgb = |r: u8, g: u8, b: u8| {
        Color::rgba(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            1.0,
        )
    };
    let rgba = |r: u8, g: u8, b: u8, a: f32| Color { a, ..rgb(r, g, b) };
    match token {
        ThemeToken::Background => rgb(0xff, 0xff, 0xff),
        ThemeToken::TextOnThread | ThemeToken::StatusText => rgb(0x1a, 0x1a, 0x2e),
        ThemeToken::TimelineBackground => rgb(0x44, 0x44, 0x44),
        ThemeToken::ViewportMarker => rgb(0x33, 0xaa, 0xff),
        ThemeToken::ViewportOverlay => rgba(200, 200, 200, 0.5),
        ThemeToken::RowStripe => rgba(0, 0, 0, 0.1),
        ThemeToken::HoverHighlight => rgba(0x33, 0xaa, 0xff, 0.25),
        ThemeToken::StatusBackground => rgb(0xf0, 0xf0, 0xf5),
        ThemeToken::ErrorText => rgb(0xe6, 0x39, 0x46),
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
