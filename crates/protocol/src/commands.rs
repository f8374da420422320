use serde::{Deserialize, Serialize};

use crate::shared_str::SharedStr;
use crate::theme::ThemeToken;
use crate::types::{Color, Point, Rect};

/// What a command paints with.
///
/// Fixed chrome (backgrounds, markers, stripes) uses semantic theme tokens
/// so each backend can resolve them to its own palette. Per-thread colors
/// are generated at load time and travel as concrete RGBA values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Fill {
    Theme(ThemeToken),
    Solid(Color),
}

impl From<ThemeToken> for Fill {
    fn from(token: ThemeToken) -> Self {
        Fill::Theme(token)
    }
}

impl From<Color> for Fill {
    fn from(color: Color) -> Self {
        Fill::Solid(color)
    }
}

/// A single, stateless render instruction.
///
/// Views emit a `Vec<RenderCommand>` in local coordinates (origin at the
/// top-left of the view). Backends replay the list in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderCommand {
    /// Fill a rectangle.
    DrawRect { rect: Rect, fill: Fill },

    /// Draw a single line of text. `position.y` is the vertical center of
    /// the line.
    DrawText {
        position: Point,
        text: SharedStr,
        color: Fill,
        font_size: f64,
        align: TextAlign,
    },

    /// Draw a line segment.
    DrawLine {
        from: Point,
        to: Point,
        color: Fill,
        width: f64,
    },

    /// Restrict subsequent drawing to a rectangular region.
    SetClip { rect: Rect },

    /// Remove the active clip region.
    ClearClip,

    /// Translate and scale all subsequent commands until the matching
    /// `PopTransform`. Used to place independently rendered views side by
    /// side in one window.
    PushTransform { translate: Point, scale: Point },

    /// Pop the most recent transform.
    PopTransform,

    /// Begin a logical group (the timeline, one thread list).
    BeginGroup {
        id: SharedStr,
        label: Option<SharedStr>,
    },

    /// End the current group.
    EndGroup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_from_token_and_color() {
        let token: Fill = ThemeToken::RowStripe.into();
        assert_eq!(token, Fill::Theme(ThemeToken::RowStripe));

        let red = Color::rgba(1.0, 0.0, 0.0, 1.0);
        let solid: Fill = red.into();
        assert_eq!(solid, Fill::Solid(red));
    }

    #[test]
    fn commands_serialize_as_tagged_json() {
        let cmd = RenderCommand::DrawLine {
            from: Point::new(0.0, 0.0),
            to: Point::new(0.0, 4.0),
            color: Fill::Theme(ThemeToken::ViewportMarker),
            width: 1.0,
        };
        let json = serde_json::to_string(&cmd).unwrap_or_default();
        assert!(json.starts_with("{\"DrawLine\""));
        assert!(json.contains("ViewportMarker"));
    }

    #[test]
    fn rects_carry_only_geometry_and_fill() {
        let cmd = RenderCommand::DrawRect {
            rect: Rect::new(0.0, 2.0, 10.0, 4.0),
            fill: ThemeToken::RowStripe.into(),
        };
        let value = serde_json::to_value(&cmd).unwrap_or_default();
        let fields = value
            .get("DrawRect")
            .and_then(|v| v.as_object())
            .map(|o| {
                let mut keys: Vec<_> = o.keys().cloned().collect();
                keys.sort();
                keys
            })
            .unwrap_or_default();
        assert_eq!(fields, vec!["fill".to_string(), "rect".to_string()]);
    }
}
