use serde::{Deserialize, Serialize};

/// Semantic color tokens resolved by the renderer's active theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeToken {
    Background,
    /// Text drawn on top of a (light) thread color.
    TextOnThread,

    // Timeline
    TimelineBackground,
    ViewportMarker,
    ViewportOverlay,

    // Thread lists
    RowStripe,
    HoverHighlight,

    // Status line
    StatusBackground,
    StatusText,
    ErrorText,
}
