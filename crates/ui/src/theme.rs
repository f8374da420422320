use trace_browser_protocol::{Fill, ThemeToken};

/// Resolved RGBA color for egui rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl ResolvedColor {
    const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_color32(self) -> egui::Color32 {
        egui::Color32::from_rgba_unmultiplied(self.r, self.g, self.b, self.a)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    #[default]
    Dark,
    Light,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub fn visuals(self) -> egui::Visuals {
        match self {
            Self::Dark => egui::Visuals::dark(),
            Self::Light => egui::Visuals::light(),
        }
    }
}

pub fn resolve(token: ThemeToken, mode: ThemeMode) -> egui::Color32 {
    resolve_rgba(token, mode).to_color32()
}

/// Thread colors pass through; tokens go through the palette.
pub fn resolve_fill(fill: Fill, mode: ThemeMode) -> egui::Color32 {
    match fill {
        Fill::Theme(token) => resolve(token, mode),
        Fill::Solid(color) => {
            let [r, g, b, a] = color.to_rgba8();
            egui::Color32::from_rgba_unmultiplied(r, g, b, a)
        }
    }
}

fn resolve_rgba(token: ThemeToken, mode: ThemeMode) -> ResolvedColor {
    match mode {
        ThemeMode::Dark => resolve_dark(token),
        ThemeMode::Light => resolve_light(token),
    }
}

fn resolve_dark(token: ThemeToken) -> ResolvedColor {
    // Catppuccin Mocha palette
    use ThemeToken::*;
    match token {
        Background => ResolvedColor::rgb(0x11, 0x11, 0x1b), // Crust
        // Thread colors are light pastels in both modes.
        TextOnThread => ResolvedColor::rgb(0x11, 0x11, 0x1b),

        TimelineBackground => ResolvedColor::rgb(0x31, 0x32, 0x44), // Surface0
        ViewportMarker => ResolvedColor::rgb(0x89, 0xb4, 0xfa),     // Blue
        ViewportOverlay => ResolvedColor::rgba(0xcd, 0xd6, 0xf4, 90),

        RowStripe => ResolvedColor::rgba(0x00, 0x00, 0x00, 25),
        HoverHighlight => ResolvedColor::rgba(0x89, 0xb4, 0xfa, 60),

        StatusBackground => ResolvedColor::rgb(0x18, 0x18, 0x25), // Mantle
        StatusText => ResolvedColor::rgb(0xba, 0xc2, 0xde),       // Subtext1
        ErrorText => ResolvedColor::rgb(0xf3, 0x8b, 0xa8),        // Red
    }
}

fn resolve_light(token: ThemeToken) -> ResolvedColor {
    use ThemeToken::*;
    match token {
        Background => ResolvedColor::rgb(250, 250, 252),
        TextOnThread => ResolvedColor::rgb(0, 0, 0),

        TimelineBackground => ResolvedColor::rgb(0x44, 0x44, 0x44),
        ViewportMarker => ResolvedColor::rgb(0x33, 0xaa, 0xff),
        ViewportOverlay => ResolvedColor::rgba(200, 200, 200, 128),

        RowStripe => ResolvedColor::rgba(0, 0, 0, 25),
        HoverHighlight => ResolvedColor::rgba(66, 135, 245, 50),

        StatusBackground => ResolvedColor::rgb(240, 240, 245),
        StatusText => ResolvedColor::rgb(40, 40, 50),
        ErrorText => ResolvedColor::rgb(200, 30, 30),
    }
}
