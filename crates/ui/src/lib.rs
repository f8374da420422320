mod app;
mod renderer;
mod theme;

pub use app::{TraceBrowserApp, event_details};
pub use theme::ThemeMode;
