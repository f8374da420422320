pub mod layout;
pub mod thread_list;
pub mod timeline;
pub mod window;

pub use layout::{WindowLayout, split_window};
pub use thread_list::{ListMetrics, render_thread_list, row_at, rows_that_fit};
pub use timeline::render_timeline;
pub use window::{WindowStyle, render_window, status_line};
