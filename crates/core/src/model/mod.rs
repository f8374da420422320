pub mod event;
pub mod palette;
pub mod registry;
pub mod trace_log;

pub use event::{EventKind, ThreadId, TraceEvent, format_event};
pub use palette::thread_color;
pub use registry::{ThreadRegistry, UnknownThreadError};
pub use trace_log::TraceLog;
