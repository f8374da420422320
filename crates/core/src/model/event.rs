use std::fmt;

use serde::{Deserialize, Serialize};
use trace_browser_protocol::SharedStr;

/// What a trace record describes.
///
/// The tracer emits a handful of well-known kinds; anything else is kept
/// verbatim so it can still be displayed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Call,
    Return,
    CCall,
    CReturn,
    Line,
    Exception,
    Other(SharedStr),
}

impl EventKind {
    pub fn parse(s: &str) -> Self {
        match s {
            "call" => Self::Call,
            "return" => Self::Return,
            "c_call" => Self::CCall,
            "c_return" => Self::CReturn,
            "line" => Self::Line,
            "exception" => Self::Exception,
            other => Self::Other(other.into()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Call => "call",
            Self::Return => "return",
            Self::CCall => "c_call",
            Self::CReturn => "c_return",
            Self::Line => "line",
            Self::Exception => "exception",
            Self::Other(s) => s.as_str(),
        }
    }

    /// Entering a (Python or C) function.
    pub fn is_call(&self) -> bool {
        matches!(self, Self::Call | Self::CCall)
    }

    /// Leaving a (Python or C) function.
    pub fn is_return(&self) -> bool {
        matches!(self, Self::Return | Self::CReturn)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque thread identifier.
///
/// The tracer may write any JSON value as the thread id. Identity is the
/// compact JSON encoding of that value, so the string `"1"` and the number
/// `1` are different threads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ThreadId {
    key: SharedStr,
    label: SharedStr,
}

impl ThreadId {
    pub fn from_json(value: &serde_json::Value) -> Self {
        let key = SharedStr::from(value.to_string());
        let label = match value {
            serde_json::Value::String(s) => SharedStr::from(s.as_str()),
            _ => key.clone(),
        };
        Self { key, label }
    }

    /// Compact JSON encoding; unique per thread.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Human-readable form: strings unquoted, everything else as JSON.
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// One recorded interpreter event, annotated with its call depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    pub kind: EventKind,
    pub thread: ThreadId,
    pub filename: SharedStr,
    pub line_number: u32,
    /// Only meaningful for `call`/`c_call`.
    pub function_name: Option<SharedStr>,
    /// Call-stack nesting level within the thread (0 = outermost).
    pub depth: u32,
    /// Position in the loaded log.
    pub sequence_index: usize,
}

/// Text shown for an event in a thread list.
///
/// Calls with a known function render as `name() file:line`, everything
/// else as `[kind] file:line`.
pub fn format_event(event: &TraceEvent) -> String {
    match (&event.kind, &event.function_name) {
        (kind, Some(name)) if kind.is_call() => {
            format!("{name}() {}:{}", event.filename, event.line_number)
        }
        (kind, _) => format!("[{kind}] {}:{}", event.filename, event.line_number),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(kind: &str, function_name: Option<&str>) -> TraceEvent {
        TraceEvent {
            kind: EventKind::parse(kind),
            thread: ThreadId::from_json(&json!("main")),
            filename: "app.py".into(),
            line_number: 12,
            function_name: function_name.map(SharedStr::from),
            depth: 0,
            sequence_index: 0,
        }
    }

    #[test]
    fn kind_round_trips_known_and_unknown_names() {
        for name in ["call", "return", "c_call", "c_return", "line", "exception", "opcode"] {
            assert_eq!(EventKind::parse(name).as_str(), name);
        }
        assert_eq!(EventKind::parse("opcode"), EventKind::Other("opcode".into()));
    }

    #[test]
    fn formats_calls_with_function_name() {
        assert_eq!(format_event(&event("call", Some("run"))), "run() app.py:12");
        assert_eq!(format_event(&event("c_call", Some("len"))), "len() app.py:12");
    }

    #[test]
    fn formats_other_kinds_with_brackets() {
        assert_eq!(format_event(&event("return", Some("run"))), "[return] app.py:12");
        assert_eq!(format_event(&event("line", None)), "[line] app.py:12");
        // A call record without `co_name` falls back to the generic form.
        assert_eq!(format_event(&event("call", None)), "[call] app.py:12");
    }

    #[test]
    fn thread_ids_keep_json_types_apart() {
        let text = ThreadId::from_json(&json!("1"));
        let number = ThreadId::from_json(&json!(1));
        assert_ne!(text, number);
        assert_eq!(text.label(), "1");
        assert_eq!(text.key(), "\"1\"");
        assert_eq!(number.label(), "1");
    }

    #[test]
    fn structured_thread_ids_compare_by_value() {
        let a = ThreadId::from_json(&json!({"pid": 4, "tid": 7}));
        let b = ThreadId::from_json(&json!({"tid": 7, "pid": 4}));
        assert_eq!(a, b);
    }
}
