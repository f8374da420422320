use std::collections::{HashMap, VecDeque};
use std::io::BufRead;

use serde::Deserialize;
use thiserror::Error;
use trace_browser_protocol::SharedStr;

use super::LoadOptions;
use crate::model::{EventKind, ThreadId, TraceEvent, TraceLog};

/// One line that could not be turned into a trace event.
#[derive(Debug, Error)]
#[error("line {line}: {source}")]
pub struct RecordError {
    /// 1-based line number in the source file.
    pub line: usize,
    #[source]
    pub source: serde_json::Error,
}

/// Result of reading a trace: the annotated log plus every rejected line.
#[derive(Debug, Default)]
pub struct Ingested {
    pub log: TraceLog,
    pub rejected: Vec<RecordError>,
}

/// Wire shape of one record. Unknown keys are ignored.
#[derive(Deserialize)]
struct RawRecord {
    event: String,
    thread: serde_json::Value,
    filename: String,
    lineno: u32,
    #[serde(default)]
    co_name: Option<String>,
}

/// Deduplicates file and function names so each distinct string is
/// allocated once per log.
#[derive(Default)]
struct Interner {
    strings: HashMap<String, SharedStr>,
}

impl Interner {
    fn intern(&mut self, s: String) -> SharedStr {
        if let Some(shared) = self.strings.get(&s) {
            return shared.clone();
        }
        let shared = SharedStr::from(s.as_str());
        self.strings.insert(s, shared.clone());
        shared
    }
}

/// Read JSON Lines from `reader`, keeping the trailing `max_events`
/// lines. Blank lines take a slot in the window but load nothing.
///
/// Only I/O failures are returned as errors; bad records end up in
/// [`Ingested::rejected`] and are logged at `warn`.
pub fn read_trace<R: BufRead>(reader: R, options: &LoadOptions) -> std::io::Result<Ingested> {
    let tail = tail_lines(reader, options.max_events)?;
    Ok(parse_lines(tail))
}

/// The last `max` lines of `reader`, with their 1-based line numbers.
fn tail_lines<R: BufRead>(reader: R, max: usize) -> std::io::Result<VecDeque<(usize, Vec<u8>)>> {
    let mut window = VecDeque::with_capacity(max.min(4096));
    if max == 0 {
        return Ok(window);
    }
    for (i, line) in reader.split(b'\n').enumerate() {
        let line = line?;
        if window.len() == max {
            window.pop_front();
        }
        window.push_back((i + 1, line));
    }
    Ok(window)
}

/// Parse numbered lines into an annotated log.
pub fn parse_lines<I, L>(lines: I) -> Ingested
where
    I: IntoIterator<Item = (usize, L)>,
    L: AsRef<[u8]>,
{
    let mut interner = Interner::default();
    let mut events = Vec::new();
    let mut rejected = Vec::new();

    for (line, bytes) in lines {
        let bytes = bytes.as_ref();
        if bytes.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        match serde_json::from_slice::<RawRecord>(bytes) {
            Ok(raw) => events.push(TraceEvent {
                kind: EventKind::parse(&raw.event),
                thread: ThreadId::from_json(&raw.thread),
                filename: interner.intern(raw.filename),
                line_number: raw.lineno,
                function_name: raw.co_name.map(|name| interner.intern(name)),
                depth: 0,
                sequence_index: 0,
            }),
            Err(source) => {
                tracing::warn!(line, error = %source, "skipping malformed trace record");
                rejected.push(RecordError { line, source });
            }
        }
    }

    Ingested {
        log: TraceLog::new(events),
        rejected,
    }
}
