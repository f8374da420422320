pub mod jsonl;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub use jsonl::{Ingested, RecordError, read_trace};

/// Default size of the trailing window of lines loaded from a trace file.
pub const DEFAULT_MAX_EVENTS: usize = 1000;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("cannot read trace file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Only the most recent `max_events` lines are parsed.
    pub max_events: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            max_events: DEFAULT_MAX_EVENTS,
        }
    }
}

/// Load the tail of a JSON-Lines trace file.
///
/// Failing to open or read the file is fatal. Individual malformed lines
/// are not: they are logged, skipped, and reported in
/// [`Ingested::rejected`].
pub fn load_trace_file(path: &Path, options: &LoadOptions) -> Result<Ingested, IngestError> {
    let io_err = |source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(io_err)?;
    let ingested = read_trace(BufReader::new(file), options).map_err(io_err)?;
    tracing::info!(
        path = %path.display(),
        events = ingested.log.len(),
        rejected = ingested.rejected.len(),
        "loaded trace"
    );
    Ok(ingested)
}
