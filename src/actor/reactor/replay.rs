use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use thiserror::Error;
use tracing::warn;

use super::Event;

/// Writes every handled event as one JSON line so a session can be replayed.
pub struct Record {
    file: Option<BufWriter<File>>,
}

impl Record {
    /// Creates (or truncates) the recording at `path`; `None` records nothing.
    pub fn new(path: Option<&Path>) -> io::Result<Record> {
        let file = match path {
            Some(path) => Some(BufWriter::new(File::create(path)?)),
            None => None,
        };
        Ok(Record { file })
    }

    pub fn none() -> Record { Record { file: None } }

    pub fn is_recording(&self) -> bool { self.file.is_some() }

    pub(super) fn on_event(&mut self, event: &Event) {
        let Some(file) = &mut self.file else {
            return;
        };
        let result = serde_json::to_writer(&mut *file, event)
            .map_err(io::Error::from)
            .and_then(|()| writeln!(file))
            .and_then(|()| file.flush());
        if let Err(err) = result {
            warn!(%err, "failed to record event, recording stopped");
            self.file = None;
        }
    }
}

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("Failed to read recording: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed event on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Feeds every event recorded at `path` to `f`, in order.
pub fn replay(path: &Path, mut f: impl FnMut(Event)) -> Result<(), ReplayError> {
    let reader = BufReader::new(File::open(path)?);
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let event = serde_json::from_str(&line)
            .map_err(|source| ReplayError::Parse { line: index + 1, source })?;
        f(event);
    }
    Ok(())
}
