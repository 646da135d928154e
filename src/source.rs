//! JSON Lines trace source
//!
//! One serde-decoded [`TraceEvent`] object per line. This is the reference
//! collaborator for the engine; general trace-format decoding (CTF etc.) is
//! out of scope.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

use crate::event::TraceEvent;

/// Trace source errors
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read trace: {0}")]
    Io(#[from] io::Error),
    #[error("malformed event on line {line}: {source}")]
    Parse {
        line: usize,
        source: serde_json::Error,
    },
}

/// Streams events from a JSON Lines reader, one event per line
///
/// Blank lines are skipped. Events are yielded strictly in file order; the
/// engine relies on that order being chronological.
#[derive(Debug)]
pub struct JsonlTraceSource<R> {
    reader: R,
    line: usize,
}

impl JsonlTraceSource<BufReader<File>> {
    /// Open a trace file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: BufRead> JsonlTraceSource<R> {
    /// Wrap an already-open reader
    pub fn new(reader: R) -> Self {
        Self { reader, line: 0 }
    }
}

impl<R: BufRead> Iterator for JsonlTraceSource<R> {
    type Item = Result<TraceEvent, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut buf = String::new();
            self.line += 1;
            match self.reader.read_line(&mut buf) {
                Ok(0) => return None,
                Ok(_) => {
                    let trimmed = buf.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    return Some(serde_json::from_str(trimmed).map_err(|source| {
                        SourceError::Parse {
                            line: self.line,
                            source,
                        }
                    }));
                }
                Err(err) => return Some(Err(SourceError::Io(err))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_reads_events_in_order() {
        let input = concat!(
            r#"{"pid":1,"thread_id":100,"name":"a:x","timestamp":10}"#,
            "\n",
            r#"{"pid":1,"thread_id":100,"name":"a:z","timestamp":30}"#,
            "\n",
        );
        let events: Vec<TraceEvent> = JsonlTraceSource::new(Cursor::new(input))
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].name, "a:x");
        assert_eq!(events[1].timestamp, 30);
    }

    #[test]
    fn test_blank_lines_skipped() {
        let input = concat!(
            "\n",
            r#"{"pid":1,"thread_id":100,"name":"a:x","timestamp":10}"#,
            "\n\n",
        );
        let events: Vec<TraceEvent> = JsonlTraceSource::new(Cursor::new(input))
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let input = concat!(
            r#"{"pid":1,"thread_id":100,"name":"a:x","timestamp":10}"#,
            "\n",
            "not json\n",
        );
        let results: Vec<_> = JsonlTraceSource::new(Cursor::new(input)).collect();
        assert!(results[0].is_ok());
        match &results[1] {
            Err(SourceError::Parse { line, .. }) => assert_eq!(*line, 2),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_open_missing_file_is_io_error() {
        let err = JsonlTraceSource::open("/nonexistent/trace.jsonl").unwrap_err();
        assert!(matches!(err, SourceError::Io(_)));
    }
}
