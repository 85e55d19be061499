//! Query-file decoding for querybench
//!
//! This crate implements the [`QuerySource`] collaborator: it reads the
//! benchmark's input CSV (`hostname,start_time,end_time`, one header row)
//! and decodes each record into a [`WorkItem`]. Any structurally invalid
//! record is a descriptive, fatal error; the engine never benchmarks a
//! partially decoded workload.

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::fs::File;
use std::path::Path;

use chrono::NaiveDateTime;
use csv::StringRecord;

use querybench_core::{QuerySource, SourceError, WorkItem};

/// Timestamp layout used by the query file (e.g. `2017-01-01 08:59:22`)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Streaming CSV source of work items
///
/// Records are decoded lazily, one per [`QuerySource::next_item`] call, so
/// dispatch can begin before the whole file is read.
pub struct CsvQuerySource {
    records: csv::StringRecordsIntoIter<File>,
    line: u64,
}

impl CsvQuerySource {
    /// Open a query file
    ///
    /// The first row is treated as a header and skipped.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let file = File::open(path.as_ref())?;
        // Flexible so short records surface as "missing field" errors
        // with the field name instead of a generic length mismatch.
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        tracing::debug!(path = %path.as_ref().display(), "Opened query file");

        Ok(Self {
            records: reader.into_records(),
            line: 1,
        })
    }

    fn decode(record: &StringRecord, line: u64) -> Result<WorkItem, SourceError> {
        let field = |index: usize, name: &str| {
            record
                .get(index)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| {
                    SourceError::Malformed(format!("line {line}: missing {name} field"))
                })
        };

        let host = field(0, "hostname")?;
        let start = parse_timestamp(field(1, "start_time")?)?;
        let end = parse_timestamp(field(2, "end_time")?)?;

        Ok(WorkItem::new(host, start, end))
    }
}

impl QuerySource for CsvQuerySource {
    fn next_item(&mut self) -> Option<Result<WorkItem, SourceError>> {
        self.line += 1;
        let line = self.line;
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(e) => {
                return Some(Err(SourceError::Malformed(format!("line {line}: {e}"))));
            }
        };
        Some(Self::decode(&record, line))
    }
}

/// Parse one timestamp field using [`TIMESTAMP_FORMAT`]
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, SourceError> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).map_err(|e| SourceError::Timestamp {
        value: value.to_string(),
        reason: e.to_string(),
    })
}
