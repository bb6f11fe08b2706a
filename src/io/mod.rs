//! CSV record source and export sink.
//!
//! Input files carry a header row naming the columns `Name`, `Dim`, `Value`
//! and, optionally, `Tags`. Fields are trimmed, so `Name, Dim, Value` is
//! accepted as a header.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use csv::{Reader, ReaderBuilder, StringRecord, Trim, WriterBuilder};
use log::debug;

use crate::db::{LoadOptions, LoadSummary, StatsDb};
use crate::errors::{ErrorContext, StatsError};
use crate::record::Record;

/// Rows of CSV input, one `Result` per row.
///
/// A row that does not deserialize into a [`Record`] yields an error carrying
/// its line, and reading continues with the next row. A failure of the
/// underlying reader ends the sequence.
pub struct Rows<R> {
    reader: Reader<R>,
    headers: StringRecord,
    raw: StringRecord,
    done: bool,
}

impl<R: Read> Rows<R> {
    /// Reads the header row.
    pub fn new(reader: R) -> Result<Self, StatsError> {
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);
        let headers = reader.headers()?.clone();
        Ok(Self {
            reader,
            headers,
            raw: StringRecord::new(),
            done: false,
        })
    }

    fn current(&self) -> Result<Record, StatsError> {
        let line = self.raw.position().map(|p| p.line() as usize);
        match self.raw.deserialize::<Record>(Some(&self.headers)) {
            Ok(mut record) => {
                record.line = line;
                Ok(record)
            }
            Err(e) => Err(StatsError::from(e)
                .in_context(ErrorContext::new().at_line(line).while_parsing("CSV row"))),
        }
    }
}

impl<R: Read> Iterator for Rows<R> {
    type Item = Result<Record, StatsError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.read_record(&mut self.raw) {
            Ok(true) => Some(self.current()),
            Ok(false) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e.into()))
            }
        }
    }
}

/// Reads every record from CSV input, stopping at the first bad row.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<Record>, StatsError> {
    Rows::new(reader)?.collect()
}

fn open(path: &Path) -> Result<File, StatsError> {
    File::open(path).map_err(|e| StatsError::from(e).in_context(ErrorContext::new().in_file(path)))
}

/// Reads records from a CSV file.
pub fn read_records_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Record>, StatsError> {
    let path = path.as_ref();
    let records = read_records(open(path)?)
        .map_err(|e| e.in_context(ErrorContext::new().in_file(path)))?;
    debug!("Read {} record(s) from {}", records.len(), path.display());
    Ok(records)
}

/// Loads a CSV file into `db`.
///
/// Rows that fail to deserialize are handled like records that fail to load:
/// fatal in strict mode, collected in the summary in lenient mode.
pub fn load_path<P: AsRef<Path>>(
    db: &mut StatsDb,
    path: P,
    options: &LoadOptions,
) -> Result<LoadSummary, StatsError> {
    let path = path.as_ref();
    let in_file = |e: StatsError| e.in_context(ErrorContext::new().in_file(path));
    let rows = Rows::new(open(path)?).map_err(in_file)?;
    db.load_rows(rows, options).map_err(in_file)
}

/// Writes every non-generated quantity of `db` as CSV.
pub fn write_records<W: Write>(writer: W, db: &StatsDb) -> Result<(), StatsError> {
    let mut csv_writer = WriterBuilder::new().from_writer(writer);
    for record in db.records() {
        csv_writer.serialize(&record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Writes `db` to a CSV file, replacing any existing file.
pub fn write_records_to_path<P: AsRef<Path>>(path: P, db: &StatsDb) -> Result<(), StatsError> {
    let path = path.as_ref();
    let file = File::create(path)
        .map_err(|e| StatsError::from(e).in_context(ErrorContext::new().in_file(path)))?;
    write_records(file, db)?;
    debug!("Wrote {} record(s) to {}", db.records().len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const VARS: &str = "\
Name, Dim, Value, Tags
Power, J/s, 100, #e #hw
Time , s  , 5   , #t
W, =, J/s, #e
";

    #[test]
    fn test_read_trims_fields_and_headers() {
        let records = read_records(VARS.as_bytes()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].name, "Power");
        assert_eq!(records[0].tags, "#e #hw");
        assert_eq!(records[1].name, "Time");
        assert_eq!(records[1].dim, "s");
        assert_eq!(records[1].value, "5");
        assert!(records[2].is_equivalence());
        assert_eq!(records[2].value, "J/s");
    }

    #[test]
    fn test_read_tracks_lines() {
        let records = read_records(VARS.as_bytes()).unwrap();
        let lines: Vec<_> = records.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![Some(2), Some(3), Some(4)]);
    }

    #[test]
    fn test_tags_column_optional() {
        let records = read_records("Name,Dim,Value\nTime,s,5\n".as_bytes()).unwrap();
        assert_eq!(records[0].tags, "");
    }

    #[test]
    fn test_missing_required_column() {
        let result = read_records("Name,Value\nTime,5\n".as_bytes());
        assert!(matches!(result, Err(StatsError::Record { .. })));
    }

    #[test]
    fn test_rows_continue_past_a_short_row() {
        let input = "Name,Dim,Value,Tags\nClock,Hz,2,#c\nBroken\nTime,s,5,#c\n";
        let rows: Vec<_> = Rows::new(input.as_bytes()).unwrap().collect();

        assert_eq!(rows.len(), 3);
        assert!(rows[0].is_ok());
        match &rows[1] {
            Err(StatsError::Record { context, .. }) => assert_eq!(context.line, Some(3)),
            other => panic!("Expected row error, got {:?}", other),
        }
        assert_eq!(rows[2].as_ref().map(|r| r.name.as_str()).ok(), Some("Time"));

        assert!(read_records(input.as_bytes()).is_err());
    }

    #[test]
    fn test_lenient_load_skips_short_row() {
        let input = "Name,Dim,Value,Tags\nClock,Hz,2,#c\nBroken\nTime,s,5,#c\n";
        let mut db = StatsDb::new();
        let summary = db
            .load_rows(Rows::new(input.as_bytes()).unwrap(), &LoadOptions { lenient: true })
            .unwrap();

        assert_eq!(summary.loaded, 2);
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(db.len(), 4);
        assert!(summary.skipped.iter().all(|e| e.to_string().contains("line 3")));

        let mut strict = StatsDb::new();
        let result = strict.load_rows(Rows::new(input.as_bytes()).unwrap(), &LoadOptions::default());
        assert!(matches!(result, Err(StatsError::Record { .. })));
        assert_eq!(strict.len(), 2);
    }

    #[test]
    fn test_write_has_header_and_skips_inverses() {
        let mut db = StatsDb::new();
        db.load(read_records(VARS.as_bytes()).unwrap(), &LoadOptions::default())
            .unwrap();

        let mut out = Vec::new();
        write_records(&mut out, &db).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(
            text,
            "Name,Dim,Value,Tags\n\
             Power,J/s,100,#e #hw\n\
             Time,s/,5,#t\n\
             W,/,100,#e\n"
        );
    }
}
