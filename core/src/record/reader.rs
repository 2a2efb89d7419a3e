//! Reading classified records from tab-separated tables.
//!
//! The table must have a header row naming its columns. The columns `mutation_type`,
//! `sample_size`, and `derived_count` are required, and may alternatively be named
//! `codon_change`, `totalcount`, and `altcount`, respectively. The optional columns `excluded`
//! and `annotation` (or `custom_annotation`) are used for exclusion. Other columns are ignored,
//! and lines starting with `#` are skipped.

use std::{fmt, io};

mod builder;
pub use builder::{Builder, CompressionMethod};

use super::Record;

const REQUIRED_COLUMNS: [[&str; 2]; 3] = [
    ["mutation_type", "codon_change"],
    ["sample_size", "totalcount"],
    ["derived_count", "altcount"],
];

/// A record reader with a type-erased inner reader.
pub type DynReader = Reader<Box<dyn io::Read>>;

/// A status when trying to read a record from a reader.
#[derive(Debug)]
pub enum ReadStatus {
    /// Record was succesfully read.
    Read(Record),
    /// The line could not be read as a record, but the reader may continue.
    Malformed(MalformedRecord),
    /// An error was encountered, and the reader should not continue.
    Error(io::Error),
    /// The reader has finished.
    Done,
}

/// A reader of classified records.
pub struct Reader<R> {
    inner: csv::Reader<R>,
    headers: csv::StringRecord,
    buf: csv::StringRecord,
}

impl<R> Reader<R>
where
    R: io::Read,
{
    /// The line number of the most recently read record.
    pub fn line(&self) -> u64 {
        self.buf.position().map(|position| position.line()).unwrap_or(0)
    }

    /// Creates a new reader, reading the header row.
    ///
    /// # Errors
    ///
    /// If the header cannot be read, or if it does not contain the required columns.
    pub fn new(inner: R) -> io::Result<Self> {
        let mut inner = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .from_reader(inner);

        let headers = inner.headers().map_err(io::Error::from)?.clone();

        if let Some([name, alias]) = REQUIRED_COLUMNS
            .iter()
            .find(|names| !names.iter().any(|name| headers.iter().any(|h| h == *name)))
        {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("record table is missing required column '{name}' (or '{alias}')"),
            ));
        }

        Ok(Self {
            inner,
            headers,
            buf: csv::StringRecord::new(),
        })
    }

    /// Reads the next record.
    pub fn read_record(&mut self) -> ReadStatus {
        match self.inner.read_record(&mut self.buf) {
            Ok(true) => match self.buf.deserialize::<Record>(Some(&self.headers)) {
                Ok(record) => ReadStatus::Read(record),
                Err(e) => ReadStatus::Malformed(MalformedRecord::new(self.line(), e)),
            },
            Ok(false) => ReadStatus::Done,
            Err(e) => match e.kind() {
                csv::ErrorKind::UnequalLengths { pos, .. } | csv::ErrorKind::Utf8 { pos, .. } => {
                    let line = pos.as_ref().map(|pos| pos.line()).unwrap_or(0);
                    ReadStatus::Malformed(MalformedRecord::new(line, e))
                }
                _ => ReadStatus::Error(io::Error::from(e)),
            },
        }
    }
}

impl<R> fmt::Debug for Reader<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reader")
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// A line that could not be read as a record.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MalformedRecord {
    line: u64,
    reason: String,
}

impl MalformedRecord {
    /// The line number of the malformed record.
    pub fn line(&self) -> u64 {
        self.line
    }

    fn new<E>(line: u64, error: E) -> Self
    where
        E: fmt::Display,
    {
        Self {
            line,
            reason: error.to_string(),
        }
    }
}

impl fmt::Display for MalformedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed record on line {}: {}", self.line, self.reason)
    }
}

impl std::error::Error for MalformedRecord {}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all<R>(reader: &mut Reader<R>) -> (Vec<Record>, Vec<MalformedRecord>)
    where
        R: io::Read,
    {
        let mut records = Vec::new();
        let mut malformed = Vec::new();

        loop {
            match reader.read_record() {
                ReadStatus::Read(record) => records.push(record),
                ReadStatus::Malformed(e) => malformed.push(e),
                ReadStatus::Error(e) => panic!("{e}"),
                ReadStatus::Done => break,
            }
        }

        (records, malformed)
    }

    #[test]
    fn test_read_records() {
        let src = b"mutation_type\tsample_size\tderived_count\n\
            ATT->ATC\t10\t2\n\
            # a comment\n\
            GGG->GGA\t8\t0\n";
        let mut reader = Reader::new(&src[..]).unwrap();

        let (records, malformed) = read_all(&mut reader);

        assert_eq!(
            records,
            vec![Record::new("ATT->ATC", 10, 2), Record::new("GGG->GGA", 8, 0)]
        );
        assert!(malformed.is_empty());
    }

    #[test]
    fn test_read_records_with_aliases_and_extra_columns() {
        let src = b"chrom\tpos\ttotalcount\taltcount\tcodon_change\tcustom_annotation\n\
            2L\t100\t205\t3\tCTG->TTG\teij\n\
            2L\t200\t190\t0\tCTA->TTA\t\n";
        let mut reader = Reader::new(&src[..]).unwrap();

        let (records, _) = read_all(&mut reader);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].mutation_type, "CTG->TTG");
        assert_eq!(records[0].sample_size, 205);
        assert_eq!(records[0].derived_count, 3);
        assert!(records[0].has_annotation("eij"));
        assert!(!records[0].is_excluded());
        assert_eq!(records[1].annotation, None);
    }

    #[test]
    fn test_read_excluded_column() {
        let src = b"mutation_type\tsample_size\tderived_count\texcluded\n\
            ATT->ATC\t10\t2\ttrue\n\
            ATT->ATC\t10\t2\tfalse\n";
        let mut reader = Reader::new(&src[..]).unwrap();

        let (records, _) = read_all(&mut reader);

        assert!(records[0].is_excluded());
        assert!(!records[1].is_excluded());
    }

    #[test]
    fn test_malformed_records_do_not_stop_reader() {
        let src = b"mutation_type\tsample_size\tderived_count\n\
            ATT->ATC\tten\t2\n\
            ATT->ATC\t10\n\
            ATT->ATC\t10\t-1\n";
        let mut reader = Reader::new(&src[..]).unwrap();

        let (records, malformed) = read_all(&mut reader);

        assert_eq!(records, vec![Record::new("ATT->ATC", 10, -1)]);
        assert_eq!(malformed.len(), 2);
        assert_eq!(malformed[0].line(), 2);
    }

    #[test]
    fn test_missing_required_column() {
        let src = b"mutation_type\tderived_count\nATT->ATC\t2\n";

        let error = Reader::new(&src[..]).unwrap_err();

        assert_eq!(error.kind(), io::ErrorKind::InvalidData);
        assert!(error.to_string().contains("sample_size"));
    }
}
