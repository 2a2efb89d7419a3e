//! Reading and writing observed spectra and aggregation results.

use std::io;

use serde::Serialize;

use crate::{Aggregated, ObservedSpectra};

pub mod read;
pub mod text;
pub mod write;

/// Supported formats.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Format {
    /// JSON format.
    Json,
    /// Plain text format.
    Text,
}

impl Format {
    fn detect(bytes: &[u8]) -> Option<Self> {
        match bytes.iter().find(|b| !b.is_ascii_whitespace()) {
            Some(b'{') => Some(Self::Json),
            Some(&b) if b == text::START => Some(Self::Text),
            _ => None,
        }
    }
}

/// A collection of spectra that can be written.
pub trait Spectra: Serialize {
    /// Writes the spectra in plain text format.
    fn write_text<W>(&self, writer: &mut W, precision: usize) -> io::Result<()>
    where
        W: io::Write;
}

impl Spectra for ObservedSpectra {
    fn write_text<W>(&self, writer: &mut W, _precision: usize) -> io::Result<()>
    where
        W: io::Write,
    {
        text::write_observed(writer, self)
    }
}

impl Spectra for Aggregated {
    fn write_text<W>(&self, writer: &mut W, precision: usize) -> io::Result<()>
    where
        W: io::Write,
    {
        text::write_aggregated(writer, self, precision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect() {
        assert_eq!(Format::detect(b"{\"ATT->ATC\":{}}"), Some(Format::Json));
        assert_eq!(Format::detect(b"\n  {}"), Some(Format::Json));
        assert_eq!(Format::detect(b"#mutation_type"), Some(Format::Text));
        assert_eq!(Format::detect(b"ATT->ATC"), None);
        assert_eq!(Format::detect(b""), None);
    }
}
