//! Utilities for writing spectra.

use std::{fs, io, path::Path};

use super::{Format, Spectra};

/// A builder to write observed spectra or aggregation results.
#[derive(Debug)]
pub struct Builder {
    format: Format,
    precision: usize,
    pretty: bool,
}

impl Builder {
    /// Set format to write.
    ///
    /// If unset, the JSON format will be used.
    pub fn set_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Set precision.
    ///
    /// This is only used for expected site counts in the plain text format.
    /// If unset, a precision of six digits will be used.
    pub fn set_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Set whether to pretty-print.
    ///
    /// This is only used for the JSON format.
    pub fn set_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Write spectra to writer.
    pub fn write<W, S>(self, writer: &mut W, spectra: &S) -> io::Result<()>
    where
        W: io::Write,
        S: Spectra,
    {
        match self.format {
            Format::Json => {
                if self.pretty {
                    serde_json::to_writer_pretty(&mut *writer, spectra)?;
                } else {
                    serde_json::to_writer(&mut *writer, spectra)?;
                }

                writeln!(writer)
            }
            Format::Text => spectra.write_text(writer, self.precision),
        }
    }

    /// Write spectra to stdout.
    pub fn write_to_stdout<S>(self, spectra: &S) -> io::Result<()>
    where
        S: Spectra,
    {
        self.write(&mut io::stdout().lock(), spectra)
    }

    /// Write spectra to path.
    ///
    /// If path already exists, it will be overwritten.
    pub fn write_to_path<P, S>(self, path: P, spectra: &S) -> io::Result<()>
    where
        P: AsRef<Path>,
        S: Spectra,
    {
        self.write(&mut io::BufWriter::new(fs::File::create(path)?), spectra)
    }

    /// Write spectra to path or stdout.
    ///
    /// If the provided path is `None`, write to stdout.
    /// If path already exists, it will be overwritten.
    pub fn write_to_path_or_stdout<P, S>(self, path: Option<P>, spectra: &S) -> io::Result<()>
    where
        P: AsRef<Path>,
        S: Spectra,
    {
        match path {
            Some(path) => self.write_to_path(path, spectra),
            None => self.write_to_stdout(spectra),
        }
    }
}

impl Default for Builder {
    fn default() -> Self {
        Builder {
            format: Format::Json,
            precision: 6,
            pretty: false,
        }
    }
}
