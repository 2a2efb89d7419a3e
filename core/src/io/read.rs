//! Utilities for reading observed spectra.

use std::{fs, io, path::Path};

use crate::{Catalog, Input, ObservedSpectra};

use super::{text, Format};

/// A builder to read observed spectra.
#[derive(Debug, Default)]
pub struct Builder<'a> {
    format: Option<Format>,
    catalog: Option<&'a Catalog>,
}

impl<'a> Builder<'a> {
    /// Read observed spectra from reader.
    ///
    /// Spectra are always checked to have the number of bins implied by their sample size. If a
    /// catalog is set, all mutation types are also checked to be in the catalog.
    pub fn read<R>(self, reader: &mut R) -> io::Result<ObservedSpectra>
    where
        R: io::Read,
    {
        let mut raw = Vec::new();
        reader.read_to_end(&mut raw)?;

        let format = self.format.or_else(|| Format::detect(&raw));

        let spectra = match format {
            Some(Format::Json) => serde_json::from_slice::<ObservedSpectra>(&raw)?,
            Some(Format::Text) => text::read_observed(&raw[..])?,
            None => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "failed to detect format of observed spectra",
                ))
            }
        };

        self.validate(&spectra)?;

        Ok(spectra)
    }

    /// Read observed spectra from input.
    pub fn read_from_input(self, input: &Input) -> io::Result<ObservedSpectra> {
        self.read(&mut input.open()?)
    }

    /// Read observed spectra from path.
    pub fn read_from_path<P>(self, path: P) -> io::Result<ObservedSpectra>
    where
        P: AsRef<Path>,
    {
        self.read(&mut fs::File::open(path)?)
    }

    /// Set catalog to validate mutation types against.
    pub fn set_catalog(mut self, catalog: &'a Catalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Set format to read.
    ///
    /// If unset, the format will automatically be detected when reading.
    pub fn set_format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    fn validate(&self, spectra: &ObservedSpectra) -> io::Result<()> {
        let result = match self.catalog {
            Some(catalog) => spectra.validate(catalog),
            None => spectra.check_lengths(),
        };

        result.map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}
