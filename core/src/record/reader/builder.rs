use std::io;

use flate2::bufread::MultiGzDecoder;

use crate::Input;

use super::{DynReader, Reader};

/// A record reader builder.
#[derive(Debug, Default)]
pub struct Builder {
    input: Option<Input>,
    compression_method: Option<Option<CompressionMethod>>,
}

impl Builder {
    /// Opens the input and returns a new reader.
    ///
    /// If no input has been set, stdin is used.
    pub fn build(self) -> io::Result<DynReader> {
        let reader = self.input.as_ref().unwrap_or(&Input::Stdin).open()?;
        self.build_from_reader(reader)
    }

    /// Returns a new reader from an already opened source.
    pub fn build_from_reader<R>(self, mut reader: R) -> io::Result<DynReader>
    where
        R: 'static + io::BufRead,
    {
        let compression_method = match self.compression_method {
            Some(compression_method) => compression_method,
            None => CompressionMethod::detect(&mut reader)?,
        };

        let inner: Box<dyn io::Read> = match compression_method {
            Some(CompressionMethod::Gzip) => Box::new(MultiGzDecoder::new(reader)),
            None => Box::new(reader),
        };

        Reader::new(inner)
    }

    /// Sets the compression method.
    ///
    /// By default, the compression method will be detected from the input.
    pub fn set_compression_method(mut self, compression_method: Option<CompressionMethod>) -> Self {
        self.compression_method = Some(compression_method);
        self
    }

    /// Sets the input.
    pub fn set_input(mut self, input: Input) -> Self {
        self.input = Some(input);
        self
    }
}

/// A compression method for record tables.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompressionMethod {
    /// Gzip, including BGZF.
    Gzip,
}

impl CompressionMethod {
    fn detect<R>(reader: &mut R) -> io::Result<Option<Self>>
    where
        R: io::BufRead,
    {
        const GZIP_MAGIC_NUMBER: [u8; 2] = [0x1f, 0x8b];

        let src = reader.fill_buf()?;

        if let Some(buf) = src.get(..GZIP_MAGIC_NUMBER.len()) {
            if buf == GZIP_MAGIC_NUMBER {
                return Ok(Some(CompressionMethod::Gzip));
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write as _;

    use flate2::{write::GzEncoder, Compression};

    use crate::record::{reader::ReadStatus, Record};

    const SRC: &[u8] = b"mutation_type\tsample_size\tderived_count\nATT->ATC\t4\t1\n";

    fn first_record(mut reader: DynReader) -> Record {
        match reader.read_record() {
            ReadStatus::Read(record) => record,
            status => panic!("unexpected read status {status:?}"),
        }
    }

    #[test]
    fn test_build_plain() {
        let reader = Builder::default().build_from_reader(SRC).unwrap();

        assert_eq!(first_record(reader), Record::new("ATT->ATC", 4, 1));
    }

    #[test]
    fn test_build_gzip() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(SRC).unwrap();
        let compressed = encoder.finish().unwrap();

        let mut src = io::Cursor::new(compressed);
        assert_eq!(
            CompressionMethod::detect(&mut src).unwrap(),
            Some(CompressionMethod::Gzip)
        );

        let reader = Builder::default().build_from_reader(src).unwrap();

        assert_eq!(first_record(reader), Record::new("ATT->ATC", 4, 1));
    }

    #[test]
    fn test_detect_uncompressed() {
        assert_eq!(CompressionMethod::detect(&mut &SRC[..]).unwrap(), None);
    }
}
