//! Decompression of package and database files.

use std::{
    fmt::Debug,
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use bzip2::bufread::BzDecoder;
use flate2::bufread::GzDecoder;
use liblzma::bufread::XzDecoder;
use repod_types::CompressionType;
use zstd::Decoder;

use crate::Error;

/// A decompressing reader supporting multiple backends.
///
/// Wraps the decoders of the supported compression types behind a unified
/// [`Read`] implementation. [`CompressionType::None`] passes data through
/// unmodified.
pub enum CompressionDecoder<'a> {
    /// The bzip2 decoder.
    Bzip2(BzDecoder<BufReader<File>>),

    /// The gzip decoder.
    Gzip(GzDecoder<BufReader<File>>),

    /// The xz decoder.
    Xz(XzDecoder<BufReader<File>>),

    /// The zstandard decoder.
    Zstd(Decoder<'a, BufReader<File>>),

    /// No compression.
    None(BufReader<File>),
}

impl CompressionDecoder<'_> {
    /// Creates a new [`CompressionDecoder`] over `file`.
    ///
    /// # Errors
    ///
    /// Returns an error if creating the zstandard decoder fails (all other
    /// decoder initializations are infallible).
    pub fn new(file: File, compression: CompressionType) -> Result<Self, Error> {
        match compression {
            CompressionType::Bzip2 => Ok(Self::Bzip2(BzDecoder::new(BufReader::new(file)))),
            CompressionType::Gzip => Ok(Self::Gzip(GzDecoder::new(BufReader::new(file)))),
            CompressionType::Lzma => Ok(Self::Xz(XzDecoder::new(BufReader::new(file)))),
            CompressionType::Zstandard => Ok(Self::Zstd(Decoder::new(file).map_err(
                |source| Error::IoPath {
                    path: Default::default(),
                    context: "creating a zstandard decoder",
                    source,
                },
            )?)),
            CompressionType::None => Ok(Self::None(BufReader::new(file))),
        }
    }

    /// Opens the file at `path` with a decoder derived from its suffix.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can not be opened or carries an unknown
    /// compression suffix.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let compression = CompressionType::from_file_suffix(path)?;
        let file = File::open(path).map_err(|source| Error::IoPath {
            path: path.to_path_buf(),
            context: "opening a compressed file",
            source,
        })?;
        Self::new(file, compression)
    }
}

impl Debug for CompressionDecoder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CompressionDecoder({})",
            match self {
                CompressionDecoder::Bzip2(_) => "Bzip2",
                CompressionDecoder::Gzip(_) => "Gzip",
                CompressionDecoder::Xz(_) => "Xz",
                CompressionDecoder::Zstd(_) => "Zstd",
                CompressionDecoder::None(_) => "None",
            }
        )
    }
}

impl Read for CompressionDecoder<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            CompressionDecoder::Bzip2(decoder) => decoder.read(buf),
            CompressionDecoder::Gzip(decoder) => decoder.read(buf),
            CompressionDecoder::Xz(decoder) => decoder.read(buf),
            CompressionDecoder::Zstd(decoder) => decoder.read(buf),
            CompressionDecoder::None(reader) => reader.read(buf),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Seek, Write};

    use rstest::rstest;
    use tempfile::tempfile;
    use testresult::TestResult;

    use super::*;

    /// Compresses `data` into `file` using `compression`.
    fn compress_into(
        file: &mut File,
        data: &[u8],
        compression: CompressionType,
    ) -> TestResult {
        match compression {
            CompressionType::Bzip2 => {
                let mut encoder =
                    bzip2::write::BzEncoder::new(file, bzip2::Compression::default());
                encoder.write_all(data)?;
                encoder.finish()?;
            }
            CompressionType::Gzip => {
                let mut encoder =
                    flate2::write::GzEncoder::new(file, flate2::Compression::default());
                encoder.write_all(data)?;
                encoder.finish()?;
            }
            CompressionType::Lzma => {
                let mut encoder = liblzma::write::XzEncoder::new(file, 6);
                encoder.write_all(data)?;
                encoder.finish()?;
            }
            CompressionType::Zstandard => {
                let mut encoder = zstd::Encoder::new(file, 0)?;
                encoder.write_all(data)?;
                encoder.finish()?;
            }
            CompressionType::None => {
                file.write_all(data)?;
            }
        }
        Ok(())
    }

    #[rstest]
    #[case::bzip2(CompressionType::Bzip2)]
    #[case::gzip(CompressionType::Gzip)]
    #[case::xz(CompressionType::Lzma)]
    #[case::zstd(CompressionType::Zstandard)]
    #[case::none(CompressionType::None)]
    fn decoder_round_trip(#[case] compression: CompressionType) -> TestResult {
        let input = b"repod4ever";

        let mut file = tempfile()?;
        compress_into(&mut file, input, compression)?;
        file.rewind()?;

        let mut decoder = CompressionDecoder::new(file, compression)?;
        let mut output = Vec::new();
        decoder.read_to_end(&mut output)?;

        assert_eq!(output, input);
        Ok(())
    }
}
