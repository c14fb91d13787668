//! Stream helpers shared by the tig codec and the store.

use std::fs::File;
use std::io::{BufReader, BufWriter, IntoInnerError, Read, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

/// Check if the path names a gzip-compressed file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
pub fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// Open a file for buffered reading, decompressing gzip input transparently
///
/// # Errors
///
/// Returns the underlying IO error if the file cannot be opened.
pub fn open_reader(path: &Path) -> std::io::Result<Box<dyn Read>> {
    let file = File::open(path)?;
    if is_gzipped(path) {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Buffered output that may be gzip-compressed.
///
/// [`OutputWriter::finish`] must be called to complete the stream; dropping
/// a gzip writer without it discards any error from writing the trailer.
pub enum OutputWriter<W: Write> {
    Plain(BufWriter<W>),
    Gzip(BufWriter<GzEncoder<W>>),
}

impl<W: Write> OutputWriter<W> {
    /// Wrap `inner`, compressing when `gzip` is set
    pub fn new(inner: W, gzip: bool) -> Self {
        if gzip {
            Self::Gzip(BufWriter::new(GzEncoder::new(inner, Compression::default())))
        } else {
            Self::Plain(BufWriter::new(inner))
        }
    }

    /// Flush buffered data, write the gzip trailer if compressing, and
    /// return the underlying writer
    ///
    /// # Errors
    ///
    /// Returns any IO error raised while flushing or finishing the stream.
    pub fn finish(self) -> std::io::Result<W> {
        match self {
            Self::Plain(writer) => {
                let mut inner = writer.into_inner().map_err(IntoInnerError::into_error)?;
                inner.flush()?;
                Ok(inner)
            }
            Self::Gzip(writer) => {
                let encoder = writer.into_inner().map_err(IntoInnerError::into_error)?;
                let mut inner = encoder.finish()?;
                inner.flush()?;
                Ok(inner)
            }
        }
    }
}

impl<W: Write> Write for OutputWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            Self::Plain(writer) => writer.write(buf),
            Self::Gzip(writer) => writer.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            Self::Plain(writer) => writer.flush(),
            Self::Gzip(writer) => writer.flush(),
        }
    }
}

/// Create a file for buffered writing, gzip-compressing when the name asks for it
///
/// # Errors
///
/// Returns the underlying IO error if the file cannot be created.
pub fn create_writer(path: &Path) -> std::io::Result<OutputWriter<File>> {
    let file = File::create(path)?;
    Ok(OutputWriter::new(file, is_gzipped(path)))
}

/// Fill `buf` from `reader`, stopping early only at end of stream.
///
/// Returns the number of bytes read, which is less than `buf.len()` only if
/// the stream ended.
///
/// # Errors
///
/// Returns any IO error other than an interrupted read.
pub fn read_fully<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
