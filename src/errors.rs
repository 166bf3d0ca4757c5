//! Error management module

use std::fmt;
use std::io;
use std::path::PathBuf;

/// The error type used by this crate.
///
/// Only input acquisition can fail: opening or mapping a file, or draining a
/// streaming source. Structural anomalies in the XML itself are recovered
/// silently by the scanner and never surface as errors; [`Reader::read`]
/// simply returns `false` once nothing more can be reported.
///
/// [`Reader::read`]: crate::Reader::read
#[derive(Debug)]
pub enum Error {
    /// The document could not be opened, stat'd or memory-mapped.
    Open {
        /// Path of the document that failed to open.
        path: PathBuf,
        /// The underlying OS-level error.
        source: io::Error,
    },
    /// An I/O error while draining a streaming source into the buffer.
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Open { path, source } => {
                write!(f, "cannot open {}: {}", path.display(), source)
            }
            Error::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Open { source, .. } => Some(source),
            Error::Io(e) => Some(e),
        }
    }
}

impl From<io::Error> for Error {
    /// Creates a new `Error::Io` from the given error
    #[inline]
    fn from(error: io::Error) -> Error {
        Error::Io(error)
    }
}

/// A specialized `Result` type where the error is hard-wired to [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
