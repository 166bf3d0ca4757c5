//! Input acquisition: how the reader comes to own its backing buffer.
//!
//! A document is either memory-mapped from a filesystem path or drained
//! from a streaming source into a single heap buffer. Either way the whole
//! document is resident before scanning begins.

use crate::errors::{Error, Result};
use memmap2::Mmap;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// Chunk size used when draining a streaming source.
const CHUNK_SIZE: usize = 1024 * 1024;
/// Initial heap-buffer capacity for drained sources; grows by doubling.
const INITIAL_CAPACITY: usize = 4 * 1024 * 1024;

/// The reader-owned backing buffer.
///
/// Dropping a variant releases its storage with the matching deallocator
/// (unmap for mapped files, free for heap buffers).
#[derive(Debug)]
pub(crate) enum Buffer {
    /// Read-only file mapping.
    Mmap(Mmap),
    /// Heap copy of a drained stream or an in-memory document.
    Heap(Vec<u8>),
    /// Post-`close()` (or empty-source) state; scans see an empty range.
    Released,
}

impl Buffer {
    #[inline]
    pub(crate) fn as_bytes(&self) -> &[u8] {
        match self {
            Buffer::Mmap(map) => map,
            Buffer::Heap(vec) => vec,
            Buffer::Released => &[],
        }
    }

    /// Maps `path` read-only and hints sequential access.
    ///
    /// An empty file cannot be mapped, it yields the released (immediately
    /// at end) buffer instead.
    #[allow(unsafe_code)]
    pub(crate) fn open_path(path: &Path) -> Result<Buffer> {
        let err = |source| Error::Open {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(err)?;
        let len = file.metadata().map_err(err)?.len();
        if len == 0 {
            return Ok(Buffer::Released);
        }

        // Soundness relies on the usual mmap contract: the mapping is
        // read-only and the file must not be truncated while mapped.
        let map = unsafe { Mmap::map(&file) }.map_err(err)?;
        #[cfg(unix)]
        let _ = map.advise(memmap2::Advice::Sequential);
        Ok(Buffer::Mmap(map))
    }

    /// Drains a streaming source to its end, 1 MiB at a time.
    pub(crate) fn drain<R: Read>(mut source: R) -> Result<Buffer> {
        let mut buf = Vec::with_capacity(INITIAL_CAPACITY);
        let mut chunk = vec![0u8; CHUNK_SIZE];
        loop {
            match source.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => buf.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::Io(e)),
            }
        }
        if buf.is_empty() {
            return Ok(Buffer::Released);
        }
        buf.shrink_to_fit();
        Ok(Buffer::Heap(buf))
    }
}
