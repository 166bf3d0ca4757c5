//! A bounded interning cache for element names.
//!
//! Element names repeat heavily in typical XML, so a small open-addressed
//! table amortizes the allocation of name handles without an unbounded
//! growth path. Lookups that fall past the probe window still succeed, they
//! just pay an allocation per occurrence.

use std::sync::Arc;

/// Number of slots, must be a power of two.
const CACHE_SIZE: usize = 512;
const CACHE_MASK: usize = CACHE_SIZE - 1;
/// How many consecutive slots a lookup scans before giving up on the table.
const PROBE_WINDOW: usize = 8;

/// FNV-1a over the name bytes, folded to 32 bits.
#[inline]
fn fnv1a(bytes: &[u8]) -> u32 {
    let mut hash: u32 = 2_166_136_261;
    for &b in bytes {
        hash ^= u32::from(b);
        hash = hash.wrapping_mul(16_777_619);
    }
    hash
}

/// Open-addressed table of interned name handles.
///
/// There is no eviction: once every slot of a bucket's probe window is
/// occupied, further distinct names hashing there are returned un-cached.
#[derive(Debug)]
pub(crate) struct NameCache {
    slots: Vec<Option<Arc<str>>>,
}

impl NameCache {
    pub(crate) fn new() -> Self {
        NameCache {
            slots: vec![None; CACHE_SIZE],
        }
    }

    /// Returns the shared handle for `bytes`, minting and caching a new one
    /// on first sight.
    ///
    /// When all probe slots of the bucket are taken by other names, the
    /// returned handle is freshly allocated and *not* inserted; callers must
    /// not rely on pointer identity of the result.
    pub(crate) fn intern(&mut self, bytes: &[u8]) -> Arc<str> {
        let idx = fnv1a(bytes) as usize & CACHE_MASK;
        for i in 0..PROBE_WINDOW {
            let slot = &mut self.slots[(idx + i) & CACHE_MASK];
            match slot {
                Some(name) if name.as_bytes() == bytes => return Arc::clone(name),
                Some(_) => continue,
                None => {
                    let name = make_handle(bytes);
                    *slot = Some(Arc::clone(&name));
                    return name;
                }
            }
        }
        make_handle(bytes)
    }
}

/// An owned, immutable UTF-8 copy of the name bytes. Ill-formed sequences
/// are replaced rather than rejected, names are expected to be ASCII anyway.
fn make_handle(bytes: &[u8]) -> Arc<str> {
    Arc::from(String::from_utf8_lossy(bytes))
}
