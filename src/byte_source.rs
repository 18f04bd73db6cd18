//! Byte source resolution: memory-mapped files, in-memory buffers, and the
//! virtual-filesystem hook used for every other URL scheme.
//!
//! This module owns the mapping itself; [`crate::reader::Reader`] implementations
//! borrow from it but never outlive it.

use crate::error::CubeError;
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

/// Capability required of a virtual-filesystem layer for non-`file:`/`mem:` URLs.
///
/// The cube engine never talks to a filesystem directly for these schemes;
/// it delegates entirely to whatever implements this trait.
pub trait VfsHook: Send + Sync {
    /// Open a readable handle to `url`, reading the entire contents eagerly.
    fn open(&self, url: &str) -> std::io::Result<Vec<u8>>;

    /// Open a mappable byte range for `url`, if the VFS can provide one
    /// without copying (e.g. a local passthrough for a network mount).
    fn open_memmap(&self, url: &str) -> std::io::Result<Vec<u8>> {
        self.open(url)
    }

    /// Last-modified time, in seconds since the Unix epoch, if known.
    fn get_mtime(&self, _url: &str) -> Option<i64> {
        None
    }

    fn exists(&self, url: &str) -> bool;

    /// Canonicalize a URL for display/comparison purposes.
    fn normalize(&self, url: &str) -> String {
        url.to_string()
    }
}

/// The resolved, owned or mapped byte range backing a cube's Reader.
pub enum ByteSource {
    /// A read-only mapping over an entire file.
    Mapped(Mmap),
    /// A fully buffered, in-process byte range (`mem:` URLs, VFS fallback, or
    /// the in-memory construction path used by `create_cube`).
    Owned(Vec<u8>),
}

impl ByteSource {
    pub fn as_slice(&self) -> &[u8] {
        match self {
            Self::Mapped(m) => &m[..],
            Self::Owned(v) => &v[..],
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Resolve `url` into a [`ByteSource`], dispatching on its scheme.
///
/// - `file:<path>` memory-maps the whole file read-only.
/// - `mem:<anything>` reads the caller's in-process buffer through `vfs`,
///   via its eager [`VfsHook::open`]; a host that wants to hand an `open()`
///   call a buffer it already holds registers a hook whose `open` returns
///   that buffer for the matching `mem:` url. There is no such hook for the
///   purely in-memory construction path used by [`crate::cube::create_cube`],
///   which builds a [`ByteSource::Owned`] directly and never calls `open`.
/// - any other scheme is delegated to `vfs` via [`VfsHook::open_memmap`].
pub fn open(url: &str, vfs: Option<&dyn VfsHook>) -> Result<ByteSource, CubeError> {
    if let Some(path) = url.strip_prefix("file:") {
        return open_file(Path::new(path));
    }
    let is_mem = url.starts_with("mem:");
    match vfs {
        Some(vfs) => {
            if !vfs.exists(url) {
                return Err(CubeError::IoError {
                    message: format!("source does not exist: {url}"),
                });
            }
            let bytes = if is_mem { vfs.open(url) } else { vfs.open_memmap(url) }.map_err(|e| {
                CubeError::IoError {
                    message: format!("vfs open failed for {url}: {e}"),
                }
            })?;
            Ok(ByteSource::Owned(bytes))
        }
        None => Err(CubeError::UnsupportedScheme {
            message: format!("no vfs hook registered for url: {url}; mem: urls require a VfsHook to supply the buffer"),
        }),
    }
}

fn open_file(path: &Path) -> Result<ByteSource, CubeError> {
    let file = File::open(path).map_err(|e| CubeError::IoError {
        message: format!("failed to open {}: {e}", path.display()),
    })?;
    // SAFETY: the mapping is read-only and the file is not expected to be
    // truncated out from under us for the lifetime of the Reader; this
    // matches the memory-mapped-IO contract documented on `Cube::open`.
    let mmap = unsafe { Mmap::map(&file) }.map_err(|e| CubeError::OutOfResources {
        message: format!("failed to map {}: {e}", path.display()),
    })?;
    Ok(ByteSource::Mapped(mmap))
}

/// Slice `[data_offset, data_offset + data_bytes)` out of `source`, or to the
/// end of the source when `data_bytes == 0`.
pub fn slice_data<'a>(
    source: &'a ByteSource,
    data_offset: usize,
    data_bytes: usize,
) -> Result<&'a [u8], CubeError> {
    let bytes = source.as_slice();
    if data_offset > bytes.len() {
        return Err(CubeError::CorruptDescriptor {
            message: format!(
                "data_offset {data_offset} exceeds source length {}",
                bytes.len()
            ),
        });
    }
    let end = if data_bytes > 0 {
        data_offset + data_bytes
    } else {
        bytes.len()
    };
    if end > bytes.len() {
        return Err(CubeError::CorruptDescriptor {
            message: format!(
                "data_bytes {data_bytes} at offset {data_offset} exceeds source length {}",
                bytes.len()
            ),
        });
    }
    Ok(&bytes[data_offset..end])
}
