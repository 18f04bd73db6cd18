//! Hyperspectral data-cube engine.
//!
//! Reads and writes 3D raster imagery (lines, samples, bands) through
//! memory-mapped I/O, across the three common on-disk interleaves
//! (band-interleaved-by-pixel, band-interleaved-by-line, band-sequential).
//! A [`cube::Cube`] is the single entry point: construct one from a header
//! parser's descriptor, `open` it against a URL, and use its raw or cooked
//! accessors. [`reinterleave::write_raw`] streams a cube's bytes into a
//! different target interleave without materializing the whole transcoded
//! buffer.

pub mod byte_source;
pub mod cube;
pub mod dtype;
pub mod error;
pub mod interleave;
pub mod reader;
pub mod reinterleave;
pub mod wavelength;

pub use cube::{create_cube, Cube, CubeDescription};
pub use dtype::{ByteOrder, CubeBuffer, CubeValue, DataType};
pub use error::CubeError;
pub use interleave::Interleave;
pub use reader::Reader;
