//! The interleave-agnostic Reader contract and the shared addressing helpers
//! every concrete interleave implementation is built from.

use crate::dtype::{CubeBuffer, CubeValue, DataType};
use crate::error::CubeError;
use std::fmt;

/// Line/sample/band geometry shared by every reader, plus the element type
/// needed to turn flat byte offsets into values.
///
/// On-disk byte order is deliberately not carried here: every concrete
/// reader decodes assuming host order regardless of the cube's actual
/// on-disk order (see [`crate::dtype::CubeBuffer::byteswap_in_place`] for why
/// that's sound), so the readers never need it, and [`crate::cube::Cube`]
/// is the only place that byte order is tracked and acted on.
#[derive(Debug, Clone, Copy)]
pub struct Geometry {
    pub lines: usize,
    pub samples: usize,
    pub bands: usize,
    pub dtype: DataType,
}

impl Geometry {
    pub fn element_count(&self) -> usize {
        self.lines * self.samples * self.bands
    }

    pub(crate) fn check_loc(&self, line: usize, sample: usize, band: usize) -> Result<(), CubeError> {
        if line >= self.lines || sample >= self.samples || band >= self.bands {
            return Err(CubeError::IndexOutOfRange {
                message: format!(
                    "(line={line}, sample={sample}, band={band}) outside ({}, {}, {})",
                    self.lines, self.samples, self.bands
                ),
            });
        }
        Ok(())
    }

    pub(crate) fn check_flat(&self, flat: usize) -> Result<(), CubeError> {
        if flat >= self.element_count() {
            return Err(CubeError::IndexOutOfRange {
                message: format!("flat index {flat} outside {} elements", self.element_count()),
            });
        }
        Ok(())
    }
}

/// The capability interface every interleave reader implements.
///
/// All accessors ending in `_raw` return values decoded as if the host's
/// native byte order were the on-disk order: no swap is performed, matching
/// the "raw in-place accessors stay in on-disk order" rule. Cooked accessors
/// on [`crate::cube::Cube`] call through to these and then apply the byte
/// swap, bad-band mask, and extrema bookkeeping documented there.
pub trait Reader: fmt::Debug {
    fn geometry(&self) -> &Geometry;

    /// Value at `(line, sample, band)`, decoded assuming host byte order.
    fn get_pixel(&self, line: usize, sample: usize, band: usize) -> Result<CubeValue, CubeError>;

    /// All samples of `band`, shaped `(lines, samples)`, row-major.
    fn get_band_raw(&self, band: usize) -> Result<CubeBuffer, CubeError>;

    /// The spectrum at `(line, sample)`, length `bands`.
    fn get_spectrum_raw(&self, line: usize, sample: usize) -> Result<CubeBuffer, CubeError>;

    /// The focal plane at `line`, shaped `(bands, samples)`.
    fn get_focal_plane_raw(&self, line: usize) -> Result<CubeBuffer, CubeError>;

    /// The column `(sample, band)` traced down every line, length `lines`.
    fn get_focal_plane_depth_raw(&self, sample: usize, band: usize) -> Result<CubeBuffer, CubeError>;

    /// `(bands, samples)` copy of `line`; contractually identical in shape to
    /// `get_focal_plane_raw` for every interleave. The original source's
    /// per-interleave transpose placement was inconsistent (its BIP variant
    /// skipped a transpose its BIL/BSQ variants performed); this fixes the
    /// contract to a single uniform `(bands, samples)` shape by reusing the
    /// focal plane directly rather than re-deriving a transpose per interleave.
    fn get_line_of_spectra_raw(&self, line: usize) -> Result<CubeBuffer, CubeError> {
        self.get_focal_plane_raw(line)
    }

    /// Flat-index stride between consecutive bands in this interleave's layout.
    fn band_boundary(&self) -> usize;

    fn loc_to_flat(&self, line: usize, sample: usize, band: usize) -> Result<usize, CubeError>;

    fn flat_to_loc(&self, flat: usize) -> Result<(usize, usize, usize), CubeError>;

    /// Flush any pending writes back to the byte source. A no-op for
    /// read-only sources; meaningful once a writable mapping is supported.
    fn save(&self) -> Result<(), CubeError> {
        Ok(())
    }
}

