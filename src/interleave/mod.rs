//! The three interleave-specific `Reader` implementations, plus the
//! interleave tag shared across the descriptor, the readers, and the
//! streaming re-interleaver.

mod bil;
mod bip;
mod bsq;

pub use bil::BilReader;
pub use bip::BipReader;
pub use bsq::BsqReader;

use crate::byte_source::ByteSource;
use crate::error::CubeError;
use crate::reader::{Geometry, Reader};
use serde::{Deserialize, Serialize};

/// On-disk axis ordering of a cube, as carried by the cube descriptor and
/// used both to select a [`Reader`] implementation and to tag a streaming
/// re-interleave target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interleave {
    /// Band-interleaved-by-pixel: `(lines, samples, bands)`, band fastest.
    Bip,
    /// Band-interleaved-by-line: `(lines, bands, samples)`, sample fastest.
    Bil,
    /// Band-sequential: `(bands, lines, samples)`, sample fastest.
    Bsq,
}

impl Interleave {
    /// Parse a wire-form interleave tag, case-insensitively.
    pub fn from_tag(tag: &str) -> Result<Self, CubeError> {
        match tag.to_ascii_lowercase().as_str() {
            "bip" => Ok(Self::Bip),
            "bil" => Ok(Self::Bil),
            "bsq" => Ok(Self::Bsq),
            other => Err(CubeError::UnsupportedInterleave {
                message: format!("unknown interleave tag: {other}"),
            }),
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Self::Bip => "bip",
            Self::Bil => "bil",
            Self::Bsq => "bsq",
        }
    }
}

/// Construct the concrete [`Reader`] for `interleave` over `source`, whose
/// data region starts at `data_offset` within `source`.
pub fn build_reader(
    interleave: Interleave,
    source: ByteSource,
    data_offset: usize,
    geometry: Geometry,
) -> Box<dyn Reader> {
    match interleave {
        Interleave::Bip => Box::new(BipReader::new(source, data_offset, geometry)),
        Interleave::Bil => Box::new(BilReader::new(source, data_offset, geometry)),
        Interleave::Bsq => Box::new(BsqReader::new(source, data_offset, geometry)),
    }
}
