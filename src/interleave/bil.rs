//! Band-interleaved-by-line reader: natural shape `(lines, bands, samples)`,
//! sample varies fastest within a line's band block.

use crate::byte_source::ByteSource;
use crate::dtype::{ByteOrder, CubeBuffer, CubeValue};
use crate::error::CubeError;
use crate::reader::{Geometry, Reader};

#[derive(Debug)]
pub struct BilReader {
    source: ByteSource,
    data_offset: usize,
    geometry: Geometry,
}

impl BilReader {
    pub fn new(source: ByteSource, data_offset: usize, geometry: Geometry) -> Self {
        Self {
            source,
            data_offset,
            geometry,
        }
    }

    fn bytes(&self) -> &[u8] {
        self.source.as_slice()
    }

    fn decode_one(&self, flat: usize) -> CubeValue {
        CubeBuffer::decode_one(self.bytes(), self.data_offset, self.geometry.dtype, ByteOrder::host(), flat)
    }
}

impl Reader for BilReader {
    fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    fn get_pixel(&self, line: usize, sample: usize, band: usize) -> Result<CubeValue, CubeError> {
        let flat = self.loc_to_flat(line, sample, band)?;
        Ok(self.decode_one(flat))
    }

    fn get_band_raw(&self, band: usize) -> Result<CubeBuffer, CubeError> {
        let g = &self.geometry;
        if band >= g.bands {
            return Err(CubeError::IndexOutOfRange {
                message: format!("band {band} outside {} bands", g.bands),
            });
        }
        let mut out = CubeBuffer::with_capacity(g.dtype, g.lines * g.samples);
        for l in 0..g.lines {
            let flat = l * g.bands * g.samples + band * g.samples;
            let byte_offset = self.data_offset + flat * g.dtype.item_size();
            out.extend_decode(self.bytes(), byte_offset, ByteOrder::host(), g.samples);
        }
        Ok(out)
    }

    fn get_spectrum_raw(&self, line: usize, sample: usize) -> Result<CubeBuffer, CubeError> {
        let g = &self.geometry;
        if line >= g.lines || sample >= g.samples {
            return Err(CubeError::IndexOutOfRange {
                message: format!("(line={line}, sample={sample}) outside ({}, {})", g.lines, g.samples),
            });
        }
        let mut out = CubeBuffer::with_capacity(g.dtype, g.bands);
        for b in 0..g.bands {
            let flat = line * g.bands * g.samples + b * g.samples + sample;
            out.push(self.decode_one(flat));
        }
        Ok(out)
    }

    fn get_focal_plane_raw(&self, line: usize) -> Result<CubeBuffer, CubeError> {
        let g = &self.geometry;
        if line >= g.lines {
            return Err(CubeError::IndexOutOfRange {
                message: format!("line {line} outside {} lines", g.lines),
            });
        }
        // Shape (bands, samples): already contiguous on disk for BIL.
        let flat = line * g.bands * g.samples;
        let byte_offset = self.data_offset + flat * g.dtype.item_size();
        Ok(CubeBuffer::decode(self.bytes(), byte_offset, g.dtype, ByteOrder::host(), g.bands * g.samples))
    }

    fn get_focal_plane_depth_raw(&self, sample: usize, band: usize) -> Result<CubeBuffer, CubeError> {
        let g = &self.geometry;
        if sample >= g.samples || band >= g.bands {
            return Err(CubeError::IndexOutOfRange {
                message: format!("(sample={sample}, band={band}) outside ({}, {})", g.samples, g.bands),
            });
        }
        let mut out = CubeBuffer::with_capacity(g.dtype, g.lines);
        for l in 0..g.lines {
            let flat = l * g.bands * g.samples + band * g.samples + sample;
            out.push(self.decode_one(flat));
        }
        Ok(out)
    }

    fn band_boundary(&self) -> usize {
        self.geometry.samples
    }

    fn loc_to_flat(&self, line: usize, sample: usize, band: usize) -> Result<usize, CubeError> {
        self.geometry.check_loc(line, sample, band)?;
        let g = &self.geometry;
        Ok(line * g.bands * g.samples + band * g.samples + sample)
    }

    fn flat_to_loc(&self, flat: usize) -> Result<(usize, usize, usize), CubeError> {
        self.geometry.check_flat(flat)?;
        let g = &self.geometry;
        let sample = flat % g.samples;
        let rem = flat / g.samples;
        let band = rem % g.bands;
        let line = rem / g.bands;
        Ok((line, sample, band))
    }
}
