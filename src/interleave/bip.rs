//! Band-interleaved-by-pixel reader: natural shape `(lines, samples, bands)`,
//! band varies fastest on disk.

use crate::byte_source::ByteSource;
use crate::dtype::{ByteOrder, CubeBuffer, CubeValue};
use crate::error::CubeError;
use crate::reader::{Geometry, Reader};

#[derive(Debug)]
pub struct BipReader {
    source: ByteSource,
    data_offset: usize,
    geometry: Geometry,
}

impl BipReader {
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
}

impl Reader for BipReader {
    fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    fn get_pixel(&self, line: usize, sample: usize, band: usize) -> Result<CubeValue, CubeError> {
        self.geometry.check_loc(line, sample, band)?;
        let flat = self.loc_to_flat(line, sample, band)?;
        Ok(CubeBuffer::decode_one(
            self.bytes(),
            self.data_offset,
            self.geometry.dtype,
            ByteOrder::host(),
            flat,
        ))
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
            for s in 0..g.samples {
                let flat = l * g.samples * g.bands + s * g.bands + band;
                out.push(CubeBuffer::decode_one(
                    self.bytes(),
                    self.data_offset,
                    g.dtype,
                    ByteOrder::host(),
                    flat,
                ));
            }
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
        let flat = line * g.samples * g.bands + sample * g.bands;
        let mut out = CubeBuffer::with_capacity(g.dtype, g.bands);
        let byte_offset = self.data_offset + flat * g.dtype.item_size();
        out.extend_decode(self.bytes(), byte_offset, ByteOrder::host(), g.bands);
        Ok(out)
    }

    fn get_focal_plane_raw(&self, line: usize) -> Result<CubeBuffer, CubeError> {
        let g = &self.geometry;
        if line >= g.lines {
            return Err(CubeError::IndexOutOfRange {
                message: format!("line {line} outside {} lines", g.lines),
            });
        }
        // Shape (bands, samples): transpose of the on-disk (samples, bands) block.
        let mut out = CubeBuffer::with_capacity(g.dtype, g.bands * g.samples);
        for b in 0..g.bands {
            for s in 0..g.samples {
                let flat = line * g.samples * g.bands + s * g.bands + b;
                out.push(CubeBuffer::decode_one(
                    self.bytes(),
                    self.data_offset,
                    g.dtype,
                    ByteOrder::host(),
                    flat,
                ));
            }
        }
        Ok(out)
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
            let flat = l * g.samples * g.bands + sample * g.bands + band;
            out.push(CubeBuffer::decode_one(
                self.bytes(),
                self.data_offset,
                g.dtype,
                ByteOrder::host(),
                flat,
            ));
        }
        Ok(out)
    }

    fn band_boundary(&self) -> usize {
        1
    }

    fn loc_to_flat(&self, line: usize, sample: usize, band: usize) -> Result<usize, CubeError> {
        self.geometry.check_loc(line, sample, band)?;
        let g = &self.geometry;
        Ok(line * g.samples * g.bands + sample * g.bands + band)
    }

    fn flat_to_loc(&self, flat: usize) -> Result<(usize, usize, usize), CubeError> {
        self.geometry.check_flat(flat)?;
        let g = &self.geometry;
        let band = flat % g.bands;
        let rem = flat / g.bands;
        let sample = rem % g.samples;
        let line = rem / g.samples;
        Ok((line, sample, band))
    }
}
