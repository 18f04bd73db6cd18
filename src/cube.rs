//! The cube descriptor: the single source of truth about an HSI cube's
//! geometry, data type, byte order, offsets, and metadata.
//!
//! A [`Cube`] owns its [`Reader`] exclusively; the Reader in turn owns (or
//! keeps alive) the mapped byte source. Dropping the Cube releases both.

use crate::byte_source::{self, ByteSource, VfsHook};
use crate::dtype::{ByteOrder, CubeBuffer, CubeValue, DataType};
use crate::error::CubeError;
use crate::interleave::{self, Interleave};
use crate::reader::{Geometry, Reader};
use crate::wavelength::{self, WavelengthUnit};
use serde::Serialize;

/// Geometry, data type, byte order, offsets, and metadata for one HSI cube.
///
/// Created empty, populated by a header parser (or by [`create_cube`]), bound
/// via [`Cube::open`], queried, optionally [`Cube::save`]d, and dropped.
pub struct Cube {
    pub url: Option<String>,

    pub lines: usize,
    pub samples: usize,
    pub bands: usize,

    pub interleave: Option<Interleave>,
    pub data_type: Option<DataType>,
    pub byte_order: Option<ByteOrder>,
    pub item_size: usize,

    pub file_offset: usize,
    pub header_offset: usize,
    pub data_offset: usize,
    data_offset_explicit: bool,
    pub data_bytes: usize,

    pub wavelengths: Vec<f64>,
    pub bbl: Vec<u8>,
    pub fwhm: Vec<f64>,
    pub band_names: Vec<String>,
    pub wavelength_units: Option<WavelengthUnit>,

    pub scale_factor: Option<f64>,

    pub utm_x: Option<f64>,
    pub utm_y: Option<f64>,
    pub utm_zone: Option<i32>,
    pub georef_x: Option<f64>,
    pub georef_y: Option<f64>,

    pub description: Option<String>,
    pub mtime: Option<i64>,

    spectra_min: Option<f64>,
    spectra_max: Option<f64>,

    reader: Option<Box<dyn Reader>>,
}

impl std::fmt::Debug for Cube {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cube")
            .field("url", &self.url)
            .field("lines", &self.lines)
            .field("samples", &self.samples)
            .field("bands", &self.bands)
            .field("interleave", &self.interleave)
            .field("data_type", &self.data_type)
            .field("byte_order", &self.byte_order)
            .field("has_reader", &self.reader.is_some())
            .finish()
    }
}

/// A caller-facing, serializable snapshot of a cube's metadata.
///
/// Produced by [`Cube::describe`]; formatting it (plain text, JSON, a table)
/// is left entirely to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct CubeDescription {
    pub url: Option<String>,
    pub lines: usize,
    pub samples: usize,
    pub bands: usize,
    pub interleave: Option<&'static str>,
    pub data_type_code: Option<i32>,
    pub byte_order_code: Option<i32>,
    pub scale_factor: Option<f64>,
    pub wavelength_units: Option<&'static str>,
    pub description: Option<String>,
    pub spectra_min: Option<f64>,
    pub spectra_max: Option<f64>,
}

impl Default for Cube {
    fn default() -> Self {
        Self {
            url: None,
            lines: 0,
            samples: 0,
            bands: 0,
            interleave: None,
            data_type: None,
            byte_order: None,
            item_size: 0,
            file_offset: 0,
            header_offset: 0,
            data_offset: 0,
            data_offset_explicit: false,
            data_bytes: 0,
            wavelengths: Vec::new(),
            bbl: Vec::new(),
            fwhm: Vec::new(),
            band_names: Vec::new(),
            wavelength_units: None,
            scale_factor: None,
            utm_x: None,
            utm_y: None,
            utm_zone: None,
            georef_x: None,
            georef_y: None,
            description: None,
            mtime: None,
            spectra_min: None,
            spectra_max: None,
            reader: None,
        }
    }
}

impl Cube {
    /// A fresh, empty descriptor, as a header parser would start from.
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicitly set `data_offset`, overriding the `file_offset + header_offset`
    /// default that `initialize` would otherwise compute.
    pub fn set_data_offset(&mut self, offset: usize) {
        self.data_offset = offset;
        self.data_offset_explicit = true;
    }

    /// Idempotently derive `item_size`, `data_bytes`, and `data_offset` from
    /// whatever geometry and offsets are already populated.
    pub fn initialize(&mut self, data_type: Option<DataType>, byte_order: Option<ByteOrder>) {
        if let Some(dt) = data_type {
            self.data_type = Some(dt);
        }
        if let Some(bo) = byte_order {
            self.byte_order = Some(bo);
        }
        self.item_size = self.data_type.map(|d| d.item_size()).unwrap_or(0);
        if self.data_bytes == 0 {
            self.data_bytes = self.item_size * self.lines * self.samples * self.bands;
        }
        if !self.data_offset_explicit {
            self.data_offset = self.file_offset + self.header_offset;
        }
    }

    /// Resolve `url` into a byte source, build the interleave-specific
    /// [`Reader`], and verify/derive attributes.
    ///
    /// The descriptor must already carry geometry, `interleave`, and
    /// `data_type` (as a header parser is contracted to populate) before
    /// this is called.
    pub fn open(&mut self, url: &str, vfs: Option<&dyn VfsHook>) -> Result<(), CubeError> {
        self.url = Some(url.to_string());
        self.initialize(None, None);

        if self.lines == 0 || self.samples == 0 || self.bands == 0 {
            return Err(CubeError::CorruptDescriptor {
                message: "lines, samples, and bands must all be set before open".to_string(),
            });
        }
        let interleave = self.interleave.ok_or_else(|| CubeError::UnsupportedInterleave {
            message: "interleave not set on descriptor".to_string(),
        })?;
        let data_type = self.data_type.ok_or_else(|| CubeError::CorruptDescriptor {
            message: "data_type not set on descriptor".to_string(),
        })?;
        let byte_order = self.byte_order.unwrap_or_else(ByteOrder::host);
        self.byte_order = Some(byte_order);

        let source = byte_source::open(url, vfs)?;
        // Validates the descriptor's offsets/length against the resolved
        // source before a reader is ever built over it; the slice itself is
        // discarded since the reader re-derives it from `source` + `data_offset`.
        byte_source::slice_data(&source, self.data_offset, self.data_bytes)?;

        let geometry = Geometry {
            lines: self.lines,
            samples: self.samples,
            bands: self.bands,
            dtype: data_type,
        };
        log::debug!(
            "opening cube url={url} interleave={} geometry=({}, {}, {})",
            interleave.tag(),
            self.lines,
            self.samples,
            self.bands
        );
        self.reader = Some(interleave::build_reader(interleave, source, self.data_offset, geometry));
        self.record_mtime(url, vfs);
        self.verify_attributes();
        Ok(())
    }

    fn record_mtime(&mut self, url: &str, vfs: Option<&dyn VfsHook>) {
        if let Some(path) = url.strip_prefix("file:") {
            if let Ok(meta) = std::fs::metadata(path) {
                if let Ok(modified) = meta.modified() {
                    if let Ok(since_epoch) = modified.duration_since(std::time::UNIX_EPOCH) {
                        self.mtime = Some(since_epoch.as_secs() as i64);
                    }
                }
            }
        } else if let Some(vfs) = vfs {
            self.mtime = vfs.get_mtime(url);
        }
    }

    /// Fill in defaultable attributes after a successful `open`.
    ///
    /// Never substitutes defaults for geometry or `data_type`; only for
    /// values the format genuinely leaves optional (scale, bbl, units).
    pub fn verify_attributes(&mut self) {
        if self.scale_factor.is_none() {
            let default = match self.data_type {
                Some(dt) if dt.is_integer() => 10000.0,
                _ => 1.0,
            };
            log::debug!("defaulting scale_factor to {default}");
            self.scale_factor = Some(default);
        }
        if self.bbl.is_empty() && self.bands > 0 {
            self.bbl = vec![1u8; self.bands];
        }
        if self.wavelength_units.is_none() {
            if let Some(&last) = self.wavelengths.last() {
                self.wavelength_units = Some(wavelength::guess_unit(last));
            }
        }
    }

    fn reader(&self) -> Result<&dyn Reader, CubeError> {
        self.reader.as_deref().ok_or_else(|| CubeError::CorruptDescriptor {
            message: "cube has no bound reader; call open() or create_cube() first".to_string(),
        })
    }

    fn needs_swap(&self) -> bool {
        match self.byte_order {
            Some(bo) => !bo.is_host(),
            None => false,
        }
    }

    fn effective_bbl(&self) -> Vec<u8> {
        if self.bbl.len() == self.bands {
            self.bbl.clone()
        } else {
            vec![1u8; self.bands]
        }
    }

    /// Widen `spectra_min`/`spectra_max` to include every value in `buf`.
    pub fn update_extrema(&mut self, buf: &CubeBuffer) {
        if let Some((min, max)) = buf.min_max_f64() {
            self.spectra_min = Some(self.spectra_min.map_or(min, |m| m.min(min)));
            self.spectra_max = Some(self.spectra_max.map_or(max, |m| m.max(max)));
        }
    }

    pub fn spectra_extrema(&self) -> (Option<f64>, Option<f64>) {
        (self.spectra_min, self.spectra_max)
    }

    // -- raw (in-place, on-disk byte order) accessors -----------------------

    pub fn get_pixel(&self, line: usize, sample: usize, band: usize) -> Result<CubeValue, CubeError> {
        self.reader()?.get_pixel(line, sample, band)
    }

    pub fn get_band_raw(&self, band: usize) -> Result<CubeBuffer, CubeError> {
        self.reader()?.get_band_raw(band)
    }

    pub fn get_spectrum_raw(&self, line: usize, sample: usize) -> Result<CubeBuffer, CubeError> {
        self.reader()?.get_spectrum_raw(line, sample)
    }

    pub fn get_focal_plane_raw(&self, line: usize) -> Result<CubeBuffer, CubeError> {
        self.reader()?.get_focal_plane_raw(line)
    }

    pub fn get_focal_plane_depth_raw(&self, sample: usize, band: usize) -> Result<CubeBuffer, CubeError> {
        self.reader()?.get_focal_plane_depth_raw(sample, band)
    }

    pub fn band_boundary(&self) -> Result<usize, CubeError> {
        Ok(self.reader()?.band_boundary())
    }

    pub fn loc_to_flat(&self, line: usize, sample: usize, band: usize) -> Result<usize, CubeError> {
        self.reader()?.loc_to_flat(line, sample, band)
    }

    pub fn flat_to_loc(&self, flat: usize) -> Result<(usize, usize, usize), CubeError> {
        self.reader()?.flat_to_loc(flat)
    }

    pub fn save(&self) -> Result<(), CubeError> {
        self.reader()?.save()
    }

    // -- cooked (host byte order, owned) accessors --------------------------

    /// Copy of band `band`, byte-swapped to host order, extrema widened.
    pub fn get_band(&mut self, band: usize) -> Result<CubeBuffer, CubeError> {
        let mut buf = self.reader()?.get_band_raw(band)?;
        if self.needs_swap() {
            buf.byteswap_in_place();
        }
        self.update_extrema(&buf);
        Ok(buf)
    }

    /// Copy of the spectrum at `(line, sample)`, byte-swapped, `*= bbl`,
    /// extrema widened.
    pub fn get_spectrum(&mut self, line: usize, sample: usize) -> Result<CubeBuffer, CubeError> {
        let mut buf = self.reader()?.get_spectrum_raw(line, sample)?;
        if self.needs_swap() {
            buf.byteswap_in_place();
        }
        buf.apply_bbl(&self.effective_bbl());
        self.update_extrema(&buf);
        Ok(buf)
    }

    /// `(bands, samples)` copy of `line`, byte-swapped, `*= bbl` per band row,
    /// extrema widened. Shape-unified across interleaves (see
    /// [`crate::reader::Reader::get_line_of_spectra_raw`]).
    pub fn get_line_of_spectra(&mut self, line: usize) -> Result<CubeBuffer, CubeError> {
        let samples = self.samples;
        let mut buf = self.reader()?.get_line_of_spectra_raw(line)?;
        if self.needs_swap() {
            buf.byteswap_in_place();
        }
        buf.apply_bbl_rows(&self.effective_bbl(), samples);
        self.update_extrema(&buf);
        Ok(buf)
    }

    // -- wavelength services --------------------------------------------

    /// Bands nearest 660/550/440 nm, or `[0]` when there aren't enough bands
    /// or wavelengths to judge, or a single-element list if all three
    /// collapse onto the same band.
    pub fn guess_display_bands(&self) -> Vec<usize> {
        let unit = self.wavelength_units.unwrap_or(WavelengthUnit::Nanometers);
        wavelength::guess_display_bands(&self.wavelengths, self.bands, unit)
    }

    /// Bands whose `bbl == 1` and whose wavelength lies in `[min, max]`,
    /// both given in `units` and normalized into the cube's own units.
    pub fn get_band_list_by_wavelength(&self, min: f64, max: Option<f64>, units: &str) -> Vec<usize> {
        let max = max.unwrap_or(min);
        let cube_unit = self.wavelength_units.unwrap_or(WavelengthUnit::Nanometers);
        let norm_min = wavelength::normalize(min, units, cube_unit);
        let norm_max = wavelength::normalize(max, units, cube_unit);
        wavelength::band_list_in_range(&self.wavelengths, &self.bbl, norm_min, norm_max)
    }

    /// A human-readable label for `band`, using its wavelength if known.
    pub fn band_name(&self, band: usize) -> String {
        if let Some(name) = self.band_names.get(band) {
            if !name.is_empty() {
                return name.clone();
            }
        }
        wavelength::describe_band(band, self.wavelengths.get(band).copied(), self.wavelength_units)
    }

    /// A structured, serializable snapshot of this cube's metadata.
    pub fn describe(&self) -> CubeDescription {
        CubeDescription {
            url: self.url.clone(),
            lines: self.lines,
            samples: self.samples,
            bands: self.bands,
            interleave: self.interleave.map(Interleave::tag),
            data_type_code: self.data_type.map(DataType::code),
            byte_order_code: self.byte_order.map(ByteOrder::code),
            scale_factor: self.scale_factor,
            wavelength_units: self.wavelength_units.map(|u| match u {
                WavelengthUnit::Nanometers => "nm",
                WavelengthUnit::Micrometers => "um",
            }),
            description: self.description.clone(),
            spectra_min: self.spectra_min,
            spectra_max: self.spectra_max,
        }
    }
}

/// Build a [`Cube`] directly from an in-memory buffer (or a fresh
/// zero-allocated one), bypassing `open`.
///
/// - `data = Some(bytes)` reinterprets the caller's bytes as `data_type`.
/// - `data = None, dummy = false` allocates a fresh zeroed buffer of
///   `lines * samples * bands` elements.
/// - `dummy = true` builds a descriptor-only cube with no reader at all.
#[allow(clippy::too_many_arguments)]
pub fn create_cube(
    interleave: Interleave,
    lines: usize,
    samples: usize,
    bands: usize,
    data_type: Option<DataType>,
    byte_order: Option<ByteOrder>,
    scale_factor: Option<f64>,
    data: Option<Vec<u8>>,
    dummy: bool,
) -> Result<Cube, CubeError> {
    if lines == 0 || samples == 0 || bands == 0 {
        return Err(CubeError::CorruptDescriptor {
            message: "lines, samples, and bands must all be positive".to_string(),
        });
    }
    let mut cube = Cube::new();
    cube.lines = lines;
    cube.samples = samples;
    cube.bands = bands;
    cube.interleave = Some(interleave);
    cube.scale_factor = scale_factor;
    cube.initialize(Some(data_type.unwrap_or_default()), Some(byte_order.unwrap_or_else(ByteOrder::host)));

    if !dummy {
        let dtype = cube.data_type.unwrap();
        let buffer = match data {
            Some(bytes) => bytes,
            None => vec![0u8; cube.data_bytes],
        };
        let source = ByteSource::Owned(buffer);
        byte_source::slice_data(&source, 0, cube.data_bytes)?;
        let geometry = Geometry {
            lines,
            samples,
            bands,
            dtype,
        };
        cube.reader = Some(interleave::build_reader(interleave, source, 0, geometry));
    }
    cube.verify_attributes();
    Ok(cube)
}
