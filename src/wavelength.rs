//! Wavelength unit normalization, band-by-wavelength selection, and
//! descriptive band naming.

use serde::{Deserialize, Serialize};

/// Units a cube's `wavelengths` array may be expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WavelengthUnit {
    Nanometers,
    Micrometers,
}

impl WavelengthUnit {
    /// Parse a unit tag, accepting the metric names the unit-scale table covers:
    /// meters, nanometers, micrometers (case-insensitive, a few common spellings).
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "nm" | "nanometers" | "nanometer" => Some(Self::Nanometers),
            "um" | "micrometers" | "micrometer" | "microns" | "micron" => Some(Self::Micrometers),
            _ => None,
        }
    }

    /// Scale factor to convert a value in this unit into meters.
    fn to_meters_factor(self) -> f64 {
        match self {
            Self::Nanometers => 1e-9,
            Self::Micrometers => 1e-6,
        }
    }
}

/// Convert `value`, a "meters" tag, or any of `{nm, um}`, into `to`.
///
/// Implements the meters -> nanometers -> micrometers unit-scale table
/// referenced by `get_band_list_by_wavelength`.
pub fn normalize(value: f64, from_tag: &str, to: WavelengthUnit) -> f64 {
    let meters = match from_tag.to_ascii_lowercase().as_str() {
        "m" | "meters" | "meter" => value,
        other => match WavelengthUnit::parse(other) {
            Some(unit) => value * unit.to_meters_factor(),
            None => value * to.to_meters_factor(), // unrecognized tag: assume already in `to`
        },
    };
    meters / to.to_meters_factor()
}

/// Heuristic used when a cube has wavelengths but no declared units: values
/// below 100 are assumed to be micrometers, otherwise nanometers.
pub fn guess_unit(last_wavelength: f64) -> WavelengthUnit {
    if last_wavelength < 100.0 {
        WavelengthUnit::Micrometers
    } else {
        WavelengthUnit::Nanometers
    }
}

/// Bands whose wavelength falls in `[min, max]` (inclusive) and whose
/// bad-band flag is set, both already normalized into the cube's units.
///
/// When the window captures nothing, falls back to the nearest edge band
/// (first if the window is below the cube's range, last if above, otherwise
/// the single closest band), per the wavelength-selection contract.
pub fn band_list_in_range(wavelengths: &[f64], bbl: &[u8], min: f64, max: f64) -> Vec<usize> {
    if wavelengths.is_empty() {
        return Vec::new();
    }
    let usable = |b: usize| bbl.get(b).copied().unwrap_or(1) == 1;

    let in_window: Vec<usize> = (0..wavelengths.len())
        .filter(|&b| usable(b) && wavelengths[b] >= min && wavelengths[b] <= max)
        .collect();
    if !in_window.is_empty() {
        return in_window;
    }

    let center = (min + max) / 2.0;
    if center < wavelengths[0] {
        if let Some(b) = (0..wavelengths.len()).find(|&b| usable(b)) {
            return vec![b];
        }
        return Vec::new();
    }
    if center > wavelengths[wavelengths.len() - 1] {
        if let Some(b) = (0..wavelengths.len()).rev().find(|&b| usable(b)) {
            return vec![b];
        }
        return Vec::new();
    }

    (0..wavelengths.len())
        .filter(|&b| usable(b))
        .min_by(|&a, &b| {
            let da = (wavelengths[a] - center).abs();
            let db = (wavelengths[b] - center).abs();
            da.total_cmp(&db)
        })
        .map(|b| vec![b])
        .unwrap_or_default()
}

/// Nearest band to each of 660 nm (red), 550 nm (green), 440 nm (blue),
/// returning `[red, green, blue]` band indices, or a single band when all
/// three collapse onto it, or `[0]` when there aren't enough bands or
/// wavelengths to judge.
pub fn guess_display_bands(wavelengths: &[f64], bands: usize, unit: WavelengthUnit) -> Vec<usize> {
    if bands < 3 || wavelengths.len() != bands {
        return vec![0];
    }
    let targets_nm = [660.0_f64, 550.0, 440.0];
    let picks: Vec<usize> = targets_nm
        .iter()
        .map(|&target_nm| {
            let target = normalize(target_nm, "nm", unit);
            (0..wavelengths.len())
                .min_by(|&a, &b| {
                    let da = (wavelengths[a] - target).abs();
                    let db = (wavelengths[b] - target).abs();
                    da.total_cmp(&db)
                })
                .unwrap_or(0)
        })
        .collect();

    if picks.iter().all(|&b| b == picks[0]) {
        vec![picks[0]]
    } else {
        picks
    }
}

/// A human-readable band label: `"Band N (wavelength unit)"` when a
/// wavelength is known, else plain `"Band N"`. `index` is 0-based.
pub fn describe_band(index: usize, wavelength: Option<f64>, unit: Option<WavelengthUnit>) -> String {
    match (wavelength, unit) {
        (Some(wl), Some(unit)) => {
            let suffix = match unit {
                WavelengthUnit::Nanometers => "nm",
                WavelengthUnit::Micrometers => "um",
            };
            format!("Band {} ({:.2} {})", index + 1, wl, suffix)
        }
        (Some(wl), None) => format!("Band {} ({:.2})", index + 1, wl),
        _ => format!("Band {}", index + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn normalize_round_trips_through_meters() {
        // 1.65 um and 1650 nm are the same wavelength; going through the
        // meters intermediate picks up float rounding, so compare loosely.
        let nm = normalize(1.65, "um", WavelengthUnit::Nanometers);
        assert_relative_eq!(nm, 1650.0, epsilon = 1e-6);

        let um = normalize(nm, "nm", WavelengthUnit::Micrometers);
        assert_relative_eq!(um, 1.65, epsilon = 1e-9);
    }

    #[test]
    fn range_select_exact_window() {
        let wavelengths: Vec<f64> = (0..20).map(|i| 400.0 + 10.0 * i as f64).collect();
        let bbl = vec![1u8; wavelengths.len()];
        let bands = band_list_in_range(&wavelengths, &bbl, 500.0, 550.0);
        assert_eq!(bands, vec![10, 11, 12, 13, 14, 15]);
    }

    #[test]
    fn range_select_below_range_picks_first() {
        let wavelengths: Vec<f64> = (0..20).map(|i| 400.0 + 10.0 * i as f64).collect();
        let bbl = vec![1u8; wavelengths.len()];
        assert_eq!(band_list_in_range(&wavelengths, &bbl, 300.0, 300.0), vec![0]);
    }

    #[test]
    fn range_select_above_range_picks_last() {
        let wavelengths: Vec<f64> = (0..20).map(|i| 400.0 + 10.0 * i as f64).collect();
        let bbl = vec![1u8; wavelengths.len()];
        assert_eq!(
            band_list_in_range(&wavelengths, &bbl, 2000.0, 2000.0),
            vec![19]
        );
    }

    #[test]
    fn display_bands_pick_rgb() {
        let wavelengths = vec![440.0, 550.0, 660.0, 770.0];
        let picks = guess_display_bands(&wavelengths, 4, WavelengthUnit::Nanometers);
        assert_eq!(picks, vec![2, 1, 0]);
    }
}
