//! End-to-end scenarios and cross-cutting invariants exercised through the
//! public API: addressing arithmetic per interleave, pixel consistency
//! across accessor views, byte-order neutrality, display-band guessing, and
//! round-tripping through the streaming re-interleaver.

use hsicube::{create_cube, CubeValue, Interleave};
use hsicube::dtype::{ByteOrder, DataType};
use hsicube::reinterleave::write_raw;

fn arange_bytes(n: i16) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(n as usize * 2);
    for v in 0..n {
        bytes.extend_from_slice(&v.to_ne_bytes());
    }
    bytes
}

fn arange_cube(interleave: Interleave, byte_order: ByteOrder) -> hsicube::Cube {
    create_cube(
        interleave,
        4,
        5,
        3,
        Some(DataType::Int16),
        Some(byte_order),
        None,
        Some(arange_bytes(60)),
        false,
    )
    .unwrap()
}

fn i16_at(cube: &hsicube::Cube, l: usize, s: usize, b: usize) -> i16 {
    match cube.get_pixel(l, s, b).unwrap() {
        CubeValue::Int16(v) => v,
        other => panic!("expected Int16, got {other:?}"),
    }
}

#[test]
fn s1_bip_addressing() {
    let cube = arange_cube(Interleave::Bip, ByteOrder::host());

    assert_eq!(i16_at(&cube, 0, 0, 0), 0);
    assert_eq!(i16_at(&cube, 0, 0, 1), 1);
    assert_eq!(i16_at(&cube, 0, 0, 2), 2);
    assert_eq!(i16_at(&cube, 0, 1, 0), 3);
    assert_eq!(i16_at(&cube, 1, 0, 0), 15);

    assert_eq!(cube.loc_to_flat(1, 0, 0).unwrap(), 15);
    assert_eq!(cube.flat_to_loc(59).unwrap(), (3, 4, 2));
}

#[test]
fn s2_bil_addressing() {
    let cube = arange_cube(Interleave::Bil, ByteOrder::host());

    assert_eq!(i16_at(&cube, 0, 0, 0), 0);
    assert_eq!(i16_at(&cube, 0, 0, 1), 5);
    assert_eq!(i16_at(&cube, 0, 1, 0), 1);
    assert_eq!(cube.loc_to_flat(1, 0, 0).unwrap(), 15);
}

#[test]
fn s3_bsq_addressing() {
    let cube = arange_cube(Interleave::Bsq, ByteOrder::host());

    assert_eq!(i16_at(&cube, 0, 0, 0), 0);
    assert_eq!(i16_at(&cube, 0, 0, 1), 20);
    assert_eq!(i16_at(&cube, 1, 0, 0), 5);
}

#[test]
fn s4_reinterleave_to_bsq_matches_canonical_layout_at_small_block_size() {
    let cube = arange_cube(Interleave::Bip, ByteOrder::host());
    let mut out = Vec::new();
    write_raw(&cube, Interleave::Bsq, &mut out, 7, None).unwrap();

    let mut expected = Vec::new();
    for b in 0..3 {
        for l in 0..4 {
            for s in 0..5 {
                let flat = (l * 5 * 3 + s * 3 + b) as i16;
                expected.extend_from_slice(&flat.to_ne_bytes());
            }
        }
    }
    assert_eq!(out, expected);
}

#[test]
fn s5_guess_display_bands_picks_rgb_order() {
    let mut cube = create_cube(
        Interleave::Bip,
        1,
        1,
        4,
        Some(DataType::Int16),
        None,
        None,
        None,
        false,
    )
    .unwrap();
    cube.wavelengths = vec![440.0, 550.0, 660.0, 770.0];

    assert_eq!(cube.guess_display_bands(), vec![2, 1, 0]);
}

#[test]
fn s6_byte_order_neutrality_of_cooked_spectrum() {
    let mut host_cube = arange_cube(Interleave::Bip, ByteOrder::host());
    let swapped_order = match ByteOrder::host() {
        ByteOrder::Little => ByteOrder::Big,
        ByteOrder::Big => ByteOrder::Little,
    };

    let mut swapped_bytes = Vec::with_capacity(120);
    for v in 0..60i16 {
        let be_bytes = match swapped_order {
            ByteOrder::Big => v.to_be_bytes(),
            ByteOrder::Little => v.to_le_bytes(),
        };
        swapped_bytes.extend_from_slice(&be_bytes);
    }
    let mut swapped_cube = create_cube(
        Interleave::Bip,
        4,
        5,
        3,
        Some(DataType::Int16),
        Some(swapped_order),
        None,
        Some(swapped_bytes),
        false,
    )
    .unwrap();

    let from_host = host_cube.get_spectrum(0, 0).unwrap();
    let from_swapped = swapped_cube.get_spectrum(0, 0).unwrap();
    assert_eq!(from_host.get_f64(0), from_swapped.get_f64(0));
    assert_eq!(from_host.get_f64(1), from_swapped.get_f64(1));
    assert_eq!(from_host.get_f64(2), from_swapped.get_f64(2));
}

#[test]
fn p1_flat_round_trip_every_interleave() {
    for interleave in [Interleave::Bip, Interleave::Bil, Interleave::Bsq] {
        let cube = arange_cube(interleave, ByteOrder::host());
        for l in 0..4 {
            for s in 0..5 {
                for b in 0..3 {
                    let flat = cube.loc_to_flat(l, s, b).unwrap();
                    assert_eq!(cube.flat_to_loc(flat).unwrap(), (l, s, b), "interleave {interleave:?}");
                }
            }
        }
    }
}

#[test]
fn p2_pixel_consistency_across_views() {
    for interleave in [Interleave::Bip, Interleave::Bil, Interleave::Bsq] {
        let cube = arange_cube(interleave, ByteOrder::host());
        for l in 0..4 {
            for s in 0..5 {
                for b in 0..3 {
                    let pixel = cube.get_pixel(l, s, b).unwrap();
                    let from_band = cube.get_band_raw(b).unwrap().get(l * 5 + s);
                    let from_spectrum = cube.get_spectrum_raw(l, s).unwrap().get(b);
                    let from_plane = cube.get_focal_plane_raw(l).unwrap().get(b * 5 + s);
                    let from_depth = cube.get_focal_plane_depth_raw(s, b).unwrap().get(l);
                    assert_eq!(pixel, from_band, "interleave {interleave:?} band view");
                    assert_eq!(pixel, from_spectrum, "interleave {interleave:?} spectrum view");
                    assert_eq!(pixel, from_plane, "interleave {interleave:?} focal plane view");
                    assert_eq!(pixel, from_depth, "interleave {interleave:?} depth view");
                }
            }
        }
    }
}

#[test]
fn p3_interleave_transcoding_round_trip() {
    for source_interleave in [Interleave::Bip, Interleave::Bil, Interleave::Bsq] {
        for target_interleave in [Interleave::Bip, Interleave::Bil, Interleave::Bsq] {
            let source = arange_cube(source_interleave, ByteOrder::host());
            let mut out = Vec::new();
            write_raw(&source, target_interleave, &mut out, 4096, None).unwrap();

            let target = create_cube(
                target_interleave,
                4,
                5,
                3,
                Some(DataType::Int16),
                Some(ByteOrder::host()),
                None,
                Some(out),
                false,
            )
            .unwrap();

            for l in 0..4 {
                for s in 0..5 {
                    for b in 0..3 {
                        assert_eq!(
                            source.get_pixel(l, s, b).unwrap(),
                            target.get_pixel(l, s, b).unwrap(),
                            "source {source_interleave:?} -> target {target_interleave:?} at ({l},{s},{b})"
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn p7_extrema_widen_monotonically() {
    let mut cube = arange_cube(Interleave::Bip, ByteOrder::host());
    assert_eq!(cube.spectra_extrema(), (None, None));

    cube.get_spectrum(0, 0).unwrap();
    let (min1, max1) = cube.spectra_extrema();
    assert!(min1.is_some() && max1.is_some());

    cube.get_spectrum(3, 4).unwrap();
    let (min2, max2) = cube.spectra_extrema();
    assert!(min2.unwrap() <= min1.unwrap());
    assert!(max2.unwrap() >= max1.unwrap());
}
