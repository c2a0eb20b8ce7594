//! End-to-end properties of the resampling and convolution engine.

use crate::{init_logging, max_channel_diff, mean_channel_diff, noise, smooth};
use approx::assert_abs_diff_eq;
use pxl_core::{PixelBuffer, Rect};
use pxl_ops::transform::crop;
use pxl_ops::{
    blur, convolve, convolve_3x3, fill, fit, resize, sharpen, thumbnail, Anchor, ConvolveOptions,
    EdgePolicy, Filter, Kernel, OpsError, WeightTable,
};

fn all_filters() -> Vec<Filter> {
    let mut filters = Filter::NAMED.to_vec();
    filters.push(Filter::cubic(0.5, 0.25));
    filters.push(Filter::custom(1.5, |d: f64| (1.0 - d * d / 2.25).max(0.0)).unwrap());
    filters
}

#[test]
fn test_nearest_same_size_is_copy() {
    init_logging();
    for (w, h) in [(1, 1), (2, 7), (16, 16), (33, 5)] {
        let src = noise(w, h);
        let out = resize(&src, w, h, &Filter::NearestNeighbor).unwrap();
        assert_eq!(out, src, "{w}x{h}");
    }
}

#[test]
fn test_nearest_downscale_picks_source_samples() {
    let src = PixelBuffer::from_fn(4, 1, |x, _| if x % 2 == 0 { 0u8 } else { 200u8 });
    let out = resize(&src, 2, 1, &Filter::NearestNeighbor).unwrap();
    assert_eq!(out.pixel(0, 0), [0, 0, 0, 255]);
    assert_eq!(out.pixel(1, 0), [0, 0, 0, 255]);

    let src = noise(37, 23);
    let out = resize(&src, 9, 5, &Filter::NearestNeighbor).unwrap();
    for (_, _, p) in out.pixels() {
        assert!(src.pixels().any(|(_, _, q)| q == p), "{p:?} not in source");
    }
}

#[test]
fn test_huge_sigma_is_rejected_quickly() {
    let src = PixelBuffer::filled(4, 4, [90, 90, 90, 255]);
    for sigma in [1.0e8, 1.0e12, 1.0e300] {
        assert!(matches!(blur(&src, sigma), Err(OpsError::InvalidParameter(_))), "{sigma}");
    }
    assert_eq!(blur(&src, 500.0).unwrap(), src);
}

#[test]
fn test_weight_sums_are_normalized() {
    for filter in all_filters() {
        for src in [1usize, 2, 3, 10, 97] {
            for dst in [1usize, 2, 5, 10, 64, 300] {
                let table = WeightTable::build(src, dst, &filter).unwrap();
                assert_eq!(table.len(), dst);
                for entry in table.entries() {
                    assert!(entry.low() < entry.high() && entry.high() <= src);
                    assert_abs_diff_eq!(entry.sum(), 1.0, epsilon = 1e-6);
                }
            }
        }
    }
}

#[test]
fn test_round_trip_bounded_error() {
    init_logging();
    let src = smooth(40, 32);
    for filter in [Filter::Lanczos, Filter::CatmullRom] {
        for (w, h) in [(60, 48), (80, 64), (31, 25)] {
            let there = resize(&src, w, h, &filter).unwrap();
            let back = resize(&there, 40, 32, &filter).unwrap();
            let max = max_channel_diff(&src, &back);
            let mean = mean_channel_diff(&src, &back);
            assert!(max <= 12, "{filter} via {w}x{h}: max diff {max}");
            assert!(mean <= 2.0, "{filter} via {w}x{h}: mean diff {mean}");
        }
    }
}

#[test]
fn test_identity_kernel_every_edge_policy() {
    let src = noise(11, 9);
    let k = [0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0];
    for edge in [EdgePolicy::Extend, EdgePolicy::Wrap, EdgePolicy::Crop] {
        let opts = ConvolveOptions {
            edge,
            divisor: Some(1.0),
            bias: 0.0,
            abs: false,
        };
        assert_eq!(convolve_3x3(&src, k, opts).unwrap(), src, "{edge}");
    }
}

#[test]
fn test_identity_3x3_extend_keeps_borders() {
    let src = noise(4, 4);
    let out = convolve(&src, &Kernel::identity(3), ConvolveOptions::default()).unwrap();
    for (x, y, p) in src.pixels() {
        assert_eq!(out.pixel(x, y), p, "({x}, {y})");
    }
}

#[test]
fn test_fit_within_box() {
    let src = noise(123, 45);
    for (bw, bh) in [(10, 10), (200, 20), (7, 300), (123, 45), (500, 500), (1, 1)] {
        let out = fit(&src, bw, bh, &Filter::Linear).unwrap();
        assert!(out.width() <= bw && out.height() <= bh, "{bw}x{bh} -> {:?}", out.dimensions());
    }
}

#[test]
fn test_fill_exact_box() {
    let src = noise(57, 130);
    for anchor in Anchor::ALL {
        for (w, h) in [(10, 10), (100, 20), (20, 100), (300, 300)] {
            let out = fill(&src, w, h, anchor, &Filter::CatmullRom).unwrap();
            assert_eq!(out.dimensions(), (w, h), "{anchor} {w}x{h}");
        }
    }
    assert_eq!(thumbnail(&src, 12, 12, &Filter::Box).unwrap().dimensions(), (12, 12));
}

#[test]
fn test_uniform_gray_box_downscale() {
    let src = PixelBuffer::filled(4, 4, [128, 128, 128, 255]);
    let out = resize(&src, 2, 2, &Filter::Box).unwrap();
    assert_eq!(out.dimensions(), (2, 2));
    for (_, _, p) in out.pixels() {
        assert_eq!(p, [128, 128, 128, 255]);
    }
}

#[test]
fn test_invalid_requests() {
    let src = noise(4, 4);
    assert!(matches!(resize(&src, 0, 1, &Filter::Box), Err(OpsError::InvalidDimension(_))));
    assert!(matches!(fit(&src, 3, 0, &Filter::Box), Err(OpsError::InvalidDimension(_))));
    assert!(matches!(Kernel::new(vec![1.0; 6], 3), Err(OpsError::InvalidKernel(_))));
    assert!(matches!(Filter::custom(0.0, |_| 1.0), Err(OpsError::InvalidKernel(_))));
    assert!(matches!("bogus".parse::<EdgePolicy>(), Err(OpsError::UnsupportedEdgePolicy(_))));
}

#[test]
fn test_custom_tent_matches_linear() {
    let src = noise(19, 13);
    let tent = Filter::custom(1.0, |d| 1.0 - d.abs()).unwrap();
    for (w, h) in [(40, 30), (7, 5), (19, 13)] {
        let a = resize(&src, w, h, &tent).unwrap();
        let b = resize(&src, w, h, &Filter::Linear).unwrap();
        assert_eq!(a, b, "{w}x{h}");
    }
}

#[test]
fn test_strided_source_matches_compact() {
    let compact = noise(6, 5);
    let stride = 6 * 4 + 12;
    let mut raw = vec![0xFFu8; stride * 5];
    for (y, row) in compact.rows().enumerate() {
        raw[y * stride..y * stride + row.len()].copy_from_slice(row);
    }
    let strided = PixelBuffer::from_raw_with_stride(6, 5, stride, raw).unwrap();
    assert_eq!(
        resize(&strided, 9, 4, &Filter::Hann).unwrap(),
        resize(&compact, 9, 4, &Filter::Hann).unwrap()
    );
    assert_eq!(blur(&strided, 1.2).unwrap(), blur(&compact, 1.2).unwrap());
    assert_eq!(
        crop(&strided, Rect::new(1, 1, 3, 3)).unwrap(),
        crop(&compact, Rect::new(1, 1, 3, 3)).unwrap()
    );
}

#[test]
fn test_sharpen_increases_edge_contrast() {
    let src = blur(&PixelBuffer::from_fn(16, 4, |x, _| if x < 8 { 60u8 } else { 190u8 }), 1.0).unwrap();
    let out = sharpen(&src, 1.0).unwrap();
    let before = src.pixel(9, 2)[0] as i32 - src.pixel(6, 2)[0] as i32;
    let after = out.pixel(9, 2)[0] as i32 - out.pixel(6, 2)[0] as i32;
    assert!(after > before, "{before} -> {after}");
}
