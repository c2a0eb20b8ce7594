//! Output must not depend on how rows are partitioned.
//!
//! Every operation runs with 1, 2 and 8 partitions and the SHA-256 of
//! the results is compared.

use crate::{digest, init_logging, noise};
use pxl_core::{PixelBuffer, Rect};
use pxl_ops::adjust::{adjust_func_with, apply_lut_with};
use pxl_ops::transform::{crop_with, flip_h_with, rotate_90_with, transpose_with};
use pxl_ops::{
    blur_with, convolve_with, fill_with, fit_with, resize_with, unsharp_mask_with, Anchor,
    ConvolveOptions, EdgePolicy, Filter, FitOptions, Kernel, OpsResult, Scheduler,
};

const PARTITIONS: [usize; 3] = [1, 2, 8];

fn assert_partition_independent<F>(name: &str, op: F)
where
    F: Fn(&Scheduler) -> OpsResult<PixelBuffer>,
{
    let hashes: Vec<String> = PARTITIONS
        .iter()
        .map(|&p| digest(&op(&Scheduler::with_partitions(p)).unwrap()))
        .collect();
    assert!(
        hashes.windows(2).all(|w| w[0] == w[1]),
        "{name}: digests differ across partitions {PARTITIONS:?}: {hashes:?}"
    );
}

#[test]
fn test_resize_every_filter() {
    init_logging();
    let src = noise(37, 29);
    for filter in Filter::NAMED {
        for (w, h) in [(11, 50), (74, 13), (37, 29)] {
            assert_partition_independent(&format!("resize {filter} {w}x{h}"), |s| {
                resize_with(&src, w, h, &filter, s)
            });
        }
    }
}

#[test]
fn test_convolve_every_edge_policy() {
    let src = noise(23, 17);
    for edge in [EdgePolicy::Extend, EdgePolicy::Wrap, EdgePolicy::Crop] {
        for kernel in [Kernel::emboss(), Kernel::gaussian(5, 1.2), Kernel::edge_detect()] {
            let opts = ConvolveOptions {
                edge,
                bias: 3.0,
                abs: true,
                ..Default::default()
            };
            assert_partition_independent(&format!("convolve {edge}"), |s| convolve_with(&src, &kernel, opts, s));
        }
    }
}

#[test]
fn test_blur_and_sharpen() {
    let src = noise(41, 19);
    for sigma in [0.5, 1.0, 3.3] {
        assert_partition_independent(&format!("blur {sigma}"), |s| blur_with(&src, sigma, s));
        assert_partition_independent(&format!("unsharp {sigma}"), |s| {
            unsharp_mask_with(&src, sigma, 1.5, 4.0, s)
        });
    }
}

#[test]
fn test_policies() {
    let src = noise(64, 21);
    assert_partition_independent("fit", |s| {
        fit_with(&src, 30, 30, &Filter::Lanczos, FitOptions::default(), s)
    });
    for anchor in Anchor::ALL {
        assert_partition_independent(&format!("fill {anchor}"), |s| {
            fill_with(&src, 16, 16, anchor, &Filter::MitchellNetravali, s)
        });
    }
}

#[test]
fn test_geometry_and_adjust() {
    let src = noise(19, 31);
    assert_partition_independent("crop", |s| crop_with(&src, Rect::new(3, 4, 10, 20), s));
    assert_partition_independent("flip_h", |s| flip_h_with(&src, s));
    assert_partition_independent("rotate_90", |s| rotate_90_with(&src, s));
    assert_partition_independent("transpose", |s| transpose_with(&src, s));

    let lut: [u8; 256] = std::array::from_fn(|i| (255 - i) as u8);
    assert_partition_independent("lut", |s| apply_lut_with(&src, &lut, s));
    assert_partition_independent("func", |s| {
        adjust_func_with(&src, |[r, g, b, a]| [g, b, r, a / 2], s)
    });
}
