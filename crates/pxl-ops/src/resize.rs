//! Separable resampling and the resize policies built on it.
//!
//! [`resize`] runs two 1-D passes: horizontal into a wide buffer of
//! `f32` samples, then vertical back to 8 bits. Only the final pass
//! rounds and clamps, so no precision is lost between the passes.
//!
//! Alpha is resampled exactly like the color channels. Buffers are not
//! premultiplied, so partially transparent edges can bleed color.
//!
//! # Policies
//!
//! - [`fit`] - largest aspect-preserving size inside a box
//! - [`fill`] - crop at an [`Anchor`], then resize to exactly the box
//! - [`thumbnail`] - [`fill`] anchored at the center
//!
//! # Example
//!
//! ```rust
//! use pxl_core::PixelBuffer;
//! use pxl_ops::{resize, fit, Filter};
//!
//! let src = PixelBuffer::filled(64, 32, [10, 20, 30, 255]);
//! let dst = resize(&src, 16, 16, &Filter::CatmullRom).unwrap();
//! assert_eq!(dst.dimensions(), (16, 16));
//!
//! let boxed = fit(&src, 20, 20, &Filter::Lanczos).unwrap();
//! assert_eq!(boxed.dimensions(), (20, 10));
//! ```

use crate::parallel::Scheduler;
use crate::transform::{anchor_point, crop_with, Anchor};
use crate::{Filter, OpsError, OpsResult, WeightTable};
use pxl_core::{PixelBuffer, Rect, CHANNELS};
use tracing::{debug, trace};

/// Intermediate buffer between the two resampling passes.
///
/// Same RGBA layout as [`PixelBuffer`], but each channel is an unclamped
/// `f32`, so overshoot from negative kernel lobes survives into the
/// second pass.
#[derive(Debug, Clone)]
pub(crate) struct WideBuffer {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl WideBuffer {
    /// Row `y` as `width * 4` samples.
    #[inline]
    fn row(&self, y: usize) -> &[f32] {
        let len = self.width * CHANNELS;
        &self.data[y * len..(y + 1) * len]
    }
}

/// Options for [`fit_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FitOptions {
    /// Scale up sources that already fit inside the box.
    pub allow_upscale: bool,
}

/// Rounds an accumulated channel into 8 bits.
#[inline]
pub(crate) fn clamp_u8(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Horizontal pass: `src` rows resampled to `table.len()` columns.
fn horizontal_pass(src: &PixelBuffer, table: &WeightTable, sched: &Scheduler) -> WideBuffer {
    let width = table.len();
    let height = src.height();
    let row_len = width * CHANNELS;
    let mut data = vec![0.0f32; row_len * height];

    sched.for_each_rows(&mut data, row_len, |rows, chunk| {
        for (y, out) in rows.zip(chunk.chunks_exact_mut(row_len)) {
            let line = src.row(y);
            for (entry, px) in table.entries().iter().zip(out.chunks_exact_mut(CHANNELS)) {
                let mut acc = [0.0f64; CHANNELS];
                for (sx, &w) in entry.range().zip(entry.weights()) {
                    let s = &line[sx * CHANNELS..sx * CHANNELS + CHANNELS];
                    for c in 0..CHANNELS {
                        acc[c] += w * s[c] as f64;
                    }
                }
                for c in 0..CHANNELS {
                    px[c] = acc[c] as f32;
                }
            }
        }
    });

    WideBuffer {
        width,
        height,
        data,
    }
}

/// Vertical pass: `wide` columns resampled to `table.len()` rows.
fn vertical_pass(wide: &WideBuffer, table: &WeightTable, sched: &Scheduler) -> OpsResult<PixelBuffer> {
    debug_assert_eq!(wide.height, table.src_len());
    let row_len = wide.width * CHANNELS;
    sched.render(wide.width, table.len(), |y, out| {
        let entry = table.entry(y);
        let mut acc = vec![0.0f64; row_len];
        for (sy, &w) in entry.range().zip(entry.weights()) {
            for (a, &s) in acc.iter_mut().zip(wide.row(sy)) {
                *a += w * s as f64;
            }
        }
        for (o, a) in out.iter_mut().zip(acc) {
            *o = clamp_u8(a);
        }
    })
}

/// Runs both passes with precomputed tables.
///
/// `h.src_len()` must equal the source width and `v.src_len()` its height.
pub(crate) fn separable(
    src: &PixelBuffer,
    h: &WeightTable,
    v: &WeightTable,
    sched: &Scheduler,
) -> OpsResult<PixelBuffer> {
    debug_assert_eq!(h.src_len(), src.width());
    debug_assert_eq!(v.src_len(), src.height());
    debug!(
        h_taps = h.max_taps(),
        v_taps = v.max_taps(),
        partitions = sched.partitions(),
        "separable plan"
    );
    let wide = horizontal_pass(src, h, sched);
    vertical_pass(&wide, v, sched)
}

fn check_source(src: &PixelBuffer) -> OpsResult<()> {
    if src.is_empty() {
        return Err(OpsError::InvalidDimension(format!(
            "source buffer is empty ({}x{})",
            src.width(),
            src.height()
        )));
    }
    Ok(())
}

fn check_target(width: usize, height: usize) -> OpsResult<()> {
    if width == 0 || height == 0 {
        return Err(OpsError::InvalidDimension(format!(
            "target size must be > 0, got {width}x{height}"
        )));
    }
    Ok(())
}

/// Resizes `src` to `width x height` using `filter`.
///
/// Equal dimensions still resample through `filter`; with
/// [`Filter::NearestNeighbor`] that is an exact copy.
///
/// # Errors
///
/// [`OpsError::InvalidDimension`] if a target dimension is zero or `src`
/// is empty.
pub fn resize(src: &PixelBuffer, width: usize, height: usize, filter: &Filter) -> OpsResult<PixelBuffer> {
    resize_with(src, width, height, filter, &Scheduler::default())
}

/// [`resize`] with an explicit scheduler.
pub fn resize_with(
    src: &PixelBuffer,
    width: usize,
    height: usize,
    filter: &Filter,
    sched: &Scheduler,
) -> OpsResult<PixelBuffer> {
    check_target(width, height)?;
    check_source(src)?;
    trace!(
        src_w = src.width(),
        src_h = src.height(),
        width,
        height,
        filter = %filter,
        "resize"
    );

    let h = WeightTable::build(src.width(), width, filter)?;
    let v = WeightTable::build(src.height(), height, filter)?;
    separable(src, &h, &v, sched)
}

/// Largest aspect-preserving size of `src_w x src_h` inside `max_w x max_h`.
///
/// Always scales, up or down. Both results are at least 1 and never
/// exceed the box.
///
/// ```rust
/// use pxl_ops::fit_dimensions;
///
/// assert_eq!(fit_dimensions(1920, 1080, 640, 480), (640, 360));
/// assert_eq!(fit_dimensions(100, 400, 300, 300), (75, 300));
/// ```
pub fn fit_dimensions(src_w: usize, src_h: usize, max_w: usize, max_h: usize) -> (usize, usize) {
    if src_w == 0 || src_h == 0 {
        return (max_w.min(1), max_h.min(1));
    }
    let src_aspect = src_w as f64 / src_h as f64;
    let max_aspect = max_w as f64 / max_h as f64;

    let (w, h) = if src_aspect > max_aspect {
        (max_w as f64, (max_w as f64 / src_aspect).round())
    } else {
        ((max_h as f64 * src_aspect).round(), max_h as f64)
    };
    (
        (w as usize).clamp(1, max_w.max(1)),
        (h as usize).clamp(1, max_h.max(1)),
    )
}

/// Scales `src` down to fit inside `max_w x max_h`, keeping aspect ratio.
///
/// A source that already fits is returned unchanged (a cheap clone).
///
/// # Errors
///
/// [`OpsError::InvalidDimension`] if the box is empty or `src` is empty.
pub fn fit(src: &PixelBuffer, max_w: usize, max_h: usize, filter: &Filter) -> OpsResult<PixelBuffer> {
    fit_with(src, max_w, max_h, filter, FitOptions::default(), &Scheduler::default())
}

/// [`fit`] with options and an explicit scheduler.
pub fn fit_with(
    src: &PixelBuffer,
    max_w: usize,
    max_h: usize,
    filter: &Filter,
    options: FitOptions,
    sched: &Scheduler,
) -> OpsResult<PixelBuffer> {
    check_target(max_w, max_h)?;
    check_source(src)?;

    let (sw, sh) = src.dimensions();
    if !options.allow_upscale && sw <= max_w && sh <= max_h {
        debug!(sw, sh, max_w, max_h, "source fits, no resize");
        return Ok(src.clone());
    }
    let (w, h) = fit_dimensions(sw, sh, max_w, max_h);
    resize_with(src, w, h, filter, sched)
}

/// Region of a `src_w x src_h` source with the aspect ratio of `width x height`.
///
/// The region is as large as possible and placed by `anchor`.
///
/// ```rust
/// use pxl_core::Rect;
/// use pxl_ops::{fill_crop_rect, Anchor};
///
/// // 200x100 source filling a square: keep the middle 100x100
/// assert_eq!(fill_crop_rect(200, 100, 50, 50, Anchor::Center), Rect::new(50, 0, 100, 100));
/// assert_eq!(fill_crop_rect(200, 100, 50, 50, Anchor::Right), Rect::new(100, 0, 100, 100));
/// ```
pub fn fill_crop_rect(src_w: usize, src_h: usize, width: usize, height: usize, anchor: Anchor) -> Rect {
    if width == 0 || height == 0 || src_w == 0 || src_h == 0 {
        return Rect::from_size(src_w, src_h);
    }
    let src_aspect = src_w as f64 / src_h as f64;
    let dst_aspect = width as f64 / height as f64;

    let (cw, ch) = if src_aspect < dst_aspect {
        let ch = (src_w as f64 / dst_aspect).round() as usize;
        (src_w, ch.clamp(1, src_h))
    } else {
        let cw = (src_h as f64 * dst_aspect).round() as usize;
        (cw.clamp(1, src_w), src_h)
    };
    let (x, y) = anchor_point(src_w, src_h, cw, ch, anchor);
    Rect::new(x, y, cw, ch)
}

/// Crops `src` to the target aspect ratio at `anchor`, then resizes to
/// exactly `width x height`.
///
/// # Errors
///
/// [`OpsError::InvalidDimension`] if a target dimension is zero or `src`
/// is empty.
pub fn fill(
    src: &PixelBuffer,
    width: usize,
    height: usize,
    anchor: Anchor,
    filter: &Filter,
) -> OpsResult<PixelBuffer> {
    fill_with(src, width, height, anchor, filter, &Scheduler::default())
}

/// [`fill`] with an explicit scheduler.
pub fn fill_with(
    src: &PixelBuffer,
    width: usize,
    height: usize,
    anchor: Anchor,
    filter: &Filter,
    sched: &Scheduler,
) -> OpsResult<PixelBuffer> {
    check_target(width, height)?;
    check_source(src)?;

    let rect = fill_crop_rect(src.width(), src.height(), width, height, anchor);
    trace!(width, height, anchor = ?anchor, crop = %rect, "fill");
    if rect == src.bounds() {
        return resize_with(src, width, height, filter, sched);
    }
    let cropped = crop_with(src, rect, sched)?;
    resize_with(&cropped, width, height, filter, sched)
}

/// Square-or-not thumbnail: [`fill`] anchored at [`Anchor::Center`].
pub fn thumbnail(src: &PixelBuffer, width: usize, height: usize, filter: &Filter) -> OpsResult<PixelBuffer> {
    fill(src, width, height, Anchor::Center, filter)
}

/// [`thumbnail`] with an explicit scheduler.
pub fn thumbnail_with(
    src: &PixelBuffer,
    width: usize,
    height: usize,
    filter: &Filter,
    sched: &Scheduler,
) -> OpsResult<PixelBuffer> {
    fill_with(src, width, height, Anchor::Center, filter, sched)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(w: usize, h: usize) -> PixelBuffer {
        PixelBuffer::from_fn(w, h, |x, y| [(x * 13 % 256) as u8, (y * 7 % 256) as u8, ((x + y) % 256) as u8, 255])
    }

    #[test]
    fn test_resize_identity_nearest() {
        let src = gradient(17, 9);
        let dst = resize(&src, 17, 9, &Filter::NearestNeighbor).unwrap();
        assert_eq!(dst, src);
    }

    #[test]
    fn test_resize_identity_interpolating() {
        let src = gradient(12, 12);
        for f in [Filter::Linear, Filter::CatmullRom, Filter::Lanczos] {
            assert_eq!(resize(&src, 12, 12, &f).unwrap(), src, "{f}");
        }
    }

    #[test]
    fn test_resize_rejects_zero() {
        let src = gradient(4, 4);
        assert!(matches!(resize(&src, 0, 4, &Filter::Box), Err(OpsError::InvalidDimension(_))));
        assert!(matches!(resize(&src, 4, 0, &Filter::Box), Err(OpsError::InvalidDimension(_))));
        let empty = PixelBuffer::new(0, 3);
        assert!(matches!(resize(&empty, 4, 4, &Filter::Box), Err(OpsError::InvalidDimension(_))));
    }

    #[test]
    fn test_box_downscale_constant() {
        let src = PixelBuffer::filled(4, 4, [128, 128, 128, 255]);
        let dst = resize(&src, 2, 2, &Filter::Box).unwrap();
        assert_eq!(dst.dimensions(), (2, 2));
        assert!(dst.pixels().all(|(_, _, p)| p == [128, 128, 128, 255]));
    }

    #[test]
    fn test_box_downscale_averages() {
        let src = PixelBuffer::from_fn(2, 1, |x, _| if x == 0 { [0u8, 0, 0, 255] } else { [100, 200, 50, 255] });
        let dst = resize(&src, 1, 1, &Filter::Box).unwrap();
        assert_eq!(dst.pixel(0, 0), [50, 100, 25, 255]);
    }

    #[test]
    fn test_overshoot_is_clamped() {
        // A hard edge rings under Lanczos; output must stay in range.
        let src = PixelBuffer::from_fn(8, 1, |x, _| if x < 4 { 0u8 } else { 255u8 });
        let dst = resize(&src, 29, 1, &Filter::Lanczos).unwrap();
        assert_eq!(dst.pixel(0, 0)[0], 0);
        assert_eq!(dst.pixel(28, 0)[0], 255);
    }

    #[test]
    fn test_partition_independent() {
        let src = gradient(31, 23);
        let a = resize_with(&src, 13, 40, &Filter::MitchellNetravali, &Scheduler::with_partitions(1)).unwrap();
        let b = resize_with(&src, 13, 40, &Filter::MitchellNetravali, &Scheduler::with_partitions(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_fit_dimensions() {
        assert_eq!(fit_dimensions(1920, 1080, 640, 480), (640, 360));
        assert_eq!(fit_dimensions(10, 10, 3, 7), (3, 3));
        assert_eq!(fit_dimensions(1, 1000, 50, 50), (1, 50));
    }

    #[test]
    fn test_fit_policy() {
        let src = gradient(40, 20);
        assert_eq!(fit(&src, 10, 10, &Filter::Linear).unwrap().dimensions(), (10, 5));
        // already inside the box
        assert_eq!(fit(&src, 100, 100, &Filter::Linear).unwrap(), src);
        let up = fit_with(
            &src,
            100,
            100,
            &Filter::Linear,
            FitOptions { allow_upscale: true },
            &Scheduler::default(),
        )
        .unwrap();
        assert_eq!(up.dimensions(), (100, 50));
    }

    #[test]
    fn test_fill_crop_rect() {
        assert_eq!(fill_crop_rect(100, 200, 10, 10, Anchor::Top), Rect::new(0, 0, 100, 100));
        assert_eq!(fill_crop_rect(100, 200, 10, 10, Anchor::Bottom), Rect::new(0, 100, 100, 100));
        assert_eq!(fill_crop_rect(100, 50, 100, 50, Anchor::Center), Rect::new(0, 0, 100, 50));
    }

    #[test]
    fn test_fill_exact_size() {
        let src = gradient(37, 11);
        for (w, h) in [(5, 5), (20, 3), (3, 20), (80, 80)] {
            assert_eq!(fill(&src, w, h, Anchor::TopLeft, &Filter::Box).unwrap().dimensions(), (w, h));
        }
        assert_eq!(thumbnail(&src, 8, 8, &Filter::Lanczos).unwrap().dimensions(), (8, 8));
    }

    #[test]
    fn test_fill_anchor_picks_region() {
        // left half black, right half white; a square fill at the right is white
        let src = PixelBuffer::from_fn(20, 10, |x, _| if x < 10 { 0u8 } else { 255u8 });
        let right = fill(&src, 4, 4, Anchor::Right, &Filter::Box).unwrap();
        assert!(right.pixels().all(|(_, _, p)| p[0] == 255));
        let left = fill(&src, 4, 4, Anchor::Left, &Filter::Box).unwrap();
        assert!(left.pixels().all(|(_, _, p)| p[0] == 0));
    }
}
