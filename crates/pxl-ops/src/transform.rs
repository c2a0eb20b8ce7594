//! Geometric data movement: crop, flip, rotate, transpose.
//!
//! None of these resample; every output pixel is an exact copy of one
//! source pixel. Output rows are produced through the
//! [`Scheduler`], like every other operation.
//!
//! # Operations
//!
//! - [`crop`] / [`crop_anchor`] - Extract a region
//! - [`flip_h`] / [`flip_v`] - Mirror
//! - [`rotate_90`] / [`rotate_180`] / [`rotate_270`] - Counter-clockwise rotation
//! - [`transpose`] - Mirror across the main diagonal
//!
//! # Example
//!
//! ```rust
//! use pxl_core::{PixelBuffer, Rect};
//! use pxl_ops::transform::{crop, rotate_90};
//!
//! let src = PixelBuffer::from_fn(4, 2, |x, y| [x as u8, y as u8, 0, 255]);
//! let rotated = rotate_90(&src).unwrap();
//! assert_eq!(rotated.dimensions(), (2, 4));
//! assert_eq!(rotated.pixel(0, 0), [3, 0, 0, 255]);
//!
//! let region = crop(&src, Rect::new(1, 0, 2, 2)).unwrap();
//! assert_eq!(region.pixel(0, 1), [1, 1, 0, 255]);
//! ```

use crate::parallel::Scheduler;
use crate::{OpsError, OpsResult};
use pxl_core::{PixelBuffer, Rect, CHANNELS};
use std::fmt;
use std::str::FromStr;
use tracing::trace;

/// Placement of a sub-rectangle inside a larger box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Anchor {
    /// Top-left corner.
    TopLeft,
    /// Top edge, horizontally centered.
    Top,
    /// Top-right corner.
    TopRight,
    /// Left edge, vertically centered.
    Left,
    /// Centered on both axes.
    #[default]
    Center,
    /// Right edge, vertically centered.
    Right,
    /// Bottom-left corner.
    BottomLeft,
    /// Bottom edge, horizontally centered.
    Bottom,
    /// Bottom-right corner.
    BottomRight,
}

impl Anchor {
    /// All anchors, row by row.
    pub const ALL: [Anchor; 9] = [
        Anchor::TopLeft,
        Anchor::Top,
        Anchor::TopRight,
        Anchor::Left,
        Anchor::Center,
        Anchor::Right,
        Anchor::BottomLeft,
        Anchor::Bottom,
        Anchor::BottomRight,
    ];

    /// Canonical lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Anchor::TopLeft => "topleft",
            Anchor::Top => "top",
            Anchor::TopRight => "topright",
            Anchor::Left => "left",
            Anchor::Center => "center",
            Anchor::Right => "right",
            Anchor::BottomLeft => "bottomleft",
            Anchor::Bottom => "bottom",
            Anchor::BottomRight => "bottomright",
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Anchor {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        let anchor = match key.as_str() {
            "topleft" | "northwest" | "nw" => Anchor::TopLeft,
            "top" | "north" | "n" => Anchor::Top,
            "topright" | "northeast" | "ne" => Anchor::TopRight,
            "left" | "west" | "w" => Anchor::Left,
            "center" | "centre" | "middle" => Anchor::Center,
            "right" | "east" | "e" => Anchor::Right,
            "bottomleft" | "southwest" | "sw" => Anchor::BottomLeft,
            "bottom" | "south" | "s" => Anchor::Bottom,
            "bottomright" | "southeast" | "se" => Anchor::BottomRight,
            _ => return Err(OpsError::InvalidParameter(format!("unknown anchor: {s}"))),
        };
        Ok(anchor)
    }
}

/// Top-left position of a `width x height` rect placed in a
/// `box_w x box_h` box at `anchor`.
///
/// A rect larger than the box is pinned at 0 on that axis.
///
/// ```rust
/// use pxl_ops::{anchor_point, Anchor};
///
/// assert_eq!(anchor_point(100, 50, 20, 10, Anchor::Center), (40, 20));
/// assert_eq!(anchor_point(100, 50, 20, 10, Anchor::BottomRight), (80, 40));
/// ```
pub fn anchor_point(box_w: usize, box_h: usize, width: usize, height: usize, anchor: Anchor) -> (usize, usize) {
    let dx = box_w.saturating_sub(width);
    let dy = box_h.saturating_sub(height);
    let x = match anchor {
        Anchor::TopLeft | Anchor::Left | Anchor::BottomLeft => 0,
        Anchor::Top | Anchor::Center | Anchor::Bottom => dx / 2,
        Anchor::TopRight | Anchor::Right | Anchor::BottomRight => dx,
    };
    let y = match anchor {
        Anchor::TopLeft | Anchor::Top | Anchor::TopRight => 0,
        Anchor::Left | Anchor::Center | Anchor::Right => dy / 2,
        Anchor::BottomLeft | Anchor::Bottom | Anchor::BottomRight => dy,
    };
    (x, y)
}

/// Builds a `width x height` buffer where `(x, y)` copies `src(map(x, y))`.
fn remap<F>(src: &PixelBuffer, width: usize, height: usize, sched: &Scheduler, map: F) -> OpsResult<PixelBuffer>
where
    F: Fn(usize, usize) -> (usize, usize) + Sync + Send,
{
    sched.render(width, height, |y, row| {
        for (x, px) in row.chunks_exact_mut(CHANNELS).enumerate() {
            let (sx, sy) = map(x, y);
            px.copy_from_slice(&src.pixel(sx, sy));
        }
    })
}

/// Copies the region `rect` out of `src`.
///
/// # Errors
///
/// - [`OpsError::InvalidDimension`] if `rect` is empty
/// - [`OpsError::Core`] wrapping `InvalidRegion` if `rect` is not inside `src`
pub fn crop(src: &PixelBuffer, rect: Rect) -> OpsResult<PixelBuffer> {
    crop_with(src, rect, &Scheduler::default())
}

/// [`crop`] with an explicit scheduler.
pub fn crop_with(src: &PixelBuffer, rect: Rect, sched: &Scheduler) -> OpsResult<PixelBuffer> {
    if rect.is_empty() {
        return Err(OpsError::InvalidDimension(format!("empty crop region {rect}")));
    }
    if !src.bounds().contains_rect(&rect) {
        return Err(pxl_core::Error::invalid_region(
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            src.width(),
            src.height(),
        )
        .into());
    }
    trace!(crop = %rect, "crop");

    let start = rect.x * CHANNELS;
    let end = rect.right() * CHANNELS;
    sched.render(rect.width, rect.height, |y, row| {
        row.copy_from_slice(&src.row(rect.y + y)[start..end]);
    })
}

/// Crops a `width x height` region placed at `anchor`.
///
/// The region is clipped to the source, so asking for more than the
/// source holds returns the whole source along that axis.
///
/// # Errors
///
/// [`OpsError::InvalidDimension`] if `width` or `height` is zero.
pub fn crop_anchor(src: &PixelBuffer, width: usize, height: usize, anchor: Anchor) -> OpsResult<PixelBuffer> {
    crop_anchor_with(src, width, height, anchor, &Scheduler::default())
}

/// [`crop_anchor`] with an explicit scheduler.
pub fn crop_anchor_with(
    src: &PixelBuffer,
    width: usize,
    height: usize,
    anchor: Anchor,
    sched: &Scheduler,
) -> OpsResult<PixelBuffer> {
    if width == 0 || height == 0 {
        return Err(OpsError::InvalidDimension(format!(
            "crop size must be > 0, got {width}x{height}"
        )));
    }
    let w = width.min(src.width());
    let h = height.min(src.height());
    let (x, y) = anchor_point(src.width(), src.height(), w, h, anchor);
    crop_with(src, Rect::new(x, y, w, h), sched)
}

/// Mirrors left to right.
pub fn flip_h(src: &PixelBuffer) -> OpsResult<PixelBuffer> {
    flip_h_with(src, &Scheduler::default())
}

/// [`flip_h`] with an explicit scheduler.
pub fn flip_h_with(src: &PixelBuffer, sched: &Scheduler) -> OpsResult<PixelBuffer> {
    let (w, h) = src.dimensions();
    remap(src, w, h, sched, |x, y| (w - 1 - x, y))
}

/// Mirrors top to bottom.
pub fn flip_v(src: &PixelBuffer) -> OpsResult<PixelBuffer> {
    flip_v_with(src, &Scheduler::default())
}

/// [`flip_v`] with an explicit scheduler.
pub fn flip_v_with(src: &PixelBuffer, sched: &Scheduler) -> OpsResult<PixelBuffer> {
    let (w, h) = src.dimensions();
    sched.render(w, h, |y, row| row.copy_from_slice(src.row(h - 1 - y)))
}

/// Rotates 90 degrees counter-clockwise.
pub fn rotate_90(src: &PixelBuffer) -> OpsResult<PixelBuffer> {
    rotate_90_with(src, &Scheduler::default())
}

/// [`rotate_90`] with an explicit scheduler.
pub fn rotate_90_with(src: &PixelBuffer, sched: &Scheduler) -> OpsResult<PixelBuffer> {
    let (w, h) = src.dimensions();
    remap(src, h, w, sched, |x, y| (w - 1 - y, x))
}

/// Rotates 180 degrees.
pub fn rotate_180(src: &PixelBuffer) -> OpsResult<PixelBuffer> {
    rotate_180_with(src, &Scheduler::default())
}

/// [`rotate_180`] with an explicit scheduler.
pub fn rotate_180_with(src: &PixelBuffer, sched: &Scheduler) -> OpsResult<PixelBuffer> {
    let (w, h) = src.dimensions();
    remap(src, w, h, sched, |x, y| (w - 1 - x, h - 1 - y))
}

/// Rotates 270 degrees counter-clockwise (90 clockwise).
pub fn rotate_270(src: &PixelBuffer) -> OpsResult<PixelBuffer> {
    rotate_270_with(src, &Scheduler::default())
}

/// [`rotate_270`] with an explicit scheduler.
pub fn rotate_270_with(src: &PixelBuffer, sched: &Scheduler) -> OpsResult<PixelBuffer> {
    let (w, h) = src.dimensions();
    remap(src, h, w, sched, |x, y| (y, h - 1 - x))
}

/// Mirrors across the top-left to bottom-right diagonal.
pub fn transpose(src: &PixelBuffer) -> OpsResult<PixelBuffer> {
    transpose_with(src, &Scheduler::default())
}

/// [`transpose`] with an explicit scheduler.
pub fn transpose_with(src: &PixelBuffer, sched: &Scheduler) -> OpsResult<PixelBuffer> {
    let (w, h) = src.dimensions();
    remap(src, h, w, sched, |x, y| (y, x))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indexed(w: usize, h: usize) -> PixelBuffer {
        PixelBuffer::from_fn(w, h, |x, y| [x as u8, y as u8, 7, 255])
    }

    #[test]
    fn test_anchor_points() {
        let expect = [(0, 0), (5, 0), (10, 0), (0, 3), (5, 3), (10, 3), (0, 6), (5, 6), (10, 6)];
        for (anchor, want) in Anchor::ALL.into_iter().zip(expect) {
            assert_eq!(anchor_point(20, 10, 10, 4, anchor), want, "{anchor}");
        }
        // larger than the box
        assert_eq!(anchor_point(5, 5, 10, 10, Anchor::BottomRight), (0, 0));
    }

    #[test]
    fn test_anchor_parse() {
        for a in Anchor::ALL {
            assert_eq!(a.name().parse::<Anchor>().unwrap(), a);
        }
        assert_eq!("Top-Left".parse::<Anchor>().unwrap(), Anchor::TopLeft);
        assert!(matches!("upper".parse::<Anchor>(), Err(OpsError::InvalidParameter(_))));
    }

    #[test]
    fn test_crop_bounds() {
        let src = indexed(8, 6);
        let out = crop(&src, Rect::new(2, 3, 4, 3)).unwrap();
        assert_eq!(out.dimensions(), (4, 3));
        assert_eq!(out.pixel(0, 0), [2, 3, 7, 255]);
        assert_eq!(out.pixel(3, 2), [5, 5, 7, 255]);

        let err = crop(&src, Rect::new(6, 0, 4, 1)).unwrap_err();
        assert!(matches!(err, OpsError::Core(ref e) if e.is_bounds_error()));
        assert!(matches!(crop(&src, Rect::new(0, 0, 0, 1)), Err(OpsError::InvalidDimension(_))));
    }

    #[test]
    fn test_crop_anchor_clips() {
        let src = indexed(8, 6);
        let out = crop_anchor(&src, 4, 100, Anchor::Right).unwrap();
        assert_eq!(out.dimensions(), (4, 6));
        assert_eq!(out.pixel(0, 0), [4, 0, 7, 255]);
    }

    #[test]
    fn test_flips() {
        let src = indexed(3, 2);
        let h = flip_h(&src).unwrap();
        assert_eq!(h.pixel(0, 1), [2, 1, 7, 255]);
        let v = flip_v(&src).unwrap();
        assert_eq!(v.pixel(0, 0), [0, 1, 7, 255]);
        assert_eq!(flip_h(&h).unwrap(), src);
    }

    #[test]
    fn test_rotations_compose() {
        let src = indexed(5, 3);
        let r90 = rotate_90(&src).unwrap();
        let r270 = rotate_270(&src).unwrap();
        assert_eq!(r90.dimensions(), (3, 5));
        // top-right corner moves to top-left under counter-clockwise rotation
        assert_eq!(r90.pixel(0, 0), src.pixel(4, 0));
        // top-left corner moves to top-right under clockwise rotation
        assert_eq!(r270.pixel(2, 0), src.pixel(0, 0));
        assert_eq!(rotate_90(&r90).unwrap(), rotate_180(&src).unwrap());
        assert_eq!(rotate_90(&r270).unwrap(), src);
    }

    #[test]
    fn test_transpose() {
        let src = indexed(4, 2);
        let t = transpose(&src).unwrap();
        assert_eq!(t.dimensions(), (2, 4));
        assert_eq!(t.pixel(1, 3), src.pixel(3, 1));
        assert_eq!(transpose(&t).unwrap(), src);
    }

    #[test]
    fn test_partition_independent() {
        let src = indexed(13, 9);
        let a = rotate_270_with(&src, &Scheduler::with_partitions(1)).unwrap();
        let b = rotate_270_with(&src, &Scheduler::with_partitions(8)).unwrap();
        assert_eq!(a, b);
    }
}
