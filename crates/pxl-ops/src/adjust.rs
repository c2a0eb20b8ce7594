//! Per-pixel color adjustments.
//!
//! Tone curves are 256-entry lookup tables applied to R, G and B; alpha
//! passes through untouched. Saturation and hue work in HSL space.
//! Everything runs through the [`Scheduler`] row by row.
//!
//! ```rust
//! use pxl_core::PixelBuffer;
//! use pxl_ops::adjust::{adjust_brightness, grayscale, invert};
//!
//! let src = PixelBuffer::filled(2, 2, [200, 100, 50, 128]);
//! assert_eq!(invert(&src).unwrap().pixel(0, 0), [55, 155, 205, 128]);
//! assert_eq!(grayscale(&src).unwrap().pixel(0, 0), [124, 124, 124, 128]);
//! assert_eq!(adjust_brightness(&src, 20.0).unwrap().pixel(1, 1), [251, 151, 101, 128]);
//! ```

use crate::parallel::Scheduler;
use crate::resize::clamp_u8;
use crate::{OpsError, OpsResult};
use pxl_core::{PixelBuffer, Rgba8, CHANNELS};
use tracing::trace;

/// 256-entry tone curve for the color channels.
pub type Lut = [u8; 256];

fn build_lut(f: impl Fn(f64) -> f64) -> Lut {
    std::array::from_fn(|i| clamp_u8(f(i as f64)))
}

fn check_finite(name: &str, v: f64) -> OpsResult<()> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(OpsError::InvalidParameter(format!("{name} must be finite, got {v}")))
    }
}

/// Maps every pixel through `f`.
///
/// Unlike the tone curves, `f` sees and may change alpha.
///
/// ```rust
/// use pxl_core::PixelBuffer;
/// use pxl_ops::adjust::adjust_func;
///
/// let src = PixelBuffer::filled(3, 1, [10, 20, 30, 40]);
/// let swapped = adjust_func(&src, |[r, g, b, a]| [b, g, r, a]).unwrap();
/// assert_eq!(swapped.pixel(2, 0), [30, 20, 10, 40]);
/// ```
pub fn adjust_func<F>(src: &PixelBuffer, f: F) -> OpsResult<PixelBuffer>
where
    F: Fn(Rgba8) -> Rgba8 + Sync + Send,
{
    adjust_func_with(src, f, &Scheduler::default())
}

/// [`adjust_func`] with an explicit scheduler.
pub fn adjust_func_with<F>(src: &PixelBuffer, f: F, sched: &Scheduler) -> OpsResult<PixelBuffer>
where
    F: Fn(Rgba8) -> Rgba8 + Sync + Send,
{
    sched.render(src.width(), src.height(), |y, out| {
        for (o, s) in out.chunks_exact_mut(CHANNELS).zip(src.row(y).chunks_exact(CHANNELS)) {
            o.copy_from_slice(&f([s[0], s[1], s[2], s[3]]));
        }
    })
}

/// Applies `lut` to R, G and B.
pub fn apply_lut(src: &PixelBuffer, lut: &Lut) -> OpsResult<PixelBuffer> {
    apply_lut_with(src, lut, &Scheduler::default())
}

/// [`apply_lut`] with an explicit scheduler.
pub fn apply_lut_with(src: &PixelBuffer, lut: &Lut, sched: &Scheduler) -> OpsResult<PixelBuffer> {
    adjust_func_with(
        src,
        |[r, g, b, a]| [lut[r as usize], lut[g as usize], lut[b as usize], a],
        sched,
    )
}

/// Rec. 601 luma into all three color channels.
pub fn grayscale(src: &PixelBuffer) -> OpsResult<PixelBuffer> {
    adjust_func(src, |[r, g, b, a]| {
        let y = 0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64;
        let y = (y + 0.5) as u8;
        [y, y, y, a]
    })
}

/// Negates the color channels.
pub fn invert(src: &PixelBuffer) -> OpsResult<PixelBuffer> {
    adjust_func(src, |[r, g, b, a]| [255 - r, 255 - g, 255 - b, a])
}

/// Shifts brightness by `percent` of full scale, in `[-100, 100]`.
///
/// # Errors
///
/// [`OpsError::InvalidParameter`] if `percent` is not finite.
pub fn adjust_brightness(src: &PixelBuffer, percent: f64) -> OpsResult<PixelBuffer> {
    check_finite("brightness", percent)?;
    let percent = percent.clamp(-100.0, 100.0);
    trace!(percent, "brightness");
    if percent == 0.0 {
        return Ok(src.to_compact());
    }
    let shift = 255.0 * percent / 100.0;
    apply_lut(src, &build_lut(|i| i + shift))
}

/// Scales contrast around mid-gray by `percent`, in `[-100, 100]`.
///
/// -100 collapses everything to mid-gray, 100 thresholds at mid-gray.
///
/// # Errors
///
/// [`OpsError::InvalidParameter`] if `percent` is not finite.
pub fn adjust_contrast(src: &PixelBuffer, percent: f64) -> OpsResult<PixelBuffer> {
    check_finite("contrast", percent)?;
    let percent = percent.clamp(-100.0, 100.0);
    trace!(percent, "contrast");
    if percent == 0.0 {
        return Ok(src.to_compact());
    }

    let v = (100.0 + percent) / 100.0;
    let lut = build_lut(|i| {
        let t = i / 255.0 - 0.5;
        if v <= 1.0 {
            (0.5 + t * v) * 255.0
        } else if v < 2.0 {
            (0.5 + t / (2.0 - v)) * 255.0
        } else if t < 0.0 {
            0.0
        } else {
            255.0
        }
    });
    apply_lut(src, &lut)
}

/// Gamma correction: `out = in ^ (1 / gamma)`.
///
/// `gamma` below 0.0001 is raised to 0.0001; 1 is a no-op.
///
/// # Errors
///
/// [`OpsError::InvalidParameter`] if `gamma` is not finite.
pub fn adjust_gamma(src: &PixelBuffer, gamma: f64) -> OpsResult<PixelBuffer> {
    check_finite("gamma", gamma)?;
    trace!(gamma, "gamma");
    if gamma == 1.0 {
        return Ok(src.to_compact());
    }
    let e = 1.0 / gamma.max(0.0001);
    apply_lut(src, &build_lut(|i| (i / 255.0).powf(e) * 255.0))
}

/// Scales HSL saturation by `1 + percent / 100`, `percent` in `[-100, 500]`.
///
/// # Errors
///
/// [`OpsError::InvalidParameter`] if `percent` is not finite.
pub fn adjust_saturation(src: &PixelBuffer, percent: f64) -> OpsResult<PixelBuffer> {
    check_finite("saturation", percent)?;
    let percent = percent.clamp(-100.0, 500.0);
    trace!(percent, "saturation");
    if percent == 0.0 {
        return Ok(src.to_compact());
    }
    let m = 1.0 + percent / 100.0;
    adjust_func(src, |[r, g, b, a]| {
        let (h, s, l) = rgb_to_hsl(r, g, b);
        let [r, g, b] = hsl_to_rgb(h, (s * m).min(1.0), l);
        [r, g, b, a]
    })
}

/// Rotates hue by `degrees`. Multiples of 360 are a no-op.
///
/// # Errors
///
/// [`OpsError::InvalidParameter`] if `degrees` is not finite.
pub fn adjust_hue(src: &PixelBuffer, degrees: f64) -> OpsResult<PixelBuffer> {
    check_finite("hue", degrees)?;
    trace!(degrees, "hue");
    let shift = (degrees % 360.0) / 360.0;
    if shift == 0.0 {
        return Ok(src.to_compact());
    }
    adjust_func(src, |[r, g, b, a]| {
        let (h, s, l) = rgb_to_hsl(r, g, b);
        let h = (h + shift).rem_euclid(1.0);
        let [r, g, b] = hsl_to_rgb(h, s, l);
        [r, g, b, a]
    })
}

/// Converts 8-bit RGB to `(hue, saturation, lightness)`, all in `[0, 1]`.
pub fn rgb_to_hsl(r: u8, g: u8, b: u8) -> (f64, f64, f64) {
    let (rr, gg, bb) = (r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0);
    let max = rr.max(gg).max(bb);
    let min = rr.min(gg).min(bb);
    let l = (max + min) / 2.0;
    if max == min {
        return (0.0, 0.0, l);
    }

    let d = max - min;
    let s = if l > 0.5 { d / (2.0 - max - min) } else { d / (max + min) };
    let h = if max == rr {
        (gg - bb) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == gg {
        (bb - rr) / d + 2.0
    } else {
        (rr - gg) / d + 4.0
    };
    (h / 6.0, s, l)
}

/// Converts `(hue, saturation, lightness)` in `[0, 1]` back to 8-bit RGB.
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> [u8; 3] {
    if s == 0.0 {
        let v = clamp_u8(l * 255.0);
        return [v, v, v];
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    [
        clamp_u8(hue_to_rgb(p, q, h + 1.0 / 3.0) * 255.0),
        clamp_u8(hue_to_rgb(p, q, h) * 255.0),
        clamp_u8(hue_to_rgb(p, q, h - 1.0 / 3.0) * 255.0),
    ]
}

fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}
