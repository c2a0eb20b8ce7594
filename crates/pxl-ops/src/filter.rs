//! Convolution, blur and sharpening.
//!
//! Two paths live here:
//!
//! - [`convolve`] applies a fixed square [`Kernel`] matrix, with an
//!   [`EdgePolicy`] for taps that fall outside the buffer.
//! - [`blur`] and [`sharpen`] use a 1-D Gaussian of width `ceil(3 sigma)`
//!   run through the separable resampler at unchanged size, so cost grows
//!   linearly with sigma instead of quadratically.
//!
//! All four channels are filtered alike. Zero the alpha weights of a
//! kernel yourself if alpha must stay untouched.
//!
//! # Kernels
//!
//! - [`Kernel::identity`] - Pass-through
//! - [`Kernel::box_blur`] - Simple average blur
//! - [`Kernel::gaussian`] - Gaussian matrix
//! - [`Kernel::sharpen`] - Laplacian sharpening
//! - [`Kernel::edge_detect`] - Laplacian edges
//! - [`Kernel::emboss`] - Directional relief
//!
//! # Example
//!
//! ```rust
//! use pxl_core::PixelBuffer;
//! use pxl_ops::{blur, convolve, ConvolveOptions, Kernel};
//!
//! let src = PixelBuffer::filled(16, 16, [200, 100, 50, 255]);
//! let same = convolve(&src, &Kernel::box_blur(3), ConvolveOptions::default()).unwrap();
//! assert_eq!(same, src);
//!
//! let soft = blur(&src, 1.5).unwrap();
//! assert_eq!(soft.pixel(8, 8), [200, 100, 50, 255]);
//! ```

use crate::parallel::Scheduler;
use crate::resize::{clamp_u8, separable};
use crate::{Filter, OpsError, OpsResult, WeightTable};
use pxl_core::{PixelBuffer, CHANNELS};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, trace};

/// Handling of convolution taps outside the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EdgePolicy {
    /// Clamp coordinates to the nearest edge pixel.
    #[default]
    Extend,
    /// Wrap around to the opposite edge.
    Wrap,
    /// Treat outside pixels as transparent black.
    Crop,
}

impl EdgePolicy {
    /// Maps a possibly out-of-range coordinate onto `[0, len)`.
    ///
    /// `None` means the tap contributes nothing. `len` must be non-zero.
    #[inline]
    pub fn resolve(self, i: isize, len: usize) -> Option<usize> {
        let n = len as isize;
        match self {
            EdgePolicy::Extend => Some(i.clamp(0, n - 1) as usize),
            EdgePolicy::Wrap => Some(i.rem_euclid(n) as usize),
            EdgePolicy::Crop => (0..n).contains(&i).then_some(i as usize),
        }
    }
}

impl fmt::Display for EdgePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EdgePolicy::Extend => "extend",
            EdgePolicy::Wrap => "wrap",
            EdgePolicy::Crop => "crop",
        })
    }
}

impl FromStr for EdgePolicy {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "extend" | "clamp" | "replicate" => Ok(EdgePolicy::Extend),
            "wrap" | "repeat" | "tile" => Ok(EdgePolicy::Wrap),
            "crop" | "zero" | "transparent" => Ok(EdgePolicy::Crop),
            _ => Err(OpsError::UnsupportedEdgePolicy(s.to_string())),
        }
    }
}

/// Square convolution matrix with odd side length, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    data: Vec<f32>,
    size: usize,
}

impl Kernel {
    /// Creates a kernel from `size * size` row-major coefficients.
    ///
    /// # Errors
    ///
    /// [`OpsError::InvalidKernel`] if `size` is not odd or `data` has the
    /// wrong length.
    ///
    /// ```rust
    /// use pxl_ops::Kernel;
    ///
    /// assert!(Kernel::new(vec![1.0; 9], 3).is_ok());
    /// assert!(Kernel::new(vec![1.0; 4], 2).is_err());
    /// ```
    pub fn new(data: Vec<f32>, size: usize) -> OpsResult<Self> {
        if size % 2 == 0 {
            return Err(OpsError::InvalidKernel(format!(
                "kernel size must be odd, got {size}"
            )));
        }
        if data.len() != size * size {
            return Err(OpsError::InvalidKernel(format!(
                "kernel data size {} doesn't match {size}x{size}",
                data.len()
            )));
        }
        Ok(Self { data, size })
    }

    /// Creates a kernel from a flat slice whose length is an odd square.
    pub fn from_slice(data: &[f32]) -> OpsResult<Self> {
        let size = (data.len() as f64).sqrt().round() as usize;
        if size * size != data.len() {
            return Err(OpsError::InvalidKernel(format!(
                "{} coefficients do not form a square matrix",
                data.len()
            )));
        }
        Self::new(data.to_vec(), size)
    }

    /// Pass-through kernel: 1 at the center, 0 elsewhere.
    pub fn identity(size: usize) -> Self {
        let size = odd(size);
        let mut data = vec![0.0; size * size];
        data[size * size / 2] = 1.0;
        Self { data, size }
    }

    /// Creates a box blur kernel (simple average).
    ///
    /// Even sizes are bumped to the next odd size.
    pub fn box_blur(size: usize) -> Self {
        let size = odd(size);
        let count = size * size;
        Self {
            data: vec![1.0 / count as f32; count],
            size,
        }
    }

    /// Creates a normalized Gaussian matrix.
    ///
    /// A `sigma` that is not positive and finite gives [`Kernel::identity`].
    ///
    /// ```rust
    /// use pxl_ops::Kernel;
    ///
    /// let k = Kernel::gaussian(5, 1.5);
    /// assert_eq!(k.size(), 5);
    /// assert!((k.sum() - 1.0).abs() < 1e-5);
    /// ```
    pub fn gaussian(size: usize, sigma: f32) -> Self {
        if !(sigma > 0.0 && sigma.is_finite()) {
            return Self::identity(size);
        }
        let size = odd(size);
        let half = (size / 2) as i32;
        let sigma2 = 2.0 * sigma * sigma;

        let mut data = Vec::with_capacity(size * size);
        for y in -half..=half {
            for x in -half..=half {
                let d = (x * x + y * y) as f32;
                data.push((-d / sigma2).exp());
            }
        }
        let sum: f32 = data.iter().sum();
        if sum > 0.0 {
            data.iter_mut().for_each(|w| *w /= sum);
        }
        Self { data, size }
    }

    /// Creates a Laplacian sharpening kernel of the given strength.
    pub fn sharpen(amount: f32) -> Self {
        let center = 1.0 + 4.0 * amount;
        #[rustfmt::skip]
        let data = vec![
            0.0,     -amount, 0.0,
            -amount, center,  -amount,
            0.0,     -amount, 0.0,
        ];
        Self { data, size: 3 }
    }

    /// Creates an edge detection kernel (Laplacian). Coefficients sum to 0.
    pub fn edge_detect() -> Self {
        #[rustfmt::skip]
        let data = vec![
            0.0, -1.0, 0.0,
            -1.0, 4.0, -1.0,
            0.0, -1.0, 0.0,
        ];
        Self { data, size: 3 }
    }

    /// Creates an emboss kernel.
    pub fn emboss() -> Self {
        #[rustfmt::skip]
        let data = vec![
            -2.0, -1.0, 0.0,
            -1.0, 1.0, 1.0,
            0.0, 1.0, 2.0,
        ];
        Self { data, size: 3 }
    }

    /// Side length.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Half the side length.
    #[inline]
    pub fn radius(&self) -> usize {
        self.size / 2
    }

    /// Row-major coefficients.
    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Sum of all coefficients.
    pub fn sum(&self) -> f32 {
        self.data.iter().sum()
    }
}

#[inline]
fn odd(size: usize) -> usize {
    if size % 2 == 0 { size + 1 } else { size }
}

/// Options for [`convolve`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvolveOptions {
    /// Out-of-bounds handling.
    pub edge: EdgePolicy,
    /// Divisor applied to every weighted sum.
    ///
    /// `None` uses the coefficient sum. A zero (or non-finite) divisor,
    /// explicit or from a zero sum, falls back to 1.
    pub divisor: Option<f32>,
    /// Added after division.
    pub bias: f32,
    /// Take the absolute value before clamping (edge detection).
    pub abs: bool,
}

impl Default for ConvolveOptions {
    fn default() -> Self {
        Self {
            edge: EdgePolicy::Extend,
            divisor: None,
            bias: 0.0,
            abs: false,
        }
    }
}

impl ConvolveOptions {
    /// Default options with the given edge policy.
    pub fn with_edge(edge: EdgePolicy) -> Self {
        Self {
            edge,
            ..Self::default()
        }
    }

    /// Effective divisor for `kernel`.
    fn divisor_for(&self, kernel: &Kernel) -> f32 {
        let d = self.divisor.unwrap_or_else(|| kernel.sum());
        if !d.is_finite() || d.abs() < 1e-6 {
            debug!(divisor = d, "divisor is zero, using 1");
            1.0
        } else {
            d
        }
    }
}

/// Convolves `src` with `kernel`.
///
/// Each output channel is `sum(k * src) / divisor + bias`, clamped to
/// `0..=255`. The output has the source dimensions.
///
/// # Errors
///
/// Only buffer construction can fail; kernel validity is enforced by
/// [`Kernel::new`].
pub fn convolve(src: &PixelBuffer, kernel: &Kernel, options: ConvolveOptions) -> OpsResult<PixelBuffer> {
    convolve_with(src, kernel, options, &Scheduler::default())
}

/// [`convolve`] with an explicit scheduler.
pub fn convolve_with(
    src: &PixelBuffer,
    kernel: &Kernel,
    options: ConvolveOptions,
    sched: &Scheduler,
) -> OpsResult<PixelBuffer> {
    if src.is_empty() {
        return Ok(src.to_compact());
    }
    let (width, height) = src.dimensions();
    let size = kernel.size();
    let r = kernel.radius() as isize;
    let divisor = options.divisor_for(kernel) as f64;
    let bias = options.bias as f64;
    trace!(width, height, size, edge = %options.edge, divisor, bias, "convolve");

    // Source column for every (x, kx), resolved once.
    let cols: Vec<Option<usize>> = (0..width as isize)
        .flat_map(|x| (0..size as isize).map(move |kx| options.edge.resolve(x + kx - r, width)))
        .collect();

    sched.render(width, height, |y, out| {
        let rows: Vec<Option<&[u8]>> = (0..size as isize)
            .map(|ky| options.edge.resolve(y as isize + ky - r, height).map(|sy| src.row(sy)))
            .collect();

        for (x, px) in out.chunks_exact_mut(CHANNELS).enumerate() {
            let taps = &cols[x * size..(x + 1) * size];
            let mut acc = [0.0f64; CHANNELS];
            for (krow, line) in kernel.data.chunks_exact(size).zip(&rows) {
                let Some(line) = line else { continue };
                for (&k, sx) in krow.iter().zip(taps) {
                    let Some(sx) = *sx else { continue };
                    let s = &line[sx * CHANNELS..sx * CHANNELS + CHANNELS];
                    for c in 0..CHANNELS {
                        acc[c] += k as f64 * s[c] as f64;
                    }
                }
            }
            for c in 0..CHANNELS {
                let mut v = acc[c] / divisor + bias;
                if options.abs {
                    v = v.abs();
                }
                px[c] = clamp_u8(v);
            }
        }
    })
}

/// Convolves with a 3x3 row-major matrix.
///
/// ```rust
/// use pxl_core::PixelBuffer;
/// use pxl_ops::{convolve_3x3, ConvolveOptions};
///
/// let src = PixelBuffer::from_fn(4, 4, |x, y| [(x * 40) as u8, (y * 40) as u8, 9, 255]);
/// let k = [0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0];
/// assert_eq!(convolve_3x3(&src, k, ConvolveOptions::default()).unwrap(), src);
/// ```
pub fn convolve_3x3(src: &PixelBuffer, matrix: [f32; 9], options: ConvolveOptions) -> OpsResult<PixelBuffer> {
    let kernel = Kernel::new(matrix.to_vec(), 3)?;
    convolve(src, &kernel, options)
}

/// Convolves with a 5x5 row-major matrix.
pub fn convolve_5x5(src: &PixelBuffer, matrix: [f32; 25], options: ConvolveOptions) -> OpsResult<PixelBuffer> {
    let kernel = Kernel::new(matrix.to_vec(), 5)?;
    convolve(src, &kernel, options)
}

fn check_finite(name: &str, v: f64) -> OpsResult<()> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(OpsError::InvalidParameter(format!("{name} must be finite, got {v}")))
    }
}

/// Gaussian blur with standard deviation `sigma`.
///
/// `sigma <= 0` returns an unchanged copy. Edges are extended.
///
/// # Errors
///
/// [`OpsError::InvalidParameter`] if `sigma` is NaN or infinite, or so
/// large that the kernel radius exceeds the weight table support cap.
pub fn blur(src: &PixelBuffer, sigma: f64) -> OpsResult<PixelBuffer> {
    blur_with(src, sigma, &Scheduler::default())
}

/// [`blur`] with an explicit scheduler.
pub fn blur_with(src: &PixelBuffer, sigma: f64, sched: &Scheduler) -> OpsResult<PixelBuffer> {
    check_finite("sigma", sigma)?;
    if sigma <= 0.0 || src.is_empty() {
        return Ok(src.to_compact());
    }

    let radius = (sigma * 3.0).ceil();
    let two_s2 = 2.0 * sigma * sigma;
    let gauss = Filter::custom(radius, move |x| (-x * x / two_s2).exp())?;
    trace!(sigma, radius, width = src.width(), height = src.height(), "blur");

    let h = WeightTable::build(src.width(), src.width(), &gauss)?;
    let v = WeightTable::build(src.height(), src.height(), &gauss)?;
    separable(src, &h, &v, sched)
}

/// Sharpens by adding back the difference to a blurred copy.
///
/// Same as [`unsharp_mask`] with amount 1 and threshold 0.
pub fn sharpen(src: &PixelBuffer, sigma: f64) -> OpsResult<PixelBuffer> {
    unsharp_mask(src, sigma, 1.0, 0.0)
}

/// [`sharpen`] with an explicit scheduler.
pub fn sharpen_with(src: &PixelBuffer, sigma: f64, sched: &Scheduler) -> OpsResult<PixelBuffer> {
    unsharp_mask_with(src, sigma, 1.0, 0.0, sched)
}

/// Unsharp mask: `original + amount * (original - blurred)`, clamped.
///
/// Channels whose difference is below `threshold` are left unchanged,
/// which keeps flat areas free of amplified noise.
///
/// # Errors
///
/// [`OpsError::InvalidParameter`] if any parameter is not finite.
///
/// ```rust
/// use pxl_core::PixelBuffer;
/// use pxl_ops::unsharp_mask;
///
/// let src = PixelBuffer::from_fn(9, 1, |x, _| if x < 4 { 100u8 } else { 150u8 });
/// let out = unsharp_mask(&src, 1.0, 1.0, 0.0).unwrap();
/// assert!(out.pixel(3, 0)[0] < 100);
/// assert!(out.pixel(4, 0)[0] > 150);
/// ```
pub fn unsharp_mask(src: &PixelBuffer, sigma: f64, amount: f64, threshold: f64) -> OpsResult<PixelBuffer> {
    unsharp_mask_with(src, sigma, amount, threshold, &Scheduler::default())
}

/// [`unsharp_mask`] with an explicit scheduler.
pub fn unsharp_mask_with(
    src: &PixelBuffer,
    sigma: f64,
    amount: f64,
    threshold: f64,
    sched: &Scheduler,
) -> OpsResult<PixelBuffer> {
    check_finite("sigma", sigma)?;
    check_finite("amount", amount)?;
    check_finite("threshold", threshold)?;
    if sigma <= 0.0 || src.is_empty() {
        return Ok(src.to_compact());
    }

    let blurred = blur_with(src, sigma, sched)?;
    sched.render(src.width(), src.height(), |y, out| {
        for ((o, &s), &b) in out.iter_mut().zip(src.row(y)).zip(blurred.row(y)) {
            let diff = s as f64 - b as f64;
            *o = if diff.abs() < threshold {
                s
            } else {
                clamp_u8(s as f64 + amount * diff)
            };
        }
    })
}
