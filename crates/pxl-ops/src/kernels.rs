//! Resampling kernel catalog.
//!
//! Each [`Filter`] is a pure weighting function `weight(d)` defined on
//! `[-support, support]` and zero outside.
//!
//! | Filter                | Support | Shape                                  |
//! |-----------------------|---------|----------------------------------------|
//! | [`NearestNeighbor`]   | 0.5     | half-open box `[-0.5, 0.5)`            |
//! | [`Box`]               | 0.5     | closed box `[-0.5, 0.5]`               |
//! | [`Linear`]            | 1.0     | triangle `1 - abs(d)`                  |
//! | [`Hermite`]           | 2.0     | BC-spline B=0, C=0                     |
//! | [`MitchellNetravali`] | 2.0     | BC-spline B=1/3, C=1/3                 |
//! | [`CatmullRom`]        | 2.0     | BC-spline B=0, C=1/2                   |
//! | [`BSpline`]           | 2.0     | BC-spline B=1, C=0                     |
//! | [`Gaussian`]          | 2.0     | `exp(-d^2 / (2 s^2))`, s = 0.5         |
//! | [`Lanczos`]           | 3.0     | `sinc(d) sinc(d/3)`                    |
//! | [`Hann`] ...          | 3.0     | `sinc(d)` times the named window       |
//!
//! [`NearestNeighbor`]: Filter::NearestNeighbor
//! [`Box`]: Filter::Box
//! [`Linear`]: Filter::Linear
//! [`Hermite`]: Filter::Hermite
//! [`MitchellNetravali`]: Filter::MitchellNetravali
//! [`CatmullRom`]: Filter::CatmullRom
//! [`BSpline`]: Filter::BSpline
//! [`Gaussian`]: Filter::Gaussian
//! [`Lanczos`]: Filter::Lanczos
//! [`Hann`]: Filter::Hann
//!
//! Anything else can be plugged in through [`Filter::custom`].
//!
//! # Example
//!
//! ```rust
//! use pxl_ops::Filter;
//!
//! assert_eq!(Filter::Linear.weight(0.25), 0.75);
//! assert_eq!(Filter::Lanczos.support(), 3.0);
//!
//! let tent = Filter::custom(1.0, |d| 1.0 - d.abs()).unwrap();
//! assert_eq!(tent.weight(0.5), 0.5);
//! assert_eq!(tent.weight(1.5), 0.0);
//! ```

use crate::{OpsError, OpsResult};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// User-supplied kernel: a weighting function plus its support radius.
#[derive(Clone)]
pub struct CustomFilter {
    support: f64,
    kernel: Arc<dyn Fn(f64) -> f64 + Send + Sync>,
}

impl CustomFilter {
    /// Returns the support radius.
    #[inline]
    pub fn support(&self) -> f64 {
        self.support
    }
}

impl fmt::Debug for CustomFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomFilter")
            .field("support", &self.support)
            .finish_non_exhaustive()
    }
}

/// Resampling filter used by resize and blur.
///
/// Cloning is cheap; a custom kernel is shared behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub enum Filter {
    /// Degenerate box, picks a single source sample.
    NearestNeighbor,
    /// Box (area average when downscaling).
    Box,
    /// Triangle, a.k.a. bilinear.
    Linear,
    /// Hermite cubic (B=0, C=0).
    Hermite,
    /// Mitchell-Netravali cubic (B=1/3, C=1/3).
    MitchellNetravali,
    /// Catmull-Rom cubic (B=0, C=1/2), interpolating.
    CatmullRom,
    /// Cubic B-spline (B=1, C=0), smoothing.
    BSpline,
    /// Gaussian with fixed sigma 0.5.
    Gaussian,
    /// Lanczos-3 windowed sinc.
    #[default]
    Lanczos,
    /// Sinc with Hann window.
    Hann,
    /// Sinc with Hamming window.
    Hamming,
    /// Sinc with Blackman window.
    Blackman,
    /// Sinc with Bartlett (triangular) window.
    Bartlett,
    /// Sinc with Welch (parabolic) window.
    Welch,
    /// Sinc with cosine window.
    Cosine,
    /// Caller-supplied kernel.
    Custom(CustomFilter),
}

impl Filter {
    /// Every named filter, in catalog order.
    pub const NAMED: [Filter; 15] = [
        Filter::NearestNeighbor,
        Filter::Box,
        Filter::Linear,
        Filter::Hermite,
        Filter::MitchellNetravali,
        Filter::CatmullRom,
        Filter::BSpline,
        Filter::Gaussian,
        Filter::Lanczos,
        Filter::Hann,
        Filter::Hamming,
        Filter::Blackman,
        Filter::Bartlett,
        Filter::Welch,
        Filter::Cosine,
    ];

    /// Builds a custom filter.
    ///
    /// `kernel` is only evaluated on `[-support, support]`.
    ///
    /// # Errors
    ///
    /// [`OpsError::InvalidKernel`] if `support` is not a positive finite number.
    pub fn custom<F>(support: f64, kernel: F) -> OpsResult<Self>
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        if !(support.is_finite() && support > 0.0) {
            return Err(OpsError::InvalidKernel(format!(
                "support must be positive and finite, got {support}"
            )));
        }
        Ok(Filter::Custom(CustomFilter {
            support,
            kernel: Arc::new(kernel),
        }))
    }

    /// Builds a member of the two-parameter cubic family (support 2).
    ///
    /// ```rust
    /// use pxl_ops::Filter;
    ///
    /// let catrom = Filter::cubic(0.0, 0.5);
    /// assert_eq!(catrom.weight(0.7), Filter::CatmullRom.weight(0.7));
    /// ```
    pub fn cubic(b: f64, c: f64) -> Self {
        Filter::Custom(CustomFilter {
            support: 2.0,
            kernel: Arc::new(move |x| bc_spline(x, b, c)),
        })
    }

    /// Returns the support radius for this filter.
    #[inline]
    pub fn support(&self) -> f64 {
        match self {
            Filter::NearestNeighbor | Filter::Box => 0.5,
            Filter::Linear => 1.0,
            Filter::Hermite
            | Filter::MitchellNetravali
            | Filter::CatmullRom
            | Filter::BSpline
            | Filter::Gaussian => 2.0,
            Filter::Lanczos
            | Filter::Hann
            | Filter::Hamming
            | Filter::Blackman
            | Filter::Bartlett
            | Filter::Welch
            | Filter::Cosine => 3.0,
            Filter::Custom(custom) => custom.support,
        }
    }

    /// Evaluates the kernel at distance `x`; zero outside the support.
    #[inline]
    pub fn weight(&self, x: f64) -> f64 {
        let ax = x.abs();
        match self {
            Filter::NearestNeighbor => {
                if (-0.5..0.5).contains(&x) { 1.0 } else { 0.0 }
            }
            Filter::Box => {
                if ax <= 0.5 { 1.0 } else { 0.0 }
            }
            Filter::Linear => {
                if ax < 1.0 { 1.0 - ax } else { 0.0 }
            }
            Filter::Hermite => bc_spline(ax, 0.0, 0.0),
            Filter::MitchellNetravali => bc_spline(ax, 1.0 / 3.0, 1.0 / 3.0),
            Filter::CatmullRom => bc_spline(ax, 0.0, 0.5),
            Filter::BSpline => bc_spline(ax, 1.0, 0.0),
            Filter::Gaussian => {
                // sigma = 0.5: exp(-x^2 / (2 * 0.25))
                if ax < 2.0 { (-2.0 * ax * ax).exp() } else { 0.0 }
            }
            Filter::Lanczos => windowed_sinc(ax, |t| sinc(t / 3.0)),
            Filter::Hann => windowed_sinc(ax, |t| 0.5 + 0.5 * (PI * t / 3.0).cos()),
            Filter::Hamming => windowed_sinc(ax, |t| 0.54 + 0.46 * (PI * t / 3.0).cos()),
            Filter::Blackman => windowed_sinc(ax, |t| {
                0.42 + 0.5 * (PI * t / 3.0).cos() + 0.08 * (2.0 * PI * t / 3.0).cos()
            }),
            Filter::Bartlett => windowed_sinc(ax, |t| (3.0 - t) / 3.0),
            Filter::Welch => windowed_sinc(ax, |t| 1.0 - t * t / 9.0),
            Filter::Cosine => windowed_sinc(ax, |t| (PI / 2.0 * t / 3.0).cos()),
            Filter::Custom(custom) => {
                if ax <= custom.support { (custom.kernel)(x) } else { 0.0 }
            }
        }
    }

    /// Canonical lowercase name, as accepted by [`FromStr`].
    pub fn name(&self) -> &'static str {
        match self {
            Filter::NearestNeighbor => "nearest",
            Filter::Box => "box",
            Filter::Linear => "linear",
            Filter::Hermite => "hermite",
            Filter::MitchellNetravali => "mitchell",
            Filter::CatmullRom => "catmullrom",
            Filter::BSpline => "bspline",
            Filter::Gaussian => "gaussian",
            Filter::Lanczos => "lanczos",
            Filter::Hann => "hann",
            Filter::Hamming => "hamming",
            Filter::Blackman => "blackman",
            Filter::Bartlett => "bartlett",
            Filter::Welch => "welch",
            Filter::Cosine => "cosine",
            Filter::Custom(_) => "custom",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Filter {
    type Err = OpsError;

    /// Parses a filter name; case, `-` and `_` are ignored.
    ///
    /// ```rust
    /// use pxl_ops::Filter;
    ///
    /// let f: Filter = "Catmull-Rom".parse().unwrap();
    /// assert_eq!(f.name(), "catmullrom");
    /// assert!("sinc".parse::<Filter>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        let filter = match key.as_str() {
            "nearest" | "nearestneighbor" | "point" => Filter::NearestNeighbor,
            "box" => Filter::Box,
            "linear" | "bilinear" | "triangle" | "tent" => Filter::Linear,
            "hermite" => Filter::Hermite,
            "mitchell" | "mitchellnetravali" => Filter::MitchellNetravali,
            "catmullrom" | "catrom" | "bicubic" => Filter::CatmullRom,
            "bspline" => Filter::BSpline,
            "gaussian" => Filter::Gaussian,
            "lanczos" | "lanczos3" => Filter::Lanczos,
            "hann" => Filter::Hann,
            "hamming" => Filter::Hamming,
            "blackman" => Filter::Blackman,
            "bartlett" => Filter::Bartlett,
            "welch" => Filter::Welch,
            "cosine" => Filter::Cosine,
            _ => return Err(OpsError::InvalidParameter(format!("unknown filter: {s}"))),
        };
        Ok(filter)
    }
}

/// Normalized sinc, `sin(pi x) / (pi x)`.
#[inline]
fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        let px = PI * x;
        px.sin() / px
    }
}

/// `sinc(t) * window(t)` on the 3-lobe support, for `t = abs(x)`.
#[inline]
fn windowed_sinc(t: f64, window: impl Fn(f64) -> f64) -> f64 {
    if t < 3.0 { sinc(t) * window(t) } else { 0.0 }
}

/// Mitchell-Netravali two-parameter cubic.
#[inline]
fn bc_spline(x: f64, b: f64, c: f64) -> f64 {
    let ax = x.abs();
    let k = if ax < 1.0 {
        (12.0 - 9.0 * b - 6.0 * c) * ax * ax * ax
            + (-18.0 + 12.0 * b + 6.0 * c) * ax * ax
            + (6.0 - 2.0 * b)
    } else if ax < 2.0 {
        (-b - 6.0 * c) * ax * ax * ax
            + (6.0 * b + 30.0 * c) * ax * ax
            + (-12.0 * b - 48.0 * c) * ax
            + (8.0 * b + 24.0 * c)
    } else {
        0.0
    };
    k / 6.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_filter_weights() {
        assert_eq!(Filter::NearestNeighbor.weight(0.0), 1.0);
        assert_eq!(Filter::NearestNeighbor.weight(-0.5), 1.0);
        assert_eq!(Filter::NearestNeighbor.weight(0.5), 0.0);
        assert_eq!(Filter::Box.weight(0.5), 1.0);
        assert_eq!(Filter::Box.weight(0.51), 0.0);
        assert_abs_diff_eq!(Filter::Linear.weight(0.5), 0.5);
        assert_abs_diff_eq!(Filter::Lanczos.weight(0.0), 1.0);
    }

    #[test]
    fn test_zero_outside_support() {
        for f in Filter::NAMED {
            let s = f.support();
            assert_eq!(f.weight(s + 1e-9), 0.0, "{f}");
            assert_eq!(f.weight(-s - 1e-9), 0.0, "{f}");
            assert_eq!(f.weight(s + 10.0), 0.0, "{f}");
        }
    }

    #[test]
    fn test_symmetric() {
        for f in Filter::NAMED.into_iter().filter(|f| !matches!(f, Filter::NearestNeighbor)) {
            for i in 0..60 {
                let x = i as f64 * 0.05;
                assert_abs_diff_eq!(f.weight(x), f.weight(-x), epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_interpolating_at_integers() {
        // These pass through the samples: 1 at 0, 0 at every other integer.
        for f in [Filter::Linear, Filter::CatmullRom, Filter::Hermite, Filter::Lanczos, Filter::Hann] {
            assert_abs_diff_eq!(f.weight(0.0), 1.0, epsilon = 1e-12);
            for k in 1..4 {
                assert_abs_diff_eq!(f.weight(k as f64), 0.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_cubic_family_members() {
        // Mitchell: k(0) = (6 - 2B) / 6 = 8/9
        assert_abs_diff_eq!(Filter::MitchellNetravali.weight(0.0), 8.0 / 9.0, epsilon = 1e-12);
        // B-spline: k(0) = 4/6, k(1) = 1/6
        assert_abs_diff_eq!(Filter::BSpline.weight(0.0), 2.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(Filter::BSpline.weight(1.0), 1.0 / 6.0, epsilon = 1e-12);
        // Hermite second lobe is flat zero
        assert_eq!(Filter::Hermite.weight(1.5), 0.0);
        assert_abs_diff_eq!(Filter::cubic(1.0 / 3.0, 1.0 / 3.0).weight(1.3), Filter::MitchellNetravali.weight(1.3));
    }

    #[test]
    fn test_gaussian_shape() {
        assert_abs_diff_eq!(Filter::Gaussian.weight(0.5), (-0.5f64).exp(), epsilon = 1e-12);
        assert!(Filter::Gaussian.weight(1.9) > 0.0);
    }

    #[test]
    fn test_custom_validation() {
        assert!(matches!(Filter::custom(0.0, |_| 1.0), Err(OpsError::InvalidKernel(_))));
        assert!(matches!(Filter::custom(-1.0, |_| 1.0), Err(OpsError::InvalidKernel(_))));
        assert!(matches!(Filter::custom(f64::INFINITY, |_| 1.0), Err(OpsError::InvalidKernel(_))));
        assert!(matches!(Filter::custom(f64::NAN, |_| 1.0), Err(OpsError::InvalidKernel(_))));
        let f = Filter::custom(1.5, |_| 2.0).unwrap();
        assert_eq!(f.support(), 1.5);
        assert_eq!(f.weight(1.5), 2.0);
        assert_eq!(f.name(), "custom");
    }

    #[test]
    fn test_parse_roundtrip_names() {
        for f in Filter::NAMED {
            let parsed: Filter = f.name().parse().unwrap();
            assert_eq!(parsed.name(), f.name());
        }
        assert_eq!("Lanczos3".parse::<Filter>().unwrap().name(), "lanczos");
        assert_eq!("nearest_neighbor".parse::<Filter>().unwrap().name(), "nearest");
    }
}
