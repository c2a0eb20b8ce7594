//! # pxl-ops
//!
//! Resampling and convolution engine over [`pxl_core::PixelBuffer`].
//!
//! Every operation takes an immutable source buffer and returns a new
//! one. Output rows are split across workers by the [`parallel`]
//! scheduler; results are byte-identical for any partition count.
//!
//! # Modules
//!
//! - [`kernels`] - Resampling filter catalog
//! - [`weights`] - Per-axis weight tables
//! - [`resize`] - Separable resize, fit, fill, thumbnail
//! - [`filter`] - Matrix convolution, blur, sharpen
//! - [`transform`] - Crop, flip, rotate
//! - [`adjust`] - Tone curves and HSL adjustments
//! - [`parallel`] - Fork-join row scheduler
//!
//! # Example
//!
//! ```rust
//! use pxl_core::PixelBuffer;
//! use pxl_ops::{resize, sharpen, thumbnail, Filter};
//!
//! let src = PixelBuffer::from_fn(64, 48, |x, y| [x as u8 * 4, y as u8 * 5, 128, 255]);
//!
//! let half = resize(&src, 32, 24, &Filter::Lanczos).unwrap();
//! let crisp = sharpen(&half, 0.8).unwrap();
//! let thumb = thumbnail(&crisp, 16, 16, &Filter::CatmullRom).unwrap();
//! assert_eq!(thumb.dimensions(), (16, 16));
//! ```
//!
//! ## Explicit scheduling
//!
//! ```rust
//! use pxl_core::PixelBuffer;
//! use pxl_ops::{resize_with, Filter, Scheduler};
//!
//! let src = PixelBuffer::filled(10, 10, [1, 2, 3, 4]);
//! let a = resize_with(&src, 7, 3, &Filter::Box, &Scheduler::sequential()).unwrap();
//! let b = resize_with(&src, 7, 3, &Filter::Box, &Scheduler::with_partitions(8)).unwrap();
//! assert_eq!(a, b);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod adjust;
pub mod filter;
pub mod kernels;
pub mod parallel;
pub mod resize;
pub mod transform;
pub mod weights;

pub use error::{OpsError, OpsResult};
pub use filter::{
    blur, blur_with, convolve, convolve_3x3, convolve_5x5, convolve_with, sharpen, sharpen_with,
    unsharp_mask, unsharp_mask_with, ConvolveOptions, EdgePolicy, Kernel,
};
pub use kernels::{CustomFilter, Filter};
pub use parallel::Scheduler;
pub use resize::{
    fill, fill_crop_rect, fill_with, fit, fit_dimensions, fit_with, resize, resize_with, thumbnail,
    thumbnail_with, FitOptions,
};
pub use transform::{anchor_point, Anchor};
pub use weights::{WeightEntry, WeightTable};
