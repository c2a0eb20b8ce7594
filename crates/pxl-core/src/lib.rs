//! # pxl-core
//!
//! Core types for the pxl image transformation engine.
//!
//! This crate provides the value types every other pxl crate exchanges:
//!
//! - [`PixelBuffer`] - 8-bit RGBA raster, non-premultiplied alpha, row-major with stride
//! - [`IntoRgba8`] - Conversion of foreign pixel models into the buffer layout
//! - [`Rect`] - Region type used by crop and fill
//! - [`Error`] / [`Result`] - Buffer construction errors
//!
//! ## Crate Structure
//!
//! ```text
//! pxl-core (this crate)
//!    ^
//!    |
//!    +-- pxl-ops (resampling, convolution, scheduling, adjustments)
//!    +-- pxl-tests, pxl-bench
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use pxl_core::PixelBuffer;
//!
//! let img = PixelBuffer::filled(4, 4, [128, 128, 128, 255]);
//! assert_eq!(img.pixel(3, 3), [128, 128, 128, 255]);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod image;
pub mod pixel;
pub mod rect;

pub use error::{Error, Result};
pub use image::{PixelBuffer, CHANNELS};
pub use pixel::{IntoRgba8, Rgba8};
pub use rect::Rect;

/// Prelude module for convenient imports.
///
/// ```
/// use pxl_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::image::{PixelBuffer, CHANNELS};
    pub use crate::pixel::{IntoRgba8, Rgba8};
    pub use crate::rect::Rect;
}
