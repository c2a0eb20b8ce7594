//! Error types for pixel buffer construction.
//!
//! Everything that can go wrong while building or addressing a
//! [`PixelBuffer`](crate::PixelBuffer) is reported through [`Error`].
//! Operations in `pxl-ops` wrap these into their own error type.
//!
//! ```rust
//! use pxl_core::{Error, PixelBuffer};
//!
//! let err = PixelBuffer::from_raw(2, 2, vec![0; 3]).unwrap_err();
//! assert!(matches!(err, Error::BufferTooSmall { .. }));
//! ```

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by pixel buffer construction and access.
#[derive(Debug, Error)]
pub enum Error {
    /// Width or height is invalid, or the byte size overflows `usize`.
    #[error("invalid dimensions: {width}x{height} ({reason})")]
    InvalidDimensions {
        /// Requested width
        width: usize,
        /// Requested height
        height: usize,
        /// Reason why dimensions are invalid
        reason: String,
    },

    /// Stride is too small for the given width.
    ///
    /// A row must hold at least `width * 4` bytes.
    #[error("stride {stride} is less than minimum {min_stride} for width {width}")]
    InvalidStride {
        /// Provided stride
        stride: usize,
        /// Minimum required stride
        min_stride: usize,
        /// Buffer width
        width: usize,
    },

    /// Backing storage holds fewer bytes than `stride * height`.
    #[error("buffer too small: expected at least {expected} bytes, got {got}")]
    BufferTooSmall {
        /// Bytes required
        expected: usize,
        /// Bytes supplied
        got: usize,
    },

    /// A region does not fit inside the buffer.
    #[error("region ({rx}, {ry}, {rw}x{rh}) exceeds buffer bounds {width}x{height}")]
    InvalidRegion {
        /// Region X origin
        rx: usize,
        /// Region Y origin
        ry: usize,
        /// Region width
        rw: usize,
        /// Region height
        rh: usize,
        /// Buffer width
        width: usize,
        /// Buffer height
        height: usize,
    },

    /// Pixel coordinates are outside the buffer.
    #[error("pixel ({x}, {y}) out of bounds for buffer {width}x{height}")]
    OutOfBounds {
        /// X coordinate
        x: usize,
        /// Y coordinate
        y: usize,
        /// Buffer width
        width: usize,
        /// Buffer height
        height: usize,
    },
}

impl Error {
    /// Creates an [`Error::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(width: usize, height: usize, reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            width,
            height,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::OutOfBounds`] error.
    #[inline]
    pub fn out_of_bounds(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self::OutOfBounds {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates an [`Error::InvalidRegion`] error.
    #[inline]
    pub fn invalid_region(rx: usize, ry: usize, rw: usize, rh: usize, width: usize, height: usize) -> Self {
        Self::InvalidRegion {
            rx,
            ry,
            rw,
            rh,
            width,
            height,
        }
    }

    /// Returns `true` if this is a bounds-related error.
    #[inline]
    pub fn is_bounds_error(&self) -> bool {
        matches!(self, Self::OutOfBounds { .. } | Self::InvalidRegion { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds() {
        let err = Error::out_of_bounds(100, 50, 80, 60);
        let msg = err.to_string();
        assert!(msg.contains("100"));
        assert!(msg.contains("80x60"));
        assert!(err.is_bounds_error());
    }

    #[test]
    fn test_invalid_dimensions_message() {
        let err = Error::invalid_dimensions(0, 10, "width must be > 0");
        assert_eq!(err.to_string(), "invalid dimensions: 0x10 (width must be > 0)");
        assert!(!err.is_bounds_error());
    }

    #[test]
    fn test_region_error() {
        let err = Error::invalid_region(3, 3, 2, 2, 4, 4);
        assert!(err.to_string().contains("4x4"));
        assert!(err.is_bounds_error());
    }
}
