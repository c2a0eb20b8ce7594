//! The 8-bit RGBA pixel buffer.
//!
//! [`PixelBuffer`] is the only value exchanged with the engine:
//! - 4 channels per pixel, order R, G, B, A
//! - 8 bits per channel
//! - alpha stored straight (not premultiplied)
//! - rows stored top-to-bottom with `stride >= width * 4` bytes per row
//!
//! # Memory Layout
//!
//! ```text
//! Memory: [R G B A R G B A ... pad]  <- Row 0 (stride bytes)
//!         [R G B A R G B A ... pad]  <- Row 1
//!         ...
//! ```
//!
//! Storage sits behind an [`Arc`], so clones are cheap and buffers
//! returned by operations can be shared freely. [`PixelBuffer::make_mut`]
//! detaches a private copy before mutation.
//!
//! ```rust
//! use pxl_core::PixelBuffer;
//!
//! let mut img = PixelBuffer::new(16, 8);
//! img.set_pixel(3, 2, [255, 0, 0, 255]).unwrap();
//! assert_eq!(img.pixel(3, 2), [255, 0, 0, 255]);
//! assert_eq!(img.stride(), 16 * 4);
//! ```

use crate::{Error, IntoRgba8, Rect, Result, Rgba8};
use std::sync::Arc;

/// Number of channels per pixel.
pub const CHANNELS: usize = 4;

/// Owned RGBA8 raster, row-major, non-premultiplied alpha.
#[derive(Clone)]
pub struct PixelBuffer {
    data: Arc<Vec<u8>>,
    width: usize,
    height: usize,
    stride: usize,
}

/// Returns `width * 4`, checking for overflow.
fn row_bytes(width: usize, height: usize) -> Result<usize> {
    width
        .checked_mul(CHANNELS)
        .ok_or_else(|| Error::invalid_dimensions(width, height, "row size overflows usize"))
}

impl PixelBuffer {
    /// Creates a buffer filled with zeros (transparent black).
    ///
    /// # Panics
    ///
    /// Panics if `width * height * 4` overflows `usize`.
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, [0; CHANNELS])
    }

    /// Creates a buffer with every pixel set to `pixel`.
    ///
    /// ```rust
    /// use pxl_core::PixelBuffer;
    ///
    /// let gray = PixelBuffer::filled(4, 4, [128, 128, 128, 255]);
    /// assert!(gray.pixels().all(|(_, _, p)| p == [128, 128, 128, 255]));
    /// ```
    pub fn filled(width: usize, height: usize, pixel: Rgba8) -> Self {
        let count = width * height;
        let mut data = Vec::with_capacity(count * CHANNELS);
        for _ in 0..count {
            data.extend_from_slice(&pixel);
        }
        Self {
            data: Arc::new(data),
            width,
            height,
            stride: width * CHANNELS,
        }
    }

    /// Wraps tightly packed RGBA8 bytes (`stride == width * 4`).
    ///
    /// # Errors
    ///
    /// [`Error::BufferTooSmall`] if `data` holds fewer than
    /// `width * height * 4` bytes.
    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        let stride = row_bytes(width, height)?;
        Self::from_raw_with_stride(width, height, stride, data)
    }

    /// Wraps RGBA8 bytes laid out with an explicit row stride.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidStride`] if `stride < width * 4`
    /// - [`Error::BufferTooSmall`] if `data.len() < stride * height`
    ///
    /// ```rust
    /// use pxl_core::PixelBuffer;
    ///
    /// // 2x2 image with 4 bytes of row padding
    /// let data = vec![0u8; 12 * 2];
    /// let img = PixelBuffer::from_raw_with_stride(2, 2, 12, data).unwrap();
    /// assert_eq!(img.row(1).len(), 8);
    /// ```
    pub fn from_raw_with_stride(width: usize, height: usize, stride: usize, data: Vec<u8>) -> Result<Self> {
        let min_stride = row_bytes(width, height)?;
        if stride < min_stride {
            return Err(Error::InvalidStride {
                stride,
                min_stride,
                width,
            });
        }
        let expected = stride
            .checked_mul(height)
            .ok_or_else(|| Error::invalid_dimensions(width, height, "buffer size overflows usize"))?;
        if data.len() < expected {
            return Err(Error::BufferTooSmall {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            data: Arc::new(data),
            width,
            height,
            stride,
        })
    }

    /// Builds a buffer by evaluating `f(x, y)` for every pixel.
    ///
    /// The closure may return any [`IntoRgba8`] sample, so this doubles as
    /// the conversion path from arbitrary color models.
    ///
    /// ```rust
    /// use pxl_core::PixelBuffer;
    ///
    /// let ramp = PixelBuffer::from_fn(256, 1, |x, _| x as u8);
    /// assert_eq!(ramp.pixel(200, 0), [200, 200, 200, 255]);
    /// ```
    pub fn from_fn<P, F>(width: usize, height: usize, mut f: F) -> Self
    where
        P: IntoRgba8,
        F: FnMut(usize, usize) -> P,
    {
        let mut data = Vec::with_capacity(width * height * CHANNELS);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y).into_rgba8());
            }
        }
        Self {
            data: Arc::new(data),
            width,
            height,
            stride: width * CHANNELS,
        }
    }

    /// Converts a row-major slice of samples in any supported color model.
    ///
    /// # Errors
    ///
    /// [`Error::BufferTooSmall`] if `pixels.len() < width * height`.
    ///
    /// ```rust
    /// use pxl_core::PixelBuffer;
    ///
    /// let rgb16: Vec<[u16; 3]> = vec![[65535, 0, 32768]; 4];
    /// let img = PixelBuffer::from_pixels(2, 2, &rgb16).unwrap();
    /// assert_eq!(img.pixel(1, 1), [255, 0, 128, 255]);
    /// ```
    pub fn from_pixels<P>(width: usize, height: usize, pixels: &[P]) -> Result<Self>
    where
        P: IntoRgba8 + Copy,
    {
        let count = width
            .checked_mul(height)
            .ok_or_else(|| Error::invalid_dimensions(width, height, "pixel count overflows usize"))?;
        if pixels.len() < count {
            return Err(Error::BufferTooSmall {
                expected: count,
                got: pixels.len(),
            });
        }
        Ok(Self::from_fn(width, height, |x, y| pixels[y * width + x]))
    }

    /// Returns the width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the height in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Returns bytes per row, padding included.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the full buffer bounds as a [`Rect`].
    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    /// Returns `true` if width or height is zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns `true` if rows carry no padding.
    #[inline]
    pub fn is_compact(&self) -> bool {
        self.stride == self.width * CHANNELS
    }

    /// Returns the backing storage, padding included.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the backing storage mutably, detaching shared data first.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        Arc::make_mut(&mut self.data).as_mut_slice()
    }

    /// Ensures exclusive ownership of the pixel data (copy-on-write).
    pub fn make_mut(&mut self) {
        let _ = Arc::make_mut(&mut self.data);
    }

    #[inline]
    fn offset(&self, x: usize, y: usize) -> usize {
        y * self.stride + x * CHANNELS
    }

    /// Returns the `width * 4` bytes of row `y`, without padding.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row(&self, y: usize) -> &[u8] {
        assert!(y < self.height, "row {y} out of bounds for height {}", self.height);
        let start = y * self.stride;
        &self.data[start..start + self.width * CHANNELS]
    }

    /// Returns row `y` mutably, without padding.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        assert!(y < self.height, "row {y} out of bounds for height {}", self.height);
        let start = y * self.stride;
        let len = self.width * CHANNELS;
        &mut self.data_mut()[start..start + len]
    }

    /// Iterates rows top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        (0..self.height).map(move |y| self.row(y))
    }

    /// Returns the pixel at (x, y).
    ///
    /// # Panics
    ///
    /// Panics if coordinates are out of bounds.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Rgba8 {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        let i = self.offset(x, y);
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    /// Returns the pixel at (x, y), or `None` if out of bounds.
    #[inline]
    pub fn get_pixel(&self, x: usize, y: usize) -> Option<Rgba8> {
        (x < self.width && y < self.height).then(|| self.pixel(x, y))
    }

    /// Sets the pixel at (x, y).
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] if coordinates are outside the buffer.
    pub fn set_pixel(&mut self, x: usize, y: usize, pixel: Rgba8) -> Result<()> {
        if x >= self.width || y >= self.height {
            return Err(Error::out_of_bounds(x, y, self.width, self.height));
        }
        let i = self.offset(x, y);
        self.data_mut()[i..i + CHANNELS].copy_from_slice(&pixel);
        Ok(())
    }

    /// Iterates all pixels as `(x, y, [r, g, b, a])`, row by row.
    pub fn pixels(&self) -> impl Iterator<Item = (usize, usize, Rgba8)> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| (x, y, self.pixel(x, y))))
    }

    /// Returns a buffer with `stride == width * 4`.
    ///
    /// Cheap (shared) when the buffer is already compact.
    pub fn to_compact(&self) -> PixelBuffer {
        if self.is_compact() {
            return self.clone();
        }
        let mut data = Vec::with_capacity(self.width * self.height * CHANNELS);
        for row in self.rows() {
            data.extend_from_slice(row);
        }
        Self {
            data: Arc::new(data),
            width: self.width,
            height: self.height,
            stride: self.width * CHANNELS,
        }
    }

    /// Consumes the buffer and returns tightly packed RGBA8 bytes.
    pub fn into_raw(self) -> Vec<u8> {
        let compact = self.to_compact();
        let len = compact.width * compact.height * CHANNELS;
        let mut data = Arc::try_unwrap(compact.data).unwrap_or_else(|shared| (*shared).clone());
        data.truncate(len);
        data
    }
}

/// Buffers are equal when dimensions and visible pixels match; row padding is ignored.
impl PartialEq for PixelBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.dimensions() == other.dimensions() && self.rows().eq(other.rows())
    }
}

impl Eq for PixelBuffer {}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stride", &self.stride)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zeroed() {
        let img = PixelBuffer::new(3, 2);
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.data().len(), 24);
        assert!(img.data().iter().all(|&b| b == 0));
        assert!(img.is_compact());
    }

    #[test]
    fn test_from_raw_too_small() {
        let err = PixelBuffer::from_raw(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(err, Error::BufferTooSmall { expected: 16, got: 15 }));
    }

    #[test]
    fn test_stride_validation() {
        let err = PixelBuffer::from_raw_with_stride(4, 1, 15, vec![0; 16]).unwrap_err();
        assert!(matches!(err, Error::InvalidStride { min_stride: 16, .. }));
    }

    #[test]
    fn test_padded_rows() {
        // 2x2, stride 12: bytes 8..12 of each row are padding
        let mut data = vec![0u8; 24];
        data[0..4].copy_from_slice(&[1, 2, 3, 4]);
        data[8..12].copy_from_slice(&[99, 99, 99, 99]);
        data[12..16].copy_from_slice(&[5, 6, 7, 8]);
        let img = PixelBuffer::from_raw_with_stride(2, 2, 12, data).unwrap();

        assert_eq!(img.pixel(0, 0), [1, 2, 3, 4]);
        assert_eq!(img.pixel(0, 1), [5, 6, 7, 8]);
        assert_eq!(img.row(0).len(), 8);
        assert!(!img.is_compact());

        assert_eq!(img, img.to_compact());

        let raw = img.into_raw();
        assert_eq!(raw.len(), 16);
        assert_eq!(&raw[8..12], &[5, 6, 7, 8]);
    }

    #[test]
    fn test_clone_is_copy_on_write() {
        let a = PixelBuffer::filled(2, 2, [10, 20, 30, 40]);
        let mut b = a.clone();
        b.set_pixel(0, 0, [0, 0, 0, 0]).unwrap();
        assert_eq!(a.pixel(0, 0), [10, 20, 30, 40]);
        assert_eq!(b.pixel(0, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn test_data_mut_detaches_shared() {
        let a = PixelBuffer::filled(2, 1, [1, 2, 3, 4]);
        let mut b = a.clone();
        let data = b.data_mut();
        assert_eq!(data.len(), 8);
        data[0] = 99;
        assert_eq!(a.pixel(0, 0), [1, 2, 3, 4]);
        assert_eq!(b.pixel(0, 0), [99, 2, 3, 4]);
    }

    #[test]
    fn test_set_pixel_out_of_bounds() {
        let mut img = PixelBuffer::new(2, 2);
        let err = img.set_pixel(2, 0, [1, 1, 1, 1]).unwrap_err();
        assert!(err.is_bounds_error());
        assert_eq!(img.get_pixel(5, 5), None);
    }

    #[test]
    fn test_from_pixels_gray() {
        let img = PixelBuffer::from_pixels(2, 1, &[0u8, 200]).unwrap();
        assert_eq!(img.pixel(1, 0), [200, 200, 200, 255]);
        assert!(PixelBuffer::from_pixels(2, 2, &[0u8; 3]).is_err());
    }
}
