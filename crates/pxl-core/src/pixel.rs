//! Pixel conversion into the fixed 8-bit RGBA layout.
//!
//! A [`PixelBuffer`](crate::PixelBuffer) always stores four 8-bit channels
//! (R, G, B, A) with straight (non-premultiplied) alpha. Sources in any
//! other color model are converted one sample at a time through
//! [`IntoRgba8`], each channel rounded independently into `0..=255`.
//!
//! # Supported models
//!
//! | Source type  | Meaning                    | Alpha      |
//! |--------------|----------------------------|------------|
//! | `u8`         | 8-bit gray                 | opaque     |
//! | `u16`        | 16-bit gray                | opaque     |
//! | `[u8; 2]`    | 8-bit gray + alpha         | from input |
//! | `[u8; 3]`    | 8-bit RGB                  | opaque     |
//! | `[u8; 4]`    | 8-bit RGBA                 | from input |
//! | `[u16; 3]`   | 16-bit RGB                 | opaque     |
//! | `[u16; 4]`   | 16-bit RGBA                | from input |
//! | `[f32; 3]`   | normalized float RGB       | opaque     |
//! | `[f32; 4]`   | normalized float RGBA      | from input |
//!
//! ```rust
//! use pxl_core::IntoRgba8;
//!
//! assert_eq!(0x8080u16.into_rgba8(), [128, 128, 128, 255]);
//! assert_eq!([0.5f32, 1.0, 2.0, 0.0].into_rgba8(), [128, 255, 255, 0]);
//! ```

/// One RGBA pixel, 8 bits per channel, straight alpha.
pub type Rgba8 = [u8; 4];

/// Conversion of a single source sample into [`Rgba8`].
pub trait IntoRgba8 {
    /// Converts this sample, rounding each channel to the nearest 8-bit value.
    fn into_rgba8(self) -> Rgba8;
}

/// Rounds a 16-bit channel to 8 bits.
#[inline]
pub fn u16_to_u8(v: u16) -> u8 {
    ((v as u32 * 255 + 32767) / 65535) as u8
}

/// Rounds a normalized float channel to 8 bits.
///
/// Values are clamped to `[0, 1]`; NaN maps to 0.
#[inline]
pub fn f32_to_u8(v: f32) -> u8 {
    if v.is_nan() {
        return 0;
    }
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl IntoRgba8 for u8 {
    #[inline]
    fn into_rgba8(self) -> Rgba8 {
        [self, self, self, 255]
    }
}

impl IntoRgba8 for u16 {
    #[inline]
    fn into_rgba8(self) -> Rgba8 {
        let g = u16_to_u8(self);
        [g, g, g, 255]
    }
}

impl IntoRgba8 for [u8; 2] {
    #[inline]
    fn into_rgba8(self) -> Rgba8 {
        [self[0], self[0], self[0], self[1]]
    }
}

impl IntoRgba8 for [u8; 3] {
    #[inline]
    fn into_rgba8(self) -> Rgba8 {
        [self[0], self[1], self[2], 255]
    }
}

impl IntoRgba8 for [u8; 4] {
    #[inline]
    fn into_rgba8(self) -> Rgba8 {
        self
    }
}

impl IntoRgba8 for [u16; 3] {
    #[inline]
    fn into_rgba8(self) -> Rgba8 {
        [u16_to_u8(self[0]), u16_to_u8(self[1]), u16_to_u8(self[2]), 255]
    }
}

impl IntoRgba8 for [u16; 4] {
    #[inline]
    fn into_rgba8(self) -> Rgba8 {
        self.map(u16_to_u8)
    }
}

impl IntoRgba8 for [f32; 3] {
    #[inline]
    fn into_rgba8(self) -> Rgba8 {
        [f32_to_u8(self[0]), f32_to_u8(self[1]), f32_to_u8(self[2]), 255]
    }
}

impl IntoRgba8 for [f32; 4] {
    #[inline]
    fn into_rgba8(self) -> Rgba8 {
        self.map(f32_to_u8)
    }
}

impl<P: IntoRgba8 + Copy> IntoRgba8 for &P {
    #[inline]
    fn into_rgba8(self) -> Rgba8 {
        (*self).into_rgba8()
    }
}
