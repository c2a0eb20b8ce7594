//! Integration tests for pxl crates.
//!
//! Shared fixtures live here; the end-to-end checks are in the
//! `properties` and `determinism` test modules.

use pxl_core::PixelBuffer;
use sha2::{Digest, Sha256};
use std::sync::Once;
use tracing_subscriber::EnvFilter;

/// Installs a `RUST_LOG`-driven subscriber once per test binary.
pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Deterministic high-frequency test image with varying alpha.
pub fn noise(width: usize, height: usize) -> PixelBuffer {
    PixelBuffer::from_fn(width, height, |x, y| {
        let h = (x as u32).wrapping_mul(2_654_435_761) ^ (y as u32).wrapping_mul(40_503);
        let h = h ^ (h >> 13);
        [h as u8, (h >> 8) as u8, (h >> 16) as u8, 128 | (h >> 24) as u8]
    })
}

/// Smooth, band-limited test image; safe for resampling round trips.
pub fn smooth(width: usize, height: usize) -> PixelBuffer {
    PixelBuffer::from_fn(width, height, |x, y| {
        let (fx, fy) = (x as f32, y as f32);
        let r = 128.0 + 50.0 * (fx * 0.15).sin() * (fy * 0.12).cos();
        let g = 40.0 + 150.0 * fx / width as f32;
        let b = 200.0 - 120.0 * fy / height as f32;
        [r / 255.0, g / 255.0, b / 255.0, 1.0]
    })
}

/// Hex SHA-256 of the dimensions plus every visible row.
///
/// Row padding is excluded, so strided and compact copies of the same
/// image hash alike.
pub fn digest(buf: &PixelBuffer) -> String {
    let mut hasher = Sha256::new();
    hasher.update((buf.width() as u64).to_le_bytes());
    hasher.update((buf.height() as u64).to_le_bytes());
    for row in buf.rows() {
        hasher.update(row);
    }
    format!("{:x}", hasher.finalize())
}

/// Largest per-channel absolute difference between two equally sized buffers.
///
/// # Panics
///
/// Panics if the dimensions differ.
pub fn max_channel_diff(a: &PixelBuffer, b: &PixelBuffer) -> u8 {
    assert_eq!(a.dimensions(), b.dimensions(), "dimension mismatch");
    a.rows()
        .zip(b.rows())
        .flat_map(|(ra, rb)| ra.iter().zip(rb).map(|(&x, &y)| x.abs_diff(y)))
        .max()
        .unwrap_or(0)
}

/// Mean per-channel absolute difference.
pub fn mean_channel_diff(a: &PixelBuffer, b: &PixelBuffer) -> f64 {
    assert_eq!(a.dimensions(), b.dimensions(), "dimension mismatch");
    let (sum, n) = a
        .rows()
        .zip(b.rows())
        .flat_map(|(ra, rb)| ra.iter().zip(rb).map(|(&x, &y)| x.abs_diff(y) as u64))
        .fold((0u64, 0u64), |(s, n), d| (s + d, n + 1));
    if n == 0 { 0.0 } else { sum as f64 / n as f64 }
}

#[cfg(test)]
mod determinism;
#[cfg(test)]
mod properties;
