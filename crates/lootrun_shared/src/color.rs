//! Packed 32-bit ARGB colors.

use serde::{Deserialize, Serialize};

/// Color packed as `0xAARRGGBB`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Argb(pub u32);

impl Argb {
    /// Fully opaque white.
    pub const WHITE: Self = Self(0xFFFF_FFFF);

    /// Creates an opaque color from RGB channels.
    #[inline]
    #[must_use]
    pub const fn opaque(red: u8, green: u8, blue: u8) -> Self {
        Self::from_channels(0xFF, red, green, blue)
    }

    /// Creates a color from all four channels.
    #[inline]
    #[must_use]
    pub const fn from_channels(alpha: u8, red: u8, green: u8, blue: u8) -> Self {
        Self(((alpha as u32) << 24) | ((red as u32) << 16) | ((green as u32) << 8) | blue as u32)
    }

    /// Alpha channel.
    #[inline]
    #[must_use]
    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Red channel.
    #[inline]
    #[must_use]
    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    /// Green channel.
    #[inline]
    #[must_use]
    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Blue channel.
    #[inline]
    #[must_use]
    pub const fn blue(self) -> u8 {
        self.0 as u8
    }

    /// Linear blend of the RGB channels from `self` towards `target`.
    ///
    /// Each channel is clamped to `0..=255` after interpolation and the
    /// result is always fully opaque.
    #[must_use]
    pub fn blend_rgb(self, target: Self, fraction: f64) -> Self {
        let channel = |from: u8, to: u8| -> u8 {
            let from = f64::from(from);
            let value = from + (f64::from(to) - from) * fraction;
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let clamped = value.round().clamp(0.0, 255.0) as u8;
            clamped
        };
        Self::opaque(
            channel(self.red(), target.red()),
            channel(self.green(), target.green()),
            channel(self.blue(), target.blue()),
        )
    }
}
