//! # Path Coloring
//!
//! Two policies:
//!
//! - **Static**: every sample gets the mode's fixed color
//! - **Rainbow**: walks a 7-color palette, one palette step per cycle of
//!   `10 * cycle_distance` samples, blending towards the next color inside
//!   each cycle
//!
//! ```text
//! sample:   0 ........ 9 | 10 ....... 19 | ... | 70 ...
//! cycle:    0            | 1             |     | 7 (wraps)
//! blend:    RED -> ORANGE| ORANGE -> YEL |     | RED -> ORANGE
//! ```

use lootrun_shared::Argb;

/// Rainbow palette, in cycle order.
pub const RAINBOW_PALETTE: [Argb; 7] = [
    Argb(0xFFFF_0000), // red
    Argb(0xFFFF_7F00), // orange
    Argb(0xFFFF_FF00), // yellow
    Argb(0xFF00_FF00), // green
    Argb(0xFF00_00FF), // blue
    Argb(0xFF4B_0082), // indigo
    Argb(0xFF94_00D3), // violet
];

/// Samples per cycle for each unit of `cycle_distance`.
const SAMPLES_PER_CYCLE_UNIT: usize = 10;

/// How resampled points are colored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorPolicy {
    /// One fixed color per compile mode.
    #[default]
    Static,
    /// Cycle through [`RAINBOW_PALETTE`].
    Rainbow {
        /// Tuning knob: cycle length is `10 * cycle_distance` samples.
        cycle_distance: u32,
    },
}

/// Number of samples in one rainbow cycle. Never zero.
#[inline]
#[must_use]
pub fn cycle_length(cycle_distance: u32) -> usize {
    SAMPLES_PER_CYCLE_UNIT * (cycle_distance.max(1) as usize)
}

/// Rainbow color of the sample at `index`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn rainbow_color(index: usize, cycle_distance: u32) -> Argb {
    let length = cycle_length(cycle_distance);
    let cycle = index / length;
    let from = RAINBOW_PALETTE[cycle % RAINBOW_PALETTE.len()];
    let to = RAINBOW_PALETTE[(cycle + 1) % RAINBOW_PALETTE.len()];
    let fraction = (index % length) as f64 / length as f64;
    from.blend_rgb(to, fraction)
}
