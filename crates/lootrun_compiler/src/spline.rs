//! # Per-Axis Cubic Spline
//!
//! A cubic Hermite spline over `(distance, value, slope)` knots. One spline
//! is fitted per axis, parameterized by arc length along the recorded run.
//!
//! Between knots `a` and `b` with `t = (s - a.at) / (b.at - a.at)`:
//!
//! ```text
//! f(s) = lerp(t, a.value, b.value) + t(1 - t) * lerp(t, o, p)
//!   o  =  a.slope * span - (b.value - a.value)
//!   p  = -b.slope * span + (b.value - a.value)
//! ```
//!
//! Outside the knot range the curve continues linearly along the end slope.

/// A single control point of an axis spline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Knot {
    /// Arc length at which this knot sits.
    pub at: f64,
    /// Axis value at the knot.
    pub value: f64,
    /// Derivative of the axis value with respect to arc length.
    pub slope: f64,
}

impl Knot {
    /// Creates a new knot.
    #[inline]
    #[must_use]
    pub const fn new(at: f64, value: f64, slope: f64) -> Self {
        Self { at, value, slope }
    }
}

/// Spline for a single axis.
///
/// Knots must be strictly increasing in `at`.
#[derive(Clone, Debug, Default)]
pub struct AxisSpline {
    knots: Vec<Knot>,
}

impl AxisSpline {
    /// Creates an empty spline with room for `capacity` knots.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            knots: Vec::with_capacity(capacity),
        }
    }

    /// Appends a knot. It must lie beyond the previous one.
    pub fn push(&mut self, knot: Knot) {
        debug_assert!(
            self.knots.last().map_or(true, |last| knot.at > last.at),
            "spline knots must be strictly increasing"
        );
        self.knots.push(knot);
    }

    /// Number of knots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.knots.len()
    }

    /// Returns true if the spline has no knots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.knots.is_empty()
    }

    /// Evaluates the spline at arc length `at`.
    #[must_use]
    pub fn sample(&self, at: f64) -> f64 {
        sample(&self.knots, at)
    }
}

/// Evaluates a Hermite spline over `knots` at arc length `at`.
///
/// An empty knot list evaluates to zero.
#[must_use]
pub fn sample(knots: &[Knot], at: f64) -> f64 {
    let (Some(first), Some(last)) = (knots.first(), knots.last()) else {
        return 0.0;
    };

    // Number of knots at or before `at`
    let upper = knots.partition_point(|knot| knot.at <= at);
    if upper == 0 {
        return first.value + first.slope * (at - first.at);
    }
    if upper == knots.len() {
        return last.value + last.slope * (at - last.at);
    }

    let a = knots[upper - 1];
    let b = knots[upper];
    let span = b.at - a.at;
    let t = (at - a.at) / span;
    let rise = b.value - a.value;
    let o = a.slope * span - rise;
    let p = -b.slope * span + rise;

    lerp(t, a.value, b.value) + t * (1.0 - t) * lerp(t, o, p)
}

#[inline]
fn lerp(t: f64, from: f64, to: f64) -> f64 {
    from + t * (to - from)
}
