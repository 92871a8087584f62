//! # Path Resampling
//!
//! Raw recordings are sparse (a point every two blocks at best) and contain
//! teleports. Before coloring, the path is:
//!
//! 1. Split into runs wherever consecutive points jump `>= break_distance`
//! 2. Resampled per run along a cubic spline at `1 / sample_rate` block steps
//!
//! Runs are independent: no spline ever connects two sides of a teleport.

use lootrun_shared::Point3;

use crate::spline::{AxisSpline, Knot};

/// Consecutive points at least this far apart are treated as a teleport.
pub const DEFAULT_BREAK_DISTANCE: f64 = 32.0;

/// Resampled points per block of arc length.
pub const DEFAULT_SAMPLE_RATE: u32 = 10;

/// Splits a path into runs at every jump of `break_distance` or more.
///
/// An empty path has no runs.
#[must_use]
pub fn split_into_runs(path: &[Point3], break_distance: f64) -> Vec<Vec<Point3>> {
    let mut runs = Vec::new();
    let mut current: Vec<Point3> = Vec::new();

    for &point in path {
        if let Some(&last) = current.last() {
            if last.distance(point) >= break_distance {
                runs.push(std::mem::take(&mut current));
            }
        }
        current.push(point);
    }

    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// Resamples a run into evenly arc-length-spaced points.
///
/// Samples are taken at `k / sample_rate` for every `k` whose arc length
/// is strictly below the run length. A run of zero or one points is
/// returned as-is.
#[must_use]
pub fn resample(run: &[Point3], sample_rate: u32) -> Vec<Point3> {
    let mut control: Vec<Point3> = run.to_vec();
    control.dedup();

    if control.len() <= 1 {
        return control;
    }

    let mut x = AxisSpline::with_capacity(control.len());
    let mut y = AxisSpline::with_capacity(control.len());
    let mut z = AxisSpline::with_capacity(control.len());

    let mut distance = 0.0;
    for (i, &point) in control.iter().enumerate() {
        if i > 0 {
            distance += point.distance(control[i - 1]);
        }
        let slope = control
            .get(i + 1)
            .map_or(Point3::ZERO, |&next| (next - point).normalize_or_zero());

        x.push(Knot::new(distance, point.x, slope.x));
        y.push(Knot::new(distance, point.y, slope.y));
        z.push(Knot::new(distance, point.z, slope.z));
    }

    let rate = f64::from(sample_rate.max(1));
    let mut samples = Vec::new();
    let mut step: u32 = 0;
    loop {
        let at = f64::from(step) / rate;
        if at >= distance {
            break;
        }
        samples.push(Point3::new(x.sample(at), y.sample(at), z.sample(at)));
        step += 1;
    }
    samples
}

/// Splits, resamples and concatenates a whole path, keeping run order.
#[must_use]
pub fn resample_path(path: &[Point3], break_distance: f64, sample_rate: u32) -> Vec<Point3> {
    split_into_runs(path, break_distance)
        .iter()
        .flat_map(|run| resample(run, sample_rate))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_on_teleport() {
        let path = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 2.0),
            Point3::new(0.0, 0.0, 40.0),
            Point3::new(0.0, 0.0, 42.0),
        ];
        let runs = split_into_runs(&path, DEFAULT_BREAK_DISTANCE);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0], vec![path[0], path[1]]);
        assert_eq!(runs[1], vec![path[2], path[3]]);
    }

    #[test]
    fn test_split_boundary_is_inclusive() {
        let path = [Point3::ZERO, Point3::new(32.0, 0.0, 0.0)];
        assert_eq!(split_into_runs(&path, 32.0).len(), 2);

        let path = [Point3::ZERO, Point3::new(31.99, 0.0, 0.0)];
        assert_eq!(split_into_runs(&path, 32.0).len(), 1);
    }

    #[test]
    fn test_split_empty() {
        assert!(split_into_runs(&[], DEFAULT_BREAK_DISTANCE).is_empty());
    }

    #[test]
    fn test_resample_degenerate_runs() {
        assert!(resample(&[], DEFAULT_SAMPLE_RATE).is_empty());

        let single = [Point3::new(1.0, 2.0, 3.0)];
        assert_eq!(resample(&single, DEFAULT_SAMPLE_RATE), single.to_vec());

        // Duplicates collapse to a single control point
        let repeated = [single[0], single[0], single[0]];
        assert_eq!(resample(&repeated, DEFAULT_SAMPLE_RATE), single.to_vec());
    }

    #[test]
    fn test_resample_straight_line_spacing() {
        let run = [Point3::ZERO, Point3::new(0.0, 0.0, 2.0), Point3::new(0.0, 0.0, 4.0)];
        let samples = resample(&run, DEFAULT_SAMPLE_RATE);

        // 4 blocks at 10 samples per block, end excluded
        assert_eq!(samples.len(), 40);
        assert_eq!(samples[0], Point3::ZERO);
        // Zero slope at the final knot eases the curve in, but never backwards
        for pair in samples.windows(2) {
            let step = pair[1].z - pair[0].z;
            assert!(step > 0.0 && step < 0.15, "bad step {step}");
        }
        assert!(samples.iter().all(|p| p.z < 4.0));
        assert!(samples.iter().all(|p| p.x.abs() < 1.0e-9 && p.y.abs() < 1.0e-9));
    }

    #[test]
    fn test_resample_path_keeps_runs_apart() {
        let path = [Point3::ZERO, Point3::new(0.0, 0.0, 40.0)];
        let samples = resample_path(&path, DEFAULT_BREAK_DISTANCE, DEFAULT_SAMPLE_RATE);
        assert_eq!(samples, path.to_vec());
    }
}
