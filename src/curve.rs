//! Smooth chart curve generation. Maps an ordered hour series onto a fixed
//! plot box and emits SVG path strings: a stroke through every sample and a
//! companion fill closed down to the baseline band for area shading.

/// Extra band below the plot box holding day labels; the fill path closes to
/// its bottom edge so shading reaches the visual baseline.
pub const BASELINE_PAD: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Point {
    x: f64,
    y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurvePaths {
    pub stroke: String,
    pub fill: String,
}

/// Builds the stroke and fill paths for an hour series.
///
/// `x = i/(n-1)·width`; `y = height − hours/max(maxHours, 1)·height`, so zero
/// hours sits at the baseline and the peak at the top. Callers guarantee
/// `hours.len() >= 2`; shorter input is a caller bug, not a defended case.
pub fn curve_paths(hours: &[f64], width: f64, height: f64) -> CurvePaths {
    let max_hours = hours.iter().cloned().fold(1.0_f64, f64::max);
    let last = (hours.len() - 1) as f64;
    let points: Vec<Point> = hours
        .iter()
        .enumerate()
        .map(|(i, &h)| Point {
            x: i as f64 / last * width,
            y: height - (h / max_hours) * height,
        })
        .collect();

    let stroke = format!(
        "M {},{} {}",
        points[0].x,
        points[0].y,
        catmull_rom_to_bezier(&points)
    );
    let fill = format!(
        "{} L {},{} L 0,{} Z",
        stroke,
        width,
        height + BASELINE_PAD,
        height + BASELINE_PAD
    );

    CurvePaths { stroke, fill }
}

/// Catmull-Rom-derived cubic segments through consecutive points. Control
/// points are `p1 + (p2 − p0)/6` and `p2 − (p3 − p1)/6`, with the neighbor
/// points clamped to the first/last sample at the boundaries.
fn catmull_rom_to_bezier(points: &[Point]) -> String {
    let mut segments = Vec::with_capacity(points.len() - 1);
    for i in 0..points.len() - 1 {
        let p0 = if i == 0 { points[0] } else { points[i - 1] };
        let p1 = points[i];
        let p2 = points[i + 1];
        let p3 = if i + 2 < points.len() { points[i + 2] } else { p2 };

        let cp1x = p1.x + (p2.x - p0.x) / 6.0;
        let cp1y = p1.y + (p2.y - p0.y) / 6.0;
        let cp2x = p2.x - (p3.x - p1.x) / 6.0;
        let cp2y = p2.y - (p3.y - p1.y) / 6.0;

        segments.push(format!(
            "C {},{} {},{} {},{}",
            cp1x, cp1y, cp2x, cp2y, p2.x, p2.y
        ));
    }
    segments.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapped_points(hours: &[f64], width: f64, height: f64) -> Vec<(f64, f64)> {
        let max = hours.iter().cloned().fold(1.0_f64, f64::max);
        let last = (hours.len() - 1) as f64;
        hours
            .iter()
            .enumerate()
            .map(|(i, &h)| (i as f64 / last * width, height - h / max * height))
            .collect()
    }

    #[test]
    fn week_series_spans_plot_and_peaks_at_top() {
        let hours = [0.0, 10.0, 5.0, 5.0, 0.0, 2.0, 8.0];
        let paths = curve_paths(&hours, 340.0, 100.0);

        assert!(paths.stroke.starts_with("M 0,100 "));
        // Final cubic segment lands on the last sample at x = width.
        assert!(paths.stroke.ends_with("340,20"));

        let points = mapped_points(&hours, 340.0, 100.0);
        let min_y = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
        assert_eq!(min_y, 0.0);
        assert!((points[1].0 - 340.0 / 6.0).abs() < 1e-9);
        assert_eq!(points[1].1, 0.0);
    }

    #[test]
    fn fill_closes_to_baseline_band() {
        let paths = curve_paths(&[1.0, 2.0], 340.0, 100.0);
        assert!(paths.fill.starts_with(&paths.stroke));
        assert!(paths.fill.ends_with("L 340,120 L 0,120 Z"));
    }

    #[test]
    fn flat_zero_series_sits_on_baseline() {
        // max(maxHours, 1) guards the all-zero week against division by zero.
        let paths = curve_paths(&[0.0, 0.0, 0.0], 340.0, 100.0);
        assert!(paths.stroke.starts_with("M 0,100"));
        assert!(paths.stroke.ends_with("340,100"));
    }

    #[test]
    fn two_point_series_is_a_single_segment() {
        let paths = curve_paths(&[0.0, 4.0], 100.0, 100.0);
        assert_eq!(paths.stroke.matches('C').count(), 1);
        assert!(paths.stroke.ends_with("100,0"));
    }
}
