use model::{point::Point, route::RouteStats};
use utility::geo::path_length_km;

fn planar_length(points: &[Point]) -> f64 {
    points
        .windows(2)
        .map(|pair| pair[1].distance(&pair[0]))
        .sum()
}

fn great_circle_length(points: &[Point]) -> f64 {
    path_length_km(points.iter().map(|point| (point.latitude(), point.longitude())))
}

/// Describes the reduction of `original` to `reduced`.
pub fn compute_stats(original: &[Point], reduced: &[Point]) -> RouteStats {
    let ratio = if original.is_empty() {
        0.0
    } else {
        reduced.len() as f64 / original.len() as f64
    };

    RouteStats {
        original_points: original.len(),
        reduced_points: reduced.len(),
        removed: original.len().saturating_sub(reduced.len()),
        ratio,
        reduction_percent: (1.0 - ratio) * 100.0,
        original_length: planar_length(original),
        reduced_length: planar_length(reduced),
        original_length_km: great_circle_length(original),
        reduced_length_km: great_circle_length(reduced),
    }
}
