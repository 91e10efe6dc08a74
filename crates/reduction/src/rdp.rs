use model::point::Point;

/// Distance of `point` to the line through `start` and `end`, or to `start`
/// if both ends coincide.
pub fn perpendicular_distance(point: &Point, start: &Point, end: &Point) -> f64 {
    if start == end {
        return point.distance(start);
    }
    end.cross(start, point).abs() / end.distance(start)
}

/// Index and distance of the interior point farthest from the chord between
/// the first and the last point. The first index wins on ties.
fn farthest_point(points: &[Point]) -> Option<(usize, f64)> {
    let (start, end) = (points.first()?, points.last()?);
    let mut farthest: Option<(usize, f64)> = None;
    for (index, point) in points.iter().enumerate().take(points.len() - 1).skip(1) {
        let distance = perpendicular_distance(point, start, end);
        match farthest {
            Some((_, max)) if distance <= max => {}
            _ => farthest = Some((index, distance)),
        }
    }
    farthest
}

/// Reduces `points` to the subsequence chosen by Ramer–Douglas–Peucker.
///
/// Sequences of at most two points are returned unchanged. Otherwise the
/// interior point farthest from the chord between the first and the last
/// point is kept if its distance exceeds `tolerance`, and both halves are
/// reduced the same way; if it does not, all interior points are dropped.
///
/// The halves are processed from an explicit stack instead of recursively,
/// so long degenerate routes cannot overflow the call stack. The result is
/// identical to the recursive formulation.
pub fn reduce(points: &[Point], tolerance: f64) -> Vec<Point> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let last = points.len() - 1;
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[last] = true;

    let mut segments = vec![(0, last)];
    while let Some((first, last)) = segments.pop() {
        let Some((offset, distance)) = farthest_point(&points[first..=last]) else {
            continue;
        };
        if distance > tolerance {
            let split = first + offset;
            keep[split] = true;
            segments.push((split, last));
            segments.push((first, split));
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(point, keep)| keep.then_some(*point))
        .collect()
}
