/// A point along a routed path, in user-unit coordinates. `z` carries
/// layer index (as a float so it can serve as a RDP coordinate
/// alongside `x`/`y`).
pub type PathPoint = (f64, f64, f64);

fn sub(a: PathPoint, b: PathPoint) -> PathPoint {
    (a.0 - b.0, a.1 - b.1, a.2 - b.2)
}

fn cross(a: PathPoint, b: PathPoint) -> PathPoint {
    (
        a.1 * b.2 - a.2 * b.1,
        a.2 * b.0 - a.0 * b.2,
        a.0 * b.1 - a.1 * b.0,
    )
}

fn norm(a: PathPoint) -> f64 {
    (a.0 * a.0 + a.1 * a.1 + a.2 * a.2).sqrt()
}

fn perpendicular_distance(p: PathPoint, a: PathPoint, b: PathPoint) -> f64 {
    let ab = sub(b, a);
    let ab_len = norm(ab);
    if ab_len < 1e-9 {
        return norm(sub(p, a));
    }
    norm(cross(sub(p, a), ab)) / ab_len
}

/// Ramer-Douglas-Peucker simplification over a 3D path. Endpoints are
/// always kept; an interior point survives only if its perpendicular
/// distance from the running line exceeds `epsilon` — `z` is just
/// another coordinate in that distance, so a via step that bends in
/// plane survives, but a straight run of via layers (no x/y change)
/// collapses to its two endpoints like any other collinear run. The
/// emitter's `via_stacks` refills the skipped intermediate layers from
/// the endpoint `z` delta, so no geometry is lost.
pub fn simplify(points: &[PathPoint], epsilon: f64) -> Vec<PathPoint> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let first = points[0];
    let last = *points.last().unwrap();

    let mut max_dist = 0.0;
    let mut max_idx = 0;
    for (i, &p) in points.iter().enumerate().take(points.len() - 1).skip(1) {
        let d = perpendicular_distance(p, first, last);
        if d > max_dist {
            max_dist = d;
            max_idx = i;
        }
    }

    if max_dist > epsilon {
        let mut left = simplify(&points[..=max_idx], epsilon);
        let right = simplify(&points[max_idx..], epsilon);
        left.pop();
        left.extend(right);
        left
    } else {
        vec![first, last]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collinear_run_collapses_to_endpoints() {
        let points: Vec<PathPoint> = (0..10).map(|i| (i as f64, 0.0, 0.0)).collect();
        let simplified = simplify(&points, 0.2);
        assert_eq!(simplified, vec![(0.0, 0.0, 0.0), (9.0, 0.0, 0.0)]);
    }

    #[test]
    fn bend_is_preserved() {
        let points = vec![(0.0, 0.0, 0.0), (5.0, 0.0, 0.0), (5.0, 5.0, 0.0), (5.0, 10.0, 0.0)];
        let simplified = simplify(&points, 0.2);
        assert_eq!(simplified, points);
    }

    #[test]
    fn straight_via_stack_collapses_to_endpoints() {
        let points = vec![(0.0, 0.0, 0.0), (0.0, 0.0, 1.0), (0.0, 0.0, 2.0)];
        let simplified = simplify(&points, 0.2);
        assert_eq!(simplified, vec![(0.0, 0.0, 0.0), (0.0, 0.0, 2.0)]);
    }

    #[test]
    fn via_step_with_in_plane_bend_is_preserved() {
        let points = vec![(0.0, 0.0, 0.0), (5.0, 0.0, 1.0), (5.0, 5.0, 1.0)];
        let simplified = simplify(&points, 0.2);
        assert_eq!(simplified, points);
    }

    #[test]
    fn idempotent_on_already_simplified_path() {
        let points = vec![(0.0, 0.0, 0.0), (5.0, 0.0, 0.0), (5.0, 5.0, 0.0)];
        let once = simplify(&points, 0.2);
        let twice = simplify(&once, 0.2);
        assert_eq!(once, twice);
    }
}
