use super::Point2;

/// Returns the minimum distance from point `p` to the line segment `a`→`b`.
#[must_use]
pub fn point_to_segment_dist(p: &Point2, a: &Point2, b: &Point2) -> f64 {
    let ab = b - a;
    let len_sq = ab.norm_squared();

    if len_sq < 1e-20 {
        // Degenerate segment (zero length).
        return (p - a).norm();
    }

    // Project point onto the infinite line, clamp to [0, 1].
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    let closest = a + ab * t;

    (p - closest).norm()
}

/// Returns the separation between segments `a0`→`a1` and `b0`→`b1`.
///
/// Computed as the minimum of the four endpoint-to-segment distances. This
/// is exact for non-crossing segments; crossing segments report the distance
/// from the nearest endpoint rather than zero.
#[must_use]
pub fn segment_to_segment_dist(a0: &Point2, a1: &Point2, b0: &Point2, b1: &Point2) -> f64 {
    point_to_segment_dist(a0, b0, b1)
        .min(point_to_segment_dist(a1, b0, b1))
        .min(point_to_segment_dist(b0, a0, a1))
        .min(point_to_segment_dist(b1, a0, a1))
}
