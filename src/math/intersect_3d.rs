use super::{Matrix4, Point3, Vector3, TOLERANCE};

/// Slack on barycentric coordinates so rays through a shared edge or vertex
/// still register a hit on at least one of the adjacent triangles.
const BARYCENTRIC_SLACK: f64 = 1e-9;

/// Result of intersecting a ray with a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Ray parameter of the hit (`origin + t * dir`).
    pub t: f64,
    /// Hit position.
    pub point: Point3,
}

/// Intersects the ray `origin + t * dir` (`t > 0`) with a triangle.
///
/// Möller–Trumbore; both triangle windings are accepted. Returns the ray
/// parameter of the hit, or `None` if the ray misses or is parallel to the
/// triangle plane.
#[must_use]
pub fn ray_triangle_intersect(origin: &Point3, dir: &Vector3, tri: &[Point3; 3]) -> Option<f64> {
    let e1 = tri[1] - tri[0];
    let e2 = tri[2] - tri[0];
    let p = dir.cross(&e2);
    let det = e1.dot(&p);

    if det.abs() < TOLERANCE {
        return None;
    }
    let inv_det = 1.0 / det;

    let s = origin - tri[0];
    let u = s.dot(&p) * inv_det;
    if !(-BARYCENTRIC_SLACK..=1.0 + BARYCENTRIC_SLACK).contains(&u) {
        return None;
    }

    let q = s.cross(&e1);
    let v = dir.dot(&q) * inv_det;
    if v < -BARYCENTRIC_SLACK || u + v > 1.0 + BARYCENTRIC_SLACK {
        return None;
    }

    let t = e2.dot(&q) * inv_det;
    (t > TOLERANCE).then_some(t)
}

/// Finds the nearest hit of a ray against a triangle soup, ignoring hits
/// beyond `max_t`.
#[must_use]
pub fn ray_first_hit(
    origin: &Point3,
    dir: &Vector3,
    triangles: &[[Point3; 3]],
    max_t: f64,
) -> Option<RayHit> {
    let t = triangles
        .iter()
        .filter_map(|tri| ray_triangle_intersect(origin, dir, tri))
        .filter(|&t| t <= max_t)
        .min_by(f64::total_cmp)?;

    Some(RayHit {
        t,
        point: origin + dir * t,
    })
}

/// Transforms a point by a 4x4 affine matrix.
#[must_use]
pub fn transform_point(matrix: &Matrix4, point: &Point3) -> Point3 {
    let v = matrix * nalgebra::Vector4::new(point.x, point.y, point.z, 1.0);
    Point3::new(v.x, v.y, v.z)
}
