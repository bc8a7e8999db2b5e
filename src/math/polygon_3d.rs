use super::{Point3, Vector3};

/// Arithmetic mean of a polygon's vertices.
///
/// Returns `None` for an empty polygon.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn polygon_centroid(polygon: &[Point3]) -> Option<Point3> {
    if polygon.is_empty() {
        return None;
    }
    let sum = polygon
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Some(Point3::from(sum / polygon.len() as f64))
}

/// Splits a convex polygon into a triangle fan anchored at its first vertex.
///
/// Polygons with fewer than three vertices yield no triangles.
#[must_use]
pub fn fan_triangulate(polygon: &[Point3]) -> Vec<[Point3; 3]> {
    if polygon.len() < 3 {
        return Vec::new();
    }
    polygon
        .windows(2)
        .skip(1)
        .map(|w| [polygon[0], w[0], w[1]])
        .collect()
}
