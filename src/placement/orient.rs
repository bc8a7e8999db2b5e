use std::f64::consts::PI;

use crate::math::{Point3, UnitQuaternion, Vector3};
use crate::topology::Solid;

use super::assignment::AssignmentEntry;
use super::request::AttachmentRequest;

/// World transform of a unit cylinder (radius 1, spanning z ∈ [−1, 1])
/// placed along an attachment's outward direction.
#[derive(Debug, Clone, PartialEq)]
pub struct CylinderPlacement {
    pub request_id: String,
    pub center: Point3,
    /// Rotation taking +Z onto the outward direction.
    pub rotation: UnitQuaternion,
    /// Non-uniform scale `(radius, radius, length / 2)`.
    pub scale: Vector3,
    /// Cylinder end nearest the solid.
    pub start: Point3,
    pub end: Point3,
    pub sides: u32,
    pub base_offset: f64,
}

/// Rotation taking +Z onto `dir` (assumed unit length).
#[must_use]
pub fn rotation_from_z(dir: &Vector3) -> UnitQuaternion {
    // Antiparallel vectors have no unique shortest arc; any half turn works.
    UnitQuaternion::rotation_between(&Vector3::z(), dir)
        .unwrap_or_else(|| UnitQuaternion::from_axis_angle(&Vector3::x_axis(), PI))
}

/// Positions the cylinder for `request` at its resolved site.
#[must_use]
pub fn orient_cylinder(
    entry: &AssignmentEntry,
    request: &AttachmentRequest,
    solid: &Solid,
) -> CylinderPlacement {
    let dir = entry.direction;
    let base_offset = request.base_offset.resolve(
        request.radius,
        entry.site.site_type,
        solid.vertex_marker_radius(),
    );

    let start = entry.base_world + dir * base_offset;
    let end = start + dir * request.length;
    let center = start + dir * (request.length * 0.5);

    CylinderPlacement {
        request_id: request.id.clone(),
        center,
        rotation: rotation_from_z(&dir),
        scale: Vector3::new(request.radius, request.radius, request.length * 0.5),
        start,
        end,
        sides: request.sides,
        base_offset,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::math::Point2;
    use crate::placement::request::BaseOffset;
    use crate::placement::site::SiteKey;
    use crate::topology::PolyMesh;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn tetra_solid() -> Solid {
        let mesh = PolyMesh::new(
            vec![
                p(1.0, 1.0, 1.0),
                p(-1.0, -1.0, 1.0),
                p(-1.0, 1.0, -1.0),
                p(1.0, -1.0, -1.0),
            ],
            vec![vec![0, 1, 2], vec![0, 3, 1], vec![0, 2, 3], vec![1, 3, 2]],
        )
        .unwrap();
        Solid::at_origin(mesh)
    }

    fn entry_along(dir: Vector3, site: SiteKey) -> AssignmentEntry {
        let base = p(0.0, 0.0, 0.0) + dir;
        AssignmentEntry {
            request_id: "c".into(),
            site,
            base_world: base,
            direction: dir,
            tip_world: base + dir,
            base_px: Point2::origin(),
            tip_px: Point2::origin(),
            score: 0.0,
        }
    }

    #[test]
    fn center_includes_offset_and_half_length() {
        let solid = tetra_solid();
        let request = AttachmentRequest::new("c", 0.1, 2.0);
        let entry = entry_along(Vector3::x(), SiteKey::face(0));
        let cyl = orient_cylinder(&entry, &request, &solid);

        // base (1,0,0) + 0.105 auto offset + 1.0 half length
        assert_relative_eq!(cyl.center.x, 2.105, epsilon = 1e-12);
        assert_relative_eq!(cyl.start.x, 1.105, epsilon = 1e-12);
        assert_relative_eq!(cyl.end.x, 3.105, epsilon = 1e-12);
        assert_relative_eq!(cyl.scale, Vector3::new(0.1, 0.1, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn fixed_offset_used_verbatim() {
        let solid = tetra_solid();
        let request =
            AttachmentRequest::new("c", 0.1, 1.0).with_base_offset(BaseOffset::Fixed(0.5));
        let entry = entry_along(Vector3::y(), SiteKey::vertex(0));
        let cyl = orient_cylinder(&entry, &request, &solid);
        assert_relative_eq!(cyl.start.y, 1.5, epsilon = 1e-12);
        assert_relative_eq!(cyl.base_offset, 0.5);
    }

    #[test]
    fn vertex_offset_clears_marker() {
        let solid = tetra_solid().with_vertex_marker_radius(0.4).unwrap();
        let request = AttachmentRequest::new("c", 0.1, 1.0);
        let entry = entry_along(Vector3::z(), SiteKey::vertex(0));
        let cyl = orient_cylinder(&entry, &request, &solid);
        assert_relative_eq!(cyl.base_offset, 0.42, epsilon = 1e-12);
    }

    #[test]
    fn rotation_aligns_axis() {
        let dir = Vector3::new(1.0, -2.0, 0.5).normalize();
        let q = rotation_from_z(&dir);
        assert_relative_eq!(q * Vector3::z(), dir, epsilon = 1e-12);
    }

    #[test]
    fn rotation_handles_antiparallel() {
        let q = rotation_from_z(&-Vector3::z());
        assert_relative_eq!(q * Vector3::z(), -Vector3::z(), epsilon = 1e-12);
    }

    #[test]
    fn rotation_identity_for_z() {
        let q = rotation_from_z(&Vector3::z());
        assert_relative_eq!(q.angle(), 0.0, epsilon = 1e-12);
    }
}
