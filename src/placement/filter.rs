use crate::camera::Camera;
use crate::math::{Point3, COINCIDENT_DISTANCE};
use crate::topology::Solid;

use super::site::SiteType;

/// Frame and occlusion gates applied to raw sites.
#[derive(Debug, Clone, Copy)]
pub struct VisibilityFilter<'a> {
    solid: &'a Solid,
    camera: &'a Camera,
    require_visible: bool,
    face_eps: f64,
    vertex_eps: f64,
}

impl<'a> VisibilityFilter<'a> {
    #[must_use]
    pub fn new(solid: &'a Solid, camera: &'a Camera) -> Self {
        Self {
            solid,
            camera,
            require_visible: true,
            face_eps: 1e-3,
            vertex_eps: 2e-2,
        }
    }

    /// Enables or disables the occlusion test.
    #[must_use]
    pub fn require_visible(mut self, require: bool) -> Self {
        self.require_visible = require;
        self
    }

    /// Sets the hit tolerances used by the occlusion test for face and
    /// vertex sites.
    #[must_use]
    pub fn epsilons(mut self, face_eps: f64, vertex_eps: f64) -> Self {
        self.face_eps = face_eps;
        self.vertex_eps = vertex_eps;
        self
    }

    /// `true` if a site at `point` passes every enabled gate.
    #[must_use]
    pub fn accepts(&self, site_type: SiteType, point: &Point3) -> bool {
        if (point - self.camera.origin()).norm() < COINCIDENT_DISTANCE {
            return false;
        }
        if !self.camera.in_frame(point) {
            return false;
        }
        if self.require_visible {
            let eps = match site_type {
                SiteType::Face => self.face_eps,
                SiteType::Vertex => self.vertex_eps,
            };
            return self.is_unoccluded(point, eps);
        }
        true
    }

    /// `true` if the first surface hit on the ray from the camera toward
    /// `point` lies within `eps` of `point` itself.
    #[must_use]
    pub fn is_unoccluded(&self, point: &Point3, eps: f64) -> bool {
        let origin = self.camera.origin();
        let to_point = point - origin;
        let dist = to_point.norm();
        if dist < COINCIDENT_DISTANCE {
            return false;
        }
        let dir = to_point / dist;

        self.solid
            .ray_cast(&origin, &dir, dist + eps)
            .is_some_and(|hit| (hit.point - point).norm() <= eps)
    }
}
