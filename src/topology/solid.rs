use crate::error::{GeometryError, Result};
use crate::math::intersect_3d::{ray_first_hit, transform_point, RayHit};
use crate::math::polygon_3d::{fan_triangulate, polygon_centroid};
use crate::math::{Matrix4, Point3, Vector3, TOLERANCE};

use super::PolyMesh;

/// A convex polyhedral mesh placed in the world.
///
/// The solid is immutable once built. World-space vertex positions and the
/// triangulated surface are computed up front so that repeated projection and
/// occlusion queries during placement do not re-transform the mesh.
#[derive(Debug, Clone)]
pub struct Solid {
    mesh: PolyMesh,
    transform: Matrix4,
    vertex_marker_radius: f64,
    world_vertices: Vec<Point3>,
    world_triangles: Vec<[Point3; 3]>,
}

impl Solid {
    /// Places `mesh` in the world with the given object-to-world transform.
    #[must_use]
    pub fn new(mesh: PolyMesh, transform: Matrix4) -> Self {
        let world_vertices: Vec<Point3> = mesh
            .vertices()
            .iter()
            .map(|v| transform_point(&transform, v))
            .collect();

        let world_triangles = mesh
            .faces()
            .iter()
            .flat_map(|face| {
                let loop_: Vec<Point3> = face.iter().map(|&vi| world_vertices[vi]).collect();
                fan_triangulate(&loop_)
            })
            .collect();

        Self {
            mesh,
            transform,
            vertex_marker_radius: 0.0,
            world_vertices,
            world_triangles,
        }
    }

    /// Places `mesh` at the world origin.
    #[must_use]
    pub fn at_origin(mesh: PolyMesh) -> Self {
        Self::new(mesh, Matrix4::identity())
    }

    /// Sets the radius of the marker spheres drawn on vertices.
    ///
    /// Attachments at vertex sites with an automatic base offset clear this
    /// radius.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is negative or not finite.
    pub fn with_vertex_marker_radius(mut self, radius: f64) -> Result<Self> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(GeometryError::Degenerate(format!(
                "vertex marker radius must be a non-negative number, got {radius}"
            ))
            .into());
        }
        self.vertex_marker_radius = radius;
        Ok(self)
    }

    #[must_use]
    pub fn mesh(&self) -> &PolyMesh {
        &self.mesh
    }

    #[must_use]
    pub fn transform(&self) -> &Matrix4 {
        &self.transform
    }

    #[must_use]
    pub fn vertex_marker_radius(&self) -> f64 {
        self.vertex_marker_radius
    }

    /// World-space center of the solid: the image of the object origin.
    #[must_use]
    pub fn center(&self) -> Point3 {
        transform_point(&self.transform, &Point3::origin())
    }

    /// World-space vertex positions, in mesh order.
    #[must_use]
    pub fn world_vertices(&self) -> &[Point3] {
        &self.world_vertices
    }

    /// World-space face centroids, in mesh order.
    #[must_use]
    pub fn world_face_centroids(&self) -> Vec<Point3> {
        self.mesh
            .faces()
            .iter()
            .map(|face| {
                let loop_: Vec<Point3> = face.iter().map(|&vi| self.world_vertices[vi]).collect();
                polygon_centroid(&loop_).unwrap_or_else(|| self.center())
            })
            .collect()
    }

    /// World-space surface triangles.
    #[must_use]
    pub fn world_triangles(&self) -> &[[Point3; 3]] {
        &self.world_triangles
    }

    /// Casts a ray against the solid's own surface only.
    ///
    /// `dir` need not be normalized; the returned `t` is in units of `dir`.
    /// Hits beyond `max_t` are ignored.
    #[must_use]
    pub fn ray_cast(&self, origin: &Point3, dir: &Vector3, max_t: f64) -> Option<RayHit> {
        if dir.norm() < TOLERANCE {
            return None;
        }
        ray_first_hit(origin, dir, &self.world_triangles, max_t)
    }
}
