use crate::math::Point3;
use crate::topology::Solid;

use super::site::SiteKey;

/// A raw attachment site before any filtering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSite {
    pub key: SiteKey,
    pub world_position: Point3,
}

/// Lists every face center and every vertex of `solid` in world space.
///
/// Faces come first, then vertices, each in mesh index order. Downstream
/// sorting is stable, so this order breaks all later ties.
#[must_use]
pub fn enumerate_sites(solid: &Solid) -> Vec<RawSite> {
    let faces = solid
        .world_face_centroids()
        .into_iter()
        .enumerate()
        .map(|(i, world_position)| RawSite {
            key: SiteKey::face(i),
            world_position,
        });

    let vertices = solid
        .world_vertices()
        .iter()
        .enumerate()
        .map(|(i, &world_position)| RawSite {
            key: SiteKey::vertex(i),
            world_position,
        });

    faces.chain(vertices).collect()
}
