use tracing::debug;

use crate::camera::Camera;
use crate::config::PlacementConfig;
use crate::error::{PlacementError, Result};
use crate::math::{Point2, COINCIDENT_DISTANCE};
use crate::topology::Solid;

use super::enumerate::enumerate_sites;
use super::filter::VisibilityFilter;
use super::site::{CandidateSite, SiteKey};

/// The filtered, scored candidate sites of one solid seen from one camera.
///
/// Built once per placement run and shared read-only by every restart and
/// relaxation step.
#[derive(Debug, Clone)]
pub struct CandidatePool {
    sites: Vec<CandidateSite>,
    center_px: Point2,
    total_sites: usize,
}

impl CandidatePool {
    /// Sites ordered by silhouette score, highest first.
    #[must_use]
    pub fn sites(&self) -> &[CandidateSite] {
        &self.sites
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Projected pixel position of the solid center.
    #[must_use]
    pub fn center_px(&self) -> Point2 {
        self.center_px
    }

    /// Number of sites before filtering.
    #[must_use]
    pub fn total_sites(&self) -> usize {
        self.total_sites
    }

    #[must_use]
    pub fn get(&self, key: SiteKey) -> Option<&CandidateSite> {
        self.sites.iter().find(|s| s.key == key)
    }

    #[must_use]
    pub fn contains(&self, key: SiteKey) -> bool {
        self.get(key).is_some()
    }
}

/// Enumerates, filters and scores the attachment sites of a solid.
pub struct BuildCandidatePool<'a> {
    solid: &'a Solid,
    camera: &'a Camera,
    config: &'a PlacementConfig,
}

impl<'a> BuildCandidatePool<'a> {
    /// Creates a new `BuildCandidatePool` operation.
    #[must_use]
    pub fn new(solid: &'a Solid, camera: &'a Camera, config: &'a PlacementConfig) -> Self {
        Self {
            solid,
            camera,
            config,
        }
    }

    /// Executes the operation.
    ///
    /// Every face center and vertex is tested against the frame and, when
    /// `require_visible_base` is set, against self-occlusion. Survivors get
    /// an outward direction and a silhouette score and are sorted by score,
    /// highest first (stable, so mesh order breaks ties).
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::NoCandidates`] if no site survives.
    pub fn execute(&self) -> Result<CandidatePool> {
        let raw = enumerate_sites(self.solid);
        let total_sites = raw.len();

        let filter = VisibilityFilter::new(self.solid, self.camera)
            .require_visible(self.config.require_visible_base)
            .epsilons(
                self.config.face_visibility_eps,
                self.config.vertex_visibility_eps,
            );

        let center = self.solid.center();
        let center_px = self.camera.project_px(&center);

        let mut sites: Vec<CandidateSite> = raw
            .into_iter()
            .filter(|site| filter.accepts(site.key.site_type, &site.world_position))
            .filter_map(|site| {
                let radial = site.world_position - center;
                let len = radial.norm();
                if len < COINCIDENT_DISTANCE {
                    return None;
                }
                let projected_px = self.camera.project_px(&site.world_position);
                Some(CandidateSite {
                    key: site.key,
                    world_position: site.world_position,
                    outward_direction: radial / len,
                    projected_px,
                    silhouette_score: (projected_px - center_px).norm(),
                })
            })
            .collect();

        sites.sort_by(|a, b| b.silhouette_score.total_cmp(&a.silhouette_score));

        debug!(
            candidates = sites.len(),
            total_sites, "built attachment candidate pool"
        );

        if sites.is_empty() {
            return Err(PlacementError::NoCandidates { total_sites }.into());
        }

        Ok(CandidatePool {
            sites,
            center_px,
            total_sites,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::camera::{Projection, Resolution};
    use crate::error::PolyattachError;
    use crate::math::{Point3, Vector3, TOLERANCE};
    use crate::placement::site::SiteType;
    use crate::topology::PolyMesh;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn cube() -> Solid {
        let mesh = PolyMesh::new(
            vec![
                p(-1.0, -1.0, -1.0),
                p(1.0, -1.0, -1.0),
                p(1.0, 1.0, -1.0),
                p(-1.0, 1.0, -1.0),
                p(-1.0, -1.0, 1.0),
                p(1.0, -1.0, 1.0),
                p(1.0, 1.0, 1.0),
                p(-1.0, 1.0, 1.0),
            ],
            vec![
                vec![0, 3, 2, 1],
                vec![4, 5, 6, 7],
                vec![0, 1, 5, 4],
                vec![3, 7, 6, 2],
                vec![1, 2, 6, 5],
                vec![0, 4, 7, 3],
            ],
        )
        .unwrap();
        Solid::at_origin(mesh)
    }

    fn camera(eye: Point3) -> Camera {
        Camera::look_at(
            &eye,
            &p(0.0, 0.0, 0.0),
            &Vector3::z(),
            Projection::default(),
            Resolution::new(1024, 1024),
        )
        .unwrap()
    }

    #[test]
    fn corner_view_of_cube() {
        // From a generic corner direction three faces and seven vertices show.
        let solid = cube();
        let cam = camera(p(6.0, -7.0, 5.0));
        let config = PlacementConfig::default();
        let pool = BuildCandidatePool::new(&solid, &cam, &config).execute().unwrap();

        let faces = pool
            .sites()
            .iter()
            .filter(|s| s.key.site_type == SiteType::Face)
            .count();
        assert_eq!(faces, 3);
        assert_eq!(pool.len(), 3 + 7);
        assert_eq!(pool.total_sites(), 14);
        assert!(pool.contains(SiteKey::face(1)));
        assert!(!pool.contains(SiteKey::vertex(3)));
    }

    #[test]
    fn sorted_by_silhouette_descending() {
        let solid = cube();
        let cam = camera(p(6.0, -7.0, 5.0));
        let config = PlacementConfig::default();
        let pool = BuildCandidatePool::new(&solid, &cam, &config).execute().unwrap();
        assert!(pool
            .sites()
            .windows(2)
            .all(|w| w[0].silhouette_score >= w[1].silhouette_score));
    }

    #[test]
    fn outward_directions_are_unit_and_radial() {
        let solid = cube();
        let cam = camera(p(6.0, -7.0, 5.0));
        let config = PlacementConfig::default();
        let pool = BuildCandidatePool::new(&solid, &cam, &config).execute().unwrap();
        for site in pool.sites() {
            assert!((site.outward_direction.norm() - 1.0).abs() < TOLERANCE);
            let radial = site.world_position.coords.normalize();
            assert!((radial - site.outward_direction).norm() < TOLERANCE);
        }
    }

    #[test]
    fn silhouette_is_pixel_distance_from_center() {
        let solid = cube();
        let cam = camera(p(6.0, -7.0, 5.0));
        let config = PlacementConfig::default();
        let pool = BuildCandidatePool::new(&solid, &cam, &config).execute().unwrap();
        let site = &pool.sites()[0];
        let expected = (cam.project_px(&site.world_position) - pool.center_px()).norm();
        assert!((site.silhouette_score - expected).abs() < TOLERANCE);
    }

    #[test]
    fn nothing_in_frame_is_no_candidates() {
        let solid = cube();
        // Looking away from the cube.
        let cam = Camera::look_at(
            &p(0.0, -8.0, 0.0),
            &p(0.0, -20.0, 0.0),
            &Vector3::z(),
            Projection::default(),
            Resolution::new(512, 512),
        )
        .unwrap();
        let config = PlacementConfig::default();
        let err = BuildCandidatePool::new(&solid, &cam, &config)
            .execute()
            .unwrap_err();
        assert!(matches!(
            err,
            PolyattachError::Placement(PlacementError::NoCandidates { total_sites: 14 })
        ));
    }

    #[test]
    fn without_visibility_all_in_frame_sites_survive() {
        let solid = cube();
        let cam = camera(p(6.0, -7.0, 5.0));
        let config = PlacementConfig {
            require_visible_base: false,
            ..PlacementConfig::default()
        };
        let pool = BuildCandidatePool::new(&solid, &cam, &config).execute().unwrap();
        assert_eq!(pool.len(), 14);
    }
}
