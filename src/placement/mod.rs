//! Automatic attachment-site placement.
//!
//! The pipeline enumerates every face center and vertex of a solid, keeps
//! those in frame and unoccluded, scores them by distance from the projected
//! solid center, then assigns one site per attachment with a randomized
//! greedy search under pixel-separation constraints. If no restart succeeds
//! the separation thresholds are relaxed stepwise.

mod assignment;
mod enumerate;
mod filter;
mod orient;
mod pool;
mod relax;
mod request;
mod select;
mod site;

pub use assignment::{Assignment, AssignmentEntry};
pub use enumerate::{enumerate_sites, RawSite};
pub use filter::VisibilityFilter;
pub use orient::{orient_cylinder, rotation_from_z, CylinderPlacement};
pub use pool::{BuildCandidatePool, CandidatePool};
pub use relax::{relaxation_schedule, RelaxPlacement, RelaxedSelection};
pub use request::{AttachmentRequest, BaseOffset, AUTO_OFFSET_FACTOR};
pub use select::{
    placement_order, restart_rng, GreedySelect, Selection, Thresholds, JITTER,
    SEGMENT_LENGTH_WEIGHT,
};
pub use site::{CandidateSite, SiteKey, SiteType};

use tracing::{info, warn};

use crate::camera::Camera;
use crate::config::PlacementConfig;
use crate::error::Result;
use crate::topology::Solid;

/// Result of a placement run.
#[derive(Debug, Clone)]
pub struct Placement {
    pub assignment: Assignment,
    /// Separation thresholds the assignment satisfies.
    pub thresholds: Thresholds,
    /// Relaxation level that succeeded; 0 means unrelaxed.
    pub relaxation_step: usize,
    /// Restart within that level that produced the assignment.
    pub restart: usize,
    /// One cylinder per request, in request order.
    pub cylinders: Vec<CylinderPlacement>,
}

impl Placement {
    /// Pins each request to its assigned site.
    pub fn write_back(&self, requests: &mut [AttachmentRequest]) {
        self.assignment.write_back(requests);
    }
}

/// Places a set of cylindrical attachments on a solid as seen by a camera.
pub struct PlaceAttachments<'a> {
    solid: &'a Solid,
    camera: &'a Camera,
    config: &'a PlacementConfig,
}

impl<'a> PlaceAttachments<'a> {
    /// Creates a new `PlaceAttachments` operation.
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
    /// Identical inputs and `seed` always produce the identical placement.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`](crate::error::ConfigError::Invalid)
    /// for an invalid configuration or request,
    /// [`PlacementError::NoCandidates`](crate::error::PlacementError::NoCandidates)
    /// if no site is usable, and
    /// [`PlacementError::PlacementExhausted`](crate::error::PlacementError::PlacementExhausted)
    /// if no assignment satisfies even the most relaxed thresholds.
    pub fn execute(&self, requests: &[AttachmentRequest], seed: u64) -> Result<Placement> {
        self.config.validate()?;
        for request in requests {
            request.validate()?;
        }
        let requests = self.drop_stale_forced_sites(requests);

        let pool = BuildCandidatePool::new(self.solid, self.camera, self.config).execute()?;
        let relaxed = RelaxPlacement::new(&pool, self.camera, self.config, seed).execute(&requests)?;

        let assignment = relaxed.selection.assignment;
        let cylinders = assignment
            .entries()
            .iter()
            .zip(&requests)
            .map(|(entry, request)| orient_cylinder(entry, request, self.solid))
            .collect();

        info!(
            attachments = assignment.len(),
            step = relaxed.step,
            restart = relaxed.selection.restart,
            successful_restarts = relaxed.selection.successful_restarts,
            base_px = relaxed.thresholds.min_base_separation_px,
            segment_px = relaxed.thresholds.min_segment_separation_px,
            objective = assignment.objective(),
            "placed attachments"
        );

        Ok(Placement {
            assignment,
            thresholds: relaxed.thresholds,
            relaxation_step: relaxed.step,
            restart: relaxed.selection.restart,
            cylinders,
        })
    }

    /// Clears forced sites whose index no longer exists on the mesh, so the
    /// attachment is placed automatically instead.
    fn drop_stale_forced_sites(&self, requests: &[AttachmentRequest]) -> Vec<AttachmentRequest> {
        let mesh = self.solid.mesh();
        requests
            .iter()
            .map(|request| {
                let mut request = request.clone();
                if let Some(key) = request.forced_site {
                    let len = match key.site_type {
                        SiteType::Face => mesh.face_count(),
                        SiteType::Vertex => mesh.vertex_count(),
                    };
                    if key.index >= len {
                        warn!(
                            id = %request.id,
                            site = %key,
                            len,
                            "forced site index out of range; placing automatically"
                        );
                        request.forced_site = None;
                    }
                }
                request
            })
            .collect()
    }
}
