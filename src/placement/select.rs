use std::collections::HashSet;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::camera::Camera;
use crate::config::PlacementConfig;
use crate::math::distance_2d::segment_to_segment_dist;
use crate::math::Point2;

use super::assignment::{Assignment, AssignmentEntry};
use super::pool::CandidatePool;
use super::request::AttachmentRequest;
use super::site::{CandidateSite, SiteKey};

/// Relative amplitude of the multiplicative score noise between restarts.
pub const JITTER: f64 = 0.05;

/// Weight of the projected segment length in the placement score.
pub const SEGMENT_LENGTH_WEIGHT: f64 = 0.25;

/// Pixel separation thresholds in force for one selection run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub min_base_separation_px: f64,
    pub min_segment_separation_px: f64,
    /// Fraction of the configured thresholds these values represent.
    pub factor: f64,
}

impl Thresholds {
    /// The configured thresholds scaled by `factor`.
    #[must_use]
    pub fn scaled(config: &PlacementConfig, factor: f64) -> Self {
        Self {
            min_base_separation_px: config.min_base_separation_px * factor,
            min_segment_separation_px: config.min_segment_separation_px * factor,
            factor,
        }
    }
}

/// Best assignment found by [`GreedySelect`].
#[derive(Debug, Clone)]
pub struct Selection {
    pub assignment: Assignment,
    /// Restart that produced `assignment`.
    pub restart: usize,
    /// Restarts that produced any complete assignment.
    pub successful_restarts: usize,
}

/// Deterministic random stream for one restart of one relaxation step.
///
/// The seed keys the generator; the stream id packs the step into the upper
/// 32 bits and the restart into the lower 32, so no two triples share a
/// stream.
#[must_use]
pub fn restart_rng(seed: u64, step: usize, restart: usize) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(((step as u64) << 32) | (restart as u64 & 0xFFFF_FFFF));
    rng
}

/// Request indices in placement order: larger radii first, ties in request
/// order.
#[must_use]
pub fn placement_order(requests: &[AttachmentRequest]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..requests.len()).collect();
    order.sort_by(|&a, &b| requests[b].radius.total_cmp(&requests[a].radius));
    order
}

/// Randomized greedy site assignment with restarts.
///
/// Each restart walks the requests in [`placement_order`] and gives each one
/// the best-scoring site that keeps clear of everything placed before it.
/// Scores are jittered per restart so that restarts explore different
/// layouts; the complete assignment with the highest unjittered objective
/// wins.
pub struct GreedySelect<'a> {
    pool: &'a CandidatePool,
    camera: &'a Camera,
    config: &'a PlacementConfig,
    thresholds: Thresholds,
    seed: u64,
    step: usize,
}

impl<'a> GreedySelect<'a> {
    /// Creates a selector at the configured (unrelaxed) thresholds.
    #[must_use]
    pub fn new(pool: &'a CandidatePool, camera: &'a Camera, config: &'a PlacementConfig) -> Self {
        Self {
            pool,
            camera,
            config,
            thresholds: Thresholds::scaled(config, 1.0),
            seed: 0,
            step: 0,
        }
    }

    #[must_use]
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Keys the random streams by relaxation step so each step explores
    /// fresh layouts.
    #[must_use]
    pub fn with_step(mut self, step: usize) -> Self {
        self.step = step;
        self
    }

    /// Runs every restart and returns the best complete assignment, or
    /// `None` if no restart placed every request.
    #[must_use]
    pub fn execute(&self, requests: &[AttachmentRequest]) -> Option<Selection> {
        let order = placement_order(requests);
        let mut best: Option<(Assignment, usize)> = None;
        let mut successful_restarts = 0;

        for restart in 0..self.config.restarts {
            let mut rng = restart_rng(self.seed, self.step, restart);
            let Some(assignment) = self.run_restart(requests, &order, &mut rng) else {
                debug!(restart, step = self.step, "restart failed");
                continue;
            };
            successful_restarts += 1;

            let improves = best
                .as_ref()
                .is_none_or(|(b, _)| assignment.objective() > b.objective());
            if improves {
                best = Some((assignment, restart));
            }
        }

        best.map(|(assignment, restart)| Selection {
            assignment,
            restart,
            successful_restarts,
        })
    }

    fn run_restart(
        &self,
        requests: &[AttachmentRequest],
        order: &[usize],
        rng: &mut ChaCha8Rng,
    ) -> Option<Assignment> {
        let mut used: HashSet<SiteKey> = HashSet::new();
        let mut segments: Vec<(Point2, Point2)> = Vec::with_capacity(requests.len());
        let mut resolved: Vec<Option<AssignmentEntry>> = vec![None; requests.len()];

        for &ri in order {
            let request = &requests[ri];
            let mut best: Option<(f64, AssignmentEntry)> = None;

            for site in self.eligible_sites(request) {
                if self.config.unique_sites && used.contains(&site.key) {
                    continue;
                }
                let Some(entry) = self.evaluate(request, site, &segments) else {
                    continue;
                };
                let perturbed = entry.score * rng.gen_range(1.0 - JITTER..=1.0 + JITTER);
                if best.as_ref().is_none_or(|(b, _)| perturbed > *b) {
                    best = Some((perturbed, entry));
                }
            }

            let (_, entry) = best?;
            if self.config.unique_sites {
                used.insert(entry.site);
            }
            segments.push((entry.base_px, entry.tip_px));
            resolved[ri] = Some(entry);
        }

        resolved
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .map(Assignment::new)
    }

    /// Sites a request may use: exactly its pinned site, or every pooled
    /// site of an allowed kind. A pinned site of a disallowed kind leaves
    /// nothing eligible.
    fn eligible_sites(&self, request: &AttachmentRequest) -> Vec<&'a CandidateSite> {
        match request.forced_site {
            Some(key) => self
                .pool
                .get(key)
                .filter(|s| self.config.allows(s.key.site_type))
                .into_iter()
                .collect(),
            None => self
                .pool
                .sites()
                .iter()
                .filter(|s| self.config.allows(s.key.site_type))
                .collect(),
        }
    }

    /// Applies the tip and separation gates to one site and scores it.
    fn evaluate(
        &self,
        request: &AttachmentRequest,
        site: &CandidateSite,
        segments: &[(Point2, Point2)],
    ) -> Option<AssignmentEntry> {
        let tip_world = site.world_position + site.outward_direction * request.length;
        let tip_ndc = self.camera.to_ndc(&tip_world);
        if self.config.require_tip_in_frame {
            let (mx, my) = self.camera.px_margin_to_ndc(self.config.tip_margin_px);
            if !tip_ndc.in_frame_with_margin(mx, my) {
                return None;
            }
        }

        let base_px = site.projected_px;
        let tip_px = self.camera.ndc_to_px(&tip_ndc);

        let crowds_base = segments
            .iter()
            .any(|(b, _)| (base_px - b).norm() < self.thresholds.min_base_separation_px);
        if crowds_base {
            return None;
        }
        let crowds_segment = segments.iter().any(|(b, t)| {
            segment_to_segment_dist(&base_px, &tip_px, b, t)
                < self.thresholds.min_segment_separation_px
        });
        if crowds_segment {
            return None;
        }

        let score = self.config.bias_silhouette * site.silhouette_score
            + SEGMENT_LENGTH_WEIGHT * (tip_px - base_px).norm();

        Some(AssignmentEntry {
            request_id: request.id.clone(),
            site: site.key,
            base_world: site.world_position,
            direction: site.outward_direction,
            tip_world,
            base_px,
            tip_px,
            score,
        })
    }
}
