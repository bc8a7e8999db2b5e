use tracing::debug;

use crate::camera::Camera;
use crate::config::PlacementConfig;
use crate::error::{PlacementError, Result};

use super::pool::CandidatePool;
use super::request::AttachmentRequest;
use super::select::{GreedySelect, Selection, Thresholds};

/// Threshold levels tried in order, from the configured values down to
/// `min_relaxed_factor` times them.
///
/// The first level is always the unrelaxed configuration, even when no
/// relaxation steps are configured. The sequence is non-increasing.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn relaxation_schedule(config: &PlacementConfig) -> Vec<Thresholds> {
    let attempts = config.fallback.relax_separation_steps + 1;
    let min_factor = config.fallback.min_relaxed_factor;

    (0..attempts)
        .map(|i| {
            let t = if attempts == 1 {
                0.0
            } else {
                i as f64 / (attempts - 1) as f64
            };
            Thresholds::scaled(config, 1.0 - t * (1.0 - min_factor))
        })
        .collect()
}

/// A successful selection together with the thresholds it satisfied.
#[derive(Debug, Clone)]
pub struct RelaxedSelection {
    pub selection: Selection,
    pub thresholds: Thresholds,
    /// Index into [`relaxation_schedule`]; 0 means unrelaxed.
    pub step: usize,
}

/// Runs [`GreedySelect`] at progressively looser separation thresholds until
/// one level yields a complete assignment.
pub struct RelaxPlacement<'a> {
    pool: &'a CandidatePool,
    camera: &'a Camera,
    config: &'a PlacementConfig,
    seed: u64,
}

impl<'a> RelaxPlacement<'a> {
    /// Creates a new `RelaxPlacement` operation.
    #[must_use]
    pub fn new(
        pool: &'a CandidatePool,
        camera: &'a Camera,
        config: &'a PlacementConfig,
        seed: u64,
    ) -> Self {
        Self {
            pool,
            camera,
            config,
            seed,
        }
    }

    /// Executes the operation, returning the least relaxed success.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::PlacementExhausted`] if every restart at
    /// every level fails.
    pub fn execute(&self, requests: &[AttachmentRequest]) -> Result<RelaxedSelection> {
        let schedule = relaxation_schedule(self.config);

        for (step, thresholds) in schedule.iter().copied().enumerate() {
            let selection = GreedySelect::new(self.pool, self.camera, self.config)
                .with_thresholds(thresholds)
                .with_seed(self.seed)
                .with_step(step)
                .execute(requests);

            match selection {
                Some(selection) => {
                    return Ok(RelaxedSelection {
                        selection,
                        thresholds,
                        step,
                    });
                }
                None => debug!(
                    step,
                    factor = thresholds.factor,
                    base_px = thresholds.min_base_separation_px,
                    segment_px = thresholds.min_segment_separation_px,
                    "no complete assignment at this separation level"
                ),
            }
        }

        Err(PlacementError::PlacementExhausted {
            attachments: requests.len(),
            attempts: schedule.len(),
            restarts: self.config.restarts,
        }
        .into())
    }
}
