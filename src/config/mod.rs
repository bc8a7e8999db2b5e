//! Placement configuration and the persisted manifest.
//!
//! Every option has its default here, applied once when the configuration is
//! built or deserialized. The search code reads plain fields and never
//! re-derives a default.

pub mod manifest;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub use manifest::{AttachSpec, AttachmentDefaults, AttachmentSpec, AutoPlacementToggle, PlacementManifest};

use crate::error::ConfigError;
use crate::placement::SiteType;

/// Options controlling automatic placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Site kinds that automatic placement may use.
    pub allowed_site_types: BTreeSet<SiteType>,
    /// Forbid two attachments on the same site.
    pub unique_sites: bool,
    /// Drop sites hidden behind the solid itself.
    pub require_visible_base: bool,
    /// Reject placements whose tip leaves the frame.
    pub require_tip_in_frame: bool,
    pub min_base_separation_px: f64,
    pub min_segment_separation_px: f64,
    /// Weight of the silhouette score in the placement objective.
    pub bias_silhouette: f64,
    /// Randomized greedy attempts per threshold level.
    pub restarts: usize,
    pub fallback: FallbackConfig,
    /// Inset of the frame, in pixels, used by the tip-in-frame gate.
    pub tip_margin_px: f64,
    /// Occlusion hit tolerance for face-center sites (world units).
    pub face_visibility_eps: f64,
    /// Occlusion hit tolerance for vertex sites (world units).
    pub vertex_visibility_eps: f64,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            allowed_site_types: BTreeSet::from([SiteType::Face, SiteType::Vertex]),
            unique_sites: true,
            require_visible_base: true,
            require_tip_in_frame: true,
            min_base_separation_px: 40.0,
            min_segment_separation_px: 12.0,
            bias_silhouette: 0.25,
            restarts: 24,
            fallback: FallbackConfig::default(),
            tip_margin_px: 0.0,
            face_visibility_eps: 1e-3,
            vertex_visibility_eps: 2e-2,
        }
    }
}

/// Threshold relaxation applied when no restart succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// Relaxed attempts after the unrelaxed one.
    pub relax_separation_steps: usize,
    /// Final threshold as a fraction of the configured one, in `(0, 1]`.
    pub min_relaxed_factor: f64,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            relax_separation_steps: 4,
            min_relaxed_factor: 0.5,
        }
    }
}

impl PlacementConfig {
    /// Checks that every option is within its meaningful range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending option.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.allowed_site_types.is_empty() {
            return Err(ConfigError::Invalid(
                "allowed_site_types must name at least one site type".into(),
            ));
        }
        if self.restarts == 0 {
            return Err(ConfigError::Invalid("restarts must be at least 1".into()));
        }
        let non_negative = [
            ("min_base_separation_px", self.min_base_separation_px),
            ("min_segment_separation_px", self.min_segment_separation_px),
            ("bias_silhouette", self.bias_silhouette),
            ("tip_margin_px", self.tip_margin_px),
            ("face_visibility_eps", self.face_visibility_eps),
            ("vertex_visibility_eps", self.vertex_visibility_eps),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        let factor = self.fallback.min_relaxed_factor;
        if !(factor > 0.0 && factor <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "fallback.min_relaxed_factor must be in (0, 1], got {factor}"
            )));
        }
        Ok(())
    }

    /// `true` if automatic placement may use sites of this kind.
    #[must_use]
    pub fn allows(&self, site_type: SiteType) -> bool {
        self.allowed_site_types.contains(&site_type)
    }
}
