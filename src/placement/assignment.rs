use crate::math::{Point2, Point3, Vector3};

use super::request::AttachmentRequest;
use super::site::SiteKey;

/// The site chosen for one attachment, with its projected footprint.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentEntry {
    pub request_id: String,
    pub site: SiteKey,
    pub base_world: Point3,
    /// Unit outward direction at the site.
    pub direction: Vector3,
    /// `base_world + direction * length`.
    pub tip_world: Point3,
    pub base_px: Point2,
    pub tip_px: Point2,
    /// Unperturbed placement score.
    pub score: f64,
}

/// A complete site assignment, one entry per request in request order.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    entries: Vec<AssignmentEntry>,
    objective: f64,
}

impl Assignment {
    pub(crate) fn new(entries: Vec<AssignmentEntry>) -> Self {
        let objective = entries.iter().map(|e| e.score).sum();
        Self { entries, objective }
    }

    #[must_use]
    pub fn entries(&self) -> &[AssignmentEntry] {
        &self.entries
    }

    /// Sum of the unperturbed entry scores.
    #[must_use]
    pub fn objective(&self) -> f64 {
        self.objective
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolved sites in request order.
    #[must_use]
    pub fn sites(&self) -> Vec<SiteKey> {
        self.entries.iter().map(|e| e.site).collect()
    }

    /// Looks up the entry for a request id.
    #[must_use]
    pub fn entry(&self, request_id: &str) -> Option<&AssignmentEntry> {
        self.entries.iter().find(|e| e.request_id == request_id)
    }

    /// Pins each request to the site it was assigned, so that a later run
    /// reproduces this layout.
    ///
    /// `requests` must be the slice this assignment was computed for; entries
    /// are matched by position, so repeated ids are pinned independently.
    pub fn write_back(&self, requests: &mut [AttachmentRequest]) {
        for (request, entry) in requests.iter_mut().zip(&self.entries) {
            request.forced_site = Some(entry.site);
        }
    }
}
