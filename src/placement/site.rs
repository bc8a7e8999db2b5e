use std::fmt;

use serde::{Deserialize, Serialize};

use crate::math::{Point2, Point3, Vector3};

/// Kind of discrete attachment site on a solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SiteType {
    /// A face center.
    #[serde(rename = "FACE")]
    Face,
    /// A vertex.
    #[serde(rename = "VERT", alias = "VERTEX")]
    Vertex,
}

impl fmt::Display for SiteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Face => f.write_str("FACE"),
            Self::Vertex => f.write_str("VERT"),
        }
    }
}

/// Identity of an attachment site: its kind plus the mesh index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SiteKey {
    pub site_type: SiteType,
    pub index: usize,
}

impl SiteKey {
    #[must_use]
    pub fn face(index: usize) -> Self {
        Self {
            site_type: SiteType::Face,
            index,
        }
    }

    #[must_use]
    pub fn vertex(index: usize) -> Self {
        Self {
            site_type: SiteType::Vertex,
            index,
        }
    }
}

impl fmt::Display for SiteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.site_type, self.index)
    }
}

/// A site that survived the frame and visibility filters.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateSite {
    pub key: SiteKey,
    pub world_position: Point3,
    /// Unit vector from the solid center through `world_position`.
    pub outward_direction: Vector3,
    pub projected_px: Point2,
    /// Pixel distance from the projected solid center.
    pub silhouette_score: f64,
}
