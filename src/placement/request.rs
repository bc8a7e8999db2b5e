use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

use super::site::{SiteKey, SiteType};

/// Clearance factor applied to radii when the base offset is automatic.
pub const AUTO_OFFSET_FACTOR: f64 = 1.05;

/// Gap between the attachment site and the start of the cylinder.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "BaseOffsetRepr", into = "BaseOffsetRepr")]
pub enum BaseOffset {
    /// Just enough clearance to avoid visibly intersecting the surface.
    #[default]
    Auto,
    /// A literal distance in world units.
    Fixed(f64),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum BaseOffsetRepr {
    Value(f64),
    Keyword(String),
}

impl TryFrom<BaseOffsetRepr> for BaseOffset {
    type Error = String;

    fn try_from(repr: BaseOffsetRepr) -> Result<Self, Self::Error> {
        match repr {
            BaseOffsetRepr::Value(v) => Ok(Self::Fixed(v)),
            BaseOffsetRepr::Keyword(k) if k.eq_ignore_ascii_case("auto") => Ok(Self::Auto),
            BaseOffsetRepr::Keyword(k) => Err(format!(
                "base_offset must be a number or \"AUTO\", got \"{k}\""
            )),
        }
    }
}

impl From<BaseOffset> for BaseOffsetRepr {
    fn from(offset: BaseOffset) -> Self {
        match offset {
            BaseOffset::Auto => Self::Keyword("AUTO".into()),
            BaseOffset::Fixed(v) => Self::Value(v),
        }
    }
}

impl BaseOffset {
    /// Resolves the offset for a cylinder of `radius` at a site of
    /// `site_type`. Automatic offsets at vertices also clear the vertex
    /// marker spheres.
    #[must_use]
    pub fn resolve(self, radius: f64, site_type: SiteType, vertex_marker_radius: f64) -> f64 {
        match self {
            Self::Fixed(v) => v,
            Self::Auto => match site_type {
                SiteType::Face => AUTO_OFFSET_FACTOR * radius,
                SiteType::Vertex => AUTO_OFFSET_FACTOR * radius.max(vertex_marker_radius),
            },
        }
    }
}

/// One cylinder to attach to the solid.
#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentRequest {
    pub id: String,
    pub radius: f64,
    pub length: f64,
    pub sides: u32,
    pub base_offset: BaseOffset,
    /// Site this attachment must use, if pinned.
    pub forced_site: Option<SiteKey>,
}

impl AttachmentRequest {
    /// Creates an unpinned request with 24 sides and an automatic offset.
    #[must_use]
    pub fn new(id: impl Into<String>, radius: f64, length: f64) -> Self {
        Self {
            id: id.into(),
            radius,
            length,
            sides: 24,
            base_offset: BaseOffset::Auto,
            forced_site: None,
        }
    }

    #[must_use]
    pub fn with_sides(mut self, sides: u32) -> Self {
        self.sides = sides;
        self
    }

    #[must_use]
    pub fn with_base_offset(mut self, base_offset: BaseOffset) -> Self {
        self.base_offset = base_offset;
        self
    }

    /// Pins the request to `site`.
    #[must_use]
    pub fn forced(mut self, site: SiteKey) -> Self {
        self.forced_site = Some(site);
        self
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for non-positive dimensions, fewer
    /// than three sides, or a negative fixed offset.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let id = &self.id;
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "attachment \"{id}\": radius must be positive, got {}",
                self.radius
            )));
        }
        if !(self.length.is_finite() && self.length > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "attachment \"{id}\": length must be positive, got {}",
                self.length
            )));
        }
        if self.sides < 3 {
            return Err(ConfigError::Invalid(format!(
                "attachment \"{id}\": a cylinder needs at least 3 sides, got {}",
                self.sides
            )));
        }
        if let BaseOffset::Fixed(v) = self.base_offset {
            if !(v.is_finite() && v >= 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "attachment \"{id}\": base_offset must be non-negative, got {v}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn auto_offset_at_face() {
        let off = BaseOffset::Auto.resolve(0.1, SiteType::Face, 0.5);
        assert!((off - 0.105).abs() < 1e-12);
    }

    #[test]
    fn auto_offset_at_vertex_clears_marker() {
        let off = BaseOffset::Auto.resolve(0.1, SiteType::Vertex, 0.2);
        assert!((off - 0.21).abs() < 1e-12);
        let off = BaseOffset::Auto.resolve(0.3, SiteType::Vertex, 0.2);
        assert!((off - 0.315).abs() < 1e-12);
    }

    #[test]
    fn fixed_offset_is_literal() {
        let off = BaseOffset::Fixed(0.7).resolve(0.1, SiteType::Vertex, 5.0);
        assert!((off - 0.7).abs() < 1e-12);
    }

    #[test]
    fn base_offset_json_forms() {
        let auto: BaseOffset = serde_json::from_str("\"AUTO\"").unwrap();
        assert_eq!(auto, BaseOffset::Auto);
        let lower: BaseOffset = serde_json::from_str("\"auto\"").unwrap();
        assert_eq!(lower, BaseOffset::Auto);
        let fixed: BaseOffset = serde_json::from_str("0.25").unwrap();
        assert_eq!(fixed, BaseOffset::Fixed(0.25));
        assert!(serde_json::from_str::<BaseOffset>("\"far\"").is_err());

        assert_eq!(serde_json::to_string(&BaseOffset::Auto).unwrap(), "\"AUTO\"");
    }

    #[test]
    fn request_validation() {
        AttachmentRequest::new("ok", 0.03, 0.6).validate().unwrap();
        assert!(AttachmentRequest::new("r", 0.0, 0.6).validate().is_err());
        assert!(AttachmentRequest::new("l", 0.03, -1.0).validate().is_err());
        assert!(AttachmentRequest::new("s", 0.03, 0.6)
            .with_sides(2)
            .validate()
            .is_err());
        assert!(AttachmentRequest::new("o", 0.03, 0.6)
            .with_base_offset(BaseOffset::Fixed(-0.1))
            .validate()
            .is_err());
    }
}
