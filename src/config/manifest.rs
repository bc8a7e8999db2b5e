use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::placement::{Assignment, AttachmentRequest, BaseOffset, SiteKey, SiteType};

use super::PlacementConfig;

/// Stored attachment site. A missing or negative index means "choose
/// automatically".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AttachSpec {
    pub site_type: Option<SiteType>,
    pub index: Option<i64>,
}

impl AttachSpec {
    #[must_use]
    pub fn from_site(site: SiteKey) -> Self {
        Self {
            site_type: Some(site.site_type),
            index: i64::try_from(site.index).ok(),
        }
    }

    /// The stored index, if it names a site.
    #[must_use]
    pub fn resolved_index(&self) -> Option<usize> {
        self.index.and_then(|i| usize::try_from(i).ok())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoPlacementToggle {
    pub enabled: bool,
}

impl Default for AutoPlacementToggle {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// One attachment as persisted in a manifest. Missing fields take their
/// values from [`AttachmentDefaults`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AttachmentSpec {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sides: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_offset: Option<BaseOffset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attach: Option<AttachSpec>,
    pub auto_placement: AutoPlacementToggle,
}

impl AttachmentSpec {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

/// Values used for fields an [`AttachmentSpec`] leaves out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttachmentDefaults {
    pub radius: f64,
    pub length: f64,
    pub sides: u32,
    pub base_offset: BaseOffset,
    /// Site kind assumed for a stored index without a `site_type`.
    pub site_type: SiteType,
}

impl Default for AttachmentDefaults {
    fn default() -> Self {
        Self {
            radius: 0.03,
            length: 0.6,
            sides: 24,
            base_offset: BaseOffset::Auto,
            site_type: SiteType::Vertex,
        }
    }
}

impl AttachmentDefaults {
    /// Fills in `spec` to a complete request.
    ///
    /// A stored non-negative index pins the request to that site; otherwise
    /// the site is chosen automatically.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingAttach`] if automatic placement is
    /// disabled and no site is stored, or [`ConfigError::Invalid`] if the
    /// filled-in request is invalid.
    pub fn expand(&self, spec: &AttachmentSpec) -> Result<AttachmentRequest, ConfigError> {
        let stored = spec.attach.and_then(|a| {
            a.resolved_index().map(|index| SiteKey {
                site_type: a.site_type.unwrap_or(self.site_type),
                index,
            })
        });
        if !spec.auto_placement.enabled && stored.is_none() {
            return Err(ConfigError::MissingAttach {
                id: spec.id.clone(),
            });
        }

        let request = AttachmentRequest {
            id: spec.id.clone(),
            radius: spec.radius.unwrap_or(self.radius),
            length: spec.length.unwrap_or(self.length),
            sides: spec.sides.unwrap_or(self.sides),
            base_offset: spec.base_offset.unwrap_or(self.base_offset),
            forced_site: stored,
        };
        request.validate()?;
        Ok(request)
    }
}

/// Persisted placement job: options, attachment defaults and the
/// attachments themselves.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementManifest {
    pub seed: u64,
    pub auto_placement: PlacementConfig,
    pub defaults: AttachmentDefaults,
    pub attachments: Vec<AttachmentSpec>,
}

impl PlacementManifest {
    /// Parses and validates a manifest.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed JSON and
    /// [`ConfigError::Invalid`] for out-of-range options.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let manifest: Self = serde_json::from_str(json)?;
        manifest.auto_placement.validate()?;
        Ok(manifest)
    }

    /// Loads a manifest from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`PlacementManifest::from_json_str`].
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] if serialization fails.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the manifest as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = self.to_json_string()?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Expands every attachment against the manifest defaults.
    ///
    /// # Errors
    ///
    /// Returns the first expansion error, or [`ConfigError::Invalid`] if two
    /// attachments share an id.
    pub fn requests(&self) -> Result<Vec<AttachmentRequest>, ConfigError> {
        let mut seen = HashSet::new();
        self.attachments
            .iter()
            .map(|spec| {
                if !seen.insert(spec.id.as_str()) {
                    return Err(ConfigError::Invalid(format!(
                        "duplicate attachment id \"{}\"",
                        spec.id
                    )));
                }
                self.defaults.expand(spec)
            })
            .collect()
    }

    /// Stores each assigned site in the matching attachment's `attach`
    /// record, so that saving and reloading reproduces the layout.
    pub fn record(&mut self, assignment: &Assignment) {
        for spec in &mut self.attachments {
            if let Some(entry) = assignment.entry(&spec.id) {
                spec.attach = Some(AttachSpec::from_site(entry.site));
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"{
        "seed": 9,
        "auto_placement": { "min_base_separation_px": 30, "restarts": 8 },
        "defaults": { "radius": 0.05 },
        "attachments": [
            { "id": "power" },
            { "id": "data", "length": 1.2, "base_offset": 0.1,
              "attach": { "site_type": "FACE", "index": 4 } },
            { "id": "aux", "attach": { "index": -1 } },
            { "id": "pinned", "attach": { "index": 2 },
              "auto_placement": { "enabled": false } }
        ]
    }"#;

    #[test]
    fn parses_and_fills_defaults() {
        let manifest = PlacementManifest::from_json_str(MANIFEST).unwrap();
        assert_eq!(manifest.seed, 9);
        assert_eq!(manifest.auto_placement.restarts, 8);
        assert!((manifest.auto_placement.min_segment_separation_px - 12.0).abs() < 1e-12);

        let requests = manifest.requests().unwrap();
        assert_eq!(requests.len(), 4);

        assert!((requests[0].radius - 0.05).abs() < 1e-12);
        assert!((requests[0].length - 0.6).abs() < 1e-12);
        assert_eq!(requests[0].sides, 24);
        assert_eq!(requests[0].base_offset, BaseOffset::Auto);
        assert_eq!(requests[0].forced_site, None);

        assert_eq!(requests[1].forced_site, Some(SiteKey::face(4)));
        assert_eq!(requests[1].base_offset, BaseOffset::Fixed(0.1));

        assert_eq!(requests[2].forced_site, None);
        assert_eq!(requests[3].forced_site, Some(SiteKey::vertex(2)));
    }

    #[test]
    fn disabled_without_site_is_missing_attach() {
        let defaults = AttachmentDefaults::default();
        let mut spec = AttachmentSpec::new("x");
        spec.auto_placement.enabled = false;
        assert!(matches!(
            defaults.expand(&spec),
            Err(ConfigError::MissingAttach { id }) if id == "x"
        ));

        spec.attach = Some(AttachSpec {
            site_type: None,
            index: Some(-3),
        });
        assert!(matches!(
            defaults.expand(&spec),
            Err(ConfigError::MissingAttach { .. })
        ));
    }

    #[test]
    fn invalid_dimensions_rejected() {
        let mut spec = AttachmentSpec::new("thin");
        spec.radius = Some(0.0);
        assert!(matches!(
            AttachmentDefaults::default().expand(&spec),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn duplicate_ids_rejected() {
        let manifest = PlacementManifest {
            attachments: vec![AttachmentSpec::new("a"), AttachmentSpec::new("a")],
            ..PlacementManifest::default()
        };
        assert!(matches!(manifest.requests(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn invalid_options_rejected_on_load() {
        let err = PlacementManifest::from_json_str(r#"{ "auto_placement": { "restarts": 0 } }"#);
        assert!(matches!(err, Err(ConfigError::Invalid(_))));
        let err = PlacementManifest::from_json_str("{ not json");
        assert!(matches!(err, Err(ConfigError::Json(_))));
    }

    #[test]
    fn json_round_trip_keeps_stored_sites() {
        let manifest = PlacementManifest::from_json_str(MANIFEST).unwrap();
        let json = manifest.to_json_string().unwrap();
        assert!(json.contains("\"FACE\""));
        let reloaded = PlacementManifest::from_json_str(&json).unwrap();
        assert_eq!(reloaded, manifest);
    }

    #[test]
    fn save_and_load_file() {
        let path = std::env::temp_dir().join(format!(
            "polyattach-manifest-{}.json",
            std::process::id()
        ));
        let manifest = PlacementManifest::from_json_str(MANIFEST).unwrap();
        manifest.save(&path).unwrap();
        let loaded = PlacementManifest::from_file(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(loaded, manifest);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = PlacementManifest::from_file("/nonexistent/polyattach/manifest.json");
        assert!(matches!(err, Err(ConfigError::Io(_))));
    }
}
