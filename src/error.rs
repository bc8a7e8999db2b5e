use thiserror::Error;

/// Top-level error type for attachment placement.
#[derive(Debug, Error)]
pub enum PolyattachError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Placement(#[from] PlacementError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors related to meshes, transforms and cameras.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,

    #[error("{what} index {index} is out of range (len {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },
}

/// Fatal placement failures.
///
/// Failures inside a single restart or relaxation step are not errors; only
/// these terminal conditions reach the caller.
#[derive(Debug, Error)]
pub enum PlacementError {
    #[error(
        "no usable attachment sites: none of the {total_sites} sites is in frame and visible; \
         rotate the camera or solid, or relax the visibility requirements"
    )]
    NoCandidates { total_sites: usize },

    #[error(
        "could not place {attachments} attachments after {attempts} relaxation steps of \
         {restarts} restarts each; reduce the attachment count, rotate the solid or camera, \
         or relax the separation thresholds"
    )]
    PlacementExhausted {
        attachments: usize,
        attempts: usize,
        restarts: usize,
    },
}

/// Errors related to placement configuration and manifests.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("attachment \"{id}\": auto placement disabled but no attach site stored")]
    MissingAttach { id: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for results using [`PolyattachError`].
pub type Result<T> = std::result::Result<T, PolyattachError>;
