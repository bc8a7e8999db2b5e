pub mod camera;
pub mod config;
pub mod error;
pub mod math;
pub mod placement;
pub mod topology;

pub use error::{PolyattachError, Result};
