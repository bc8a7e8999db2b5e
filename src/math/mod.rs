pub mod distance_2d;
pub mod intersect_3d;
pub mod polygon_3d;

/// 2D point type (pixel space).
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// 4x4 transformation matrix.
pub type Matrix4 = nalgebra::Matrix4<f64>;

/// Unit quaternion used for orientations.
pub type UnitQuaternion = nalgebra::UnitQuaternion<f64>;

/// Rigid transform (rotation + translation).
pub type Isometry3 = nalgebra::Isometry3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Minimum distance below which two world points are considered coincident.
pub const COINCIDENT_DISTANCE: f64 = 1e-9;
