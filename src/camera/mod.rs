//! Pinhole and orthographic camera used to judge how attachment sites read
//! in the final frame.
//!
//! Conventions follow common DCC tools: the camera looks down its local −Z
//! axis with +Y up, normalized device coordinates run from `(0, 0)` at the
//! bottom-left of the frame to `(1, 1)` at the top-right, and depth is the
//! distance in front of the camera along the view axis.

use serde::{Deserialize, Serialize};

use crate::error::{GeometryError, Result};
use crate::math::{Isometry3, Point2, Point3, Vector3, TOLERANCE};

/// Camera projection model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Projection {
    /// Pinhole camera. The sensor width is fitted to the larger image axis.
    #[serde(alias = "PERSP")]
    Perspective {
        #[serde(default = "default_lens_mm")]
        lens_mm: f64,
        #[serde(default = "default_sensor_width_mm")]
        sensor_width_mm: f64,
    },
    /// Parallel projection. `scale` is the world-space extent of the larger
    /// image axis.
    #[serde(alias = "ORTHO")]
    Orthographic { scale: f64 },
}

fn default_lens_mm() -> f64 {
    50.0
}

fn default_sensor_width_mm() -> f64 {
    36.0
}

impl Default for Projection {
    fn default() -> Self {
        Self::Perspective {
            lens_mm: default_lens_mm(),
            sensor_width_mm: default_sensor_width_mm(),
        }
    }
}

/// Output image size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
    /// Render scale in percent.
    #[serde(default = "default_percentage")]
    pub percentage: u32,
}

fn default_percentage() -> u32 {
    100
}

impl Resolution {
    /// Full-scale resolution of `width` x `height` pixels.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            percentage: 100,
        }
    }

    /// Effective pixel width after applying the render percentage.
    #[must_use]
    pub fn pixel_width(&self) -> f64 {
        f64::from(self.width) * f64::from(self.percentage) / 100.0
    }

    /// Effective pixel height after applying the render percentage.
    #[must_use]
    pub fn pixel_height(&self) -> f64 {
        f64::from(self.height) * f64::from(self.percentage) / 100.0
    }
}

/// Normalized device coordinates of a projected point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ndc {
    pub x: f64,
    pub y: f64,
    /// Distance in front of the camera along the view axis. Negative behind.
    pub depth: f64,
}

impl Ndc {
    /// `true` if the point lies inside the frame and not behind the camera.
    #[must_use]
    pub fn in_frame(&self) -> bool {
        self.in_frame_with_margin(0.0, 0.0)
    }

    /// Like [`in_frame`](Self::in_frame) but with the frame shrunk by
    /// `margin_x` / `margin_y` (in NDC units) on every side.
    #[must_use]
    pub fn in_frame_with_margin(&self, margin_x: f64, margin_y: f64) -> bool {
        (margin_x..=1.0 - margin_x).contains(&self.x)
            && (margin_y..=1.0 - margin_y).contains(&self.y)
            && self.depth >= 0.0
    }
}

/// A camera with a world pose, projection and output resolution.
#[derive(Debug, Clone)]
pub struct Camera {
    world_from_camera: Isometry3,
    camera_from_world: Isometry3,
    projection: Projection,
    resolution: Resolution,
}

impl Camera {
    /// Creates a camera from its camera-to-world pose.
    ///
    /// # Errors
    ///
    /// Returns an error if the resolution is empty or the projection
    /// parameters are not positive.
    pub fn new(
        world_from_camera: Isometry3,
        projection: Projection,
        resolution: Resolution,
    ) -> Result<Self> {
        if resolution.width == 0 || resolution.height == 0 || resolution.percentage == 0 {
            return Err(GeometryError::Degenerate(format!(
                "camera resolution must be non-empty, got {}x{} at {}%",
                resolution.width, resolution.height, resolution.percentage
            ))
            .into());
        }
        match projection {
            Projection::Perspective {
                lens_mm,
                sensor_width_mm,
            } if !(lens_mm > TOLERANCE && sensor_width_mm > TOLERANCE) => {
                return Err(GeometryError::Degenerate(format!(
                    "perspective lens ({lens_mm} mm) and sensor ({sensor_width_mm} mm) must be positive"
                ))
                .into());
            }
            Projection::Orthographic { scale } if !(scale > TOLERANCE) => {
                return Err(GeometryError::Degenerate(format!(
                    "orthographic scale must be positive, got {scale}"
                ))
                .into());
            }
            _ => {}
        }

        Ok(Self {
            world_from_camera,
            camera_from_world: world_from_camera.inverse(),
            projection,
            resolution,
        })
    }

    /// Creates a camera at `eye` aimed at `target`, with `up` defining roll.
    ///
    /// # Errors
    ///
    /// Returns an error if `eye` and `target` coincide, if `up` is parallel to
    /// the view direction, or if [`Camera::new`] rejects the parameters.
    pub fn look_at(
        eye: &Point3,
        target: &Point3,
        up: &Vector3,
        projection: Projection,
        resolution: Resolution,
    ) -> Result<Self> {
        let forward = target - eye;
        if forward.norm() < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        if forward.cross(up).norm() < TOLERANCE * forward.norm().max(1.0) {
            return Err(GeometryError::Degenerate(
                "camera up vector is parallel to the view direction".into(),
            )
            .into());
        }
        let view = Isometry3::look_at_rh(eye, target, up);
        Self::new(view.inverse(), projection, resolution)
    }

    /// World-space position of the camera.
    #[must_use]
    pub fn origin(&self) -> Point3 {
        self.world_from_camera * Point3::origin()
    }

    #[must_use]
    pub fn world_from_camera(&self) -> &Isometry3 {
        &self.world_from_camera
    }

    #[must_use]
    pub fn projection(&self) -> Projection {
        self.projection
    }

    #[must_use]
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Half extents of the view frame: at unit depth for perspective
    /// cameras, in world units for orthographic ones.
    fn frame_half_extents(&self) -> (f64, f64) {
        let w = self.resolution.pixel_width();
        let h = self.resolution.pixel_height();
        let half_major = match self.projection {
            Projection::Perspective {
                lens_mm,
                sensor_width_mm,
            } => 0.5 * sensor_width_mm / lens_mm,
            Projection::Orthographic { scale } => 0.5 * scale,
        };
        if w >= h {
            (half_major, half_major * h / w)
        } else {
            (half_major * w / h, half_major)
        }
    }

    /// Projects a world point to normalized device coordinates.
    ///
    /// A point on the camera plane of a perspective camera has no defined
    /// image position and maps to the frame center at depth zero.
    #[must_use]
    pub fn to_ndc(&self, world: &Point3) -> Ndc {
        let local = self.camera_from_world * world;
        let depth = -local.z;
        let (hx, hy) = self.frame_half_extents();

        let (sx, sy) = match self.projection {
            Projection::Perspective { .. } => {
                if depth.abs() < TOLERANCE {
                    return Ndc {
                        x: 0.5,
                        y: 0.5,
                        depth: 0.0,
                    };
                }
                (local.x / depth, local.y / depth)
            }
            Projection::Orthographic { .. } => (local.x, local.y),
        };

        Ndc {
            x: 0.5 * (sx / hx + 1.0),
            y: 0.5 * (sy / hy + 1.0),
            depth,
        }
    }

    /// Converts normalized device coordinates to pixel coordinates.
    #[must_use]
    pub fn ndc_to_px(&self, ndc: &Ndc) -> Point2 {
        Point2::new(
            ndc.x * self.resolution.pixel_width(),
            ndc.y * self.resolution.pixel_height(),
        )
    }

    /// Projects a world point straight to pixel coordinates.
    #[must_use]
    pub fn project_px(&self, world: &Point3) -> Point2 {
        self.ndc_to_px(&self.to_ndc(world))
    }

    /// `true` if `world` projects inside the frame, not behind the camera.
    #[must_use]
    pub fn in_frame(&self, world: &Point3) -> bool {
        self.to_ndc(world).in_frame()
    }

    /// Converts a pixel margin to NDC margins along x and y.
    #[must_use]
    pub fn px_margin_to_ndc(&self, margin_px: f64) -> (f64, f64) {
        (
            margin_px / self.resolution.pixel_width().max(1.0),
            margin_px / self.resolution.pixel_height().max(1.0),
        )
    }
}
