#![allow(dead_code, clippy::unwrap_used)]

use polyattach::camera::{Camera, Projection, Resolution};
use polyattach::math::{Point3, Vector3};
use polyattach::placement::AttachmentRequest;
use polyattach::topology::{PolyMesh, Solid};

/// Installs a test subscriber once; `RUST_LOG=polyattach=debug` shows the
/// search trace.
pub fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_test_writer()
        .try_init();
}

/// Regular icosahedron with circumradius 1 centered at the origin.
pub fn icosahedron() -> Solid {
    let phi = (1.0 + 5.0_f64.sqrt()) / 2.0;
    let raw = [
        (-1.0, phi, 0.0),
        (1.0, phi, 0.0),
        (-1.0, -phi, 0.0),
        (1.0, -phi, 0.0),
        (0.0, -1.0, phi),
        (0.0, 1.0, phi),
        (0.0, -1.0, -phi),
        (0.0, 1.0, -phi),
        (phi, 0.0, -1.0),
        (phi, 0.0, 1.0),
        (-phi, 0.0, -1.0),
        (-phi, 0.0, 1.0),
    ];
    let scale = 1.0 / (1.0 + phi * phi).sqrt();
    let vertices = raw
        .iter()
        .map(|&(x, y, z)| Point3::new(x * scale, y * scale, z * scale))
        .collect();
    let faces = [
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ]
    .iter()
    .map(|f| f.to_vec())
    .collect();
    Solid::at_origin(PolyMesh::new(vertices, faces).unwrap())
}

/// 50 mm perspective camera six units out, framing the whole icosahedron at
/// 1024x1024.
pub fn framing_camera() -> Camera {
    let eye = Vector3::new(0.37, -0.81, 0.45).normalize() * 6.0;
    Camera::look_at(
        &Point3::from(eye),
        &Point3::origin(),
        &Vector3::z(),
        Projection::default(),
        Resolution::new(1024, 1024),
    )
    .unwrap()
}

pub fn requests(n: usize, length: f64) -> Vec<AttachmentRequest> {
    (0..n)
        .map(|i| AttachmentRequest::new(format!("att{i:02}"), 0.03, length))
        .collect()
}
