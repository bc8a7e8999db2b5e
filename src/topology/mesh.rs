use crate::error::{GeometryError, Result};
use crate::math::Point3;

/// Indexed polygon mesh in object-local space.
///
/// Faces are vertex index loops with at least three entries. Face and vertex
/// indices are the identities used for attachment sites, so the order given
/// at construction is preserved.
#[derive(Debug, Clone)]
pub struct PolyMesh {
    vertices: Vec<Point3>,
    faces: Vec<Vec<usize>>,
}

impl PolyMesh {
    /// Creates a mesh from vertex positions and face index loops.
    ///
    /// # Errors
    ///
    /// Returns an error if a face has fewer than three vertices or refers to
    /// a vertex that does not exist.
    pub fn new(vertices: Vec<Point3>, faces: Vec<Vec<usize>>) -> Result<Self> {
        for (fi, face) in faces.iter().enumerate() {
            if face.len() < 3 {
                return Err(GeometryError::Degenerate(format!(
                    "face {fi} has {} vertices, need at least 3",
                    face.len()
                ))
                .into());
            }
            if let Some(&bad) = face.iter().find(|&&vi| vi >= vertices.len()) {
                return Err(GeometryError::IndexOutOfRange {
                    what: "vertex",
                    index: bad,
                    len: vertices.len(),
                }
                .into());
            }
        }
        Ok(Self { vertices, faces })
    }

    /// Returns the vertex positions.
    #[must_use]
    pub fn vertices(&self) -> &[Point3] {
        &self.vertices
    }

    /// Returns the face index loops.
    #[must_use]
    pub fn faces(&self) -> &[Vec<usize>] {
        &self.faces
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }
}
