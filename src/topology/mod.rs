pub mod mesh;
pub mod solid;

pub use mesh::PolyMesh;
pub use solid::Solid;
