//! Indexed triangle meshes loaded from text.
//!
//! A [`TriMesh`] begins empty and is loaded exactly once from OBJ text. Once
//! loaded, its buffers are immutable. Loading either completes or fails
//! without exposing any partial state.

use thiserror::Error;

use crate::buffer::MeshBuffer;
use crate::encoding::obj::{self, ObjError};
use crate::geometry::{Aabb, GeometryError};

#[derive(Debug, Error)]
pub enum MeshError {
    #[error("mesh is already loaded")]
    AlreadyLoaded,
    #[error(transparent)]
    Obj(#[from] ObjError),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Indexed triangle mesh with derived normals, bounds, and edges.
///
/// # Examples
///
/// ```rust
/// use terrane::geometry::E3;
/// use terrane::mesh::TriMesh;
///
/// let mut mesh = TriMesh::new();
/// assert!(!mesh.is_loaded());
///
/// mesh.load_from_text("v 0 0 0\nv 2 0 0\nv 0 1 3\nf 1 2 3\n").unwrap();
/// let aabb = mesh.aabb().unwrap();
///
/// assert!(mesh.is_loaded());
/// assert_eq!(E3::new(0.0, 0.0, 0.0), aabb.min);
/// assert_eq!(E3::new(2.0, 1.0, 3.0), aabb.max);
/// ```
#[derive(Clone, Debug, Default)]
pub struct TriMesh {
    loaded: Option<Loaded>,
}

#[derive(Clone, Debug)]
struct Loaded {
    buffer: MeshBuffer,
    aabb: Aabb,
}

impl TriMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses OBJ text and derives the buffers of the mesh.
    ///
    /// Normals are area-weighted (see [`vertex_normals`]) and the edge buffer
    /// contains three edges per triangle.
    ///
    /// # Errors
    ///
    /// Returns an error if the mesh is already loaded, if the text cannot be
    /// decoded, or if it contains no triangles. On error the mesh remains
    /// unloaded.
    ///
    /// [`vertex_normals`]: crate::buffer::vertex_normals
    pub fn load_from_text(&mut self, text: &str) -> Result<(), MeshError> {
        if self.is_loaded() {
            return Err(MeshError::AlreadyLoaded);
        }
        let buffer = obj::decode(text)?.build().map_err(ObjError::from)?;
        if buffer.triangle_count() == 0 {
            return Err(GeometryError::Degenerate("mesh has no triangles").into());
        }
        let aabb = buffer
            .aabb()
            .ok_or(GeometryError::Degenerate("mesh has no vertices"))?;
        log::debug!(
            "loaded mesh: {} vertices, {} triangles, bounds {:?} to {:?}",
            buffer.vertex_count(),
            buffer.triangle_count(),
            aabb.min,
            aabb.max,
        );
        self.loaded = Some(Loaded { buffer, aabb });
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    /// Gets the axis-aligned bounding box of the mesh.
    ///
    /// Returns `None` if the mesh is not loaded.
    pub fn aabb(&self) -> Option<Aabb> {
        self.loaded.as_ref().map(|loaded| loaded.aabb)
    }

    /// Gets the buffers of the mesh.
    ///
    /// Returns `None` if the mesh is not loaded.
    pub fn buffer(&self) -> Option<&MeshBuffer> {
        self.loaded.as_ref().map(|loaded| &loaded.buffer)
    }

    pub fn into_buffer(self) -> Option<MeshBuffer> {
        self.loaded.map(|loaded| loaded.buffer)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use crate::buffer::BufferError;
    use crate::encoding::obj::ObjError;
    use crate::geometry::{GeometryError, Vector3, E3};
    use crate::mesh::{MeshError, TriMesh};
    use crate::primitive::{Edge, Trigon};

    const TRIANGLE: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";

    #[test]
    fn load_triangle() {
        let mut mesh = TriMesh::new();
        mesh.load_from_text(TRIANGLE).unwrap();
        let buffer = mesh.buffer().unwrap();
        let aabb = mesh.aabb().unwrap();

        assert_eq!(3, buffer.vertex_count());
        assert_eq!(&[Trigon::new(0, 1, 2)], buffer.as_triangle_slice());
        assert_eq!(
            &[Edge::new(0, 1), Edge::new(1, 2), Edge::new(2, 0)],
            buffer.as_edge_slice()
        );
        assert_eq!(E3::new(0.0, 0.0, 0.0), aabb.min);
        assert_eq!(E3::new(1.0, 1.0, 0.0), aabb.max);
        for normal in buffer.as_normal_slice() {
            assert_eq!(Vector3::z(), *normal);
        }
    }

    #[test]
    fn single_triangle_normals_agree() {
        let mut mesh = TriMesh::new();
        mesh.load_from_text("v 1 0 0\nv 0 2 0\nv 0 0 3\nf 1 2 3\n")
            .unwrap();
        let buffer = mesh.buffer().unwrap();
        let p = buffer.as_position_slice();
        let expected = (p[1] - p[0]).cross(&(p[2] - p[0])).normalize();

        for normal in buffer.as_normal_slice() {
            assert_abs_diff_eq!(expected, *normal, epsilon = 1e-6);
        }
    }

    #[test]
    fn aabb_contains_and_attains_bounds() {
        let obj = "\
            v -1 0.5 2\nv 3 -2 0\nv 0 4 -1\nv 1 1 1\n\
            f 1 2 3\nf 1 3 4\n";
        let mut mesh = TriMesh::new();
        mesh.load_from_text(obj).unwrap();
        let aabb = mesh.aabb().unwrap();
        let positions = mesh.buffer().unwrap().as_position_slice();

        for k in 0..3 {
            assert!(positions
                .iter()
                .all(|p| aabb.min[k] <= p[k] && p[k] <= aabb.max[k]));
            assert!(positions.iter().any(|p| p[k] == aabb.min[k]));
            assert!(positions.iter().any(|p| p[k] == aabb.max[k]));
        }
    }

    #[test]
    fn parse_error_leaves_mesh_unloaded() {
        let mut mesh = TriMesh::new();
        let result = mesh.load_from_text("v 0 0 0\nv 1 0 0\nv 0 1 zero\nf 1 2 3\n");

        assert!(matches!(
            result,
            Err(MeshError::Obj(ObjError::Parse { line: 3, .. }))
        ));
        assert!(!mesh.is_loaded());
        assert!(mesh.aabb().is_none());
        assert!(mesh.buffer().is_none());
    }

    #[test]
    fn out_of_bounds_face_leaves_mesh_unloaded() {
        let mut mesh = TriMesh::new();
        let result = mesh.load_from_text("v 0 0 0\nf 1 2 3\n");

        assert!(matches!(
            result,
            Err(MeshError::Obj(ObjError::Buffer(
                BufferError::IndexOutOfBounds { .. }
            )))
        ));
        assert!(!mesh.is_loaded());
    }

    #[test]
    fn reject_mesh_without_triangles() {
        let mut mesh = TriMesh::new();
        let result = mesh.load_from_text("v 0 0 0\nv 1 0 0\n");

        assert!(matches!(
            result,
            Err(MeshError::Geometry(GeometryError::Degenerate(_)))
        ));
        assert!(!mesh.is_loaded());
    }

    #[test]
    fn reject_second_load() {
        let mut mesh = TriMesh::new();
        mesh.load_from_text(TRIANGLE).unwrap();

        assert!(matches!(
            mesh.load_from_text(TRIANGLE),
            Err(MeshError::AlreadyLoaded)
        ));
        assert_eq!(1, mesh.buffer().unwrap().triangle_count());
    }
}
