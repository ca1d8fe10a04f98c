use num::NumCast;

use crate::buffer::{BufferError, MeshBuffer};
use crate::geometry::E3;
use crate::primitive::Trigon;

/// Incremental construction of a [`MeshBuffer`].
///
/// Vertices and facets are inserted one at a time. Indices are validated and
/// normals and edges are derived only when the buffer is built, so a builder
/// may refer to vertices that have not yet been inserted.
#[derive(Debug, Default)]
pub struct BufferBuilder {
    positions: Vec<E3>,
    triangles: Vec<Trigon>,
}

impl BufferBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a vertex and gets its index.
    ///
    /// # Errors
    ///
    /// Returns an error if the index of the vertex cannot be represented.
    pub fn insert_vertex(&mut self, position: E3) -> Result<u32, BufferError> {
        let key = <u32 as NumCast>::from(self.positions.len()).ok_or(BufferError::IndexOverflow)?;
        self.positions.push(position);
        Ok(key)
    }

    /// Inserts a triangle.
    ///
    /// # Errors
    ///
    /// Returns an error if `keys` does not contain exactly three indices.
    pub fn insert_facet<T>(&mut self, keys: T) -> Result<(), BufferError>
    where
        T: AsRef<[u32]>,
    {
        match *keys.as_ref() {
            [a, b, c] => {
                self.triangles.push(Trigon::new(a, b, c));
                Ok(())
            }
            ref keys => Err(BufferError::ArityConflict {
                expected: 3,
                actual: keys.len(),
            }),
        }
    }

    /// Inserts a convex polygon as a fan of triangles about its first vertex.
    ///
    /// The winding of the polygon is preserved. A polygon with $n$ vertices
    /// produces $n - 2$ triangles.
    ///
    /// # Errors
    ///
    /// Returns an error if `keys` contains fewer than three indices.
    pub fn insert_polygon<T>(&mut self, keys: T) -> Result<(), BufferError>
    where
        T: AsRef<[u32]>,
    {
        let keys = keys.as_ref();
        if keys.len() < 3 {
            return Err(BufferError::ArityConflict {
                expected: 3,
                actual: keys.len(),
            });
        }
        for pair in keys[1..].windows(2) {
            self.insert_facet([keys[0], pair[0], pair[1]])?;
        }
        Ok(())
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Builds the [`MeshBuffer`].
    ///
    /// # Errors
    ///
    /// Returns an error if any inserted facet refers to a vertex that was never
    /// inserted.
    pub fn build(self) -> Result<MeshBuffer, BufferError> {
        let BufferBuilder {
            positions,
            triangles,
        } = self;
        MeshBuffer::from_raw_buffers(triangles, positions)
    }
}
