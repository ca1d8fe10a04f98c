//! Fault-plane terrain.
//!
//! A [`Terrain`] is a heightfield over a regular grid in the $xy$-plane. Its
//! heights are synthesized by repeatedly splitting the grid with a random
//! vertical [`FaultPlane`], raising every vertex in front of the plane and
//! lowering every vertex behind it. The accumulated heights are then smoothed
//! and shifted so that the lowest vertex has a height of zero.
//!
//! Synthesis proceeds in strict phases:
//!
//! | Phase         | Output                                              |
//! |---------------|-----------------------------------------------------|
//! | Grid          | $(d + 1)^2$ vertices and $2d^2$ triangles at $z = 0$ |
//! | Faults        | heights perturbed by each fault plane in order      |
//! | Smoothing     | interior heights averaged with a $3 \times 3$ kernel |
//! | Normalization | heights shifted so that the minimum is zero         |
//! | Normals       | per-vertex normals estimated from grid neighbors    |
//! | Edges         | edge buffer derived from triangles                  |
//!
//! # Grid Addressing
//!
//! A grid with division $d$ has rows $i$ and columns $j$ in $[0, d]$. Vertex
//! $(i, j)$ is stored at index $i(d + 1) + j$ and lies at
//! $x = x_{min} + j \Delta x$ and $y = y_{min} + i \Delta y$. Each grid cell
//! with lower-left vertex $v$ is split into the triangles $(v, v + 1, v + r)$
//! and $(v + 1, v + 1 + r, v + r)$, where $r = d + 1$.
//!
//! # Examples
//!
//! Generating a small terrain with a seeded RNG:
//!
//! ```rust
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use terrane::primitive::terrain::{Terrain, TerrainConfig};
//!
//! let config = TerrainConfig::default().with_division(16);
//! let terrain = Terrain::try_generate_with(&config, &mut StdRng::seed_from_u64(7)).unwrap();
//!
//! assert_eq!(289, terrain.buffer().vertex_count());
//! assert_eq!(512, terrain.buffer().triangle_count());
//! assert_eq!(0.0, terrain.lowest_height());
//! ```

use itertools::{iproduct, Itertools as _, MinMaxResult};
use num::NumCast;
use rand::Rng;
use smallvec::SmallVec;
use std::f32::consts::TAU;

use crate::buffer::MeshBuffer;
use crate::geometry::partition::{BinaryPartition, Plane, PointPartition};
use crate::geometry::{normalize_or_zero, GeometryError, Unit, Vector3, E3};
use crate::primitive::Trigon;
use crate::IteratorExt as _;

/// Rectangular region of the $xy$-plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Extent {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl Extent {
    pub fn new(min_x: f32, max_x: f32, min_y: f32, max_y: f32) -> Self {
        Extent {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    /// Samples a point uniformly from the extent at $z = 0$.
    pub fn sample<R>(&self, rng: &mut R) -> E3
    where
        R: Rng + ?Sized,
    {
        E3::new(
            rng.gen_range(self.min_x..self.max_x),
            rng.gen_range(self.min_y..self.max_y),
            0.0,
        )
    }

    fn validate(&self) -> Result<(), GeometryError> {
        for (name, min, max) in [
            ("extent.x", self.min_x, self.max_x),
            ("extent.y", self.min_y, self.max_y),
        ] {
            if !(min.is_finite() && max.is_finite()) {
                return Err(GeometryError::invalid_argument(
                    name,
                    format!("bounds [{}, {}] are not finite", min, max),
                ));
            }
            if min >= max {
                return Err(GeometryError::invalid_argument(
                    name,
                    format!("minimum {} is not less than maximum {}", min, max),
                ));
            }
            if !(max - min).is_finite() {
                return Err(GeometryError::invalid_argument(
                    name,
                    format!("span of bounds [{}, {}] is not finite", min, max),
                ));
            }
        }
        Ok(())
    }
}

impl Default for Extent {
    fn default() -> Self {
        Extent::new(-1.0, 1.0, -1.0, 1.0)
    }
}

/// Smoothing traversal.
///
/// Smoothing replaces the height of each interior vertex with a weighted
/// average of itself and its eight neighbors. The weights are $4$ for the
/// vertex, $2$ for orthogonal neighbors, and $1$ for diagonal neighbors, and
/// the sum is divided by $16$.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Smoothing {
    /// Reads every neighbor from the heightfield as it was before the pass.
    ///
    /// The result does not depend on traversal order.
    #[default]
    DoubleBuffered,
    /// Writes heights in place in row-major order.
    ///
    /// Neighbors that precede a vertex in row-major order have already been
    /// smoothed when that vertex is read, so the result depends on traversal
    /// order.
    InPlace,
}

/// Parameters of terrain synthesis.
///
/// The default configuration produces a terrain with division $128$ over
/// $[-1, 1]^2$, perturbed by $100$ faults that each move heights by $0.005$.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerrainConfig {
    pub division: usize,
    pub extent: Extent,
    pub fault_count: usize,
    pub fault_delta: f32,
    pub smoothing: Smoothing,
}

impl TerrainConfig {
    pub fn with_division(self, division: usize) -> Self {
        TerrainConfig { division, ..self }
    }

    pub fn with_extent(self, extent: Extent) -> Self {
        TerrainConfig { extent, ..self }
    }

    pub fn with_fault_count(self, fault_count: usize) -> Self {
        TerrainConfig {
            fault_count,
            ..self
        }
    }

    pub fn with_fault_delta(self, fault_delta: f32) -> Self {
        TerrainConfig {
            fault_delta,
            ..self
        }
    }

    pub fn with_smoothing(self, smoothing: Smoothing) -> Self {
        TerrainConfig { smoothing, ..self }
    }

    fn validate(&self) -> Result<Grid, GeometryError> {
        let grid = Grid::try_new(self.division)?;
        self.extent.validate()?;
        if self.fault_count == 0 {
            return Err(GeometryError::invalid_argument(
                "fault_count",
                "at least one fault is required",
            ));
        }
        if !(self.fault_delta.is_finite() && self.fault_delta >= 0.0) {
            return Err(GeometryError::invalid_argument(
                "fault_delta",
                format!("{} is not a finite non-negative displacement", self.fault_delta),
            ));
        }
        Ok(grid)
    }
}

impl Default for TerrainConfig {
    fn default() -> Self {
        TerrainConfig {
            division: 128,
            extent: Extent::default(),
            fault_count: 100,
            fault_delta: 0.005,
            smoothing: Smoothing::default(),
        }
    }
}

/// Corner of a grid.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Corner {
    /// $(0, 0)$.
    BottomLeft,
    /// $(0, d)$.
    BottomRight,
    /// $(d, 0)$.
    TopLeft,
    /// $(d, d)$.
    TopRight,
}

/// Boundary side of a grid, excluding its corners.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Side {
    /// $i = 0$.
    Bottom,
    /// $j = 0$.
    Left,
    /// $i = d$.
    Top,
    /// $j = d$.
    Right,
}

/// Topological class of a grid vertex.
///
/// Vertices in different classes have different neighborhoods and so their
/// normals are estimated from different fans of neighbors.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Site {
    Interior,
    Corner(Corner),
    Edge(Side),
}

impl Site {
    // Row and column offsets of the neighbors of a vertex, ordered
    // counterclockwise about $+z$. Consecutive neighbors span a face.
    fn neighborhood(&self) -> &'static [(isize, isize)] {
        match *self {
            Site::Interior => &[(0, 1), (1, 0), (1, -1), (0, -1), (-1, 0), (-1, 1)],
            Site::Corner(Corner::BottomLeft) => &[(0, 1), (1, 0)],
            Site::Corner(Corner::TopRight) => &[(0, -1), (-1, 0)],
            Site::Corner(Corner::BottomRight) => &[(1, 0), (1, -1), (0, -1)],
            Site::Corner(Corner::TopLeft) => &[(-1, 0), (-1, 1), (0, 1)],
            Site::Edge(Side::Bottom) => &[(0, 1), (1, 0), (1, -1), (0, -1)],
            Site::Edge(Side::Left) => &[(-1, 0), (-1, 1), (0, 1), (1, 0)],
            Site::Edge(Side::Top) => &[(0, -1), (-1, 0), (-1, 1), (0, 1)],
            Site::Edge(Side::Right) => &[(1, 0), (1, -1), (0, -1), (-1, 0)],
        }
    }
}

/// Regular grid of $(d + 1)^2$ vertices with division $d$.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Grid {
    division: usize,
}

impl Grid {
    /// Creates a grid with the given division.
    ///
    /// # Errors
    ///
    /// Returns an error if `division` is zero or if the vertices of the grid
    /// cannot be indexed by `u32`.
    pub fn try_new(division: usize) -> Result<Self, GeometryError> {
        if division == 0 {
            return Err(GeometryError::invalid_argument(
                "division",
                "grid must have at least one division",
            ));
        }
        division
            .checked_add(1)
            .and_then(|row| row.checked_mul(row))
            .and_then(<u32 as NumCast>::from)
            .map(|_| Grid { division })
            .ok_or_else(|| {
                GeometryError::invalid_argument(
                    "division",
                    format!("{} divisions exceed the index range", division),
                )
            })
    }

    pub fn division(&self) -> usize {
        self.division
    }

    /// Gets the number of vertices in a row.
    pub fn row(&self) -> usize {
        self.division + 1
    }

    pub fn vertex_count(&self) -> usize {
        self.row() * self.row()
    }

    pub fn triangle_count(&self) -> usize {
        2 * self.division * self.division
    }

    /// Gets the index of vertex $(i, j)$.
    pub fn index(&self, i: usize, j: usize) -> usize {
        i * self.row() + j
    }

    /// Classifies vertex $(i, j)$ by its neighborhood.
    pub fn classify(&self, i: usize, j: usize) -> Site {
        let d = self.division;
        match (i, j) {
            (0, 0) => Site::Corner(Corner::BottomLeft),
            (0, j) if j == d => Site::Corner(Corner::BottomRight),
            (i, 0) if i == d => Site::Corner(Corner::TopLeft),
            (i, j) if i == d && j == d => Site::Corner(Corner::TopRight),
            (0, _) => Site::Edge(Side::Bottom),
            (_, 0) => Site::Edge(Side::Left),
            (i, _) if i == d => Site::Edge(Side::Top),
            (_, j) if j == d => Site::Edge(Side::Right),
            _ => Site::Interior,
        }
    }

    /// Gets an iterator over the $(i, j)$ coordinates of the grid in
    /// row-major order.
    pub fn coordinates(&self) -> impl Iterator<Item = (usize, usize)> {
        let row = self.row();
        iproduct!(0..row, 0..row)
    }

    /// Gets an iterator over the triangles of the grid in row-major order of
    /// their cells.
    pub fn triangles(&self) -> impl Iterator<Item = Trigon> {
        // Indices fit in `u32`; see `try_new`.
        let row = self.row() as u32;
        let division = self.division as u32;
        iproduct!(0..division, 0..division).flat_map(move |(i, j)| {
            let v = i * row + j;
            [
                Trigon::new(v, v + 1, v + row),
                Trigon::new(v + 1, v + 1 + row, v + row),
            ]
        })
    }

    fn positions(&self, extent: &Extent) -> Vec<E3> {
        let d = self.division as f32;
        let (dx, dy) = (extent.width() / d, extent.height() / d);
        self.coordinates()
            .map(|(i, j)| {
                E3::new(
                    extent.min_x + dx * j as f32,
                    extent.min_y + dy * i as f32,
                    0.0,
                )
            })
            .collect()
    }

    fn neighbor(&self, i: usize, j: usize, (di, dj): (isize, isize)) -> usize {
        self.index(i.wrapping_add_signed(di), j.wrapping_add_signed(dj))
    }
}

/// Vertical plane that splits a terrain into raised and lowered halves.
///
/// The plane passes through `point` and its `normal` lies in the
/// $xy$-plane. Heights are ignored when partitioning, so a vertex is in front
/// of the fault if its projection onto the $xy$-plane is.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaultPlane {
    pub point: E3,
    pub normal: Unit<Vector3<f32>>,
}

impl FaultPlane {
    /// Creates a fault through `point` with a normal at `angle` radians from
    /// the $x$-axis.
    pub fn from_angle(point: E3, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        FaultPlane {
            point: E3::new(point.x, point.y, 0.0),
            normal: Unit::new_unchecked(Vector3::new(cos, sin, 0.0)),
        }
    }

    /// Samples a fault through a uniformly random point of the extent with a
    /// uniformly random direction.
    pub fn random<R>(extent: &Extent, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let point = extent.sample(rng);
        FaultPlane::from_angle(point, rng.gen_range(0.0..TAU))
    }

    /// Gets the side of the fault on which a position lies.
    pub fn side(&self, position: &E3) -> BinaryPartition {
        self.partition(&E3::new(position.x, position.y, 0.0))
    }

    fn displace(&self, positions: &mut [E3], delta: f32) {
        for position in positions {
            position.z += match self.side(position) {
                BinaryPartition::Front => delta,
                BinaryPartition::Back => -delta,
            };
        }
    }
}

impl PointPartition for FaultPlane {
    fn partition(&self, point: &E3) -> BinaryPartition {
        Plane::new(self.point, self.normal).partition(point)
    }
}

/// Heightfield mesh synthesized by fault planes.
///
/// See the module documentation.
#[derive(Clone, Debug, PartialEq)]
pub struct Terrain {
    grid: Grid,
    extent: Extent,
    buffer: MeshBuffer,
    lowest_height: f32,
    highest_height: f32,
}

impl Terrain {
    /// Generates a terrain using the thread-local RNG.
    pub fn try_generate(config: &TerrainConfig) -> Result<Self, GeometryError> {
        Terrain::try_generate_with(config, &mut rand::thread_rng())
    }

    /// Generates a terrain using the given RNG.
    ///
    /// Faults are sampled from `rng` and applied in the order in which they
    /// are sampled, so a seeded RNG produces the same terrain.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration has no divisions, an empty or
    /// non-finite extent, no faults, or a negative or non-finite fault delta.
    pub fn try_generate_with<R>(config: &TerrainConfig, rng: &mut R) -> Result<Self, GeometryError>
    where
        R: Rng + ?Sized,
    {
        let grid = config.validate()?;
        let mut positions = grid.positions(&config.extent);
        let triangles = grid.triangles().collect::<Vec<_>>();
        log::debug!(
            "generated terrain grid: {} vertices, {} triangles",
            positions.len(),
            triangles.len(),
        );

        for _ in 0..config.fault_count {
            FaultPlane::random(&config.extent, rng).displace(&mut positions, config.fault_delta);
        }
        log::debug!("applied {} terrain faults", config.fault_count);

        let mut heights = positions.iter().map(|position| position.z).collect::<Vec<_>>();
        smooth(&mut heights, &grid, config.smoothing);
        log::debug!("smoothed terrain heights ({:?})", config.smoothing);

        let (lowest_height, highest_height) = match heights.iter().copied().minmax() {
            MinMaxResult::OneElement(height) => (height, height),
            MinMaxResult::MinMax(min, max) => (min, max),
            MinMaxResult::NoElements => {
                return Err(GeometryError::Degenerate("terrain has no vertices"));
            }
        };
        for (position, height) in positions.iter_mut().zip(heights) {
            position.z = height - lowest_height;
        }
        let (lowest_height, highest_height) = (0.0, highest_height - lowest_height);
        log::debug!("normalized terrain heights to [{}, {}]", lowest_height, highest_height);

        let normals = vertex_normals(&grid, &positions);
        log::debug!("derived {} terrain normals", normals.len());

        let buffer = MeshBuffer::from_raw_buffers_unchecked(triangles, positions, normals);
        Ok(Terrain {
            grid,
            extent: config.extent,
            buffer,
            lowest_height,
            highest_height,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn extent(&self) -> &Extent {
        &self.extent
    }

    pub fn buffer(&self) -> &MeshBuffer {
        &self.buffer
    }

    pub fn into_buffer(self) -> MeshBuffer {
        self.buffer
    }

    /// Gets the height of vertex $(i, j)$.
    ///
    /// Returns `None` if the coordinates are outside of the grid.
    pub fn height(&self, i: usize, j: usize) -> Option<f32> {
        let row = self.grid.row();
        if i < row && j < row {
            self.buffer
                .as_position_slice()
                .get(self.grid.index(i, j))
                .map(|position| position.z)
        }
        else {
            None
        }
    }

    /// Gets the lowest height of the terrain, which is always zero.
    pub fn lowest_height(&self) -> f32 {
        self.lowest_height
    }

    pub fn highest_height(&self) -> f32 {
        self.highest_height
    }

    /// Maps a height into $[0, 1]$ relative to the lowest and highest heights
    /// of the terrain.
    ///
    /// Heights outside of the range of the terrain are clamped. If the terrain
    /// is flat, then all heights map to zero.
    pub fn height_fraction(&self, height: f32) -> f32 {
        let range = self.highest_height - self.lowest_height;
        if range > 0.0 {
            ((height - self.lowest_height) / range).clamp(0.0, 1.0)
        }
        else {
            0.0
        }
    }
}

/// Smooths the interior heights of a grid in a single pass.
///
/// `heights` must have one entry per vertex of `grid`. Boundary heights are
/// not modified.
pub fn smooth(heights: &mut [f32], grid: &Grid, smoothing: Smoothing) {
    let interior = 1..grid.division();
    match smoothing {
        Smoothing::DoubleBuffered => {
            let source = heights.to_vec();
            for (i, j) in iproduct!(interior.clone(), interior) {
                heights[grid.index(i, j)] = kernel(&source, grid, i, j);
            }
        }
        Smoothing::InPlace => {
            for (i, j) in iproduct!(interior.clone(), interior) {
                let height = kernel(heights, grid, i, j);
                heights[grid.index(i, j)] = height;
            }
        }
    }
}

fn kernel(heights: &[f32], grid: &Grid, i: usize, j: usize) -> f32 {
    const WEIGHTS: [(isize, isize, f32); 9] = [
        (0, 0, 4.0),
        (0, 1, 2.0),
        (1, 0, 2.0),
        (0, -1, 2.0),
        (-1, 0, 2.0),
        (1, 1, 1.0),
        (1, -1, 1.0),
        (-1, -1, 1.0),
        (-1, 1, 1.0),
    ];
    WEIGHTS
        .iter()
        .map(|&(di, dj, weight)| weight * heights[grid.neighbor(i, j, (di, dj))])
        .sum::<f32>()
        / 16.0
}

/// Estimates the normal of each vertex of a grid.
///
/// The normal of a vertex is the normalized sum of the normals of the fan of
/// faces spanned by consecutive neighbors. The fan of an interior vertex is
/// closed. The fans of boundary vertices are open and include only the faces
/// that exist at that boundary.
pub fn vertex_normals(grid: &Grid, positions: &[E3]) -> Vec<Vector3<f32>> {
    grid.coordinates()
        .map(|(i, j)| {
            let site = grid.classify(i, j);
            let origin = positions[grid.index(i, j)];
            let spokes = site
                .neighborhood()
                .iter()
                .map(|&offset| positions[grid.neighbor(i, j, offset)] - origin)
                .collect::<SmallVec<[_; 6]>>();
            let cross = |(a, b): (&Vector3<f32>, &Vector3<f32>)| a.cross(b);
            let normal: Vector3<f32> = if let Site::Interior = site {
                spokes.iter().perimeter().map(cross).sum()
            }
            else {
                spokes.iter().tuple_windows().map(cross).sum()
            };
            normalize_or_zero(normal)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use approx::{abs_diff_eq, assert_abs_diff_eq};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::geometry::partition::BinaryPartition;
    use crate::geometry::{GeometryError, Vector3, E3};
    use crate::primitive::terrain::*;
    use crate::primitive::Trigon;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0x7e44a1e)
    }

    #[test]
    fn small_terrain_counts() {
        let config = TerrainConfig::default().with_division(4);
        let terrain = Terrain::try_generate_with(&config, &mut rng()).unwrap();
        let buffer = terrain.buffer();

        assert_eq!(25, buffer.vertex_count());
        assert_eq!(32, buffer.triangle_count());
        assert_eq!(96, buffer.edge_count());
        assert_eq!(192, buffer.to_flat_edge_indices().len());
    }

    #[test]
    fn heights_are_normalized() {
        let config = TerrainConfig::default().with_division(16);
        let terrain = Terrain::try_generate_with(&config, &mut rng()).unwrap();
        let heights = terrain
            .buffer()
            .as_position_slice()
            .iter()
            .map(|position| position.z)
            .collect::<Vec<_>>();
        let lowest = heights.iter().copied().fold(f32::INFINITY, f32::min);
        let highest = heights.iter().copied().fold(f32::NEG_INFINITY, f32::max);

        assert_eq!(0.0, lowest);
        assert_eq!(0.0, terrain.lowest_height());
        assert_eq!(highest, terrain.highest_height());
    }

    #[test]
    fn normals_are_unit() {
        let config = TerrainConfig::default().with_division(8);
        let terrain = Terrain::try_generate_with(&config, &mut rng()).unwrap();

        assert!(terrain
            .buffer()
            .as_normal_slice()
            .iter()
            .all(|normal| abs_diff_eq!(1.0, normal.norm(), epsilon = 1e-5)));
    }

    #[test]
    fn seeded_generation_is_deterministic() {
        let config = TerrainConfig::default().with_division(8);
        let a = Terrain::try_generate_with(&config, &mut rng()).unwrap();
        let b = Terrain::try_generate_with(&config, &mut rng()).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn flat_terrain_faces_up() {
        let config = TerrainConfig::default()
            .with_division(5)
            .with_fault_delta(0.0);
        let terrain = Terrain::try_generate_with(&config, &mut rng()).unwrap();

        assert_eq!(0.0, terrain.highest_height());
        assert_eq!(0.0, terrain.height_fraction(1.0));
        for normal in terrain.buffer().as_normal_slice() {
            assert_abs_diff_eq!(Vector3::z(), *normal, epsilon = 1e-6);
        }
    }

    #[test]
    fn tilted_plane_normals_at_every_site() {
        let (a, b) = (0.5f32, -0.25f32);
        let grid = Grid::try_new(4).unwrap();
        let positions = grid
            .positions(&Extent::new(-1.0, 3.0, 2.0, 4.0))
            .into_iter()
            .map(|position| E3::new(position.x, position.y, a * position.x + b * position.y))
            .collect::<Vec<_>>();
        let normals = vertex_normals(&grid, &positions);
        let expected = Vector3::new(-a, -b, 1.0).normalize();

        let mut sites = Vec::new();
        for (i, j) in grid.coordinates() {
            let site = grid.classify(i, j);
            if !sites.contains(&site) {
                sites.push(site);
            }
            assert_abs_diff_eq!(expected, normals[grid.index(i, j)], epsilon = 1e-5);
        }
        // Four corners, four sides, and the interior.
        assert_eq!(9, sites.len());
    }

    #[test]
    fn grid_layout() {
        let grid = Grid::try_new(2).unwrap();
        let positions = grid.positions(&Extent::new(0.0, 2.0, 10.0, 14.0));

        assert_eq!(E3::new(1.0, 10.0, 0.0), positions[grid.index(0, 1)]);
        assert_eq!(E3::new(0.0, 12.0, 0.0), positions[grid.index(1, 0)]);
        assert_eq!(E3::new(2.0, 14.0, 0.0), positions[grid.index(2, 2)]);
        assert_eq!(
            vec![Trigon::new(0, 1, 3), Trigon::new(1, 4, 3)],
            grid.triangles().take(2).collect::<Vec<_>>(),
        );
        assert_eq!(grid.triangle_count(), grid.triangles().count());
    }

    #[test]
    fn classify_sites() {
        let grid = Grid::try_new(3).unwrap();

        assert_eq!(Site::Corner(Corner::BottomLeft), grid.classify(0, 0));
        assert_eq!(Site::Corner(Corner::BottomRight), grid.classify(0, 3));
        assert_eq!(Site::Corner(Corner::TopLeft), grid.classify(3, 0));
        assert_eq!(Site::Corner(Corner::TopRight), grid.classify(3, 3));
        assert_eq!(Site::Edge(Side::Bottom), grid.classify(0, 1));
        assert_eq!(Site::Edge(Side::Left), grid.classify(2, 0));
        assert_eq!(Site::Edge(Side::Top), grid.classify(3, 2));
        assert_eq!(Site::Edge(Side::Right), grid.classify(1, 3));
        assert_eq!(Site::Interior, grid.classify(1, 2));
        assert_eq!(Site::Corner(Corner::BottomRight), Grid::try_new(1).unwrap().classify(0, 1));
    }

    #[test]
    fn double_buffered_smoothing_spreads_spike() {
        let grid = Grid::try_new(4).unwrap();
        let mut heights = vec![0.0; grid.vertex_count()];
        heights[grid.index(2, 2)] = 16.0;
        smooth(&mut heights, &grid, Smoothing::DoubleBuffered);

        assert_eq!(4.0, heights[grid.index(2, 2)]);
        assert_eq!(2.0, heights[grid.index(1, 2)]);
        assert_eq!(2.0, heights[grid.index(2, 3)]);
        assert_eq!(1.0, heights[grid.index(1, 1)]);
        assert_eq!(1.0, heights[grid.index(3, 3)]);
        assert_eq!(0.0, heights[grid.index(0, 2)]);
    }

    #[test]
    fn in_place_smoothing_reads_smoothed_neighbors() {
        let grid = Grid::try_new(4).unwrap();
        let mut heights = vec![0.0; grid.vertex_count()];
        heights[grid.index(2, 2)] = 16.0;
        smooth(&mut heights, &grid, Smoothing::InPlace);

        assert_eq!(1.0, heights[grid.index(1, 1)]);
        // Reads the smoothed height of (1, 1) rather than zero.
        assert_eq!(2.125, heights[grid.index(1, 2)]);
    }

    #[test]
    fn fault_sides() {
        let fault = FaultPlane::from_angle(E3::origin(), 0.0);

        assert_eq!(BinaryPartition::Front, fault.side(&E3::new(0.5, 3.0, -2.0)));
        assert_eq!(BinaryPartition::Back, fault.side(&E3::new(-0.5, 3.0, 2.0)));
        assert_eq!(BinaryPartition::Front, fault.side(&E3::new(0.0, -1.0, 0.0)));
    }

    #[test]
    fn random_faults_lie_in_extent() {
        let extent = Extent::new(-3.0, -2.0, 5.0, 6.0);
        let mut rng = rng();
        for _ in 0..100 {
            let fault = FaultPlane::random(&extent, &mut rng);

            assert!((-3.0..-2.0).contains(&fault.point.x));
            assert!((5.0..6.0).contains(&fault.point.y));
            assert_eq!(0.0, fault.normal.z);
            assert_abs_diff_eq!(1.0, fault.normal.norm(), epsilon = 1e-6);
        }
    }

    #[test]
    fn height_fraction_is_clamped() {
        let config = TerrainConfig::default().with_division(8);
        let terrain = Terrain::try_generate_with(&config, &mut rng()).unwrap();
        let highest = terrain.highest_height();

        assert!(highest > 0.0);
        assert_eq!(0.0, terrain.height_fraction(-1.0));
        assert_eq!(1.0, terrain.height_fraction(highest * 2.0));
        assert_abs_diff_eq!(0.5, terrain.height_fraction(highest / 2.0), epsilon = 1e-6);
    }

    #[test]
    fn reject_invalid_config() {
        let reject = |config: TerrainConfig, expected: &'static str| {
            match Terrain::try_generate_with(&config, &mut rng()) {
                Err(GeometryError::InvalidArgument { name, .. }) => assert_eq!(expected, name),
                result => panic!("expected invalid `{}`, got {:?}", expected, result),
            }
        };
        let config = TerrainConfig::default().with_division(4);

        reject(config.with_division(0), "division");
        reject(config.with_fault_count(0), "fault_count");
        reject(config.with_fault_delta(-1.0), "fault_delta");
        reject(config.with_fault_delta(f32::NAN), "fault_delta");
        reject(config.with_extent(Extent::new(1.0, 1.0, -1.0, 1.0)), "extent.x");
        reject(config.with_extent(Extent::new(-1.0, 1.0, 0.0, f32::INFINITY)), "extent.y");
        reject(config.with_extent(Extent::new(-f32::MAX, f32::MAX, -1.0, 1.0)), "extent.x");
        reject(config.with_extent(Extent::new(-1.0, 1.0, -f32::MAX, f32::MAX)), "extent.y");
    }
}
