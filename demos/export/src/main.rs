//! Writes generated meshes to standard output as OBJ.
//!
//! ```text
//! demo-export sphere [DEPTH]
//! demo-export spheres [COUNT] [SEED]
//! demo-export terrain [DIVISION] [SEED]
//! demo-export mesh PATH
//! ```
//!
//! Set `RUST_LOG=terrane=debug` to log each generation phase.

use anyhow::{bail, Context};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::env;
use std::fs;
use std::io::{self, Write};
use std::str::FromStr;
use terrane::buffer::{MeshBuffer, TriangleSoup};
use terrane::encoding::NormalEncoding;
use terrane::mesh::TriMesh;
use terrane::prelude::*;
use terrane::primitive::scatter::{self, ScatterConfig};
use terrane::primitive::sphere::GeodesicSphere;
use terrane::primitive::terrain::{Terrain, TerrainConfig};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let arguments = env::args().skip(1).collect::<Vec<_>>();
    let arguments = arguments.iter().map(String::as_str).collect::<Vec<_>>();
    let buffer = match arguments.as_slice() {
        ["sphere", tail @ ..] => {
            let depth = parse_or(tail.first(), 4i32, "depth")?;
            GeodesicSphere::try_from(depth)?
                .tessellate()
                .into_mesh_buffer()?
        }
        ["spheres", tail @ ..] => {
            let count = parse_or(tail.first(), 16usize, "count")?;
            let mut rng = rng(tail.get(1))?;
            scattered_spheres(count, &mut rng)?
        }
        ["terrain", tail @ ..] => {
            let division = parse_or(tail.first(), 128usize, "division")?;
            let config = TerrainConfig::default().with_division(division);
            let terrain = Terrain::try_generate_with(&config, &mut rng(tail.get(1))?)?;
            log::info!(
                "terrain heights span [{}, {}]",
                terrain.lowest_height(),
                terrain.highest_height()
            );
            terrain.into_buffer()
        }
        ["mesh", path] => {
            let text = fs::read_to_string(path).with_context(|| format!("failed to read `{}`", path))?;
            let mut mesh = TriMesh::new();
            mesh.load_from_text(&text)
                .with_context(|| format!("failed to load `{}`", path))?;
            if let Some(aabb) = mesh.aabb() {
                log::info!("mesh bounds {:?} to {:?}", aabb.min, aabb.max);
            }
            match mesh.into_buffer() {
                Some(buffer) => buffer,
                None => bail!("mesh `{}` was not loaded", path),
            }
        }
        _ => bail!("usage: demo-export (sphere [DEPTH] | spheres [COUNT] [SEED] | terrain [DIVISION] [SEED] | mesh PATH)"),
    };

    let stdout = io::stdout();
    let mut stdout = stdout.lock();
    let n = buffer.to_obj(NormalEncoding::Include, &mut stdout)?;
    stdout.flush()?;
    log::info!(
        "wrote {} bytes: {} vertices, {} triangles",
        n,
        buffer.vertex_count(),
        buffer.triangle_count()
    );
    Ok(())
}

// Places copies of one tessellation and merges them into a single buffer.
fn scattered_spheres(count: usize, rng: &mut StdRng) -> anyhow::Result<MeshBuffer> {
    let sphere = GeodesicSphere::try_new(3)?.tessellate();
    let instances = scatter::scatter(&ScatterConfig::new(count), rng)?;
    let (positions, normals) = instances
        .iter()
        .map(|instance| sphere.instanced(instance).into_raw_buffers())
        .fold((Vec::new(), Vec::new()), |(mut positions, mut normals), (p, n)| {
            positions.extend(p);
            normals.extend(n);
            (positions, normals)
        });
    Ok(TriangleSoup::from_raw_buffers(positions, normals)?.into_mesh_buffer()?)
}

fn rng(seed: Option<&&str>) -> anyhow::Result<StdRng> {
    Ok(match seed {
        Some(seed) => StdRng::seed_from_u64(
            u64::from_str(seed).with_context(|| format!("invalid seed `{}`", seed))?,
        ),
        None => StdRng::from_entropy(),
    })
}

fn parse_or<T>(argument: Option<&&str>, default: T, name: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match argument {
        Some(argument) => T::from_str(argument).with_context(|| format!("invalid {} `{}`", name, argument)),
        None => Ok(default),
    }
}
