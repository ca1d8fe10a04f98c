use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use terrane::mesh::TriMesh;
use terrane::prelude::*;
use terrane::primitive::sphere::GeodesicSphere;
use terrane::primitive::terrain::{Terrain, TerrainConfig};

const SPHERE_DEPTH: usize = 6;
const TERRAIN_DIVISION: usize = 128;

fn sphere(criterion: &mut Criterion) {
    let sphere = GeodesicSphere::try_new(SPHERE_DEPTH).unwrap();
    criterion.bench_function("tessellate_sphere", move |bencher| {
        bencher.iter(|| sphere.tessellate())
    });
}

fn terrain(criterion: &mut Criterion) {
    let config = TerrainConfig::default().with_division(TERRAIN_DIVISION);
    criterion.bench_function("generate_terrain", move |bencher| {
        bencher.iter_batched(
            || StdRng::seed_from_u64(0),
            |mut rng| Terrain::try_generate_with(&config, &mut rng).unwrap(),
            BatchSize::SmallInput,
        )
    });
}

fn load(criterion: &mut Criterion) {
    // Export a sphere to OBJ so that the load includes decoding and normals.
    let mut obj = Vec::new();
    GeodesicSphere::try_new(4)
        .unwrap()
        .tessellate()
        .to_obj(Default::default(), &mut obj)
        .unwrap();
    let text = String::from_utf8(obj).unwrap();
    criterion.bench_function("load_mesh", move |bencher| {
        bencher.iter_batched(
            TriMesh::new,
            |mut mesh| mesh.load_from_text(&text).unwrap(),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, sphere, terrain, load);
criterion_main!(benches);
