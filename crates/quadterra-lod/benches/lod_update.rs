use std::f32::consts::FRAC_PI_3;
use std::sync::Arc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use glam::{Vec2, Vec3};
use quadterra_heightfield::{FbmParams, Heightfield};
use quadterra_lod::*;

fn build_terrain() -> Terrain {
    let heightfield = Heightfield::procedural(4096, &FbmParams::default()).unwrap();
    let mut terrain = Terrain::new();
    terrain.set_heightfield(Arc::new(heightfield));
    terrain.set_chunk_size(32);
    terrain.set_transform(TerrainTransform {
        size: Vec2::splat(8192.0),
        height_scale: 600.0,
        ..Default::default()
    });
    terrain.generate().unwrap();
    terrain
}

fn camera(eye: Vec3) -> CameraState {
    CameraState::look_at(
        eye,
        Vec3::new(4096.0, 4096.0, 0.0),
        Vec3::Z,
        FRAC_PI_3,
        16.0 / 9.0,
        1080.0,
        0.5,
        50_000.0,
    )
}

fn bench_converged_update(c: &mut Criterion) {
    let mut terrain = build_terrain();
    let cam = camera(Vec3::new(1000.0, 1200.0, 700.0));
    terrain.update(&cam);

    c.bench_function("lod_update_converged", |bencher| {
        bencher.iter(|| black_box(terrain.update(black_box(&cam))))
    });
}

fn bench_moving_camera(c: &mut Criterion) {
    let mut terrain = build_terrain();
    let path: Vec<CameraState> = (0..64)
        .map(|i| {
            let t = i as f32 / 64.0;
            camera(Vec3::new(500.0 + t * 7000.0, 800.0 + t * 5000.0, 400.0 + t * 300.0))
        })
        .collect();
    let mut frame = 0;

    c.bench_function("lod_update_moving", |bencher| {
        bencher.iter(|| {
            let stats = terrain.update(&path[frame % path.len()]);
            frame += 1;
            black_box(stats)
        })
    });
}

fn bench_measure(c: &mut Criterion) {
    let heightfield = Heightfield::procedural(1024, &FbmParams::default()).unwrap();
    let mapper = CoordinateMapper::new(Arc::new(heightfield), TerrainTransform::default());
    let cam = camera(Vec3::new(100.0, 100.0, 300.0));
    let selector = LodSelector::new(
        &mapper,
        GeometryGenerator::new(PrimitiveMode::Triangles, 8),
        LodThresholds::new(10.0, LodThresholds::DEFAULT_MERGE_RATIO).unwrap(),
        5,
        32,
        &cam,
    );
    let bounds = UvRect::new(Vec2::new(0.25, 0.5), 0.125);

    c.bench_function("lod_measure_chunk", |bencher| {
        bencher.iter(|| black_box(selector.measure(black_box(&bounds))))
    });
}

criterion_group!(
    benches,
    bench_converged_update,
    bench_moving_camera,
    bench_measure
);
criterion_main!(benches);
