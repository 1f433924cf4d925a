//! Headless demo that flies a camera over a heightmap terrain and reports the
//! LOD tree's behaviour.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p quadterra-demo -- --frames 600 --patches true`.

mod flight;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use clap::Parser;
use glam::{Vec2, Vec3};
use quadterra_config::{CliArgs, Config, ConfigError, HeightfieldConfig, TerrainConfig};
use quadterra_heightfield::{FbmParams, Heightfield, HeightfieldError};
use quadterra_lod::{
    CoordinateMapper, SharedTerrain, Terrain, TerrainError, TerrainTransform, UpdateStats,
};
use tracing::{info, warn};

use crate::flight::Flight;

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("heightfield: {0}")]
    Heightfield(#[from] HeightfieldError),
    #[error("terrain: {0}")]
    Terrain(#[from] TerrainError),
}

/// What the render-side reader thread observed.
#[derive(Debug, Default)]
struct ReaderReport {
    snapshots: usize,
    max_visible: usize,
    max_primitives: usize,
}

fn load_heightfield(config: &HeightfieldConfig) -> Result<Heightfield, HeightfieldError> {
    match &config.path {
        Some(path) => Heightfield::load(path),
        None => {
            let params = FbmParams {
                seed: config.seed,
                octaves: config.octaves,
                lacunarity: config.lacunarity,
                persistence: config.persistence,
                base_frequency: config.base_frequency,
            };
            info!(
                resolution = config.resolution,
                seed = config.seed,
                "Generating procedural heightfield"
            );
            Heightfield::procedural(config.resolution, &params)
        }
    }
}

fn transform_from_config(config: &TerrainConfig) -> TerrainTransform {
    TerrainTransform {
        origin: Vec3::from_array(config.origin),
        size: Vec2::from_array(config.size),
        height_scale: config.height_scale,
        height_offset: config.height_offset,
    }
}

fn build_terrain(config: &TerrainConfig, heightfield: Arc<Heightfield>) -> Terrain {
    let mut terrain = Terrain::new();
    terrain.set_heightfield(heightfield);
    terrain.set_chunk_size(config.chunk_size);
    terrain.set_target_triangle_width(config.target_triangle_width);
    terrain.set_merge_ratio(config.merge_ratio);
    terrain.set_grid_resolution(config.grid_resolution);
    terrain.set_generate_patches(config.generate_patches);
    terrain.set_update_enabled(config.update_enabled);
    terrain.set_transform(transform_from_config(config));
    terrain
}

/// Poll visible snapshots until `done` is set, the way a render thread would.
fn run_reader(terrain: &SharedTerrain, done: &AtomicBool) -> ReaderReport {
    let mut report = ReaderReport::default();
    while !done.load(Ordering::Acquire) {
        let snapshot = terrain.visible_snapshot();
        let primitives = snapshot
            .iter()
            .map(|chunk| chunk.geometry.primitive_count())
            .sum();
        report.snapshots += 1;
        report.max_visible = report.max_visible.max(snapshot.len());
        report.max_primitives = report.max_primitives.max(primitives);
        thread::yield_now();
    }
    report
}

fn main() -> Result<(), DemoError> {
    let args = CliArgs::parse();
    let config_dir = args.config_dir()?;

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    let file_logging = cfg!(debug_assertions) && config.debug.log_to_file;
    if let Some(path) = quadterra_log::init_logging(Some(&log_dir), file_logging, Some(&config)) {
        info!(path = %path.display(), "Writing JSON log");
    }

    let heightfield = Arc::new(load_heightfield(&config.heightfield)?);
    let mapper = CoordinateMapper::new(heightfield.clone(), transform_from_config(&config.terrain));
    let terrain = SharedTerrain::new(build_terrain(&config.terrain, heightfield));
    terrain.generate()?;
    if let Some(max_depth) = terrain.lock().max_depth() {
        info!(max_depth, "Terrain ready");
    }

    let demo = &config.demo;
    let flight = Flight::diagonal(demo.frames, config.camera.clone());
    let total_frames = demo.frames + demo.settle_frames;
    let done = AtomicBool::new(false);

    let (totals, settled_at, report) = thread::scope(|scope| {
        let reader = thread::Builder::new()
            .name("render".into())
            .spawn_scoped(scope, || run_reader(&terrain, &done));

        let mut totals = UpdateStats::default();
        let mut settled_at = None;
        for frame in 0..total_frames {
            let stats = terrain.update(&flight.camera_at(frame, &mapper));
            totals.splits += stats.splits;
            totals.merges += stats.merges;
            totals.removed += stats.removed;
            totals.generated += stats.generated;

            if frame >= demo.frames {
                if stats.is_structural_change() {
                    settled_at = None;
                } else if settled_at.is_none() {
                    settled_at = Some(frame);
                }
            }
            if demo.stats_interval > 0 && frame % demo.stats_interval == 0 {
                info!(
                    frame,
                    visited = stats.visited,
                    splits = stats.splits,
                    merges = stats.merges,
                    culled = stats.culled,
                    visible = stats.visible,
                    "LOD pass"
                );
            }
        }

        done.store(true, Ordering::Release);
        let report = match reader {
            Ok(handle) => handle.join().unwrap_or_default(),
            Err(err) => {
                warn!(error = %err, "Reader thread failed to start");
                ReaderReport::default()
            }
        };
        (totals, settled_at, report)
    });

    info!(
        frames = total_frames,
        splits = totals.splits,
        merges = totals.merges,
        removed = totals.removed,
        generated = totals.generated,
        "Flight finished"
    );
    info!(
        snapshots = report.snapshots,
        max_visible = report.max_visible,
        max_primitives = report.max_primitives,
        "Reader thread summary"
    );
    match settled_at {
        Some(frame) => info!(frame, "LOD converged after the camera stopped"),
        None if demo.settle_frames == 0 => {}
        None => warn!(
            settle_frames = demo.settle_frames,
            "LOD still changing at the final camera position"
        ),
    }

    Ok(())
}
