//! Entry point for the LIF inspector.

mod config;
mod probe;

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec2;
use lif::{CameraInput, Convergence, LifDocument, LoadOptions, RenderCamera};
use log::{error, info, warn};
use rayon::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};
use walkdir::WalkDir;

use crate::config::Config;
use crate::probe::HeaderProbe;

const LIF_EXTENSIONS: &[&str] = &["jpg", "jpeg", "lif"];

fn main() -> Result<()> {
    // Initialize logging; default to "info" if RUST_LOG is unset.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = Config::parse();
    let files = collect_inputs(&cfg.input, cfg.recursive)?;
    if files.is_empty() {
        warn!("No LIF candidates under {}", cfg.input.display());
        return Ok(());
    }
    let total = files.len();
    info!("Inspecting {total} file(s)");

    if let Some(dir) = cfg.dump_blobs.as_ref() {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }

    let started = Instant::now();
    let results: Vec<(PathBuf, Result<String>)> = files
        .into_par_iter()
        .map(|path| {
            let out = inspect(&path, &cfg);
            (path, out)
        })
        .collect();

    let mut failures = 0usize;
    for (path, result) in results {
        match result {
            Ok(report) => println!("{report}"),
            Err(e) => {
                failures += 1;
                error!("{}: {:#}", path.display(), e);
            }
        }
    }

    info!(
        "Done in {:.2?}: {} ok, {} failed",
        started.elapsed(),
        total - failures,
        failures
    );

    if failures > 0 {
        anyhow::bail!("{failures} file(s) failed to load");
    }
    Ok(())
}

fn collect_inputs(input: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let meta = fs::metadata(input).with_context(|| format!("reading {}", input.display()))?;
    if meta.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }

    let depth = if recursive { usize::MAX } else { 1 };
    let mut files: Vec<PathBuf> = WalkDir::new(input)
        .max_depth(depth)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|s| s.to_str())
                .is_some_and(|ext| LIF_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        })
        .collect();
    files.sort();
    Ok(files)
}

fn inspect(path: &Path, cfg: &Config) -> Result<String> {
    let options = LoadOptions {
        decoder: Some(&HeaderProbe),
    };
    let doc = lif::read_file(path, &options).with_context(|| format!("loading {}", path.display()))?;
    doc.check_blobs().context("checking blob references")?;

    if let Some(dir) = cfg.dump_blobs.as_ref() {
        dump_blobs(&doc, path, dir)?;
    }

    let input = camera_input(&doc, cfg);
    let cameras: Vec<RenderCamera> = doc
        .scene
        .views
        .iter()
        .map(|v| RenderCamera::for_view(v, &input))
        .collect();

    if cfg.json {
        let report = serde_json::json!({
            "file": path.display().to_string(),
            "fields": doc.index.fields.iter().map(|f| (f.field_type, f.data.len())).collect::<Vec<_>>(),
            "scene": &doc.scene,
            "render_cameras": cameras,
        });
        return Ok(serde_json::to_string_pretty(&report)?);
    }

    let views = &doc.scene.views;
    let first = &views[0];
    Ok(format!(
        "{}: {} view(s), {}x{} f={:.1}px, {} layer(s), invd={:.4}, render f={:.1}px skew=({:.4},{:.4})",
        path.display(),
        views.len(),
        first.width_px,
        first.height_px,
        first.focal_px,
        first.layers.len(),
        input.convergence.invd(first),
        cameras[0].focal_px,
        cameras[0].skew.x,
        cameras[0].skew.y,
    ))
}

fn camera_input(doc: &LifDocument, cfg: &Config) -> CameraInput {
    let animation = doc.scene.animations.first();
    let focus = animation.and_then(|a| a.focus).unwrap_or(cfg.focus);
    let convergence = if cfg.stereo {
        Convergence::Stereo {
            fallback_focus: focus,
        }
    } else {
        Convergence::Focus(focus)
    };

    CameraInput {
        offset: animation.map(|a| a.position_at(cfg.time)).unwrap_or_default(),
        roll_degrees: 0.0,
        convergence,
        viewport: Vec2::new(cfg.viewport.0 as f32, cfg.viewport.1 as f32),
    }
}

fn dump_blobs(doc: &LifDocument, source: &Path, dir: &Path) -> Result<()> {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("lif");

    for (vi, view) in doc.scene.views.iter().enumerate() {
        for blob in view.blob_refs() {
            // The primary image is the source file itself.
            if blob.is_primary() {
                continue;
            }
            let bytes = doc.blob(blob)?;
            let out = dir.join(format!("{stem}_v{vi}_blob{}.bin", blob.blob_id));
            fs::write(&out, &bytes).with_context(|| format!("writing {}", out.display()))?;
        }
    }
    Ok(())
}
