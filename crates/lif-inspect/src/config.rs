use clap::Parser;
use std::path::PathBuf;

/// `lif_inspect` - load LIF layered-depth-image files and report what a renderer would see.
///
/// Each file is decoded, its metadata normalized to the canonical view model, and every blob
/// reference checked. Directories are scanned for `.jpg`/`.jpeg`/`.lif` files.
#[derive(Parser, Debug, Clone)]
#[command(name = "lif_inspect", version, about, long_about = None)]
pub struct Config {
    /// A LIF file or a directory containing LIF files.
    #[arg(long, env = "LIF_INPUT")]
    pub input: PathBuf,

    /// Descend into subdirectories when `input` is a directory.
    #[arg(long, default_value_t = false)]
    pub recursive: bool,

    /// Print the normalized scene as JSON instead of a one-line summary.
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Convergence focus in [0, 1]: 0 = back-most geometry, 1 = nearest.
    #[arg(long, default_value_t = 0.5, env = "LIF_FOCUS")]
    pub focus: f32,

    /// Use the stored stereo convergence distance when a view has one.
    #[arg(long, default_value_t = false)]
    pub stereo: bool,

    /// Animation time in seconds at which to evaluate the render camera.
    #[arg(long, default_value_t = 0.0)]
    pub time: f32,

    /// Output viewport, e.g. `1920x1080`.
    #[arg(long, value_parser = parse_viewport, default_value = "1920x1080")]
    pub viewport: (u32, u32),

    /// Write every resolved blob of every view into this directory.
    #[arg(long)]
    pub dump_blobs: Option<PathBuf>,
}

fn parse_viewport(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let w = w.trim().parse::<u32>().map_err(|e| e.to_string())?;
    let h = h.trim().parse::<u32>().map_err(|e| e.to_string())?;
    if w == 0 || h == 0 {
        return Err("viewport dimensions must be > 0".into());
    }
    Ok((w, h))
}
