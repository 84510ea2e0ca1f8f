//! Example: Render the hero backdrop to a PNG sequence.
//!
//! Run with:
//!     cargo run --example render_frames -- --frames 60 --out frames
//!
//! Set `RUST_LOG=info` to see scene and renderer logs.

use anyhow::{bail, Context};
use clap::Parser;
use prismfield::pipeline::{render_sequence, RenderBackend, SequenceConfig};
use prismfield::SceneConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
struct Args {
    /// scene config JSON (defaults when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// output directory
    #[arg(long, default_value = "frames")]
    out: PathBuf,

    /// number of frames to render
    #[arg(long, default_value_t = 90)]
    frames: u32,

    #[arg(long, default_value_t = 30)]
    fps: u32,

    #[arg(long, default_value_t = 960)]
    width: u32,

    #[arg(long, default_value_t = 540)]
    height: u32,

    /// software or gpu
    #[arg(long, default_value = "software")]
    backend: String,

    /// fix the particle seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut scene_config = match &args.config {
        Some(path) => SceneConfig::from_path(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SceneConfig::default(),
    };
    if args.seed.is_some() {
        scene_config.seed = args.seed;
    }

    let Some(backend) = RenderBackend::from_str(&args.backend) else {
        bail!("unknown backend '{}', expected software or gpu", args.backend);
    };

    let sequence = SequenceConfig {
        width: args.width,
        height: args.height,
        fps: args.fps,
        frames: args.frames,
        backend,
        ..Default::default()
    };

    println!("Prismfield - PNG Sequence");
    println!("=========================\n");
    println!("  Resolution: {}x{}", sequence.width, sequence.height);
    println!("  Frames: {} at {} fps", sequence.frames, sequence.fps);
    println!("  Particles: {}", scene_config.particle_count);
    println!("  Output: {}\n", args.out.display());

    let progress: Box<dyn Fn(f32) + Send> = Box::new(|p| {
        let percent = (p * 100.0).round() as u32;
        if percent % 10 == 0 {
            println!("  Progress: {}%", percent);
        }
    });

    let summary = render_sequence(scene_config, &sequence, &args.out, Some(progress)).await?;

    println!(
        "\nDone! {} frames written ({} skipped) with the {} backend, seed {}",
        summary.frames_written,
        summary.frames_skipped,
        summary.backend.name(),
        summary.seed
    );

    Ok(())
}
