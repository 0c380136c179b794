use std::{
    io::{BufWriter, Write as _},
    path::PathBuf,
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use serde_json::json;

use scrollcine::{
    EffectFrame, ElementId, Face, Millis, ScrollStage, SnapshotPair, SolidFillCapturer,
    StageFrame, StageManifest, TileConfig, TileGrid, Viewport, capture_pair,
};

#[derive(Parser, Debug)]
#[command(name = "scrollcine", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Drive a stage manifest across its scroll range and print one JSON line per frame.
    Sweep(SweepArgs),
    /// Print the tile grid and stagger offsets for a viewport as JSON.
    Grid(GridArgs),
}

#[derive(Parser, Debug)]
struct SweepArgs {
    /// Input stage manifest JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Scroll distance between sampled frames, in pixels.
    #[arg(long, default_value_t = 50.0)]
    step: f64,

    /// Sweep from the bottom of the page to the top.
    #[arg(long, default_value_t = false)]
    backward: bool,

    /// Run with the reduced-motion preference set.
    #[arg(long, default_value_t = false)]
    reduced_motion: bool,
}

#[derive(Parser, Debug)]
struct GridArgs {
    #[arg(long)]
    width: u32,

    #[arg(long)]
    height: u32,

    /// Treat the viewport as coarse-pointer (touch) input.
    #[arg(long, default_value_t = false)]
    coarse: bool,

    /// Override the stagger seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Write a PNG of the grid at zone progress `--at`, using flat-colour snapshots.
    #[arg(long)]
    preview: Option<PathBuf>,

    /// Zone progress for `--preview`.
    #[arg(long, default_value_t = 0.5)]
    at: f64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Sweep(args) => cmd_sweep(args),
        Command::Grid(args) => cmd_grid(args),
    }
}

fn cmd_sweep(args: SweepArgs) -> anyhow::Result<()> {
    anyhow::ensure!(
        args.step.is_finite() && args.step > 0.0,
        "--step must be finite and > 0"
    );
    let manifest = StageManifest::from_path(&args.in_path)
        .with_context(|| format!("load manifest '{}'", args.in_path.display()))?;
    let host = manifest.host();
    let capturer = SolidFillCapturer::default();
    let mut stage = ScrollStage::from_manifest(&manifest, &host)?;
    stage.set_reduced_motion(args.reduced_motion);
    stage.on_idle(&capturer, Millis(0));

    let total = stage.registry().total_scroll_px();
    let frames = (total / args.step).ceil() as u64;
    let mut out = BufWriter::new(std::io::stdout().lock());
    for i in 0..=frames {
        let travelled = (i as f64 * args.step).min(total);
        let offset = if args.backward {
            total - travelled
        } else {
            travelled
        };
        let now = Millis(i * 16);
        let frame = stage.on_scroll(offset, &host, &capturer, now);
        serde_json::to_writer(&mut out, &sweep_line(&frame)).context("write sweep line")?;
        writeln!(out)?;
        // Queued warm-ups run between frames.
        stage.on_idle(&capturer, now);
    }
    out.flush()?;
    Ok(())
}

fn sweep_line(frame: &StageFrame) -> serde_json::Value {
    let transition = frame.transition.as_ref().map(|t| {
        let (effect, detail) = match &t.effect {
            EffectFrame::Swap { visible } => ("swap", json!({ "visible": visible })),
            EffectFrame::Crossfade {
                outgoing_opacity,
                incoming_opacity,
                ..
            } => (
                "crossfade",
                json!({ "outgoing_opacity": outgoing_opacity, "incoming_opacity": incoming_opacity }),
            ),
            EffectFrame::Tiles { tiles, complete } => {
                let flipped = tiles.iter().filter(|f| f.face == Face::Back).count();
                (
                    "tiles",
                    json!({ "tiles": tiles.len(), "flipped": flipped, "complete": complete }),
                )
            }
        };
        json!({
            "boundary": t.boundary.to_string(),
            "effect": effect,
            "progress": t.progress,
            "detail": detail,
        })
    });
    json!({
        "offset": frame.offset,
        "scene": frame.scene,
        "progress": frame.progress.value,
        "direction": frame.progress.direction,
        "phase": frame.phase.phase,
        "active_index": frame.phase.active_index,
        "values": frame.values.len(),
        "transition": transition,
    })
}

fn cmd_grid(args: GridArgs) -> anyhow::Result<()> {
    let viewport = Viewport::new(args.width, args.height)?.with_coarse_pointer(args.coarse);
    let mut cfg = TileConfig::default();
    if let Some(seed) = args.seed {
        cfg.stagger.seed = seed;
    }
    cfg.validate()?;
    let grid = TileGrid::build(viewport, &cfg);

    let report = json!({
        "viewport": viewport.key().to_string(),
        "tile_edge": cfg.tile_edge_for(viewport),
        "cols": grid.dims().cols,
        "rows": grid.dims().rows,
        "tiles": grid.tiles(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    if let Some(path) = &args.preview {
        write_preview(grid, viewport, args.at, path)?;
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

fn write_preview(
    grid: TileGrid,
    viewport: Viewport,
    at: f64,
    path: &std::path::Path,
) -> anyhow::Result<()> {
    let (outgoing, incoming) = (ElementId::new("outgoing"), ElementId::new("incoming"));
    let (o, i) = capture_pair(&SolidFillCapturer::default(), &outgoing, &incoming, viewport)?;
    let grid = grid.with_snapshots(Arc::new(SnapshotPair {
        key: viewport.key(),
        outgoing: o,
        incoming: i,
        created_at: Millis(0),
    }));

    let mut canvas = image::RgbaImage::new(viewport.width, viewport.height);
    for (tile, frame) in grid.tiles().iter().zip(grid.sample(at)) {
        let face = grid.face_image(tile, frame.face)?;
        image::imageops::replace(
            &mut canvas,
            &face,
            i64::from(tile.rect.x),
            i64::from(tile.rect.y),
        );
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    canvas
        .save(path)
        .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}
