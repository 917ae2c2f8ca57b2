use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use wavebands::{
    AnimationMode, AnimationSettings, Canvas, Fps, FrameIndex, GlobalRenderParams, ParameterStore,
    PatternPlan, RasterExporter, RenderParameters, Rgb8, StartOutcome, Studio, Vec2,
    VectorExporter, compute_frame_delta,
};

#[derive(Parser, Debug)]
#[command(name = "wavebands", version, about = "Layered wave-band pattern generator")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one frame as a PNG.
    Frame(FrameArgs),
    /// Export one frame as an SVG document.
    Svg(SvgArgs),
    /// Record the animation to a video clip.
    Record(RecordArgs),
    /// Print the effective parameters and geometry summary as JSON.
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
struct PatternArgs {
    /// Canvas width in pixels.
    #[arg(long)]
    width: Option<u32>,
    /// Canvas height in pixels.
    #[arg(long)]
    height: Option<u32>,
    /// Line pitch.
    #[arg(long)]
    spacing: Option<f64>,
    /// Bands on each side of the centre line.
    #[arg(long)]
    line_count: Option<u32>,
    /// Horizontal sampling interval.
    #[arg(long)]
    step: Option<f64>,
    /// Rotation in degrees.
    #[arg(long, allow_hyphen_values = true)]
    angle: Option<f64>,
    /// Falloff exponent.
    #[arg(long)]
    falloff: Option<f64>,
    /// Composite layers source-over instead of darken.
    #[arg(long, default_value_t = false)]
    no_blend: bool,
    /// Jitter seed.
    #[arg(long, allow_hyphen_values = true)]
    seed: Option<f64>,
    /// Show a layer by index (repeatable).
    #[arg(long = "show")]
    show: Vec<usize>,
    /// Hide a layer by index (repeatable).
    #[arg(long = "hide")]
    hide: Vec<usize>,
    /// Base vector of a layer as `INDEX=X,Y` (repeatable).
    #[arg(long = "vector", value_parser = parse_layer_vector, allow_hyphen_values = true)]
    vectors: Vec<(usize, Vec2)>,
    /// Background color as `#rrggbb`.
    #[arg(long, value_parser = parse_color)]
    background: Option<Rgb8>,
    /// Fill color of a layer as `INDEX=#rrggbb` (repeatable).
    #[arg(long = "color", value_parser = parse_layer_color)]
    colors: Vec<(usize, Rgb8)>,
}

#[derive(Args, Debug)]
struct AnimationArgs {
    /// Enable animation.
    #[arg(long, default_value_t = false)]
    animate: bool,
    /// Animation mode: drift or loop.
    #[arg(long)]
    mode: Option<AnimationMode>,
    /// Frames per second.
    #[arg(long)]
    fps: Option<u32>,
    /// Loop period and capture duration, in seconds.
    #[arg(long)]
    seconds: Option<f64>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    pattern: PatternArgs,
    #[command(flatten)]
    animation: AnimationArgs,
    /// Frame index (0-based).
    #[arg(long, default_value_t = 0)]
    frame: u64,
    /// Integer scale factor.
    #[arg(long, default_value_t = 4)]
    scale: u32,
    /// Output directory.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct SvgArgs {
    #[command(flatten)]
    pattern: PatternArgs,
    #[command(flatten)]
    animation: AnimationArgs,
    /// Frame index (0-based).
    #[arg(long, default_value_t = 0)]
    frame: u64,
    /// Output directory.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct RecordArgs {
    #[command(flatten)]
    pattern: PatternArgs,
    #[command(flatten)]
    animation: AnimationArgs,
    /// Stop early after this many seconds of animation.
    #[arg(long)]
    stop_after: Option<f64>,
    /// Output directory.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    #[command(flatten)]
    pattern: PatternArgs,
    #[command(flatten)]
    animation: AnimationArgs,
    /// Frame index (0-based).
    #[arg(long, default_value_t = 0)]
    frame: u64,
}

fn main() -> anyhow::Result<()> {
    initialise_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Svg(args) => cmd_svg(args),
        Command::Record(args) => cmd_record(args),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let store = build_store(&args.pattern, &args.animation)?;
    let plan = plan_at(&store, args.frame);
    let artifact = RasterExporter::new().export(&plan, args.scale)?;
    let path = artifact.save_in(&args.out_dir)?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn cmd_svg(args: SvgArgs) -> anyhow::Result<()> {
    let store = build_store(&args.pattern, &args.animation)?;
    let plan = plan_at(&store, args.frame);
    let artifact = VectorExporter::new().export(&plan);
    let path = artifact.save_in(&args.out_dir)?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn cmd_record(args: RecordArgs) -> anyhow::Result<()> {
    let mut store = build_store(&args.pattern, &args.animation)?;
    store.set_animation_enabled(true);
    let fps = store.animation().fps;
    let stop_frame = args.stop_after.map(|s| fps.secs_to_frames_round(s.max(0.0)));

    let mut studio = Studio::with_default_recorder(store);
    // Offline rendering runs on a virtual clock: frame `i` happens at `t0 + i / fps`.
    let t0 = Instant::now();
    if let StartOutcome::Rejected(reason) = studio.start_capture(t0) {
        anyhow::bail!(
            "capture did not start ({reason:?}): {}",
            studio.capture().status()
        );
    }

    let mut i = 0u64;
    while studio.capture().is_recording() {
        let now = t0 + Duration::from_secs_f64(fps.frames_to_secs(i));
        if stop_frame.is_some_and(|f| i >= f) {
            studio.stop_capture(now);
            break;
        }
        studio.tick(now)?;
        i += 1;
    }

    let clip = studio
        .take_capture_artifact()
        .ok_or_else(|| anyhow::anyhow!("capture failed: {}", studio.capture().status()))?;
    let path = clip.save_in(&args.out_dir)?;
    eprintln!("wrote {} ({i} frames)", path.display());
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let store = build_store(&args.pattern, &args.animation)?;
    let params = store.snapshot();
    let animation = *store.animation();
    let delta = compute_frame_delta(&animation.at(FrameIndex(args.frame)), params.layer_count());
    let plan = PatternPlan::build(&params, &delta);

    let layers: Vec<_> = plan
        .layers
        .iter()
        .map(|l| {
            serde_json::json!({
                "index": l.layer,
                "name": l.name,
                "color": l.color.to_hex(),
                "bands": l.bands.len(),
                "vertices": l.bands.iter().map(|b| b.points.len()).sum::<usize>(),
            })
        })
        .collect();
    let summary = serde_json::json!({
        "frame": args.frame,
        "params": params,
        "animation": animation,
        "delta": delta,
        "blend": plan.blend,
        "layers": layers,
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&summary).context("serialize inspect summary")?
    );
    Ok(())
}

fn plan_at(store: &ParameterStore, frame: u64) -> PatternPlan {
    let params = store.snapshot();
    let state = store.animation().at(FrameIndex(frame));
    PatternPlan::build(&params, &compute_frame_delta(&state, params.layer_count()))
}

fn build_store(p: &PatternArgs, a: &AnimationArgs) -> anyhow::Result<ParameterStore> {
    let defaults = Canvas::default();
    let canvas = Canvas {
        width: p.width.unwrap_or(defaults.width),
        height: p.height.unwrap_or(defaults.height),
    };
    if canvas.width == 0 || canvas.height == 0 {
        anyhow::bail!("canvas width/height must be non-zero");
    }

    let base = GlobalRenderParams::for_canvas(canvas);
    let mut params = RenderParameters {
        canvas,
        globals: GlobalRenderParams {
            spacing: p.spacing.unwrap_or(base.spacing),
            line_count: p.line_count.unwrap_or(base.line_count),
            sample_step: p.step.unwrap_or(base.sample_step),
            rotation_deg: p.angle.unwrap_or(base.rotation_deg),
            falloff: p.falloff.unwrap_or(base.falloff),
            blend_enabled: !p.no_blend,
            ..base
        }
        .sanitized(),
        ..RenderParameters::default()
    };
    if let Some(seed) = p.seed {
        params.seed = seed;
    }

    let mut animation = AnimationSettings {
        enabled: a.animate,
        ..AnimationSettings::default()
    };
    if let Some(mode) = a.mode {
        animation.mode = mode;
    }
    if let Some(fps) = a.fps {
        animation.fps = Fps::new(fps, 1)?;
    }

    let mut store = ParameterStore::new(params, animation);
    if let Some(secs) = a.seconds {
        store.set_loop_seconds(secs);
    }
    for &i in &p.show {
        store.set_layer_visible(i, true)?;
    }
    for &i in &p.hide {
        store.set_layer_visible(i, false)?;
    }
    if let Some(bg) = p.background {
        store.set_background(bg);
    }
    for &(i, c) in &p.colors {
        store
            .set_layer_color(i, c)
            .with_context(|| format!("--color {i}={}", c.to_hex()))?;
    }
    for &(i, v) in &p.vectors {
        store
            .set_layer_vector(i, v)
            .with_context(|| format!("--vector {i}={},{}", v.x, v.y))?;
    }
    Ok(store)
}

fn parse_layer_vector(s: &str) -> Result<(usize, Vec2), String> {
    let (index, xy) = s
        .split_once('=')
        .ok_or_else(|| format!("expected INDEX=X,Y, got '{s}'"))?;
    let (x, y) = xy
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y after '=', got '{xy}'"))?;
    let index = index
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("bad layer index '{index}': {e}"))?;
    let x = x.trim().parse::<f64>().map_err(|e| format!("bad x '{x}': {e}"))?;
    let y = y.trim().parse::<f64>().map_err(|e| format!("bad y '{y}': {e}"))?;
    Ok((index, Vec2::new(x, y)))
}

fn parse_color(s: &str) -> Result<Rgb8, String> {
    Rgb8::from_hex(s.trim()).map_err(|e| e.to_string())
}

fn parse_layer_color(s: &str) -> Result<(usize, Rgb8), String> {
    let (index, hex) = s
        .split_once('=')
        .ok_or_else(|| format!("expected INDEX=#rrggbb, got '{s}'"))?;
    let index = index
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("bad layer index '{index}': {e}"))?;
    Ok((index, parse_color(hex)?))
}
