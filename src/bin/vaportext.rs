use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use vaportext::{
    Fps, Phase, Surface, VaporSource, VaporizeConfig, VaporizeSession, WaveSession,
    render_cpu::composite_over,
};

#[derive(Parser, Debug)]
#[command(name = "vaportext", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the effect at one point in time as a PNG.
    Frame(FrameArgs),
    /// Render the whole run as a PNG sequence.
    Render(RenderArgs),
    /// Render the wave backdrop alone as a PNG.
    Wave(WaveArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input vaporize config JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Seconds into the run, stepped at `--fps`.
    #[arg(long, default_value_t = 0.0)]
    at_secs: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Output width in device pixels.
    #[arg(long, default_value_t = 960)]
    width: u32,

    /// Output height in device pixels.
    #[arg(long, default_value_t = 540)]
    height: u32,

    /// Device pixel ratio the source is rasterized at.
    #[arg(long, default_value_t = 2.0)]
    dpr: f64,

    /// Frames per second the run is stepped at.
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Skip the wave backdrop and keep the alpha channel.
    #[arg(long)]
    transparent: bool,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input vaporize config JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory for the PNG sequence.
    #[arg(long)]
    out_dir: PathBuf,

    /// Output width in device pixels.
    #[arg(long, default_value_t = 960)]
    width: u32,

    /// Output height in device pixels.
    #[arg(long, default_value_t = 540)]
    height: u32,

    /// Device pixel ratio the source is rasterized at.
    #[arg(long, default_value_t = 2.0)]
    dpr: f64,

    /// Frames per second.
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Stop after this many seconds even if the run has not completed.
    #[arg(long, default_value_t = 10.0)]
    max_secs: f64,
}

#[derive(Parser, Debug)]
struct WaveArgs {
    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Output width in device pixels.
    #[arg(long, default_value_t = 960)]
    width: u32,

    /// Output height in device pixels.
    #[arg(long, default_value_t = 540)]
    height: u32,

    /// Shader clock position, in seconds of wall time.
    #[arg(long, default_value_t = 0.0)]
    at_secs: f64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
        Command::Wave(args) => cmd_wave(args),
    }
}

fn read_config(path: &Path) -> anyhow::Result<VaporizeConfig> {
    let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
    let r = BufReader::new(f);
    let mut config: VaporizeConfig =
        serde_json::from_reader(r).with_context(|| "parse vaporize config JSON")?;

    let root = path.parent().unwrap_or_else(|| Path::new("."));
    resolve_font_source(&mut config, root);
    Ok(config)
}

/// Relative font paths in the config resolve against the config file's
/// directory.
fn resolve_font_source(config: &mut VaporizeConfig, root: &Path) {
    if let VaporSource::Text { font, .. } = &mut config.source {
        let p = Path::new(&font.source);
        if !font.source.is_empty() && p.is_relative() {
            font.source = root.join(p).to_string_lossy().into_owned();
        }
    }
}

fn write_png(path: &Path, data: &[u8], width: u32, height: u32) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        path,
        data,
        width,
        height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let config = read_config(&args.in_path)?;
    let fps = Fps::new(args.fps, 1)?;
    let dt = fps.frame_duration_secs();

    let surface = Surface::new(args.width, args.height, args.dpr)?;
    let mut session = VaporizeSession::new(config, surface, || {})?;
    session.start();

    let steps = (args.at_secs.max(0.0) * fps.as_f64()).round() as u64;
    for _ in 0..steps {
        session.advance(dt);
    }

    let png = if args.transparent {
        session.surface().to_straight_rgba()
    } else {
        let mut wave = WaveSession::new(Surface::new(args.width, args.height, 1.0)?);
        wave.render(steps as f64 * dt);
        let mut frame = wave.surface().clone();
        composite_over(&mut frame, session.surface())?;
        frame.to_straight_rgba()
    };

    write_png(&args.out, &png, args.width, args.height)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let config = read_config(&args.in_path)?;
    let fps = Fps::new(args.fps, 1)?;
    let dt = fps.frame_duration_secs();

    let surface = Surface::new(args.width, args.height, args.dpr)?;
    let mut session = VaporizeSession::new(config, surface, || {})?;
    let mut wave = WaveSession::new(Surface::new(args.width, args.height, 1.0)?);
    session.start();

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    let max_frames = (args.max_secs.max(0.0) * fps.as_f64()).ceil() as u64;
    let mut frames_written = 0u64;
    for i in 0..=max_frames {
        if i > 0 {
            session.advance(dt);
            wave.render(dt);
        } else {
            // Frame 0 is the at-rest paint from construction.
            wave.render(0.0);
        }

        let mut frame = wave.surface().clone();
        composite_over(&mut frame, session.surface())?;
        let out = args.out_dir.join(format!("frame_{i:05}.png"));
        write_png(&out, &frame.to_straight_rgba(), args.width, args.height)?;
        frames_written += 1;

        if session.phase() == Phase::Complete {
            break;
        }
    }

    eprintln!(
        "wrote {} frames to {}",
        frames_written,
        args.out_dir.display()
    );
    Ok(())
}

fn cmd_wave(args: WaveArgs) -> anyhow::Result<()> {
    let mut wave = WaveSession::new(Surface::new(args.width, args.height, 1.0)?);
    wave.render(args.at_secs.max(0.0));
    write_png(
        &args.out,
        &wave.surface().to_straight_rgba(),
        args.width,
        args.height,
    )?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}
