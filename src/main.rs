use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};

use scratch_reveal::reveal::SourcePolicy;
use scratch_reveal::{Config, FsAssetLoader, PointerEvent, ScratchReveal};

/// Interval between simulated frames.
const FRAME: Duration = Duration::from_millis(16);

#[derive(Parser, Debug)]
#[command(name = "scratch-reveal")]
#[command(
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("SCRATCH_REVEAL_GIT_HASH"), ")"),
    about = "Scratch a mask off a background image along a pointer path"
)]
struct Cli {
    /// Mask image covering the background
    #[arg(long, value_name = "PATH")]
    mask: Option<String>,

    /// Background image revealed by scratching
    #[arg(long, value_name = "PATH")]
    background: Option<String>,

    /// Brush image stamped along the path
    #[arg(long, value_name = "PATH")]
    brush: Option<String>,

    /// Config file (defaults to ~/.config/scratch-reveal/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Surface width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Surface height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Brush width: N, Npx or N% of the smaller surface side
    #[arg(long, value_name = "SPEC")]
    brush_size: Option<String>,

    /// Cleared percentage that completes the reveal
    #[arg(long, value_name = "PERCENT")]
    percent_to_finish: Option<f64>,

    /// Pointer path in surface pixels, e.g. "10,10 80,10 80,60"
    #[arg(long, value_name = "POINTS")]
    path: Option<String>,

    /// Write the final composited frame as PNG
    #[arg(long, short = 'o', value_name = "FILE")]
    output: Option<PathBuf>,

    /// Fall back to the built-in assets for missing sources
    #[arg(long, action = ArgAction::SetTrue)]
    lenient: bool,

    /// Write the example config to the user config directory and exit
    #[arg(long, action = ArgAction::SetTrue)]
    init_config: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    if cli.init_config {
        let path = Config::create_default_file()?;
        println!("Created {}", path.display());
        return Ok(());
    }

    let config = load_config(&cli)?;
    let options = config.to_options()?;
    let (width, height) = (options.width, options.height);
    let fade = options.fade_duration;

    let points = match cli.path.as_deref() {
        Some(path) => parse_path(path)?,
        None => sweep_path(width, height),
    };

    let mut reveal = ScratchReveal::with_cairo(options, Arc::new(FsAssetLoader::new()))?
        .on_progress(|percent| println!("progress: {percent:.1}%"))
        .on_complete(|| println!("complete"));

    reveal.init().await.context("Failed to load scratch reveal assets")?;

    let start = Instant::now();
    let end = drag(&mut reveal, &points, start);
    reveal.frame(end + fade);
    log::info!("Finished at {:.1}% cleared", reveal.percent());

    if let Some(output) = cli.output.as_ref() {
        write_png(&reveal, output, width, height, end + fade)?;
        log::info!("Wrote {}", output.display());
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match cli.config.as_deref() {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    if cli.mask.is_some() {
        config.assets.mask = cli.mask.clone();
    }
    if cli.background.is_some() {
        config.assets.background = cli.background.clone();
    }
    if cli.brush.is_some() {
        config.assets.brush = cli.brush.clone();
    }
    if cli.lenient {
        config.assets.policy = SourcePolicy::Lenient;
    }
    if let Some(width) = cli.width {
        config.widget.width = width;
    }
    if let Some(height) = cli.height {
        config.widget.height = height;
    }
    if cli.brush_size.is_some() {
        config.widget.brush_size = cli.brush_size.clone();
    }
    if let Some(percent) = cli.percent_to_finish {
        config.widget.percent_to_finish = percent;
    }

    config.validate_and_clamp();
    Ok(config)
}

/// Replays `points` as one drag, one frame per move. Returns the time of release.
fn drag(reveal: &mut ScratchReveal, points: &[(f64, f64)], start: Instant) -> Instant {
    let Some((&(x, y), rest)) = points.split_first() else {
        return start;
    };

    let mut now = start;
    reveal.pointer_down(PointerEvent::new(1, x, y, now));
    for &(x, y) in rest {
        now += FRAME;
        reveal.pointer_move(PointerEvent::new(1, x, y, now));
        reveal.frame(now);
    }
    let (x, y) = points.last().copied().unwrap_or((x, y));
    reveal.pointer_up(PointerEvent::new(1, x, y, now));
    now
}

/// Parses `"x,y x,y ..."`.
fn parse_path(source: &str) -> Result<Vec<(f64, f64)>> {
    source
        .split_whitespace()
        .map(|pair| {
            let (x, y) = pair
                .split_once(',')
                .with_context(|| format!("Invalid point '{pair}', expected x,y"))?;
            let x = x
                .trim()
                .parse::<f64>()
                .with_context(|| format!("Invalid x coordinate in '{pair}'"))?;
            let y = y
                .trim()
                .parse::<f64>()
                .with_context(|| format!("Invalid y coordinate in '{pair}'"))?;
            Ok((x, y))
        })
        .collect()
}

/// Back-and-forth sweep over the whole surface.
fn sweep_path(width: u32, height: u32) -> Vec<(f64, f64)> {
    let (width, height) = (width as f64, height as f64);
    let rows = 10;
    let step = height / rows as f64;
    let mut points = Vec::with_capacity(rows * 2);
    for row in 0..rows {
        let y = step * (row as f64 + 0.5);
        let (from, to) = if row % 2 == 0 {
            (0.0, width)
        } else {
            (width, 0.0)
        };
        points.push((from, y));
        points.push((to, y));
    }
    points
}

fn write_png(
    reveal: &ScratchReveal,
    path: &Path,
    width: u32,
    height: u32,
    now: Instant,
) -> Result<()> {
    let target = cairo::ImageSurface::create(cairo::Format::ARgb32, width as i32, height as i32)
        .context("Failed to create output surface")?;
    let ctx = cairo::Context::new(&target).context("Failed to create cairo context")?;
    reveal.render(&ctx, now).context("Failed to render scene")?;
    drop(ctx);

    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    target
        .write_to_png(&mut file)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_point_lists() {
        assert!(parse_path("1,2 3.5, 4").is_err(), "spaces split pairs");
        assert_eq!(
            parse_path("1,2 3.5,4").unwrap(),
            vec![(1.0, 2.0), (3.5, 4.0)]
        );
        assert!(parse_path("1;2").is_err());
        assert!(parse_path("").unwrap().is_empty());
    }

    #[test]
    fn sweep_covers_every_row() {
        let points = sweep_path(100, 50);
        assert_eq!(points.len(), 20);
        assert_eq!(points[0], (0.0, 2.5));
        assert_eq!(points[1], (100.0, 2.5));
        assert_eq!(points[2], (100.0, 7.5));
    }
}
