// Command-line front end for the `offside_vision` library. Frames come from
// image files; results are printed to stdout as JSON so they can be piped into
// other tools. Logging goes to stderr and is controlled with `RUST_LOG`.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use offside_vision::core_modules::annotate::draw_analysis;
use offside_vision::core_modules::calibration::calibrate_palette;
use offside_vision::core_modules::utils::image_helper::image_helper::{
    load_frame, save_rgba, to_image,
};
use offside_vision::{
    EntityKind, OwnedFrame, ParallelPipeline, PipelineConfig, Report, VisionPipeline,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Exit status of `offside` when the receiver was offside.
const OFFSIDE_EXIT: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "offside_vision", about = "Detect players and ball by color and flag offside passes")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze one frame and print the entities found.
    Analyze {
        image: PathBuf,
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
        /// Write an overlay of the analysis to this PNG.
        #[arg(long, value_name = "PATH")]
        annotate: Option<PathBuf>,
    },
    /// Compare two frames in capture order. Exits with status 2 when offside.
    Offside {
        previous: PathBuf,
        current: PathBuf,
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },
    /// Build a palette from reference crops and print a full config.
    Calibrate {
        #[arg(long, value_name = "PATH")]
        team1: PathBuf,
        #[arg(long, value_name = "PATH")]
        team2: PathBuf,
        #[arg(long, value_name = "PATH")]
        ball: PathBuf,
        #[arg(long, default_value_t = offside_vision::pipeline::DEFAULT_CELL_SIZE)]
        cell_size: u32,
    },
    /// Analyze many frames in parallel and report every consecutive pair.
    Batch {
        #[arg(required = true)]
        images: Vec<PathBuf>,
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
        /// Frames analyzed at once. Defaults to the number of CPUs.
        #[arg(long)]
        workers: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "offside_vision=info".into()),
        )
        .init();

    match Cli::parse().command {
        Command::Analyze {
            image,
            config,
            annotate,
        } => analyze(&image, config.as_deref(), annotate.as_deref()),
        Command::Offside {
            previous,
            current,
            config,
        } => offside(&previous, &current, config.as_deref()),
        Command::Calibrate {
            team1,
            team2,
            ball,
            cell_size,
        } => calibrate(team1, team2, ball, cell_size),
        Command::Batch {
            images,
            config,
            workers,
        } => batch(images, config.as_deref(), workers).await,
    }
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(PipelineConfig::default()),
    }
}

fn read_frame(path: &Path) -> Result<OwnedFrame> {
    load_frame(path).with_context(|| format!("failed to read frame {}", path.display()))
}

fn analyze(image: &Path, config: Option<&Path>, annotate: Option<&Path>) -> Result<ExitCode> {
    let pipeline = VisionPipeline::new(load_config(config)?)?;
    let frame = read_frame(image)?;
    let analysis = pipeline.analyze(&frame.view());
    println!("{}", serde_json::to_string_pretty(&analysis)?);
    if let Some(attacker) = analysis.first_attacker() {
        let (x, y) = attacker.center();
        info!(x, y, area = attacker.area(), "first attacking player");
    }

    if let Some(out) = annotate {
        let mut overlay = to_image(frame);
        draw_analysis(&mut overlay, &analysis, &pipeline.config().palette);
        let (width, height) = overlay.dimensions();
        save_rgba(out, width, height, overlay.as_raw())
            .with_context(|| format!("failed to write overlay {}", out.display()))?;
        info!("overlay written to {}", out.display());
    }
    Ok(ExitCode::SUCCESS)
}

fn offside(previous: &Path, current: &Path, config: Option<&Path>) -> Result<ExitCode> {
    let pipeline = VisionPipeline::new(load_config(config)?)?;
    let previous = read_frame(previous)?;
    let current = read_frame(current)?;

    let assessment = pipeline
        .offside_between(&previous.view(), &current.view())
        .context("could not evaluate frame pair")?;
    println!("{}", serde_json::to_string_pretty(&assessment)?);

    if assessment.is_offside {
        info!("offside");
        Ok(ExitCode::from(OFFSIDE_EXIT))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn calibrate(team1: PathBuf, team2: PathBuf, ball: PathBuf, cell_size: u32) -> Result<ExitCode> {
    let palette = calibrate_palette(&[
        (EntityKind::Team1, team1),
        (EntityKind::Team2, team2),
        (EntityKind::Ball, ball),
    ])
    .context("calibration failed")?;

    let config = PipelineConfig {
        cell_size,
        palette,
        ..PipelineConfig::default()
    };
    config.validate()?;
    println!("{}", config.to_json_string()?);
    Ok(ExitCode::SUCCESS)
}

async fn batch(images: Vec<PathBuf>, config: Option<&Path>, workers: Option<usize>) -> Result<ExitCode> {
    let mut parallel = ParallelPipeline::new(load_config(config)?)?;
    if let Some(workers) = workers {
        parallel = parallel.with_workers(workers);
    }

    let frames = images
        .iter()
        .map(|path| read_frame(path))
        .collect::<Result<Vec<_>>>()?;
    info!(frames = frames.len(), workers = parallel.workers(), "starting batch");

    let reports = parallel.evaluate_sequence(frames).await;
    let mut offside_count = 0usize;
    for (path, report) in images.iter().zip(reports) {
        let line = match report {
            Ok(Report::Baseline) => serde_json::json!({
                "frame": path.display().to_string(),
                "status": "baseline",
            }),
            Ok(Report::Evaluated(assessment)) => {
                if assessment.is_offside {
                    offside_count += 1;
                }
                serde_json::json!({
                    "frame": path.display().to_string(),
                    "status": "evaluated",
                    "assessment": assessment,
                })
            }
            Ok(Report::Skipped(err)) | Err(err) => serde_json::json!({
                "frame": path.display().to_string(),
                "status": "skipped",
                "reason": err.to_string(),
            }),
        };
        println!("{line}");
    }

    info!(offside_count, "batch finished");
    Ok(ExitCode::SUCCESS)
}
