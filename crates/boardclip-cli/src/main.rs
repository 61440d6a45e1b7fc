//! Command-line entry points for boardclip.
//!
//! Two independent pipelines, connected only through files:
//! `motion` detects hand movement inside the board ROI and prints a JSON
//! report; `overlay` composites the rendered move animation onto the
//! background recording and prints the JSON run report.
//!
//! Diagnostics go to stderr; stdout carries only the JSON result, so both
//! subcommands can be piped.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use boardclip_media::motion::{detect_motion_segments, ExtractorKind, MotionConfig};
use boardclip_media::overlay::planner::{parse_offset, plan_overlays};
use boardclip_media::{
    merge_intervals, pad_intervals, probe_video, roi, FfmpegRunner, FilterGraph,
    DEFAULT_TIMEOUT_SECS,
};
use boardclip_models::{canonicalize_corners, EventManifest, MotionReport, PointI32};

#[derive(Parser, Debug)]
#[command(
    name = "boardclip",
    version,
    about = "Chess video motion detection and overlay compositing"
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Detect motion segments inside a board region of interest
    Motion {
        /// Input video file
        video: PathBuf,

        /// Four ROI corners as `x,y` tokens, in any order
        #[arg(long, num_args = 4, required = true, value_name = "X,Y")]
        roi: Vec<String>,

        /// Minimum contour area in pixels for a contour to count as motion
        #[arg(long, default_value_t = 500.0)]
        min_area: f64,

        /// Use previous-frame differencing instead of MOG2 background subtraction
        #[arg(long)]
        frame_diff: bool,

        /// Seconds of padding applied to each segment before merging
        #[arg(long, default_value_t = 0.0)]
        pad: f64,

        /// Write the first frame with the ROI drawn on it to this path
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },

    /// Composite the rendered move animation onto the background recording
    Overlay {
        /// Background recording of the physical board
        #[arg(long)]
        background: PathBuf,

        /// Rendered move animation clip
        #[arg(long)]
        overlay: PathBuf,

        /// Event manifest JSON exported by the renderer
        #[arg(long)]
        manifest: PathBuf,

        /// Output video path (overwritten if present)
        #[arg(long, default_value = "output.mp4")]
        output: PathBuf,

        /// Override the manifest overlay position, as `x,y`
        #[arg(long, value_name = "X,Y")]
        offset: Option<String>,

        /// Append a final sentinel timestamp closing the last window
        #[arg(long, value_name = "SECONDS")]
        sentinel: Option<f64>,

        /// Hard timeout for the compositing run, in seconds
        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout: u64,

        /// Print the generated command instead of executing it
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.debug { "boardclip=debug" } else { "boardclip=info" };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_file(false)
                .with_line_number(false),
        )
        .with(env_filter)
        .init();

    match run(cli.command).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("{e:#}");
            std::process::exit(1);
        }
    }
}

async fn run(command: Commands) -> Result<i32> {
    match command {
        Commands::Motion {
            video,
            roi,
            min_area,
            frame_diff,
            pad,
            snapshot,
        } => run_motion(video, &roi, min_area, frame_diff, pad, snapshot).await,
        Commands::Overlay {
            background,
            overlay,
            manifest,
            output,
            offset,
            sentinel,
            timeout,
            dry_run,
        } => {
            run_overlay(
                background, overlay, manifest, output, offset, sentinel, timeout, dry_run,
            )
            .await
        }
    }
}

/// Parse the 4 `x,y` ROI tokens, naming the offending token on failure.
fn parse_roi(tokens: &[String]) -> Result<[PointI32; 4]> {
    if tokens.len() != 4 {
        bail!("expected exactly 4 ROI corners, got {}", tokens.len());
    }
    let mut corners = [PointI32::new(0, 0); 4];
    for (slot, token) in corners.iter_mut().zip(tokens) {
        *slot = token.parse()?;
    }
    Ok(corners)
}

async fn run_motion(
    video: PathBuf,
    roi_tokens: &[String],
    min_area: f64,
    frame_diff: bool,
    pad: f64,
    snapshot: Option<PathBuf>,
) -> Result<i32> {
    let corners = parse_roi(roi_tokens)?;

    if let Some(snapshot_path) = snapshot {
        // Diagnostic only, never fails the run
        if let Err(e) = roi::save_roi_snapshot(&video, corners, &snapshot_path) {
            warn!("could not write ROI snapshot: {e}");
        } else {
            info!(path = %snapshot_path.display(), "ROI snapshot written");
        }
    }

    let config = MotionConfig {
        min_contour_area: min_area,
        extractor: if frame_diff {
            ExtractorKind::FrameDiff
        } else {
            ExtractorKind::Mog2
        },
    };

    info!(video = %video.display(), "processing video");
    let run = {
        let video = video.clone();
        tokio::task::spawn_blocking(move || detect_motion_segments(&video, corners, &config))
            .await
            .context("motion segmentation task panicked")??
    };
    info!(
        segments = run.intervals.len(),
        duration = run.duration,
        "processing complete"
    );

    let padded = pad_intervals(&run.intervals, pad, Some(run.duration))?;
    let merged = merge_intervals(&padded);

    let report = MotionReport {
        video_file: video
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| video.display().to_string()),
        roi_corners_used: canonicalize_corners(corners),
        motion_segments: merged.into_iter().map(Into::into).collect(),
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(0)
}

#[allow(clippy::too_many_arguments)]
async fn run_overlay(
    background: PathBuf,
    overlay: PathBuf,
    manifest_path: PathBuf,
    output: PathBuf,
    offset: Option<String>,
    sentinel: Option<f64>,
    timeout: u64,
    dry_run: bool,
) -> Result<i32> {
    let text = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("could not read manifest {}", manifest_path.display()))?;
    let mut manifest = EventManifest::from_json(&text)
        .with_context(|| format!("malformed manifest {}", manifest_path.display()))?;
    info!(
        moves = manifest.timestamps.len(),
        time_per_move = manifest.time_per_move,
        "manifest loaded"
    );

    if let Some(sentinel) = sentinel {
        manifest.timestamps.push(sentinel);
    }

    let offset = match offset {
        Some(raw) => parse_offset(&raw)?,
        None => manifest.offset(),
    };

    let plan = plan_overlays(manifest.time_per_move, &manifest.timestamps, Some(offset))?;
    let graph = FilterGraph::from_plan(&plan)?;
    let cmd = graph.to_command(&background, &overlay, &output);

    // The plan is built purely from the manifest; warn when it runs past
    // the actual recording.
    match probe_video(&background).await {
        Ok(info) => {
            if let Some(last) = plan.background.last() {
                if last.end > info.duration + 0.5 {
                    warn!(
                        window_end = last.end,
                        background_duration = info.duration,
                        "last overlay window extends past the background clip"
                    );
                }
            }
        }
        Err(e) => warn!("could not probe background clip: {e}"),
    }

    if dry_run {
        println!("{}", cmd.command_line("ffmpeg"));
        return Ok(0);
    }

    info!("executing: {}", cmd.command_line("ffmpeg"));
    let report = FfmpegRunner::new().with_timeout(timeout).run(&cmd).await;

    if report.success {
        info!(output = %output.display(), "compositing complete");
    } else {
        error!(return_code = report.return_code, "compositing failed");
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(if report.success { 0 } else { 1 })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_roi_ok() {
        let corners =
            parse_roi(&tokens(&["5,5", "1275,5", "1275,715", "5,715"])).unwrap();
        assert_eq!(corners[1], PointI32::new(1275, 5));
    }

    #[test]
    fn test_parse_roi_wrong_count() {
        assert!(parse_roi(&tokens(&["1,1", "2,2"])).is_err());
    }

    #[test]
    fn test_parse_roi_names_bad_token() {
        let err = parse_roi(&tokens(&["1,1", "2,2", "oops", "4,4"])).unwrap_err();
        assert!(format!("{err:#}").contains("oops"));
    }

    #[test]
    fn test_cli_parses_overlay() {
        let cli = Cli::try_parse_from([
            "boardclip",
            "overlay",
            "--background",
            "bg.mp4",
            "--overlay",
            "anim.mp4",
            "--manifest",
            "export.json",
            "--dry-run",
        ])
        .unwrap();
        match cli.command {
            Commands::Overlay { dry_run, timeout, .. } => {
                assert!(dry_run);
                assert_eq!(timeout, DEFAULT_TIMEOUT_SECS);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_parses_motion_roi() {
        let cli = Cli::try_parse_from([
            "boardclip", "motion", "video.mp4", "--roi", "1,1", "2,1", "2,2", "1,2",
        ])
        .unwrap();
        match cli.command {
            Commands::Motion { roi, .. } => assert_eq!(roi.len(), 4),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
