//! Multi-segment overlay filter-graph synthesis.
//!
//! The graph is held as typed operations and serialized to FFmpeg's
//! filter_complex grammar only at the last step, so the compositing logic
//! is testable structurally instead of by string matching.
//!
//! For each overlay segment the chain is: trim the overlay source at input
//! declaration time (`-ss`/`-t`), clone-pad the last frame when the
//! background window outlasts the segment (`tpad`), shift presentation
//! timestamps to the window start (`setpts`), then composite with a
//! time-gated `overlay`.

use std::path::Path;

use boardclip_models::Interval;

use crate::command::{fmt_secs, FfmpegCommand};
use crate::error::{MediaError, MediaResult};
use crate::overlay::planner::OverlayPlan;

/// Freeze durations at or below this are floating-point noise, not a
/// genuine duration mismatch, and get no padding.
pub const FREEZE_EPSILON: f64 = 0.001;

/// A per-stream filter operation applied to one trimmed overlay input.
#[derive(Debug, Clone, PartialEq)]
pub enum ChainOp {
    /// Clone the last frame for `stop_duration` extra seconds.
    Tpad { stop_duration: f64 },
    /// Shift presentation timestamps forward by `shift` seconds.
    Setpts { shift: f64 },
}

impl ChainOp {
    fn render(&self) -> String {
        match self {
            ChainOp::Tpad { stop_duration } => {
                format!("tpad=stop_mode=clone:stop_duration={}", fmt_secs(*stop_duration))
            }
            ChainOp::Setpts { shift } => format!("setpts=PTS+{}/TB", fmt_secs(*shift)),
        }
    }
}

/// One overlay segment: where it comes from, how its stream is processed,
/// and when it is composited.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayStage {
    /// Source window in the overlay clip, realized as `-ss`/`-t` input args.
    pub trim: Interval,
    /// Per-stream operations on the trimmed input.
    pub chain: Vec<ChainOp>,
    /// Background window during which the composite is enabled.
    pub window: Interval,
}

/// A complete compositing graph for N overlay segments.
#[derive(Debug, Clone)]
pub struct FilterGraph {
    stages: Vec<OverlayStage>,
    offset: (i64, i64),
}

impl FilterGraph {
    /// Build a graph from parallel overlay and background interval lists.
    ///
    /// List lengths are validated before any command text exists.
    pub fn build(
        overlay: &[Interval],
        background: &[Interval],
        offset: (i64, i64),
    ) -> MediaResult<Self> {
        if overlay.len() != background.len() {
            return Err(MediaError::SegmentMismatch {
                overlay: overlay.len(),
                background: background.len(),
            });
        }

        let stages = overlay
            .iter()
            .zip(background.iter())
            .map(|(ov, bg)| {
                let mut chain = Vec::new();
                let freeze = bg.duration() - ov.duration();
                if freeze > FREEZE_EPSILON {
                    chain.push(ChainOp::Tpad {
                        stop_duration: freeze,
                    });
                }
                chain.push(ChainOp::Setpts { shift: bg.start });
                OverlayStage {
                    trim: *ov,
                    chain,
                    window: *bg,
                }
            })
            .collect();

        Ok(Self { stages, offset })
    }

    /// Build a graph from a planner output.
    pub fn from_plan(plan: &OverlayPlan) -> MediaResult<Self> {
        Self::build(&plan.overlay, &plan.background, plan.offset)
    }

    /// The typed stages, in compositing order.
    pub fn stages(&self) -> &[OverlayStage] {
        &self.stages
    }

    /// Label of the final composite stream.
    pub fn output_label(&self) -> String {
        if self.stages.is_empty() {
            "0:v".to_string()
        } else {
            format!("v_out_{}", self.stages.len())
        }
    }

    /// Serialize to FFmpeg filter_complex syntax.
    pub fn filter_complex(&self) -> String {
        let (x, y) = self.offset;
        let mut parts = Vec::with_capacity(self.stages.len() * 2);
        let mut last = "0:v".to_string();

        for (i, stage) in self.stages.iter().enumerate() {
            let input_index = i + 1;
            let processed = format!("processed_overlay_{input_index}");
            let out = format!("v_out_{input_index}");

            let chain: Vec<String> = stage.chain.iter().map(ChainOp::render).collect();
            parts.push(format!("[{input_index}:v]{}[{processed}]", chain.join(",")));

            parts.push(format!(
                "[{last}][{processed}]overlay={x}:{y}:enable='between(t,{},{})'[{out}]",
                fmt_secs(stage.window.start),
                fmt_secs(stage.window.end),
            ));
            last = out;
        }

        parts.join(";")
    }

    /// Assemble the full compositing command.
    ///
    /// Input 0 is the untouched background; inputs 1..=N are the overlay
    /// clip trimmed per stage. The background's audio is mapped through
    /// unmodified when present.
    pub fn to_command(
        &self,
        background: impl AsRef<Path>,
        overlay_clip: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> FfmpegCommand {
        let mut cmd = FfmpegCommand::new(output).input(background.as_ref());

        for stage in &self.stages {
            cmd = cmd.trimmed_input(stage.trim.start, stage.trim.duration(), overlay_clip.as_ref());
        }

        cmd.filter_complex(self.filter_complex())
            .map(format!("[{}]", self.output_label()))
            .map("0:a?")
            .audio_codec("copy")
    }
}
