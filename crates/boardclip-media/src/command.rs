//! FFmpeg command builder and runner.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, warn};

use boardclip_models::RunReport;

/// Default hard timeout for an external compositing run.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// One declared input: its pre-`-i` arguments and the file path.
#[derive(Debug, Clone)]
struct InputSpec {
    args: Vec<String>,
    path: PathBuf,
}

/// Builder for FFmpeg commands with any number of inputs.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Declared inputs, in stream-index order.
    inputs: Vec<InputSpec>,
    /// Output file path
    output: PathBuf,
    /// Output arguments (after the inputs)
    output_args: Vec<String>,
    /// Whether to overwrite output
    overwrite: bool,
    /// Log level
    log_level: String,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command writing to `output`.
    pub fn new(output: impl AsRef<Path>) -> Self {
        Self {
            inputs: Vec::new(),
            output: output.as_ref().to_path_buf(),
            output_args: Vec::new(),
            overwrite: true,
            log_level: "error".to_string(),
        }
    }

    /// Declare an input file.
    pub fn input(mut self, path: impl AsRef<Path>) -> Self {
        self.inputs.push(InputSpec {
            args: Vec::new(),
            path: path.as_ref().to_path_buf(),
        });
        self
    }

    /// Declare an input trimmed with `-ss <start> -t <duration>`.
    pub fn trimmed_input(mut self, start: f64, duration: f64, path: impl AsRef<Path>) -> Self {
        self.inputs.push(InputSpec {
            args: vec![
                "-ss".to_string(),
                fmt_secs(start),
                "-t".to_string(),
                fmt_secs(duration),
            ],
            path: path.as_ref().to_path_buf(),
        });
        self
    }

    /// Add an output argument (after the inputs).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple output arguments.
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set filter complex.
    pub fn filter_complex(self, filter: impl Into<String>) -> Self {
        self.output_arg("-filter_complex").output_arg(filter)
    }

    /// Map a stream to the output.
    pub fn map(self, stream: impl Into<String>) -> Self {
        self.output_arg("-map").output_arg(stream)
    }

    /// Set audio codec.
    pub fn audio_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:a").output_arg(codec)
    }

    /// Set log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        // Overwrite flag
        if self.overwrite {
            args.push("-y".to_string());
        }

        // Log level
        args.push("-v".to_string());
        args.push(self.log_level.clone());

        // Inputs, in stream-index order
        for input in &self.inputs {
            args.extend(input.args.clone());
            args.push("-i".to_string());
            args.push(input.path.to_string_lossy().to_string());
        }

        // Output args
        args.extend(self.output_args.clone());

        // Output file
        args.push(self.output.to_string_lossy().to_string());

        args
    }

    /// Render the full invocation as one loggable line.
    pub fn command_line(&self, program: &str) -> String {
        let mut line = String::from(program);
        for arg in self.build_args() {
            line.push(' ');
            if arg.contains(' ') || arg.contains(';') || arg.contains('\'') {
                line.push('"');
                line.push_str(&arg);
                line.push('"');
            } else {
                line.push_str(&arg);
            }
        }
        line
    }
}

/// Format seconds compactly: at most 3 decimals, no trailing zeros.
pub(crate) fn fmt_secs(value: f64) -> String {
    let mut s = format!("{value:.3}");
    if s.contains('.') {
        s = s.trim_end_matches('0').trim_end_matches('.').to_string();
    }
    s
}

/// Runner for FFmpeg commands with a hard timeout.
///
/// Every failure mode is converted into a [`RunReport`]; nothing raises
/// past this boundary. Timeout, tool-not-found, and unexpected spawn
/// failures share the `-1` sentinel return code with distinct messages.
#[derive(Debug, Clone)]
pub struct FfmpegRunner {
    /// Program name resolved on PATH.
    program: String,
    /// Hard timeout in seconds.
    timeout_secs: u64,
}

impl Default for FfmpegRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegRunner {
    /// Create a runner for `ffmpeg` with the default timeout.
    pub fn new() -> Self {
        Self {
            program: "ffmpeg".to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set the timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Override the program name (tests).
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Run an FFmpeg command and capture its outcome.
    pub async fn run(&self, cmd: &FfmpegCommand) -> RunReport {
        if which::which(&self.program).is_err() {
            return RunReport::failed(format!("{} not found in PATH", self.program));
        }

        let args = cmd.build_args();
        debug!("Running: {}", cmd.command_line(&self.program));

        // kill_on_drop so an expired timeout abandons the child instead of
        // leaving it running
        let child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(Duration::from_secs(self.timeout_secs), child).await {
            Err(_) => {
                warn!(
                    timeout_secs = self.timeout_secs,
                    "{} timed out, killing process", self.program
                );
                RunReport::failed(format!(
                    "command timed out after {} seconds",
                    self.timeout_secs
                ))
            }
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                RunReport::failed(format!("{} not found in PATH", self.program))
            }
            Ok(Err(e)) => RunReport::failed(format!("unexpected error: {e}")),
            Ok(Ok(output)) => RunReport {
                success: output.status.success(),
                output: String::from_utf8_lossy(&output.stdout).into_owned(),
                error: String::from_utf8_lossy(&output.stderr).into_owned(),
                return_code: output.status.code().unwrap_or(-1),
            },
        }
    }
}
