//! CLI Module
//!
//! Command-line interface for the Nocturne audio transformation service.

pub mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::Config;
use crate::error::Result;
use crate::planner::{Preset, TransformRequest};

/// Nocturne - nighttime audio transformation service
#[derive(Parser, Debug)]
#[command(name = "nocturne")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP service
    Serve {
        /// Bind host
        #[arg(long, default_value = "0.0.0.0", env = "NOCTURNE_HOST")]
        host: String,

        /// Bind port
        #[arg(long, default_value_t = 8787, env = "NOCTURNE_PORT")]
        port: u16,

        /// Root directory for output artifacts
        #[arg(long, env = "NOCTURNE_OUTPUT_ROOT")]
        output_root: Option<PathBuf>,

        /// Static frontend directory served at /
        #[arg(long, env = "NOCTURNE_FRONTEND_DIR")]
        frontend_dir: Option<PathBuf>,

        /// Hours to keep processed outputs before the retention sweep
        #[arg(long, default_value_t = 24, env = "NOCTURNE_RETENTION_HOURS")]
        retention_hours: u64,

        #[command(flatten)]
        tools: ToolArgs,
    },

    /// Compile and print the filter chain for a parameter set (no I/O)
    Plan {
        #[command(flatten)]
        params: TransformArgs,
    },

    /// Download and process a single URL without running the server
    Process {
        /// Source media URL
        url: String,

        #[command(flatten)]
        params: TransformArgs,

        /// Destination file for the processed audio
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        tools: ToolArgs,
    },
}

/// External tool locations
#[derive(Args, Debug)]
pub struct ToolArgs {
    /// ffmpeg binary name or path
    #[arg(long, default_value = "ffmpeg", env = "NOCTURNE_FFMPEG")]
    pub ffmpeg: PathBuf,

    /// yt-dlp binary name or path
    #[arg(long, default_value = "yt-dlp", env = "NOCTURNE_YTDLP")]
    pub ytdlp: PathBuf,
}

impl ToolArgs {
    pub fn apply(self, config: &mut Config) {
        config.ffmpeg = self.ffmpeg;
        config.ytdlp = self.ytdlp;
    }
}

/// Transform parameters shared by `plan` and `process`
#[derive(Args, Debug)]
pub struct TransformArgs {
    /// Listening preset: sleep, focus, raw
    #[arg(long, default_value = "sleep")]
    pub preset: String,

    /// Normalization target loudness (LUFS)
    #[arg(long, default_value_t = -16.0, allow_hyphen_values = true)]
    pub target_lufs: f64,

    /// Limiter ceiling (dBFS)
    #[arg(long, default_value_t = -1.5, allow_hyphen_values = true)]
    pub limiter_db: f64,

    /// Playback speed (0.5-1.5); below 1 slows speech
    #[arg(long, default_value_t = 0.9)]
    pub speed: f64,

    /// Pitch shift in semitones; negative lowers tone
    #[arg(long, default_value_t = -1.0, allow_hyphen_values = true)]
    pub pitch_semitones: f64,

    /// Low-pass cutoff to reduce harsh treble (Hz)
    #[arg(long, default_value_t = 9000)]
    pub lowpass_hz: u32,
}

impl TransformArgs {
    /// Parse into a planner request; the preset string is validated here.
    pub fn to_request(&self) -> Result<TransformRequest> {
        let preset: Preset = self.preset.parse()?;
        Ok(TransformRequest {
            preset,
            target_lufs: self.target_lufs,
            limiter_db: self.limiter_db,
            speed: self.speed,
            pitch_semitones: self.pitch_semitones,
            lowpass_hz: self.lowpass_hz,
        })
    }
}
