//! Service configuration
//!
//! Small knob set loaded from CLI flags and environment; every field has a
//! working default so `nocturne-cli serve` runs out of the box.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{NocturneError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Root directory for processed output artifacts.
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,

    /// Optional static frontend directory served at `/`.
    #[serde(default)]
    pub frontend_dir: Option<PathBuf>,

    /// ffmpeg binary name or path.
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: PathBuf,

    /// yt-dlp binary name or path.
    #[serde(default = "default_ytdlp")]
    pub ytdlp: PathBuf,

    /// Output artifacts older than this are removed by the retention sweep.
    #[serde(default = "default_retention_hours")]
    pub retention_hours: u64,
}

impl Config {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Verify the external tools are invocable before accepting work.
    pub fn check_tools(&self) -> Result<()> {
        for binary in [&self.ffmpeg, &self.ytdlp] {
            which::which(binary).map_err(|_| NocturneError::MissingDependency {
                binary: binary.display().to_string(),
            })?;
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            output_root: default_output_root(),
            frontend_dir: None,
            ffmpeg: default_ffmpeg(),
            ytdlp: default_ytdlp(),
            retention_hours: default_retention_hours(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8787
}

fn default_output_root() -> PathBuf {
    std::env::temp_dir().join("nocturne_outputs")
}

fn default_ffmpeg() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_ytdlp() -> PathBuf {
    PathBuf::from("yt-dlp")
}

fn default_retention_hours() -> u64 {
    24
}
