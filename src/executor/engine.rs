//! ffmpeg engine adapter
//!
//! Translates the planner's stage chain into ffmpeg filter-graph syntax and
//! drives the ffmpeg process. The symbolic native sample rate carried by the
//! resample stages maps onto ffmpeg's `sample_rate` variable, which the
//! engine resolves at execution time.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::error::{NocturneError, Result};
use crate::planner::FilterStage;

/// LAME VBR quality for the encoded output (~165 kbps average).
const MP3_VBR_QUALITY: &str = "4";

/// Render one stage as an ffmpeg audio filter.
pub fn render_stage(stage: &FilterStage) -> String {
    match stage {
        FilterStage::LoudnessNormalize {
            target_lufs,
            true_peak_db,
            loudness_range_lu,
        } => format!("loudnorm=I={target_lufs}:TP={true_peak_db}:LRA={loudness_range_lu}"),
        FilterStage::Compress {
            attack_s,
            decay_s,
            knee_db,
            curve,
        } => {
            let points = curve
                .iter()
                .map(|(input, output)| format!("{input}/{output}"))
                .collect::<Vec<_>>()
                .join("|");
            format!("compand=attacks={attack_s}:decays={decay_s}:soft-knee={knee_db}:points={points}")
        }
        FilterStage::Limit { ceiling_db } => format!("alimiter=limit={ceiling_db}dB"),
        FilterStage::Lowpass { cutoff_hz } => format!("lowpass=f={cutoff_hz}"),
        FilterStage::TempoShift { factor } => format!("atempo={factor}"),
        FilterStage::PitchResample { ratio } => format!("asetrate=sample_rate*{ratio}"),
        FilterStage::ResampleRestore => "aresample=sample_rate".to_string(),
    }
}

/// Render a full chain as a single `-af` argument.
pub fn render_filter(stages: &[FilterStage]) -> String {
    stages.iter().map(render_stage).collect::<Vec<_>>().join(",")
}

/// ffmpeg process wrapper.
#[derive(Debug, Clone)]
pub struct FfmpegEngine {
    ffmpeg_path: PathBuf,
}

impl FfmpegEngine {
    pub fn new(ffmpeg_path: PathBuf) -> Self {
        Self { ffmpeg_path }
    }

    /// Apply a stage chain to `input`, encoding an MP3 at `output`.
    pub async fn process(
        &self,
        input: &Path,
        output: &Path,
        stages: &[FilterStage],
    ) -> Result<()> {
        let filter = render_filter(stages);
        debug!(filter = %filter, input = %input.display(), "running ffmpeg");

        let result = Command::new(&self.ffmpeg_path)
            .arg("-y")
            .arg("-i")
            .arg(input)
            .arg("-vn")
            .arg("-af")
            .arg(&filter)
            .arg("-codec:a")
            .arg("libmp3lame")
            .arg("-q:a")
            .arg(MP3_VBR_QUALITY)
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(NocturneError::Processing {
                reason: format!("ffmpeg failed: {}", stderr.trim()),
            });
        }

        Ok(())
    }
}
