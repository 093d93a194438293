//! Filter stage descriptors
//!
//! A stage is an ordered, opaque instruction for the processing engine: a
//! kind plus fully-resolved numeric parameters. The only symbolic value in a
//! compiled chain is the native sample rate referenced by the resample
//! stages, which the engine resolves at execution time.
//!
//! Stages are value objects; the chain is an ordered sequence and order is
//! semantically significant.

use serde::{Deserialize, Serialize};

/// One breakpoint of the compression transfer curve (input dB, output dB).
pub type CurvePoint = (f64, f64);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum FilterStage {
    /// One-pass loudness normalization to a target integrated loudness.
    LoudnessNormalize {
        target_lufs: f64,
        true_peak_db: f64,
        loudness_range_lu: f64,
    },
    /// Soft-knee dynamic range compression over a fixed transfer curve.
    Compress {
        attack_s: f64,
        decay_s: f64,
        knee_db: f64,
        curve: Vec<CurvePoint>,
    },
    /// Hard limiter preventing sudden blasts above the ceiling.
    Limit { ceiling_db: f64 },
    /// Low-pass filter taming harsh treble.
    Lowpass { cutoff_hz: u32 },
    /// Playback-speed-only change; pitch is preserved.
    TempoShift { factor: f64 },
    /// Native-sample-rate multiplication; shifts pitch and tempo together.
    PitchResample { ratio: f64 },
    /// Return the engine's working sample rate to native so downstream
    /// stages and output encoding see a normal rate.
    ResampleRestore,
}

impl FilterStage {
    /// Stable stage kind name, matching the serialized form.
    pub fn kind(&self) -> &'static str {
        match self {
            FilterStage::LoudnessNormalize { .. } => "loudness-normalize",
            FilterStage::Compress { .. } => "compress",
            FilterStage::Limit { .. } => "limit",
            FilterStage::Lowpass { .. } => "lowpass",
            FilterStage::TempoShift { .. } => "tempo-shift",
            FilterStage::PitchResample { .. } => "pitch-resample",
            FilterStage::ResampleRestore => "resample-restore",
        }
    }
}
