//! Transform request model

use serde::{Deserialize, Serialize};

use super::Preset;

/// Immutable input to the planner.
///
/// A request is constructed once per incoming call, resolved exactly once
/// against its preset, then consumed read-only by chain compilation. After
/// resolution every field holds a concrete, engine-ready value; nothing is
/// left for the executor to reinterpret.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformRequest {
    pub preset: Preset,
    /// Normalization target loudness (LUFS)
    pub target_lufs: f64,
    /// Limiter ceiling (dBFS)
    pub limiter_db: f64,
    /// Playback speed factor; below 1.0 slows speech
    pub speed: f64,
    /// Pitch shift in semitones; negative lowers tone
    pub pitch_semitones: f64,
    /// Low-pass cutoff to reduce harsh treble (Hz)
    pub lowpass_hz: u32,
}

impl TransformRequest {
    /// This request with its preset's override rules applied.
    pub fn resolved(&self) -> TransformRequest {
        self.preset.resolve(self.clone())
    }
}

impl Default for TransformRequest {
    fn default() -> Self {
        Self {
            preset: Preset::Sleep,
            target_lufs: -16.0,
            limiter_db: -1.5,
            speed: 0.9,
            pitch_semitones: -1.0,
            lowpass_hz: 9000,
        }
    }
}
