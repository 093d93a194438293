//! Listening presets
//!
//! A preset is a named bundle of override rules applied to a request before
//! planning. Presets take precedence over caller-supplied values: each knob
//! is either forced outright or clamped via min/max against the request,
//! never the reverse. Resolution always runs before validation and chain
//! compilation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::TransformRequest;
use crate::error::NocturneError;

/// Named parameter-override bundle.
///
/// Presets are not stored anywhere; they are computed against each request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Gentle nighttime listening: quieter, slower, darker.
    Sleep,
    /// Background listening that keeps speech crisp and at pace.
    Focus,
    /// Minimal processing.
    Raw,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::Sleep, Preset::Focus, Preset::Raw];

    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Sleep => "sleep",
            Preset::Focus => "focus",
            Preset::Raw => "raw",
        }
    }

    /// Apply this preset's override rules, yielding an engine-ready request.
    ///
    /// Idempotent: resolving an already-resolved request changes nothing.
    pub fn resolve(&self, mut req: TransformRequest) -> TransformRequest {
        req.preset = *self;
        match self {
            Preset::Sleep => {
                req.target_lufs = -18.0;
                req.limiter_db = -2.0;
                req.speed = req.speed.min(0.95);
                req.pitch_semitones = req.pitch_semitones.min(-1.0);
                req.lowpass_hz = req.lowpass_hz.min(9000);
            }
            Preset::Focus => {
                req.target_lufs = -16.0;
                req.limiter_db = -1.5;
                req.speed = req.speed.max(0.95);
                req.pitch_semitones = 0.0;
                req.lowpass_hz = req.lowpass_hz.min(12_000);
            }
            Preset::Raw => {
                req.target_lufs = -16.0;
                req.limiter_db = -1.0;
                req.speed = 1.0;
                req.pitch_semitones = 0.0;
                req.lowpass_hz = 20_000;
            }
        }
        req
    }
}

impl FromStr for Preset {
    type Err = NocturneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sleep" => Ok(Preset::Sleep),
            "focus" => Ok(Preset::Focus),
            "raw" => Ok(Preset::Raw),
            _ => Err(NocturneError::InvalidPreset {
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
