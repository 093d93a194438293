//! Chain compilation
//!
//! Builds the ordered filter stage chain for a resolved request. Stage order
//! is fixed: loudness normalization, compression, limiting, low-pass, tempo,
//! then (only for a non-zero pitch shift) the pitch compensation sub-chain.

use super::{FilterStage, TransformRequest};
use crate::error::{NocturneError, Result};

// ============================================================================
// Contract constants
// ============================================================================

/// True-peak ceiling applied during loudness normalization (dBFS). Not
/// user-configurable; the limiter stage enforces the caller's ceiling.
pub const TRUE_PEAK_CEILING_DB: f64 = -2.0;

/// Loudness-range target for normalization (LU). Not user-configurable.
pub const LOUDNESS_RANGE_LU: f64 = 11.0;

/// Compression transfer curve, input dB to output dB. Louder material is
/// compressed harder; the top of the curve pulls 0 dB peaks down to -6 dB.
pub const COMPRESS_CURVE: [(f64, f64); 6] = [
    (-90.0, -90.0),
    (-60.0, -58.0),
    (-30.0, -26.0),
    (-18.0, -16.0),
    (-10.0, -10.0),
    (0.0, -6.0),
];

/// Compression envelope attack time (seconds).
pub const COMPRESS_ATTACK_S: f64 = 0.02;

/// Compression envelope decay time (seconds).
pub const COMPRESS_DECAY_S: f64 = 0.25;

/// Soft-knee width around each curve breakpoint (dB).
pub const COMPRESS_KNEE_DB: f64 = 6.0;

/// Absolute low-pass floor (Hz). Cutoffs below this destroy speech
/// intelligibility, so requested values are raised to it unconditionally.
pub const LOWPASS_FLOOR_HZ: u32 = 2000;

/// Valid speed range for a transform request.
pub const SPEED_MIN: f64 = 0.5;
pub const SPEED_MAX: f64 = 1.5;

/// Factor range accepted by the engine's tempo primitive. Corrections
/// outside this range must be decomposed into two chained tempo stages.
pub const TEMPO_FACTOR_MIN: f64 = 0.5;
pub const TEMPO_FACTOR_MAX: f64 = 2.0;

/// Semitones per octave, for the pitch ratio computation.
const SEMITONES_PER_OCTAVE: f64 = 12.0;

// ============================================================================
// Chain builder
// ============================================================================

/// Ordered stage accumulator.
///
/// Keeps the fixed stage order and the pitch compensation sub-chain as
/// separately testable units instead of inline control flow.
#[derive(Debug, Default)]
pub struct ChainBuilder {
    stages: Vec<FilterStage>,
}

impl ChainBuilder {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Append one stage.
    pub fn stage(mut self, stage: FilterStage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Append the pitch compensation sub-chain for a non-zero semitone
    /// shift.
    ///
    /// Resampling by `ratio = 2^(semitones/12)` shifts pitch but drags tempo
    /// along with it; the chained tempo corrections undo the tempo change,
    /// restoring the duration the speed stage already established while
    /// keeping the new pitch. A final restore stage returns the working
    /// sample rate to native.
    pub fn pitch_shift(mut self, semitones: f64) -> Self {
        let ratio = (semitones / SEMITONES_PER_OCTAVE).exp2();
        self = self.stage(FilterStage::PitchResample { ratio });
        for factor in tempo_correction(1.0 / ratio) {
            self = self.stage(FilterStage::TempoShift { factor });
        }
        self.stage(FilterStage::ResampleRestore)
    }

    pub fn build(self) -> Vec<FilterStage> {
        self.stages
    }
}

/// Decompose a tempo correction factor against the tempo primitive's
/// valid range.
///
/// The decomposition is exact: the product of the returned factors equals
/// `inv` (the second factor is the precise remainder of the first), so the
/// corrected duration cannot drift from the speed stage's intended duration.
pub fn tempo_correction(inv: f64) -> Vec<f64> {
    if inv < TEMPO_FACTOR_MIN {
        vec![TEMPO_FACTOR_MIN, inv / TEMPO_FACTOR_MIN]
    } else if inv > TEMPO_FACTOR_MAX {
        vec![TEMPO_FACTOR_MAX, inv / TEMPO_FACTOR_MAX]
    } else {
        vec![inv]
    }
}

/// Compile a resolved request into the ordered filter stage chain.
///
/// The speed bound is validated here even though presets already clamp into
/// range: the planner defends the invariant independently for direct use.
pub fn compile_chain(req: &TransformRequest) -> Result<Vec<FilterStage>> {
    if !(SPEED_MIN..=SPEED_MAX).contains(&req.speed) {
        return Err(NocturneError::InvalidParameter {
            reason: "speed must be between 0.5 and 1.5".to_string(),
        });
    }

    let mut chain = ChainBuilder::new()
        .stage(FilterStage::LoudnessNormalize {
            target_lufs: req.target_lufs,
            true_peak_db: TRUE_PEAK_CEILING_DB,
            loudness_range_lu: LOUDNESS_RANGE_LU,
        })
        .stage(FilterStage::Compress {
            attack_s: COMPRESS_ATTACK_S,
            decay_s: COMPRESS_DECAY_S,
            knee_db: COMPRESS_KNEE_DB,
            curve: COMPRESS_CURVE.to_vec(),
        })
        .stage(FilterStage::Limit {
            ceiling_db: req.limiter_db,
        })
        .stage(FilterStage::Lowpass {
            cutoff_hz: req.lowpass_hz.max(LOWPASS_FLOOR_HZ),
        })
        .stage(FilterStage::TempoShift { factor: req.speed });

    // Exact-zero test, deliberately: preset resolution either forces zero or
    // leaves the caller's value untouched, so a near-zero residual cannot
    // arise upstream.
    if req.pitch_semitones != 0.0 {
        chain = chain.pitch_shift(req.pitch_semitones);
    }

    Ok(chain.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::Preset;
    use approx::assert_abs_diff_eq;

    fn request(speed: f64, pitch: f64, lowpass: u32) -> TransformRequest {
        TransformRequest {
            preset: Preset::Raw,
            target_lufs: -16.0,
            limiter_db: -1.0,
            speed,
            pitch_semitones: pitch,
            lowpass_hz: lowpass,
        }
    }

    fn kinds(stages: &[FilterStage]) -> Vec<&'static str> {
        stages.iter().map(FilterStage::kind).collect()
    }

    #[test]
    fn test_chain_order_without_pitch_shift() {
        let stages = compile_chain(&request(1.0, 0.0, 9000)).unwrap();
        assert_eq!(
            kinds(&stages),
            vec![
                "loudness-normalize",
                "compress",
                "limit",
                "lowpass",
                "tempo-shift"
            ]
        );
    }

    #[test]
    fn test_chain_order_with_pitch_shift() {
        let stages = compile_chain(&request(1.0, -1.0, 9000)).unwrap();
        assert_eq!(
            kinds(&stages),
            vec![
                "loudness-normalize",
                "compress",
                "limit",
                "lowpass",
                "tempo-shift",
                "pitch-resample",
                "tempo-shift",
                "resample-restore"
            ]
        );
    }

    #[test]
    fn test_chain_is_never_empty() {
        let stages = compile_chain(&request(1.0, 0.0, 20_000)).unwrap();
        assert!(stages.len() >= 5);
    }

    #[test]
    fn test_speed_bounds() {
        assert!(compile_chain(&request(0.5, 0.0, 9000)).is_ok());
        assert!(compile_chain(&request(1.5, 0.0, 9000)).is_ok());

        for speed in [0.49, 1.51, 0.0, -1.0, 3.0] {
            let err = compile_chain(&request(speed, 0.0, 9000)).unwrap_err();
            match err {
                NocturneError::InvalidParameter { reason } => {
                    assert_eq!(reason, "speed must be between 0.5 and 1.5");
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn test_lowpass_floor() {
        let stages = compile_chain(&request(1.0, 0.0, 500)).unwrap();
        assert!(stages.contains(&FilterStage::Lowpass { cutoff_hz: 2000 }));

        let stages = compile_chain(&request(1.0, 0.0, 5000)).unwrap();
        assert!(stages.contains(&FilterStage::Lowpass { cutoff_hz: 5000 }));
    }

    #[test]
    fn test_fixed_normalization_targets() {
        let stages = compile_chain(&request(1.0, 0.0, 9000)).unwrap();
        assert_eq!(
            stages[0],
            FilterStage::LoudnessNormalize {
                target_lufs: -16.0,
                true_peak_db: -2.0,
                loudness_range_lu: 11.0,
            }
        );
    }

    #[test]
    fn test_compress_constants() {
        let stages = compile_chain(&request(1.0, 0.0, 9000)).unwrap();
        match &stages[1] {
            FilterStage::Compress {
                attack_s,
                decay_s,
                knee_db,
                curve,
            } => {
                assert_eq!(*attack_s, 0.02);
                assert_eq!(*decay_s, 0.25);
                assert_eq!(*knee_db, 6.0);
                assert_eq!(curve.len(), 6);
                assert_eq!(curve[0], (-90.0, -90.0));
                assert_eq!(curve[curve.len() - 1], (0.0, -6.0));
            }
            other => panic!("expected compress stage, got {other:?}"),
        }
    }

    #[test]
    fn test_tempo_correction_within_range() {
        assert_eq!(tempo_correction(1.2), vec![1.2]);
        assert_eq!(tempo_correction(0.5), vec![0.5]);
        assert_eq!(tempo_correction(2.0), vec![2.0]);
    }

    #[test]
    fn test_tempo_correction_decomposes_below_range() {
        assert_eq!(tempo_correction(0.25), vec![0.5, 0.5]);
        let factors = tempo_correction(0.4);
        assert_eq!(factors[0], 0.5);
        assert_abs_diff_eq!(factors[0] * factors[1], 0.4, epsilon = 1e-9);
    }

    #[test]
    fn test_tempo_correction_decomposes_above_range() {
        let factors = tempo_correction(3.0);
        assert_eq!(factors[0], 2.0);
        assert_abs_diff_eq!(factors[0] * factors[1], 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_tempo_correction_product_is_exact_across_shifts() {
        for semitones in [-24.0, -12.0, -7.5, -1.0, 0.3, 5.0, 12.0, 24.0] {
            let ratio = (semitones as f64 / 12.0).exp2();
            let inv = 1.0 / ratio;
            let product: f64 = tempo_correction(inv).iter().product();
            assert_abs_diff_eq!(product, inv, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_pitch_down_octave_boundary_not_decomposed() {
        // -12 semitones: ratio 0.5, correction exactly 2.0, the boundary of
        // the tempo primitive's range
        let stages = compile_chain(&request(1.0, -12.0, 9000)).unwrap();
        let tempo_factors: Vec<f64> = stages
            .iter()
            .skip(5)
            .filter_map(|s| match s {
                FilterStage::TempoShift { factor } => Some(*factor),
                _ => None,
            })
            .collect();
        assert_eq!(tempo_factors, vec![2.0]);
    }

    #[test]
    fn test_pitch_up_two_octaves_decomposed() {
        // +24 semitones: ratio 4.0, correction 0.25 splits into 0.5 x 0.5
        let stages = compile_chain(&request(1.0, 24.0, 9000)).unwrap();
        let tempo_factors: Vec<f64> = stages
            .iter()
            .skip(5)
            .filter_map(|s| match s {
                FilterStage::TempoShift { factor } => Some(*factor),
                _ => None,
            })
            .collect();
        assert_eq!(tempo_factors, vec![0.5, 0.5]);
    }

    #[test]
    fn test_pitch_resample_ratio() {
        let stages = compile_chain(&request(1.0, -12.0, 9000)).unwrap();
        match stages[5] {
            FilterStage::PitchResample { ratio } => {
                assert_abs_diff_eq!(ratio, 0.5, epsilon = 1e-12)
            }
            ref other => panic!("expected pitch-resample, got {other:?}"),
        }
    }

    #[test]
    fn test_sleep_example_request() {
        // preset sleep, speed 1.2, pitch 0, lowpass 5000: the preset caps
        // speed to 0.95 and forces pitch to -1.0, so compensation appears
        let req = TransformRequest {
            preset: Preset::Sleep,
            target_lufs: -16.0,
            limiter_db: -1.5,
            speed: 1.2,
            pitch_semitones: 0.0,
            lowpass_hz: 5000,
        }
        .resolved();

        assert_eq!(req.target_lufs, -18.0);
        assert_eq!(req.limiter_db, -2.0);
        assert_eq!(req.speed, 0.95);
        assert_eq!(req.pitch_semitones, -1.0);
        assert_eq!(req.lowpass_hz, 5000);

        let stages = compile_chain(&req).unwrap();
        assert_eq!(stages[4], FilterStage::TempoShift { factor: 0.95 });
        assert!(stages
            .iter()
            .any(|s| matches!(s, FilterStage::PitchResample { .. })));
    }

    #[test]
    fn test_raw_example_request_emits_no_compensation() {
        // preset raw forces pitch to 0 even when the caller asked for -7
        let req = TransformRequest {
            preset: Preset::Raw,
            target_lufs: -16.0,
            limiter_db: -1.0,
            speed: 1.0,
            pitch_semitones: -7.0,
            lowpass_hz: 20_000,
        }
        .resolved();

        let stages = compile_chain(&req).unwrap();
        assert_eq!(stages.len(), 5);
        assert_eq!(stages[4], FilterStage::TempoShift { factor: 1.0 });
        assert!(!stages
            .iter()
            .any(|s| matches!(s, FilterStage::PitchResample { .. })));
    }

    #[test]
    fn test_compile_is_deterministic() {
        let req = request(0.9, -3.2, 7000);
        assert_eq!(compile_chain(&req).unwrap(), compile_chain(&req).unwrap());
    }
}
