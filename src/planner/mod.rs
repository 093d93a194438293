//! Transform Planner
//!
//! Compiles user-facing parameters (preset, loudness, limiter ceiling,
//! speed, pitch shift, low-pass cutoff) into the ordered chain of filter
//! stages the processing engine applies.
//!
//! The planner is pure: no I/O, no shared state, and deterministic for
//! identical inputs, so it is safe to invoke concurrently without
//! coordination. All of its failures are user-correctable and retrying
//! without changing the input cannot help.

mod chain;
mod preset;
mod request;
mod stage;

pub use chain::{
    compile_chain, tempo_correction, ChainBuilder, COMPRESS_CURVE, LOWPASS_FLOOR_HZ, SPEED_MAX,
    SPEED_MIN, TEMPO_FACTOR_MAX, TEMPO_FACTOR_MIN,
};
pub use preset::Preset;
pub use request::TransformRequest;
pub use stage::{CurvePoint, FilterStage};
