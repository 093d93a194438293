//! HTTP request handlers

use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::info;

use super::{AppState, APP_NAME};
use crate::error::{NocturneError, Result};
use crate::executor::{render_filter, validate_url};
use crate::planner::{compile_chain, Preset, TransformRequest};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ProcessRequest {
    /// Source media URL
    pub url: String,
    #[serde(default = "default_preset")]
    pub preset: String,
    /// Normalization target loudness (LUFS)
    #[serde(default = "default_target_lufs")]
    pub target_lufs: f64,
    /// Limiter ceiling (dBFS)
    #[serde(default = "default_limiter_db")]
    pub limiter_db: f64,
    /// Playback speed (0.5-1.5); below 1 slows speech
    #[serde(default = "default_speed")]
    pub speed: f64,
    /// Pitch shift in semitones; negative lowers tone
    #[serde(default = "default_pitch_semitones")]
    pub pitch_semitones: f64,
    /// Low-pass cutoff to reduce harsh treble (Hz)
    #[serde(default = "default_lowpass_hz")]
    pub lowpass_hz: u32,
}

fn default_preset() -> String {
    "sleep".to_string()
}

fn default_target_lufs() -> f64 {
    -16.0
}

fn default_limiter_db() -> f64 {
    -1.5
}

fn default_speed() -> f64 {
    0.9
}

fn default_pitch_semitones() -> f64 {
    -1.0
}

fn default_lowpass_hz() -> u32 {
    9000
}

#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub job_id: String,
    pub download_url: String,
    pub info: JobInfo,
}

#[derive(Debug, Serialize)]
pub struct JobInfo {
    pub preset: String,
    pub filter: String,
    pub output: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub app: &'static str,
    pub version: &'static str,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        app: APP_NAME,
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// POST /api/process - run the full pipeline for one URL
pub async fn process(
    State(state): State<AppState>,
    Json(req): Json<ProcessRequest>,
) -> Result<Json<ProcessResponse>> {
    validate_url(&req.url)?;

    let preset: Preset = req.preset.parse()?;
    let request = TransformRequest {
        preset,
        target_lufs: req.target_lufs,
        limiter_db: req.limiter_db,
        speed: req.speed,
        pitch_semitones: req.pitch_semitones,
        lowpass_hz: req.lowpass_hz,
    }
    .resolved();

    let stages = compile_chain(&request)?;
    let filter = render_filter(&stages);
    info!(preset = %preset, filter = %filter, "compiled chain");

    let job = state.executor.run(&req.url, &stages).await?;

    Ok(Json(ProcessResponse {
        download_url: format!("/api/download/{}", job.job_id),
        info: JobInfo {
            preset: preset.as_str().to_string(),
            filter,
            output: job.output_path.display().to_string(),
            created_at: job.created_at,
        },
        job_id: job.job_id,
    }))
}

/// GET /api/download/:job_id - stream a finished job's artifact
pub async fn download(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Response> {
    validate_job_id(&job_id)?;
    let path = state.executor.store().resolve(&job_id)?;

    let file = File::open(&path).await?;
    let stream = ReaderStream::new(file);

    let headers = [
        (header::CONTENT_TYPE, "audio/mpeg".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"nocturne_{job_id}.mp3\""),
        ),
    ];
    Ok((headers, Body::from_stream(stream)).into_response())
}

/// Job ids are uuid hex; anything else (notably path separators) is treated
/// as an unknown job rather than a path on disk.
fn validate_job_id(job_id: &str) -> Result<()> {
    if !job_id.is_empty() && job_id.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(NocturneError::JobNotFound {
            job_id: job_id.to_string(),
        })
    }
}
