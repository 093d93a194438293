//! Job Executor
//!
//! Everything around the planner that touches the outside world: source
//! download, engine invocation, and artifact bookkeeping. Each job runs
//! independently in its own task with a private working directory, so one
//! job's failure or long runtime never blocks another. Executor errors are
//! surfaced as-is; transient network failures are the caller's to retry.

mod download;
mod engine;
mod store;

pub use download::{download_audio, validate_url};
pub use engine::{render_filter, render_stage, FfmpegEngine};
pub use store::OutputStore;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::Result;
use crate::planner::FilterStage;

/// Identifier and location of a finished job's artifact.
#[derive(Debug, Clone)]
pub struct JobOutput {
    pub job_id: String,
    pub output_path: PathBuf,
    pub created_at: DateTime<Utc>,
}

/// Runs download + processing pipelines and owns the artifact store.
pub struct JobExecutor {
    engine: FfmpegEngine,
    ytdlp: PathBuf,
    store: OutputStore,
}

impl JobExecutor {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            engine: FfmpegEngine::new(config.ffmpeg.clone()),
            ytdlp: config.ytdlp.clone(),
            store: OutputStore::open(&config.output_root)?,
        })
    }

    pub fn store(&self) -> &OutputStore {
        &self.store
    }

    /// Run one job: download the source audio, apply the compiled stage
    /// chain, and persist the artifact under a fresh job id.
    ///
    /// On any failure partway through, the partial output artifact is
    /// removed before the error is reported; a failed job is never visible
    /// to later download requests.
    pub async fn run(&self, url: &str, stages: &[FilterStage]) -> Result<JobOutput> {
        let job_id = Uuid::new_v4().simple().to_string();
        let output_path = self.store.path_for(&job_id);

        let workdir = tempfile::Builder::new().prefix("nocturne_").tempdir()?;
        info!(job_id = %job_id, url = %url, "starting job");

        let result = async {
            let input = download_audio(&self.ytdlp, url, workdir.path()).await?;
            self.engine.process(&input, &output_path, stages).await
        }
        .await;

        if let Err(err) = result {
            if let Err(remove_err) = self.store.remove(&job_id) {
                warn!(job_id = %job_id, "failed to clear partial output: {remove_err}");
            }
            return Err(err);
        }

        info!(job_id = %job_id, output = %output_path.display(), "job finished");
        Ok(JobOutput {
            job_id,
            output_path,
            created_at: Utc::now(),
        })
    }
}
