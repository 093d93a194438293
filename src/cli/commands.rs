//! CLI Command Implementations

use std::path::PathBuf;

use tracing::info;

use super::TransformArgs;
use crate::config::Config;
use crate::error::Result;
use crate::executor::{render_filter, render_stage, validate_url, JobExecutor};
use crate::planner::compile_chain;
use crate::server;

/// Run the HTTP service until interrupted.
pub async fn serve(config: Config) -> Result<()> {
    server::run(config).await
}

/// Compile and print the stage chain for a parameter set.
pub fn plan(params: &TransformArgs) -> Result<()> {
    let request = params.to_request()?.resolved();
    let stages = compile_chain(&request)?;

    println!("Resolved request:");
    println!("  preset           {}", request.preset);
    println!("  target_lufs      {}", request.target_lufs);
    println!("  limiter_db       {}", request.limiter_db);
    println!("  speed            {}", request.speed);
    println!("  pitch_semitones  {}", request.pitch_semitones);
    println!("  lowpass_hz       {}", request.lowpass_hz);
    println!();
    println!("Stages:");
    for (i, stage) in stages.iter().enumerate() {
        println!("  {}. {:<20} {}", i + 1, stage.kind(), render_stage(stage));
    }
    println!();
    println!("Engine filter: {}", render_filter(&stages));

    Ok(())
}

/// One-shot pipeline: download, process, and report the artifact path.
pub async fn process(
    url: &str,
    params: &TransformArgs,
    output: Option<PathBuf>,
    config: Config,
) -> Result<()> {
    validate_url(url)?;
    config.check_tools()?;

    let request = params.to_request()?.resolved();
    let stages = compile_chain(&request)?;
    info!(filter = %render_filter(&stages), "compiled chain");

    let executor = JobExecutor::new(&config)?;
    let job = executor.run(url, &stages).await?;

    let final_path = match output {
        Some(dest) => {
            std::fs::copy(&job.output_path, &dest)?;
            executor.store().remove(&job.job_id)?;
            dest
        }
        None => job.output_path,
    };

    println!("Output: {}", final_path.display());
    Ok(())
}
