//! Nocturne CLI - Nighttime Audio Transformation Service
//!
//! Command-line interface for the Nocturne service.

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nocturne::cli::{commands, Cli, Commands};
use nocturne::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nocturne=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            host,
            port,
            output_root,
            frontend_dir,
            retention_hours,
            tools,
        } => {
            let mut config = Config {
                host,
                port,
                frontend_dir,
                retention_hours,
                ..Config::default()
            };
            if let Some(root) = output_root {
                config.output_root = root;
            }
            tools.apply(&mut config);

            info!("Nocturne v{}", env!("CARGO_PKG_VERSION"));
            commands::serve(config).await?;
        }
        Commands::Plan { params } => commands::plan(&params)?,
        Commands::Process {
            url,
            params,
            output,
            tools,
        } => {
            let mut config = Config::default();
            tools.apply(&mut config);
            commands::process(&url, &params, output, config).await?;
        }
    }

    Ok(())
}
