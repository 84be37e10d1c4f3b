// Main entry point - Dependency injection and simulation lifecycle
mod application;
mod domain;
mod error;
mod infrastructure;

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tracing_subscriber::EnvFilter;

use crate::application::clock::Clock;
use crate::application::dashboard_service::DashboardService;
use crate::application::frame_renderer::FrameRenderer;
use crate::infrastructure::config::{OutputFormat, load_dashboard_config};
use crate::infrastructure::json_renderer::JsonLinesRenderer;
use crate::infrastructure::log_renderer::LogRenderer;
use crate::infrastructure::system_clock::SystemClock;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries frames
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = load_dashboard_config()?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let renderer: Arc<dyn FrameRenderer> = match config.render.output {
        OutputFormat::Json => Arc::new(JsonLinesRenderer::stdout()),
        OutputFormat::Log => Arc::new(LogRenderer::new()),
    };

    // Mount every channel (application layer)
    let mut service = DashboardService::mount(
        config.channel_params(),
        config.screen_layouts(),
        clock,
        Duration::from_millis(config.render.frame_interval_ms),
        config.render.seed,
    )?;

    let frames = service.frames();
    tokio::pin!(frames);

    tracing::info!("Starting agritech telemetry simulation, Ctrl-C to stop");

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            frame = frames.next() => {
                let Some(frame) = frame else { break };
                if let Err(e) = renderer.render(&frame).await {
                    tracing::error!("Error rendering frame: {:#}", e);
                }
            }
            _ = &mut shutdown => {
                tracing::info!("Shutting down");
                break;
            }
        }
    }

    let last = service.frame_now();
    tracing::info!(rendered_at = %last.rendered_at, settled = last.is_settled(), "final frame");
    service.shutdown().await;

    Ok(())
}
