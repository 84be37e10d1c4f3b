// Log renderer - Writes each new reading as a structured log line
use crate::application::frame_renderer::FrameRenderer;
use crate::domain::dashboard::DashboardFrame;
use crate::domain::telemetry::Timestamp;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Logs a channel once per published snapshot; gauge motion in between is
/// only visible at `trace` level.
#[derive(Default)]
pub struct LogRenderer {
    last_logged: Mutex<HashMap<String, Timestamp>>,
}

impl LogRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FrameRenderer for LogRenderer {
    async fn render(&self, frame: &DashboardFrame) -> anyhow::Result<()> {
        let mut last_logged = self.last_logged.lock().await;

        for screen in &frame.screens {
            for channel in &screen.channels {
                if !first_sighting(&mut last_logged, &channel.id, channel.snapshot.taken_at) {
                    tracing::trace!(
                        channel = %channel.id,
                        gauge = channel.gauge_value,
                        "gauge moving"
                    );
                    continue;
                }

                let stats = &channel.snapshot.stats;
                tracing::info!(
                    screen = %screen.title,
                    channel = %channel.id,
                    unit = %channel.unit,
                    current = stats.current,
                    min = stats.min,
                    max = stats.max,
                    average = stats.average,
                    gauge = %format!("{:.0}%", channel.gauge_fraction * 100.0),
                    labels = ?channel.snapshot.labels,
                    "{} {}{}",
                    channel.title,
                    stats.current,
                    channel.unit
                );
            }
        }

        Ok(())
    }
}

/// Record `taken_at` for `id`, returning whether it had not been seen yet.
fn first_sighting(
    last_logged: &mut HashMap<String, Timestamp>,
    id: &str,
    taken_at: Timestamp,
) -> bool {
    if last_logged.get(id) == Some(&taken_at) {
        return false;
    }
    last_logged.insert(id.to_string(), taken_at);
    true
}
