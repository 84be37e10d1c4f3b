// Dashboard frame domain model
use super::channel::ChannelKind;
use super::telemetry::{Snapshot, Timestamp};
use std::sync::Arc;

/// One channel as it should be drawn at `DashboardFrame::rendered_at`.
#[derive(Debug, Clone)]
pub struct ChannelFrame {
    pub id: String,
    pub kind: ChannelKind,
    pub title: String,
    pub unit: String,
    pub snapshot: Arc<Snapshot>,
    pub gauge_value: f64,
    pub gauge_fraction: f64,
    pub settled: bool,
}

#[derive(Debug, Clone)]
pub struct ScreenFrame {
    pub title: String,
    pub channels: Vec<ChannelFrame>,
}

#[derive(Debug, Clone)]
pub struct DashboardFrame {
    pub rendered_at: Timestamp,
    pub screens: Vec<ScreenFrame>,
}

impl DashboardFrame {
    pub fn new(rendered_at: Timestamp, screens: Vec<ScreenFrame>) -> Self {
        Self {
            rendered_at,
            screens,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.screens
            .iter()
            .flat_map(|s| s.channels.iter())
            .all(|c| c.settled)
    }
}
