// Mapper to convert domain frames to serialisable views
use crate::domain::dashboard::{ChannelFrame, DashboardFrame, ScreenFrame};
use crate::domain::stats::DerivedStats;
use serde::Serialize;

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

#[derive(Debug, Serialize)]
pub struct FrameView {
    pub rendered_at: String,
    pub screens: Vec<ScreenView>,
}

#[derive(Debug, Serialize)]
pub struct ScreenView {
    pub title: String,
    pub channels: Vec<ChannelView>,
}

#[derive(Debug, Serialize)]
pub struct ChannelView {
    pub id: String,
    pub kind: &'static str,
    pub title: String,
    pub unit: String,
    pub sampled_at: String,
    pub stats: StatsView,
    pub series: Vec<f64>,
    pub labels: Vec<String>,
    pub gauge_value: f64,
    pub gauge_target: f64,
    pub gauge_fraction: f64,
    pub settled: bool,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct StatsView {
    pub min: f64,
    pub max: f64,
    pub average: f64,
    pub current: f64,
}

pub fn frame_to_view(frame: &DashboardFrame) -> FrameView {
    FrameView {
        rendered_at: frame.rendered_at.format(TIME_FORMAT).to_string(),
        screens: frame.screens.iter().map(screen_to_view).collect(),
    }
}

fn screen_to_view(screen: &ScreenFrame) -> ScreenView {
    ScreenView {
        title: screen.title.clone(),
        channels: screen.channels.iter().map(channel_to_view).collect(),
    }
}

fn channel_to_view(channel: &ChannelFrame) -> ChannelView {
    let snapshot = &channel.snapshot;
    ChannelView {
        id: channel.id.clone(),
        kind: channel.kind.as_str(),
        title: channel.title.clone(),
        unit: channel.unit.clone(),
        sampled_at: snapshot.taken_at.format(TIME_FORMAT).to_string(),
        stats: stats_to_view(&snapshot.stats),
        series: snapshot.series.clone(),
        labels: snapshot.labels.clone(),
        gauge_value: channel.gauge_value,
        gauge_target: snapshot.gauge.target(),
        gauge_fraction: channel.gauge_fraction,
        settled: channel.settled,
    }
}

fn stats_to_view(stats: &DerivedStats) -> StatsView {
    StatsView {
        min: stats.min,
        max: stats.max,
        average: stats.average,
        current: stats.current,
    }
}
