// Axis labels - Thins a window's timestamps to a bounded set of chart labels
use super::telemetry::Timestamp;
use serde::Deserialize;

/// How a channel's chart axis names its points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelStyle {
    /// Zero-padded `HH:MM` of each sample's timestamp
    #[default]
    Clock,
    /// 1-based position in the window
    Ordinal,
}

pub fn stride(len: usize, max_labels: usize) -> usize {
    if max_labels == 0 {
        return len.max(1);
    }
    len.div_ceil(max_labels).max(1)
}

/// Every `stride`-th element starting at index 0, order preserved.
pub fn thin<T: Clone>(items: &[T], max_labels: usize) -> Vec<T> {
    let step = stride(items.len(), max_labels);
    items.iter().step_by(step).cloned().collect()
}

pub fn format_clock(timestamp: &Timestamp) -> String {
    timestamp.format("%H:%M").to_string()
}

pub fn sample_labels(timestamps: &[Timestamp], max_labels: usize) -> Vec<String> {
    thin(timestamps, max_labels)
        .iter()
        .map(format_clock)
        .collect()
}

pub fn ordinal_labels(len: usize, max_labels: usize) -> Vec<String> {
    let positions: Vec<usize> = (1..=len).collect();
    thin(&positions, max_labels)
        .into_iter()
        .map(|p| p.to_string())
        .collect()
}

pub fn labels_for(style: LabelStyle, timestamps: &[Timestamp], max_labels: usize) -> Vec<String> {
    match style {
        LabelStyle::Clock => sample_labels(timestamps, max_labels),
        LabelStyle::Ordinal => ordinal_labels(timestamps.len(), max_labels),
    }
}
