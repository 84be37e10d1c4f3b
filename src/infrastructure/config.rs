use crate::application::dashboard_service::ScreenLayout;
use crate::domain::channel::{ChannelKind, ChannelParams, GaugeStart, SeedProfile, WalkModel};
use crate::domain::gauge::Easing;
use crate::domain::labels::LabelStyle;
use serde::Deserialize;
use std::path::Path;

const CONFIG_PATH: &str = "config/dashboard.toml";
const ENV_PREFIX: &str = "AGRITECH";

/// Shipped channel set, used when no config file is present.
pub const DEFAULT_DASHBOARD: &str = include_str!("../../config/dashboard.toml");

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    #[serde(default)]
    pub render: RenderSettings,
    #[serde(default)]
    pub channels: Vec<ChannelConfig>,
    #[serde(default)]
    pub screens: Vec<ScreenConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RenderSettings {
    #[serde(default)]
    pub output: OutputFormat,
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
    /// Fixed generator seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            output: OutputFormat::default(),
            frame_interval_ms: default_frame_interval_ms(),
            seed: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Json,
    Log,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChannelConfig {
    pub id: String,
    pub kind: ChannelKind,
    pub title: Option<String>,
    #[serde(default)]
    pub unit: String,
    pub capacity: usize,
    pub lower_bound: f64,
    pub upper_bound: f64,
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_animation_duration_ms")]
    pub animation_duration_ms: u64,
    #[serde(default = "default_max_labels")]
    pub max_labels: usize,
    #[serde(default)]
    pub easing: Easing,
    #[serde(default)]
    pub label_style: LabelStyle,
    pub gauge_max: Option<f64>,
    #[serde(default)]
    pub gauge_start: GaugeStart,
    #[serde(default)]
    pub gauge_sweep_in: bool,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub seed: SeedConfig,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelConfig {
    MeanReverting {
        target_mean: Option<f64>,
        reversion_rate: f64,
        noise_amplitude: f64,
    },
    #[default]
    Uniform,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SeedConfig {
    Flat {
        #[serde(default)]
        values: Vec<f64>,
    },
    Sinusoid {
        base: f64,
        amplitude: f64,
        period: f64,
        #[serde(default)]
        noise: f64,
        #[serde(default = "default_step_minutes")]
        step_minutes: i64,
        lower: Option<f64>,
        upper: Option<f64>,
    },
}

impl Default for SeedConfig {
    fn default() -> Self {
        SeedConfig::Flat { values: Vec::new() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScreenConfig {
    pub title: String,
    #[serde(default)]
    pub channels: Vec<String>,
}

fn default_frame_interval_ms() -> u64 {
    100
}

fn default_tick_interval_ms() -> u64 {
    5_000
}

fn default_animation_duration_ms() -> u64 {
    700
}

fn default_max_labels() -> usize {
    6
}

fn default_step_minutes() -> i64 {
    60
}

/// Load `config/dashboard.toml`, falling back to the shipped defaults, with
/// `AGRITECH__SECTION__KEY` environment overrides on top.
pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    load_from(Path::new(CONFIG_PATH), environment())
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

fn load_from(path: &Path, env: config::Environment) -> anyhow::Result<DashboardConfig> {
    let builder = config::Config::builder();
    let builder = if path.exists() {
        builder.add_source(config::File::from(path))
    } else {
        tracing::warn!(
            "Config file not found at '{}'; using built-in channels.",
            path.display()
        );
        builder.add_source(config::File::from_str(
            DEFAULT_DASHBOARD,
            config::FileFormat::Toml,
        ))
    };

    let settings = builder.add_source(env).build()?;
    Ok(settings.try_deserialize()?)
}

impl DashboardConfig {
    pub fn channel_params(&self) -> Vec<ChannelParams> {
        self.channels.iter().map(ChannelConfig::to_params).collect()
    }

    /// Configured screens, or one screen per channel when none are listed.
    pub fn screen_layouts(&self) -> Vec<ScreenLayout> {
        if self.screens.is_empty() {
            return self
                .channels
                .iter()
                .map(|c| ScreenLayout {
                    title: c.title.clone().unwrap_or_else(|| c.id.clone()),
                    channel_ids: vec![c.id.clone()],
                })
                .collect();
        }

        self.screens
            .iter()
            .map(|s| ScreenLayout {
                title: s.title.clone(),
                channel_ids: s.channels.clone(),
            })
            .collect()
    }
}

impl ChannelConfig {
    /// Map onto domain parameters. Validation is left to the domain.
    pub fn to_params(&self) -> ChannelParams {
        let midpoint = (self.lower_bound + self.upper_bound) / 2.0;
        let model = match &self.model {
            ModelConfig::MeanReverting {
                target_mean,
                reversion_rate,
                noise_amplitude,
            } => WalkModel::MeanReverting {
                target_mean: target_mean.unwrap_or(midpoint),
                reversion_rate: *reversion_rate,
                noise_amplitude: *noise_amplitude,
            },
            ModelConfig::Uniform => WalkModel::Uniform,
        };

        let seed = match &self.seed {
            SeedConfig::Flat { values } => SeedProfile::Flat(values.clone()),
            SeedConfig::Sinusoid {
                base,
                amplitude,
                period,
                noise,
                step_minutes,
                lower,
                upper,
            } => SeedProfile::Sinusoid {
                base: *base,
                amplitude: *amplitude,
                period: *period,
                noise: *noise,
                step_minutes: *step_minutes,
                lower: lower.unwrap_or(self.lower_bound),
                upper: upper.unwrap_or(self.upper_bound),
            },
        };

        let mut params = ChannelParams::new(
            &self.id,
            self.kind,
            self.capacity,
            self.lower_bound,
            self.upper_bound,
        )
        .with_model(model)
        .with_seed(seed);

        params.title = self.title.clone().unwrap_or_else(|| self.id.clone());
        params.unit = self.unit.clone();
        params.tick_interval_ms = self.tick_interval_ms;
        params.animation_duration_ms = self.animation_duration_ms;
        params.max_labels = self.max_labels;
        params.easing = self.easing;
        params.label_style = self.label_style;
        params.gauge_max = self.gauge_max.unwrap_or(self.upper_bound);
        params.gauge_start = self.gauge_start;
        params.gauge_sweep_in = self.gauge_sweep_in;
        params
    }
}
