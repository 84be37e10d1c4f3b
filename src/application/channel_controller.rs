// Channel controller - Owns one channel's simulation and publishes snapshots
use crate::domain::channel::{ChannelParams, GaugeStart};
use crate::domain::gauge::GaugeAnimator;
use crate::domain::generator::{next_value, seed_samples};
use crate::domain::labels::labels_for;
use crate::domain::stats::reduce;
use crate::domain::telemetry::{Sample, Snapshot, Timestamp};
use crate::domain::window::RollingWindow;
use crate::error::Result;
use rand::Rng;
use rand::rngs::StdRng;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// Holding only its mount-time history
    Seeded,
    Running { ticks: u64 },
}

/// Single writer for one channel.
///
/// Every tick builds a complete [`Snapshot`] and swaps it into a watch
/// channel, so readers only ever see whole snapshots.
pub struct ChannelController<R = StdRng> {
    params: ChannelParams,
    window: RollingWindow,
    gauge: GaugeAnimator,
    rng: R,
    state: ControllerState,
    published: watch::Sender<Arc<Snapshot>>,
}

impl<R: Rng> ChannelController<R> {
    pub fn new(params: ChannelParams, mut rng: R, now: Timestamp) -> Result<Self> {
        params.validate()?;

        let mut window = RollingWindow::new(params.capacity);
        window.seed(seed_samples(&params, now, &mut rng));

        let stats = reduce(&window.snapshot());
        let resting = match params.gauge_start {
            GaugeStart::Latest => stats.current,
            GaugeStart::Average => stats.average,
        };
        let gauge = if params.gauge_sweep_in {
            let mut gauge =
                GaugeAnimator::settled(0.0, now, params.animation_duration_ms, params.easing);
            gauge.retarget(resting, now);
            gauge
        } else {
            GaugeAnimator::settled(resting, now, params.animation_duration_ms, params.easing)
        };

        let snapshot = compose(&params, &window, &gauge, now);
        let (published, _) = watch::channel(Arc::new(snapshot));

        tracing::info!(
            channel = %params.id,
            kind = params.kind.as_str(),
            samples = window.len(),
            capacity = window.capacity(),
            reversion_rate = params.reversion_rate(),
            noise_amplitude = params.noise_amplitude(),
            "channel seeded"
        );

        Ok(Self {
            params,
            window,
            gauge,
            rng,
            state: ControllerState::Seeded,
            published,
        })
    }

    /// Advance the simulation by one sample and publish the result.
    pub fn tick(&mut self, now: Timestamp) -> Arc<Snapshot> {
        let previous = self
            .window
            .latest()
            .map(|s| s.value)
            .unwrap_or_else(|| self.params.midpoint());
        let value = next_value(previous, &self.params, &mut self.rng);

        let stamped = match self.window.latest() {
            Some(last) if now < last.timestamp => {
                tracing::warn!(
                    channel = %self.params.id,
                    now = %now,
                    newest = %last.timestamp,
                    "clock went backwards, reusing newest sample time"
                );
                last.timestamp
            }
            _ => now,
        };

        self.window.push(Sample::new(stamped, value));
        self.gauge.retarget(value, now);
        self.state = match self.state {
            ControllerState::Seeded => ControllerState::Running { ticks: 1 },
            ControllerState::Running { ticks } => ControllerState::Running { ticks: ticks + 1 },
        };

        let snapshot = Arc::new(compose(&self.params, &self.window, &self.gauge, now));
        self.published.send_replace(snapshot.clone());

        tracing::debug!(
            channel = %self.params.id,
            value,
            previous,
            window = self.window.len(),
            "tick"
        );

        snapshot
    }

    /// Latest published snapshot. Does not advance anything.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.published.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.published.subscribe()
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn params(&self) -> &ChannelParams {
        &self.params
    }
}

fn compose(
    params: &ChannelParams,
    window: &RollingWindow,
    gauge: &GaugeAnimator,
    now: Timestamp,
) -> Snapshot {
    let samples = window.snapshot();
    let timestamps: Vec<Timestamp> = samples.iter().map(|s| s.timestamp).collect();

    Snapshot {
        taken_at: now,
        stats: reduce(&samples),
        series: samples.iter().map(|s| s.value).collect(),
        labels: labels_for(params.label_style, &timestamps, params.max_labels),
        gauge_value: gauge.value_at(now),
        gauge: *gauge,
        gauge_max: params.gauge_max,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::channel::{ChannelKind, SeedProfile, WalkModel};
    use crate::domain::labels::LabelStyle;
    use crate::error::EngineError;
    use chrono::{NaiveDate, TimeDelta};
    use rand::SeedableRng;

    fn mount() -> Timestamp {
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(14, 0, 0)
            .unwrap()
    }

    fn light() -> ChannelParams {
        let mut params = ChannelParams::new("light", ChannelKind::Light, 7, 300.0, 600.0)
            .with_seed(SeedProfile::Flat(vec![
                300.0, 320.0, 340.0, 360.0, 400.0, 420.0, 440.0,
            ]));
        params.animation_duration_ms = 800;
        params.label_style = LabelStyle::Ordinal;
        params.max_labels = 7;
        params
    }

    fn soil() -> ChannelParams {
        let mut params = ChannelParams::new("soil", ChannelKind::SoilHumidity, 24, 5.0, 95.0)
            .with_model(WalkModel::MeanReverting {
                target_mean: 50.0,
                reversion_rate: 0.05,
                noise_amplitude: 8.0,
            })
            .with_seed(SeedProfile::Sinusoid {
                base: 40.0,
                amplitude: 8.0,
                period: 3.0,
                noise: 8.0,
                step_minutes: 60,
                lower: 10.0,
                upper: 95.0,
            });
        params.gauge_start = GaugeStart::Average;
        params.gauge_sweep_in = true;
        params.gauge_max = 100.0;
        params
    }

    #[test]
    fn test_light_tick_end_to_end() {
        let mut controller =
            ChannelController::new(light(), StdRng::seed_from_u64(5), mount()).unwrap();
        assert_eq!(controller.state(), ControllerState::Seeded);
        assert_eq!(controller.snapshot().gauge_value, 440.0);

        let now = mount() + TimeDelta::seconds(5);
        let snapshot = controller.tick(now);
        let new_value = *snapshot.series.last().unwrap();

        assert_eq!(snapshot.series.len(), 7);
        assert_eq!(
            snapshot.series[..6],
            [320.0, 340.0, 360.0, 400.0, 420.0, 440.0]
        );
        assert!((300.0..=600.0).contains(&new_value));
        assert_eq!(snapshot.stats.current, new_value);
        assert_eq!(snapshot.gauge.start(), 440.0);
        assert_eq!(snapshot.gauge.target(), new_value);
        assert_eq!(snapshot.gauge_value_at(now), 440.0);
        assert_eq!(snapshot.gauge_value_at(now + TimeDelta::milliseconds(800)), new_value);
        assert_eq!(controller.state(), ControllerState::Running { ticks: 1 });
        assert_eq!(snapshot.labels, vec!["1", "2", "3", "4", "5", "6", "7"]);
    }

    #[test]
    fn test_bounds_hold_over_many_ticks() {
        let mut controller =
            ChannelController::new(soil(), StdRng::seed_from_u64(21), mount()).unwrap();
        for i in 1..=2_000 {
            let snapshot = controller.tick(mount() + TimeDelta::seconds(5 * i));
            assert_eq!(snapshot.series.len(), 24);
            let current = snapshot.stats.current;
            assert!((5.0..=95.0).contains(&current));
            assert!(snapshot.labels.len() <= 6);
        }
        assert_eq!(controller.state(), ControllerState::Running { ticks: 2_000 });
    }

    #[test]
    fn test_soil_gauge_sweeps_to_average() {
        let controller =
            ChannelController::new(soil(), StdRng::seed_from_u64(8), mount()).unwrap();
        let snapshot = controller.snapshot();

        assert_eq!(snapshot.series.len(), 24);
        assert_eq!(snapshot.labels.len(), 6);
        assert_eq!(snapshot.gauge_value, 0.0);
        let settled = snapshot.gauge_value_at(mount() + TimeDelta::milliseconds(700));
        assert_eq!(settled, snapshot.stats.average);
        assert_eq!(
            snapshot.gauge_fraction_at(mount() + TimeDelta::seconds(1)),
            snapshot.stats.average / 100.0
        );
    }

    #[test]
    fn test_invalid_config_fails_construction() {
        let mut params = light();
        params.capacity = 0;
        let result = ChannelController::new(params, StdRng::seed_from_u64(0), mount());
        assert!(matches!(result, Err(EngineError::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_empty_seed_steps_from_midpoint() {
        let params = ChannelParams::new("soil", ChannelKind::SoilHumidity, 5, 5.0, 95.0)
            .with_model(WalkModel::MeanReverting {
                target_mean: 50.0,
                reversion_rate: 0.0,
                noise_amplitude: 0.0,
            });
        let mut controller =
            ChannelController::new(params, StdRng::seed_from_u64(0), mount()).unwrap();

        let seeded = controller.snapshot();
        assert!(seeded.series.is_empty());
        assert_eq!(seeded.stats.current, 0.0);
        assert!(seeded.labels.is_empty());

        let snapshot = controller.tick(mount() + TimeDelta::seconds(5));
        assert_eq!(snapshot.series, vec![50.0]);
    }

    #[test]
    fn test_clock_regression_keeps_order() {
        let mut controller =
            ChannelController::new(light(), StdRng::seed_from_u64(2), mount()).unwrap();
        controller.tick(mount() + TimeDelta::seconds(5));
        let newest = controller.window.latest().unwrap().timestamp;
        let snapshot = controller.tick(mount() - TimeDelta::minutes(10));

        assert_eq!(snapshot.series.len(), 7);
        assert_eq!(snapshot.gauge_value_at(mount() - TimeDelta::minutes(20)), snapshot.gauge.start());

        let samples = controller.window.snapshot();
        assert_eq!(samples.last().unwrap().timestamp, newest);
        assert_eq!(samples.last().unwrap().value, *snapshot.series.last().unwrap());
        assert!(samples.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn test_clock_regression_keeps_clock_labels() {
        let mut params = light();
        params.label_style = LabelStyle::Clock;
        params.tick_interval_ms = 60_000;
        let mut controller =
            ChannelController::new(params, StdRng::seed_from_u64(6), mount()).unwrap();

        let ticked = controller.tick(mount() + TimeDelta::minutes(1));
        assert_eq!(ticked.labels.last().unwrap(), "14:01");

        let regressed = controller.tick(mount() - TimeDelta::hours(3));
        assert_eq!(
            regressed.labels,
            vec!["13:56", "13:57", "13:58", "13:59", "14:00", "14:01", "14:01"]
        );
    }

    #[test]
    fn test_unrepresentable_history_fails_construction() {
        let mut params = light();
        params.tick_interval_ms = 10_000_000_000_000_000;
        let result = ChannelController::new(params, StdRng::seed_from_u64(0), mount());
        assert!(matches!(result, Err(EngineError::InvalidConfiguration { .. })));

        let params = soil().with_seed(SeedProfile::Sinusoid {
            base: 40.0,
            amplitude: 8.0,
            period: 3.0,
            noise: 8.0,
            step_minutes: i64::MAX,
            lower: 10.0,
            upper: 95.0,
        });
        let result = ChannelController::new(params, StdRng::seed_from_u64(0), mount());
        assert!(matches!(result, Err(EngineError::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_subscribers_see_whole_snapshots() {
        let mut controller =
            ChannelController::new(light(), StdRng::seed_from_u64(4), mount()).unwrap();
        let mut rx = controller.subscribe();
        let held = controller.snapshot();

        let fresh = controller.tick(mount() + TimeDelta::seconds(5));

        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), fresh);
        assert_eq!(held.series[0], 300.0);
        assert_eq!(held.series.len(), 7);
        assert_eq!(controller.snapshot(), fresh);
    }
}
