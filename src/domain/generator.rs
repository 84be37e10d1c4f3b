// Sample generator - Bounded random walks and seed histories
use super::channel::{ChannelParams, SeedProfile, WalkModel};
use super::telemetry::{Sample, Timestamp};
use chrono::{DurationRound, TimeDelta};
use rand::Rng;

/// Next reading for a channel given the previous one.
pub fn next_value<R: Rng + ?Sized>(previous: f64, params: &ChannelParams, rng: &mut R) -> f64 {
    let raw = match params.model {
        WalkModel::MeanReverting {
            target_mean,
            reversion_rate,
            noise_amplitude,
        } => {
            let drift = (target_mean - previous) * reversion_rate;
            let noise = (rng.r#gen::<f64>() - 0.5) * noise_amplitude;
            (previous + drift + noise).round()
        }
        WalkModel::Uniform => {
            let span = params.upper_bound - params.lower_bound;
            (params.lower_bound + rng.r#gen::<f64>() * span).floor()
        }
    };
    params.clamp(raw)
}

/// History to pre-populate a channel's window, oldest first, ending at or
/// before `mount`.
pub fn seed_samples<R: Rng + ?Sized>(
    params: &ChannelParams,
    mount: Timestamp,
    rng: &mut R,
) -> Vec<Sample> {
    match &params.seed {
        SeedProfile::Flat(values) => {
            let spacing = params.tick_interval_ms as i64;
            let newest = values.len().saturating_sub(1);
            values
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    let age = TimeDelta::milliseconds(spacing * (newest - i) as i64);
                    Sample::new(mount - age, params.clamp(*v))
                })
                .collect()
        }
        SeedProfile::Sinusoid {
            base,
            amplitude,
            period,
            noise,
            step_minutes,
            lower,
            upper,
        } => {
            let step = TimeDelta::minutes(*step_minutes);
            let aligned = mount.duration_trunc(step).unwrap_or(mount);
            (0..params.capacity)
                .rev()
                .map(|i| {
                    let wave = (i as f64 / period).sin() * amplitude;
                    let jitter = rng.r#gen::<f64>() * noise;
                    let value = (base + (wave + jitter).round()).clamp(*lower, *upper);
                    Sample::new(aligned - step * i as i32, params.clamp(value))
                })
                .collect()
        }
    }
}
