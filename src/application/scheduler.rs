// Tick scheduler - One periodic task per channel
use crate::application::channel_controller::ChannelController;
use crate::application::clock::Clock;
use crate::domain::telemetry::Snapshot;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Running channel. Dropping the handle also stops the task at its next
/// wakeup; [`ChannelHandle::dispose`] stops it and waits for it to finish.
pub struct ChannelHandle {
    id: String,
    snapshots: watch::Receiver<Arc<Snapshot>>,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ChannelHandle {
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.snapshots.clone()
    }

    pub fn latest(&self) -> Arc<Snapshot> {
        self.snapshots.borrow().clone()
    }

    /// Cancel the tick timer and wait for the task to release the channel.
    pub async fn dispose(self) {
        self.shutdown.send_replace(true);
        if let Err(e) = self.task.await {
            tracing::error!(channel = %self.id, "channel task failed: {}", e);
        }
    }
}

/// Move a controller onto its own task, ticking every `tick_interval_ms`.
///
/// The first tick fires one full interval after spawning; the seed is what
/// a freshly mounted screen shows.
pub fn spawn_channel<R>(mut controller: ChannelController<R>, clock: Arc<dyn Clock>) -> ChannelHandle
where
    R: Rng + Send + 'static,
{
    let id = controller.params().id.clone();
    let period = Duration::from_millis(controller.params().tick_interval_ms);
    let snapshots = controller.subscribe();
    let controller_current = controller.snapshot().stats.current;
    let (shutdown, mut shutdown_rx) = watch::channel(false);

    let task_id = id.clone();
    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    controller.tick(clock.now());
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!(channel = %task_id, state = ?controller.state(), "channel disposed");
    });

    tracing::debug!(
        channel = %id,
        period_ms = period.as_millis() as u64,
        current = controller_current,
        "channel scheduled"
    );

    ChannelHandle {
        id,
        snapshots,
        shutdown,
        task,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::clock::TokioClock;
    use crate::domain::channel::{ChannelKind, ChannelParams, SeedProfile};
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn controller() -> (ChannelController, Arc<dyn Clock>) {
        let mount = NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(6, 0, 0)
            .unwrap();
        let clock: Arc<dyn Clock> = Arc::new(TokioClock::starting_at(mount));
        let params = ChannelParams::new("air_humidity", ChannelKind::AirHumidity, 7, 60.0, 70.0)
            .with_seed(SeedProfile::Flat(vec![60.0, 62.0, 61.0, 63.0, 65.0, 66.0, 64.0]));
        let controller =
            ChannelController::new(params, StdRng::seed_from_u64(17), clock.now()).unwrap();
        (controller, clock)
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_after_one_interval() {
        let (controller, clock) = controller();
        let handle = spawn_channel(controller, clock);
        let mut rx = handle.subscribe();
        let started = Instant::now();

        rx.changed().await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(5_000));
        assert_eq!(rx.borrow_and_update().series.len(), 7);

        rx.changed().await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(10_000));

        handle.dispose().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispose_stops_ticks() {
        let (controller, clock) = controller();
        let handle = spawn_channel(controller, clock);
        let mut rx = handle.subscribe();

        rx.changed().await.unwrap();
        let before = rx.borrow_and_update().clone();

        handle.dispose().await;
        tokio::time::sleep(Duration::from_secs(60)).await;

        assert!(rx.changed().await.is_err());
        assert_eq!(*rx.borrow(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_stops_ticks() {
        let (controller, clock) = controller();
        let handle = spawn_channel(controller, clock);
        let mut rx = handle.subscribe();

        drop(handle);
        tokio::time::sleep(Duration::from_secs(30)).await;

        assert!(rx.changed().await.is_err());
        assert_eq!(rx.borrow().series, vec![60.0, 62.0, 61.0, 63.0, 65.0, 66.0, 64.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_samples_are_stamped_by_clock() {
        let (controller, clock) = controller();
        let mount = clock.now();
        let handle = spawn_channel(controller, clock);
        let mut rx = handle.subscribe();

        rx.changed().await.unwrap();
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.taken_at - mount, chrono::TimeDelta::seconds(5));

        handle.dispose().await;
    }
}
