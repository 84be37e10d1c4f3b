// Dashboard service - Mounts channels and drives the render loop
use crate::application::channel_controller::ChannelController;
use crate::application::clock::Clock;
use crate::application::scheduler::{ChannelHandle, spawn_channel};
use crate::domain::channel::{ChannelKind, ChannelParams};
use crate::domain::dashboard::{ChannelFrame, DashboardFrame, ScreenFrame};
use crate::domain::telemetry::{Snapshot, Timestamp};
use crate::error::{EngineError, Result};
use futures::Stream;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

const FRAME_BUFFER: usize = 16;

/// Which channels one screen shows, in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenLayout {
    pub title: String,
    pub channel_ids: Vec<String>,
}

#[derive(Debug, Clone)]
struct ChannelMeta {
    id: String,
    kind: ChannelKind,
    title: String,
    unit: String,
}

impl ChannelMeta {
    fn from_params(params: &ChannelParams) -> Self {
        Self {
            id: params.id.clone(),
            kind: params.kind,
            title: params.title.clone(),
            unit: params.unit.clone(),
        }
    }
}

struct Mounted {
    meta: ChannelMeta,
    handle: ChannelHandle,
}

pub struct DashboardService {
    channels: Vec<Mounted>,
    screens: Vec<ScreenLayout>,
    clock: Arc<dyn Clock>,
    frame_interval: Duration,
    render_shutdown: watch::Sender<bool>,
    render_task: Option<JoinHandle<()>>,
}

impl DashboardService {
    /// Validate every channel, then start one tick task per channel.
    ///
    /// With `seed` set each channel gets a reproducible generator derived
    /// from it; otherwise generators are seeded from entropy.
    pub fn mount(
        channels: Vec<ChannelParams>,
        screens: Vec<ScreenLayout>,
        clock: Arc<dyn Clock>,
        frame_interval: Duration,
        seed: Option<u64>,
    ) -> Result<Self> {
        check_layout(&channels, &screens)?;

        let now = clock.now();
        let controllers = channels
            .into_iter()
            .enumerate()
            .map(|(i, params)| {
                let rng = match seed {
                    Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(i as u64)),
                    None => StdRng::from_entropy(),
                };
                ChannelController::new(params, rng, now)
            })
            .collect::<Result<Vec<_>>>()?;

        let channels: Vec<Mounted> = controllers
            .into_iter()
            .map(|controller| Mounted {
                meta: ChannelMeta::from_params(controller.params()),
                handle: spawn_channel(controller, clock.clone()),
            })
            .collect();

        tracing::info!(
            channels = channels.len(),
            screens = screens.len(),
            "dashboard mounted"
        );

        let (render_shutdown, _) = watch::channel(false);
        Ok(Self {
            channels,
            screens,
            clock,
            frame_interval,
            render_shutdown,
            render_task: None,
        })
    }

    /// Compose a frame from the latest snapshots without waiting for a tick.
    pub fn frame_now(&self) -> DashboardFrame {
        let latest: Vec<(ChannelMeta, Arc<Snapshot>)> = self
            .channels
            .iter()
            .map(|m| (m.meta.clone(), m.handle.latest()))
            .collect();
        compose_frame(self.clock.now(), &self.screens, &latest)
    }

    /// Start the render loop. Frames arrive while something is changing:
    /// a new tick was published or a gauge has not settled yet.
    pub fn stream_frames(&mut self) -> mpsc::Receiver<DashboardFrame> {
        let (tx, rx) = mpsc::channel(FRAME_BUFFER);

        let mut sources: Vec<(ChannelMeta, watch::Receiver<Arc<Snapshot>>)> = self
            .channels
            .iter()
            .map(|m| (m.meta.clone(), m.handle.subscribe()))
            .collect();
        let screens = self.screens.clone();
        let clock = self.clock.clone();
        let frame_interval = self.frame_interval;
        let mut shutdown_rx = self.render_shutdown.subscribe();

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(frame_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut previous_settled = false;
            let mut first = true;

            loop {
                tokio::select! {
                    _ = interval.tick() => {}
                    _ = shutdown_rx.changed() => break,
                }

                let changed = sources
                    .iter()
                    .any(|(_, rx)| rx.has_changed().unwrap_or(false));
                if !first && !changed && previous_settled {
                    continue;
                }

                let latest: Vec<(ChannelMeta, Arc<Snapshot>)> = sources
                    .iter_mut()
                    .map(|(meta, rx)| (meta.clone(), rx.borrow_and_update().clone()))
                    .collect();
                let frame = compose_frame(clock.now(), &screens, &latest);
                previous_settled = frame.is_settled();
                first = false;

                if tx.send(frame).await.is_err() {
                    tracing::debug!("frame receiver dropped, stopping render loop");
                    break;
                }
            }
        });

        if let Some(old) = self.render_task.replace(task) {
            old.abort();
        }
        rx
    }

    /// [`DashboardService::stream_frames`] as a `Stream`.
    pub fn frames(&mut self) -> impl Stream<Item = DashboardFrame> + use<> {
        let mut rx = self.stream_frames();
        async_stream::stream! {
            while let Some(frame) = rx.recv().await {
                yield frame;
            }
        }
    }

    /// Stop the render loop and dispose every channel.
    pub async fn shutdown(mut self) {
        self.render_shutdown.send_replace(true);
        if let Some(task) = self.render_task.take() {
            if let Err(e) = task.await {
                tracing::error!("render loop failed: {}", e);
            }
        }
        futures::future::join_all(self.channels.into_iter().map(|m| m.handle.dispose())).await;
        tracing::info!("dashboard unmounted");
    }
}

fn check_layout(channels: &[ChannelParams], screens: &[ScreenLayout]) -> Result<()> {
    let mut ids = HashSet::new();
    for params in channels {
        if !ids.insert(params.id.as_str()) {
            return Err(EngineError::DuplicateChannel(params.id.clone()));
        }
    }
    for screen in screens {
        if let Some(missing) = screen.channel_ids.iter().find(|id| !ids.contains(id.as_str())) {
            return Err(EngineError::UnknownChannel(missing.clone()));
        }
    }
    Ok(())
}

fn compose_frame(
    now: Timestamp,
    screens: &[ScreenLayout],
    latest: &[(ChannelMeta, Arc<Snapshot>)],
) -> DashboardFrame {
    let screens = screens
        .iter()
        .map(|layout| ScreenFrame {
            title: layout.title.clone(),
            channels: layout
                .channel_ids
                .iter()
                .filter_map(|id| latest.iter().find(|(meta, _)| &meta.id == id))
                .map(|(meta, snapshot)| {
                    let gauge_value = snapshot.gauge_value_at(now);
                    ChannelFrame {
                        id: meta.id.clone(),
                        kind: meta.kind,
                        title: meta.title.clone(),
                        unit: meta.unit.clone(),
                        snapshot: snapshot.clone(),
                        gauge_value,
                        gauge_fraction: snapshot.gauge_fraction_at(now),
                        settled: snapshot.gauge.is_settled(now),
                    }
                })
                .collect(),
        })
        .collect();

    DashboardFrame::new(now, screens)
}
