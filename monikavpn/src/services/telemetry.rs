use crate::models::{ConnectionStatus, TelemetrySample};
use crate::services::session::SessionController;
use chrono::{Local, NaiveTime};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::collections::VecDeque;
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

pub const DEFAULT_WINDOW: usize = 20;
pub const DOWNSTREAM_RANGE: RangeInclusive<u32> = 15..=99;
pub const UPSTREAM_RANGE: RangeInclusive<u32> = 5..=29;

/// Fixed-capacity sample history; the oldest sample is evicted first.
#[derive(Debug, Clone, PartialEq)]
pub struct RollingWindow {
    samples: VecDeque<TelemetrySample>,
    capacity: usize,
}

impl RollingWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, sample: TelemetrySample) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn latest(&self) -> Option<&TelemetrySample> {
        self.samples.back()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &TelemetrySample> {
        self.samples.iter()
    }

    pub fn to_vec(&self) -> Vec<TelemetrySample> {
        self.samples.iter().cloned().collect()
    }
}

pub struct TelemetryFeed {
    rng: Box<dyn RngCore + Send>,
    window: RollingWindow,
}

impl TelemetryFeed {
    pub fn new(capacity: usize) -> Self {
        Self::with_rng(capacity, StdRng::from_entropy())
    }

    pub fn with_rng<R>(capacity: usize, rng: R) -> Self
    where
        R: RngCore + Send + 'static,
    {
        Self {
            rng: Box::new(rng),
            window: RollingWindow::new(capacity),
        }
    }

    /// Builds one sample. Anything but `Connected` yields a flatline.
    pub fn sample(&mut self, status: ConnectionStatus, now: NaiveTime) -> TelemetrySample {
        if status != ConnectionStatus::Connected {
            return TelemetrySample::flatline();
        }
        TelemetrySample {
            timestamp: now.format("%H:%M:%S").to_string(),
            downstream: self.rng.gen_range(DOWNSTREAM_RANGE),
            upstream: self.rng.gen_range(UPSTREAM_RANGE),
        }
    }

    pub fn tick(&mut self, status: ConnectionStatus, now: NaiveTime) -> TelemetrySample {
        let sample = self.sample(status, now);
        self.window.push(sample.clone());
        sample
    }

    pub fn window(&self) -> &RollingWindow {
        &self.window
    }
}

/// Owns the sampler task. It runs until [`TelemetryHandle::shutdown`] or drop.
pub struct TelemetryHandle {
    feed: Arc<Mutex<TelemetryFeed>>,
    task: JoinHandle<()>,
}

impl TelemetryHandle {
    pub fn spawn(feed: TelemetryFeed, session: SessionController, period: Duration) -> Self {
        let feed = Arc::new(Mutex::new(feed));
        let feed_task = feed.clone();

        let task = tokio::spawn(async move {
            info!("Telemetry sampler started ({:?} cadence)", period);
            let start = tokio::time::Instant::now() + period;
            let mut interval = tokio::time::interval_at(start, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let status = session.status().await;
                let sample = feed_task.lock().await.tick(status, Local::now().time());
                debug!(
                    "Telemetry sample down={} up={} status={}",
                    sample.downstream, sample.upstream, status
                );
            }
        });

        Self { feed, task }
    }

    pub async fn samples(&self) -> Vec<TelemetrySample> {
        self.feed.lock().await.window().to_vec()
    }

    pub async fn latest(&self) -> Option<TelemetrySample> {
        self.feed.lock().await.window().latest().cloned()
    }

    pub fn shutdown(&self) {
        if !self.task.is_finished() {
            info!("Telemetry sampler stopped");
        }
        self.task.abort();
    }
}

impl Drop for TelemetryHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
