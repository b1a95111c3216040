use crate::error::AppError;
use crate::models::{ConnectionStatus, Server};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub status: ConnectionStatus,
    /// Always 0 unless `status` is `Connected`.
    pub elapsed_seconds: u64,
    pub selected_server: Server,
}

impl Session {
    pub fn new(selected_server: Server) -> Self {
        Self {
            status: ConnectionStatus::Disconnected,
            elapsed_seconds: 0,
            selected_server,
        }
    }

    /// Session clock as shown on the dashboard: `00:00:00` unless connected.
    pub fn display_elapsed(&self) -> String {
        if self.status == ConnectionStatus::Connected {
            format_elapsed(self.elapsed_seconds)
        } else {
            format_elapsed(0)
        }
    }
}

/// Formats seconds as zero-padded `HH:MM:SS`. Hours do not wrap.
pub fn format_elapsed(seconds: u64) -> String {
    let hrs = seconds / 3600;
    let mins = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}:{:02}", hrs, mins, secs)
}

#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    StatusChanged(ConnectionStatus),
    ElapsedTick(u64),
    ServerSelected(Server),
    HandshakeFailed(String),
}

#[async_trait::async_trait]
pub trait Handshake: Send + Sync {
    async fn perform(&self, server: &Server) -> Result<(), AppError>;
}

/// Stands in for connection establishment: waits, then always succeeds.
pub struct SimulatedHandshake {
    delay: Duration,
}

impl SimulatedHandshake {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait::async_trait]
impl Handshake for SimulatedHandshake {
    async fn perform(&self, server: &Server) -> Result<(), AppError> {
        debug!("Simulating handshake with {} ({})", server.name, server.ip);
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}

struct SessionInner {
    session: Session,
    // Bumped on every transition out of Connecting/Connected so that
    // callbacks scheduled under an older epoch become no-ops.
    epoch: u64,
    handshake_task: Option<JoinHandle<()>>,
    ticker_task: Option<JoinHandle<()>>,
}

#[derive(Clone)]
pub struct SessionController {
    inner: Arc<Mutex<SessionInner>>,
    event_tx: broadcast::Sender<SessionEvent>,
    handshake: Arc<dyn Handshake>,
    tick_interval: Duration,
    // Every task spawned by a clone of this controller exits once cancelled.
    cancel: CancellationToken,
}

impl SessionController {
    pub fn new(
        selected_server: Server,
        handshake: Arc<dyn Handshake>,
        tick_interval: Duration,
    ) -> Self {
        let (tx, _) = broadcast::channel(100);
        Self {
            inner: Arc::new(Mutex::new(SessionInner {
                session: Session::new(selected_server),
                epoch: 0,
                handshake_task: None,
                ticker_task: None,
            })),
            event_tx: tx,
            handshake,
            tick_interval,
            cancel: CancellationToken::new(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    pub async fn session(&self) -> Session {
        self.inner.lock().await.session.clone()
    }

    pub async fn status(&self) -> ConnectionStatus {
        self.inner.lock().await.session.status
    }

    /// Disconnected starts a handshake; Connecting or Connected drops back
    /// to Disconnected right away.
    pub async fn toggle_connection(&self) {
        let mut inner = self.inner.lock().await;
        match inner.session.status {
            ConnectionStatus::Disconnected => {
                inner.epoch += 1;
                let epoch = inner.epoch;
                let server = inner.session.selected_server.clone();
                info!("Connecting to {} ({})", server.name, server.country);
                self.set_status(&mut inner, ConnectionStatus::Connecting);

                let controller = self.clone();
                inner.handshake_task = Some(self.spawn_cancellable(async move {
                    controller.finish_handshake(epoch, server).await;
                }));
            }
            ConnectionStatus::Connecting => {
                info!("Handshake cancelled by user");
                self.disconnect_locked(&mut inner);
            }
            ConnectionStatus::Connected => {
                info!(
                    "Disconnecting after {}",
                    format_elapsed(inner.session.elapsed_seconds)
                );
                self.disconnect_locked(&mut inner);
            }
        }
    }

    pub async fn select_server(&self, server: Server) {
        let mut inner = self.inner.lock().await;
        info!("Selected server {} ({})", server.name, server.id);
        inner.session.selected_server = server.clone();
        let _ = self.event_tx.send(SessionEvent::ServerSelected(server));
    }

    /// Stops every timer owned by the controller. Status is left untouched.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let mut inner = self.inner.lock().await;
        inner.epoch += 1;
        abort_task(&mut inner.handshake_task);
        abort_task(&mut inner.ticker_task);
    }

    /// Synchronous form of [`shutdown`](Self::shutdown) for `Drop` impls:
    /// pending tasks stop at their next await and release their clones.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    fn spawn_cancellable<F>(&self, work: F) -> JoinHandle<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = work => {}
            }
        })
    }

    async fn finish_handshake(&self, epoch: u64, server: Server) {
        let outcome = self.handshake.perform(&server).await;

        let mut inner = self.inner.lock().await;
        if inner.epoch != epoch || inner.session.status != ConnectionStatus::Connecting {
            debug!("Ignoring stale handshake completion (epoch {})", epoch);
            return;
        }
        inner.handshake_task = None;

        match outcome {
            Ok(()) => {
                inner.session.elapsed_seconds = 0;
                self.set_status(&mut inner, ConnectionStatus::Connected);
                info!("Connected to {}", server.name);

                let controller = self.clone();
                inner.ticker_task = Some(self.spawn_cancellable(async move {
                    controller.run_ticker(epoch).await;
                }));
            }
            Err(e) => {
                warn!("Handshake with {} failed: {}", server.name, e);
                let _ = self
                    .event_tx
                    .send(SessionEvent::HandshakeFailed(e.to_string()));
                self.disconnect_locked(&mut inner);
            }
        }
    }

    async fn run_ticker(&self, epoch: u64) {
        let start = tokio::time::Instant::now() + self.tick_interval;
        let mut interval = tokio::time::interval_at(start, self.tick_interval);
        loop {
            interval.tick().await;
            let mut inner = self.inner.lock().await;
            if inner.epoch != epoch || inner.session.status != ConnectionStatus::Connected {
                break;
            }
            inner.session.elapsed_seconds += 1;
            let _ = self
                .event_tx
                .send(SessionEvent::ElapsedTick(inner.session.elapsed_seconds));
        }
    }

    fn disconnect_locked(&self, inner: &mut SessionInner) {
        inner.epoch += 1;
        abort_task(&mut inner.handshake_task);
        abort_task(&mut inner.ticker_task);
        inner.session.elapsed_seconds = 0;
        self.set_status(inner, ConnectionStatus::Disconnected);
    }

    fn set_status(&self, inner: &mut SessionInner, status: ConnectionStatus) {
        inner.session.status = status;
        let _ = self.event_tx.send(SessionEvent::StatusChanged(status));
    }
}

fn abort_task(task: &mut Option<JoinHandle<()>>) {
    if let Some(handle) = task.take() {
        handle.abort();
    }
}
