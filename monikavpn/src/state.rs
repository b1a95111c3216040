use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::{
    ConnectionStatus, Protocol, RecommendationResult, SecurityModule, Server, SettingsState,
    TelemetrySample,
};
use crate::services::recommendation::recommend_or_default;
use crate::services::{
    GeminiRecommender, Handshake, Recommender, ServerCatalog, Session, SessionController,
    SessionEvent, SimulatedHandshake, TelemetryFeed, TelemetryHandle,
};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Everything the dashboard shows, owned in one place.
///
/// Construction spawns the telemetry sampler, so it must happen inside a
/// tokio runtime. Dropping the state stops the sampler and every session
/// timer; [`DashboardState::shutdown`] does the same and waits for the lock.
pub struct DashboardState {
    catalog: ServerCatalog,
    controller: SessionController,
    telemetry: TelemetryHandle,
    recommender: Arc<dyn Recommender>,
    settings: SettingsState,
    last_recommendation: Option<RecommendationResult>,
}

impl DashboardState {
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        let handshake = Arc::new(SimulatedHandshake::new(config.handshake_delay()));
        let recommender = Arc::new(GeminiRecommender::new(&config.recommendation)?);
        Self::with_parts(
            config,
            ServerCatalog::default(),
            handshake,
            recommender,
            TelemetryFeed::new(config.telemetry_window),
        )
    }

    pub fn with_parts(
        config: &AppConfig,
        catalog: ServerCatalog,
        handshake: Arc<dyn Handshake>,
        recommender: Arc<dyn Recommender>,
        feed: TelemetryFeed,
    ) -> Result<Self, AppError> {
        config.validate()?;
        let first = catalog
            .first()
            .cloned()
            .ok_or_else(|| AppError::Config("server catalog is empty".to_string()))?;

        let controller = SessionController::new(first, handshake, config.tick_interval());
        let telemetry =
            TelemetryHandle::spawn(feed, controller.clone(), config.telemetry_interval());

        info!("Dashboard ready with {} servers", catalog.all().len());
        Ok(Self {
            catalog,
            controller,
            telemetry,
            recommender,
            settings: SettingsState::default(),
            last_recommendation: None,
        })
    }

    pub fn catalog(&self) -> &ServerCatalog {
        &self.catalog
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.controller.subscribe()
    }

    pub async fn toggle_connection(&self) {
        self.controller.toggle_connection().await;
    }

    pub async fn session(&self) -> Session {
        self.controller.session().await
    }

    pub async fn status(&self) -> ConnectionStatus {
        self.controller.status().await
    }

    pub async fn telemetry(&self) -> Vec<TelemetrySample> {
        self.telemetry.samples().await
    }

    pub async fn select_server(&self, id: &str) -> Result<Server, AppError> {
        let server = self.catalog.get(id)?.clone();
        self.controller.select_server(server.clone()).await;
        Ok(server)
    }

    /// Blank input is ignored. A recommended id that is not in the catalog
    /// is still returned but leaves the selection alone.
    pub async fn recommend(
        &mut self,
        task: &str,
    ) -> Result<Option<RecommendationResult>, AppError> {
        if task.trim().is_empty() {
            return Ok(None);
        }
        let result =
            recommend_or_default(self.recommender.as_ref(), task, &self.catalog).await?;

        if let Some(server) = self.catalog.find(&result.server_id) {
            self.controller.select_server(server.clone()).await;
        }
        self.last_recommendation = Some(result.clone());
        Ok(Some(result))
    }

    pub fn last_recommendation(&self) -> Option<&RecommendationResult> {
        self.last_recommendation.as_ref()
    }

    pub fn settings(&self) -> &SettingsState {
        &self.settings
    }

    pub fn set_protocol(&mut self, protocol: Protocol) {
        info!("Protocol set to {}", protocol.name());
        self.settings.protocol = protocol;
    }

    pub fn toggle_module(&mut self, module: SecurityModule) -> bool {
        let enabled = self.settings.toggle(module);
        info!("{} {}", module.name(), if enabled { "enabled" } else { "disabled" });
        enabled
    }

    pub async fn shutdown(&self) {
        self.telemetry.shutdown();
        self.controller.shutdown().await;
        info!("Dashboard shut down");
    }
}

impl Drop for DashboardState {
    fn drop(&mut self) {
        self.telemetry.shutdown();
        if !self.controller.is_cancelled() {
            debug!("Dashboard dropped without shutdown, cancelling session tasks");
            self.controller.cancel();
        }
    }
}
