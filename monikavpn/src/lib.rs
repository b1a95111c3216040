pub mod action;
pub mod app;
pub mod cli;
pub mod config;
pub mod console;
pub mod data;
pub mod error;
pub mod event;
pub mod logging;
pub mod models;
pub mod services;
pub mod state;
pub mod theme;
pub mod tui;
pub mod views;

use app::App;
use cli::Cli;
use config::AppConfig;
use error::AppError;
use state::DashboardState;
use tracing::info;

pub fn run_app(cli: Cli) -> Result<(), AppError> {
    // Installed first so that config loading is logged.
    let log_guard = logging::init(cli.log_file.as_deref(), cli.verbose)?;
    let config = AppConfig::load(cli.config)?;
    log_guard.apply_config_level(&config.log_level);

    // One thread: the controller, the sampler and the UI all share it.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    tui::install_panic_hook();
    runtime.block_on(async move {
        info!("Starting MonikaVPN dashboard");
        let state = DashboardState::new(&config)?;
        let mut app = App::new(state).await;
        let result = app.run().await;
        app.state().shutdown().await;
        result
    })
}
