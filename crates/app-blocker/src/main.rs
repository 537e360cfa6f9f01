mod bootstrap;
mod wiring;

use anyhow::Result;
use blocker_core::settings::Settings;
use blocker_runtime::monitor::MonitorService;
use blocker_ui::app::App;
use tokio::sync::oneshot;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("App Blocker v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Threshold: {}s, Cooldown: {}s, Theme: {}, Timezone: {}",
        settings.threshold_secs,
        settings.cooldown_secs,
        settings.theme,
        settings.timezone
    );

    let apps = settings.monitored_apps()?;
    tracing::info!(count = apps.len(), "monitored apps loaded");

    let (caps, _source) = wiring::build_capabilities(&settings)?;
    let app_names: Vec<String> = apps.iter().map(String::from).collect();

    let service = MonitorService::new(caps, apps, settings.monitor_config());
    let (rx, handle) = service.start();

    let app = App::new(&settings.theme, settings.timezone.clone(), app_names);

    // Raw mode turns the Ctrl+C key into a quit action; this covers
    // signals from outside. The UI leaves through its own restore path.
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("SIGINT received; asking UI to exit");
            let _ = shutdown_tx.send(());
        }
    });

    let result = app.run(rx, &handle, shutdown_rx).await;
    handle.abort();
    result?;

    tracing::info!("App Blocker stopped");
    Ok(())
}
