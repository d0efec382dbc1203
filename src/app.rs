use crate::{
    cli, context, prober::LivenessProber, release::HttpReleaseSource, resolver::Resolver, rest,
    storage,
};
use anyhow::{Context as AnyhowContext, Result};
use std::path::Path;
use std::sync::Arc;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing_appender::non_blocking::WorkerGuard;

/// The main application state.
/// decoupled from CLI parsing to allow for easier testing.
pub struct App {
    config: context::Context,
    storage: Arc<dyn storage::Storage + Send + Sync>,
    resolver: Resolver,
    shutdown: CancellationToken,
    _log_guard: Option<WorkerGuard>,
}

impl App {
    /// Factory method to build the App from CLI arguments.
    /// Opening the store is the only fatal step: nothing is served if it fails.
    pub fn from_cli() -> Result<App> {
        let cli = cli::parse();
        let ctx = context::Context::from_cli(&cli);

        let log_guard = crate::tracing::init(ctx.log_file.as_deref());
        log_startup_info(&ctx);

        let storage = init_storage(&ctx.db_path, ctx.reset)?;
        let releases = HttpReleaseSource::new(ctx.fetch_timeout)
            .context("building release feed client")?;

        let mut app = App::new(ctx, storage, Arc::new(releases));
        app._log_guard = log_guard;
        Ok(app)
    }

    /// Dependencies are injected here, making it easy to swap Storage for mocks.
    fn new(
        config: context::Context,
        storage: Arc<dyn storage::Storage + Send + Sync>,
        releases: Arc<dyn crate::release::ReleaseSource>,
    ) -> Self {
        let resolver = Resolver::new(storage.clone(), releases);
        Self {
            config,
            storage,
            resolver,
            shutdown: CancellationToken::new(),
            _log_guard: None,
        }
    }

    /// Main entry point for the daemon.
    pub async fn run_daemon(&self) -> Result<()> {
        self.log_runtime_config();

        let mut rest_handle = self.spawn_rest_server();
        let mut prober_handle = self.spawn_prober();

        self.wait_for_shutdown(&mut rest_handle, &mut prober_handle)
            .await
    }

    // --- Helper Methods ---

    fn spawn_rest_server(&self) -> JoinHandle<()> {
        let addr = self.config.api_listen;
        let resolver = self.resolver.clone();
        let token = self.shutdown.clone();

        tokio::spawn(async move {
            if let Err(e) = rest::serve(addr, resolver, token).await {
                log::error!("REST server failed: {:#}", e);
            }
        })
    }

    fn spawn_prober(&self) -> JoinHandle<()> {
        let prober = LivenessProber::new(self.storage.clone(), self.config.health_interval);
        tokio::spawn(prober.run(self.shutdown.clone()))
    }

    async fn wait_for_shutdown(
        &self,
        rest_task: &mut JoinHandle<()>,
        prober_task: &mut JoinHandle<()>,
    ) -> Result<()> {
        tokio::select! {
            _ = termination_signal() => log::info!("🧨 Termination signal received, shutting down..."),
            res = &mut *rest_task => {
                log::error!("REST task exited unexpectedly");
                report_task_exit("REST task", res);
            }
            res = &mut *prober_task => {
                log::error!("Liveness prober exited unexpectedly");
                report_task_exit("Liveness prober", res);
            }
        }

        self.shutdown.cancel();

        // Polling a completed JoinHandle again panics.
        // Requests still waiting on a release feed are dropped, not drained.
        if !rest_task.is_finished() {
            rest_task.abort();
            report_task_exit("REST task", rest_task.await);
        }
        if !prober_task.is_finished() {
            report_task_exit("Liveness prober", prober_task.await);
        }

        log::info!("✅ Shutdown complete");
        Ok(())
    }

    fn log_runtime_config(&self) {
        log::info!(
            "🩺 Health check interval: {}s",
            self.config.health_interval.as_secs()
        );
        match self.config.fetch_timeout {
            Some(timeout) => log::info!("⏱️ Release fetch timeout: {}s", timeout.as_secs()),
            None => log::info!("⏱️ Release fetch timeout: transport default"),
        }
        if let Some(path) = self.config.log_file.as_deref() {
            log::info!("📝 Log file: {}", path.to_string_lossy());
        }
    }
}

// --- Standalone Helpers ---

fn log_startup_info(ctx: &context::Context) {
    log::info!("🚀 Starting release-redirect");
    log::info!("🌐 Listen address: {}", ctx.api_listen);
    log::info!("📂 Database: {}", ctx.db_path.to_string_lossy());
}

fn report_task_exit(name: &str, res: std::result::Result<(), JoinError>) {
    match res {
        Err(e) if e.is_panic() => log::error!("{} panicked: {}", name, e),
        Err(e) if !e.is_cancelled() => log::error!("{} failed: {}", name, e),
        _ => {}
    }
}

fn init_storage(db_path: &Path, reset: bool) -> Result<Arc<dyn storage::Storage + Send + Sync>> {
    if let Some(dir) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating database directory {}", dir.display()))?;
    }

    let sqlite = storage::SqliteStorage::new(db_path);
    if reset {
        sqlite.reset_all().context("resetting storage")?;
    }
    sqlite.init().context("initializing storage")?;
    storage::Storage::ping(&sqlite).context("pinging storage")?;

    Ok(Arc::new(sqlite))
}

#[cfg(unix)]
async fn termination_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {},
                _ = sigterm.recv() => {},
            }
        }
        Err(e) => {
            log::warn!("cannot listen for SIGTERM: {}", e);
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn termination_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

// --- Entry Point ---

pub async fn run() -> Result<()> {
    let app = App::from_cli()?;
    app.run_daemon().await
}
