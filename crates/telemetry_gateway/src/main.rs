//! Telemetry gateway entry point.
//!
//! Loads configuration, installs logging, registers the built-in handlers
//! and serves the telemetry endpoint until a shutdown signal arrives.

mod cli;
mod config;
mod handlers;
mod logging;
mod signals;

use cli::CliArgs;
use config::AppConfig;
use handlers::{register_builtin_handlers, GatewayContext};
use std::sync::Arc;
use std::time::Duration;
use telemetry_dispatch::{transport, Dispatcher, SharedSecret};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// Main application struct.
pub struct Application {
    config: AppConfig,
    dispatcher: Arc<Dispatcher<GatewayContext>>,
}

impl Application {
    /// Loads configuration, applies CLI overrides and builds the dispatcher.
    pub async fn new(args: CliArgs) -> anyhow::Result<Self> {
        let (mut config, created) = AppConfig::load_from_file(&args.config_path).await?;

        if let Some(bind_address) = args.bind_address {
            config.server.bind_address = bind_address;
        }

        if let Some(log_level) = args.log_level {
            config.logging.level = log_level;
        }

        if args.json_logs {
            config.logging.json_format = true;
        }

        if let Err(e) = config.validate() {
            anyhow::bail!("Configuration validation failed: {}", e);
        }

        logging::setup_logging(&config.logging)?;
        if created {
            info!("Created default configuration file: {}", args.config_path.display());
        }

        let context = GatewayContext::from_settings(&config.handlers);
        let mut dispatcher =
            Dispatcher::new(context).with_config(config.to_dispatcher_config());
        match &config.auth.token {
            Some(token) => {
                dispatcher = dispatcher
                    .with_auth_validator(SharedSecret::with_header(&config.auth.header, token));
                info!("🔐 Callers must present a token in '{}'", config.auth.header);
            }
            None => warn!("🔓 No auth token configured, admitting every caller"),
        }
        register_builtin_handlers(&dispatcher).await;

        info!(
            "🚀 Telemetry Gateway v{} | Config: {}",
            env!("CARGO_PKG_VERSION"),
            args.config_path.display()
        );

        Ok(Self {
            config,
            dispatcher: Arc::new(dispatcher),
        })
    }

    /// Serves until a shutdown signal is received.
    pub async fn run(self) -> anyhow::Result<()> {
        info!("📋 Configuration Summary:");
        info!("  🌐 Bind address: {}", self.config.server.bind_address);
        info!("  📮 Endpoint: POST {}", self.config.server.path);
        info!("  ❓ Unrouted status: {}", self.config.server.unrouted_status);

        let listener = TcpListener::bind(&self.config.server.bind_address).await?;
        let app = transport::router(self.dispatcher.clone(), &self.config.to_transport_config());

        let monitoring_handle = self.spawn_monitoring();

        let shutdown = async {
            if let Err(e) = signals::shutdown_signal().await {
                error!("❌ Signal handling failed: {}", e);
            }
            info!("🛑 Shutdown signal received, draining in-flight requests...");
        };

        info!("✅ Telemetry Gateway is now running!");
        let served = transport::serve(listener, app, shutdown).await;

        if let Some(handle) = monitoring_handle {
            handle.abort();
        }

        let final_stats = self.dispatcher.stats();
        info!("📊 Final Statistics:");
        info!("  - Requests received: {}", final_stats.requests_received);
        info!("  - Requests dispatched: {}", final_stats.requests_dispatched);
        info!("  - Requests rejected: {}", final_stats.requests_rejected);
        info!("  - Requests unrouted: {}", final_stats.requests_unrouted);
        info!("  - Handler failures: {}", final_stats.handler_failures);

        served?;
        info!("👋 Telemetry Gateway shutdown complete");
        Ok(())
    }

    fn spawn_monitoring(&self) -> Option<tokio::task::JoinHandle<()>> {
        let interval_secs = self.config.server.stats_interval_secs;
        if interval_secs == 0 {
            return None;
        }

        let dispatcher = self.dispatcher.clone();
        info!("🔍 Health monitoring active - stats every {} seconds", interval_secs);

        Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
            // The first tick completes immediately.
            interval.tick().await;
            let mut last_received = 0u64;

            loop {
                interval.tick().await;

                let stats = dispatcher.stats();
                let received_this_period = stats.requests_received - last_received;
                last_received = stats.requests_received;

                info!(
                    "📊 Gateway Health - {} requests this period | {} dispatched | {} rejected | {} failed",
                    received_this_period,
                    stats.requests_dispatched,
                    stats.requests_rejected,
                    stats.handler_failures
                );
            }
        }))
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let args = CliArgs::parse();

    match Application::new(args).await {
        Ok(app) => {
            if let Err(e) = app.run().await {
                error!("❌ Application error: {:?}", e);
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("❌ Failed to start application: {:?}", e);
            std::process::exit(1);
        }
    }
}
