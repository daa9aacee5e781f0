//! Reservation service HTTP server.
//!
//! # Usage
//!
//! ```bash
//! # In-memory store
//! cargo run -p reservation-service
//!
//! # PostgreSQL store
//! RESERVATION_STORE=postgres DATABASE_URL=postgres://... cargo run -p reservation-service
//! ```

use reservation_core::{GreetingService, ReservationRepository, ReservationService, SystemClock};
use reservation_postgres::PostgresReservationRepository;
use reservation_redis::RedisReservationRepository;
use reservation_service::{Config, SampleDataInitializer, StoreBackend};
use reservation_testing::InMemoryReservationRepository;
use reservation_web::{AppState, build_router};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "reservation_service=info,reservation_web=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting reservation service");

    // Load configuration
    let config = Config::from_env()?;
    info!(
        store = %config.store,
        address = %config.server_addr(),
        "Configuration loaded"
    );

    if config.server.metrics_enabled {
        let addr: SocketAddr = config.metrics_addr().parse()?;
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()?;
        info!(address = %addr, "Prometheus metrics available at /metrics");
    }

    match config.store {
        StoreBackend::Memory => {
            serve(Arc::new(InMemoryReservationRepository::new()), &config).await
        }
        StoreBackend::Postgres => {
            info!("Connecting to PostgreSQL...");
            let repository = PostgresReservationRepository::connect(&config.postgres).await?;
            repository.migrate().await?;
            serve(Arc::new(repository), &config).await
        }
        StoreBackend::Redis => {
            info!("Connecting to Redis...");
            let repository = RedisReservationRepository::connect(&config.redis).await?;
            serve(Arc::new(repository), &config).await
        }
    }
}

/// Seed the store, then serve until a shutdown signal arrives.
async fn serve<R: ReservationRepository + 'static>(
    repository: Arc<R>,
    config: &Config,
) -> anyhow::Result<()> {
    // A failed seed is reported but does not stop the server.
    let seeder = SampleDataInitializer::new(ReservationService::new(Arc::clone(&repository)));
    match seeder.ready(config.seed_names.clone()).await {
        Ok(seeded) => info!(count = seeded.len(), "Sample data ready"),
        Err(e) => error!(error = %e, "Seeding sample data failed"),
    }

    let greetings = GreetingService::with_interval(
        Arc::new(SystemClock),
        Duration::from_millis(config.greeting.interval_ms),
    );
    let app = build_router(AppState::new(repository, greetings));

    let listener = tokio::net::TcpListener::bind(config.server_addr()).await?;
    info!(address = %listener.local_addr()?, "HTTP server listening");

    let (stop_tx, mut stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = stop_tx.send(true);
    });

    let mut graceful_rx = stop_rx.clone();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move { stopped(&mut graceful_rx).await })
        .into_future();
    tokio::pin!(server);

    // Greeting sockets never end on their own, so draining is bounded.
    tokio::select! {
        result = &mut server => result?,
        () = stopped(&mut stop_rx) => {
            let grace = Duration::from_secs(config.server.shutdown_timeout);
            match tokio::time::timeout(grace, &mut server).await {
                Ok(result) => result?,
                Err(_) => warn!(
                    timeout_secs = config.server.shutdown_timeout,
                    "Shutdown timeout elapsed, closing remaining connections"
                ),
            }
        }
    }

    info!("Server shut down");
    Ok(())
}

async fn stopped(rx: &mut watch::Receiver<bool>) {
    let _ = rx.wait_for(|stop| *stop).await;
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
