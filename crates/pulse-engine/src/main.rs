use hyper::{
    service::{make_service_fn, service_fn},
    Body, Request, Response, Server, StatusCode,
};
use pulse_common::Config;
use pulse_engine::engine::controller::RunController;
use pulse_engine::{metrics, server};
use std::convert::Infallible;
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_production_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().with_target(true))
        .init();

    info!("Production structured logging initialized (JSON)");
}

async fn metrics_handler(req: Request<Body>) -> Result<Response<Body>, Infallible> {
    match req.uri().path() {
        "/health" => Ok(Response::new(Body::from("OK"))),
        "/metrics" => Ok(Response::new(Body::from(metrics::render_metrics()))),
        _ => {
            let mut not_found = Response::new(Body::from("Not Found"));
            *not_found.status_mut() = StatusCode::NOT_FOUND;
            Ok(not_found)
        }
    }
}

async fn run_metrics_server(port: u16) {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    metrics::register_metrics();

    let make_svc =
        make_service_fn(|_conn| async { Ok::<_, Infallible>(service_fn(metrics_handler)) });

    let server = Server::bind(&addr).serve(make_svc);

    info!(port = port, "Observability server online");

    if let Err(e) = server.await {
        error!(error = %e, "Observability server failed");
    }
}

/// Config file is optional; compiled defaults carry the external contract
/// (control port 3000). `PORT` in the environment overrides the file.
fn load_config() -> Config {
    let mut config = match fs::read_to_string("config/pulse_config.yaml") {
        Ok(raw) => match serde_yaml::from_str(&raw) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "Malformed config file; using defaults");
                Config::default()
            }
        },
        Err(_) => Config::default(),
    };

    if let Ok(port) = std::env::var("PORT") {
        match port.parse() {
            Ok(port) => config.server.port = port,
            Err(_) => warn!(value = %port, "Ignoring unparseable PORT override"),
        }
    }

    config
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_production_logging();

    let config = load_config();
    let master_token = CancellationToken::new();

    if config.metrics.enabled {
        let port = config.metrics.port;
        tokio::spawn(async move {
            run_metrics_server(port).await;
        });
    }

    let controller = Arc::new(RunController::new(
        config.engine.clone(),
        PathBuf::from(&config.devices.path),
    )?);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let make_svc = make_service_fn(move |_conn| {
        let controller = Arc::clone(&controller);
        async move {
            Ok::<_, Infallible>(service_fn(move |req| {
                server::handle_request(req, Arc::clone(&controller))
            }))
        }
    });

    let control_server = Server::try_bind(&addr)?.serve(make_svc);
    info!(port = config.server.port, "Pulse engine instance online");
    info!("Ready to receive commands from main controller");

    let shutdown_token = master_token.clone();
    let graceful = control_server.with_graceful_shutdown(async move {
        shutdown_token.cancelled().await;
    });

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
            master_token.cancel();
        }
    });

    if let Err(e) = graceful.await {
        error!(error = %e, "Control server failed");
    }

    Ok(())
}
