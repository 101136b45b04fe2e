//! tally server binary.
//!
//! - GET /       : health text
//! - GET /visits : increment-and-report, JSON body
//! - OPTIONS *   : CORS preflight (204, when enabled)
//!
//! Config comes from `tally.yaml` (optional, strict schema) with the `PORT`
//! env var overriding the listen port. Bind failure is fatal: no retry, no
//! fallback port.

use tracing_subscriber::{fmt, EnvFilter};

use tally_server::{app_state, config, router};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config_path =
        std::env::var("TALLY_CONFIG").unwrap_or_else(|_| config::DEFAULT_CONFIG_PATH.to_string());

    let mut cfg = match config::load_or_default(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(path = %config_path, error = %e, "config load failed");
            std::process::exit(1);
        }
    };
    if let Err(e) = config::apply_port_override(&mut cfg, std::env::var("PORT").ok().as_deref()) {
        tracing::error!(error = %e, "invalid PORT override");
        std::process::exit(1);
    }

    let listen = match cfg.listen_addr() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!(error = %e, "invalid listen address");
            std::process::exit(1);
        }
    };

    let state = app_state::AppState::new(cfg);
    let app = router::build_router(state);

    tracing::info!(%listen, "tally-server starting");
    let listener = match tokio::net::TcpListener::bind(listen).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(%listen, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server failed");
        std::process::exit(1);
    }
}
