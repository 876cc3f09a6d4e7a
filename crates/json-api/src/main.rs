//! Testgenium JSON API Server

use std::process;

use jiff::Timestamp;
use salvo::{
    affix_state::inject,
    oapi::{
        OpenApi,
        security::{Http, HttpAuthScheme, SecurityScheme},
        swagger_ui::SwaggerUi,
    },
    prelude::*,
    trailing_slash::remove_slash,
};
use tracing::{error, info, warn};

use testgenium_app::{
    auth::PasswordHasher,
    context::{AppContext, AppSettings},
    database, seed,
};

use crate::{
    config::{ServerConfig, storage::StorageBackend},
    observability::{Observability, metrics_handler, request_logging},
    state::State,
};

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod auth;
mod config;
mod errors;
mod extensions;
mod healthcheck;
mod jobs;
mod observability;
mod plans;
mod profile;
mod router;
mod shutdown;
mod state;
#[cfg(test)]
mod test_helpers;

/// Testgenium JSON API Server entry point
#[tokio::main]
pub async fn main() {
    // Load configuration from .env and CLI arguments
    let config = ServerConfig::load().unwrap_or_else(|e| {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized yet, must use eprintln for config errors"
        )]
        {
            eprintln!("Configuration error: {e}");
        }

        process::exit(1);
    });

    let observability = Observability::init(&config).unwrap_or_else(|e| {
        #[expect(
            clippy::print_stderr,
            reason = "logging failed to initialize, must use eprintln"
        )]
        {
            eprintln!("Observability error: {e}");
        }

        process::exit(1);
    });

    let settings = match config.app_settings() {
        Ok(settings) => settings,
        Err(config_error) => {
            error!("invalid configuration: {config_error}");

            process::exit(1);
        }
    };

    if config.auth.session_signing_key.is_none() {
        warn!("SESSION_SIGNING_KEY is not set, sessions will not survive a restart");
    }

    let app = match build_app(&config, settings).await {
        Ok(app) => app,
        Err(init_error) => {
            error!("failed to initialize app context: {init_error}");

            process::exit(1);
        }
    };

    match app.recover().await {
        Ok(0) => {}
        Ok(interrupted) => warn!(interrupted, "failed jobs left running by a previous process"),
        Err(recovery_error) => {
            error!("startup aborted: {recovery_error:?}");

            process::exit(1);
        }
    }

    let api = router::app_router();

    let doc = OpenApi::new("Testgenium API", env!("CARGO_PKG_VERSION"))
        .add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
        .merge_router(&api);

    let router = Router::new()
        .hoop(CatchPanic::new())
        .hoop(remove_slash())
        .hoop(request_logging)
        .hoop(inject(State::from_app_context(app)))
        .push(api)
        .push(Router::with_path("metrics").get(metrics_handler))
        .push(doc.into_router("/api-doc/openapi.json"))
        .push(SwaggerUi::new("/api-doc/openapi.json").into_router("docs"));

    let addr = config.socket_addr();

    info!("Starting server on {addr}");

    let listener = TcpListener::new(addr).bind().await;
    let server = Server::new(listener);
    let handle = server.handle();

    tokio::spawn(async move {
        if let Err(error) = shutdown::listen(handle).await {
            error!("failed to listen for shutdown signal: {error}");
        }
    });

    server.serve(router).await;

    info!("server stopped");

    observability.shutdown();
}

/// Wire the configured storage backend into an [`AppContext`].
async fn build_app(config: &ServerConfig, settings: AppSettings) -> Result<AppContext, String> {
    let app = match config.storage.storage_backend {
        StorageBackend::Postgres => {
            let url = config
                .storage
                .database_url
                .as_deref()
                .ok_or("DATABASE_URL is required for the postgres backend")?;

            let pool = database::connect(url)
                .await
                .map_err(|e| format!("failed to connect to database: {e}"))?;

            if config.storage.run_migrations {
                database::migrate(&pool)
                    .await
                    .map_err(|e| format!("failed to run migrations: {e}"))?;

                info!("migrations applied");
            }

            AppContext::from_pool(pool, settings)
        }
        StorageBackend::Memory => {
            warn!("using in-memory storage, tenants and jobs are lost on exit");

            AppContext::in_memory(settings)
        }
    };

    if config.storage.seed_demo_tenants {
        let created =
            seed::seed_demo_tenants(app.tenants.as_ref(), &PasswordHasher::new(), Timestamp::now())
                .await
                .map_err(|e| format!("failed to seed demo tenants: {e}"))?;

        info!(created = created.len(), "demo tenants seeded");
    }

    Ok(app)
}
