//! Folio CMS kernel
//!
//! HTTP server and maintenance commands.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method};
use clap::{Parser, Subcommand};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use folio_kernel::content_store::PgContentStore;
use folio_kernel::{AppState, Config, db, pages, routes, session};

/// Folio CMS kernel.
#[derive(Parser)]
#[command(name = "folio", version, about = "Folio CMS kernel", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default).
    Serve,

    /// Apply database migrations and exit.
    Migrate,

    /// Page maintenance commands.
    Pages {
        #[command(subcommand)]
        command: PagesCommand,
    },
}

#[derive(Subcommand)]
enum PagesCommand {
    /// Print the navigation tree of a user or group.
    Tree {
        /// Container (user or group) ID.
        container_id: Uuid,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env().context("failed to load configuration")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Migrate => {
            let pool = db::create_pool(&config).await?;
            db::run_migrations(&pool).await?;
            info!("migrations applied");
            Ok(())
        }
        Command::Pages {
            command: PagesCommand::Tree { container_id },
        } => {
            let pool = db::create_pool(&config).await?;
            let store = PgContentStore::new(pool);
            pages::cli::cmd_pages_tree(&store, container_id).await
        }
    }
}

async fn serve(config: Config) -> Result<()> {
    info!(port = config.port, "Starting Folio kernel");

    let state = AppState::new(&config)
        .await
        .context("failed to initialize application state")?;

    let same_site = session::parse_same_site(&config.cookie_same_site);
    let session_layer = session::create_session_layer(&config.redis_url, same_site)
        .await
        .context("failed to create session layer")?;

    let cors = build_cors_layer(&config);

    // Last added = first executed: TraceLayer → CORS → session → routes
    let app = routes::router()
        .layer(session_layer)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind to address")?;

    info!(%addr, "Server listening");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];

    if config.cors_allowed_origins.len() == 1 && config.cors_allowed_origins[0] == "*" {
        CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(methods)
            .allow_headers(tower_http::cors::Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_allowed_origins
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!(origin = %o, "ignoring unparseable CORS origin");
                    None
                }
            })
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(tower_http::cors::Any)
            .allow_credentials(true)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
