use actix_web::{middleware::Logger, web, App, HttpServer};
use agenthub_server::config::AppConfig;
use agenthub_server::database::{Database, DEFAULT_CATEGORIES};
use agenthub_server::error::AppResult;
use agenthub_server::handlers::AppState;
use agenthub_server::routes;
use clap::{Arg, Command};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[actix_web::main]
async fn main() -> AppResult<()> {
    // Parse command line arguments
    let matches = Command::new("agenthub-server")
        .version(env!("CARGO_PKG_VERSION"))
        .about("agenthub - agent persona directory and conversation daemon")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Path to configuration file")
                .value_name("FILE"),
        )
        .get_matches();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("agenthub_server=info".parse().unwrap()))
        .init();

    tracing::info!("Starting agenthub server");

    // Load configuration
    let config = match matches.get_one::<String>("config") {
        Some(path) => AppConfig::load_from_file(&PathBuf::from(path))?,
        None => AppConfig::load()?,
    };

    // Initialize database and install reference data
    let database = Arc::new(Database::new(&config.database.path)?);
    database.seed_categories(DEFAULT_CATEGORIES)?;
    tracing::info!("Database initialized at {:?}", config.database.path);

    let app_state = web::Data::new(AppState {
        database,
        start_time: SystemTime::now(),
        config: Arc::new(config.clone()),
    });

    // Start HTTP server
    let server_addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Starting HTTP server on {}", server_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(Logger::default())
            .configure(routes::configure_routes)
    })
    .bind(&server_addr)?
    .run()
    .await?;

    Ok(())
}
