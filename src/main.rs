// src/main.rs

use std::{str::FromStr, sync::Arc, time::Duration};

use dotenvy::dotenv;
use math_ai::{
    chatbox::{ChatboxService, HttpChatboxClient},
    config::Config,
    repository::{AssessmentRepository, MemoryAssessmentRepository, PgAssessmentRepository},
    routes,
    services::{PgProfileProvider, ProfileProvider, QuizAssessmentService, StaticProfileProvider},
    state::AppState,
};
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    let (repository, profiles): (Arc<dyn AssessmentRepository>, Arc<dyn ProfileProvider>) =
        match &config.database_url {
            Some(database_url) => {
                let pool = connect_database(&config, database_url).await;

                // Run Migrations Automatically
                tracing::info!("Running migrations...");
                sqlx::migrate!("./migrations")
                    .run(&pool)
                    .await
                    .expect("Failed to run database migrations");
                tracing::info!("Migrations applied successfully.");

                (
                    Arc::new(PgAssessmentRepository::new(pool.clone())),
                    Arc::new(PgProfileProvider::new(pool)),
                )
            }
            None => {
                tracing::warn!("DATABASE_URL not set, assessments are kept in memory only");
                (
                    Arc::new(MemoryAssessmentRepository::new()),
                    Arc::new(StaticProfileProvider::new()),
                )
            }
        };

    let transport =
        HttpChatboxClient::new(&config.chatbox).expect("Failed to build chatbox HTTP client");
    let chatbox = ChatboxService::new(Arc::new(transport));
    tracing::info!("Chatbox endpoint: {}", config.chatbox.url);

    // Create AppState
    let quiz = QuizAssessmentService::new(Arc::new(chatbox), repository, profiles, &config.quiz);
    let state = AppState {
        config: config.clone(),
        quiz: Arc::new(quiz),
    };

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind listening address");
    tracing::info!("Listening on {}", config.bind_addr);

    // Start the server
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Initialize Database Pool with Retry
async fn connect_database(config: &Config, database_url: &str) -> PgPool {
    let options = PgConnectOptions::from_str(database_url)
        .expect("DATABASE_URL must be a valid Postgres URL")
        .options([(
            "statement_timeout",
            format!("{}s", config.db_statement_timeout_secs),
        )]);

    let mut retry_count = 0;
    let pool = loop {
        match PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect_with(options.clone())
            .await
        {
            Ok(pool) => break pool,
            Err(e) => {
                retry_count += 1;
                if retry_count > 5 {
                    panic!("Failed to connect to database after 5 retries: {}", e);
                }
                tracing::warn!(
                    "Database not ready, retrying in 2s... (Attempt {})",
                    retry_count
                );
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    };

    tracing::info!("Database connected...");
    pool
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}
