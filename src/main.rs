use rusty_librarian::{
    adapters::postgres::{
        MIGRATOR, PostgresEventStore, PostgresFineRepository, PostgresItemRepository,
        PostgresLoanRepository, PostgresMemberRepository,
    },
    api::{handlers::AppState, router::create_router},
    application::ServiceDependencies,
    config::AppConfig,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rusty_librarian=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!(
        fine_rate_per_day = %config.settings.fine_rate_per_day,
        renewal_limit = config.settings.renewal_limit.value(),
        loan_length_days = config.settings.loan_length_days,
        "configuration loaded"
    );

    // Initialize database connection pool
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    MIGRATOR.run(&pool).await?;

    // Initialize adapters
    let service_deps = ServiceDependencies {
        items: Arc::new(PostgresItemRepository::new(pool.clone())),
        loans: Arc::new(PostgresLoanRepository::new(pool.clone())),
        fines: Arc::new(PostgresFineRepository::new(pool.clone())),
        members: Arc::new(PostgresMemberRepository::new(pool.clone())),
        event_store: Arc::new(PostgresEventStore::new(pool)),
        settings: config.settings,
    };

    // Create router
    let app = create_router(Arc::new(AppState { service_deps }));

    // Server configuration
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    // Start server
    axum::serve(listener, app).await?;
    Ok(())
}
