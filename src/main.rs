use barbershop_scheduling::{
    adapters::{AppointmentReferenceGuard, BcryptPasswordVerifier, PostgresStore},
    application::{ServiceDependencies, membership::list_barbershops},
    config::AppConfig,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "barbershop_scheduling=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();
    tracing::info!(
        max_connections = config.database_max_connections,
        slot_interval_minutes = config.scheduling.slot_interval_minutes,
        utc_offset = %config.scheduling.utc_offset,
        "Configuration loaded"
    );

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    tracing::info!("Database schema is up to date");

    let deps = ServiceDependencies {
        store: Arc::new(PostgresStore::new(pool)),
        password_verifier: Arc::new(BcryptPasswordVerifier::new()),
        deletion_listeners: vec![Arc::new(AppointmentReferenceGuard)],
        config: config.scheduling,
    };

    // Smoke check through the full stack
    let barbershops = list_barbershops(&deps)
        .await
        .expect("Failed to read barbershops");
    tracing::info!(count = barbershops.len(), "Scheduling engine ready");
}
