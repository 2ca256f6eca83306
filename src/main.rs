use std::sync::Arc;
use std::time::Duration;

use actix_web::{App, HttpServer, middleware, web};
use anyhow::Context;
use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;

use medirisk::AppState;
use medirisk::audit::AuditLog;
use medirisk::auth::AuthService;
use medirisk::config::Settings;
use medirisk::crypto::PasswordHasher;
use medirisk::handlers;
use medirisk::inference::InferenceDispatcher;
use medirisk::records::RecordService;
use medirisk::session::SessionStore;
use medirisk::store::{MemoryStore, PgStore, Store};

// How often idle sessions are swept
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::from_env()?;

    let store: Arc<dyn Store> = match &settings.database_url {
        Some(url) => Arc::new(
            PgStore::connect(url, settings.db_pool_size).context("Failed to connect to the database")?,
        ),
        None => {
            tracing::warn!("DATABASE_URL not set; accounts and records are kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    let hasher = PasswordHasher::new(settings.hash_cost)?;
    let dispatcher = InferenceDispatcher::load_dir(&settings.models_dir)
        .with_context(|| format!("Failed to load models from {}", settings.models_dir.display()))?;
    let sessions = Arc::new(SessionStore::new(settings.session_ttl));

    let state = web::Data::new(AppState {
        auth: AuthService::new(store.clone(), hasher),
        records: RecordService::new(store),
        dispatcher: Arc::new(dispatcher),
        audit: AuditLog::new(&settings.audit_dir),
        sessions: sessions.clone(),
        recent_limit: settings.recent_records_limit,
    });

    actix_web::rt::spawn(async move {
        let mut tick = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            tick.tick().await;
            let purged = sessions.purge_expired();
            if purged > 0 {
                tracing::debug!(purged, "Expired sessions removed");
            }
        }
    });

    tracing::info!(addr = %settings.bind_addr, audit_dir = %state.audit.dir().display(), "Starting MediRisk");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .configure(handlers::configure)
    })
    .bind(&settings.bind_addr)?
    .run()
    .await?;

    Ok(())
}
