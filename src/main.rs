use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use skill_match::config::{LoggingSettings, Settings, StorageBackend};
use skill_match::core::Matcher;
use skill_match::routes::{self, AppState};
use skill_match::services::{CacheManager, MemoryUserStore, PostgresUserStore, UserStore};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(logging: &LoggingSettings) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    match logging.format.as_str() {
        "pretty" => subscriber.pretty().init(),
        "compact" => subscriber.compact().init(),
        _ => subscriber.json().init(),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    init_tracing(&settings.logging);

    info!("Starting Skill Match service...");

    let store: Arc<dyn UserStore> = match settings.storage.backend {
        StorageBackend::Memory => {
            warn!("Using in-memory storage, users are lost on restart");
            Arc::new(MemoryUserStore::new())
        }
        StorageBackend::Postgres => {
            let postgres = PostgresUserStore::from_settings(&settings.database)
                .await
                .map_err(|e| {
                    error!("Failed to connect to PostgreSQL: {}", e);
                    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
                })?;
            Arc::new(postgres)
        }
    };

    info!("User store initialized ({})", store.backend());

    let cache = match CacheManager::new(
        settings.cache.redis_url.as_deref(),
        settings.cache.l1_cache_size,
        settings.cache.ttl_secs,
    )
    .await
    {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to connect to Redis ({}), using the in-process cache", e);
            CacheManager::in_memory(settings.cache.l1_cache_size, settings.cache.ttl_secs)
        }
    };

    if cache.has_redis() {
        info!("Cache manager initialized (Redis, TTL: {}s)", settings.cache.ttl_secs);
    } else {
        info!(
            "Cache manager initialized (in-process: {} entries, TTL: {}s)",
            settings.cache.l1_cache_size, settings.cache.ttl_secs
        );
    }

    let weights = settings.scoring_weights();
    let matcher = Matcher::new(weights);

    info!("Matcher initialized with weights: {:?}", weights);

    let app_state = AppState {
        store,
        cache: Arc::new(cache),
        matcher,
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;

    info!("Starting HTTP server on {}:{}", host, port);

    let server = HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    });

    let server = match settings.server.workers {
        Some(workers) => server.workers(workers),
        None => server,
    };

    server.bind((host, port))?.run().await
}
