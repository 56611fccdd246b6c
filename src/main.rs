use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use knowlearn_backend::{
    config::{get_config, init_config},
    database::pool::{create_pool, run_migrations},
    router,
    store::{KeyValueStore, MemoryStore, PgStore},
    AppState,
};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    init_config()?;
    let config = get_config();

    let store: Arc<dyn KeyValueStore> = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url).await?;
            run_migrations(&pool).await?;
            info!("Using PostgreSQL key-value store");
            Arc::new(PgStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; data lives in process memory only");
            Arc::new(MemoryStore::new())
        }
    };

    let app_state = AppState::with_ai_service(store, config.clone())?;

    {
        let state = app_state.clone();
        let max_idle = chrono::Duration::minutes(config.player_idle_minutes);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(60)).await;
                let removed = state.session_service.sweep_idle(max_idle).await;
                if removed > 0 {
                    info!(removed, "idle play sessions swept");
                }
            }
        });
    }

    {
        let state = app_state.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(300)).await;
                let purged = state.auth_service.purge_expired_sessions().await;
                if purged > 0 {
                    info!(purged, "expired login sessions purged");
                }
            }
        });
    }

    let app = router(app_state);

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
