use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

mod error;
mod middleware;
mod models;
mod orders;
mod repositories;
mod routes;
mod settings_cache;
mod state;
mod validation;

use tokio::net::TcpListener;

use common::audit::AuditRecorder;
use common::database::{DatabaseConfig, init_pool};

use crate::middleware::TokenVerifier;
use crate::orders::OrderService;
use crate::repositories::{
    FaqRepository, GiftCardRepository, OrderRepository, PageRepository, SettingsRepository,
    ShowRepository, UserRepository,
};
use crate::settings_cache::SettingsCache;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting API service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    if common::database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    // Run migrations for the shared database
    sqlx::migrate!("../../migrations").run(&pool).await?;
    info!("Migrations run successfully");

    let token_verifier = TokenVerifier::from_env()
        .map_err(|e| anyhow::anyhow!("Failed to initialize token verifier: {}", e))?;

    // Initialize repositories
    let users = UserRepository::new(pool.clone());
    let shows = ShowRepository::new(pool.clone());
    let pages = PageRepository::new(pool.clone());
    let settings = SettingsRepository::new(pool.clone());
    let faq = FaqRepository::new(pool.clone());
    let gift_cards = GiftCardRepository::new(pool.clone());
    let order_repository = OrderRepository::new(pool.clone());

    let orders = OrderService::new(order_repository, shows.clone(), gift_cards.clone());
    let settings_cache = SettingsCache::new(SettingsCache::DEFAULT_TTL);
    let audit = AuditRecorder::new(pool.clone());

    let app_state = AppState {
        db_pool: pool,
        users,
        shows,
        pages,
        settings,
        faq,
        gift_cards,
        orders,
        settings_cache,
        audit,
        token_verifier,
    };

    // Start the web server
    let app = routes::create_router(app_state);

    let bind_addr = std::env::var("API_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".to_string());
    let listener = TcpListener::bind(&bind_addr).await?;
    info!("API service listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
