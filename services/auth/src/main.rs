use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

mod error;
mod jwt;
mod middleware;
mod models;
mod rate_limiter;
mod refresh;
mod repositories;
mod routes;
mod validation;

use sqlx::PgPool;
use tokio::net::TcpListener;

use common::audit::AuditRecorder;
use common::cache::{RedisConfig, RedisPool};
use common::database::{DatabaseConfig, init_pool};

use crate::jwt::{JwtConfig, JwtService};
use crate::rate_limiter::{RateLimiter, RateLimiterConfig};
use crate::refresh::RefreshTokenStore;
use crate::repositories::UserRepository;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub user_repository: UserRepository,
    pub refresh_tokens: RefreshTokenStore,
    pub jwt_service: JwtService,
    pub rate_limiter: RateLimiter,
    pub audit: AuditRecorder,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting identity service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    if common::database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    // Initialize the JWT service
    let jwt_config = JwtConfig::from_env()?;
    let jwt_service = JwtService::new(jwt_config);

    // Initialize the refresh-token store
    let redis_config = RedisConfig::from_env()?;
    let redis_pool = RedisPool::new(&redis_config).await?;
    let refresh_tokens = RefreshTokenStore::new(redis_pool, jwt_service.refresh_token_expiry());

    let user_repository = UserRepository::new(pool.clone());
    let rate_limiter = RateLimiter::new(RateLimiterConfig::default());
    let audit = AuditRecorder::new(pool.clone());

    let app_state = AppState {
        db_pool: pool,
        user_repository,
        refresh_tokens,
        jwt_service,
        rate_limiter,
        audit,
    };

    // Start the web server
    let app = routes::create_router(app_state);

    let bind_addr =
        std::env::var("AUTH_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = TcpListener::bind(&bind_addr).await?;
    info!("Identity service listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
