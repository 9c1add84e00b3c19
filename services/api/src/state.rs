//! Application state shared across handlers

use sqlx::PgPool;

use common::audit::AuditRecorder;

use crate::middleware::TokenVerifier;
use crate::orders::OrderService;
use crate::repositories::{
    FaqRepository, GiftCardRepository, PageRepository, SettingsRepository, ShowRepository,
    UserRepository,
};
use crate::settings_cache::SettingsCache;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub users: UserRepository,
    pub shows: ShowRepository,
    pub pages: PageRepository,
    pub settings: SettingsRepository,
    pub faq: FaqRepository,
    pub gift_cards: GiftCardRepository,
    pub orders: OrderService,
    pub settings_cache: SettingsCache,
    pub audit: AuditRecorder,
    pub token_verifier: TokenVerifier,
}
