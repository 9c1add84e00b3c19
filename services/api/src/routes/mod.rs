//! API service routes

use axum::{
    Json, Router,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{middleware::auth_middleware, state::AppState};

pub mod audit;
pub mod faq;
pub mod gift_cards;
pub mod orders;
pub mod pages;
pub mod settings;
pub mod shows;
pub mod users;

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/api/orders",
            post(orders::create_order).get(orders::list_all_orders),
        )
        .route("/api/orders/my", get(orders::my_orders))
        .route(
            "/api/orders/by-number/:order_number",
            get(orders::get_by_number),
        )
        .route("/api/orders/:id", get(orders::get_order))
        .route("/api/orders/:id/cancel", post(orders::cancel_order))
        .route(
            "/api/admin/shows",
            get(shows::admin_list_shows).post(shows::create_show),
        )
        .route(
            "/api/admin/shows/:id",
            put(shows::update_show).delete(shows::delete_show),
        )
        .route(
            "/api/admin/pages",
            get(pages::admin_list_pages).post(pages::create_page),
        )
        .route(
            "/api/admin/pages/:id",
            put(pages::update_page).delete(pages::delete_page),
        )
        .route("/api/admin/settings", put(settings::update_settings))
        .route(
            "/api/admin/faq",
            get(faq::admin_list_faq).post(faq::create_faq),
        )
        .route(
            "/api/admin/faq/:id",
            put(faq::update_faq).delete(faq::delete_faq),
        )
        .route(
            "/api/admin/gift-cards",
            get(gift_cards::list_gift_cards).post(gift_cards::create_gift_card),
        )
        .route(
            "/api/admin/gift-cards/:id/deactivate",
            post(gift_cards::deactivate_gift_card),
        )
        .route(
            "/api/admin/users",
            get(users::list_users).post(users::create_user),
        )
        .route(
            "/api/admin/users/:id",
            put(users::update_user).delete(users::delete_user),
        )
        .route("/api/audit", get(audit::list_audit_log))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/shows", get(shows::list_shows))
        .route("/api/shows/:slug", get(shows::get_show))
        .route("/api/pages/:slug", get(pages::get_page))
        .route("/api/settings", get(settings::get_settings))
        .route("/api/faq", get(faq::list_faq))
        .route("/api/gift-cards/:code/balance", get(gift_cards::get_balance))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "stagepass-api"
    }))
}
