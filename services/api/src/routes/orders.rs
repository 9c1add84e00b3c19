//! Order routes

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    error::ApiResult,
    middleware::{AuthUser, require_role},
    models::Role,
    models::order::CreateOrderRequest,
    state::AppState,
};

/// Create an order for the authenticated caller
pub async fn create_order(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateOrderRequest>,
) -> ApiResult<impl IntoResponse> {
    let order = state.orders.create(&user, payload).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// List the caller's orders
pub async fn my_orders(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let orders = state.orders.list_for_user(&user).await?;
    Ok(Json(orders))
}

/// List every order (admin)
pub async fn list_all_orders(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    require_role(&user, &[Role::Admin])?;
    let orders = state.orders.list_all().await?;
    Ok(Json(orders))
}

/// Fetch an order by ID
pub async fn get_order(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let order = state.orders.get_by_id(id, &user).await?;
    Ok(Json(order))
}

/// Fetch an order by its order number
pub async fn get_by_number(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(order_number): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let order = state.orders.get_by_order_number(&order_number, &user).await?;
    Ok(Json(order))
}

/// Cancel an order
pub async fn cancel_order(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let order = state.orders.cancel(id, &user).await?;
    Ok(Json(order))
}
