use crate::application::engine::VerificationEngine;
use crate::config::GatewayConfig;
use crate::domain::order::{OrderId, OrderStatus};
use crate::error::{GatewayError, Result};
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    engine: Arc<VerificationEngine>,
    config: Arc<GatewayConfig>,
}

/// Builds the gateway API router.
pub fn router(engine: Arc<VerificationEngine>, config: GatewayConfig) -> Router {
    let state = AppState {
        engine,
        config: Arc::new(config),
    };

    Router::new()
        .route("/api/create-order", post(create_order))
        .route("/api/order-details/{order_id}", get(order_details))
        .route("/api/verify", post(verify))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    amount: Option<Decimal>,
    seller_callback_url: Option<String>,
    seller_return_url: Option<String>,
}

#[derive(Serialize)]
struct CreateOrderResponse {
    status: &'static str,
    order_id: String,
    payment_url: String,
}

async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<Json<CreateOrderResponse>> {
    let amount = request
        .amount
        .ok_or_else(|| GatewayError::Validation("Amount required".to_string()))?;

    let (order_id, _) = state
        .engine
        .create(
            amount,
            request.seller_callback_url,
            request.seller_return_url,
        )
        .await?;

    let payment_url = format!(
        "{}/pay?order_id={}",
        state.config.public_base_url, order_id
    );

    Ok(Json(CreateOrderResponse {
        status: "created",
        order_id: order_id.to_string(),
        payment_url,
    }))
}

#[derive(Serialize)]
struct OrderDetailsResponse {
    amount: Decimal,
    upi_string: String,
}

/// Display data for the paying client. Internal fields (callback and
/// return URLs) are never exposed here.
async fn order_details(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<OrderDetailsResponse>> {
    let order_id = OrderId::from(order_id);
    let order = state.engine.fetch(&order_id).await?;

    let upi_string = super::upi::payment_string(
        &state.config.merchant_vpa,
        &state.config.merchant_name,
        &order_id,
        order.amount_expected.value(),
    );

    Ok(Json(OrderDetailsResponse {
        amount: order.amount_expected.value(),
        upi_string,
    }))
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    order_id: String,
}

#[derive(Serialize)]
struct VerifyResponse {
    status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect_to: Option<String>,
}

async fn verify(
    State(state): State<AppState>,
    Json(request): Json<VerifyRequest>,
) -> Result<Json<VerifyResponse>> {
    let verification = state
        .engine
        .verify(&OrderId::from(request.order_id))
        .await?;

    Ok(Json(VerifyResponse {
        status: verification.status,
        redirect_to: verification.redirect_to,
    }))
}
