use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use tracing::Instrument;
use utoipa::ToSchema;

use crate::domain::Order;
use crate::error::{AppError, Cause, ErrorBody};
use crate::middleware::request_logger::request_id;
use crate::services::TransferRequest;
use crate::validation;
use crate::AppState;

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateOrderRequest {
    #[schema(value_type = f64, example = 100.0)]
    pub amount: BigDecimal,
    pub payee: String,
    pub payer: String,
}

#[utoipa::path(
    post,
    path = "/order",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Transfer committed", body = Order),
        (status = 400, description = "Invalid payload or transfer rejected", body = ErrorBody),
        (status = 500, description = "Transfer failed", body = ErrorBody)
    ),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let span = tracing::info_span!("create_order", request_id = %request_id(&headers));

    async move {
        let Json(payload) = payload.map_err(|rejection| {
            tracing::warn!(journey = "createOrder", error = %rejection, "Invalid order payload");
            AppError::Validation {
                message: "Invalid order payload".to_string(),
                causes: vec![Cause::new("body", rejection.body_text())],
            }
        })?;

        if let Err(e) = validation::validate_amount(&payload.amount) {
            tracing::warn!(journey = "createOrder", error = %e, "Invalid order amount");
            return Err(AppError::Validation {
                message: "Some fields are invalid".to_string(),
                causes: vec![e.into()],
            });
        }

        let payee = validation::parse_uuid("payee", &payload.payee).map_err(|e| {
            tracing::warn!(journey = "createOrder", error = %e, "Invalid payee id");
            AppError::InvalidRequest("Invalid Payee UUID".to_string())
        })?;
        let payer = validation::parse_uuid("payer", &payload.payer).map_err(|e| {
            tracing::warn!(journey = "createOrder", error = %e, "Invalid payer id");
            AppError::InvalidRequest("Invalid Payer UUID".to_string())
        })?;

        let order = state
            .engine
            .transfer(TransferRequest {
                amount: payload.amount,
                payer,
                payee,
            })
            .await?;

        Ok((StatusCode::CREATED, Json(order)))
    }
    .instrument(span)
    .await
}

#[utoipa::path(
    get,
    path = "/order/{id}",
    params(("id" = String, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order found", body = Order),
        (status = 400, description = "Malformed order id", body = ErrorBody),
        (status = 404, description = "Order not found", body = ErrorBody)
    ),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let span = tracing::info_span!("find_order", request_id = %request_id(&headers));

    async move {
        let id = validation::parse_uuid("id", &id).map_err(|e| {
            tracing::warn!(journey = "findOrderByID", error = %e, "Invalid order id");
            AppError::InvalidRequest("The ID is not a valid id".to_string())
        })?;

        let order = state.engine.find_by_id(id).await.map_err(|e| {
            tracing::warn!(journey = "findOrderByID", order_id = %id, reason = %e, "Order lookup failed");
            AppError::from(e)
        })?;

        Ok(Json(order))
    }
    .instrument(span)
    .await
}
