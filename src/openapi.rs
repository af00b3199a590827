//! OpenAPI document for the HTTP surface, served at `/docs/openapi.json`.

use axum::Json;
use utoipa::OpenApi;

use crate::domain::Order;
use crate::error::{Cause, ErrorBody};
use crate::handlers::orders::CreateOrderRequest;
use crate::handlers::{DbPoolStats, HealthStatus};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health,
        crate::handlers::orders::create_order,
        crate::handlers::orders::get_order
    ),
    components(schemas(Order, CreateOrderRequest, ErrorBody, Cause, HealthStatus, DbPoolStats)),
    tags(
        (name = "Orders", description = "Transfers between accounts"),
        (name = "Health", description = "Service and database health")
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
