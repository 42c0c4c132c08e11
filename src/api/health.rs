use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use crate::database::RecordStores;

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    /// `mongodb` or `memory`
    pub record_store: String,
    pub timestamp: i64,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is up; reports which record store backs it", body = HealthResponse)
    )
)]
pub async fn health_check(stores: web::Data<RecordStores>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        service: "ishariu-service".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        record_store: stores.backend.to_string(),
        timestamp: chrono::Utc::now().timestamp(),
    })
}
