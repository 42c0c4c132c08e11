use actix_web::{web, HttpResponse};
use crate::database::RecordStores;
use crate::services::auth_service::{self, AuthResponse, RegisterRequest, SignInRequest};

#[utoipa::path(
    post,
    path = "/api/v1/auth/signin",
    tag = "Auth",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Sign-in successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn sign_in(
    stores: web::Data<RecordStores>,
    request: web::Json<SignInRequest>,
) -> HttpResponse {
    log::info!("🔐 POST /auth/signin - username: {}", request.username);

    match auth_service::sign_in(stores.users.as_ref(), &request).await {
        Ok(response) => {
            log::info!("✅ Sign-in successful: {}", request.username);
            HttpResponse::Ok().json(response)
        }
        Err(e) => {
            log::warn!("❌ Sign-in failed: {} - {}", request.username, e);
            e.to_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registration successful", body = AuthResponse),
        (status = 400, description = "Invalid request or user already exists")
    )
)]
pub async fn register(
    stores: web::Data<RecordStores>,
    request: web::Json<RegisterRequest>,
) -> HttpResponse {
    log::info!("📝 POST /auth/register - username: {}", request.username);

    match auth_service::register(stores.users.as_ref(), &request).await {
        Ok(response) => HttpResponse::Created().json(response),
        Err(e) => {
            log::warn!("❌ Registration failed: {} - {}", request.username, e);
            e.to_response()
        }
    }
}
