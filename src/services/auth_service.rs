use crate::{
    database::RecordStore,
    models::{User, UserView, DEFAULT_PROFILE_COLOR, DEFAULT_ROLE},
    utils::AppError,
};
use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::doc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

#[cfg(not(test))]
const HASH_COST: u32 = bcrypt::DEFAULT_COST;
#[cfg(test)]
const HASH_COST: u32 = 4;

// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,           // user id
    pub username: String,
    pub role: String,
    pub iat: usize,            // issued at
    pub exp: usize,            // expiration
    pub jti: String,           // JWT ID
    pub aud: String,           // audience
    pub iss: String,           // issuer
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SignInRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub user: UserView,
}

fn get_jwt_secret() -> String {
    std::env::var("JWT_SECRET").unwrap_or_else(|_| "default-secret-change-me".to_string())
}

fn get_jwt_issuer() -> String {
    std::env::var("JWT_ISSUER").unwrap_or_else(|_| "ishariu-service".to_string())
}

fn get_jwt_audience() -> String {
    std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "ishariu-web".to_string())
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, HASH_COST).map_err(|e| AppError::Database(format!("Failed to hash password: {}", e)))
}

/// Malformed stored hashes count as a mismatch.
pub fn password_matches(password: &str, stored_hash: &str) -> bool {
    verify(password, stored_hash).unwrap_or(false)
}

// Generate JWT token
pub fn generate_jwt(user: &User) -> Result<String, AppError> {
    let iat = Utc::now().timestamp() as usize;
    let exp = (Utc::now() + Duration::hours(24)).timestamp() as usize;

    let claims = Claims {
        sub: user.id.clone(),
        username: user.username.clone(),
        role: user.role.clone(),
        iat,
        exp,
        jti: Uuid::new_v4().to_string(),
        aud: get_jwt_audience(),
        iss: get_jwt_issuer(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(get_jwt_secret().as_ref()),
    )
    .map_err(|e| AppError::Unauthorized(format!("Failed to generate token: {}", e)))
}

// Verify JWT token
pub fn verify_token(token: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[get_jwt_audience()]);

    let mut issuers = HashSet::new();
    issuers.insert(get_jwt_issuer());
    validation.iss = Some(issuers);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(get_jwt_secret().as_ref()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}

/// Fails unless `username` is free or held only by `owner_id`.
pub(crate) async fn ensure_username_available(
    users: &dyn RecordStore<User>,
    username: &str,
    owner_id: Option<&str>,
) -> Result<(), AppError> {
    let holders = users
        .fetch_by_filter(doc! { "Username": username })
        .await?;
    if holders.iter().any(|user| Some(user.id.as_str()) != owner_id) {
        return Err(AppError::InvalidRequest("User already exists".to_string()));
    }
    Ok(())
}

pub async fn sign_in(
    users: &dyn RecordStore<User>,
    request: &SignInRequest,
) -> Result<AuthResponse, AppError> {
    let candidates = users
        .fetch_by_filter(doc! { "Username": &request.username })
        .await?;

    let user = candidates
        .into_iter()
        .find(|user| password_matches(&request.password, &user.password))
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

    let token = generate_jwt(&user)?;

    Ok(AuthResponse {
        success: true,
        token,
        user: user.into(),
    })
}

pub async fn register(
    users: &dyn RecordStore<User>,
    request: &RegisterRequest,
) -> Result<AuthResponse, AppError> {
    if request.username.trim().is_empty() || request.password.is_empty() {
        return Err(AppError::InvalidRequest(
            "Username and password are required".to_string(),
        ));
    }

    ensure_username_available(users, &request.username, None).await?;

    let mut user = User {
        id: String::new(),
        username: request.username.clone(),
        password: hash_password(&request.password)?,
        email: request.email.clone(),
        role: request.role.clone().unwrap_or_else(|| DEFAULT_ROLE.to_string()),
        profile_color: DEFAULT_PROFILE_COLOR.to_string(),
        allow_access_to_age_restricted_content: false,
        use_data_to_improve_ishariu: false,
        created_courses: Vec::new(),
        enrolled_courses: Vec::new(),
    };

    let id = users.insert(&mut user).await?;
    log::info!("✅ User registered: {} ({})", user.username, id);

    let token = generate_jwt(&user)?;

    Ok(AuthResponse {
        success: true,
        token,
        user: user.into(),
    })
}
