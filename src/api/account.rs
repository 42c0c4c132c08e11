use actix_web::{web, HttpResponse, Responder};
use crate::{
    database::RecordStores,
    models::CreateCourseRequest,
    services::{
        account_service::{self, ChangePasswordRequest, DeleteAccountRequest, UpdateProfileRequest, UpdateSettingRequest},
        auth_service::Claims,
        course_service,
    },
};

/// GET /api/v1/users/{id} - Public profile with created and enrolled courses
pub async fn get_user_profile(
    stores: web::Data<RecordStores>,
    id: web::Path<String>,
) -> impl Responder {
    log::info!("👤 GET /users/{}", id);

    match account_service::user_profile(stores.users.as_ref(), stores.courses.as_ref(), &id).await {
        Ok(profile) => HttpResponse::Ok().json(profile),
        Err(e) => e.to_response(),
    }
}

/// GET /api/v1/account/profile - Profile of the authenticated user
pub async fn get_own_profile(
    user: web::ReqData<Claims>,
    stores: web::Data<RecordStores>,
) -> impl Responder {
    match account_service::user_profile(stores.users.as_ref(), stores.courses.as_ref(), &user.sub).await {
        Ok(profile) => HttpResponse::Ok().json(profile),
        Err(e) => e.to_response(),
    }
}

/// POST /api/v1/account/profile/{id}
pub async fn update_profile(
    user: web::ReqData<Claims>,
    stores: web::Data<RecordStores>,
    id: web::Path<String>,
    request: web::Json<UpdateProfileRequest>,
) -> impl Responder {
    log::info!("🔧 POST /account/profile/{} - caller {}", id, user.sub);

    match account_service::update_profile(stores.users.as_ref(), &user.sub, &id, request.into_inner()).await {
        Ok(view) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "user": view
        })),
        Err(e) => {
            log::warn!("⚠️ Profile update rejected: {}", e);
            e.to_response()
        }
    }
}

/// GET /api/v1/account/settings/{id}
pub async fn get_settings(
    user: web::ReqData<Claims>,
    stores: web::Data<RecordStores>,
    id: web::Path<String>,
) -> impl Responder {
    match account_service::user_settings(stores.users.as_ref(), &user.sub, &id).await {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => e.to_response(),
    }
}

/// POST /api/v1/account/change-password
pub async fn change_password(
    user: web::ReqData<Claims>,
    stores: web::Data<RecordStores>,
    request: web::Json<ChangePasswordRequest>,
) -> impl Responder {
    match account_service::change_password(stores.users.as_ref(), &user.sub, &request).await {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(e) => e.to_response(),
    }
}

/// POST /api/v1/account/update-setting
pub async fn update_setting(
    user: web::ReqData<Claims>,
    stores: web::Data<RecordStores>,
    request: web::Json<UpdateSettingRequest>,
) -> impl Responder {
    match account_service::update_setting(stores.users.as_ref(), &user.sub, &request).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "success": true })),
        Err(e) => e.to_response(),
    }
}

/// POST /api/v1/account/delete-account
pub async fn delete_account(
    user: web::ReqData<Claims>,
    stores: web::Data<RecordStores>,
    request: web::Json<DeleteAccountRequest>,
) -> impl Responder {
    log::info!("🗑️ POST /account/delete-account - user {}", user.sub);

    match account_service::delete_account(stores.users.as_ref(), &user.sub, &request).await {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(e) => e.to_response(),
    }
}

/// POST /api/v1/account/courses - Creates a course authored by the caller
pub async fn create_course(
    user: web::ReqData<Claims>,
    stores: web::Data<RecordStores>,
    request: web::Json<CreateCourseRequest>,
) -> impl Responder {
    log::info!("📚 POST /account/courses - author {}", user.sub);

    match course_service::create_course(
        stores.users.as_ref(),
        stores.courses.as_ref(),
        &user.sub,
        request.into_inner(),
    )
    .await
    {
        Ok(course) => HttpResponse::Created().json(course),
        Err(e) => e.to_response(),
    }
}

/// POST /api/v1/account/courses/{id}/enroll
pub async fn enroll(
    user: web::ReqData<Claims>,
    stores: web::Data<RecordStores>,
    course_id: web::Path<String>,
) -> impl Responder {
    match course_service::enroll(stores.users.as_ref(), stores.courses.as_ref(), &user.sub, &course_id).await {
        Ok(course) => HttpResponse::Ok().json(course),
        Err(e) => e.to_response(),
    }
}
