pub mod account;
pub mod auth;
pub mod courses;
pub mod health;
pub mod swagger;

use actix_web::web;
use crate::middleware::AuthMiddleware;

/// Route table shared by the server and the handler tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // Health check
        .route("/health", web::get().to(health::health_check))
        // Auth endpoints
        .service(
            web::scope("/api/v1/auth")
                .route("/signin", web::post().to(auth::sign_in))
                .route("/register", web::post().to(auth::register)),
        )
        // Public profiles
        .route("/api/v1/users/{id}", web::get().to(account::get_user_profile))
        // Course catalog (read only)
        .service(
            web::scope("/api/v1/courses")
                .route("", web::get().to(courses::list_courses))
                .route("/best-sellers", web::get().to(courses::best_sellers))
                .route("/search", web::get().to(courses::search_courses))
                .route("/{id}", web::get().to(courses::get_course)), // catch-all, keep last
        )
        // Account management - requires JWT
        .service(
            web::scope("/api/v1/account")
                .wrap(AuthMiddleware)
                .route("/profile", web::get().to(account::get_own_profile))
                .route("/profile/{id}", web::post().to(account::update_profile))
                .route("/settings/{id}", web::get().to(account::get_settings))
                .route("/change-password", web::post().to(account::change_password))
                .route("/update-setting", web::post().to(account::update_setting))
                .route("/delete-account", web::post().to(account::delete_account))
                .route("/courses", web::post().to(account::create_course))
                .route("/courses/{id}/enroll", web::post().to(account::enroll)),
        );
}
