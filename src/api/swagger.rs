use utoipa::OpenApi;
use utoipa::openapi::security::{SecurityScheme, HttpAuthScheme, HttpBuilder};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "iShariu Service API",
        version = "1.0.0",
        description = "Accounts and course catalog for iShariu.\n\n**Authentication:** `/api/v1/account` endpoints require a JWT Bearer token obtained from sign-in or registration."
    ),
    paths(
        // Auth endpoints
        crate::api::auth::sign_in,
        crate::api::auth::register,

        // Health
        crate::api::health::health_check,

        // Courses
        crate::api::courses::list_courses,
        crate::api::courses::best_sellers,
        crate::api::courses::search_courses,
        crate::api::courses::get_course,
    ),
    components(
        schemas(
            crate::services::auth_service::SignInRequest,
            crate::services::auth_service::RegisterRequest,
            crate::services::auth_service::AuthResponse,
            crate::models::UserView,
            crate::models::Course,
            crate::models::CreateCourseRequest,
            crate::api::health::HealthResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Sign-in and registration. Issues the JWT used by account endpoints."),
        (name = "Health", description = "Service health check."),
        (name = "Courses", description = "Public course catalog, search and best sellers."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Enter your JWT token"))
                        .build()
                ),
            );
        }
    }
}
