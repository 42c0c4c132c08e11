use actix_web::{web, HttpResponse, Responder};
use crate::{
    database::RecordStores,
    models::{Course, CourseQuery},
    services::course_service,
};

#[utoipa::path(
    get,
    path = "/api/v1/courses",
    tag = "Courses",
    responses(
        (status = 200, description = "Every course in the catalog", body = Vec<Course>)
    )
)]
pub async fn list_courses(stores: web::Data<RecordStores>) -> impl Responder {
    match course_service::list_courses(stores.courses.as_ref()).await {
        Ok(courses) => HttpResponse::Ok().json(courses),
        Err(e) => {
            log::error!("❌ Failed to list courses: {}", e);
            e.to_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/best-sellers",
    tag = "Courses",
    responses(
        (status = 200, description = "Top three courses by revenue generated", body = Vec<Course>)
    )
)]
pub async fn best_sellers(stores: web::Data<RecordStores>) -> impl Responder {
    match course_service::best_sellers(stores.courses.as_ref()).await {
        Ok(courses) => HttpResponse::Ok().json(courses),
        Err(e) => {
            log::error!("❌ Failed to rank courses: {}", e);
            e.to_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/search",
    tag = "Courses",
    params(CourseQuery),
    responses(
        (status = 200, description = "Up to ten matching courses", body = Vec<Course>)
    )
)]
pub async fn search_courses(
    stores: web::Data<RecordStores>,
    query: web::Query<CourseQuery>,
) -> impl Responder {
    match course_service::search_courses(stores.courses.as_ref(), &query).await {
        Ok(courses) => HttpResponse::Ok().json(courses),
        Err(e) => e.to_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}",
    tag = "Courses",
    params(("id" = String, Path, description = "Course identifier")),
    responses(
        (status = 200, description = "Course found", body = Course),
        (status = 404, description = "Course not found")
    )
)]
pub async fn get_course(
    stores: web::Data<RecordStores>,
    id: web::Path<String>,
) -> impl Responder {
    match course_service::get_course(stores.courses.as_ref(), &id).await {
        Ok(course) => HttpResponse::Ok().json(course),
        Err(e) => e.to_response(),
    }
}
