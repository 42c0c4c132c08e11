use crate::{
    database::RecordStore,
    models::{Course, CourseQuery, CreateCourseRequest, User},
    services::account_service::{load_user, save_user},
    utils::AppError,
};
use mongodb::bson::{doc, Document};

pub async fn list_courses(courses: &dyn RecordStore<Course>) -> Result<Vec<Course>, AppError> {
    Ok(courses.fetch_all().await?)
}

pub async fn get_course(courses: &dyn RecordStore<Course>, id: &str) -> Result<Course, AppError> {
    courses
        .fetch_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Course {}", id)))
}

pub async fn best_sellers(courses: &dyn RecordStore<Course>) -> Result<Vec<Course>, AppError> {
    Ok(courses.fetch_top_ranked().await?)
}

fn search_filter(query: &CourseQuery) -> Document {
    let mut filter = Document::new();
    let fields = [
        ("Category", &query.category),
        ("Title", &query.title),
        ("AuthorId", &query.author_id),
    ];
    for (field, value) in fields {
        if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
            filter.insert(field, value);
        }
    }
    filter
}

/// Exact-match search on the given fields, capped like every filtered fetch.
pub async fn search_courses(
    courses: &dyn RecordStore<Course>,
    query: &CourseQuery,
) -> Result<Vec<Course>, AppError> {
    Ok(courses.fetch_by_filter(search_filter(query)).await?)
}

pub async fn create_course(
    users: &dyn RecordStore<User>,
    courses: &dyn RecordStore<Course>,
    caller_id: &str,
    request: CreateCourseRequest,
) -> Result<Course, AppError> {
    if request.title.trim().is_empty() {
        return Err(AppError::InvalidRequest("Title is required".to_string()));
    }

    let mut author = load_user(users, caller_id).await?;
    let now = chrono::Utc::now().timestamp();

    let mut course = Course {
        id: String::new(),
        title: request.title,
        description: request.description.unwrap_or_default(),
        category: request.category.unwrap_or_default(),
        author_id: author.id.clone(),
        price: request.price.unwrap_or(0.0).max(0.0),
        revenue_generated: 0.0,
        enrolled_students: 0,
        created_at: now,
        updated_at: now,
    };

    let course_id = courses.insert(&mut course).await?;

    author.created_courses.push(course_id.clone());
    save_user(users, &author).await?;

    log::info!("📚 Course {} created by {}", course_id, author.id);
    Ok(course)
}

/// Enrolls the caller. The course price is credited to its revenue, which
/// drives the best-seller ranking.
pub async fn enroll(
    users: &dyn RecordStore<User>,
    courses: &dyn RecordStore<Course>,
    caller_id: &str,
    course_id: &str,
) -> Result<Course, AppError> {
    let mut student = load_user(users, caller_id).await?;
    let mut course = get_course(courses, course_id).await?;

    if student.enrolled_courses.iter().any(|id| id == course_id) {
        return Err(AppError::InvalidRequest("Already enrolled".to_string()));
    }

    // No transaction spans the two documents. The course is credited first,
    // so a failed write never leaves a student enrolled without the credit.
    course.enrolled_students += 1;
    course.revenue_generated += course.price;
    course.updated_at = chrono::Utc::now().timestamp();
    let outcome = courses.replace(&course).await?;
    if outcome.is_noop() {
        log::warn!("⚠️ Course {} disappeared during enrollment", course.id);
    }

    student.enrolled_courses.push(course.id.clone());
    save_user(users, &student).await?;

    Ok(course)
}
