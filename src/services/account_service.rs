// Account management on top of the user and course stores.
// Every mutation is read-modify-write: fetch, merge, full replace.

use crate::{
    database::RecordStore,
    models::{Course, User, UserView},
    services::auth_service::{ensure_username_available, hash_password, password_matches},
    utils::AppError,
};
use serde::{Deserialize, Serialize};

pub const SETTING_AGE_RESTRICTED: &str = "AllowAccessToAgeRestrictedContent";
pub const SETTING_IMPROVE_ISHARIU: &str = "UseDataToImproveIShariu";

#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub user: UserView,
    pub created_courses: Vec<Course>,
    pub enrolled_courses: Vec<Course>,
}

/// Incoming profile form. Empty strings and missing fields leave the stored
/// value untouched.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub profile_color: Option<String>,
    pub allow_access_to_age_restricted_content: Option<bool>,
    pub use_data_to_improve_ishariu: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSettingRequest {
    pub setting_name: String,
    pub setting_value: bool,
}

#[derive(Debug, Deserialize)]
pub struct DeleteAccountRequest {
    pub password: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ActionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ActionResult {
    fn ok() -> Self {
        Self { success: true, message: None }
    }

    fn failed(message: &str) -> Self {
        Self {
            success: false,
            message: Some(message.to_string()),
        }
    }
}

fn ensure_owner(caller_id: &str, id: &str) -> Result<(), AppError> {
    if caller_id != id {
        return Err(AppError::Forbidden(
            "Cannot access another user's account".to_string(),
        ));
    }
    Ok(())
}

pub(crate) async fn load_user(users: &dyn RecordStore<User>, id: &str) -> Result<User, AppError> {
    users
        .fetch_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {}", id)))
}

pub(crate) async fn save_user(users: &dyn RecordStore<User>, user: &User) -> Result<(), AppError> {
    let outcome = users.replace(user).await?;
    if outcome.is_noop() {
        log::warn!("⚠️ Replace matched no user for id {}", user.id);
    }
    Ok(())
}

async fn load_courses(
    courses: &dyn RecordStore<Course>,
    ids: &[String],
) -> Result<Vec<Course>, AppError> {
    let mut found = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(course) = courses.fetch_by_id(id).await? {
            found.push(course);
        }
    }
    Ok(found)
}

/// Profile with the user's created and enrolled courses. Course ids that no
/// longer resolve are skipped.
pub async fn user_profile(
    users: &dyn RecordStore<User>,
    courses: &dyn RecordStore<Course>,
    id: &str,
) -> Result<UserProfile, AppError> {
    let user = load_user(users, id).await?;

    let created_courses = load_courses(courses, &user.created_courses).await?;
    let enrolled_courses = load_courses(courses, &user.enrolled_courses).await?;

    Ok(UserProfile {
        user: user.into(),
        created_courses,
        enrolled_courses,
    })
}

pub async fn update_profile(
    users: &dyn RecordStore<User>,
    caller_id: &str,
    id: &str,
    request: UpdateProfileRequest,
) -> Result<UserView, AppError> {
    ensure_owner(caller_id, id)?;
    let mut user = load_user(users, id).await?;

    if let Some(email) = request.email.filter(|v| !v.is_empty()) {
        user.email = email;
    }
    if let Some(username) = request.username.filter(|v| !v.is_empty()) {
        if username != user.username {
            ensure_username_available(users, &username, Some(&user.id)).await?;
        }
        user.username = username;
    }
    if let Some(password) = request.password.filter(|v| !v.is_empty()) {
        user.password = hash_password(&password)?;
    }
    if let Some(color) = request.profile_color.filter(|v| !v.is_empty()) {
        user.profile_color = color;
    }
    if let Some(flag) = request.allow_access_to_age_restricted_content {
        user.allow_access_to_age_restricted_content = flag;
    }
    if let Some(flag) = request.use_data_to_improve_ishariu {
        user.use_data_to_improve_ishariu = flag;
    }

    save_user(users, &user).await?;
    log::info!("✅ Profile updated for user {}", id);

    Ok(user.into())
}

pub async fn user_settings(
    users: &dyn RecordStore<User>,
    caller_id: &str,
    id: &str,
) -> Result<UserView, AppError> {
    ensure_owner(caller_id, id)?;
    Ok(load_user(users, id).await?.into())
}

pub async fn change_password(
    users: &dyn RecordStore<User>,
    caller_id: &str,
    request: &ChangePasswordRequest,
) -> Result<ActionResult, AppError> {
    let mut user = load_user(users, caller_id).await?;

    if !password_matches(&request.current_password, &user.password) {
        return Ok(ActionResult::failed("Current password is incorrect."));
    }

    if request.new_password == request.current_password {
        return Ok(ActionResult::failed(
            "New password cannot be the same as the current password.",
        ));
    }

    user.password = hash_password(&request.new_password)?;
    save_user(users, &user).await?;

    Ok(ActionResult::ok())
}

pub async fn update_setting(
    users: &dyn RecordStore<User>,
    caller_id: &str,
    request: &UpdateSettingRequest,
) -> Result<(), AppError> {
    let mut user = load_user(users, caller_id).await?;

    match request.setting_name.as_str() {
        SETTING_AGE_RESTRICTED => user.allow_access_to_age_restricted_content = request.setting_value,
        SETTING_IMPROVE_ISHARIU => user.use_data_to_improve_ishariu = request.setting_value,
        other => {
            return Err(AppError::InvalidRequest(format!("Unknown setting: {}", other)));
        }
    }

    save_user(users, &user).await
}

pub async fn delete_account(
    users: &dyn RecordStore<User>,
    caller_id: &str,
    request: &DeleteAccountRequest,
) -> Result<ActionResult, AppError> {
    let user = load_user(users, caller_id).await?;

    if !password_matches(&request.password, &user.password) {
        return Ok(ActionResult::failed("Incorrect password."));
    }

    users.delete_by_id(&user.id).await?;
    log::info!("🗑️ Account deleted: {}", user.id);

    Ok(ActionResult::ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::InMemoryRecordStore;
    use crate::models::DEFAULT_PROFILE_COLOR;
    use mongodb::bson::doc;

    async fn seeded_user(users: &InMemoryRecordStore<User>, password: &str) -> User {
        let mut user = User {
            id: String::new(),
            username: "ana".to_string(),
            password: hash_password(password).unwrap(),
            email: "ana@example.com".to_string(),
            role: "User".to_string(),
            profile_color: DEFAULT_PROFILE_COLOR.to_string(),
            allow_access_to_age_restricted_content: false,
            use_data_to_improve_ishariu: false,
            created_courses: vec![],
            enrolled_courses: vec![],
        };
        users.insert(&mut user).await.unwrap();
        user
    }

    fn course(title: &str) -> Course {
        Course {
            id: String::new(),
            title: title.to_string(),
            description: String::new(),
            category: "music".to_string(),
            author_id: String::new(),
            price: 0.0,
            revenue_generated: 0.0,
            enrolled_students: 0,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[tokio::test]
    async fn profile_resolves_courses_and_skips_missing_ones() {
        let users = InMemoryRecordStore::<User>::new();
        let courses = InMemoryRecordStore::<Course>::new();
        let mut user = seeded_user(&users, "pw").await;

        let created = courses.insert(&mut course("Guitar")).await.unwrap();
        let enrolled = courses.insert(&mut course("Piano")).await.unwrap();
        user.created_courses = vec![created.clone(), "gone".to_string()];
        user.enrolled_courses = vec![enrolled.clone()];
        users.replace(&user).await.unwrap();

        let profile = user_profile(&users, &courses, &user.id).await.unwrap();
        assert_eq!(profile.user.id, user.id);
        assert_eq!(profile.created_courses.len(), 1);
        assert_eq!(profile.created_courses[0].id, created);
        assert_eq!(profile.enrolled_courses[0].id, enrolled);
    }

    #[tokio::test]
    async fn profile_of_unknown_user_is_not_found() {
        let users = InMemoryRecordStore::<User>::new();
        let courses = InMemoryRecordStore::<Course>::new();

        let result = user_profile(&users, &courses, "missing").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn update_profile_of_someone_else_is_forbidden() {
        let users = InMemoryRecordStore::<User>::new();
        let user = seeded_user(&users, "pw").await;

        let result = update_profile(&users, "intruder", &user.id, UpdateProfileRequest::default()).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn update_profile_merges_only_non_empty_fields() {
        let users = InMemoryRecordStore::<User>::new();
        let user = seeded_user(&users, "pw").await;

        let request = UpdateProfileRequest {
            username: Some(String::new()),
            email: Some("new@example.com".to_string()),
            password: None,
            profile_color: Some("#ff0000".to_string()),
            allow_access_to_age_restricted_content: Some(true),
            use_data_to_improve_ishariu: None,
        };
        update_profile(&users, &user.id, &user.id, request).await.unwrap();

        let stored = users.fetch_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(stored.username, "ana");
        assert_eq!(stored.email, "new@example.com");
        assert_eq!(stored.profile_color, "#ff0000");
        assert_eq!(stored.password, user.password);
        assert!(stored.allow_access_to_age_restricted_content);
        assert!(!stored.use_data_to_improve_ishariu);
    }

    #[tokio::test]
    async fn update_profile_rejects_a_taken_username() {
        let users = InMemoryRecordStore::<User>::new();
        let ana = seeded_user(&users, "pw").await;
        let mut bob = User {
            id: String::new(),
            username: "bob".to_string(),
            ..ana.clone()
        };
        users.insert(&mut bob).await.unwrap();

        let rename = UpdateProfileRequest {
            username: Some("ana".to_string()),
            ..UpdateProfileRequest::default()
        };
        let result = update_profile(&users, &bob.id, &bob.id, rename).await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));

        let named_ana = users.fetch_by_filter(doc! { "Username": "ana" }).await.unwrap();
        assert_eq!(named_ana.len(), 1);
        assert_eq!(named_ana[0].id, ana.id);
        assert_eq!(users.fetch_by_id(&bob.id).await.unwrap().unwrap().username, "bob");

        let keep_own = UpdateProfileRequest {
            username: Some("ana".to_string()),
            ..UpdateProfileRequest::default()
        };
        update_profile(&users, &ana.id, &ana.id, keep_own).await.unwrap();
    }

    #[tokio::test]
    async fn settings_are_owner_only() {
        let users = InMemoryRecordStore::<User>::new();
        let user = seeded_user(&users, "pw").await;

        assert_eq!(user_settings(&users, &user.id, &user.id).await.unwrap().id, user.id);
        assert!(matches!(
            user_settings(&users, "other", &user.id).await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn change_password_flows() {
        let users = InMemoryRecordStore::<User>::new();
        let user = seeded_user(&users, "old").await;

        let wrong = ChangePasswordRequest {
            current_password: "nope".to_string(),
            new_password: "new".to_string(),
        };
        assert_eq!(
            change_password(&users, &user.id, &wrong).await.unwrap(),
            ActionResult::failed("Current password is incorrect.")
        );

        let same = ChangePasswordRequest {
            current_password: "old".to_string(),
            new_password: "old".to_string(),
        };
        assert!(!change_password(&users, &user.id, &same).await.unwrap().success);

        let valid = ChangePasswordRequest {
            current_password: "old".to_string(),
            new_password: "new".to_string(),
        };
        assert!(change_password(&users, &user.id, &valid).await.unwrap().success);

        let stored = users.fetch_by_id(&user.id).await.unwrap().unwrap();
        assert!(password_matches("new", &stored.password));
    }

    #[tokio::test]
    async fn update_setting_toggles_known_flags() {
        let users = InMemoryRecordStore::<User>::new();
        let user = seeded_user(&users, "pw").await;

        let request = UpdateSettingRequest {
            setting_name: SETTING_IMPROVE_ISHARIU.to_string(),
            setting_value: true,
        };
        update_setting(&users, &user.id, &request).await.unwrap();
        let stored = users.fetch_by_id(&user.id).await.unwrap().unwrap();
        assert!(stored.use_data_to_improve_ishariu);

        let unknown = UpdateSettingRequest {
            setting_name: "DarkMode".to_string(),
            setting_value: true,
        };
        assert!(matches!(
            update_setting(&users, &user.id, &unknown).await,
            Err(AppError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn delete_account_requires_password() {
        let users = InMemoryRecordStore::<User>::new();
        let user = seeded_user(&users, "pw").await;

        let wrong = DeleteAccountRequest { password: "x".to_string() };
        assert_eq!(
            delete_account(&users, &user.id, &wrong).await.unwrap(),
            ActionResult::failed("Incorrect password.")
        );
        assert!(users.fetch_by_id(&user.id).await.unwrap().is_some());

        let right = DeleteAccountRequest { password: "pw".to_string() };
        assert!(delete_account(&users, &user.id, &right).await.unwrap().success);
        assert!(users.fetch_by_id(&user.id).await.unwrap().is_none());
    }
}
