use super::{Record, RecordKind};
use serde::{Deserialize, Serialize};

pub const DEFAULT_ROLE: &str = "User";
pub const DEFAULT_PROFILE_COLOR: &str = "#6c757d";

/// Document in the users collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct User {
    #[serde(rename = "_id", default)]
    pub id: String,
    pub username: String,
    /// bcrypt hash, never the plaintext
    pub password: String,
    #[serde(default)]
    pub email: String,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default = "default_profile_color")]
    pub profile_color: String,
    #[serde(default)]
    pub allow_access_to_age_restricted_content: bool,
    #[serde(rename = "UseDataToImproveIShariu", default)]
    pub use_data_to_improve_ishariu: bool,
    #[serde(default)]
    pub created_courses: Vec<String>,
    #[serde(default)]
    pub enrolled_courses: Vec<String>,
}

fn default_role() -> String {
    DEFAULT_ROLE.to_string()
}

fn default_profile_color() -> String {
    DEFAULT_PROFILE_COLOR.to_string()
}

impl Record for User {
    const KIND: RecordKind = RecordKind::User;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// User as returned by the API (no password hash)
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct UserView {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: String,
    pub profile_color: String,
    pub allow_access_to_age_restricted_content: bool,
    pub use_data_to_improve_ishariu: bool,
    pub created_courses: Vec<String>,
    pub enrolled_courses: Vec<String>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        UserView {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            profile_color: user.profile_color,
            allow_access_to_age_restricted_content: user.allow_access_to_age_restricted_content,
            use_data_to_improve_ishariu: user.use_data_to_improve_ishariu,
            created_courses: user.created_courses,
            enrolled_courses: user.enrolled_courses,
        }
    }
}
