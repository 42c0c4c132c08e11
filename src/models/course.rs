use super::{Ranking, Record, RecordKind};
use serde::{Deserialize, Serialize};

pub const BEST_SELLER_LIMIT: usize = 3;

/// Document in the courses collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct Course {
    #[serde(rename = "_id", default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub author_id: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub revenue_generated: f64,
    #[serde(default)]
    pub enrolled_students: u32,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl Record for Course {
    const KIND: RecordKind = RecordKind::Course;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn ranking() -> Option<Ranking<Self>> {
        Some(Ranking {
            field: "RevenueGenerated",
            limit: BEST_SELLER_LIMIT,
            key: |course| course.revenue_generated,
        })
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateCourseRequest {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CourseQuery {
    pub category: Option<String>,
    pub title: Option<String>,
    pub author_id: Option<String>,
}
