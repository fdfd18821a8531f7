use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::deserialize_some;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A class together with how many schedules it owns.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ClassWithCount {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub class: Class,
    pub schedule_count: i64,
}

/// The slice of a class embedded in schedule responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSummary {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

impl From<&Class> for ClassSummary {
    fn from(class: &Class) -> Self {
        Self {
            id: class.id,
            name: class.name.clone(),
            description: class.description.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewClassRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Absent fields keep their stored value. `description: null` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateClassRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
}
