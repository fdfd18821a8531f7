use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{ClassSummary, deserialize_some};
use crate::calendar::{Dated, DisplayLocale, TimeRange};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleType {
    Lecture,
    Quiz,
    Exam,
    Assignment,
    Practical,
}

impl ScheduleType {
    pub const ALL: [ScheduleType; 5] = [
        ScheduleType::Lecture,
        ScheduleType::Quiz,
        ScheduleType::Exam,
        ScheduleType::Assignment,
        ScheduleType::Practical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleType::Lecture => "LECTURE",
            ScheduleType::Quiz => "QUIZ",
            ScheduleType::Exam => "EXAM",
            ScheduleType::Assignment => "ASSIGNMENT",
            ScheduleType::Practical => "PRACTICAL",
        }
    }

    pub fn label(&self, locale: DisplayLocale) -> &'static str {
        match (locale, self) {
            (DisplayLocale::Indonesian, ScheduleType::Lecture) => "Kuliah",
            (DisplayLocale::Indonesian, ScheduleType::Quiz) => "Quiz",
            (DisplayLocale::Indonesian, ScheduleType::Exam) => "Ujian",
            (DisplayLocale::Indonesian, ScheduleType::Assignment) => "Tugas",
            (DisplayLocale::Indonesian, ScheduleType::Practical) => "Praktikum",
            (DisplayLocale::English, ScheduleType::Lecture) => "Lecture",
            (DisplayLocale::English, ScheduleType::Quiz) => "Quiz",
            (DisplayLocale::English, ScheduleType::Exam) => "Exam",
            (DisplayLocale::English, ScheduleType::Assignment) => "Assignment",
            (DisplayLocale::English, ScheduleType::Practical) => "Practical",
        }
    }

    /// Hex colour used to tag the type in calendar cells.
    pub fn color(&self) -> &'static str {
        match self {
            ScheduleType::Lecture => "#3B82F6",
            ScheduleType::Quiz => "#F59E0B",
            ScheduleType::Exam => "#EF4444",
            ScheduleType::Assignment => "#10B981",
            ScheduleType::Practical => "#8B5CF6",
        }
    }

    pub fn expected_values() -> String {
        Self::ALL
            .iter()
            .map(ScheduleType::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for ScheduleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "Invalid schedule type. Must be one of: {}",
                    Self::expected_values()
                )
            })
    }
}

impl fmt::Display for ScheduleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: i64,
    pub class_id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub schedule_type: ScheduleType,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub room: Option<String>,
    pub lecturer: Option<String>,
    pub description: Option<String>,
    pub material_url: Option<String>,
    pub submission_link: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Dated for Schedule {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// A schedule with its owning class, as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleDetail {
    #[serde(flatten)]
    pub schedule: Schedule,
    pub class: ClassSummary,
}

/// Class id as clients send it: a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdInput {
    Number(i64),
    Text(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewScheduleRequest {
    pub class_id: Option<IdInput>,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub schedule_type: Option<String>,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub room: Option<String>,
    pub lecturer: Option<String>,
    pub description: Option<String>,
    pub material_url: Option<String>,
    pub submission_link: Option<String>,
}

/// Absent fields keep their stored value; optional text fields sent as
/// `null` are cleared.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScheduleRequest {
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub schedule_type: Option<String>,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub room: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub lecturer: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub material_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub submission_link: Option<Option<String>>,
}

/// A validated schedule in canonical form, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleInput {
    pub class_id: i64,
    pub title: String,
    pub schedule_type: ScheduleType,
    pub date: NaiveDate,
    pub range: TimeRange,
    pub room: Option<String>,
    pub lecturer: Option<String>,
    pub description: Option<String>,
    pub material_url: Option<String>,
    pub submission_link: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_type_wire_values() {
        for kind in ScheduleType::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
            assert_eq!(kind.as_str().parse::<ScheduleType>().unwrap(), kind);
        }
        let err = "lecture".parse::<ScheduleType>().unwrap_err();
        assert_eq!(
            err,
            "Invalid schedule type. Must be one of: LECTURE, QUIZ, EXAM, ASSIGNMENT, PRACTICAL"
        );
    }

    #[test]
    fn labels_and_colors() {
        assert_eq!(ScheduleType::Assignment.label(DisplayLocale::Indonesian), "Tugas");
        assert_eq!(ScheduleType::Exam.label(DisplayLocale::English), "Exam");
        assert_eq!(ScheduleType::Lecture.color(), "#3B82F6");
    }

    #[test]
    fn update_request_distinguishes_null_from_absent() {
        let req: UpdateScheduleRequest =
            serde_json::from_str(r#"{"room": null, "lecturer": "Bu Sari"}"#).unwrap();
        assert_eq!(req.room, Some(None));
        assert_eq!(req.lecturer, Some(Some("Bu Sari".to_string())));
        assert_eq!(req.description, None);
    }

    #[test]
    fn class_id_accepts_number_or_string() {
        let req: NewScheduleRequest = serde_json::from_str(r#"{"classId": 4}"#).unwrap();
        assert_eq!(req.class_id, Some(IdInput::Number(4)));
        let req: NewScheduleRequest = serde_json::from_str(r#"{"classId": "4"}"#).unwrap();
        assert_eq!(req.class_id, Some(IdInput::Text("4".to_string())));
    }
}
