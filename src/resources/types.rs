use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into,
)]
#[serde(transparent)]
pub struct CoursemateId(pub i64);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into,
)]
#[serde(transparent)]
pub struct ActivityId(pub i64);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into,
)]
#[serde(transparent)]
pub struct ActivityTypeId(pub i64);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into,
)]
#[serde(transparent)]
pub struct RecordId(pub i64);

/// A student tracked by the course representative.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Coursemate {
    #[serde(alias = "courseMateId")]
    pub id: CoursemateId,
    pub first_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub mat_number: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
}

impl Coursemate {
    /// "First Middle Last", skipping an empty middle name.
    #[must_use]
    pub fn full_name(&self) -> String {
        match self.middle_name.as_deref().map(str::trim) {
            Some(middle) if !middle.is_empty() => {
                format!("{} {middle} {}", self.first_name, self.last_name)
            }
            _ => format!("{} {}", self.first_name, self.last_name),
        }
    }
}

/// Body of `POST coursemates/`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct NewCoursemate {
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub email: String,
    pub mat_number: String,
}

impl NewCoursemate {
    #[must_use]
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        mat_number: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            middle_name: None,
            last_name: last_name.into(),
            email: email.into(),
            mat_number: mat_number.into(),
        }
    }

    /// Blank names are sent as `null`.
    #[must_use]
    pub fn with_middle_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.middle_name = if name.trim().is_empty() { None } else { Some(name) };
        self
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Activity {
    #[serde(alias = "activityId")]
    pub id: ActivityId,
    pub activity_name: String,
    #[serde(default)]
    pub activity_type_id: Option<ActivityTypeId>,
    #[serde(default)]
    pub activity_type_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Body of `POST activities/`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct NewActivity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_rep_id: Option<i64>,
    pub activity_name: String,
    pub activity_type_id: ActivityTypeId,
    pub description: String,
}

impl NewActivity {
    #[must_use]
    pub fn new(activity_name: impl Into<String>, activity_type_id: ActivityTypeId) -> Self {
        Self {
            course_rep_id: None,
            activity_name: activity_name.into(),
            activity_type_id,
            description: String::new(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_course_rep_id(mut self, id: i64) -> Self {
        self.course_rep_id = Some(id);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct ActivityType {
    #[serde(rename = "activityTypeId")]
    pub id: ActivityTypeId,
    #[serde(rename = "activityTypeName")]
    pub name: String,
}

/// Something that happened during an activity (attendance taken, submissions collected).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct ActivityRecord {
    pub id: RecordId,
    pub activity_id: ActivityId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

impl ActivityRecord {
    /// Case-insensitive match on title or description.
    #[must_use]
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.title.to_lowercase().contains(&query)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&query))
    }
}

/// Body of `POST activity-records/`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct NewActivityRecord {
    pub activity_id: ActivityId,
    pub title: String,
    pub description: String,
}

impl NewActivityRecord {
    #[must_use]
    pub fn new(activity_id: ActivityId, title: impl Into<String>) -> Self {
        Self {
            activity_id,
            title: title.into(),
            description: String::new(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Aggregate counts shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub coursemates: usize,
    pub activities: usize,
    pub activity_records: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coursemate_parses_and_formats_name() {
        let mate: Coursemate = serde_json::from_value(json!({
            "id": 4,
            "firstName": "Chukwudi",
            "middleName": "",
            "lastName": "Okafor",
            "email": "c@uni.edu",
            "matNumber": "MAT/21/004",
            "createdAt": "2026-01-17T09:30:00Z"
        }))
        .unwrap();

        assert_eq!(mate.id, CoursemateId(4));
        assert_eq!(mate.full_name(), "Chukwudi Okafor");
        assert_eq!(mate.created_at.unwrap().year(), 2026);
    }

    #[test]
    fn new_coursemate_sends_null_middle_name() {
        let body = serde_json::to_value(
            NewCoursemate::new("Ada", "Obi", "ada@uni.edu", "MAT/1").with_middle_name("  "),
        )
        .unwrap();

        assert_eq!(
            body,
            json!({
                "firstName": "Ada",
                "middleName": null,
                "lastName": "Obi",
                "email": "ada@uni.edu",
                "matNumber": "MAT/1"
            })
        );
    }

    #[test]
    fn activity_accepts_either_id_key() {
        let a: Activity =
            serde_json::from_value(json!({"activityId": 3, "activityName": "Lab"})).unwrap();
        let b: Activity = serde_json::from_value(json!({"id": 3, "activityName": "Lab"})).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn new_activity_omits_missing_course_rep() {
        let body = serde_json::to_value(NewActivity::new("Lab", ActivityTypeId(2))).unwrap();
        assert_eq!(
            body,
            json!({"activityName": "Lab", "activityTypeId": 2, "description": ""})
        );
    }

    #[test]
    fn record_search_checks_title_and_description() {
        let record: ActivityRecord = serde_json::from_value(json!({
            "id": 1,
            "activityId": 2,
            "title": "Morning Attendance",
            "description": "42 present"
        }))
        .unwrap();

        assert!(record.matches("morning"));
        assert!(record.matches("PRESENT"));
        assert!(!record.matches("assignment"));
    }
}
