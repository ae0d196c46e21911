//! Typed access to the course-rep resources.
//!
//! Every call goes through the session [`Dispatcher`], so an expired credential
//! is refreshed transparently. [`Error::SessionExpired`] means the refresh
//! failed and the session is gone; anything already fetched should be dropped.

mod types;

pub use types::{
    Activity, ActivityId, ActivityRecord, ActivityType, ActivityTypeId, Coursemate, CoursemateId,
    DashboardSummary, NewActivity, NewActivityRecord, NewCoursemate, RecordId,
};

use reqwest::{Method, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::auth::AuthClient;
use crate::error::{Error, server_message};
use crate::session::Dispatcher;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CoursemateList {
    course_mates: Vec<Coursemate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CoursemateEnvelope {
    course_mate: Coursemate,
}

#[derive(Deserialize)]
struct ActivityList {
    #[serde(default)]
    activities: Vec<Activity>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActivityTypeList {
    #[serde(default)]
    activity_types: Vec<ActivityType>,
}

#[derive(Deserialize)]
struct RecordList {
    records: Vec<ActivityRecord>,
}

#[derive(Deserialize)]
struct RecordEnvelope {
    record: ActivityRecord,
}

/// Client for coursemates, activities, activity records and dashboard counts.
#[derive(Clone)]
pub struct ResourceClient {
    api: Dispatcher,
}

impl ResourceClient {
    #[must_use]
    pub fn new(api: Dispatcher) -> Self {
        Self { api }
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.api
    }

    // ── Coursemates ────────────────────────────────────────────────────

    /// # Errors
    ///
    /// [`Error::SessionExpired`], [`Error::Api`] on a non-success status,
    /// [`Error::Network`] or [`Error::InvalidResponse`].
    pub async fn list_coursemates(&self) -> Result<Vec<Coursemate>, Error> {
        let list: CoursemateList = self
            .fetch(self.api.request(Method::GET, "coursemates/")?, "list coursemates")
            .await?;
        Ok(list.course_mates)
    }

    /// Server-side search by name, email or matriculation number.
    ///
    /// A blank query lists every coursemate.
    ///
    /// # Errors
    ///
    /// Same as [`list_coursemates`](Self::list_coursemates).
    pub async fn search_coursemates(&self, query: &str) -> Result<Vec<Coursemate>, Error> {
        let query = query.trim();
        if query.is_empty() {
            return self.list_coursemates().await;
        }
        let builder = self
            .api
            .request(Method::GET, "coursemates/search")?
            .query(&[("q", query)]);
        let list: CoursemateList = self.fetch(builder, "search coursemates").await?;
        Ok(list.course_mates)
    }

    /// # Errors
    ///
    /// Same as [`list_coursemates`](Self::list_coursemates).
    pub async fn get_coursemate(&self, id: CoursemateId) -> Result<Coursemate, Error> {
        let envelope: CoursemateEnvelope = self
            .fetch(
                self.api.request(Method::GET, &format!("coursemates/{id}"))?,
                "get coursemate",
            )
            .await?;
        Ok(envelope.course_mate)
    }

    /// # Errors
    ///
    /// Same as [`list_coursemates`](Self::list_coursemates).
    pub async fn create_coursemate(&self, coursemate: &NewCoursemate) -> Result<(), Error> {
        let builder = self.api.request(Method::POST, "coursemates/")?.json(coursemate);
        self.execute(builder, "create coursemate").await
    }

    /// # Errors
    ///
    /// Same as [`list_coursemates`](Self::list_coursemates).
    pub async fn delete_coursemate(&self, id: CoursemateId) -> Result<(), Error> {
        let builder = self.api.request(Method::DELETE, &format!("coursemates/{id}"))?;
        self.execute(builder, "delete coursemate").await
    }

    // ── Activities ─────────────────────────────────────────────────────

    /// # Errors
    ///
    /// Same as [`list_coursemates`](Self::list_coursemates).
    pub async fn list_activities(&self) -> Result<Vec<Activity>, Error> {
        let list: ActivityList = self
            .fetch(self.api.request(Method::GET, "activities/")?, "list activities")
            .await?;
        Ok(list.activities)
    }

    /// # Errors
    ///
    /// Same as [`list_coursemates`](Self::list_coursemates).
    pub async fn list_activity_types(&self) -> Result<Vec<ActivityType>, Error> {
        let list: ActivityTypeList = self
            .fetch(
                self.api.request(Method::GET, "activity_types")?,
                "list activity types",
            )
            .await?;
        Ok(list.activity_types)
    }

    /// # Errors
    ///
    /// Same as [`list_coursemates`](Self::list_coursemates).
    pub async fn create_activity(&self, activity: &NewActivity) -> Result<(), Error> {
        let builder = self.api.request(Method::POST, "activities/")?.json(activity);
        self.execute(builder, "create activity").await
    }

    /// # Errors
    ///
    /// Same as [`list_coursemates`](Self::list_coursemates).
    pub async fn delete_activity(&self, id: ActivityId) -> Result<(), Error> {
        let builder = self.api.request(Method::DELETE, &format!("activities/{id}"))?;
        self.execute(builder, "delete activity").await
    }

    // ── Activity records ───────────────────────────────────────────────

    /// # Errors
    ///
    /// Same as [`list_coursemates`](Self::list_coursemates).
    pub async fn list_records(&self) -> Result<Vec<ActivityRecord>, Error> {
        let list: RecordList = self
            .fetch(
                self.api.request(Method::GET, "activity-records/")?,
                "list activity records",
            )
            .await?;
        Ok(list.records)
    }

    /// # Errors
    ///
    /// Same as [`list_coursemates`](Self::list_coursemates).
    pub async fn get_record(&self, id: RecordId) -> Result<ActivityRecord, Error> {
        let envelope: RecordEnvelope = self
            .fetch(
                self.api.request(Method::GET, &format!("activity-records/{id}"))?,
                "get activity record",
            )
            .await?;
        Ok(envelope.record)
    }

    /// # Errors
    ///
    /// Same as [`list_coursemates`](Self::list_coursemates).
    pub async fn create_record(&self, record: &NewActivityRecord) -> Result<(), Error> {
        let builder = self.api.request(Method::POST, "activity-records/")?.json(record);
        self.execute(builder, "create activity record").await
    }

    /// # Errors
    ///
    /// Same as [`list_coursemates`](Self::list_coursemates).
    pub async fn delete_record(&self, id: RecordId) -> Result<(), Error> {
        let builder = self
            .api
            .request(Method::DELETE, &format!("activity-records/{id}"))?;
        self.execute(builder, "delete activity record").await
    }

    // ── Dashboard ──────────────────────────────────────────────────────

    /// Counts for the dashboard cards, fetched concurrently.
    ///
    /// # Errors
    ///
    /// The first error from any of the three listings.
    pub async fn summary(&self) -> Result<DashboardSummary, Error> {
        let (coursemates, activities, records) = tokio::try_join!(
            self.list_coursemates(),
            self.list_activities(),
            self.list_records(),
        )?;

        Ok(DashboardSummary {
            coursemates: coursemates.len(),
            activities: activities.len(),
            activity_records: records.len(),
        })
    }

    // ── Helpers ────────────────────────────────────────────────────────

    async fn fetch<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        operation: &'static str,
    ) -> Result<T, Error> {
        let response = self.send_checked(builder, operation).await?;
        AuthClient::decode(response, operation).await
    }

    async fn execute(&self, builder: RequestBuilder, operation: &'static str) -> Result<(), Error> {
        self.send_checked(builder, operation).await?;
        tracing::debug!(operation, "Resource updated");
        Ok(())
    }

    async fn send_checked(
        &self,
        builder: RequestBuilder,
        operation: &'static str,
    ) -> Result<Response, Error> {
        let response = self.api.send(builder).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = server_message(&text, "Request failed");
        tracing::warn!(operation, status = status.as_u16(), "Resource request failed");
        Err(Error::Api {
            operation,
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::session::SessionController;
    use crate::types::{AccessToken, Identity};
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> (SessionController, ResourceClient) {
        let config = ClientConfig::new(server.uri().parse().unwrap()).unwrap();
        let controller = SessionController::from_config(config).unwrap();
        controller
            .store()
            .set_session(AccessToken::new("t1"), Identity::new());
        controller.store().finish_bootstrap();
        let resources = ResourceClient::new(controller.dispatcher());
        (controller, resources)
    }

    async fn mount_get(server: &MockServer, route: &str, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(route))
            .and(header("authorization", "Bearer t1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn lists_coursemates() {
        let server = MockServer::start().await;
        mount_get(
            &server,
            "/coursemates/",
            json!({"courseMates": [
                {"id": 1, "firstName": "Ada", "lastName": "Obi", "matNumber": "MAT/1"},
                {"id": 2, "firstName": "Tunde", "middleName": "K", "lastName": "Bello"}
            ]}),
        )
        .await;

        let (_controller, resources) = client_for(&server);
        let mates = resources.list_coursemates().await.unwrap();

        assert_eq!(mates.len(), 2);
        assert_eq!(mates[1].full_name(), "Tunde K Bello");
    }

    #[tokio::test]
    async fn search_encodes_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/coursemates/search"))
            .and(query_param("q", "ada obi"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"courseMates": []})))
            .expect(1)
            .mount(&server)
            .await;

        let (_controller, resources) = client_for(&server);
        let found = resources.search_coursemates("  ada obi ").await.unwrap();

        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn gets_single_records() {
        let server = MockServer::start().await;
        mount_get(
            &server,
            "/coursemates/7",
            json!({"courseMate": {"id": 7, "firstName": "Ada", "lastName": "Obi"}}),
        )
        .await;
        mount_get(
            &server,
            "/activity-records/3",
            json!({"record": {"id": 3, "activityId": 1, "title": "Lab attendance"}}),
        )
        .await;

        let (_controller, resources) = client_for(&server);

        let mate = resources.get_coursemate(CoursemateId(7)).await.unwrap();
        assert_eq!(mate.first_name, "Ada");
        let record = resources.get_record(RecordId(3)).await.unwrap();
        assert_eq!(record.activity_id, ActivityId(1));
    }

    #[tokio::test]
    async fn creates_and_deletes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/activity-records/"))
            .and(body_json(json!({"activityId": 2, "title": "Quiz", "description": "week 3"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"message": "created"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/coursemates/5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "deleted"})))
            .expect(1)
            .mount(&server)
            .await;

        let (_controller, resources) = client_for(&server);

        let record = NewActivityRecord::new(ActivityId(2), "Quiz").with_description("week 3");
        resources.create_record(&record).await.unwrap();
        resources.delete_coursemate(CoursemateId(5)).await.unwrap();
    }

    #[tokio::test]
    async fn missing_activity_lists_are_empty() {
        let server = MockServer::start().await;
        mount_get(&server, "/activities/", json!({})).await;
        mount_get(&server, "/activity_types", json!({"activityTypes": [
            {"activityTypeId": 1, "activityTypeName": "attendance"}
        ]}))
        .await;

        let (_controller, resources) = client_for(&server);

        assert!(resources.list_activities().await.unwrap().is_empty());
        let types = resources.list_activity_types().await.unwrap();
        assert_eq!(types[0].name, "attendance");
    }

    #[tokio::test]
    async fn failure_status_maps_to_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/activities/"))
            .respond_with(
                ResponseTemplate::new(422)
                    .set_body_json(json!({"message": "activityName is required"})),
            )
            .mount(&server)
            .await;

        let (_controller, resources) = client_for(&server);
        let err = resources
            .create_activity(&NewActivity::new("", ActivityTypeId(1)))
            .await
            .unwrap_err();

        match err {
            Error::Api {
                operation,
                status,
                message,
            } => {
                assert_eq!(operation, "create activity");
                assert_eq!(status, 422);
                assert_eq!(message, "activityName is required");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn expired_session_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/coursemates/"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let (controller, resources) = client_for(&server);
        let err = resources.list_coursemates().await.unwrap_err();

        assert!(err.is_session_expired());
        assert!(controller.identity().is_none());
    }

    #[tokio::test]
    async fn summary_counts_each_resource() {
        let server = MockServer::start().await;
        mount_get(
            &server,
            "/coursemates/",
            json!({"courseMates": [
                {"id": 1, "firstName": "Ada", "lastName": "Obi"},
                {"id": 2, "firstName": "Tunde", "lastName": "Bello"},
                {"id": 3, "firstName": "Ngozi", "lastName": "Eze"}
            ]}),
        )
        .await;
        mount_get(
            &server,
            "/activities/",
            json!({"activities": [{"activityId": 1, "activityName": "Lab"}]}),
        )
        .await;
        mount_get(&server, "/activity-records/", json!({"records": []})).await;

        let (_controller, resources) = client_for(&server);
        let summary = resources.summary().await.unwrap();

        assert_eq!(
            summary,
            DashboardSummary {
                coursemates: 3,
                activities: 1,
                activity_records: 0,
            }
        );
    }
}
