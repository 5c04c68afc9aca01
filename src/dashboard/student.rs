//! Student dashboard: read-only views over the student's own records.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::view::StudentOverview;
use super::{Dashboard, DashboardSource, Notice};
use crate::api::{fetch, ApiClient, ClientError, Result};
use crate::models::{
    Assignment, AttendanceRecord, Fee, LibraryIssue, Mark, Notification, Role, StudentProfile,
    TimetableEntry, TimetableResponse, User,
};
use crate::session::{SessionStore, STUDENT_PROFILE_PATH};

pub const TIMETABLE_PATH: &str = "/student/timetable/today";
pub const ATTENDANCE_PATH: &str = "/student/attendance";
pub const NOTIFICATIONS_PATH: &str = "/student/notifications";
pub const ASSIGNMENTS_PATH: &str = "/student/assignments";
pub const LIBRARY_PATH: &str = "/student/library/issues";
pub const MARKS_PATH: &str = "/student/marks";
pub const FEES_PATH: &str = "/student/fees";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentSnapshot {
    pub profile: Option<StudentProfile>,
    pub timetable: Vec<TimetableEntry>,
    pub attendance: Vec<AttendanceRecord>,
    pub notifications: Vec<Notification>,
    pub assignments: Vec<Assignment>,
    pub library_issues: Vec<LibraryIssue>,
    pub marks: Vec<Mark>,
    pub fees: Vec<Fee>,
}

pub struct StudentSource;

#[async_trait]
impl DashboardSource for StudentSource {
    type Snapshot = StudentSnapshot;

    fn name(&self) -> &'static str {
        "student"
    }

    async fn load(&self, api: &dyn ApiClient) -> Result<StudentSnapshot> {
        let (batch, marks, fees) = futures::join!(
            async {
                futures::try_join!(
                    fetch::<StudentProfile>(api, STUDENT_PROFILE_PATH),
                    fetch::<TimetableResponse>(api, TIMETABLE_PATH),
                    fetch::<Vec<AttendanceRecord>>(api, ATTENDANCE_PATH),
                    fetch::<Vec<Notification>>(api, NOTIFICATIONS_PATH),
                    fetch::<Vec<Assignment>>(api, ASSIGNMENTS_PATH),
                    fetch::<Vec<LibraryIssue>>(api, LIBRARY_PATH),
                )
            },
            fetch_or_empty::<Mark>(api, MARKS_PATH),
            fetch_or_empty::<Fee>(api, FEES_PATH),
        );
        let (profile, timetable, attendance, notifications, assignments, library_issues) = batch?;

        Ok(StudentSnapshot {
            profile: Some(profile),
            timetable: timetable.into_entries(),
            attendance,
            notifications,
            assignments,
            library_issues,
            marks,
            fees,
        })
    }
}

/// Marks and fees sit outside the all-or-nothing batch: not every backend
/// serves them, so a failed read leaves the list empty.
async fn fetch_or_empty<T: DeserializeOwned>(api: &dyn ApiClient, path: &str) -> Vec<T> {
    match fetch::<Vec<T>>(api, path).await {
        Ok(items) => items,
        Err(e) => {
            debug!("Optional read {} failed: {}", path, e);
            Vec::new()
        }
    }
}

pub struct StudentDashboard {
    core: Dashboard<StudentSource>,
    user: User,
}

impl StudentDashboard {
    /// Build the dashboard for the logged-in student and run the first batch.
    pub async fn mount(session: &SessionStore, api: Arc<dyn ApiClient>) -> Result<Self> {
        let user = session.require_role(&Role::Student)?;
        let mut dashboard = Self::new(api, user);
        if let Err(e) = dashboard.fetch_all().await {
            warn!("Initial student batch failed: {}", e);
        }
        Ok(dashboard)
    }

    pub fn new(api: Arc<dyn ApiClient>, user: User) -> Self {
        Self {
            core: Dashboard::new(api, StudentSource),
            user,
        }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn snapshot(&self) -> &StudentSnapshot {
        self.core.snapshot()
    }

    pub fn is_loading(&self) -> bool {
        self.core.is_loading()
    }

    pub fn error(&self) -> Option<&str> {
        self.core.error()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.core.notice()
    }

    pub fn close(&self) {
        self.core.close();
    }

    pub fn overview(&self) -> StudentOverview {
        StudentOverview::build(self.core.snapshot())
    }

    pub async fn fetch_all(&mut self) -> Result<()> {
        self.core.fetch_all().await
    }

    /// Payment is not settled anywhere; the fee must exist in the latest
    /// snapshot, then the dashboard resyncs.
    pub async fn pay_fee(&mut self, fee_id: i64) -> Result<()> {
        let fee = self
            .snapshot()
            .fees
            .iter()
            .find(|f| f.id == fee_id)
            .cloned()
            .ok_or(ClientError::NotFound {
                what: "Fee",
                id: fee_id,
            });

        let fee = match fee {
            Ok(fee) => fee,
            Err(e) => return self.core.report(Err(e), "", "Payment failed"),
        };

        info!(
            "Mock payment of {:.2} for fee {} ({})",
            fee.balance(),
            fee.id,
            fee.fee_type
        );
        self.core
            .set_notice(Notice::success("Payment processed successfully! (Mock)"));
        if let Err(e) = self.fetch_all().await {
            warn!("Resync after payment failed: {}", e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{rejected, MockApi};
    use crate::api::Verb;
    use crate::storage::{MemoryTokenStore, TokenStore};
    use serde_json::json;
    use tokio_test::assert_ok;

    fn student() -> User {
        User {
            id: 12,
            username: "asha".into(),
            role: Role::Student,
        }
    }

    /// The six reads every student backend serves.
    fn core_routes() -> Arc<MockApi> {
        let api = Arc::new(MockApi::new());
        api.respond(
            Verb::Get,
            STUDENT_PROFILE_PATH,
            Ok(json!({"id": 12, "name": "Asha Verma", "username": "asha", "role": "STUDENT",
                      "studentId": "STU250012", "cgpa": 8.7})),
        );
        api.respond(
            Verb::Get,
            TIMETABLE_PATH,
            Ok(json!({"timetable": [
                {"id": 1, "subject": "Operating Systems", "startTime": "09:00", "endTime": "10:00"},
                {"id": 2, "subject": "Networks", "startTime": "10:00", "endTime": "11:00"}
            ]})),
        );
        api.respond(
            Verb::Get,
            ATTENDANCE_PATH,
            Ok(json!([
                {"id": 1, "subject": "Networks", "date": "2025-10-14", "status": "PRESENT"},
                {"id": 2, "subject": "Networks", "date": "2025-10-15", "status": "ABSENT"}
            ])),
        );
        api.respond(Verb::Get, NOTIFICATIONS_PATH, Ok(json!([])));
        api.respond(
            Verb::Get,
            ASSIGNMENTS_PATH,
            Ok(json!([{"id": 4, "title": "Lab 3"}, {"id": 5, "title": "Essay"}])),
        );
        api.respond(Verb::Get, LIBRARY_PATH, Ok(json!([])));
        api
    }

    fn scripted() -> Arc<MockApi> {
        let api = core_routes();
        api.respond(
            Verb::Get,
            MARKS_PATH,
            Ok(json!([{"id": 1, "subject": "Networks", "examType": "MIDTERM",
                       "marksObtained": 43, "maxMarks": 60}])),
        );
        api.respond(
            Verb::Get,
            FEES_PATH,
            Ok(json!([
                {"id": 1, "feeType": "Tuition", "amount": 45000, "paidAmount": 20000, "status": "PENDING"},
                {"id": 2, "feeType": "Hostel", "amount": 12000, "paidAmount": 12000, "status": "PAID"}
            ])),
        );
        api
    }

    #[tokio::test]
    async fn test_batch_populates_every_collection() {
        let api = scripted();
        let mut dash = StudentDashboard::new(api.clone(), student());
        dash.fetch_all().await.unwrap();

        let snapshot = dash.snapshot();
        assert_eq!(snapshot.profile.as_ref().unwrap().student_id, "STU250012");
        assert_eq!(snapshot.timetable.len(), 2);
        assert_eq!(snapshot.marks[0].percentage(), 72);

        let overview = dash.overview();
        assert_eq!(overview.pending_assignments, snapshot.assignments.len());
        assert_eq!(overview.todays_classes, 2);
        assert_eq!(overview.total_fees_due, 25000.0);
        assert_eq!(overview.attendance_percentage, 50);
        assert_eq!(overview.cgpa, 8.7);
    }

    #[tokio::test]
    async fn test_one_failed_read_fails_the_batch() {
        let api = scripted();
        let mut dash = StudentDashboard::new(api.clone(), student());
        dash.fetch_all().await.unwrap();

        api.respond(Verb::Get, ASSIGNMENTS_PATH, Ok(json!([])));
        api.respond(Verb::Get, LIBRARY_PATH, rejected(500, "Internal error"));
        assert!(dash.fetch_all().await.is_err());

        assert_eq!(dash.snapshot().assignments.len(), 2);
        assert_eq!(dash.error(), Some("Failed to fetch dashboard data"));
    }

    #[tokio::test]
    async fn test_missing_marks_and_fees_routes_do_not_fail_the_batch() {
        let api = core_routes();
        let mut dash = StudentDashboard::new(api.clone(), student());
        assert_ok!(dash.fetch_all().await);

        let snapshot = dash.snapshot();
        assert!(dash.error().is_none());
        assert_eq!(snapshot.assignments.len(), 2);
        assert!(snapshot.marks.is_empty());
        assert!(snapshot.fees.is_empty());
        assert_eq!(dash.overview().total_fees_due, 0.0);
        assert_eq!(api.count(Verb::Get, MARKS_PATH), 1);
        assert_eq!(api.count(Verb::Get, FEES_PATH), 1);
    }

    #[tokio::test]
    async fn test_issued_book_shows_on_next_fetch() {
        let api = scripted();
        let mut dash = StudentDashboard::new(api.clone(), student());
        dash.fetch_all().await.unwrap();
        assert!(dash.snapshot().library_issues.is_empty());

        api.respond(
            Verb::Get,
            LIBRARY_PATH,
            Ok(json!([{"id": 8, "student": {"id": 3}, "title": "Clean Code",
                       "isbn": "123", "dueDate": "2025-11-01"}])),
        );
        dash.fetch_all().await.unwrap();
        assert_eq!(dash.snapshot().library_issues[0].isbn, "123");
    }

    #[tokio::test]
    async fn test_pay_fee_is_a_stub_that_resyncs() {
        let api = scripted();
        let mut dash = StudentDashboard::new(api.clone(), student());
        dash.fetch_all().await.unwrap();

        assert_ok!(dash.pay_fee(1).await);
        assert_eq!(
            dash.notice(),
            Some(&Notice::success("Payment processed successfully! (Mock)"))
        );
        assert_eq!(api.writes(), 0);
        assert_eq!(api.count(Verb::Get, FEES_PATH), 2);

        assert!(matches!(
            dash.pay_fee(42).await,
            Err(ClientError::NotFound { what: "Fee", id: 42 })
        ));
        assert!(dash.notice().unwrap().is_failure());
    }

    #[tokio::test]
    async fn test_mount_rejects_faculty_session() {
        let api = scripted();
        api.respond(Verb::Post, "/auth/login", Ok(json!({"token": "t", "role": "FACULTY"})));
        let tokens: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::new());
        let session = SessionStore::new(api.clone(), tokens);
        session.init().await;
        session.login("prof.rao", "secret").await.unwrap();

        assert!(matches!(
            StudentDashboard::mount(&session, api.clone()).await,
            Err(ClientError::WrongRole { .. })
        ));
    }

    #[tokio::test]
    async fn test_student_login_then_mount() {
        let api = scripted();
        api.respond(Verb::Post, "/auth/login", Ok(json!({"token": "t-9", "role": "STUDENT"})));
        let tokens: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::new());
        let session = SessionStore::new(api.clone(), tokens.clone());
        session.init().await;

        let user = session.login("asha", "secret").await.unwrap();
        assert_eq!(user.id, 12);
        assert_eq!(tokens.token().as_deref(), Some("t-9"));

        let dash = StudentDashboard::mount(&session, api.clone()).await.unwrap();
        assert_eq!(dash.user().username, "asha");
        assert!(dash.error().is_none());
        assert_eq!(dash.overview().name, "Asha Verma");
    }
}
