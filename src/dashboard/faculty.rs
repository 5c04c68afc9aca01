//! Faculty dashboard: roster, notifications, assignments and attendance.

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

use super::view::FacultyOverview;
use super::{Dashboard, DashboardSource, Notice};
use crate::api::{fetch, to_body, ApiClient, ClientError, RequiredFields, Result, Verb};
use crate::models::{
    Assignment, AttendanceMark, AttendanceStatus, BulkAttendance, BulkAttendanceEntry,
    FacultyProfile, NewAssignment, NewNotification, Notification, Role, RosterStudent,
    TimetableEntry, TimetableResponse, User,
};
use crate::session::SessionStore;

pub const STUDENTS_PATH: &str = "/faculty/students";
pub const NOTIFICATIONS_PATH: &str = "/faculty/notifications";
pub const ASSIGNMENTS_PATH: &str = "/faculty/assignments";
pub const MARK_ATTENDANCE_PATH: &str = "/faculty/attendance/mark";
pub const BULK_ATTENDANCE_PATH: &str = "/faculty/attendance/bulk";
pub const PROFILE_PATH: &str = "/faculty/profile";
pub const TIMETABLE_PATH: &str = "/faculty/timetable/today";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FacultySnapshot {
    pub students: Vec<RosterStudent>,
    pub notifications: Vec<Notification>,
    pub assignments: Vec<Assignment>,
}

pub struct FacultySource;

#[async_trait]
impl DashboardSource for FacultySource {
    type Snapshot = FacultySnapshot;

    fn name(&self) -> &'static str {
        "faculty"
    }

    async fn load(&self, api: &dyn ApiClient) -> Result<FacultySnapshot> {
        let (students, notifications, assignments) = futures::try_join!(
            fetch::<Vec<RosterStudent>>(api, STUDENTS_PATH),
            fetch::<Vec<Notification>>(api, NOTIFICATIONS_PATH),
            fetch::<Vec<Assignment>>(api, ASSIGNMENTS_PATH),
        )?;
        Ok(FacultySnapshot {
            students,
            notifications,
            assignments,
        })
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub struct FacultyDashboard {
    core: Dashboard<FacultySource>,
    user: User,
    /// Students marked on `marked_on`; kept across batches, which never read attendance.
    marked: HashSet<i64>,
    marked_on: NaiveDate,
}

impl FacultyDashboard {
    /// Build the dashboard for the logged-in faculty member and run the first batch.
    ///
    /// Fails only when the session is not a faculty session; a failed first
    /// batch is left in [`FacultyDashboard::error`].
    pub async fn mount(session: &SessionStore, api: Arc<dyn ApiClient>) -> Result<Self> {
        let user = session.require_role(&Role::Faculty)?;
        let mut dashboard = Self::new(api, user);
        if let Err(e) = dashboard.fetch_all().await {
            warn!("Initial faculty batch failed: {}", e);
        }
        Ok(dashboard)
    }

    pub fn new(api: Arc<dyn ApiClient>, user: User) -> Self {
        Self {
            core: Dashboard::new(api, FacultySource),
            user,
            marked: HashSet::new(),
            marked_on: today(),
        }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn snapshot(&self) -> &FacultySnapshot {
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

    pub fn close(&mut self) {
        self.core.close();
        self.marked.clear();
    }

    pub fn cancel_handle(&self) -> tokio_util::sync::CancellationToken {
        self.core.cancel_handle()
    }

    pub fn is_marked(&self, student_id: i64) -> bool {
        self.marked_on == today() && self.marked.contains(&student_id)
    }

    pub fn overview(&self) -> FacultyOverview {
        let marked_today = if self.marked_on == today() {
            self.marked.len()
        } else {
            0
        };
        FacultyOverview::build(self.core.snapshot(), marked_today)
    }

    pub async fn fetch_all(&mut self) -> Result<()> {
        self.core.fetch_all().await
    }

    async fn write(&mut self, verb: Verb, path: &str, body: Option<serde_json::Value>) -> Result<()> {
        self.core.write_then_resync(verb, path, body).await.map(|_| ())
    }

    /// Forget marks recorded on an earlier day.
    fn roll_over(&mut self, today: NaiveDate) {
        if self.marked_on != today {
            self.marked.clear();
            self.marked_on = today;
        }
    }

    pub async fn create_assignment(&mut self, assignment: NewAssignment) -> Result<()> {
        let result = self.try_create_assignment(assignment).await;
        self.core.report(
            result,
            "Assignment created successfully!",
            "Failed to create assignment",
        )
    }

    async fn try_create_assignment(&mut self, assignment: NewAssignment) -> Result<()> {
        RequiredFields::new()
            .text("title", &assignment.title)
            .text("description", &assignment.description)
            .text("subject", &assignment.subject)
            .positive("maxMarks", assignment.max_marks)
            .present("dueDate", &assignment.due_date)
            .finish()?;

        let body = to_body(&assignment)?;
        self.write(Verb::Post, ASSIGNMENTS_PATH, Some(body)).await?;
        info!("{} created assignment {}", self.user.username, assignment.title);
        Ok(())
    }

    pub async fn delete_assignment(&mut self, id: i64) -> Result<()> {
        let path = format!("{}/{}", ASSIGNMENTS_PATH, id);
        let result = self.write(Verb::Delete, &path, None).await;
        self.core.report(
            result,
            "Assignment deleted successfully",
            "Failed to delete assignment",
        )
    }

    pub async fn create_notification(&mut self, notification: NewNotification) -> Result<()> {
        let result = self.try_create_notification(notification).await;
        self.core.report(
            result,
            "Notification created successfully!",
            "Failed to create notification",
        )
    }

    async fn try_create_notification(&mut self, notification: NewNotification) -> Result<()> {
        RequiredFields::new()
            .text("title", &notification.title)
            .text("message", &notification.message)
            .finish()?;

        let body = to_body(&notification)?;
        self.write(Verb::Post, NOTIFICATIONS_PATH, Some(body)).await
    }

    /// Replace the title and message of a notification the caller created.
    pub async fn update_notification(&mut self, id: i64, title: &str, message: &str) -> Result<()> {
        let result = self.try_update_notification(id, title, message).await;
        self.core.report(
            result,
            "Notification updated successfully",
            "Failed to update notification",
        )
    }

    async fn try_update_notification(&mut self, id: i64, title: &str, message: &str) -> Result<()> {
        let existing = self.owned_notification(id)?;
        RequiredFields::new()
            .text("title", title)
            .text("message", message)
            .finish()?;

        let updated = Notification {
            title: title.to_string(),
            message: message.to_string(),
            ..existing
        };
        let body = to_body(&updated)?;
        self.write(Verb::Put, &format!("{}/{}", NOTIFICATIONS_PATH, id), Some(body))
            .await
    }

    pub async fn delete_notification(&mut self, id: i64) -> Result<()> {
        let result = match self.owned_notification(id) {
            Ok(_) => {
                let path = format!("{}/{}", NOTIFICATIONS_PATH, id);
                self.write(Verb::Delete, &path, None).await
            }
            Err(e) => Err(e),
        };
        self.core.report(
            result,
            "Notification deleted successfully",
            "Failed to delete notification",
        )
    }

    /// Advisory check; the backend enforces ownership on its own.
    fn owned_notification(&self, id: i64) -> Result<Notification> {
        let notification = self
            .snapshot()
            .notifications
            .iter()
            .find(|n| n.id == id)
            .ok_or(ClientError::NotFound {
                what: "Notification",
                id,
            })?;
        if !notification.is_owned_by(&self.user.username) {
            return Err(ClientError::NotOwner);
        }
        Ok(notification.clone())
    }

    /// Record today's attendance for one student.
    ///
    /// No refetch follows: the student is added to the local marked set and a
    /// second attempt the same day is refused without a request.
    pub async fn mark_attendance(&mut self, student_id: i64, status: AttendanceStatus) -> Result<()> {
        let result = self.try_mark_attendance(student_id, status).await;
        self.core.report(
            result,
            &format!("Marked {} for student {}", status, student_id),
            "Failed to mark attendance",
        )
    }

    async fn try_mark_attendance(&mut self, student_id: i64, status: AttendanceStatus) -> Result<()> {
        let date = today();
        self.roll_over(date);
        if self.marked.contains(&student_id) {
            return Err(ClientError::AlreadyMarked(student_id));
        }
        RequiredFields::new().positive("studentId", student_id).finish()?;

        let body = to_body(&AttendanceMark {
            student_id,
            date,
            status,
        })?;
        self.core
            .send(Verb::Post, MARK_ATTENDANCE_PATH, Some(body))
            .await?;
        self.marked.insert(student_id);
        info!("Marked {} for student {}", status, student_id);
        Ok(())
    }

    /// Record today's attendance for several students in one request.
    pub async fn mark_bulk_attendance(
        &mut self,
        entries: Vec<(i64, AttendanceStatus)>,
    ) -> Result<()> {
        let count = entries.len();
        let result = self.try_mark_bulk_attendance(entries).await;
        self.core.report(
            result,
            &format!("Attendance saved for {} students", count),
            "Failed to save attendance",
        )
    }

    async fn try_mark_bulk_attendance(&mut self, entries: Vec<(i64, AttendanceStatus)>) -> Result<()> {
        if entries.is_empty() {
            return Err(ClientError::Validation {
                fields: vec!["students".to_string()],
            });
        }
        let date = today();
        self.roll_over(date);
        if let Some((id, _)) = entries.iter().find(|(id, _)| self.marked.contains(id)) {
            return Err(ClientError::AlreadyMarked(*id));
        }

        let body = to_body(&BulkAttendance {
            date,
            students: entries
                .iter()
                .map(|&(student_id, status)| BulkAttendanceEntry { student_id, status })
                .collect(),
        })?;
        self.core
            .send(Verb::Post, BULK_ATTENDANCE_PATH, Some(body))
            .await?;
        self.marked.extend(entries.iter().map(|(id, _)| *id));
        Ok(())
    }

    pub async fn profile(&self) -> Result<FacultyProfile> {
        self.core.read(PROFILE_PATH).await
    }

    pub async fn timetable_today(&self) -> Result<Vec<TimetableEntry>> {
        let response: TimetableResponse = self.core.read(TIMETABLE_PATH).await?;
        Ok(response.into_entries())
    }
}
