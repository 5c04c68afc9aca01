//! Library management: issue books to students and revoke issues.
//!
//! Unlike the dashboards, the two reads here are independent: the student
//! roster and the issue table load concurrently and each failure is kept on
//! its own, so one broken endpoint does not blank the other table.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::api::{decode, to_body, ApiClient, ClientError, RequiredFields, Result, Verb};
use crate::dashboard::Notice;
use crate::models::{IssueRequest, LibraryIssue, NewLibraryIssue, Role, StudentIdRef, StudentRef};
use crate::session::SessionStore;

pub const STUDENTS_PATH: &str = "/admin/students";
pub const ISSUES_PATH: &str = "/admin/library/issues";
pub const ISSUE_PATH: &str = "/admin/library/issue";

pub const ISSUED: &str = "Book issued successfully!";
pub const REVOKED: &str = "Issued book deleted successfully";

pub struct LibraryManager {
    api: Arc<dyn ApiClient>,
    students: Vec<StudentRef>,
    issues: Vec<LibraryIssue>,
    students_error: Option<String>,
    issues_error: Option<String>,
    notice: Option<Notice>,
    cancel: CancellationToken,
}

impl LibraryManager {
    /// Open the library view for an admin session and load both tables.
    pub async fn mount(session: &SessionStore, api: Arc<dyn ApiClient>) -> Result<Self> {
        session.require_role(&Role::Admin)?;
        let mut manager = Self::new(api);
        manager.load().await;
        Ok(manager)
    }

    pub fn new(api: Arc<dyn ApiClient>) -> Self {
        Self {
            api,
            students: Vec::new(),
            issues: Vec::new(),
            students_error: None,
            issues_error: None,
            notice: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Students eligible to borrow.
    pub fn students(&self) -> &[StudentRef] {
        &self.students
    }

    pub fn issues(&self) -> &[LibraryIssue] {
        &self.issues
    }

    pub fn students_error(&self) -> Option<&str> {
        self.students_error.as_deref()
    }

    pub fn issues_error(&self) -> Option<&str> {
        self.issues_error.as_deref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// Resolve a student id to the name shown in the issue form.
    pub fn student_name(&self, id: i64) -> Option<&str> {
        self.students
            .iter()
            .find(|s| s.id == id)
            .and_then(|s| s.name.as_deref())
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let value = self.send(Verb::Get, path, None).await?;
        decode(path, value)
    }

    async fn send(&self, verb: Verb, path: &str, body: Option<serde_json::Value>) -> Result<serde_json::Value> {
        if self.cancel.is_cancelled() {
            return Err(ClientError::Cancelled);
        }
        tokio::select! {
            _ = self.cancel.cancelled() => Err(ClientError::Cancelled),
            res = self.api.request(verb, path, body) => res,
        }
    }

    /// Load both tables concurrently.
    pub async fn load(&mut self) {
        let (students, issues) = futures::join!(
            self.get::<Vec<StudentRef>>(STUDENTS_PATH),
            self.get::<Vec<LibraryIssue>>(ISSUES_PATH),
        );

        match students {
            Ok(students) => {
                self.students = students;
                self.students_error = None;
            }
            Err(ClientError::Cancelled) => {}
            Err(e) => {
                warn!("Failed to load students: {}", e);
                self.students_error = Some(e.user_message());
            }
        }
        self.apply_issues(issues);
    }

    pub async fn refresh_issues(&mut self) {
        let issues = self.get::<Vec<LibraryIssue>>(ISSUES_PATH).await;
        self.apply_issues(issues);
    }

    fn apply_issues(&mut self, issues: Result<Vec<LibraryIssue>>) {
        match issues {
            Ok(issues) => {
                self.issues = issues;
                self.issues_error = None;
            }
            Err(ClientError::Cancelled) => {}
            Err(e) => {
                warn!("Failed to load issued books: {}", e);
                self.issues_error = Some(e.user_message());
            }
        }
    }

    /// Issue a book and refetch the issue table.
    pub async fn issue(&mut self, form: NewLibraryIssue) -> Result<()> {
        match self.try_issue(form).await {
            Ok(()) => {
                self.notice = Some(Notice::success(ISSUED));
                self.refresh_issues().await;
                Ok(())
            }
            Err(ClientError::Cancelled) => Err(ClientError::Cancelled),
            Err(e) => {
                warn!("Issue rejected: {}", e);
                let text = match &e {
                    ClientError::Rejected { message, .. } if !message.is_empty() => message.clone(),
                    ClientError::Rejected { .. } => "Error issuing book".to_string(),
                    other => other.user_message(),
                };
                self.notice = Some(Notice::failure(text));
                Err(e)
            }
        }
    }

    async fn try_issue(&self, form: NewLibraryIssue) -> Result<()> {
        RequiredFields::new()
            .positive("studentId", form.student_id)
            .text("title", &form.title)
            .text("author", &form.author)
            .text("isbn", &form.isbn)
            .present("dueDate", &form.due_date)
            .finish()?;
        let due_date = form.due_date.ok_or(ClientError::Validation {
            fields: vec!["dueDate".to_string()],
        })?;

        let body = to_body(&IssueRequest {
            student: StudentIdRef {
                id: form.student_id,
            },
            title: form.title.trim().to_string(),
            author: form.author.trim().to_string(),
            isbn: form.isbn.trim().to_string(),
            due_date,
        })?;
        self.send(Verb::Post, ISSUE_PATH, Some(body)).await?;
        info!("Issued ISBN {} to student {}", form.isbn.trim(), form.student_id);
        Ok(())
    }

    /// Delete an issue record and refetch the issue table.
    pub async fn revoke(&mut self, id: i64) -> Result<()> {
        let path = format!("/admin/library/{}", id);
        match self.send(Verb::Delete, &path, None).await {
            Ok(_) => {
                info!("Revoked library issue {}", id);
                self.notice = Some(Notice::success(REVOKED));
                self.refresh_issues().await;
                Ok(())
            }
            Err(ClientError::Cancelled) => Err(ClientError::Cancelled),
            Err(e) => {
                warn!("Failed to revoke issue {}: {}", id, e);
                self.notice = Some(Notice::failure("Error deleting issued book"));
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{rejected, MockApi};
    use chrono::NaiveDate;
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    fn scripted() -> Arc<MockApi> {
        let api = Arc::new(MockApi::new());
        api.respond(
            Verb::Get,
            STUDENTS_PATH,
            Ok(json!([{"id": 3, "name": "Ravi"}, {"id": 4, "name": null}])),
        );
        api.respond(
            Verb::Get,
            ISSUES_PATH,
            Ok(json!([
                {"id": 7, "student": {"id": 4}, "title": "SICP", "author": "Abelson",
                 "isbn": "999", "dueDate": "2025-10-30", "issuedAt": "2025-10-01"}
            ])),
        );
        api
    }

    fn form() -> NewLibraryIssue {
        NewLibraryIssue {
            student_id: 3,
            title: "Clean Code".into(),
            author: "Robert Martin".into(),
            isbn: "123".into(),
            due_date: NaiveDate::from_ymd_opt(2025, 11, 1),
        }
    }

    #[tokio::test]
    async fn test_load_both_tables() {
        let api = scripted();
        let mut manager = LibraryManager::new(api.clone());
        manager.load().await;

        assert_eq!(manager.students().len(), 2);
        assert_eq!(manager.student_name(3), Some("Ravi"));
        assert_eq!(manager.student_name(4), None);
        assert_eq!(manager.issues()[0].id, 7);
    }

    #[tokio::test]
    async fn test_load_failures_are_independent() {
        let api = scripted();
        api.respond(Verb::Get, STUDENTS_PATH, rejected(403, "Forbidden"));
        let mut manager = LibraryManager::new(api.clone());
        manager.load().await;

        assert_eq!(manager.students_error(), Some("Forbidden"));
        assert!(manager.students().is_empty());
        assert_eq!(manager.issues().len(), 1);
        assert!(manager.issues_error().is_none());
    }

    #[tokio::test]
    async fn test_issue_posts_nested_student_and_refetches() {
        let api = scripted();
        api.respond(Verb::Post, ISSUE_PATH, Ok(json!({"id": 8})));
        let mut manager = LibraryManager::new(api.clone());
        manager.load().await;

        api.respond(
            Verb::Get,
            ISSUES_PATH,
            Ok(json!([
                {"id": 7, "student": {"id": 4}, "isbn": "999"},
                {"id": 8, "student": {"id": 3, "name": "Ravi"}, "isbn": "123", "title": "Clean Code"}
            ])),
        );
        assert_ok!(manager.issue(form()).await);

        assert_eq!(
            api.last_body(Verb::Post, ISSUE_PATH).unwrap(),
            json!({
                "student": {"id": 3},
                "title": "Clean Code",
                "author": "Robert Martin",
                "isbn": "123",
                "dueDate": "2025-11-01"
            })
        );
        assert_eq!(manager.notice(), Some(&Notice::success(ISSUED)));
        assert_eq!(manager.issues().len(), 2);
        assert_eq!(api.count(Verb::Get, ISSUES_PATH), 2);
        // only the issue table is refetched
        assert_eq!(api.count(Verb::Get, STUDENTS_PATH), 1);
    }

    #[tokio::test]
    async fn test_issue_rejection_shows_backend_text() {
        let api = scripted();
        api.respond(Verb::Post, ISSUE_PATH, rejected(400, "ISBN already issued"));
        let mut manager = LibraryManager::new(api.clone());

        assert_err!(manager.issue(form()).await);
        let notice = manager.notice().unwrap();
        assert!(notice.is_failure());
        assert_eq!(notice.text, "ISBN already issued");
        assert_eq!(api.count(Verb::Get, ISSUES_PATH), 0);
    }

    #[tokio::test]
    async fn test_issue_validation_never_reaches_server() {
        let api = scripted();
        let mut manager = LibraryManager::new(api.clone());

        let err = manager
            .issue(NewLibraryIssue {
                student_id: 0,
                title: "Clean Code".into(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        match err {
            ClientError::Validation { fields } => {
                assert_eq!(fields, vec!["studentId", "author", "isbn", "dueDate"])
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
        assert_eq!(api.writes(), 0);
    }

    #[tokio::test]
    async fn test_revoke_removes_issue_from_next_table() {
        let api = scripted();
        api.respond(Verb::Delete, "/admin/library/7", Ok(json!("Deleted successfully")));
        let mut manager = LibraryManager::new(api.clone());
        manager.load().await;
        assert!(manager.issues().iter().any(|i| i.id == 7));

        api.respond(Verb::Get, ISSUES_PATH, Ok(json!([])));
        assert_ok!(manager.revoke(7).await);

        assert!(manager.issues().iter().all(|i| i.id != 7));
        assert_eq!(manager.notice(), Some(&Notice::success(REVOKED)));
    }

    #[tokio::test]
    async fn test_revoke_failure() {
        let api = scripted();
        api.respond(Verb::Delete, "/admin/library/70", rejected(400, "Issued book not found"));
        let mut manager = LibraryManager::new(api.clone());

        assert_err!(manager.revoke(70).await);
        assert_eq!(manager.notice().unwrap().text, "Error deleting issued book");
    }

    #[tokio::test]
    async fn test_mount_requires_admin() {
        let api = scripted();
        api.respond(Verb::Post, "/auth/login", Ok(json!({"token": "t", "role": "ADMIN"})));
        let tokens: Arc<dyn crate::storage::TokenStore> =
            Arc::new(crate::storage::MemoryTokenStore::new());
        let session = SessionStore::new(api.clone(), tokens);
        session.init().await;

        assert!(matches!(
            LibraryManager::mount(&session, api.clone()).await,
            Err(ClientError::Unauthenticated)
        ));

        session.login("admin", "secret").await.unwrap();
        let manager = LibraryManager::mount(&session, api.clone()).await.unwrap();
        assert_eq!(manager.issues().len(), 1);
    }

    #[tokio::test]
    async fn test_closed_manager_sends_nothing() {
        let api = scripted();
        let mut manager = LibraryManager::new(api.clone());
        manager.close();

        manager.load().await;
        assert!(api.calls().is_empty());
        assert!(manager.students_error().is_none());
        assert!(matches!(manager.revoke(7).await, Err(ClientError::Cancelled)));
    }
}
