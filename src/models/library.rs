//! Library issue models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::common::{lenient_date, null_as_default};
use super::StudentRef;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LibraryIssue {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    /// Present on the admin listing; the student's own listing omits it.
    pub student: Option<StudentRef>,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub author: String,
    #[serde(deserialize_with = "null_as_default")]
    pub isbn: String,
    #[serde(with = "lenient_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(with = "lenient_date")]
    pub issued_at: Option<NaiveDate>,
}

impl LibraryIssue {
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.due_date.map(|due| due < today).unwrap_or(false)
    }
}

/// Desk form for issuing a book.
#[derive(Debug, Clone, Default)]
pub struct NewLibraryIssue {
    pub student_id: i64,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentIdRef {
    pub id: i64,
}

/// `POST /admin/library/issue` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRequest {
    pub student: StudentIdRef,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub due_date: NaiveDate,
}
