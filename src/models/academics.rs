//! Timetable, attendance, assignment and mark records.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::common::{lenient_date, lenient_datetime, null_as_default};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimetableEntry {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub subject: String,
    #[serde(deserialize_with = "null_as_default")]
    pub teacher: String,
    #[serde(deserialize_with = "null_as_default")]
    pub classroom: String,
    #[serde(deserialize_with = "null_as_default")]
    pub start_time: String,
    #[serde(deserialize_with = "null_as_default")]
    pub end_time: String,
    #[serde(deserialize_with = "null_as_default")]
    pub day_of_week: String,
}

/// The timetable endpoints answer either `[...]` or `{"timetable": [...]}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TimetableResponse {
    Bare(Vec<TimetableEntry>),
    Wrapped {
        #[serde(default)]
        timetable: Vec<TimetableEntry>,
    },
}

impl TimetableResponse {
    pub fn into_entries(self) -> Vec<TimetableEntry> {
        match self {
            Self::Bare(entries) => entries,
            Self::Wrapped { timetable } => timetable,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AttendanceStatus {
    Present,
    #[default]
    Absent,
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Present => write!(f, "PRESENT"),
            Self::Absent => write!(f, "ABSENT"),
        }
    }
}

impl std::str::FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PRESENT" | "P" => Ok(Self::Present),
            "ABSENT" | "A" => Ok(Self::Absent),
            _ => Err(format!("Unknown attendance status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttendanceRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub student_id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub subject: String,
    #[serde(with = "lenient_date")]
    pub date: Option<NaiveDate>,
    #[serde(deserialize_with = "null_as_default")]
    pub status: AttendanceStatus,
    #[serde(deserialize_with = "null_as_default")]
    pub marked_by: String,
}

/// `POST /faculty/attendance/mark` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceMark {
    pub student_id: i64,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkAttendanceEntry {
    pub student_id: i64,
    pub status: AttendanceStatus,
}

/// `POST /faculty/attendance/bulk` body.
#[derive(Debug, Clone, Serialize)]
pub struct BulkAttendance {
    pub date: NaiveDate,
    pub students: Vec<BulkAttendanceEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Assignment {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub subject: String,
    #[serde(deserialize_with = "null_as_default")]
    pub max_marks: i64,
    #[serde(with = "lenient_datetime")]
    pub due_date: Option<NaiveDateTime>,
    #[serde(deserialize_with = "null_as_default")]
    pub created_by: String,
    #[serde(with = "lenient_datetime")]
    pub created_at: Option<NaiveDateTime>,
}

/// `POST /faculty/assignments` body.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAssignment {
    pub title: String,
    pub description: String,
    pub subject: String,
    pub max_marks: i64,
    #[serde(with = "lenient_datetime")]
    pub due_date: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExamType {
    Midterm,
    #[default]
    Final,
    Quiz,
    Assignment,
}

impl std::fmt::Display for ExamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Midterm => write!(f, "MIDTERM"),
            Self::Final => write!(f, "FINAL"),
            Self::Quiz => write!(f, "QUIZ"),
            Self::Assignment => write!(f, "ASSIGNMENT"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Mark {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub student_id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub subject: String,
    #[serde(deserialize_with = "null_as_default")]
    pub exam_type: ExamType,
    #[serde(deserialize_with = "null_as_default")]
    pub marks_obtained: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub max_marks: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub semester: String,
    #[serde(deserialize_with = "null_as_default")]
    pub academic_year: String,
}

impl Mark {
    /// Whole-number percentage; 0 when the paper has no maximum.
    pub fn percentage(&self) -> i64 {
        if self.max_marks <= 0.0 {
            return 0;
        }
        (self.marks_obtained / self.max_marks * 100.0).round() as i64
    }
}
