//! Aggregates computed from the latest snapshot when a view is built.
//!
//! Nothing here is cached on the controller; every call recomputes from the
//! collections as last fetched.

use crate::models::{newest_first, AttendanceRecord, AttendanceStatus, Notification};

use super::{FacultySnapshot, StudentSnapshot};

/// How many notifications the overview cards show.
pub const RECENT_LIMIT: usize = 3;

/// First `limit` notifications, newest first. Ties keep server order.
pub fn recent_notifications(notifications: &[Notification], limit: usize) -> Vec<Notification> {
    newest_first(notifications)
        .into_iter()
        .take(limit)
        .cloned()
        .collect()
}

/// Share of PRESENT records as a whole percentage; 0 with no records.
pub fn attendance_percentage(records: &[AttendanceRecord]) -> i64 {
    if records.is_empty() {
        return 0;
    }
    let present = records
        .iter()
        .filter(|r| r.status == AttendanceStatus::Present)
        .count();
    (present as f64 / records.len() as f64 * 100.0).round() as i64
}

#[derive(Debug, Clone, PartialEq)]
pub struct StudentOverview {
    pub name: String,
    pub cgpa: f64,
    pub todays_classes: usize,
    pub pending_assignments: usize,
    pub total_fees_due: f64,
    pub attendance_percentage: i64,
    pub books_issued: usize,
    pub recent_notifications: Vec<Notification>,
}

impl StudentOverview {
    pub fn build(snapshot: &StudentSnapshot) -> Self {
        let profile = snapshot.profile.as_ref();
        Self {
            name: profile.map(|p| p.name.clone()).unwrap_or_default(),
            cgpa: profile.and_then(|p| p.cgpa).unwrap_or(0.0),
            todays_classes: snapshot.timetable.len(),
            pending_assignments: snapshot.assignments.len(),
            total_fees_due: snapshot.fees.iter().map(|f| f.balance()).sum(),
            attendance_percentage: attendance_percentage(&snapshot.attendance),
            books_issued: snapshot.library_issues.len(),
            recent_notifications: recent_notifications(&snapshot.notifications, RECENT_LIMIT),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FacultyOverview {
    pub students: usize,
    pub assignments: usize,
    pub notifications: usize,
    pub marked_today: usize,
    pub recent_notifications: Vec<Notification>,
}

impl FacultyOverview {
    pub fn build(snapshot: &FacultySnapshot, marked_today: usize) -> Self {
        Self {
            students: snapshot.students.len(),
            assignments: snapshot.assignments.len(),
            notifications: snapshot.notifications.len(),
            marked_today,
            recent_notifications: recent_notifications(&snapshot.notifications, RECENT_LIMIT),
        }
    }
}
