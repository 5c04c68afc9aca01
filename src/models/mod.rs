//! Records exchanged with the campus backend.
//!
//! All records use camelCase on the wire and tolerate missing fields: the
//! backend contract is "whatever JSON shape it returns".

pub mod academics;
pub mod common;
pub mod fee;
pub mod library;
pub mod notification;
pub mod user;

pub use academics::{
    Assignment, AttendanceMark, AttendanceRecord, AttendanceStatus, BulkAttendance,
    BulkAttendanceEntry, ExamType, Mark, NewAssignment, TimetableEntry, TimetableResponse,
};
pub use common::Role;
pub use fee::{Fee, FeeStatus};
pub use library::{IssueRequest, LibraryIssue, NewLibraryIssue, StudentIdRef};
pub use notification::{newest_first, NewNotification, Notification, TargetRole};
pub use user::{
    FacultyProfile, LoginRequest, LoginResponse, RosterStudent, SignupRequest, StudentProfile,
    StudentRef, User,
};
