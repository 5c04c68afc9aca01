//! CLI module for the campus command-line interface.
//!
//! Provides subcommands for working against a campus backend:
//! - `login` / `signup` / `logout` / `whoami` - Session management
//! - `student ...` - Student dashboard views
//! - `faculty ...` - Faculty dashboard views and actions
//! - `library ...` - Library issue management
//! - `config check` - Validate configuration file

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::api::{ApiClient, ClientError, HttpApiClient};
use crate::config::Config;
use crate::dashboard::view::{attendance_percentage, RECENT_LIMIT};
use crate::dashboard::{FacultyDashboard, Notice, StudentDashboard};
use crate::library::LibraryManager;
use crate::models::common::{display_date, display_datetime, parse_datetime};
use crate::models::{
    AttendanceStatus, NewAssignment, NewLibraryIssue, NewNotification, Notification, Role,
    TargetRole, TimetableEntry,
};
use crate::session::{Readiness, SessionStore};
use crate::storage::{FileTokenStore, TokenStore};

/// CLI arguments structure
#[derive(Parser, Debug)]
#[command(name = "campus")]
#[command(author, version, about = "Command-line client for the campus management system", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "campus.toml")]
    pub config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// API base URL, including the /api prefix
    #[arg(long, env = "CAMPUS_API_URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and persist the session token
    Login {
        username: String,
        /// Password (can also be set via CAMPUS_PASSWORD env var)
        #[arg(long, env = "CAMPUS_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account (does not log in)
    Signup {
        username: String,
        #[arg(long, env = "CAMPUS_PASSWORD", hide_env_values = true)]
        password: String,
        /// STUDENT, FACULTY or ADMIN
        #[arg(long, default_value = "STUDENT")]
        role: Role,
    },

    /// Forget the persisted session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Student dashboard
    #[command(subcommand)]
    Student(StudentCommands),

    /// Faculty dashboard
    #[command(subcommand)]
    Faculty(FacultyCommands),

    /// Library management (admin)
    #[command(subcommand)]
    Library(LibraryCommands),

    /// Configuration management commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
pub enum StudentCommands {
    /// Summary cards and recent notifications
    Overview,
    /// Today's classes
    Timetable,
    /// Attendance records
    Attendance,
    /// Exam marks
    Marks,
    /// Fees and balances
    Fees,
    /// Assignments
    Assignments,
    /// Notifications, newest first
    Notifications,
    /// Issued library books
    Books,
    /// Pay a fee (mock, nothing is charged)
    PayFee { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum FacultyCommands {
    /// Summary cards and recent notifications
    Overview,
    /// Student roster
    Students,
    /// Assignments you created
    Assignments,
    /// Create an assignment
    CreateAssignment {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        max_marks: i64,
        /// Due date, e.g. 2025-10-30T23:59
        #[arg(long, value_parser = parse_due_date)]
        due: chrono::NaiveDateTime,
    },
    /// Delete an assignment
    DeleteAssignment { id: i64 },
    /// Notifications
    Notifications,
    /// Publish a notification
    Notify {
        #[arg(long)]
        title: String,
        #[arg(long)]
        message: String,
        /// STUDENT, FACULTY, ADMIN or ALL
        #[arg(long, default_value = "STUDENT")]
        target: TargetRole,
    },
    /// Edit a notification you created
    EditNotification {
        id: i64,
        #[arg(long)]
        title: String,
        #[arg(long)]
        message: String,
    },
    /// Delete a notification you created
    DeleteNotification { id: i64 },
    /// Mark today's attendance for one student
    Mark {
        student_id: i64,
        #[arg(long, default_value = "PRESENT")]
        status: AttendanceStatus,
    },
    /// Mark today's attendance for several students at once
    MarkBulk {
        #[arg(long, value_delimiter = ',')]
        present: Vec<i64>,
        #[arg(long, value_delimiter = ',')]
        absent: Vec<i64>,
    },
    /// Your faculty profile
    Profile,
    /// Today's classes
    Timetable,
}

#[derive(Subcommand, Debug)]
pub enum LibraryCommands {
    /// Issued books and eligible students
    List,
    /// Issue a book to a student
    Issue {
        #[arg(long)]
        student: i64,
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        #[arg(long)]
        isbn: String,
        /// Due date, e.g. 2025-11-01
        #[arg(long)]
        due: NaiveDate,
    },
    /// Delete an issue record
    Revoke { id: i64 },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Validate configuration file
    Check,
}

fn parse_due_date(raw: &str) -> std::result::Result<chrono::NaiveDateTime, String> {
    parse_datetime(raw).ok_or_else(|| format!("Invalid date: {} (expected YYYY-MM-DDTHH:MM)", raw))
}

// ============================================================================
// Client wiring
// ============================================================================

/// Everything a command needs, built from the configuration.
struct Client {
    api: Arc<dyn ApiClient>,
    session: SessionStore,
}

impl Client {
    fn build(config: &Config) -> Result<Self> {
        let tokens: Arc<dyn TokenStore> = Arc::new(
            FileTokenStore::open(&config.storage.data_dir)
                .map_err(explain)
                .context("Failed to open session storage")?,
        );
        let api: Arc<dyn ApiClient> = Arc::new(
            HttpApiClient::new(&config.api, tokens.clone())
                .map_err(explain)
                .context("Failed to create HTTP client")?,
        );
        let session = SessionStore::new(api.clone(), tokens);
        Ok(Self { api, session })
    }

    /// Resolve the persisted session before anything role-specific runs.
    async fn ready(&self) -> Option<crate::models::User> {
        match self.session.init().await {
            Readiness::Ready(user) => user,
            Readiness::Loading => None,
        }
    }
}

/// Turn a library error into the one line the user should see.
fn explain(err: ClientError) -> anyhow::Error {
    match err {
        ClientError::Unauthenticated => {
            anyhow::anyhow!("Not logged in. Run 'campus login <username>' first.")
        }
        other => anyhow::anyhow!(other.user_message()),
    }
}

/// Run a CLI command
pub async fn run_command(cli: &Cli, config: Config) -> Result<()> {
    if let Commands::Config(ConfigCommands::Check) = &cli.command {
        return cmd_config_check(&cli.config);
    }

    let client = Client::build(&config)?;
    match &cli.command {
        Commands::Login { username, password } => cmd_login(&client, username, password).await,
        Commands::Signup {
            username,
            password,
            role,
        } => cmd_signup(&client, username, password, role).await,
        Commands::Logout => cmd_logout(&client),
        Commands::Whoami => cmd_whoami(&client).await,
        Commands::Student(cmd) => cmd_student(&client, cmd).await,
        Commands::Faculty(cmd) => cmd_faculty(&client, cmd).await,
        Commands::Library(cmd) => cmd_library(&client, cmd).await,
        Commands::Config(ConfigCommands::Check) => Ok(()),
    }
}

// ============================================================================
// Session commands
// ============================================================================

async fn cmd_login(client: &Client, username: &str, password: &str) -> Result<()> {
    let user = client
        .session
        .login(username, password)
        .await
        .map_err(explain)
        .context("Login failed")?;

    println!("[OK] Logged in as {} ({})", user.username, user.role);
    Ok(())
}

async fn cmd_signup(client: &Client, username: &str, password: &str, role: &Role) -> Result<()> {
    client
        .session
        .signup(username, password, role)
        .await
        .map_err(explain)
        .context("Signup failed")?;

    println!("[OK] Account {} created as {}", username, role);
    println!("Use 'campus login {}' to log in.", username);
    Ok(())
}

fn cmd_logout(client: &Client) -> Result<()> {
    client.session.logout().map_err(explain)?;
    println!("[OK] Logged out");
    Ok(())
}

async fn cmd_whoami(client: &Client) -> Result<()> {
    match client.ready().await {
        Some(user) => {
            println!("Username: {}", user.username);
            println!("Role:     {}", user.role);
            if user.id > 0 {
                println!("ID:       {}", user.id);
            }
        }
        None => println!("Not logged in."),
    }
    Ok(())
}

// ============================================================================
// Student commands
// ============================================================================

async fn cmd_student(client: &Client, cmd: &StudentCommands) -> Result<()> {
    client.ready().await;
    let mut dash = StudentDashboard::mount(&client.session, client.api.clone())
        .await
        .map_err(explain)?;
    if let Some(error) = dash.error() {
        anyhow::bail!("{}", error);
    }

    match cmd {
        StudentCommands::Overview => {
            let overview = dash.overview();
            println!();
            println!("=== Student Overview: {} ===", overview.name);
            println!();
            println!("CGPA:                {:.2}", overview.cgpa);
            println!("Today's classes:     {}", overview.todays_classes);
            println!("Pending assignments: {}", overview.pending_assignments);
            println!("Fees due:            {:.2}", overview.total_fees_due);
            println!("Attendance:          {}%", overview.attendance_percentage);
            println!("Books issued:        {}", overview.books_issued);
            print_recent(&overview.recent_notifications);
        }
        StudentCommands::Timetable => print_timetable(&dash.snapshot().timetable),
        StudentCommands::Attendance => {
            let records = &dash.snapshot().attendance;
            if records.is_empty() {
                println!("No attendance records found.");
                return Ok(());
            }
            println!();
            println!(
                "{:<12}  {:<24}  {:<8}  {:<20}",
                "DATE", "SUBJECT", "STATUS", "MARKED BY"
            );
            println!("{}", "-".repeat(70));
            for record in records {
                println!(
                    "{:<12}  {:<24}  {:<8}  {:<20}",
                    display_date(record.date),
                    truncate(&record.subject, 24),
                    record.status.to_string(),
                    truncate(&record.marked_by, 20)
                );
            }
            println!();
            println!("Overall: {}%", attendance_percentage(records));
            println!();
        }
        StudentCommands::Marks => {
            let marks = &dash.snapshot().marks;
            if marks.is_empty() {
                println!("No marks published yet.");
                return Ok(());
            }
            println!();
            println!(
                "{:<24}  {:<10}  {:>8}  {:>6}  {:<10}",
                "SUBJECT", "EXAM", "MARKS", "%", "SEMESTER"
            );
            println!("{}", "-".repeat(66));
            for mark in marks {
                println!(
                    "{:<24}  {:<10}  {:>8}  {:>5}%  {:<10}",
                    truncate(&mark.subject, 24),
                    mark.exam_type.to_string(),
                    format!("{}/{}", mark.marks_obtained, mark.max_marks),
                    mark.percentage(),
                    truncate(&mark.semester, 10)
                );
            }
            println!();
        }
        StudentCommands::Fees => {
            let fees = &dash.snapshot().fees;
            if fees.is_empty() {
                println!("No fees found.");
                return Ok(());
            }
            println!();
            println!(
                "{:<6}  {:<16}  {:>10}  {:>10}  {:>10}  {:<12}  {:<8}",
                "ID", "TYPE", "AMOUNT", "PAID", "BALANCE", "DUE", "STATUS"
            );
            println!("{}", "-".repeat(84));
            for fee in fees {
                println!(
                    "{:<6}  {:<16}  {:>10.2}  {:>10.2}  {:>10.2}  {:<12}  {:<8}",
                    fee.id,
                    truncate(&fee.fee_type, 16),
                    fee.amount,
                    fee.paid_amount,
                    fee.balance(),
                    display_date(fee.due_date),
                    fee.status.to_string()
                );
            }
            println!();
        }
        StudentCommands::Assignments => {
            let assignments = &dash.snapshot().assignments;
            if assignments.is_empty() {
                println!("No assignments found.");
                return Ok(());
            }
            println!();
            println!(
                "{:<24}  {:<30}  {:>5}  {:<16}",
                "SUBJECT", "TITLE", "MAX", "DUE"
            );
            println!("{}", "-".repeat(82));
            for a in assignments {
                println!(
                    "{:<24}  {:<30}  {:>5}  {:<16}",
                    truncate(&a.subject, 24),
                    truncate(&a.title, 30),
                    a.max_marks,
                    display_datetime(a.due_date)
                );
            }
            println!();
        }
        StudentCommands::Notifications => print_notifications(&dash.snapshot().notifications),
        StudentCommands::Books => {
            let books = &dash.snapshot().library_issues;
            if books.is_empty() {
                println!("No books issued.");
                return Ok(());
            }
            let today = chrono::Local::now().date_naive();
            println!();
            println!(
                "{:<30}  {:<20}  {:<14}  {:<12}  {:<12}",
                "TITLE", "AUTHOR", "ISBN", "ISSUED", "DUE"
            );
            println!("{}", "-".repeat(96));
            for book in books {
                let overdue = if book.is_overdue(today) { " [!!]" } else { "" };
                println!(
                    "{:<30}  {:<20}  {:<14}  {:<12}  {:<12}{}",
                    truncate(&book.title, 30),
                    truncate(&book.author, 20),
                    truncate(&book.isbn, 14),
                    display_date(book.issued_at),
                    display_date(book.due_date),
                    overdue
                );
            }
            println!();
        }
        StudentCommands::PayFee { id } => {
            let result = dash.pay_fee(*id).await;
            print_notice(dash.notice());
            result.map_err(explain)?;
        }
    }

    Ok(())
}

// ============================================================================
// Faculty commands
// ============================================================================

async fn cmd_faculty(client: &Client, cmd: &FacultyCommands) -> Result<()> {
    client.ready().await;
    let mut dash = FacultyDashboard::mount(&client.session, client.api.clone())
        .await
        .map_err(explain)?;
    if let Some(error) = dash.error() {
        anyhow::bail!("{}", error);
    }

    let result = match cmd {
        FacultyCommands::Overview => {
            let overview = dash.overview();
            println!();
            println!("=== Faculty Overview: {} ===", dash.user().username);
            println!();
            println!("Students:       {}", overview.students);
            println!("Assignments:    {}", overview.assignments);
            println!("Notifications:  {}", overview.notifications);
            print_recent(&overview.recent_notifications);
            return Ok(());
        }
        FacultyCommands::Students => {
            let students = &dash.snapshot().students;
            if students.is_empty() {
                println!("No students found.");
                return Ok(());
            }
            println!();
            println!("{:<10}  {:<30}", "ID", "NAME");
            println!("{}", "-".repeat(42));
            for s in students {
                println!("{:<10}  {:<30}", s.student_id, truncate(&s.name, 30));
            }
            println!();
            return Ok(());
        }
        FacultyCommands::Assignments => {
            let assignments = &dash.snapshot().assignments;
            if assignments.is_empty() {
                println!("No assignments found.");
                return Ok(());
            }
            println!();
            println!(
                "{:<6}  {:<24}  {:<30}  {:>5}  {:<16}",
                "ID", "SUBJECT", "TITLE", "MAX", "DUE"
            );
            println!("{}", "-".repeat(90));
            for a in assignments {
                println!(
                    "{:<6}  {:<24}  {:<30}  {:>5}  {:<16}",
                    a.id,
                    truncate(&a.subject, 24),
                    truncate(&a.title, 30),
                    a.max_marks,
                    display_datetime(a.due_date)
                );
            }
            println!();
            return Ok(());
        }
        FacultyCommands::Notifications => {
            print_notifications(&dash.snapshot().notifications);
            return Ok(());
        }
        FacultyCommands::Profile => {
            let profile = dash.profile().await.map_err(explain)?;
            println!();
            println!("=== {} ===", profile.name);
            println!();
            println!("Employee ID:   {}", profile.employee_id);
            println!("Department:    {}", profile.department);
            println!("Designation:   {}", profile.designation);
            println!("Qualification: {}", profile.qualification);
            println!("Experience:    {}", profile.experience);
            println!("Courses:       {}", profile.courses_taught);
            println!("Email:         {}", profile.email);
            println!("Phone:         {}", profile.phone);
            println!();
            return Ok(());
        }
        FacultyCommands::Timetable => {
            let timetable = dash.timetable_today().await.map_err(explain)?;
            print_timetable(&timetable);
            return Ok(());
        }
        FacultyCommands::CreateAssignment {
            title,
            description,
            subject,
            max_marks,
            due,
        } => {
            dash.create_assignment(NewAssignment {
                title: title.clone(),
                description: description.clone(),
                subject: subject.clone(),
                max_marks: *max_marks,
                due_date: Some(*due),
            })
            .await
        }
        FacultyCommands::DeleteAssignment { id } => dash.delete_assignment(*id).await,
        FacultyCommands::Notify {
            title,
            message,
            target,
        } => {
            dash.create_notification(NewNotification {
                title: title.clone(),
                message: message.clone(),
                target_role: *target,
            })
            .await
        }
        FacultyCommands::EditNotification { id, title, message } => {
            dash.update_notification(*id, title, message).await
        }
        FacultyCommands::DeleteNotification { id } => dash.delete_notification(*id).await,
        FacultyCommands::Mark { student_id, status } => {
            dash.mark_attendance(*student_id, *status).await
        }
        FacultyCommands::MarkBulk { present, absent } => {
            let entries = present
                .iter()
                .map(|id| (*id, AttendanceStatus::Present))
                .chain(absent.iter().map(|id| (*id, AttendanceStatus::Absent)))
                .collect();
            dash.mark_bulk_attendance(entries).await
        }
    };

    print_notice(dash.notice());
    if let (Ok(()), Some(error)) = (&result, dash.error()) {
        println!("[!] Changes saved but the dashboard could not be refreshed: {}", error);
    }
    result.map_err(explain)
}

// ============================================================================
// Library commands
// ============================================================================

async fn cmd_library(client: &Client, cmd: &LibraryCommands) -> Result<()> {
    client.ready().await;
    let mut manager = LibraryManager::mount(&client.session, client.api.clone())
        .await
        .map_err(explain)?;

    match cmd {
        LibraryCommands::List => {
            if let Some(error) = manager.issues_error() {
                anyhow::bail!("Failed to load issued books: {}", error);
            }
            print_issues(&manager);
            if let Some(error) = manager.students_error() {
                println!("[!] Failed to load students: {}", error);
            } else {
                println!("Eligible students: {}", manager.students().len());
                println!();
            }
        }
        LibraryCommands::Issue {
            student,
            title,
            author,
            isbn,
            due,
        } => {
            let result = manager
                .issue(NewLibraryIssue {
                    student_id: *student,
                    title: title.clone(),
                    author: author.clone(),
                    isbn: isbn.clone(),
                    due_date: Some(*due),
                })
                .await;
            print_notice(manager.notice());
            result.map_err(explain)?;
        }
        LibraryCommands::Revoke { id } => {
            let result = manager.revoke(*id).await;
            print_notice(manager.notice());
            result.map_err(explain)?;
        }
    }
    Ok(())
}

fn print_issues(manager: &LibraryManager) {
    let issues = manager.issues();
    if issues.is_empty() {
        println!("No books issued.");
        return;
    }
    println!();
    println!(
        "{:<6}  {:<20}  {:<28}  {:<18}  {:<14}  {:<12}",
        "ID", "STUDENT", "TITLE", "AUTHOR", "ISBN", "DUE"
    );
    println!("{}", "-".repeat(108));
    for issue in issues {
        let student = match &issue.student {
            Some(s) => match manager.student_name(s.id) {
                Some(name) if s.name.is_none() => name.to_string(),
                _ => s.display_name(),
            },
            None => "-".to_string(),
        };
        println!(
            "{:<6}  {:<20}  {:<28}  {:<18}  {:<14}  {:<12}",
            issue.id,
            truncate(&student, 20),
            truncate(&issue.title, 28),
            truncate(&issue.author, 18),
            truncate(&issue.isbn, 14),
            display_date(issue.due_date)
        );
    }
    println!();
}

// ============================================================================
// Config commands
// ============================================================================

fn cmd_config_check(config_path: &Path) -> Result<()> {
    println!("Checking configuration file: {}", config_path.display());
    println!();

    if !config_path.exists() {
        println!(
            "[!!] Configuration file not found: {}",
            config_path.display()
        );
        println!();
        println!("Defaults will be used.");
        return Ok(());
    }

    match Config::load(config_path) {
        Ok(config) => {
            println!("[OK] Configuration file is valid!");
            println!();
            println!("=== Configuration Summary ===");
            println!();
            println!("API:");
            println!("  Base URL:     {}", config.api.base_url);
            println!("  Timeout:      {}s", config.api.timeout_secs);
            println!();
            println!("Storage:");
            println!("  Data Dir:     {}", config.storage.data_dir.display());
            println!();
            println!("Logging:");
            println!("  Level:        {}", config.logging.level);
            println!();

            if !config.api.base_url.starts_with("https://") {
                println!("Warnings:");
                println!("  [!] API base URL is not HTTPS - tokens are sent in plaintext");
                println!();
            }
            Ok(())
        }
        Err(e) => {
            println!("[!!] Configuration file is invalid!");
            println!();
            println!("Error: {:#}", e);
            println!();
            anyhow::bail!("Invalid configuration file");
        }
    }
}

// ============================================================================
// Output helpers
// ============================================================================

fn print_notice(notice: Option<&Notice>) {
    if let Some(notice) = notice {
        let icon = if notice.is_failure() { "[!!]" } else { "[OK]" };
        println!("{} {}", icon, notice.text);
    }
}

fn print_timetable(entries: &[TimetableEntry]) {
    if entries.is_empty() {
        println!("No classes today.");
        return;
    }
    println!();
    println!(
        "{:<13}  {:<28}  {:<20}  {:<10}",
        "TIME", "SUBJECT", "TEACHER", "ROOM"
    );
    println!("{}", "-".repeat(77));
    for entry in entries {
        println!(
            "{:<13}  {:<28}  {:<20}  {:<10}",
            format!("{}-{}", entry.start_time, entry.end_time),
            truncate(&entry.subject, 28),
            truncate(&entry.teacher, 20),
            truncate(&entry.classroom, 10)
        );
    }
    println!();
}

fn print_notifications(notifications: &[Notification]) {
    if notifications.is_empty() {
        println!("No notifications.");
        return;
    }
    println!();
    println!(
        "{:<6}  {:<16}  {:<8}  {:<14}  {:<40}",
        "ID", "CREATED", "FOR", "BY", "TITLE"
    );
    println!("{}", "-".repeat(92));
    for n in crate::models::newest_first(notifications) {
        let target = n
            .target_role
            .map(|t| t.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<6}  {:<16}  {:<8}  {:<14}  {:<40}",
            n.id,
            display_datetime(n.created_at),
            target,
            truncate(&n.created_by, 14),
            truncate(&n.title, 40)
        );
    }
    println!();
}

fn print_recent(notifications: &[Notification]) {
    println!();
    println!("Recent notifications (latest {}):", RECENT_LIMIT);
    if notifications.is_empty() {
        println!("  none");
    }
    for n in notifications {
        println!(
            "  [{}] {} - {}",
            display_datetime(n.created_at),
            n.title,
            truncate(&n.message, 60)
        );
    }
    println!();
}

/// Shorten `s` to at most `max_len` characters, marking the cut with `...`.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Networks", 20), "Networks");
        assert_eq!(truncate("Introduction to Algorithms", 12), "Introduct...");
        // multi-byte names are cut on character boundaries
        assert_eq!(truncate("Ánanya Ñúñez", 8), "Ánany...");
    }

    #[test]
    fn test_parse_faculty_mark() {
        let cli = Cli::try_parse_from(["campus", "faculty", "mark", "5", "--status", "absent"])
            .unwrap();
        match cli.command {
            Commands::Faculty(FacultyCommands::Mark { student_id, status }) => {
                assert_eq!(student_id, 5);
                assert_eq!(status, AttendanceStatus::Absent);
            }
            other => panic!("Unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_bulk_lists() {
        let cli = Cli::try_parse_from([
            "campus",
            "faculty",
            "mark-bulk",
            "--present",
            "5,6",
            "--absent",
            "7",
        ])
        .unwrap();
        match cli.command {
            Commands::Faculty(FacultyCommands::MarkBulk { present, absent }) => {
                assert_eq!(present, vec![5, 6]);
                assert_eq!(absent, vec![7]);
            }
            other => panic!("Unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_library_issue() {
        let cli = Cli::try_parse_from([
            "campus",
            "library",
            "issue",
            "--student",
            "3",
            "--title",
            "Clean Code",
            "--author",
            "Robert Martin",
            "--isbn",
            "123",
            "--due",
            "2025-11-01",
        ])
        .unwrap();
        match cli.command {
            Commands::Library(LibraryCommands::Issue { student, due, .. }) => {
                assert_eq!(student, 3);
                assert_eq!(due, NaiveDate::from_ymd_opt(2025, 11, 1).unwrap());
            }
            other => panic!("Unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_due_date_accepts_minutes() {
        assert!(parse_due_date("2025-10-30T23:59").is_ok());
        assert!(parse_due_date("next friday").is_err());
    }

    #[test]
    fn test_unknown_signup_role_is_kept() {
        let cli = Cli::try_parse_from([
            "campus", "signup", "lib1", "--password", "pw", "--role", "librarian",
        ])
        .unwrap();
        match cli.command {
            Commands::Signup { role, .. } => assert_eq!(role, Role::Other("librarian".into())),
            other => panic!("Unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_explain_unauthenticated() {
        let err = explain(ClientError::Unauthenticated);
        assert!(err.to_string().contains("campus login"));
    }
}
