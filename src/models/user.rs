//! Identity, profile and roster models.

use serde::{Deserialize, Serialize};

use super::common::null_as_default;
use super::Role;

/// The identity a session resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub username: String,
    #[serde(deserialize_with = "null_as_default")]
    pub role: Role,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// `POST /auth/login` answer.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub role: &'a Role,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentProfile {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub username: String,
    #[serde(deserialize_with = "null_as_default")]
    pub role: Role,
    #[serde(deserialize_with = "null_as_default")]
    pub student_id: String,
    pub cgpa: Option<f64>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
}

impl StudentProfile {
    pub fn identity(&self) -> User {
        User {
            id: self.id,
            username: self.username.clone(),
            role: self.role.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FacultyProfile {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub employee_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub department: String,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(deserialize_with = "null_as_default")]
    pub phone: String,
    #[serde(deserialize_with = "null_as_default")]
    pub address: String,
    #[serde(deserialize_with = "null_as_default")]
    pub designation: String,
    #[serde(deserialize_with = "null_as_default")]
    pub qualification: String,
    #[serde(deserialize_with = "null_as_default")]
    pub experience: String,
    #[serde(deserialize_with = "null_as_default")]
    pub courses_taught: String,
}

/// Row of `GET /faculty/students`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RosterStudent {
    #[serde(deserialize_with = "null_as_default")]
    pub student_id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
}

/// Row of `GET /admin/students`, also embedded in library issues.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StudentRef {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    pub name: Option<String>,
}

impl StudentRef {
    pub fn display_name(&self) -> String {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => format!("ID: {}", self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_student_profile_identity() {
        let profile: StudentProfile = serde_json::from_value(json!({
            "id": 12,
            "name": "Asha Verma",
            "username": "asha",
            "role": "STUDENT",
            "studentId": "STU250012",
            "extra": "ignored"
        }))
        .unwrap();

        assert_eq!(profile.student_id, "STU250012");
        assert_eq!(profile.cgpa, None);
        assert_eq!(
            profile.identity(),
            User {
                id: 12,
                username: "asha".into(),
                role: Role::Student
            }
        );
    }

    #[test]
    fn test_student_profile_tolerates_nulls() {
        let profile: StudentProfile = serde_json::from_value(json!({
            "id": 12,
            "name": null,
            "username": "asha",
            "role": "STUDENT",
            "studentId": null,
            "cgpa": null
        }))
        .unwrap();

        assert_eq!(profile.name, "");
        assert_eq!(profile.student_id, "");
        assert_eq!(profile.identity().role, Role::Student);
    }

    #[test]
    fn test_student_ref_display_name() {
        let named = StudentRef {
            id: 3,
            name: Some("Ravi".into()),
        };
        let unnamed = StudentRef { id: 4, name: None };
        assert_eq!(named.display_name(), "Ravi");
        assert_eq!(unnamed.display_name(), "ID: 4");
    }

    #[test]
    fn test_login_response_role() {
        let resp: LoginResponse =
            serde_json::from_value(json!({"token": "t-1", "role": "FACULTY"})).unwrap();
        assert_eq!(resp.role, Role::Faculty);
    }
}
