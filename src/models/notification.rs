//! Notice board models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::common::{lenient_datetime, null_as_default};

/// Audience of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TargetRole {
    #[default]
    Student,
    Faculty,
    Admin,
    All,
}

impl std::fmt::Display for TargetRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Student => write!(f, "STUDENT"),
            Self::Faculty => write!(f, "FACULTY"),
            Self::Admin => write!(f, "ADMIN"),
            Self::All => write!(f, "ALL"),
        }
    }
}

impl std::str::FromStr for TargetRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "STUDENT" => Ok(Self::Student),
            "FACULTY" => Ok(Self::Faculty),
            "ADMIN" => Ok(Self::Admin),
            "ALL" => Ok(Self::All),
            _ => Err(format!("Unknown target role: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Notification {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(with = "lenient_datetime")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(deserialize_with = "null_as_default")]
    pub created_by: String,
    pub target_role: Option<TargetRole>,
}

impl Notification {
    /// Advisory ownership check; the backend enforces the real rule.
    pub fn is_owned_by(&self, username: &str) -> bool {
        !username.is_empty() && self.created_by == username
    }
}

/// `POST /faculty/notifications` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    pub title: String,
    pub message: String,
    pub target_role: TargetRole,
}

/// Order newest first; undated entries sink to the end, ties keep server order.
pub fn newest_first(notifications: &[Notification]) -> Vec<&Notification> {
    let mut sorted: Vec<&Notification> = notifications.iter().collect();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted
}
