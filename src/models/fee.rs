//! Fee ledger models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::common::{lenient_date, null_as_default};

/// Payment state as reported by the backend; unknown states are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FeeStatus {
    Paid,
    Pending,
    Overdue,
    Other(String),
}

impl std::fmt::Display for FeeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Paid => write!(f, "PAID"),
            Self::Pending => write!(f, "PENDING"),
            Self::Overdue => write!(f, "OVERDUE"),
            Self::Other(s) => write!(f, "{}", s),
        }
    }
}

impl From<String> for FeeStatus {
    fn from(s: String) -> Self {
        let upper = s.trim().to_uppercase();
        match upper.as_str() {
            "PAID" => Self::Paid,
            "PENDING" => Self::Pending,
            "OVERDUE" => Self::Overdue,
            _ => Self::Other(s),
        }
    }
}

impl From<FeeStatus> for String {
    fn from(status: FeeStatus) -> Self {
        status.to_string()
    }
}

impl Default for FeeStatus {
    fn default() -> Self {
        Self::Pending
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Fee {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub fee_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub amount: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub paid_amount: f64,
    #[serde(with = "lenient_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(deserialize_with = "null_as_default")]
    pub status: FeeStatus,
}

impl Fee {
    pub fn balance(&self) -> f64 {
        self.amount - self.paid_amount
    }
}
