//! The alert model shared by the engine and its sinks.

use chrono::NaiveDate;
use hemobank_core::BloodType;
use serde::{Deserialize, Serialize};

/// Urgency buckets. Declared most urgent first so the derived order sorts
/// a batch into dashboard order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertPriority {
    Critical,
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    Stockout,
    LowStock,
    NearExpiry,
    UrgentNeed,
}

/// One raised condition on one blood type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub priority: AlertPriority,
    pub blood_type: BloodType,
    pub message: String,
    pub raised_on: NaiveDate,
}

impl Alert {
    /// An operator-declared urgent demand for a type. Always critical;
    /// raised by the calling collaborator, never derived by evaluation.
    pub fn urgent_need(blood_type: BloodType, raised_on: NaiveDate) -> Self {
        Self {
            kind: AlertKind::UrgentNeed,
            priority: AlertPriority::Critical,
            blood_type,
            message: format!("urgent need declared for {blood_type}"),
            raised_on,
        }
    }
}
