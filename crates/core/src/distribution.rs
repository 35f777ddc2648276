//! Distribution requests from hospitals.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::blood::BloodType;
use crate::id::{DistributionId, HospitalId};

/// Lifecycle of a distribution request.
///
/// `Fulfilled` and `Cancelled` are terminal; only a `Requested` distribution
/// may transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DistributionStatus {
    Requested,
    Fulfilled,
    Cancelled,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DistributionError {
    /// Transition attempted on a distribution that already left `Requested`.
    #[error("distribution {distribution_id} is not open (found {found:?})")]
    NotOpen {
        distribution_id: DistributionId,
        found: DistributionStatus,
    },
}

/// A hospital's request for a volume of one blood type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    id: DistributionId,
    hospital_id: HospitalId,
    blood_type: BloodType,
    volume_ml: u32,
    requested_on: NaiveDate,
    status: DistributionStatus,
    reason: Option<String>,
}

impl Distribution {
    pub fn new(
        id: DistributionId,
        hospital_id: HospitalId,
        blood_type: BloodType,
        volume_ml: u32,
        requested_on: NaiveDate,
    ) -> Self {
        Self {
            id,
            hospital_id,
            blood_type,
            volume_ml,
            requested_on,
            status: DistributionStatus::Requested,
            reason: None,
        }
    }

    /// Free-text context for the request, e.g. the receiving ward.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn id(&self) -> DistributionId {
        self.id
    }

    pub fn hospital_id(&self) -> HospitalId {
        self.hospital_id
    }

    pub fn blood_type(&self) -> BloodType {
        self.blood_type
    }

    pub fn volume_ml(&self) -> u32 {
        self.volume_ml
    }

    pub fn requested_on(&self) -> NaiveDate {
        self.requested_on
    }

    pub fn status(&self) -> DistributionStatus {
        self.status
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    fn guard_open(&self) -> Result<(), DistributionError> {
        if self.status != DistributionStatus::Requested {
            return Err(DistributionError::NotOpen {
                distribution_id: self.id,
                found: self.status,
            });
        }
        Ok(())
    }

    /// Stock was committed to this request.
    pub fn mark_fulfilled(&mut self) -> Result<(), DistributionError> {
        self.guard_open()?;
        self.status = DistributionStatus::Fulfilled;
        Ok(())
    }

    /// The request was withdrawn before fulfillment.
    pub fn mark_cancelled(&mut self) -> Result<(), DistributionError> {
        self.guard_open()?;
        self.status = DistributionStatus::Cancelled;
        Ok(())
    }
}
