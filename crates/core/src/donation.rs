//! Donations and the donor directory record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::blood::BloodType;
use crate::id::{DonationId, DonorId};

/// Volume collected by a standard whole-blood draw.
pub const STANDARD_DONATION_ML: u32 = 450;

/// Lifecycle of a donation: collected as `Pending`, then screened exactly
/// once into `Validated` or `Rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DonationStatus {
    Pending,
    Validated,
    Rejected,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DonationError {
    /// Screening attempted on a donation that already left `Pending`.
    #[error("donation {donation_id} was already screened (found {found:?})")]
    AlreadyScreened {
        donation_id: DonationId,
        found: DonationStatus,
    },
}

/// A collected donation awaiting or past screening.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Donation {
    id: DonationId,
    donor_id: DonorId,
    volume_ml: u32,
    drawn_on: NaiveDate,
    status: DonationStatus,
    notes: Option<String>,
}

impl Donation {
    pub fn new(id: DonationId, donor_id: DonorId, volume_ml: u32, drawn_on: NaiveDate) -> Self {
        Self {
            id,
            donor_id,
            volume_ml,
            drawn_on,
            status: DonationStatus::Pending,
            notes: None,
        }
    }

    pub fn id(&self) -> DonationId {
        self.id
    }

    pub fn donor_id(&self) -> DonorId {
        self.donor_id
    }

    pub fn volume_ml(&self) -> u32 {
        self.volume_ml
    }

    pub fn drawn_on(&self) -> NaiveDate {
        self.drawn_on
    }

    pub fn status(&self) -> DonationStatus {
        self.status
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    fn guard_pending(&self) -> Result<(), DonationError> {
        if self.status != DonationStatus::Pending {
            return Err(DonationError::AlreadyScreened {
                donation_id: self.id,
                found: self.status,
            });
        }
        Ok(())
    }

    /// Screening passed. Only a `Pending` donation may transition.
    pub fn mark_validated(&mut self) -> Result<(), DonationError> {
        self.guard_pending()?;
        self.status = DonationStatus::Validated;
        Ok(())
    }

    /// Screening failed. The reason is kept on the record.
    pub fn mark_rejected(&mut self, reason: impl Into<String>) -> Result<(), DonationError> {
        self.guard_pending()?;
        self.status = DonationStatus::Rejected;
        self.notes = Some(reason.into());
        Ok(())
    }
}

/// Directory entry for a registered donor.
///
/// The blood type recorded here is authoritative for every unit produced
/// from the donor's donations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonorRecord {
    pub id: DonorId,
    pub blood_type: BloodType,
    pub eligible: bool,
}
