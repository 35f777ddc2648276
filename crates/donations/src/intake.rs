//! Screening orchestration over the donation store and donor directory.

use std::sync::Arc;

use hemobank_core::{
    BloodUnit, DonationError, DonationId, DonationStatus, DonorId, OperatorId, UnitId,
};
use hemobank_store::{DonationStore, DonorDirectory, LockManager, LockScope, StoreError};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IntakeError {
    #[error("donation {0} not found")]
    UnknownDonation(DonationId),

    #[error("donor {0} is not registered")]
    UnknownDonor(DonorId),

    /// The registry flags this donor as ineligible to donate.
    #[error("donor {donor_id} is not eligible to donate")]
    DonorIneligible { donor_id: DonorId },

    /// The donation already left `Pending`; the duplicate action is
    /// rejected so the caller can tell "already done" from "failed".
    #[error("donation {donation_id} was already screened (found {found:?})")]
    AlreadyValidated {
        donation_id: DonationId,
        found: DonationStatus,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Screens pending donations, crediting inventory on validation.
pub struct DonationIntake<S, D> {
    donations: S,
    donors: D,
    locks: Arc<LockManager>,
}

impl<S: DonationStore, D: DonorDirectory> DonationIntake<S, D> {
    pub fn new(donations: S, donors: D, locks: Arc<LockManager>) -> Self {
        Self {
            donations,
            donors,
            locks,
        }
    }

    /// Validate a pending donation, creating the unit it stocks.
    ///
    /// Exactly-once: the unit carries the donor's registered blood type and
    /// is committed together with the validated donation, so a retried call
    /// can never credit stock twice.
    pub fn validate(
        &self,
        donation_id: DonationId,
        operator: OperatorId,
    ) -> Result<BloodUnit, IntakeError> {
        self.locks.with_lock(LockScope::Donation(donation_id), || {
            // 1) Load and guard the pending donation.
            let mut donation = self
                .donations
                .load_donation(donation_id)?
                .ok_or(IntakeError::UnknownDonation(donation_id))?;
            if let Err(DonationError::AlreadyScreened { found, .. }) = donation.mark_validated() {
                return Err(IntakeError::AlreadyValidated { donation_id, found });
            }

            // 2) The donor's registered blood type is authoritative for
            //    the unit; the donation record carries none.
            let donor_id = donation.donor_id();
            let donor = self
                .donors
                .load_donor(donor_id)?
                .ok_or(IntakeError::UnknownDonor(donor_id))?;
            if !donor.eligible {
                return Err(IntakeError::DonorIneligible { donor_id });
            }

            // 3) Single commit point: donation and unit land together.
            let unit = BloodUnit::new(
                UnitId::new(),
                donation_id,
                donor.blood_type,
                donation.volume_ml(),
                donation.drawn_on(),
            );
            self.donations.save_donation_with_unit(&donation, &unit)?;

            info!(
                donation_id = %donation_id,
                unit_id = %unit.id(),
                operator = %operator,
                blood_type = %donor.blood_type,
                volume_ml = unit.volume_ml(),
                "donation validated into inventory"
            );
            Ok(unit)
        })
    }

    /// Reject a pending donation, recording the reason. No inventory
    /// effect.
    pub fn reject(
        &self,
        donation_id: DonationId,
        reason: impl Into<String>,
        operator: OperatorId,
    ) -> Result<(), IntakeError> {
        self.locks.with_lock(LockScope::Donation(donation_id), || {
            let mut donation = self
                .donations
                .load_donation(donation_id)?
                .ok_or(IntakeError::UnknownDonation(donation_id))?;
            if let Err(DonationError::AlreadyScreened { found, .. }) =
                donation.mark_rejected(reason)
            {
                return Err(IntakeError::AlreadyValidated { donation_id, found });
            }
            self.donations.save_donation(&donation)?;

            info!(donation_id = %donation_id, operator = %operator, "donation rejected");
            Ok(())
        })
    }
}
