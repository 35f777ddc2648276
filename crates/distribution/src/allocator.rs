//! Allocation of stock to distribution requests.

use std::sync::Arc;

use chrono::NaiveDate;
use hemobank_compat::CompatibilityRules;
use hemobank_core::{
    BloodType, DistributionError, DistributionId, DistributionStatus, OperatorId, UnitError,
};
use hemobank_inventory::depletion::{self, DepletionError, InsufficientStock};
use hemobank_inventory::DepletionReceipt;
use hemobank_store::{DistributionStore, LockManager, LockScope, StoreError, UnitStore};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AllocationError {
    #[error("distribution {0} not found")]
    UnknownDistribution(DistributionId),

    /// The request already left `Requested`; the duplicate action is
    /// rejected so the caller can tell "already done" from "failed".
    #[error("distribution {distribution_id} was already processed (found {found:?})")]
    AlreadyProcessed {
        distribution_id: DistributionId,
        found: DistributionStatus,
    },

    #[error(transparent)]
    Insufficient(#[from] InsufficientStock),

    #[error(transparent)]
    Unit(#[from] UnitError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<DepletionError> for AllocationError {
    fn from(err: DepletionError) -> Self {
        match err {
            DepletionError::Insufficient(e) => AllocationError::Insufficient(e),
            DepletionError::Unit(e) => AllocationError::Unit(e),
        }
    }
}

/// Fulfills and cancels distribution requests against unit stock.
pub struct DistributionAllocator<S, U> {
    distributions: S,
    units: U,
    rules: CompatibilityRules,
    locks: Arc<LockManager>,
}

impl<S: DistributionStore, U: UnitStore> DistributionAllocator<S, U> {
    pub fn new(
        distributions: S,
        units: U,
        rules: CompatibilityRules,
        locks: Arc<LockManager>,
    ) -> Self {
        Self {
            distributions,
            units,
            rules,
            locks,
        }
    }

    /// Fulfill an open request by drawing its full volume, first-expiring
    /// units first.
    ///
    /// All-or-nothing: on a shortfall the request stays `Requested`, the
    /// error carries the missing amount, and no unit is touched. The
    /// closed request and the drawn units commit together.
    pub fn fulfill(
        &self,
        distribution_id: DistributionId,
        as_of: NaiveDate,
        operator: OperatorId,
    ) -> Result<DepletionReceipt, AllocationError> {
        // 1) Probe for the blood type, then serialize on its scope.
        let probe = self
            .distributions
            .load_distribution(distribution_id)?
            .ok_or(AllocationError::UnknownDistribution(distribution_id))?;
        let blood_type = probe.blood_type();

        self.locks.with_lock(LockScope::BloodType(blood_type), || {
            // 2) Reload under the lock; a concurrent call may have closed
            //    the request after the probe.
            let mut distribution = self
                .distributions
                .load_distribution(distribution_id)?
                .ok_or(AllocationError::UnknownDistribution(distribution_id))?;
            if let Err(DistributionError::NotOpen { found, .. }) = distribution.mark_fulfilled() {
                return Err(AllocationError::AlreadyProcessed {
                    distribution_id,
                    found,
                });
            }

            // 3) Plan the draws. A shortfall aborts here, before any
            //    write, leaving the request durably open.
            let snapshot = self.units.load_units_by_type(blood_type)?;
            let plan = depletion::plan_depletion(snapshot, distribution.volume_ml(), as_of)
                .map_err(AllocationError::from)?;

            // 4) Single commit point: request and drawn units together.
            let (draws, updated_units) = plan.into_parts();
            self.distributions
                .save_distribution_with_units(&distribution, &updated_units)?;

            info!(
                distribution_id = %distribution_id,
                operator = %operator,
                blood_type = %blood_type,
                volume_ml = distribution.volume_ml(),
                units_drawn = draws.len(),
                "distribution fulfilled"
            );
            Ok(DepletionReceipt {
                blood_type,
                requested_ml: distribution.volume_ml(),
                draws,
            })
        })
    }

    /// Withdraw an open request. No inventory effect; a fulfilled
    /// distribution cannot be cancelled through this path.
    pub fn cancel(
        &self,
        distribution_id: DistributionId,
        operator: OperatorId,
    ) -> Result<(), AllocationError> {
        let probe = self
            .distributions
            .load_distribution(distribution_id)?
            .ok_or(AllocationError::UnknownDistribution(distribution_id))?;
        let blood_type = probe.blood_type();

        self.locks.with_lock(LockScope::BloodType(blood_type), || {
            let mut distribution = self
                .distributions
                .load_distribution(distribution_id)?
                .ok_or(AllocationError::UnknownDistribution(distribution_id))?;
            if let Err(DistributionError::NotOpen { found, .. }) = distribution.mark_cancelled() {
                return Err(AllocationError::AlreadyProcessed {
                    distribution_id,
                    found,
                });
            }
            self.distributions.save_distribution(&distribution)?;

            info!(
                distribution_id = %distribution_id,
                operator = %operator,
                "distribution cancelled"
            );
            Ok(())
        })
    }

    /// Usable stock of every type a recipient may receive, in canonical
    /// donor order. For operator substitution decisions when the requested
    /// type runs short.
    pub fn compatible_availability(
        &self,
        recipient: BloodType,
        as_of: NaiveDate,
    ) -> Result<Vec<(BloodType, u32)>, AllocationError> {
        let mut availability = Vec::new();
        for &donor_type in self.rules.compatible_donors(recipient) {
            let snapshot = self.units.load_units_by_type(donor_type)?;
            availability.push((donor_type, depletion::usable_volume_ml(&snapshot, as_of)));
        }
        Ok(availability)
    }
}
