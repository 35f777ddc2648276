//! Persistence traits the services are written against.
//!
//! All traits are object-safe and implemented for `Arc<S>` so services can
//! share one backend without caring whether they hold it directly or
//! behind a pointer. Saves are upserts keyed by id.
//!
//! The `save_*_with_*` methods are single commit points: both records
//! become visible together or not at all. Backends must make them atomic.

use std::sync::Arc;

use hemobank_core::{
    BloodType, BloodUnit, Distribution, DistributionId, Donation, DonationId, DonorId,
    DonorRecord, UnitId,
};

use crate::error::StoreResult;

/// Stored blood units.
pub trait UnitStore: Send + Sync {
    fn load_unit(&self, id: UnitId) -> StoreResult<Option<BloodUnit>>;

    /// Every unit of one blood type, regardless of status.
    fn load_units_by_type(&self, blood_type: BloodType) -> StoreResult<Vec<BloodUnit>>;

    fn save_unit(&self, unit: &BloodUnit) -> StoreResult<()>;

    /// Persist a batch of units as one atomic write.
    fn save_units_atomic(&self, units: &[BloodUnit]) -> StoreResult<()>;
}

/// Donation records.
pub trait DonationStore: Send + Sync {
    fn load_donation(&self, id: DonationId) -> StoreResult<Option<Donation>>;

    fn save_donation(&self, donation: &Donation) -> StoreResult<()>;

    /// Persist a screened donation together with the unit it produced.
    fn save_donation_with_unit(&self, donation: &Donation, unit: &BloodUnit) -> StoreResult<()>;
}

/// Distribution requests.
pub trait DistributionStore: Send + Sync {
    fn load_distribution(&self, id: DistributionId) -> StoreResult<Option<Distribution>>;

    fn save_distribution(&self, distribution: &Distribution) -> StoreResult<()>;

    /// Persist a fulfilled distribution together with the units it drew from.
    fn save_distribution_with_units(
        &self,
        distribution: &Distribution,
        units: &[BloodUnit],
    ) -> StoreResult<()>;
}

/// Registered donors.
pub trait DonorDirectory: Send + Sync {
    fn load_donor(&self, id: DonorId) -> StoreResult<Option<DonorRecord>>;

    fn save_donor(&self, donor: &DonorRecord) -> StoreResult<()>;
}

impl<S> UnitStore for Arc<S>
where
    S: UnitStore + ?Sized,
{
    fn load_unit(&self, id: UnitId) -> StoreResult<Option<BloodUnit>> {
        (**self).load_unit(id)
    }

    fn load_units_by_type(&self, blood_type: BloodType) -> StoreResult<Vec<BloodUnit>> {
        (**self).load_units_by_type(blood_type)
    }

    fn save_unit(&self, unit: &BloodUnit) -> StoreResult<()> {
        (**self).save_unit(unit)
    }

    fn save_units_atomic(&self, units: &[BloodUnit]) -> StoreResult<()> {
        (**self).save_units_atomic(units)
    }
}

impl<S> DonationStore for Arc<S>
where
    S: DonationStore + ?Sized,
{
    fn load_donation(&self, id: DonationId) -> StoreResult<Option<Donation>> {
        (**self).load_donation(id)
    }

    fn save_donation(&self, donation: &Donation) -> StoreResult<()> {
        (**self).save_donation(donation)
    }

    fn save_donation_with_unit(&self, donation: &Donation, unit: &BloodUnit) -> StoreResult<()> {
        (**self).save_donation_with_unit(donation, unit)
    }
}

impl<S> DistributionStore for Arc<S>
where
    S: DistributionStore + ?Sized,
{
    fn load_distribution(&self, id: DistributionId) -> StoreResult<Option<Distribution>> {
        (**self).load_distribution(id)
    }

    fn save_distribution(&self, distribution: &Distribution) -> StoreResult<()> {
        (**self).save_distribution(distribution)
    }

    fn save_distribution_with_units(
        &self,
        distribution: &Distribution,
        units: &[BloodUnit],
    ) -> StoreResult<()> {
        (**self).save_distribution_with_units(distribution, units)
    }
}

impl<S> DonorDirectory for Arc<S>
where
    S: DonorDirectory + ?Sized,
{
    fn load_donor(&self, id: DonorId) -> StoreResult<Option<DonorRecord>> {
        (**self).load_donor(id)
    }

    fn save_donor(&self, donor: &DonorRecord) -> StoreResult<()> {
        (**self).save_donor(donor)
    }
}
