//! In-memory backend for tests and single-process deployments.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use hemobank_core::{
    BloodType, BloodUnit, Distribution, DistributionId, Donation, DonationId, DonorId,
    DonorRecord, UnitId,
};

use crate::error::{StoreError, StoreResult};
use crate::traits::{DistributionStore, DonationStore, DonorDirectory, UnitStore};

#[derive(Debug, Default)]
struct Collections {
    units: HashMap<UnitId, BloodUnit>,
    donations: HashMap<DonationId, Donation>,
    distributions: HashMap<DistributionId, Distribution>,
    donors: HashMap<DonorId, DonorRecord>,
}

/// All collections behind one lock, so the composite saves are atomic
/// without any transaction machinery.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Collections>> {
        self.collections.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Collections>> {
        self.collections.write().map_err(|_| StoreError::Poisoned)
    }
}

impl UnitStore for MemoryStore {
    fn load_unit(&self, id: UnitId) -> StoreResult<Option<BloodUnit>> {
        Ok(self.read()?.units.get(&id).cloned())
    }

    fn load_units_by_type(&self, blood_type: BloodType) -> StoreResult<Vec<BloodUnit>> {
        Ok(self
            .read()?
            .units
            .values()
            .filter(|unit| unit.blood_type() == blood_type)
            .cloned()
            .collect())
    }

    fn save_unit(&self, unit: &BloodUnit) -> StoreResult<()> {
        self.write()?.units.insert(unit.id(), unit.clone());
        Ok(())
    }

    fn save_units_atomic(&self, units: &[BloodUnit]) -> StoreResult<()> {
        let mut collections = self.write()?;
        for unit in units {
            collections.units.insert(unit.id(), unit.clone());
        }
        Ok(())
    }
}

impl DonationStore for MemoryStore {
    fn load_donation(&self, id: DonationId) -> StoreResult<Option<Donation>> {
        Ok(self.read()?.donations.get(&id).cloned())
    }

    fn save_donation(&self, donation: &Donation) -> StoreResult<()> {
        self.write()?.donations.insert(donation.id(), donation.clone());
        Ok(())
    }

    fn save_donation_with_unit(&self, donation: &Donation, unit: &BloodUnit) -> StoreResult<()> {
        let mut collections = self.write()?;
        collections.donations.insert(donation.id(), donation.clone());
        collections.units.insert(unit.id(), unit.clone());
        Ok(())
    }
}

impl DistributionStore for MemoryStore {
    fn load_distribution(&self, id: DistributionId) -> StoreResult<Option<Distribution>> {
        Ok(self.read()?.distributions.get(&id).cloned())
    }

    fn save_distribution(&self, distribution: &Distribution) -> StoreResult<()> {
        self.write()?
            .distributions
            .insert(distribution.id(), distribution.clone());
        Ok(())
    }

    fn save_distribution_with_units(
        &self,
        distribution: &Distribution,
        units: &[BloodUnit],
    ) -> StoreResult<()> {
        let mut collections = self.write()?;
        collections
            .distributions
            .insert(distribution.id(), distribution.clone());
        for unit in units {
            collections.units.insert(unit.id(), unit.clone());
        }
        Ok(())
    }
}

impl DonorDirectory for MemoryStore {
    fn load_donor(&self, id: DonorId) -> StoreResult<Option<DonorRecord>> {
        Ok(self.read()?.donors.get(&id).cloned())
    }

    fn save_donor(&self, donor: &DonorRecord) -> StoreResult<()> {
        self.write()?.donors.insert(donor.id, donor.clone());
        Ok(())
    }
}
