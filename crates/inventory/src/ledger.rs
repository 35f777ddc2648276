//! The inventory ledger service: totals, depletion, expiry sweep.

use std::sync::Arc;

use chrono::NaiveDate;
use hemobank_core::{BloodType, BloodUnit, UnitError};
use hemobank_store::{LockManager, LockScope, StoreError, UnitStore};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::depletion::{self, DepletionError, InsufficientStock, PlannedDraw};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A depletion of zero milliliters.
    #[error("requested volume must be positive")]
    ZeroRequest,

    #[error(transparent)]
    Insufficient(#[from] InsufficientStock),

    #[error(transparent)]
    Unit(#[from] UnitError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<DepletionError> for LedgerError {
    fn from(err: DepletionError) -> Self {
        match err {
            DepletionError::Insufficient(e) => LedgerError::Insufficient(e),
            DepletionError::Unit(e) => LedgerError::Unit(e),
        }
    }
}

/// Stock position of one blood type at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSummary {
    pub blood_type: BloodType,
    pub available_ml: u32,
    pub usable_units: u32,
}

/// Proof of a committed depletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepletionReceipt {
    pub blood_type: BloodType,
    pub requested_ml: u32,
    pub draws: Vec<PlannedDraw>,
}

/// Tally of one expiry sweep across all types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepOutcome {
    pub units_expired: u32,
    pub volume_ml: u32,
}

/// Usable stock at a point in time. The alert engine's input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockSnapshot {
    as_of: NaiveDate,
    units: Vec<BloodUnit>,
}

impl StockSnapshot {
    /// Snapshot a set of units, keeping only those usable at `as_of`.
    pub fn new(as_of: NaiveDate, units: Vec<BloodUnit>) -> Self {
        let mut units = units;
        units.retain(|unit| unit.is_usable(as_of));
        Self { as_of, units }
    }

    pub fn as_of(&self) -> NaiveDate {
        self.as_of
    }

    pub fn units(&self) -> &[BloodUnit] {
        &self.units
    }

    pub fn units_of(&self, blood_type: BloodType) -> impl Iterator<Item = &BloodUnit> {
        self.units
            .iter()
            .filter(move |unit| unit.blood_type() == blood_type)
    }

    pub fn total_for(&self, blood_type: BloodType) -> u32 {
        self.units_of(blood_type).map(BloodUnit::volume_ml).sum()
    }
}

/// Tracks per-type stock over a [`UnitStore`].
///
/// Reads are lock-free snapshots; every write runs under the blood type's
/// scope lock so two depletions of the same type cannot interleave.
pub struct InventoryLedger<S> {
    units: S,
    locks: Arc<LockManager>,
}

impl<S: UnitStore> InventoryLedger<S> {
    pub fn new(units: S, locks: Arc<LockManager>) -> Self {
        Self { units, locks }
    }

    /// Usable milliliters of one type, with the expiry cutoff applied at
    /// query time. A unit past its date stops counting even before a sweep
    /// reclassifies it.
    pub fn total_available(
        &self,
        blood_type: BloodType,
        as_of: NaiveDate,
    ) -> Result<u32, LedgerError> {
        let snapshot = self.units.load_units_by_type(blood_type)?;
        Ok(depletion::usable_volume_ml(&snapshot, as_of))
    }

    /// Stock positions for all eight types, in canonical order. Types with
    /// nothing usable report zero rather than being omitted.
    pub fn summary_by_type(&self, as_of: NaiveDate) -> Result<Vec<TypeSummary>, LedgerError> {
        let mut summaries = Vec::with_capacity(BloodType::ALL.len());
        for blood_type in BloodType::ALL {
            let snapshot = self.units.load_units_by_type(blood_type)?;
            let mut available_ml = 0u32;
            let mut usable_units = 0u32;
            for unit in snapshot.iter().filter(|unit| unit.is_usable(as_of)) {
                available_ml += unit.volume_ml();
                usable_units += 1;
            }
            summaries.push(TypeSummary {
                blood_type,
                available_ml,
                usable_units,
            });
        }
        Ok(summaries)
    }

    /// Draw `requested_ml` from one type's stock, first-expiring units
    /// first. All-or-nothing: a shortfall fails the whole request and
    /// leaves every unit untouched.
    pub fn deplete(
        &self,
        blood_type: BloodType,
        requested_ml: u32,
        as_of: NaiveDate,
    ) -> Result<DepletionReceipt, LedgerError> {
        if requested_ml == 0 {
            return Err(LedgerError::ZeroRequest);
        }

        self.locks.with_lock(LockScope::BloodType(blood_type), || {
            // 1) Snapshot this type's stock under its scope lock.
            let snapshot = self.units.load_units_by_type(blood_type)?;

            // 2) Plan the draws. A shortfall aborts before any write.
            let plan = depletion::plan_depletion(snapshot, requested_ml, as_of)
                .map_err(LedgerError::from)?;

            // 3) Commit every touched unit in one write.
            let (draws, updated_units) = plan.into_parts();
            self.units.save_units_atomic(&updated_units)?;

            info!(
                blood_type = %blood_type,
                requested_ml,
                units_touched = draws.len(),
                "stock depleted"
            );
            Ok(DepletionReceipt {
                blood_type,
                requested_ml,
                draws,
            })
        })
    }

    /// Reclassify every available unit past its expiry date.
    ///
    /// Idempotent: a second sweep on the same day finds nothing. Totals do
    /// not change, since expired units were already excluded at query time.
    pub fn sweep_expired(&self, as_of: NaiveDate) -> Result<SweepOutcome, LedgerError> {
        let mut outcome = SweepOutcome::default();
        for blood_type in BloodType::ALL {
            let swept = self.locks.with_lock(LockScope::BloodType(blood_type), || {
                let snapshot = self.units.load_units_by_type(blood_type)?;
                let mut expired = Vec::new();
                for mut unit in snapshot {
                    if unit.expire(as_of) {
                        expired.push(unit);
                    }
                }
                if !expired.is_empty() {
                    self.units.save_units_atomic(&expired)?;
                }
                Ok::<_, LedgerError>(expired)
            })?;

            if !swept.is_empty() {
                debug!(
                    blood_type = %blood_type,
                    units = swept.len(),
                    "expired units reclassified"
                );
            }
            for unit in &swept {
                outcome.units_expired += 1;
                outcome.volume_ml += unit.volume_ml();
            }
        }

        if outcome.units_expired > 0 {
            info!(
                units = outcome.units_expired,
                volume_ml = outcome.volume_ml,
                "expiry sweep complete"
            );
        }
        Ok(outcome)
    }

    /// Snapshot every type's usable units for downstream evaluation.
    pub fn snapshot(&self, as_of: NaiveDate) -> Result<StockSnapshot, LedgerError> {
        let mut units = Vec::new();
        for blood_type in BloodType::ALL {
            units.extend(self.units.load_units_by_type(blood_type)?);
        }
        Ok(StockSnapshot::new(as_of, units))
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use hemobank_core::{BloodUnit, DonationId, UnitId, UnitStatus};
    use hemobank_store::MemoryStore;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ledger_with_store() -> (InventoryLedger<Arc<MemoryStore>>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let ledger = InventoryLedger::new(Arc::clone(&store), Arc::new(LockManager::new()));
        (ledger, store)
    }

    fn seed_unit(
        store: &MemoryStore,
        blood_type: BloodType,
        volume_ml: u32,
        collected_on: NaiveDate,
    ) -> BloodUnit {
        let unit = BloodUnit::new(
            UnitId::new(),
            DonationId::new(),
            blood_type,
            volume_ml,
            collected_on,
        );
        store.save_unit(&unit).unwrap();
        unit
    }

    #[test]
    fn totals_apply_the_expiry_cutoff_at_query_time() {
        let (ledger, store) = ledger_with_store();
        let stale = seed_unit(&store, BloodType::APos, 450, date(2024, 1, 1));
        seed_unit(&store, BloodType::APos, 300, date(2024, 3, 1));

        let total = ledger.total_available(BloodType::APos, date(2024, 3, 5)).unwrap();
        assert_eq!(total, 300);

        // The query never mutates: the stale unit still awaits its sweep.
        let loaded = store.load_unit(stale.id()).unwrap().unwrap();
        assert_eq!(loaded.status(), UnitStatus::Available);
    }

    #[test]
    fn deplete_walks_first_expiring_units_first() {
        let (ledger, store) = ledger_with_store();
        let oldest = seed_unit(&store, BloodType::APos, 450, date(2024, 1, 1));
        let middle = seed_unit(&store, BloodType::APos, 450, date(2024, 1, 5));
        let newest = seed_unit(&store, BloodType::APos, 450, date(2024, 1, 10));

        let receipt = ledger.deplete(BloodType::APos, 1000, date(2024, 1, 20)).unwrap();
        let drawn: Vec<(UnitId, u32)> = receipt
            .draws
            .iter()
            .map(|draw| (draw.unit_id, draw.draw_ml))
            .collect();
        assert_eq!(
            drawn,
            vec![(oldest.id(), 450), (middle.id(), 450), (newest.id(), 100)]
        );

        assert_eq!(
            store.load_unit(oldest.id()).unwrap().unwrap().status(),
            UnitStatus::Consumed
        );
        let tail = store.load_unit(newest.id()).unwrap().unwrap();
        assert_eq!(tail.status(), UnitStatus::Available);
        assert_eq!(tail.volume_ml(), 350);

        assert_eq!(
            ledger.total_available(BloodType::APos, date(2024, 1, 20)).unwrap(),
            350
        );
    }

    #[test]
    fn shortfall_fails_the_whole_request_and_touches_nothing() {
        let (ledger, store) = ledger_with_store();
        let only = seed_unit(&store, BloodType::BNeg, 400, date(2024, 1, 1));

        let err = ledger.deplete(BloodType::BNeg, 600, date(2024, 1, 10)).unwrap_err();
        match err {
            LedgerError::Insufficient(short) => {
                assert_eq!(short.requested_ml, 600);
                assert_eq!(short.available_ml, 400);
                assert_eq!(short.shortfall_ml, 200);
            }
            _ => panic!("Expected InsufficientStock"),
        }

        let loaded = store.load_unit(only.id()).unwrap().unwrap();
        assert_eq!(loaded.volume_ml(), 400);
        assert_eq!(loaded.status(), UnitStatus::Available);
    }

    #[test]
    fn zero_requests_are_rejected() {
        let (ledger, _store) = ledger_with_store();
        let err = ledger.deplete(BloodType::APos, 0, date(2024, 1, 1)).unwrap_err();
        assert_eq!(err, LedgerError::ZeroRequest);
    }

    #[test]
    fn depletion_never_crosses_blood_types() {
        let (ledger, store) = ledger_with_store();
        seed_unit(&store, BloodType::ONeg, 450, date(2024, 1, 1));

        let err = ledger.deplete(BloodType::APos, 100, date(2024, 1, 5)).unwrap_err();
        match err {
            LedgerError::Insufficient(short) => assert_eq!(short.available_ml, 0),
            _ => panic!("Expected InsufficientStock"),
        }
    }

    #[test]
    fn sweep_reclassifies_only_expired_available_units() {
        let (ledger, store) = ledger_with_store();
        let stale = seed_unit(&store, BloodType::APos, 450, date(2024, 1, 1));
        let fresh = seed_unit(&store, BloodType::APos, 300, date(2024, 3, 1));
        let mut spent = seed_unit(&store, BloodType::ONeg, 250, date(2024, 1, 1));
        spent.consume(250).unwrap();
        store.save_unit(&spent).unwrap();

        let outcome = ledger.sweep_expired(date(2024, 3, 5)).unwrap();
        assert_eq!(
            outcome,
            SweepOutcome {
                units_expired: 1,
                volume_ml: 450
            }
        );

        assert_eq!(
            store.load_unit(stale.id()).unwrap().unwrap().status(),
            UnitStatus::Expired
        );
        assert_eq!(
            store.load_unit(fresh.id()).unwrap().unwrap().status(),
            UnitStatus::Available
        );
        assert_eq!(
            store.load_unit(spent.id()).unwrap().unwrap().status(),
            UnitStatus::Consumed
        );
    }

    #[test]
    fn sweep_is_idempotent() {
        let (ledger, store) = ledger_with_store();
        seed_unit(&store, BloodType::APos, 450, date(2024, 1, 1));

        let first = ledger.sweep_expired(date(2024, 3, 5)).unwrap();
        assert_eq!(first.units_expired, 1);

        let second = ledger.sweep_expired(date(2024, 3, 5)).unwrap();
        assert_eq!(second, SweepOutcome::default());
    }

    #[test]
    fn sweep_does_not_change_totals() {
        let (ledger, store) = ledger_with_store();
        seed_unit(&store, BloodType::APos, 450, date(2024, 1, 1));
        seed_unit(&store, BloodType::APos, 300, date(2024, 3, 1));
        let as_of = date(2024, 3, 5);

        let before = ledger.total_available(BloodType::APos, as_of).unwrap();
        ledger.sweep_expired(as_of).unwrap();
        let after = ledger.total_available(BloodType::APos, as_of).unwrap();

        assert_eq!(before, 300);
        assert_eq!(after, 300);
    }

    #[test]
    fn summary_covers_all_eight_types_in_canonical_order() {
        let (ledger, store) = ledger_with_store();
        seed_unit(&store, BloodType::APos, 450, date(2024, 3, 1));
        seed_unit(&store, BloodType::APos, 300, date(2024, 3, 2));
        seed_unit(&store, BloodType::ONeg, 250, date(2024, 3, 1));

        let summaries = ledger.summary_by_type(date(2024, 3, 5)).unwrap();
        assert_eq!(summaries.len(), BloodType::ALL.len());

        let order: Vec<BloodType> = summaries.iter().map(|s| s.blood_type).collect();
        assert_eq!(order, BloodType::ALL.to_vec());

        let a_pos = &summaries[0];
        assert_eq!(a_pos.available_ml, 750);
        assert_eq!(a_pos.usable_units, 2);

        let b_pos = &summaries[2];
        assert_eq!(b_pos.available_ml, 0);
        assert_eq!(b_pos.usable_units, 0);
    }

    #[test]
    fn snapshot_keeps_only_usable_units() {
        let (ledger, store) = ledger_with_store();
        seed_unit(&store, BloodType::APos, 450, date(2024, 1, 1));
        let fresh = seed_unit(&store, BloodType::APos, 300, date(2024, 3, 1));
        let mut spent = seed_unit(&store, BloodType::ONeg, 250, date(2024, 3, 1));
        spent.consume(250).unwrap();
        store.save_unit(&spent).unwrap();

        let snapshot = ledger.snapshot(date(2024, 3, 5)).unwrap();
        assert_eq!(snapshot.as_of(), date(2024, 3, 5));
        assert_eq!(snapshot.units().len(), 1);
        assert_eq!(snapshot.units()[0].id(), fresh.id());
        assert_eq!(snapshot.total_for(BloodType::APos), 300);
        assert_eq!(snapshot.total_for(BloodType::ONeg), 0);
    }

    #[test]
    fn concurrent_depletions_never_oversell() {
        let (ledger, store) = ledger_with_store();
        seed_unit(&store, BloodType::ONeg, 400, date(2024, 1, 1));
        let ledger = Arc::new(ledger);
        let as_of = date(2024, 1, 10);

        let mut handles = Vec::new();
        for _ in 0..2 {
            let ledger = Arc::clone(&ledger);
            handles.push(thread::spawn(move || {
                ledger.deplete(BloodType::ONeg, 300, as_of)
            }));
        }
        let results: Vec<_> = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect();

        let won = results.iter().filter(|result| result.is_ok()).count();
        assert_eq!(won, 1);
        match results.iter().find(|result| result.is_err()) {
            Some(Err(LedgerError::Insufficient(short))) => {
                assert_eq!(short.available_ml, 100);
            }
            _ => panic!("Expected exactly one InsufficientStock loser"),
        }

        assert_eq!(ledger.total_available(BloodType::ONeg, as_of).unwrap(), 100);
    }
}
