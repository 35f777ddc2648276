//! Stored blood unit lifecycle.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::blood::BloodType;
use crate::id::{DonationId, UnitId};

/// Shelf life of a stored unit: collection day through the last usable day.
pub const SHELF_LIFE_DAYS: i64 = 42;

/// Default per-type availability floor (ml) below which stock counts as low.
pub const DEFAULT_LOW_STOCK_THRESHOLD_ML: u32 = 2000;

/// Default number of days ahead that expiry warnings look.
pub const DEFAULT_EXPIRY_LOOKAHEAD_DAYS: i64 = 7;

/// Lifecycle status of a stored unit.
///
/// `Consumed` and `Expired` are terminal. The remaining volume is frozen on
/// both, so a consumed unit reads 0 ml and an expired unit reads whatever
/// was left when it aged out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitStatus {
    Available,
    Consumed,
    Expired,
}

/// Error from unit state transitions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UnitError {
    /// Attempt to draw from a unit that is not `Available`.
    #[error("unit {unit_id} is not available (found {found:?})")]
    NotAvailable { unit_id: UnitId, found: UnitStatus },

    /// A draw of zero milliliters.
    #[error("consume amount must be positive")]
    ZeroAmount,
}

/// A physically stored unit of blood.
///
/// Expiry is always derived from the collection date; there is no way to
/// construct a unit with a divergent expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloodUnit {
    id: UnitId,
    donation_id: DonationId,
    blood_type: BloodType,
    volume_ml: u32,
    collected_on: NaiveDate,
    expires_on: NaiveDate,
    status: UnitStatus,
}

impl BloodUnit {
    /// A freshly collected, available unit.
    pub fn new(
        id: UnitId,
        donation_id: DonationId,
        blood_type: BloodType,
        volume_ml: u32,
        collected_on: NaiveDate,
    ) -> Self {
        Self {
            id,
            donation_id,
            blood_type,
            volume_ml,
            collected_on,
            expires_on: collected_on + Duration::days(SHELF_LIFE_DAYS),
            status: UnitStatus::Available,
        }
    }

    pub fn id(&self) -> UnitId {
        self.id
    }

    pub fn donation_id(&self) -> DonationId {
        self.donation_id
    }

    pub fn blood_type(&self) -> BloodType {
        self.blood_type
    }

    pub fn volume_ml(&self) -> u32 {
        self.volume_ml
    }

    pub fn collected_on(&self) -> NaiveDate {
        self.collected_on
    }

    pub fn expires_on(&self) -> NaiveDate {
        self.expires_on
    }

    pub fn status(&self) -> UnitStatus {
        self.status
    }

    /// Whether the unit is strictly past its last usable day.
    ///
    /// A unit is still usable on `expires_on` itself.
    pub fn is_expired(&self, as_of: NaiveDate) -> bool {
        as_of > self.expires_on
    }

    /// Available and not past expiry: the only state a depletion may touch.
    pub fn is_usable(&self, as_of: NaiveDate) -> bool {
        self.status == UnitStatus::Available && !self.is_expired(as_of)
    }

    /// Days until expiry: zero on the last usable day, negative past it.
    pub fn days_until_expiry(&self, as_of: NaiveDate) -> i64 {
        (self.expires_on - as_of).num_days()
    }

    /// Draw up to `amount_ml` from the unit.
    ///
    /// Drawing the full remaining volume (or more) empties the unit and marks
    /// it `Consumed`; drawing less leaves it `Available` with the remainder.
    /// Returns the milliliters actually taken.
    pub fn consume(&mut self, amount_ml: u32) -> Result<u32, UnitError> {
        if self.status != UnitStatus::Available {
            return Err(UnitError::NotAvailable {
                unit_id: self.id,
                found: self.status,
            });
        }
        if amount_ml == 0 {
            return Err(UnitError::ZeroAmount);
        }

        if amount_ml >= self.volume_ml {
            let taken = self.volume_ml;
            self.volume_ml = 0;
            self.status = UnitStatus::Consumed;
            Ok(taken)
        } else {
            self.volume_ml -= amount_ml;
            Ok(amount_ml)
        }
    }

    /// Reclassify the unit as expired once `as_of` is past its expiry date.
    ///
    /// Idempotent: returns `true` only when the status actually changed.
    pub fn expire(&mut self, as_of: NaiveDate) -> bool {
        if self.status == UnitStatus::Available && self.is_expired(as_of) {
            self.status = UnitStatus::Expired;
            true
        } else {
            false
        }
    }
}
