//! `hemobank-core` — domain foundation for the blood bank engine.
//!
//! This crate contains **pure domain** types (no infrastructure concerns):
//! blood type codes, typed identifiers, the unit/donation/distribution state
//! machines, and the fixed constants exposed to the embedding application.

pub mod blood;
pub mod distribution;
pub mod donation;
pub mod error;
pub mod id;
pub mod unit;

pub use blood::BloodType;
pub use distribution::{Distribution, DistributionError, DistributionStatus};
pub use donation::{
    Donation, DonationError, DonationStatus, DonorRecord, STANDARD_DONATION_ML,
};
pub use error::{DomainError, DomainResult};
pub use id::{DistributionId, DonationId, DonorId, HospitalId, OperatorId, UnitId};
pub use unit::{
    BloodUnit, UnitError, UnitStatus, DEFAULT_EXPIRY_LOOKAHEAD_DAYS,
    DEFAULT_LOW_STOCK_THRESHOLD_ML, SHELF_LIFE_DAYS,
};
