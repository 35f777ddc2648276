//! `hemobank-donations` — donation screening.
//!
//! A collected donation waits as `Pending` until an operator screens it.
//! Validation credits inventory with exactly one unit carrying the donor's
//! registered blood type; rejection records the reason and touches no
//! stock.

pub mod intake;

pub use intake::{DonationIntake, IntakeError};
