//! `hemobank-inventory` — the stock ledger.
//!
//! [`depletion`] holds the pure first-expiring-first-out planning logic;
//! [`ledger`] wraps it with storage and per-type locking. Totals always
//! apply the expiry cutoff at query time, so a unit past its date stops
//! counting the moment the calendar turns, whether or not a sweep has
//! reclassified it yet.

pub mod depletion;
pub mod ledger;

pub use depletion::{DepletionError, DepletionPlan, InsufficientStock, PlannedDraw};
pub use ledger::{
    DepletionReceipt, InventoryLedger, LedgerError, StockSnapshot, SweepOutcome, TypeSummary,
};
