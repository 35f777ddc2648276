//! `hemobank-jobs` — the background expiry sweep.
//!
//! One worker thread periodically reclassifies expired units, re-evaluates
//! the alert rules over the fresh snapshot and pushes the batch to a sink.
//! This is the only place in the workspace that reads a wall clock; every
//! domain operation below it takes an explicit date.

pub mod sweep;

pub use sweep::{SweepConfig, SweepHandle, SweepRun, SweepStats, SweepWorker};
