//! `hemobank-alerts` — stock alert evaluation.
//!
//! [`AlertEngine::evaluate`] is a stateless pass over a ledger snapshot:
//! it raises the same alerts on every run and keeps no history. Delivery,
//! persistence and deduplication belong to whatever sits behind the
//! [`AlertSink`] seam.

pub mod alert;
pub mod engine;
pub mod sink;

pub use alert::{Alert, AlertKind, AlertPriority};
pub use engine::{AlertEngine, AlertThresholds, NEAR_EXPIRY_CRITICAL_DAYS};
pub use sink::{AlertSink, InMemoryAlertSink, LogAlertSink};
