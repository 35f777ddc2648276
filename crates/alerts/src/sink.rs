//! Delivery seam for raised alerts.

use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use crate::alert::{Alert, AlertPriority};

/// Receives evaluated alerts.
///
/// Evaluation is stateless and re-raises on every pass, so implementations
/// must tolerate repeated delivery of identical alerts.
pub trait AlertSink: Send + Sync {
    fn emit(&self, alert: &Alert);
}

impl<S> AlertSink for Arc<S>
where
    S: AlertSink + ?Sized,
{
    fn emit(&self, alert: &Alert) {
        (**self).emit(alert)
    }
}

/// Emits alerts as structured log events, level matched to priority.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAlertSink;

impl AlertSink for LogAlertSink {
    fn emit(&self, alert: &Alert) {
        match alert.priority {
            AlertPriority::Critical | AlertPriority::High => warn!(
                kind = ?alert.kind,
                priority = ?alert.priority,
                blood_type = %alert.blood_type,
                raised_on = %alert.raised_on,
                "{}",
                alert.message
            ),
            AlertPriority::Medium | AlertPriority::Low => info!(
                kind = ?alert.kind,
                priority = ?alert.priority,
                blood_type = %alert.blood_type,
                raised_on = %alert.raised_on,
                "{}",
                alert.message
            ),
        }
    }
}

/// Buffers alerts for assertions in tests and dev tooling.
#[derive(Debug, Default)]
pub struct InMemoryAlertSink {
    alerts: Mutex<Vec<Alert>>,
}

impl InMemoryAlertSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.alerts.lock().unwrap().clear();
    }
}

impl AlertSink for InMemoryAlertSink {
    fn emit(&self, alert: &Alert) {
        self.alerts.lock().unwrap().push(alert.clone());
    }
}
