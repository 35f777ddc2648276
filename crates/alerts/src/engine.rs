//! Rule evaluation over a stock snapshot.

use std::cmp::Reverse;

use hemobank_core::{BloodType, DEFAULT_EXPIRY_LOOKAHEAD_DAYS, DEFAULT_LOW_STOCK_THRESHOLD_ML};
use hemobank_inventory::StockSnapshot;

use crate::alert::{Alert, AlertKind, AlertPriority};

/// A near-expiry alert escalates to critical when the soonest affected
/// unit has this many days left or fewer.
pub const NEAR_EXPIRY_CRITICAL_DAYS: i64 = 3;

/// Tunable limits for evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertThresholds {
    pub low_stock_ml: u32,
    pub expiry_lookahead_days: i64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            low_stock_ml: DEFAULT_LOW_STOCK_THRESHOLD_ML,
            expiry_lookahead_days: DEFAULT_EXPIRY_LOOKAHEAD_DAYS,
        }
    }
}

impl AlertThresholds {
    pub fn with_low_stock_ml(mut self, low_stock_ml: u32) -> Self {
        self.low_stock_ml = low_stock_ml;
        self
    }

    pub fn with_expiry_lookahead_days(mut self, days: i64) -> Self {
        self.expiry_lookahead_days = days;
        self
    }
}

/// Evaluates every rule for every blood type against one snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlertEngine {
    thresholds: AlertThresholds,
}

impl AlertEngine {
    pub fn new(thresholds: AlertThresholds) -> Self {
        Self { thresholds }
    }

    /// One pass over the snapshot. Rules fire independently per type:
    ///
    /// - stockout (critical) when nothing usable remains;
    /// - low stock (high) when the total is positive but under the floor;
    /// - near expiry when any usable unit has `0 < days left <= lookahead`,
    ///   critical if the soonest is [`NEAR_EXPIRY_CRITICAL_DAYS`] out or
    ///   closer, medium otherwise.
    ///
    /// The batch comes back in dashboard order: priority, then most recent
    /// first, then canonical type order.
    pub fn evaluate(&self, snapshot: &StockSnapshot) -> Vec<Alert> {
        let as_of = snapshot.as_of();
        let mut alerts = Vec::new();

        for blood_type in BloodType::ALL {
            let total_ml = snapshot.total_for(blood_type);
            if total_ml == 0 {
                alerts.push(Alert {
                    kind: AlertKind::Stockout,
                    priority: AlertPriority::Critical,
                    blood_type,
                    message: format!("no usable stock for {blood_type}"),
                    raised_on: as_of,
                });
            } else if total_ml < self.thresholds.low_stock_ml {
                alerts.push(Alert {
                    kind: AlertKind::LowStock,
                    priority: AlertPriority::High,
                    blood_type,
                    message: format!(
                        "usable stock for {blood_type} at {total_ml} ml, below the {} ml floor",
                        self.thresholds.low_stock_ml
                    ),
                    raised_on: as_of,
                });
            }

            let expiring: Vec<i64> = snapshot
                .units_of(blood_type)
                .map(|unit| unit.days_until_expiry(as_of))
                .filter(|days| (1..=self.thresholds.expiry_lookahead_days).contains(days))
                .collect();
            if let Some(&soonest) = expiring.iter().min() {
                let priority = if soonest <= NEAR_EXPIRY_CRITICAL_DAYS {
                    AlertPriority::Critical
                } else {
                    AlertPriority::Medium
                };
                alerts.push(Alert {
                    kind: AlertKind::NearExpiry,
                    priority,
                    blood_type,
                    message: format!(
                        "{} unit(s) of {blood_type} expire within {} days, soonest in {soonest}",
                        expiring.len(),
                        self.thresholds.expiry_lookahead_days
                    ),
                    raised_on: as_of,
                });
            }
        }

        alerts.sort_by_key(|alert| (alert.priority, Reverse(alert.raised_on), alert.blood_type));
        alerts
    }
}
