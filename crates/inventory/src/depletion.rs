//! First-expiring-first-out depletion planning.
//!
//! Planning is pure: it takes a stock snapshot and produces the draws plus
//! the modified units, without touching storage. Callers run it under the
//! blood type's scope lock and commit the returned units in one write, so
//! a shortfall is detected before anything is mutated.

use chrono::NaiveDate;
use hemobank_core::{BloodUnit, UnitError, UnitId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The request cannot be met from usable stock. Nothing was drawn.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[error("insufficient stock: requested {requested_ml} ml, available {available_ml} ml (short {shortfall_ml} ml)")]
pub struct InsufficientStock {
    pub requested_ml: u32,
    pub available_ml: u32,
    pub shortfall_ml: u32,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DepletionError {
    #[error(transparent)]
    Insufficient(#[from] InsufficientStock),

    #[error(transparent)]
    Unit(#[from] UnitError),
}

/// One unit's share of a depletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedDraw {
    pub unit_id: UnitId,
    pub draw_ml: u32,
}

/// A fully planned depletion: the audit trail of draws and the units they
/// modified, ready to persist together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepletionPlan {
    draws: Vec<PlannedDraw>,
    updated_units: Vec<BloodUnit>,
}

impl DepletionPlan {
    /// Per-unit draws in the order they were taken.
    pub fn draws(&self) -> &[PlannedDraw] {
        &self.draws
    }

    /// The consumed or partially drawn units, carrying their new state.
    pub fn updated_units(&self) -> &[BloodUnit] {
        &self.updated_units
    }

    pub fn total_drawn_ml(&self) -> u32 {
        self.draws.iter().map(|draw| draw.draw_ml).sum()
    }

    pub fn into_parts(self) -> (Vec<PlannedDraw>, Vec<BloodUnit>) {
        (self.draws, self.updated_units)
    }
}

/// Milliliters counted as in stock: available units not past `as_of`.
pub fn usable_volume_ml(units: &[BloodUnit], as_of: NaiveDate) -> u32 {
    units
        .iter()
        .filter(|unit| unit.is_usable(as_of))
        .map(BloodUnit::volume_ml)
        .sum()
}

/// Plan a depletion of `requested_ml` against a stock snapshot.
///
/// Units are drained in first-expiring order, ties broken by unit id so
/// the walk is deterministic. Only the last unit touched may be left
/// partially drawn; every earlier one is consumed whole. If usable stock
/// cannot cover the request, [`InsufficientStock`] reports the shortfall
/// and no unit is modified.
pub fn plan_depletion(
    snapshot: Vec<BloodUnit>,
    requested_ml: u32,
    as_of: NaiveDate,
) -> Result<DepletionPlan, DepletionError> {
    let mut usable: Vec<BloodUnit> = snapshot
        .into_iter()
        .filter(|unit| unit.is_usable(as_of))
        .collect();
    usable.sort_by_key(|unit| (unit.expires_on(), unit.id()));

    let available_ml: u32 = usable.iter().map(BloodUnit::volume_ml).sum();
    if available_ml < requested_ml {
        return Err(InsufficientStock {
            requested_ml,
            available_ml,
            shortfall_ml: requested_ml - available_ml,
        }
        .into());
    }

    let mut draws = Vec::new();
    let mut updated_units = Vec::new();
    let mut remaining_ml = requested_ml;
    for mut unit in usable {
        if remaining_ml == 0 {
            break;
        }
        let draw_ml = remaining_ml.min(unit.volume_ml());
        if draw_ml == 0 {
            continue;
        }
        let taken = unit.consume(draw_ml)?;
        remaining_ml -= taken;
        draws.push(PlannedDraw {
            unit_id: unit.id(),
            draw_ml: taken,
        });
        updated_units.push(unit);
    }

    Ok(DepletionPlan {
        draws,
        updated_units,
    })
}

#[cfg(test)]
mod tests {
    use hemobank_core::{BloodType, DonationId, UnitStatus};
    use uuid::Uuid;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn unit(volume_ml: u32, collected_on: NaiveDate) -> BloodUnit {
        BloodUnit::new(
            UnitId::new(),
            DonationId::new(),
            BloodType::APos,
            volume_ml,
            collected_on,
        )
    }

    #[test]
    fn draws_walk_units_in_first_expiring_order() {
        let oldest = unit(450, date(2024, 1, 1));
        let middle = unit(450, date(2024, 1, 5));
        let newest = unit(450, date(2024, 1, 10));

        let plan = plan_depletion(
            vec![newest.clone(), oldest.clone(), middle.clone()],
            1000,
            date(2024, 1, 20),
        )
        .unwrap();

        assert_eq!(
            plan.draws(),
            &[
                PlannedDraw {
                    unit_id: oldest.id(),
                    draw_ml: 450
                },
                PlannedDraw {
                    unit_id: middle.id(),
                    draw_ml: 450
                },
                PlannedDraw {
                    unit_id: newest.id(),
                    draw_ml: 100
                },
            ]
        );
        assert_eq!(plan.total_drawn_ml(), 1000);

        let updated = plan.updated_units();
        assert_eq!(updated[0].status(), UnitStatus::Consumed);
        assert_eq!(updated[1].status(), UnitStatus::Consumed);
        assert_eq!(updated[2].status(), UnitStatus::Available);
        assert_eq!(updated[2].volume_ml(), 350);
    }

    #[test]
    fn equal_expiry_ties_break_by_unit_id() {
        let collected = date(2024, 1, 1);
        let low = BloodUnit::new(
            UnitId::from(Uuid::from_u128(1)),
            DonationId::new(),
            BloodType::APos,
            450,
            collected,
        );
        let high = BloodUnit::new(
            UnitId::from(Uuid::from_u128(2)),
            DonationId::new(),
            BloodType::APos,
            450,
            collected,
        );

        let plan = plan_depletion(vec![high, low.clone()], 100, collected).unwrap();
        assert_eq!(
            plan.draws(),
            &[PlannedDraw {
                unit_id: low.id(),
                draw_ml: 100
            }]
        );
    }

    #[test]
    fn expired_and_consumed_units_are_invisible_to_planning() {
        let expired = unit(450, date(2024, 1, 1));
        let mut consumed = unit(450, date(2024, 3, 1));
        consumed.consume(450).unwrap();
        let good = unit(450, date(2024, 3, 1));

        let err = plan_depletion(vec![expired, consumed, good], 500, date(2024, 3, 10)).unwrap_err();
        match err {
            DepletionError::Insufficient(short) => {
                assert_eq!(short.requested_ml, 500);
                assert_eq!(short.available_ml, 450);
                assert_eq!(short.shortfall_ml, 50);
            }
            _ => panic!("Expected InsufficientStock"),
        }
    }

    #[test]
    fn exact_fit_consumes_the_last_unit_fully() {
        let first = unit(450, date(2024, 1, 1));
        let second = unit(300, date(2024, 1, 5));

        let plan = plan_depletion(vec![first, second], 750, date(2024, 1, 20)).unwrap();
        assert!(
            plan.updated_units()
                .iter()
                .all(|u| u.status() == UnitStatus::Consumed)
        );
        assert_eq!(plan.total_drawn_ml(), 750);
    }

    #[test]
    fn unit_on_its_expiry_date_is_still_drawn() {
        let stock = unit(450, date(2024, 1, 1));
        let expiry = stock.expires_on();

        let plan = plan_depletion(vec![stock], 450, expiry).unwrap();
        assert_eq!(plan.total_drawn_ml(), 450);
    }

    #[test]
    fn empty_stock_reports_the_full_request_as_shortfall() {
        let err = plan_depletion(Vec::new(), 300, date(2024, 1, 1)).unwrap_err();
        match err {
            DepletionError::Insufficient(short) => {
                assert_eq!(short.available_ml, 0);
                assert_eq!(short.shortfall_ml, 300);
            }
            _ => panic!("Expected InsufficientStock"),
        }
    }

    #[test]
    fn zero_request_plans_no_draws() {
        let stock = unit(450, date(2024, 1, 1));
        let plan = plan_depletion(vec![stock], 0, date(2024, 1, 2)).unwrap();
        assert!(plan.draws().is_empty());
        assert!(plan.updated_units().is_empty());
    }

    #[test]
    fn counted_stock_excludes_expired_and_consumed_units() {
        let expired = unit(450, date(2024, 1, 1));
        let mut consumed = unit(450, date(2024, 3, 1));
        consumed.consume(450).unwrap();
        let good = unit(200, date(2024, 3, 1));

        let total = usable_volume_ml(&[expired, consumed, good], date(2024, 3, 10));
        assert_eq!(total, 200);
    }
}
