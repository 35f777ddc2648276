//! ABO and Rh donor/recipient compatibility.
//!
//! A transfusion is compatible when both components agree: the ABO group of
//! the donor must be acceptable to the recipient (O donates to everyone,
//! identical groups match, AB receives every group) and an Rh-positive
//! donor is only acceptable to an Rh-positive recipient.

use hemobank_core::BloodType;

/// ABO group of a blood type, ignoring the Rh factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AboGroup {
    A,
    B,
    Ab,
    O,
}

impl AboGroup {
    fn of(blood_type: BloodType) -> Self {
        match blood_type {
            BloodType::APos | BloodType::ANeg => AboGroup::A,
            BloodType::BPos | BloodType::BNeg => AboGroup::B,
            BloodType::AbPos | BloodType::AbNeg => AboGroup::Ab,
            BloodType::OPos | BloodType::ONeg => AboGroup::O,
        }
    }
}

/// The compatibility chart, exposed as an injectable collaborator.
///
/// Stateless and `Copy`; holding it by value is as cheap as calling free
/// functions while keeping the seam explicit for callers that want to test
/// against it.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompatibilityRules;

impl CompatibilityRules {
    pub fn new() -> Self {
        Self
    }

    /// Whether a unit of `donor` blood may be transfused to a `recipient`.
    pub fn can_donate_to(&self, donor: BloodType, recipient: BloodType) -> bool {
        let donor_group = AboGroup::of(donor);
        let recipient_group = AboGroup::of(recipient);

        let abo_compatible = donor_group == AboGroup::O
            || donor_group == recipient_group
            || recipient_group == AboGroup::Ab;
        let rh_compatible = !donor.is_rh_positive() || recipient.is_rh_positive();

        abo_compatible && rh_compatible
    }

    /// Every type a `recipient` may receive, in the canonical
    /// [`BloodType::ALL`] order.
    pub fn compatible_donors(&self, recipient: BloodType) -> &'static [BloodType] {
        use BloodType::*;

        match recipient {
            APos => &[APos, ANeg, OPos, ONeg],
            ANeg => &[ANeg, ONeg],
            BPos => &[BPos, BNeg, OPos, ONeg],
            BNeg => &[BNeg, ONeg],
            AbPos => &[APos, ANeg, BPos, BNeg, AbPos, AbNeg, OPos, ONeg],
            AbNeg => &[ANeg, BNeg, AbNeg, ONeg],
            OPos => &[OPos, ONeg],
            ONeg => &[ONeg],
        }
    }
}
