//! Blood type codes and their textual representation.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// The eight ABO/Rh blood type codes.
///
/// The set is closed: any other code is rejected at the parse boundary with
/// `DomainError::InvalidBloodType`, so everything downstream can match
/// exhaustively instead of comparing strings.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BloodType {
    #[serde(rename = "A+")]
    APos,
    #[serde(rename = "A-")]
    ANeg,
    #[serde(rename = "B+")]
    BPos,
    #[serde(rename = "B-")]
    BNeg,
    #[serde(rename = "AB+")]
    AbPos,
    #[serde(rename = "AB-")]
    AbNeg,
    #[serde(rename = "O+")]
    OPos,
    #[serde(rename = "O-")]
    ONeg,
}

impl BloodType {
    /// All eight codes, in canonical display order.
    pub const ALL: [BloodType; 8] = [
        BloodType::APos,
        BloodType::ANeg,
        BloodType::BPos,
        BloodType::BNeg,
        BloodType::AbPos,
        BloodType::AbNeg,
        BloodType::OPos,
        BloodType::ONeg,
    ];

    /// The printable code ("A+", "O-", ...).
    pub fn code(&self) -> &'static str {
        match self {
            BloodType::APos => "A+",
            BloodType::ANeg => "A-",
            BloodType::BPos => "B+",
            BloodType::BNeg => "B-",
            BloodType::AbPos => "AB+",
            BloodType::AbNeg => "AB-",
            BloodType::OPos => "O+",
            BloodType::ONeg => "O-",
        }
    }

    pub fn is_rh_positive(&self) -> bool {
        matches!(
            self,
            BloodType::APos | BloodType::BPos | BloodType::AbPos | BloodType::OPos
        )
    }
}

impl fmt::Display for BloodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for BloodType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A+" => Ok(BloodType::APos),
            "A-" => Ok(BloodType::ANeg),
            "B+" => Ok(BloodType::BPos),
            "B-" => Ok(BloodType::BNeg),
            "AB+" => Ok(BloodType::AbPos),
            "AB-" => Ok(BloodType::AbNeg),
            "O+" => Ok(BloodType::OPos),
            "O-" => Ok(BloodType::ONeg),
            other => Err(DomainError::invalid_blood_type(other)),
        }
    }
}
