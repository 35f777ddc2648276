//! `hemobank-compat` — transfusion compatibility rules.
//!
//! Pure logic over [`hemobank_core::BloodType`], with no storage and no
//! clock. Collaborators hold a [`CompatibilityRules`] value and ask it
//! questions.

pub mod rules;

pub use rules::CompatibilityRules;
