//! `hemobank-store` — persistence traits, the in-memory backend, and
//! scope-keyed locking.
//!
//! Services depend on the traits in [`traits`], never on a concrete
//! backend. [`MemoryStore`] implements all of them behind a single lock so
//! its composite saves are atomic; a database-backed implementation would
//! use one transaction per composite save instead.

pub mod error;
pub mod lock;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use lock::{LockManager, LockScope};
pub use memory::MemoryStore;
pub use traits::{DistributionStore, DonationStore, DonorDirectory, UnitStore};
