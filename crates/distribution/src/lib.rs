//! `hemobank-distribution` — fulfillment of hospital requests.
//!
//! The allocator serializes on the same per-type scope the ledger uses, so
//! a fulfillment, a direct depletion and an expiry sweep of one blood type
//! can never interleave. Requests are met whole or not at all.

pub mod allocator;

pub use allocator::{AllocationError, DistributionAllocator};
