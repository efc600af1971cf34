//! Parcelhub domain core: PIN lifecycle, locker and parcel state machines,
//! audit vocabulary, and input validation.
//!
//! This crate has zero internal dependencies so it can be used by the
//! API/repository layer, the reminder scheduler, and any future CLI tooling.

pub mod audit;
pub mod error;
pub mod locker;
pub mod parcel;
pub mod pin;
pub mod types;
pub mod validation;
