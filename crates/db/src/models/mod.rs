//! Row models and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A create DTO for inserts
//! - Query parameter types where the entity supports filtered listing

pub mod admin_user;
pub mod audit;
pub mod locker;
pub mod parcel;
