//! Repository layer: stateless structs with async methods over `&PgPool`.

mod admin_user_repo;
mod audit_repo;
mod locker_repo;
mod parcel_repo;

pub use admin_user_repo::AdminUserRepo;
pub use audit_repo::AuditEventRepo;
pub use locker_repo::LockerRepo;
pub use parcel_repo::ParcelRepo;
