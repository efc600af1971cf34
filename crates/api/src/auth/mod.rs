//! Admin authentication building blocks: Argon2id password hashing and
//! HS256 JWT access tokens.

pub mod jwt;
pub mod password;
