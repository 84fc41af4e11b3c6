//! Credential hashing shared by Nova services
//!
//! Passwords are stored only as salted Argon2id digests in PHC string form.

pub mod password;

pub use password::{HashCost, HashError, PasswordHasher};
