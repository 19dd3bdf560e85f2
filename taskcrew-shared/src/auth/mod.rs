//! Authentication and authorization primitives
//!
//! - `password`: Argon2id credential hashing
//! - `token`: Signed, time-limited `(principal_id, role)` assertions
//! - `context`: The verified identity attached to every operation
//! - `authorization`: The pure allow/deny gate evaluated before every operation

pub mod authorization;
pub mod context;
pub mod password;
pub mod token;
