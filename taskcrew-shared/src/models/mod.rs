//! Data models for the taskcrew core
//!
//! - `principal`: Admins, managers, and employees plus typed references
//! - `group`: Named manager/employee collections
//! - `task`: The central work unit and its state machine
//! - `comment`: Free-text notes attached to tasks

pub mod comment;
pub mod group;
pub mod principal;
pub mod task;
