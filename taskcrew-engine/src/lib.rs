//! # Taskcrew Engine
//!
//! The operation layer of taskcrew: request-scoped services that assign units
//! of work across the admin → manager → employee hierarchy, track each task
//! through a validated lifecycle, and derive workload/performance metrics
//! from the resulting task set.
//!
//! Every operation takes a verified [`AuthContext`], consults the
//! authorization gate before touching anything, and returns either a result
//! or one of the typed failures in `taskcrew_shared::error`. There are no
//! background jobs: each call runs to completion inside one request.
//!
//! ## Module Organization
//!
//! - `directory`: Registration, account approval, authentication
//! - `roster`: Groups, membership mutation, manager resolution
//! - `lifecycle`: Task creation, status transitions, visibility, comments
//! - `analytics`: Per-principal and per-team workload/performance metrics
//! - `reports`: System-wide task distributions
//! - `engine`: One bundle wiring the services over a store and config
//!
//! [`AuthContext`]: taskcrew_shared::auth::context::AuthContext

pub mod analytics;
pub mod directory;
pub mod engine;
pub mod lifecycle;
pub mod reports;
pub mod roster;

pub use engine::Engine;

/// Current version of the taskcrew engine
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
