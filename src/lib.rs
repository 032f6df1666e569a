//! Workspace placeholder crate.
//!
//! This crate exists to expose a single dependency entry point that maps to
//! the individual workspace crates. Host applications can depend on
//! `session-core-workspace` with the `service` feature enabled and get the
//! full bootstrap surface from `core-service` without wiring each member
//! crate individually.

#[cfg(feature = "service")]
pub use core_service;
