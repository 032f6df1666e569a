//! # Navigation Module
//!
//! Gates navigation to protected views based on session and role state.
//!
//! ## Overview
//!
//! - [`GuardDecision`](decision::GuardDecision): the one-shot outcome of a
//!   guard evaluation: allow, redirect, or deny in place.
//! - [`RouteTable`](routes::RouteTable): the application's route
//!   declarations with their access requirements.
//! - [`NavigationGuard`](guard::NavigationGuard): the two escalating
//!   policies: an authentication check against a *fresh* provider session and
//!   an authorization check against a *fresh* profile read (never a cached
//!   role).
//! - [`Navigator`](navigator::Navigator): per-attempt plumbing that resolves
//!   a guard decision into exactly one navigation outcome.
//!
//! ## Policy
//!
//! Rejected admin navigations redirect to home unless the attempt already
//! originated at home, in which case the guard denies in place rather than
//! firing a redirect that could loop. A rejected navigation never mutates
//! session state.

pub mod decision;
pub mod guard;
pub mod navigator;
pub mod routes;

pub use decision::GuardDecision;
pub use guard::NavigationGuard;
pub use navigator::{NavOutcome, Navigator};
pub use routes::{Access, Route, RouteName, RouteTable};
