//! Infrastructure layer: in-memory collaborators and configuration.
//!
//! The settlement engine only sees read capabilities. This crate provides
//! process-local implementations of them (for tests, demos and single-node
//! deployments) plus environment-driven configuration.

pub mod config;
pub mod expense_book;
pub mod memberships;
pub mod names;

#[cfg(test)]
mod integration_tests;

pub use config::{ConfigError, EngineConfig};
pub use expense_book::{ExpenseBookError, InMemoryLedger};
pub use memberships::InMemoryMemberships;
pub use names::InMemoryNames;
