//! `splitledger-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the exact-decimal `Money` type, and the shared error model.

pub mod error;
pub mod id;
pub mod money;

pub use error::{DomainError, DomainResult};
pub use id::{ExpenseId, GroupId, UserId};
pub use money::{MONEY_SCALE, Money};
