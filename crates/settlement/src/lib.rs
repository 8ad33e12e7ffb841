//! Ledger & settlement engine for shared expenses.
//!
//! Pure domain logic only: no IO, no HTTP, no persistence concerns. Storage and
//! membership bookkeeping are injected as read capabilities (see [`source`]).
//!
//! - [`validation`]: checks a proposed expense before it is persisted.
//! - [`balances`]: reduces expense/split rows into per-user net balances.
//! - [`simplify`]: turns net balances into a short list of settling transfers.
//! - [`statement`] and [`report`]: read views handed to presentation layers.

pub mod balances;
pub mod policy;
pub mod records;
pub mod report;
pub mod simplify;
pub mod source;
pub mod statement;
pub mod validation;

pub use balances::{NetBalanceMap, aggregate_net_balances, overall_balances, user_net_balance};
pub use policy::SettlementPolicy;
pub use records::{ExpenseEntry, ExpenseRecord, Scope, SplitRecord, UserAmount};
pub use report::{SettlementLine, SettlementReport, settlement_report};
pub use simplify::{SettlementPlan, Transfer, plan_settlement, simplify};
pub use source::{ExpenseHistory, LedgerSource, MembershipLookup, NameLookup};
pub use statement::{Statement, StatementLine, credit_statement, debt_statement};
pub use validation::{
    Accepted, ExpenseProposal, SplitLine, SplitValidationError, ValidationErrorKind,
    validate_split,
};
