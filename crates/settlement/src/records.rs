//! Immutable ledger rows as handed over by the persistence collaborator.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use splitledger_core::{ExpenseId, GroupId, Money, UserId};

/// Population of expenses a query considers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "group_id", rename_all = "lowercase")]
pub enum Scope {
    /// Every non-deleted expense.
    Global,
    /// Non-deleted expenses of one group.
    Group(GroupId),
}

impl Scope {
    pub fn includes(self, group_id: GroupId) -> bool {
        match self {
            Scope::Global => true,
            Scope::Group(id) => id == group_id,
        }
    }
}

/// A paid expense. Never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: ExpenseId,
    pub group_id: GroupId,
    pub paid_by: UserId,
    pub amount: Money,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Logical deletion; deleted expenses are invisible to every read view.
    pub is_deleted: bool,
}

/// One user's owed share of one expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitRecord {
    pub expense_id: ExpenseId,
    pub user_id: UserId,
    pub amount: Money,
}

/// An expense together with its full split set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseEntry {
    pub expense: ExpenseRecord,
    pub splits: Vec<SplitRecord>,
}

/// A raw per-user amount from the row source (e.g. one `SUM .. GROUP BY` row).
///
/// The amount is an unrounded decimal; the aggregator rounds once, after
/// netting. A user may appear in several rows.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct UserAmount {
    pub user_id: UserId,
    pub amount: Decimal,
}

impl UserAmount {
    pub fn new(user_id: UserId, amount: Decimal) -> Self {
        Self { user_id, amount }
    }
}
