//! Per-user debt and credit statements.
//!
//! A debt statement lists what a user owes on expenses paid by someone else;
//! a credit statement lists what others owe on expenses the user paid. Lines
//! are newest first (`created_at` desc, then expense id desc).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use splitledger_core::{ExpenseId, GroupId, Money, UserId};

use crate::records::ExpenseEntry;
use crate::source::ExpenseHistory;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementLine {
    pub expense_id: ExpenseId,
    pub description: Option<String>,
    pub group_id: GroupId,
    /// The payer on a debt statement, the split owner on a credit statement.
    pub counterparty: UserId,
    pub amount: Money,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub total: Money,
    pub lines: Vec<StatementLine>,
}

impl Statement {
    fn from_lines(mut lines: Vec<StatementLine>) -> Self {
        lines.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.expense_id.cmp(&a.expense_id))
        });
        let total = Money::round(lines.iter().map(|l| l.amount.amount()).sum());
        Self { total, lines }
    }
}

fn line(entry: &ExpenseEntry, counterparty: UserId, amount: Money) -> StatementLine {
    StatementLine {
        expense_id: entry.expense.id,
        description: entry.expense.description.clone(),
        group_id: entry.expense.group_id,
        counterparty,
        amount,
        created_at: entry.expense.created_at,
    }
}

/// What `user_id` owes to other payers.
pub fn debt_statement<H>(history: &H, user_id: UserId) -> Statement
where
    H: ExpenseHistory + ?Sized,
{
    let lines = history
        .entries_involving(user_id)
        .iter()
        .filter(|entry| !entry.expense.is_deleted && entry.expense.paid_by != user_id)
        .flat_map(|entry| {
            entry
                .splits
                .iter()
                .filter(|s| s.user_id == user_id && s.amount.is_positive())
                .map(|s| line(entry, entry.expense.paid_by, s.amount))
                .collect::<Vec<_>>()
        })
        .collect();
    Statement::from_lines(lines)
}

/// What other users owe `user_id` on expenses they paid.
pub fn credit_statement<H>(history: &H, user_id: UserId) -> Statement
where
    H: ExpenseHistory + ?Sized,
{
    let lines = history
        .entries_involving(user_id)
        .iter()
        .filter(|entry| !entry.expense.is_deleted && entry.expense.paid_by == user_id)
        .flat_map(|entry| {
            entry
                .splits
                .iter()
                .filter(|s| s.user_id != user_id && s.amount.is_positive())
                .map(|s| line(entry, s.user_id, s.amount))
                .collect::<Vec<_>>()
        })
        .collect();
    Statement::from_lines(lines)
}
