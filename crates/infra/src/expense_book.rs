//! In-memory expense book: the expense-management collaborator.
//!
//! Accepts validated expenses and serves them back to the engine through
//! [`LedgerSource`] and [`ExpenseHistory`]. An expense and its splits are
//! always written under the same write lock, so readers never observe an
//! expense with only some of its splits.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use thiserror::Error;

use splitledger_core::{ExpenseId, GroupId, UserId};
use splitledger_settlement::{
    ExpenseEntry, ExpenseHistory, ExpenseProposal, ExpenseRecord, LedgerSource, MembershipLookup,
    Scope, SplitRecord, SplitValidationError, UserAmount, validate_split,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExpenseBookError {
    #[error(transparent)]
    Validation(#[from] SplitValidationError),

    #[error("expense {0} not found")]
    NotFound(ExpenseId),

    /// Only the payer may edit or delete an expense.
    #[error("user {actor} may not modify expense {expense_id}")]
    Forbidden { expense_id: ExpenseId, actor: UserId },

    /// Reads of a group's expenses are restricted to its members.
    #[error("user {actor} is not a member of group {group_id}")]
    Unauthorized { group_id: GroupId, actor: UserId },

    #[error("expense book lock poisoned")]
    Poisoned,
}

#[derive(Debug, Default)]
struct BookState {
    expenses: BTreeMap<ExpenseId, ExpenseRecord>,
    splits: HashMap<ExpenseId, Vec<SplitRecord>>,
}

impl BookState {
    fn live(&self, scope: Scope) -> impl Iterator<Item = &ExpenseRecord> {
        self.expenses
            .values()
            .filter(move |e| !e.is_deleted && scope.includes(e.group_id))
    }

    fn live_entries<F>(&self, keep: F) -> Vec<ExpenseEntry>
    where
        F: Fn(&ExpenseRecord) -> bool,
    {
        self.live(Scope::Global)
            .filter(|e| keep(*e))
            .map(|e| self.entry(e))
            .collect()
    }

    fn involves(&self, expense: &ExpenseRecord, user_id: UserId) -> bool {
        expense.paid_by == user_id
            || self
                .splits
                .get(&expense.id)
                .is_some_and(|splits| splits.iter().any(|s| s.user_id == user_id))
    }

    fn entry(&self, expense: &ExpenseRecord) -> ExpenseEntry {
        ExpenseEntry {
            expense: expense.clone(),
            splits: self.splits.get(&expense.id).cloned().unwrap_or_default(),
        }
    }

    /// Existing, non-deleted expense that `actor` is allowed to modify.
    fn owned_mut(
        &mut self,
        expense_id: ExpenseId,
        actor: UserId,
    ) -> Result<&mut ExpenseRecord, ExpenseBookError> {
        let expense = self
            .expenses
            .get_mut(&expense_id)
            .filter(|e| !e.is_deleted)
            .ok_or(ExpenseBookError::NotFound(expense_id))?;
        if expense.paid_by != actor {
            return Err(ExpenseBookError::Forbidden { expense_id, actor });
        }
        Ok(expense)
    }
}

fn newest_first(entries: &mut [ExpenseEntry]) {
    entries.sort_by(|a, b| {
        (b.expense.created_at, b.expense.id).cmp(&(a.expense.created_at, a.expense.id))
    });
}

fn split_records(expense_id: ExpenseId, proposal: &ExpenseProposal) -> Vec<SplitRecord> {
    proposal
        .splits
        .iter()
        .map(|line| SplitRecord {
            expense_id,
            user_id: line.user_id,
            amount: line.amount,
        })
        .collect()
}

#[derive(Debug, Default)]
pub struct InMemoryLedger {
    inner: RwLock<BookState>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and stores a new expense paid by `payer`.
    pub fn create_expense<M>(
        &self,
        membership: &M,
        proposal: &ExpenseProposal,
        payer: UserId,
    ) -> Result<ExpenseId, ExpenseBookError>
    where
        M: MembershipLookup + ?Sized,
    {
        self.create_expense_at(membership, proposal, payer, Utc::now())
    }

    /// [`InMemoryLedger::create_expense`] with an explicit creation time.
    pub fn create_expense_at<M>(
        &self,
        membership: &M,
        proposal: &ExpenseProposal,
        payer: UserId,
        created_at: DateTime<Utc>,
    ) -> Result<ExpenseId, ExpenseBookError>
    where
        M: MembershipLookup + ?Sized,
    {
        let mut state = self.inner.write().map_err(|_| ExpenseBookError::Poisoned)?;
        validate_split(membership, proposal, payer)?;

        let id = ExpenseId::new();
        let record = ExpenseRecord {
            id,
            group_id: proposal.group_id,
            paid_by: payer,
            amount: proposal.total,
            description: proposal.normalized_description(),
            created_at,
            is_deleted: false,
        };
        state.splits.insert(id, split_records(id, proposal));
        state.expenses.insert(id, record);

        tracing::info!(
            expense_id = %id,
            group_id = %proposal.group_id,
            payer = %payer,
            amount = %proposal.total,
            "expense created"
        );
        Ok(id)
    }

    /// Replaces amount, description and the full split set of an expense.
    ///
    /// The expense keeps its group; `proposal.group_id` is ignored. The new
    /// split set is validated as if the expense were created again by `actor`.
    pub fn edit_expense<M>(
        &self,
        membership: &M,
        expense_id: ExpenseId,
        proposal: &ExpenseProposal,
        actor: UserId,
    ) -> Result<(), ExpenseBookError>
    where
        M: MembershipLookup + ?Sized,
    {
        let mut state = self.inner.write().map_err(|_| ExpenseBookError::Poisoned)?;
        let expense = state.owned_mut(expense_id, actor)?;

        let proposal = ExpenseProposal {
            group_id: expense.group_id,
            ..proposal.clone()
        };
        validate_split(membership, &proposal, actor)?;

        expense.amount = proposal.total;
        expense.description = proposal.normalized_description();
        state.splits.insert(expense_id, split_records(expense_id, &proposal));

        tracing::info!(expense_id = %expense_id, amount = %proposal.total, "expense edited");
        Ok(())
    }

    /// Soft-deletes an expense; it disappears from balances and statements.
    pub fn delete_expense(
        &self,
        expense_id: ExpenseId,
        actor: UserId,
    ) -> Result<(), ExpenseBookError> {
        let mut state = self.inner.write().map_err(|_| ExpenseBookError::Poisoned)?;
        let expense = state.owned_mut(expense_id, actor)?;
        expense.is_deleted = true;

        tracing::info!(expense_id = %expense_id, "expense deleted");
        Ok(())
    }

    /// The expense and its splits, including deleted ones.
    pub fn expense(&self, expense_id: ExpenseId) -> Option<ExpenseEntry> {
        let state = self.inner.read().ok()?;
        state.expenses.get(&expense_id).map(|e| state.entry(e))
    }

    /// A live expense as seen by `actor`, who must belong to its group.
    /// Splits are ordered by user id.
    pub fn expense_for<M>(
        &self,
        membership: &M,
        expense_id: ExpenseId,
        actor: UserId,
    ) -> Result<ExpenseEntry, ExpenseBookError>
    where
        M: MembershipLookup + ?Sized,
    {
        let state = self.inner.read().map_err(|_| ExpenseBookError::Poisoned)?;
        let expense = state
            .expenses
            .get(&expense_id)
            .filter(|e| !e.is_deleted)
            .ok_or(ExpenseBookError::NotFound(expense_id))?;
        if !membership.is_member(expense.group_id, actor) {
            return Err(ExpenseBookError::Unauthorized {
                group_id: expense.group_id,
                actor,
            });
        }

        let mut entry = state.entry(expense);
        entry.splits.sort_by_key(|s| s.user_id);
        Ok(entry)
    }

    /// Live expenses of `group_id`, oldest first. `actor` must be a member.
    pub fn group_expenses<M>(
        &self,
        membership: &M,
        group_id: GroupId,
        actor: UserId,
    ) -> Result<Vec<ExpenseEntry>, ExpenseBookError>
    where
        M: MembershipLookup + ?Sized,
    {
        if !membership.is_member(group_id, actor) {
            return Err(ExpenseBookError::Unauthorized { group_id, actor });
        }
        let state = self.inner.read().map_err(|_| ExpenseBookError::Poisoned)?;
        let mut entries = state.live_entries(|e| e.group_id == group_id);
        entries.sort_by_key(|entry| (entry.expense.created_at, entry.expense.id));
        Ok(entries)
    }

    /// Live expenses paid by `user_id`, newest first.
    pub fn expenses_paid_by(&self, user_id: UserId) -> Vec<ExpenseEntry> {
        let Ok(state) = self.inner.read() else {
            return vec![];
        };
        let mut entries = state.live_entries(|e| e.paid_by == user_id);
        newest_first(&mut entries);
        entries
    }

    /// Live expenses `user_id` paid or has a split in, newest first. Each
    /// expense appears once.
    pub fn expenses_involving(&self, user_id: UserId) -> Vec<ExpenseEntry> {
        let Ok(state) = self.inner.read() else {
            return vec![];
        };
        let mut entries = state.live_entries(|e| state.involves(e, user_id));
        newest_first(&mut entries);
        entries
    }
}

impl LedgerSource for InMemoryLedger {
    fn paid_totals(&self, scope: Scope) -> Vec<UserAmount> {
        let state = match self.inner.read() {
            Ok(s) => s,
            Err(_) => return vec![],
        };
        state
            .live(scope)
            .map(|e| UserAmount::new(e.paid_by, e.amount.amount()))
            .collect()
    }

    fn owed_totals(&self, scope: Scope) -> Vec<UserAmount> {
        let state = match self.inner.read() {
            Ok(s) => s,
            Err(_) => return vec![],
        };
        state
            .live(scope)
            .flat_map(|e| state.splits.get(&e.id).into_iter().flatten())
            .map(|s| UserAmount::new(s.user_id, s.amount.amount()))
            .collect()
    }
}

impl ExpenseHistory for InMemoryLedger {
    fn entries_involving(&self, user_id: UserId) -> Vec<ExpenseEntry> {
        let state = match self.inner.read() {
            Ok(s) => s,
            Err(_) => return vec![],
        };
        state
            .expenses
            .values()
            .filter(|e| state.involves(e, user_id))
            .map(|e| state.entry(e))
            .collect()
    }
}
