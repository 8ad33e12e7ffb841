//! Read capabilities the engine consumes from its collaborators.
//!
//! Implementations are expected to return a consistent snapshot: an expense
//! is either visible with all of its splits or not at all.

use std::collections::HashSet;
use std::sync::Arc;

use splitledger_core::{GroupId, UserId};

use crate::records::{ExpenseEntry, Scope, UserAmount};

/// Group membership lookup.
pub trait MembershipLookup: Send + Sync {
    /// Whether `user_id` is currently a member of `group_id`.
    fn is_member(&self, group_id: GroupId, user_id: UserId) -> bool;

    /// The subset of `user_ids` that are current members of `group_id`.
    fn members_of(&self, group_id: GroupId, user_ids: &[UserId]) -> HashSet<UserId>;
}

/// Paid and owed totals over non-deleted expenses.
pub trait LedgerSource: Send + Sync {
    /// Amounts of non-deleted expenses in scope, attributed to their payer.
    fn paid_totals(&self, scope: Scope) -> Vec<UserAmount>;

    /// Split amounts of non-deleted expenses in scope, attributed to their owner.
    fn owed_totals(&self, scope: Scope) -> Vec<UserAmount>;
}

/// Expense history for per-user statements.
pub trait ExpenseHistory: Send + Sync {
    /// Entries where `user_id` is the payer or owns a split.
    ///
    /// May include deleted expenses; statement builders filter them.
    fn entries_involving(&self, user_id: UserId) -> Vec<ExpenseEntry>;
}

/// Display names for presentation.
pub trait NameLookup: Send + Sync {
    fn display_name(&self, user_id: UserId) -> Option<String>;
}

impl<S> MembershipLookup for Arc<S>
where
    S: MembershipLookup + ?Sized,
{
    fn is_member(&self, group_id: GroupId, user_id: UserId) -> bool {
        (**self).is_member(group_id, user_id)
    }

    fn members_of(&self, group_id: GroupId, user_ids: &[UserId]) -> HashSet<UserId> {
        (**self).members_of(group_id, user_ids)
    }
}

impl<S> LedgerSource for Arc<S>
where
    S: LedgerSource + ?Sized,
{
    fn paid_totals(&self, scope: Scope) -> Vec<UserAmount> {
        (**self).paid_totals(scope)
    }

    fn owed_totals(&self, scope: Scope) -> Vec<UserAmount> {
        (**self).owed_totals(scope)
    }
}

impl<S> ExpenseHistory for Arc<S>
where
    S: ExpenseHistory + ?Sized,
{
    fn entries_involving(&self, user_id: UserId) -> Vec<ExpenseEntry> {
        (**self).entries_involving(user_id)
    }
}

impl<S> NameLookup for Arc<S>
where
    S: NameLookup + ?Sized,
{
    fn display_name(&self, user_id: UserId) -> Option<String> {
        (**self).display_name(user_id)
    }
}
