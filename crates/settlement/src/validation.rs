//! Split validation for proposed (new or edited) expenses.
//!
//! The checks run in a fixed order and the first failure wins:
//!
//! 1. payer is a member of the group
//! 2. the split list is not empty
//! 3. no user appears twice
//! 4. every split amount is strictly positive
//! 5. split amounts sum **exactly** to the total
//! 6. every split user is a member of the group
//!
//! An edit replaces the whole split set, so it goes through the same checks
//! with the new proposal; the previous state of the expense is irrelevant.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use splitledger_core::{GroupId, Money, UserId};

use crate::source::MembershipLookup;

/// One proposed share of an expense.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitLine {
    pub user_id: UserId,
    pub amount: Money,
}

impl SplitLine {
    pub fn new(user_id: UserId, amount: Money) -> Self {
        Self { user_id, amount }
    }
}

/// Expense data submitted for creation or as a full replacement on edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseProposal {
    pub group_id: GroupId,
    pub total: Money,
    pub description: Option<String>,
    pub splits: Vec<SplitLine>,
}

impl ExpenseProposal {
    pub fn new(group_id: GroupId, total: Money) -> Self {
        Self {
            group_id,
            total,
            description: None,
            splits: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_split(mut self, user_id: UserId, amount: Money) -> Self {
        self.splits.push(SplitLine::new(user_id, amount));
        self
    }

    /// Description trimmed, with blank text treated as absent.
    pub fn normalized_description(&self) -> Option<String> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
    }
}

/// Verdict of a successful validation. Carries no side effect; the caller
/// persists the expense.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Accepted;

/// Discriminant of [`SplitValidationError`], for callers mapping to transport
/// responses.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    NotAMember,
    EmptySplits,
    DuplicateSplitUser,
    NonPositiveSplit,
    SplitSumMismatch,
    SplitUserNotMember,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SplitValidationError {
    #[error("payer {payer} is not a member of group {group_id}")]
    NotAMember { payer: UserId, group_id: GroupId },

    #[error("expense must have at least one split")]
    EmptySplits,

    #[error("user {user_id} appears more than once in the splits")]
    DuplicateSplitUser { user_id: UserId },

    #[error("split amount for user {user_id} must be positive, got {amount}")]
    NonPositiveSplit { user_id: UserId, amount: Money },

    /// `actual` is `None` when the split sum overflows.
    #[error("split amounts must sum to {expected}, got {}", display_sum(.actual))]
    SplitSumMismatch { expected: Money, actual: Option<Money> },

    #[error("{} split user(s) are not members of group {group_id}", .users.len())]
    SplitUserNotMember { group_id: GroupId, users: Vec<UserId> },
}

fn display_sum(actual: &Option<Money>) -> String {
    match actual {
        Some(sum) => sum.to_string(),
        None => "an overflowing sum".to_string(),
    }
}

impl SplitValidationError {
    pub fn kind(&self) -> ValidationErrorKind {
        match self {
            Self::NotAMember { .. } => ValidationErrorKind::NotAMember,
            Self::EmptySplits => ValidationErrorKind::EmptySplits,
            Self::DuplicateSplitUser { .. } => ValidationErrorKind::DuplicateSplitUser,
            Self::NonPositiveSplit { .. } => ValidationErrorKind::NonPositiveSplit,
            Self::SplitSumMismatch { .. } => ValidationErrorKind::SplitSumMismatch,
            Self::SplitUserNotMember { .. } => ValidationErrorKind::SplitUserNotMember,
        }
    }
}

/// Validates `proposal` as paid by `payer`.
pub fn validate_split<M>(
    membership: &M,
    proposal: &ExpenseProposal,
    payer: UserId,
) -> Result<Accepted, SplitValidationError>
where
    M: MembershipLookup + ?Sized,
{
    let verdict = check(membership, proposal, payer);
    if let Err(err) = &verdict {
        tracing::debug!(
            group_id = %proposal.group_id,
            payer = %payer,
            kind = ?err.kind(),
            "expense proposal rejected"
        );
    }
    verdict
}

fn check<M>(
    membership: &M,
    proposal: &ExpenseProposal,
    payer: UserId,
) -> Result<Accepted, SplitValidationError>
where
    M: MembershipLookup + ?Sized,
{
    let group_id = proposal.group_id;

    if !membership.is_member(group_id, payer) {
        return Err(SplitValidationError::NotAMember { payer, group_id });
    }

    if proposal.splits.is_empty() {
        return Err(SplitValidationError::EmptySplits);
    }

    let mut seen = HashSet::with_capacity(proposal.splits.len());
    for line in &proposal.splits {
        if !seen.insert(line.user_id) {
            return Err(SplitValidationError::DuplicateSplitUser {
                user_id: line.user_id,
            });
        }
    }

    if let Some(line) = proposal.splits.iter().find(|l| !l.amount.is_positive()) {
        return Err(SplitValidationError::NonPositiveSplit {
            user_id: line.user_id,
            amount: line.amount,
        });
    }

    let sum = proposal
        .splits
        .iter()
        .try_fold(Money::ZERO, |acc, line| acc.checked_add(line.amount));
    if sum != Some(proposal.total) {
        return Err(SplitValidationError::SplitSumMismatch {
            expected: proposal.total,
            actual: sum,
        });
    }

    let user_ids: Vec<UserId> = proposal.splits.iter().map(|l| l.user_id).collect();
    let members = membership.members_of(group_id, &user_ids);
    let outsiders: Vec<UserId> = user_ids
        .into_iter()
        .filter(|id| !members.contains(id))
        .collect();
    if !outsiders.is_empty() {
        return Err(SplitValidationError::SplitUserNotMember {
            group_id,
            users: outsiders,
        });
    }

    Ok(Accepted)
}
