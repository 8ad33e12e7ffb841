//! Greedy debt simplification.
//!
//! Creditors and debtors are each sorted by amount (largest first, ties by
//! ascending user id). The head debtor pays the head creditor the smaller of
//! the two amounts; whoever reaches zero is dropped, and a partially settled
//! party stays at the head for the next step. Every step retires at least one
//! party, so the plan has at most `n - 1` transfers and the loop always
//! terminates.
//!
//! If the input does not sum to zero the leftover cannot be matched. It is
//! returned as [`SettlementPlan::residue`] instead of being spread around.

use serde::{Deserialize, Serialize};

use splitledger_core::{Money, UserId};

use crate::balances::NetBalanceMap;
use crate::policy::SettlementPolicy;

/// A proposed payment from a debtor to a creditor. `amount` is always positive.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub from: UserId,
    pub to: UserId,
    pub amount: Money,
}

/// Output of [`plan_settlement`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementPlan {
    pub transfers: Vec<Transfer>,
    /// Unmatched remainder: positive when creditors are left unpaid, negative
    /// when debtors are left owing. Zero for balanced input.
    pub residue: Money,
}

/// Transfer list settling `net`.
pub fn simplify(net: &NetBalanceMap) -> Vec<Transfer> {
    plan_settlement(net, &SettlementPolicy::default()).transfers
}

/// Settlement plan for `net`, warning when the residue exceeds the policy's
/// tolerance.
pub fn plan_settlement(net: &NetBalanceMap, policy: &SettlementPolicy) -> SettlementPlan {
    let mut creditors: Vec<(UserId, Money)> = Vec::new();
    let mut debtors: Vec<(UserId, Money)> = Vec::new();
    for (user_id, balance) in net.iter() {
        if balance.is_positive() {
            creditors.push((user_id, balance));
        } else if balance.is_negative() {
            debtors.push((user_id, -balance));
        }
    }

    let by_amount_desc = |a: &(UserId, Money), b: &(UserId, Money)| {
        b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0))
    };
    creditors.sort_by(by_amount_desc);
    debtors.sort_by(by_amount_desc);

    let mut transfers = Vec::with_capacity(creditors.len() + debtors.len());
    let (mut ci, mut di) = (0, 0);
    while ci < creditors.len() && di < debtors.len() {
        let (creditor, credit) = creditors[ci];
        let (debtor, debt) = debtors[di];
        let amount = Money::round(credit.min(debt).amount());

        transfers.push(Transfer {
            from: debtor,
            to: creditor,
            amount,
        });

        creditors[ci].1 = credit - amount;
        debtors[di].1 = debt - amount;
        if creditors[ci].1.is_zero() {
            ci += 1;
        }
        if debtors[di].1.is_zero() {
            di += 1;
        }
    }

    let unpaid: Money = creditors[ci..].iter().map(|(_, m)| *m).sum();
    let owing: Money = debtors[di..].iter().map(|(_, m)| *m).sum();
    let residue = unpaid - owing;

    if residue.abs() > policy.residue_tolerance {
        tracing::warn!(
            %residue,
            tolerance = %policy.residue_tolerance,
            "net balances do not sum to zero; settlement plan leaves a residue"
        );
    }
    tracing::debug!(transfers = transfers.len(), %residue, "settlement plan computed");

    SettlementPlan { transfers, residue }
}
