//! Settlement report: the engine's hand-off to presentation layers.

use serde::{Deserialize, Serialize};

use splitledger_core::{Money, UserId};

use crate::balances::{NetBalanceMap, aggregate_net_balances};
use crate::policy::SettlementPolicy;
use crate::records::Scope;
use crate::simplify::plan_settlement;
use crate::source::{LedgerSource, NameLookup};

/// One transfer with display names attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementLine {
    pub from_id: UserId,
    pub from_name: Option<String>,
    pub to_id: UserId,
    pub to_name: Option<String>,
    pub amount: Money,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementReport {
    /// Unsettled balances the plan was computed from (empty when nothing is
    /// owed).
    pub net: NetBalanceMap,
    pub settlements: Vec<SettlementLine>,
    pub residue: Money,
}

/// Aggregates `scope`, drops settled users, simplifies and attaches names.
pub fn settlement_report<S, N>(
    source: &S,
    names: &N,
    scope: Scope,
    policy: &SettlementPolicy,
) -> SettlementReport
where
    S: LedgerSource + ?Sized,
    N: NameLookup + ?Sized,
{
    let net = aggregate_net_balances(source, scope).without_settled(policy);
    let plan = plan_settlement(&net, policy);

    if plan.transfers.is_empty() {
        return SettlementReport {
            residue: plan.residue,
            ..SettlementReport::default()
        };
    }

    let settlements = plan
        .transfers
        .iter()
        .map(|t| SettlementLine {
            from_id: t.from,
            from_name: names.display_name(t.from),
            to_id: t.to,
            to_name: names.display_name(t.to),
            amount: t.amount,
        })
        .collect();

    SettlementReport {
        net,
        settlements,
        residue: plan.residue,
    }
}
