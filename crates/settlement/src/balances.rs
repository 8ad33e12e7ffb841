//! Balance aggregation: expense/split rows → per-user net balances.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use splitledger_core::{Money, UserId};

use crate::policy::SettlementPolicy;
use crate::records::{Scope, UserAmount};
use crate::source::LedgerSource;

/// Signed net balance per user: positive = is owed money, negative = owes.
///
/// Derived view, rebuilt on every query. Ordered by user id so iteration (and
/// anything built from it) is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetBalanceMap(BTreeMap<UserId, Money>);

impl NetBalanceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, user_id: UserId, balance: Money) -> Option<Money> {
        self.0.insert(user_id, balance)
    }

    pub fn get(&self, user_id: &UserId) -> Option<Money> {
        self.0.get(user_id).copied()
    }

    /// Balance of `user_id`, zero when the user has no activity.
    pub fn balance_of(&self, user_id: &UserId) -> Money {
        self.get(user_id).unwrap_or(Money::ZERO)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (UserId, Money)> + '_ {
        self.0.iter().map(|(id, m)| (*id, *m))
    }

    /// Sum of all balances; zero for any consistent expense population.
    pub fn total(&self) -> Money {
        self.0.values().sum()
    }

    /// Copy without the users `policy` considers settled.
    pub fn without_settled(&self, policy: &SettlementPolicy) -> NetBalanceMap {
        self.iter().filter(|(_, m)| !policy.is_settled(*m)).collect()
    }
}

impl FromIterator<(UserId, Money)> for NetBalanceMap {
    fn from_iter<I: IntoIterator<Item = (UserId, Money)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for NetBalanceMap {
    type Item = (UserId, Money);
    type IntoIter = std::collections::btree_map::IntoIter<UserId, Money>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

fn totals_by_user(rows: Vec<UserAmount>) -> HashMap<UserId, Decimal> {
    let mut totals: HashMap<UserId, Decimal> = HashMap::new();
    for row in rows {
        *totals.entry(row.user_id).or_default() += row.amount;
    }
    totals
}

/// Net balance of every user with activity in `scope`.
///
/// `net = round(paid - owed)`, computed on the union of payers and split
/// owners. Users whose net is exactly zero are kept; filtering is left to
/// the caller.
pub fn aggregate_net_balances<S>(source: &S, scope: Scope) -> NetBalanceMap
where
    S: LedgerSource + ?Sized,
{
    let paid = totals_by_user(source.paid_totals(scope));
    let owed = totals_by_user(source.owed_totals(scope));

    let users: BTreeSet<UserId> = paid.keys().chain(owed.keys()).copied().collect();
    let net: NetBalanceMap = users
        .into_iter()
        .map(|user_id| {
            let p = paid.get(&user_id).copied().unwrap_or_default();
            let o = owed.get(&user_id).copied().unwrap_or_default();
            (user_id, Money::round(p - o))
        })
        .collect();

    tracing::debug!(?scope, users = net.len(), "aggregated net balances");
    net
}

/// Net balance of a single user in `scope`.
pub fn user_net_balance<S>(source: &S, scope: Scope, user_id: UserId) -> Money
where
    S: LedgerSource + ?Sized,
{
    aggregate_net_balances(source, scope).balance_of(&user_id)
}

/// Global net balances with settled users removed.
pub fn overall_balances<S>(source: &S, policy: &SettlementPolicy) -> NetBalanceMap
where
    S: LedgerSource + ?Sized,
{
    aggregate_net_balances(source, Scope::Global).without_settled(policy)
}
