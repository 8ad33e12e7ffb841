//! Integration tests for the full settlement pipeline.
//!
//! Tests: proposal → validation → expense book → aggregation → simplification
//! → report / statements
//!
//! Verifies:
//! - Only validated expenses reach the balances
//! - Group scoping and soft deletion are honored end to end
//! - Settlement plans zero out every balance

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;
    use uuid::Uuid;

    use splitledger_core::{GroupId, Money, UserId};
    use splitledger_settlement::{
        ExpenseProposal, Scope, SettlementPolicy, aggregate_net_balances, credit_statement,
        debt_statement, overall_balances, settlement_report, simplify, user_net_balance,
    };

    use crate::config::EngineConfig;
    use crate::expense_book::InMemoryLedger;
    use crate::memberships::InMemoryMemberships;
    use crate::names::InMemoryNames;

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    fn user(n: u128) -> UserId {
        UserId::from_uuid(Uuid::from_u128(n))
    }

    struct World {
        book: Arc<InMemoryLedger>,
        members: Arc<InMemoryMemberships>,
        names: Arc<InMemoryNames>,
        trip: GroupId,
        flat: GroupId,
    }

    /// Two groups: "trip" with users 1..=3, "flat" with users 1 and 4.
    fn world() -> World {
        let members = Arc::new(InMemoryMemberships::new());
        let names = Arc::new(InMemoryNames::new());
        let trip = GroupId::from_uuid(Uuid::from_u128(10));
        let flat = GroupId::from_uuid(Uuid::from_u128(20));

        for (n, name) in [(1, "Asha"), (2, "Bo"), (3, "Chidi"), (4, "Dana")] {
            names.set_name(user(n), name);
        }
        for n in 1..=3 {
            members.add_member(trip, user(n));
        }
        members.add_member(flat, user(1));
        members.add_member(flat, user(4));

        World {
            book: Arc::new(InMemoryLedger::new()),
            members,
            names,
            trip,
            flat,
        }
    }

    #[test]
    fn trip_expenses_settle_to_zero() {
        let w = world();

        // Asha pays 100.00 for dinner split in uneven thirds.
        let dinner = ExpenseProposal::new(w.trip, money("100.00"))
            .with_description("dinner")
            .with_split(user(1), money("33.33"))
            .with_split(user(2), money("33.33"))
            .with_split(user(3), money("33.34"));
        w.book.create_expense(&w.members, &dinner, user(1)).unwrap();

        // Bo pays 30.00 for a taxi shared by Bo and Chidi.
        let taxi = ExpenseProposal::new(w.trip, money("30.00"))
            .with_split(user(2), money("15.00"))
            .with_split(user(3), money("15.00"));
        w.book.create_expense(&w.members, &taxi, user(2)).unwrap();

        let net = aggregate_net_balances(&w.book, Scope::Group(w.trip));
        assert_eq!(net.balance_of(&user(1)), money("66.67"));
        assert_eq!(net.balance_of(&user(2)), money("-18.33"));
        assert_eq!(net.balance_of(&user(3)), money("-48.34"));
        assert_eq!(net.total(), Money::ZERO);

        let transfers = simplify(&net);
        let legs: Vec<(UserId, UserId, Money)> =
            transfers.iter().map(|t| (t.from, t.to, t.amount)).collect();
        assert_eq!(
            legs,
            vec![
                (user(3), user(1), money("48.34")),
                (user(2), user(1), money("18.33")),
            ]
        );
    }

    #[test]
    fn invalid_proposals_never_reach_balances() {
        let w = world();

        // Dana is not in the trip group.
        let outsider = ExpenseProposal::new(w.trip, money("20.00"))
            .with_split(user(1), money("10.00"))
            .with_split(user(4), money("10.00"));
        assert!(w.book.create_expense(&w.members, &outsider, user(1)).is_err());

        // Dana cannot pay into the trip group either.
        let payer_outside =
            ExpenseProposal::new(w.trip, money("10.00")).with_split(user(1), money("10.00"));
        assert!(w.book.create_expense(&w.members, &payer_outside, user(4)).is_err());

        assert!(aggregate_net_balances(&w.book, Scope::Global).is_empty());
    }

    #[test]
    fn scopes_and_deletion_are_respected() {
        let w = world();

        let rent = ExpenseProposal::new(w.flat, money("800.00"))
            .with_split(user(1), money("400.00"))
            .with_split(user(4), money("400.00"));
        w.book.create_expense(&w.members, &rent, user(4)).unwrap();

        let snacks = ExpenseProposal::new(w.trip, money("12.00"))
            .with_split(user(1), money("6.00"))
            .with_split(user(2), money("6.00"));
        let snacks_id = w.book.create_expense(&w.members, &snacks, user(2)).unwrap();

        assert_eq!(user_net_balance(&w.book, Scope::Global, user(1)), money("-406.00"));
        assert_eq!(user_net_balance(&w.book, Scope::Group(w.flat), user(1)), money("-400.00"));

        w.book.delete_expense(snacks_id, user(2)).unwrap();
        assert_eq!(user_net_balance(&w.book, Scope::Global, user(1)), money("-400.00"));
        assert!(aggregate_net_balances(&w.book, Scope::Group(w.trip)).is_empty());
    }

    #[test]
    fn edit_changes_balances_atomically() {
        let w = world();
        let lunch = ExpenseProposal::new(w.trip, money("20.00"))
            .with_split(user(1), money("10.00"))
            .with_split(user(2), money("10.00"));
        let id = w.book.create_expense(&w.members, &lunch, user(1)).unwrap();

        let corrected = ExpenseProposal::new(w.trip, money("24.00"))
            .with_split(user(2), money("12.00"))
            .with_split(user(3), money("12.00"));
        w.book.edit_expense(&w.members, id, &corrected, user(1)).unwrap();

        let net = aggregate_net_balances(&w.book, Scope::Global);
        assert_eq!(net.balance_of(&user(1)), money("24.00"));
        assert_eq!(net.balance_of(&user(2)), money("-12.00"));
        assert_eq!(net.balance_of(&user(3)), money("-12.00"));
    }

    #[test]
    fn report_and_statements_for_presentation() {
        let w = world();
        let day = |d| Utc.with_ymd_and_hms(2026, 5, d, 9, 0, 0).unwrap();

        let hotel = ExpenseProposal::new(w.trip, money("90.00"))
            .with_description("hotel")
            .with_split(user(1), money("30.00"))
            .with_split(user(2), money("30.00"))
            .with_split(user(3), money("30.00"));
        w.book.create_expense_at(&w.members, &hotel, user(1), day(1)).unwrap();

        let museum = ExpenseProposal::new(w.trip, money("24.00"))
            .with_description("museum")
            .with_split(user(1), money("12.00"))
            .with_split(user(3), money("12.00"));
        w.book.create_expense_at(&w.members, &museum, user(3), day(2)).unwrap();

        let config = EngineConfig::default();
        config.init_logging();
        let report = settlement_report(&w.book, &w.names, Scope::Global, &config.policy);
        let names: Vec<(Option<&str>, Option<&str>, Money)> = report
            .settlements
            .iter()
            .map(|l| (l.from_name.as_deref(), l.to_name.as_deref(), l.amount))
            .collect();
        assert_eq!(
            names,
            vec![
                (Some("Bo"), Some("Asha"), money("30.00")),
                (Some("Chidi"), Some("Asha"), money("18.00")),
            ]
        );

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["settlements"][0]["amount"], "30.00");

        let debts = debt_statement(&w.book, user(1));
        assert_eq!(debts.total, money("12.00"));
        assert_eq!(debts.lines[0].description.as_deref(), Some("museum"));

        let credits = credit_statement(&w.book, user(1));
        assert_eq!(credits.total, money("60.00"));
        assert_eq!(credits.lines.len(), 2);

        let overall = overall_balances(&w.book, &SettlementPolicy::default());
        assert_eq!(overall.len(), 3);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            ..ProptestConfig::default()
        })]

        /// Property: any sequence of accepted expenses yields balances that
        /// sum to zero and a plan that zeroes every balance.
        #[test]
        fn accepted_expenses_always_settle(
            expenses in prop::collection::vec(
                (1u128..=3, prop::collection::vec(1i64..50_000i64, 3)),
                1..20,
            )
        ) {
            let w = world();
            for (payer, cents) in &expenses {
                let total: Money = cents.iter().map(|c| Money::from_cents(*c)).sum();
                let mut proposal = ExpenseProposal::new(w.trip, total);
                for (i, c) in cents.iter().enumerate() {
                    proposal = proposal.with_split(user(i as u128 + 1), Money::from_cents(*c));
                }
                prop_assert!(w.book.create_expense(&w.members, &proposal, user(*payer)).is_ok());
            }

            let net = aggregate_net_balances(&w.book, Scope::Group(w.trip));
            prop_assert_eq!(net.total(), Money::ZERO);

            let mut remaining: HashMap<UserId, Money> = net.iter().collect();
            for t in simplify(&net) {
                prop_assert!(t.amount.is_positive());
                *remaining.entry(t.from).or_default() += t.amount;
                *remaining.entry(t.to).or_default() -= t.amount;
            }
            prop_assert!(remaining.values().all(|m| m.is_zero()));
        }
    }
}
