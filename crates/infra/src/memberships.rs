//! In-memory group membership.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use splitledger_core::{GroupId, UserId};
use splitledger_settlement::MembershipLookup;

#[derive(Debug, Default)]
pub struct InMemoryMemberships {
    inner: RwLock<HashMap<GroupId, HashSet<UserId>>>,
}

impl InMemoryMemberships {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `user_id` to `group_id`; returns `false` if already a member.
    pub fn add_member(&self, group_id: GroupId, user_id: UserId) -> bool {
        match self.inner.write() {
            Ok(mut groups) => groups.entry(group_id).or_default().insert(user_id),
            Err(_) => false,
        }
    }

    /// Removes `user_id` from `group_id`; returns `false` if not a member.
    ///
    /// Existing expenses are untouched: membership is only checked when an
    /// expense is created or edited.
    pub fn remove_member(&self, group_id: GroupId, user_id: UserId) -> bool {
        match self.inner.write() {
            Ok(mut groups) => groups
                .get_mut(&group_id)
                .is_some_and(|members| members.remove(&user_id)),
            Err(_) => false,
        }
    }

    /// Members of `group_id`, sorted by id.
    pub fn members(&self, group_id: GroupId) -> Vec<UserId> {
        let groups = match self.inner.read() {
            Ok(g) => g,
            Err(_) => return vec![],
        };
        let mut members: Vec<UserId> = groups
            .get(&group_id)
            .map(|m| m.iter().copied().collect())
            .unwrap_or_default();
        members.sort();
        members
    }
}

impl MembershipLookup for InMemoryMemberships {
    fn is_member(&self, group_id: GroupId, user_id: UserId) -> bool {
        self.inner
            .read()
            .map(|groups| groups.get(&group_id).is_some_and(|m| m.contains(&user_id)))
            .unwrap_or(false)
    }

    fn members_of(&self, group_id: GroupId, user_ids: &[UserId]) -> HashSet<UserId> {
        let groups = match self.inner.read() {
            Ok(g) => g,
            Err(_) => return HashSet::new(),
        };
        let Some(members) = groups.get(&group_id) else {
            return HashSet::new();
        };
        user_ids
            .iter()
            .filter(|id| members.contains(id))
            .copied()
            .collect()
    }
}
