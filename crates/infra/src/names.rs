//! In-memory user directory for display names.

use std::collections::HashMap;
use std::sync::RwLock;

use splitledger_core::UserId;
use splitledger_settlement::NameLookup;

#[derive(Debug, Default)]
pub struct InMemoryNames {
    inner: RwLock<HashMap<UserId, String>>,
}

impl InMemoryNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_name(&self, user_id: UserId, name: impl Into<String>) {
        if let Ok(mut names) = self.inner.write() {
            names.insert(user_id, name.into());
        }
    }
}

impl NameLookup for InMemoryNames {
    fn display_name(&self, user_id: UserId) -> Option<String> {
        let names = self.inner.read().ok()?;
        names.get(&user_id).cloned()
    }
}
