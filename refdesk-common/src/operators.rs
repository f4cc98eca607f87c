//! Operator allow-list
//!
//! Operators are the identities allowed to run administrative commands. The
//! list is loaded from configuration at startup. Additions made at runtime
//! live only as long as the process: they are not written back to the config
//! file.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Chat-platform user identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// In-memory operator set, preserving insertion order for listings
#[derive(Debug, Clone, Default)]
pub struct OperatorRegistry {
    ids: Vec<UserId>,
}

impl OperatorRegistry {
    /// Build from configured ids, dropping duplicates
    pub fn new(ids: impl IntoIterator<Item = UserId>) -> Self {
        let mut registry = Self::default();
        for id in ids {
            registry.add(id);
        }
        registry
    }

    pub fn is_operator(&self, id: UserId) -> bool {
        self.ids.contains(&id)
    }

    /// Add an operator; returns `false` if it was already present
    pub fn add(&mut self, id: UserId) -> bool {
        if self.is_operator(id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    pub fn list(&self) -> &[UserId] {
        &self.ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_membership() {
        let registry = OperatorRegistry::new([UserId(1), UserId(2)]);
        assert!(registry.is_operator(UserId(1)));
        assert!(!registry.is_operator(UserId(3)));
    }

    #[test]
    fn test_registry_deduplicates() {
        let mut registry = OperatorRegistry::new([UserId(1), UserId(1)]);
        assert_eq!(registry.list(), &[UserId(1)]);
        assert!(!registry.add(UserId(1)));
        assert!(registry.add(UserId(5)));
        assert_eq!(registry.list(), &[UserId(1), UserId(5)]);
    }
}
