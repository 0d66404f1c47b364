//! User aggregate: a public key, group memberships, and a [`Root`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::root::Root;
use crate::{Address, Hash};

/// A storage client owning an encrypted file hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// The key every transaction of this user must be signed with.
    pub public_key: Hash,
    /// Addresses of groups this user belongs to.
    pub groups: BTreeSet<Address>,
    /// The user's trees and key registry.
    pub root: Root,
}

impl User {
    /// Construct a fresh user with an empty root.
    pub fn new(public_key: &str) -> Self {
        Self {
            public_key: public_key.to_string(),
            groups: BTreeSet::new(),
            root: Root::new(),
        }
    }

    /// Join a group. Returns `false` if already a member.
    pub fn join_group(&mut self, group: &str) -> bool {
        self.groups.insert(group.to_string())
    }

    /// Leave a group. Returns `false` if not a member.
    pub fn leave_group(&mut self, group: &str) -> bool {
        self.groups.remove(group)
    }

    /// Whether the user belongs to `group`.
    pub fn is_in_group(&self, group: &str) -> bool {
        self.groups.contains(group)
    }
}
