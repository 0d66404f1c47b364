//! Group aggregate: multi-owner collections.
//!
//! Groups carry a root and a role table but no ledger actions yet; the
//! action codes are reserved and the handlers are not wired up. The
//! governance rules below are what those handlers will enforce.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::root::Root;
use crate::Hash;

/// Member privilege levels, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    /// Read-only access.
    Guest,
    /// May modify files.
    Developer,
    /// May modify files and membership below owner level.
    Maintainer,
    /// Full control.
    Owner,
}

/// A multi-owner collection with its own root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Group name (part of the group's address).
    pub name: String,
    /// The member with final authority over owners.
    pub leader: Hash,
    /// Member roles by member key.
    pub members: BTreeMap<Hash, Role>,
    /// The group's trees and key registry.
    pub root: Root,
}

impl Group {
    /// Construct a group whose leader is its first owner.
    pub fn new(name: &str, leader: &str) -> Self {
        let mut members = BTreeMap::new();
        members.insert(leader.to_string(), Role::Owner);
        Self {
            name: name.to_string(),
            leader: leader.to_string(),
            members,
            root: Root::new(),
        }
    }

    /// Hand leadership to another member. Only the leader may do this.
    pub fn update_leader(&mut self, user: &str, new_leader: &str) -> bool {
        if user != self.leader {
            return false;
        }
        self.leader = new_leader.to_string();
        true
    }

    /// Change a member's role.
    ///
    /// Only owners may change roles, and demoting another owner is
    /// reserved to the leader.
    pub fn update_member_role(&mut self, user: &str, member: &str, role: Role) -> bool {
        if self.members.get(user) != Some(&Role::Owner) {
            return false;
        }
        if self.members.get(member) == Some(&Role::Owner) && self.leader != user {
            return false;
        }
        self.members.insert(member.to_string(), role);
        true
    }

    /// Remove a member, with the same authority rules as role changes.
    pub fn remove_member(&mut self, user: &str, member: &str) -> bool {
        if self.members.get(user) != Some(&Role::Owner) {
            return false;
        }
        if self.members.get(member) == Some(&Role::Owner) && self.leader != user {
            return false;
        }
        self.members.remove(member).is_some()
    }
}
