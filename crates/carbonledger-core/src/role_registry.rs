//! Role registry: which principals hold which capability.
//!
//! Membership checks are pure lookups. Grant and revoke are gated on the
//! admin role and are idempotent: the `bool` they return says whether
//! anything actually changed.

use std::collections::{BTreeMap, BTreeSet};

use carbonledger_types::{LedgerError, Principal, Result, Role};

/// Maps each [`Role`] to its member set.
#[derive(Debug, Clone, Default)]
pub struct RoleRegistry {
    members: BTreeMap<Role, BTreeSet<Principal>>,
}

impl RoleRegistry {
    /// Create a registry where `admin` holds both the admin and issuer roles.
    ///
    /// Without this bootstrap no one could ever grant further roles.
    #[must_use]
    pub fn bootstrap(admin: Principal) -> Self {
        let mut registry = Self::default();
        registry.insert(Role::Admin, admin);
        registry.insert(Role::Issuer, admin);
        registry
    }

    /// Rebuild a registry from stored `(role, principal)` pairs.
    pub fn from_assignments(assignments: impl IntoIterator<Item = (Role, Principal)>) -> Self {
        let mut registry = Self::default();
        for (role, principal) in assignments {
            registry.insert(role, principal);
        }
        registry
    }

    /// Whether `principal` currently holds `role`.
    #[must_use]
    pub fn has_role(&self, role: Role, principal: Principal) -> bool {
        self.members
            .get(&role)
            .is_some_and(|set| set.contains(&principal))
    }

    /// Fail with `Unauthorized` unless `principal` holds `role`.
    pub fn ensure(&self, role: Role, principal: Principal) -> Result<()> {
        if self.has_role(role, principal) {
            Ok(())
        } else {
            Err(LedgerError::Unauthorized { principal, role })
        }
    }

    /// Add `principal` to `role`. Returns `false` if it was already a member.
    ///
    /// # Errors
    /// - `Unauthorized` if `caller` is not an admin
    /// - `InvalidPrincipal` if `principal` is the nil principal
    pub fn grant(&mut self, caller: Principal, role: Role, principal: Principal) -> Result<bool> {
        self.ensure(Role::Admin, caller)?;
        if !principal.is_well_formed() {
            return Err(LedgerError::InvalidPrincipal(principal));
        }
        Ok(self.insert(role, principal))
    }

    /// Remove `principal` from `role`. Returns `false` if it was not a member.
    ///
    /// # Errors
    /// Returns `Unauthorized` if `caller` is not an admin.
    pub fn revoke(&mut self, caller: Principal, role: Role, principal: Principal) -> Result<bool> {
        self.ensure(Role::Admin, caller)?;
        Ok(self.remove(role, principal))
    }

    /// Drop the caller's own membership. Needs no role.
    pub fn renounce(&mut self, caller: Principal, role: Role) -> bool {
        self.remove(role, caller)
    }

    /// Members of `role` in ascending order.
    #[must_use]
    pub fn members_of(&self, role: Role) -> Vec<Principal> {
        self.members
            .get(&role)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Every `(role, principal)` pair, ordered by role then principal.
    pub fn assignments(&self) -> impl Iterator<Item = (Role, Principal)> + '_ {
        self.members
            .iter()
            .flat_map(|(role, set)| set.iter().map(move |p| (*role, *p)))
    }

    fn insert(&mut self, role: Role, principal: Principal) -> bool {
        self.members.entry(role).or_default().insert(principal)
    }

    fn remove(&mut self, role: Role, principal: Principal) -> bool {
        self.members
            .get_mut(&role)
            .is_some_and(|set| set.remove(&principal))
    }
}
