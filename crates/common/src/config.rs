use serde::{Deserialize, Serialize};

use crate::security::{Permission, SidSet};

pub const DEFAULT_ADMIN_ROLE: &str = "ROLE_ADMIN";

/// Knobs for a permission resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// capability a node must effectively carry to be visible
    #[serde(default = "default_required_permission")]
    pub required_permission: Permission,
    /// identities holding this role see everything with the full mask,
    ///  no lookups are made for them. `None` or an empty name disables it
    #[serde(default = "default_admin_role")]
    pub admin_role: Option<String>,
    /// treat an entity's owner as holding an own grant of every capability on it
    #[serde(default = "default_owner_grants_all")]
    pub owner_grants_all: bool,
}

fn default_required_permission() -> Permission {
    Permission::Read
}

fn default_admin_role() -> Option<String> {
    Some(DEFAULT_ADMIN_ROLE.to_string())
}

fn default_owner_grants_all() -> bool {
    true
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            required_permission: default_required_permission(),
            admin_role: default_admin_role(),
            owner_grants_all: default_owner_grants_all(),
        }
    }
}

impl ResolverConfig {
    /// Whether `sids` holds the configured administrator role
    pub fn is_admin(&self, sids: &SidSet) -> bool {
        self.admin_role
            .as_deref()
            .is_some_and(|role| !role.is_empty() && sids.has_role(role))
    }
}
