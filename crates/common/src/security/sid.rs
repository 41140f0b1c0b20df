use std::fmt;

use serde::{Deserialize, Serialize};

/// A security identity: either a principal (user) or a group / role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Sid {
    name: String,
    #[serde(default = "default_principal")]
    principal: bool,
}

fn default_principal() -> bool {
    true
}

impl Sid {
    pub fn principal(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            principal: true,
        }
    }

    pub fn role(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            principal: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_principal(&self) -> bool {
        self.principal
    }
}

impl fmt::Display for Sid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.principal {
            write!(f, "{}", self.name)
        } else {
            write!(f, "role:{}", self.name)
        }
    }
}

/// The set of identities whose grants count for a single resolution:
///  the requesting identity itself plus every role it belongs to.
///
/// Grants are evaluated per sid and then combined, with the primary
///  identity winning ties against its roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidSet {
    primary: Sid,
    roles: Vec<Sid>,
}

impl SidSet {
    pub fn new(primary: Sid) -> Self {
        Self {
            primary,
            roles: Vec::new(),
        }
    }

    /// Add a role membership. Duplicates and the primary sid itself are ignored.
    pub fn with_role(mut self, name: impl Into<String>) -> Self {
        self.add_role(name);
        self
    }

    pub fn add_role(&mut self, name: impl Into<String>) {
        let role = Sid::role(name);
        if role != self.primary && !self.roles.contains(&role) {
            self.roles.push(role);
        }
    }

    pub fn primary(&self) -> &Sid {
        &self.primary
    }

    pub fn roles(&self) -> &[Sid] {
        &self.roles
    }

    pub fn has_role(&self, name: &str) -> bool {
        self.roles.iter().any(|role| role.name() == name)
            || (!self.primary.is_principal() && self.primary.name() == name)
    }

    /// The primary sid first, then roles in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Sid> {
        std::iter::once(&self.primary).chain(self.roles.iter())
    }

    pub fn len(&self) -> usize {
        1 + self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl From<Sid> for SidSet {
    fn from(primary: Sid) -> Self {
        Self::new(primary)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_role_dedup() {
        let sids = SidSet::new(Sid::principal("bob"))
            .with_role("ROLE_USER")
            .with_role("ROLE_USER")
            .with_role("ROLE_LAB");

        assert_eq!(sids.len(), 3);
        let names: Vec<_> = sids.iter().map(|sid| sid.to_string()).collect();
        assert_eq!(names, vec!["bob", "role:ROLE_USER", "role:ROLE_LAB"]);
        assert!(sids.has_role("ROLE_LAB"));
        assert!(!sids.has_role("bob"));
    }

    #[test]
    fn test_role_as_primary() {
        let sids = SidSet::from(Sid::role("ROLE_ADMIN")).with_role("ROLE_ADMIN");
        assert_eq!(sids.len(), 1);
        assert!(sids.has_role("ROLE_ADMIN"));
    }
}
