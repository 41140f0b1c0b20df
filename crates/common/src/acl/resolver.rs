use crate::config::ResolverConfig;
use crate::entity::{HierarchicalEntity, RemovalSet, Secured, SecuredEntity};
use crate::security::{Mask, Permission, Sid, SidSet};

use super::lookup::AclSnapshot;

/// How a node came out of resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Visible in its own right, with its effective mask
    Visible(Mask),
    /// Not visible itself, but kept (with a zero mask) because
    ///  something below it is visible
    Structural,
    /// Neither the node nor anything below it is visible
    Hidden,
}

// The own entry a sid's effective mask currently comes from, and how
//  deep in the tree it was recorded
#[derive(Debug, Clone, Copy)]
struct Entry {
    mask: Mask,
    depth: usize,
}

// Per-sid inheritance state along the path from the root to a node,
//  index-aligned with `SidSet::iter`
#[derive(Debug, Clone)]
struct Inheritance {
    depth: usize,
    entries: Vec<Option<Entry>>,
}

impl Inheritance {
    fn top(sids: usize) -> Self {
        Self {
            depth: 0,
            entries: vec![None; sids],
        }
    }
}

/**
 * Resolution
 * ==========
 * Walks a tree depth first and works out, for one identity, which
 *  nodes it may see:
 *  - every sid of the identity (principal + roles) keeps its own
 *    inheritance chain: a node's own entry replaces whatever the sid
 *    inherited, a node without one inherits its parent's unchanged
 *  - per capability, the deepest decision across sids wins; at equal
 *    depth the principal beats its roles, and among roles any grant wins
 *  - invisible leaves are removed outright
 *  - invisible nodes are removed unless something below them survived,
 *    in which case they stay with a zero mask
 * The source tree is never touched: resolution works on a copy.
 */
#[derive(Debug)]
pub struct PermissionResolver<'a> {
    sids: &'a SidSet,
    acl: &'a AclSnapshot,
    config: &'a ResolverConfig,
    admin: bool,
}

impl<'a> PermissionResolver<'a> {
    pub fn new(sids: &'a SidSet, acl: &'a AclSnapshot, config: &'a ResolverConfig) -> Self {
        Self {
            sids,
            acl,
            config,
            admin: config.is_admin(sids),
        }
    }

    /// Whether the identity bypasses access control altogether
    pub fn is_admin(&self) -> bool {
        self.admin
    }

    /// Resolve `root` for this resolver's identity.
    ///
    /// # Returns
    /// * `Some(tree)` - a pruned copy of `root` with effective masks filled in
    /// * `None` - nothing in the tree is visible, the tree should be treated as absent
    pub fn resolve<H: HierarchicalEntity>(&self, root: &H) -> Option<H> {
        let mut tree = root.clone();
        let visibility = self.resolve_node(&mut tree, &Inheritance::top(self.sids.len()));
        tracing::debug!(
            root = %tree.entity().identity(),
            ?visibility,
            "resolved tree"
        );
        match visibility {
            Visibility::Hidden => None,
            Visibility::Visible(_) | Visibility::Structural => Some(tree),
        }
    }

    fn resolve_node<H: HierarchicalEntity>(
        &self,
        node: &mut H,
        inherited: &Inheritance,
    ) -> Visibility {
        let chain = if node.is_synthetic() {
            inherited.clone()
        } else {
            self.descend(inherited, node.entity())
        };
        let own = self.effective(&chain);
        let required = self.config.required_permission;

        let mut hidden_leaves = RemovalSet::new();
        for leaf in node.leaves_mut() {
            let mask = self.effective(&self.descend(&chain, leaf));
            if mask.grants(required) {
                leaf.mask = mask;
            } else {
                tracing::trace!(leaf = %leaf.identity(), "pruning invisible leaf");
                hidden_leaves.insert(leaf.class, leaf.id);
            }
        }
        node.filter_leaves(&hidden_leaves);

        let mut hidden_children = RemovalSet::new();
        for child in node.children_mut() {
            if self.resolve_node(child, &chain) == Visibility::Hidden {
                tracing::trace!(node = %child.entity().identity(), "pruning invisible subtree");
                hidden_children.insert(child.class(), child.id());
            }
        }
        node.filter_children(&hidden_children);

        if own.grants(required) {
            node.set_mask(own);
            Visibility::Visible(own)
        } else {
            node.set_mask(Mask::NONE);
            if node.is_empty() {
                Visibility::Hidden
            } else {
                Visibility::Structural
            }
        }
    }

    fn descend(&self, parent: &Inheritance, entity: &SecuredEntity) -> Inheritance {
        let depth = parent.depth + 1;
        let entries = self
            .sids
            .iter()
            .zip(&parent.entries)
            .map(|(sid, inherited)| match self.own_mask(sid, entity) {
                Some(mask) => Some(Entry { mask, depth }),
                None => *inherited,
            })
            .collect();
        Inheritance { depth, entries }
    }

    fn own_mask(&self, sid: &Sid, entity: &SecuredEntity) -> Option<Mask> {
        if self.config.owner_grants_all
            && sid.is_principal()
            && !entity.owner.is_empty()
            && sid.name() == entity.owner
        {
            return Some(Mask::ALL);
        }
        self.acl.get(entity.identity(), sid)
    }

    fn effective(&self, chain: &Inheritance) -> Mask {
        if self.admin {
            return Mask::ALL;
        }
        Permission::ALL
            .into_iter()
            .filter(|permission| self.decide(chain, *permission))
            .fold(Mask::NONE, |mask, permission| mask | permission.grant())
    }

    fn decide(&self, chain: &Inheritance, permission: Permission) -> bool {
        // (depth, is primary, granted): the max is the winning decision
        self.sids
            .iter()
            .zip(&chain.entries)
            .filter_map(|(sid, entry)| {
                let entry = entry.as_ref()?;
                let granted = entry.mask.decision(permission)?;
                Some((entry.depth, sid.is_principal(), granted))
            })
            .max()
            .is_some_and(|(_, _, granted)| granted)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::entity::{DockerRegistry, Folder, ObjectIdentity, RegistryList, ToolGroup};
    use crate::security::AclClass;

    fn configuration(id: i64) -> SecuredEntity {
        SecuredEntity::new(id, AclClass::Configuration, format!("cfg-{id}"), "alice")
    }

    fn grant(acl: &mut AclSnapshot, class: AclClass, id: i64, sid: Sid, mask: Mask) {
        acl.insert(ObjectIdentity::new(class, id), sid, mask);
    }

    #[test]
    fn test_leaf_inherits_from_nearest_granted_ancestor() {
        let tree = Folder::new(1, "top", "alice")
            .with_child(Folder::new(2, "mid", "alice").with_configuration(configuration(3)));
        let mut acl = AclSnapshot::new();
        grant(&mut acl, AclClass::Folder, 1, Sid::principal("bob"), Mask::READ | Mask::WRITE);

        let sids = SidSet::new(Sid::principal("bob"));
        let config = ResolverConfig::default();
        let resolved = PermissionResolver::new(&sids, &acl, &config)
            .resolve(&tree)
            .unwrap();

        assert_eq!(resolved.mask(), Mask::READ | Mask::WRITE);
        assert_eq!(resolved.children[0].mask(), Mask::READ | Mask::WRITE);
        assert_eq!(
            resolved.children[0].configurations[0].mask,
            Mask::READ | Mask::WRITE
        );
    }

    #[test]
    fn test_own_grant_replaces_inherited() {
        // narrower own grant, not a merge with the parent's
        let tree = Folder::new(1, "top", "alice").with_configuration(configuration(2));
        let mut acl = AclSnapshot::new();
        let bob = Sid::principal("bob");
        grant(&mut acl, AclClass::Folder, 1, bob.clone(), Mask::READ | Mask::WRITE);
        grant(&mut acl, AclClass::Configuration, 2, bob.clone(), Mask::READ);

        let sids = SidSet::new(bob);
        let config = ResolverConfig::default();
        let resolved = PermissionResolver::new(&sids, &acl, &config)
            .resolve(&tree)
            .unwrap();
        assert_eq!(resolved.configurations[0].mask, Mask::READ);
    }

    #[test]
    fn test_deny_cuts_subtree_unless_deeper_grant() {
        let tree = Folder::new(1, "top", "alice").with_child(
            Folder::new(2, "denied", "alice")
                .with_configuration(configuration(3))
                .with_child(Folder::new(4, "regranted", "alice").with_configuration(configuration(5))),
        );
        let bob = Sid::principal("bob");
        let mut acl = AclSnapshot::new();
        grant(&mut acl, AclClass::Folder, 1, bob.clone(), Mask::READ);
        grant(&mut acl, AclClass::Folder, 2, bob.clone(), Mask::NO_READ);
        grant(&mut acl, AclClass::Folder, 4, bob.clone(), Mask::READ);

        let sids = SidSet::new(bob);
        let config = ResolverConfig::default();
        let resolved = PermissionResolver::new(&sids, &acl, &config)
            .resolve(&tree)
            .unwrap();

        let denied = &resolved.children[0];
        assert_eq!(denied.mask(), Mask::NONE);
        assert!(denied.configurations.is_empty());
        assert_eq!(denied.children[0].mask(), Mask::READ);
        assert_eq!(denied.children[0].configurations[0].mask, Mask::READ);
    }

    #[test]
    fn test_hidden_tree_resolves_to_none() {
        let tree = Folder::new(1, "top", "alice").with_configuration(configuration(2));
        let sids = SidSet::new(Sid::principal("bob"));
        let acl = AclSnapshot::new();
        let config = ResolverConfig::default();
        assert!(PermissionResolver::new(&sids, &acl, &config)
            .resolve(&tree)
            .is_none());
    }

    #[test]
    fn test_structural_nodes_keep_zero_mask() {
        let tree = RegistryList::new(vec![DockerRegistry::new(1, "registry", "alice")
            .with_group(ToolGroup::new(2, "library", "alice").with_tool(3, "ubuntu", "alice"))
            .with_group(ToolGroup::new(4, "empty", "alice").with_tool(5, "centos", "alice"))]);
        let bob = Sid::principal("bob");
        let mut acl = AclSnapshot::new();
        grant(&mut acl, AclClass::Tool, 3, bob.clone(), Mask::READ);

        let sids = SidSet::new(bob);
        let config = ResolverConfig::default();
        let resolved = PermissionResolver::new(&sids, &acl, &config)
            .resolve(&tree)
            .unwrap();

        let registry = &resolved.registries[0];
        assert_eq!(registry.mask(), Mask::NONE);
        assert_eq!(registry.groups.len(), 1);
        assert_eq!(registry.groups[0].mask(), Mask::NONE);
        assert_eq!(registry.groups[0].tools[0].mask, Mask::READ);
    }

    #[test]
    fn test_source_tree_is_untouched() {
        let tree = Folder::new(1, "top", "alice").with_configuration(configuration(2));
        let bob = Sid::principal("bob");
        let mut acl = AclSnapshot::new();
        grant(&mut acl, AclClass::Folder, 1, bob.clone(), Mask::READ);
        grant(&mut acl, AclClass::Configuration, 2, bob.clone(), Mask::NO_READ);

        let sids = SidSet::new(bob);
        let config = ResolverConfig::default();
        let resolved = PermissionResolver::new(&sids, &acl, &config)
            .resolve(&tree)
            .unwrap();

        assert!(resolved.configurations.is_empty());
        assert_eq!(tree.configurations.len(), 1);
        assert_eq!(tree.mask(), Mask::NONE);
    }

    #[test]
    fn test_principal_beats_role_at_same_depth() {
        let tree = Folder::new(1, "top", "alice");
        let mut acl = AclSnapshot::new();
        grant(&mut acl, AclClass::Folder, 1, Sid::principal("bob"), Mask::NO_READ);
        grant(&mut acl, AclClass::Folder, 1, Sid::role("ROLE_LAB"), Mask::READ);

        let sids = SidSet::new(Sid::principal("bob")).with_role("ROLE_LAB");
        let config = ResolverConfig::default();
        assert!(PermissionResolver::new(&sids, &acl, &config)
            .resolve(&tree)
            .is_none());
    }

    #[test]
    fn test_deeper_role_grant_beats_shallower_principal_deny() {
        let tree = Folder::new(1, "top", "alice").with_configuration(configuration(2));
        let mut acl = AclSnapshot::new();
        grant(&mut acl, AclClass::Folder, 1, Sid::principal("bob"), Mask::NO_READ);
        grant(&mut acl, AclClass::Configuration, 2, Sid::role("ROLE_LAB"), Mask::READ);

        let sids = SidSet::new(Sid::principal("bob")).with_role("ROLE_LAB");
        let config = ResolverConfig::default();
        let resolved = PermissionResolver::new(&sids, &acl, &config)
            .resolve(&tree)
            .unwrap();
        assert_eq!(resolved.mask(), Mask::NONE);
        assert_eq!(resolved.configurations[0].mask, Mask::READ);
    }

    #[test]
    fn test_role_grants_union() {
        let tree = Folder::new(1, "top", "alice");
        let mut acl = AclSnapshot::new();
        grant(&mut acl, AclClass::Folder, 1, Sid::role("ROLE_A"), Mask::NO_READ | Mask::WRITE);
        grant(&mut acl, AclClass::Folder, 1, Sid::role("ROLE_B"), Mask::READ);

        let sids = SidSet::new(Sid::principal("bob"))
            .with_role("ROLE_A")
            .with_role("ROLE_B");
        let config = ResolverConfig::default();
        let resolved = PermissionResolver::new(&sids, &acl, &config)
            .resolve(&tree)
            .unwrap();
        assert_eq!(resolved.mask(), Mask::READ | Mask::WRITE);
    }

    #[test]
    fn test_role_identity_gets_no_precedence_over_its_roles() {
        let tree = Folder::new(1, "top", "alice");
        let mut acl = AclSnapshot::new();
        grant(&mut acl, AclClass::Folder, 1, Sid::role("ROLE_A"), Mask::NO_READ);
        grant(&mut acl, AclClass::Folder, 1, Sid::role("ROLE_B"), Mask::READ);

        let sids = SidSet::new(Sid::role("ROLE_A")).with_role("ROLE_B");
        let config = ResolverConfig::default();
        let resolved = PermissionResolver::new(&sids, &acl, &config)
            .resolve(&tree)
            .unwrap();
        assert_eq!(resolved.mask(), Mask::READ);
    }

    #[test]
    fn test_synthetic_roots_carry_no_entries() {
        // a real registry and folder may use the same id as the synthetic roots
        let bob = Sid::principal("bob");
        let mut acl = AclSnapshot::new();
        grant(&mut acl, AclClass::DockerRegistry, 0, bob.clone(), Mask::READ);
        grant(&mut acl, AclClass::Folder, 0, bob.clone(), Mask::READ);
        let sids = SidSet::new(bob);
        let config = ResolverConfig::default();
        let resolver = PermissionResolver::new(&sids, &acl, &config);

        let registries = RegistryList::new(vec![
            DockerRegistry::new(0, "public", "alice"),
            DockerRegistry::new(5, "private", "alice").with_group(
                ToolGroup::new(6, "secret", "alice").with_tool(7, "secret-tool", "alice"),
            ),
        ]);
        let resolved = resolver.resolve(&registries).unwrap();
        assert_eq!(resolved.registries.len(), 1);
        assert_eq!(resolved.registries[0].id(), 0);
        assert_eq!(resolved.registries[0].mask(), Mask::READ);

        let folders = Folder::forest(vec![Folder::new(3, "private", "alice")
            .with_configuration(configuration(4))]);
        assert!(resolver.resolve(&folders).is_none());
    }

    #[test]
    fn test_owner_holds_everything() {
        let tree = Folder::new(1, "top", "bob").with_configuration(configuration(2));
        let sids = SidSet::new(Sid::principal("bob"));
        let acl = AclSnapshot::new();

        let config = ResolverConfig::default();
        let resolved = PermissionResolver::new(&sids, &acl, &config)
            .resolve(&tree)
            .unwrap();
        assert_eq!(resolved.mask(), Mask::ALL);
        assert_eq!(resolved.configurations[0].mask, Mask::ALL);

        let config = ResolverConfig {
            owner_grants_all: false,
            ..ResolverConfig::default()
        };
        assert!(PermissionResolver::new(&sids, &acl, &config)
            .resolve(&tree)
            .is_none());
    }

    #[test]
    fn test_admin_sees_everything() {
        let tree = Folder::new(1, "top", "alice").with_configuration(configuration(2));
        let sids = SidSet::new(Sid::principal("root")).with_role("ROLE_ADMIN");
        let mut acl = AclSnapshot::new();
        grant(&mut acl, AclClass::Configuration, 2, Sid::principal("root"), Mask::NO_READ);

        let config = ResolverConfig::default();
        let resolver = PermissionResolver::new(&sids, &acl, &config);
        assert!(resolver.is_admin());
        let resolved = resolver.resolve(&tree).unwrap();
        assert_eq!(resolved.configurations[0].mask, Mask::ALL);
    }

    #[test]
    fn test_required_permission_is_configurable() {
        let tree = Folder::new(1, "top", "alice").with_configuration(configuration(2));
        let bob = Sid::principal("bob");
        let mut acl = AclSnapshot::new();
        grant(&mut acl, AclClass::Folder, 1, bob.clone(), Mask::READ);
        grant(&mut acl, AclClass::Configuration, 2, bob.clone(), Mask::READ | Mask::WRITE);

        let sids = SidSet::new(bob);
        let config = ResolverConfig {
            required_permission: Permission::Write,
            ..ResolverConfig::default()
        };
        let resolved = PermissionResolver::new(&sids, &acl, &config)
            .resolve(&tree)
            .unwrap();
        assert_eq!(resolved.mask(), Mask::NONE);
        assert_eq!(resolved.configurations[0].mask, Mask::READ | Mask::WRITE);
    }
}
