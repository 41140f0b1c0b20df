use std::collections::{BTreeMap, BTreeSet};

use crate::security::AclClass;

use super::secured::{EntityId, ObjectIdentity, Secured, SecuredEntity};

/**
 * Hierarchies
 * ===========
 * A hierarchical entity is a secured entity that owns two kinds
 *  of things:
 *  - Leaves: terminal secured entities (pipelines, tools, ...)
 *  - Children: nested hierarchical entities of the same family
 * Folder trees and registry trees look nothing alike structurally,
 *  but the resolver and the flattener only ever talk to them
 *  through the capability traits below.
 */

/// Ids to remove from a node, keyed by class since ids are only unique per class
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovalSet(BTreeMap<AclClass, BTreeSet<EntityId>>);

impl RemovalSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, class: AclClass, id: EntityId) {
        self.0.entry(class).or_default().insert(id);
    }

    pub fn contains(&self, class: AclClass, id: EntityId) -> bool {
        self.0.get(&class).is_some_and(|ids| ids.contains(&id))
    }

    /// Whether a secured object is marked for removal
    pub fn covers<S: Secured>(&self, item: &S) -> bool {
        self.contains(item.class(), item.id())
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(BTreeSet::is_empty)
    }

    pub fn len(&self) -> usize {
        self.0.values().map(BTreeSet::len).sum()
    }
}

pub trait HasLeaves {
    /// Terminal entities directly owned by this node
    fn leaves(&self) -> Vec<&SecuredEntity>;

    fn leaves_mut(&mut self) -> Vec<&mut SecuredEntity>;
}

pub trait HasChildren {
    type Child: HierarchicalEntity;

    /// Nested non-terminal nodes
    fn children(&self) -> &[Self::Child];

    fn children_mut(&mut self) -> &mut [Self::Child];
}

pub trait Prunable {
    fn filter_leaves(&mut self, remove: &RemovalSet);

    fn filter_children(&mut self, remove: &RemovalSet);
}

pub trait Copyable {
    /// A detached snapshot of this node's own fields, without any subtree
    fn copy_view(&self) -> SecuredEntity;
}

/// The full contract a tree node fulfils
pub trait HierarchicalEntity:
    Secured + HasLeaves + HasChildren + Prunable + Copyable + Clone + Send + Sync
{
    fn is_empty(&self) -> bool {
        self.leaves().is_empty() && self.children().is_empty()
    }

    /// Every object identity in this subtree, the node itself included
    ///  unless it is synthetic
    fn collect_identities(&self, into: &mut BTreeSet<ObjectIdentity>) {
        if !self.is_synthetic() {
            into.insert(self.entity().identity());
        }
        for leaf in self.leaves() {
            into.insert(leaf.identity());
        }
        for child in self.children() {
            child.collect_identities(into);
        }
    }
}

impl<T> HierarchicalEntity for T where
    T: Secured + HasLeaves + HasChildren + Prunable + Copyable + Clone + Send + Sync
{
}
