use std::collections::BTreeMap;

use crate::entity::{Copyable, HierarchicalEntity, Secured, SecuredEntity};
use crate::security::AclClass;

/// Visible objects, bucketed by class. A missing class means nothing of
///  that class is visible.
pub type AvailableEntities = BTreeMap<AclClass, Vec<SecuredEntity>>;

/// Collect the visible content of a resolved tree into `into`.
///
/// The root itself is never emitted, only what it owns. Within a node,
///  leaves come first, then each child followed by its own subtree.
///  Children with a zero mask are structural only: they are walked
///  through but never emitted.
pub fn flatten<H: HierarchicalEntity>(
    root: &H,
    requested: Option<AclClass>,
    into: &mut AvailableEntities,
) {
    let wanted = |class: AclClass| requested.map_or(true, |requested| requested == class);

    for leaf in root.leaves() {
        // a resolved tree never holds zero-mask leaves, but an unresolved one might
        if !leaf.mask.is_empty() && wanted(leaf.class) {
            into.entry(leaf.class).or_default().push(leaf.clone());
        }
    }

    for child in root.children() {
        if !child.mask().is_empty() && wanted(child.class()) {
            into.entry(child.class()).or_default().push(child.copy_view());
        }
        flatten(child, requested, into);
    }
}
