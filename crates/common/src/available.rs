use std::collections::BTreeSet;
use std::sync::Arc;

use crate::acl::{AclSnapshot, AvailableEntities, PermissionLookup, PermissionResolver};
use crate::config::ResolverConfig;
use crate::error::AccessError;
use crate::loader::HierarchyLoader;
use crate::security::{AclClass, SidSet};

/// Answers "what can this identity see", the single entry point of the crate.
///
/// Every call loads fresh trees, fetches the own entries it needs once,
///  resolves each tree for the identity and flattens what survived.
///  Nothing resolved is kept between calls.
#[derive(Debug, Clone)]
pub struct AvailabilityService {
    loader: HierarchyLoader,
    lookup: Arc<dyn PermissionLookup>,
    config: ResolverConfig,
}

impl AvailabilityService {
    pub fn new(
        loader: HierarchyLoader,
        lookup: Arc<dyn PermissionLookup>,
        config: ResolverConfig,
    ) -> Self {
        Self {
            loader,
            lookup,
            config,
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Every object visible to `sids`, keyed by class.
    ///
    /// With `requested` set, only objects of that class are returned and
    ///  only the tree holding that class is loaded.
    ///
    /// # Errors
    /// * `AccessError::UnsupportedClass` - `requested` lives in neither tree
    /// * `AccessError::Provider` - a tree provider or the permission lookup failed
    #[tracing::instrument(
        skip(self, sids),
        fields(identity = %sids.primary(), roles = sids.roles().len())
    )]
    pub async fn load_available(
        &self,
        sids: &SidSet,
        requested: Option<AclClass>,
    ) -> Result<AvailableEntities, AccessError> {
        let roots = self.loader.load_roots(requested).await?;

        let acl = if self.config.is_admin(sids) {
            AclSnapshot::new()
        } else {
            let mut objects = BTreeSet::new();
            for root in &roots {
                root.collect_identities(&mut objects);
            }
            let acl = self.lookup.own_masks(sids, &objects).await?;
            tracing::debug!(
                objects = objects.len(),
                entries = acl.len(),
                "fetched own entries"
            );
            acl
        };

        let resolver = PermissionResolver::new(sids, &acl, &self.config);
        let mut available = AvailableEntities::new();
        for root in &roots {
            match root.resolve(&resolver) {
                Some(resolved) => resolved.flatten_into(requested, &mut available),
                None => tracing::debug!(domain = ?root.domain(), "nothing visible in tree"),
            }
        }

        tracing::debug!(
            classes = available.len(),
            objects = available.values().map(Vec::len).sum::<usize>(),
            "resolved available objects"
        );
        Ok(available)
    }
}
