use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::acl::{flatten, AvailableEntities, PermissionResolver};
use crate::entity::{DockerRegistry, Folder, HierarchicalEntity, ObjectIdentity, RegistryList};
use crate::error::AccessError;
use crate::security::{AclClass, Domain};

/// Source of the folder tree.
///
/// Implementations may cache, but every call must hand out an
///  independent tree.
#[async_trait]
pub trait FolderTreeProvider: Send + Sync + std::fmt::Debug {
    /// The whole folder forest, attached to a (possibly synthetic) root,
    ///  with every pipeline, storage, configuration and metadata entity populated
    async fn load_tree(&self) -> Result<Folder, anyhow::Error>;
}

/// Source of the registry tree
#[async_trait]
pub trait RegistryTreeProvider: Send + Sync + std::fmt::Debug {
    /// Every registry with its tool groups and tools populated
    async fn load_all_registries_content(&self) -> Result<Vec<DockerRegistry>, anyhow::Error>;
}

/// A tree to resolve, one per domain
#[derive(Debug, Clone, PartialEq)]
pub enum HierarchyRoot {
    Folders(Folder),
    Registries(RegistryList),
}

impl HierarchyRoot {
    pub fn domain(&self) -> Domain {
        match self {
            HierarchyRoot::Folders(_) => Domain::Folder,
            HierarchyRoot::Registries(_) => Domain::Registry,
        }
    }

    pub fn collect_identities(&self, into: &mut BTreeSet<ObjectIdentity>) {
        match self {
            HierarchyRoot::Folders(root) => root.collect_identities(into),
            HierarchyRoot::Registries(root) => root.collect_identities(into),
        }
    }

    /// A resolved copy of this tree, or `None` if nothing in it is visible
    pub fn resolve(&self, resolver: &PermissionResolver<'_>) -> Option<HierarchyRoot> {
        match self {
            HierarchyRoot::Folders(root) => resolver.resolve(root).map(HierarchyRoot::Folders),
            HierarchyRoot::Registries(root) => {
                resolver.resolve(root).map(HierarchyRoot::Registries)
            }
        }
    }

    pub fn flatten_into(&self, requested: Option<AclClass>, into: &mut AvailableEntities) {
        match self {
            HierarchyRoot::Folders(root) => flatten(root, requested, into),
            HierarchyRoot::Registries(root) => flatten(root, requested, into),
        }
    }
}

/// Picks which trees to load for a requested class
#[derive(Debug, Clone)]
pub struct HierarchyLoader {
    folders: Arc<dyn FolderTreeProvider>,
    registries: Arc<dyn RegistryTreeProvider>,
}

impl HierarchyLoader {
    pub fn new(
        folders: Arc<dyn FolderTreeProvider>,
        registries: Arc<dyn RegistryTreeProvider>,
    ) -> Self {
        Self {
            folders,
            registries,
        }
    }

    /// Load the roots holding objects of `requested`, or both roots when
    ///  no class is requested.
    ///
    /// # Errors
    /// * `AccessError::UnsupportedClass` - the class lives in neither tree
    /// * `AccessError::Provider` - a tree provider failed
    pub async fn load_roots(
        &self,
        requested: Option<AclClass>,
    ) -> Result<Vec<HierarchyRoot>, AccessError> {
        let domains: &[Domain] = match requested {
            None => &[Domain::Folder, Domain::Registry],
            Some(class) => match class.domain() {
                Some(Domain::Folder) => &[Domain::Folder],
                Some(Domain::Registry) => &[Domain::Registry],
                None => {
                    tracing::warn!(%class, "class not supported for permission loading");
                    return Err(AccessError::UnsupportedClass(class));
                }
            },
        };

        let mut roots = Vec::with_capacity(domains.len());
        for domain in domains {
            let root = match domain {
                Domain::Folder => HierarchyRoot::Folders(self.folders.load_tree().await?),
                Domain::Registry => HierarchyRoot::Registries(RegistryList::new(
                    self.registries.load_all_registries_content().await?,
                )),
            };
            roots.push(root);
        }
        Ok(roots)
    }
}
