//! In-memory implementations of every collaborator the core consumes.
//!
//! Useful for tests, demos and snapshot-driven tooling. Tree providers hand
//!  out a fresh clone of their tree on every call.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::acl::PermissionLookup;
use crate::dispatch::{EntityDispatcher, EntityLoader, Lineage};
use crate::entity::{
    DockerRegistry, EntityId, Folder, HasChildren, HasLeaves, HierarchicalEntity, ObjectIdentity,
    Secured, SecuredEntity,
};
use crate::loader::{FolderTreeProvider, RegistryTreeProvider};
use crate::security::{AclClass, Mask, Sid};

/// Access control entries kept in a map
#[derive(Debug, Clone, Default)]
pub struct MemoryAclStore {
    inner: Arc<RwLock<HashMap<ObjectIdentity, HashMap<Sid, Mask>>>>,
}

impl MemoryAclStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or replace) the entry of `sid` on `object`
    pub fn set(&self, object: ObjectIdentity, sid: Sid, mask: Mask) {
        self.inner.write().entry(object).or_default().insert(sid, mask);
    }

    pub fn remove(&self, object: ObjectIdentity, sid: &Sid) -> Option<Mask> {
        self.inner.write().get_mut(&object)?.remove(sid)
    }

    pub fn len(&self) -> usize {
        self.inner.read().values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PermissionLookup for MemoryAclStore {
    async fn own_mask(
        &self,
        sid: &Sid,
        object: ObjectIdentity,
    ) -> Result<Option<Mask>, anyhow::Error> {
        Ok(self
            .inner
            .read()
            .get(&object)
            .and_then(|by_sid| by_sid.get(sid))
            .copied())
    }
}

/// Serves clones of a fixed folder tree
#[derive(Debug, Clone)]
pub struct MemoryFolderTreeProvider {
    root: Arc<RwLock<Folder>>,
}

impl MemoryFolderTreeProvider {
    pub fn new(root: Folder) -> Self {
        Self {
            root: Arc::new(RwLock::new(root)),
        }
    }

    pub fn replace(&self, root: Folder) {
        *self.root.write() = root;
    }
}

impl Default for MemoryFolderTreeProvider {
    fn default() -> Self {
        Self::new(Folder::root())
    }
}

#[async_trait]
impl FolderTreeProvider for MemoryFolderTreeProvider {
    async fn load_tree(&self) -> Result<Folder, anyhow::Error> {
        Ok(self.root.read().clone())
    }
}

/// Serves clones of a fixed list of registries
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistryTreeProvider {
    registries: Arc<RwLock<Vec<DockerRegistry>>>,
}

impl MemoryRegistryTreeProvider {
    pub fn new(registries: Vec<DockerRegistry>) -> Self {
        Self {
            registries: Arc::new(RwLock::new(registries)),
        }
    }

    pub fn replace(&self, registries: Vec<DockerRegistry>) {
        *self.registries.write() = registries;
    }
}

#[async_trait]
impl RegistryTreeProvider for MemoryRegistryTreeProvider {
    async fn load_all_registries_content(&self) -> Result<Vec<DockerRegistry>, anyhow::Error> {
        Ok(self.registries.read().clone())
    }
}

/// A flat index of every entity of both trees, with parent links
///  taken from tree structure. Backs one [`MemoryEntityLoader`] per class.
#[derive(Debug, Clone, Default)]
pub struct MemoryEntityStore {
    inner: Arc<RwLock<BTreeMap<ObjectIdentity, SecuredEntity>>>,
}

impl MemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a folder tree. A synthetic root is not indexed itself, and
    ///  top level folders under it get no parent.
    pub fn index_folders(&self, root: &Folder) {
        let mut inner = self.inner.write();
        let parent = (!root.is_synthetic()).then(|| root.id());
        if parent.is_some() {
            Self::put(&mut inner, root.entity(), None);
        }
        for leaf in root.leaves() {
            Self::put(&mut inner, leaf, parent);
        }
        for child in root.children() {
            Self::index_subtree(&mut inner, child, parent);
        }
    }

    pub fn index_registries(&self, registries: &[DockerRegistry]) {
        let mut inner = self.inner.write();
        for registry in registries {
            Self::index_subtree(&mut inner, registry, None);
        }
    }

    pub fn insert(&self, entity: SecuredEntity) {
        self.inner.write().insert(entity.identity(), entity);
    }

    pub fn get(&self, object: ObjectIdentity) -> Option<SecuredEntity> {
        self.inner.read().get(&object).cloned()
    }

    /// A loader serving `class` out of this store
    pub fn loader(&self, class: AclClass) -> MemoryEntityLoader {
        MemoryEntityLoader {
            class,
            store: self.clone(),
        }
    }

    /// A dispatcher with a loader for every class that lives in a tree
    pub fn dispatcher(&self) -> EntityDispatcher {
        AclClass::ALL
            .into_iter()
            .filter(|class| class.domain().is_some())
            .fold(EntityDispatcher::builder(), |builder, class| {
                builder.register(Arc::new(self.loader(class)))
            })
            .build()
    }

    fn index_subtree<H: HierarchicalEntity>(
        inner: &mut BTreeMap<ObjectIdentity, SecuredEntity>,
        node: &H,
        parent: Option<EntityId>,
    ) {
        Self::put(inner, node.entity(), parent);
        for leaf in node.leaves() {
            Self::put(inner, leaf, Some(node.id()));
        }
        for child in node.children() {
            Self::index_subtree(inner, child, Some(node.id()));
        }
    }

    fn put(
        inner: &mut BTreeMap<ObjectIdentity, SecuredEntity>,
        entity: &SecuredEntity,
        parent: Option<EntityId>,
    ) {
        let mut entity = entity.clone();
        entity.parent_id = parent;
        entity.mask = Mask::NONE;
        inner.insert(entity.identity(), entity);
    }

    fn of_class(&self, class: AclClass) -> Vec<SecuredEntity> {
        self.inner
            .read()
            .values()
            .filter(|entity| entity.class == class)
            .cloned()
            .collect()
    }

    // stops at the first repeated identity, so a cyclic index still terminates
    fn lineage(&self, entity: SecuredEntity) -> Lineage {
        let inner = self.inner.read();
        let mut seen = BTreeSet::from([entity.identity()]);
        let mut ancestors = Vec::new();
        let mut next = entity.parent_identity();
        while let Some(parent) = next
            .filter(|identity| seen.insert(*identity))
            .and_then(|identity| inner.get(&identity))
        {
            next = parent.parent_identity();
            ancestors.push(parent.clone());
        }
        Lineage { entity, ancestors }
    }
}

/// [`EntityLoader`] over a [`MemoryEntityStore`], restricted to one class
#[derive(Debug, Clone)]
pub struct MemoryEntityLoader {
    class: AclClass,
    store: MemoryEntityStore,
}

#[async_trait]
impl EntityLoader for MemoryEntityLoader {
    fn class(&self) -> AclClass {
        self.class
    }

    async fn load(&self, id: EntityId) -> Result<Option<SecuredEntity>, anyhow::Error> {
        Ok(self.store.get(ObjectIdentity::new(self.class, id)))
    }

    async fn load_by_name_or_id(
        &self,
        identifier: &str,
    ) -> Result<Option<SecuredEntity>, anyhow::Error> {
        if let Ok(id) = identifier.parse::<EntityId>() {
            if let Some(entity) = self.load(id).await? {
                return Ok(Some(entity));
            }
        }
        Ok(self
            .store
            .of_class(self.class)
            .into_iter()
            .find(|entity| entity.name == identifier))
    }

    async fn change_owner(
        &self,
        id: EntityId,
        owner: &str,
    ) -> Result<Option<SecuredEntity>, anyhow::Error> {
        let mut inner = self.store.inner.write();
        Ok(inner
            .get_mut(&ObjectIdentity::new(self.class, id))
            .map(|entity| {
                entity.owner = owner.to_string();
                entity.clone()
            }))
    }

    async fn load_total_count(&self) -> Result<u64, anyhow::Error> {
        Ok(self.store.of_class(self.class).len() as u64)
    }

    async fn load_all_with_parents(
        &self,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<Lineage>, anyhow::Error> {
        if page == 0 || page_size == 0 {
            anyhow::bail!("page and page size must be positive, got {page} / {page_size}");
        }
        let Some(offset) = (page - 1).checked_mul(page_size) else {
            anyhow::bail!("page {page} of size {page_size} is out of range");
        };
        Ok(self
            .store
            .of_class(self.class)
            .into_iter()
            .skip(offset)
            .take(page_size)
            .map(|entity| self.store.lineage(entity))
            .collect())
    }

    async fn load_with_parents(&self, id: EntityId) -> Result<Option<Lineage>, anyhow::Error> {
        Ok(self
            .load(id)
            .await?
            .map(|entity| self.store.lineage(entity)))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::entity::ToolGroup;

    #[tokio::test]
    async fn test_acl_store_lookup() {
        let store = MemoryAclStore::new();
        let object = ObjectIdentity::new(AclClass::Tool, 1);
        store.set(object, Sid::principal("bob"), Mask::READ);
        store.set(object, Sid::principal("bob"), Mask::READ | Mask::WRITE);

        assert_eq!(store.len(), 1);
        assert_eq!(
            store.own_mask(&Sid::principal("bob"), object).await.unwrap(),
            Some(Mask::READ | Mask::WRITE)
        );
        // principal and role with the same name are different sids
        assert_eq!(store.own_mask(&Sid::role("bob"), object).await.unwrap(), None);

        assert!(store.remove(object, &Sid::principal("bob")).is_some());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_providers_hand_out_independent_trees() {
        let provider = MemoryFolderTreeProvider::new(Folder::new(1, "top", "alice"));
        let mut first = provider.load_tree().await.unwrap();
        first.entity.name = "changed".to_string();

        let second = provider.load_tree().await.unwrap();
        assert_eq!(second.entity.name, "top");
    }

    #[tokio::test]
    async fn test_entity_store_lineage() {
        let store = MemoryEntityStore::new();
        store.index_registries(&[DockerRegistry::new(1, "registry", "alice")
            .with_group(ToolGroup::new(2, "library", "alice").with_tool(3, "ubuntu", "alice"))]);

        let loader = store.loader(AclClass::Tool);
        let lineage = loader.load_with_parents(3).await.unwrap().unwrap();
        let ancestors: Vec<_> = lineage.ancestors.iter().map(|a| a.identity()).collect();
        assert_eq!(
            ancestors,
            vec![
                ObjectIdentity::new(AclClass::ToolGroup, 2),
                ObjectIdentity::new(AclClass::DockerRegistry, 1),
            ]
        );
        assert!(loader.load_with_parents(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lineage_stops_on_cycles() {
        let store = MemoryEntityStore::new();
        let mut first = SecuredEntity::new(1, AclClass::Folder, "a", "alice");
        first.parent_id = Some(2);
        let mut second = SecuredEntity::new(2, AclClass::Folder, "b", "alice");
        second.parent_id = Some(1);
        store.insert(first);
        store.insert(second);

        let lineage = store
            .loader(AclClass::Folder)
            .load_with_parents(1)
            .await
            .unwrap()
            .unwrap();
        let ancestors: Vec<_> = lineage.ancestors.iter().map(|a| a.id).collect();
        assert_eq!(ancestors, vec![2]);
    }

    #[tokio::test]
    async fn test_paging_out_of_range_is_an_error() {
        let store = MemoryEntityStore::new();
        store.insert(SecuredEntity::new(1, AclClass::Folder, "a", "alice"));
        let loader = store.loader(AclClass::Folder);

        let result = loader.load_all_with_parents(usize::MAX, 2).await;
        assert!(result.unwrap_err().to_string().contains("out of range"));

        let page = loader.load_all_with_parents(usize::MAX, 1).await.unwrap();
        assert!(page.is_empty());
    }
}
