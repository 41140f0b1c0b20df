use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, SecuredEntity};
use crate::error::AccessError;
use crate::security::AclClass;

/// An entity together with the chain of nodes above it, nearest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lineage {
    pub entity: SecuredEntity,
    pub ancestors: Vec<SecuredEntity>,
}

/// Point operations on the entities of a single class
#[async_trait]
pub trait EntityLoader: Send + Sync + std::fmt::Debug {
    /// The class this loader serves
    fn class(&self) -> AclClass;

    async fn load(&self, id: EntityId) -> Result<Option<SecuredEntity>, anyhow::Error>;

    /// Resolve a user supplied identifier: numeric identifiers are tried
    ///  as ids first, then everything is tried as a name
    async fn load_by_name_or_id(
        &self,
        identifier: &str,
    ) -> Result<Option<SecuredEntity>, anyhow::Error>;

    /// Returns the updated entity, or `None` if no entity has this id
    async fn change_owner(
        &self,
        id: EntityId,
        owner: &str,
    ) -> Result<Option<SecuredEntity>, anyhow::Error>;

    async fn load_total_count(&self) -> Result<u64, anyhow::Error>;

    /// A page of entities with their ancestors, pages are 1-based
    async fn load_all_with_parents(
        &self,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<Lineage>, anyhow::Error>;

    async fn load_with_parents(&self, id: EntityId) -> Result<Option<Lineage>, anyhow::Error>;
}

/// Routes point operations to the loader registered for a class.
///
/// The table is fixed once built.
#[derive(Debug, Clone, Default)]
pub struct EntityDispatcher {
    loaders: BTreeMap<AclClass, Arc<dyn EntityLoader>>,
}

#[derive(Debug, Default)]
pub struct EntityDispatcherBuilder {
    loaders: BTreeMap<AclClass, Arc<dyn EntityLoader>>,
}

impl EntityDispatcherBuilder {
    /// Register a loader under its own class, replacing any earlier one
    pub fn register(mut self, loader: Arc<dyn EntityLoader>) -> Self {
        self.loaders.insert(loader.class(), loader);
        self
    }

    pub fn build(self) -> EntityDispatcher {
        EntityDispatcher {
            loaders: self.loaders,
        }
    }
}

impl EntityDispatcher {
    pub fn builder() -> EntityDispatcherBuilder {
        EntityDispatcherBuilder::default()
    }

    pub fn supports(&self, class: AclClass) -> bool {
        self.loaders.contains_key(&class)
    }

    pub fn classes(&self) -> impl Iterator<Item = AclClass> + '_ {
        self.loaders.keys().copied()
    }

    pub fn loader(&self, class: AclClass) -> Result<&Arc<dyn EntityLoader>, AccessError> {
        self.loaders
            .get(&class)
            .ok_or(AccessError::ClassNotSupported(class))
    }

    pub async fn load(
        &self,
        class: AclClass,
        id: EntityId,
    ) -> Result<Option<SecuredEntity>, AccessError> {
        Ok(self.loader(class)?.load(id).await?)
    }

    pub async fn load_by_name_or_id(
        &self,
        class: AclClass,
        identifier: &str,
    ) -> Result<Option<SecuredEntity>, AccessError> {
        Ok(self.loader(class)?.load_by_name_or_id(identifier).await?)
    }

    pub async fn change_owner(
        &self,
        class: AclClass,
        id: EntityId,
        owner: &str,
    ) -> Result<SecuredEntity, AccessError> {
        self.loader(class)?
            .change_owner(id, owner)
            .await?
            .ok_or_else(|| AccessError::EntityNotFound {
                class,
                identifier: id.to_string(),
            })
    }

    pub async fn load_total_count(&self, class: AclClass) -> Result<u64, AccessError> {
        Ok(self.loader(class)?.load_total_count().await?)
    }

    pub async fn load_all_with_parents(
        &self,
        class: AclClass,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<Lineage>, AccessError> {
        Ok(self
            .loader(class)?
            .load_all_with_parents(page, page_size)
            .await?)
    }

    pub async fn load_with_parents(
        &self,
        class: AclClass,
        id: EntityId,
    ) -> Result<Lineage, AccessError> {
        self.loader(class)?
            .load_with_parents(id)
            .await?
            .ok_or_else(|| AccessError::EntityNotFound {
                class,
                identifier: id.to_string(),
            })
    }
}
