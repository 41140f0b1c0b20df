//! Shared fixtures for availability integration tests
#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;

use common::acl::PermissionLookup;
use common::available::AvailabilityService;
use common::config::ResolverConfig;
use common::entity::{DockerRegistry, EntityId, Folder, ObjectIdentity, SecuredEntity};
use common::loader::HierarchyLoader;
use common::memory::{MemoryAclStore, MemoryFolderTreeProvider, MemoryRegistryTreeProvider};
use common::security::{AclClass, Mask, Sid};

/// Route library logs to the test harness, filtered by RUST_LOG
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Everything a test needs to drive the service and tweak its inputs
pub struct TestEnv {
    pub folders: MemoryFolderTreeProvider,
    pub registries: MemoryRegistryTreeProvider,
    pub acl: MemoryAclStore,
}

impl TestEnv {
    pub fn new(root: Folder, registries: Vec<DockerRegistry>) -> Self {
        init_tracing();
        Self {
            folders: MemoryFolderTreeProvider::new(root),
            registries: MemoryRegistryTreeProvider::new(registries),
            acl: MemoryAclStore::new(),
        }
    }

    pub fn grant(&self, class: AclClass, id: EntityId, sid: Sid, mask: Mask) {
        self.acl.set(ObjectIdentity::new(class, id), sid, mask);
    }

    pub fn service(&self) -> AvailabilityService {
        self.service_with(ResolverConfig::default())
    }

    pub fn service_with(&self, config: ResolverConfig) -> AvailabilityService {
        self.service_with_lookup(Arc::new(self.acl.clone()), config)
    }

    pub fn service_with_lookup(
        &self,
        lookup: Arc<dyn PermissionLookup>,
        config: ResolverConfig,
    ) -> AvailabilityService {
        let loader = HierarchyLoader::new(
            Arc::new(self.folders.clone()),
            Arc::new(self.registries.clone()),
        );
        AvailabilityService::new(loader, lookup, config)
    }
}

/// A lookup whose backing store is down
#[derive(Debug)]
pub struct UnavailableLookup;

#[async_trait]
impl PermissionLookup for UnavailableLookup {
    async fn own_mask(
        &self,
        _sid: &Sid,
        _object: ObjectIdentity,
    ) -> Result<Option<Mask>, anyhow::Error> {
        Err(anyhow::anyhow!("acl store unavailable"))
    }
}

pub fn configuration(id: EntityId, owner: &str) -> SecuredEntity {
    SecuredEntity::new(id, AclClass::Configuration, format!("config-{id}"), owner)
}

pub fn pipeline(id: EntityId, owner: &str) -> SecuredEntity {
    SecuredEntity::new(id, AclClass::Pipeline, format!("pipeline-{id}"), owner)
}

/// (id, mask) pairs of a result bucket, in emission order
pub fn ids_and_masks(entities: &[SecuredEntity]) -> Vec<(EntityId, Mask)> {
    entities.iter().map(|e| (e.id, e.mask)).collect()
}
