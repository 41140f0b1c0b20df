/**
 * Identity and capability primitives:
 *  object classes, security identities and
 *  grant/deny permission masks.
 */
pub mod security;
/**
 * Securable objects and the hierarchies
 *  they are arranged in.
 */
pub mod entity;
/**
 * Effective permission resolution, pruning
 *  and flattening of resolved hierarchies.
 */
pub mod acl;
/**
 * Tree providers and the loader that picks
 *  which hierarchies a request needs.
 */
pub mod loader;
/**
 * Per-class routing of single entity operations.
 */
pub mod dispatch;
/**
 * The "what can this identity see" entry point.
 */
pub mod available;
/**
 * In-memory collaborators, for tests and
 *  snapshot driven tooling.
 */
pub mod memory;

pub mod config;
pub mod error;

pub mod prelude {
    pub use crate::acl::{AvailableEntities, PermissionLookup, PermissionResolver};
    pub use crate::available::AvailabilityService;
    pub use crate::config::ResolverConfig;
    pub use crate::dispatch::{EntityDispatcher, EntityLoader, Lineage};
    pub use crate::entity::{
        DockerRegistry, EntityId, Folder, HierarchicalEntity, ObjectIdentity, RegistryList,
        Secured, SecuredEntity, ToolGroup,
    };
    pub use crate::error::AccessError;
    pub use crate::loader::{FolderTreeProvider, HierarchyLoader, RegistryTreeProvider};
    pub use crate::security::{AclClass, Mask, Permission, Sid, SidSet};
}
