//! Securable objects and the trees they form
//!
//! - **[`SecuredEntity`]**: identity, class, owner and the effective mask of one object
//! - **[`HierarchicalEntity`]**: the capability contract of a tree node
//!   ([`HasLeaves`], [`HasChildren`], [`Prunable`], [`Copyable`])
//! - **[`Folder`]**: the folder tree
//! - **[`RegistryList`]**, **[`DockerRegistry`]**, **[`ToolGroup`]**: the registry tree
//!
//! ```text
//! Folder ----+-- Folder ...            RegistryList (synthetic)
//!            +-- Pipeline                   |
//!            +-- DataStorage           DockerRegistry
//!            +-- Configuration              |
//!            +-- MetadataEntity         ToolGroup
//!                                           |
//!                                          Tool
//! ```

mod folder;
mod hierarchy;
mod registry;
mod secured;

pub use folder::{Folder, ROOT_FOLDER_ID};
pub use hierarchy::{
    Copyable, HasChildren, HasLeaves, HierarchicalEntity, Prunable, RemovalSet,
};
pub use registry::{DockerRegistry, RegistryList, ToolGroup, REGISTRY_LIST_ID};
pub use secured::{EntityId, ObjectIdentity, Secured, SecuredEntity};
