use serde::{Deserialize, Serialize};

use crate::security::AclClass;

use super::hierarchy::{Copyable, HasChildren, HasLeaves, Prunable, RemovalSet};
use super::secured::{EntityId, Secured, SecuredEntity};

/// Id used for the synthetic node all registries hang off
pub const REGISTRY_LIST_ID: EntityId = 0;

/// A docker registry: owns tool groups, no leaves of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DockerRegistry {
    #[serde(flatten)]
    pub entity: SecuredEntity,
    #[serde(default)]
    pub groups: Vec<ToolGroup>,
}

/// A tool group: owns tools, never nests further.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolGroup {
    #[serde(flatten)]
    pub entity: SecuredEntity,
    #[serde(default)]
    pub tools: Vec<SecuredEntity>,
}

/// The synthetic parent of every registry, so the whole registry
///  content can be walked as a single tree. It is never emitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryList {
    #[serde(flatten)]
    pub entity: SecuredEntity,
    #[serde(default)]
    pub registries: Vec<DockerRegistry>,
}

impl DockerRegistry {
    pub fn new(id: EntityId, path: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            entity: SecuredEntity::new(id, AclClass::DockerRegistry, path, owner),
            groups: Vec::new(),
        }
    }

    pub fn with_group(mut self, mut group: ToolGroup) -> Self {
        group.entity.parent_id = Some(self.entity.id);
        self.groups.push(group);
        self
    }
}

impl ToolGroup {
    pub fn new(id: EntityId, name: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            entity: SecuredEntity::new(id, AclClass::ToolGroup, name, owner),
            tools: Vec::new(),
        }
    }

    pub fn with_tool(mut self, id: EntityId, image: impl Into<String>, owner: impl Into<String>) -> Self {
        let mut tool = SecuredEntity::new(id, AclClass::Tool, image, owner);
        tool.parent_id = Some(self.entity.id);
        self.tools.push(tool);
        self
    }
}

impl RegistryList {
    pub fn new(registries: Vec<DockerRegistry>) -> Self {
        Self {
            entity: SecuredEntity::new(REGISTRY_LIST_ID, AclClass::DockerRegistry, "registries", ""),
            registries,
        }
    }
}

impl Secured for DockerRegistry {
    fn entity(&self) -> &SecuredEntity {
        &self.entity
    }

    fn entity_mut(&mut self) -> &mut SecuredEntity {
        &mut self.entity
    }
}

impl HasLeaves for DockerRegistry {
    fn leaves(&self) -> Vec<&SecuredEntity> {
        Vec::new()
    }

    fn leaves_mut(&mut self) -> Vec<&mut SecuredEntity> {
        Vec::new()
    }
}

impl HasChildren for DockerRegistry {
    type Child = ToolGroup;

    fn children(&self) -> &[ToolGroup] {
        &self.groups
    }

    fn children_mut(&mut self) -> &mut [ToolGroup] {
        &mut self.groups
    }
}

impl Prunable for DockerRegistry {
    fn filter_leaves(&mut self, _remove: &RemovalSet) {}

    fn filter_children(&mut self, remove: &RemovalSet) {
        self.groups.retain(|group| !remove.covers(group));
    }
}

impl Copyable for DockerRegistry {
    fn copy_view(&self) -> SecuredEntity {
        self.entity.clone()
    }
}

impl Secured for ToolGroup {
    fn entity(&self) -> &SecuredEntity {
        &self.entity
    }

    fn entity_mut(&mut self) -> &mut SecuredEntity {
        &mut self.entity
    }
}

impl HasLeaves for ToolGroup {
    fn leaves(&self) -> Vec<&SecuredEntity> {
        self.tools.iter().collect()
    }

    fn leaves_mut(&mut self) -> Vec<&mut SecuredEntity> {
        self.tools.iter_mut().collect()
    }
}

impl HasChildren for ToolGroup {
    // groups have no grandchildren, the child type only closes the recursion
    type Child = ToolGroup;

    fn children(&self) -> &[ToolGroup] {
        &[]
    }

    fn children_mut(&mut self) -> &mut [ToolGroup] {
        &mut []
    }
}

impl Prunable for ToolGroup {
    fn filter_leaves(&mut self, remove: &RemovalSet) {
        self.tools.retain(|tool| !remove.covers(tool));
    }

    fn filter_children(&mut self, _remove: &RemovalSet) {}
}

impl Copyable for ToolGroup {
    fn copy_view(&self) -> SecuredEntity {
        self.entity.clone()
    }
}

impl Secured for RegistryList {
    fn entity(&self) -> &SecuredEntity {
        &self.entity
    }

    fn entity_mut(&mut self) -> &mut SecuredEntity {
        &mut self.entity
    }

    fn is_synthetic(&self) -> bool {
        true
    }
}

impl HasLeaves for RegistryList {
    fn leaves(&self) -> Vec<&SecuredEntity> {
        Vec::new()
    }

    fn leaves_mut(&mut self) -> Vec<&mut SecuredEntity> {
        Vec::new()
    }
}

impl HasChildren for RegistryList {
    type Child = DockerRegistry;

    fn children(&self) -> &[DockerRegistry] {
        &self.registries
    }

    fn children_mut(&mut self) -> &mut [DockerRegistry] {
        &mut self.registries
    }
}

impl Prunable for RegistryList {
    fn filter_leaves(&mut self, _remove: &RemovalSet) {}

    fn filter_children(&mut self, remove: &RemovalSet) {
        self.registries.retain(|registry| !remove.covers(registry));
    }
}

impl Copyable for RegistryList {
    fn copy_view(&self) -> SecuredEntity {
        self.entity.clone()
    }
}
