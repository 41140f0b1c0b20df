use serde::{Deserialize, Serialize};

use crate::security::AclClass;

use super::hierarchy::{Copyable, HasChildren, HasLeaves, Prunable, RemovalSet};
use super::secured::{EntityId, Secured, SecuredEntity};

/// Id used for the synthetic root a folder tree hangs off
pub const ROOT_FOLDER_ID: EntityId = 0;

/// A folder: the only non-terminal node of the folder tree.
///
/// Everything a folder owns besides other folders is a leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    #[serde(flatten)]
    pub entity: SecuredEntity,
    #[serde(default)]
    pub children: Vec<Folder>,
    #[serde(default)]
    pub pipelines: Vec<SecuredEntity>,
    #[serde(default)]
    pub storages: Vec<SecuredEntity>,
    #[serde(default)]
    pub configurations: Vec<SecuredEntity>,
    #[serde(default)]
    pub metadata: Vec<SecuredEntity>,
    #[serde(skip)]
    synthetic: bool,
}

impl Folder {
    pub fn new(id: EntityId, name: impl Into<String>, owner: impl Into<String>) -> Self {
        Self::from_entity(SecuredEntity::new(id, AclClass::Folder, name, owner))
    }

    /// The synthetic root the top level folders of a forest are attached to
    pub fn root() -> Self {
        Self {
            synthetic: true,
            ..Self::new(ROOT_FOLDER_ID, "root", "")
        }
    }

    /// A synthetic root holding `folders` as its top level, without
    ///  touching their parent links
    pub fn forest(folders: Vec<Folder>) -> Self {
        Self {
            children: folders,
            ..Self::root()
        }
    }

    fn from_entity(entity: SecuredEntity) -> Self {
        Self {
            entity,
            children: Vec::new(),
            pipelines: Vec::new(),
            storages: Vec::new(),
            configurations: Vec::new(),
            metadata: Vec::new(),
            synthetic: false,
        }
    }

    pub fn with_child(mut self, mut child: Folder) -> Self {
        child.entity.parent_id = Some(self.entity.id);
        self.children.push(child);
        self
    }

    pub fn with_pipeline(mut self, pipeline: SecuredEntity) -> Self {
        let leaf = self.adopt(pipeline);
        self.pipelines.push(leaf);
        self
    }

    pub fn with_storage(mut self, storage: SecuredEntity) -> Self {
        let leaf = self.adopt(storage);
        self.storages.push(leaf);
        self
    }

    pub fn with_configuration(mut self, configuration: SecuredEntity) -> Self {
        let leaf = self.adopt(configuration);
        self.configurations.push(leaf);
        self
    }

    pub fn with_metadata(mut self, metadata: SecuredEntity) -> Self {
        let leaf = self.adopt(metadata);
        self.metadata.push(leaf);
        self
    }

    fn adopt(&self, mut leaf: SecuredEntity) -> SecuredEntity {
        leaf.parent_id = Some(self.entity.id);
        leaf
    }

    fn leaf_groups(&self) -> [&Vec<SecuredEntity>; 4] {
        [
            &self.pipelines,
            &self.storages,
            &self.configurations,
            &self.metadata,
        ]
    }
}

impl Secured for Folder {
    fn entity(&self) -> &SecuredEntity {
        &self.entity
    }

    fn entity_mut(&mut self) -> &mut SecuredEntity {
        &mut self.entity
    }

    fn is_synthetic(&self) -> bool {
        self.synthetic
    }
}

impl HasLeaves for Folder {
    fn leaves(&self) -> Vec<&SecuredEntity> {
        self.leaf_groups().into_iter().flatten().collect()
    }

    fn leaves_mut(&mut self) -> Vec<&mut SecuredEntity> {
        self.pipelines
            .iter_mut()
            .chain(self.storages.iter_mut())
            .chain(self.configurations.iter_mut())
            .chain(self.metadata.iter_mut())
            .collect()
    }
}

impl HasChildren for Folder {
    type Child = Folder;

    fn children(&self) -> &[Folder] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut [Folder] {
        &mut self.children
    }
}

impl Prunable for Folder {
    fn filter_leaves(&mut self, remove: &RemovalSet) {
        self.pipelines.retain(|leaf| !remove.covers(leaf));
        self.storages.retain(|leaf| !remove.covers(leaf));
        self.configurations.retain(|leaf| !remove.covers(leaf));
        self.metadata.retain(|leaf| !remove.covers(leaf));
    }

    fn filter_children(&mut self, remove: &RemovalSet) {
        self.children.retain(|child| !remove.covers(child));
    }
}

impl Copyable for Folder {
    fn copy_view(&self) -> SecuredEntity {
        self.entity.clone()
    }
}
