use std::fmt;

use serde::{Deserialize, Serialize};

use crate::security::{AclClass, Mask};

pub type EntityId = i64;

/// Identifies an object for access control purposes: ids are only
///  unique within a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectIdentity {
    pub class: AclClass,
    pub id: EntityId,
}

impl ObjectIdentity {
    pub fn new(class: AclClass, id: EntityId) -> Self {
        Self { class, id }
    }
}

impl fmt::Display for ObjectIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.class, self.id)
    }
}

/// The shape every object in any tree exposes.
///
/// `mask` is not stored state: it holds the effective mask computed for
///  the identity of the current resolution, and is zero on freshly
///  loaded objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecuredEntity {
    pub id: EntityId,
    pub class: AclClass,
    pub name: String,
    pub owner: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<EntityId>,
    #[serde(default)]
    pub mask: Mask,
}

impl SecuredEntity {
    pub fn new(
        id: EntityId,
        class: AclClass,
        name: impl Into<String>,
        owner: impl Into<String>,
    ) -> Self {
        Self {
            id,
            class,
            name: name.into(),
            owner: owner.into(),
            parent_id: None,
            mask: Mask::NONE,
        }
    }

    pub fn identity(&self) -> ObjectIdentity {
        ObjectIdentity::new(self.class, self.id)
    }

    /// The identity of the node owning this entity, if it has one
    pub fn parent_identity(&self) -> Option<ObjectIdentity> {
        match (self.class.parent_class(), self.parent_id) {
            (Some(class), Some(id)) => Some(ObjectIdentity::new(class, id)),
            _ => None,
        }
    }
}

/// Anything that carries a [`SecuredEntity`].
pub trait Secured {
    fn entity(&self) -> &SecuredEntity;

    fn entity_mut(&mut self) -> &mut SecuredEntity;

    fn id(&self) -> EntityId {
        self.entity().id
    }

    fn class(&self) -> AclClass {
        self.entity().class
    }

    fn mask(&self) -> Mask {
        self.entity().mask
    }

    fn set_mask(&mut self, mask: Mask) {
        self.entity_mut().mask = mask;
    }

    /// Synthetic nodes only hold a forest together. They have no access
    ///  control entries of their own and pass inheritance through untouched.
    fn is_synthetic(&self) -> bool {
        false
    }
}

impl Secured for SecuredEntity {
    fn entity(&self) -> &SecuredEntity {
        self
    }

    fn entity_mut(&mut self) -> &mut SecuredEntity {
        self
    }
}
