use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The kind of a securable object.
///
/// Used both as a discriminator on every [`SecuredEntity`](crate::entity::SecuredEntity)
///  and as the optional filter when asking which objects an identity can see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AclClass {
    Folder,
    Pipeline,
    DataStorage,
    Configuration,
    MetadataEntity,
    DockerRegistry,
    ToolGroup,
    Tool,
    // Securable, but not part of either hierarchy
    Issue,
    CloudRegion,
    Role,
}

/// The object tree a class is loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    /// Folders and everything a folder owns
    Folder,
    /// Docker registries, their tool groups and tools
    Registry,
}

impl AclClass {
    pub const ALL: [AclClass; 11] = [
        AclClass::Folder,
        AclClass::Pipeline,
        AclClass::DataStorage,
        AclClass::Configuration,
        AclClass::MetadataEntity,
        AclClass::DockerRegistry,
        AclClass::ToolGroup,
        AclClass::Tool,
        AclClass::Issue,
        AclClass::CloudRegion,
        AclClass::Role,
    ];

    /// Which hierarchy objects of this class live in, if any
    pub fn domain(self) -> Option<Domain> {
        match self {
            AclClass::Folder
            | AclClass::Pipeline
            | AclClass::DataStorage
            | AclClass::Configuration
            | AclClass::MetadataEntity => Some(Domain::Folder),
            AclClass::DockerRegistry | AclClass::ToolGroup | AclClass::Tool => {
                Some(Domain::Registry)
            }
            AclClass::Issue | AclClass::CloudRegion | AclClass::Role => None,
        }
    }

    /// The class of the node that directly owns objects of this class.
    ///  Folders nest inside folders; registries are always roots.
    pub fn parent_class(self) -> Option<AclClass> {
        match self {
            AclClass::Folder
            | AclClass::Pipeline
            | AclClass::DataStorage
            | AclClass::Configuration
            | AclClass::MetadataEntity => Some(AclClass::Folder),
            AclClass::Tool => Some(AclClass::ToolGroup),
            AclClass::ToolGroup => Some(AclClass::DockerRegistry),
            AclClass::DockerRegistry | AclClass::Issue | AclClass::CloudRegion | AclClass::Role => {
                None
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AclClass::Folder => "FOLDER",
            AclClass::Pipeline => "PIPELINE",
            AclClass::DataStorage => "DATA_STORAGE",
            AclClass::Configuration => "CONFIGURATION",
            AclClass::MetadataEntity => "METADATA_ENTITY",
            AclClass::DockerRegistry => "DOCKER_REGISTRY",
            AclClass::ToolGroup => "TOOL_GROUP",
            AclClass::Tool => "TOOL",
            AclClass::Issue => "ISSUE",
            AclClass::CloudRegion => "CLOUD_REGION",
            AclClass::Role => "ROLE",
        }
    }
}

impl fmt::Display for AclClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown acl class: {0}")]
pub struct UnknownAclClass(pub String);

impl FromStr for AclClass {
    type Err = UnknownAclClass;

    /// Accepts `TOOL_GROUP`, `tool_group` and `tool-group` alike
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        AclClass::ALL
            .into_iter()
            .find(|class| class.as_str() == normalized)
            .ok_or_else(|| UnknownAclClass(s.to_string()))
    }
}
