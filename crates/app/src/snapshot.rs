use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use common::available::AvailabilityService;
use common::config::ResolverConfig;
use common::entity::{DockerRegistry, EntityId, Folder, ObjectIdentity};
use common::loader::HierarchyLoader;
use common::memory::{MemoryAclStore, MemoryFolderTreeProvider, MemoryRegistryTreeProvider};
use common::security::{AclClass, Mask, Sid, SidSet};

/// One own access control entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclEntry {
    pub class: AclClass,
    pub id: EntityId,
    pub sid: Sid,
    pub mask: Mask,
}

/**
 * Snapshots
 * =========
 * A point-in-time dump of everything a resolution reads, as JSON:
 *  - `folders`: the top level folders, nested
 *  - `registries`: every registry with its groups and tools
 *  - `acl`: own entries, e.g.
 *    `{ "class": "TOOL", "id": 3, "sid": { "name": "bob" }, "mask": "READ|EXECUTE" }`
 *  - `roles`: role memberships per user name
 * Every section is optional.
 */
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub folders: Vec<Folder>,
    #[serde(default)]
    pub registries: Vec<DockerRegistry>,
    #[serde(default)]
    pub acl: Vec<AclEntry>,
    #[serde(default)]
    pub roles: BTreeMap<String, Vec<String>>,
}

impl Snapshot {
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// The top level folders attached to a synthetic root
    pub fn folder_root(&self) -> Folder {
        Folder::forest(self.folders.clone())
    }

    pub fn acl_store(&self) -> MemoryAclStore {
        let store = MemoryAclStore::new();
        for entry in &self.acl {
            store.set(
                ObjectIdentity::new(entry.class, entry.id),
                entry.sid.clone(),
                entry.mask,
            );
        }
        store
    }

    /// An availability service reading from this snapshot
    pub fn service(&self, config: ResolverConfig) -> AvailabilityService {
        let loader = HierarchyLoader::new(
            Arc::new(MemoryFolderTreeProvider::new(self.folder_root())),
            Arc::new(MemoryRegistryTreeProvider::new(self.registries.clone())),
        );
        AvailabilityService::new(loader, Arc::new(self.acl_store()), config)
    }

    /// The sids of `user`: the user itself, its recorded roles and `extra_roles`
    pub fn sids_for(&self, user: &str, extra_roles: &[String]) -> SidSet {
        let mut sids = SidSet::new(Sid::principal(user));
        let recorded = self.roles.get(user).into_iter().flatten();
        for role in recorded.chain(extra_roles) {
            sids.add_role(role.as_str());
        }
        sids
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"{
        "folders": [
            {
                "id": 1, "class": "FOLDER", "name": "projects", "owner": "alice",
                "configurations": [
                    { "id": 2, "class": "CONFIGURATION", "name": "nightly", "owner": "alice" }
                ]
            }
        ],
        "registries": [
            {
                "id": 1, "class": "DOCKER_REGISTRY", "name": "registry.local", "owner": "alice",
                "groups": [
                    {
                        "id": 2, "class": "TOOL_GROUP", "name": "library", "owner": "alice",
                        "tools": [ { "id": 3, "class": "TOOL", "name": "ubuntu", "owner": "alice" } ]
                    }
                ]
            }
        ],
        "acl": [
            { "class": "TOOL", "id": 3, "sid": { "name": "bob" }, "mask": "READ|EXECUTE" },
            { "class": "CONFIGURATION", "id": 2, "sid": { "name": "ROLE_OPS", "principal": false }, "mask": "READ" }
        ],
        "roles": { "bob": ["ROLE_OPS"] }
    }"#;

    #[test]
    fn test_sids_merge_recorded_and_extra_roles() {
        let snapshot: Snapshot = serde_json::from_str(SNAPSHOT).unwrap();

        let sids = snapshot.sids_for("bob", &["ROLE_DEV".to_string(), "ROLE_OPS".to_string()]);
        assert_eq!(sids.primary(), &Sid::principal("bob"));
        assert_eq!(sids.roles(), &[Sid::role("ROLE_OPS"), Sid::role("ROLE_DEV")]);

        assert!(snapshot.sids_for("carol", &[]).roles().is_empty());
    }

    #[tokio::test]
    async fn test_service_over_snapshot() {
        let snapshot: Snapshot = serde_json::from_str(SNAPSHOT).unwrap();
        let service = snapshot.service(ResolverConfig::default());

        let available = service
            .load_available(&snapshot.sids_for("bob", &[]), None)
            .await
            .unwrap();

        assert_eq!(available.len(), 2);
        assert_eq!(available[&AclClass::Tool][0].mask, Mask::READ | Mask::EXECUTE);
        assert_eq!(available[&AclClass::Configuration][0].name, "nightly");
    }

    #[test]
    fn test_load_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(Snapshot::load(&path), Err(SnapshotError::Json(_))));
        assert!(matches!(
            Snapshot::load(&dir.path().join("missing.json")),
            Err(SnapshotError::Io(_))
        ));
    }
}
