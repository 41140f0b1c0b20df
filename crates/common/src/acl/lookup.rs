use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;

use crate::entity::ObjectIdentity;
use crate::security::{Mask, Sid, SidSet};

/// Access to the per-object access control entries recorded for an identity.
///
/// How entries are stored, and how a single entry's mask is computed from
///  whatever the store keeps, is up to the implementation. Failures are
///  surfaced as-is: retries belong to the implementation, not the caller.
#[async_trait]
pub trait PermissionLookup: Send + Sync + std::fmt::Debug {
    /// The raw mask of the entry recorded for `sid` on `object`.
    ///
    /// # Returns
    /// * `Ok(Some(mask))` - the sid has an own entry on the object
    /// * `Ok(None)` - no own entry, the object inherits from its parent
    /// * `Err(anyhow::Error)` - the backing store failed
    async fn own_mask(&self, sid: &Sid, object: ObjectIdentity)
        -> Result<Option<Mask>, anyhow::Error>;

    /// Fetch every own entry of every sid in `sids` on each of `objects`.
    ///
    /// The default implementation issues one [`own_mask`](Self::own_mask)
    ///  call per (sid, object) pair; stores that can batch should override it.
    async fn own_masks(
        &self,
        sids: &SidSet,
        objects: &BTreeSet<ObjectIdentity>,
    ) -> Result<AclSnapshot, anyhow::Error> {
        let mut snapshot = AclSnapshot::new();
        for object in objects {
            for sid in sids.iter() {
                if let Some(mask) = self.own_mask(sid, *object).await? {
                    snapshot.insert(*object, sid.clone(), mask);
                }
            }
        }
        Ok(snapshot)
    }
}

/// Own entries fetched ahead of a resolution, so the tree walk itself
///  stays synchronous and free of I/O.
#[derive(Debug, Clone, Default)]
pub struct AclSnapshot {
    entries: HashMap<ObjectIdentity, HashMap<Sid, Mask>>,
}

impl AclSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, object: ObjectIdentity, sid: Sid, mask: Mask) {
        self.entries.entry(object).or_default().insert(sid, mask);
    }

    pub fn get(&self, object: ObjectIdentity, sid: &Sid) -> Option<Mask> {
        self.entries
            .get(&object)
            .and_then(|by_sid| by_sid.get(sid))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
