//! Translation between graph-model identifiers and dense scene slots.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use super::error::{EntityKind, Result, SpaceError};
use super::slots::Slot;

/// Identifier issued by the external graph model.
pub trait ExternalId: Copy + Eq + Hash + fmt::Debug {
    const KIND: EntityKind;

    fn raw(self) -> u64;
}

macro_rules! external_id {
    ($name:ident, $kind:expr) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl ExternalId for $name {
            const KIND: EntityKind = $kind;

            fn raw(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

external_id!(NodeId, EntityKind::Node);
external_id!(LinkId, EntityKind::Link);
external_id!(SphereId, EntityKind::Sphere);

/// Bijection between live external IDs and slots of one entity kind.
#[derive(Debug, Clone)]
pub struct IdentityMap<R: ExternalId> {
    remote_to_local: HashMap<R, Slot>,
    local_to_remote: HashMap<Slot, R>,
}

impl<R: ExternalId> Default for IdentityMap<R> {
    fn default() -> Self {
        Self {
            remote_to_local: HashMap::new(),
            local_to_remote: HashMap::new(),
        }
    }
}

impl<R: ExternalId> IdentityMap<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_remote_id(&mut self, remote: R, local: Slot) -> Result<()> {
        if self.remote_to_local.contains_key(&remote) {
            return Err(SpaceError::DuplicateId {
                kind: R::KIND,
                id: remote.raw(),
            });
        }
        if self.local_to_remote.contains_key(&local) {
            return Err(SpaceError::SlotInUse {
                kind: R::KIND,
                slot: local,
            });
        }
        self.remote_to_local.insert(remote, local);
        self.local_to_remote.insert(local, remote);
        Ok(())
    }

    pub fn contains_remote_id(&self, remote: R) -> bool {
        self.remote_to_local.contains_key(&remote)
    }

    pub fn contains_local_id(&self, local: Slot) -> bool {
        self.local_to_remote.contains_key(&local)
    }

    pub fn get_local_id(&self, remote: R) -> Result<Slot> {
        self.remote_to_local
            .get(&remote)
            .copied()
            .ok_or(SpaceError::NotFound {
                kind: R::KIND,
                id: remote.raw(),
            })
    }

    pub fn get_remote_id(&self, local: Slot) -> Option<R> {
        self.local_to_remote.get(&local).copied()
    }

    /// Removes the pair `(remote, local)`. Fails without touching either direction
    /// when `remote` is unknown or bound to another slot.
    pub fn erase_remote_id(&mut self, remote: R, local: Slot) -> Result<()> {
        let bound = self.get_local_id(remote)?;
        if bound != local {
            return Err(SpaceError::Mismatch {
                kind: R::KIND,
                id: remote.raw(),
                slot: local,
            });
        }
        self.remote_to_local.remove(&remote);
        self.local_to_remote.remove(&local);
        Ok(())
    }

    /// Removes whatever external ID is bound to `local`, for callers that only know the slot.
    pub fn remove_local_id(&mut self, local: Slot) -> Option<R> {
        let remote = self.local_to_remote.remove(&local)?;
        self.remote_to_local.remove(&remote);
        Some(remote)
    }

    pub fn len(&self) -> usize {
        self.remote_to_local.len()
    }

    pub fn is_empty(&self) -> bool {
        self.remote_to_local.is_empty()
    }

    pub fn clear(&mut self) {
        self.remote_to_local.clear();
        self.local_to_remote.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (R, Slot)> + '_ {
        self.remote_to_local.iter().map(|(r, l)| (*r, *l))
    }
}
