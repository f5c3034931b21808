//! Error taxonomy for scene mutations and queries.

use std::fmt;

use thiserror::Error;

/// Kind of scene entity an identifier or slot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Node,
    Link,
    Sphere,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Node => f.write_str("node"),
            EntityKind::Link => f.write_str("link"),
            EntityKind::Sphere => f.write_str("sphere"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SpaceError {
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: u64 },

    #[error("{kind} {id} is already registered")]
    DuplicateId { kind: EntityKind, id: u64 },

    #[error("{kind} slot {slot} is already bound")]
    SlotInUse { kind: EntityKind, slot: usize },

    #[error("{kind} {id} is not bound to slot {slot}")]
    Mismatch { kind: EntityKind, id: u64, slot: usize },

    #[error("'{name}' ({ty}) {kind} attribute ignored")]
    InvalidAttribute {
        kind: &'static str,
        name: String,
        ty: String,
    },

    #[error("graph is empty")]
    EmptyGraph,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SpaceError {
    /// Errors the event stream logs and moves past without treating the event as a caller bug.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SpaceError::InvalidAttribute { .. } | SpaceError::EmptyGraph)
    }
}

pub type Result<T> = std::result::Result<T, SpaceError>;
