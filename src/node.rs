//! [`GraphNode`]: the arena-keyed unit of the version DAG.
//!
//! Per §9's design note, cyclic object graphs (node ↔ parent, node →
//! children) are expressed with an arena keyed by `version` and *keys*, never
//! raw owning references — the arena is `Container`'s
//! `HashMap<VersionId, GraphNode>`, and `parent`/`children` below hold
//! `VersionId`s that index back into it.

use crate::header::{FrozenMeta, Message};
use crate::ids::VersionId;

/// One revision in the graph: its message, lineage pointers, and a frozen
/// meta.
#[derive(Debug)]
pub struct GraphNode {
    /// The message this node was built from.
    pub message: Message,
    /// This node's own version, duplicated from `message.header.version`
    /// for convenient access without re-reaching into the header.
    pub version: VersionId,
    /// The single declared parent, resolved to an arena key once the
    /// parent is known to be present. `None` either when there is no
    /// declared parent or the parent has not arrived yet (orphan).
    pub parent: Option<VersionId>,
    /// Children that declared this node as their `previous_version`,
    /// in the order they were linked. Append-only.
    pub children: Vec<VersionId>,
    /// Delivery coordinates, frozen once this node is linked into a
    /// container.
    pub meta: FrozenMeta,
}

impl GraphNode {
    /// Builds a fresh, not-yet-linked node from an incoming message and its
    /// delivery meta.
    pub fn new(message: Message, meta: crate::header::Meta) -> Self {
        let version = message.header.version;
        Self {
            message,
            version,
            parent: None,
            children: Vec::new(),
            meta: FrozenMeta::new(meta),
        }
    }
}
