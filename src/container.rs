//! [`Container`]: per-key version graph, ingestion, and frontier/timeline
//! query surface (§4.1, §5).

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use indexmap::IndexSet;
use parking_lot::RwLock;

use crate::collaborators::{Authorization, CurrentRights, DataSerializer, LogBridge, Merger};
use crate::error::Result;
use crate::header::{Header, Message, Meta, NULL_PAYLOAD_CLASS};
use crate::ids::{ObjectId, PartitionKey, VersionId};
use crate::merge::{LeafContext, MergeCacheOptions, MergeDriver};
use crate::node::GraphNode;
use crate::record::Versioned;

/// The mutable, lock-protected state of a [`Container`] (§3's `Container`
/// entity, minus the lock and collaborators which live one level up).
struct ContainerState {
    lookup: HashMap<VersionId, GraphNode>,
    timeline: Vec<VersionId>,
    leaves: IndexSet<VersionId>,
    /// Every version ever declared as a `previous_version` or `merges`
    /// entry, present or not. A version in this set can never be a leaf,
    /// regardless of whether it has arrived yet — arrival order must not
    /// change the final leaf set (§8).
    referenced: HashSet<VersionId>,
}

impl ContainerState {
    fn new() -> Self {
        Self {
            lookup: HashMap::new(),
            timeline: Vec::new(),
            leaves: IndexSet::new(),
            referenced: HashSet::new(),
        }
    }

    fn leaf_context(&self, version: VersionId) -> LeafContext {
        let node = &self.lookup[&version];
        let parent = node
            .parent
            .and_then(|parent_id| self.lookup.get(&parent_id))
            .map(|parent_node| parent_node.message.clone());
        LeafContext {
            version,
            message: node.message.clone(),
            parent,
        }
    }
}

/// A single logical object's reconstructed version DAG, as replayed from one
/// partition of the append-only log.
///
/// Exclusively owns its nodes and indices (§3's Ownership note); all access
/// goes through [`ContainerState`]'s reader/writer lock. Holds only a
/// back-reference to its partition, never the log itself.
pub struct Container<R> {
    partition: PartitionKey,
    object_id: ObjectId,
    state: RwLock<ContainerState>,
    merge_driver: MergeDriver<R>,
}

impl<R> Container<R>
where
    R: Versioned + Clone,
{
    /// Creates an empty container for `object_id` on `partition`, wired with
    /// its collaborators (§10.4: no ambient singleton, explicit DI per §9).
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        partition: PartitionKey,
        object_id: ObjectId,
        serializer: Arc<dyn DataSerializer<R>>,
        header_merger: Arc<dyn Merger<Header>>,
        data_merger: Arc<dyn Merger<R>>,
        authorization: Arc<dyn Authorization>,
        current_rights: Arc<dyn CurrentRights>,
        log_bridge: Arc<dyn LogBridge<R>>,
        cache_options: MergeCacheOptions,
    ) -> Self {
        Self {
            partition,
            object_id,
            state: RwLock::new(ContainerState::new()),
            merge_driver: MergeDriver::new(
                serializer,
                header_merger,
                data_merger,
                authorization,
                current_rights,
                log_bridge,
                cache_options,
            ),
        }
    }

    /// The partition this container was reconstructed from.
    pub fn partition(&self) -> PartitionKey {
        self.partition
    }

    /// The object this container holds the lineage of.
    pub fn object_id(&self) -> ObjectId {
        self.object_id
    }

    /// Idempotent insertion. A message already present by `version` is a
    /// no-op. Implements the ingestion algorithm of §4.1 under the writer
    /// lock.
    pub fn add(&self, message: Message, meta: Meta) -> Result<()> {
        let version = message.header.version;
        let mut state = self.state.write();

        if state.lookup.contains_key(&version) {
            return Ok(());
        }

        let mut node = GraphNode::new(message, meta);

        if let Some(previous) = node.message.header.previous_version {
            if let Some(parent_node) = state.lookup.get_mut(&previous) {
                if !parent_node.children.contains(&version) {
                    parent_node.children.push(version);
                }
                node.parent = Some(previous);
                state.leaves.shift_remove(&previous);
            }
            state.referenced.insert(previous);
        }

        for &merged_parent in &node.message.header.merges {
            if state.lookup.contains_key(&merged_parent) {
                state.leaves.shift_remove(&merged_parent);
            }
            state.referenced.insert(merged_parent);
        }

        node.meta.freeze();
        state.lookup.insert(version, node);
        if !state.referenced.contains(&version) {
            state.leaves.insert(version);
        }
        state.timeline.push(version);

        tracing::info!(
            object = %self.object_id,
            version = %version,
            leaves = state.leaves.len(),
            "ingested revision"
        );

        Ok(())
    }

    /// The last-inserted message, or `None` on an empty container.
    pub fn last(&self) -> Option<Message> {
        let state = self.state.read();
        let version = *state.timeline.last()?;
        state.lookup.get(&version).map(|node| node.message.clone())
    }

    /// [`Container::last`]'s header.
    pub fn last_header(&self) -> Option<Header> {
        self.last().map(|message| message.header)
    }

    /// [`Container::last`]'s delivery offset.
    pub fn last_offset(&self) -> Option<i64> {
        let state = self.state.read();
        let version = *state.timeline.last()?;
        state.lookup.get(&version).map(|node| node.meta.get().offset)
    }

    /// [`Container::last`]'s deserialized payload, via the data serializer.
    pub fn last_data(&self) -> Result<Option<R>> {
        let Some(message) = self.last() else {
            return Ok(None);
        };
        self.merge_driver.deserialize(self.partition, &message).map(Some)
    }

    /// True iff the last message carries a non-absent payload.
    pub fn has_payload(&self) -> bool {
        self.last().is_some_and(|message| message.has_payload())
    }

    /// True iff the last header declares no write delegation.
    pub fn immutable(&self) -> bool {
        self.last_header()
            .map(|header| header.is_immutable())
            .unwrap_or(false)
    }

    /// The last header's payload class, or `"[null]"` on an empty container.
    pub fn payload_class(&self) -> String {
        self.last_header()
            .map(|header| header.payload_class)
            .unwrap_or_else(|| NULL_PAYLOAD_CLASS.to_string())
    }

    /// Insertion-order snapshot of every meta recorded so far.
    pub fn history(&self) -> Vec<Meta> {
        let state = self.state.read();
        state
            .timeline
            .iter()
            .filter_map(|version| state.lookup.get(version).map(|node| node.meta.get()))
            .collect()
    }

    /// Snapshot of the current frontier, in surviving insertion order.
    pub fn leaves(&self) -> Vec<VersionId> {
        self.state.read().leaves.iter().copied().collect()
    }

    /// Snapshot of insertion order.
    pub fn timeline(&self) -> Vec<VersionId> {
        self.state.read().timeline.clone()
    }

    /// `version`'s resolved parent, if any.
    pub fn parent_of(&self, version: VersionId) -> Option<VersionId> {
        self.state.read().lookup.get(&version)?.parent
    }

    /// `version`'s children, in link order.
    pub fn children_of(&self, version: VersionId) -> Vec<VersionId> {
        self.state
            .read()
            .lookup
            .get(&version)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    /// True iff `version` has been ingested.
    pub fn contains(&self, version: VersionId) -> bool {
        self.state.read().lookup.contains_key(&version)
    }

    /// §4.2 `merged_header()`: the reconciled header across the current
    /// frontier.
    pub fn merged_header(&self) -> Result<Header> {
        let leaves = self.snapshot_leaves();
        self.merge_driver.merged_header(&leaves)
    }

    /// §4.2 `merged_data()`: the reconciled record across the current
    /// frontier, dispatching an asynchronous write-back on a true
    /// multi-parent merge.
    pub fn merged_data(&self) -> Result<Option<R>> {
        let leaves = self.snapshot_leaves();
        self.merge_driver
            .merged_data(self.partition, self.object_id, &leaves)
    }

    /// Captures an owned snapshot of the frontier (and each leaf's resolved
    /// parent) while holding the reader lock, then releases it — per §5, the
    /// merge driver must never run while the container lock is held.
    fn snapshot_leaves(&self) -> Vec<LeafContext> {
        let state = self.state.read();
        state
            .leaves
            .iter()
            .map(|&version| state.leaf_context(version))
            .collect()
    }
}
