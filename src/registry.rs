//! [`Registry`]: lazy per-`(partition, object)` container lookup (§10.5).
//!
//! Not part of spec.md itself — an enrichment so the crate is a runnable
//! system end-to-end rather than a library of disconnected parts (§10.5) —
//! but it is the concrete place §9's "registry-level lock before
//! container-level lock, never reverse" note is exercised: [`Registry::add`]
//! takes the registry lock only long enough to resolve or create the
//! target [`Container`], then drops it before the container's own lock is
//! ever touched.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::collaborators::{Authorization, CurrentRights, DataSerializer, LogBridge, Merger, PartitionResolver};
use crate::container::Container;
use crate::error::Result;
use crate::header::{Header, Message, Meta};
use crate::ids::{ObjectId, PartitionKey};
use crate::merge::MergeCacheOptions;
use crate::record::Versioned;

/// The collaborators every container the registry creates is wired with.
///
/// Bundled into one struct so `Registry::new` does not take eight positional
/// `Arc<dyn _>` arguments; mirrors the teacher's practice of grouping a
/// database handle's dependencies into a single config/builder type rather
/// than threading them individually (`db/core/graphdb.rs`).
pub struct Collaborators<R> {
    /// Deserializes messages into `R`.
    pub serializer: Arc<dyn DataSerializer<R>>,
    /// Merges divergent headers.
    pub header_merger: Arc<dyn Merger<Header>>,
    /// Merges divergent records.
    pub data_merger: Arc<dyn Merger<R>>,
    /// Computes write permissions for reconciling merge write-backs.
    pub authorization: Arc<dyn Authorization>,
    /// The rights of whichever principal is driving merge reconciliation.
    pub current_rights: Arc<dyn CurrentRights>,
    /// The append-only log.
    pub log_bridge: Arc<dyn LogBridge<R>>,
    /// Resolves the target partition for a freshly-produced record, prior
    /// to it ever reaching the log (a producer-side concern distinct from
    /// `Container::add`'s `meta.partition`, which is already resolved by
    /// the time a message is replayed from the log — see DESIGN.md).
    pub partition_resolver: Arc<dyn PartitionResolver<R>>,
    /// Deserialization cache shard layout for every container this registry
    /// creates.
    pub cache_options: MergeCacheOptions,
}

/// Routes incoming messages to the container for their `(partition,
/// object_id)`, creating containers lazily on first arrival.
pub struct Registry<R> {
    containers: RwLock<HashMap<(PartitionKey, ObjectId), Arc<Container<R>>>>,
    collaborators: Collaborators<R>,
}

impl<R> Registry<R>
where
    R: Versioned + Clone,
{
    /// Creates an empty registry wired with the collaborators every
    /// lazily-created container will share.
    pub fn new(collaborators: Collaborators<R>) -> Self {
        Self {
            containers: RwLock::new(HashMap::new()),
            collaborators,
        }
    }

    /// Looks up (or lazily creates) the container for `(partition,
    /// object_id)`.
    ///
    /// Takes the registry lock, never a container's lock, so this never
    /// violates §9's lock ordering even though it is the only place a new
    /// `Container` is constructed.
    pub fn container_for(&self, partition: PartitionKey, object_id: ObjectId) -> Arc<Container<R>> {
        if let Some(existing) = self.containers.read().get(&(partition, object_id)) {
            return existing.clone();
        }

        let mut containers = self.containers.write();
        containers
            .entry((partition, object_id))
            .or_insert_with(|| {
                tracing::info!(%partition, object = %object_id, "creating container");
                Arc::new(Container::new(
                    partition,
                    object_id,
                    self.collaborators.serializer.clone(),
                    self.collaborators.header_merger.clone(),
                    self.collaborators.data_merger.clone(),
                    self.collaborators.authorization.clone(),
                    self.collaborators.current_rights.clone(),
                    self.collaborators.log_bridge.clone(),
                    self.collaborators.cache_options,
                ))
            })
            .clone()
    }

    /// Resolves the target container for `message` via `meta.partition` and
    /// forwards the insertion to it.
    pub fn add(&self, message: Message, meta: Meta) -> Result<()> {
        let container = self.container_for(meta.partition, message.header.object_id);
        container.add(message, meta)
    }

    /// The partition a freshly-produced (not yet logged) record would be
    /// routed to, via the registry's [`PartitionResolver`].
    pub fn partition_for(&self, record: &R) -> PartitionKey {
        self.collaborators.partition_resolver.resolve(record)
    }

    /// Number of containers currently held, for diagnostics and tests.
    pub fn container_count(&self) -> usize {
        self.containers.read().len()
    }
}
