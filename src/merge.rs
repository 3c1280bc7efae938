//! [`MergeDriver`]: three-way reconciliation across a container's frontier
//! (§4.2), and the sharded deserialization cache it uses to avoid
//! re-deserializing the same leaf or parent record twice.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::collaborators::{Authorization, CurrentRights, DataSerializer, LogBridge, Merger};
use crate::error::{ContainerError, Result};
use crate::header::{Header, Message};
use crate::ids::{ObjectId, PartitionKey, VersionId};
use crate::record::Versioned;

/// Shard count / per-shard capacity for [`DeserializationCache`], mirroring
/// the teacher's `VersionCache::new(shards, capacity)` constructor shape.
#[derive(Debug, Clone, Copy)]
pub struct MergeCacheOptions {
    /// Number of independently-locked shards.
    pub shards: usize,
    /// Maximum entries retained per shard.
    pub capacity_per_shard: usize,
}

impl Default for MergeCacheOptions {
    fn default() -> Self {
        Self {
            shards: 8,
            capacity_per_shard: 256,
        }
    }
}

/// A sharded LRU cache of deserialized records, keyed by [`VersionId`].
///
/// Adapted from `storage/graph/version_cache.rs`'s `VersionCache`: multiple
/// independently-locked `lru::LruCache` shards rather than one cache behind
/// one lock, so deserializing leaf `A` and parent `B` concurrently does not
/// serialize on a single mutex.
pub struct DeserializationCache<R> {
    shards: Vec<Mutex<lru::LruCache<VersionId, R>>>,
}

impl<R: Clone> DeserializationCache<R> {
    /// Builds a cache with the given shard layout.
    pub fn new(options: MergeCacheOptions) -> Self {
        let capacity = std::num::NonZeroUsize::new(options.capacity_per_shard.max(1)).unwrap();
        let shards = (0..options.shards.max(1))
            .map(|_| Mutex::new(lru::LruCache::new(capacity)))
            .collect();
        Self { shards }
    }

    fn shard_for(&self, version: VersionId) -> &Mutex<lru::LruCache<VersionId, R>> {
        let mut hasher = DefaultHasher::new();
        version.hash(&mut hasher);
        &self.shards[(hasher.finish() as usize) % self.shards.len()]
    }

    /// Returns the cached record for `version`, computing and memoizing it
    /// via `deserialize` on a miss.
    pub fn get_or_try_insert_with(
        &self,
        version: VersionId,
        deserialize: impl FnOnce() -> Result<R>,
    ) -> Result<R> {
        let shard = self.shard_for(version);
        if let Some(hit) = shard.lock().get(&version).cloned() {
            return Ok(hit);
        }
        let value = deserialize()?;
        shard.lock().put(version, value.clone());
        Ok(value)
    }
}

/// A leaf and its resolved parent, as seen from the container's frontier,
/// captured as an owned snapshot so [`MergeDriver`] never runs while a
/// container's lock is held (§5's write-back safety rule).
pub struct LeafContext {
    /// The leaf's own version.
    pub version: VersionId,
    /// The leaf's message.
    pub message: Message,
    /// The leaf's resolved parent message, if its `previous_version` is
    /// present in the container.
    pub parent: Option<Message>,
}

/// Performs the reconciling three-way merge over a container's frontier.
///
/// Holds the collaborators §6 names plus the deserialization cache; owned by
/// a [`crate::container::Container`] and invoked only with data already
/// snapshotted outside that container's lock.
pub struct MergeDriver<R> {
    serializer: Arc<dyn DataSerializer<R>>,
    header_merger: Arc<dyn Merger<Header>>,
    data_merger: Arc<dyn Merger<R>>,
    authorization: Arc<dyn Authorization>,
    current_rights: Arc<dyn CurrentRights>,
    log_bridge: Arc<dyn LogBridge<R>>,
    cache: DeserializationCache<R>,
}

impl<R> MergeDriver<R>
where
    R: Versioned + Clone,
{
    /// Wires the driver with its collaborators and cache layout.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        serializer: Arc<dyn DataSerializer<R>>,
        header_merger: Arc<dyn Merger<Header>>,
        data_merger: Arc<dyn Merger<R>>,
        authorization: Arc<dyn Authorization>,
        current_rights: Arc<dyn CurrentRights>,
        log_bridge: Arc<dyn LogBridge<R>>,
        cache_options: MergeCacheOptions,
    ) -> Self {
        Self {
            serializer,
            header_merger,
            data_merger,
            authorization,
            current_rights,
            log_bridge,
            cache: DeserializationCache::new(cache_options),
        }
    }

    /// Deserializes a single message, memoizing via the shared cache.
    /// Used directly by [`crate::container::Container::last_data`], which
    /// has no pair to reconcile.
    pub fn deserialize(&self, partition: PartitionKey, message: &Message) -> Result<R> {
        self.cache.get_or_try_insert_with(message.header.version, || {
            self.serializer.from_data_message(partition, message, true)
        })
    }

    /// §4.2 `merged_header()`.
    pub fn merged_header(&self, leaves: &[LeafContext]) -> Result<Header> {
        match leaves.len() {
            0 => Err(ContainerError::EmptyGraph),
            1 => Ok(leaves[0].message.header.clone()),
            _ => {
                let pairs: Vec<(Option<Header>, Header)> = leaves
                    .iter()
                    .map(|leaf| {
                        (
                            leaf.parent.as_ref().map(|p| p.header.clone()),
                            leaf.message.header.clone(),
                        )
                    })
                    .collect();
                self.header_merger
                    .merge(&pairs)
                    .ok_or(ContainerError::MergeFailed)
            }
        }
    }

    /// §4.2 `merged_data()`.
    pub fn merged_data(
        &self,
        partition: PartitionKey,
        object_id: ObjectId,
        leaves: &[LeafContext],
    ) -> Result<Option<R>> {
        if leaves.is_empty() {
            return Err(ContainerError::EmptyGraph);
        }

        let deserialize = |message: &Message| -> Result<R> {
            self.cache.get_or_try_insert_with(message.header.version, || {
                self.serializer.from_data_message(partition, message, true)
            })
        };

        if leaves.len() == 1 {
            let leaf = &leaves[0];
            let leaf_record = deserialize(&leaf.message)?;
            let parent_record = leaf.parent.as_ref().map(deserialize).transpose()?;
            let pairs = [(parent_record, leaf_record.clone())];
            let merged = self.data_merger.merge(&pairs);
            return Ok(Some(match merged {
                Some(mut reconciled) => {
                    reconciled.set_previous_version(Some(leaf.version));
                    reconciled
                }
                None => leaf_record,
            }));
        }

        let mut pairs = Vec::with_capacity(leaves.len());
        for leaf in leaves {
            let leaf_record = deserialize(&leaf.message)?;
            let parent_record = leaf.parent.as_ref().map(deserialize).transpose()?;
            pairs.push((parent_record, leaf_record));
        }

        let mut merged = self
            .data_merger
            .merge(&pairs)
            .ok_or(ContainerError::MergeFailed)?;

        merged.set_previous_version(None);
        merged.set_version(VersionId::new_random());
        merged.set_merges(leaves.iter().map(|leaf| leaf.version).collect());

        let permissions = self.authorization.perms(partition, object_id, None, false);
        if permissions.can_write(self.current_rights.as_ref()) {
            tracing::info!(object = %object_id, "dispatching reconciling merge write-back");
            self.log_bridge.merge_async_without_validation(&merged);
        }

        Ok(Some(merged))
    }
}
