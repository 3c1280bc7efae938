//! # lineage - per-key version graph store
//!
//! `lineage` reconstructs, from an arbitrary-order replay of a partitioned,
//! append-only commit log, the version DAG of every logical object the log
//! carries: who descends from whom, which revisions are currently divergent
//! tips, and what a reconciled view across those tips looks like.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use lineage::{Collaborators, Registry};
//!
//! # fn wire_collaborators<R>() -> Collaborators<R> { unimplemented!() }
//! let registry: Registry<MyRecord> = Registry::new(wire_collaborators());
//! # #[derive(Clone)]
//! # struct MyRecord;
//! # impl lineage::Versioned for MyRecord {
//! #     fn version(&self) -> lineage::VersionId { unimplemented!() }
//! #     fn set_version(&mut self, _: lineage::VersionId) {}
//! #     fn previous_version(&self) -> Option<lineage::VersionId> { None }
//! #     fn set_previous_version(&mut self, _: Option<lineage::VersionId>) {}
//! #     fn merges(&self) -> &std::collections::HashSet<lineage::VersionId> { unimplemented!() }
//! #     fn set_merges(&mut self, _: std::collections::HashSet<lineage::VersionId>) {}
//! # }
//! ```
//!
//! ## What this crate does not do
//!
//! It does not decode bytes off a wire, does not talk to any particular log
//! implementation, and does not compute permissions or perform three-way
//! text merges itself — those are the `DataSerializer`, `LogBridge`,
//! `Authorization`, and `Merger` collaborator traits in [`collaborators`],
//! which a host application implements. This crate owns exactly the graph
//! reconstruction, frontier tracking, and reconciliation-orchestration
//! logic sitting between those collaborators.
//!
//! ## Architecture
//!
//! - [`header`] — the wire-contract data model (`Header`, `Message`, `Meta`).
//! - [`record`] — the `Versioned` trait an opaque host `Record` type must
//!   implement so [`merge::MergeDriver`] can stamp a reconciled write-back.
//! - [`node`] — `GraphNode`, the arena-keyed DAG unit.
//! - [`container`] — `Container`, the per-object version graph and its
//!   public query surface.
//! - [`merge`] — `MergeDriver` and its sharded deserialization cache.
//! - [`transaction`] — `TransactionCoordinator`, session-scoped flush
//!   coordination.
//! - [`registry`] — `Registry`, lazy per-`(partition, object)` container
//!   lookup.

pub mod collaborators;
pub mod container;
pub mod error;
pub mod header;
pub mod ids;
pub mod logging;
pub mod merge;
pub mod node;
pub mod record;
pub mod registry;
pub mod transaction;

pub use crate::collaborators::{
    Authorization, CurrentRights, DataSerializer, LogBridge, Merger, PartitionResolver,
    Permissions,
};
pub use crate::container::Container;
pub use crate::error::{ContainerError, Result};
pub use crate::header::{FrozenMeta, Header, Message, Meta, NULL_PAYLOAD_CLASS};
pub use crate::ids::{ObjectId, PartitionKey, VersionId};
pub use crate::logging::init_logging;
pub use crate::merge::{DeserializationCache, LeafContext, MergeCacheOptions, MergeDriver};
pub use crate::node::GraphNode;
pub use crate::record::Versioned;
pub use crate::registry::{Collaborators, Registry};
pub use crate::transaction::{SessionEvent, SyncToken, TransactionCoordinator};
