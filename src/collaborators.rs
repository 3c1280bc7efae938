//! External collaborator contracts consumed by the core (§6).
//!
//! None of these are implemented here — a host application supplies concrete
//! types for `DataSerializer`, `Merger`, `Authorization`, `LogBridge`, and
//! `PartitionResolver`. The core only depends on the trait boundary, the same
//! way `storage/index/label.rs` depends on `Arc<dyn PageStore>` rather than a
//! concrete page store.

use crate::error::Result;
use crate::header::Message;
use crate::ids::{ObjectId, PartitionKey, VersionId};

/// Deserializes a wire [`Message`] into the host's `Record` type.
///
/// Total in the sense the spec uses the word: failure is exceptional and
/// propagates as [`crate::error::ContainerError::SerializerFailed`] rather
/// than being encoded in the return type as an `Option`.
pub trait DataSerializer<R>: Send + Sync {
    /// Deserializes `message`, optionally performing a "deep" decode that
    /// resolves nested references the shallow form leaves unresolved.
    fn from_data_message(
        &self,
        partition: PartitionKey,
        message: &Message,
        deep: bool,
    ) -> Result<R>;
}

/// Three-way-merges divergent records (or headers, via the blanket
/// `Merger<Header>` a host may also supply).
///
/// `pairs[i] = (ancestor, leaf)`. An absent ancestor (`None`) means the
/// common parent was not known to the caller — the merger must cope with
/// that rather than treating it as an error. A `None` return means
/// "unmergeable".
pub trait Merger<T>: Send + Sync {
    /// Attempts to merge every `(ancestor, leaf)` pair into a single `T`.
    fn merge(&self, pairs: &[(Option<T>, T)]) -> Option<T>;
}

/// Rights a principal currently holds, opaque to the core.
///
/// The shape of "current rights" is left to the host; the core only ever
/// passes this value through to [`Permissions::can_write`].
pub trait CurrentRights {}

/// The write permissions computed for a given object/partition/parent.
pub trait Permissions {
    /// True iff `rights` is sufficient to write this object.
    ///
    /// Concretization (DESIGN.md): a permission set with no write
    /// requirement at all grants write access unconditionally — there is
    /// nothing for `rights` to satisfy.
    fn can_write(&self, rights: &dyn CurrentRights) -> bool;
}

/// Computes write permissions for an object.
pub trait Authorization: Send + Sync {
    /// `parent_id` is `None` when the caller has no single parent to ask
    /// about (the true multi-parent merge case, per DESIGN.md).
    fn perms(
        &self,
        partition: PartitionKey,
        object_id: ObjectId,
        parent_id: Option<VersionId>,
        compute_children: bool,
    ) -> Box<dyn Permissions>;
}

/// The append-only log itself, as seen by the core.
pub trait LogBridge<R>: Send + Sync {
    /// Fire-and-forget write-back of a reconciled merge result. Must not
    /// block the caller for I/O; failure is logged, never propagated to a
    /// read call.
    fn merge_async_without_validation(&self, record: &R);

    /// Synchronous barrier: blocks until every write up to `sync_token` on
    /// `partition` is durable.
    fn sync(&self, partition: PartitionKey, sync_token: u64) -> Result<()>;
}

/// Resolves which partition a record belongs to.
pub trait PartitionResolver<T>: Send + Sync {
    /// Total, pure: every record maps to exactly one partition.
    fn resolve(&self, record: &T) -> PartitionKey;
}
