//! The wire-contract data model: [`Header`], [`Message`], and [`Meta`].
//!
//! These are kept `serde`-derivable (per §10.1 of SPEC_FULL.md) even though
//! this crate does not implement a wire codec itself — that is the log
//! transport's job. Keeping the types serialization-ready means a codec can
//! be layered on top without reaching back into this crate.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::{ContainerError, Result};
use crate::ids::{ObjectId, PartitionKey, VersionId};

/// Revision metadata carried by every message, independent of its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// The logical object this revision belongs to.
    pub object_id: ObjectId,
    /// Identity of this revision.
    pub version: VersionId,
    /// The single declared parent, if any.
    pub previous_version: Option<VersionId>,
    /// Additional parents when this revision was itself produced by merging.
    pub merges: HashSet<VersionId>,
    /// Logical type tag for the payload.
    pub payload_class: String,
    /// Whether this object inherits write permission from its parent.
    pub inherit_write: bool,
    /// Principals explicitly granted write access to this revision.
    pub allow_write: HashSet<String>,
}

/// Literal returned by [`crate::container::Container::payload_class`] on an
/// empty container, matching the original system's `"[null]"` sentinel.
pub const NULL_PAYLOAD_CLASS: &str = "[null]";

impl Header {
    /// True iff this header declares no write delegation at all: the object
    /// cannot be written by anyone but its original author.
    pub fn is_immutable(&self) -> bool {
        !self.inherit_write && self.allow_write.is_empty()
    }
}

/// A single log message: a header plus its (possibly absent) payload bytes.
///
/// An absent payload is a "tombstone-like" message — it still participates
/// in the version graph, it simply carries no body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Revision metadata.
    pub header: Header,
    /// Payload bytes, or `None` for a tombstone-like message.
    pub payload: Option<Bytes>,
}

impl Message {
    /// True iff this message carries a non-absent payload.
    pub fn has_payload(&self) -> bool {
        self.payload.is_some()
    }
}

/// Log-delivery coordinates: which partition, at what offset, at what time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    /// Partition (log shard) this message was delivered on.
    pub partition: PartitionKey,
    /// Offset within the partition.
    pub offset: i64,
    /// Delivery timestamp, in milliseconds.
    pub timestamp: i64,
}

/// A [`Meta`] that becomes read-only once inserted into a container.
///
/// The log bridge may still be populating `offset`/`timestamp` right up to
/// the moment of delivery, so `Meta` is mutable in general — but once a
/// [`crate::container::Container`] has linked a node into its graph, further
/// mutation would let a reader observe two different metas for the same
/// insertion, which breaks the "history is a stable snapshot" guarantee.
///
/// Freeze-violation policy (Open Question, resolved in SPEC_FULL.md §9):
/// [`FrozenMeta::try_set`] always returns `Err(ContainerError::FrozenMeta)`
/// and logs a `tracing::warn!`, in every build profile. A hard
/// `debug_assert!` was considered and rejected: it would unwind a panic the
/// instant the violation occurs, which makes the violation untestable (a
/// caller can never observe the recoverable error path) and crashes the host
/// process over what is, from this crate's point of view, just a caller bug.
#[derive(Debug)]
pub struct FrozenMeta {
    value: Meta,
    frozen: AtomicBool,
}

impl FrozenMeta {
    /// Wraps a freshly-arrived, not-yet-frozen meta.
    pub fn new(value: Meta) -> Self {
        Self {
            value,
            frozen: AtomicBool::new(false),
        }
    }

    /// Returns a copy of the current value.
    pub fn get(&self) -> Meta {
        self.value
    }

    /// True once [`FrozenMeta::freeze`] has been called.
    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    /// Marks this meta read-only. Called by `Container::add` exactly once,
    /// after the node has been linked into the graph.
    pub fn freeze(&self) {
        self.frozen.store(true, Ordering::Release);
    }

    /// Attempts to overwrite the value prior to freezing.
    pub fn try_set(&mut self, value: Meta) -> Result<()> {
        if self.is_frozen() {
            tracing::warn!("attempted to mutate a frozen meta value");
            return Err(ContainerError::FrozenMeta);
        }
        self.value = value;
        Ok(())
    }
}
