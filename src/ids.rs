//! Identity types: object/version UUIDs and the partition key.
//!
//! `VersionId`/`ObjectId` wrap `Uuid` rather than aliasing it so the two are
//! never accidentally interchangeable at a call site — `lookup.get(version)`
//! and `registry.get(object_id)` should not typecheck against each other.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies a logical object: the thing a `Container` holds the lineage of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub Uuid);

impl ObjectId {
    /// Generates a fresh random object id.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Identifies a single revision. Globally unique across all objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VersionId(pub Uuid);

impl VersionId {
    /// Generates a fresh random version id, used when `MergeDriver` mints a
    /// reconciling version for a true multi-parent merge.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Identifies the log shard a `Container` belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartitionKey(pub i64);

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_ids_are_distinct() {
        let a = VersionId::new_random();
        let b = VersionId::new_random();
        assert_ne!(a, b);
    }

    #[test]
    fn display_matches_uuid_display() {
        let uuid = Uuid::new_v4();
        let version = VersionId(uuid);
        assert_eq!(version.to_string(), uuid.to_string());
    }
}
