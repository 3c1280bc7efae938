//! Crate-wide error type.
//!
//! Mirrors the teacher's flat, `thiserror`-derived error enum: one variant
//! per failure kind the core can actually raise, no catch-all `Other(String)`.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ContainerError>;

/// Every failure kind the version graph store can raise.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// A merged view was requested on a container with zero leaves.
    #[error("merged view requested on a container with no leaves")]
    EmptyGraph,
    /// The merger returned no result for a frontier with two or more leaves.
    #[error("merger returned no result for a divergent frontier")]
    MergeFailed,
    /// The `DataSerializer` collaborator failed to produce a record.
    #[error("serializer failed to produce a record: {0}")]
    SerializerFailed(String),
    /// The log bridge could not complete a `sync` or write-back call.
    #[error("log bridge unavailable: {0}")]
    LogUnavailable(String),
    /// A caller attempted to mutate a `Meta` value after it was frozen.
    #[error("attempted to mutate a frozen meta value")]
    FrozenMeta,
}
