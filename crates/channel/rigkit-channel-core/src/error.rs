//! Error taxonomy for channel and curve operations.
//!
//! Most conditions here are recoverable by design: readers fall back to
//! value snapshots, writers skip refused fields, and the copy orchestrator
//! records per-pair failures without aborting the batch.

use thiserror::Error;

use crate::value::StorageKind;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChannelError {
    /// Channel name could not be resolved on the target object.
    #[error("channel '{0}' not found")]
    ChannelNotFound(String),

    /// Channel is not curve-bound where a curve was required.
    #[error("no curve bound to channel {0}")]
    CurveNotBound(String),

    /// No keyframe exists at the requested time.
    #[error("no key at time {0}")]
    KeyNotFound(f64),

    /// The storage kind cannot carry the requested value or curve.
    #[error("storage kind {0:?} cannot carry this value")]
    TypeMismatch(StorageKind),

    /// The host curve system refused a per-field sub-write.
    #[error("host refused: {0}")]
    HostRejected(&'static str),

    /// Malformed input for a single channel pair; never aborts a batch.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
