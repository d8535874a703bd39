//! Identifiers for scene objects and their channels.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle to a scene object. Allocation is owned by the host.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

/// Reference to a single animatable channel: identity is object handle plus
/// channel index. Indices are only meaningful within the owning object.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ChannelRef {
    pub object: ObjectId,
    pub index: u32,
}

impl ChannelRef {
    pub fn new(object: ObjectId, index: u32) -> Self {
        Self { object, index }
    }

    /// Render the reference as a string ident for diagnostics and logs.
    pub fn ident(&self) -> String {
        format!("obj{}:{}", self.object.0, self.index)
    }
}

impl fmt::Display for ChannelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obj{}:{}", self.object.0, self.index)
    }
}
