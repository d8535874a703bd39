//! Rigkit Channel Core (host-agnostic)
//!
//! Channel-level data transport for a rigging kit: snapshot a channel's
//! value, a single keyframe, or its whole curve into a serializable
//! [`ChannelPack`], and apply packs back under explicit write policies.
//! On top of the codec sit a static-key filter and a batch copy
//! orchestrator with name-based mirroring rules. The crate holds no scene
//! state of its own; hosts supply it through the traits in [`host`].

pub mod copy;
pub mod error;
pub mod filter;
pub mod host;
pub mod ids;
pub mod keycodec;
pub mod links;
pub mod mirror;
pub mod pack;
pub mod reader;
pub mod value;
pub mod writer;

// Re-exports for consumers (host adapters)
pub use copy::{copy_all_channels, copy_channels, CopyOptions, CopyReport};
pub use error::ChannelError;
pub use filter::{filter_channel, filter_static_keys, FilterOutcome};
pub use host::{BreakFlags, ChannelSink, ChannelSource, ChannelStore, Curve, KeyId, LinkGraph};
pub use ids::{ChannelRef, ObjectId};
pub use keycodec::{key_count, key_exists, read_key, time_range, write_key};
pub use links::ChannelLinks;
pub use mirror::{mirror_copy, MirrorRules};
pub use pack::{
    ChannelPack, EndBehavior, EnvelopePack, Interpolation, KeySlope, KeyValue, KeyWeight,
    KeyframePack, PackContent, Side, SideSel, Slope, SlopeKind,
};
pub use reader::{
    channel_time_range, is_animated, is_keyframed, read_pack, read_pack_by_name, read_value,
    ReadMode,
};
pub use value::{ChannelValue, StorageKind};
pub use writer::{
    write_pack, write_pack_by_name, write_value, EnvelopeWriteMode, WriteMode, WriteOptions,
};
