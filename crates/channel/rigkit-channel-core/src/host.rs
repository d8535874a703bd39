//! Host interface traits.
//!
//! The core never owns scene state: every operation runs against a pair of
//! explicit contexts supplied by the host — a [`ChannelSource`] for reads
//! (which also carries the "current time") and a [`ChannelSink`] for
//! writes. Curves are reached through the same contexts and manipulated via
//! the [`Curve`] trait using opaque [`KeyId`] handles, a restartable
//! replacement for a stateful keyframe cursor: "no such key" is an
//! `Option`, never control flow by exception.

use crate::error::ChannelError;
use crate::ids::{ChannelRef, ObjectId};
use crate::pack::{EndBehavior, Interpolation, Side, SideSel, SlopeKind};
use crate::value::StorageKind;

/// Opaque handle to a keyframe within one curve. Handles stay valid until
/// the key they name is deleted; they are never reused within a curve.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct KeyId(pub u64);

/// Which per-key properties differ between the key's in and out sides.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct BreakFlags {
    pub value: bool,
    pub slope: bool,
    pub weight: bool,
}

/// A keyframe store bound to one channel.
///
/// Accessors taking a `KeyId` require a live handle; per-field accessors
/// and mutators may return [`ChannelError::HostRejected`] when the curve
/// system refuses that field for the key's current slope kind.
pub trait Curve {
    fn is_int(&self) -> bool;
    fn interpolation(&self) -> Interpolation;
    fn set_interpolation(&mut self, interpolation: Interpolation) -> Result<(), ChannelError>;
    fn end_behavior(&self, side: Side) -> EndBehavior;
    fn set_end_behavior(&mut self, behavior: EndBehavior, side: Side) -> Result<(), ChannelError>;

    /// Delete every key. Curve stays bound to its channel.
    fn clear(&mut self);

    fn first(&self) -> Option<KeyId>;
    fn last(&self) -> Option<KeyId>;
    fn next(&self, id: KeyId) -> Option<KeyId>;
    fn previous(&self, id: KeyId) -> Option<KeyId>;
    /// Find the key exactly at `time`.
    fn find(&self, time: f64) -> Option<KeyId>;

    fn key_time(&self, id: KeyId) -> f64;
    /// Break flags plus the side controlling evaluation at the key's time.
    fn broken(&self, id: KeyId) -> (BreakFlags, Side);

    fn key_value_int(&self, id: KeyId, side: Side) -> Result<i64, ChannelError>;
    fn key_value_float(&self, id: KeyId, side: Side) -> Result<f64, ChannelError>;
    /// Slope kind plus whether the weight on that side is manual.
    fn slope_kind(&self, id: KeyId, side: Side) -> Result<(SlopeKind, bool), ChannelError>;
    fn slope(&self, id: KeyId, side: Side) -> Result<f64, ChannelError>;
    fn weight(&self, id: KeyId, side: Side) -> Result<f64, ChannelError>;

    /// Create a key, or overwrite the key already at exactly `time`.
    fn add_int(&mut self, time: f64, value: i64) -> KeyId;
    fn add_float(&mut self, time: f64, value: f64) -> KeyId;

    fn set_key_value_int(
        &mut self,
        id: KeyId,
        value: i64,
        sel: SideSel,
    ) -> Result<(), ChannelError>;
    fn set_key_value_float(
        &mut self,
        id: KeyId,
        value: f64,
        sel: SideSel,
    ) -> Result<(), ChannelError>;
    fn set_slope_kind(
        &mut self,
        id: KeyId,
        kind: SlopeKind,
        sel: SideSel,
    ) -> Result<(), ChannelError>;
    fn set_slope(&mut self, id: KeyId, value: f64, sel: SideSel) -> Result<(), ChannelError>;
    /// Set a weight. With `reset_to_auto` the value is ignored and the side
    /// returns to automatic weighting.
    fn set_weight(
        &mut self,
        id: KeyId,
        value: f64,
        reset_to_auto: bool,
        sel: SideSel,
    ) -> Result<(), ChannelError>;

    /// Capability query: whether the key's current slope kind on `side`
    /// accepts a manual weight. Checked before mutation instead of writing
    /// and swallowing the refusal.
    fn supports_manual_weight(&self, id: KeyId, side: Side) -> bool;

    fn delete(&mut self, id: KeyId);
}

/// Read context over live channel state at an implicit "current" time.
pub trait ChannelSource {
    /// Current evaluation time of this context.
    fn time(&self) -> f64;

    fn channel_count(&self, object: ObjectId) -> u32;
    fn channel_name(&self, ch: ChannelRef) -> Result<String, ChannelError>;
    /// Resolve `(object, name)` to a channel reference.
    fn lookup(&self, object: ObjectId, name: &str) -> Option<ChannelRef>;
    fn storage_kind(&self, ch: ChannelRef) -> Result<StorageKind, ChannelError>;

    fn int(&self, ch: ChannelRef) -> Result<i64, ChannelError>;
    fn float(&self, ch: ChannelRef) -> Result<f64, ChannelError>;
    fn text(&self, ch: ChannelRef) -> Result<String, ChannelError>;

    /// The curve bound to the channel, or `None` when not bound.
    fn curve(&self, ch: ChannelRef) -> Option<&dyn Curve>;
}

/// Write context over live channel state.
pub trait ChannelSink {
    fn set_int(&mut self, ch: ChannelRef, value: i64) -> Result<(), ChannelError>;
    fn set_float(&mut self, ch: ChannelRef, value: f64) -> Result<(), ChannelError>;
    fn set_text(&mut self, ch: ChannelRef, value: &str) -> Result<(), ChannelError>;

    /// Key the channel at the sink's current time. With `force`, a curve
    /// (and its first key) is created on a channel that had none.
    fn set_int_key(&mut self, ch: ChannelRef, value: i64, force: bool)
        -> Result<(), ChannelError>;
    fn set_float_key(
        &mut self,
        ch: ChannelRef,
        value: f64,
        force: bool,
    ) -> Result<(), ChannelError>;

    fn curve_mut(&mut self, ch: ChannelRef) -> Option<&mut dyn Curve>;
    /// Create an empty curve on the channel, or return the existing one.
    fn create_curve(&mut self, ch: ChannelRef) -> Result<&mut dyn Curve, ChannelError>;

    fn add_channel(
        &mut self,
        object: ObjectId,
        name: &str,
        kind: StorageKind,
    ) -> Result<ChannelRef, ChannelError>;
}

/// Combined read/write access to one scene. Writers need both halves: a
/// write consults the read side to decide whether a curve is already bound.
pub trait ChannelStore: ChannelSource + ChannelSink {}

impl<T: ChannelSource + ChannelSink> ChannelStore for T {}

/// Directed links between channels, kept by the host scene graph.
pub trait LinkGraph {
    fn add_link(&mut self, from: ChannelRef, to: ChannelRef) -> Result<(), ChannelError>;
    fn remove_link(&mut self, from: ChannelRef, to: ChannelRef) -> Result<(), ChannelError>;
    fn forward_links(&self, from: ChannelRef) -> Vec<ChannelRef>;
}
