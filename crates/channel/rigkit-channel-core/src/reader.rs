//! Snapshot live channel state into [`ChannelPack`]s.

use serde::{Deserialize, Serialize};

use crate::error::ChannelError;
use crate::host::{ChannelSource, Curve};
use crate::ids::{ChannelRef, ObjectId};
use crate::keycodec::read_key;
use crate::pack::{ChannelPack, EnvelopePack, PackContent, Side};
use crate::value::ChannelValue;

/// How much of a channel's state a read captures.
///
/// - `Value`: the evaluated scalar at the context's time; curves ignored.
/// - `Key`: the keyframe exactly at the context's time, falling back to
///   `Value` behavior when there is none.
/// - `All`: the entire curve, or `Value` behavior when not curve-bound.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum ReadMode {
    #[default]
    Value,
    Key,
    All,
}

/// Read the channel's scalar value, optionally negated for mirroring.
pub fn read_value<S: ChannelSource + ?Sized>(
    src: &S,
    ch: ChannelRef,
    negate: bool,
) -> Result<ChannelValue, ChannelError> {
    let kind = src.storage_kind(ch)?;
    let value = if kind.is_integer() {
        ChannelValue::Int(src.int(ch)?)
    } else if kind.is_float() {
        ChannelValue::Float(src.float(ch)?)
    } else if kind.is_textual() {
        ChannelValue::Text(src.text(ch)?)
    } else {
        return Err(ChannelError::TypeMismatch(kind));
    };
    Ok(if negate { value.negated() } else { value })
}

fn read_envelope<C: Curve + ?Sized>(curve: &C, negate: bool) -> EnvelopePack {
    let mut keys = Vec::new();
    let mut cursor = curve.first();
    while let Some(id) = cursor {
        // A key that fails to read is skipped, not fatal to the envelope.
        if let Ok(key) = read_key(curve, id, negate) {
            keys.push(key);
        }
        cursor = curve.next(id);
    }
    EnvelopePack {
        interpolation: curve.interpolation(),
        pre_behavior: curve.end_behavior(Side::In),
        post_behavior: curve.end_behavior(Side::Out),
        is_int: curve.is_int(),
        keys,
    }
}

/// Snapshot a channel under the given read mode.
///
/// A pack is always produced for a resolvable channel. When the storage
/// kind cannot carry a value or curve, only the kind is populated —
/// "nothing populated" means "nothing to write", not an error. A missing
/// curve is "not bound", never fatal.
pub fn read_pack<S: ChannelSource + ?Sized>(
    src: &S,
    ch: ChannelRef,
    mode: ReadMode,
    negate: bool,
) -> Result<ChannelPack, ChannelError> {
    let kind = src.storage_kind(ch)?;
    let mut pack = ChannelPack::empty(kind);
    if !kind.can_carry_curve() {
        return Ok(pack);
    }

    let fallback = |pack: &mut ChannelPack| {
        if let Ok(value) = read_value(src, ch, negate) {
            pack.content = PackContent::Scalar(value);
        }
    };

    match mode {
        ReadMode::Value => fallback(&mut pack),
        ReadMode::All => match src.curve(ch) {
            None => fallback(&mut pack),
            Some(curve) => pack.content = PackContent::Envelope(read_envelope(curve, negate)),
        },
        ReadMode::Key => match src.curve(ch) {
            None => fallback(&mut pack),
            Some(curve) => match curve.find(src.time()) {
                Some(id) => match read_key(curve, id, negate) {
                    Ok(key) => pack.content = PackContent::Key(key),
                    Err(_) => fallback(&mut pack),
                },
                None => fallback(&mut pack),
            },
        },
    }
    Ok(pack)
}

/// Same as [`read_pack`] with the channel passed by name.
pub fn read_pack_by_name<S: ChannelSource + ?Sized>(
    src: &S,
    object: ObjectId,
    name: &str,
    mode: ReadMode,
    negate: bool,
) -> Result<ChannelPack, ChannelError> {
    let ch = src
        .lookup(object, name)
        .ok_or_else(|| ChannelError::ChannelNotFound(name.to_string()))?;
    read_pack(src, ch, mode, negate)
}

/// Whether the channel has a curve bound.
pub fn is_animated<S: ChannelSource + ?Sized>(src: &S, ch: ChannelRef) -> bool {
    src.curve(ch).is_some()
}

/// Whether the channel has a key exactly at the context's current time.
pub fn is_keyframed<S: ChannelSource + ?Sized>(src: &S, ch: ChannelRef) -> bool {
    src.curve(ch)
        .map(|curve| curve.find(src.time()).is_some())
        .unwrap_or(false)
}

/// Times of the channel's first and last key.
pub fn channel_time_range<S: ChannelSource + ?Sized>(
    src: &S,
    ch: ChannelRef,
) -> Result<(f64, f64), ChannelError> {
    let curve = src
        .curve(ch)
        .ok_or_else(|| ChannelError::CurveNotBound(ch.ident()))?;
    crate::keycodec::time_range(curve).ok_or(ChannelError::KeyNotFound(0.0))
}
