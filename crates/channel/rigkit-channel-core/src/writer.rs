//! Apply [`ChannelPack`]s to live channel state under write-mode policies.

use serde::{Deserialize, Serialize};

use crate::error::ChannelError;
use crate::host::{ChannelStore, Curve};
use crate::ids::{ChannelRef, ObjectId};
use crate::keycodec::write_key;
use crate::pack::{ChannelPack, EnvelopePack, PackContent, Side};
use crate::value::ChannelValue;

/// Policy for scalar writes.
///
/// - `Static`: plain value; an existing curve is left untouched (destroying
///   it is a separate, explicit operation).
/// - `Auto`: keyframe when the channel is already curve-bound, static
///   otherwise.
/// - `ForceKey`: always keyframe, creating a curve on a static channel.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum WriteMode {
    Static,
    #[default]
    Auto,
    ForceKey,
}

/// Policy for full-curve writes: wipe existing keys first, or merge the
/// pack's keys into whatever is there.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum EnvelopeWriteMode {
    #[default]
    Replace,
    Add,
}

/// Options for one pack write.
///
/// `write_time` re-times single-key writes: a pack carrying exactly one
/// keyframe is always written "now"-relative, not at its captured time.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WriteOptions {
    pub mode: WriteMode,
    pub envelope_mode: EnvelopeWriteMode,
    pub write_time: f64,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            mode: WriteMode::default(),
            envelope_mode: EnvelopeWriteMode::default(),
            write_time: 0.0,
        }
    }
}

/// Write a single scalar value under a [`WriteMode`].
///
/// Text writes ignore the mode. A kind that cannot carry the value is a
/// logged no-op, not an error.
pub fn write_value<S: ChannelStore + ?Sized>(
    store: &mut S,
    ch: ChannelRef,
    value: &ChannelValue,
    mode: WriteMode,
    value_offset: f64,
    value_multiplier: f64,
) -> Result<(), ChannelError> {
    let kind = store.storage_kind(ch)?;

    if kind.is_textual() {
        return match value.as_text() {
            Some(text) => store.set_text(ch, text),
            None => Err(ChannelError::TypeMismatch(kind)),
        };
    }

    let Some(raw) = value.as_f64() else {
        return Err(ChannelError::TypeMismatch(kind));
    };
    let adjusted = (raw + value_offset) * value_multiplier;

    if kind.is_integer() {
        let v = adjusted as i64;
        match mode {
            WriteMode::Static => store.set_int(ch, v),
            WriteMode::Auto => store.set_int_key(ch, v, false),
            WriteMode::ForceKey => store.set_int_key(ch, v, true),
        }
    } else if kind.is_float() {
        match mode {
            WriteMode::Static => store.set_float(ch, adjusted),
            WriteMode::Auto => store.set_float_key(ch, adjusted, false),
            WriteMode::ForceKey => store.set_float_key(ch, adjusted, true),
        }
    } else {
        log::debug!("scalar write skipped on {ch}: kind {kind:?} takes no scalar");
        Ok(())
    }
}

/// Writable curve for the channel: the already-bound curve when the read
/// side shows one, a fresh empty curve otherwise.
fn ensure_curve<S: ChannelStore + ?Sized>(
    store: &mut S,
    ch: ChannelRef,
) -> Result<&mut dyn Curve, ChannelError> {
    if store.curve(ch).is_some() {
        store
            .curve_mut(ch)
            .ok_or_else(|| ChannelError::CurveNotBound(ch.ident()))
    } else {
        store.create_curve(ch)
    }
}

fn write_envelope(
    curve: &mut dyn Curve,
    env: &EnvelopePack,
    mode: EnvelopeWriteMode,
    time_offset: f64,
    value_offset: f64,
    value_multiplier: f64,
) -> Result<(), ChannelError> {
    if mode == EnvelopeWriteMode::Replace {
        curve.clear();
    }
    curve.set_end_behavior(env.pre_behavior, Side::In)?;
    curve.set_end_behavior(env.post_behavior, Side::Out)?;
    // Integer (and boolean) curves keep their interpolation.
    if !curve.is_int() {
        curve.set_interpolation(env.interpolation)?;
    }
    // Under Add this lands each key at its own time, overwriting any key
    // already sitting exactly there.
    for key in &env.keys {
        write_key(curve, key, time_offset, value_offset, value_multiplier)?;
    }
    Ok(())
}

/// Apply a pack to a channel, dispatching on which arm is populated.
/// An empty pack is a successful no-op.
pub fn write_pack<S: ChannelStore + ?Sized>(
    store: &mut S,
    ch: ChannelRef,
    pack: &ChannelPack,
    opts: &WriteOptions,
) -> Result<(), ChannelError> {
    match &pack.content {
        PackContent::Empty => Ok(()),
        PackContent::Scalar(value) => write_value(
            store,
            ch,
            value,
            opts.mode,
            pack.value_offset,
            pack.value_multiplier,
        ),
        PackContent::Key(key) => {
            let curve = ensure_curve(store, ch)?;
            // Single-key writes are "now"-relative: the captured time is
            // replaced by the caller-supplied write time.
            let mut rekeyed = key.clone();
            rekeyed.time = opts.write_time;
            write_key(
                curve,
                &rekeyed,
                pack.time_offset,
                pack.value_offset,
                pack.value_multiplier,
            )?;
            Ok(())
        }
        PackContent::Envelope(env) => {
            let curve = ensure_curve(store, ch)?;
            write_envelope(
                curve,
                env,
                opts.envelope_mode,
                pack.time_offset,
                pack.value_offset,
                pack.value_multiplier,
            )
        }
    }
}

/// Same as [`write_pack`] with the channel passed by name. With
/// `add_if_missing`, an unresolved name is created on the object with the
/// pack's storage kind before writing.
pub fn write_pack_by_name<S: ChannelStore + ?Sized>(
    store: &mut S,
    object: ObjectId,
    name: &str,
    pack: &ChannelPack,
    opts: &WriteOptions,
    add_if_missing: bool,
) -> Result<(), ChannelError> {
    let ch = match store.lookup(object, name) {
        Some(ch) => ch,
        None if add_if_missing => store.add_channel(object, name, pack.kind)?,
        None => return Err(ChannelError::ChannelNotFound(name.to_string())),
    };
    write_pack(store, ch, pack, opts)
}
