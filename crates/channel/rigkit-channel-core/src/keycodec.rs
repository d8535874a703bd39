//! Per-keyframe get/set logic between live curves and [`KeyframePack`]s.

use crate::error::ChannelError;
use crate::host::{Curve, KeyId};
use crate::pack::{KeySlope, KeyValue, KeyWeight, KeyframePack, Side, SideSel, Slope, SlopeKind};
use crate::value::{ChannelValue, StorageKind};

fn side_value<C: Curve + ?Sized>(
    curve: &C,
    id: KeyId,
    side: Side,
) -> Result<ChannelValue, ChannelError> {
    if curve.is_int() {
        curve.key_value_int(id, side).map(ChannelValue::Int)
    } else {
        curve.key_value_float(id, side).map(ChannelValue::Float)
    }
}

/// Snapshot one keyframe into a pack.
///
/// Negation flips values and slopes, never weights. A failing value read is
/// fatal for the key; slope and weight reads degrade to defaults, matching
/// the tolerant reads of the host curve system.
pub fn read_key<C: Curve + ?Sized>(
    curve: &C,
    id: KeyId,
    negate: bool,
) -> Result<KeyframePack, ChannelError> {
    let time = curve.key_time(id);
    let (flags, controlling) = curve.broken(id);

    let mut value_in = side_value(curve, id, Side::In)?;
    if negate {
        value_in = value_in.negated();
    }
    let value = if flags.value {
        let mut value_out = side_value(curve, id, Side::Out)?;
        if negate {
            value_out = value_out.negated();
        }
        KeyValue::Broken {
            value_in,
            value_out,
            controlling,
        }
    } else {
        KeyValue::Unbroken(value_in)
    };

    let (kind_in, manual_in) = curve
        .slope_kind(id, Side::In)
        .unwrap_or((SlopeKind::Auto, false));
    let (kind_out, manual_out) = curve
        .slope_kind(id, Side::Out)
        .unwrap_or((SlopeKind::Auto, false));
    let sign = if negate { -1.0 } else { 1.0 };
    let slope_in = Slope {
        kind: kind_in,
        value: curve.slope(id, Side::In).unwrap_or(0.0) * sign,
    };
    let slope_out = Slope {
        kind: kind_out,
        value: curve.slope(id, Side::Out).unwrap_or(0.0) * sign,
    };
    let slope = if flags.slope {
        KeySlope::Broken {
            slope_in,
            slope_out,
        }
    } else {
        KeySlope::Unified(slope_in)
    };

    // An auto weight reads back as the computed value; re-setting the side
    // to auto on paste reproduces it as long as slope, time and value match.
    let weight_in = KeyWeight {
        value: curve.weight(id, Side::In).unwrap_or(0.0),
        manual: manual_in,
    };
    let weight_out = KeyWeight {
        value: curve.weight(id, Side::Out).unwrap_or(0.0),
        manual: manual_out,
    };

    Ok(KeyframePack {
        time,
        value,
        slope,
        weight_in,
        weight_out,
        broken_weight: flags.weight,
    })
}

fn add_key<C: Curve + ?Sized>(
    curve: &mut C,
    time: f64,
    value: &ChannelValue,
) -> Result<KeyId, ChannelError> {
    match value {
        ChannelValue::Int(v) => Ok(curve.add_int(time, *v)),
        ChannelValue::Float(v) => Ok(curve.add_float(time, *v)),
        ChannelValue::Text(_) => Err(ChannelError::TypeMismatch(StorageKind::String)),
    }
}

fn set_key_value<C: Curve + ?Sized>(
    curve: &mut C,
    id: KeyId,
    value: &ChannelValue,
    sel: SideSel,
) -> Result<(), ChannelError> {
    match value {
        ChannelValue::Int(v) => curve.set_key_value_int(id, *v, sel),
        ChannelValue::Float(v) => curve.set_key_value_float(id, *v, sel),
        ChannelValue::Text(_) => Err(ChannelError::TypeMismatch(StorageKind::String)),
    }
}

fn write_weight<C: Curve + ?Sized>(curve: &mut C, id: KeyId, side: Side, weight: KeyWeight) {
    // Both sides are always attempted regardless of the broken-weight flag;
    // a non-manual side is reset to auto so it recomputes from the slope.
    let result = if weight.manual && curve.supports_manual_weight(id, side) {
        curve.set_weight(id, weight.value, false, side.into())
    } else {
        curve.set_weight(id, weight.value, true, side.into())
    };
    if let Err(err) = result {
        log::debug!("weight write refused on key {id:?} ({side:?}): {err}");
    }
}

/// Write one pack keyframe onto a curve.
///
/// `value_multiplier` scales values and slopes so tangent direction
/// survives negation and scaling; weights are never scaled. For a broken
/// value the non-controlling side is written first and the controlling side
/// last: the evaluator's value at the key's exact time reflects whichever
/// side was written last.
pub fn write_key<C: Curve + ?Sized>(
    curve: &mut C,
    pack: &KeyframePack,
    time_offset: f64,
    value_offset: f64,
    value_multiplier: f64,
) -> Result<KeyId, ChannelError> {
    let time = pack.time + time_offset;

    let id = match &pack.value {
        KeyValue::Unbroken(raw) => {
            let value = raw.adjusted(value_offset, value_multiplier);
            add_key(curve, time, &value)?
        }
        KeyValue::Broken {
            value_in,
            value_out,
            controlling,
        } => {
            let value_in = value_in.adjusted(value_offset, value_multiplier);
            let value_out = value_out.adjusted(value_offset, value_multiplier);
            let id = add_key(curve, time, &value_in)?;
            let (first, second) = match controlling {
                Side::In => ((&value_out, Side::Out), (&value_in, Side::In)),
                Side::Out => ((&value_in, Side::In), (&value_out, Side::Out)),
            };
            set_key_value(curve, id, first.0, first.1.into())?;
            set_key_value(curve, id, second.0, second.1.into())?;
            id
        }
    };

    match &pack.slope {
        KeySlope::Broken {
            slope_in,
            slope_out,
        } => {
            curve.set_slope_kind(id, slope_in.kind, SideSel::In)?;
            curve.set_slope_kind(id, slope_out.kind, SideSel::Out)?;
            curve.set_slope(id, slope_in.value * value_multiplier, SideSel::In)?;
            curve.set_slope(id, slope_out.value * value_multiplier, SideSel::Out)?;
        }
        KeySlope::Unified(slope) => {
            // Some slope kinds refuse a unified write; the key keeps its
            // defaults in that case and the rest of the write continues.
            let unified = curve
                .set_slope_kind(id, slope.kind, SideSel::Both)
                .and_then(|_| curve.set_slope(id, slope.value * value_multiplier, SideSel::Both));
            if let Err(err) = unified {
                log::debug!("unified slope write refused on key {id:?}: {err}");
            }
        }
    }

    write_weight(curve, id, Side::In, pack.weight_in);
    write_weight(curve, id, Side::Out, pack.weight_out);

    Ok(id)
}

/// Number of keys on a curve, counted by a first/next walk.
pub fn key_count<C: Curve + ?Sized>(curve: &C) -> usize {
    let mut count = 0;
    let mut cursor = curve.first();
    while let Some(id) = cursor {
        count += 1;
        cursor = curve.next(id);
    }
    count
}

/// Times of the first and last key. A single key yields a zero-length
/// range; an empty curve yields `None`.
pub fn time_range<C: Curve + ?Sized>(curve: &C) -> Option<(f64, f64)> {
    let first = curve.first()?;
    let start = curve.key_time(first);
    let end = curve.last().map(|id| curve.key_time(id)).unwrap_or(start);
    Some((start, end))
}

/// Whether a key exists exactly at `time`.
pub fn key_exists<C: Curve + ?Sized>(curve: &C, time: f64) -> bool {
    curve.find(time).is_some()
}
