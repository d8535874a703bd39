//! Curve simplification: remove keyframes that do not change curve flow.

use crate::error::ChannelError;
use crate::host::{ChannelStore, Curve, KeyId};
use crate::ids::ChannelRef;
use crate::pack::Side;
use crate::reader::read_value;
use crate::value::ChannelValue;
use crate::writer::{write_value, WriteMode};

/// Result of filtering one channel.
#[derive(Clone, Debug, PartialEq)]
pub enum FilterOutcome {
    /// Channel has no curve; nothing to filter.
    NotAnimated,
    /// Keys were filtered in place.
    Filtered { deleted: usize, is_constant: bool },
    /// The curve was constant and has been collapsed to a static value.
    Collapsed,
}

fn side_value<C: Curve + ?Sized>(curve: &C, id: KeyId, side: Side) -> Option<ChannelValue> {
    if curve.is_int() {
        curve.key_value_int(id, side).ok().map(ChannelValue::Int)
    } else {
        curve
            .key_value_float(id, side)
            .ok()
            .map(ChannelValue::Float)
    }
}

/// Flatness test between two adjacent keys. Integer curves compare values
/// exactly; float curves need both values and the connecting tangent within
/// tolerance — equal endpoints joined by a non-flat tangent are not flat.
fn segment_is_flat(
    is_int: bool,
    left: &ChannelValue,
    right: &ChannelValue,
    left_out_slope: f64,
    right_in_slope: f64,
    tolerance: f64,
) -> bool {
    if is_int {
        return left == right;
    }
    let (Some(lv), Some(rv)) = (left.as_f64(), right.as_f64()) else {
        return false;
    };
    (lv - rv).abs() <= tolerance && (left_out_slope - right_in_slope).abs() <= tolerance
}

/// Delete keys whose presence does not change the evaluated curve beyond
/// `tolerance`, using a sliding three-key window with in-place restarts.
///
/// Returns the number of deleted keys and whether the surviving curve is
/// constant. A zero-key curve reports `(0, false)`. The curve is mutated in
/// place; collapsing a constant curve to a static value is the caller's
/// separate step (see [`filter_channel`]).
pub fn filter_static_keys<C: Curve + ?Sized>(curve: &mut C, tolerance: f64) -> (usize, bool) {
    let is_int = curve.is_int();
    let mut deleted = 0usize;

    let Some(first) = curve.first() else {
        return (0, false);
    };
    let first_time = curve.key_time(first);

    let mut key1 = first;
    loop {
        let key1_time = curve.key_time(key1);
        // Representative value is the out side when the value is broken.
        let (flags1, _) = curve.broken(key1);
        let side1 = if flags1.value { Side::Out } else { Side::In };
        let Some(key1_val) = side_value(curve, key1, side1) else {
            return (deleted, false);
        };
        let key1_out_slope = if is_int {
            0.0
        } else {
            curve.slope(key1, Side::Out).unwrap_or(0.0)
        };

        let Some(key2) = curve.next(key1) else {
            return (deleted, key1_time == first_time);
        };
        // A broken-value key can never be a removable middle key.
        let (flags2, _) = curve.broken(key2);
        if flags2.value {
            key1 = key2;
            continue;
        }
        let Some(key2_val) = side_value(curve, key2, Side::In) else {
            key1 = key2;
            continue;
        };
        let (key2_in_slope, key2_out_slope) = if is_int {
            (0.0, 0.0)
        } else {
            (
                curve.slope(key2, Side::In).unwrap_or(0.0),
                curve.slope(key2, Side::Out).unwrap_or(0.0),
            )
        };

        if !segment_is_flat(
            is_int,
            &key1_val,
            &key2_val,
            key1_out_slope,
            key2_in_slope,
            tolerance,
        ) {
            key1 = key2;
            continue;
        }

        let Some(key3) = curve.next(key2) else {
            // First two keys match and nothing follows: the whole curve is
            // flat iff the window started at the curve's first key.
            return (deleted, key1_time == first_time);
        };
        // Only the in side of key3 matters, even if key3 itself is broken.
        let Some(key3_val) = side_value(curve, key3, Side::In) else {
            key1 = key3;
            continue;
        };
        let key3_in_slope = if is_int {
            0.0
        } else {
            curve.slope(key3, Side::In).unwrap_or(0.0)
        };

        if !segment_is_flat(
            is_int,
            &key2_val,
            &key3_val,
            key2_out_slope,
            key3_in_slope,
            tolerance,
        ) {
            key1 = key3;
            continue;
        }

        // Three matching keys: the middle one is redundant. Restart the
        // window from key1's exact time, falling back to the first key.
        curve.delete(key2);
        deleted += 1;
        key1 = match curve.find(key1_time).or_else(|| curve.first()) {
            Some(id) => id,
            None => return (deleted, false),
        };
    }
}

/// Filter a channel's curve, optionally collapsing a constant result to a
/// static value (the curve is emptied and the evaluated value written back
/// in `Static` mode).
pub fn filter_channel<S: ChannelStore + ?Sized>(
    store: &mut S,
    ch: ChannelRef,
    collapse_static: bool,
    tolerance: f64,
) -> Result<FilterOutcome, ChannelError> {
    if store.curve(ch).is_none() {
        return Ok(FilterOutcome::NotAnimated);
    }
    let curve = store
        .curve_mut(ch)
        .ok_or_else(|| ChannelError::CurveNotBound(ch.ident()))?;
    let (deleted, is_constant) = filter_static_keys(curve, tolerance);

    if !collapse_static || !is_constant {
        return Ok(FilterOutcome::Filtered {
            deleted,
            is_constant,
        });
    }

    let value = read_value(store, ch, false)?;
    if let Some(curve) = store.curve_mut(ch) {
        curve.clear();
    }
    write_value(store, ch, &value, WriteMode::Static, 0.0, 1.0)?;
    Ok(FilterOutcome::Collapsed)
}
