//! Snapshot data model for channel state.
//!
//! A [`ChannelPack`] captures everything needed to re-create a channel's
//! state somewhere else: a static value, a single keyframe, or a whole
//! envelope. Packs are created fresh by a read, consumed once by a write,
//! then discarded; they keep no back-reference to the source object.
//!
//! The write-time transform modifiers (`time_offset`, `value_offset`,
//! `value_multiplier`) ride along on the pack but are applied only when the
//! pack is written, never at capture time.

use serde::{Deserialize, Serialize};

use crate::value::{ChannelValue, StorageKind};

/// One side of a keyframe.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Side {
    In,
    Out,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::In => Side::Out,
            Side::Out => Side::In,
        }
    }
}

/// Side selector for curve mutations; `Both` addresses an unbroken field.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum SideSel {
    In,
    Out,
    Both,
}

impl From<Side> for SideSel {
    fn from(side: Side) -> SideSel {
        match side {
            Side::In => SideSel::In,
            Side::Out => SideSel::Out,
        }
    }
}

/// Tangent slope kind, mirroring the host curve system's vocabulary.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum SlopeKind {
    Direct,
    #[default]
    Auto,
    LinearIn,
    LinearOut,
    Flat,
    AutoFlat,
    Stepped,
}

/// Curve-level interpolation kind.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Interpolation {
    #[default]
    Curve,
    Linear,
    Stepped,
}

/// Behavior of the curve before its first key / after its last key.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum EndBehavior {
    Reset,
    #[default]
    Constant,
    Repeat,
    Oscillate,
    OffsetRepeat,
    Linear,
}

/// Tangent slope on one side of a key: kind plus slope value.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Slope {
    pub kind: SlopeKind,
    pub value: f64,
}

/// Tangent weight on one side of a key. When `manual` is false the value is
/// whatever the curve system computed automatically at capture time.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyWeight {
    pub value: f64,
    pub manual: bool,
}

/// Key value: one value for both sides, or an in/out pair with the side
/// that is authoritative for evaluation exactly at the key's time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum KeyValue {
    Unbroken(ChannelValue),
    Broken {
        value_in: ChannelValue,
        value_out: ChannelValue,
        controlling: Side,
    },
}

/// Key slope: unified across both sides, or an independent in/out pair.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum KeySlope {
    Unified(Slope),
    Broken { slope_in: Slope, slope_out: Slope },
}

/// All properties of a single keyframe.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyframePack {
    pub time: f64,
    pub value: KeyValue,
    pub slope: KeySlope,
    pub weight_in: KeyWeight,
    pub weight_out: KeyWeight,
    pub broken_weight: bool,
}

impl KeyframePack {
    /// Value seen from one side. An unbroken key reads the same either way.
    pub fn value_on(&self, side: Side) -> &ChannelValue {
        match &self.value {
            KeyValue::Unbroken(v) => v,
            KeyValue::Broken {
                value_in,
                value_out,
                ..
            } => match side {
                Side::In => value_in,
                Side::Out => value_out,
            },
        }
    }

    /// Slope seen from one side.
    pub fn slope_on(&self, side: Side) -> Slope {
        match &self.slope {
            KeySlope::Unified(s) => *s,
            KeySlope::Broken {
                slope_in,
                slope_out,
            } => match side {
                Side::In => *slope_in,
                Side::Out => *slope_out,
            },
        }
    }
}

/// Whole-curve snapshot: metadata plus keyframes in enumeration order.
/// Producers emit keys time-ascending; the pack does not enforce it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnvelopePack {
    pub interpolation: Interpolation,
    pub pre_behavior: EndBehavior,
    pub post_behavior: EndBehavior,
    pub is_int: bool,
    pub keys: Vec<KeyframePack>,
}

/// Which single piece of channel state a pack carries. A pack never holds
/// a keyframe and an envelope simultaneously; `Empty` means "nothing to
/// write" and is a successful no-op for every consumer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum PackContent {
    #[default]
    Empty,
    Scalar(ChannelValue),
    Key(KeyframePack),
    Envelope(EnvelopePack),
}

/// Generic snapshot of one channel's state.
///
/// `value_multiplier` scales values and slopes uniformly so tangent
/// direction survives negation and scaling; it never scales weights, which
/// live in the time domain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelPack {
    pub kind: StorageKind,
    #[serde(default)]
    pub content: PackContent,
    #[serde(default)]
    pub time_offset: f64,
    #[serde(default)]
    pub value_offset: f64,
    #[serde(default = "default_multiplier")]
    pub value_multiplier: f64,
}

fn default_multiplier() -> f64 {
    1.0
}

impl ChannelPack {
    pub fn empty(kind: StorageKind) -> Self {
        Self {
            kind,
            content: PackContent::Empty,
            time_offset: 0.0,
            value_offset: 0.0,
            value_multiplier: 1.0,
        }
    }

    pub fn scalar(kind: StorageKind, value: ChannelValue) -> Self {
        Self {
            content: PackContent::Scalar(value),
            ..Self::empty(kind)
        }
    }

    pub fn with_time_offset(mut self, time_offset: f64) -> Self {
        self.time_offset = time_offset;
        self
    }

    pub fn with_value_offset(mut self, value_offset: f64) -> Self {
        self.value_offset = value_offset;
        self
    }

    pub fn with_value_multiplier(mut self, value_multiplier: f64) -> Self {
        self.value_multiplier = value_multiplier;
        self
    }

    /// Export as JSON (stable schema for pose/preset payloads).
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}
