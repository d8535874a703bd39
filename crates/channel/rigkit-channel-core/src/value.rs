//! Channel storage kinds and runtime scalar values.

use serde::{Deserialize, Serialize};

/// Storage kind of a channel. Drives value typing for reads and writes.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Float,
    Integer,
    Boolean,
    Distance,
    Percent,
    Angle,
    Matrix4,
    String,
}

impl StorageKind {
    /// Matrix channels are the only kind that can never carry a curve.
    pub fn can_carry_curve(&self) -> bool {
        !matches!(self, StorageKind::Matrix4)
    }

    /// Kinds stored as integers (booleans are 0/1 integer channels).
    pub fn is_integer(&self) -> bool {
        matches!(self, StorageKind::Integer | StorageKind::Boolean)
    }

    /// Kinds stored as floats (plain or unit-typed).
    pub fn is_float(&self) -> bool {
        matches!(
            self,
            StorageKind::Float | StorageKind::Distance | StorageKind::Percent | StorageKind::Angle
        )
    }

    pub fn is_textual(&self) -> bool {
        matches!(self, StorageKind::String)
    }
}

/// A single channel value. Which variant applies follows from the channel's
/// [`StorageKind`]; consumers match exhaustively.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ChannelValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl ChannelValue {
    /// Sign-flipped copy, used for mirroring. Text has no sign and is
    /// returned unchanged.
    pub fn negated(&self) -> ChannelValue {
        match self {
            ChannelValue::Int(v) => ChannelValue::Int(-v),
            ChannelValue::Float(v) => ChannelValue::Float(-v),
            ChannelValue::Text(s) => ChannelValue::Text(s.clone()),
        }
    }

    /// Write-time arithmetic: `(raw + offset) * multiplier`. Integers go
    /// through f64 and truncate toward zero; text passes through untouched.
    pub fn adjusted(&self, offset: f64, multiplier: f64) -> ChannelValue {
        match self {
            ChannelValue::Int(v) => {
                ChannelValue::Int(((*v as f64 + offset) * multiplier) as i64)
            }
            ChannelValue::Float(v) => ChannelValue::Float((v + offset) * multiplier),
            ChannelValue::Text(s) => ChannelValue::Text(s.clone()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ChannelValue::Int(v) => Some(*v as f64),
            ChannelValue::Float(v) => Some(*v),
            ChannelValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ChannelValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negation_flips_sign_and_leaves_text_alone() {
        assert_eq!(ChannelValue::Float(3.5).negated(), ChannelValue::Float(-3.5));
        assert_eq!(ChannelValue::Int(-2).negated(), ChannelValue::Int(2));
        assert_eq!(
            ChannelValue::Text("side.L".into()).negated(),
            ChannelValue::Text("side.L".into())
        );
    }

    #[test]
    fn adjusted_applies_offset_then_multiplier() {
        assert_eq!(
            ChannelValue::Float(2.0).adjusted(1.0, -1.0),
            ChannelValue::Float(-3.0)
        );
        // integer arithmetic runs in f64 and truncates toward zero
        assert_eq!(ChannelValue::Int(3).adjusted(0.4, 1.0), ChannelValue::Int(3));
        assert_eq!(ChannelValue::Int(3).adjusted(0.0, -1.0), ChannelValue::Int(-3));
    }

    #[test]
    fn only_matrix_refuses_curves() {
        assert!(!StorageKind::Matrix4.can_carry_curve());
        assert!(StorageKind::Float.can_carry_curve());
        assert!(StorageKind::String.can_carry_curve());
        assert!(StorageKind::Boolean.is_integer());
        assert!(StorageKind::Angle.is_float());
    }
}
