//! The color value model.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::types::OutPoint;

/// Units of color attached to one output.
pub type ColorValue = u64;

/// An out point together with the color value it is asserted to carry when
/// spent as an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorIn {
    pub out_point: OutPoint,
    pub color_value: ColorValue,
}

impl ColorIn {
    pub const fn new(out_point: OutPoint, color_value: ColorValue) -> Self {
        Self {
            out_point,
            color_value,
        }
    }

    /// An out point carrying no color.
    pub const fn uncolored(out_point: OutPoint) -> Self {
        Self::new(out_point, 0)
    }
}

/// A destination script and the color value it should receive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorOut {
    pub script: Bytes,
    pub color_value: ColorValue,
}

impl ColorOut {
    pub fn new(script: impl Into<Bytes>, color_value: ColorValue) -> Self {
        Self {
            script: script.into(),
            color_value,
        }
    }
}

/// The out points of a list of color inputs, in order.
pub fn out_points(color_ins: &[ColorIn]) -> Vec<OutPoint> {
    color_ins.iter().map(|c| c.out_point).collect()
}

/// Sum color values, returning `None` on overflow.
pub fn checked_sum<I>(values: I) -> Option<ColorValue>
where
    I: IntoIterator<Item = ColorValue>,
{
    values
        .into_iter()
        .try_fold(0u64, |acc, v| acc.checked_add(v))
}
