use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum AxisKind {
    #[serde(rename = "x")]
    X,
    #[serde(rename = "y")]
    Y,
    #[serde(rename = "z")]
    Z,
    #[serde(rename = "c")]
    Channel,
    #[serde(rename = "t")]
    Time,
    #[serde(rename = "unknown")]
    Unknown,
}

impl AxisKind {
    pub const fn code(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
            Self::Channel => "c",
            Self::Time => "t",
            Self::Unknown => "unknown",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "x" => Some(Self::X),
            "y" => Some(Self::Y),
            "z" => Some(Self::Z),
            "c" => Some(Self::Channel),
            "t" => Some(Self::Time),
            _ => None,
        }
    }
}

impl fmt::Display for AxisKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PixelType {
    U8,
    U16,
    #[default]
    F32,
}

impl PixelType {
    /// Representable intensity range, `None` for floating point data.
    pub const fn full_range(self) -> Option<(f64, f64)> {
        match self {
            Self::U8 => Some((0.0, u8::MAX as f64)),
            Self::U16 => Some((0.0, u16::MAX as f64)),
            Self::F32 => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Projection {
    #[default]
    Normal,
    IntMax,
}

impl Projection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::IntMax => "intmax",
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Normal => Self::IntMax,
            Self::IntMax => Self::Normal,
        }
    }
}
