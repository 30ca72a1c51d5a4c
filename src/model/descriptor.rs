use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{AxisKind, CoreError, PixelType, Projection, ProjectionRange, Result, parse_hex_color};

/// Serializable description of an opened image, as read from a session file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageDescriptor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub pixel_type: PixelType,
    #[serde(default = "default_ready")]
    pub ready: bool,
    #[serde(default)]
    pub dimensions: BTreeMap<AxisKind, DimensionDescriptor>,
    #[serde(default)]
    pub projection: Projection,
    #[serde(default)]
    pub projection_opts: Option<ProjectionRange>,
    #[serde(default)]
    pub channels: Vec<ChannelDescriptor>,
    /// Channel settings as imported; defaults to `channels`.
    #[serde(default)]
    pub imported_channels: Option<Vec<ChannelDescriptor>>,
}

fn default_ready() -> bool {
    true
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionDescriptor {
    #[serde(default)]
    pub value: usize,
    pub extent: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelDescriptor {
    #[serde(default)]
    pub label: String,
    #[serde(default = "default_active")]
    pub active: bool,
    pub color: String,
    pub window: WindowDescriptor,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowDescriptor {
    pub start: f64,
    pub end: f64,
    pub min: f64,
    pub max: f64,
}

impl ImageDescriptor {
    pub fn validate(&self) -> Result<()> {
        for (axis, dimension) in &self.dimensions {
            if dimension.extent == 0 {
                return Err(CoreError::InvalidDescriptor(format!(
                    "dimension `{axis}` has an extent of 0"
                )));
            }
            if dimension.value >= dimension.extent {
                return Err(CoreError::DimensionOutOfRange {
                    axis: axis.to_string(),
                    value: dimension.value,
                    extent: dimension.extent,
                });
            }
        }
        if let Some(range) = self.projection_opts {
            if range.start > range.end {
                return Err(CoreError::InvalidDescriptor(format!(
                    "projection range start {} exceeds end {}",
                    range.start, range.end
                )));
            }
        }
        let imported = self.imported_channels.as_deref().unwrap_or_default();
        if !imported.is_empty() && imported.len() != self.channels.len() {
            return Err(CoreError::InvalidDescriptor(format!(
                "{} imported channels for {} channels",
                imported.len(),
                self.channels.len()
            )));
        }
        for (index, channel) in self.channels.iter().chain(imported).enumerate() {
            parse_hex_color(&channel.color)?;
            if channel.window.min > channel.window.max {
                return Err(CoreError::InvalidDescriptor(format!(
                    "channel {index} has min {} above max {}",
                    channel.window.min, channel.window.max
                )));
            }
            if channel.window.start > channel.window.end {
                return Err(CoreError::InvalidDescriptor(format!(
                    "channel {index} window start {} exceeds end {}",
                    channel.window.start, channel.window.end
                )));
            }
        }
        Ok(())
    }
}
