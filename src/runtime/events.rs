use crate::model::{AxisKind, Projection, ProjectionRange};

use super::ConfigId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    ImageConfigUpdate,
    ImageDimensionChange,
    ImageDimensionPlay,
    ImageSettingsChange,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The configuration was replaced, e.g. after its settings were reloaded.
    ImageConfigUpdate { config_id: ConfigId },
    ImageDimensionChange {
        config_id: ConfigId,
        dim: AxisKind,
        value: usize,
    },
    /// Request for the playback driver to start or stop stepping `dim`.
    ImageDimensionPlay {
        config_id: ConfigId,
        dim: AxisKind,
        forwards: bool,
        stop: bool,
    },
    ImageSettingsChange {
        config_id: ConfigId,
        change: SettingsChange,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SettingsChange {
    Projection {
        projection: Projection,
        range: ProjectionRange,
    },
    Channels(Vec<ChannelRangeUpdate>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelRangeUpdate {
    pub index: usize,
    pub start: f64,
    pub end: f64,
    pub color: String,
    pub active: bool,
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Self::ImageConfigUpdate { .. } => Topic::ImageConfigUpdate,
            Self::ImageDimensionChange { .. } => Topic::ImageDimensionChange,
            Self::ImageDimensionPlay { .. } => Topic::ImageDimensionPlay,
            Self::ImageSettingsChange { .. } => Topic::ImageSettingsChange,
        }
    }

    pub fn config_id(&self) -> ConfigId {
        match self {
            Self::ImageConfigUpdate { config_id }
            | Self::ImageDimensionChange { config_id, .. }
            | Self::ImageDimensionPlay { config_id, .. }
            | Self::ImageSettingsChange { config_id, .. } => *config_id,
        }
    }
}
