use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::binding::Observable;

use super::{
    AxisKind, Channel, ChannelDescriptor, CoreError, DimensionDescriptor, Dimensions, HistoryPath,
    ImageDescriptor, PixelType, Projection, ProjectionRange, ProjectionState, Result,
    normalize_color, parse_hex_color,
};

/// Observable state of one opened image.
///
/// Owned by its image configuration; widgets observe and mutate the fields
/// but never own them.
#[derive(Debug)]
pub struct ImageInfo {
    pub name: Option<String>,
    pub ready: Observable<bool>,
    pub pixel_type: PixelType,
    pub dimensions: Dimensions,
    pub projection: Observable<Projection>,
    pub projection_opts: Observable<ProjectionRange>,
    pub channels: Vec<Channel>,
    pub imported_channels: Vec<ChannelDescriptor>,
}

impl ImageInfo {
    pub fn from_descriptor(descriptor: &ImageDescriptor) -> Result<Self> {
        descriptor.validate()?;

        let mut dimensions = Dimensions::new();
        for (axis, dimension) in &descriptor.dimensions {
            dimensions.insert(*axis, dimension.value, dimension.extent);
        }

        let z_last = dimensions.max(AxisKind::Z).saturating_sub(1);
        let projection_opts = descriptor
            .projection_opts
            .map(|range| ProjectionRange::new(range.start.min(z_last), range.end.min(z_last)))
            .unwrap_or_else(|| ProjectionRange::new(0, z_last));

        let imported_channels = descriptor
            .imported_channels
            .clone()
            .filter(|imported| !imported.is_empty())
            .unwrap_or_else(|| descriptor.channels.clone());

        Ok(Self {
            name: descriptor.name.clone(),
            ready: Observable::new(descriptor.ready),
            pixel_type: descriptor.pixel_type,
            dimensions,
            projection: Observable::new(descriptor.projection),
            projection_opts: Observable::new(projection_opts),
            channels: descriptor
                .channels
                .iter()
                .map(Channel::from_descriptor)
                .collect(),
            imported_channels,
        })
    }

    pub fn descriptor(&self) -> ImageDescriptor {
        ImageDescriptor {
            name: self.name.clone(),
            pixel_type: self.pixel_type,
            ready: self.ready.get(),
            dimensions: self
                .dimensions
                .iter()
                .map(|(axis, dimension)| {
                    (
                        axis,
                        DimensionDescriptor {
                            value: dimension.value.get(),
                            extent: dimension.extent,
                        },
                    )
                })
                .collect(),
            projection: self.projection.get(),
            projection_opts: Some(self.projection_opts.get()),
            channels: self.channels.iter().map(Channel::descriptor).collect(),
            imported_channels: Some(self.imported_channels.clone()),
        }
    }

    pub fn channel(&self, index: usize) -> Option<&Channel> {
        self.channels.get(index)
    }

    pub fn channel_descriptors(&self) -> Vec<ChannelDescriptor> {
        self.channels.iter().map(Channel::descriptor).collect()
    }

    /// Writes a recorded history value back into the field addressed by `path`.
    pub fn assign(&self, path: &HistoryPath, value: &Value) -> Result<()> {
        let segments = path.segments().collect::<Vec<_>>();
        match segments.as_slice() {
            ["image_info", "dimensions", code] => {
                let dimension = AxisKind::from_code(code)
                    .and_then(|axis| self.dimensions.get(axis))
                    .ok_or_else(|| CoreError::UnknownHistoryPath(path.to_string()))?;
                let index: usize = decode(path, value)?;
                if index >= dimension.extent {
                    return Err(CoreError::DimensionOutOfRange {
                        axis: code.to_string(),
                        value: index,
                        extent: dimension.extent,
                    });
                }
                dimension.value.set(index);
            }
            ["image_info", "projection"] => {
                if value.is_object() {
                    let state: ProjectionState = decode(path, value)?;
                    self.projection_opts.set(state.range());
                    self.projection.set(state.projection);
                } else {
                    self.projection.set(decode(path, value)?);
                }
            }
            ["image_info", "projection_opts"] => {
                let range: ProjectionRange = decode(path, value)?;
                self.projection_opts
                    .set(ProjectionRange::new(range.start, range.end));
            }
            ["image_info", "channels"] => {
                let descriptors: Vec<ChannelDescriptor> = decode(path, value)?;
                if descriptors.len() != self.channels.len() {
                    return Err(CoreError::InvalidHistoryValue {
                        path: path.to_string(),
                        reason: format!(
                            "expected {} channels, got {}",
                            self.channels.len(),
                            descriptors.len()
                        ),
                    });
                }
                for (channel, descriptor) in self.channels.iter().zip(&descriptors) {
                    channel.apply(descriptor);
                }
            }
            ["image_info", "channels", index, field] => {
                let channel = self.channel_at(path, index)?;
                match *field {
                    "active" => {
                        channel.active.set(decode(path, value)?);
                    }
                    "color" => {
                        let color: String = decode(path, value)?;
                        parse_hex_color(&color)?;
                        channel.color.set(normalize_color(&color));
                    }
                    "window" => {
                        let window: WindowEdges = decode(path, value)?;
                        channel.set_window(window.start, window.end);
                    }
                    _ => return Err(CoreError::UnknownHistoryPath(path.to_string())),
                }
            }
            _ => return Err(CoreError::UnknownHistoryPath(path.to_string())),
        }
        Ok(())
    }

    fn channel_at(&self, path: &HistoryPath, index: &str) -> Result<&Channel> {
        index
            .parse::<usize>()
            .ok()
            .and_then(|index| self.channel(index))
            .ok_or_else(|| CoreError::UnknownHistoryPath(path.to_string()))
    }
}

#[derive(serde::Deserialize)]
struct WindowEdges {
    start: f64,
    end: f64,
}

fn decode<T: DeserializeOwned>(path: &HistoryPath, value: &Value) -> Result<T> {
    serde_json::from_value(value.clone()).map_err(|error| CoreError::InvalidHistoryValue {
        path: path.to_string(),
        reason: error.to_string(),
    })
}
