mod axis;
mod channel;
mod descriptor;
mod dimensions;
mod error;
mod history;
mod image_info;


pub use axis::{AxisKind, PixelType, Projection};
pub use channel::{Channel, ChannelWindow, format_hex_color, normalize_color, parse_hex_color};
pub use descriptor::{ChannelDescriptor, DimensionDescriptor, ImageDescriptor, WindowDescriptor};
pub use dimensions::{Dimension, Dimensions, ProjectionRange, ProjectionState};
pub use error::{CoreError, Result};
pub use history::{History, HistoryEntry, HistoryPath, HistoryValueKind};
pub use image_info::ImageInfo;
