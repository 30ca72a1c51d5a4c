use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::model::{AxisKind, ChannelDescriptor, PixelType, Projection, ProjectionRange};

#[derive(Debug, Parser)]
#[command(
    name = "image-viewer",
    version,
    about = "Dimension and channel controls for multi-dimensional images"
)]
pub(super) struct Cli {
    #[command(subcommand)]
    pub(super) command: Commands,
}

#[derive(Debug, Subcommand)]
pub(super) enum Commands {
    /// Opens the viewer window, on a demo stack when no session is given.
    View {
        #[arg(long)]
        session: Option<PathBuf>,
        #[arg(long)]
        settings: Option<PathBuf>,
    },
    /// Prints what the controls would show for a session file.
    Inspect {
        session: PathBuf,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionSummary {
    pub axis: AxisKind,
    pub value: usize,
    pub extent: usize,
    /// Selector of the slider bound to this dimension, if it gets one.
    pub slider: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub name: Option<String>,
    pub pixel_type: PixelType,
    pub ready: bool,
    pub dimensions: Vec<DimensionSummary>,
    pub projection: Projection,
    pub projection_range: ProjectionRange,
    pub channel_mode: String,
    pub channels: Vec<ChannelDescriptor>,
}
