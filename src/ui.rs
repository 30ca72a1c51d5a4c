mod app;
mod panels;

use std::collections::BTreeMap;
use std::path::PathBuf;

use eframe::egui;

use crate::model::{
    AxisKind, ChannelDescriptor, DimensionDescriptor, ImageDescriptor, PixelType, Projection,
    WindowDescriptor,
};
use crate::runtime::{ViewerSettings, load_descriptor, load_settings};

pub use app::ViewerApp;

const APP_TITLE: &str = "Image viewer";

/// Opens the viewer window on `session`, or on a demo stack when none is given.
pub fn run(session: Option<PathBuf>, settings: Option<PathBuf>) -> Result<(), String> {
    let settings = match settings {
        Some(path) => load_settings(&path).map_err(|error| error.to_string())?,
        None => ViewerSettings::default(),
    };
    let descriptor = match &session {
        Some(path) => load_descriptor(path).map_err(|error| error.to_string())?,
        None => demo_descriptor(),
    };
    let app = ViewerApp::new(settings, &descriptor).map_err(|error| error.to_string())?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(APP_TITLE)
            .with_inner_size(egui::vec2(960.0, 640.0)),
        ..Default::default()
    };
    eframe::run_native(APP_TITLE, options, Box::new(move |_cc| Ok(Box::new(app))))
        .map_err(|error| error.to_string())
}

pub fn demo_descriptor() -> ImageDescriptor {
    let mut dimensions = BTreeMap::new();
    dimensions.insert(AxisKind::Z, DimensionDescriptor { value: 8, extent: 16 });
    dimensions.insert(AxisKind::Time, DimensionDescriptor { value: 0, extent: 24 });
    let channel = |label: &str, color: &str, end: f64| ChannelDescriptor {
        label: label.to_string(),
        active: true,
        color: color.to_string(),
        window: WindowDescriptor {
            start: 120.0,
            end,
            min: 0.0,
            max: 4095.0,
        },
    };
    ImageDescriptor {
        name: Some("demo stack".into()),
        pixel_type: PixelType::U16,
        ready: true,
        dimensions,
        projection: Projection::Normal,
        projection_opts: None,
        channels: vec![
            channel("DAPI", "0000FF", 2400.0),
            channel("GFP", "00FF00", 3100.0),
        ],
        imported_channels: None,
    }
}
