use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::model::ImageDescriptor;

use super::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    /// Resolution of a dragged slider handle.
    pub slider_step: f64,
    /// Distance moved by the arrow buttons beside a dimension slider.
    pub arrow_step: f64,
    pub play_interval_ms: u64,
    /// Maximum number of undo entries kept per configuration.
    pub history_limit: Option<usize>,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            slider_step: 0.01,
            arrow_step: 1.0,
            play_interval_ms: 200,
            history_limit: None,
        }
    }
}

pub fn load_settings(path: impl AsRef<Path>) -> Result<ViewerSettings> {
    load_by_extension(path.as_ref())
}

pub fn load_descriptor(path: impl AsRef<Path>) -> Result<ImageDescriptor> {
    let descriptor: ImageDescriptor = load_by_extension(path.as_ref())?;
    descriptor.validate()?;
    Ok(descriptor)
}

fn load_by_extension<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let value = if matches!(extension.as_str(), "yaml" | "yml") {
        serde_yaml::from_str::<T>(&raw)?
    } else {
        serde_json::from_str::<T>(&raw)?
    };
    Ok(value)
}
