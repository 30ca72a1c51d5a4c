use crate::model::CoreError;
use thiserror::Error;

use super::ConfigId;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("image state error: {0}")]
    Core(#[from] CoreError),

    #[error("unknown image configuration: {0}")]
    UnknownConfig(ConfigId),

    #[error("settings I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings serialization failure: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("settings YAML serialization failure: {0}")]
    SerdeYaml(#[from] serde_yaml::Error),
}
