mod bus;
mod config;
mod context;
mod error;
mod events;
mod player;
mod settings;

#[cfg(test)]
mod tests;

pub use bus::EventBus;
pub use config::{ConfigId, ImageConfig};
pub use context::{AppContext, WeakAppContext};
pub use error::{AppError, Result};
pub use events::{ChannelRangeUpdate, Event, SettingsChange, Topic};
pub use player::{DimensionPlayer, PlaybackHandle, PlayerInfo};
pub use settings::{ViewerSettings, load_descriptor, load_settings};
