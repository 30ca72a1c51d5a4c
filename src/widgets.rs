mod channel_settings;
mod control;
mod dimension_slider;
mod lifecycle;


pub use channel_settings::{ChannelMode, ChannelRange, ChannelSettings};
pub use control::{Handle, KeyStep, Orientation, SlideOutcome, SliderControl, SliderMode};
pub use dimension_slider::DimensionSlider;
pub use lifecycle::Component;
