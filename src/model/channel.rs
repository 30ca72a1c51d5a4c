use serde_json::{Value, json};

use crate::binding::Observable;

use super::{ChannelDescriptor, CoreError, PixelType, Result, WindowDescriptor};

#[derive(Debug)]
pub struct ChannelWindow {
    pub start: Observable<f64>,
    pub end: Observable<f64>,
    pub min: f64,
    pub max: f64,
}

impl ChannelWindow {
    pub fn within_bounds(&self) -> bool {
        self.start.get() >= self.min && self.end.get() <= self.max
    }

    /// Bounds used when the window may leave `[min, max]`.
    pub fn full_range(&self, pixel_type: PixelType) -> (f64, f64) {
        let (lower, upper) = pixel_type
            .full_range()
            .unwrap_or((self.min, self.max));
        (
            lower.min(self.min).min(self.start.get()),
            upper.max(self.max).max(self.end.get()),
        )
    }
}

#[derive(Debug)]
pub struct Channel {
    pub label: String,
    pub active: Observable<bool>,
    pub color: Observable<String>,
    pub window: ChannelWindow,
}

impl Channel {
    pub fn from_descriptor(descriptor: &ChannelDescriptor) -> Self {
        Self {
            label: descriptor.label.clone(),
            active: Observable::new(descriptor.active),
            color: Observable::new(normalize_color(&descriptor.color)),
            window: ChannelWindow {
                start: Observable::new(descriptor.window.start),
                end: Observable::new(descriptor.window.end),
                min: descriptor.window.min,
                max: descriptor.window.max,
            },
        }
    }

    pub fn descriptor(&self) -> ChannelDescriptor {
        ChannelDescriptor {
            label: self.label.clone(),
            active: self.active.get(),
            color: self.color.get(),
            window: WindowDescriptor {
                start: self.window.start.get(),
                end: self.window.end.get(),
                min: self.window.min,
                max: self.window.max,
            },
        }
    }

    /// Copies the observable settings of `descriptor` onto this channel.
    /// Bounds and label are left untouched.
    pub fn apply(&self, descriptor: &ChannelDescriptor) {
        self.active.set(descriptor.active);
        self.color.set(normalize_color(&descriptor.color));
        self.set_window(descriptor.window.start, descriptor.window.end);
    }

    /// Moves both window edges without ever passing `start` over `end`.
    pub fn set_window(&self, start: f64, end: f64) {
        if start > self.window.end.get() {
            self.window.end.set(end);
            self.window.start.set(start);
        } else {
            self.window.start.set(start);
            self.window.end.set(end);
        }
    }

    pub fn window_value(&self) -> Value {
        json!({"start": self.window.start.get(), "end": self.window.end.get()})
    }
}

pub fn parse_hex_color(color: &str) -> Result<[u8; 3]> {
    let digits = color.strip_prefix('#').unwrap_or(color);
    if digits.len() != 6 || !digits.chars().all(|digit| digit.is_ascii_hexdigit()) {
        return Err(CoreError::InvalidColor(color.to_string()));
    }
    let channel = |offset: usize| {
        u8::from_str_radix(&digits[offset..offset + 2], 16)
            .map_err(|_| CoreError::InvalidColor(color.to_string()))
    };
    Ok([channel(0)?, channel(2)?, channel(4)?])
}

/// Upper-case `RRGGBB` without a leading `#`.
pub fn normalize_color(color: &str) -> String {
    color.trim_start_matches('#').to_ascii_uppercase()
}

pub fn format_hex_color(rgb: [u8; 3]) -> String {
    format!("{:02X}{:02X}{:02X}", rgb[0], rgb[1], rgb[2])
}
