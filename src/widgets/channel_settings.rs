use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use log::{debug, info, warn};
use serde_json::json;

use crate::binding::{Observable, Subscription, SubscriptionSet};
use crate::model::{
    HistoryEntry, HistoryPath, HistoryValueKind, ImageInfo, normalize_color, parse_hex_color,
};
use crate::runtime::{
    AppContext, ChannelRangeUpdate, ConfigId, Event, ImageConfig, SettingsChange, Topic,
};

use super::Component;

/// How the intensity window of every channel is bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelMode {
    MinMax = 0,
    FullRange = 1,
    Imported = 2,
}

impl ChannelMode {
    pub const ALL: [Self; 3] = [Self::MinMax, Self::FullRange, Self::Imported];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::MinMax => "Min/Max",
            Self::FullRange => "Full range",
            Self::Imported => "Imported",
        }
    }

    /// Full range as soon as one window leaves its channel's bounds.
    pub fn initial(info: &ImageInfo) -> Self {
        if info
            .channels
            .iter()
            .all(|channel| channel.window.within_bounds())
        {
            Self::MinMax
        } else {
            Self::FullRange
        }
    }
}

impl fmt::Display for ChannelMode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.label())
    }
}

/// Bounds the window edges of one channel may be dragged within.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelRange {
    pub min: f64,
    pub max: f64,
}

impl ChannelRange {
    fn clamp(self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// Panel editing the active flag, color and intensity window of every
/// channel, plus the display mode selector shared by all channels.
pub struct ChannelSettings {
    this: Weak<Self>,
    context: AppContext,
    config: RefCell<Option<Rc<ImageConfig>>>,
    config_watch: RefCell<Option<Subscription>>,
    observers: SubscriptionSet,
    mode: Observable<Option<ChannelMode>>,
    mode_watch: RefCell<Option<Subscription>>,
    selected: Cell<Option<usize>>,
    pending_mode: Cell<Option<ChannelMode>>,
    ranges: RefCell<Vec<ChannelRange>>,
    reinitializations: Cell<usize>,
}

impl ChannelSettings {
    pub fn new(context: &AppContext) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            this: this.clone(),
            context: context.clone(),
            config: RefCell::new(None),
            config_watch: RefCell::new(None),
            observers: SubscriptionSet::new(),
            mode: Observable::new(None),
            mode_watch: RefCell::new(None),
            selected: Cell::new(None),
            pending_mode: Cell::new(None),
            ranges: RefCell::new(Vec::new()),
            reinitializations: Cell::new(0),
        })
    }

    pub fn config(&self) -> Option<Rc<ImageConfig>> {
        self.config.borrow().clone()
    }

    pub fn mode(&self) -> Option<ChannelMode> {
        self.mode.get()
    }

    /// Index of the highlighted entry of the mode selector.
    pub fn selected_mode_index(&self) -> Option<usize> {
        self.selected.get()
    }

    pub fn ranges(&self) -> Vec<ChannelRange> {
        self.ranges.borrow().clone()
    }

    pub fn range(&self, index: usize) -> Option<ChannelRange> {
        self.ranges.borrow().get(index).copied()
    }

    /// Number of mode-dependent reinitializations run so far.
    pub fn reinitializations(&self) -> usize {
        self.reinitializations.get()
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub fn is_listening(&self) -> bool {
        self.config_watch.borrow().is_some()
    }

    pub fn bind(&self, config: Rc<ImageConfig>) {
        let initial = ChannelMode::initial(config.image_info());
        debug!(
            "binding channel settings to config {} ({} channels)",
            config.id(),
            config.image_info().channels.len()
        );
        *self.config.borrow_mut() = Some(config);

        let this = self.this.clone();
        let watch = self
            .context
            .subscribe(Topic::ImageConfigUpdate, move |event| {
                if let Some(settings) = this.upgrade() {
                    settings.on_image_config_change(event.config_id());
                }
            });
        self.replace_watch(&self.config_watch, Some(watch));

        self.register_observers();

        let this = self.this.clone();
        let watch = self.mode.observe(move |mode, _| {
            if let (Some(settings), Some(mode)) = (this.upgrade(), mode) {
                settings.reinitialize(*mode);
            }
        });
        self.replace_watch(&self.mode_watch, Some(watch));

        self.change_channel_mode(initial);
    }

    /// One observer per channel field, all funnelled into the same
    /// settings-change notification for that channel.
    pub fn register_observers(&self) {
        self.observers.dispose_all();
        let Some(config) = self.config() else {
            return;
        };
        for (index, channel) in config.image_info().channels.iter().enumerate() {
            self.observers
                .push(channel.active.observe(self.propagator::<bool>(index)));
            self.observers
                .push(channel.color.observe(self.propagator::<String>(index)));
            self.observers
                .push(channel.window.start.observe(self.propagator::<f64>(index)));
            self.observers
                .push(channel.window.end.observe(self.propagator::<f64>(index)));
        }
    }

    pub fn on_image_config_change(&self, config_id: ConfigId) {
        let Some(current) = self.config() else {
            return;
        };
        if current.id() != config_id {
            return;
        }
        self.unbind();
        match self.context.config(config_id) {
            Some(config) => self.bind(config),
            None => warn!("config {config_id} vanished before channel settings could rebind"),
        }
    }

    pub fn change_channel_mode(&self, mode: ChannelMode) {
        self.selected.set(Some(mode.index()));
        self.mode.set(Some(mode));
    }

    /// Selector handler. Picking the mode already shown clears it and sets it
    /// again on the next tick so the reinitialization still runs. Picks made
    /// before that tick replace the pending mode.
    pub fn on_mode_change(&self, mode: ChannelMode) {
        if self.pending_mode.replace(Some(mode)).is_some() {
            self.selected.set(Some(mode.index()));
            return;
        }
        if self.mode.get() != Some(mode) {
            self.pending_mode.set(None);
            self.change_channel_mode(mode);
            return;
        }
        self.mode.set(None);
        let this = self.this.clone();
        self.context.defer(move || {
            if let Some(settings) = this.upgrade() {
                if let Some(mode) = settings.pending_mode.take() {
                    if settings.config().is_some() {
                        settings.change_channel_mode(mode);
                    }
                }
            }
        });
    }

    pub fn is_mode_pending(&self) -> bool {
        self.pending_mode.get().is_some()
    }

    pub fn toggle_channel(&self, index: usize) {
        let Some(config) = self.config() else {
            return;
        };
        let Some(channel) = config.image_info().channel(index) else {
            warn!("no channel {index} to toggle");
            return;
        };
        let active = channel.active.get();
        config.add_history(HistoryEntry::new(
            HistoryPath::channel_active(index),
            active,
            !active,
            HistoryValueKind::Boolean,
        ));
        channel.active.set(!active);
    }

    /// Moves the window edges of channel `index`, clamped to its current
    /// range. Returns whether anything changed.
    pub fn set_channel_window(&self, index: usize, start: f64, end: f64) -> bool {
        let Some(config) = self.config() else {
            return false;
        };
        let Some(channel) = config.image_info().channel(index) else {
            return false;
        };
        if start > end {
            warn!("ignoring inverted window {start}..{end} for channel {index}");
            return false;
        }
        let range = self.range(index).unwrap_or(ChannelRange {
            min: channel.window.min,
            max: channel.window.max,
        });
        let (start, end) = (range.clamp(start), range.clamp(end));
        if (start, end) == (channel.window.start.get(), channel.window.end.get()) {
            return false;
        }
        config.add_history(HistoryEntry::new(
            HistoryPath::channel_window(index),
            channel.window_value(),
            json!({"start": start, "end": end}),
            HistoryValueKind::Object,
        ));
        channel.set_window(start, end);
        true
    }

    pub fn set_channel_color(&self, index: usize, color: &str) -> bool {
        let Some(config) = self.config() else {
            return false;
        };
        let Some(channel) = config.image_info().channel(index) else {
            return false;
        };
        if let Err(error) = parse_hex_color(color) {
            warn!("channel {index}: {error}");
            return false;
        }
        let color = normalize_color(color);
        let old = channel.color.get();
        if old == color {
            return false;
        }
        config.add_history(HistoryEntry::new(
            HistoryPath::channel_color(index),
            old,
            color.clone(),
            HistoryValueKind::String,
        ));
        channel.color.set(color);
        true
    }

    pub fn unbind(&self) {
        self.replace_watch(&self.config_watch, None);
        self.observers.dispose_all();
        self.replace_watch(&self.mode_watch, None);
        self.mode.set(None);
        self.selected.set(None);
        self.pending_mode.set(None);
        self.ranges.borrow_mut().clear();
        if let Some(config) = self.config.borrow_mut().take() {
            debug!("unbound channel settings from config {}", config.id());
        }
    }

    fn replace_watch(&self, slot: &RefCell<Option<Subscription>>, watch: Option<Subscription>) {
        let previous = slot.replace(watch);
        if let Some(previous) = previous {
            previous.dispose();
        }
    }

    fn propagator<T: 'static>(&self, index: usize) -> impl Fn(&T, &T) + 'static {
        let this = self.this.clone();
        move |_, _| {
            if let Some(settings) = this.upgrade() {
                settings.propagate(index);
            }
        }
    }

    fn propagate(&self, index: usize) {
        let Some(config) = self.config() else {
            return;
        };
        let Some(channel) = config.image_info().channel(index) else {
            return;
        };
        let update = ChannelRangeUpdate {
            index,
            start: channel.window.start.get(),
            end: channel.window.end.get(),
            color: channel.color.get(),
            active: channel.active.get(),
        };
        self.context.publish(Event::ImageSettingsChange {
            config_id: config.id(),
            change: SettingsChange::Channels(vec![update]),
        });
    }

    fn reinitialize(&self, mode: ChannelMode) {
        let Some(config) = self.config() else {
            return;
        };
        let info = config.image_info();
        let ranges = match mode {
            ChannelMode::MinMax => info
                .channels
                .iter()
                .map(|channel| {
                    let range = ChannelRange {
                        min: channel.window.min,
                        max: channel.window.max,
                    };
                    channel.set_window(
                        range.clamp(channel.window.start.get()),
                        range.clamp(channel.window.end.get()),
                    );
                    range
                })
                .collect::<Vec<_>>(),
            ChannelMode::FullRange => info
                .channels
                .iter()
                .map(|channel| {
                    let (min, max) = channel.window.full_range(info.pixel_type);
                    ChannelRange { min, max }
                })
                .collect(),
            ChannelMode::Imported => {
                self.restore_imported(&config);
                info.channels
                    .iter()
                    .map(|channel| ChannelRange {
                        min: channel.window.min.min(channel.window.start.get()),
                        max: channel.window.max.max(channel.window.end.get()),
                    })
                    .collect()
            }
        };
        *self.ranges.borrow_mut() = ranges;
        self.reinitializations.set(self.reinitializations.get() + 1);
        info!("channel display mode of config {} set to {mode}", config.id());
    }

    fn restore_imported(&self, config: &ImageConfig) {
        let info = config.image_info();
        let before = info.channel_descriptors();
        for (channel, descriptor) in info.channels.iter().zip(&info.imported_channels) {
            channel.apply(descriptor);
        }
        let after = info.channel_descriptors();
        if before == after {
            return;
        }
        match (serde_json::to_value(&before), serde_json::to_value(&after)) {
            (Ok(old_val), Ok(new_val)) => config.add_history(HistoryEntry::new(
                HistoryPath::channels(),
                old_val,
                new_val,
                HistoryValueKind::Object,
            )),
            (Err(error), _) | (_, Err(error)) => {
                warn!("cannot record imported channel settings: {error}");
            }
        }
    }
}

impl Component for ChannelSettings {
    fn initialize(&self, config: Rc<ImageConfig>) {
        self.bind(config);
    }

    fn dispose(&self) {
        self.unbind();
    }
}
