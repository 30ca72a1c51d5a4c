use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use log::{debug, info};

use crate::binding::{Subscription, SubscriptionSet};
use crate::model::{
    AxisKind, HistoryEntry, HistoryPath, HistoryValueKind, Projection, ProjectionRange,
    ProjectionState,
};
use crate::runtime::{AppContext, Event, ImageConfig, SettingsChange, Topic};

use super::{Component, Handle, KeyStep, Orientation, SlideOutcome, SliderControl, SliderMode};

/// Slider bound to one positional dimension of an image.
///
/// Shows the current plane with a single handle, or the projection range with
/// two handles while the z dimension is projected. User edits go through the
/// model and are recorded in the configuration's history; model changes from
/// anywhere are reflected back onto the control and announced on the bus.
pub struct DimensionSlider {
    this: Weak<Self>,
    context: AppContext,
    dim: AxisKind,
    config: RefCell<Option<Rc<ImageConfig>>>,
    selector: RefCell<Option<String>>,
    control: RefCell<Option<SliderControl>>,
    observers: SubscriptionSet,
    ready_watch: RefCell<Option<Subscription>>,
    play_watch: RefCell<Option<Subscription>>,
    last_player_start: Cell<Option<usize>>,
    add_projection_history: Cell<bool>,
    stashed_range: Cell<Option<ProjectionRange>>,
    range_before: Cell<Option<ProjectionRange>>,
}

impl DimensionSlider {
    pub fn new(context: &AppContext, dim: AxisKind) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            this: this.clone(),
            context: context.clone(),
            dim,
            config: RefCell::new(None),
            selector: RefCell::new(None),
            control: RefCell::new(None),
            observers: SubscriptionSet::new(),
            ready_watch: RefCell::new(None),
            play_watch: RefCell::new(None),
            last_player_start: Cell::new(None),
            add_projection_history: Cell::new(false),
            stashed_range: Cell::new(None),
            range_before: Cell::new(None),
        })
    }

    pub fn dim(&self) -> AxisKind {
        self.dim
    }

    pub fn config(&self) -> Option<Rc<ImageConfig>> {
        self.config.borrow().clone()
    }

    pub fn selector(&self) -> Option<String> {
        self.selector.borrow().clone()
    }

    /// Snapshot of the rendered control, `None` while unmounted or degenerate.
    pub fn control(&self) -> Option<SliderControl> {
        self.control.borrow().clone()
    }

    pub fn has_control(&self) -> bool {
        self.control.borrow().is_some()
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub fn is_waiting_for_data(&self) -> bool {
        self.ready_watch
            .borrow()
            .as_ref()
            .is_some_and(Subscription::is_active)
    }

    pub fn is_playing(&self) -> bool {
        self.config()
            .is_some_and(|config| self.context.player_info().is_playing(config.id(), self.dim))
    }

    pub fn bind(&self, config: Rc<ImageConfig>) {
        let selector = format!("#{} [dim='{}'] [name='dim']", config.id(), self.dim.code());
        debug!("binding dimension slider {selector}");
        *self.selector.borrow_mut() = Some(selector);
        *self.config.borrow_mut() = Some(config);

        let this = self.this.clone();
        let watch = self.context.subscribe(Topic::ImageDimensionPlay, move |event| {
            if let Some(slider) = this.upgrade() {
                slider.on_play_request(event);
            }
        });
        let previous = self.play_watch.replace(Some(watch));
        if let Some(previous) = previous {
            previous.dispose();
        }
    }

    pub fn attached(&self) {
        let Some(config) = self.config() else {
            return;
        };
        self.release_ready_watch();
        let ready = &config.image_info().ready;
        if ready.get() {
            self.register_observers();
            self.init_slider(false);
            return;
        }

        debug!("dimension slider `{}` waiting for image data", self.dim);
        let this = self.this.clone();
        let watch = ready.observe_once(
            |ready| *ready,
            move |_| {
                if let Some(slider) = this.upgrade() {
                    slider.release_ready_watch();
                    slider.register_observers();
                    slider.init_slider(false);
                }
            },
        );
        *self.ready_watch.borrow_mut() = Some(watch);
    }

    /// Observes the dimension value, the projection mode and the projection
    /// range. Handles from an earlier registration are released first.
    pub fn register_observers(&self) {
        self.observers.dispose_all();
        let Some(config) = self.config() else {
            return;
        };
        let info = config.image_info();

        if let Some(value) = info.dimensions.observable(self.dim) {
            let this = self.this.clone();
            self.observers.push(value.observe(move |new, _| {
                if let Some(slider) = this.upgrade() {
                    slider.on_value_changed(*new);
                }
            }));
        }

        let this = self.this.clone();
        self.observers.push(info.projection.observe(move |projection, _| {
            if let Some(slider) = this.upgrade() {
                slider.on_projection_changed(*projection);
            }
        }));

        let this = self.this.clone();
        self.observers.push(info.projection_opts.observe(move |range, old| {
            if let Some(slider) = this.upgrade() {
                slider.on_projection_range_changed(*range, *old);
            }
        }));
    }

    /// Builds the control from the current model state. `toggle` marks a
    /// rebuild caused by a projection change.
    pub fn init_slider(&self, toggle: bool) {
        let Some(config) = self.config() else {
            return;
        };
        let info = config.image_info();
        let extent = info.dimensions.max(self.dim);
        if extent <= 1 {
            debug!("dimension `{}` has a single plane, no slider", self.dim);
            *self.control.borrow_mut() = None;
            return;
        }

        let orientation = if self.dim == AxisKind::Z {
            Orientation::Vertical
        } else {
            Orientation::Horizontal
        };
        let max = (extent - 1) as f64;
        let step = self.context.settings().slider_step;
        let control = if self.dim == AxisKind::Z && info.projection.get() == Projection::IntMax {
            let range = info.projection_opts.get();
            SliderControl::range(orientation, max, range.start as f64, range.end as f64, step)
        } else {
            let value = info.dimensions.value(self.dim).unwrap_or(0);
            SliderControl::single(orientation, max, value as f64, step)
        };
        debug!(
            "built {} slider for `{}` (toggle: {toggle})",
            if control.is_range() { "range" } else { "single" },
            self.dim
        );
        *self.control.borrow_mut() = Some(control);
    }

    /// Moves the dimension to `value`, rounded to a plane index.
    pub fn on_change(&self, value: f64, from_interaction: bool) {
        let Some(config) = self.config() else {
            return;
        };
        let info = config.image_info();
        let Some(dimension) = info.dimensions.get(self.dim) else {
            return;
        };
        let value = round_index(value, dimension.extent);
        let current = dimension.value.get();
        if value == current {
            if let Some(control) = self.control.borrow_mut().as_mut() {
                control.set_value(current as f64);
            }
            return;
        }
        if from_interaction {
            config.add_history(HistoryEntry::new(
                HistoryPath::dimension(self.dim),
                current,
                value,
                HistoryValueKind::Number,
            ));
        }
        dimension.value.set(value);
    }

    /// Applies a projection range. With `toggle` the projection mode flips as
    /// well. History is only written when a user action armed it.
    pub fn change_projection(&self, values: (f64, f64), toggle: bool) {
        let record = self.add_projection_history.replace(false);
        let Some(config) = self.config() else {
            return;
        };
        let info = config.image_info();
        let extent = info.dimensions.max(AxisKind::Z);
        let range = ProjectionRange::new(round_index(values.0, extent), round_index(values.1, extent));
        let old_range = info.projection_opts.get();

        if toggle {
            let old_mode = info.projection.get();
            let new_mode = old_mode.toggled();
            if record {
                config.add_history(HistoryEntry::new(
                    HistoryPath::projection(),
                    ProjectionState::new(old_mode, old_range).to_value(),
                    ProjectionState::new(new_mode, range).to_value(),
                    HistoryValueKind::Object,
                ));
            }
            info.projection_opts.set(range);
            info.projection.set(new_mode);
            return;
        }

        if range == old_range {
            if let Some(control) = self.control.borrow_mut().as_mut() {
                control.set_values(old_range.start as f64, old_range.end as f64);
            }
            return;
        }
        if record {
            config.add_history(HistoryEntry::new(
                HistoryPath::projection_opts(),
                old_range.to_value(),
                range.to_value(),
                HistoryValueKind::Object,
            ));
        }
        info.projection_opts.set(range);
    }

    /// Starts playback in the given direction, or stops it when this
    /// dimension is already playing that way. Stepping is left to the
    /// playback driver listening on the bus.
    pub fn play_dimension(&self, forwards: bool) {
        let Some(config) = self.config() else {
            return;
        };
        let info = config.image_info();
        let Some(current) = info.dimensions.value(self.dim) else {
            return;
        };
        let player = self.context.player_info();
        let playing_here = player.is_playing(config.id(), self.dim);
        let stop = playing_here && player.forwards == forwards;

        if stop {
            if let Some(start) = self.last_player_start.take() {
                if start != current {
                    config.add_history(HistoryEntry::new(
                        HistoryPath::dimension(self.dim),
                        start,
                        current,
                        HistoryValueKind::Number,
                    ));
                }
            }
        } else {
            if info.dimensions.max(self.dim) <= 1 {
                return;
            }
            if !playing_here || self.last_player_start.get().is_none() {
                self.last_player_start.set(Some(current));
            }
        }

        self.context.publish(Event::ImageDimensionPlay {
            config_id: config.id(),
            dim: self.dim,
            forwards,
            stop,
        });
    }

    /// Nudges the control by `step` planes and commits the result.
    pub fn on_arrow_click(&self, step: f64) {
        if self.context.player_info().is_active() {
            return;
        }
        let outcome = match self.control.borrow_mut().as_mut() {
            Some(control) => control.shift(step),
            None => return,
        };
        if outcome.is_accepted() {
            self.release();
        }
    }

    /// Switches the z dimension between a single plane and a max-intensity
    /// projection over a range of planes.
    pub fn toggle_projection(&self) {
        if self.dim != AxisKind::Z || self.context.player_info().is_active() {
            return;
        }
        let Some(config) = self.config() else {
            return;
        };
        let info = config.image_info();
        let extent = info.dimensions.max(AxisKind::Z);
        if extent <= 1 {
            return;
        }

        let range = match info.projection.get() {
            Projection::Normal => {
                self.stashed_range.set(Some(info.projection_opts.get()));
                let last = extent - 1;
                let current = info.dimensions.value(AxisKind::Z).unwrap_or(0);
                ProjectionRange::new(current.min(last), last)
            }
            Projection::IntMax => self
                .stashed_range
                .take()
                .unwrap_or_else(|| info.projection_opts.get()),
        };
        self.add_projection_history.set(true);
        self.change_projection((range.start as f64, range.end as f64), true);
    }

    /// Drags the single handle without committing.
    pub fn slide(&self, value: f64) -> SlideOutcome {
        self.slide_handle(Handle::Lower, value)
    }

    /// Drags `handle` without committing. Call [`Self::release`] when the
    /// drag ends.
    pub fn slide_handle(&self, handle: Handle, value: f64) -> SlideOutcome {
        if self.context.player_info().is_active() {
            return SlideOutcome::Rejected;
        }
        match self.control.borrow_mut().as_mut() {
            Some(control) => control.slide(handle, value),
            None => SlideOutcome::Rejected,
        }
    }

    /// Commits the control position to the model as a user edit.
    pub fn release(&self) {
        if self.context.player_info().is_active() {
            return;
        }
        let mode = self.control.borrow().as_ref().map(SliderControl::mode);
        match mode {
            Some(SliderMode::Single { value }) => self.on_change(value, true),
            Some(SliderMode::Range { start, end }) => {
                self.add_projection_history.set(true);
                self.change_projection((start, end), false);
            }
            None => {}
        }
    }

    pub fn key_step(&self, handle: Handle, step: KeyStep) -> SlideOutcome {
        if self.context.player_info().is_active() {
            return SlideOutcome::Rejected;
        }
        let outcome = match self.control.borrow_mut().as_mut() {
            Some(control) => control.key_step(handle, step),
            None => return SlideOutcome::Rejected,
        };
        if outcome.is_accepted() {
            self.release();
        }
        outcome
    }

    pub fn detached(&self) {
        self.control.borrow_mut().take();
        self.observers.dispose_all();
        self.release_ready_watch();
    }

    pub fn unbind(&self) {
        self.detached();
        let watch = self.play_watch.borrow_mut().take();
        if let Some(watch) = watch {
            watch.dispose();
        }
        self.last_player_start.set(None);
        self.add_projection_history.set(false);
        self.stashed_range.set(None);
        self.range_before.set(None);
        self.selector.borrow_mut().take();
        if let Some(config) = self.config.borrow_mut().take() {
            debug!("unbound `{}` slider from config {}", self.dim, config.id());
        }
    }

    fn release_ready_watch(&self) {
        let watch = self.ready_watch.borrow_mut().take();
        if let Some(watch) = watch {
            watch.dispose();
        }
    }

    /// Playback is exclusive: when another dimension starts while this one
    /// plays, this one has stopped and its run is recorded as one edit.
    fn on_play_request(&self, event: &Event) {
        let Event::ImageDimensionPlay {
            config_id,
            dim,
            stop: false,
            ..
        } = *event
        else {
            return;
        };
        let Some(config) = self.config() else {
            return;
        };
        if config.id() == config_id && dim == self.dim {
            return;
        }
        let Some(start) = self.last_player_start.take() else {
            return;
        };
        let Some(current) = config.image_info().dimensions.value(self.dim) else {
            return;
        };
        debug!("playback of `{}` taken over by `{dim}`", self.dim);
        if start != current {
            config.add_history(HistoryEntry::new(
                HistoryPath::dimension(self.dim),
                start,
                current,
                HistoryValueKind::Number,
            ));
        }
    }

    fn on_value_changed(&self, value: usize) {
        if let Some(control) = self.control.borrow_mut().as_mut() {
            control.set_value(value as f64);
        }
        let Some(config) = self.config() else {
            return;
        };
        self.context.publish(Event::ImageDimensionChange {
            config_id: config.id(),
            dim: self.dim,
            value,
        });
    }

    fn on_projection_changed(&self, projection: Projection) {
        let range_before = self.range_before.take();
        self.init_slider(true);
        if self.dim == AxisKind::Z {
            self.reseed_stash(projection, range_before);
            info!("projection of `{}` switched", self.dim);
            self.publish_projection();
        }
    }

    /// Keeps the range to restore on leaving the projection in step with
    /// projection changes that did not come from [`Self::toggle_projection`],
    /// such as undo and redo.
    fn reseed_stash(&self, projection: Projection, range_before: Option<ProjectionRange>) {
        match projection {
            Projection::Normal => self.stashed_range.set(None),
            Projection::IntMax => {
                if self.stashed_range.get().is_none() {
                    let Some(config) = self.config() else {
                        return;
                    };
                    let range =
                        range_before.unwrap_or_else(|| config.image_info().projection_opts.get());
                    self.stashed_range.set(Some(range));
                }
            }
        }
    }

    fn on_projection_range_changed(&self, range: ProjectionRange, old: ProjectionRange) {
        self.range_before.set(Some(old));
        if let Some(control) = self.control.borrow_mut().as_mut() {
            control.set_values(range.start as f64, range.end as f64);
        }
        if self.dim == AxisKind::Z {
            self.publish_projection();
        }
    }

    fn publish_projection(&self) {
        let Some(config) = self.config() else {
            return;
        };
        let info = config.image_info();
        self.context.publish(Event::ImageSettingsChange {
            config_id: config.id(),
            change: SettingsChange::Projection {
                projection: info.projection.get(),
                range: info.projection_opts.get(),
            },
        });
    }
}

impl Component for DimensionSlider {
    fn initialize(&self, config: Rc<ImageConfig>) {
        self.bind(config);
    }

    fn mount(&self) {
        self.attached();
    }

    fn unmount(&self) {
        self.detached();
    }

    fn dispose(&self) {
        self.unbind();
    }
}

fn round_index(value: f64, extent: usize) -> usize {
    let last = extent.saturating_sub(1);
    (value.round().max(0.0) as usize).min(last)
}
