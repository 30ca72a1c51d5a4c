use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;
use std::time::{Duration, Instant};

use eframe::egui;
use log::{info, warn};

use crate::model::{AxisKind, ImageDescriptor};
use crate::runtime::{
    AppContext, DimensionPlayer, ImageConfig, Result, ViewerSettings, load_descriptor,
};
use crate::widgets::{ChannelSettings, Component, DimensionSlider};

use super::panels;

/// Widgets bound to the configuration currently shown.
pub(super) struct Session {
    pub config: Rc<ImageConfig>,
    pub z: Rc<DimensionSlider>,
    pub time: Rc<DimensionSlider>,
    pub channels: Rc<ChannelSettings>,
}

impl Session {
    fn open(context: &AppContext, descriptor: &ImageDescriptor) -> Result<Self> {
        let config = context.add_config(descriptor)?;
        let z = DimensionSlider::new(context, AxisKind::Z);
        let time = DimensionSlider::new(context, AxisKind::Time);
        let channels = ChannelSettings::new(context);
        for component in [&*z as &dyn Component, &*time, &*channels] {
            component.initialize(Rc::clone(&config));
            component.mount();
        }
        Ok(Self {
            config,
            z,
            time,
            channels,
        })
    }

    fn close(self, context: &AppContext) {
        for component in [&*self.z as &dyn Component, &*self.time, &*self.channels] {
            component.unmount();
            component.dispose();
        }
        context.remove_config(self.config.id());
    }
}

/// Window edits in progress, committed once the drag ends.
pub(super) type WindowDrafts = HashMap<usize, (f64, f64)>;

pub struct ViewerApp {
    pub(super) context: AppContext,
    player: DimensionPlayer,
    pub(super) session: Option<Session>,
    pub(super) window_drafts: WindowDrafts,
    pub(super) status: String,
    last_tick: Instant,
}

impl ViewerApp {
    pub fn new(settings: ViewerSettings, descriptor: &ImageDescriptor) -> Result<Self> {
        let context = AppContext::with_settings(settings);
        let player = DimensionPlayer::new(&context);
        let session = Session::open(&context, descriptor)?;
        Ok(Self {
            context,
            player,
            session: Some(session),
            window_drafts: WindowDrafts::new(),
            status: String::new(),
            last_tick: Instant::now(),
        })
    }

    pub(super) fn open_dialog(&mut self) {
        let picked = rfd::FileDialog::new()
            .add_filter("Session", &["yaml", "yml", "json"])
            .pick_file();
        if let Some(path) = picked {
            self.open_path(&path);
        }
    }

    fn open_path(&mut self, path: &Path) {
        let descriptor = match load_descriptor(path) {
            Ok(descriptor) => descriptor,
            Err(error) => {
                warn!("cannot open {}: {error}", path.display());
                self.status = error.to_string();
                return;
            }
        };
        self.player.stop();
        if let Some(previous) = self.session.take() {
            previous.close(&self.context);
        }
        self.window_drafts.clear();
        match Session::open(&self.context, &descriptor) {
            Ok(session) => {
                info!("opened session {}", path.display());
                self.status = format!("Opened {}", path.display());
                self.session = Some(session);
            }
            Err(error) => {
                warn!("cannot open {}: {error}", path.display());
                self.status = error.to_string();
            }
        }
    }

    pub(super) fn undo(&mut self) {
        let Some(session) = &self.session else {
            return;
        };
        if let Err(error) = session.config.undo() {
            self.status = format!("Undo failed: {error}");
        }
    }

    pub(super) fn redo(&mut self) {
        let Some(session) = &self.session else {
            return;
        };
        if let Err(error) = session.config.redo() {
            self.status = format!("Redo failed: {error}");
        }
    }

    fn advance_playback(&mut self, ctx: &egui::Context) {
        if !self.player.is_playing() {
            self.last_tick = Instant::now();
            return;
        }
        let interval = Duration::from_millis(self.context.settings().play_interval_ms.max(1));
        if self.last_tick.elapsed() >= interval {
            self.player.tick();
            self.last_tick = Instant::now();
        }
        ctx.request_repaint_after(interval);
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.context.run_pending();
        self.advance_playback(ctx);

        let shortcut = ctx.input_mut(|input| {
            if input.consume_key(egui::Modifiers::COMMAND | egui::Modifiers::SHIFT, egui::Key::Z) {
                Some(Shortcut::Redo)
            } else if input.consume_key(egui::Modifiers::COMMAND, egui::Key::Z) {
                Some(Shortcut::Undo)
            } else {
                None
            }
        });
        match shortcut {
            Some(Shortcut::Undo) => self.undo(),
            Some(Shortcut::Redo) => self.redo(),
            None => {}
        }

        panels::toolbar(self, ctx);
        panels::channel_panel(self, ctx);
        panels::dimension_panels(self, ctx);
        panels::summary(self, ctx);
    }
}

impl Drop for ViewerApp {
    fn drop(&mut self) {
        self.player.stop();
        if let Some(session) = self.session.take() {
            session.close(&self.context);
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Shortcut {
    Undo,
    Redo,
}
