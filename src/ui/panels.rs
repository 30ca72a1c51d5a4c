use std::rc::Rc;

use eframe::egui;

use crate::model::{AxisKind, Channel, format_hex_color, parse_hex_color};
use crate::runtime::PlayerInfo;
use crate::widgets::{
    ChannelMode, ChannelRange, ChannelSettings, DimensionSlider, Handle, KeyStep, Orientation,
    SliderControl, SliderMode,
};

use super::app::{ViewerApp, WindowDrafts};

pub(super) fn toolbar(app: &mut ViewerApp, ctx: &egui::Context) {
    let (can_undo, can_redo) = app
        .session
        .as_ref()
        .map(|session| (session.config.can_undo(), session.config.can_redo()))
        .unwrap_or((false, false));
    egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            if ui.button("Open session…").clicked() {
                app.open_dialog();
            }
            ui.separator();
            if ui.add_enabled(can_undo, egui::Button::new("Undo")).clicked() {
                app.undo();
            }
            if ui.add_enabled(can_redo, egui::Button::new("Redo")).clicked() {
                app.redo();
            }
            if !app.status.is_empty() {
                ui.separator();
                ui.label(app.status.as_str());
            }
        });
    });
}

pub(super) fn dimension_panels(app: &mut ViewerApp, ctx: &egui::Context) {
    let Some(session) = &app.session else {
        return;
    };
    let arrow_step = app.context.settings().arrow_step;
    let player = app.context.player_info();

    egui::SidePanel::left("z_slider")
        .resizable(false)
        .show(ctx, |ui| {
            ui.label("Z");
            dimension_controls(ui, &session.z, player, arrow_step);
        });
    egui::TopBottomPanel::bottom("t_slider").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.label("T");
            dimension_controls(ui, &session.time, player, arrow_step);
        });
    });
}

fn dimension_controls(
    ui: &mut egui::Ui,
    slider: &DimensionSlider,
    player: PlayerInfo,
    arrow_step: f64,
) {
    let Some(control) = slider.control() else {
        ui.weak("single plane");
        return;
    };
    let playing = slider.is_playing();
    let layout = match control.orientation {
        Orientation::Vertical => egui::Layout::top_down(egui::Align::Center),
        Orientation::Horizontal => egui::Layout::left_to_right(egui::Align::Center),
    };

    ui.with_layout(layout, |ui| {
        if ui
            .selectable_label(playing && !player.forwards, "◀")
            .clicked()
        {
            slider.play_dimension(false);
        }
        if ui.button("‹").clicked() {
            slider.on_arrow_click(-arrow_step);
        }
        match control.mode() {
            SliderMode::Single { value } => {
                handle_slider(ui, slider, &control, Handle::Lower, value);
            }
            SliderMode::Range { start, end } => {
                handle_slider(ui, slider, &control, Handle::Lower, start);
                handle_slider(ui, slider, &control, Handle::Upper, end);
            }
        }
        if ui.button("›").clicked() {
            slider.on_arrow_click(arrow_step);
        }
        if ui.selectable_label(playing && player.forwards, "▶").clicked() {
            slider.play_dimension(true);
        }
        if slider.dim() == AxisKind::Z
            && ui
                .selectable_label(control.is_range(), "MIP")
                .on_hover_text("Maximum intensity projection")
                .clicked()
        {
            slider.toggle_projection();
        }
    });
}

fn handle_slider(
    ui: &mut egui::Ui,
    slider: &DimensionSlider,
    control: &SliderControl,
    handle: Handle,
    value: f64,
) {
    let mut edited = value;
    let mut widget = egui::Slider::new(&mut edited, control.min..=control.max)
        .step_by(control.step)
        .clamping(egui::SliderClamping::Always);
    if control.orientation == Orientation::Vertical {
        widget = widget.vertical();
    }
    let response = ui.add(widget);

    if response.changed() && edited != value {
        slider.slide_handle(handle, edited);
    }
    if response.drag_stopped() || (response.changed() && !response.dragged()) {
        slider.release();
    }
    if response.hovered() {
        let step = ui.input(|input| {
            if input.key_pressed(egui::Key::PageUp) {
                Some(KeyStep::Increase)
            } else if input.key_pressed(egui::Key::PageDown) {
                Some(KeyStep::Decrease)
            } else {
                None
            }
        });
        if let Some(step) = step {
            slider.key_step(handle, step);
        }
    }
}

pub(super) fn channel_panel(app: &mut ViewerApp, ctx: &egui::Context) {
    let Some(session) = &app.session else {
        return;
    };
    let settings = Rc::clone(&session.channels);
    let config = Rc::clone(&session.config);
    let drafts = &mut app.window_drafts;

    egui::SidePanel::right("channels").show(ctx, |ui| {
        ui.heading("Channels");
        ui.horizontal(|ui| {
            for mode in ChannelMode::ALL {
                let selected = settings.selected_mode_index() == Some(mode.index());
                if ui.selectable_label(selected, mode.label()).clicked() {
                    settings.on_mode_change(mode);
                }
            }
        });
        ui.separator();

        for (index, channel) in config.image_info().channels.iter().enumerate() {
            ui.horizontal(|ui| {
                let mut active = channel.active.get();
                let label = if channel.label.is_empty() {
                    format!("Channel {}", index + 1)
                } else {
                    channel.label.clone()
                };
                if ui.checkbox(&mut active, label).changed() {
                    settings.toggle_channel(index);
                }
                if let Ok(mut rgb) = parse_hex_color(&channel.color.get()) {
                    if ui.color_edit_button_srgb(&mut rgb).changed() {
                        settings.set_channel_color(index, &format_hex_color(rgb));
                    }
                }
            });
            window_editor(ui, &settings, channel, index, drafts);
        }
    });
}

fn window_editor(
    ui: &mut egui::Ui,
    settings: &ChannelSettings,
    channel: &Channel,
    index: usize,
    drafts: &mut WindowDrafts,
) {
    let range = settings.range(index).unwrap_or(ChannelRange {
        min: channel.window.min,
        max: channel.window.max,
    });
    let (mut start, mut end) = drafts
        .get(&index)
        .copied()
        .unwrap_or((channel.window.start.get(), channel.window.end.get()));

    ui.horizontal(|ui| {
        let start_response = ui.add(
            egui::DragValue::new(&mut start)
                .range(range.min..=end)
                .speed(1.0)
                .prefix("start "),
        );
        let end_response = ui.add(
            egui::DragValue::new(&mut end)
                .range(start..=range.max)
                .speed(1.0)
                .prefix("end "),
        );

        if start_response.dragged() || end_response.dragged() {
            drafts.insert(index, (start, end));
        } else if start_response.changed()
            || end_response.changed()
            || drafts.contains_key(&index)
        {
            drafts.remove(&index);
            settings.set_channel_window(index, start, end);
        }
    });
}

pub(super) fn summary(app: &mut ViewerApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let Some(session) = &app.session else {
            ui.label("No session open");
            return;
        };
        let info = session.config.image_info();
        ui.heading(info.name.as_deref().unwrap_or("untitled"));
        egui::Grid::new("dimensions").striped(true).show(ui, |ui| {
            for (axis, dimension) in info.dimensions.iter() {
                ui.label(axis.code());
                ui.label(format!("{} / {}", dimension.value.get() + 1, dimension.extent));
                ui.end_row();
            }
        });
        let range = info.projection_opts.get();
        ui.label(format!(
            "Projection: {} ({}..={})",
            info.projection.get().as_str(),
            range.start,
            range.end
        ));
        ui.label(format!("{} undo steps", session.config.history_len()));
    });
}
