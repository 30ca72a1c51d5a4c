use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::rc::Rc;

use serde_json::json;
use tempfile::tempdir;

use super::{
    AppContext, AppError, ConfigId, DimensionPlayer, Event, Topic, ViewerSettings,
    load_descriptor, load_settings,
};
use crate::model::{
    AxisKind, DimensionDescriptor, HistoryEntry, HistoryPath, HistoryValueKind, ImageDescriptor,
    PixelType, Projection,
};

fn descriptor(t_extent: usize) -> ImageDescriptor {
    let mut dimensions = BTreeMap::new();
    dimensions.insert(AxisKind::Time, DimensionDescriptor { value: 0, extent: t_extent });
    ImageDescriptor {
        name: Some("timelapse".into()),
        pixel_type: PixelType::U16,
        ready: true,
        dimensions,
        projection: Projection::Normal,
        projection_opts: None,
        channels: Vec::new(),
        imported_channels: None,
    }
}

fn record(context: &AppContext, topic: Topic) -> (Rc<RefCell<Vec<Event>>>, crate::binding::Subscription) {
    let events = Rc::new(RefCell::new(Vec::new()));
    let subscription = context.subscribe(topic, {
        let events = Rc::clone(&events);
        move |event| events.borrow_mut().push(event.clone())
    });
    (events, subscription)
}

#[test]
fn bus_delivers_only_matching_topics() {
    let context = AppContext::new();
    let (updates, _updates_subscription) = record(&context, Topic::ImageConfigUpdate);
    let (changes, _changes_subscription) = record(&context, Topic::ImageDimensionChange);

    context.publish(Event::ImageConfigUpdate { config_id: ConfigId(4) });

    assert_eq!(updates.borrow().len(), 1);
    assert!(changes.borrow().is_empty());
}

#[test]
fn bus_handler_may_unsubscribe_itself() {
    let context = AppContext::new();
    let slot: Rc<RefCell<Option<crate::binding::Subscription>>> = Rc::new(RefCell::new(None));
    let calls = Rc::new(RefCell::new(0));
    let subscription = context.subscribe(Topic::ImageConfigUpdate, {
        let slot = Rc::clone(&slot);
        let calls = Rc::clone(&calls);
        move |_| {
            *calls.borrow_mut() += 1;
            let own = slot.borrow_mut().take();
            drop(own);
        }
    });
    *slot.borrow_mut() = Some(subscription);

    context.publish(Event::ImageConfigUpdate { config_id: ConfigId(1) });
    context.publish(Event::ImageConfigUpdate { config_id: ConfigId(1) });

    assert_eq!(*calls.borrow(), 1);
    assert_eq!(context.bus().handler_count(Topic::ImageConfigUpdate), 0);
}

#[test]
fn reload_config_replaces_state_and_announces_it() {
    let context = AppContext::new();
    let original = context.add_config(&descriptor(3)).expect("config");
    let (updates, _subscription) = record(&context, Topic::ImageConfigUpdate);

    let reloaded = context
        .reload_config(original.id(), &descriptor(8))
        .expect("reload");

    assert_eq!(reloaded.id(), original.id());
    assert_eq!(reloaded.image_info().dimensions.max(AxisKind::Time), 8);
    assert!(Rc::ptr_eq(
        &context.config(original.id()).expect("registered"),
        &reloaded
    ));
    assert_eq!(
        *updates.borrow(),
        vec![Event::ImageConfigUpdate {
            config_id: original.id()
        }]
    );
    assert!(matches!(
        context.reload_config(ConfigId(99), &descriptor(2)),
        Err(AppError::UnknownConfig(ConfigId(99)))
    ));
}

#[test]
fn config_undo_and_redo_apply_recorded_values() {
    let context = AppContext::new();
    let config = context.add_config(&descriptor(6)).expect("config");
    let time = config
        .image_info()
        .dimensions
        .observable(AxisKind::Time)
        .expect("time")
        .clone();

    config.add_history(HistoryEntry::new(
        HistoryPath::dimension(AxisKind::Time),
        0,
        4,
        HistoryValueKind::Number,
    ));
    time.set(4);

    assert!(config.undo().expect("undo"));
    assert_eq!(time.get(), 0);
    assert!(config.redo().expect("redo"));
    assert_eq!(time.get(), 4);
    assert!(!config.redo().expect("nothing to redo"));
}

#[test]
fn failed_undo_keeps_the_entry_applied() {
    let context = AppContext::new();
    let config = context.add_config(&descriptor(2)).expect("config");
    config.add_history(HistoryEntry::new(
        HistoryPath::channel_active(3),
        true,
        false,
        HistoryValueKind::Boolean,
    ));

    assert!(config.undo().is_err());
    assert_eq!(config.history_len(), 1);
    assert!(config.can_undo());
}

#[test]
fn player_steps_and_wraps_without_history() {
    let context = AppContext::new();
    let config = context.add_config(&descriptor(3)).expect("config");
    let player = DimensionPlayer::new(&context);

    context.publish(Event::ImageDimensionPlay {
        config_id: config.id(),
        dim: AxisKind::Time,
        forwards: true,
        stop: false,
    });
    assert!(player.is_playing());
    assert_eq!(player.tick(), Some(1));
    assert_eq!(player.tick(), Some(2));
    assert_eq!(player.tick(), Some(0));
    assert_eq!(config.history_len(), 0);

    context.publish(Event::ImageDimensionPlay {
        config_id: config.id(),
        dim: AxisKind::Time,
        forwards: true,
        stop: true,
    });
    assert!(!player.is_playing());
    assert_eq!(player.tick(), None);
}

#[test]
fn player_runs_backwards_and_keeps_a_single_playback() {
    let context = AppContext::new();
    let first = context.add_config(&descriptor(4)).expect("first");
    let second = context.add_config(&descriptor(4)).expect("second");
    let player = DimensionPlayer::new(&context);

    context.publish(Event::ImageDimensionPlay {
        config_id: first.id(),
        dim: AxisKind::Time,
        forwards: true,
        stop: false,
    });
    context.publish(Event::ImageDimensionPlay {
        config_id: second.id(),
        dim: AxisKind::Time,
        forwards: false,
        stop: false,
    });

    assert_eq!(context.player_info().config_id, Some(second.id()));
    assert_eq!(player.tick(), Some(3));
    assert_eq!(first.image_info().dimensions.value(AxisKind::Time), Some(0));
}

#[test]
fn settings_load_from_yaml_and_json_with_defaults() {
    let dir = tempdir().expect("tempdir");
    let yaml = dir.path().join("viewer.yaml");
    fs::write(&yaml, "play_interval_ms: 50\nhistory_limit: 10\n").expect("write yaml");
    let json_path = dir.path().join("viewer.json");
    fs::write(&json_path, json!({"arrow_step": 2.0}).to_string()).expect("write json");

    let from_yaml = load_settings(&yaml).expect("yaml settings");
    assert_eq!(from_yaml.play_interval_ms, 50);
    assert_eq!(from_yaml.history_limit, Some(10));
    assert_eq!(from_yaml.slider_step, ViewerSettings::default().slider_step);

    let from_json = load_settings(&json_path).expect("json settings");
    assert_eq!(from_json.arrow_step, 2.0);
    assert_eq!(from_json.play_interval_ms, 200);
}

#[test]
fn descriptor_loading_validates_content() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("session.yml");
    fs::write(
        &path,
        "dimensions:\n  z: {value: 12, extent: 4}\nchannels: []\n",
    )
    .expect("write session");

    assert!(matches!(load_descriptor(&path), Err(AppError::Core(_))));
    assert!(matches!(
        load_descriptor(dir.path().join("missing.json")),
        Err(AppError::Io(_))
    ));
}
