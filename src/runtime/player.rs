use std::cell::Cell;
use std::rc::{Rc, Weak};

use log::{debug, info};

use crate::binding::Subscription;
use crate::model::AxisKind;

use super::{AppContext, ConfigId, Event, Topic, WeakAppContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaybackHandle(pub u64);

/// Which dimension is animating. At most one plays at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlayerInfo {
    pub config_id: Option<ConfigId>,
    pub dim: Option<AxisKind>,
    pub forwards: bool,
    pub handle: Option<PlaybackHandle>,
}

impl PlayerInfo {
    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    pub fn is_playing(&self, config_id: ConfigId, dim: AxisKind) -> bool {
        self.is_active() && self.config_id == Some(config_id) && self.dim == Some(dim)
    }
}

#[derive(Debug, Default)]
struct PlayerState {
    next_handle: Cell<u64>,
}

/// Executes play/stop requests by stepping the requested dimension.
///
/// The host calls [`DimensionPlayer::tick`] once per play interval. Each tick
/// writes the next index straight into the model, wrapping at either end, so
/// intermediate frames never reach the undo history.
#[derive(Debug)]
pub struct DimensionPlayer {
    context: AppContext,
    _state: Rc<PlayerState>,
    subscription: Subscription,
}

impl DimensionPlayer {
    pub fn new(context: &AppContext) -> Self {
        let state = Rc::new(PlayerState::default());
        let subscription = context.subscribe(Topic::ImageDimensionPlay, {
            let weak_state = Rc::downgrade(&state);
            let weak_context = context.downgrade();
            move |event| handle_play_request(&weak_state, &weak_context, event)
        });
        Self {
            context: context.clone(),
            _state: state,
            subscription,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.context.player_info().is_active()
    }

    /// Advances the playing dimension by one plane and returns the new index.
    pub fn tick(&self) -> Option<usize> {
        let player = self.context.player_info();
        let (Some(config_id), Some(dim), true) = (player.config_id, player.dim, player.is_active())
        else {
            return None;
        };
        let Some(config) = self.context.config(config_id) else {
            self.stop();
            return None;
        };
        let dimension = config.image_info().dimensions.get(dim)?;
        let extent = dimension.extent.max(1);
        let current = dimension.value.get().min(extent - 1);
        let next = if player.forwards {
            (current + 1) % extent
        } else {
            (current + extent - 1) % extent
        };
        dimension.value.set(next);
        Some(next)
    }

    pub fn stop(&self) {
        if self.context.player_info().is_active() {
            info!("playback stopped");
        }
        self.context.set_player_info(PlayerInfo::default());
    }
}

impl Drop for DimensionPlayer {
    fn drop(&mut self) {
        self.subscription.dispose();
        self.stop();
    }
}

fn handle_play_request(state: &Weak<PlayerState>, context: &WeakAppContext, event: &Event) {
    let (Some(state), Some(context)) = (state.upgrade(), context.upgrade()) else {
        return;
    };
    let Event::ImageDimensionPlay {
        config_id,
        dim,
        forwards,
        stop,
    } = *event
    else {
        return;
    };

    let current = context.player_info();
    if stop {
        if current.is_playing(config_id, dim) {
            info!("stopped playing `{dim}` of config {config_id}");
            context.set_player_info(PlayerInfo::default());
        }
        return;
    }

    if current.is_active() {
        debug!(
            "replacing playback of {:?} with `{dim}` of config {config_id}",
            current.dim
        );
    }
    let handle = PlaybackHandle(state.next_handle.get());
    state.next_handle.set(handle.0.wrapping_add(1));
    context.set_player_info(PlayerInfo {
        config_id: Some(config_id),
        dim: Some(dim),
        forwards,
        handle: Some(handle),
    });
    info!(
        "playing `{dim}` of config {config_id} {}",
        if forwards { "forwards" } else { "backwards" }
    );
}
