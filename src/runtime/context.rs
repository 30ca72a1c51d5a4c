use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use log::info;

use crate::binding::{Scheduler, Subscription};
use crate::model::{ImageDescriptor, ImageInfo};

use super::{
    AppError, ConfigId, Event, EventBus, ImageConfig, PlayerInfo, Result, Topic, ViewerSettings,
};

struct Shared {
    bus: EventBus,
    scheduler: Scheduler,
    settings: ViewerSettings,
    player_info: Cell<PlayerInfo>,
    configs: RefCell<BTreeMap<ConfigId, Rc<ImageConfig>>>,
    next_config_id: Cell<u64>,
}

/// Application context shared by every widget of a viewer.
///
/// Cloning is cheap and yields a handle to the same context. Widgets only
/// talk to each other through the bus held here.
#[derive(Clone)]
pub struct AppContext {
    shared: Rc<Shared>,
}

/// Non-owning handle for callbacks registered on the context itself.
#[derive(Clone)]
pub struct WeakAppContext {
    shared: Weak<Shared>,
}

impl WeakAppContext {
    pub fn upgrade(&self) -> Option<AppContext> {
        self.shared.upgrade().map(|shared| AppContext { shared })
    }
}

impl fmt::Debug for AppContext {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AppContext")
            .field("configs", &self.shared.configs.borrow().len())
            .field("player_info", &self.shared.player_info.get())
            .field("scheduler", &self.shared.scheduler)
            .finish()
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new()
    }
}

impl AppContext {
    pub fn new() -> Self {
        Self::with_settings(ViewerSettings::default())
    }

    pub fn with_settings(settings: ViewerSettings) -> Self {
        Self {
            shared: Rc::new(Shared {
                bus: EventBus::new(),
                scheduler: Scheduler::new(),
                settings,
                player_info: Cell::new(PlayerInfo::default()),
                configs: RefCell::new(BTreeMap::new()),
                next_config_id: Cell::new(1),
            }),
        }
    }

    pub fn downgrade(&self) -> WeakAppContext {
        WeakAppContext {
            shared: Rc::downgrade(&self.shared),
        }
    }

    pub fn settings(&self) -> &ViewerSettings {
        &self.shared.settings
    }

    pub fn bus(&self) -> &EventBus {
        &self.shared.bus
    }

    pub fn publish(&self, event: Event) {
        self.shared.bus.publish(event);
    }

    pub fn subscribe(&self, topic: Topic, handler: impl Fn(&Event) + 'static) -> Subscription {
        self.shared.bus.subscribe(topic, handler)
    }

    pub fn defer(&self, task: impl FnOnce() + 'static) {
        self.shared.scheduler.defer(task);
    }

    /// Runs the work deferred to this tick.
    pub fn run_pending(&self) -> usize {
        self.shared.scheduler.run_pending()
    }

    pub fn player_info(&self) -> PlayerInfo {
        self.shared.player_info.get()
    }

    pub(crate) fn set_player_info(&self, player_info: PlayerInfo) {
        self.shared.player_info.set(player_info);
    }

    pub fn add_config(&self, descriptor: &ImageDescriptor) -> Result<Rc<ImageConfig>> {
        let id = ConfigId(self.shared.next_config_id.get());
        let config = self.build_config(id, descriptor)?;
        self.shared.next_config_id.set(id.0 + 1);
        self.shared
            .configs
            .borrow_mut()
            .insert(id, Rc::clone(&config));
        info!(
            "registered image configuration {id} ({})",
            descriptor.name.as_deref().unwrap_or("unnamed")
        );
        Ok(config)
    }

    /// Replaces the configuration `id` and announces the change on the bus.
    pub fn reload_config(
        &self,
        id: ConfigId,
        descriptor: &ImageDescriptor,
    ) -> Result<Rc<ImageConfig>> {
        if !self.shared.configs.borrow().contains_key(&id) {
            return Err(AppError::UnknownConfig(id));
        }
        let config = self.build_config(id, descriptor)?;
        self.shared
            .configs
            .borrow_mut()
            .insert(id, Rc::clone(&config));
        info!("reloaded image configuration {id}");
        self.publish(Event::ImageConfigUpdate { config_id: id });
        Ok(config)
    }

    pub fn config(&self, id: ConfigId) -> Option<Rc<ImageConfig>> {
        self.shared.configs.borrow().get(&id).cloned()
    }

    pub fn config_ids(&self) -> Vec<ConfigId> {
        self.shared.configs.borrow().keys().copied().collect()
    }

    pub fn remove_config(&self, id: ConfigId) -> Option<Rc<ImageConfig>> {
        let removed = self.shared.configs.borrow_mut().remove(&id);
        if removed.is_some() {
            info!("closed image configuration {id}");
        }
        removed
    }

    fn build_config(&self, id: ConfigId, descriptor: &ImageDescriptor) -> Result<Rc<ImageConfig>> {
        let image_info = ImageInfo::from_descriptor(descriptor)?;
        Ok(Rc::new(ImageConfig::new(
            id,
            image_info,
            self.shared.settings.history_limit,
        )))
    }
}
