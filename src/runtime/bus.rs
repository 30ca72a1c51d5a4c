use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::binding::Subscription;

use super::{Event, Topic};

type Handler = Rc<dyn Fn(&Event)>;

struct Registration {
    id: u64,
    topic: Topic,
    handler: Handler,
}

#[derive(Default)]
struct Registry {
    handlers: RefCell<Vec<Registration>>,
    next_id: Cell<u64>,
}

impl Registry {
    fn is_registered(&self, id: u64) -> bool {
        self.handlers
            .borrow()
            .iter()
            .any(|registration| registration.id == id)
    }
}

/// Synchronous publish/subscribe channel shared by every widget of a viewer.
///
/// Handlers run in subscription order before `publish` returns. A handler may
/// publish, subscribe or unsubscribe; handlers added during a dispatch only
/// see later events.
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Rc<Registry>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("EventBus")
            .field("handlers", &self.registry.handlers.borrow().len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, topic: Topic, handler: impl Fn(&Event) + 'static) -> Subscription {
        let id = self.registry.next_id.get();
        self.registry.next_id.set(id.wrapping_add(1));
        self.registry.handlers.borrow_mut().push(Registration {
            id,
            topic,
            handler: Rc::new(handler),
        });

        let registry = Rc::downgrade(&self.registry);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry
                    .handlers
                    .borrow_mut()
                    .retain(|registration| registration.id != id);
            }
        })
    }

    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        let targets = self
            .registry
            .handlers
            .borrow()
            .iter()
            .filter(|registration| registration.topic == topic)
            .map(|registration| (registration.id, Rc::clone(&registration.handler)))
            .collect::<Vec<_>>();
        debug!("publish {topic:?} to {} handler(s): {event:?}", targets.len());
        for (id, handler) in targets {
            if self.registry.is_registered(id) {
                handler(&event);
            }
        }
    }

    pub fn handler_count(&self, topic: Topic) -> usize {
        self.registry
            .handlers
            .borrow()
            .iter()
            .filter(|registration| registration.topic == topic)
            .count()
    }
}
