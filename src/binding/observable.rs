use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use super::Subscription;

type Callback<T> = Rc<dyn Fn(&T, &T)>;

struct Slot<T> {
    id: u64,
    callback: Callback<T>,
}

struct Shared<T> {
    value: RefCell<T>,
    observers: RefCell<Vec<Slot<T>>>,
    next_id: Cell<u64>,
}

impl<T> Shared<T> {
    fn allocate_id(&self) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id.wrapping_add(1));
        id
    }

    fn is_registered(&self, id: u64) -> bool {
        self.observers.borrow().iter().any(|slot| slot.id == id)
    }

    fn unregister(&self, id: u64) {
        self.observers.borrow_mut().retain(|slot| slot.id != id);
    }
}

/// A model field that notifies its observers whenever its value changes.
///
/// Cloning an `Observable` yields another handle to the same field. Observers
/// run synchronously inside [`Observable::set`], after the new value has been
/// stored and with no borrow held, so callbacks may read or write any field,
/// including this one. Assigning the value the field already holds is silent.
pub struct Observable<T> {
    shared: Rc<Shared<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Observable")
            .field("value", &*self.shared.value.borrow())
            .field("observers", &self.shared.observers.borrow().len())
            .finish()
    }
}

impl<T: Default + Clone + PartialEq + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            shared: Rc::new(Shared {
                value: RefCell::new(value),
                observers: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    pub fn get(&self) -> T {
        self.shared.value.borrow().clone()
    }

    pub fn with<R>(&self, read: impl FnOnce(&T) -> R) -> R {
        read(&self.shared.value.borrow())
    }

    /// Stores `value` and notifies observers. Returns `false` without
    /// notifying when the field already holds an equal value.
    pub fn set(&self, value: T) -> bool {
        let old = {
            let mut current = self.shared.value.borrow_mut();
            if *current == value {
                return false;
            }
            std::mem::replace(&mut *current, value.clone())
        };
        self.notify(&value, &old);
        true
    }

    pub fn update(&self, edit: impl FnOnce(&mut T)) -> bool {
        let mut next = self.get();
        edit(&mut next);
        self.set(next)
    }

    pub fn observe(&self, callback: impl Fn(&T, &T) + 'static) -> Subscription {
        let id = self.shared.allocate_id();
        self.register(id, Rc::new(callback))
    }

    /// Registers `callback` to run the first time a new value satisfies
    /// `predicate`. The registration removes itself before the callback runs.
    pub fn observe_once(
        &self,
        predicate: impl Fn(&T) -> bool + 'static,
        callback: impl FnOnce(&T) + 'static,
    ) -> Subscription {
        let id = self.shared.allocate_id();
        let pending: RefCell<Option<Box<dyn FnOnce(&T)>>> = RefCell::new(Some(Box::new(callback)));
        let shared: Weak<Shared<T>> = Rc::downgrade(&self.shared);
        let once = move |new: &T, _old: &T| {
            if !predicate(new) {
                return;
            }
            let callback = pending.borrow_mut().take();
            if let Some(callback) = callback {
                if let Some(shared) = shared.upgrade() {
                    shared.unregister(id);
                }
                callback(new);
            }
        };
        self.register(id, Rc::new(once))
    }

    pub fn observer_count(&self) -> usize {
        self.shared.observers.borrow().len()
    }

    fn register(&self, id: u64, callback: Callback<T>) -> Subscription {
        self.shared
            .observers
            .borrow_mut()
            .push(Slot { id, callback });
        let shared = Rc::downgrade(&self.shared);
        Subscription::new(move || {
            if let Some(shared) = shared.upgrade() {
                shared.unregister(id);
            }
        })
    }

    fn notify(&self, new: &T, old: &T) {
        let snapshot = self
            .shared
            .observers
            .borrow()
            .iter()
            .map(|slot| (slot.id, Rc::clone(&slot.callback)))
            .collect::<Vec<_>>();
        for (id, callback) in snapshot {
            // An earlier callback may have disposed this one.
            if self.shared.is_registered(id) {
                callback(new, old);
            }
        }
    }
}
