use std::cell::RefCell;
use std::fmt;

type Release = Box<dyn FnOnce()>;

/// Handle returned by every `observe`/`subscribe` call.
///
/// Disposing releases the registration. Disposing twice is a no-op and
/// dropping the handle disposes it.
pub struct Subscription {
    release: RefCell<Option<Release>>,
}

impl Subscription {
    pub(crate) fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: RefCell::new(Some(Box::new(release))),
        }
    }

    pub fn is_active(&self) -> bool {
        self.release.borrow().is_some()
    }

    pub fn dispose(&self) {
        let release = self.release.borrow_mut().take();
        if let Some(release) = release {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

/// Every handle a component created, released together on teardown.
#[derive(Debug, Default)]
pub struct SubscriptionSet {
    handles: RefCell<Vec<Subscription>>,
}

impl SubscriptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, subscription: Subscription) {
        self.handles.borrow_mut().push(subscription);
    }

    pub fn len(&self) -> usize {
        self.handles.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.borrow().is_empty()
    }

    pub fn dispose_all(&self) {
        let handles = std::mem::take(&mut *self.handles.borrow_mut());
        for handle in handles {
            handle.dispose();
        }
    }
}
