mod observable;
mod scheduler;
mod subscription;

#[cfg(test)]
mod tests;

pub use observable::Observable;
pub use scheduler::Scheduler;
pub use subscription::{Subscription, SubscriptionSet};
