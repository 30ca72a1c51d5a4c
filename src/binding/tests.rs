use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::{Observable, Scheduler, SubscriptionSet};

#[test]
fn observers_fire_synchronously_with_new_and_old_values() {
    let field = Observable::new(3_usize);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let _subscription = field.observe({
        let seen = Rc::clone(&seen);
        move |new, old| seen.borrow_mut().push((*new, *old))
    });

    assert!(field.set(5));
    assert_eq!(*seen.borrow(), vec![(5, 3)]);
}

#[test]
fn assigning_the_current_value_is_silent() {
    let field = Observable::new("FF0000".to_string());
    let calls = Rc::new(Cell::new(0));
    let _subscription = field.observe({
        let calls = Rc::clone(&calls);
        move |_, _| calls.set(calls.get() + 1)
    });

    assert!(!field.set("FF0000".to_string()));
    assert_eq!(calls.get(), 0);
}

#[test]
fn disposing_twice_is_harmless_and_stops_notifications() {
    let field = Observable::new(0_i32);
    let calls = Rc::new(Cell::new(0));
    let subscription = field.observe({
        let calls = Rc::clone(&calls);
        move |_, _| calls.set(calls.get() + 1)
    });

    subscription.dispose();
    subscription.dispose();
    field.set(1);

    assert_eq!(calls.get(), 0);
    assert_eq!(field.observer_count(), 0);
    assert!(!subscription.is_active());
}

#[test]
fn dropping_a_subscription_unregisters_it() {
    let field = Observable::new(false);
    {
        let _subscription = field.observe(|_, _| {});
        assert_eq!(field.observer_count(), 1);
    }
    assert_eq!(field.observer_count(), 0);
}

#[test]
fn observe_once_fires_a_single_time_when_the_predicate_holds() {
    let ready = Observable::new(false);
    let calls = Rc::new(Cell::new(0));
    let _watch = ready.observe_once(|ready| *ready, {
        let calls = Rc::clone(&calls);
        move |_| calls.set(calls.get() + 1)
    });

    ready.set(true);
    ready.set(false);
    ready.set(true);

    assert_eq!(calls.get(), 1);
    assert_eq!(ready.observer_count(), 0);
}

#[test]
fn callbacks_may_write_back_into_the_field() {
    let field = Observable::new(0_i64);
    let _clamp = field.observe({
        let field = field.clone();
        move |new, _| {
            if *new > 10 {
                field.set(10);
            }
        }
    });

    field.set(42);
    assert_eq!(field.get(), 10);
}

#[test]
fn observer_disposed_mid_dispatch_is_skipped() {
    let field = Observable::new(0_u8);
    let later_calls = Rc::new(Cell::new(0));
    let set = Rc::new(SubscriptionSet::new());

    let first = field.observe({
        let set = Rc::clone(&set);
        move |_, _| set.dispose_all()
    });
    set.push(field.observe({
        let later_calls = Rc::clone(&later_calls);
        move |_, _| later_calls.set(later_calls.get() + 1)
    }));

    field.set(1);
    assert_eq!(later_calls.get(), 0);
    assert!(set.is_empty());
    first.dispose();
}

#[test]
fn scheduler_defers_nested_tasks_to_the_next_tick() {
    let scheduler = Scheduler::new();
    let order = Rc::new(RefCell::new(Vec::new()));
    scheduler.defer({
        let scheduler = scheduler.clone();
        let order = Rc::clone(&order);
        move || {
            order.borrow_mut().push("first");
            let order = Rc::clone(&order);
            scheduler.defer(move || order.borrow_mut().push("nested"));
        }
    });

    assert_eq!(scheduler.run_pending(), 1);
    assert_eq!(*order.borrow(), vec!["first"]);
    assert_eq!(scheduler.pending(), 1);
    assert_eq!(scheduler.run_pending(), 1);
    assert_eq!(*order.borrow(), vec!["first", "nested"]);
}
