//! Single-threaded observable value that pushes every mutation to its subscribers.
//!
//! Notifications are synchronous: `set` returns only after every subscriber
//! registered before the call has seen the new value. A subscriber that sets
//! the same observable from inside its callback triggers a nested pass that
//! runs to completion before the outer pass resumes (depth-first), so later
//! subscribers of the outer pass may observe the older value last.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};

type Callback<T> = Rc<dyn Fn(&T)>;

struct Subscriber<T> {
    id: u64,
    active: Rc<Cell<bool>>,
    callback: Callback<T>,
}

struct ObservableInner<T> {
    value: T,
    version: u64,
    next_id: u64,
    subscribers: Vec<Subscriber<T>>,
}

/// Shared handle to an observable value.
///
/// Cloning the handle does not clone the value: every clone reads and writes
/// the same state and shares one subscriber list.
pub struct Observable<T> {
    inner: Rc<RefCell<ObservableInner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

impl<T: Clone + 'static> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ObservableInner {
                value,
                version: 0,
                next_id: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Borrow the current value without cloning it.
    ///
    /// The closure must not mutate this observable; doing so panics.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Replace the value and notify every registered subscriber, in
    /// registration order, with the new value. Equal values still notify.
    pub fn set(&self, value: T) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.value = value.clone();
            inner.version += 1;
        }
        self.notify(&value);
    }

    /// Mutate the value in place, then notify once.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut value = self.get();
        f(&mut value);
        self.set(value);
    }

    /// Compute a new value from the current one, then notify once.
    pub fn replace_with(&self, f: impl FnOnce(T) -> T) {
        let value = f(self.get());
        self.set(value);
    }

    /// Register `callback` and immediately call it with the current value.
    ///
    /// The returned [`Subscription`] detaches the callback when
    /// [`Subscription::unsubscribe`] is called. Dropping it leaves the
    /// callback registered for the lifetime of the observable.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let callback: Callback<T> = Rc::new(callback);
        let active = Rc::new(Cell::new(true));
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.subscribers.push(Subscriber {
                id,
                active: Rc::clone(&active),
                callback: Rc::clone(&callback),
            });
            id
        };

        deliver(&callback, &self.get());

        let weak: Weak<RefCell<ObservableInner<T>>> = Rc::downgrade(&self.inner);
        Subscription::new(active, move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().subscribers.retain(|s| s.id != id);
            }
        })
    }

    /// Number of mutations applied since construction.
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    fn notify(&self, value: &T) {
        // Snapshot so callbacks registered mid-pass wait for the next mutation.
        let snapshot: Vec<(Rc<Cell<bool>>, Callback<T>)> = self
            .inner
            .borrow()
            .subscribers
            .iter()
            .map(|s| (Rc::clone(&s.active), Rc::clone(&s.callback)))
            .collect();

        for (active, callback) in snapshot {
            if active.get() {
                deliver(&callback, value);
            }
        }
    }
}

fn deliver<T>(callback: &Callback<T>, value: &T) {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| callback(value)));
    if outcome.is_err() {
        tracing::error!("observable subscriber panicked; remaining subscribers still notified");
    }
}

/// Handle returned by [`Observable::subscribe`].
pub struct Subscription {
    active: Rc<Cell<bool>>,
    detach: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl Subscription {
    fn new(active: Rc<Cell<bool>>, detach: impl FnOnce() + 'static) -> Self {
        Self {
            active,
            detach: RefCell::new(Some(Box::new(detach))),
        }
    }

    /// Stop delivering notifications to the callback. Calling this more
    /// than once has no effect.
    pub fn unsubscribe(&self) {
        self.active.set(false);
        let detach = self.detach.borrow_mut().take();
        if let Some(detach) = detach {
            detach();
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.active.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn recorder<T: Clone + 'static>() -> (Rc<RefCell<Vec<T>>>, impl Fn(&T) + 'static) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        (log, move |value: &T| sink.borrow_mut().push(value.clone()))
    }

    #[rstest]
    #[case(vec![])]
    #[case(vec![1])]
    #[case(vec![3, 3, 7])]
    #[case(vec![5, 4, 3, 2, 1])]
    fn every_subscriber_sees_initial_value_then_each_set(#[case] values: Vec<i32>) {
        let observable = Observable::new(0);
        let (first, record_first) = recorder();
        let (second, record_second) = recorder();
        let _a = observable.subscribe(record_first);
        let _b = observable.subscribe(record_second);

        for value in &values {
            observable.set(*value);
        }

        let mut expected = vec![0];
        expected.extend(values.iter().copied());
        assert_eq!(*first.borrow(), expected);
        assert_eq!(*second.borrow(), expected);
        assert_eq!(observable.version(), values.len() as u64);
    }

    #[test]
    fn unsubscribed_callback_receives_nothing_further() {
        let observable = Observable::new("a".to_string());
        let (log, record) = recorder();
        let subscription = observable.subscribe(record);
        observable.set("b".into());

        subscription.unsubscribe();
        subscription.unsubscribe();
        observable.set("c".into());
        observable.update(|value| value.push('!'));

        assert_eq!(*log.borrow(), vec!["a".to_string(), "b".to_string()]);
        assert!(!subscription.is_active());
    }

    #[test]
    fn notifies_in_registration_order() {
        let observable = Observable::new(0);
        let order = Rc::new(RefCell::new(Vec::new()));
        let subscriptions: Vec<Subscription> = (0..3)
            .map(|idx| {
                let order = Rc::clone(&order);
                observable.subscribe(move |_| order.borrow_mut().push(idx))
            })
            .collect();
        order.borrow_mut().clear();

        observable.set(1);

        assert_eq!(*order.borrow(), vec![0, 1, 2]);
        assert_eq!(subscriptions.len(), 3);
    }

    #[test]
    fn update_and_replace_with_notify_once_each() {
        let observable = Observable::new(vec![1]);
        let (log, record) = recorder();
        let _sub = observable.subscribe(record);

        observable.update(|items| items.push(2));
        observable.replace_with(|mut items| {
            items.retain(|item| *item != 1);
            items
        });

        assert_eq!(*log.borrow(), vec![vec![1], vec![1, 2], vec![2]]);
        assert_eq!(observable.get(), vec![2]);
    }

    #[test]
    fn subscriber_added_during_notification_waits_for_next_mutation() {
        let observable = Observable::new(0);
        let late_log = Rc::new(RefCell::new(Vec::new()));
        let late_subscription: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let _registrar = {
            let handle = observable.clone();
            let slot = Rc::clone(&late_subscription);
            let late_log = Rc::clone(&late_log);
            observable.subscribe(move |value| {
                if *value == 1 && slot.borrow().is_none() {
                    let late_log = Rc::clone(&late_log);
                    let sub = handle.subscribe(move |v| late_log.borrow_mut().push(*v));
                    *slot.borrow_mut() = Some(sub);
                }
            })
        };

        observable.set(1);
        assert_eq!(*late_log.borrow(), vec![1], "only the immediate delivery");

        observable.set(2);
        assert_eq!(*late_log.borrow(), vec![1, 2]);
    }

    #[test]
    fn reentrant_set_completes_before_outer_pass_resumes() {
        let observable = Observable::new(0);
        let log = Rc::new(RefCell::new(Vec::new()));

        let _a = {
            let handle = observable.clone();
            let log = Rc::clone(&log);
            observable.subscribe(move |value| {
                log.borrow_mut().push(("a", *value));
                if *value == 1 {
                    handle.set(2);
                }
            })
        };
        let _b = {
            let log = Rc::clone(&log);
            observable.subscribe(move |value| log.borrow_mut().push(("b", *value)))
        };

        observable.set(1);

        assert_eq!(
            *log.borrow(),
            vec![("a", 0), ("b", 0), ("a", 1), ("a", 2), ("b", 2), ("b", 1)]
        );
        assert_eq!(observable.get(), 2);
    }

    #[test]
    fn panicking_subscriber_does_not_block_others() {
        let observable = Observable::new(0);
        let _faulty = observable.subscribe(|value: &i32| {
            if *value > 0 {
                panic!("subscriber failure");
            }
        });
        let (log, record) = recorder();
        let _healthy = observable.subscribe(record);

        observable.set(1);
        observable.set(2);

        assert_eq!(*log.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn unsubscribing_a_later_subscriber_mid_pass_skips_it() {
        let observable = Observable::new(0);
        let (log, record) = recorder();
        let victim: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let _killer = {
            let victim = Rc::clone(&victim);
            observable.subscribe(move |value| {
                if *value == 1 {
                    if let Some(sub) = victim.borrow().as_ref() {
                        sub.unsubscribe();
                    }
                }
            })
        };
        *victim.borrow_mut() = Some(observable.subscribe(record));

        observable.set(1);

        assert_eq!(*log.borrow(), vec![0]);
    }

    #[test]
    fn clones_share_state() {
        let observable = Observable::new(10);
        let other = observable.clone();
        other.set(11);
        assert_eq!(observable.get(), 11);
        assert_eq!(observable.with(|v| *v + 1), 12);
    }
}
