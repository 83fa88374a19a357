use std::{
    cell::{Cell, RefCell},
    fmt::{Debug, Display},
    rc::{Rc, Weak},
};

use rust_decimal::Decimal;
use tracing::{debug, trace};

use crate::observer::{Observer, ObserverId, Subject};

pub struct Stock {
    name: String,
    value: Cell<Decimal>,
    observers: RefCell<Vec<(ObserverId, Weak<dyn Observer>)>>,
}

impl Stock {
    /// The initial value goes through `set_value`, so creation notifies too.
    pub fn new(name: &str, value: Decimal) -> Rc<Self> {
        let stock = Rc::new(Self {
            name: name.to_string(),
            value: Cell::new(Decimal::ZERO),
            observers: RefCell::new(vec![]),
        });
        stock.set_value(value);
        stock
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> Decimal {
        self.value.get()
    }

    pub fn set_value(&self, value: Decimal) {
        let previous = self.value.replace(value);
        debug!("{} changed from {} to {}", self.name, previous, value);
        self.notify();
    }

    pub fn observer_count(&self) -> usize {
        self.observers
            .borrow()
            .iter()
            .filter(|(_, observer)| observer.strong_count() > 0)
            .count()
    }

    pub fn is_registered(&self, id: ObserverId) -> bool {
        self.observers
            .borrow()
            .iter()
            .any(|(existing, observer)| *existing == id && observer.strong_count() > 0)
    }
}

impl Subject for Stock {
    fn register(&self, observer: Weak<dyn Observer>) {
        let Some(strong) = observer.upgrade() else {
            return;
        };
        let id = strong.id();
        let mut observers = self.observers.borrow_mut();
        if observers.iter().any(|(existing, _)| *existing == id) {
            trace!("{} already observed by {}", self.name, id);
            return;
        }
        observers.push((id, observer));
    }

    fn unregister(&self, id: ObserverId) {
        self.observers
            .borrow_mut()
            .retain(|(existing, _)| *existing != id);
    }

    fn notify(&self) {
        // No borrow may be held while callbacks run: they can (un)register.
        let snapshot: Vec<Weak<dyn Observer>> = {
            let mut observers = self.observers.borrow_mut();
            observers.retain(|(_, observer)| observer.strong_count() > 0);
            observers.iter().map(|(_, observer)| observer.clone()).collect()
        };
        trace!("{} notifying {} observer(s)", self.name, snapshot.len());
        for observer in snapshot.iter().filter_map(Weak::upgrade) {
            observer.value_changed(self);
        }
    }
}

impl Display for Stock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.value())
    }
}

impl Debug for Stock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stock")
            .field("name", &self.name)
            .field("value", &self.value())
            .field("observers", &self.observer_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    struct Counter {
        id: ObserverId,
        calls: Cell<usize>,
        seen: RefCell<Vec<Decimal>>,
        on_call: RefCell<Option<Box<dyn Fn(&Stock)>>>,
    }

    impl Counter {
        fn new() -> Rc<Self> {
            Rc::new(Self {
                id: ObserverId::next(),
                calls: Cell::new(0),
                seen: RefCell::new(vec![]),
                on_call: RefCell::new(None),
            })
        }

        fn weak(self: &Rc<Self>) -> Weak<dyn Observer> {
            let observer: Rc<dyn Observer> = self.clone();
            Rc::downgrade(&observer)
        }
    }

    impl Observer for Counter {
        fn id(&self) -> ObserverId {
            self.id
        }

        fn value_changed(&self, stock: &Stock) {
            self.calls.set(self.calls.get() + 1);
            self.seen.borrow_mut().push(stock.value());
            if let Some(on_call) = self.on_call.borrow().as_ref() {
                on_call(stock);
            }
        }
    }

    #[test]
    fn test_new_keeps_value() {
        let stock = Stock::new("Google", dec!(200));
        assert_eq!(stock.name(), "Google");
        assert_eq!(stock.value(), dec!(200));
        assert_eq!(stock.observer_count(), 0);
    }

    #[test]
    fn test_register_is_idempotent() {
        let stock = Stock::new("Google", dec!(200));
        let counter = Counter::new();
        stock.register(counter.weak());
        stock.register(counter.weak());
        assert_eq!(stock.observer_count(), 1);

        stock.set_value(dec!(55));
        assert_eq!(counter.calls.get(), 1);
        assert_eq!(*counter.seen.borrow(), vec![dec!(55)]);
    }

    #[test]
    fn test_unregister() {
        let stock = Stock::new("Vestas", dec!(45));
        let counter = Counter::new();
        stock.register(counter.weak());
        stock.set_value(dec!(46));
        stock.unregister(counter.id);
        stock.set_value(dec!(47));
        assert_eq!(counter.calls.get(), 1);

        // absent observer
        stock.unregister(counter.id);
        stock.unregister(ObserverId::next());
        assert_eq!(stock.observer_count(), 0);
    }

    #[test]
    fn test_every_write_notifies() {
        let stock = Stock::new("Vestas", dec!(45));
        let counter = Counter::new();
        stock.register(counter.weak());
        stock.set_value(dec!(45));
        stock.set_value(dec!(45));
        stock.notify();
        assert_eq!(counter.calls.get(), 3);
    }

    #[test]
    fn test_dropped_observer_is_pruned() {
        let stock = Stock::new("Google", dec!(200));
        let counter = Counter::new();
        stock.register(counter.weak());
        assert_eq!(stock.observer_count(), 1);
        drop(counter);
        assert_eq!(stock.observer_count(), 0);
        stock.set_value(dec!(1));
        assert!(stock.observers.borrow().is_empty());
    }

    #[test]
    fn test_unregister_during_notify_uses_snapshot() {
        let stock = Stock::new("Google", dec!(200));
        let first = Counter::new();
        let second = Counter::new();
        let second_id = second.id;
        let first_id = first.id;
        *first.on_call.borrow_mut() = Some(Box::new(move |stock: &Stock| {
            stock.unregister(first_id);
            stock.unregister(second_id);
        }));
        stock.register(first.weak());
        stock.register(second.weak());

        stock.set_value(dec!(55));
        assert_eq!(first.calls.get(), 1);
        assert_eq!(second.calls.get(), 1);
        assert_eq!(stock.observer_count(), 0);

        stock.set_value(dec!(60));
        assert_eq!(first.calls.get(), 1);
        assert_eq!(second.calls.get(), 1);
    }

    #[test]
    fn test_reentrant_write() {
        let stock = Stock::new("Google", dec!(200));
        let counter = Counter::new();
        *counter.on_call.borrow_mut() = Some(Box::new(|stock: &Stock| {
            if stock.value() > dec!(100) {
                stock.set_value(dec!(100));
            }
        }));
        stock.register(counter.weak());
        stock.set_value(dec!(150));
        assert_eq!(stock.value(), dec!(100));
        assert_eq!(*counter.seen.borrow(), vec![dec!(150), dec!(100)]);
    }

    #[test]
    fn test_display() {
        let stock = Stock::new("Google", dec!(55.5));
        assert_eq!(stock.to_string(), "Google (55.5)");
    }
}
