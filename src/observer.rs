use std::{
    fmt::Display,
    rc::Weak,
    sync::atomic::{AtomicU64, Ordering},
};

use crate::stock::Stock;

/// Identity of an observer. Subjects deduplicate registrations by this key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

static NEXT_OBSERVER_ID: AtomicU64 = AtomicU64::new(1);

impl ObserverId {
    pub fn next() -> Self {
        Self(NEXT_OBSERVER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Display for ObserverId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub trait Observer {
    fn id(&self) -> ObserverId;

    /// Called synchronously every time `stock` has its value written.
    fn value_changed(&self, stock: &Stock);
}

pub trait Subject {
    /// Adding an observer that is already registered is a no-op.
    fn register(&self, observer: Weak<dyn Observer>);

    /// Removing an observer that is not registered is a no-op.
    fn unregister(&self, id: ObserverId);

    fn notify(&self);
}
