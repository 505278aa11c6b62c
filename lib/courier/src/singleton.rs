//! Registry of singleton pipeline instances.
//!
//! A pipeline constructed with `singleton` set is recorded here, keyed by its
//! type, and later singleton constructions of the same type get the recorded
//! instance back. The outcome therefore depends on construction order: the
//! first singleton construction wins. Non-singleton constructions never touch
//! the registry.
//!
//! [`SingletonRegistry::global`] is the process-wide registry used by
//! [`Pipeline::new`](crate::Pipeline::new). Tests should construct their own
//! registry, or [`clear`](SingletonRegistry::clear) it between cases.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{LazyLock, Mutex, PoisonError};

static GLOBAL: LazyLock<SingletonRegistry> = LazyLock::new(SingletonRegistry::new);

/// Type-keyed slots holding at most one instance per type.
#[derive(Default)]
pub struct SingletonRegistry {
    slots: Mutex<HashMap<TypeId, Box<dyn Any + Send + Sync>>>,
}

impl std::fmt::Debug for SingletonRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingletonRegistry")
            .field("slots", &self.lock().len())
            .finish()
    }
}

impl SingletonRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<TypeId, Box<dyn Any + Send + Sync>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the recorded instance of `T`, or record the one built by `init`.
    ///
    /// The boolean is `true` when an existing instance was returned.
    pub fn get_or_insert_with<T>(&self, init: impl FnOnce() -> T) -> (T, bool)
    where
        T: Clone + Send + Sync + 'static,
    {
        let mut slots = self.lock();
        if let Some(existing) = slots
            .get(&TypeId::of::<T>())
            .and_then(|slot| slot.downcast_ref::<T>())
        {
            return (existing.clone(), true);
        }

        let instance = init();
        slots.insert(TypeId::of::<T>(), Box::new(instance.clone()));
        (instance, false)
    }

    /// The recorded instance of `T`, if any.
    #[must_use]
    pub fn get<T>(&self) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.lock()
            .get(&TypeId::of::<T>())
            .and_then(|slot| slot.downcast_ref::<T>())
            .cloned()
    }

    /// Forget the recorded instance of `T`, returning whether one existed.
    pub fn remove<T: 'static>(&self) -> bool {
        self.lock().remove(&TypeId::of::<T>()).is_some()
    }

    /// Forget all recorded instances.
    pub fn clear(&self) {
        self.lock().clear();
    }
}
