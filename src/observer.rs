//! Publish-on-mutate callback list.
//!
//! Components hold an [`Observers`] and call [`Observers::notify`] after each
//! effective change. Callbacks run synchronously inside the component's
//! `update`, on the runtime's single update thread.

use std::fmt;

type Callback<T> = Box<dyn FnMut(&T) + Send + 'static>;

/// A list of callbacks notified with the latest value.
pub struct Observers<T> {
    callbacks: Vec<Callback<T>>,
}

impl<T> Observers<T> {
    pub fn new() -> Self {
        Self {
            callbacks: Vec::new(),
        }
    }

    /// Registers a callback. Callbacks are invoked in registration order.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&T) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    pub fn notify(&mut self, value: &T) {
        for callback in self.callbacks.iter_mut() {
            callback(value);
        }
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl<T> Default for Observers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Observers<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("len", &self.callbacks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_notify_in_registration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut observers = Observers::new();

        let first = Arc::clone(&seen);
        observers.subscribe(move |v: &u32| first.lock().unwrap().push(("first", *v)));
        let second = Arc::clone(&seen);
        observers.subscribe(move |v: &u32| second.lock().unwrap().push(("second", *v)));

        observers.notify(&7);

        assert_eq!(observers.len(), 2);
        assert_eq!(*seen.lock().unwrap(), vec![("first", 7), ("second", 7)]);
    }

    #[test]
    fn test_empty_notify_is_noop() {
        let mut observers: Observers<u32> = Observers::default();
        assert!(observers.is_empty());
        observers.notify(&1);
    }
}
