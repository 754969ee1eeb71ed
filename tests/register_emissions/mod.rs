#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use rxsearch::subscribe::Subscriber;

/// Shared record of everything delivered to the subscribers it hands out.
pub struct Emissions<T> {
    pub nexts: Arc<Mutex<Vec<T>>>,
    pub completes: Arc<Mutex<usize>>,
    pub errors: Arc<Mutex<Vec<String>>>,
}

impl<T: Send + 'static> Emissions<T> {
    pub fn new() -> Self {
        Emissions {
            nexts: Arc::new(Mutex::new(Vec::with_capacity(5))),
            completes: Arc::new(Mutex::new(0)),
            errors: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A subscriber that records into this `Emissions`. Every call returns a new one.
    pub fn subscriber(&self) -> Subscriber<T> {
        let nexts_c = Arc::clone(&self.nexts);
        let errors_c = Arc::clone(&self.errors);
        let completes_c = Arc::clone(&self.completes);

        Subscriber::new(
            move |n| {
                // Track next() calls.
                nexts_c.lock().unwrap().push(n);
            },
            move |e| {
                // Track error() calls.
                errors_c.lock().unwrap().push(e.to_string());
            },
            move || {
                // Track complete() calls.
                *completes_c.lock().unwrap() += 1;
            },
        )
    }

    pub fn next_count(&self) -> usize {
        self.nexts.lock().unwrap().len()
    }

    pub fn complete_count(&self) -> usize {
        *self.completes.lock().unwrap()
    }

    pub fn error_count(&self) -> usize {
        self.errors.lock().unwrap().len()
    }
}

impl<T: Clone + Send + 'static> Emissions<T> {
    pub fn values(&self) -> Vec<T> {
        self.nexts.lock().unwrap().clone()
    }
}
