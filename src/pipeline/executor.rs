use std::sync::Arc;

use crate::{errors::SearchError, scheduler::Scheduler, search::SearchService};

/// Runs one blocking search per debounced value on the worker context.
#[derive(Clone)]
pub struct QueryExecutor {
    service: Arc<dyn SearchService>,
    worker: Arc<dyn Scheduler>,
}

impl QueryExecutor {
    pub fn new(service: Arc<dyn SearchService>, worker: Arc<dyn Scheduler>) -> Self {
        QueryExecutor { service, worker }
    }

    /// Queues `query` on the worker context. `on_done` receives exactly one result
    /// and runs on the worker thread that performed the search.
    pub fn execute(
        &self,
        query: String,
        on_done: impl FnOnce(Result<Vec<String>, SearchError>) + Send + 'static,
    ) {
        let service = Arc::clone(&self.service);
        self.worker.schedule(Box::new(move || {
            let result = service.search(&query);
            on_done(result);
        }));
    }
}
