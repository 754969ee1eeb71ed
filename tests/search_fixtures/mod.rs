#![allow(dead_code)]

use std::{
    sync::{mpsc, Arc, Mutex},
    time::Duration,
};

use rxsearch::{
    config::{OverlapPolicy, PipelineConfig},
    pipeline::{ResultSink, SearchPipeline},
    scheduler::owner_context,
    search::SearchService,
    SearchError,
};
use tokio::sync::mpsc as async_mpsc;

/// One call made on a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shown {
    Results(Vec<String>),
    Empty,
    Error(SearchError),
}

#[derive(Debug, Default)]
pub struct RecordingSink {
    shown: Mutex<Vec<Shown>>,
}

impl RecordingSink {
    pub fn shown(&self) -> Vec<Shown> {
        self.shown.lock().unwrap().clone()
    }
}

impl ResultSink for RecordingSink {
    fn show_results(&self, results: &[String]) {
        self.shown.lock().unwrap().push(Shown::Results(results.to_vec()));
    }

    fn show_empty(&self) {
        self.shown.lock().unwrap().push(Shown::Empty);
    }

    fn show_error(&self, error: &SearchError) {
        self.shown.lock().unwrap().push(Shown::Error(error.clone()));
    }
}

/// Wraps `service` so every query it receives is recorded, in order.
pub fn recording(
    service: impl SearchService + 'static,
) -> (Arc<dyn SearchService>, Arc<Mutex<Vec<String>>>) {
    let queries = Arc::new(Mutex::new(Vec::new()));
    let queries_c = Arc::clone(&queries);
    let service: Arc<dyn SearchService> = Arc::new(move |query: &str| {
        queries_c.lock().unwrap().push(query.to_string());
        service.search(query)
    });
    (service, queries)
}

/// Echoes the query back as its only result after `latency`.
pub fn echo(latency: Duration) -> impl SearchService {
    move |query: &str| {
        std::thread::sleep(latency);
        Ok::<_, SearchError>(vec![query.to_string()])
    }
}

/// Controls a service whose searches block until the gate opens.
pub struct Gate {
    open_tx: mpsc::Sender<()>,
    pub started: async_mpsc::UnboundedReceiver<String>,
}

impl Gate {
    /// Lets one blocked search finish.
    pub fn open(&self) {
        self.open_tx.send(()).unwrap();
    }
}

pub fn gated() -> (Arc<dyn SearchService>, Gate) {
    let (open_tx, open_rx) = mpsc::channel();
    let (started_tx, started) = async_mpsc::unbounded_channel();
    let open_rx = Mutex::new(open_rx);

    let service: Arc<dyn SearchService> = Arc::new(move |query: &str| {
        started_tx.send(query.to_string()).unwrap();
        open_rx
            .lock()
            .unwrap()
            .recv_timeout(Duration::from_secs(5))
            .unwrap();
        Ok::<_, SearchError>(vec![query.to_string()])
    });
    (service, Gate { open_tx, started })
}

/// Builds a pipeline delivering to a fresh `RecordingSink`, with its owner loop
/// running on the current runtime.
pub fn pipeline_with(
    service: Arc<dyn SearchService>,
    window_ms: u64,
    overlap: OverlapPolicy,
) -> (SearchPipeline, Arc<RecordingSink>) {
    let (owner, owner_loop) = owner_context();
    tokio::spawn(owner_loop.run());

    let sink = Arc::new(RecordingSink::default());
    let config = PipelineConfig {
        debounce_ms: window_ms,
        overlap,
    };
    let pipeline = SearchPipeline::builder(service, sink.clone(), owner)
        .config(config)
        .build()
        .unwrap();
    (pipeline, sink)
}

pub fn results(items: &[&str]) -> Shown {
    Shown::Results(items.iter().map(|s| s.to_string()).collect())
}
