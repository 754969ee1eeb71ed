//! Debounced search-as-you-type with an explicit subscription lifecycle.
//!
//! Values pushed into a [`SearchPipeline`] pass through a [`Debouncer`], are
//! searched on the worker context by a [`QueryExecutor`], and the outcome hops back
//! to the owner context where it reaches the [`ResultSink`].
//!
//! ```text
//! push ──► debounce (timer task) ──► search (worker) ──► deliver (owner) ──► sink
//!   ▲                                                                         │
//!   └──────────────────────────── release ◄───────────────────────────────────┘
//! ```
//!
//! Releasing is terminal and idempotent. A result that arrives after release, or
//! that was superseded according to the [`OverlapPolicy`], is dropped silently.
//!
//! [`Debouncer`]: crate::debounce::Debouncer

mod executor;
mod sink;

pub use executor::QueryExecutor;
pub use sink::*;

use std::{
    sync::{Arc, Condvar, Mutex, PoisonError, Weak},
    thread::{self, ThreadId},
    time::Duration,
};

use tokio::runtime::Handle;
use tracing::{debug, info, trace, warn};

use crate::{
    config::{OverlapPolicy, PipelineConfig},
    debounce::Debouncer,
    errors::{PipelineError, SearchError},
    scheduler::{Scheduler, WorkerScheduler},
    search::SearchService,
    subscription::subscribe::{
        Subscribeable, Subscriber, Subscription, SubscriptionHandle, UnsubscribeLogic,
    },
    sync::LockExt,
};

/// Lifecycle of a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Built, nothing pushed yet.
    Idle,
    /// A value is waiting for its window or a query is in flight.
    Pending,
    /// The latest outcome reached the sink and nothing newer is waiting.
    Delivered,
    /// Released. Terminal.
    Cancelled,
}

/// Counters describing what a pipeline did so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub pushed: u64,
    pub dispatched: u64,
    pub delivered: u64,
    pub dropped: u64,
    pub in_flight: usize,
}

struct Inner {
    state: PipelineState,
    /// Bumped by every accepted push.
    generation: u64,
    /// Sequence number of the last dispatched query.
    last_dispatched: u64,
    /// Sequence number of the last outcome handed to the sink.
    last_delivered: u64,
    /// Threads currently inside the sink.
    in_sink: Vec<ThreadId>,
    stats: PipelineStats,
}

struct Shared {
    overlap: PolicyGate,
    inner: Mutex<Inner>,
    /// Signalled whenever a thread leaves the sink.
    sink_idle: Condvar,
    debouncer: Debouncer<String>,
    executor: QueryExecutor,
    owner: Arc<dyn Scheduler>,
    sink: Arc<dyn ResultSink>,
}

#[derive(Clone, Copy)]
struct PolicyGate(OverlapPolicy);

impl PolicyGate {
    /// Decides whether the result of query `seq`, dispatched while the input was at
    /// `generation`, is still worth showing.
    fn admits(self, seq: u64, generation: u64, inner: &Inner) -> bool {
        if seq <= inner.last_delivered {
            return false;
        }
        match self.0 {
            OverlapPolicy::Switch => generation == inner.generation,
            OverlapPolicy::LatestWins => true,
        }
    }
}

/// Handle to a running debounced search. Clones share the same pipeline.
#[derive(Clone)]
pub struct SearchPipeline {
    shared: Arc<Shared>,
}

/// Configures and builds a [`SearchPipeline`].
pub struct PipelineBuilder {
    config: PipelineConfig,
    service: Arc<dyn SearchService>,
    sink: Arc<dyn ResultSink>,
    owner: Arc<dyn Scheduler>,
    worker: Option<Arc<dyn Scheduler>>,
    handle: Option<Handle>,
}

impl PipelineBuilder {
    #[must_use]
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn debounce(mut self, window: Duration) -> Self {
        self.config = self.config.with_debounce(window);
        self
    }

    #[must_use]
    pub fn overlap(mut self, overlap: OverlapPolicy) -> Self {
        self.config = self.config.with_overlap(overlap);
        self
    }

    /// Replaces the default worker context (Tokio's blocking pool).
    #[must_use]
    pub fn worker(mut self, worker: impl Scheduler + 'static) -> Self {
        self.worker = Some(Arc::new(worker));
        self
    }

    /// Runtime used for debounce timers and the default worker context. Defaults to
    /// the runtime `build` is called from.
    #[must_use]
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.handle = Some(handle);
        self
    }

    pub fn build(self) -> Result<SearchPipeline, PipelineError> {
        let handle = match self.handle {
            Some(handle) => handle,
            None => Handle::try_current()?,
        };
        let worker = self
            .worker
            .unwrap_or_else(|| Arc::new(WorkerScheduler::new(handle.clone())));
        let window = self.config.debounce();
        let overlap = self.config.overlap;

        let shared = Arc::new_cyclic(|weak: &Weak<Shared>| {
            let weak = Weak::clone(weak);
            Shared {
                overlap: PolicyGate(overlap),
                inner: Mutex::new(Inner {
                    state: PipelineState::Idle,
                    generation: 0,
                    last_dispatched: 0,
                    last_delivered: 0,
                    in_sink: Vec::new(),
                    stats: PipelineStats::default(),
                }),
                sink_idle: Condvar::new(),
                debouncer: Debouncer::new(window, handle, move |query: String| {
                    if let Some(shared) = weak.upgrade() {
                        shared.dispatch(query);
                    }
                }),
                executor: QueryExecutor::new(self.service, worker),
                owner: self.owner,
                sink: self.sink,
            }
        });

        debug!(window_ms = self.config.debounce_ms, ?overlap, "search pipeline built");
        Ok(SearchPipeline { shared })
    }
}

impl SearchPipeline {
    /// Starts configuring a pipeline that searches with `service` and shows outcomes
    /// through `sink`, on the `owner` context.
    pub fn builder(
        service: Arc<dyn SearchService>,
        sink: Arc<dyn ResultSink>,
        owner: impl Scheduler + 'static,
    ) -> PipelineBuilder {
        PipelineBuilder {
            config: PipelineConfig::default(),
            service,
            sink,
            owner: Arc::new(owner),
            worker: None,
            handle: None,
        }
    }

    /// Feeds a new input value. Ignored once released.
    pub fn push(&self, query: impl Into<String>) {
        let query = query.into();
        {
            let mut inner = self.shared.inner.locked();
            if inner.state == PipelineState::Cancelled {
                trace!(%query, "push after release ignored");
                return;
            }
            inner.generation += 1;
            inner.stats.pushed += 1;
            inner.state = PipelineState::Pending;
        }
        self.shared.debouncer.push(query);
    }

    /// Wires `source` into this pipeline.
    ///
    /// Releasing the returned subscription detaches from `source` and releases the
    /// pipeline.
    pub fn subscribe_to<S>(&self, source: &mut S) -> Subscription
    where
        S: Subscribeable<ObsType = String>,
    {
        let pipeline = self.clone();
        let upstream = source.subscribe(Subscriber::on_next(move |query: String| {
            pipeline.push(query);
        }));

        let pipeline = self.clone();
        Subscription::new(
            UnsubscribeLogic::Logic(Box::new(move || {
                upstream.release();
                pipeline.release();
            })),
            SubscriptionHandle::Nil,
        )
    }

    /// Cancels the pipeline. The pending timer is invalidated and any result still
    /// in flight is dropped when it arrives. Calling it again does nothing.
    ///
    /// No sink call starts after `release` returns. If another thread is inside the
    /// sink at that moment, `release` blocks until that call returns; called from
    /// inside the sink itself it returns at once and only later outcomes are dropped.
    pub fn release(&self) {
        let first = {
            let mut inner = self.shared.inner.locked();
            if inner.state == PipelineState::Cancelled {
                false
            } else {
                inner.state = PipelineState::Cancelled;
                true
            }
        };
        if first {
            self.shared.debouncer.cancel();
            info!("search pipeline released");
        }
        self.shared.wait_for_sink();
    }

    pub fn is_released(&self) -> bool {
        self.state() == PipelineState::Cancelled
    }

    pub fn state(&self) -> PipelineState {
        self.shared.inner.locked().state
    }

    pub fn stats(&self) -> PipelineStats {
        self.shared.inner.locked().stats
    }

    pub fn window(&self) -> Duration {
        self.shared.debouncer.window()
    }
}

impl Shared {
    /// Runs on the timer task once a window elapses.
    fn dispatch(self: &Arc<Self>, query: String) {
        let (seq, generation) = {
            let mut inner = self.inner.locked();
            if inner.state == PipelineState::Cancelled {
                return;
            }
            inner.last_dispatched += 1;
            inner.stats.dispatched += 1;
            inner.stats.in_flight += 1;
            (inner.last_dispatched, inner.generation)
        };

        debug!(seq, %query, "dispatching query");
        let shared = Arc::downgrade(self);
        self.executor.execute(query, move |result| {
            if let Some(shared) = shared.upgrade() {
                let owner = Arc::clone(&shared.owner);
                owner.schedule(Box::new(move || shared.deliver(seq, generation, result)));
            }
        });
    }

    /// Runs on the owner context.
    fn deliver(&self, seq: u64, generation: u64, result: Result<Vec<String>, SearchError>) {
        let outcome = {
            let mut inner = self.inner.locked();
            inner.stats.in_flight = inner.stats.in_flight.saturating_sub(1);

            if inner.state == PipelineState::Cancelled {
                inner.stats.dropped += 1;
                trace!(seq, "result arrived after release, dropped");
                return;
            }
            if !self.overlap.admits(seq, generation, &inner) {
                inner.stats.dropped += 1;
                debug!(seq, "superseded result dropped");
                return;
            }

            inner.last_delivered = seq;
            inner.stats.delivered += 1;
            inner.state = if self.debouncer.is_pending() {
                PipelineState::Pending
            } else {
                PipelineState::Delivered
            };
            inner.in_sink.push(thread::current().id());
            SearchOutcome::from(result)
        };
        let _in_sink = InSink(self);

        match &outcome {
            SearchOutcome::Failed(error) => warn!(seq, %error, "query failed"),
            SearchOutcome::Empty => debug!(seq, "delivering empty result set"),
            SearchOutcome::Results(results) => debug!(seq, count = results.len(), "delivering results"),
        }
        outcome.deliver_to(self.sink.as_ref());
    }

    /// Blocks until no thread other than the caller is inside the sink.
    fn wait_for_sink(&self) {
        let me = thread::current().id();
        let mut inner = self.inner.locked();
        while inner.in_sink.iter().any(|id| *id != me) {
            inner = self
                .sink_idle
                .wait(inner)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

/// Marks the current thread as inside the sink until dropped, even if the sink
/// panics.
struct InSink<'a>(&'a Shared);

impl Drop for InSink<'_> {
    fn drop(&mut self) {
        let me = thread::current().id();
        let mut inner = self.0.inner.locked();
        if let Some(pos) = inner.in_sink.iter().position(|id| *id == me) {
            inner.in_sink.swap_remove(pos);
        }
        drop(inner);
        self.0.sink_idle.notify_all();
    }
}
