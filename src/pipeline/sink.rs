use std::sync::Mutex;

use crate::{errors::SearchError, sync::LockExt};

/// UI-side receiver of search outcomes. Always called on the owner context.
pub trait ResultSink: Send + Sync {
    /// A non-empty result set arrived.
    fn show_results(&self, results: &[String]);

    /// The query succeeded with no matches.
    fn show_empty(&self);

    /// The query failed. Implementations must leave the visible list untouched.
    fn show_error(&self, error: &SearchError);
}

/// What a single query produced, as seen by the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Results(Vec<String>),
    Empty,
    Failed(SearchError),
}

impl SearchOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn deliver_to(&self, sink: &dyn ResultSink) {
        match self {
            SearchOutcome::Results(results) => sink.show_results(results),
            SearchOutcome::Empty => sink.show_empty(),
            SearchOutcome::Failed(error) => sink.show_error(error),
        }
    }
}

impl From<Result<Vec<String>, SearchError>> for SearchOutcome {
    fn from(result: Result<Vec<String>, SearchError>) -> Self {
        match result {
            Ok(results) if results.is_empty() => SearchOutcome::Empty,
            Ok(results) => SearchOutcome::Results(results),
            Err(error) => SearchOutcome::Failed(error),
        }
    }
}

/// Visible state of a result list with a "no results" indicator beside it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListViewState {
    pub items: Vec<String>,
    pub list_visible: bool,
    pub empty_indicator_visible: bool,
    /// Transient notice for the last failure, cleared by the next success.
    pub notice: Option<String>,
    pub renders: usize,
}

/// A `ResultSink` that keeps a [`ListViewState`] up to date.
#[derive(Debug, Default)]
pub struct ListView {
    state: Mutex<ListViewState>,
}

impl ListView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ListViewState {
        self.state.locked().clone()
    }
}

impl ResultSink for ListView {
    fn show_results(&self, results: &[String]) {
        let mut state = self.state.locked();
        state.items = results.to_vec();
        state.list_visible = true;
        state.empty_indicator_visible = false;
        state.notice = None;
        state.renders += 1;
    }

    fn show_empty(&self) {
        let mut state = self.state.locked();
        state.items.clear();
        state.list_visible = false;
        state.empty_indicator_visible = true;
        state.notice = None;
        state.renders += 1;
    }

    fn show_error(&self, error: &SearchError) {
        let mut state = self.state.locked();
        state.notice = Some(error.to_string());
        state.renders += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_result_set_is_not_a_failure() {
        assert_eq!(SearchOutcome::from(Ok(Vec::new())), SearchOutcome::Empty);
        let failed = SearchOutcome::from(Err(SearchError::Transport("reset".into())));
        assert!(failed.is_failure());
        assert!(!SearchOutcome::Empty.is_failure());
    }

    #[test]
    fn list_view_switches_between_list_and_indicator() {
        let view = ListView::new();

        SearchOutcome::Results(vec!["New York".into()]).deliver_to(&view);
        let state = view.snapshot();
        assert!(state.list_visible);
        assert!(!state.empty_indicator_visible);
        assert_eq!(state.items, vec!["New York".to_string()]);

        SearchOutcome::Empty.deliver_to(&view);
        let state = view.snapshot();
        assert!(!state.list_visible);
        assert!(state.empty_indicator_visible);
        assert!(state.items.is_empty());
        assert_eq!(state.renders, 2);
    }

    #[test]
    fn failure_keeps_the_visible_list() {
        let view = ListView::new();
        SearchOutcome::Results(vec!["Lima".into(), "Lisbon".into()]).deliver_to(&view);

        SearchOutcome::Failed(SearchError::Status {
            status: 503,
            body: "busy".into(),
        })
        .deliver_to(&view);

        let state = view.snapshot();
        assert_eq!(state.items.len(), 2);
        assert!(state.list_visible);
        assert_eq!(state.notice.as_deref(), Some("server responded with HTTP 503: busy"));
    }
}
