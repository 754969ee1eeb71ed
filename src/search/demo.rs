use std::time::Duration;

use tracing::trace;

use crate::{errors::SearchError, search::SearchService};

const CITIES: &[&str] = &[
    "Amsterdam",
    "Asuncion",
    "Athens",
    "Bangkok",
    "Barcelona",
    "Berlin",
    "Bogota",
    "Boston",
    "Buenos Aires",
    "Cairo",
    "Chicago",
    "Dublin",
    "Lima",
    "Lisbon",
    "London",
    "Los Angeles",
    "Madrid",
    "Mexico City",
    "Montevideo",
    "New Delhi",
    "New Orleans",
    "New York",
    "Newcastle",
    "Paris",
    "Rome",
    "San Francisco",
    "Santiago",
    "Sao Paulo",
    "Seattle",
    "Sydney",
    "Tokyo",
    "Toronto",
];

const TV_SHOWS: &[&str] = &[
    "The Joy of Painting",
    "The Simpsons",
    "Futurama",
    "Star Trek: The Next Generation",
    "Twin Peaks",
    "Mr. Show",
];

const COLORS: &[&str] = &["blue", "green", "red", "chartreuse", "Van Dyke Brown"];

/// In-memory stand-in for a slow REST backend.
///
/// Every call sleeps for the configured latency on the calling thread, so it must
/// only be used from a worker context.
#[derive(Debug, Clone, Default)]
pub struct DemoRestClient {
    latency: Duration,
}

impl DemoRestClient {
    pub fn new(latency: Duration) -> Self {
        DemoRestClient { latency }
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// Cities whose name starts with `query`, ignoring case. An empty query
    /// matches nothing.
    pub fn search_for_city(&self, query: &str) -> Vec<String> {
        self.simulate_latency();
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        CITIES
            .iter()
            .filter(|city| city.to_lowercase().starts_with(&needle))
            .map(|city| (*city).to_string())
            .collect()
    }

    pub fn favorite_tv_shows(&self) -> Vec<String> {
        self.simulate_latency();
        TV_SHOWS.iter().map(|s| (*s).to_string()).collect()
    }

    /// Colours are local data and come back without delay.
    pub fn color_list() -> Vec<String> {
        COLORS.iter().map(|s| (*s).to_string()).collect()
    }

    fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            trace!(latency_ms = self.latency.as_millis() as u64, "simulating backend latency");
            std::thread::sleep(self.latency);
        }
    }
}

impl SearchService for DemoRestClient {
    fn search(&self, query: &str) -> Result<Vec<String>, SearchError> {
        Ok(self.search_for_city(query))
    }
}
