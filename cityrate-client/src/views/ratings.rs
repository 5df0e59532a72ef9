//! Ratings tab: city and country rankings
//!
//! The fetch is keyed by rating mode. Switching modes while a request is in
//! flight makes the older response stale, so a slow "overall" answer can
//! never overwrite the "hidden jam" table the user switched to.

use cityrate_common::rating::{
    aggregate_countries, fill_derived_scores, filter_by_popularity, sort_by,
    DEFAULT_POPULARITY_THRESHOLD,
};
use cityrate_common::{City, Country, RatingMode, SortColumn, SortSpec};
use tracing::warn;

use crate::client::ApiClient;
use crate::state::AppState;
use crate::view::{KeyedView, RequestKey, ViewState};

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load ratings";

/// What a ratings row stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    #[default]
    Cities,
    /// Cities aggregated per country on the client
    Countries,
}

/// Table options chosen by the user
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingsOptions {
    pub mode: RatingMode,
    pub scope: Scope,
    /// Drop rows with fewer than `threshold` likes + dislikes
    pub hide_unpopular: bool,
    pub sort: SortSpec,
    pub threshold: u64,
}

impl Default for RatingsOptions {
    fn default() -> Self {
        Self {
            mode: RatingMode::Overall,
            scope: Scope::Cities,
            hide_unpopular: false,
            sort: SortSpec::ascending(SortColumn::Index),
            threshold: DEFAULT_POPULARITY_THRESHOLD,
        }
    }
}

/// Rows ready for display
#[derive(Debug, Clone, PartialEq)]
pub enum RatingsTable {
    Cities(Vec<City>),
    Countries(Vec<Country>),
}

impl RatingsTable {
    pub fn len(&self) -> usize {
        match self {
            RatingsTable::Cities(rows) => rows.len(),
            RatingsTable::Countries(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fetch the ranking list for `mode`, mapped to the view's error message
pub async fn fetch_ratings(client: &ApiClient, mode: RatingMode) -> Result<Vec<City>, String> {
    client.ratings(mode).await.map_err(|e| {
        warn!(?mode, error = %e, "Loading ratings failed");
        LOAD_FAILED_MESSAGE.to_string()
    })
}

#[derive(Debug)]
pub struct RatingsView {
    options: RatingsOptions,
    generation: u64,
    view: KeyedView<RequestKey<RatingMode>, Vec<City>>,
}

impl RatingsView {
    pub fn new(app: &AppState, options: RatingsOptions) -> Self {
        Self {
            options,
            generation: app.generation(),
            view: KeyedView::new(),
        }
    }

    pub fn options(&self) -> &RatingsOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut RatingsOptions {
        &mut self.options
    }

    pub fn state(&self) -> &ViewState<Vec<City>> {
        self.view.state()
    }

    /// Switch the rating mode; the caller starts a new request afterwards
    pub fn set_mode(&mut self, mode: RatingMode) {
        self.options.mode = mode;
    }

    /// Click on a column header
    pub fn toggle_sort(&mut self, column: SortColumn) {
        self.options.sort = self.options.sort.toggle(column);
    }

    /// Start a request for the current mode and return its key
    pub fn request(&mut self) -> RequestKey<RatingMode> {
        let key = RequestKey::new(self.options.mode, self.generation);
        self.view.begin(key);
        key
    }

    /// Apply a finished request; stale keys are ignored
    pub fn apply(&mut self, key: RequestKey<RatingMode>, result: Result<Vec<City>, String>) -> bool {
        self.view.resolve(&key, result)
    }

    pub async fn load(&mut self, client: &ApiClient) {
        let key = self.request();
        let result = fetch_ratings(client, key.subject).await;
        self.apply(key, result);
    }

    /// Shape the loaded ranking into display rows
    ///
    /// Derived scores missing from the payload are computed from the
    /// counters, then rows are aggregated, filtered and sorted.
    pub fn rows(&self) -> Option<RatingsTable> {
        let cities = self.view.state().data()?;
        let opts = &self.options;

        let mut cities = cities.clone();
        cities.iter_mut().for_each(fill_derived_scores);

        let table = match opts.scope {
            Scope::Cities => {
                let mut rows = cities;
                if opts.hide_unpopular {
                    rows = filter_by_popularity(rows, opts.threshold);
                }
                RatingsTable::Cities(sort_by(rows, opts.sort, opts.mode))
            }
            Scope::Countries => {
                let mut rows = aggregate_countries(&cities);
                if opts.hide_unpopular {
                    rows = filter_by_popularity(rows, opts.threshold);
                }
                RatingsTable::Countries(sort_by(rows, opts.sort, opts.mode))
            }
        };
        Some(table)
    }
}
