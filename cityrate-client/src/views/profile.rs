//! Profile tab: the user's voting history grouped by country
//!
//! Loading needs three independent fetches (all cities, the user's votes and
//! the rankings). They run concurrently and the view only becomes ready once
//! all three succeeded; a single failure turns the whole view into an error.
//!
//! From the loaded view the user can change the vote on any city, or mark
//! a whole country as not visited ("don't know" on every city not already
//! marked that way).

use std::collections::{BTreeMap, HashMap, HashSet};

use cityrate_common::rating::{
    aggregate_country, classify_country, group_by_country, merge_rankings, merge_user_votes,
    profile_stats, sort_by, CountryVisit, ProfileStats, DEFAULT_POPULARITY_THRESHOLD,
};
use cityrate_common::{City, Country, RatingMode, SortColumn, SortSpec, VoteType};
use tracing::{info, warn};

use crate::client::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::state::AppState;
use crate::view::{KeyedView, RequestKey, ViewState};

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load profile data";
pub const CHANGE_FAILED_MESSAGE: &str = "Failed to change vote";

/// Cities of the loaded profile, keyed by country name
pub type CountryMap = BTreeMap<String, Vec<City>>;

/// Which countries the profile lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountryFilter {
    #[default]
    All,
    VisitedOnly,
    UnvisitedOnly,
}

impl CountryFilter {
    fn admits(&self, visit: CountryVisit) -> bool {
        match self {
            CountryFilter::All => true,
            CountryFilter::VisitedOnly => visit == CountryVisit::Visited,
            CountryFilter::UnvisitedOnly => visit != CountryVisit::Visited,
        }
    }
}

/// One country block of the profile
#[derive(Debug, Clone, PartialEq)]
pub struct CountrySection {
    pub country: Country,
    pub visit: CountryVisit,
    pub sort: SortSpec,
    /// Member cities in the country's current sort order
    pub cities: Vec<City>,
}

/// Fetch and merge everything the profile shows
pub async fn fetch_profile(client: &ApiClient, user_id: &str) -> ClientResult<CountryMap> {
    let (cities, votes, rankings) = tokio::try_join!(
        client.all_cities(),
        client.user_votes(user_id),
        client.rankings(),
    )?;

    let merged = merge_user_votes(merge_rankings(cities, &rankings), &votes);
    Ok(group_by_country(merged))
}

#[derive(Debug)]
pub struct ProfileView {
    key: RequestKey<String>,
    view: KeyedView<RequestKey<String>, CountryMap>,
    sorts: HashMap<String, SortSpec>,
    filter: CountryFilter,
    changing: HashSet<String>,
    action_error: Option<String>,
    threshold: u64,
}

impl ProfileView {
    pub fn new(app: &AppState) -> ClientResult<Self> {
        let user_id = app.require_user()?.to_string();
        Ok(Self {
            key: app.request_key(user_id),
            view: KeyedView::new(),
            sorts: HashMap::new(),
            filter: CountryFilter::All,
            changing: HashSet::new(),
            action_error: None,
            threshold: DEFAULT_POPULARITY_THRESHOLD,
        })
    }

    /// Minimum likes + dislikes before a city's rating is shown
    pub fn with_threshold(mut self, threshold: u64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn user_id(&self) -> &str {
        &self.key.subject
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    pub fn state(&self) -> &ViewState<CountryMap> {
        self.view.state()
    }

    /// Error from the last failed vote change
    pub fn action_error(&self) -> Option<&str> {
        self.action_error.as_deref()
    }

    /// Follow the app to its current user and generation
    ///
    /// Requests issued before this point become stale, and pending vote
    /// changes of the previous user are forgotten.
    pub fn rekey(&mut self, app: &AppState) -> ClientResult<()> {
        let user_id = app.require_user()?.to_string();
        self.key = app.request_key(user_id);
        self.changing.clear();
        self.action_error = None;
        Ok(())
    }

    /// Start a request for the current user and return its key
    pub fn request(&mut self) -> RequestKey<String> {
        let key = self.key.clone();
        self.view.begin(key.clone());
        key
    }

    /// Apply a finished request; stale keys are ignored
    pub fn apply(&mut self, key: RequestKey<String>, result: Result<CountryMap, String>) -> bool {
        self.view.resolve(&key, result)
    }

    pub async fn load(&mut self, client: &ApiClient) {
        let key = self.request();
        let result = fetch_profile(client, &key.subject).await.map_err(|e| {
            warn!(error = %e, "Loading profile failed");
            LOAD_FAILED_MESSAGE.to_string()
        });
        self.apply(key, result);
    }

    // ========================================
    // Presentation
    // ========================================

    pub fn filter(&self) -> CountryFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: CountryFilter) {
        self.filter = filter;
    }

    /// Current sort of one country's city list (name ascending until changed)
    pub fn sort_for(&self, country: &str) -> SortSpec {
        self.sorts
            .get(country)
            .copied()
            .unwrap_or_else(|| SortSpec::ascending(SortColumn::Name))
    }

    /// Click on a column header inside one country's table
    ///
    /// Only name, score and vote columns exist there.
    pub fn toggle_sort(&mut self, country: &str, column: SortColumn) -> ClientResult<()> {
        if !matches!(column, SortColumn::Name | SortColumn::Score | SortColumn::Vote) {
            return Err(ClientError::NotAllowed(format!(
                "profile tables cannot be sorted by {}",
                column
            )));
        }
        let next = self.sort_for(country).toggle(column);
        self.sorts.insert(country.to_string(), next);
        Ok(())
    }

    /// Country blocks passing the current filter, in country name order
    pub fn countries(&self) -> Vec<CountrySection> {
        let Some(grouped) = self.view.state().data() else {
            return Vec::new();
        };

        grouped
            .iter()
            .filter_map(|(name, members)| {
                let visit = classify_country(members);
                if !self.filter.admits(visit) {
                    return None;
                }
                let sort = self.sort_for(name);
                Some(CountrySection {
                    country: aggregate_country(name, members),
                    visit,
                    sort,
                    cities: sort_by(members.clone(), sort, RatingMode::Overall),
                })
            })
            .collect()
    }

    /// Visit counters over all countries, ignoring the filter
    pub fn stats(&self) -> Option<ProfileStats> {
        self.view.state().data().map(profile_stats)
    }

    // ========================================
    // Vote changes
    // ========================================

    pub fn is_changing(&self, city_id: &str) -> bool {
        self.changing.contains(city_id)
    }

    /// Mark `city_id` as submitting
    pub fn begin_change(&mut self, city_id: &str) -> ClientResult<()> {
        let grouped = self.view.state().data().ok_or(ClientError::NotReady)?;
        if !grouped.values().flatten().any(|c| c.city_id == city_id) {
            return Err(ClientError::UnknownCity(city_id.to_string()));
        }
        if !self.changing.insert(city_id.to_string()) {
            return Err(ClientError::Busy);
        }
        self.action_error = None;
        Ok(())
    }

    /// Leave submitting; only a successful change touches the stored vote
    pub fn finish_change(&mut self, city_id: &str, vote_type: VoteType, succeeded: bool) {
        self.changing.remove(city_id);

        if !succeeded {
            self.action_error = Some(CHANGE_FAILED_MESSAGE.to_string());
            return;
        }
        if let Some(grouped) = self.view.state_mut().data_mut() {
            if let Some(city) = grouped.values_mut().flatten().find(|c| c.city_id == city_id) {
                city.vote_type = Some(vote_type);
            }
        }
    }

    pub async fn change_vote(
        &mut self,
        client: &ApiClient,
        city_id: &str,
        vote_type: VoteType,
    ) -> ClientResult<()> {
        self.begin_change(city_id)?;

        let result = client.change_vote(&self.key.subject, city_id, vote_type).await;
        if let Err(e) = &result {
            warn!(city_id = %city_id, error = %e, "Vote change failed");
        }
        self.finish_change(city_id, vote_type, result.is_ok());
        result
    }

    /// Set "don't know" on every city of `country` not already marked so
    ///
    /// Requests go out one at a time in city order. The first failure stops
    /// the run; changes made before it stay. Returns the number of cities
    /// changed.
    pub async fn mark_country_not_visited(
        &mut self,
        client: &ApiClient,
        country: &str,
    ) -> ClientResult<usize> {
        let grouped = self.view.state().data().ok_or(ClientError::NotReady)?;
        let members = grouped
            .get(country)
            .ok_or_else(|| ClientError::UnknownCountry(country.to_string()))?;

        let visit = classify_country(members);
        if !visit.allows_mark_not_visited() {
            return Err(ClientError::NotAllowed(format!(
                "{} is already visited or marked as not visited",
                country
            )));
        }

        let targets: Vec<String> = members
            .iter()
            .filter(|c| c.vote_type != Some(VoteType::DontKnow))
            .map(|c| c.city_id.clone())
            .collect();

        let mut changed = 0;
        for city_id in &targets {
            self.change_vote(client, city_id, VoteType::DontKnow).await?;
            changed += 1;
        }

        info!(country = %country, changed, "Country marked as not visited");
        Ok(changed)
    }
}
