//! Sequential voting queue
//!
//! The service hands out the cities the user has not voted on yet. The user
//! votes on the front city; a successful vote pops it and bumps the progress
//! counter. A failed vote leaves the queue exactly as it was.
//!
//! ```text
//! idle --submit--> submitting --ok--> idle (front popped, voted + 1)
//!                             --err-> idle (queue unchanged, error set)
//! ```
//!
//! The queue is finished once it is empty.

use std::collections::VecDeque;

use cityrate_common::api::VotingCitiesResponse;
use cityrate_common::{City, VoteType};
use tracing::warn;

use crate::client::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::state::AppState;
use crate::view::{KeyedView, RequestKey, ViewState};

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load cities";
pub const SUBMIT_FAILED_MESSAGE: &str = "Failed to submit vote";

/// Cities left to vote on plus progress counters
#[derive(Debug, Clone, PartialEq)]
pub struct VotingQueue {
    cities: VecDeque<City>,
    voted_count: u64,
    total_count: u64,
    submitting: bool,
    error: Option<String>,
}

impl VotingQueue {
    pub fn new(cities: Vec<City>, voted_count: u64, total_count: u64) -> Self {
        Self {
            cities: cities.into(),
            voted_count,
            total_count,
            submitting: false,
            error: None,
        }
    }

    pub fn from_response(response: VotingCitiesResponse) -> Self {
        Self::new(response.cities, response.voted_count, response.total_count)
    }

    /// City currently up for a vote
    pub fn current(&self) -> Option<&City> {
        self.cities.front()
    }

    pub fn remaining(&self) -> usize {
        self.cities.len()
    }

    pub fn voted_count(&self) -> u64 {
        self.voted_count
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    /// All cities voted
    pub fn is_complete(&self) -> bool {
        self.cities.is_empty()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Error from the last failed submission
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Enter `submitting` and return the id of the city being voted on
    pub fn begin_submit(&mut self) -> ClientResult<String> {
        if self.submitting {
            return Err(ClientError::Busy);
        }
        let city_id = self
            .current()
            .map(|c| c.city_id.clone())
            .ok_or(ClientError::EmptyQueue)?;

        self.submitting = true;
        self.error = None;
        Ok(city_id)
    }

    /// Leave `submitting` with the outcome of the request
    pub fn finish_submit(&mut self, succeeded: bool) {
        self.submitting = false;
        if succeeded {
            self.cities.pop_front();
            self.voted_count += 1;
        } else {
            self.error = Some(SUBMIT_FAILED_MESSAGE.to_string());
        }
    }
}

/// Fetch the queue for `user_id`, mapped to the view's error message
pub async fn fetch_voting_queue(client: &ApiClient, user_id: &str) -> Result<VotingQueue, String> {
    client
        .voting_cities(user_id)
        .await
        .map(VotingQueue::from_response)
        .map_err(|e| {
            warn!(error = %e, "Loading voting queue failed");
            LOAD_FAILED_MESSAGE.to_string()
        })
}

/// Voting tab
#[derive(Debug)]
pub struct VotingView {
    key: RequestKey<String>,
    view: KeyedView<RequestKey<String>, VotingQueue>,
}

impl VotingView {
    /// Voting view for the logged-in user
    pub fn new(app: &AppState) -> ClientResult<Self> {
        let user_id = app.require_user()?.to_string();
        Ok(Self {
            key: app.request_key(user_id),
            view: KeyedView::new(),
        })
    }

    pub fn user_id(&self) -> &str {
        &self.key.subject
    }

    pub fn state(&self) -> &ViewState<VotingQueue> {
        self.view.state()
    }

    pub fn queue(&self) -> Option<&VotingQueue> {
        self.view.state().data()
    }

    /// Follow the app to its current user and generation
    ///
    /// Requests issued before this point become stale.
    pub fn rekey(&mut self, app: &AppState) -> ClientResult<()> {
        let user_id = app.require_user()?.to_string();
        self.key = app.request_key(user_id);
        Ok(())
    }

    /// Start a request for the current user and return its key
    pub fn request(&mut self) -> RequestKey<String> {
        let key = self.key.clone();
        self.view.begin(key.clone());
        key
    }

    /// Apply a finished request; stale keys are ignored
    pub fn apply(&mut self, key: RequestKey<String>, result: Result<VotingQueue, String>) -> bool {
        self.view.resolve(&key, result)
    }

    pub async fn load(&mut self, client: &ApiClient) {
        let key = self.request();
        let result = fetch_voting_queue(client, &key.subject).await;
        self.apply(key, result);
    }

    /// Vote on the front city
    pub async fn submit_vote(&mut self, client: &ApiClient, vote_type: VoteType) -> ClientResult<()> {
        let user_id = self.key.subject.clone();
        let queue = self.view.state_mut().data_mut().ok_or(ClientError::NotReady)?;
        let city_id = queue.begin_submit()?;

        let result = client.vote(&user_id, &city_id, vote_type).await;
        if let Err(e) = &result {
            warn!(city_id = %city_id, error = %e, "Vote submission failed");
        }
        queue.finish_submit(result.is_ok());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue() -> VotingQueue {
        VotingQueue::new(
            vec![City::new("a", "Alpha", "X", ""), City::new("b", "Beta", "X", "")],
            3,
            5,
        )
    }

    #[test]
    fn test_success_pops_front_and_counts() {
        let mut q = queue();
        let city_id = q.begin_submit().unwrap();
        assert_eq!(city_id, "a");
        assert!(q.is_submitting());

        q.finish_submit(true);

        assert!(!q.is_submitting());
        assert_eq!(q.current().unwrap().city_id, "b");
        assert_eq!(q.voted_count(), 4);
        assert_eq!(q.total_count(), 5);
    }

    #[test]
    fn test_failure_leaves_queue_unchanged() {
        let mut q = queue();
        q.begin_submit().unwrap();
        q.finish_submit(false);

        assert_eq!(q.current().unwrap().city_id, "a");
        assert_eq!(q.remaining(), 2);
        assert_eq!(q.voted_count(), 3);
        assert_eq!(q.error(), Some(SUBMIT_FAILED_MESSAGE));

        // Immediate retry is allowed and clears the error
        assert!(q.begin_submit().is_ok());
        assert!(q.error().is_none());
    }

    #[test]
    fn test_no_second_submission_in_flight() {
        let mut q = queue();
        q.begin_submit().unwrap();
        assert!(matches!(q.begin_submit(), Err(ClientError::Busy)));
    }

    #[test]
    fn test_empty_queue_is_terminal() {
        let mut q = VotingQueue::new(Vec::new(), 5, 5);
        assert!(q.is_complete());
        assert!(matches!(q.begin_submit(), Err(ClientError::EmptyQueue)));
    }

    #[test]
    fn test_draining_the_queue() {
        let mut q = queue();
        for _ in 0..2 {
            q.begin_submit().unwrap();
            q.finish_submit(true);
        }
        assert!(q.is_complete());
        assert_eq!(q.voted_count(), 5);
    }

    #[test]
    fn test_response_for_previous_user_is_dropped() {
        let mut app = AppState::new();
        app.login("alice").unwrap();
        let mut view = VotingView::new(&app).unwrap();
        let alice = view.request();

        app.logout().unwrap();
        app.login("bob").unwrap();
        view.rekey(&app).unwrap();
        let bob = view.request();
        assert_eq!(view.user_id(), "bob");

        assert!(view.apply(bob, Ok(VotingQueue::new(Vec::new(), 2, 2))));
        assert!(!view.apply(alice, Ok(queue())));
        assert!(view.queue().unwrap().is_complete());
    }

    #[test]
    fn test_rekey_after_logout_fails() {
        let mut app = AppState::new();
        app.login("alice").unwrap();
        let mut view = VotingView::new(&app).unwrap();

        app.logout().unwrap();
        assert!(matches!(view.rekey(&app), Err(ClientError::NotLoggedIn)));
    }

    #[test]
    fn test_view_requires_login() {
        let app = AppState::new();
        assert!(matches!(VotingView::new(&app), Err(ClientError::NotLoggedIn)));
    }
}
