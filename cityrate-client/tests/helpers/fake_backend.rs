//! Fake rating service
//!
//! Serves the same routes as the real backend from an in-memory vote table.
//! One vote per (user, city); a later vote replaces the earlier one. Routes
//! can be made to fail (500) or to answer with a non-JSON body.

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use cityrate_client::ApiClient;
use cityrate_common::api::{ValidateUserRequest, VoteRequest};
use cityrate_common::rating::fill_derived_scores;
use cityrate_common::{City, VoteType};
use serde_json::{json, Value};

type Shared = Arc<Mutex<BackendState>>;

#[derive(Debug, Default)]
pub struct BackendState {
    /// Cities with their baseline counters (votes of users outside the test)
    pub cities: Vec<City>,
    /// (user id, city id) -> vote
    pub votes: HashMap<(String, String), VoteType>,
    pub valid_users: HashSet<String>,
    /// Path prefixes answering 500
    pub failing_paths: HashSet<String>,
    /// Path prefixes answering 200 with a non-JSON body
    pub malformed_paths: HashSet<String>,
    /// Cities whose vote changes answer 500
    pub failing_cities: HashSet<String>,
    /// Every request path, in arrival order
    pub requests: Vec<String>,
    /// City ids of accepted vote changes, in arrival order
    pub changes: Vec<String>,
}

impl BackendState {
    pub fn with_cities(cities: Vec<City>) -> Self {
        Self {
            cities,
            ..Default::default()
        }
    }

    pub fn with_user(mut self, user_id: &str) -> Self {
        self.valid_users.insert(user_id.to_string());
        self
    }

    pub fn with_vote(mut self, user_id: &str, city_id: &str, vote_type: VoteType) -> Self {
        self.votes
            .insert((user_id.to_string(), city_id.to_string()), vote_type);
        self
    }

    /// Baseline counters plus the recorded votes
    fn tallied(&self) -> Vec<City> {
        self.cities
            .iter()
            .map(|base| {
                let mut city = base.clone();
                for ((_, city_id), vote) in &self.votes {
                    if *city_id != city.city_id {
                        continue;
                    }
                    match vote {
                        VoteType::Liked => city.likes += 1,
                        VoteType::Disliked => city.dislikes += 1,
                        VoteType::DontKnow => city.dont_know += 1,
                    }
                }
                city.rating = None;
                city.hidden_jam_score = None;
                fill_derived_scores(&mut city);
                city
            })
            .collect()
    }

    fn answer(&mut self, path: &str, body: Value) -> Response {
        self.requests.push(path.to_string());

        if self.failing_paths.iter().any(|p| path.starts_with(p.as_str())) {
            return (StatusCode::INTERNAL_SERVER_ERROR, "backend failure").into_response();
        }
        if self.malformed_paths.iter().any(|p| path.starts_with(p.as_str())) {
            return (StatusCode::OK, "<html>not json</html>").into_response();
        }
        Json(body).into_response()
    }
}

/// Rating service running on 127.0.0.1 for the duration of a test
pub struct FakeBackend {
    pub addr: SocketAddr,
    state: Shared,
}

impl FakeBackend {
    pub async fn start(state: BackendState) -> Self {
        let state = Arc::new(Mutex::new(state));

        let app = Router::new()
            .route("/api/all-cities", get(all_cities))
            .route("/api/rankings", get(rankings))
            .route("/api/hidden-jam-ratings", get(hidden_jam_ratings))
            .route("/api/user-votes/:user_id", get(user_votes))
            .route("/api/cities", get(voting_cities))
            .route("/api/vote", post(vote))
            .route("/api/change-vote", post(change_vote))
            .route("/api/validate-user", post(validate_user))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake backend");
        let addr = listener.local_addr().expect("No local address");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Fake backend crashed");
        });

        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(self.url(), Duration::from_secs(5)).expect("Failed to build client")
    }

    pub fn state(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().expect("Backend state poisoned")
    }

    pub fn fail_path(&self, prefix: &str) {
        self.state().failing_paths.insert(prefix.to_string());
    }

    pub fn malform_path(&self, prefix: &str) {
        self.state().malformed_paths.insert(prefix.to_string());
    }

    pub fn fail_city(&self, city_id: &str) {
        self.state().failing_cities.insert(city_id.to_string());
    }

    /// Stored votes of one user, sorted by city id
    pub fn votes_of(&self, user_id: &str) -> Vec<(String, VoteType)> {
        let mut votes: Vec<(String, VoteType)> = self
            .state()
            .votes
            .iter()
            .filter(|((user, _), _)| user == user_id)
            .map(|((_, city), vote)| (city.clone(), *vote))
            .collect();
        votes.sort_by(|a, b| a.0.cmp(&b.0));
        votes
    }

    pub fn request_count(&self, prefix: &str) -> usize {
        self.state()
            .requests
            .iter()
            .filter(|p| p.starts_with(prefix))
            .count()
    }
}

/// Small world: two Swiss cities, one Norwegian, one Peruvian
///
/// Zürich has enough baseline votes to count as popular.
pub fn sample_cities() -> Vec<City> {
    vec![
        City::new("zrh", "Zürich", "Switzerland", "🇨🇭").with_counts(12, 3, 5),
        City::new("bsl", "Basel", "Switzerland", "🇨🇭").with_counts(1, 1, 0),
        City::new("osl", "Oslo", "Norway", "🇳🇴").with_counts(2, 0, 8),
        City::new("lim", "Lima", "Peru", "🇵🇪"),
    ]
}

// ========================================
// Handlers
// ========================================

async fn all_cities(State(state): State<Shared>) -> Response {
    let mut state = lock(&state);
    let cities = state.cities.clone();
    state.answer("/api/all-cities", json!({ "cities": cities }))
}

async fn rankings(State(state): State<Shared>) -> Response {
    let mut state = lock(&state);
    let mut ranked: Vec<City> = state
        .tallied()
        .into_iter()
        .filter(|c| c.likes + c.dislikes > 0)
        .collect();
    ranked.sort_by(|a, b| b.rating.unwrap_or(0.0).total_cmp(&a.rating.unwrap_or(0.0)));
    state.answer("/api/rankings", json!(ranked))
}

async fn hidden_jam_ratings(State(state): State<Shared>) -> Response {
    let mut state = lock(&state);
    let mut ranked: Vec<City> = state
        .tallied()
        .into_iter()
        .filter(|c| c.hidden_jam_score.is_some())
        .collect();
    ranked.sort_by(|a, b| {
        b.hidden_jam_score
            .unwrap_or(0.0)
            .total_cmp(&a.hidden_jam_score.unwrap_or(0.0))
    });
    state.answer("/api/hidden-jam-ratings", json!(ranked))
}

async fn user_votes(State(state): State<Shared>, Path(user_id): Path<String>) -> Response {
    let mut state = lock(&state);
    let votes: Vec<Value> = state
        .votes
        .iter()
        .filter(|((user, _), _)| *user == user_id)
        .map(|((user, city), vote)| json!({ "userId": user, "cityId": city, "voteType": vote }))
        .collect();
    let path = format!("/api/user-votes/{}", user_id);
    state.answer(&path, json!({ "userVotes": votes }))
}

async fn voting_cities(
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let mut state = lock(&state);
    let user_id = params.get("userId").cloned().unwrap_or_default();

    let pending: Vec<City> = state
        .cities
        .iter()
        .filter(|c| !state.votes.contains_key(&(user_id.clone(), c.city_id.clone())))
        .cloned()
        .collect();
    let total = state.cities.len();
    let voted = total - pending.len();

    state.answer(
        "/api/cities",
        json!({ "cities": pending, "votedCount": voted, "totalCount": total }),
    )
}

async fn vote(State(state): State<Shared>, Json(body): Json<VoteRequest>) -> Response {
    let mut state = lock(&state);
    let response = state.answer("/api/vote", json!({ "success": true }));
    if response.status().is_success() {
        state.votes.insert((body.user_id, body.city_id), body.vote_type);
    }
    response
}

async fn change_vote(State(state): State<Shared>, Json(body): Json<VoteRequest>) -> Response {
    let mut state = lock(&state);
    if state.failing_cities.contains(&body.city_id) {
        state.requests.push("/api/change-vote".to_string());
        return (StatusCode::INTERNAL_SERVER_ERROR, "change rejected").into_response();
    }

    let response = state.answer("/api/change-vote", json!({ "success": true }));
    if response.status().is_success() {
        state.changes.push(body.city_id.clone());
        state.votes.insert((body.user_id, body.city_id), body.vote_type);
    }
    response
}

async fn validate_user(
    State(state): State<Shared>,
    Json(body): Json<ValidateUserRequest>,
) -> Response {
    let mut state = lock(&state);
    let body = if state.valid_users.contains(&body.user_id) {
        json!({ "valid": true })
    } else {
        json!({ "valid": false, "error": "User not found. Start the bot first." })
    };
    state.answer("/api/validate-user", body)
}

fn lock(state: &Shared) -> MutexGuard<'_, BackendState> {
    state.lock().expect("Backend state poisoned")
}
