//! HTTP client for the city rating service
//!
//! One method per endpoint. Every call is attempted exactly once; there is
//! no retry and no rate limiting. Failures come back as
//! [`ClientError::Network`], [`ClientError::Status`] or [`ClientError::Parse`].

use std::time::Duration;

use cityrate_common::api::{
    self, AllCitiesResponse, UserVotesResponse, ValidateUserRequest, ValidateUserResponse,
    VoteRequest, VotingCitiesResponse,
};
use cityrate_common::config::ClientConfig;
use cityrate_common::{City, RatingMode, Vote, VoteType};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{ClientError, ClientResult};

const USER_AGENT: &str = concat!("cityrate/", env!("CARGO_PKG_VERSION"));

/// City rating API client
#[derive(Debug, Clone)]
pub struct ApiClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for `base_url` (no trailing slash needed)
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ClientResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Url::parse(&base_url)
            .map_err(|e| ClientError::Network(format!("Invalid API URL '{}': {}", base_url, e)))?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        Self::new(config.api_url.clone(), config.request_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ========================================
    // Read endpoints
    // ========================================

    /// GET /api/all-cities
    pub async fn all_cities(&self) -> ClientResult<Vec<City>> {
        let response: AllCitiesResponse = self.get_json(self.url(api::ALL_CITIES_PATH)?).await?;
        Ok(response.cities)
    }

    /// GET /api/rankings
    pub async fn rankings(&self) -> ClientResult<Vec<City>> {
        self.get_json(self.url(api::RANKINGS_PATH)?).await
    }

    /// GET /api/hidden-jam-ratings
    pub async fn hidden_jam_ratings(&self) -> ClientResult<Vec<City>> {
        self.get_json(self.url(api::HIDDEN_JAM_RATINGS_PATH)?).await
    }

    /// Ranking list for a ratings table mode
    pub async fn ratings(&self, mode: RatingMode) -> ClientResult<Vec<City>> {
        match mode {
            RatingMode::Overall => self.rankings().await,
            RatingMode::HiddenJam => self.hidden_jam_ratings().await,
        }
    }

    /// GET /api/user-votes/{userId}
    pub async fn user_votes(&self, user_id: &str) -> ClientResult<Vec<Vote>> {
        let mut url = self.url(api::USER_VOTES_PATH)?;
        url.path_segments_mut()
            .map_err(|_| ClientError::Network(format!("Cannot extend URL {}", self.base_url)))?
            .push(user_id);

        let response: UserVotesResponse = self.get_json(url).await?;
        Ok(response.user_votes)
    }

    /// GET /api/cities?userId={id}
    ///
    /// Cities the user has not voted on yet.
    pub async fn voting_cities(&self, user_id: &str) -> ClientResult<VotingCitiesResponse> {
        let mut url = self.url(api::VOTING_CITIES_PATH)?;
        url.query_pairs_mut().append_pair("userId", user_id);
        self.get_json(url).await
    }

    // ========================================
    // Write endpoints
    // ========================================

    /// POST /api/vote (first vote on a city)
    pub async fn vote(&self, user_id: &str, city_id: &str, vote_type: VoteType) -> ClientResult<()> {
        let body = VoteRequest {
            user_id: user_id.to_string(),
            city_id: city_id.to_string(),
            vote_type,
        };
        self.post_ack(self.url(api::VOTE_PATH)?, &body).await?;

        info!(city_id = %city_id, vote = %vote_type, "Vote submitted");
        Ok(())
    }

    /// POST /api/change-vote (replace an existing vote)
    pub async fn change_vote(
        &self,
        user_id: &str,
        city_id: &str,
        vote_type: VoteType,
    ) -> ClientResult<()> {
        let body = VoteRequest {
            user_id: user_id.to_string(),
            city_id: city_id.to_string(),
            vote_type,
        };
        self.post_ack(self.url(api::CHANGE_VOTE_PATH)?, &body).await?;

        info!(city_id = %city_id, vote = %vote_type, "Vote changed");
        Ok(())
    }

    /// POST /api/validate-user
    pub async fn validate_user(&self, user_id: &str) -> ClientResult<ValidateUserResponse> {
        let body = ValidateUserRequest {
            user_id: user_id.to_string(),
        };
        let url = self.url(api::VALIDATE_USER_PATH)?;

        debug!(url = %url, "Validating user");
        let response = self
            .http_client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(network_error)?;

        read_json(response).await
    }

    // ========================================
    // Helpers
    // ========================================

    fn url(&self, path: &str) -> ClientResult<Url> {
        Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| ClientError::Network(format!("Invalid URL for {}: {}", path, e)))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> ClientResult<T> {
        debug!(url = %url, "GET");
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(network_error)?;

        read_json(response).await
    }

    /// POST a body; only the status matters, the acknowledgement body is ignored
    async fn post_ack<B: Serialize>(&self, url: Url, body: &B) -> ClientResult<()> {
        debug!(url = %url, "POST");
        let response = self
            .http_client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }
        Ok(())
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(ClientError::Status(status.as_u16()));
    }

    let bytes = response.bytes().await.map_err(network_error)?;
    if bytes.is_empty() {
        return Err(ClientError::Parse("empty response body".to_string()));
    }

    serde_json::from_slice(&bytes).map_err(|e| ClientError::Parse(e.to_string()))
}

fn network_error(e: reqwest::Error) -> ClientError {
    if e.is_timeout() {
        ClientError::Network(format!("request timed out: {}", e))
    } else {
        ClientError::Network(e.to_string())
    }
}
