//! Wire types for the remote city rating service
//!
//! Every endpoint speaks JSON. These are plain data types with no HTTP
//! dependency; the client crate does the transport.

pub mod types;

pub use types::{
    AllCitiesResponse, UserVotesResponse, ValidateUserRequest, ValidateUserResponse,
    VoteRequest, VotingCitiesResponse,
};

/// Base URL of the production service
pub const DEFAULT_API_URL: &str = "https://telegram-city-rater-backend.onrender.com";

// ========================================
// Endpoint paths
// ========================================

pub const ALL_CITIES_PATH: &str = "/api/all-cities";
pub const RANKINGS_PATH: &str = "/api/rankings";
pub const HIDDEN_JAM_RATINGS_PATH: &str = "/api/hidden-jam-ratings";
pub const USER_VOTES_PATH: &str = "/api/user-votes";
pub const VOTING_CITIES_PATH: &str = "/api/cities";
pub const VOTE_PATH: &str = "/api/vote";
pub const CHANGE_VOTE_PATH: &str = "/api/change-vote";
pub const VALIDATE_USER_PATH: &str = "/api/validate-user";
