//! Request and response bodies
//!
//! List fields default to empty and counters to zero so that a partial
//! payload still deserializes; only a non-JSON or wrongly-shaped body fails.

use serde::{Deserialize, Serialize};

use crate::models::{City, Vote, VoteType};

// ========================================
// Responses
// ========================================

/// GET /api/all-cities
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AllCitiesResponse {
    #[serde(default)]
    pub cities: Vec<City>,
}

/// GET /api/user-votes/{userId}
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserVotesResponse {
    #[serde(default)]
    pub user_votes: Vec<Vote>,
}

/// GET /api/cities?userId={id}
///
/// Cities the user has not voted on yet, plus progress counters.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VotingCitiesResponse {
    #[serde(default)]
    pub cities: Vec<City>,
    #[serde(default)]
    pub voted_count: u64,
    #[serde(default)]
    pub total_count: u64,
}

/// POST /api/validate-user response
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ValidateUserResponse {
    #[serde(default)]
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ========================================
// Requests
// ========================================

/// Body of POST /api/vote and POST /api/change-vote
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub user_id: String,
    pub city_id: String,
    pub vote_type: VoteType,
}

/// Body of POST /api/validate-user
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateUserRequest {
    pub user_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vote_request_serialization() {
        let request = VoteRequest {
            user_id: "u-42".to_string(),
            city_id: "paris".to_string(),
            vote_type: VoteType::DontKnow,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["userId"], "u-42");
        assert_eq!(json["cityId"], "paris");
        assert_eq!(json["voteType"], "dont_know");
    }

    #[test]
    fn test_voting_cities_defaults() {
        let response: VotingCitiesResponse = serde_json::from_str("{}").unwrap();

        assert!(response.cities.is_empty());
        assert_eq!(response.voted_count, 0);
        assert_eq!(response.total_count, 0);
    }

    #[test]
    fn test_user_votes_deserialization() {
        let json = r#"{"userVotes":[{"userId":"u1","cityId":"c1","voteType":"liked"}]}"#;
        let response: UserVotesResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.user_votes.len(), 1);
        assert_eq!(response.user_votes[0].vote_type, VoteType::Liked);
    }

    #[test]
    fn test_validate_user_response_with_error() {
        let json = r#"{"valid": false, "error": "User not found"}"#;
        let response: ValidateUserResponse = serde_json::from_str(json).unwrap();

        assert!(!response.valid);
        assert_eq!(response.error.as_deref(), Some("User not found"));
    }

    #[test]
    fn test_unknown_vote_type_is_rejected() {
        let json = r#"{"userVotes":[{"cityId":"c1","voteType":"maybe"}]}"#;
        assert!(serde_json::from_str::<UserVotesResponse>(json).is_err());
    }
}
