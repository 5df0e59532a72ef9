//! Data model shared by every view
//!
//! Field names follow the remote API's JSON (camelCase, except the
//! `dont_know` counter which the service spells in snake case).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::{Error, Result};

// ========================================
// Vote Types
// ========================================

/// A user's opinion of a single city
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteType {
    Liked,
    Disliked,
    DontKnow,
}

impl VoteType {
    /// All vote types in button order (dislike, don't know, like)
    pub const ALL: [VoteType; 3] = [VoteType::Disliked, VoteType::DontKnow, VoteType::Liked];

    /// Wire name of the vote type
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteType::Liked => "liked",
            VoteType::Disliked => "disliked",
            VoteType::DontKnow => "dont_know",
        }
    }

    /// Liked and disliked both count as having visited the city
    pub fn is_visit(&self) -> bool {
        matches!(self, VoteType::Liked | VoteType::Disliked)
    }
}

impl fmt::Display for VoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "liked" | "like" => Ok(VoteType::Liked),
            "disliked" | "dislike" => Ok(VoteType::Disliked),
            "dont_know" | "dont-know" | "dontknow" => Ok(VoteType::DontKnow),
            other => Err(Error::InvalidInput(format!(
                "unknown vote type '{}' (expected liked, disliked or dont_know)",
                other
            ))),
        }
    }
}

// ========================================
// Counters
// ========================================

/// Raw vote counters for a city or country
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoteCounts {
    pub likes: u64,
    pub dislikes: u64,
    pub dont_know: u64,
}

impl VoteCounts {
    pub fn new(likes: u64, dislikes: u64, dont_know: u64) -> Self {
        Self {
            likes,
            dislikes,
            dont_know,
        }
    }

    /// Definitive votes (likes + dislikes)
    pub fn votes(&self) -> u64 {
        self.likes.saturating_add(self.dislikes)
    }

    /// All responses including "don't know"
    pub fn responses(&self) -> u64 {
        self.votes().saturating_add(self.dont_know)
    }
}

// Saturating: counters are server-supplied
impl std::ops::AddAssign for VoteCounts {
    fn add_assign(&mut self, other: Self) {
        self.likes = self.likes.saturating_add(other.likes);
        self.dislikes = self.dislikes.saturating_add(other.dislikes);
        self.dont_know = self.dont_know.saturating_add(other.dont_know);
    }
}

// ========================================
// Entities
// ========================================

/// A city as returned by the remote service
///
/// Counters default to zero when the payload omits them or sends `null`.
/// `vote_type` is never sent by the service; it is attached client-side by
/// [`crate::rating::merge_user_votes`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct City {
    pub city_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub flag: String,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub likes: u64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub dislikes: u64,
    #[serde(default, rename = "dont_know", deserialize_with = "null_as_zero")]
    pub dont_know: u64,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub hidden_jam_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_type: Option<VoteType>,
}

impl City {
    /// Build a city with zeroed counters and no derived scores
    pub fn new(
        city_id: impl Into<String>,
        name: impl Into<String>,
        country: impl Into<String>,
        flag: impl Into<String>,
    ) -> Self {
        Self {
            city_id: city_id.into(),
            name: name.into(),
            country: country.into(),
            flag: flag.into(),
            likes: 0,
            dislikes: 0,
            dont_know: 0,
            rating: None,
            hidden_jam_score: None,
            vote_type: None,
        }
    }

    /// Set the counters, leaving derived scores untouched
    pub fn with_counts(mut self, likes: u64, dislikes: u64, dont_know: u64) -> Self {
        self.likes = likes;
        self.dislikes = dislikes;
        self.dont_know = dont_know;
        self
    }

    /// True when the user liked or disliked this city
    pub fn is_visited(&self) -> bool {
        self.vote_type.is_some_and(|v| v.is_visit())
    }
}

/// Country-level aggregate of its member cities
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    pub name: String,
    pub flag: String,
    pub city_count: usize,
    pub likes: u64,
    pub dislikes: u64,
    #[serde(rename = "dont_know")]
    pub dont_know: u64,
    pub rating: Option<f64>,
    pub hidden_jam_score: Option<f64>,
}

/// One user's vote on one city
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    #[serde(default)]
    pub user_id: String,
    pub city_id: String,
    pub vote_type: VoteType,
}

// ========================================
// Rated Trait
// ========================================

/// Anything that can be ranked in a ratings table
///
/// Implemented by [`City`] and [`Country`] so that filtering and sorting
/// apply uniformly to both.
pub trait Rated {
    fn name(&self) -> &str;
    fn country(&self) -> &str;
    fn counts(&self) -> VoteCounts;
    fn rating(&self) -> Option<f64>;
    fn hidden_jam_score(&self) -> Option<f64>;

    /// The logged-in user's vote, where one has been attached
    fn vote_type(&self) -> Option<VoteType> {
        None
    }
}

impl Rated for City {
    fn name(&self) -> &str {
        &self.name
    }

    fn country(&self) -> &str {
        &self.country
    }

    fn counts(&self) -> VoteCounts {
        VoteCounts::new(self.likes, self.dislikes, self.dont_know)
    }

    fn rating(&self) -> Option<f64> {
        self.rating
    }

    fn hidden_jam_score(&self) -> Option<f64> {
        self.hidden_jam_score
    }

    fn vote_type(&self) -> Option<VoteType> {
        self.vote_type
    }
}

impl Rated for Country {
    fn name(&self) -> &str {
        &self.name
    }

    // A country's "country" column is itself
    fn country(&self) -> &str {
        &self.name
    }

    fn counts(&self) -> VoteCounts {
        VoteCounts::new(self.likes, self.dislikes, self.dont_know)
    }

    fn rating(&self) -> Option<f64> {
        self.rating
    }

    fn hidden_jam_score(&self) -> Option<f64> {
        self.hidden_jam_score
    }
}

fn null_as_zero<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vote_type_wire_names() {
        assert_eq!(serde_json::to_string(&VoteType::DontKnow).unwrap(), "\"dont_know\"");
        assert_eq!(serde_json::to_string(&VoteType::Liked).unwrap(), "\"liked\"");

        let parsed: VoteType = serde_json::from_str("\"disliked\"").unwrap();
        assert_eq!(parsed, VoteType::Disliked);
    }

    #[test]
    fn test_vote_type_from_str() {
        assert_eq!("liked".parse::<VoteType>().unwrap(), VoteType::Liked);
        assert_eq!(" DONT_KNOW ".parse::<VoteType>().unwrap(), VoteType::DontKnow);
        assert!("maybe".parse::<VoteType>().is_err());
    }

    #[test]
    fn test_only_likes_and_dislikes_are_visits() {
        assert!(VoteType::Liked.is_visit());
        assert!(VoteType::Disliked.is_visit());
        assert!(!VoteType::DontKnow.is_visit());
    }

    #[test]
    fn test_city_deserialization_with_missing_and_null_counters() {
        let json = r#"{
            "cityId": "c1",
            "name": "Kazan",
            "country": "Russia",
            "flag": "🇷🇺",
            "likes": null,
            "dont_know": 4
        }"#;
        let city: City = serde_json::from_str(json).unwrap();

        assert_eq!(city.city_id, "c1");
        assert_eq!(city.likes, 0);
        assert_eq!(city.dislikes, 0);
        assert_eq!(city.dont_know, 4);
        assert_eq!(city.rating, None);
        assert_eq!(city.vote_type, None);
    }

    #[test]
    fn test_city_deserialization_with_scores() {
        let json = r#"{"cityId":"c2","name":"Porto","country":"Portugal","flag":"🇵🇹",
                       "rating":0.75,"hiddenJamScore":0.25,"likes":3,"dislikes":1,"dont_know":4}"#;
        let city: City = serde_json::from_str(json).unwrap();

        assert_eq!(city.rating, Some(0.75));
        assert_eq!(city.hidden_jam_score, Some(0.25));
        assert_eq!(city.counts(), VoteCounts::new(3, 1, 4));
    }

    #[test]
    fn test_vote_counts_totals() {
        let counts = VoteCounts::new(3, 2, 5);
        assert_eq!(counts.votes(), 5);
        assert_eq!(counts.responses(), 10);
    }

    #[test]
    fn test_vote_counts_saturate() {
        let mut counts = VoteCounts::new(u64::MAX, 1, 1);
        assert_eq!(counts.votes(), u64::MAX);
        assert_eq!(counts.responses(), u64::MAX);

        counts += VoteCounts::new(1, 0, u64::MAX);
        assert_eq!(counts, VoteCounts::new(u64::MAX, 1, u64::MAX));
    }
}
