//! # City Rater Common Library
//!
//! Shared code for the city rater client:
//! - Data model (cities, countries, votes)
//! - Rating engine (rating and hidden jam formulas, aggregation, sorting, filtering)
//! - API request/response types
//! - Configuration loading
//! - Session persistence for the logged-in user

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod rating;
pub mod session;

pub use error::{Error, Result};
pub use models::{City, Country, Rated, Vote, VoteCounts, VoteType};
pub use rating::{RatingMode, SortColumn, SortDirection, SortSpec};
